//! Form definition models
//!
//! A form is an ordered list of fields plus submission settings, owned by a user.

use crate::error::AppError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use uuid::Uuid;
use validator::Validate;

/// Title given to forms created without one
pub const UNTITLED_FORM: &str = "Untitled Form";

/// Input type of a field, which also determines the expected answer shape
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    Text,
    Email,
    Phone,
    Textarea,
    Select,
    Radio,
    Checkbox,
    Date,
    Rating,
}

impl FieldType {
    /// Single-choice fields whose answers are one of the options
    pub fn is_single_choice(&self) -> bool {
        matches!(self, FieldType::Select | FieldType::Radio)
    }

    /// Free-form fields whose answers are arbitrary strings
    pub fn is_free_text(&self) -> bool {
        matches!(
            self,
            FieldType::Text | FieldType::Email | FieldType::Phone | FieldType::Textarea | FieldType::Date
        )
    }
}

/// Expected answer of a quiz question
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CorrectAnswer {
    /// Exact string match (radio, select, text)
    Single(String),
    /// Unordered set match (checkbox)
    Set(Vec<String>),
}

/// Client-side validation hints. Stored with the form, not enforced on submission.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FieldValidation {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
}

/// One question within a form
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormField {
    pub id: String,
    #[serde(rename = "type")]
    pub field_type: FieldType,
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
    #[serde(default)]
    pub required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub correct_answer: Option<CorrectAnswer>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub points: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validation: Option<FieldValidation>,
}

impl FormField {
    pub fn new(id: impl Into<String>, field_type: FieldType, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            field_type,
            label: label.into(),
            placeholder: None,
            required: false,
            options: None,
            correct_answer: None,
            points: None,
            validation: None,
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn with_placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = Some(placeholder.into());
        self
    }

    pub fn with_options<I, S>(mut self, options: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.options = Some(options.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_answer(mut self, answer: CorrectAnswer) -> Self {
        self.correct_answer = Some(answer);
        self
    }

    pub fn with_points(mut self, points: u32) -> Self {
        self.points = Some(points);
        self
    }

    /// Points awarded for a correct answer; missing or zero counts as one
    pub fn points(&self) -> u32 {
        self.points.filter(|p| *p > 0).unwrap_or(1)
    }
}

/// Submission and display settings of a form
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormSettings {
    pub allow_multiple_submissions: bool,
    pub show_progress_bar: bool,
    pub collect_email: bool,
    pub is_quiz: bool,
    pub show_results: bool,
    pub is_public: bool,
    pub require_auth: bool,
}

impl Default for FormSettings {
    fn default() -> Self {
        Self {
            allow_multiple_submissions: false,
            show_progress_bar: true,
            collect_email: false,
            is_quiz: false,
            show_results: true,
            is_public: true,
            require_auth: false,
        }
    }
}

/// Partial settings, merged flag by flag over existing settings
#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsPatch {
    pub allow_multiple_submissions: Option<bool>,
    pub show_progress_bar: Option<bool>,
    pub collect_email: Option<bool>,
    pub is_quiz: Option<bool>,
    pub show_results: Option<bool>,
    pub is_public: Option<bool>,
    pub require_auth: Option<bool>,
}

impl FormSettings {
    pub fn apply(&mut self, patch: SettingsPatch) {
        if let Some(v) = patch.allow_multiple_submissions {
            self.allow_multiple_submissions = v;
        }
        if let Some(v) = patch.show_progress_bar {
            self.show_progress_bar = v;
        }
        if let Some(v) = patch.collect_email {
            self.collect_email = v;
        }
        if let Some(v) = patch.is_quiz {
            self.is_quiz = v;
        }
        if let Some(v) = patch.show_results {
            self.show_results = v;
        }
        if let Some(v) = patch.is_public {
            self.is_public = v;
        }
        if let Some(v) = patch.require_auth {
            self.require_auth = v;
        }
    }
}

/// A form owned by a user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Form {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub fields: Vec<FormField>,
    pub settings: FormSettings,
    pub user_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub response_count: u64,
    pub is_active: bool,
}

impl Form {
    /// Build a new, active form owned by `owner`.
    ///
    /// Fails when two fields share an id.
    pub fn new(owner: Uuid, request: CreateFormRequest) -> Result<Self, AppError> {
        let fields = request.fields.unwrap_or_default();
        ensure_unique_field_ids(&fields)?;

        let mut settings = FormSettings::default();
        if let Some(patch) = request.settings {
            settings.apply(patch);
        }

        let now = Utc::now();
        Ok(Self {
            id: Uuid::new_v4(),
            title: request
                .title
                .filter(|t| !t.trim().is_empty())
                .unwrap_or_else(|| UNTITLED_FORM.to_string()),
            description: request.description.unwrap_or_default(),
            fields,
            settings,
            user_id: owner,
            created_at: now,
            updated_at: now,
            response_count: 0,
            is_active: true,
        })
    }

    /// Apply an owner's edit. Fields are replaced wholesale, settings merged.
    pub fn apply_update(&mut self, update: UpdateFormRequest) -> Result<(), AppError> {
        if let Some(fields) = update.fields {
            ensure_unique_field_ids(&fields)?;
            self.fields = fields;
        }
        if let Some(title) = update.title {
            self.title = title;
        }
        if let Some(description) = update.description {
            self.description = description;
        }
        if let Some(patch) = update.settings {
            self.settings.apply(patch);
        }
        if let Some(is_active) = update.is_active {
            self.is_active = is_active;
        }
        self.updated_at = Utc::now();
        Ok(())
    }

    pub fn is_owned_by(&self, user_id: Uuid) -> bool {
        self.user_id == user_id
    }

    pub fn status(&self) -> &'static str {
        if self.is_active {
            "active"
        } else {
            "inactive"
        }
    }

    pub fn required_fields(&self) -> impl Iterator<Item = &FormField> {
        self.fields.iter().filter(|f| f.required)
    }
}

/// Reject field lists in which two fields share an id
pub fn ensure_unique_field_ids(fields: &[FormField]) -> Result<(), AppError> {
    let mut seen = HashSet::with_capacity(fields.len());
    for field in fields {
        if field.id.trim().is_empty() {
            return Err(AppError::InvalidField {
                field: "fields".to_string(),
                message: format!("Field '{}' has an empty id", field.label),
            });
        }
        if !seen.insert(field.id.as_str()) {
            return Err(AppError::InvalidField {
                field: field.id.clone(),
                message: format!("Duplicate field id '{}'", field.id),
            });
        }
    }
    Ok(())
}

/// Request to create a new form
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateFormRequest {
    #[validate(length(max = 200, message = "Title must be at most 200 characters"))]
    pub title: Option<String>,
    #[validate(length(max = 5000, message = "Description must be at most 5000 characters"))]
    pub description: Option<String>,
    #[validate(length(max = 500, message = "A form can have at most 500 fields"))]
    pub fields: Option<Vec<FormField>>,
    pub settings: Option<SettingsPatch>,
}

/// Request to update a form (all parts optional)
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateFormRequest {
    #[validate(length(min = 1, max = 200, message = "Title must be between 1 and 200 characters"))]
    pub title: Option<String>,
    #[validate(length(max = 5000, message = "Description must be at most 5000 characters"))]
    pub description: Option<String>,
    #[validate(length(max = 500, message = "A form can have at most 500 fields"))]
    pub fields: Option<Vec<FormField>>,
    pub settings: Option<SettingsPatch>,
    pub is_active: Option<bool>,
}

/// Dashboard listing entry
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FormSummary {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub fields: Vec<FormField>,
    pub settings: FormSettings,
    pub responses: u64,
    pub status: &'static str,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Form> for FormSummary {
    fn from(form: Form) -> Self {
        let status = form.status();
        Self {
            id: form.id,
            title: form.title,
            description: form.description,
            fields: form.fields,
            settings: form.settings,
            responses: form.response_count,
            status,
            created_at: form.created_at,
            updated_at: form.updated_at,
        }
    }
}
