//! Submission acceptance rules
//!
//! Decides whether a candidate submission becomes a stored response.

use super::scoring;
use crate::models::{Answers, Form, FormResponse};
use chrono::Utc;
use thiserror::Error;
use uuid::Uuid;

/// Why a submission was turned away
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Rejection {
    #[error("Form is not accepting responses")]
    Inactive,

    #[error("You have already submitted a response to this form")]
    Duplicate,

    #[error("'{label}' is required")]
    MissingRequired { field_id: String, label: String },
}

/// A candidate response as received from a submitter
#[derive(Debug, Clone)]
pub struct Submission {
    pub answers: Answers,
    pub submitter_email: Option<String>,
    pub submitter_name: Option<String>,
    pub ip_address: String,
}

impl Submission {
    pub fn new(
        answers: Answers,
        submitter_email: Option<String>,
        submitter_name: Option<String>,
        ip_address: impl Into<String>,
    ) -> Self {
        Self {
            answers,
            submitter_email: non_blank(submitter_email),
            submitter_name: non_blank(submitter_name),
            ip_address: ip_address.into(),
        }
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Whether `prior` came from the same submitter: same IP, or same email when one was given
pub fn is_same_submitter(prior: &FormResponse, submission: &Submission) -> bool {
    let same_ip = prior.ip_address.as_deref() == Some(submission.ip_address.as_str());
    let same_email = match (&submission.submitter_email, &prior.submitter_email) {
        (Some(given), Some(seen)) => given == seen,
        _ => false,
    };
    same_ip || same_email
}

pub fn ensure_accepting(form: &Form) -> Result<(), Rejection> {
    if form.is_active {
        Ok(())
    } else {
        Err(Rejection::Inactive)
    }
}

/// Every required field must have a non-empty answer
pub fn ensure_required(form: &Form, answers: &Answers) -> Result<(), Rejection> {
    match form
        .required_fields()
        .find(|field| answers.get(&field.id).map_or(true, |a| a.is_empty()))
    {
        Some(field) => Err(Rejection::MissingRequired {
            field_id: field.id.clone(),
            label: field.label.clone(),
        }),
        None => Ok(()),
    }
}

/// Apply the acceptance rules in order and build the response to store.
///
/// `prior` is an earlier response to the same form from this submitter, if the
/// store found one. It is ignored when the form allows multiple submissions.
pub fn accept(
    form: &Form,
    submission: Submission,
    prior: Option<&FormResponse>,
) -> Result<FormResponse, Rejection> {
    ensure_accepting(form)?;

    if !form.settings.allow_multiple_submissions
        && prior.is_some_and(|p| p.form_id == form.id && is_same_submitter(p, &submission))
    {
        return Err(Rejection::Duplicate);
    }

    ensure_required(form, &submission.answers)?;

    let score = scoring::score(form, &submission.answers);

    Ok(FormResponse {
        id: Uuid::new_v4(),
        form_id: form.id,
        responses: submission.answers,
        submitted_at: Utc::now(),
        submitter_email: submission.submitter_email,
        submitter_name: submission.submitter_name,
        score,
        ip_address: Some(submission.ip_address),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        AnswerValue, CorrectAnswer, CreateFormRequest, FieldType, FormField, SettingsPatch,
    };
    use pretty_assertions::assert_eq;

    fn capital_quiz() -> Form {
        let field = FormField::new("capital", FieldType::Radio, "Capital of France?")
            .required()
            .with_options(["Paris", "London"])
            .with_answer(CorrectAnswer::Single("Paris".into()))
            .with_points(1);

        Form::new(
            Uuid::new_v4(),
            CreateFormRequest {
                fields: Some(vec![field]),
                settings: Some(SettingsPatch {
                    is_quiz: Some(true),
                    ..Default::default()
                }),
                ..Default::default()
            },
        )
        .unwrap()
    }

    fn answer(value: &str) -> Submission {
        let mut answers = Answers::new();
        answers.insert("capital".into(), AnswerValue::Text(value.into()));
        Submission::new(answers, None, None, "10.0.0.1")
    }

    #[test]
    fn test_scenario_correct_wrong_and_missing() {
        let form = capital_quiz();

        let right = accept(&form, answer("Paris"), None).unwrap();
        assert_eq!(right.score, Some(1));

        let wrong = accept(&form, answer("London"), None).unwrap();
        assert_eq!(wrong.score, Some(0));

        let empty = Submission::new(Answers::new(), None, None, "10.0.0.2");
        assert_eq!(
            accept(&form, empty, None).unwrap_err(),
            Rejection::MissingRequired {
                field_id: "capital".into(),
                label: "Capital of France?".into()
            }
        );
    }

    #[test]
    fn test_empty_string_counts_as_missing() {
        let form = capital_quiz();
        assert!(matches!(
            accept(&form, answer(""), None),
            Err(Rejection::MissingRequired { .. })
        ));
    }

    #[test]
    fn test_inactive_form_rejects_everything() {
        let mut form = capital_quiz();
        form.is_active = false;

        assert_eq!(accept(&form, answer("Paris"), None).unwrap_err(), Rejection::Inactive);
        let empty = Submission::new(Answers::new(), None, None, "10.0.0.3");
        assert_eq!(accept(&form, empty, None).unwrap_err(), Rejection::Inactive);
    }

    #[test]
    fn test_same_ip_is_duplicate() {
        let form = capital_quiz();
        let first = accept(&form, answer("Paris"), None).unwrap();

        assert_eq!(
            accept(&form, answer("London"), Some(&first)).unwrap_err(),
            Rejection::Duplicate
        );
    }

    #[test]
    fn test_same_email_from_other_ip_is_duplicate() {
        let form = capital_quiz();
        let mut first = answer("Paris");
        first.submitter_email = Some("ada@example.com".into());
        let stored = accept(&form, first, None).unwrap();

        let mut again = answer("Paris");
        again.ip_address = "192.168.1.9".into();
        again.submitter_email = Some("ada@example.com".into());
        assert!(is_same_submitter(&stored, &again));

        again.submitter_email = None;
        assert!(!is_same_submitter(&stored, &again));
    }

    #[test]
    fn test_multiple_submissions_allowed_ignores_prior() {
        let mut form = capital_quiz();
        form.settings.allow_multiple_submissions = true;
        let first = accept(&form, answer("Paris"), None).unwrap();

        assert!(accept(&form, answer("Paris"), Some(&first)).is_ok());
    }

    #[test]
    fn test_non_quiz_response_has_no_score() {
        let mut form = capital_quiz();
        form.settings.is_quiz = false;
        let response = accept(&form, answer("Paris"), None).unwrap();
        assert_eq!(response.score, None);
        assert_eq!(response.ip_address.as_deref(), Some("10.0.0.1"));
    }

    #[test]
    fn test_blank_submitter_email_is_dropped() {
        let submission = Submission::new(Answers::new(), Some("  ".into()), Some(" Ada ".into()), "ip");
        assert_eq!(submission.submitter_email, None);
        assert_eq!(submission.submitter_name.as_deref(), Some("Ada"));
    }
}
