//! Response models
//!
//! A response is one submitter's answers to a form. Immutable once stored.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

/// A single answer. The shape depends on the field type but is not enforced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AnswerValue {
    Text(String),
    Number(f64),
    Choices(Vec<String>),
    Empty,
    /// Any other JSON (booleans, numeric lists, objects), stored as given
    Other(serde_json::Value),
}

impl AnswerValue {
    /// Null, empty string, or empty selection
    pub fn is_empty(&self) -> bool {
        match self {
            AnswerValue::Text(s) => s.is_empty(),
            AnswerValue::Choices(c) => c.is_empty(),
            AnswerValue::Number(_) => false,
            AnswerValue::Empty => true,
            AnswerValue::Other(value) => match value {
                serde_json::Value::Array(items) => items.is_empty(),
                serde_json::Value::Object(map) => map.is_empty(),
                _ => false,
            },
        }
    }

    /// Human-readable rendering used by analytics buckets
    pub fn display(&self) -> String {
        match self {
            AnswerValue::Text(s) => s.clone(),
            AnswerValue::Number(n) => format_number(*n),
            AnswerValue::Choices(c) => c.join(", "),
            AnswerValue::Empty => String::new(),
            AnswerValue::Other(value) => value.to_string(),
        }
    }
}

/// Render whole numbers without a trailing `.0`
pub fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        n.to_string()
    }
}

/// Field id → answer
pub type Answers = BTreeMap<String, AnswerValue>;

/// A stored submission
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormResponse {
    pub id: Uuid,
    pub form_id: Uuid,
    pub responses: Answers,
    pub submitted_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub submitter_email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub submitter_name: Option<String>,
    /// Present iff the form was a quiz at submission time
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ip_address: Option<String>,
}

impl FormResponse {
    pub fn answer(&self, field_id: &str) -> Option<&AnswerValue> {
        self.responses.get(field_id).filter(|a| !a.is_empty())
    }
}

/// Request body of a submission
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitResponseRequest {
    #[serde(default)]
    pub responses: Answers,
    pub submitter_email: Option<String>,
    pub submitter_name: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_answer_shapes_deserialize() {
        let answers: Answers = serde_json::from_value(serde_json::json!({
            "name": "Ada",
            "rating": 4,
            "features": ["Dashboard", "Reports"],
            "comments": null
        }))
        .unwrap();

        assert_eq!(answers["name"], AnswerValue::Text("Ada".into()));
        assert_eq!(answers["rating"], AnswerValue::Number(4.0));
        assert_eq!(
            answers["features"],
            AnswerValue::Choices(vec!["Dashboard".into(), "Reports".into()])
        );
        assert_eq!(answers["comments"], AnswerValue::Empty);
    }

    #[test]
    fn test_other_json_answers_are_kept() {
        let answers: Answers = serde_json::from_value(serde_json::json!({
            "agree": true,
            "scores": [1, 2],
            "none": []
        }))
        .unwrap();

        assert_eq!(answers["agree"], AnswerValue::Other(serde_json::json!(true)));
        assert_eq!(answers["scores"], AnswerValue::Other(serde_json::json!([1, 2])));
        assert_eq!(answers["agree"].display(), "true");
        assert!(!answers["agree"].is_empty());
        assert!(answers["none"].is_empty());
    }

    #[test]
    fn test_emptiness() {
        assert!(AnswerValue::Empty.is_empty());
        assert!(AnswerValue::Text(String::new()).is_empty());
        assert!(AnswerValue::Choices(vec![]).is_empty());
        assert!(!AnswerValue::Number(0.0).is_empty());
        assert!(!AnswerValue::Text(" ".into()).is_empty());
    }

    #[test]
    fn test_display() {
        assert_eq!(AnswerValue::Number(5.0).display(), "5");
        assert_eq!(AnswerValue::Number(4.5).display(), "4.5");
        assert_eq!(
            AnswerValue::Choices(vec!["a".into(), "b".into()]).display(),
            "a, b"
        );
    }

    #[test]
    fn test_score_omitted_when_absent() {
        let response = FormResponse {
            id: Uuid::new_v4(),
            form_id: Uuid::new_v4(),
            responses: Answers::new(),
            submitted_at: Utc::now(),
            submitter_email: None,
            submitter_name: None,
            score: None,
            ip_address: None,
        };
        let json = serde_json::to_value(&response).unwrap();
        assert!(json.get("score").is_none());
        assert!(json.get("formId").is_some());
    }
}
