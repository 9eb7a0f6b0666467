//! Response analytics
//!
//! Summaries shown on a form's results page, computed from its stored responses.

use crate::models::{format_number, AnswerValue, FieldType, Form, FormField, FormResponse};
use crate::submission::ensure_required;
use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use std::collections::BTreeMap;

/// Number of distinct submission days reported
const DAYS_REPORTED: usize = 7;

/// Number of sample answers kept per free-text field
const SAMPLE_SIZE: usize = 5;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyCount {
    pub date: NaiveDate,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldAnalytics {
    pub field_id: String,
    pub field_label: String,
    pub field_type: FieldType,
    /// Responses with a non-empty answer to this field
    pub response_count: usize,
    /// Answer bucket → occurrences
    pub breakdown: BTreeMap<String, usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub average_rating: Option<f64>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub sample_responses: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FormAnalytics {
    pub total_responses: usize,
    /// Quiz forms only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub average_score: Option<f64>,
    /// Mean over every numeric answer to a rating field
    #[serde(skip_serializing_if = "Option::is_none")]
    pub average_rating: Option<f64>,
    /// Percentage of responses answering every required field
    pub completion_rate: f64,
    /// Ascending, at most the last seven days that saw a submission
    pub responses_per_day: Vec<DailyCount>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latest_submission: Option<DateTime<Utc>>,
    pub fields: Vec<FieldAnalytics>,
}

fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}

/// Rating answers are numbers; numeric strings count too
fn rating_value(answer: &AnswerValue) -> Option<f64> {
    match answer {
        AnswerValue::Number(n) => Some(*n),
        AnswerValue::Text(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn star_label(value: f64) -> String {
    let plural = if value == 1.0 { "" } else { "s" };
    format!("{} Star{}", format_number(value), plural)
}

fn field_analytics(field: &FormField, responses: &[FormResponse]) -> Option<FieldAnalytics> {
    let answers: Vec<&AnswerValue> = responses.iter().filter_map(|r| r.answer(&field.id)).collect();
    if answers.is_empty() {
        return None;
    }

    let mut breakdown = BTreeMap::new();
    let mut average_rating = None;
    let mut sample_responses = Vec::new();

    match field.field_type {
        FieldType::Checkbox => {
            for answer in &answers {
                match answer {
                    AnswerValue::Choices(picks) => {
                        for pick in picks {
                            *breakdown.entry(pick.clone()).or_insert(0) += 1;
                        }
                    }
                    other => *breakdown.entry(other.display()).or_insert(0) += 1,
                }
            }
        }
        FieldType::Rating => {
            let values: Vec<f64> = answers.iter().filter_map(|a| rating_value(a)).collect();
            for value in &values {
                *breakdown.entry(star_label(*value)).or_insert(0) += 1;
            }
            average_rating = mean(&values);
        }
        kind if kind.is_single_choice() => {
            for answer in &answers {
                *breakdown.entry(answer.display()).or_insert(0) += 1;
            }
        }
        kind if kind.is_free_text() => {
            breakdown.insert("Total Responses".to_string(), answers.len());
            sample_responses = answers.iter().take(SAMPLE_SIZE).map(|a| a.display()).collect();
        }
        _ => {}
    }

    Some(FieldAnalytics {
        field_id: field.id.clone(),
        field_label: field.label.clone(),
        field_type: field.field_type,
        response_count: answers.len(),
        breakdown,
        average_rating,
        sample_responses,
    })
}

/// Summarize `responses` (as returned by the store, newest first) against `form`
pub fn compute(form: &Form, responses: &[FormResponse]) -> FormAnalytics {
    let total = responses.len();

    let average_score = if form.settings.is_quiz {
        let scores: Vec<f64> = responses
            .iter()
            .filter_map(|r| r.score)
            .map(f64::from)
            .collect();
        mean(&scores)
    } else {
        None
    };

    let ratings: Vec<f64> = form
        .fields
        .iter()
        .filter(|f| f.field_type == FieldType::Rating)
        .flat_map(|f| responses.iter().filter_map(move |r| r.answer(&f.id)))
        .filter_map(rating_value)
        .collect();

    let complete = responses
        .iter()
        .filter(|r| ensure_required(form, &r.responses).is_ok())
        .count();
    let completion_rate = if total == 0 {
        0.0
    } else {
        complete as f64 / total as f64 * 100.0
    };

    let mut per_day: BTreeMap<NaiveDate, usize> = BTreeMap::new();
    for response in responses {
        *per_day.entry(response.submitted_at.date_naive()).or_insert(0) += 1;
    }
    let skip = per_day.len().saturating_sub(DAYS_REPORTED);
    let responses_per_day = per_day
        .into_iter()
        .skip(skip)
        .map(|(date, count)| DailyCount { date, count })
        .collect();

    FormAnalytics {
        total_responses: total,
        average_score,
        average_rating: mean(&ratings),
        completion_rate,
        responses_per_day,
        latest_submission: responses.iter().map(|r| r.submitted_at).max(),
        fields: form
            .fields
            .iter()
            .filter_map(|f| field_analytics(f, responses))
            .collect(),
    }
}
