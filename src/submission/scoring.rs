//! Quiz scoring
//!
//! Sums the points of every correctly answered question. Only quiz forms are scored.

use crate::models::{AnswerValue, Answers, CorrectAnswer, Form, FormField};
use tracing::debug;

/// Total score for `answers`, or `None` when the form is not a quiz
pub fn score(form: &Form, answers: &Answers) -> Option<u32> {
    if !form.settings.is_quiz {
        return None;
    }

    let total: u32 = form
        .fields
        .iter()
        .filter_map(|field| {
            let answer = answers.get(&field.id).filter(|a| !a.is_empty())?;
            Some(award(field, answer))
        })
        .fold(0u32, |total, points| total.saturating_add(points));

    debug!("Scored quiz {}: {} points", form.id, total);
    Some(total)
}

/// Points earned by a single answer
fn award(field: &FormField, answer: &AnswerValue) -> u32 {
    let correct = match &field.correct_answer {
        Some(CorrectAnswer::Single(expected)) if expected.is_empty() => return 0,
        Some(correct) => correct,
        None => return 0,
    };

    let is_correct = match (correct, answer) {
        // Same size and every pick is a correct option
        (CorrectAnswer::Set(expected), AnswerValue::Choices(picked)) => {
            picked.len() == expected.len() && picked.iter().all(|p| expected.contains(p))
        }
        (CorrectAnswer::Single(expected), AnswerValue::Text(given)) => given == expected,
        _ => false,
    };

    if is_correct {
        field.points()
    } else {
        0
    }
}
