//! Submission pipeline
//!
//! Validates a candidate response against its form, scores quizzes, and stores the result.

mod acceptance;
mod scoring;

pub use acceptance::{ensure_required, Rejection, Submission};
pub use scoring::score;

use acceptance::accept;
use crate::db::FormStore;
use crate::error::AppError;
use crate::models::{Form, FormResponse};
use tracing::{debug, info};

/// Accept `submission` for `form` and persist it.
///
/// The duplicate lookup only runs when the form restricts submitters to one
/// response. Insertion bumps the form's response counter in the same store call.
pub async fn submit(
    store: &dyn FormStore,
    form: &Form,
    submission: Submission,
) -> Result<FormResponse, AppError> {
    let prior = if form.is_active && !form.settings.allow_multiple_submissions {
        store
            .find_prior_submission(
                form.id,
                &submission.ip_address,
                submission.submitter_email.as_deref(),
            )
            .await?
    } else {
        None
    };

    if prior.is_some() {
        debug!("Prior submission found for form {}", form.id);
    }

    let response = accept(form, submission, prior.as_ref())?;
    store.insert_response(&response).await?;

    info!(
        "Response {} recorded for form {} (score: {:?})",
        response.id, form.id, response.score
    );
    Ok(response)
}
