//! Response route handlers
//!
//! Submission is open to anyone the form's access policy admits. Listing and
//! analytics are for the form's owner.

use super::{form::load_form, parse_form_id, ApiJson};
use crate::access::{authorize_owner, authorize_submit};
use crate::analytics::{self, FormAnalytics};
use crate::auth::{Identity, MaybeIdentity};
use crate::error::ApiResult;
use crate::models::{Form, FormResponse, SubmitResponseRequest, SuccessResponse};
use crate::state::SharedState;
use crate::submission::{self, Submission};
use axum::{
    extract::{Extension, Path, State},
    http::{HeaderMap, StatusCode},
    Json,
};
use serde::Serialize;
use tracing::debug;

/// Placeholder address when the client's IP cannot be determined
pub const UNKNOWN_CLIENT: &str = "unknown";

#[derive(Serialize)]
pub struct FormResponses {
    pub form: Form,
    pub responses: Vec<FormResponse>,
}

/// Client address: first `X-Forwarded-For` hop, then `X-Real-IP`
pub fn client_ip(headers: &HeaderMap) -> String {
    let header = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
    };

    header("x-forwarded-for")
        .and_then(|chain| chain.split(',').next())
        .map(str::trim)
        .filter(|hop| !hop.is_empty())
        .or_else(|| header("x-real-ip"))
        .unwrap_or(UNKNOWN_CLIENT)
        .to_string()
}

/// Submit a response to a form
pub async fn submit_response(
    State(state): State<SharedState>,
    MaybeIdentity(caller): MaybeIdentity,
    Path(form_id): Path<String>,
    headers: HeaderMap,
    ApiJson(payload): ApiJson<SubmitResponseRequest>,
) -> ApiResult<(StatusCode, Json<SuccessResponse<FormResponse>>)> {
    let id = parse_form_id(&form_id)?;
    let form = load_form(&state, id).await?;
    authorize_submit(&form, caller.as_ref())?;

    let ip_address = client_ip(&headers);
    debug!(
        "Submission to form {} from {} ({} answers)",
        id,
        ip_address,
        payload.responses.len()
    );

    let submission = Submission::new(
        payload.responses,
        payload.submitter_email,
        payload.submitter_name,
        ip_address,
    );
    let response = submission::submit(state.forms.as_ref(), &form, submission).await?;

    Ok((
        StatusCode::CREATED,
        Json(SuccessResponse::with_data("Response submitted successfully.", response)),
    ))
}

/// List a form's responses, newest first
pub async fn list_responses(
    State(state): State<SharedState>,
    Extension(identity): Extension<Identity>,
    Path(form_id): Path<String>,
) -> ApiResult<Json<SuccessResponse<FormResponses>>> {
    let id = parse_form_id(&form_id)?;
    let form = load_form(&state, id).await?;
    authorize_owner(&form, &identity)?;

    let responses = state.forms.find_responses(id).await?;

    Ok(Json(SuccessResponse::with_data(
        format!("Found {} responses", responses.len()),
        FormResponses { form, responses },
    )))
}

/// Summary statistics over a form's responses
pub async fn form_analytics(
    State(state): State<SharedState>,
    Extension(identity): Extension<Identity>,
    Path(form_id): Path<String>,
) -> ApiResult<Json<SuccessResponse<FormAnalytics>>> {
    let id = parse_form_id(&form_id)?;
    let form = load_form(&state, id).await?;
    authorize_owner(&form, &identity)?;

    let responses = state.forms.find_responses(id).await?;
    let summary = analytics::compute(&form, &responses);

    Ok(Json(SuccessResponse::with_data("Analytics computed", summary)))
}
