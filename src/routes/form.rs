//! Form management route handlers
//!
//! Handles CRUD operations for forms

use super::{parse_form_id, ApiJson};
use crate::access::{authorize_owner, authorize_read};
use crate::auth::{Identity, MaybeIdentity};
use crate::error::{not_found_error, ApiResult};
use crate::models::{CreateFormRequest, Form, FormSummary, SuccessResponse, UpdateFormRequest};
use crate::state::SharedState;
use axum::{
    extract::{Extension, Path, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;
use tracing::{debug, info};
use uuid::Uuid;
use validator::Validate;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeletedForm {
    pub id: Uuid,
    pub deleted_responses: u64,
}

/// Load a form or fail with not found
pub(super) async fn load_form(state: &SharedState, id: Uuid) -> ApiResult<Form> {
    state
        .forms
        .find_form(id)
        .await?
        .ok_or_else(|| not_found_error(format!("Form {} not found", id)))
}

/// List the caller's forms, most recently updated first
pub async fn list_forms(
    State(state): State<SharedState>,
    Extension(identity): Extension<Identity>,
) -> ApiResult<Json<SuccessResponse<Vec<FormSummary>>>> {
    debug!("Listing forms for user: {}", identity.user_id);

    let forms = state.forms.find_forms_by_owner(identity.user_id).await?;
    let summaries: Vec<FormSummary> = forms.into_iter().map(FormSummary::from).collect();

    Ok(Json(SuccessResponse::with_data(
        format!("Found {} forms", summaries.len()),
        summaries,
    )))
}

/// Create a new form owned by the caller
pub async fn create_form(
    State(state): State<SharedState>,
    Extension(identity): Extension<Identity>,
    ApiJson(payload): ApiJson<CreateFormRequest>,
) -> ApiResult<(StatusCode, Json<SuccessResponse<Form>>)> {
    payload.validate()?;

    let form = Form::new(identity.user_id, payload)?;
    state.forms.insert_form(&form).await?;

    info!(
        "Form created: {} (id: {}, {} fields)",
        form.title,
        form.id,
        form.fields.len()
    );

    Ok((
        StatusCode::CREATED,
        Json(SuccessResponse::with_data("Form created successfully.", form)),
    ))
}

/// Read a form. Private forms are visible to their owner only.
pub async fn get_form(
    State(state): State<SharedState>,
    MaybeIdentity(caller): MaybeIdentity,
    Path(form_id): Path<String>,
) -> ApiResult<Json<SuccessResponse<Form>>> {
    let id = parse_form_id(&form_id)?;
    let form = load_form(&state, id).await?;
    authorize_read(&form, caller.as_ref())?;

    Ok(Json(SuccessResponse::with_data("Form found", form)))
}

/// Partially update a form
pub async fn update_form(
    State(state): State<SharedState>,
    Extension(identity): Extension<Identity>,
    Path(form_id): Path<String>,
    ApiJson(payload): ApiJson<UpdateFormRequest>,
) -> ApiResult<Json<SuccessResponse<Form>>> {
    let id = parse_form_id(&form_id)?;
    payload.validate()?;

    let mut form = load_form(&state, id).await?;
    authorize_owner(&form, &identity)?;

    form.apply_update(payload)?;
    if !state.forms.update_form(&form).await? {
        return Err(not_found_error(format!("Form {} not found", id)));
    }

    info!("Form updated: {} (id: {})", form.title, form.id);

    Ok(Json(SuccessResponse::with_data("Form updated successfully.", form)))
}

/// Delete a form together with all of its responses
pub async fn delete_form(
    State(state): State<SharedState>,
    Extension(identity): Extension<Identity>,
    Path(form_id): Path<String>,
) -> ApiResult<Json<SuccessResponse<DeletedForm>>> {
    let id = parse_form_id(&form_id)?;

    let form = load_form(&state, id).await?;
    authorize_owner(&form, &identity)?;

    let deleted_responses = state
        .forms
        .delete_form(id)
        .await?
        .ok_or_else(|| not_found_error(format!("Form {} not found", id)))?;

    info!("Form deleted: {} ({} responses removed)", id, deleted_responses);

    Ok(Json(SuccessResponse::with_data(
        "Form deleted successfully.",
        DeletedForm {
            id,
            deleted_responses,
        },
    )))
}
