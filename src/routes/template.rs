//! Template catalog route handlers

use super::ApiJson;
use crate::auth::Identity;
use crate::error::{not_found_error, ApiResult};
use crate::models::{Form, SuccessResponse};
use crate::state::SharedState;
use crate::templates::{self, FormTemplate};
use axum::{
    extract::{Extension, Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::info;

#[derive(Serialize)]
pub struct TemplateList {
    pub templates: &'static [FormTemplate],
    pub total: usize,
}

#[derive(Serialize)]
pub struct TemplateEntry {
    pub template: &'static FormTemplate,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateLookup {
    pub template_id: String,
}

fn find_template(id: &str) -> ApiResult<&'static FormTemplate> {
    templates::find(id).ok_or_else(|| not_found_error(format!("Template '{}' not found", id)))
}

/// GET /api/templates
pub async fn list_templates() -> Json<SuccessResponse<TemplateList>> {
    let templates = templates::all();
    Json(SuccessResponse::with_data(
        format!("Found {} templates", templates.len()),
        TemplateList {
            templates,
            total: templates.len(),
        },
    ))
}

/// POST /api/templates
pub async fn lookup_template(
    ApiJson(payload): ApiJson<TemplateLookup>,
) -> ApiResult<Json<SuccessResponse<TemplateEntry>>> {
    let template = find_template(&payload.template_id)?;
    Ok(Json(SuccessResponse::with_data(
        "Template found",
        TemplateEntry { template },
    )))
}

/// POST /api/templates/{id}/instantiate
pub async fn instantiate_template(
    State(state): State<SharedState>,
    Extension(identity): Extension<Identity>,
    Path(template_id): Path<String>,
) -> ApiResult<(StatusCode, Json<SuccessResponse<Form>>)> {
    let template = find_template(&template_id)?;
    let form = template.instantiate(identity.user_id);
    state.forms.insert_form(&form).await?;

    info!(
        "Form {} created from template '{}' for user {}",
        form.id, template.id, identity.user_id
    );

    Ok((
        StatusCode::CREATED,
        Json(SuccessResponse::with_data("Form created from template.", form)),
    ))
}
