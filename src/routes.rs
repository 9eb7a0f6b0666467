//! Route definitions and router setup
//!
//! Configures all API routes and middleware.

mod auth;
mod form;
mod response;
mod template;

use crate::auth::require_auth;
use crate::config::CorsConfig;
use crate::error::AppError;
use crate::state::SharedState;
use axum::{
    extract::FromRequest,
    http::{header, Method},
    middleware,
    routing::{delete, get, post, put},
    Router,
};
use std::time::Duration;
use tower::ServiceBuilder;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    request_id::MakeRequestUuid,
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
    ServiceBuilderExt,
};
use tracing::Level;
use uuid::Uuid;

/// JSON request body; malformed bodies render as [`AppError`] JSON
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct ApiJson<T>(pub T);

/// Parse a form id path segment
fn parse_form_id(raw: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(raw).map_err(|_| AppError::BadRequest("Invalid form ID format".to_string()))
}

/// Create the application router with all routes and middleware
pub fn create_router(state: SharedState, cors: &CorsConfig) -> Router {
    // Build CORS layer
    let cors = build_cors_layer(cors);

    // Build tracing/logging layer
    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
        .on_request(DefaultOnRequest::new().level(Level::INFO))
        .on_response(DefaultOnResponse::new().level(Level::INFO));

    // Build middleware stack
    let middleware = ServiceBuilder::new()
        .set_x_request_id(MakeRequestUuid)
        .layer(trace_layer)
        .layer(CompressionLayer::new())
        .layer(cors)
        .propagate_x_request_id();

    // Applied per method so one path can mix anonymous and owner-only methods
    let session = middleware::from_fn_with_state(state.clone(), require_auth);

    Router::new()
        // Health check
        .route("/health", get(health_check))

        // Authentication routes
        .route("/api/auth/register", post(auth::register))
        .route("/api/auth/login", post(auth::login))
        .route("/api/auth/logout", post(auth::logout))
        .route("/api/auth/me", get(auth::me).route_layer(session.clone()))
        .route(
            "/api/auth/profile",
            put(auth::update_profile).route_layer(session.clone()),
        )

        // Form routes
        .route(
            "/api/forms",
            get(form::list_forms)
                .post(form::create_form)
                .route_layer(session.clone()),
        )
        .route(
            "/api/forms/{id}",
            get(form::get_form).merge(
                put(form::update_form)
                    .merge(delete(form::delete_form))
                    .route_layer(session.clone()),
            ),
        )

        // Response routes
        .route(
            "/api/forms/{id}/responses",
            post(response::submit_response)
                .merge(get(response::list_responses).route_layer(session.clone())),
        )
        .route(
            "/api/forms/{id}/analytics",
            get(response::form_analytics).route_layer(session.clone()),
        )

        // Template routes
        .route(
            "/api/templates",
            get(template::list_templates).post(template::lookup_template),
        )
        .route(
            "/api/templates/{id}/instantiate",
            post(template::instantiate_template).route_layer(session),
        )

        // Apply middleware and state
        .layer(middleware)
        .with_state(state)
}

/// Build CORS layer from settings
fn build_cors_layer(config: &CorsConfig) -> CorsLayer {
    let origins: Vec<_> = config
        .allowed_origins
        .iter()
        .filter_map(|s| s.parse().ok())
        .collect();

    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION, header::ACCEPT])
        .max_age(Duration::from_secs(3600));

    if origins.is_empty() {
        layer.allow_origin(Any)
    } else {
        // Cookies only travel with explicit origins
        layer.allow_origin(origins).allow_credentials(true)
    }
}

/// Health check endpoint
async fn health_check() -> axum::Json<serde_json::Value> {
    axum::Json(serde_json::json!({
        "success": true,
        "message": "Server is running fine.",
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "version": env!("CARGO_PKG_VERSION")
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::SessionKeys;
    use crate::db::MemoryStore;
    use crate::state::AppState;
    use axum::{
        body::{to_bytes, Body},
        http::{Request, StatusCode},
    };
    use pretty_assertions::assert_eq;
    use serde_json::{json, Value};
    use std::sync::Arc;
    use tower::ServiceExt;

    fn app() -> Router {
        let store = Arc::new(MemoryStore::new());
        let state = Arc::new(AppState::new(
            store.clone(),
            store,
            SessionKeys::new("router-test-secret", 1),
            false,
        ));
        create_router(state, &CorsConfig::default())
    }

    async fn call(
        app: &Router,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, value)
    }

    async fn register(app: &Router, email: &str) -> String {
        let (status, body) = call(
            app,
            Method::POST,
            "/api/auth/register",
            None,
            Some(json!({"email": email, "password": "hunter22", "name": "Tester"})),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED, "{}", body);
        body["data"]["token"].as_str().unwrap().to_string()
    }

    async fn create_form(app: &Router, token: &str, body: Value) -> String {
        let (status, created) = call(app, Method::POST, "/api/forms", Some(token), Some(body)).await;
        assert_eq!(status, StatusCode::CREATED, "{}", created);
        created["data"]["id"].as_str().unwrap().to_string()
    }

    fn quiz() -> Value {
        json!({
            "title": "Capitals",
            "fields": [{
                "id": "capital",
                "type": "radio",
                "label": "Capital of France?",
                "required": true,
                "options": ["Paris", "London"],
                "correctAnswer": "Paris",
                "points": 1
            }],
            "settings": {"isQuiz": true}
        })
    }

    #[tokio::test]
    async fn test_health() {
        let (status, body) = call(&app(), Method::GET, "/health", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], json!(true));
    }

    #[tokio::test]
    async fn test_create_then_read_round_trip() {
        let app = app();
        let token = register(&app, "owner@example.com").await;
        let id = create_form(&app, &token, quiz()).await;

        let (status, body) = call(&app, Method::GET, &format!("/api/forms/{}", id), None, None).await;
        assert_eq!(status, StatusCode::OK);
        let form = &body["data"];
        assert_eq!(form["title"], json!("Capitals"));
        assert_eq!(form["fields"][0]["id"], json!("capital"));
        assert_eq!(form["fields"][0]["correctAnswer"], json!("Paris"));
        assert_eq!(form["settings"]["isQuiz"], json!(true));
        assert_eq!(form["settings"]["showProgressBar"], json!(true));
        assert_eq!(form["settings"]["allowMultipleSubmissions"], json!(false));
        assert_eq!(form["isActive"], json!(true));
    }

    #[tokio::test]
    async fn test_quiz_submission_scored_and_duplicate_rejected() {
        let app = app();
        let token = register(&app, "owner@example.com").await;
        let id = create_form(&app, &token, quiz()).await;
        let uri = format!("/api/forms/{}/responses", id);

        let (status, body) = call(
            &app,
            Method::POST,
            &uri,
            None,
            Some(json!({"responses": {"capital": "Paris"}})),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED, "{}", body);
        assert_eq!(body["data"]["score"], json!(1));

        // Same (unknown) client address
        let (status, body) = call(
            &app,
            Method::POST,
            &uri,
            None,
            Some(json!({"responses": {"capital": "London"}})),
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["code"], json!("DUPLICATE_SUBMISSION"));

        let (status, body) = call(&app, Method::GET, &uri, Some(&token), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["responses"].as_array().unwrap().len(), 1);
        assert_eq!(body["data"]["form"]["responseCount"], json!(1));
    }

    #[tokio::test]
    async fn test_missing_required_answer_names_field() {
        let app = app();
        let token = register(&app, "owner@example.com").await;
        let id = create_form(&app, &token, quiz()).await;

        let (status, body) = call(
            &app,
            Method::POST,
            &format!("/api/forms/{}/responses", id),
            None,
            Some(json!({"responses": {}})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["field"], json!("capital"));
    }

    #[tokio::test]
    async fn test_boolean_answer_is_stored() {
        let app = app();
        let token = register(&app, "owner@example.com").await;
        let id = create_form(
            &app,
            &token,
            json!({
                "title": "Consent",
                "fields": [{"id": "agree", "type": "checkbox", "label": "I agree", "options": ["Yes"]}]
            }),
        )
        .await;
        let uri = format!("/api/forms/{}/responses", id);

        let (status, body) = call(
            &app,
            Method::POST,
            &uri,
            None,
            Some(json!({"responses": {"agree": true}})),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED, "{}", body);

        let (_, listed) = call(&app, Method::GET, &uri, Some(&token), None).await;
        assert_eq!(listed["data"]["responses"][0]["responses"]["agree"], json!(true));
    }

    #[tokio::test]
    async fn test_malformed_body_renders_json_error() {
        let app = app();
        let token = register(&app, "owner@example.com").await;
        let id = create_form(&app, &token, quiz()).await;

        let (status, body) = call(
            &app,
            Method::POST,
            &format!("/api/forms/{}/responses", id),
            None,
            Some(json!({"responses": "not-a-map"})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], json!(false));
        assert_eq!(body["code"], json!("BAD_REQUEST"));
    }

    #[tokio::test]
    async fn test_inactive_form_rejects_submissions() {
        let app = app();
        let token = register(&app, "owner@example.com").await;
        let id = create_form(&app, &token, quiz()).await;

        let (status, _) = call(
            &app,
            Method::PUT,
            &format!("/api/forms/{}", id),
            Some(&token),
            Some(json!({"isActive": false})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let (status, body) = call(
            &app,
            Method::POST,
            &format!("/api/forms/{}/responses", id),
            None,
            Some(json!({"responses": {"capital": "Paris"}})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], json!("FORM_CLOSED"));
    }

    #[tokio::test]
    async fn test_delete_cascades_to_responses() {
        let app = app();
        let token = register(&app, "owner@example.com").await;
        let id = create_form(&app, &token, quiz()).await;

        let (status, _) = call(
            &app,
            Method::POST,
            &format!("/api/forms/{}/responses", id),
            None,
            Some(json!({"responses": {"capital": "Paris"}})),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);

        let (status, body) =
            call(&app, Method::DELETE, &format!("/api/forms/{}", id), Some(&token), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["deletedResponses"], json!(1));

        let (status, _) = call(
            &app,
            Method::GET,
            &format!("/api/forms/{}/responses", id),
            Some(&token),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_ownership_rules() {
        let app = app();
        let owner = register(&app, "owner@example.com").await;
        let stranger = register(&app, "stranger@example.com").await;

        let mut private = quiz();
        private["settings"]["isPublic"] = json!(false);
        let id = create_form(&app, &owner, private).await;
        let form_uri = format!("/api/forms/{}", id);

        let (status, _) = call(&app, Method::GET, &form_uri, None, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        let (status, _) = call(&app, Method::GET, &form_uri, Some(&stranger), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        let (status, _) = call(&app, Method::GET, &form_uri, Some(&owner), None).await;
        assert_eq!(status, StatusCode::OK);

        let (status, _) = call(&app, Method::DELETE, &form_uri, None, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        let (status, body) = call(&app, Method::DELETE, &form_uri, Some(&stranger), None).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["code"], json!("FORBIDDEN"));

        let (status, _) = call(
            &app,
            Method::GET,
            &format!("/api/forms/{}/analytics", id),
            Some(&stranger),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let missing = format!("/api/forms/{}", Uuid::new_v4());
        let (status, _) = call(&app, Method::DELETE, &missing, Some(&stranger), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_invalid_form_id() {
        let (status, body) = call(&app(), Method::GET, "/api/forms/not-a-uuid", None, None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], json!("BAD_REQUEST"));
    }

    #[tokio::test]
    async fn test_register_login_and_me() {
        let app = app();
        register(&app, "Ada@Example.com").await;

        let (status, _) = call(
            &app,
            Method::POST,
            "/api/auth/register",
            None,
            Some(json!({"email": "ada@example.com", "password": "hunter22", "name": "Ada"})),
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);

        let (status, _) = call(
            &app,
            Method::POST,
            "/api/auth/login",
            None,
            Some(json!({"email": "ada@example.com", "password": "wrong-password"})),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (status, body) = call(
            &app,
            Method::POST,
            "/api/auth/login",
            None,
            Some(json!({"email": "ADA@example.com", "password": "hunter22"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let token = body["data"]["token"].as_str().unwrap().to_string();

        let (status, body) = call(&app, Method::GET, "/api/auth/me", Some(&token), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["email"], json!("ada@example.com"));

        let (status, _) = call(&app, Method::GET, "/api/auth/me", None, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_profile_password_change_needs_current_password() {
        let app = app();
        let token = register(&app, "ada@example.com").await;

        let (status, body) = call(
            &app,
            Method::PUT,
            "/api/auth/profile",
            Some(&token),
            Some(json!({"newPassword": "new-secret", "currentPassword": "nope"})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["field"], json!("currentPassword"));

        let (status, body) = call(
            &app,
            Method::PUT,
            "/api/auth/profile",
            Some(&token),
            Some(json!({"name": "Ada L.", "newPassword": "new-secret", "currentPassword": "hunter22"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["name"], json!("Ada L."));

        let (status, _) = call(
            &app,
            Method::POST,
            "/api/auth/login",
            None,
            Some(json!({"email": "ada@example.com", "password": "new-secret"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_templates() {
        let app = app();
        let (status, body) = call(&app, Method::GET, "/api/templates", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["total"], json!(7));

        let (status, body) = call(
            &app,
            Method::POST,
            "/api/templates",
            None,
            Some(json!({"templateId": "contact-form"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["template"]["title"], json!("Contact Us Form"));

        let (status, _) = call(
            &app,
            Method::POST,
            "/api/templates",
            None,
            Some(json!({"templateId": "missing"})),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let token = register(&app, "owner@example.com").await;
        let (status, body) = call(
            &app,
            Method::POST,
            "/api/templates/quiz-template/instantiate",
            Some(&token),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["data"]["settings"]["isQuiz"], json!(true));

        let (_, listed) = call(&app, Method::GET, "/api/forms", Some(&token), None).await;
        assert_eq!(listed["data"].as_array().unwrap().len(), 1);
        assert_eq!(listed["data"][0]["status"], json!("active"));
    }
}
