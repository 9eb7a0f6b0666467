//! Authentication route handlers
//!
//! Register, login, logout, current user and profile updates.

use super::ApiJson;
use crate::auth::{hash_password, verify_password, Identity, SESSION_COOKIE};
use crate::error::{ApiResult, AppError};
use crate::models::{
    normalize_email, LoginRequest, MessageResponse, RegisterRequest, SuccessResponse,
    UpdateProfileRequest, User, UserResponse,
};
use crate::state::SharedState;
use axum::{
    extract::{Extension, State},
    http::StatusCode,
    Json,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use chrono::Utc;
use serde::Serialize;
use tracing::{debug, info, warn};
use uuid::Uuid;
use validator::Validate;

/// User plus the session token also set as a cookie
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionPayload {
    pub user: UserResponse,
    pub token: String,
    pub expires_in: i64,
}

fn session_cookie(state: &SharedState, token: String) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, token))
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(state.cookie_secure)
        .path("/")
        .build()
}

/// Issue a token for `user` and attach it to the cookie jar
fn start_session(
    state: &SharedState,
    jar: CookieJar,
    user: &User,
) -> ApiResult<(CookieJar, SessionPayload)> {
    let token = state.sessions.issue(user.id, &user.email)?;
    let jar = jar.add(session_cookie(state, token.clone()));
    Ok((
        jar,
        SessionPayload {
            user: UserResponse::from(user),
            token,
            expires_in: state.sessions.ttl_seconds(),
        },
    ))
}

/// POST /api/auth/register
pub async fn register(
    State(state): State<SharedState>,
    jar: CookieJar,
    ApiJson(mut req): ApiJson<RegisterRequest>,
) -> ApiResult<(StatusCode, CookieJar, Json<SuccessResponse<SessionPayload>>)> {
    req.email = normalize_email(&req.email);
    req.name = req.name.trim().to_string();
    req.validate()?;

    debug!("Registering account for {}", req.email);

    // Check if email already exists
    if state.users.find_user_by_email(&req.email).await?.is_some() {
        return Err(AppError::Conflict("Email already registered".to_string()));
    }

    let password_hash = hash_password(&req.password)?;

    let now = Utc::now();
    let user = User {
        id: Uuid::new_v4(),
        email: req.email,
        password_hash,
        name: req.name,
        created_at: now,
        updated_at: now,
    };
    state.users.create_user(&user).await?;

    info!("User registered: {} (id: {})", user.email, user.id);

    let (jar, payload) = start_session(&state, jar, &user)?;
    Ok((
        StatusCode::CREATED,
        jar,
        Json(SuccessResponse::with_data("Registration successful", payload)),
    ))
}

/// POST /api/auth/login
pub async fn login(
    State(state): State<SharedState>,
    jar: CookieJar,
    ApiJson(req): ApiJson<LoginRequest>,
) -> ApiResult<(CookieJar, Json<SuccessResponse<SessionPayload>>)> {
    req.validate()?;
    let email = normalize_email(&req.email);

    let invalid = || AppError::Unauthorized("Invalid email or password".to_string());

    let user = match state.users.find_user_by_email(&email).await? {
        Some(user) => user,
        None => {
            warn!("Login attempt for unknown email {}", email);
            return Err(invalid());
        }
    };

    if !verify_password(&req.password, &user.password_hash)? {
        warn!("Wrong password for {}", email);
        return Err(invalid());
    }

    info!("User logged in: {}", user.email);

    let (jar, payload) = start_session(&state, jar, &user)?;
    Ok((jar, Json(SuccessResponse::with_data("Login successful", payload))))
}

/// POST /api/auth/logout
pub async fn logout(jar: CookieJar) -> (CookieJar, Json<MessageResponse>) {
    let jar = jar.remove(Cookie::build(SESSION_COOKIE).path("/"));
    (jar, Json(MessageResponse::new("Logged out")))
}

/// GET /api/auth/me
pub async fn me(
    State(state): State<SharedState>,
    Extension(identity): Extension<Identity>,
) -> ApiResult<Json<SuccessResponse<UserResponse>>> {
    let user = state
        .users
        .find_user_by_id(identity.user_id)
        .await?
        .ok_or_else(|| AppError::Unauthorized("User not found".to_string()))?;

    Ok(Json(SuccessResponse::with_data(
        "Current user",
        UserResponse::from(&user),
    )))
}

/// PUT /api/auth/profile
///
/// Name and email changes apply directly. A password change needs the current password.
/// When the email changes, a fresh session is issued for the new address.
pub async fn update_profile(
    State(state): State<SharedState>,
    Extension(identity): Extension<Identity>,
    jar: CookieJar,
    ApiJson(mut req): ApiJson<UpdateProfileRequest>,
) -> ApiResult<(CookieJar, Json<SuccessResponse<UserResponse>>)> {
    req.email = req.email.as_deref().map(normalize_email);
    req.name = req.name.map(|n| n.trim().to_string());
    req.validate()?;

    let mut user = state
        .users
        .find_user_by_id(identity.user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    if let Some(name) = req.name {
        user.name = name;
    }

    let email_changed = matches!(&req.email, Some(email) if *email != user.email);
    if let Some(email) = req.email.filter(|_| email_changed) {
        if let Some(other) = state.users.find_user_by_email(&email).await? {
            if other.id != user.id {
                return Err(AppError::Conflict("Email already exists".to_string()));
            }
        }
        user.email = email;
    }

    if let Some(new_password) = req.new_password {
        let current = req.current_password.ok_or_else(|| AppError::InvalidField {
            field: "currentPassword".to_string(),
            message: "Current password is required".to_string(),
        })?;
        if !verify_password(&current, &user.password_hash)? {
            return Err(AppError::InvalidField {
                field: "currentPassword".to_string(),
                message: "Current password is incorrect".to_string(),
            });
        }
        user.password_hash = hash_password(&new_password)?;
    }

    user.updated_at = Utc::now();
    state.users.update_user(&user).await?;

    info!("Profile updated for user {}", user.id);

    let jar = if email_changed {
        let token = state.sessions.issue(user.id, &user.email)?;
        jar.add(session_cookie(&state, token))
    } else {
        jar
    };

    Ok((
        jar,
        Json(SuccessResponse::with_data(
            "Profile updated successfully",
            UserResponse::from(&user),
        )),
    ))
}
