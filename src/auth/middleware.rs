//! Authentication middleware
//!
//! Resolves the session token from the `auth-token` cookie or a bearer header.

use super::{Identity, SessionKeys};
use crate::error::AppError;
use crate::state::SharedState;
use axum::{
    extract::{FromRequestParts, Request, State},
    http::{request::Parts, HeaderMap},
    middleware::Next,
    response::Response,
};
use axum_extra::extract::cookie::CookieJar;
use axum_extra::headers::{authorization::Bearer, Authorization, HeaderMapExt};
use tracing::debug;

/// Name of the session cookie
pub const SESSION_COOKIE: &str = "auth-token";

/// Session tokens carried by the request, cookie first
fn session_tokens(headers: &HeaderMap) -> Vec<String> {
    let jar = CookieJar::from_headers(headers);
    let cookie = jar
        .get(SESSION_COOKIE)
        .map(|c| c.value().to_string())
        .filter(|v| !v.is_empty());
    let bearer = headers
        .typed_get::<Authorization<Bearer>>()
        .map(|auth| auth.token().to_string());

    cookie.into_iter().chain(bearer).collect()
}

/// Resolve the caller from the first token that verifies.
/// A stale cookie does not shadow a valid bearer header.
pub fn resolve_identity(headers: &HeaderMap, keys: &SessionKeys) -> Result<Option<Identity>, AppError> {
    let mut failure = None;
    for token in session_tokens(headers) {
        match keys.verify(&token) {
            Ok(claims) => return Ok(Some(Identity::from(claims))),
            Err(e) => {
                debug!("Session token rejected: {}", e);
                failure.get_or_insert(e);
            }
        }
    }
    failure.map_or(Ok(None), Err)
}

/// Reject requests without a valid session; handlers read the caller via `Extension<Identity>`
pub async fn require_auth(
    State(state): State<SharedState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let identity = resolve_identity(request.headers(), &state.sessions)?
        .ok_or_else(|| AppError::Unauthorized("Authentication required".to_string()))?;

    debug!("Authenticated request from user {}", identity.user_id);
    request.extensions_mut().insert(identity);

    Ok(next.run(request).await)
}

/// Caller identity on routes that serve anonymous callers too.
/// An invalid or expired token counts as anonymous.
#[derive(Debug, Clone)]
pub struct MaybeIdentity(pub Option<Identity>);

impl FromRequestParts<SharedState> for MaybeIdentity {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &SharedState,
    ) -> Result<Self, Self::Rejection> {
        let identity = resolve_identity(&parts.headers, &state.sessions).unwrap_or_else(|e| {
            debug!("Ignoring session token: {}", e);
            None
        });
        Ok(MaybeIdentity(identity))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::header::{AUTHORIZATION, COOKIE};
    use axum::http::HeaderValue;
    use uuid::Uuid;

    fn keys() -> SessionKeys {
        SessionKeys::new("middleware-test", 1)
    }

    #[test]
    fn test_no_token_is_anonymous() {
        let identity = resolve_identity(&HeaderMap::new(), &keys()).unwrap();
        assert!(identity.is_none());
    }

    #[test]
    fn test_bearer_header_resolves() {
        let keys = keys();
        let user_id = Uuid::new_v4();
        let token = keys.issue(user_id, "ada@example.com").unwrap();

        let mut headers = HeaderMap::new();
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", token)).unwrap(),
        );

        let identity = resolve_identity(&headers, &keys).unwrap().unwrap();
        assert_eq!(identity.user_id, user_id);
        assert_eq!(identity.email, "ada@example.com");
    }

    #[test]
    fn test_cookie_wins_over_bearer() {
        let keys = keys();
        let cookie_user = Uuid::new_v4();
        let bearer_user = Uuid::new_v4();
        let cookie_token = keys.issue(cookie_user, "c@example.com").unwrap();
        let bearer_token = keys.issue(bearer_user, "b@example.com").unwrap();

        let mut headers = HeaderMap::new();
        headers.insert(
            COOKIE,
            HeaderValue::from_str(&format!("theme=dark; {}={}", SESSION_COOKIE, cookie_token)).unwrap(),
        );
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", bearer_token)).unwrap(),
        );

        let identity = resolve_identity(&headers, &keys).unwrap().unwrap();
        assert_eq!(identity.user_id, cookie_user);
    }

    #[test]
    fn test_stale_cookie_falls_back_to_bearer() {
        let keys = keys();
        let expired = SessionKeys::new("middleware-test", -1)
            .issue(Uuid::new_v4(), "old@example.com")
            .unwrap();
        let user_id = Uuid::new_v4();
        let bearer_token = keys.issue(user_id, "b@example.com").unwrap();

        let mut headers = HeaderMap::new();
        headers.insert(
            COOKIE,
            HeaderValue::from_str(&format!("{}={}", SESSION_COOKIE, expired)).unwrap(),
        );
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", bearer_token)).unwrap(),
        );

        let identity = resolve_identity(&headers, &keys).unwrap().unwrap();
        assert_eq!(identity.user_id, user_id);
    }

    #[test]
    fn test_stale_cookie_alone_is_error() {
        let mut headers = HeaderMap::new();
        headers.insert(
            COOKIE,
            HeaderValue::from_str(&format!("{}=not-a-jwt", SESSION_COOKIE)).unwrap(),
        );
        assert!(resolve_identity(&headers, &keys()).is_err());
    }

    #[test]
    fn test_garbage_token_is_error() {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer not-a-jwt"));
        assert!(resolve_identity(&headers, &keys()).is_err());
    }
}
