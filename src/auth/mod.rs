//! Authentication
//!
//! Session tokens, password hashing and the identity checks applied to requests.

mod jwt;
mod middleware;
mod password;

pub use jwt::{Claims, SessionKeys};
pub use middleware::{require_auth, resolve_identity, MaybeIdentity, SESSION_COOKIE};
pub use password::{hash_password, verify_password};

use uuid::Uuid;

/// The authenticated caller
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub user_id: Uuid,
    pub email: String,
}

impl From<Claims> for Identity {
    fn from(claims: Claims) -> Self {
        Self {
            user_id: claims.sub,
            email: claims.email,
        }
    }
}
