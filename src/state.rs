//! Application state management
//!
//! Contains shared state accessible across all handlers.

use crate::auth::SessionKeys;
use crate::db::{FormStore, UserStore};
use std::sync::Arc;

/// Application state shared across all handlers
pub struct AppState {
    /// Forms and responses
    pub forms: Arc<dyn FormStore>,

    /// Accounts
    pub users: Arc<dyn UserStore>,

    /// Session token signing keys
    pub sessions: SessionKeys,

    /// Mark the session cookie `Secure`
    pub cookie_secure: bool,
}

impl AppState {
    pub fn new(
        forms: Arc<dyn FormStore>,
        users: Arc<dyn UserStore>,
        sessions: SessionKeys,
        cookie_secure: bool,
    ) -> Self {
        Self {
            forms,
            users,
            sessions,
            cookie_secure,
        }
    }
}

/// Type alias for shared state
pub type SharedState = Arc<AppState>;
