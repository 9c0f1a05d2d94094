//! Application state shared across handlers.

use crate::auth::AuthState;

/// Application state.
#[derive(Clone)]
pub struct AppState {
    /// Token issuance and verification.
    pub auth: AuthState,
}

impl AppState {
    pub fn new(auth: AuthState) -> Self {
        Self { auth }
    }
}
