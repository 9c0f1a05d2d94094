//! Authentication module.
//!
//! Provides:
//! - credential checks against a fixed user registry
//! - RS256 token issuance and verification
//! - a scope gate middleware for protected routes

mod claims;
mod config;
mod credentials;
mod error;
mod keys;
mod middleware;
mod token;

pub use claims::{Claims, SCOPE_BLUEPRINTS_READ, SCOPE_BLUEPRINTS_WRITE, Scopes};
pub use config::{AuthConfig, ConfigValidationError, DEFAULT_TOKEN_TTL_SECONDS, UserCredential};
pub use credentials::{CredentialValidator, UserRegistry};
pub use error::{AuthError, AuthErrorResponse};
pub use keys::RsaKeys;
pub use middleware::{AuthState, CurrentUser, ScopeGate, ScopeGuard, require_scope};
pub use token::{IssuedToken, TOKEN_TYPE_BEARER, TokenIssuer, TokenVerifier};
