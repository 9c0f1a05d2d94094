//! Authentication and authorization errors.

use axum::{
    Json,
    http::{HeaderValue, StatusCode, header::WWW_AUTHENTICATE},
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

/// Authentication errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    /// Missing authorization header.
    #[error("missing authorization header")]
    MissingAuthHeader,

    /// Invalid authorization header format.
    #[error("invalid authorization header format")]
    InvalidAuthHeader,

    /// Invalid token (bad signature, malformed, wrong issuer).
    #[error("invalid token: {0}")]
    InvalidToken(String),

    /// Token expired.
    #[error("token expired")]
    TokenExpired,

    /// Token is valid but does not carry the scope the operation requires.
    #[error("token lacks required scope {required}")]
    InsufficientScope { required: String },

    /// Invalid credentials at login.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// Internal error.
    #[error("internal auth error: {0}")]
    Internal(String),
}

impl AuthError {
    /// HTTP status for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            AuthError::MissingAuthHeader
            | AuthError::InvalidAuthHeader
            | AuthError::InvalidToken(_)
            | AuthError::TokenExpired
            | AuthError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            AuthError::InsufficientScope { .. } => StatusCode::FORBIDDEN,
            AuthError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Machine readable error code.
    pub fn error_code(&self) -> &'static str {
        match self {
            AuthError::MissingAuthHeader => "missing_auth_header",
            AuthError::InvalidAuthHeader => "invalid_auth_header",
            AuthError::InvalidToken(_) | AuthError::TokenExpired => "invalid_token",
            AuthError::InsufficientScope { .. } => "insufficient_scope",
            AuthError::InvalidCredentials => "invalid_credentials",
            AuthError::Internal(_) => "internal_error",
        }
    }

    /// Whether this is an authentication failure (401) rather than an
    /// authorization failure (403) or a server fault.
    pub fn is_authentication_failure(&self) -> bool {
        self.status_code() == StatusCode::UNAUTHORIZED
    }

    /// RFC 6750 challenge for protected resource responses.
    ///
    /// Login failures and internal errors carry no challenge.
    fn challenge(&self) -> Option<String> {
        match self {
            AuthError::MissingAuthHeader => Some("Bearer".to_string()),
            AuthError::InvalidAuthHeader => {
                Some("Bearer error=\"invalid_request\"".to_string())
            }
            AuthError::InvalidToken(_) | AuthError::TokenExpired => Some(format!(
                "Bearer error=\"invalid_token\", error_description=\"{}\"",
                challenge_escape(&self.to_string())
            )),
            AuthError::InsufficientScope { required } => Some(format!(
                "Bearer error=\"insufficient_scope\", error_description=\"{}\", scope=\"{}\"",
                challenge_escape(&self.to_string()),
                challenge_escape(required)
            )),
            AuthError::InvalidCredentials | AuthError::Internal(_) => None,
        }
    }
}

fn challenge_escape(value: &str) -> String {
    value.replace(['"', '\\'], "'")
}

/// Error response body.
#[derive(Debug, Serialize)]
pub struct AuthErrorResponse {
    pub error: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_description: Option<String>,
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        // Login failures answer with the bare code only.
        let error_description = match &self {
            AuthError::InvalidCredentials => None,
            other => Some(other.to_string()),
        };

        let body = Json(AuthErrorResponse {
            error: self.error_code(),
            error_description,
        });

        let mut response = (status, body).into_response();
        if let Some(value) = self
            .challenge()
            .and_then(|c| HeaderValue::from_str(&c).ok())
        {
            response.headers_mut().insert(WWW_AUTHENTICATE, value);
        }
        response
    }
}
