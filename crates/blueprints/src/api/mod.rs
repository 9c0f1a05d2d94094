//! HTTP API module.
//!
//! Provides the login endpoint and the scope-protected blueprint endpoints.

mod error;
mod handlers;
mod routes;
mod state;

pub use error::{ApiError, ApiResult, ErrorResponse};
pub use handlers::{HealthResponse, LoginRequest};
pub use routes::create_router;
pub use state::AppState;
