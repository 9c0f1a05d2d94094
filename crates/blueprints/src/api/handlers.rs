//! API request handlers.

use axum::{
    Json,
    body::Bytes,
    extract::State,
    http::Uri,
};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use tracing::{info, instrument};

use crate::auth::{CurrentUser, IssuedToken};
use crate::blueprint::{self, BlueprintSummary, CreateBlueprintRequest};

use super::error::{ApiError, ApiResult};
use super::state::AppState;

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

/// Health check endpoint.
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Parse an optional JSON body. An empty body yields the default value.
fn parse_optional_json<T>(body: &Bytes) -> ApiResult<T>
where
    T: DeserializeOwned + Default,
{
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(T::default());
    }
    serde_json::from_slice(body).map_err(|e| ApiError::bad_request(e.to_string()))
}

// ============================================================================
// Authentication Handlers
// ============================================================================

/// Login request. Missing or null fields count as empty strings.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct LoginRequest {
    pub username: Option<String>,
    pub password: Option<String>,
}

/// Login endpoint.
#[instrument(skip(state, body))]
pub async fn login(State(state): State<AppState>, body: Bytes) -> ApiResult<Json<IssuedToken>> {
    let request: LoginRequest = parse_optional_json(&body)?;
    let username = request.username.unwrap_or_default();
    let password = request.password.unwrap_or_default();

    let issued = state.auth.login(&username, &password)?;

    info!(user = %username, expires_in = issued.expires_in, "Issued access token");
    Ok(Json(issued))
}

// ============================================================================
// Blueprint Handlers
// ============================================================================

/// List all blueprints.
#[instrument(skip(user), fields(user = %user.id()))]
pub async fn list_blueprints(user: CurrentUser) -> Json<Vec<BlueprintSummary>> {
    Json(blueprint::catalog())
}

/// Create a blueprint. The body and its `name` are optional.
#[instrument(skip(user, body), fields(user = %user.id()))]
pub async fn create_blueprint(user: CurrentUser, body: Bytes) -> ApiResult<Json<BlueprintSummary>> {
    let request: CreateBlueprintRequest = parse_optional_json(&body)?;
    let created = blueprint::create(request);
    info!(name = %created.name, "Created blueprint");
    Ok(Json(created))
}

/// Fallback for unknown routes.
pub async fn not_found(uri: Uri) -> ApiError {
    ApiError::not_found(uri.path().to_string())
}
