//! Test utilities and common setup.

use axum::Router;
use blueprints::api;
use blueprints::auth::{AuthConfig, AuthState, Claims, RsaKeys, Scopes};
use chrono::Utc;
use jsonwebtoken::{Algorithm, EncodingKey, Header, encode};

const PRIVATE_PEM: &str = include_str!("../../keys/private.pem");
const PUBLIC_PEM: &str = include_str!("../../keys/public.pem");
const FOREIGN_PRIVATE_PEM: &str = include_str!("../fixtures/foreign_private.pem");

/// Load the development key pair shipped with the crate.
pub fn test_keys() -> RsaKeys {
    RsaKeys::from_pem(PRIVATE_PEM.as_bytes(), PUBLIC_PEM.as_bytes()).unwrap()
}

/// Auth state with the default users and issuer.
pub fn test_auth_state() -> AuthState {
    AuthState::with_keys(AuthConfig::default(), &test_keys()).unwrap()
}

/// Create a test application with the default configuration.
pub fn test_app() -> Router {
    test_app_with_state(test_auth_state())
}

pub fn test_app_with_state(auth_state: AuthState) -> Router {
    api::create_router(api::AppState::new(auth_state))
}

/// Create a test application and return a freshly issued token for `student`.
pub fn test_app_with_token() -> (Router, String) {
    let auth_state = test_auth_state();
    let token = auth_state
        .login("student", "student123")
        .unwrap()
        .access_token;
    (test_app_with_state(auth_state), token)
}

/// Claims as the server would issue them right now, with `scope` replaced.
pub fn claims_with_scope(auth_state: &AuthState, scope: &str) -> Claims {
    let now = Utc::now().timestamp();
    Claims {
        iss: auth_state.config().issuer.clone(),
        iat: now,
        exp: now + 3600,
        sub: "student".to_string(),
        scope: Some(Scopes::parse(scope)),
        scp: None,
    }
}

/// Sign claims with the server's own key.
pub fn sign(auth_state: &AuthState, claims: &Claims) -> String {
    auth_state.issuer().sign(claims).unwrap()
}

/// Sign an arbitrary JSON payload with the server's own key.
pub fn sign_json(payload: &serde_json::Value) -> String {
    let key = EncodingKey::from_rsa_pem(PRIVATE_PEM.as_bytes()).unwrap();
    encode(&Header::new(Algorithm::RS256), payload, &key).unwrap()
}

/// Sign claims with a key pair the server does not trust.
pub fn sign_foreign(claims: &Claims) -> String {
    let key = EncodingKey::from_rsa_pem(FOREIGN_PRIVATE_PEM.as_bytes()).unwrap();
    encode(&Header::new(Algorithm::RS256), claims, &key).unwrap()
}
