//! Authentication state and the per-route scope gate.

use std::sync::Arc;

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header::AUTHORIZATION, request::Parts},
    middleware::Next,
    response::Response,
};
use log::{debug, warn};

use super::{
    AuthConfig, AuthError, Claims, ConfigValidationError, CredentialValidator, IssuedToken,
    RsaKeys, TokenIssuer, TokenVerifier, UserRegistry,
};

/// Extract a Bearer token from an Authorization header value.
fn bearer_token_from_header(header_value: &str) -> Result<&str, AuthError> {
    let mut parts = header_value.split_whitespace();
    let scheme = parts.next().ok_or(AuthError::InvalidAuthHeader)?;

    if !scheme.eq_ignore_ascii_case("bearer") {
        return Err(AuthError::InvalidAuthHeader);
    }

    let token = parts.next().ok_or(AuthError::InvalidAuthHeader)?;
    if token.is_empty() {
        return Err(AuthError::InvalidAuthHeader);
    }

    if parts.next().is_some() {
        return Err(AuthError::InvalidAuthHeader);
    }

    Ok(token)
}

/// Authentication state shared across handlers.
#[derive(Clone)]
pub struct AuthState {
    config: Arc<AuthConfig>,
    credentials: Arc<dyn CredentialValidator>,
    issuer: TokenIssuer,
    verifier: TokenVerifier,
}

impl AuthState {
    /// Create auth state from config, loading the configured key pair.
    pub fn new(config: AuthConfig) -> Result<Self, ConfigValidationError> {
        config.validate()?;
        let keys = RsaKeys::from_config(&config)?;
        Self::with_keys(config, &keys)
    }

    /// Create auth state from config and an already loaded key pair.
    pub fn with_keys(config: AuthConfig, keys: &RsaKeys) -> Result<Self, ConfigValidationError> {
        config.validate()?;
        let credentials = UserRegistry::new(&config.users);
        Ok(Self::from_parts(config, Arc::new(credentials), keys))
    }

    /// Create auth state with a custom credential validator.
    pub fn from_parts(
        config: AuthConfig,
        credentials: Arc<dyn CredentialValidator>,
        keys: &RsaKeys,
    ) -> Self {
        let issuer = TokenIssuer::new(config.issuer.clone(), config.ttl_seconds(), keys);
        let verifier = TokenVerifier::new(&config.issuer, keys);

        Self {
            config: Arc::new(config),
            credentials,
            issuer,
            verifier,
        }
    }

    pub fn config(&self) -> &AuthConfig {
        &self.config
    }

    /// Get allowed CORS origins from config.
    pub fn allowed_origins(&self) -> &[String] {
        &self.config.allowed_origins
    }

    pub fn issuer(&self) -> &TokenIssuer {
        &self.issuer
    }

    pub fn verifier(&self) -> &TokenVerifier {
        &self.verifier
    }

    /// Check a username/password pair against the registry.
    pub fn is_valid(&self, username: &str, password: &str) -> bool {
        self.credentials.is_valid(username, password)
    }

    /// Validate credentials and issue a token.
    pub fn login(&self, username: &str, password: &str) -> Result<IssuedToken, AuthError> {
        if !self.is_valid(username, password) {
            warn!("Rejected login for user '{}'", username);
            return Err(AuthError::InvalidCredentials);
        }
        self.issuer.issue(username)
    }

    /// Validate a JWT token.
    pub fn validate_token(&self, token: &str) -> Result<Claims, AuthError> {
        self.verifier.verify(token)
    }

    /// Run the full gate for an Authorization header value: bearer syntax,
    /// signature, issuer, expiry, then the required scope.
    pub fn authorize(
        &self,
        auth_header: Option<&str>,
        gate: &ScopeGate,
    ) -> Result<Claims, AuthError> {
        let header = auth_header.ok_or(AuthError::MissingAuthHeader)?;
        let token = bearer_token_from_header(header)?;
        let claims = self.validate_token(token)?;
        gate.check(&claims)?;
        Ok(claims)
    }
}

/// A protected operation's single required scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScopeGate {
    required: &'static str,
}

impl ScopeGate {
    pub const fn new(required: &'static str) -> Self {
        Self { required }
    }

    pub fn required(&self) -> &'static str {
        self.required
    }

    /// Allow iff the verified claims carry the required scope.
    pub fn check(&self, claims: &Claims) -> Result<(), AuthError> {
        if claims.has_scope(self.required) {
            Ok(())
        } else {
            Err(AuthError::InsufficientScope {
                required: self.required.to_string(),
            })
        }
    }
}

/// State for one `require_scope` layer.
#[derive(Clone)]
pub struct ScopeGuard {
    auth: AuthState,
    gate: ScopeGate,
}

impl ScopeGuard {
    pub fn new(auth: AuthState, required: &'static str) -> Self {
        Self {
            auth,
            gate: ScopeGate::new(required),
        }
    }
}

/// Authenticated user extracted from request.
#[derive(Debug, Clone)]
pub struct CurrentUser {
    /// User claims.
    pub claims: Claims,
}

impl CurrentUser {
    /// Get the username.
    pub fn id(&self) -> &str {
        &self.claims.sub
    }
}

impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<CurrentUser>()
            .cloned()
            .ok_or(AuthError::MissingAuthHeader)
    }
}

/// Scope gate middleware.
///
/// Verifies the bearer token and its scope before the handler runs, and
/// injects `CurrentUser` into request extensions.
pub async fn require_scope(
    State(guard): State<ScopeGuard>,
    mut req: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let auth_header = req
        .headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok());

    let claims = guard
        .auth
        .authorize(auth_header, &guard.gate)
        .inspect_err(|e| {
            debug!(
                "Denied {} {} (requires {}): {}",
                req.method(),
                req.uri().path(),
                guard.gate.required(),
                e
            );
        })?;

    req.extensions_mut().insert(CurrentUser { claims });

    Ok(next.run(req).await)
}
