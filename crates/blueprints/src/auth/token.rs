//! Token issuance and verification.

use chrono::{DateTime, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use log::debug;
use serde::{Deserialize, Serialize};

use super::{AuthError, Claims, RsaKeys, Scopes};

/// Token type reported to clients.
pub const TOKEN_TYPE_BEARER: &str = "Bearer";

/// Result of a successful login.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssuedToken {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: u64,
}

/// Mints RS256 tokens for validated users.
#[derive(Clone)]
pub struct TokenIssuer {
    issuer: String,
    ttl_seconds: u64,
    encoding_key: EncodingKey,
}

impl TokenIssuer {
    pub fn new(issuer: impl Into<String>, ttl_seconds: u64, keys: &RsaKeys) -> Self {
        Self {
            issuer: issuer.into(),
            ttl_seconds,
            encoding_key: keys.encoding_key().clone(),
        }
    }

    pub fn ttl_seconds(&self) -> u64 {
        self.ttl_seconds
    }

    /// Issue a token for `username`. Credentials must already be checked.
    pub fn issue(&self, username: &str) -> Result<IssuedToken, AuthError> {
        self.issue_at(username, Utc::now())
    }

    /// Issue a token as if the current time were `now`.
    pub fn issue_at(&self, username: &str, now: DateTime<Utc>) -> Result<IssuedToken, AuthError> {
        let iat = now.timestamp();
        let claims = Claims {
            iss: self.issuer.clone(),
            iat,
            exp: iat.saturating_add_unsigned(self.ttl_seconds),
            sub: username.to_string(),
            scope: Some(Scopes::granted()),
            scp: None,
        };

        Ok(IssuedToken {
            access_token: self.sign(&claims)?,
            token_type: TOKEN_TYPE_BEARER.to_string(),
            expires_in: self.ttl_seconds,
        })
    }

    /// Sign an arbitrary claim set with the process key.
    pub fn sign(&self, claims: &Claims) -> Result<String, AuthError> {
        encode(&Header::new(Algorithm::RS256), claims, &self.encoding_key)
            .map_err(|e| AuthError::Internal(e.to_string()))
    }
}

/// Checks signature, issuer and expiry of presented tokens.
#[derive(Clone)]
pub struct TokenVerifier {
    decoding_key: DecodingKey,
    validation: Validation,
}

impl TokenVerifier {
    pub fn new(issuer: &str, keys: &RsaKeys) -> Self {
        let mut validation = Validation::new(Algorithm::RS256);
        // Expiry is checked against an explicit clock in `verify_at`.
        validation.validate_exp = false;
        validation.validate_nbf = false;
        validation.validate_aud = false;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "iss", "sub"]);
        validation.set_issuer(&[issuer]);

        Self {
            decoding_key: keys.decoding_key().clone(),
            validation,
        }
    }

    pub fn verify(&self, token: &str) -> Result<Claims, AuthError> {
        self.verify_at(token, Utc::now())
    }

    /// Verify a token as if the current time were `now`.
    ///
    /// Valid while `now < exp`.
    pub fn verify_at(&self, token: &str, now: DateTime<Utc>) -> Result<Claims, AuthError> {
        let token_data =
            decode::<Claims>(token, &self.decoding_key, &self.validation).map_err(|e| {
                debug!("JWT validation failed: {:?}", e);
                match e.kind() {
                    ErrorKind::ExpiredSignature => AuthError::TokenExpired,
                    ErrorKind::InvalidSignature => {
                        AuthError::InvalidToken("signature mismatch".to_string())
                    }
                    ErrorKind::InvalidIssuer => {
                        AuthError::InvalidToken("unexpected issuer".to_string())
                    }
                    ErrorKind::InvalidAlgorithm => {
                        AuthError::InvalidToken("unsupported algorithm".to_string())
                    }
                    _ => AuthError::InvalidToken(e.to_string()),
                }
            })?;

        let claims = token_data.claims;
        if now.timestamp() >= claims.exp {
            return Err(AuthError::TokenExpired);
        }

        Ok(claims)
    }
}
