//! RSA signing keys.

use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use super::{AuthConfig, ConfigValidationError};

/// Process-wide RSA key pair for RS256 signing and verification.
#[derive(Clone)]
pub struct RsaKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl std::fmt::Debug for RsaKeys {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RsaKeys").finish_non_exhaustive()
    }
}

#[derive(Serialize, Deserialize)]
struct Probe {
    sub: String,
}

impl RsaKeys {
    /// Load both keys as configured.
    pub fn from_config(config: &AuthConfig) -> Result<Self, ConfigValidationError> {
        let private_pem = config.resolve_private_key()?;
        let public_pem = config.resolve_public_key()?;
        Self::from_pem(private_pem.as_bytes(), public_pem.as_bytes())
    }

    /// Parse a PEM private key (PKCS#1 or PKCS#8) and a PEM public key, and
    /// check that they form a pair.
    pub fn from_pem(private_pem: &[u8], public_pem: &[u8]) -> Result<Self, ConfigValidationError> {
        let encoding =
            EncodingKey::from_rsa_pem(private_pem).map_err(|e| ConfigValidationError::InvalidKey {
                field: "private_key".to_string(),
                reason: e.to_string(),
            })?;
        let decoding =
            DecodingKey::from_rsa_pem(public_pem).map_err(|e| ConfigValidationError::InvalidKey {
                field: "public_key".to_string(),
                reason: e.to_string(),
            })?;

        let keys = Self { encoding, decoding };
        keys.check_pair()?;
        Ok(keys)
    }

    pub fn encoding_key(&self) -> &EncodingKey {
        &self.encoding
    }

    pub fn decoding_key(&self) -> &DecodingKey {
        &self.decoding
    }

    /// Sign a throwaway payload and verify it with the public key.
    fn check_pair(&self) -> Result<(), ConfigValidationError> {
        let probe = Probe {
            sub: "key-pair-check".to_string(),
        };
        let token = encode(&Header::new(Algorithm::RS256), &probe, &self.encoding).map_err(|e| {
            ConfigValidationError::InvalidKey {
                field: "private_key".to_string(),
                reason: e.to_string(),
            }
        })?;

        let mut validation = Validation::new(Algorithm::RS256);
        validation.validate_exp = false;
        validation.validate_aud = false;
        validation.required_spec_claims.clear();

        decode::<Probe>(&token, &self.decoding, &validation)
            .map(|_| ())
            .map_err(|_| ConfigValidationError::KeyPairMismatch)
    }
}
