//! Token verification.

use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};

use gatehouse_core::error::AppError;

use super::claims::Claims;

/// Verifies HS256 token signatures and decodes their claims.
#[derive(Clone)]
pub struct JwtDecoder {
    decoding_key: DecodingKey,
    validation: Validation,
}

impl std::fmt::Debug for JwtDecoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtDecoder")
            .field("validation", &self.validation)
            .finish()
    }
}

impl JwtDecoder {
    /// Creates a new decoder for the given HMAC secret.
    pub fn new(secret: &str) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        // Tokens carry no expiry; revocation goes through the credential epoch.
        validation.validate_exp = false;
        validation.required_spec_claims.clear();

        Self {
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        }
    }

    /// Decode and verify a token.
    ///
    /// Every failure (signature, structure, algorithm, claim shape) is
    /// reported as `MalformedToken`.
    pub fn decode(&self, token: &str) -> Result<Claims, AppError> {
        decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::InvalidSignature => {
                    AppError::malformed_token("Invalid token signature")
                }
                jsonwebtoken::errors::ErrorKind::InvalidAlgorithm => {
                    AppError::malformed_token("Invalid token algorithm")
                }
                _ => AppError::malformed_token(format!("Invalid token: {e}")),
            })
    }
}
