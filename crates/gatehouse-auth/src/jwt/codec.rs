//! Token codec: issue and verify bearer tokens for users.

use gatehouse_core::config::auth::AuthConfig;
use gatehouse_core::error::AppError;
use gatehouse_entity::user::User;

use super::claims::Claims;
use super::decoder::JwtDecoder;
use super::encoder::JwtEncoder;

/// Issues and verifies stateless bearer tokens.
///
/// Construction never fails: with no signing secret configured, every
/// `issue` and `verify` call returns a `Configuration` error instead.
#[derive(Debug, Clone)]
pub struct TokenCodec {
    keys: Option<(JwtEncoder, JwtDecoder)>,
}

impl TokenCodec {
    /// Creates a codec from auth configuration.
    pub fn new(config: &AuthConfig) -> Self {
        Self::from_secret(&config.jwt_secret)
    }

    /// Creates a codec for the given secret. An empty secret means unset.
    pub fn from_secret(secret: &str) -> Self {
        let keys = if secret.is_empty() {
            None
        } else {
            Some((JwtEncoder::new(secret), JwtDecoder::new(secret)))
        };
        Self { keys }
    }

    /// Whether a signing secret is configured.
    pub fn is_configured(&self) -> bool {
        self.keys.is_some()
    }

    fn keys(&self) -> Result<&(JwtEncoder, JwtDecoder), AppError> {
        self.keys
            .as_ref()
            .ok_or_else(|| AppError::configuration("Token signing secret is not configured"))
    }

    /// Issue a token embedding the user's id, email and current credential epoch.
    pub fn issue(&self, user: &User) -> Result<String, AppError> {
        let (encoder, _) = self.keys()?;
        encoder.encode(&Claims::for_user(user))
    }

    /// Verify a token's signature and structure and return its claims.
    ///
    /// Performs no store access; epoch checks belong to the caller.
    pub fn verify(&self, token: &str) -> Result<Claims, AppError> {
        let (_, decoder) = self.keys()?;
        decoder.decode(token)
    }
}
