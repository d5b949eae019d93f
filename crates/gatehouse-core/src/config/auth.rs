//! Authentication configuration.

use serde::{Deserialize, Serialize};

/// Token signing, password policy and role derivation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Secret key for token signing (HMAC-SHA256). Empty means unset.
    #[serde(default)]
    pub jwt_secret: String,
    /// Minimum password length, in characters.
    #[serde(default = "default_password_min")]
    pub password_min_length: usize,
    /// Minimum length of a password reset code accepted for lookup.
    #[serde(default = "default_reset_code_min")]
    pub reset_code_min_length: usize,
    /// Email domains whose accounts are granted the `superuser` role.
    #[serde(default)]
    pub privileged_email_domains: Vec<String>,
    /// Header carrying the upstream-resolved session user id.
    #[serde(default = "default_session_user_header")]
    pub session_user_header: String,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: String::new(),
            password_min_length: default_password_min(),
            reset_code_min_length: default_reset_code_min(),
            privileged_email_domains: Vec::new(),
            session_user_header: default_session_user_header(),
        }
    }
}

fn default_password_min() -> usize {
    5
}

fn default_reset_code_min() -> usize {
    6
}

fn default_session_user_header() -> String {
    "x-session-user-id".to_string()
}
