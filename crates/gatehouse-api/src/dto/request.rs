//! Request DTOs with validation.
//!
//! Only upper length bounds are checked here; password policy, email
//! normalisation and code validity belong to the account service.

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Register and login request body.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CredentialsRequest {
    /// Email address.
    #[serde(default)]
    #[validate(length(max = 254, message = "Email is too long"))]
    pub email: String,
    /// Password.
    #[serde(default)]
    #[validate(length(max = 1024, message = "Password is too long"))]
    pub password: String,
}

/// Session check request body.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CheckRequest {
    /// Bearer token, used when no `Authorization` header is sent.
    #[serde(default)]
    pub token: Option<String>,
}

/// Email verification request body.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct VerifyEmailRequest {
    /// Code from the verification link.
    #[serde(default)]
    #[validate(length(max = 128, message = "Code is too long"))]
    pub code: String,
}

/// Password reset request body.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RequestPasswordResetRequest {
    /// Email address of the account.
    #[serde(default)]
    #[validate(length(max = 254, message = "Email is too long"))]
    pub email: String,
}

/// Password reset completion body.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ResetPasswordRequest {
    /// Email address of the account.
    #[serde(default)]
    #[validate(length(max = 254, message = "Email is too long"))]
    pub email: String,
    /// Code from the reset link.
    #[serde(default)]
    #[validate(length(max = 128, message = "Code is too long"))]
    pub code: String,
    /// New password.
    #[serde(default)]
    #[validate(length(max = 1024, message = "Password is too long"))]
    pub new_password: String,
}

/// Password change request body.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    /// Current password.
    #[serde(default)]
    #[validate(length(max = 1024, message = "Password is too long"))]
    pub old_password: String,
    /// New password.
    #[serde(default)]
    #[validate(length(max = 1024, message = "Password is too long"))]
    pub new_password: String,
}

/// Email change request body.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ChangeEmailRequest {
    /// Current password.
    #[serde(default)]
    #[validate(length(max = 1024, message = "Password is too long"))]
    pub password: String,
    /// New email address.
    #[serde(default)]
    #[validate(length(max = 254, message = "Email is too long"))]
    pub new_email: String,
}

/// Account destruction request body.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct DestroyAccountRequest {
    /// Current password.
    #[serde(default)]
    #[validate(length(max = 1024, message = "Password is too long"))]
    pub password: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_camel_case_fields() {
        let req: ResetPasswordRequest = serde_json::from_str(
            r#"{"email":"a@x.com","code":"abcdefgh","newPassword":"hunter22"}"#,
        )
        .unwrap();
        assert_eq!(req.new_password, "hunter22");
        assert!(req.validate().is_ok());
    }

    #[test]
    fn test_missing_fields_default_to_empty() {
        let req: CredentialsRequest = serde_json::from_str("{}").unwrap();
        assert_eq!(req.email, "");
        assert!(req.validate().is_ok());
    }

    #[test]
    fn test_oversized_password_is_rejected() {
        let req = CredentialsRequest {
            email: "a@x.com".into(),
            password: "x".repeat(2000),
        };
        assert!(req.validate().is_err());
    }
}
