//! Length policy for new passwords and submitted reset codes.

use gatehouse_core::config::auth::AuthConfig;
use gatehouse_core::error::AppError;

/// Validates passwords and reset codes against configured minimum lengths.
#[derive(Debug, Clone)]
pub struct PasswordValidator {
    min_length: usize,
    reset_code_min_length: usize,
}

impl PasswordValidator {
    /// Creates a new validator from auth configuration.
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            min_length: config.password_min_length,
            reset_code_min_length: config.reset_code_min_length,
        }
    }

    /// Validates a new password. Length is counted in characters, not bytes.
    pub fn validate(&self, password: &str) -> Result<(), AppError> {
        if password.chars().count() < self.min_length {
            return Err(AppError::invalid_input(format!(
                "Password must be at least {} characters long",
                self.min_length
            )));
        }
        Ok(())
    }

    /// Rejects reset codes too short to have been issued.
    pub fn validate_reset_code(&self, code: &str) -> Result<(), AppError> {
        if code.chars().count() < self.reset_code_min_length {
            return Err(AppError::invalid_input(format!(
                "Code must be at least {} characters long",
                self.reset_code_min_length
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gatehouse_core::ErrorKind;

    fn validator() -> PasswordValidator {
        PasswordValidator::new(&AuthConfig::default())
    }

    #[test]
    fn test_minimum_length_boundary() {
        let v = validator();
        assert!(v.validate("abcde").is_ok());
        let err = v.validate("abcd").unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidInput);
    }

    #[test]
    fn test_length_counts_characters() {
        // Five characters, ten bytes.
        assert!(validator().validate("ééééé").is_ok());
    }

    #[test]
    fn test_reset_code_length() {
        let v = validator();
        assert!(v.validate_reset_code("abcdef").is_ok());
        assert_eq!(
            v.validate_reset_code("abc").unwrap_err().kind,
            ErrorKind::InvalidInput
        );
    }
}
