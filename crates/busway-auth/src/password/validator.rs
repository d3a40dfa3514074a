//! Password policy enforcement for new passwords.

use busway_core::config::AuthConfig;
use busway_core::error::AppError;

/// Longest accepted password; Argon2 input stays bounded.
const MAX_LENGTH: usize = 128;

/// Validates new passwords against the configured policy.
#[derive(Debug, Clone)]
pub struct PasswordValidator {
    min_length: usize,
}

impl PasswordValidator {
    /// Creates a new validator from auth configuration.
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            min_length: config.password_min_length,
        }
    }

    /// Validates a password, reporting the first violation found.
    pub fn validate(&self, password: &str) -> Result<(), AppError> {
        let len = password.chars().count();
        if len < self.min_length {
            return Err(AppError::validation(format!(
                "Password must be at least {} characters long",
                self.min_length
            )));
        }
        if len > MAX_LENGTH {
            return Err(AppError::validation(format!(
                "Password must be at most {MAX_LENGTH} characters long"
            )));
        }
        if password.trim().is_empty() {
            return Err(AppError::validation("Password must not be blank"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn enforces_minimum_length() {
        let validator = PasswordValidator::new(&AuthConfig::default());
        assert!(validator.validate("abc12").is_err());
        assert!(validator.validate("abc123").is_ok());
        assert!(validator.validate("      ").is_err());
    }
}
