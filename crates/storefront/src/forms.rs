//! Validation for the login and registration forms.
//!
//! Input is checked here before any auth call is made; a [`FormError`] is a
//! message for the user, never something the auth container sees.

use shopfront_core::Email;
use thiserror::Error;

use crate::api::RegisterRequest;

/// Minimum password length accepted at registration.
pub const MIN_PASSWORD_LENGTH: usize = 6;

/// A form the user needs to correct.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormError {
    #[error("Please fill in all required fields.")]
    MissingFields,
    #[error("Please enter a valid email address.")]
    InvalidEmail,
    #[error("Password must be at least 6 characters long.")]
    PasswordTooShort,
    #[error("Passwords do not match. Please try again.")]
    PasswordMismatch,
}

/// Login form input.
#[derive(Clone, Default)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

impl LoginForm {
    /// Check that both fields are filled. Returns the trimmed email.
    ///
    /// # Errors
    ///
    /// Returns `FormError::MissingFields` if either field is blank.
    pub fn validate(&self) -> Result<&str, FormError> {
        let email = self.email.trim();
        if email.is_empty() || self.password.is_empty() {
            return Err(FormError::MissingFields);
        }
        Ok(email)
    }
}

/// Registration form input.
#[derive(Clone, Default)]
pub struct RegistrationForm {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
}

impl RegistrationForm {
    /// Validate every field and build the register request.
    ///
    /// # Errors
    ///
    /// Returns the first problem found: blank fields, then the email, then
    /// the confirmation, then the password length.
    pub fn validate(&self) -> Result<RegisterRequest, FormError> {
        let first_name = self.first_name.trim();
        let last_name = self.last_name.trim();
        if first_name.is_empty()
            || last_name.is_empty()
            || self.email.trim().is_empty()
            || self.password.is_empty()
            || self.confirm_password.is_empty()
        {
            return Err(FormError::MissingFields);
        }

        let email = Email::parse(&self.email).map_err(|_| FormError::InvalidEmail)?;

        if self.password != self.confirm_password {
            return Err(FormError::PasswordMismatch);
        }
        if self.password.chars().count() < MIN_PASSWORD_LENGTH {
            return Err(FormError::PasswordTooShort);
        }

        Ok(RegisterRequest {
            first_name: first_name.to_owned(),
            last_name: last_name.to_owned(),
            email: email.into_inner(),
            password: self.password.clone(),
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn registration() -> RegistrationForm {
        RegistrationForm {
            first_name: " Ada ".into(),
            last_name: "Lovelace".into(),
            email: "Ada@Example.com".into(),
            password: "engine1".into(),
            confirm_password: "engine1".into(),
        }
    }

    #[test]
    fn test_login_requires_both_fields() {
        let form = LoginForm {
            email: "  ".into(),
            password: "x".into(),
        };
        assert_eq!(form.validate(), Err(FormError::MissingFields));

        let form = LoginForm {
            email: " demo@example.com ".into(),
            password: "password123".into(),
        };
        assert_eq!(form.validate(), Ok("demo@example.com"));
    }

    #[test]
    fn test_valid_registration() {
        let request = registration().validate().unwrap();
        assert_eq!(request.first_name, "Ada");
        assert_eq!(request.email, "ada@example.com");
    }

    #[test]
    fn test_registration_errors() {
        let mut form = registration();
        form.last_name.clear();
        assert_eq!(form.validate().unwrap_err(), FormError::MissingFields);

        let mut form = registration();
        form.email = "not-an-email".into();
        assert_eq!(form.validate().unwrap_err(), FormError::InvalidEmail);

        let mut form = registration();
        form.password = "abc".into();
        form.confirm_password = "abc".into();
        assert_eq!(form.validate().unwrap_err(), FormError::PasswordTooShort);

        let mut form = registration();
        form.confirm_password = "engine2".into();
        assert_eq!(form.validate().unwrap_err(), FormError::PasswordMismatch);
    }

    #[test]
    fn test_error_messages() {
        assert_eq!(
            FormError::PasswordTooShort.to_string(),
            "Password must be at least 6 characters long."
        );
    }
}
