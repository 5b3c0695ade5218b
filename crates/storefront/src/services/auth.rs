//! Customer and admin authentication.
//!
//! Credentials are checked by the backend; this module validates the forms
//! before any call and records the issued token in the visitor's store.

use bistro_core::Role;
use secrecy::SecretString;
use serde::Deserialize;
use thiserror::Error;
use tracing::{info, instrument};

use crate::backend::{AdminLoginRequest, ApiError, BackendClient, LoginRequest, SignupRequest};
use crate::storage::DurableStorage;
use crate::store::{Credential, StoreContext, StoreError};

/// Shown when the backend fails without a message.
pub const AUTH_FAILED_FALLBACK: &str = "Something went wrong. Try again.";

/// Minimum password length accepted by the forms.
pub const MIN_PASSWORD_LENGTH: usize = 6;

/// Required length of a signup phone number (digits only).
pub const PHONE_DIGITS: usize = 10;

/// Errors from login and signup.
#[derive(Debug, Error)]
pub enum AuthError {
    /// One or more form fields failed validation; one message per field.
    #[error("{}", .0.join(" "))]
    Validation(Vec<String>),

    #[error("Authentication failed: {0}")]
    Backend(#[source] ApiError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl AuthError {
    /// Text to show on the form.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Validation(messages) => messages.join(" "),
            Self::Backend(err) => err.user_message(AUTH_FAILED_FALLBACK),
            Self::Store(_) => AUTH_FAILED_FALLBACK.to_string(),
        }
    }
}

/// Login form fields.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

impl LoginForm {
    /// Check the fields before contacting the backend.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Validation`] listing every problem.
    pub fn validate(&self) -> Result<(), AuthError> {
        let mut problems = Vec::new();
        check_email(&self.email, &mut problems);
        check_password(&self.password, &mut problems);
        into_result(problems)
    }
}

/// Signup form fields.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SignupForm {
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub password: String,
}

impl SignupForm {
    /// Check the fields before contacting the backend.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Validation`] listing every problem.
    pub fn validate(&self) -> Result<(), AuthError> {
        let mut problems = Vec::new();
        if self.full_name.trim().is_empty() {
            problems.push("Full name is required.".to_string());
        }
        check_email(&self.email, &mut problems);
        let phone = self.phone.trim();
        if phone.is_empty() {
            problems.push("Phone number is required.".to_string());
        } else if phone.len() != PHONE_DIGITS || !phone.chars().all(|c| c.is_ascii_digit()) {
            problems.push(format!("Phone number must be {PHONE_DIGITS} digits."));
        }
        check_password(&self.password, &mut problems);
        into_result(problems)
    }
}

fn check_email(email: &str, problems: &mut Vec<String>) {
    if email.trim().is_empty() {
        problems.push("Email is required.".to_string());
    }
}

fn check_password(password: &str, problems: &mut Vec<String>) {
    if password.is_empty() {
        problems.push("Password is required.".to_string());
    } else if password.chars().count() < MIN_PASSWORD_LENGTH {
        problems.push(format!(
            "Password must be at least {MIN_PASSWORD_LENGTH} characters."
        ));
    }
}

fn into_result(problems: Vec<String>) -> Result<(), AuthError> {
    if problems.is_empty() {
        Ok(())
    } else {
        Err(AuthError::Validation(problems))
    }
}

/// Log a customer in and record the token.
///
/// # Errors
///
/// Returns a validation, backend or storage error.
#[instrument(skip_all)]
pub async fn login<S: DurableStorage>(
    store: &mut StoreContext<S>,
    backend: &BackendClient,
    form: &LoginForm,
) -> Result<(), AuthError> {
    form.validate()?;

    let response = backend
        .login(&LoginRequest {
            email: form.email.trim().to_string(),
            password: form.password.clone(),
        })
        .await
        .map_err(AuthError::Backend)?;

    record_login(store, response.token, Role::User, response.user).await?;
    info!("Customer logged in");
    Ok(())
}

/// Register a customer account. The visitor logs in separately afterwards.
///
/// # Errors
///
/// Returns a validation or backend error.
#[instrument(skip_all)]
pub async fn signup(backend: &BackendClient, form: &SignupForm) -> Result<(), AuthError> {
    form.validate()?;

    backend
        .signup(&SignupRequest {
            full_name: form.full_name.trim().to_string(),
            email: form.email.trim().to_string(),
            phone: form.phone.trim().to_string(),
            password: form.password.clone(),
        })
        .await
        .map_err(AuthError::Backend)?;

    info!("Customer account created");
    Ok(())
}

/// Log an admin in and record the token with the admin role.
///
/// # Errors
///
/// Returns a validation, backend or storage error.
#[instrument(skip_all)]
pub async fn admin_login<S: DurableStorage>(
    store: &mut StoreContext<S>,
    backend: &BackendClient,
    form: &LoginForm,
) -> Result<(), AuthError> {
    let mut problems = Vec::new();
    check_email(&form.email, &mut problems);
    if form.password.is_empty() {
        problems.push("Password is required.".to_string());
    }
    into_result(problems)?;

    let response = backend
        .admin_login(&AdminLoginRequest {
            email: form.email.trim().to_string(),
            password: form.password.clone(),
        })
        .await
        .map_err(AuthError::Backend)?;

    record_login(store, response.token, Role::Admin, None).await?;
    info!("Admin logged in");
    Ok(())
}

async fn record_login<S: DurableStorage>(
    store: &mut StoreContext<S>,
    token: Option<String>,
    role: Role,
    profile: Option<serde_json::Value>,
) -> Result<(), AuthError> {
    // The client only returns responses that carry a token.
    let token = token.ok_or(AuthError::Backend(ApiError::MissingField("token")))?;
    store
        .login(Credential {
            token: SecretString::from(token),
            role,
            profile,
        })
        .await?;
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn problems(result: Result<(), AuthError>) -> Vec<String> {
        match result {
            Err(AuthError::Validation(p)) => p,
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn test_login_form_valid() {
        let form = LoginForm {
            email: "asha@example.com".to_string(),
            password: "secret1".to_string(),
        };
        assert!(form.validate().is_ok());
    }

    #[test]
    fn test_login_form_short_password() {
        let form = LoginForm {
            email: "asha@example.com".to_string(),
            password: "12345".to_string(),
        };
        assert_eq!(
            problems(form.validate()),
            vec!["Password must be at least 6 characters."]
        );
    }

    #[test]
    fn test_login_form_empty() {
        let p = problems(LoginForm::default().validate());
        assert_eq!(p, vec!["Email is required.", "Password is required."]);
    }

    #[test]
    fn test_signup_form_phone_rules() {
        let mut form = SignupForm {
            full_name: "Asha Rao".to_string(),
            email: "asha@example.com".to_string(),
            phone: "98765".to_string(),
            password: "secret1".to_string(),
        };
        assert_eq!(problems(form.validate()), vec!["Phone number must be 10 digits."]);

        form.phone = "98765abcde".to_string();
        assert!(form.validate().is_err());

        form.phone = "9876543210".to_string();
        assert!(form.validate().is_ok());
    }

    #[test]
    fn test_signup_requires_name() {
        let form = SignupForm {
            full_name: "  ".to_string(),
            email: "asha@example.com".to_string(),
            phone: "9876543210".to_string(),
            password: "secret1".to_string(),
        };
        assert_eq!(problems(form.validate()), vec!["Full name is required."]);
    }

    #[test]
    fn test_user_message_fallback() {
        let err = AuthError::Backend(ApiError::Timeout);
        assert_eq!(err.user_message(), AUTH_FAILED_FALLBACK);

        let err = AuthError::Backend(ApiError::Rejected(Some("Invalid credentials".to_string())));
        assert_eq!(err.user_message(), "Invalid credentials");
    }
}
