//! Contact form.

use serde::Deserialize;
use thiserror::Error;
use tracing::{info, instrument};

use crate::backend::{ApiError, BackendClient, ContactRequest};

/// Shown when the backend refuses a message without saying why.
pub const CONTACT_FAILED_FALLBACK: &str = "Failed to send message";

#[derive(Debug, Error)]
pub enum ContactError {
    #[error("{}", .0.join(" "))]
    Validation(Vec<String>),

    #[error("Contact submission failed: {0}")]
    Backend(#[source] ApiError),
}

impl ContactError {
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Validation(problems) => problems.join(" "),
            Self::Backend(err) => err.user_message(CONTACT_FAILED_FALLBACK),
        }
    }
}

/// Contact form fields.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ContactForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub subject: String,
    #[serde(default)]
    pub message: String,
}

impl ContactForm {
    /// # Errors
    ///
    /// Returns [`ContactError::Validation`] naming each blank field.
    pub fn validate(&self) -> Result<(), ContactError> {
        let problems: Vec<String> = [
            ("Name", &self.name),
            ("Email", &self.email),
            ("Subject", &self.subject),
            ("Message", &self.message),
        ]
        .into_iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(label, _)| format!("{label} is required."))
        .collect();

        if problems.is_empty() {
            Ok(())
        } else {
            Err(ContactError::Validation(problems))
        }
    }
}

/// Send a contact-form message.
///
/// # Errors
///
/// Returns a validation or backend error.
#[instrument(skip_all, fields(subject = %form.subject))]
pub async fn send_message(backend: &BackendClient, form: &ContactForm) -> Result<(), ContactError> {
    form.validate()?;
    backend
        .send_contact(&ContactRequest {
            name: form.name.trim().to_string(),
            email: form.email.trim().to_string(),
            subject: form.subject.trim().to_string(),
            message: form.message.trim().to_string(),
        })
        .await
        .map_err(ContactError::Backend)?;
    info!("Contact message sent");
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_validate() {
        let form = ContactForm {
            name: "Asha".to_string(),
            email: "asha@example.com".to_string(),
            subject: "Catering".to_string(),
            message: "Do you cater weddings?".to_string(),
        };
        assert!(form.validate().is_ok());

        let err = ContactForm::default().validate().unwrap_err();
        assert_eq!(
            err.user_message(),
            "Name is required. Email is required. Subject is required. Message is required."
        );
    }

    #[test]
    fn test_fallback_message() {
        assert_eq!(
            ContactError::Backend(ApiError::Rejected(None)).user_message(),
            CONTACT_FAILED_FALLBACK
        );
    }
}
