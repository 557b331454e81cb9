//! Custom error types for the common library
//!
//! This module defines the error taxonomy shared by every client that talks
//! to the back-office REST API.

use std::collections::BTreeMap;
use std::fmt;

use reqwest::StatusCode;
use thiserror::Error;

/// Generic message shown when the server gives no usable explanation
pub const GENERIC_ERROR_MESSAGE: &str = "Terjadi kesalahan pada server. Silakan coba lagi.";

/// Message shown when no bearer token is available
pub const MISSING_TOKEN_MESSAGE: &str = "Sesi tidak ditemukan. Silakan login kembali.";

/// Field-level validation messages, keyed by form field name
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors {
    fields: BTreeMap<String, String>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a message for a field. The first message for a field wins.
    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.fields.entry(field.into()).or_insert_with(|| message.into());
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.fields.get(field).map(String::as_str)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.fields.contains_key(field)
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Turn the collected messages into a result
    pub fn into_result(self) -> Result<(), ValidationErrors> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let joined = self
            .fields
            .iter()
            .map(|(field, message)| format!("{field}: {message}"))
            .collect::<Vec<_>>()
            .join("; ");
        f.write_str(&joined)
    }
}

/// Custom error type for API client operations
#[derive(Error, Debug)]
pub enum ClientError {
    /// No bearer token available; no request was sent
    #[error("Missing authentication token")]
    MissingToken,

    /// Network failure, timeout or unreadable body
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Server answered with a non-success status
    #[error("HTTP {status}: {}", message.as_deref().unwrap_or("no message"))]
    Http {
        status: StatusCode,
        message: Option<String>,
    },

    /// Server answered 2xx but the envelope reports a failure
    #[error("API error: {0}")]
    Api(String),

    /// Response body did not match any known envelope
    #[error("Unexpected response: {0}")]
    UnexpectedResponse(String),

    /// Client-side validation failed; nothing was sent
    #[error("Validation failed: {0}")]
    Validation(ValidationErrors),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl ClientError {
    /// Human-readable message suitable for a notification toast
    pub fn user_message(&self) -> String {
        match self {
            ClientError::MissingToken => MISSING_TOKEN_MESSAGE.to_string(),
            ClientError::Http {
                message: Some(message),
                ..
            } if !message.trim().is_empty() => message.clone(),
            ClientError::Api(message) if !message.trim().is_empty() => message.clone(),
            ClientError::Validation(errors) => errors.to_string(),
            _ => GENERIC_ERROR_MESSAGE.to_string(),
        }
    }

    /// Whether the failure happened before any request was sent
    pub fn is_local(&self) -> bool {
        matches!(
            self,
            ClientError::MissingToken | ClientError::Validation(_) | ClientError::Config(_)
        )
    }
}

impl From<ValidationErrors> for ClientError {
    fn from(errors: ValidationErrors) -> Self {
        ClientError::Validation(errors)
    }
}

/// Type alias for Result with ClientError
pub type ClientResult<T> = Result<T, ClientError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_message_prefers_server_text() {
        let err = ClientError::Http {
            status: StatusCode::UNPROCESSABLE_ENTITY,
            message: Some("Nama menu sudah dipakai".to_string()),
        };
        assert_eq!(err.user_message(), "Nama menu sudah dipakai");
    }

    #[test]
    fn test_user_message_falls_back_to_generic() {
        let err = ClientError::Http {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: None,
        };
        assert_eq!(err.user_message(), GENERIC_ERROR_MESSAGE);

        let err = ClientError::Api("   ".to_string());
        assert_eq!(err.user_message(), GENERIC_ERROR_MESSAGE);

        let err = ClientError::UnexpectedResponse("missing data".to_string());
        assert_eq!(err.user_message(), GENERIC_ERROR_MESSAGE);
    }

    #[test]
    fn test_validation_errors_keep_first_message() {
        let mut errors = ValidationErrors::new();
        errors.add("nama", "first");
        errors.add("nama", "second");
        errors.add("url", "bad url");

        assert_eq!(errors.len(), 2);
        assert_eq!(errors.get("nama"), Some("first"));
        assert_eq!(errors.to_string(), "nama: first; url: bad url");
        assert!(ClientError::from(errors).is_local());
    }
}
