//! Admin client errors.

use thiserror::Error;

use crate::product_form::ProductFormError;

/// Message shown when the server gives no reason for a failure.
pub const FALLBACK_ERROR_MESSAGE: &str = "Failed";

#[derive(Debug, Error)]
pub enum AdminError {
    /// Transport failure.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The server answered with a non-success status.
    #[error("API error: {status} - {}", .message.as_deref().unwrap_or("(no message)"))]
    Server {
        status: u16,
        message: Option<String>,
    },

    /// The server refused the admin key (401/403).
    #[error("Unauthorized: {}", .0.as_deref().unwrap_or("admin key rejected"))]
    Unauthorized(Option<String>),

    /// Response body did not match the expected shape.
    #[error("Parse error: {0}")]
    Parse(String),

    /// The product form failed validation. No request was sent.
    #[error(transparent)]
    Form(#[from] ProductFormError),

    /// The admin key cannot be carried in an HTTP header.
    #[error("Invalid admin key header: {0}")]
    InvalidHeader(#[from] reqwest::header::InvalidHeaderValue),

    /// An endpoint URL could not be built.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}

impl AdminError {
    /// Message suitable for showing to an operator.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Server {
                message: Some(message),
                ..
            }
            | Self::Unauthorized(Some(message)) => message.clone(),
            Self::Form(e) => e.to_string(),
            _ => FALLBACK_ERROR_MESSAGE.to_string(),
        }
    }
}

/// Result type alias for `AdminError`.
pub type Result<T> = std::result::Result<T, AdminError>;
