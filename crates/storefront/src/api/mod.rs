//! Client for the SpaceMarket products/orders REST API.
//!
//! # Endpoints
//!
//! - `GET /api/products?search=&category=&limit=` → `{ data: Product[] }`
//! - `GET /api/products/:id` → `{ data: Product }`
//! - `GET /products/categories` → `{ data: string[] }`
//! - `POST /api/orders` → confirmation, or `{ message }` on error
//!
//! The API is the source of truth for products and orders. Nothing is cached;
//! every call is one request, never retried.

mod client;
pub mod types;

pub use client::ApiClient;
pub use types::{OrderConfirmation, ProductQuery};

use thiserror::Error;

/// Message shown when the server gives no reason for a failure.
pub const FALLBACK_ERROR_MESSAGE: &str = "Failed";

/// Errors that can occur when talking to the API.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Transport failure (connect, TLS, timeout, body read).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The server answered with a non-success status.
    #[error("API error: {status} - {}", .message.as_deref().unwrap_or("(no message)"))]
    Server {
        status: u16,
        message: Option<String>,
    },

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Response body did not match the expected shape.
    #[error("Parse error: {0}")]
    Parse(String),

    /// An endpoint URL could not be built.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}

impl ApiError {
    /// Message reported by the server, if any.
    #[must_use]
    pub fn server_message(&self) -> Option<&str> {
        match self {
            Self::Server {
                message: Some(message),
                ..
            } => Some(message),
            _ => None,
        }
    }

    /// Message suitable for showing to a shopper: the server's own message,
    /// or [`FALLBACK_ERROR_MESSAGE`].
    #[must_use]
    pub fn user_message(&self) -> String {
        self.server_message()
            .unwrap_or(FALLBACK_ERROR_MESSAGE)
            .to_string()
    }
}
