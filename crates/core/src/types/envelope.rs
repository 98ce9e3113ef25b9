//! Response bodies shared by every SpaceMarket API endpoint.

use serde::Deserialize;

/// `{ data: T }` envelope wrapping successful responses.
///
/// A missing `data` field decodes as `None`.
#[derive(Debug, Deserialize)]
pub struct Envelope<T> {
    #[serde(default = "Option::default")]
    pub data: Option<T>,
}

/// Body returned alongside a non-success status.
#[derive(Debug, Default, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

impl ErrorBody {
    /// Parse a raw error body and pick its message.
    ///
    /// `message` wins over `error`; blank strings and undecodable bodies
    /// yield `None`.
    #[must_use]
    pub fn message_from(body: &str) -> Option<String> {
        serde_json::from_str::<Self>(body)
            .ok()
            .and_then(Self::into_message)
    }

    /// The server's message, if it gave a non-blank one.
    #[must_use]
    pub fn into_message(self) -> Option<String> {
        self.message
            .or(self.error)
            .filter(|m| !m.trim().is_empty())
    }
}
