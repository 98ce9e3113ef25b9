//! Storefront request and response types.

use serde::Deserialize;

/// Filters for `GET /api/products`.
///
/// Empty strings are treated as absent so a blank search box lists everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductQuery {
    pub search: Option<String>,
    pub category: Option<String>,
    pub limit: Option<u32>,
}

impl ProductQuery {
    /// Free-text search.
    #[must_use]
    pub fn search(term: impl Into<String>) -> Self {
        Self {
            search: Some(term.into()),
            ..Self::default()
        }
    }

    /// Products in a category, at most `limit` of them.
    #[must_use]
    pub fn category(category: impl Into<String>, limit: u32) -> Self {
        Self {
            category: Some(category.into()),
            limit: Some(limit),
            ..Self::default()
        }
    }

    /// Query-string pairs, skipping blank values.
    #[must_use]
    pub fn pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(search) = self.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            pairs.push(("search", search.to_string()));
        }
        if let Some(category) = self
            .category
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
        {
            pairs.push(("category", category.to_string()));
        }
        if let Some(limit) = self.limit {
            pairs.push(("limit", limit.to_string()));
        }
        pairs
    }
}

/// Successful response to `POST /api/orders`.
///
/// The confirmation body is not part of a stable contract, so the order
/// document is kept as raw JSON.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct OrderConfirmation {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub data: Option<serde_json::Value>,
}

impl OrderConfirmation {
    /// ID of the created order, when the server includes it.
    #[must_use]
    pub fn order_id(&self) -> Option<&str> {
        self.data.as_ref()?.get("_id")?.as_str()
    }
}
