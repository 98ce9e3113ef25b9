//! HTTP client for the admin side of the API.
//!
//! Only the `/admin/*` routes receive the configured `x-admin-key` header;
//! public reads go out without it. The header value is marked sensitive so it
//! never shows up in debug output of the underlying HTTP stack.

use std::sync::Arc;

use reqwest::Method;
use reqwest::header::HeaderValue;
use serde::de::DeserializeOwned;
use spacemarket_core::{Envelope, ErrorBody, Order, Product};
use tracing::{debug, instrument, warn};
use url::Url;

use crate::config::AdminConfig;
use crate::error::{AdminError, Result};
use crate::product_form::ProductForm;

/// Header carrying the admin credential.
pub const ADMIN_KEY_HEADER: &str = "x-admin-key";

/// Categories offered when the API cannot list them.
pub const FALLBACK_CATEGORIES: &[&str] = &[
    "Sensors",
    "Communication Systems",
    "Power Systems",
    "Satellite Components",
    "Research Instruments",
];

/// Where a category list came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CategorySource {
    Remote,
    Fallback,
}

/// Category names for the product form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Categories {
    pub names: Vec<String>,
    pub source: CategorySource,
}

impl Categories {
    fn fallback() -> Self {
        Self {
            names: FALLBACK_CATEGORIES.iter().map(ToString::to_string).collect(),
            source: CategorySource::Fallback,
        }
    }
}

/// Admin API client.
#[derive(Clone)]
pub struct AdminClient {
    inner: Arc<AdminClientInner>,
}

struct AdminClientInner {
    client: reqwest::Client,
    base_url: Url,
    admin_key: HeaderValue,
}

impl AdminClient {
    /// Create a client for the configured API and admin key.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is not a valid header value or the HTTP
    /// client fails to build.
    pub fn new(config: &AdminConfig) -> Result<Self> {
        let mut admin_key = HeaderValue::from_str(config.admin_key())?;
        admin_key.set_sensitive(true);

        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.http_timeout {
            builder = builder.timeout(timeout);
        }

        if config.api_url.cannot_be_a_base() {
            return Err(AdminError::InvalidUrl(config.api_url.to_string()));
        }

        Ok(Self {
            inner: Arc::new(AdminClientInner {
                client: builder.build()?,
                base_url: config.api_url.clone(),
                admin_key,
            }),
        })
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.inner.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| AdminError::InvalidUrl(self.inner.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Request builder for an `/admin/*` route, carrying the admin key.
    fn admin_request(&self, method: Method, url: Url) -> reqwest::RequestBuilder {
        self.inner
            .client
            .request(method, url)
            .header(ADMIN_KEY_HEADER, self.inner.admin_key.clone())
    }

    // =========================================================================
    // Read Methods
    // =========================================================================

    /// List every product.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the body is malformed.
    #[instrument(skip(self))]
    pub async fn list_products(&self) -> Result<Vec<Product>> {
        let url = self.endpoint(&["api", "products"])?;
        let envelope: Envelope<Vec<Product>> = self.get(url).await?;
        let products = envelope.data.unwrap_or_default();
        debug!(count = products.len(), "Fetched products");
        Ok(products)
    }

    /// List every order, newest first as returned by the API.
    ///
    /// # Errors
    ///
    /// Returns [`AdminError::Unauthorized`] if the admin key is refused, or
    /// another error if the request fails.
    #[instrument(skip(self))]
    pub async fn list_orders(&self) -> Result<Vec<Order>> {
        let url = self.endpoint(&["admin", "orders"])?;
        let response = self.admin_request(Method::GET, url).send().await?;
        let envelope: Envelope<Vec<Order>> = handle_response(response).await?;
        let orders = envelope.data.unwrap_or_default();
        debug!(count = orders.len(), "Fetched orders");
        Ok(orders)
    }

    /// List category names, falling back to the built-in list on any failure.
    #[instrument(skip(self))]
    pub async fn list_categories(&self) -> Categories {
        let result = async {
            let url = self.endpoint(&["products", "categories"])?;
            let envelope: Envelope<Vec<String>> = self.get(url).await?;
            Ok::<_, AdminError>(envelope.data.unwrap_or_default())
        }
        .await;

        match result {
            Ok(names) => Categories {
                names,
                source: CategorySource::Remote,
            },
            Err(e) => {
                warn!(error = %e, "Failed to fetch categories, using built-in list");
                Categories::fallback()
            }
        }
    }

    // =========================================================================
    // Write Methods
    // =========================================================================

    /// Validate the form and create the product.
    ///
    /// # Errors
    ///
    /// Returns [`AdminError::Form`] without sending anything if validation
    /// fails, or another error if the server rejects the product.
    #[instrument(skip(self, form), fields(name = %form.name.trim()))]
    pub async fn create_product(&self, form: &ProductForm) -> Result<Product> {
        let new_product = form.validate()?;
        let url = self.endpoint(&["admin", "products"])?;

        let response = self
            .admin_request(Method::POST, url)
            .json(&new_product)
            .send()
            .await?;

        let envelope: Envelope<Product> = handle_response(response).await?;
        let product = envelope
            .data
            .ok_or_else(|| AdminError::Parse("response has no product".to_string()))?;
        debug!(product_id = %product.id, "Product created");
        Ok(product)
    }

    /// GET a public route; no admin key is attached.
    async fn get<T: DeserializeOwned>(&self, url: Url) -> Result<T> {
        let response = self.inner.client.get(url).send().await?;
        handle_response(response).await
    }
}

async fn handle_response<T: DeserializeOwned>(response: reqwest::Response) -> Result<T> {
    let status = response.status();
    let text = response.text().await?;

    if !status.is_success() {
        return Err(parse_error(status, &text));
    }

    serde_json::from_str(&text).map_err(|e| {
        warn!(
            error = %e,
            body = %text.chars().take(500).collect::<String>(),
            "Failed to parse API response"
        );
        AdminError::Parse(e.to_string())
    })
}

fn parse_error(status: reqwest::StatusCode, body: &str) -> AdminError {
    let message = ErrorBody::message_from(body);

    debug!(status = %status, message = ?message, "API returned non-success status");

    if matches!(
        status,
        reqwest::StatusCode::UNAUTHORIZED | reqwest::StatusCode::FORBIDDEN
    ) {
        return AdminError::Unauthorized(message);
    }

    AdminError::Server {
        status: status.as_u16(),
        message,
    }
}

impl std::fmt::Debug for AdminClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdminClient")
            .field("base_url", &self.inner.base_url.as_str())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_error_unauthorized() {
        let err = parse_error(reqwest::StatusCode::FORBIDDEN, r#"{"message":"Invalid admin key"}"#);
        assert!(matches!(err, AdminError::Unauthorized(Some(ref m)) if m == "Invalid admin key"));

        let err = parse_error(reqwest::StatusCode::UNAUTHORIZED, "");
        assert_eq!(err.to_string(), "Unauthorized: admin key rejected");
    }

    #[test]
    fn test_parse_error_server_message() {
        let err = parse_error(
            reqwest::StatusCode::BAD_REQUEST,
            r#"{"error":"Product validation failed"}"#,
        );
        assert_eq!(err.user_message(), "Product validation failed");

        let err = parse_error(reqwest::StatusCode::INTERNAL_SERVER_ERROR, "oops");
        assert_eq!(err.user_message(), "Failed");
    }

    fn client() -> AdminClient {
        let config = AdminConfig::from_vars(|k| match k {
            "SPACEMARKET_API_URL" => Some("http://localhost:5000".to_string()),
            "SPACEMARKET_ADMIN_KEY" => Some("aB3$xY9!mK2@nL5#pQ7&rT0*uW4^zC6".to_string()),
            _ => None,
        })
        .unwrap();
        AdminClient::new(&config).unwrap()
    }

    #[test]
    fn test_admin_request_carries_sensitive_key() {
        let client = client();

        let url = client.endpoint(&["admin", "orders"]).unwrap();
        let request = client.admin_request(Method::GET, url).build().unwrap();
        let key = request.headers().get(ADMIN_KEY_HEADER).unwrap();
        assert!(key.is_sensitive());
    }

    #[test]
    fn test_fallback_categories() {
        let categories = Categories::fallback();
        assert_eq!(categories.source, CategorySource::Fallback);
        assert_eq!(categories.names.len(), 5);
        assert_eq!(categories.names[0], "Sensors");
    }
}
