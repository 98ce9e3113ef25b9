//! HTTP implementation of the storefront API client.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use spacemarket_core::{Envelope, ErrorBody, OrderRequest, Product, ProductId};
use tracing::{debug, instrument, warn};
use url::Url;
use uuid::Uuid;

use super::ApiError;
use super::types::{OrderConfirmation, ProductQuery};
use crate::config::StorefrontConfig;

/// Header carrying the per-attempt order submission key.
pub const IDEMPOTENCY_KEY_HEADER: &str = "Idempotency-Key";

/// Client for the storefront side of the API.
///
/// Cheap to clone; clones share one connection pool.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ApiClientInner>,
}

struct ApiClientInner {
    client: reqwest::Client,
    base_url: Url,
}

impl ApiClient {
    /// Create a client from storefront configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client fails to build or the base URL
    /// cannot carry paths.
    pub fn new(config: &StorefrontConfig) -> Result<Self, ApiError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.http_timeout {
            builder = builder.timeout(timeout);
        }
        Self::with_http_client(builder.build()?, config.api_url.clone())
    }

    /// Create a client for a base URL with default transport settings.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client fails to build or the base URL
    /// cannot carry paths.
    pub fn with_base_url(base_url: Url) -> Result<Self, ApiError> {
        Self::with_http_client(reqwest::Client::builder().build()?, base_url)
    }

    fn with_http_client(client: reqwest::Client, base_url: Url) -> Result<Self, ApiError> {
        if base_url.cannot_be_a_base() {
            return Err(ApiError::InvalidUrl(format!(
                "{base_url} cannot be used as a base URL"
            )));
        }
        Ok(Self {
            inner: Arc::new(ApiClientInner { client, base_url }),
        })
    }

    /// Build an endpoint URL by appending path segments to the base URL.
    ///
    /// Segments are percent-encoded, so IDs can never alter the route.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, ApiError> {
        let mut url = self.inner.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| ApiError::InvalidUrl(self.inner.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    // =========================================================================
    // Product Methods
    // =========================================================================

    /// List products matching a query.
    ///
    /// A missing `data` field is treated as an empty list.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the body is malformed.
    #[instrument(skip(self))]
    pub async fn list_products(&self, query: &ProductQuery) -> Result<Vec<Product>, ApiError> {
        let mut url = self.endpoint(&["api", "products"])?;
        let pairs = query.pairs();
        if !pairs.is_empty() {
            url.query_pairs_mut().extend_pairs(pairs);
        }

        let envelope: Envelope<Vec<Product>> = self.get(url).await?;
        let products = envelope.data.unwrap_or_default();
        debug!(count = products.len(), "Fetched products");
        Ok(products)
    }

    /// Get a single product.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::NotFound`] if the product does not exist, or
    /// another error if the request fails.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn get_product(&self, id: &ProductId) -> Result<Product, ApiError> {
        let url = self.endpoint(&["api", "products", id.as_str()])?;
        let envelope: Envelope<Product> = self.get(url).await?;
        envelope
            .data
            .ok_or_else(|| ApiError::NotFound(format!("Product not found: {id}")))
    }

    /// List the category names known to the API.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the body is malformed.
    #[instrument(skip(self))]
    pub async fn list_categories(&self) -> Result<Vec<String>, ApiError> {
        let url = self.endpoint(&["products", "categories"])?;
        let envelope: Envelope<Vec<String>> = self.get(url).await?;
        Ok(envelope.data.unwrap_or_default())
    }

    // =========================================================================
    // Order Methods
    // =========================================================================

    /// Submit an order.
    ///
    /// `idempotency_key` is sent as the `Idempotency-Key` header; callers
    /// reuse it when resubmitting the same order after a failure.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Server`] carrying the server's message when the
    /// order is rejected, or another error if the request fails.
    #[instrument(skip(self, order), fields(lines = order.items.len(), key = %idempotency_key))]
    pub async fn place_order(
        &self,
        order: &OrderRequest,
        idempotency_key: Uuid,
    ) -> Result<OrderConfirmation, ApiError> {
        let url = self.endpoint(&["api", "orders"])?;
        let response = self
            .inner
            .client
            .post(url)
            .header(IDEMPOTENCY_KEY_HEADER, idempotency_key.to_string())
            .json(order)
            .send()
            .await?;

        let confirmation: OrderConfirmation = handle_response(response).await?;
        debug!(order_id = ?confirmation.order_id(), "Order accepted");
        Ok(confirmation)
    }

    /// Execute a GET request and decode the JSON body.
    async fn get<T: DeserializeOwned>(&self, url: Url) -> Result<T, ApiError> {
        let response = self.inner.client.get(url).send().await?;
        handle_response(response).await
    }
}

/// Decode a success body, or turn a failure status into an [`ApiError`].
async fn handle_response<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, ApiError> {
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
        ApiError::Parse(e.to_string())
    })
}

fn parse_error(status: reqwest::StatusCode, body: &str) -> ApiError {
    let message = ErrorBody::message_from(body);

    debug!(status = %status, message = ?message, "API returned non-success status");

    if status == reqwest::StatusCode::NOT_FOUND {
        return ApiError::NotFound(message.unwrap_or_else(|| "Resource not found".to_string()));
    }

    ApiError::Server {
        status: status.as_u16(),
        message,
    }
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.inner.base_url.as_str())
            .finish_non_exhaustive()
    }
}
