//! Product catalog: listing, search, detail with related products, and adding
//! to the cart.
//!
//! Listing requests are issued once per explicit action and may overlap. Each
//! issued listing takes a token from a [`QuerySequence`]; when a response
//! arrives after a newer listing was issued it is reported as
//! [`Listing::Superseded`] so the caller keeps the newer results.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use spacemarket_core::{CartItem, Product, ProductId};
use thiserror::Error;
use tracing::{debug, instrument, warn};

use crate::api::{ApiClient, ApiError, ProductQuery};
use crate::cart::{CartError, CartStore};

/// Category used for related products when a product has none.
pub const DEFAULT_RELATED_CATEGORY: &str = "Sensors";

/// Maximum number of related products shown on a detail view.
pub const RELATED_LIMIT: u32 = 4;

/// Errors from catalog actions.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// API request failed.
    #[error(transparent)]
    Api(#[from] ApiError),

    /// The product cannot be added because it is out of stock.
    #[error("{0} is out of stock")]
    OutOfStock(String),

    /// The cart could not be updated.
    #[error(transparent)]
    Cart(#[from] CartError),
}

/// Token identifying one issued listing query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct QueryToken(u64);

/// Monotonic counter deciding which issued query is the latest.
#[derive(Debug, Default)]
pub struct QuerySequence {
    latest: AtomicU64,
}

impl QuerySequence {
    /// Issue a new token, making every earlier token stale.
    pub fn issue(&self) -> QueryToken {
        QueryToken(self.latest.fetch_add(1, Ordering::SeqCst) + 1)
    }

    /// Whether `token` is the most recently issued one.
    #[must_use]
    pub fn is_latest(&self, token: QueryToken) -> bool {
        self.latest.load(Ordering::SeqCst) == token.0
    }
}

/// Outcome of a listing query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Listing {
    /// Results of the latest issued query.
    Current(Vec<Product>),
    /// A newer query was issued while this one was in flight; discard.
    Superseded,
}

/// A product with its related products.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductDetail {
    pub product: Product,
    pub related: Vec<Product>,
}

/// Catalog view over the API and the cart.
///
/// Clones share the query sequence, so they behave as one view.
#[derive(Debug, Clone)]
pub struct Catalog {
    api: ApiClient,
    cart: CartStore,
    listings: Arc<QuerySequence>,
}

impl Catalog {
    #[must_use]
    pub fn new(api: ApiClient, cart: CartStore) -> Self {
        Self {
            api,
            cart,
            listings: Arc::new(QuerySequence::default()),
        }
    }

    /// List products, optionally filtered by a free-text search.
    ///
    /// A blank search lists everything. Failures of superseded queries are
    /// discarded along with their results.
    ///
    /// # Errors
    ///
    /// Returns an error if the latest query fails.
    #[instrument(skip(self))]
    pub async fn list(&self, search: Option<&str>) -> Result<Listing, ApiError> {
        let token = self.listings.issue();
        let query = search.map(ProductQuery::search).unwrap_or_default();

        let result = self.api.list_products(&query).await;

        if !self.listings.is_latest(token) {
            debug!(?token, "Discarding superseded product listing");
            return Ok(Listing::Superseded);
        }
        result.map(Listing::Current)
    }

    /// Fetch a product and up to [`RELATED_LIMIT`] others from its category.
    ///
    /// Related products are best effort: if that request fails the detail is
    /// returned with an empty related list.
    ///
    /// # Errors
    ///
    /// Returns an error if the product itself cannot be fetched.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn detail(&self, id: &ProductId) -> Result<ProductDetail, ApiError> {
        let product = self.api.get_product(id).await?;

        let category = if product.category.trim().is_empty() {
            DEFAULT_RELATED_CATEGORY
        } else {
            product.category.as_str()
        };
        let query = ProductQuery::category(category, RELATED_LIMIT);

        let related = match self.api.list_products(&query).await {
            Ok(products) => products
                .into_iter()
                .filter(|p| p.id != product.id)
                .take(RELATED_LIMIT as usize)
                .collect(),
            Err(e) => {
                warn!(error = %e, category, "Failed to fetch related products");
                Vec::new()
            }
        };

        Ok(ProductDetail { product, related })
    }

    /// Add a product snapshot to the cart.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::OutOfStock`] if the product is not in stock, or
    /// a cart error if the cart cannot be written.
    pub fn add_to_cart(&self, product: Product) -> Result<CartItem, CatalogError> {
        if !product.in_stock {
            return Err(CatalogError::OutOfStock(product.name));
        }
        Ok(self.cart.add(product)?)
    }

    /// Fetch the current version of a product and add it to the cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the product cannot be fetched, is out of stock, or
    /// the cart cannot be written.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn add_to_cart_by_id(&self, id: &ProductId) -> Result<CartItem, CatalogError> {
        let product = self.api.get_product(id).await?;
        self.add_to_cart(product)
    }
}
