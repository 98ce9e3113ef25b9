//! Storefront session state shared across views.

use std::sync::Arc;

use crate::api::ApiClient;
use crate::cart::{CartStore, FileStorage, KeyValueStorage};
use crate::catalog::Catalog;
use crate::checkout::Checkout;
use crate::config::StorefrontConfig;
use crate::error::Result;
use crate::navbar::CartBadge;

/// Everything a storefront session needs: the API client, the cart, and the
/// catalog view over both.
///
/// This struct is cheaply cloneable via `Arc`. All clones share one cart
/// change channel, so every view built from it stays in sync.
#[derive(Debug, Clone)]
pub struct Storefront {
    inner: Arc<StorefrontInner>,
}

#[derive(Debug)]
struct StorefrontInner {
    api: ApiClient,
    cart: CartStore,
    catalog: Catalog,
}

impl Storefront {
    /// Create a session whose cart lives in `config.data_dir`.
    ///
    /// # Errors
    ///
    /// Returns an error if the API client cannot be built.
    pub fn new(config: StorefrontConfig) -> Result<Self> {
        let storage = Arc::new(FileStorage::new(&config.data_dir));
        Self::with_storage(config, storage)
    }

    /// Create a session over explicit cart storage.
    ///
    /// # Errors
    ///
    /// Returns an error if the API client cannot be built.
    pub fn with_storage(config: StorefrontConfig, storage: Arc<dyn KeyValueStorage>) -> Result<Self> {
        let api = ApiClient::new(&config)?;
        let cart = CartStore::new(storage);
        let catalog = Catalog::new(api.clone(), cart.clone());

        Ok(Self {
            inner: Arc::new(StorefrontInner {
                api,
                cart,
                catalog,
            }),
        })
    }

    #[must_use]
    pub fn cart(&self) -> &CartStore {
        &self.inner.cart
    }

    #[must_use]
    pub fn catalog(&self) -> &Catalog {
        &self.inner.catalog
    }

    /// Start a checkout over the shared cart.
    #[must_use]
    pub fn checkout(&self) -> Checkout {
        Checkout::new(self.inner.api.clone(), self.inner.cart.clone())
    }

    /// A navbar badge subscribed to the shared cart.
    #[must_use]
    pub fn badge(&self) -> CartBadge {
        CartBadge::new(&self.inner.cart)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashMap;

    use spacemarket_core::{Price, Product, ProductId};
    use tempfile::TempDir;

    use super::*;

    #[test]
    fn test_views_share_one_cart() {
        let temp_dir = TempDir::new().unwrap();
        let data_dir = temp_dir.path().to_string_lossy().into_owned();
        let vars = HashMap::from([
            ("SPACEMARKET_API_URL", "http://127.0.0.1:9".to_string()),
            ("SPACEMARKET_DATA_DIR", data_dir),
        ]);
        let config = StorefrontConfig::from_vars(|k| vars.get(k).cloned()).unwrap();
        let storefront = Storefront::new(config).unwrap();
        let badge = storefront.badge();

        storefront
            .catalog()
            .add_to_cart(Product {
                id: ProductId::new("p1"),
                name: "Antenna".to_string(),
                description: String::new(),
                price: Price::from_units(500),
                image: String::new(),
                category: "Communication Systems".to_string(),
                stock: 2,
                in_stock: true,
            })
            .unwrap();

        assert_eq!(badge.count(), 1);
        assert_eq!(storefront.checkout().total(), Price::from_units(500));
        assert!(temp_dir.path().join("cart.json").exists());
    }
}
