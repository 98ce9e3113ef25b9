//! Checkout: collect contact details and turn the cart into an order.
//!
//! One [`Checkout`] drives one shopper's attempts. Each attempt moves
//! `Idle → Submitting → Succeeded | Failed`; a failed attempt leaves the cart
//! untouched and the next attempt starts over from `Failed` as from `Idle`.

use spacemarket_core::{CartEntryId, CustomerInfo, CustomerInfoError, OrderRequest, Price};
use thiserror::Error;
use tracing::{error, info, instrument, warn};
use uuid::Uuid;

use crate::api::{ApiClient, ApiError, OrderConfirmation};
use crate::cart::{CartError, CartStore};

/// Errors from a checkout attempt.
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// Contact details are incomplete or malformed. No request was sent.
    #[error("{0}")]
    Validation(#[from] CustomerInfoError),

    /// There is nothing in the cart to order. No request was sent.
    #[error("Cart is empty")]
    EmptyCart,

    /// The order was not accepted. `message` is what the shopper is shown.
    #[error("{message}")]
    Rejected {
        message: String,
        #[source]
        source: ApiError,
    },

    /// The cart could not be cleared after the order was accepted.
    #[error(transparent)]
    Cart(#[from] CartError),
}

/// Raw contact form fields, as typed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CustomerForm {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub organization: String,
}

impl CustomerForm {
    fn validate(&self) -> Result<CustomerInfo, CustomerInfoError> {
        CustomerInfo::new(
            &self.name,
            &self.email,
            Some(&self.phone),
            Some(&self.organization),
        )
    }
}

/// Where the current attempt stands.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum CheckoutState {
    #[default]
    Idle,
    Submitting,
    Succeeded(OrderConfirmation),
    /// Carries the message shown to the shopper.
    Failed(String),
}

/// Checkout flow over the cart and the orders API.
#[derive(Debug)]
pub struct Checkout {
    api: ApiClient,
    cart: CartStore,
    state: CheckoutState,
    // Last rejected submission and its idempotency key.
    pending: Option<(OrderRequest, Uuid)>,
}

impl Checkout {
    #[must_use]
    pub fn new(api: ApiClient, cart: CartStore) -> Self {
        Self {
            api,
            cart,
            state: CheckoutState::Idle,
            pending: None,
        }
    }

    #[must_use]
    pub const fn state(&self) -> &CheckoutState {
        &self.state
    }

    /// Amount the shopper is about to pay.
    #[must_use]
    pub fn total(&self) -> Price {
        self.cart.read().total()
    }

    /// Validate the form and place one order for the current cart.
    ///
    /// Validation and the empty-cart check happen before any request, and
    /// leave the state as it was. Duplicate cart entries are sent as one
    /// line per product with the summed quantity. Resubmitting the same
    /// order after a failure reuses its `Idempotency-Key`.
    ///
    /// On success the submitted entries are removed from the cart; entries
    /// added while the order was in flight stay. A failure to remove them is
    /// logged but does not fail the checkout, since the order already exists.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutError::Validation`] or [`CheckoutError::EmptyCart`]
    /// without contacting the server, or [`CheckoutError::Rejected`] if the
    /// order is not accepted.
    #[instrument(skip(self, form))]
    pub async fn submit(&mut self, form: &CustomerForm) -> Result<OrderConfirmation, CheckoutError> {
        let customer_info = form.validate()?;

        let cart = self.cart.read();
        if cart.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }

        let request = OrderRequest {
            items: cart.order_lines(),
            customer_info,
        };
        let key = match &self.pending {
            Some((previous, key)) if *previous == request => *key,
            _ => Uuid::new_v4(),
        };

        self.state = CheckoutState::Submitting;
        match self.api.place_order(&request, key).await {
            Ok(confirmation) => {
                self.pending = None;
                info!(
                    order_id = ?confirmation.order_id(),
                    total = %cart.total(),
                    "Order placed"
                );
                let submitted: Vec<CartEntryId> =
                    cart.items().iter().map(|item| item.entry_id).collect();
                if let Err(e) = self.cart.remove_entries(&submitted) {
                    error!(error = %e, "Order placed but the cart could not be cleared");
                }
                self.state = CheckoutState::Succeeded(confirmation.clone());
                Ok(confirmation)
            }
            Err(source) => {
                let message = source.user_message();
                warn!(error = %source, "Order rejected");
                self.pending = Some((request, key));
                self.state = CheckoutState::Failed(message.clone());
                Err(CheckoutError::Rejected { message, source })
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use spacemarket_core::{Product, ProductId};
    use url::Url;

    use super::*;
    use crate::cart::MemoryStorage;

    fn checkout() -> (Checkout, CartStore) {
        // Nothing listens here; any request would fail to connect.
        let api = ApiClient::with_base_url(Url::parse("http://127.0.0.1:9").unwrap()).unwrap();
        let cart = CartStore::new(Arc::new(MemoryStorage::new()));
        (Checkout::new(api, cart.clone()), cart)
    }

    fn form(name: &str, email: &str) -> CustomerForm {
        CustomerForm {
            name: name.to_string(),
            email: email.to_string(),
            ..CustomerForm::default()
        }
    }

    fn product() -> Product {
        Product {
            id: ProductId::new("p1"),
            name: "Star Tracker".to_string(),
            description: String::new(),
            price: Price::from_units(125_000),
            image: String::new(),
            category: "Sensors".to_string(),
            stock: 3,
            in_stock: true,
        }
    }

    #[tokio::test]
    async fn test_missing_fields_rejected_before_submitting() {
        let (mut checkout, cart) = checkout();
        cart.add(product()).unwrap();

        let err = checkout.submit(&form("  ", "a@b.c")).await.unwrap_err();
        assert_eq!(err.to_string(), "Please fill name and email");
        assert_eq!(checkout.state(), &CheckoutState::Idle);
        assert_eq!(cart.read().len(), 1);
    }

    #[tokio::test]
    async fn test_empty_cart_rejected() {
        let (mut checkout, _) = checkout();
        let err = checkout
            .submit(&form("Kalpana", "k@lab.example"))
            .await
            .unwrap_err();
        assert!(matches!(err, CheckoutError::EmptyCart));
        assert_eq!(checkout.state(), &CheckoutState::Idle);
    }

    #[tokio::test]
    async fn test_transport_failure_keeps_cart() {
        let (mut checkout, cart) = checkout();
        cart.add(product()).unwrap();
        cart.add(product()).unwrap();
        let before = cart.read();

        let err = checkout
            .submit(&form("Kalpana", "k@lab.example"))
            .await
            .unwrap_err();
        assert!(matches!(err, CheckoutError::Rejected { ref message, .. } if message == "Failed"));
        assert_eq!(checkout.state(), &CheckoutState::Failed("Failed".to_string()));
        assert_eq!(cart.read(), before);
        assert_eq!(checkout.total(), Price::from_units(250_000));
    }
}
