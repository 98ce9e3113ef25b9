//! Cart badge shown in the navigation bar.

use spacemarket_core::Cart;
use tokio::sync::watch;

use crate::cart::CartStore;

/// Live count of cart entries.
#[derive(Debug, Clone)]
pub struct CartBadge {
    changes: watch::Receiver<Cart>,
}

impl CartBadge {
    #[must_use]
    pub fn new(cart: &CartStore) -> Self {
        Self {
            changes: cart.subscribe(),
        }
    }

    /// Number of entries in the cart.
    #[must_use]
    pub fn count(&self) -> usize {
        self.changes.borrow().len()
    }

    /// Text for the badge, or `None` when the cart is empty and the badge is
    /// hidden.
    #[must_use]
    pub fn label(&self) -> Option<String> {
        match self.count() {
            0 => None,
            n => Some(n.to_string()),
        }
    }

    /// Wait for the next cart mutation and return the new count.
    ///
    /// Returns `None` once every handle to the cart store is gone.
    pub async fn changed(&mut self) -> Option<usize> {
        self.changes.changed().await.ok()?;
        Some(self.changes.borrow_and_update().len())
    }
}
