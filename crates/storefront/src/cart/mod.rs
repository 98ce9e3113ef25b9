//! Local cart: storage backends and the cart store.
//!
//! The cart never leaves the machine. It is kept as a JSON array under the
//! `cart` key of a [`KeyValueStorage`], and every mutation is published on a
//! watch channel so all views (navbar badge, cart view, catalog) see the same
//! state without re-reading on their own schedule.

mod storage;
mod store;

pub use storage::{FileStorage, KeyValueStorage, MemoryStorage};
pub use store::{CART_KEY, CartStore};

use thiserror::Error;

/// Errors from mutating the cart.
///
/// Reads never fail: unreadable or corrupt storage is treated as an empty cart.
#[derive(Debug, Error)]
pub enum CartError {
    /// The backing storage could not be written.
    #[error("Cart storage error: {0}")]
    Storage(#[from] std::io::Error),

    /// The cart could not be encoded.
    #[error("Cart encoding error: {0}")]
    Serialize(#[from] serde_json::Error),
}
