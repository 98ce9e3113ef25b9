//! The cart store.

use std::sync::{Arc, Mutex, PoisonError};

use spacemarket_core::{Cart, CartEntryId, CartItem, Product};
use tokio::sync::watch;
use tracing::{debug, instrument, warn};

use super::CartError;
use super::storage::KeyValueStorage;

/// Storage key holding the serialized cart.
pub const CART_KEY: &str = "cart";

/// Cart persisted in local key-value storage.
///
/// Clones share storage, the mutation lock, and the change channel.
#[derive(Clone)]
pub struct CartStore {
    inner: Arc<CartStoreInner>,
}

struct CartStoreInner {
    storage: Arc<dyn KeyValueStorage>,
    changes: watch::Sender<Cart>,
    // Serializes read-modify-write cycles within this process.
    mutation: Mutex<()>,
}

impl CartStore {
    /// Open the cart held in `storage`.
    pub fn new(storage: Arc<dyn KeyValueStorage>) -> Self {
        let initial = load(storage.as_ref());
        let (changes, _) = watch::channel(initial);
        Self {
            inner: Arc::new(CartStoreInner {
                storage,
                changes,
                mutation: Mutex::new(()),
            }),
        }
    }

    /// Current cart contents.
    ///
    /// Absent or unparsable storage yields an empty cart. If the stored cart
    /// differs from the last published one (another process wrote it),
    /// subscribers are notified.
    #[must_use]
    pub fn read(&self) -> Cart {
        let cart = load(self.inner.storage.as_ref());
        self.inner.changes.send_if_modified(|current| {
            if *current == cart {
                false
            } else {
                *current = cart.clone();
                true
            }
        });
        cart
    }

    /// Append a snapshot of `product`. Duplicates are kept as separate entries.
    ///
    /// # Errors
    ///
    /// Returns an error if the updated cart cannot be written.
    #[instrument(skip(self, product), fields(product_id = %product.id))]
    pub fn add(&self, product: Product) -> Result<CartItem, CartError> {
        let _guard = self.lock();
        let mut cart = load(self.inner.storage.as_ref());
        let item = CartItem::snapshot(product);
        cart.push(item.clone());
        self.write(cart)?;
        debug!(entry_id = %item.entry_id, "Added to cart");
        Ok(item)
    }

    /// Remove the entry with `entry_id`. Returns `None` if no entry matched,
    /// in which case storage is left untouched.
    ///
    /// # Errors
    ///
    /// Returns an error if the updated cart cannot be written.
    #[instrument(skip(self))]
    pub fn remove(&self, entry_id: CartEntryId) -> Result<Option<CartItem>, CartError> {
        let _guard = self.lock();
        let mut cart = load(self.inner.storage.as_ref());
        let Some(removed) = cart.remove(entry_id) else {
            debug!("No cart entry with that id");
            return Ok(None);
        };
        self.write(cart)?;
        Ok(Some(removed))
    }

    /// Remove the entry at display position `index` of the stored cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the updated cart cannot be written.
    #[instrument(skip(self))]
    pub fn remove_at(&self, index: usize) -> Result<Option<CartItem>, CartError> {
        let _guard = self.lock();
        let mut cart = load(self.inner.storage.as_ref());
        let Some(entry_id) = cart.get(index).map(|item| item.entry_id) else {
            return Ok(None);
        };
        let removed = cart.remove(entry_id);
        self.write(cart)?;
        Ok(removed)
    }

    /// Remove every entry whose ID is in `entry_ids`, keeping the rest.
    /// Returns how many entries were removed.
    ///
    /// # Errors
    ///
    /// Returns an error if the updated cart cannot be written.
    #[instrument(skip(self, entry_ids), fields(requested = entry_ids.len()))]
    pub fn remove_entries(&self, entry_ids: &[CartEntryId]) -> Result<usize, CartError> {
        let _guard = self.lock();
        let mut cart = load(self.inner.storage.as_ref());
        let removed = entry_ids
            .iter()
            .filter(|id| cart.remove(**id).is_some())
            .count();
        if removed == 0 {
            return Ok(0);
        }

        if cart.is_empty() {
            self.inner.storage.remove(CART_KEY)?;
            self.inner.changes.send_replace(cart);
        } else {
            self.write(cart)?;
        }
        debug!(removed, "Removed cart entries");
        Ok(removed)
    }

    /// Delete the stored cart entirely.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage key cannot be removed.
    #[instrument(skip(self))]
    pub fn clear(&self) -> Result<(), CartError> {
        let _guard = self.lock();
        self.inner.storage.remove(CART_KEY)?;
        self.inner.changes.send_replace(Cart::new());
        debug!("Cart cleared");
        Ok(())
    }

    /// Subscribe to cart changes. The receiver starts at the current cart.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Cart> {
        self.inner.changes.subscribe()
    }

    fn write(&self, cart: Cart) -> Result<(), CartError> {
        let json = serde_json::to_string(&cart)?;
        self.inner.storage.set(CART_KEY, &json)?;
        self.inner.changes.send_replace(cart);
        Ok(())
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, ()> {
        self.inner
            .mutation
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl std::fmt::Debug for CartStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CartStore")
            .field("entries", &self.inner.changes.borrow().len())
            .finish_non_exhaustive()
    }
}

fn load(storage: &dyn KeyValueStorage) -> Cart {
    let raw = match storage.get(CART_KEY) {
        Ok(Some(raw)) => raw,
        Ok(None) => return Cart::new(),
        Err(e) => {
            warn!(error = %e, "Cart storage unreadable, treating cart as empty");
            return Cart::new();
        }
    };

    serde_json::from_str(&raw).unwrap_or_else(|e| {
        warn!(error = %e, "Stored cart is corrupt, treating cart as empty");
        Cart::new()
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use spacemarket_core::{Price, ProductId};
    use tempfile::TempDir;

    use super::*;
    use crate::cart::{FileStorage, MemoryStorage};

    fn product(id: &str, price: u64) -> Product {
        Product {
            id: ProductId::new(id),
            name: format!("Product {id}"),
            description: String::new(),
            price: Price::from_units(price),
            image: String::new(),
            category: "Sensors".to_string(),
            stock: 5,
            in_stock: true,
        }
    }

    fn memory_store() -> (Arc<MemoryStorage>, CartStore) {
        let storage = Arc::new(MemoryStorage::new());
        let store = CartStore::new(storage.clone());
        (storage, store)
    }

    #[test]
    fn test_add_then_remove_at_updates_total() {
        let (_, store) = memory_store();
        store.add(product("a", 100)).unwrap();
        store.add(product("b", 250)).unwrap();
        assert_eq!(store.read().total(), Price::from_units(350));

        let removed = store.remove_at(0).unwrap().unwrap();
        assert_eq!(removed.product.id.as_str(), "a");

        let cart = store.read();
        assert_eq!(cart.len(), 1);
        assert_eq!(cart.total(), Price::from_units(250));
    }

    #[test]
    fn test_same_product_twice_then_remove_first() {
        let (_, store) = memory_store();
        store.add(product("a", 100)).unwrap();
        store.add(product("a", 100)).unwrap();
        store.remove_at(0).unwrap();

        let cart = store.read();
        assert_eq!(cart.len(), 1);
        assert_eq!(cart.total(), Price::from_units(100));
    }

    #[test]
    fn test_adds_and_removes_keep_count_and_total_consistent() {
        let (_, store) = memory_store();
        let prices = [100_u64, 250, 75, 1000, 5];
        let mut entries = Vec::new();
        for (i, price) in prices.iter().enumerate() {
            entries.push(store.add(product(&format!("p{i}"), *price)).unwrap());
        }

        store.remove(entries[1].entry_id).unwrap();
        store.remove(entries[3].entry_id).unwrap();

        let cart = store.read();
        assert_eq!(cart.len(), prices.len() - 2);
        assert_eq!(cart.total(), Price::from_units(100 + 75 + 5));
    }

    #[test]
    fn test_remove_by_id_survives_reordering_from_other_views() {
        let (_, store) = memory_store();
        let first = store.add(product("a", 100)).unwrap();
        let second = store.add(product("b", 250)).unwrap();

        // Another view removes the first entry; the stale id still targets `b`.
        store.remove(first.entry_id).unwrap();
        let removed = store.remove(second.entry_id).unwrap().unwrap();
        assert_eq!(removed.product.id.as_str(), "b");
        assert!(store.read().is_empty());
    }

    #[test]
    fn test_remove_entries_keeps_unlisted_entries() {
        let (storage, store) = memory_store();
        let a = store.add(product("a", 100)).unwrap();
        let b = store.add(product("b", 250)).unwrap();
        let c = store.add(product("c", 75)).unwrap();

        assert_eq!(store.remove_entries(&[a.entry_id, c.entry_id]).unwrap(), 2);
        let cart = store.read();
        assert_eq!(cart.len(), 1);
        assert_eq!(cart.items()[0].entry_id, b.entry_id);

        // Already gone: nothing removed, nothing written.
        assert_eq!(store.remove_entries(&[a.entry_id]).unwrap(), 0);

        assert_eq!(store.remove_entries(&[b.entry_id]).unwrap(), 1);
        assert!(store.read().is_empty());
        assert_eq!(storage.get(CART_KEY).unwrap(), None);
    }

    #[test]
    fn test_remove_missing_entry_does_not_write() {
        let (storage, store) = memory_store();
        assert!(store.remove(CartEntryId::new()).unwrap().is_none());
        assert!(store.remove_at(3).unwrap().is_none());
        assert_eq!(storage.get(CART_KEY).unwrap(), None);
    }

    #[test]
    fn test_clear_then_read_is_empty() {
        let (storage, store) = memory_store();
        store.add(product("a", 100)).unwrap();
        store.clear().unwrap();
        assert!(store.read().is_empty());
        assert_eq!(storage.get(CART_KEY).unwrap(), None);
    }

    #[test]
    fn test_corrupt_storage_reads_as_empty() {
        let (storage, store) = memory_store();
        storage.set(CART_KEY, "{not json").unwrap();
        assert!(store.read().is_empty());

        // The next add starts from an empty cart instead of failing.
        store.add(product("a", 100)).unwrap();
        assert_eq!(store.read().len(), 1);
    }

    #[test]
    fn test_subscribers_see_every_mutation() {
        let (_, store) = memory_store();
        let mut rx = store.subscribe();
        assert!(rx.borrow_and_update().is_empty());

        store.add(product("a", 100)).unwrap();
        assert!(rx.has_changed().unwrap());
        assert_eq!(rx.borrow_and_update().len(), 1);

        store.clear().unwrap();
        assert!(rx.has_changed().unwrap());
        assert!(rx.borrow_and_update().is_empty());
    }

    #[test]
    fn test_read_publishes_external_writes() {
        let storage = Arc::new(MemoryStorage::new());
        let ours = CartStore::new(storage.clone());
        let theirs = CartStore::new(storage);
        let mut rx = ours.subscribe();
        rx.borrow_and_update();

        theirs.add(product("a", 100)).unwrap();
        assert!(!rx.has_changed().unwrap());

        let _ = ours.read();
        assert!(rx.has_changed().unwrap());
        assert_eq!(rx.borrow_and_update().len(), 1);
    }

    #[test]
    fn test_file_backed_cart_persists_across_stores() {
        let temp_dir = TempDir::new().unwrap();
        let store = CartStore::new(Arc::new(FileStorage::new(temp_dir.path())));
        store.add(product("a", 100)).unwrap();
        store.add(product("b", 250)).unwrap();

        let reopened = CartStore::new(Arc::new(FileStorage::new(temp_dir.path())));
        let cart = reopened.read();
        assert_eq!(cart.len(), 2);
        assert_eq!(cart.total(), Price::from_units(350));
        assert_eq!(cart.items(), store.read().items());
    }
}
