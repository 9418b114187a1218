//! Wishlist state: a set of saved products, persisted to the `wishlist` key.

use serde::{Deserialize, Serialize};
use shopfront_core::catalog::Product;
use shopfront_core::{Price, ProductId};

use crate::storage::{PersistentStore, keys};

/// A saved product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WishlistEntry {
    pub id: ProductId,
    pub name: String,
    pub price: Price,
    #[serde(default)]
    pub image: String,
}

impl From<&Product> for WishlistEntry {
    fn from(product: &Product) -> Self {
        Self {
            id: product.id,
            name: product.name.clone(),
            price: product.price,
            image: product.image.clone(),
        }
    }
}

/// Wishlist state container with write-through persistence.
#[derive(Debug)]
pub struct Wishlist {
    entries: Vec<WishlistEntry>,
    store: PersistentStore,
}

impl Wishlist {
    /// Load the wishlist saved in `store`, or start empty. Repeated ids keep
    /// their first entry.
    #[must_use]
    pub fn load(store: PersistentStore) -> Self {
        let stored: Vec<WishlistEntry> = store.load(keys::WISHLIST).unwrap_or_default();

        let mut entries: Vec<WishlistEntry> = Vec::with_capacity(stored.len());
        for entry in stored {
            if !entries.iter().any(|e| e.id == entry.id) {
                entries.push(entry);
            }
        }

        Self { entries, store }
    }

    /// Save an entry. Returns `false` if the id was already saved.
    pub fn add_item(&mut self, entry: WishlistEntry) -> bool {
        let added = !self.is_in_wishlist(entry.id);
        if added {
            self.entries.push(entry);
        }
        self.persist();
        added
    }

    /// Drop an entry. Returns whether it was present.
    pub fn remove_item(&mut self, id: ProductId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|e| e.id != id);
        self.persist();
        self.entries.len() != before
    }

    #[must_use]
    pub fn is_in_wishlist(&self, id: ProductId) -> bool {
        self.entries.iter().any(|e| e.id == id)
    }

    /// Add the entry if absent, remove it if present. Returns the new
    /// membership.
    pub fn toggle(&mut self, entry: WishlistEntry) -> bool {
        if self.is_in_wishlist(entry.id) {
            self.remove_item(entry.id);
            false
        } else {
            self.add_item(entry)
        }
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.persist();
    }

    #[must_use]
    pub fn items(&self) -> &[WishlistEntry] {
        &self.entries
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn persist(&self) {
        self.store.save(keys::WISHLIST, &self.entries);
    }
}
