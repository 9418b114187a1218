//! Shopping cart state.
//!
//! The cart is a list of line items, at most one per product, persisted to
//! the `cart` key after every mutation. Totals are recomputed on read.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use shopfront_core::catalog::Product;
use shopfront_core::{Price, ProductId};

use crate::storage::{PersistentStore, keys};

/// One product in the cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLineItem {
    pub id: ProductId,
    pub name: String,
    pub price: Price,
    #[serde(default)]
    pub image: String,
    /// Always at least 1 while the line is in the cart.
    pub quantity: u32,
}

impl CartLineItem {
    /// `price * quantity`.
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.price.times(self.quantity)
    }
}

/// A product being added to the cart. `quantity` defaults to 1.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartItemInput {
    pub id: ProductId,
    pub name: String,
    pub price: Price,
    pub image: String,
    pub quantity: Option<u32>,
}

impl CartItemInput {
    /// Add `quantity` units of `product`.
    #[must_use]
    pub fn from_product(product: &Product, quantity: Option<u32>) -> Self {
        Self {
            id: product.id,
            name: product.name.clone(),
            price: product.price,
            image: product.image.clone(),
            quantity,
        }
    }
}

/// Cart state container with write-through persistence.
#[derive(Debug)]
pub struct Cart {
    items: Vec<CartLineItem>,
    store: PersistentStore,
}

impl Cart {
    /// Load the cart saved in `store`, or start empty.
    ///
    /// Stored lines are normalized: repeated ids are merged and empty lines
    /// dropped.
    #[must_use]
    pub fn load(store: PersistentStore) -> Self {
        let stored: Vec<CartLineItem> = store.load(keys::CART).unwrap_or_default();

        let mut items: Vec<CartLineItem> = Vec::with_capacity(stored.len());
        for line in stored.into_iter().filter(|line| line.quantity > 0) {
            match items.iter_mut().find(|existing| existing.id == line.id) {
                Some(existing) => {
                    existing.quantity = existing.quantity.saturating_add(line.quantity);
                }
                None => items.push(line),
            }
        }

        tracing::debug!(lines = items.len(), "Cart loaded");
        Self { items, store }
    }

    /// Add an item, merging it into an existing line with the same id.
    pub fn add_item(&mut self, item: CartItemInput) {
        let quantity = item.quantity.unwrap_or(1);

        if let Some(line) = self.items.iter_mut().find(|line| line.id == item.id) {
            line.quantity = line.quantity.saturating_add(quantity);
        } else if quantity > 0 {
            self.items.push(CartLineItem {
                id: item.id,
                name: item.name,
                price: item.price,
                image: item.image,
                quantity,
            });
        }

        self.persist();
    }

    /// Set the quantity of a line. Zero or less removes it; unknown ids are
    /// ignored.
    pub fn update_quantity(&mut self, id: ProductId, quantity: i64) {
        if quantity <= 0 {
            self.items.retain(|line| line.id != id);
        } else if let Some(line) = self.items.iter_mut().find(|line| line.id == id) {
            line.quantity = u32::try_from(quantity).unwrap_or(u32::MAX);
        }

        self.persist();
    }

    /// Remove a line if present.
    pub fn remove_item(&mut self, id: ProductId) {
        self.items.retain(|line| line.id != id);
        self.persist();
    }

    /// Empty the cart.
    pub fn clear(&mut self) {
        self.items.clear();
        self.persist();
    }

    /// Sum of every line total, saturating at [`Decimal::MAX`].
    #[must_use]
    pub fn total(&self) -> Decimal {
        self.items
            .iter()
            .map(CartLineItem::line_total)
            .try_fold(Decimal::ZERO, Decimal::checked_add)
            .unwrap_or(Decimal::MAX)
    }

    /// Total number of units, as shown on the header badge.
    #[must_use]
    pub fn item_count(&self) -> u64 {
        self.items.iter().map(|line| u64::from(line.quantity)).sum()
    }

    /// Lines in insertion order.
    #[must_use]
    pub fn items(&self) -> &[CartLineItem] {
        &self.items
    }

    #[must_use]
    pub fn get(&self, id: ProductId) -> Option<&CartLineItem> {
        self.items.iter().find(|line| line.id == id)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    fn persist(&self) {
        self.store.save(keys::CART, &self.items);
    }
}
