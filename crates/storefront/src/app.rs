//! Composition root for the client side.
//!
//! [`Storefront`] owns one of each state container, all sharing a single
//! [`PersistentStore`] and [`ApiClient`]. Presentation code gets everything
//! through it instead of reaching for globals.

use shopfront_core::ProductId;
use shopfront_core::catalog::Product;

use crate::api::{ApiClient, ApiError};
use crate::auth::{Auth, AuthStatus};
use crate::cart::{Cart, CartItemInput};
use crate::config::ClientConfig;
use crate::storage::{FileStore, KeyValueStore, PersistentStore};
use crate::wishlist::{Wishlist, WishlistEntry};

/// Largest quantity the product page offers in one add.
pub const MAX_QUANTITY_PER_ADD: u32 = 10;

/// The client-side application state.
#[derive(Debug)]
pub struct Storefront {
    pub api: ApiClient,
    pub store: PersistentStore,
    pub cart: Cart,
    pub wishlist: Wishlist,
    pub auth: Auth,
}

impl Storefront {
    /// Build the storefront over `backend`, loading the saved cart and
    /// wishlist. Call [`Storefront::start`] to restore the auth session.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the API client cannot be created.
    pub fn with_store(
        config: &ClientConfig,
        backend: impl KeyValueStore + 'static,
    ) -> Result<Self, ApiError> {
        let api = ApiClient::new(config)?;
        let store = PersistentStore::new(backend);

        Ok(Self {
            cart: Cart::load(store.clone()),
            wishlist: Wishlist::load(store.clone()),
            auth: Auth::new(api.clone(), store.clone()),
            api,
            store,
        })
    }

    /// Build the storefront over files in `config.data_dir`.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the API client cannot be created.
    pub fn open(config: &ClientConfig) -> Result<Self, ApiError> {
        Self::with_store(config, FileStore::new(&config.data_dir))
    }

    /// Validate any saved session against the backend.
    pub async fn start(&mut self) -> AuthStatus {
        self.auth.initialize().await
    }

    /// Add `quantity` units of `product` to the cart, capped at
    /// [`MAX_QUANTITY_PER_ADD`] and the stock level. Returns the quantity
    /// added, which is 0 for an out-of-stock product.
    pub fn add_to_cart(&mut self, product: &Product, quantity: u32) -> u32 {
        let quantity = quantity
            .max(1)
            .min(MAX_QUANTITY_PER_ADD)
            .min(product.stock);
        if quantity == 0 {
            tracing::debug!(product_id = %product.id, "Not adding out-of-stock product");
            return 0;
        }

        self.cart
            .add_item(CartItemInput::from_product(product, Some(quantity)));
        quantity
    }

    /// Flip wishlist membership for `product`. Returns the new membership.
    pub fn toggle_wishlist(&mut self, product: &Product) -> bool {
        self.wishlist.toggle(WishlistEntry::from(product))
    }

    /// Add one unit of a saved product to the cart. The wishlist entry is
    /// kept. Returns `false` if `id` is not in the wishlist.
    pub fn move_to_cart(&mut self, id: ProductId) -> bool {
        let Some(entry) = self.wishlist.items().iter().find(|e| e.id == id).cloned() else {
            return false;
        };

        self.cart.add_item(CartItemInput {
            id: entry.id,
            name: entry.name,
            price: entry.price,
            image: entry.image,
            quantity: Some(1),
        });
        true
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::time::Duration;

    use rust_decimal::Decimal;
    use shopfront_core::fixtures::Catalog;
    use url::Url;

    use super::*;
    use crate::storage::MemoryStore;

    fn offline_storefront(backend: MemoryStore) -> Storefront {
        let mut config = ClientConfig::new(Url::parse("http://127.0.0.1:1").unwrap());
        config.fallback_delay = Duration::ZERO;
        Storefront::with_store(&config, backend).unwrap()
    }

    fn product(id: i64) -> Product {
        Catalog::embedded()
            .unwrap()
            .product(ProductId::new(id))
            .cloned()
            .unwrap()
    }

    #[test]
    fn test_add_to_cart_caps_quantity() {
        let mut app = offline_storefront(MemoryStore::new());
        let headphones = product(1);

        assert_eq!(app.add_to_cart(&headphones, 25), MAX_QUANTITY_PER_ADD);
        assert_eq!(app.cart.item_count(), 10);

        let mut sold_out = product(2);
        sold_out.stock = 0;
        assert_eq!(app.add_to_cart(&sold_out, 1), 0);
        assert!(app.cart.get(sold_out.id).is_none());
    }

    #[test]
    fn test_wishlist_to_cart_keeps_entry() {
        let mut app = offline_storefront(MemoryStore::new());
        let shoes = product(3);

        assert!(app.toggle_wishlist(&shoes));
        assert!(app.move_to_cart(shoes.id));
        assert!(app.move_to_cart(shoes.id));
        assert!(app.wishlist.is_in_wishlist(shoes.id));
        assert_eq!(app.cart.get(shoes.id).unwrap().quantity, 2);
        assert_eq!(app.cart.total(), shoes.price.amount() * Decimal::from(2));

        assert!(!app.move_to_cart(ProductId::new(999)));
    }

    #[test]
    fn test_containers_share_one_store() {
        let backend = MemoryStore::new();
        {
            let mut app = offline_storefront(backend.clone());
            app.add_to_cart(&product(1), 2);
            app.toggle_wishlist(&product(5));
        }

        let app = offline_storefront(backend);
        assert_eq!(app.cart.item_count(), 2);
        assert!(app.wishlist.is_in_wishlist(ProductId::new(5)));
    }

    #[tokio::test]
    async fn test_start_restores_offline_session() {
        let backend = MemoryStore::new();
        {
            let mut app = offline_storefront(backend.clone());
            app.auth
                .login("demo@example.com", "password123")
                .await
                .unwrap();
        }

        let mut app = offline_storefront(backend);
        assert_eq!(app.start().await, AuthStatus::Authenticated);
        assert!(app.auth.is_offline_session());
    }
}
