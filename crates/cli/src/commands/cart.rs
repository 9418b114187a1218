//! Cart commands.

use shopfront_core::ProductId;
use shopfront_storefront::Storefront;

use super::CommandError;

/// `shopfront cart show`
#[must_use]
pub fn show(app: &Storefront) -> String {
    let cart = &app.cart;
    if cart.is_empty() {
        return "Your cart is empty".to_owned();
    }

    let mut lines: Vec<String> = cart
        .items()
        .iter()
        .map(|line| {
            format!(
                "  #{:<3} {:<40} {:>3} x {:>10} = ${:.2}",
                line.id,
                line.name,
                line.quantity,
                line.price.to_string(),
                line.line_total()
            )
        })
        .collect();
    lines.push(format!(
        "{} items, total ${:.2}",
        cart.item_count(),
        cart.total()
    ));
    lines.join("\n")
}

/// `shopfront cart add <id> [-q n]`
///
/// # Errors
///
/// Returns `CommandError::Api` if the product cannot be fetched and
/// `CommandError::OutOfStock` if none are left.
pub async fn add(
    app: &mut Storefront,
    id: ProductId,
    quantity: u32,
) -> Result<String, CommandError> {
    let product = app.api.product(id).await?.data;
    let added = app.add_to_cart(&product, quantity);
    if added == 0 {
        return Err(CommandError::OutOfStock(product.name));
    }

    Ok(format!(
        "Added {added} x {} to cart ({} items)",
        product.name,
        app.cart.item_count()
    ))
}

/// `shopfront cart update <id> <n>`
///
/// # Errors
///
/// Returns `CommandError::NotInCart` for ids not in the cart.
pub fn update(app: &mut Storefront, id: ProductId, quantity: i64) -> Result<String, CommandError> {
    if app.cart.get(id).is_none() {
        return Err(CommandError::NotInCart(id));
    }

    app.cart.update_quantity(id, quantity);
    Ok(match app.cart.get(id) {
        Some(line) => format!("{} quantity set to {}", line.name, line.quantity),
        None => format!("Removed product {id} from cart"),
    })
}

/// `shopfront cart remove <id>`
///
/// # Errors
///
/// Returns `CommandError::NotInCart` for ids not in the cart.
pub fn remove(app: &mut Storefront, id: ProductId) -> Result<String, CommandError> {
    let name = app
        .cart
        .get(id)
        .map(|line| line.name.clone())
        .ok_or(CommandError::NotInCart(id))?;

    app.cart.remove_item(id);
    Ok(format!("Removed {name} from cart"))
}

/// `shopfront cart clear`
pub fn clear(app: &mut Storefront) -> String {
    app.cart.clear();
    "Cart cleared".to_owned()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::commands::tests::offline;

    #[tokio::test]
    async fn test_cart_flow_persists_between_runs() {
        let dir = tempfile::tempdir().unwrap();
        {
            let mut app = offline(dir.path()).await;
            let output = add(&mut app, ProductId::new(1), 2).await.unwrap();
            assert!(output.starts_with("Added 2 x"));
            add(&mut app, ProductId::new(3), 1).await.unwrap();
        }

        let mut app = offline(dir.path()).await;
        assert_eq!(app.cart.item_count(), 3);
        assert!(show(&app).ends_with("3 items, total $729.97"));

        update(&mut app, ProductId::new(1), 0).unwrap();
        assert!(app.cart.get(ProductId::new(1)).is_none());

        assert!(matches!(
            remove(&mut app, ProductId::new(1)),
            Err(CommandError::NotInCart(_))
        ));
        assert_eq!(clear(&mut app), "Cart cleared");
        assert_eq!(show(&app), "Your cart is empty");
    }

    #[tokio::test]
    async fn test_add_unknown_product_fails() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = offline(dir.path()).await;
        assert!(add(&mut app, ProductId::new(9999), 1).await.is_err());
        assert!(app.cart.is_empty());
    }
}
