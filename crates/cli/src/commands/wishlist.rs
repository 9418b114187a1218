//! Wishlist commands.

use shopfront_core::ProductId;
use shopfront_storefront::Storefront;
use shopfront_storefront::wishlist::WishlistEntry;

use super::CommandError;

/// `shopfront wishlist show`
///
/// # Errors
///
/// Returns `CommandError::LoginRequired` when nobody is signed in.
pub fn show(app: &Storefront) -> Result<String, CommandError> {
    if !app.auth.is_authenticated() {
        return Err(CommandError::LoginRequired);
    }

    let wishlist = &app.wishlist;
    if wishlist.is_empty() {
        return Ok("Your wishlist is empty".to_owned());
    }

    let mut lines: Vec<String> = wishlist
        .items()
        .iter()
        .map(|entry| format!("  #{:<3} {:<40} {:>10}", entry.id, entry.name, entry.price.to_string()))
        .collect();
    lines.push(format!("{} saved", wishlist.len()));
    Ok(lines.join("\n"))
}

/// `shopfront wishlist add <id>`
///
/// # Errors
///
/// Returns `CommandError::Api` if the product cannot be fetched.
pub async fn add(app: &mut Storefront, id: ProductId) -> Result<String, CommandError> {
    let product = app.api.product(id).await?.data;
    Ok(if app.wishlist.add_item(WishlistEntry::from(&product)) {
        format!("Saved {} to your wishlist", product.name)
    } else {
        format!("{} is already in your wishlist", product.name)
    })
}

/// `shopfront wishlist remove <id>`
pub fn remove(app: &mut Storefront, id: ProductId) -> String {
    if app.wishlist.remove_item(id) {
        format!("Removed product {id} from your wishlist")
    } else {
        format!("Product {id} was not in your wishlist")
    }
}

/// `shopfront wishlist toggle <id>`
///
/// # Errors
///
/// Returns `CommandError::Api` if the product cannot be fetched.
pub async fn toggle(app: &mut Storefront, id: ProductId) -> Result<String, CommandError> {
    // Removing needs no catalog lookup.
    if app.wishlist.is_in_wishlist(id) {
        return Ok(remove(app, id));
    }

    let product = app.api.product(id).await?.data;
    app.toggle_wishlist(&product);
    Ok(format!("Saved {} to your wishlist", product.name))
}

/// `shopfront wishlist clear`
pub fn clear(app: &mut Storefront) -> String {
    app.wishlist.clear();
    "Wishlist cleared".to_owned()
}

/// `shopfront wishlist to-cart <id>`
///
/// # Errors
///
/// Returns `CommandError::NotInWishlist` if `id` is not saved.
pub fn to_cart(app: &mut Storefront, id: ProductId) -> Result<String, CommandError> {
    if !app.move_to_cart(id) {
        return Err(CommandError::NotInWishlist(id));
    }
    Ok(format!(
        "Added product {id} to cart ({} items)",
        app.cart.item_count()
    ))
}
