//! Catalog browsing commands.

use shopfront_core::catalog::{Product, ProductPage, ProductQuery, SortField, SortOrder};
use shopfront_core::{CategoryId, Price, ProductId};
use shopfront_storefront::Storefront;

use super::{CommandError, origin_note};

/// Listing options from the command line.
#[derive(Debug, Clone)]
pub struct ListArgs {
    pub page: u32,
    pub limit: u32,
    pub sort_by: SortField,
    pub sort_order: SortOrder,
    pub min_price: Option<Price>,
    pub max_price: Option<Price>,
    pub query: Option<String>,
    pub category: Option<CategoryId>,
}

impl ListArgs {
    fn to_query(&self) -> ProductQuery {
        let defaults = ProductQuery::default();
        ProductQuery {
            page: self.page,
            limit: self.limit,
            sort_by: self.sort_by,
            sort_order: self.sort_order,
            min_price: self.min_price.map_or(defaults.min_price, Price::amount),
            max_price: self.max_price.map_or(defaults.max_price, Price::amount),
            q: None,
            category_id: None,
        }
    }
}

/// `shopfront products`
pub async fn products(app: &Storefront, args: &ListArgs) -> Result<String, CommandError> {
    let query = args.to_query();
    let response = match (&args.query, args.category) {
        (Some(term), _) => {
            let query = ProductQuery {
                category_id: args.category,
                ..query
            };
            app.api.search_products(term, &query).await?
        }
        (None, Some(category)) => app.api.category_products(category, &query).await?,
        (None, None) => app.api.products(&query).await?,
    };

    Ok(render_page(&response.data, origin_note(response.origin)))
}

/// `shopfront product <id>`
pub async fn product(app: &Storefront, id: ProductId) -> Result<String, CommandError> {
    let response = app.api.product(id).await?;
    let product = &response.data;

    let mut lines = vec![
        format!("{}{}", product.name, origin_note(response.origin)),
        format!("  {} | rating {:.1} | {}", product.price, product.rating, product.category),
        format!("  {}", stock_label(product)),
    ];
    if !product.description.is_empty() {
        lines.push(format!("  {}", product.description));
    }
    if app.wishlist.is_in_wishlist(product.id) {
        lines.push("  ♥ in your wishlist".to_owned());
    }
    if let Some(line) = app.cart.get(product.id) {
        lines.push(format!("  {} in your cart", line.quantity));
    }
    Ok(lines.join("\n"))
}

/// `shopfront banners`
pub async fn banners(app: &Storefront) -> Result<String, CommandError> {
    let response = app.api.banners().await?;
    let mut lines = vec![format!("Banners{}", origin_note(response.origin))];
    lines.extend(
        response
            .data
            .iter()
            .map(|b| format!("  {} - {} [{} -> {}]", b.title, b.description, b.cta_text, b.cta_link)),
    );
    Ok(lines.join("\n"))
}

/// `shopfront categories`
pub async fn categories(app: &Storefront) -> Result<String, CommandError> {
    let response = app.api.categories().await?;
    let mut lines = vec![format!("Categories{}", origin_note(response.origin))];
    lines.extend(
        response
            .data
            .iter()
            .map(|c| format!("  #{:<3} {} ({} products)", c.id, c.name, c.product_count)),
    );
    Ok(lines.join("\n"))
}

/// `shopfront health`
pub async fn health(app: &Storefront) -> Result<String, CommandError> {
    let response = app.api.health().await?;
    let health = &response.data;
    Ok(format!(
        "{} (database: {}, redis: {}) at {}{}",
        health.status,
        health.database,
        health.redis,
        health.timestamp.to_rfc3339(),
        origin_note(response.origin)
    ))
}

fn stock_label(product: &Product) -> String {
    if product.in_stock() {
        format!("{} in stock", product.stock)
    } else {
        "Out of stock".to_owned()
    }
}

fn render_page(page: &ProductPage, note: &str) -> String {
    if page.products.is_empty() {
        return format!("No products found{note}");
    }

    let mut lines: Vec<String> = page
        .products
        .iter()
        .map(|p| {
            let sale = if p.on_sale { " SALE" } else { "" };
            format!("  #{:<3} {:<40} {:>10}{sale}", p.id, p.name, p.price.to_string())
        })
        .collect();
    lines.push(format!(
        "Page {} of {} ({} products){note}",
        page.current_page,
        page.total_pages.max(1),
        page.total
    ));
    lines.join("\n")
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::commands::tests::offline;

    fn args() -> ListArgs {
        ListArgs {
            page: 1,
            limit: 12,
            sort_by: SortField::Price,
            sort_order: SortOrder::Asc,
            min_price: Some("50".parse().unwrap()),
            max_price: Some("150".parse().unwrap()),
            query: None,
            category: None,
        }
    }

    #[test]
    fn test_to_query_keeps_default_bounds() {
        let mut args = args();
        args.min_price = None;
        args.max_price = None;
        let query = args.to_query();
        assert_eq!(query.min_price, ProductQuery::default().min_price);
        assert_eq!(query.max_price, ProductQuery::default().max_price);
    }

    #[tokio::test]
    async fn test_offline_listing_is_flagged() {
        let dir = tempfile::tempdir().unwrap();
        let app = offline(dir.path()).await;

        let output = products(&app, &args()).await.unwrap();
        assert!(output.contains("offline"));
        assert!(output.contains("Page 1 of"));
    }

    #[tokio::test]
    async fn test_offline_product_detail() {
        let dir = tempfile::tempdir().unwrap();
        let app = offline(dir.path()).await;

        let output = product(&app, ProductId::new(3)).await.unwrap();
        assert!(output.starts_with("Professional Running Shoes"));

        let err = product(&app, ProductId::new(9999)).await.unwrap_err();
        assert_eq!(err.to_string(), "Product not found");
    }

    #[tokio::test]
    async fn test_offline_search_without_matches() {
        let dir = tempfile::tempdir().unwrap();
        let app = offline(dir.path()).await;

        let mut args = args();
        args.query = Some("zzzz-no-such-thing".into());
        let output = products(&app, &args).await.unwrap();
        assert!(output.starts_with("No products found"));
    }
}
