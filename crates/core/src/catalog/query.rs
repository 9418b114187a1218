//! Product listing query: price filter, search, sort and pagination.
//!
//! The same engine backs the fixture API server and the client's offline
//! fallback, so both answer `GET /api/products?...` identically.

use core::cmp::Ordering;
use core::fmt;
use core::str::FromStr;

use rust_decimal::Decimal;

use super::{Product, ProductPage};
use crate::types::CategoryId;

/// Page size when the request does not ask for one.
pub const DEFAULT_LIMIT: u32 = 12;

/// Largest page size the engine will serve.
pub const MAX_LIMIT: u32 = 100;

/// Upper price bound applied when `max_price` is absent.
pub const DEFAULT_MAX_PRICE: Decimal = Decimal::from_parts(1000, 0, 0, false, 0);

/// Field a product listing is ordered by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortField {
    Price,
    #[default]
    CreatedAt,
    Rating,
    Name,
}

impl SortField {
    /// Wire name used in the `sort_by` query parameter.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Price => "price",
            Self::CreatedAt => "created_at",
            Self::Rating => "rating",
            Self::Name => "name",
        }
    }
}

impl fmt::Display for SortField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortField {
    type Err = core::convert::Infallible;

    /// Unknown fields sort by creation date.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.trim().to_ascii_lowercase().as_str() {
            "price" => Self::Price,
            "rating" => Self::Rating,
            "name" => Self::Name,
            _ => Self::CreatedAt,
        })
    }
}

/// Direction of a product listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    /// Wire name used in the `sort_order` query parameter.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortOrder {
    type Err = core::convert::Infallible;

    /// Anything other than `ASC` (any case) is descending.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(if s.trim().eq_ignore_ascii_case("asc") {
            Self::Asc
        } else {
            Self::Desc
        })
    }
}

/// A product listing request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductQuery {
    /// 1-based page number.
    pub page: u32,
    pub limit: u32,
    pub sort_by: SortField,
    pub sort_order: SortOrder,
    /// Inclusive lower price bound.
    pub min_price: Decimal,
    /// Inclusive upper price bound.
    pub max_price: Decimal,
    /// Free-text search over name, description and category.
    pub q: Option<String>,
    pub category_id: Option<CategoryId>,
}

impl Default for ProductQuery {
    fn default() -> Self {
        Self {
            page: 1,
            limit: DEFAULT_LIMIT,
            sort_by: SortField::default(),
            sort_order: SortOrder::default(),
            min_price: Decimal::ZERO,
            max_price: DEFAULT_MAX_PRICE,
            q: None,
            category_id: None,
        }
    }
}

impl ProductQuery {
    /// Build a query from decoded query-string pairs.
    ///
    /// Parsing is lenient: unknown keys are ignored and unparsable values
    /// keep their defaults, so a sloppy URL still gets a listing.
    pub fn from_pairs<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut query = Self::default();
        for (key, value) in pairs {
            let value = value.as_ref().trim();
            match key.as_ref() {
                "page" => {
                    if let Ok(page) = value.parse() {
                        query.page = page;
                    }
                }
                "limit" => {
                    if let Ok(limit) = value.parse() {
                        query.limit = limit;
                    }
                }
                "sort_by" => {
                    let Ok(field) = value.parse::<SortField>();
                    query.sort_by = field;
                }
                "sort_order" => {
                    let Ok(order) = value.parse::<SortOrder>();
                    query.sort_order = order;
                }
                "min_price" => {
                    if let Ok(price) = value.parse() {
                        query.min_price = price;
                    }
                }
                "max_price" => {
                    if let Ok(price) = value.parse() {
                        query.max_price = price;
                    }
                }
                "q" | "search" if !value.is_empty() => query.q = Some(value.to_owned()),
                "category_id" => {
                    if let Ok(id) = value.parse() {
                        query.category_id = Some(id);
                    }
                }
                _ => {}
            }
        }
        query
    }

    /// Query-string pairs for this query.
    ///
    /// Paging and sorting are always sent; price bounds, search and category
    /// only when they differ from the defaults.
    #[must_use]
    pub fn to_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![
            ("page", self.page.to_string()),
            ("limit", self.limit.to_string()),
            ("sort_by", self.sort_by.to_string()),
            ("sort_order", self.sort_order.to_string()),
        ];
        if self.min_price > Decimal::ZERO {
            pairs.push(("min_price", self.min_price.to_string()));
        }
        if self.max_price != DEFAULT_MAX_PRICE {
            pairs.push(("max_price", self.max_price.to_string()));
        }
        if let Some(q) = &self.q {
            pairs.push(("q", q.clone()));
        }
        if let Some(category_id) = self.category_id {
            pairs.push(("category_id", category_id.to_string()));
        }
        pairs
    }

    /// Page size actually served, clamped to `1..=MAX_LIMIT`.
    #[must_use]
    pub const fn effective_limit(&self) -> u32 {
        if self.limit == 0 {
            1
        } else if self.limit > MAX_LIMIT {
            MAX_LIMIT
        } else {
            self.limit
        }
    }

    /// Page actually served; page 0 is treated as page 1.
    #[must_use]
    pub const fn effective_page(&self) -> u32 {
        if self.page == 0 { 1 } else { self.page }
    }

    /// Whether `product` passes the price, category and search filters.
    #[must_use]
    pub fn matches(&self, product: &Product) -> bool {
        let price = product.price.amount();
        if price < self.min_price || price > self.max_price {
            return false;
        }
        if let Some(category_id) = self.category_id
            && product.category_id != Some(category_id)
        {
            return false;
        }
        match self.q.as_deref().map(str::trim) {
            Some(term) if !term.is_empty() => {
                let term = term.to_lowercase();
                product.name.to_lowercase().contains(&term)
                    || product.description.to_lowercase().contains(&term)
                    || product.category.to_lowercase().contains(&term)
            }
            _ => true,
        }
    }

    fn compare(&self, a: &Product, b: &Product) -> Ordering {
        let ordering = match self.sort_by {
            SortField::Price => a.price.cmp(&b.price),
            SortField::CreatedAt => a.created_at.cmp(&b.created_at),
            SortField::Rating => a.rating.total_cmp(&b.rating),
            SortField::Name => a.name.to_lowercase().cmp(&b.name.to_lowercase()),
        };
        let ordering = match self.sort_order {
            SortOrder::Asc => ordering,
            SortOrder::Desc => ordering.reverse(),
        };
        ordering.then_with(|| a.id.cmp(&b.id))
    }

    /// Filter, sort and paginate `products`.
    #[must_use]
    pub fn apply(&self, products: &[Product]) -> ProductPage {
        let mut matched: Vec<&Product> = products.iter().filter(|p| self.matches(p)).collect();
        matched.sort_by(|a, b| self.compare(a, b));

        let limit = self.effective_limit();
        let page = self.effective_page();
        let page_size = usize::try_from(limit).unwrap_or(usize::MAX);
        let start = usize::try_from(page - 1)
            .unwrap_or(usize::MAX)
            .saturating_mul(page_size);

        let total = matched.len();
        let products = matched
            .into_iter()
            .skip(start)
            .take(page_size)
            .cloned()
            .collect();

        ProductPage {
            products,
            total,
            total_pages: total.div_ceil(page_size),
            current_page: page,
            limit,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::fixtures;

    fn catalog() -> Vec<Product> {
        fixtures::products().unwrap()
    }

    #[test]
    fn test_price_window_ascending() {
        let query = ProductQuery::from_pairs([
            ("min_price", "50"),
            ("max_price", "150"),
            ("sort_by", "price"),
            ("sort_order", "ASC"),
        ]);
        let page = query.apply(&catalog());

        assert!(!page.products.is_empty());
        let low = Decimal::from(50);
        let high = Decimal::from(150);
        for product in &page.products {
            let price = product.price.amount();
            assert!(price >= low && price <= high, "{} out of range", product.name);
        }
        for pair in page.products.windows(2) {
            assert!(pair[0].price <= pair[1].price);
        }
    }

    #[test]
    fn test_defaults_newest_first() {
        let page = ProductQuery::default().apply(&catalog());
        assert_eq!(page.limit, DEFAULT_LIMIT);
        assert_eq!(page.current_page, 1);
        for pair in page.products.windows(2) {
            assert!(pair[0].created_at >= pair[1].created_at);
        }
    }

    #[test]
    fn test_pagination_covers_everything_once() {
        let products = catalog();
        let mut seen = Vec::new();
        let mut page_no = 1;
        loop {
            let query = ProductQuery {
                page: page_no,
                limit: 7,
                ..ProductQuery::default()
            };
            let page = query.apply(&products);
            assert_eq!(page.total, products.len());
            assert_eq!(page.total_pages, products.len().div_ceil(7));
            if page.products.is_empty() {
                break;
            }
            seen.extend(page.products.iter().map(|p| p.id));
            page_no += 1;
        }
        seen.sort();
        seen.dedup();
        assert_eq!(seen.len(), products.len());
    }

    #[test]
    fn test_search_is_case_insensitive() {
        let query = ProductQuery::from_pairs([("q", "WIRELESS")]);
        let page = query.apply(&catalog());
        assert!(page.total >= 2);
        assert!(
            page.products
                .iter()
                .all(|p| p.name.to_lowercase().contains("wireless")
                    || p.description.to_lowercase().contains("wireless"))
        );
    }

    #[test]
    fn test_category_filter() {
        let query = ProductQuery {
            category_id: Some(CategoryId::new(4)),
            ..ProductQuery::default()
        };
        let page = query.apply(&catalog());
        assert!(page.total > 0);
        assert!(
            page.products
                .iter()
                .all(|p| p.category_id == Some(CategoryId::new(4)))
        );
    }

    #[test]
    fn test_name_sort_breaks_ties_by_id() {
        let query = ProductQuery::from_pairs([("sort_by", "name"), ("sort_order", "asc")]);
        let page = query.apply(&catalog());
        for pair in page.products.windows(2) {
            assert!(pair[0].name.to_lowercase() <= pair[1].name.to_lowercase());
        }
    }

    #[test]
    fn test_lenient_parsing() {
        let query = ProductQuery::from_pairs([
            ("page", "abc"),
            ("limit", "0"),
            ("sort_by", "popularity"),
            ("sort_order", "sideways"),
            ("unknown", "x"),
        ]);
        assert_eq!(query.page, 1);
        assert_eq!(query.effective_limit(), 1);
        assert_eq!(query.sort_by, SortField::CreatedAt);
        assert_eq!(query.sort_order, SortOrder::Desc);
    }

    #[test]
    fn test_pairs_round_trip() {
        let query = ProductQuery {
            page: 2,
            limit: 5,
            sort_by: SortField::Rating,
            sort_order: SortOrder::Asc,
            min_price: Decimal::from(20),
            max_price: Decimal::from(300),
            q: Some("mat".to_owned()),
            category_id: Some(CategoryId::new(4)),
        };
        assert_eq!(ProductQuery::from_pairs(query.to_pairs()), query);
    }

    #[test]
    fn test_page_past_end_is_empty() {
        let query = ProductQuery {
            page: 99,
            ..ProductQuery::default()
        };
        let page = query.apply(&catalog());
        assert!(page.products.is_empty());
        assert_eq!(page.current_page, 99);
    }
}
