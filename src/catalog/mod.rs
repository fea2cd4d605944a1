//! Catalog filtering for the storefront grid and the back-office product table.
//!
//! Everything here is a pure function of the product list and the filter, so
//! repeated calls with the same inputs give the same result and applying a
//! filter to its own output changes nothing.

mod sample;

use rust_decimal::Decimal;
use serde::Deserialize;

use crate::domain::aggregates::Product;
use crate::domain::value_objects::Language;

pub use sample::sample_products;

/// Category value that disables category filtering.
pub const ALL_CATEGORIES: &str = "All";
pub const DEFAULT_MIN_PRICE: Decimal = Decimal::ZERO;
pub const DEFAULT_MAX_PRICE: Decimal = Decimal::from_parts(2000, 0, 0, false, 0);

/// Inclusive price bounds.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PriceRange {
    pub min: Decimal,
    pub max: Decimal,
}

impl Default for PriceRange {
    fn default() -> Self { Self { min: DEFAULT_MIN_PRICE, max: DEFAULT_MAX_PRICE } }
}

impl PriceRange {
    /// Parse raw bounds; a missing or unparseable bound falls back to its default.
    pub fn parse(min: Option<&str>, max: Option<&str>) -> Self {
        Self {
            min: parse_bound(min).unwrap_or(DEFAULT_MIN_PRICE),
            max: parse_bound(max).unwrap_or(DEFAULT_MAX_PRICE),
        }
    }

    pub fn contains(&self, price: Decimal) -> bool { self.min <= price && price <= self.max }
}

fn parse_bound(raw: Option<&str>) -> Option<Decimal> {
    raw.map(str::trim).filter(|s| !s.is_empty()).and_then(|s| s.parse::<Decimal>().ok())
}

/// Raw storefront query parameters.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct CatalogQuery {
    pub search: Option<String>,
    pub category: Option<String>,
    pub min_price: Option<String>,
    pub max_price: Option<String>,
    pub lang: Option<Language>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CatalogFilter {
    pub search: String,
    pub category: String,
    pub price: PriceRange,
    pub language: Language,
}

impl Default for CatalogFilter {
    fn default() -> Self {
        Self {
            search: String::new(),
            category: ALL_CATEGORIES.to_string(),
            price: PriceRange::default(),
            language: Language::default(),
        }
    }
}

impl From<&CatalogQuery> for CatalogFilter {
    fn from(q: &CatalogQuery) -> Self {
        Self {
            search: q.search.clone().unwrap_or_default(),
            category: q.category.clone().filter(|c| !c.is_empty()).unwrap_or_else(|| ALL_CATEGORIES.to_string()),
            price: PriceRange::parse(q.min_price.as_deref(), q.max_price.as_deref()),
            language: q.lang.unwrap_or_default(),
        }
    }
}

impl CatalogFilter {
    /// Active-language name matches case-insensitively; the other language's name matches as typed.
    fn matches_search(&self, product: &Product) -> bool {
        let name = product.name();
        name.get(self.language).to_lowercase().contains(&self.search.to_lowercase())
            || name.alternate(self.language).contains(&self.search)
    }

    fn matches_category(&self, product: &Product) -> bool {
        self.category == ALL_CATEGORIES || product.category().matches(&self.category)
    }

    pub fn matches(&self, product: &Product) -> bool {
        self.matches_search(product) && self.matches_category(product) && self.price.contains(product.price().amount())
    }
}

/// Products satisfying search, category and price together, in input order.
pub fn filter(products: &[Product], filter: &CatalogFilter) -> Vec<Product> {
    products.iter().filter(|p| filter.matches(p)).cloned().collect()
}

/// `"All"` followed by each distinct category in `lang`, in first-seen order.
pub fn categories(products: &[Product], lang: Language) -> Vec<String> {
    let mut out = vec![ALL_CATEGORIES.to_string()];
    for product in products {
        let category = product.category().get(lang);
        if !out.iter().any(|c| c == category) {
            out.push(category.clone());
        }
    }
    out
}

/// Back-office product search over English name, Arabic name and English category.
pub fn admin_search(products: &[Product], term: &str) -> Vec<Product> {
    let needle = term.to_lowercase();
    products
        .iter()
        .filter(|p| {
            p.name().en.to_lowercase().contains(&needle)
                || p.name().ar.contains(term)
                || p.category().en.to_lowercase().contains(&needle)
        })
        .cloned()
        .collect()
}
