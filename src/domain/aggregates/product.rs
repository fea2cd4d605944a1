//! Product Aggregate

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::domain::events::{DomainEvent, ProductEvent};
use crate::domain::value_objects::{Language, Localized, Money};

/// Label translations for color or size options, keyed by the raw option value.
pub type LabelMap = Localized<BTreeMap<String, String>>;

const PRICE_DECIMALS: u32 = 2;
const PLACEHOLDER_IMAGE: &str = "/placeholder.svg";
const DEFAULT_COLORS: [&str; 4] = ["Black", "White", "Navy", "Gray"];
const DEFAULT_SIZES: [&str; 4] = ["S", "M", "L", "XL"];
const COLOR_TRANSLATIONS: [(&str, &str); 16] = [
    ("Black", "أسود"), ("White", "أبيض"), ("Navy", "كحلي"), ("Gray", "رمادي"),
    ("Blue", "أزرق"), ("Brown", "بني"), ("Red", "أحمر"), ("Green", "أخضر"),
    ("Pink", "وردي"), ("Purple", "بنفسجي"), ("Orange", "برتقالي"), ("Yellow", "أصفر"),
    ("Beige", "بيج"), ("Maroon", "عنابي"), ("Olive", "زيتوني"), ("Teal", "أزرق مخضر"),
];
const SIZE_TRANSLATIONS: [(&str, &str, &str); 6] = [
    ("XS", "Extra Small", "صغير جداً"), ("S", "Small", "صغير"), ("M", "Medium", "متوسط"),
    ("L", "Large", "كبير"), ("XL", "Extra Large", "كبير جداً"), ("XXL", "Double XL", "كبير جداً جداً"),
];
/// Stock written for products flagged in stock by the admin form.
pub const IN_STOCK_COUNT: i32 = 100;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Product {
    id: Uuid,
    name: Localized,
    category: Localized,
    price: Money,
    rating: f64,
    stock: i32,
    description: Localized,
    images: Vec<String>,
    colors: Vec<String>,
    sizes: Vec<String>,
    color_names: LabelMap,
    size_names: LabelMap,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    #[serde(skip)]
    events: Vec<DomainEvent>,
}

/// Loosely-typed product row as found in the store.
///
/// Optional columns are filled with declared defaults once, in [`Product::from_record`].
#[derive(Clone, Debug, Default, sqlx::FromRow)]
pub struct ProductRecord {
    pub id: Uuid,
    pub name_en: String,
    pub name_ar: String,
    pub category_en: String,
    pub category_ar: String,
    pub price: Decimal,
    pub currency: Option<String>,
    pub rating: Option<f64>,
    pub stock: Option<i32>,
    pub description_en: Option<String>,
    pub description_ar: Option<String>,
    pub images: Option<Vec<String>>,
    pub colors: Option<Vec<String>>,
    pub sizes: Option<Vec<String>>,
    pub color_names: Option<sqlx::types::Json<LabelMap>>,
    pub size_names: Option<sqlx::types::Json<LabelMap>>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Admin input for a new product.
#[derive(Clone, Debug, Default, Deserialize, Validate)]
pub struct ProductDraft {
    #[validate(custom = "not_blank")]
    pub name_en: String,
    #[validate(custom = "not_blank")]
    pub name_ar: String,
    #[validate(custom = "positive_price")]
    pub price: Decimal,
    #[serde(default)]
    pub category: Localized,
    #[serde(default)]
    pub description_en: String,
    #[serde(default)]
    pub description_ar: String,
    #[serde(default)]
    pub images: Vec<String>,
    #[validate(range(min = 0.0, max = 5.0))]
    #[serde(default = "default_rating")]
    pub rating: f64,
    #[serde(default = "default_in_stock")]
    pub in_stock: bool,
    #[validate(length(min = 1, message = "at least one color is required"))]
    pub colors: Vec<String>,
    #[validate(length(min = 1, message = "at least one size is required"))]
    pub sizes: Vec<String>,
}

/// Partial admin update; absent fields are left unchanged.
#[derive(Clone, Debug, Default, Deserialize, Validate)]
pub struct ProductPatch {
    #[validate(custom = "not_blank")]
    pub name_en: Option<String>,
    #[validate(custom = "not_blank")]
    pub name_ar: Option<String>,
    #[validate(custom = "positive_price")]
    pub price: Option<Decimal>,
    pub category: Option<Localized>,
    pub description_en: Option<String>,
    pub description_ar: Option<String>,
    pub images: Option<Vec<String>>,
    #[validate(range(min = 0.0, max = 5.0))]
    pub rating: Option<f64>,
    pub in_stock: Option<bool>,
    #[validate(length(min = 1, message = "at least one color is required"))]
    pub colors: Option<Vec<String>>,
    #[validate(length(min = 1, message = "at least one size is required"))]
    pub sizes: Option<Vec<String>>,
    pub color_names: Option<LabelMap>,
    pub size_names: Option<LabelMap>,
}

fn default_rating() -> f64 { 4.0 }
fn default_in_stock() -> bool { true }

pub(crate) fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() { Err(ValidationError::new("blank")) } else { Ok(()) }
}

/// Prices are positive and carry at most two decimal places.
fn positive_price(value: &Decimal) -> Result<(), ValidationError> {
    if *value <= Decimal::ZERO {
        return Err(ValidationError::new("price_not_positive"));
    }
    if value.normalize().scale() > PRICE_DECIMALS {
        return Err(ValidationError::new("price_too_precise"));
    }
    Ok(())
}

fn non_blank_images(images: Vec<String>) -> Vec<String> {
    images.into_iter().map(|i| i.trim().to_string()).filter(|i| !i.is_empty()).collect()
}

fn default_images() -> Vec<String> { vec![PLACEHOLDER_IMAGE.to_string(); 3] }
fn default_colors() -> Vec<String> { DEFAULT_COLORS.iter().map(|c| c.to_string()).collect() }
fn default_sizes() -> Vec<String> { DEFAULT_SIZES.iter().map(|s| s.to_string()).collect() }

pub(crate) fn default_color_names() -> LabelMap {
    Localized::new(
        COLOR_TRANSLATIONS.iter().map(|(c, _)| (c.to_string(), c.to_string())).collect(),
        COLOR_TRANSLATIONS.iter().map(|(c, ar)| (c.to_string(), ar.to_string())).collect(),
    )
}

pub(crate) fn default_size_names() -> LabelMap {
    Localized::new(
        SIZE_TRANSLATIONS.iter().map(|(s, en, _)| (s.to_string(), en.to_string())).collect(),
        SIZE_TRANSLATIONS.iter().map(|(s, _, ar)| (s.to_string(), ar.to_string())).collect(),
    )
}

impl Product {
    /// Create a validated product from admin input.
    pub fn create(draft: ProductDraft, currency: &str) -> Result<Self, ProductError> {
        draft.validate().map_err(ProductError::from_validation)?;
        let id = Uuid::now_v7();
        let now = Utc::now();
        let mut product = Self {
            id,
            name: Localized::new(draft.name_en.trim().to_string(), draft.name_ar.trim().to_string()),
            category: draft.category,
            price: Money::new(draft.price, currency),
            rating: draft.rating,
            stock: if draft.in_stock { IN_STOCK_COUNT } else { 0 },
            description: Localized::new(draft.description_en, draft.description_ar),
            images: non_blank_images(draft.images),
            colors: draft.colors,
            sizes: draft.sizes,
            color_names: default_color_names(),
            size_names: default_size_names(),
            created_at: now,
            updated_at: now,
            events: vec![],
        };
        product.raise_event(DomainEvent::Product(ProductEvent::Created { product_id: id }));
        Ok(product)
    }

    /// Rebuild a product from a store row, applying declared defaults for missing fields.
    pub fn from_record(record: ProductRecord, default_currency: &str) -> Self {
        let created_at = record.created_at.unwrap_or_else(Utc::now);
        Self {
            id: record.id,
            name: Localized::new(record.name_en, record.name_ar),
            category: Localized::new(record.category_en, record.category_ar),
            price: Money::new(record.price, record.currency.as_deref().unwrap_or(default_currency)),
            rating: record.rating.unwrap_or(0.0).clamp(0.0, 5.0),
            stock: record.stock.unwrap_or(0),
            description: Localized::new(
                record.description_en.unwrap_or_default(),
                record.description_ar.unwrap_or_default(),
            ),
            images: record.images.filter(|i| !i.is_empty()).unwrap_or_else(default_images),
            colors: record.colors.unwrap_or_else(default_colors),
            sizes: record.sizes.unwrap_or_else(default_sizes),
            color_names: record.color_names.map(|j| j.0).unwrap_or_else(default_color_names),
            size_names: record.size_names.map(|j| j.0).unwrap_or_else(default_size_names),
            created_at,
            updated_at: record.updated_at.unwrap_or(created_at),
            events: vec![],
        }
    }

    /// Flatten back into the row shape the store persists.
    pub fn to_record(&self) -> ProductRecord {
        ProductRecord {
            id: self.id,
            name_en: self.name.en.clone(),
            name_ar: self.name.ar.clone(),
            category_en: self.category.en.clone(),
            category_ar: self.category.ar.clone(),
            price: self.price.amount(),
            currency: Some(self.price.currency().to_string()),
            rating: Some(self.rating),
            stock: Some(self.stock),
            description_en: Some(self.description.en.clone()),
            description_ar: Some(self.description.ar.clone()),
            images: Some(self.images.clone()),
            colors: Some(self.colors.clone()),
            sizes: Some(self.sizes.clone()),
            color_names: Some(sqlx::types::Json(self.color_names.clone())),
            size_names: Some(sqlx::types::Json(self.size_names.clone())),
            created_at: Some(self.created_at),
            updated_at: Some(self.updated_at),
        }
    }

    pub fn id(&self) -> Uuid { self.id }
    pub fn name(&self) -> &Localized { &self.name }
    pub fn category(&self) -> &Localized { &self.category }
    pub fn price(&self) -> &Money { &self.price }
    pub fn rating(&self) -> f64 { self.rating }
    pub fn stock(&self) -> i32 { self.stock }
    pub fn description(&self) -> &Localized { &self.description }
    pub fn images(&self) -> &[String] { &self.images }
    pub fn colors(&self) -> &[String] { &self.colors }
    pub fn sizes(&self) -> &[String] { &self.sizes }
    pub fn created_at(&self) -> DateTime<Utc> { self.created_at }
    pub fn is_in_stock(&self) -> bool { self.stock > 0 }

    pub fn color_label<'a>(&'a self, color: &'a str, lang: Language) -> &'a str {
        self.color_names.get(lang).get(color).map_or(color, String::as_str)
    }

    pub fn size_label<'a>(&'a self, size: &'a str, lang: Language) -> &'a str {
        self.size_names.get(lang).get(size).map_or(size, String::as_str)
    }

    /// Apply an admin patch after validating it.
    pub fn apply(&mut self, patch: ProductPatch) -> Result<(), ProductError> {
        patch.validate().map_err(ProductError::from_validation)?;
        if let Some(v) = patch.name_en { self.name.en = v.trim().to_string(); }
        if let Some(v) = patch.name_ar { self.name.ar = v.trim().to_string(); }
        if let Some(v) = patch.price { self.price = Money::new(v, self.price.currency()); }
        if let Some(v) = patch.category { self.category = v; }
        if let Some(v) = patch.description_en { self.description.en = v; }
        if let Some(v) = patch.description_ar { self.description.ar = v; }
        if let Some(v) = patch.images { self.images = non_blank_images(v); }
        if let Some(v) = patch.rating { self.rating = v; }
        if let Some(v) = patch.in_stock { self.stock = if v { IN_STOCK_COUNT } else { 0 }; }
        if let Some(v) = patch.colors { self.colors = v; }
        if let Some(v) = patch.sizes { self.sizes = v; }
        if let Some(v) = patch.color_names { self.color_names = v; }
        if let Some(v) = patch.size_names { self.size_names = v; }
        self.touch();
        self.raise_event(DomainEvent::Product(ProductEvent::Updated { product_id: self.id }));
        Ok(())
    }

    pub fn take_events(&mut self) -> Vec<DomainEvent> { std::mem::take(&mut self.events) }
    fn raise_event(&mut self, e: DomainEvent) { self.events.push(e); }
    fn touch(&mut self) { self.updated_at = Utc::now(); }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProductError {
    #[error("invalid product fields: {}", .0.join(", "))]
    InvalidFields(Vec<String>),
}

impl ProductError {
    fn from_validation(errors: validator::ValidationErrors) -> Self {
        let mut fields: Vec<String> = errors.field_errors().keys().map(|k| k.to_string()).collect();
        fields.sort();
        Self::InvalidFields(fields)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft() -> ProductDraft {
        ProductDraft {
            name_en: "Premium Cotton Shirt".into(),
            name_ar: "قميص قطني فاخر".into(),
            price: Decimal::new(299, 0),
            category: Localized::text("Shirts", "قمصان"),
            images: vec!["/a.png".into(), "  ".into()],
            rating: 4.5,
            in_stock: true,
            colors: vec!["Black".into()],
            sizes: vec!["M".into()],
            ..Default::default()
        }
    }

    #[test]
    fn test_product_create() {
        let mut p = Product::create(draft(), "ILS").unwrap();
        assert_eq!(p.name().en, "Premium Cotton Shirt");
        assert_eq!(p.stock(), IN_STOCK_COUNT);
        assert_eq!(p.images(), ["/a.png".to_string()]);
        assert_eq!(p.take_events().len(), 1);
    }

    #[test]
    fn test_product_create_rejects_missing_fields() {
        let bad = ProductDraft { name_ar: " ".into(), price: Decimal::ZERO, sizes: vec![], ..draft() };
        let err = Product::create(bad, "ILS").unwrap_err();
        assert_eq!(err, ProductError::InvalidFields(vec!["name_ar".into(), "price".into(), "sizes".into()]));
    }

    #[test]
    fn test_price_precision() {
        let fine = ProductDraft { price: "10.50".parse().unwrap(), ..draft() };
        assert_eq!(Product::create(fine, "ILS").unwrap().price().amount(), "10.50".parse::<Decimal>().unwrap());
        assert!(Product::create(ProductDraft { price: "10.500".parse().unwrap(), ..draft() }, "ILS").is_ok());

        let err = Product::create(ProductDraft { price: "10.005".parse().unwrap(), ..draft() }, "ILS").unwrap_err();
        assert_eq!(err, ProductError::InvalidFields(vec!["price".into()]));

        let mut p = Product::create(draft(), "ILS").unwrap();
        let patch = ProductPatch { price: Some("0.001".parse().unwrap()), ..Default::default() };
        assert!(p.apply(patch).is_err());
        assert_eq!(p.price().amount(), Decimal::new(299, 0));
    }

    #[test]
    fn test_from_record_fills_defaults() {
        let record = ProductRecord {
            id: Uuid::new_v4(),
            name_en: "Wool Blazer".into(),
            name_ar: "بليزر صوفي".into(),
            price: Decimal::new(899, 0),
            ..Default::default()
        };
        let p = Product::from_record(record, "ILS");
        assert_eq!(p.images().len(), 3);
        assert_eq!(p.colors(), ["Black", "White", "Navy", "Gray"]);
        assert_eq!(p.sizes(), ["S", "M", "L", "XL"]);
        assert_eq!(p.color_label("Navy", Language::Ar), "كحلي");
        assert_eq!(p.size_label("XL", Language::En), "Extra Large");
        assert_eq!(p.price().currency(), "ILS");
        assert!(!p.is_in_stock());
    }

    #[test]
    fn test_label_falls_back_to_raw_value() {
        let p = Product::create(draft(), "ILS").unwrap();
        assert_eq!(p.color_label("Magenta", Language::Ar), "Magenta");
    }

    #[test]
    fn test_apply_patch() {
        let mut p = Product::create(draft(), "ILS").unwrap();
        p.take_events();
        let patch = ProductPatch { price: Some(Decimal::new(350, 0)), in_stock: Some(false), ..Default::default() };
        p.apply(patch).unwrap();
        assert_eq!(p.price().amount(), Decimal::new(350, 0));
        assert!(!p.is_in_stock());
        assert_eq!(p.take_events().len(), 1);

        let bad = ProductPatch { rating: Some(7.0), ..Default::default() };
        assert!(p.apply(bad).is_err());
    }

    #[test]
    fn test_record_round_trip_keeps_fields() {
        let p = Product::create(draft(), "ILS").unwrap();
        let back = Product::from_record(p.to_record(), "USD");
        assert_eq!(back.price(), p.price());
        assert_eq!(back.colors(), p.colors());
    }
}
