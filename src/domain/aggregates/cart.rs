//! Cart Aggregate

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::aggregates::Product;
use crate::domain::value_objects::{Localized, Money, MoneyError};

/// One cart entry: a chosen product variant with the price captured when it was added.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    pub id: Uuid,
    pub product_id: Uuid,
    pub name: Localized,
    pub unit_price: Money,
    pub color: String,
    pub size: String,
    pub quantity: u32,
    pub added_at: DateTime<Utc>,
}

impl CartLine {
    pub fn line_total(&self) -> Money { self.unit_price.multiply(self.quantity) }
}

/// Customer's variant choice for a product.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct VariantSelection {
    #[serde(default)]
    pub color: String,
    #[serde(default)]
    pub size: String,
    pub quantity: i64,
}

/// Largest quantity a single line may carry.
pub const MAX_LINE_QUANTITY: u32 = 999;

/// Build a line item for `product`, checking the selection against its declared options.
pub fn build_line(product: &Product, selection: &VariantSelection) -> Result<CartLine, VariantError> {
    if selection.quantity < 1 {
        return Err(VariantError::InvalidQuantity(selection.quantity));
    }
    let quantity = checked_quantity(selection.quantity)?;
    check_option(product.colors(), &selection.color).map_err(VariantError::UnknownColor)?;
    check_option(product.sizes(), &selection.size).map_err(VariantError::UnknownSize)?;
    if !product.is_in_stock() {
        return Err(VariantError::OutOfStock(product.id()));
    }
    Ok(CartLine {
        id: Uuid::new_v4(),
        product_id: product.id(),
        name: product.name().clone(),
        unit_price: product.price().clone(),
        color: selection.color.clone(),
        size: selection.size.clone(),
        quantity,
        added_at: Utc::now(),
    })
}

fn checked_quantity(quantity: i64) -> Result<u32, VariantError> {
    match u32::try_from(quantity) {
        Ok(q) if q <= MAX_LINE_QUANTITY => Ok(q),
        _ => Err(VariantError::QuantityTooLarge(quantity)),
    }
}

// A product without declared options only accepts the empty selection.
fn check_option(options: &[String], chosen: &str) -> Result<(), String> {
    let valid = if options.is_empty() { chosen.is_empty() } else { options.iter().any(|o| o == chosen) };
    if valid { Ok(()) } else { Err(chosen.to_string()) }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cart {
    lines: Vec<CartLine>,
    currency: String,
    updated_at: DateTime<Utc>,
}

/// Outcome of [`Cart::update_quantity`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuantityUpdate { Updated, Removed, NotFound, TooLarge }

impl Cart {
    pub fn new(currency: &str) -> Self {
        Self { lines: vec![], currency: currency.to_uppercase(), updated_at: Utc::now() }
    }

    pub fn lines(&self) -> &[CartLine] { &self.lines }
    pub fn line(&self, id: Uuid) -> Option<&CartLine> { self.lines.iter().find(|l| l.id == id) }
    pub fn currency(&self) -> &str { &self.currency }
    pub fn len(&self) -> usize { self.lines.len() }
    pub fn is_empty(&self) -> bool { self.lines.is_empty() }

    /// Sum of quantities across lines.
    pub fn item_count(&self) -> u32 { self.lines.iter().fold(0u32, |n, l| n.saturating_add(l.quantity)) }

    /// Fresh total over the current lines.
    pub fn total(&self) -> Money {
        sum_lines(&self.lines, &self.currency).unwrap_or_else(|_| Money::zero(&self.currency))
    }

    /// Append a line. Identical variants are kept as separate lines.
    pub fn add_line(&mut self, line: CartLine) -> Result<Uuid, CartError> {
        if line.unit_price.currency() != self.currency {
            return Err(CartError::Money(MoneyError::CurrencyMismatch {
                left: self.currency.clone(),
                right: line.unit_price.currency().to_string(),
            }));
        }
        let id = line.id;
        self.lines.push(line);
        self.touch();
        Ok(id)
    }

    /// Set a line's quantity; zero or less removes the line, more than
    /// [`MAX_LINE_QUANTITY`] leaves it unchanged.
    pub fn update_quantity(&mut self, line_id: Uuid, quantity: i64) -> QuantityUpdate {
        if quantity <= 0 {
            return if self.remove_line(line_id) { QuantityUpdate::Removed } else { QuantityUpdate::NotFound };
        }
        let Some(line) = self.lines.iter_mut().find(|l| l.id == line_id) else {
            return QuantityUpdate::NotFound;
        };
        let Ok(quantity) = checked_quantity(quantity) else {
            return QuantityUpdate::TooLarge;
        };
        line.quantity = quantity;
        self.touch();
        QuantityUpdate::Updated
    }

    /// Remove a line; returns whether anything was removed.
    pub fn remove_line(&mut self, line_id: Uuid) -> bool {
        let before = self.lines.len();
        self.lines.retain(|l| l.id != line_id);
        let removed = self.lines.len() != before;
        if removed { self.touch(); }
        removed
    }

    pub fn clear(&mut self) { self.lines.clear(); self.touch(); }

    fn touch(&mut self) { self.updated_at = Utc::now(); }
}

/// Σ unit price × quantity.
pub(crate) fn sum_lines(lines: &[CartLine], currency: &str) -> Result<Money, MoneyError> {
    lines.iter().try_fold(Money::zero(currency), |acc, l| acc.add(&l.line_total()))
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum VariantError {
    #[error("quantity must be at least 1, got {0}")]
    InvalidQuantity(i64),
    #[error("quantity must be at most 999, got {0}")]
    QuantityTooLarge(i64),
    #[error("color {0:?} is not offered for this product")]
    UnknownColor(String),
    #[error("size {0:?} is not offered for this product")]
    UnknownSize(String),
    #[error("product {0} is out of stock")]
    OutOfStock(Uuid),
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CartError {
    #[error(transparent)]
    Money(#[from] MoneyError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::sample_products;
    use crate::domain::aggregates::{ProductPatch, ProductRecord};
    use rust_decimal::Decimal;

    fn shirt() -> Product { sample_products("ILS").remove(0) }
    fn jeans() -> Product { sample_products("ILS").remove(1) }

    fn select(color: &str, size: &str, quantity: i64) -> VariantSelection {
        VariantSelection { color: color.into(), size: size.into(), quantity }
    }

    #[test]
    fn test_build_line_captures_price() {
        let line = build_line(&shirt(), &select("White", "M", 2)).unwrap();
        assert_eq!(line.unit_price.amount(), Decimal::new(299, 0));
        assert_eq!(line.quantity, 2);
        assert_eq!(line.line_total().amount(), Decimal::new(598, 0));
    }

    #[test]
    fn test_build_line_rejects_zero_quantity() {
        assert_eq!(build_line(&shirt(), &select("White", "M", 0)), Err(VariantError::InvalidQuantity(0)));
        assert_eq!(build_line(&shirt(), &select("White", "M", -3)), Err(VariantError::InvalidQuantity(-3)));
    }

    #[test]
    fn test_quantity_is_capped() {
        let max = i64::from(MAX_LINE_QUANTITY);
        assert_eq!(build_line(&shirt(), &select("White", "M", max)).unwrap().quantity, MAX_LINE_QUANTITY);
        assert_eq!(build_line(&shirt(), &select("White", "M", max + 1)), Err(VariantError::QuantityTooLarge(max + 1)));
        let huge = i64::from(u32::MAX);
        assert_eq!(build_line(&shirt(), &select("White", "M", huge)), Err(VariantError::QuantityTooLarge(huge)));
        assert!(VariantError::QuantityTooLarge(huge).to_string().contains("at most"));

        let mut cart = Cart::new("ILS");
        let a = cart.add_line(build_line(&shirt(), &select("White", "M", max)).unwrap()).unwrap();
        cart.add_line(build_line(&shirt(), &select("White", "L", max)).unwrap()).unwrap();
        assert_eq!(cart.update_quantity(a, i64::MAX), QuantityUpdate::TooLarge);
        assert_eq!(cart.line(a).unwrap().quantity, MAX_LINE_QUANTITY);
        assert_eq!(cart.item_count(), 2 * MAX_LINE_QUANTITY);
    }

    #[test]
    fn test_build_line_rejects_undeclared_options() {
        assert_eq!(build_line(&shirt(), &select("Orange", "M", 1)), Err(VariantError::UnknownColor("Orange".into())));
        assert_eq!(build_line(&shirt(), &select("White", "28", 1)), Err(VariantError::UnknownSize("28".into())));
    }

    #[test]
    fn test_build_line_without_declared_options() {
        let record = ProductRecord {
            id: Uuid::new_v4(),
            name_en: "Gift Card".into(),
            name_ar: "بطاقة هدية".into(),
            price: Decimal::new(100, 0),
            stock: Some(5),
            colors: Some(vec![]),
            sizes: Some(vec![]),
            ..Default::default()
        };
        let card = Product::from_record(record, "ILS");
        assert!(build_line(&card, &select("", "", 1)).is_ok());
        assert_eq!(build_line(&card, &select("Black", "", 1)), Err(VariantError::UnknownColor("Black".into())));
    }

    #[test]
    fn test_build_line_rejects_out_of_stock() {
        let mut blazer = sample_products("ILS").remove(2);
        blazer.apply(ProductPatch { in_stock: Some(false), ..Default::default() }).unwrap();
        assert_eq!(build_line(&blazer, &select("Navy", "M", 1)), Err(VariantError::OutOfStock(blazer.id())));
    }

    #[test]
    fn test_cart_totals() {
        let mut cart = Cart::new("ILS");
        cart.add_line(build_line(&shirt(), &select("White", "M", 2)).unwrap()).unwrap();
        cart.add_line(build_line(&jeans(), &select("Black", "32", 1)).unwrap()).unwrap();
        assert_eq!(cart.total().amount(), Decimal::new(1048, 0));
        assert_eq!(cart.item_count(), 3);
    }

    #[test]
    fn test_identical_variants_are_not_merged() {
        let mut cart = Cart::new("ILS");
        let a = cart.add_line(build_line(&shirt(), &select("White", "M", 1)).unwrap()).unwrap();
        let b = cart.add_line(build_line(&shirt(), &select("White", "M", 1)).unwrap()).unwrap();
        assert_ne!(a, b);
        assert_eq!(cart.len(), 2);
        assert!(cart.line(a).is_some() && cart.line(b).is_some());
    }

    #[test]
    fn test_update_quantity_to_zero_removes_line() {
        let mut cart = Cart::new("ILS");
        let a = cart.add_line(build_line(&shirt(), &select("White", "M", 1)).unwrap()).unwrap();
        cart.add_line(build_line(&jeans(), &select("Black", "32", 1)).unwrap()).unwrap();
        assert_eq!(cart.update_quantity(a, 0), QuantityUpdate::Removed);
        assert_eq!(cart.len(), 1);
        assert!(cart.line(a).is_none());
    }

    #[test]
    fn test_update_quantity() {
        let mut cart = Cart::new("ILS");
        let a = cart.add_line(build_line(&shirt(), &select("White", "M", 1)).unwrap()).unwrap();
        assert_eq!(cart.update_quantity(a, 4), QuantityUpdate::Updated);
        assert_eq!(cart.line(a).unwrap().quantity, 4);
        assert_eq!(cart.update_quantity(Uuid::new_v4(), 2), QuantityUpdate::NotFound);
    }

    #[test]
    fn test_remove_line_is_idempotent() {
        let mut cart = Cart::new("ILS");
        let a = cart.add_line(build_line(&shirt(), &select("White", "M", 1)).unwrap()).unwrap();
        assert!(cart.remove_line(a));
        assert!(!cart.remove_line(a));
        assert!(cart.is_empty());
    }

    #[test]
    fn test_add_line_rejects_other_currency() {
        let mut cart = Cart::new("USD");
        let line = build_line(&shirt(), &select("White", "M", 1)).unwrap();
        assert!(matches!(cart.add_line(line), Err(CartError::Money(_))));
        assert!(cart.is_empty());
    }
}
