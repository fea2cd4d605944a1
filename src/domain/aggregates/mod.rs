//! Aggregates module
pub mod cart;
pub mod order;
pub mod product;
pub mod review;

pub use cart::{build_line, Cart, CartError, CartLine, QuantityUpdate, VariantError, VariantSelection, MAX_LINE_QUANTITY};
pub use order::{search_orders, CustomerInfo, Order, OrderError, OrderStats, OrderStatus};
pub use product::{LabelMap, Product, ProductDraft, ProductError, ProductPatch, ProductRecord, IN_STOCK_COUNT};
pub use review::{NewReview, Review, ReviewError};
