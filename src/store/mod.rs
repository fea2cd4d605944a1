//! Persistence collaborator for products, orders and reviews.
//!
//! [`PgStore`] talks to PostgreSQL; [`MemoryStore`] keeps everything in process
//! and backs local runs without a database as well as the tests.

mod memory;
mod postgres;

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::aggregates::{Order, OrderStatus, Product, ProductPatch, ProductError, Review};

pub use memory::MemoryStore;
pub use postgres::{create_pool, PgStore};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("store unavailable: {0}")]
    Unavailable(String),
    #[error("corrupt row: {0}")]
    DataCorruption(String),
    #[error(transparent)]
    InvalidProduct(#[from] ProductError),
}

#[async_trait]
pub trait Store: Send + Sync + 'static {
    async fn list_products(&self) -> Result<Vec<Product>, StoreError>;
    async fn get_product(&self, id: Uuid) -> Result<Option<Product>, StoreError>;
    async fn insert_product(&self, product: &Product) -> Result<(), StoreError>;
    /// Returns the patched product, or `None` when no product has `id`.
    async fn update_product(&self, id: Uuid, patch: ProductPatch) -> Result<Option<Product>, StoreError>;
    /// Returns whether a product was deleted.
    async fn delete_product(&self, id: Uuid) -> Result<bool, StoreError>;

    async fn insert_order(&self, order: &Order) -> Result<(), StoreError>;
    /// Newest first.
    async fn list_orders(&self) -> Result<Vec<Order>, StoreError>;
    async fn update_order_status(&self, id: Uuid, status: OrderStatus) -> Result<Option<Order>, StoreError>;

    async fn insert_review(&self, review: &Review) -> Result<(), StoreError>;
    async fn list_reviews(&self, product_id: Uuid) -> Result<Vec<Review>, StoreError>;
}
