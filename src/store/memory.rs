use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{Store, StoreError};
use crate::catalog::sample_products;
use crate::domain::aggregates::{Order, OrderStatus, Product, ProductPatch, Review};

/// In-process store.
///
/// Writes can be switched off with [`MemoryStore::set_unavailable`] to exercise
/// failure paths; write attempts are counted either way.
#[derive(Default)]
pub struct MemoryStore {
    products: RwLock<Vec<Product>>,
    orders: RwLock<Vec<Order>>,
    reviews: RwLock<Vec<Review>>,
    unavailable: AtomicBool,
    order_writes: AtomicU64,
    review_writes: AtomicU64,
}

impl MemoryStore {
    pub fn new() -> Self { Self::default() }

    pub fn with_products(products: Vec<Product>) -> Self {
        Self { products: RwLock::new(products), ..Self::default() }
    }

    /// Store seeded with the demo catalog priced in `currency`.
    pub fn seeded(currency: &str) -> Self { Self::with_products(sample_products(currency)) }

    pub fn set_unavailable(&self, unavailable: bool) { self.unavailable.store(unavailable, Ordering::SeqCst); }

    /// Number of `insert_order` calls, successful or not.
    pub fn order_write_attempts(&self) -> u64 { self.order_writes.load(Ordering::SeqCst) }

    pub fn review_write_attempts(&self) -> u64 { self.review_writes.load(Ordering::SeqCst) }

    fn check_available(&self) -> Result<(), StoreError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("memory store switched off".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn list_products(&self) -> Result<Vec<Product>, StoreError> {
        Ok(self.products.read().await.clone())
    }

    async fn get_product(&self, id: Uuid) -> Result<Option<Product>, StoreError> {
        Ok(self.products.read().await.iter().find(|p| p.id() == id).cloned())
    }

    async fn insert_product(&self, product: &Product) -> Result<(), StoreError> {
        self.check_available()?;
        self.products.write().await.push(product.clone());
        Ok(())
    }

    async fn update_product(&self, id: Uuid, patch: ProductPatch) -> Result<Option<Product>, StoreError> {
        self.check_available()?;
        let mut products = self.products.write().await;
        let Some(product) = products.iter_mut().find(|p| p.id() == id) else {
            return Ok(None);
        };
        product.apply(patch)?;
        let updated = product.clone();
        product.take_events();
        Ok(Some(updated))
    }

    async fn delete_product(&self, id: Uuid) -> Result<bool, StoreError> {
        self.check_available()?;
        let mut products = self.products.write().await;
        let before = products.len();
        products.retain(|p| p.id() != id);
        Ok(products.len() != before)
    }

    async fn insert_order(&self, order: &Order) -> Result<(), StoreError> {
        self.order_writes.fetch_add(1, Ordering::SeqCst);
        self.check_available()?;
        let mut stored = order.clone();
        stored.take_events();
        self.orders.write().await.push(stored);
        Ok(())
    }

    async fn list_orders(&self) -> Result<Vec<Order>, StoreError> {
        let mut orders = self.orders.read().await.clone();
        orders.sort_by_key(|o| std::cmp::Reverse(o.created_at()));
        Ok(orders)
    }

    async fn update_order_status(&self, id: Uuid, status: OrderStatus) -> Result<Option<Order>, StoreError> {
        self.check_available()?;
        let mut orders = self.orders.write().await;
        let Some(order) = orders.iter_mut().find(|o| o.id() == id) else {
            return Ok(None);
        };
        order.set_status(status);
        let updated = order.clone();
        order.take_events();
        Ok(Some(updated))
    }

    async fn insert_review(&self, review: &Review) -> Result<(), StoreError> {
        self.review_writes.fetch_add(1, Ordering::SeqCst);
        self.check_available()?;
        let mut stored = review.clone();
        stored.take_events();
        self.reviews.write().await.push(stored);
        Ok(())
    }

    async fn list_reviews(&self, product_id: Uuid) -> Result<Vec<Review>, StoreError> {
        Ok(self.reviews.read().await.iter().filter(|r| r.product_id() == product_id).cloned().collect())
    }
}
