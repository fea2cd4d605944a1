use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::postgres::PgPoolOptions;
use sqlx::types::Json;
use sqlx::PgPool;
use uuid::Uuid;

use super::{Store, StoreError};
use crate::domain::aggregates::{CartLine, CustomerInfo, Order, OrderStatus, Product, ProductPatch, ProductRecord, Review};
use crate::domain::value_objects::{Language, Money};

const PRODUCT_COLUMNS: &str = "id, name_en, name_ar, category_en, category_ar, price, currency, rating, stock, \
     description_en, description_ar, images, colors, sizes, color_names, size_names, created_at, updated_at";

pub async fn create_pool(url: &str, max_connections: u32) -> Result<PgPool, StoreError> {
    let pool = PgPoolOptions::new().max_connections(max_connections).connect(url).await?;
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .map_err(|e| StoreError::Unavailable(format!("migration failed: {e}")))?;
    Ok(pool)
}

pub struct PgStore {
    pool: PgPool,
    currency: String,
}

impl PgStore {
    /// `currency` is applied to product rows that carry none.
    pub fn new(pool: PgPool, currency: &str) -> Self { Self { pool, currency: currency.to_uppercase() } }

    async fn write_product(&self, record: &ProductRecord, sql: &str) -> Result<u64, StoreError> {
        let result = sqlx::query(sql)
            .bind(record.id)
            .bind(&record.name_en)
            .bind(&record.name_ar)
            .bind(&record.category_en)
            .bind(&record.category_ar)
            .bind(record.price)
            .bind(&record.currency)
            .bind(record.rating)
            .bind(record.stock)
            .bind(&record.description_en)
            .bind(&record.description_ar)
            .bind(&record.images)
            .bind(&record.colors)
            .bind(&record.sizes)
            .bind(&record.color_names)
            .bind(&record.size_names)
            .bind(record.created_at)
            .bind(record.updated_at)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}

#[derive(sqlx::FromRow)]
struct OrderRow {
    id: Uuid,
    customer_name: String,
    whatsapp_number: String,
    address: String,
    items: Json<Vec<CartLine>>,
    total_amount: Decimal,
    currency: String,
    status: String,
    language: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<OrderRow> for Order {
    type Error = StoreError;

    fn try_from(row: OrderRow) -> Result<Self, Self::Error> {
        let status = row.status.parse::<OrderStatus>().map_err(|e| StoreError::DataCorruption(format!("order {}: {e}", row.id)))?;
        let language = row.language.parse::<Language>().map_err(|e| StoreError::DataCorruption(format!("order {}: {e}", row.id)))?;
        Ok(Order::restore(
            row.id,
            CustomerInfo::new(row.customer_name, row.whatsapp_number, row.address),
            row.items.0,
            Money::new(row.total_amount, &row.currency),
            status,
            language,
            row.created_at,
        ))
    }
}

#[derive(sqlx::FromRow)]
struct ReviewRow {
    id: Uuid,
    product_id: Uuid,
    rating: i16,
    comment: String,
    reviewer_name: String,
    language: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<ReviewRow> for Review {
    type Error = StoreError;

    fn try_from(row: ReviewRow) -> Result<Self, Self::Error> {
        let rating = u8::try_from(row.rating).map_err(|_| StoreError::DataCorruption(format!("review {}: rating {}", row.id, row.rating)))?;
        let language = row.language.parse::<Language>().map_err(|e| StoreError::DataCorruption(format!("review {}: {e}", row.id)))?;
        Ok(Review::restore(row.id, row.product_id, rating, row.comment, row.reviewer_name, language, row.created_at))
    }
}

#[async_trait]
impl Store for PgStore {
    async fn list_products(&self) -> Result<Vec<Product>, StoreError> {
        let rows = sqlx::query_as::<_, ProductRecord>(&format!("SELECT {PRODUCT_COLUMNS} FROM products ORDER BY created_at"))
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(|r| Product::from_record(r, &self.currency)).collect())
    }

    async fn get_product(&self, id: Uuid) -> Result<Option<Product>, StoreError> {
        let row = sqlx::query_as::<_, ProductRecord>(&format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(|r| Product::from_record(r, &self.currency)))
    }

    async fn insert_product(&self, product: &Product) -> Result<(), StoreError> {
        let sql = format!(
            "INSERT INTO products ({PRODUCT_COLUMNS}) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18)"
        );
        self.write_product(&product.to_record(), &sql).await?;
        Ok(())
    }

    async fn update_product(&self, id: Uuid, patch: ProductPatch) -> Result<Option<Product>, StoreError> {
        let Some(mut product) = self.get_product(id).await? else {
            return Ok(None);
        };
        product.apply(patch)?;
        let sql = "UPDATE products SET name_en = $2, name_ar = $3, category_en = $4, category_ar = $5, price = $6, \
                   currency = $7, rating = $8, stock = $9, description_en = $10, description_ar = $11, images = $12, \
                   colors = $13, sizes = $14, color_names = $15, size_names = $16, created_at = $17, updated_at = $18 \
                   WHERE id = $1";
        let affected = self.write_product(&product.to_record(), sql).await?;
        Ok((affected > 0).then_some(product))
    }

    async fn delete_product(&self, id: Uuid) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM products WHERE id = $1").bind(id).execute(&self.pool).await?;
        Ok(result.rows_affected() > 0)
    }

    async fn insert_order(&self, order: &Order) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT INTO orders (id, customer_name, whatsapp_number, address, items, total_amount, currency, status, language, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)",
        )
        .bind(order.id())
        .bind(&order.customer().full_name)
        .bind(&order.customer().phone)
        .bind(&order.customer().address)
        .bind(Json(order.lines()))
        .bind(order.total().amount())
        .bind(order.total().currency())
        .bind(order.status().as_str())
        .bind(order.language().code())
        .bind(order.created_at())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn list_orders(&self) -> Result<Vec<Order>, StoreError> {
        let rows = sqlx::query_as::<_, OrderRow>(
            "SELECT id, customer_name, whatsapp_number, address, items, total_amount, currency, status, language, created_at \
             FROM orders ORDER BY created_at DESC",
        )
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(Order::try_from).collect()
    }

    async fn update_order_status(&self, id: Uuid, status: OrderStatus) -> Result<Option<Order>, StoreError> {
        let row = sqlx::query_as::<_, OrderRow>(
            "SELECT id, customer_name, whatsapp_number, address, items, total_amount, currency, status, language, created_at \
             FROM orders WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        let Some(row) = row else {
            return Ok(None);
        };
        let mut order = Order::try_from(row)?;
        order.set_status(status);
        sqlx::query("UPDATE orders SET status = $2 WHERE id = $1")
            .bind(id)
            .bind(status.as_str())
            .execute(&self.pool)
            .await?;
        Ok(Some(order))
    }

    async fn insert_review(&self, review: &Review) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT INTO reviews (id, product_id, rating, comment, reviewer_name, language, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7)",
        )
        .bind(review.id())
        .bind(review.product_id())
        .bind(i16::from(review.rating()))
        .bind(review.comment())
        .bind(review.reviewer_name())
        .bind(review.language().code())
        .bind(review.created_at())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn list_reviews(&self, product_id: Uuid) -> Result<Vec<Review>, StoreError> {
        let rows = sqlx::query_as::<_, ReviewRow>(
            "SELECT id, product_id, rating, comment, reviewer_name, language, created_at \
             FROM reviews WHERE product_id = $1 ORDER BY created_at DESC",
        )
        .bind(product_id)
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(Review::try_from).collect()
    }
}
