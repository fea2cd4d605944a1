use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use uuid::Uuid;

use super::{ApiError, AppState, RequireAdmin};
use crate::auth::{self, LoginRequest, LoginResponse};
use crate::catalog;
use crate::domain::aggregates::{search_orders, Order, OrderStats, OrderStatus, Product, ProductDraft, ProductPatch};
use crate::domain::events::{DomainEvent, ProductEvent};
use crate::publisher::publish_all;

pub async fn login(State(s): State<AppState>, Json(req): Json<LoginRequest>) -> Result<Json<LoginResponse>, ApiError> {
    Ok(Json(auth::login(s.auth.as_ref(), &req)?))
}

#[derive(Debug, Default, Deserialize)]
pub struct ProductSearch {
    #[serde(default)]
    pub search: String,
}

pub async fn list_products(
    _: RequireAdmin,
    State(s): State<AppState>,
    Query(q): Query<ProductSearch>,
) -> Result<Json<Vec<Product>>, ApiError> {
    let products = s.store.list_products().await?;
    Ok(Json(catalog::admin_search(&products, &q.search)))
}

pub async fn create_product(
    _: RequireAdmin,
    State(s): State<AppState>,
    Json(draft): Json<ProductDraft>,
) -> Result<(StatusCode, Json<Product>), ApiError> {
    let mut product = Product::create(draft, &s.currency)?;
    s.store.insert_product(&product).await?;
    tracing::info!(product_id = %product.id(), "product created");
    publish_all(s.events.as_ref(), product.take_events()).await;
    Ok((StatusCode::CREATED, Json(product)))
}

pub async fn update_product(
    _: RequireAdmin,
    State(s): State<AppState>,
    Path(id): Path<Uuid>,
    Json(patch): Json<ProductPatch>,
) -> Result<Json<Product>, ApiError> {
    let mut product = s.store.update_product(id, patch).await?.ok_or_else(|| ApiError::NotFound(format!("product {id}")))?;
    tracing::info!(product_id = %id, "product updated");
    publish_all(s.events.as_ref(), product.take_events()).await;
    Ok(Json(product))
}

pub async fn delete_product(_: RequireAdmin, State(s): State<AppState>, Path(id): Path<Uuid>) -> Result<StatusCode, ApiError> {
    if !s.store.delete_product(id).await? {
        return Err(ApiError::NotFound(format!("product {id}")));
    }
    tracing::info!(product_id = %id, "product deleted");
    publish_all(s.events.as_ref(), vec![DomainEvent::Product(ProductEvent::Deleted { product_id: id })]).await;
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Default, Deserialize)]
pub struct OrderQuery {
    #[serde(default)]
    pub search: String,
    /// `all` or one of the order statuses.
    pub status: Option<String>,
}

impl OrderQuery {
    fn status_filter(&self) -> Result<Option<OrderStatus>, ApiError> {
        match self.status.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(s) if s.eq_ignore_ascii_case("all") => Ok(None),
            Some(s) => s.parse().map(Some).map_err(ApiError::BadRequest),
        }
    }
}

pub async fn list_orders(_: RequireAdmin, State(s): State<AppState>, Query(q): Query<OrderQuery>) -> Result<Json<Vec<Order>>, ApiError> {
    let status = q.status_filter()?;
    let orders = s.store.list_orders().await?;
    Ok(Json(search_orders(&orders, q.search.trim(), status).into_iter().cloned().collect()))
}

pub async fn order_stats(_: RequireAdmin, State(s): State<AppState>) -> Result<Json<OrderStats>, ApiError> {
    Ok(Json(OrderStats::from_orders(&s.store.list_orders().await?)))
}

#[derive(Debug, Deserialize)]
pub struct StatusUpdate {
    pub status: OrderStatus,
}

pub async fn set_order_status(
    _: RequireAdmin,
    State(s): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<StatusUpdate>,
) -> Result<Json<Order>, ApiError> {
    let mut order = s.store.update_order_status(id, req.status).await?.ok_or_else(|| ApiError::NotFound(format!("order {id}")))?;
    tracing::info!(order_id = %id, status = %req.status, "order status updated");
    publish_all(s.events.as_ref(), order.take_events()).await;
    Ok(Json(order))
}
