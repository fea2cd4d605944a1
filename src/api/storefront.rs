use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use uuid::Uuid;

use super::{ApiError, AppState};
use crate::catalog::{self, CatalogFilter, CatalogQuery};
use crate::checkout;
use crate::domain::aggregates::{build_line, Cart, CartLine, CustomerInfo, NewReview, Order, Product, QuantityUpdate, Review, VariantError, VariantSelection};
use crate::domain::value_objects::{Language, Money};
use crate::publisher::publish_all;

pub async fn health() -> Json<Value> {
    Json(json!({"status": "healthy", "service": "jibreel-storefront"}))
}

pub async fn list_products(State(s): State<AppState>, Query(q): Query<CatalogQuery>) -> Result<Json<Vec<Product>>, ApiError> {
    let products = s.store.list_products().await?;
    Ok(Json(catalog::filter(&products, &CatalogFilter::from(&q))))
}

pub async fn get_product(State(s): State<AppState>, Path(id): Path<Uuid>) -> Result<Json<Product>, ApiError> {
    s.store.get_product(id).await?.map(Json).ok_or_else(|| ApiError::NotFound(format!("product {id}")))
}

pub async fn list_reviews(State(s): State<AppState>, Path(id): Path<Uuid>) -> Result<Json<Vec<Review>>, ApiError> {
    Ok(Json(s.store.list_reviews(id).await?))
}

#[derive(Debug, Default, Deserialize)]
pub struct LangQuery {
    pub lang: Option<Language>,
}

pub async fn list_categories(State(s): State<AppState>, Query(q): Query<LangQuery>) -> Result<Json<Vec<String>>, ApiError> {
    let products = s.store.list_products().await?;
    Ok(Json(catalog::categories(&products, q.lang.unwrap_or_default())))
}

pub async fn contact(State(s): State<AppState>) -> Json<Value> {
    Json(json!({ "url": s.contact_url }))
}

#[derive(Debug, Serialize)]
pub struct CartView {
    pub lines: Vec<CartLine>,
    pub total: Money,
    pub item_count: u32,
}

impl From<&Cart> for CartView {
    fn from(cart: &Cart) -> Self {
        Self { lines: cart.lines().to_vec(), total: cart.total(), item_count: cart.item_count() }
    }
}

pub async fn get_cart(State(s): State<AppState>, Path(session): Path<String>) -> Json<CartView> {
    Json(CartView::from(&s.sessions.snapshot(&session).await.cart))
}

#[derive(Debug, Deserialize)]
pub struct AddLineRequest {
    pub product_id: Uuid,
    #[serde(default)]
    pub color: String,
    #[serde(default)]
    pub size: String,
    pub quantity: i64,
    #[serde(default)]
    pub language: Language,
    /// Parsed separately so a malformed review never blocks the add.
    pub review: Option<Value>,
}

#[derive(Debug, Serialize)]
pub struct AddLineResponse {
    pub line_id: Uuid,
    pub cart: CartView,
    /// `None` when no review was submitted.
    pub review_saved: Option<bool>,
}

pub async fn add_line(
    State(s): State<AppState>,
    Path(session): Path<String>,
    Json(req): Json<AddLineRequest>,
) -> Result<(StatusCode, Json<AddLineResponse>), ApiError> {
    let product = s
        .store
        .get_product(req.product_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("product {}", req.product_id)))?;
    let selection = VariantSelection { color: req.color, size: req.size, quantity: req.quantity };
    let line = build_line(&product, &selection)?;
    let (line_id, cart) = s
        .sessions
        .update(&session, |state| state.cart.add_line(line).map(|id| (id, CartView::from(&state.cart))))
        .await?;

    let review_saved = match req.review {
        Some(raw) => Some(save_review(&s, product.id(), raw, req.language).await),
        None => None,
    };
    Ok((StatusCode::CREATED, Json(AddLineResponse { line_id, cart, review_saved })))
}

// The cart line already exists at this point; a failed review is reported, not raised.
async fn save_review(s: &AppState, product_id: Uuid, raw: Value, language: Language) -> bool {
    let input = match serde_json::from_value::<NewReview>(raw) {
        Ok(input) => input,
        Err(e) => {
            tracing::warn!(%product_id, error = %e, "malformed review");
            return false;
        }
    };
    let mut review = match Review::create(product_id, input, language) {
        Ok(review) => review,
        Err(e) => {
            tracing::warn!(%product_id, error = %e, "review rejected");
            return false;
        }
    };
    if let Err(e) = s.store.insert_review(&review).await {
        tracing::warn!(%product_id, error = %e, "review write failed");
        return false;
    }
    publish_all(s.events.as_ref(), review.take_events()).await;
    true
}

#[derive(Debug, Deserialize)]
pub struct QuantityRequest {
    pub quantity: i64,
}

pub async fn update_line(
    State(s): State<AppState>,
    Path((session, line_id)): Path<(String, Uuid)>,
    Json(req): Json<QuantityRequest>,
) -> Result<Json<CartView>, ApiError> {
    let (outcome, cart) = s
        .sessions
        .update(&session, |state| (state.cart.update_quantity(line_id, req.quantity), CartView::from(&state.cart)))
        .await;
    match outcome {
        QuantityUpdate::NotFound => Err(ApiError::NotFound(format!("cart line {line_id}"))),
        QuantityUpdate::TooLarge => Err(VariantError::QuantityTooLarge(req.quantity).into()),
        QuantityUpdate::Updated | QuantityUpdate::Removed => Ok(Json(cart)),
    }
}

pub async fn remove_line(State(s): State<AppState>, Path((session, line_id)): Path<(String, Uuid)>) -> Json<CartView> {
    let cart = s
        .sessions
        .update(&session, |state| {
            state.cart.remove_line(line_id);
            CartView::from(&state.cart)
        })
        .await;
    Json(cart)
}

pub async fn save_customer(
    State(s): State<AppState>,
    Path(session): Path<String>,
    Json(info): Json<CustomerInfo>,
) -> Json<CustomerInfo> {
    s.sessions.update(&session, |state| state.customer = info.clone()).await;
    Json(info)
}

#[derive(Debug, Default, Deserialize)]
pub struct CheckoutRequest {
    #[serde(default)]
    pub language: Language,
}

pub async fn checkout(
    State(s): State<AppState>,
    Path(session): Path<String>,
    body: Option<Json<CheckoutRequest>>,
) -> Result<(StatusCode, Json<Order>), ApiError> {
    let language = body.map(|Json(b)| b.language).unwrap_or_default();
    let snapshot = s.sessions.snapshot(&session).await;
    if snapshot.cart.is_empty() {
        return Err(ApiError::BadRequest("Cart is empty".to_string()));
    }

    let mut order = checkout::submit(s.store.as_ref(), &snapshot.cart, &snapshot.customer, language).await?;
    let ordered: Vec<Uuid> = order.lines().iter().map(|l| l.id).collect();
    s.sessions.settle(&session, &ordered).await;
    publish_all(s.events.as_ref(), order.take_events()).await;
    Ok((StatusCode::CREATED, Json(order)))
}
