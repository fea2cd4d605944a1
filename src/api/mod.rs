//! HTTP surface: storefront, back office and uploads.

mod admin;
mod error;
mod storefront;
mod upload;

use std::sync::Arc;

use axum::extract::{DefaultBodyLimit, FromRequestParts};
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use axum::routing::{get, post, put};
use axum::Router;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::auth::{bearer_token, AuthError, Authenticator};
use crate::publisher::EventPublisher;
use crate::session::SessionStore;
use crate::store::Store;
use crate::upload::{BlobStore, MAX_UPLOAD_BYTES};

pub use error::ApiError;

/// Room for multipart framing around a maximum-size image, so oversize files
/// reach validation and get a 400 instead of a transport error.
const UPLOAD_BODY_LIMIT: usize = MAX_UPLOAD_BYTES * 2;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub sessions: Arc<SessionStore>,
    pub auth: Arc<dyn Authenticator>,
    pub blobs: Arc<dyn BlobStore>,
    pub events: Arc<dyn EventPublisher>,
    pub currency: String,
    pub contact_url: String,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(storefront::health))
        .route("/api/v1/products", get(storefront::list_products))
        .route("/api/v1/products/:id", get(storefront::get_product))
        .route("/api/v1/products/:id/reviews", get(storefront::list_reviews))
        .route("/api/v1/categories", get(storefront::list_categories))
        .route("/api/v1/contact", get(storefront::contact))
        .route("/api/v1/cart/:session", get(storefront::get_cart))
        .route("/api/v1/cart/:session/lines", post(storefront::add_line))
        .route("/api/v1/cart/:session/lines/:line_id", put(storefront::update_line).delete(storefront::remove_line))
        .route("/api/v1/cart/:session/customer", put(storefront::save_customer))
        .route("/api/v1/checkout/:session", post(storefront::checkout))
        .route("/api/admin/login", post(admin::login))
        .route("/api/admin/products", get(admin::list_products).post(admin::create_product))
        .route("/api/admin/products/:id", put(admin::update_product).delete(admin::delete_product))
        .route("/api/admin/orders", get(admin::list_orders))
        .route("/api/admin/orders/stats", get(admin::order_stats))
        .route("/api/admin/orders/:id/status", put(admin::set_order_status))
        .route("/api/upload", post(upload::upload_image).layer(DefaultBodyLimit::max(UPLOAD_BODY_LIMIT)))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Extractor that admits only requests carrying a valid admin bearer token.
pub struct RequireAdmin;

#[axum::async_trait]
impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(bearer_token)
            .ok_or(AuthError::Unauthorized)?;
        if !state.auth.verify(token) {
            tracing::warn!(path = %parts.uri.path(), "admin token rejected");
            return Err(AuthError::Unauthorized.into());
        }
        Ok(Self)
    }
}
