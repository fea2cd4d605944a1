use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

use crate::auth::AuthError;
use crate::checkout::{CheckoutError, ValidationError};
use crate::domain::aggregates::{CartError, OrderError, ProductError, ReviewError, VariantError};
use crate::store::StoreError;
use crate::upload::UploadError;

/// Request-level error; every variant renders as `{"error": ...}`.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Product(#[from] ProductError),
    #[error("{0}")]
    Auth(#[from] AuthError),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error(transparent)]
    Store(StoreError),
    #[error(transparent)]
    Checkout(#[from] CheckoutError),
    #[error(transparent)]
    Upload(#[from] UploadError),
}

impl From<StoreError> for ApiError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::InvalidProduct(p) => Self::Product(p),
            other => Self::Store(other),
        }
    }
}

impl From<VariantError> for ApiError {
    fn from(e: VariantError) -> Self { Self::Validation(e.into()) }
}

impl From<CartError> for ApiError {
    fn from(e: CartError) -> Self { Self::BadRequest(e.to_string()) }
}

impl From<OrderError> for ApiError {
    fn from(e: OrderError) -> Self { Self::BadRequest(e.to_string()) }
}

impl From<ReviewError> for ApiError {
    fn from(e: ReviewError) -> Self { Self::BadRequest(e.to_string()) }
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) | Self::Validation(_) | Self::Product(_) => StatusCode::BAD_REQUEST,
            Self::Auth(_) => StatusCode::UNAUTHORIZED,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Checkout(CheckoutError::Submission(_)) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Checkout(_) => StatusCode::BAD_REQUEST,
            Self::Upload(e) if e.is_client_error() => StatusCode::BAD_REQUEST,
            Self::Upload(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    // Server-side details stay in the logs.
    fn message(&self) -> String {
        match self {
            Self::Store(_) => "Internal server error".to_string(),
            Self::Checkout(CheckoutError::Submission(_)) => "Failed to place order. Please try again.".to_string(),
            Self::Upload(e) if !e.is_client_error() => "Upload failed".to_string(),
            other => other.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        } else {
            tracing::debug!(error = %self, %status, "request rejected");
        }
        (status, Json(json!({ "error": self.message() }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(ApiError::NotFound("product".into()).status(), StatusCode::NOT_FOUND);
        assert_eq!(ApiError::from(AuthError::Unauthorized).status(), StatusCode::UNAUTHORIZED);
        assert_eq!(ApiError::from(UploadError::NoFile).status(), StatusCode::BAD_REQUEST);
        assert_eq!(ApiError::from(StoreError::Unavailable("down".into())).status(), StatusCode::INTERNAL_SERVER_ERROR);
        let invalid = StoreError::InvalidProduct(ProductError::InvalidFields(vec!["price".into()]));
        assert_eq!(ApiError::from(invalid).status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_server_errors_hide_details() {
        let err = ApiError::from(StoreError::Unavailable("pg at 10.0.0.3 refused".into()));
        assert_eq!(err.message(), "Internal server error");
        let err = ApiError::from(UploadError::Storage(std::io::Error::new(std::io::ErrorKind::Other, "disk full")));
        assert_eq!(err.message(), "Upload failed");
        let err = ApiError::from(CheckoutError::Submission(StoreError::Unavailable("x".into())));
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!err.message().contains('x'));
    }
}
