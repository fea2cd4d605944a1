//! Domain events
use crate::domain::aggregates::OrderStatus;
use rust_decimal::Decimal;
use serde::Serialize;
use uuid::Uuid;

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "aggregate", content = "event", rename_all = "snake_case")]
pub enum DomainEvent {
    Product(ProductEvent),
    Order(OrderEvent),
    Review(ReviewEvent),
}

impl DomainEvent {
    /// Message bus subject the event is published on.
    pub fn subject(&self) -> &'static str {
        match self {
            Self::Product(ProductEvent::Created { .. }) => "storefront.products.created",
            Self::Product(ProductEvent::Updated { .. }) => "storefront.products.updated",
            Self::Product(ProductEvent::Deleted { .. }) => "storefront.products.deleted",
            Self::Order(OrderEvent::Placed { .. }) => "storefront.orders.placed",
            Self::Order(OrderEvent::StatusChanged { .. }) => "storefront.orders.status_changed",
            Self::Review(ReviewEvent::Submitted { .. }) => "storefront.reviews.submitted",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ProductEvent {
    Created { product_id: Uuid },
    Updated { product_id: Uuid },
    Deleted { product_id: Uuid },
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OrderEvent {
    Placed { order_id: Uuid, total: Decimal, currency: String, line_count: usize },
    StatusChanged { order_id: Uuid, from: OrderStatus, to: OrderStatus },
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ReviewEvent {
    Submitted { review_id: Uuid, product_id: Uuid, rating: u8 },
}
