//! Order Aggregate

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::domain::aggregates::cart::{sum_lines, CartLine};
use crate::domain::aggregates::product::not_blank;
use crate::domain::events::{DomainEvent, OrderEvent};
use crate::domain::value_objects::{Language, Money, MoneyError};

/// Contact details collected at checkout.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct CustomerInfo {
    #[validate(custom = "not_blank")]
    pub full_name: String,
    #[validate(custom = "not_blank")]
    pub phone: String,
    #[validate(custom = "not_blank")]
    pub address: String,
}

impl CustomerInfo {
    pub fn new(full_name: impl Into<String>, phone: impl Into<String>, address: impl Into<String>) -> Self {
        Self { full_name: full_name.into(), phone: phone.into(), address: address.into() }
    }

    /// Names of the required fields that are blank after trimming, sorted.
    pub fn missing_fields(&self) -> Vec<String> {
        match self.validate() {
            Ok(()) => vec![],
            Err(errors) => {
                let mut fields: Vec<String> = errors.field_errors().keys().map(|k| k.to_string()).collect();
                fields.sort();
                fields
            }
        }
    }

    pub fn trimmed(&self) -> Self {
        Self::new(self.full_name.trim(), self.phone.trim(), self.address.trim())
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    #[default]
    Pending,
    Processing,
    Shipped,
    Delivered,
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 4] = [Self::Pending, Self::Processing, Self::Shipped, Self::Delivered];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Processing => "processing",
            Self::Shipped => "shipped",
            Self::Delivered => "delivered",
        }
    }

    /// Badge label shown in the back office.
    pub fn label(self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::Processing => "Processing",
            Self::Shipped => "Shipped",
            Self::Delivered => "Delivered",
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) }
}

impl FromStr for OrderStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|st| st.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("invalid order status: {s}"))
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    id: Uuid,
    customer: CustomerInfo,
    lines: Vec<CartLine>,
    total: Money,
    status: OrderStatus,
    language: Language,
    created_at: DateTime<Utc>,
    #[serde(skip)]
    events: Vec<DomainEvent>,
}

impl Order {
    /// Place a new pending order over a snapshot of the given lines.
    pub fn place(customer: CustomerInfo, lines: Vec<CartLine>, currency: &str, language: Language) -> Result<Self, OrderError> {
        let total = sum_lines(&lines, currency)?;
        let id = Uuid::now_v7();
        let mut order = Self {
            id, customer, total, lines, language,
            status: OrderStatus::Pending, created_at: Utc::now(), events: vec![],
        };
        order.raise_event(DomainEvent::Order(OrderEvent::Placed {
            order_id: id,
            total: order.total.amount(),
            currency: order.total.currency().to_string(),
            line_count: order.lines.len(),
        }));
        Ok(order)
    }

    /// Rebuild an order read back from the store.
    pub fn restore(
        id: Uuid, customer: CustomerInfo, lines: Vec<CartLine>, total: Money,
        status: OrderStatus, language: Language, created_at: DateTime<Utc>,
    ) -> Self {
        Self { id, customer, lines, total, status, language, created_at, events: vec![] }
    }

    pub fn id(&self) -> Uuid { self.id }
    pub fn customer(&self) -> &CustomerInfo { &self.customer }
    pub fn lines(&self) -> &[CartLine] { &self.lines }
    pub fn total(&self) -> &Money { &self.total }
    pub fn status(&self) -> OrderStatus { self.status }
    pub fn language(&self) -> Language { self.language }
    pub fn created_at(&self) -> DateTime<Utc> { self.created_at }

    /// Total recomputed from the order's own line snapshots.
    pub fn computed_total(&self) -> Result<Money, MoneyError> { sum_lines(&self.lines, self.total.currency()) }

    /// Any status may follow any other.
    pub fn set_status(&mut self, status: OrderStatus) {
        let from = self.status;
        self.status = status;
        self.raise_event(DomainEvent::Order(OrderEvent::StatusChanged { order_id: self.id, from, to: status }));
    }

    pub fn take_events(&mut self) -> Vec<DomainEvent> { std::mem::take(&mut self.events) }
    fn raise_event(&mut self, e: DomainEvent) { self.events.push(e); }
}

/// Back-office order search: id or customer name (case-insensitive) or phone (raw),
/// restricted to `status` when given.
pub fn search_orders<'a>(orders: &'a [Order], term: &str, status: Option<OrderStatus>) -> Vec<&'a Order> {
    let needle = term.to_lowercase();
    orders
        .iter()
        .filter(|o| {
            o.id.to_string().to_lowercase().contains(&needle)
                || o.customer.full_name.to_lowercase().contains(&needle)
                || o.customer.phone.contains(term)
        })
        .filter(|o| status.map_or(true, |s| o.status == s))
        .collect()
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct OrderStats {
    pub total: usize,
    pub pending: usize,
    pub processing: usize,
    pub shipped: usize,
    pub delivered: usize,
    /// Sum of totals over delivered orders only.
    pub revenue: Decimal,
}

impl OrderStats {
    pub fn from_orders(orders: &[Order]) -> Self {
        let mut stats = Self { total: orders.len(), ..Default::default() };
        for order in orders {
            match order.status {
                OrderStatus::Pending => stats.pending += 1,
                OrderStatus::Processing => stats.processing += 1,
                OrderStatus::Shipped => stats.shipped += 1,
                OrderStatus::Delivered => {
                    stats.delivered += 1;
                    stats.revenue += order.total.amount();
                }
            }
        }
        stats
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum OrderError {
    #[error(transparent)]
    Money(#[from] MoneyError),
}
