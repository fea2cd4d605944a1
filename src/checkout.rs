//! Checkout submission: validate the customer's details, price the cart and
//! write one pending order.
//!
//! The submitter only borrows the cart and customer info, so a failed
//! submission leaves both exactly as they were for the caller to retry. There
//! is no dedup key: retrying after an unobserved success creates a second order.

use crate::domain::aggregates::{Cart, CustomerInfo, Order, OrderError, VariantError};
use crate::domain::value_objects::Language;
use crate::store::{Store, StoreError};

/// Input rejected before any store call.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("missing required fields: {}", .0.join(", "))]
    MissingCustomerFields(Vec<String>),
    #[error(transparent)]
    Variant(#[from] VariantError),
}

#[derive(Debug, thiserror::Error)]
pub enum CheckoutError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("order submission failed: {0}")]
    Submission(#[source] StoreError),
    #[error(transparent)]
    Order(#[from] OrderError),
}

/// Place an order for the cart's current lines.
///
/// The total is summed fresh from the lines at call time. An empty cart is not
/// rejected here; HTTP checkout guards against it.
pub async fn submit(store: &dyn Store, cart: &Cart, customer: &CustomerInfo, language: Language) -> Result<Order, CheckoutError> {
    let missing = customer.missing_fields();
    if !missing.is_empty() {
        tracing::debug!(?missing, "checkout rejected");
        return Err(ValidationError::MissingCustomerFields(missing).into());
    }

    let order = Order::place(customer.trimmed(), cart.lines().to_vec(), cart.currency(), language)?;
    if let Err(e) = store.insert_order(&order).await {
        tracing::error!(order_id = %order.id(), error = %e, "order write failed");
        return Err(CheckoutError::Submission(e));
    }

    tracing::info!(order_id = %order.id(), total = %order.total(), lines = order.lines().len(), "order placed");
    Ok(order)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::aggregates::{build_line, OrderStatus, VariantSelection};
    use crate::domain::events::{DomainEvent, OrderEvent};
    use crate::store::MemoryStore;
    use rust_decimal::Decimal;

    fn customer() -> CustomerInfo { CustomerInfo::new("Layla Haddad", "0599123456", "Jenin, Main St") }

    async fn cart(store: &MemoryStore) -> Cart {
        let products = store.list_products().await.unwrap();
        let mut cart = Cart::new("ILS");
        let shirt = VariantSelection { color: "White".into(), size: "M".into(), quantity: 2 };
        let jeans = VariantSelection { color: "Black".into(), size: "32".into(), quantity: 1 };
        cart.add_line(build_line(&products[0], &shirt).unwrap()).unwrap();
        cart.add_line(build_line(&products[1], &jeans).unwrap()).unwrap();
        cart
    }

    #[tokio::test]
    async fn test_submit_places_pending_order() {
        let store = MemoryStore::seeded("ILS");
        let cart = cart(&store).await;
        let mut order = submit(&store, &cart, &customer(), Language::Ar).await.unwrap();

        assert_eq!(order.status(), OrderStatus::Pending);
        assert_eq!(order.total().amount(), Decimal::new(1048, 0));
        assert_eq!(order.language(), Language::Ar);
        assert_eq!(store.list_orders().await.unwrap().len(), 1);
        assert!(matches!(order.take_events().as_slice(), [DomainEvent::Order(OrderEvent::Placed { .. })]));
    }

    #[tokio::test]
    async fn test_blank_fields_never_reach_the_store() {
        let store = MemoryStore::seeded("ILS");
        let cart = cart(&store).await;
        let info = CustomerInfo::new("Layla", "   ", "");
        let err = submit(&store, &cart, &info, Language::En).await.unwrap_err();

        match err {
            CheckoutError::Validation(ValidationError::MissingCustomerFields(fields)) => {
                assert_eq!(fields, vec!["address".to_string(), "phone".to_string()]);
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(store.order_write_attempts(), 0);
    }

    #[tokio::test]
    async fn test_store_failure_preserves_caller_state() {
        let store = MemoryStore::seeded("ILS");
        let cart = cart(&store).await;
        let info = customer();
        let (cart_before, info_before) = (cart.clone(), info.clone());
        store.set_unavailable(true);

        let err = submit(&store, &cart, &info, Language::En).await.unwrap_err();
        assert!(matches!(err, CheckoutError::Submission(StoreError::Unavailable(_))));
        assert_eq!(cart, cart_before);
        assert_eq!(info, info_before);

        store.set_unavailable(false);
        submit(&store, &cart, &info, Language::En).await.unwrap();
        assert_eq!(store.order_write_attempts(), 2);
    }

    #[tokio::test]
    async fn test_empty_cart_is_permitted() {
        let store = MemoryStore::seeded("ILS");
        let order = submit(&store, &Cart::new("ILS"), &customer(), Language::En).await.unwrap();
        assert!(order.lines().is_empty());
        assert_eq!(order.total().amount(), Decimal::ZERO);
    }

    #[tokio::test]
    async fn test_resubmission_creates_a_second_order() {
        let store = MemoryStore::seeded("ILS");
        let cart = cart(&store).await;
        let first = submit(&store, &cart, &customer(), Language::En).await.unwrap();
        let second = submit(&store, &cart, &customer(), Language::En).await.unwrap();
        assert_ne!(first.id(), second.id());
        assert_eq!(store.list_orders().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_customer_fields_are_trimmed() {
        let store = MemoryStore::seeded("ILS");
        let info = CustomerInfo::new("  Layla  ", " 0599 ", " Jenin ");
        let order = submit(&store, &Cart::new("ILS"), &info, Language::En).await.unwrap();
        assert_eq!(order.customer().full_name, "Layla");
        assert_eq!(order.customer().phone, "0599");
    }
}
