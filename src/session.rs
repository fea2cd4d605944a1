//! Per-browsing-session cart and customer details.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use tokio::sync::RwLock;
use uuid::Uuid;

use crate::domain::aggregates::{Cart, CustomerInfo};

/// Idle time after which a session is forgotten.
pub const DEFAULT_IDLE_TIMEOUT: Duration = Duration::from_secs(2 * 60 * 60);

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SessionState {
    pub cart: Cart,
    pub customer: CustomerInfo,
}

impl SessionState {
    fn new(currency: &str) -> Self { Self { cart: Cart::new(currency), customer: CustomerInfo::default() } }

    fn is_blank(&self) -> bool { self.cart.is_empty() && self.customer == CustomerInfo::default() }
}

struct Entry {
    state: SessionState,
    touched_at: Instant,
}

/// In-memory session map.
///
/// Only sessions holding a cart line or customer details are kept, and those
/// are dropped by [`SessionStore::evict_idle`] once untouched for the idle timeout.
pub struct SessionStore {
    currency: String,
    idle_timeout: Duration,
    sessions: RwLock<HashMap<String, Entry>>,
}

impl SessionStore {
    pub fn new(currency: &str) -> Self { Self::with_idle_timeout(currency, DEFAULT_IDLE_TIMEOUT) }

    pub fn with_idle_timeout(currency: &str, idle_timeout: Duration) -> Self {
        Self { currency: currency.to_uppercase(), idle_timeout, sessions: RwLock::new(HashMap::new()) }
    }

    pub fn idle_timeout(&self) -> Duration { self.idle_timeout }

    /// Number of sessions currently held.
    pub async fn len(&self) -> usize { self.sessions.read().await.len() }

    /// Copy of the session's state; a fresh empty state for unknown sessions.
    pub async fn snapshot(&self, session: &str) -> SessionState {
        self.sessions
            .read()
            .await
            .get(session)
            .map(|e| e.state.clone())
            .unwrap_or_else(|| SessionState::new(&self.currency))
    }

    /// Run `f` against the session's state under the write lock.
    ///
    /// A session left blank by `f` is not kept.
    pub async fn update<T>(&self, session: &str, f: impl FnOnce(&mut SessionState) -> T) -> T {
        let mut sessions = self.sessions.write().await;
        let entry = sessions
            .entry(session.to_string())
            .or_insert_with(|| Entry { state: SessionState::new(&self.currency), touched_at: Instant::now() });
        let out = f(&mut entry.state);
        entry.touched_at = Instant::now();
        if entry.state.is_blank() {
            sessions.remove(session);
        }
        out
    }

    /// Forget sessions idle for at least the idle timeout; returns how many were dropped.
    pub async fn evict_idle(&self) -> usize {
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, e| e.touched_at.elapsed() < self.idle_timeout);
        let evicted = before - sessions.len();
        if evicted > 0 {
            tracing::debug!(evicted, remaining = sessions.len(), "idle sessions evicted");
        }
        evicted
    }

    /// Drop the lines an order was placed for and forget the customer details.
    ///
    /// Lines added while the order was being written stay in the cart.
    pub async fn settle(&self, session: &str, ordered: &[Uuid]) {
        self.update(session, |state| {
            for id in ordered {
                state.cart.remove_line(*id);
            }
            state.customer = CustomerInfo::default();
        })
        .await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::sample_products;
    use crate::domain::aggregates::{build_line, VariantSelection};

    #[tokio::test]
    async fn test_sessions_are_isolated() {
        let store = SessionStore::new("ils");
        let product = &sample_products("ILS")[2];
        let line = build_line(product, &VariantSelection { color: "Navy".into(), size: "M".into(), quantity: 1 }).unwrap();
        store.update("a", |s| s.cart.add_line(line)).await.unwrap();

        assert_eq!(store.snapshot("a").await.cart.len(), 1);
        assert!(store.snapshot("b").await.cart.is_empty());
        assert_eq!(store.snapshot("b").await.cart.currency(), "ILS");
    }

    #[tokio::test]
    async fn test_settle_resets_ordered_lines_and_customer() {
        let store = SessionStore::new("ILS");
        let product = &sample_products("ILS")[0];
        let line = build_line(product, &VariantSelection { color: "White".into(), size: "S".into(), quantity: 2 }).unwrap();
        let late = build_line(product, &VariantSelection { color: "White".into(), size: "M".into(), quantity: 1 }).unwrap();
        let ordered = store
            .update("s1", |s| {
                s.customer = CustomerInfo::new("Rami", "0590", "Gaza");
                s.cart.add_line(line)
            })
            .await
            .unwrap();
        let late_id = store.update("s1", |s| s.cart.add_line(late)).await.unwrap();

        store.settle("s1", &[ordered]).await;
        let state = store.snapshot("s1").await;
        assert_eq!(state.cart.len(), 1);
        assert!(state.cart.line(late_id).is_some());
        assert_eq!(state.customer, CustomerInfo::default());
    }

    #[tokio::test]
    async fn test_blank_sessions_are_not_kept() {
        let store = SessionStore::new("ILS");
        store.update("ghost", |s| s.cart.remove_line(Uuid::new_v4())).await;
        store.update("ghost2", |s| s.customer = CustomerInfo::default()).await;
        store.settle("ghost3", &[]).await;
        assert_eq!(store.len().await, 0);

        store.update("real", |s| s.customer = CustomerInfo::new("Rami", "", "")).await;
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_idle_sessions_are_evicted() {
        let fresh = SessionStore::new("ILS");
        fresh.update("a", |s| s.customer = CustomerInfo::new("Rami", "0590", "Gaza")).await;
        assert_eq!(fresh.evict_idle().await, 0);
        assert_eq!(fresh.len().await, 1);

        let expiring = SessionStore::with_idle_timeout("ILS", Duration::ZERO);
        expiring.update("a", |s| s.customer = CustomerInfo::new("Rami", "0590", "Gaza")).await;
        assert_eq!(expiring.evict_idle().await, 1);
        assert_eq!(expiring.len().await, 0);
        assert_eq!(expiring.snapshot("a").await.customer, CustomerInfo::default());
    }
}
