//! Test utilities and fixtures for payconfirm integration tests

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::http::StatusCode;

pub use payconfirm::backend::StorefrontBackend;
pub use payconfirm::error::{AppError, Result};
pub use payconfirm::models::*;
pub use payconfirm::reconciler::{CancelFlag, Outcome, PollSettings, Reconciler};
pub use payconfirm::state::AppState;

/// Production cadence is seconds; tests poll in microtime.
pub fn test_settings() -> PollSettings {
    PollSettings {
        interval: Duration::from_millis(1),
        fallback_wait: Duration::from_millis(50),
        ..PollSettings::default()
    }
}

pub fn test_order(id: &str, status: OrderStatus) -> Order {
    Order {
        id: id.to_string(),
        status,
        total_price: 150.0,
        customer_name: Some("Test Customer".to_string()),
        customer_phone: None,
        shipping_address: None,
        items: vec![LineItem {
            product_id: "PROD1".to_string(),
            quantity: 1,
            unit_price: 150.0,
        }],
        created_at: Some(1_700_000_000),
    }
}

pub fn test_payment(order_id: &str, status: PaymentStatus) -> PaymentRecord {
    PaymentRecord {
        id: format!("PAY-{}", order_id),
        order_id: order_id.to_string(),
        provider: Some("easykash".to_string()),
        amount: Some(150.0),
        payment_status: status,
        provider_ref: None,
        voucher: None,
    }
}

/// An error the reconciler treats as a transient transport failure.
pub fn transport_error() -> AppError {
    AppError::BackendStatus(StatusCode::BAD_GATEWAY)
}

type Script<T> = Mutex<VecDeque<Result<T>>>;

fn pop<T>(script: &Script<T>) -> Result<T> {
    script
        .lock()
        .unwrap()
        .pop_front()
        .unwrap_or_else(|| Err(AppError::Internal("backend script exhausted".into())))
}

/// Scripted in-memory backend. Each call pops the next queued response for
/// its endpoint; an exhausted queue yields an error so a test fails loudly
/// if the reconciler polls more than the script expects.
#[derive(Default)]
pub struct FakeBackend {
    payments: Script<Option<PaymentRecord>>,
    orders: Script<Option<Order>>,
    resolves: Script<Option<ResolvedRedirect>>,
    recents: Script<Vec<Order>>,
    /// Delay applied to recent_orders, to exercise the fallback timeout
    recent_delay: Mutex<Option<Duration>>,

    pub payment_calls: AtomicUsize,
    pub order_calls: AtomicUsize,
    pub resolve_calls: AtomicUsize,
    pub recent_calls: AtomicUsize,
    /// Bearer token seen by the last recent_orders call
    pub recent_auth_seen: Mutex<Option<String>>,
}

impl FakeBackend {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn push_payment(&self, response: Result<Option<PaymentRecord>>) {
        self.payments.lock().unwrap().push_back(response);
    }

    pub fn push_order(&self, response: Result<Option<Order>>) {
        self.orders.lock().unwrap().push_back(response);
    }

    pub fn push_resolve(&self, response: Result<Option<ResolvedRedirect>>) {
        self.resolves.lock().unwrap().push_back(response);
    }

    pub fn push_recent(&self, response: Result<Vec<Order>>) {
        self.recents.lock().unwrap().push_back(response);
    }

    /// Queue `n` polls where the payment is still pending and the order is
    /// still in `pending` status.
    pub fn push_pending_polls(&self, order_id: &str, n: usize) {
        for _ in 0..n {
            self.push_payment(Ok(Some(test_payment(order_id, PaymentStatus::Pending))));
            self.push_order(Ok(Some(test_order(order_id, OrderStatus::Pending))));
        }
    }

    /// Queue one poll where the payment has completed.
    pub fn push_completed_poll(&self, order_id: &str) {
        self.push_payment(Ok(Some(test_payment(order_id, PaymentStatus::Completed))));
        self.push_order(Ok(Some(test_order(order_id, OrderStatus::Paid))));
    }

    pub fn delay_recent_orders(&self, delay: Duration) {
        *self.recent_delay.lock().unwrap() = Some(delay);
    }

    pub fn total_payment_calls(&self) -> usize {
        self.payment_calls.load(Ordering::SeqCst)
    }

    pub fn total_order_calls(&self) -> usize {
        self.order_calls.load(Ordering::SeqCst)
    }

    pub fn total_recent_calls(&self) -> usize {
        self.recent_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl StorefrontBackend for FakeBackend {
    async fn payment_status(&self, _order_id: &str) -> Result<Option<PaymentRecord>> {
        self.payment_calls.fetch_add(1, Ordering::SeqCst);
        pop(&self.payments)
    }

    async fn order(&self, _order_id: &str) -> Result<Option<Order>> {
        self.order_calls.fetch_add(1, Ordering::SeqCst);
        pop(&self.orders)
    }

    async fn resolve_redirect(&self, _params: &RedirectParams) -> Result<Option<ResolvedRedirect>> {
        self.resolve_calls.fetch_add(1, Ordering::SeqCst);
        pop(&self.resolves)
    }

    async fn recent_orders(&self, auth_token: Option<&str>, _limit: u32) -> Result<Vec<Order>> {
        self.recent_calls.fetch_add(1, Ordering::SeqCst);
        *self.recent_auth_seen.lock().unwrap() = auth_token.map(|t| t.to_string());

        let delay = *self.recent_delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        pop(&self.recents)
    }
}

/// Build a reconciler over a fake backend with test cadence.
pub fn test_reconciler(backend: Arc<FakeBackend>) -> Reconciler {
    Reconciler::new(backend, test_settings())
}

/// Redirect params for a direct order-id navigation.
pub fn direct_params(order_id: &str) -> RedirectParams {
    RedirectParams {
        order_id: Some(order_id.to_string()),
        ..RedirectParams::default()
    }
}
