mod http;

pub use http::HttpBackend;

use async_trait::async_trait;

use crate::error::Result;
use crate::models::{Order, PaymentRecord, RedirectParams, ResolvedRedirect};

/// Read-only view of the storefront backend, as consumed by the reconciler.
///
/// `Ok(None)` means the backend answered but has no such record; `Err` means
/// the call itself did not complete and may be retried. Keeping this behind a
/// trait lets tests drive the reconciler with a scripted in-memory backend.
#[async_trait]
pub trait StorefrontBackend: Send + Sync {
    /// `GET /payment/{order_id}/status`
    async fn payment_status(&self, order_id: &str) -> Result<Option<PaymentRecord>>;

    /// `GET /orders/{order_id}`
    async fn order(&self, order_id: &str) -> Result<Option<Order>>;

    /// `GET /payment/redirect?...` - maps a provider redirect to an order.
    async fn resolve_redirect(&self, params: &RedirectParams) -> Result<Option<ResolvedRedirect>>;

    /// `GET /orders?limit=N&sort=desc` - most recent orders for the session
    /// identified by `auth_token`. Used only by the fallback path.
    async fn recent_orders(&self, auth_token: Option<&str>, limit: u32) -> Result<Vec<Order>>;
}
