//! Payment confirmation reconciler.
//!
//! Given the query parameters of a payment-provider redirect (or a direct
//! order id), this resolves the associated order and polls the backend until
//! the payment settles, the provider reports a definitive failure, or a retry
//! budget runs out. The backend owns all payment state; the reconciler only
//! reads and reports.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::time;

use crate::backend::StorefrontBackend;
use crate::error::Result;
use crate::models::{Order, PaymentStatus, RedirectParams, StatusHint};

/// Polling cadence and retry budgets. `Default` carries the production
/// values; tests inject tighter ones.
#[derive(Debug, Clone)]
pub struct PollSettings {
    /// Delay between payment-status polls
    pub interval: Duration,
    /// Pending polls before giving up and optimistically reporting success
    pub max_pending_polls: u32,
    /// Transport errors tolerated before reporting failure
    pub max_transport_retries: u32,
    /// Single wait budget for the recent-order fallback fetch
    pub fallback_wait: Duration,
    /// Page size for the recent-order fallback
    pub fallback_page_size: u32,
}

impl Default for PollSettings {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(3),
            max_pending_polls: 20,
            max_transport_retries: 5,
            fallback_wait: Duration::from_secs(10),
            fallback_page_size: 5,
        }
    }
}

/// Cancellation guard for the polling loop. The confirmation view sets this
/// when it is torn down so an already-scheduled continuation never reports a
/// terminal outcome to a view that no longer exists.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Terminal outcome of a confirmation, plus `Cancelled` for a torn-down
/// view. `Success` and `Failed` are final: the reconciler returns exactly
/// once and never resumes polling afterwards.
#[derive(Debug, Clone)]
pub enum Outcome {
    Success {
        order: Order,
        /// Cash-collection voucher code to display, when the payment method
        /// issued one
        voucher: Option<String>,
    },
    Failed,
    Cancelled,
}

impl Outcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Success { .. })
    }
}

/// What a single payment-status poll concluded.
enum Poll {
    /// Payment completed or order already paid/confirmed
    Settled {
        order: Box<Order>,
        voucher: Option<String>,
    },
    /// Provider reported failure, or payment/order record missing
    Failed,
    /// Payment record exists but has not resolved yet
    Pending(Box<Order>),
}

pub struct Reconciler {
    backend: Arc<dyn StorefrontBackend>,
    settings: PollSettings,
}

impl Reconciler {
    pub fn new(backend: Arc<dyn StorefrontBackend>, settings: PollSettings) -> Self {
        Self { backend, settings }
    }

    /// Run a confirmation to its terminal outcome.
    ///
    /// `auth_token` is the shopper's session token, needed only when the
    /// redirect cannot be resolved to an order and the recent-order fallback
    /// has to consult the order history.
    pub async fn confirm(
        &self,
        params: &RedirectParams,
        auth_token: Option<&str>,
        cancel: &CancelFlag,
    ) -> Outcome {
        if params.is_provider_redirect() {
            return self.confirm_provider_redirect(params, auth_token, cancel).await;
        }

        if let Some(order_id) = params.order_id.as_deref() {
            tracing::debug!(order_id, "confirming direct order id");
            return self.poll_payment(order_id, params.voucher.clone(), cancel).await;
        }

        // Direct navigation with no parameters at all: nothing to confirm.
        tracing::debug!("no redirect parameters present");
        Outcome::Failed
    }

    async fn confirm_provider_redirect(
        &self,
        params: &RedirectParams,
        auth_token: Option<&str>,
        cancel: &CancelFlag,
    ) -> Outcome {
        if params.customer_reference.is_some() {
            match self.backend.resolve_redirect(params).await {
                Ok(Some(resolved)) => {
                    if let Some(order_id) = resolved.order_id.as_deref() {
                        tracing::debug!(order_id, "redirect resolved to order");
                        let voucher = resolved.voucher.or_else(|| params.voucher.clone());
                        return self.poll_payment(order_id, voucher, cancel).await;
                    }
                    tracing::warn!("redirect resolution returned no order id");
                }
                Ok(None) => {
                    tracing::warn!("redirect resolution found no matching order");
                }
                Err(e) => {
                    tracing::warn!("redirect resolution failed: {}", e);
                }
            }
        }

        if cancel.is_cancelled() {
            return Outcome::Cancelled;
        }

        match params.status_hint() {
            StatusHint::Failure => {
                // Provider said the payment failed and we have no order to
                // double-check against: report failure without touching the
                // payment/order endpoints.
                tracing::info!("provider redirect reported failure");
                Outcome::Failed
            }
            StatusHint::Success | StatusHint::Ambiguous => {
                self.recent_order_fallback(auth_token, params.voucher.clone(), cancel)
                    .await
            }
        }
    }

    /// Last resort when the redirect cannot be mapped to an order: look at
    /// the shopper's most recent orders and pick the first one that is
    /// settled or still awaiting its webhook. One fetch under one timeout,
    /// no retry loop.
    async fn recent_order_fallback(
        &self,
        auth_token: Option<&str>,
        voucher: Option<String>,
        cancel: &CancelFlag,
    ) -> Outcome {
        let fetch = self
            .backend
            .recent_orders(auth_token, self.settings.fallback_page_size);

        let orders = match time::timeout(self.settings.fallback_wait, fetch).await {
            Ok(Ok(orders)) => orders,
            Ok(Err(e)) => {
                tracing::warn!("recent-order fallback fetch failed: {}", e);
                return Outcome::Failed;
            }
            Err(_) => {
                tracing::warn!(
                    "recent-order fallback timed out after {:?}",
                    self.settings.fallback_wait
                );
                return Outcome::Failed;
            }
        };

        if cancel.is_cancelled() {
            return Outcome::Cancelled;
        }

        match orders.into_iter().find(|o| o.status.is_fallback_candidate()) {
            Some(order) => {
                tracing::debug!(order_id = %order.id, "fallback matched recent order");
                self.poll_payment(&order.id, voucher, cancel).await
            }
            None => {
                tracing::info!("no recent order qualified for fallback");
                Outcome::Failed
            }
        }
    }

    /// Poll payment status for a concrete order until it settles or a budget
    /// runs out. Pending observations and transport errors are budgeted
    /// separately; the transport counter is cumulative across the whole poll.
    async fn poll_payment(
        &self,
        order_id: &str,
        voucher: Option<String>,
        cancel: &CancelFlag,
    ) -> Outcome {
        let mut pending_polls: u32 = 0;
        let mut transport_errors: u32 = 0;

        loop {
            if cancel.is_cancelled() {
                tracing::debug!(order_id, "confirmation cancelled, dropping poll");
                return Outcome::Cancelled;
            }

            match self.poll_once(order_id).await {
                Ok(Poll::Settled {
                    order,
                    voucher: payment_voucher,
                }) => {
                    tracing::info!(order_id, "payment confirmed");
                    return Outcome::Success {
                        order: *order,
                        voucher: voucher.or(payment_voucher),
                    };
                }
                Ok(Poll::Failed) => {
                    tracing::info!(order_id, "payment reported failed");
                    return Outcome::Failed;
                }
                Ok(Poll::Pending(order)) => {
                    pending_polls += 1;
                    if pending_polls >= self.settings.max_pending_polls {
                        // The webhook may still land after we stop watching.
                        // Rather than leave the shopper on a spinner forever,
                        // report success and let the order page show the
                        // authoritative status later. Known compromise.
                        tracing::warn!(
                            order_id,
                            polls = pending_polls,
                            "payment still pending after poll budget, assuming success"
                        );
                        return Outcome::Success {
                            order: *order,
                            voucher,
                        };
                    }
                    tracing::debug!(order_id, poll = pending_polls, "payment still pending");
                }
                Err(e) => {
                    transport_errors += 1;
                    if transport_errors >= self.settings.max_transport_retries {
                        tracing::error!(
                            order_id,
                            retries = transport_errors,
                            "giving up after repeated backend errors: {}",
                            e
                        );
                        return Outcome::Failed;
                    }
                    tracing::warn!(
                        order_id,
                        retry = transport_errors,
                        "backend error during poll, will retry: {}",
                        e
                    );
                }
            }

            time::sleep(self.settings.interval).await;
        }
    }

    /// One poll: payment record first, then the order. A missing record on
    /// either read is definitive (the id was resolved moments ago), so it
    /// fails fast instead of burning the retry budget.
    async fn poll_once(&self, order_id: &str) -> Result<Poll> {
        let payment = match self.backend.payment_status(order_id).await? {
            Some(payment) => payment,
            None => {
                tracing::warn!(order_id, "no payment record for order");
                return Ok(Poll::Failed);
            }
        };

        let order = match self.backend.order(order_id).await? {
            Some(order) => order,
            None => {
                tracing::warn!(order_id, "order record missing");
                return Ok(Poll::Failed);
            }
        };

        if payment.payment_status == PaymentStatus::Completed || order.status.is_settled() {
            return Ok(Poll::Settled {
                order: Box::new(order),
                voucher: payment.voucher,
            });
        }

        if payment.payment_status == PaymentStatus::Failed {
            return Ok(Poll::Failed);
        }

        Ok(Poll::Pending(Box::new(order)))
    }
}
