use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Pending,
    Completed,
    Failed,
}

/// Payment record as reported by `GET /payment/{order_id}/status`.
///
/// Created when payment is initiated; the provider webhook moves it to
/// completed/failed on the backend. This service only ever reads it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentRecord {
    pub id: String,
    pub order_id: String,
    #[serde(default)]
    pub provider: Option<String>,
    #[serde(default)]
    pub amount: Option<f64>,
    pub payment_status: PaymentStatus,
    /// Provider-side reference number, if the provider issued one
    #[serde(default)]
    pub provider_ref: Option<String>,
    /// Cash-collection voucher code for offline payment methods
    #[serde(default)]
    pub voucher: Option<String>,
}
