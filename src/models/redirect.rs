use serde::{Deserialize, Serialize};

/// Query parameters appended by the payment provider when it sends the
/// browser back to the storefront. All optional opaque strings - the
/// provider's contract defines no format beyond that.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RedirectParams {
    #[serde(default)]
    pub status: Option<String>,
    /// Correlates the provider-side payment session to a backend order
    #[serde(default, rename = "customerReference")]
    pub customer_reference: Option<String>,
    #[serde(default, rename = "providerRefNum")]
    pub provider_ref_num: Option<String>,
    #[serde(default)]
    pub voucher: Option<String>,
    #[serde(default)]
    pub order_id: Option<String>,
}

/// How the provider's `status` token reads, for branching when the order
/// cannot be resolved directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusHint {
    Success,
    Failure,
    Ambiguous,
}

impl RedirectParams {
    /// A redirect carrying `customerReference` or `status` came from the
    /// payment provider; anything else is a direct navigation.
    pub fn is_provider_redirect(&self) -> bool {
        self.customer_reference.is_some() || self.status.is_some()
    }

    pub fn is_empty(&self) -> bool {
        self.status.is_none()
            && self.customer_reference.is_none()
            && self.provider_ref_num.is_none()
            && self.voucher.is_none()
            && self.order_id.is_none()
    }

    pub fn status_hint(&self) -> StatusHint {
        match self.status.as_deref() {
            Some(s) if s.eq_ignore_ascii_case("success")
                || s.eq_ignore_ascii_case("completed")
                || s.eq_ignore_ascii_case("paid") =>
            {
                StatusHint::Success
            }
            Some(s) if s.eq_ignore_ascii_case("failed")
                || s.eq_ignore_ascii_case("failure")
                || s.eq_ignore_ascii_case("cancelled")
                || s.eq_ignore_ascii_case("declined") =>
            {
                StatusHint::Failure
            }
            _ => StatusHint::Ambiguous,
        }
    }
}

/// Result of the backend's redirect-resolution endpoint: the order the
/// provider session maps to, plus a voucher code for cash-voucher methods.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolvedRedirect {
    #[serde(default)]
    pub order_id: Option<String>,
    #[serde(default)]
    pub voucher: Option<String>,
}
