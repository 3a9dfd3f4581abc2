use axum::{extract::State, http::header, http::HeaderMap};
use serde::Serialize;

use crate::extractors::{Json, Query};
use crate::models::{Order, RedirectParams};
use crate::reconciler::{CancelFlag, Outcome, Reconciler};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct ConfirmationResponse {
    /// "success" or "failed" - the only two states the UI distinguishes
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order: Option<Order>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub voucher: Option<String>,
}

/// Confirmation endpoint hit after the payment provider redirects back.
///
/// The storefront front-end forwards the redirect's query parameters here
/// verbatim, plus the shopper's session as a bearer token (needed only for
/// the recent-order fallback). The response is the terminal outcome - the
/// request stays open while the reconciler polls.
pub async fn confirm_payment(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(params): Query<RedirectParams>,
) -> Json<ConfirmationResponse> {
    let auth_token = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "));

    let reconciler = Reconciler::new(state.backend.clone(), state.settings.clone());
    let cancel = CancelFlag::new();

    let response = match reconciler.confirm(&params, auth_token, &cancel).await {
        Outcome::Success { order, voucher } => ConfirmationResponse {
            status: "success",
            order: Some(order),
            voucher,
        },
        Outcome::Failed => ConfirmationResponse {
            status: "failed",
            order: None,
            voucher: None,
        },
        // Unreachable with a fresh flag; if the client hung up, the future
        // was dropped and no response goes anywhere anyway.
        Outcome::Cancelled => ConfirmationResponse {
            status: "failed",
            order: None,
            voucher: None,
        },
    };

    Json(response)
}
