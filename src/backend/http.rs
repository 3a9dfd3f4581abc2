use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode};

use crate::error::{AppError, Result};
use crate::models::{Order, PaymentRecord, RedirectParams, ResolvedRedirect};

use super::StorefrontBackend;

/// Per-request timeout. Shorter than the reconciler's poll interval budget
/// so a hung backend surfaces as a transport error instead of stalling the
/// whole confirmation.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Reqwest-backed implementation of [`StorefrontBackend`].
#[derive(Debug, Clone)]
pub struct HttpBackend {
    client: Client,
    base_url: String,
}

impl HttpBackend {
    pub fn new(base_url: &str) -> Result<Self> {
        let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Fetch a single record; 404 becomes `Ok(None)`, other non-success
    /// statuses become errors the reconciler treats as transient.
    async fn get_optional<T: serde::de::DeserializeOwned>(
        &self,
        request: RequestBuilder,
    ) -> Result<Option<T>> {
        let response = request.send().await?;
        match response.status() {
            StatusCode::NOT_FOUND => Ok(None),
            status if status.is_success() => Ok(Some(response.json().await?)),
            status => Err(AppError::BackendStatus(status)),
        }
    }

    fn expect_success(response: Response) -> Result<Response> {
        let status = response.status();
        if status.is_success() {
            Ok(response)
        } else {
            Err(AppError::BackendStatus(status))
        }
    }
}

#[async_trait]
impl StorefrontBackend for HttpBackend {
    async fn payment_status(&self, order_id: &str) -> Result<Option<PaymentRecord>> {
        let url = self.url(&format!("/payment/{}/status", order_id));
        self.get_optional(self.client.get(&url)).await
    }

    async fn order(&self, order_id: &str) -> Result<Option<Order>> {
        let url = self.url(&format!("/orders/{}", order_id));
        self.get_optional(self.client.get(&url)).await
    }

    async fn resolve_redirect(&self, params: &RedirectParams) -> Result<Option<ResolvedRedirect>> {
        let mut query: Vec<(&str, &str)> = Vec::new();
        if let Some(status) = params.status.as_deref() {
            query.push(("status", status));
        }
        if let Some(reference) = params.customer_reference.as_deref() {
            query.push(("customerReference", reference));
        }
        if let Some(ref_num) = params.provider_ref_num.as_deref() {
            query.push(("providerRefNum", ref_num));
        }
        if let Some(voucher) = params.voucher.as_deref() {
            query.push(("voucher", voucher));
        }

        let request = self.client.get(self.url("/payment/redirect")).query(&query);
        self.get_optional(request).await
    }

    async fn recent_orders(&self, auth_token: Option<&str>, limit: u32) -> Result<Vec<Order>> {
        let mut request = self
            .client
            .get(self.url("/orders"))
            .query(&[("limit", limit.to_string().as_str()), ("sort", "desc")]);

        if let Some(token) = auth_token {
            request = request.bearer_auth(token);
        }

        let response = Self::expect_success(request.send().await?)?;
        Ok(response.json().await?)
    }
}
