//! Payment gateway client.
//!
//! Thin client for the order/verify flow: orders are created against the
//! gateway's REST API with basic auth, and payment signatures are verified
//! locally with the account's key secret (no network round trip).

use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::crypto;

/// Error type for gateway operations.
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Gateway API returned an error.
    #[error("Gateway API error ({status}): {message}")]
    Api {
        /// HTTP status returned by the gateway.
        status: u16,
        /// Error message from the response body.
        message: String,
    },
}

/// An order created at the gateway.
///
/// `amount` is in the currency's smallest unit, as the gateway reports it.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GatewayOrder {
    /// Gateway order reference.
    pub id: String,
    /// Amount in the smallest currency unit.
    pub amount: i64,
    /// Currency code.
    pub currency: String,
    /// Gateway-side order status.
    pub status: String,
}

/// Order creation request body.
#[derive(Debug, Serialize)]
struct CreateOrderBody<'a> {
    amount: i64,
    currency: &'a str,
    receipt: &'a str,
}

/// Payment gateway API client.
#[derive(Debug, Clone)]
pub struct GatewayClient {
    client: Client,
    base_url: String,
    key_id: String,
    key_secret: String,
}

impl GatewayClient {
    /// Create a new gateway client.
    ///
    /// The base URL is configurable so tests can point the client at a mock
    /// server.
    ///
    /// # Panics
    ///
    /// Panics if the HTTP client cannot be built.
    pub fn new(
        base_url: impl Into<String>,
        key_id: impl Into<String>,
        key_secret: impl Into<String>,
    ) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .expect("Failed to build HTTP client");

        Self {
            client,
            base_url: base_url.into(),
            key_id: key_id.into(),
            key_secret: key_secret.into(),
        }
    }

    /// Create an order at the gateway.
    ///
    /// # Arguments
    ///
    /// * `amount` - Amount in the smallest currency unit (e.g. paise)
    /// * `currency` - Currency code (e.g. "INR")
    /// * `receipt` - Caller-supplied receipt reference
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the gateway rejects it.
    pub async fn create_order(
        &self,
        amount: i64,
        currency: &str,
        receipt: &str,
    ) -> Result<GatewayOrder, GatewayError> {
        let body = CreateOrderBody {
            amount,
            currency,
            receipt,
        };

        let response = self
            .client
            .post(format!("{}/v1/orders", self.base_url))
            .basic_auth(&self.key_id, Some(&self.key_secret))
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(GatewayError::Api {
                status: status.as_u16(),
                message,
            });
        }

        Ok(response.json().await?)
    }

    /// Verify a payment signature.
    ///
    /// The gateway signs `"{order_id}|{payment_id}"` with the key secret;
    /// this recomputes the HMAC-SHA256 locally and compares in constant
    /// time.
    #[must_use]
    pub fn verify_signature(&self, order_id: &str, payment_id: &str, signature: &str) -> bool {
        let payload = format!("{order_id}|{payment_id}");
        let expected = crypto::hmac_sha256_hex(&self.key_secret, &payload);
        crypto::constant_time_eq(&expected, signature)
    }
}
