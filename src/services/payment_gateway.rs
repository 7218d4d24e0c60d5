use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;
use thiserror::Error;
use tracing::{info, warn};

#[derive(Debug, Error)]
pub enum PaymentGatewayError {
    #[error("payment gateway request failed: {0}")]
    Request(String),
    #[error("payment gateway rejected order (HTTP {status}): {body}")]
    Rejected { status: u16, body: String },
    #[error("payment gateway response malformed: {0}")]
    Malformed(String),
}

/// A gateway-side record representing the intent to charge the customer a
/// fixed amount, referenced by an opaque id.
#[derive(Debug, Clone)]
pub struct PaymentOrder {
    pub id: String,
    /// Amount in the gateway's minor unit (paise).
    pub amount: i64,
    pub currency: String,
}

/// Port for payment-order creation. Tests substitute a mock; production
/// wires the Razorpay client.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    async fn create_order(
        &self,
        job_id: &str,
        amount_paise: i64,
        payer_email: &str,
        payer_phone: &str,
    ) -> Result<PaymentOrder, PaymentGatewayError>;
}

/// Razorpay Orders API client.
pub struct RazorpayGateway {
    http_client: Client,
    base_url: String,
    key_id: String,
    key_secret: String,
}

#[derive(Debug, Deserialize)]
struct RazorpayOrderResponse {
    id: String,
    amount: i64,
    currency: String,
}

impl RazorpayGateway {
    /// Create a new gateway client. The request timeout is bounded so a
    /// stalled gateway surfaces an error instead of hanging the request.
    pub fn new(base_url: String, key_id: String, key_secret: String) -> Self {
        let http_client = Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .expect("Failed to build HTTP client");

        Self {
            http_client,
            base_url,
            key_id,
            key_secret,
        }
    }
}

#[async_trait]
impl PaymentGateway for RazorpayGateway {
    async fn create_order(
        &self,
        job_id: &str,
        amount_paise: i64,
        payer_email: &str,
        payer_phone: &str,
    ) -> Result<PaymentOrder, PaymentGatewayError> {
        let url = format!("{}/v1/orders", self.base_url);

        info!("Creating payment order for job {} ({} paise)", job_id, amount_paise);

        let response = self
            .http_client
            .post(&url)
            .basic_auth(&self.key_id, Some(&self.key_secret))
            .json(&json!({
                "amount": amount_paise,
                "currency": "INR",
                "receipt": format!("job-{}", job_id),
                "notes": {
                    "job_id": job_id,
                    "payer_email": payer_email,
                    "payer_phone": payer_phone,
                },
            }))
            .send()
            .await
            .map_err(|e| {
                let msg = if e.is_timeout() {
                    format!("Connection timeout after 10 seconds: {}", e)
                } else if e.is_connect() {
                    format!("Connection failed: {}", e)
                } else {
                    format!("Network error: {}", e)
                };
                warn!("Payment order creation for job {} failed: {}", job_id, msg);
                PaymentGatewayError::Request(msg)
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let body = if body.len() > 500 {
                body[..500].to_string()
            } else {
                body
            };
            warn!(
                "Payment gateway rejected order for job {} with HTTP {}",
                job_id,
                status.as_u16()
            );
            return Err(PaymentGatewayError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        let order: RazorpayOrderResponse = response
            .json()
            .await
            .map_err(|e| PaymentGatewayError::Malformed(e.to_string()))?;

        info!(
            "Payment order {} created for job {} ({} {})",
            order.id, job_id, order.amount, order.currency
        );

        Ok(PaymentOrder {
            id: order.id,
            amount: order.amount,
            currency: order.currency,
        })
    }
}
