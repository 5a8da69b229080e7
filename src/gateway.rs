use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::config::AppConfig;
use crate::error::{AppError, AppResult};
use crate::money::Money;

const RAZORPAY_API_BASE: &str = "https://api.razorpay.com";

/// Order as the gateway reports it back: id plus the amount in minor units
/// it will charge. The hosted widget is opened with this id.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct GatewayOrder {
    pub id: String,
    pub amount: i64,
    pub currency: String,
}

/// Seam between the checkout flow and the external payment service.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Create a gateway-side order for `amount`. The conversion to the
    /// gateway's minor unit happens here and nowhere else.
    async fn create_order(
        &self,
        amount: Money,
        currency: &str,
        receipt: &str,
    ) -> AppResult<GatewayOrder>;
}

#[derive(Serialize)]
struct CreateOrderBody<'a> {
    amount: i64,
    currency: &'a str,
    receipt: &'a str,
}

#[derive(Deserialize)]
struct CreateOrderResponse {
    id: String,
    amount: i64,
    currency: String,
}

/// Razorpay's REST orders API over Basic auth. Credentials come from server
/// config; a missing pair fails the attempt, not the process, so the
/// operator can fix the environment and retry.
pub struct RazorpayGateway {
    http: reqwest::Client,
    credentials: Option<(String, String)>,
    base_url: String,
}

impl RazorpayGateway {
    pub fn from_config(config: &AppConfig) -> Self {
        let credentials = match (&config.razorpay_key_id, &config.razorpay_key_secret) {
            (Some(id), Some(secret)) => Some((id.clone(), secret.clone())),
            _ => None,
        };
        Self {
            http: reqwest::Client::new(),
            credentials,
            base_url: RAZORPAY_API_BASE.to_string(),
        }
    }
}

#[async_trait]
impl PaymentGateway for RazorpayGateway {
    // The amount guard precedes the credentials check; a non-positive
    // charge never reaches the wire.
    async fn create_order(
        &self,
        amount: Money,
        currency: &str,
        receipt: &str,
    ) -> AppResult<GatewayOrder> {
        if !amount.is_positive() {
            return Err(AppError::InvalidAmount);
        }
        let (key_id, key_secret) = self
            .credentials
            .as_ref()
            .ok_or(AppError::GatewayConfig)?;

        let body = CreateOrderBody {
            amount: amount.to_minor().value(),
            currency,
            receipt,
        };
        let response = self
            .http
            .post(format!("{}/v1/orders", self.base_url))
            .basic_auth(key_id, Some(key_secret))
            .json(&body)
            .send()
            .await?
            .error_for_status()?;

        let order: CreateOrderResponse = response.json().await?;
        tracing::info!(gateway_order_id = %order.id, amount = order.amount, "gateway order created");

        Ok(GatewayOrder {
            id: order.id,
            amount: order.amount,
            currency: order.currency,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(key: Option<&str>) -> AppConfig {
        AppConfig {
            database_url: "postgres://unused".into(),
            host: "127.0.0.1".into(),
            port: 0,
            razorpay_key_id: key.map(str::to_string),
            razorpay_key_secret: key.map(str::to_string),
        }
    }

    #[tokio::test]
    async fn non_positive_amounts_are_rejected_before_anything_else() {
        let gateway = RazorpayGateway::from_config(&config(Some("rzp_test_key")));

        let err = gateway
            .create_order(Money::ZERO, "INR", "r1")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidAmount));

        let err = gateway
            .create_order(Money::rupees(-10), "INR", "r1")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidAmount));
    }

    #[tokio::test]
    async fn missing_credentials_fail_the_attempt_not_the_process() {
        let gateway = RazorpayGateway::from_config(&config(None));
        let err = gateway
            .create_order(Money::rupees(100), "INR", "r1")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::GatewayConfig));
    }
}
