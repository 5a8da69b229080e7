use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use crate::response::{ApiResponse, Meta};

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not Found")]
    NotFound,

    #[error("Bad Request {0}")]
    BadRequest(String),

    #[error("Forbidden")]
    Forbidden,

    /// Shipping address failed validation; the checkout flow stays on the
    /// address step and no network call is made.
    #[error("Invalid address: {0}")]
    Validation(String),

    /// Gateway credentials are not configured on the server. Surfaced as a
    /// generic failure, retryable once the operator fixes the environment.
    #[error("Payment gateway is not configured")]
    GatewayConfig,

    /// Cart invariants should make this unreachable; reject defensively.
    #[error("Invalid payment amount")]
    InvalidAmount,

    /// Signature mismatch or missing callback fields. Fail-closed: no order
    /// is created on this path.
    #[error("Payment verification failed: {0}")]
    VerificationRejected(String),

    #[error("Payment gateway unavailable")]
    Gateway(#[from] reqwest::Error),

    #[error("ORM error")]
    OrmError(#[from] sea_orm::DbErr),

    #[error("Internal Server Error")]
    Internal(#[from] anyhow::Error),
}

#[derive(Serialize)]
struct ErrorData {
    error: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AppError::NotFound => (StatusCode::NOT_FOUND, self.to_string()),
            AppError::BadRequest(_) => (StatusCode::BAD_REQUEST, self.to_string()),
            AppError::Forbidden => (StatusCode::FORBIDDEN, self.to_string()),
            AppError::Validation(_) => (StatusCode::BAD_REQUEST, self.to_string()),
            AppError::GatewayConfig => (StatusCode::INTERNAL_SERVER_ERROR, self.to_string()),
            AppError::InvalidAmount => (StatusCode::BAD_REQUEST, self.to_string()),
            AppError::VerificationRejected(_) => (StatusCode::BAD_REQUEST, self.to_string()),
            AppError::Gateway(_) => {
                // Do not leak gateway transport details to the client.
                (StatusCode::BAD_GATEWAY, "Payment gateway unavailable".to_string())
            }
            AppError::OrmError(_) => (StatusCode::INTERNAL_SERVER_ERROR, self.to_string()),
            AppError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, self.to_string()),
        };

        let body = ApiResponse {
            message: message.clone(),
            data: Some(ErrorData { error: message }),
            meta: Some(Meta::empty()),
        };

        (status, axum::Json(body)).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;
