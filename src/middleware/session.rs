use axum::extract::FromRequestParts;

use crate::error::AppError;

pub const SESSION_HEADER: &str = "x-session-id";

/// Opaque browsing-session id. The client generates it once and sends it on
/// every cart/checkout request; it also serves as the owner marker for
/// guest orders.
#[derive(Debug, Clone)]
pub struct SessionId(pub String);

impl<S> FromRequestParts<S> for SessionId
where
    S: Send + Sync,
{
    type Rejection = AppError;
    async fn from_request_parts(
        parts: &mut axum::http::request::Parts,
        _state: &S,
    ) -> Result<Self, Self::Rejection> {
        let value = parts
            .headers
            .get(SESSION_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .ok_or_else(|| AppError::BadRequest("Missing x-session-id header".into()))?;
        Ok(SessionId(value.to_string()))
    }
}
