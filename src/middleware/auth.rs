use axum::{extract::FromRequestParts, http::header};
use jsonwebtoken::{DecodingKey, Validation, decode};
use serde::Deserialize;

use crate::error::AppError;

/// Claims minted by the external identity provider. Only what the checkout
/// flow and the admin gate actually read.
#[derive(Debug, Deserialize)]
pub struct Claims {
    pub sub: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
    pub exp: usize,
}

/// Authenticated caller. Checkout only reads the display name and email for
/// prefill; signing in is never required to buy.
#[derive(Debug, Clone)]
pub struct Identity {
    pub uid: String,
    pub email: Option<String>,
    pub display_name: Option<String>,
    pub role: String,
}

/// Optional identity: absent Authorization header means a guest, a present
/// but unparseable token is still an error.
#[derive(Debug, Clone)]
pub struct MaybeIdentity(pub Option<Identity>);

pub fn ensure_admin(identity: &Identity) -> Result<(), AppError> {
    if identity.role != "admin" {
        return Err(AppError::Forbidden);
    }
    Ok(())
}

fn decode_identity(token: &str) -> Result<Identity, AppError> {
    let secret = std::env::var("JWT_SECRET")
        .map_err(|_| AppError::Internal(anyhow::anyhow!("JWT_SECRET is not set")))?;

    let decoded = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|_| AppError::BadRequest("Invalid or expired token".into()))?;

    Ok(Identity {
        uid: decoded.claims.sub,
        email: decoded.claims.email,
        display_name: decoded.claims.name,
        role: decoded.claims.role.unwrap_or_else(|| "user".to_string()),
    })
}

fn bearer_token(parts: &axum::http::request::Parts) -> Result<Option<String>, AppError> {
    let Some(auth_header) = parts.headers.get(header::AUTHORIZATION) else {
        return Ok(None);
    };
    let auth_str = auth_header
        .to_str()
        .map_err(|_| AppError::BadRequest("Invalid Authorization header".into()))?;
    if !auth_str.starts_with("Bearer ") {
        return Err(AppError::BadRequest("Invalid Authorization scheme".into()));
    }
    Ok(Some(auth_str.trim_start_matches("Bearer ").trim().to_string()))
}

impl<S> FromRequestParts<S> for Identity
where
    S: Send + Sync,
{
    type Rejection = AppError;
    async fn from_request_parts(
        parts: &mut axum::http::request::Parts,
        _state: &S,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts)?
            .ok_or_else(|| AppError::BadRequest("Missing Authorization header".into()))?;
        decode_identity(&token)
    }
}

impl<S> FromRequestParts<S> for MaybeIdentity
where
    S: Send + Sync,
{
    type Rejection = AppError;
    async fn from_request_parts(
        parts: &mut axum::http::request::Parts,
        _state: &S,
    ) -> Result<Self, Self::Rejection> {
        match bearer_token(parts)? {
            Some(token) => Ok(MaybeIdentity(Some(decode_identity(&token)?))),
            None => Ok(MaybeIdentity(None)),
        }
    }
}
