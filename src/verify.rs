use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use utoipa::ToSchema;

use crate::error::{AppError, AppResult};

type HmacSha256 = Hmac<Sha256>;

/// Completion payload relayed from the hosted payment widget. Everything in
/// here is client-reported and untrusted until [`verify_payment`] passes.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PaymentCallback {
    pub gateway_order_id: String,
    pub gateway_payment_id: String,
    pub gateway_signature: String,
}

/// Recompute `HMAC-SHA256(secret, order_id + "|" + payment_id)` and compare
/// against the signature the widget reported. Pure and side-effect-free;
/// the caller persists the order only on `Ok`.
///
/// Fails closed: missing fields and undecodable or mismatched signatures
/// all come back as `VerificationRejected`.
pub fn verify_payment(secret: &str, callback: &PaymentCallback) -> AppResult<()> {
    if callback.gateway_order_id.trim().is_empty()
        || callback.gateway_payment_id.trim().is_empty()
        || callback.gateway_signature.trim().is_empty()
    {
        return Err(AppError::VerificationRejected(
            "missing payment details".into(),
        ));
    }

    let signature = hex::decode(callback.gateway_signature.trim())
        .map_err(|_| AppError::VerificationRejected("invalid signature".into()))?;

    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|err| AppError::Internal(anyhow::anyhow!("hmac init: {err}")))?;
    mac.update(callback.gateway_order_id.as_bytes());
    mac.update(b"|");
    mac.update(callback.gateway_payment_id.as_bytes());

    // verify_slice is a constant-time comparison.
    mac.verify_slice(&signature)
        .map_err(|_| AppError::VerificationRejected("invalid signature".into()))
}

/// Hex signature over `order_id + "|" + payment_id`, as the gateway computes
/// it. Used to exercise the verifier against known-good input.
pub fn sign_payment(secret: &str, gateway_order_id: &str, gateway_payment_id: &str) -> String {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .expect("hmac accepts keys of any length");
    mac.update(gateway_order_id.as_bytes());
    mac.update(b"|");
    mac.update(gateway_payment_id.as_bytes());
    hex::encode(mac.finalize().into_bytes())
}
