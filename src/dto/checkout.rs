use serde::Serialize;
use utoipa::ToSchema;

use crate::checkout::CheckoutStep;
use crate::models::{Order, ShippingAddress};
use crate::money::Money;

/// Values to seed the address form with: the captured address wins, else
/// the authenticated user's name/email, else blank for guests.
#[derive(Debug, Default, Serialize, ToSchema)]
pub struct AddressPrefill {
    pub full_name: String,
    pub email: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CheckoutView {
    pub step: CheckoutStep,
    pub busy: bool,
    pub address: Option<ShippingAddress>,
    pub prefill: AddressPrefill,
    pub total_items: i64,
    pub total_price: Money,
}

/// Everything the client needs to open the hosted widget.
#[derive(Debug, Serialize, ToSchema)]
pub struct PayResponse {
    pub gateway_order_id: String,
    pub amount: i64,
    pub currency: String,
    pub key_id: String,
    pub description: String,
    pub prefill_name: String,
    pub prefill_email: String,
    pub prefill_phone: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ConfirmResponse {
    pub verified: bool,
    pub order: Order,
}
