use serde::Serialize;
use utoipa::ToSchema;

use crate::error::{AppError, AppResult};
use crate::models::ShippingAddress;
use crate::money::Money;

pub const MIN_PHONE_LEN: usize = 10;
pub const MIN_PINCODE_LEN: usize = 6;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum CheckoutStep {
    Address,
    Summary,
}

/// Gateway order created for an in-flight payment attempt. Held so the
/// completion callback can be checked against what we actually asked for.
#[derive(Debug, Clone)]
pub struct PendingPayment {
    pub gateway_order_id: String,
    pub amount: Money,
}

/// Per-session checkout state machine: `Address` until a valid shipping
/// address is captured, then `Summary`. The busy flag covers the window
/// between opening the hosted widget and its completion or dismissal.
#[derive(Debug)]
pub struct CheckoutFlow {
    pub step: CheckoutStep,
    pub address: Option<ShippingAddress>,
    pub busy: bool,
    pub pending: Option<PendingPayment>,
}

impl Default for CheckoutFlow {
    fn default() -> Self {
        Self {
            step: CheckoutStep::Address,
            address: None,
            busy: false,
            pending: None,
        }
    }
}

impl CheckoutFlow {
    /// Entry to `Summary` is gated on address validity. While a payment is
    /// in flight the captured address is frozen too.
    pub fn submit_address(&mut self, address: ShippingAddress) -> AppResult<()> {
        if self.busy {
            return Err(AppError::BadRequest("payment in progress".into()));
        }
        validate_address(&address)?;
        self.address = Some(address);
        self.step = CheckoutStep::Summary;
        Ok(())
    }

    /// Back-transition offered from the summary. Keeps the captured address
    /// so the form comes back filled in.
    pub fn back_to_address(&mut self) {
        if !self.busy {
            self.step = CheckoutStep::Address;
        }
    }

    /// Widget dismissed without completing: interactive again, no partial
    /// order artifact left behind.
    pub fn cancel_payment(&mut self) {
        self.busy = false;
        self.pending = None;
    }

    /// Reopening always starts over on the address step.
    pub fn reset(&mut self) {
        *self = CheckoutFlow::default();
    }
}

/// An address is valid iff all seven fields are non-blank and the phone and
/// pincode length minimums hold.
pub fn validate_address(address: &ShippingAddress) -> AppResult<()> {
    let mut problems: Vec<&'static str> = Vec::new();

    let mut require = |value: &str, name: &'static str| {
        if value.trim().is_empty() {
            problems.push(name);
        }
    };
    require(&address.full_name, "fullName");
    require(&address.phone, "phone");
    require(&address.email, "email");
    require(&address.address, "address");
    require(&address.city, "city");
    require(&address.state, "state");
    require(&address.pincode, "pincode");

    if !problems.is_empty() {
        return Err(AppError::Validation(format!(
            "missing fields: {}",
            problems.join(", ")
        )));
    }
    if address.phone.trim().len() < MIN_PHONE_LEN {
        return Err(AppError::Validation(format!(
            "phone must be at least {MIN_PHONE_LEN} characters"
        )));
    }
    if address.pincode.trim().len() < MIN_PINCODE_LEN {
        return Err(AppError::Validation(format!(
            "pincode must be at least {MIN_PINCODE_LEN} characters"
        )));
    }
    Ok(())
}
