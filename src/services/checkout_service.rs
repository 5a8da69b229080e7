use chrono::Utc;

use crate::{
    checkout::{CheckoutStep, PendingPayment},
    dto::checkout::{AddressPrefill, CheckoutView, ConfirmResponse, PayResponse},
    error::{AppError, AppResult},
    middleware::auth::Identity,
    middleware::session::SessionId,
    models::ShippingAddress,
    response::{ApiResponse, Meta},
    services::order_service,
    session::SessionState,
    state::AppState,
    verify::{self, PaymentCallback},
};

/// Identity under which an order is owned: the authenticated uid, or the
/// session id for guests.
pub fn owner_key(identity: Option<&Identity>, session: &SessionId) -> String {
    match identity {
        Some(id) => id.uid.clone(),
        None => session.0.clone(),
    }
}

fn view_of(state: &SessionState, identity: Option<&Identity>) -> CheckoutView {
    let prefill = match (&state.flow.address, identity) {
        (Some(addr), _) => AddressPrefill {
            full_name: addr.full_name.clone(),
            email: addr.email.clone(),
        },
        (None, Some(id)) => AddressPrefill {
            full_name: id.display_name.clone().unwrap_or_default(),
            email: id.email.clone().unwrap_or_default(),
        },
        (None, None) => AddressPrefill::default(),
    };
    CheckoutView {
        step: state.flow.step,
        busy: state.flow.busy,
        address: state.flow.address.clone(),
        prefill,
        total_items: state.cart.total_items(),
        total_price: state.cart.total_price(),
    }
}

pub async fn view(
    state: &AppState,
    session: &SessionId,
    identity: Option<&Identity>,
) -> AppResult<ApiResponse<CheckoutView>> {
    let view = state
        .sessions
        .with(&session.0, |s| view_of(s, identity))
        .await;
    Ok(ApiResponse::success("OK", view, Some(Meta::empty())))
}

/// Opening (or reopening) the checkout always lands on the address step.
pub async fn open(
    state: &AppState,
    session: &SessionId,
    identity: Option<&Identity>,
) -> AppResult<ApiResponse<CheckoutView>> {
    let view = state
        .sessions
        .with(&session.0, |s| {
            s.flow.reset();
            view_of(s, identity)
        })
        .await;
    Ok(ApiResponse::success("Checkout opened", view, None))
}

pub async fn submit_address(
    state: &AppState,
    session: &SessionId,
    identity: Option<&Identity>,
    address: ShippingAddress,
) -> AppResult<ApiResponse<CheckoutView>> {
    let view = state
        .sessions
        .with(&session.0, |s| {
            s.flow.submit_address(address)?;
            Ok::<_, AppError>(view_of(s, identity))
        })
        .await?;
    Ok(ApiResponse::success("Address captured", view, None))
}

pub async fn back_to_address(
    state: &AppState,
    session: &SessionId,
    identity: Option<&Identity>,
) -> AppResult<ApiResponse<CheckoutView>> {
    let view = state
        .sessions
        .with(&session.0, |s| {
            s.flow.back_to_address();
            view_of(s, identity)
        })
        .await;
    Ok(ApiResponse::success("OK", view, None))
}

/// Create the gateway order for the cart total and hand back everything the
/// hosted widget needs. The busy flag goes up before the network call and
/// comes back down on any failure.
pub async fn begin_payment(
    state: &AppState,
    session: &SessionId,
) -> AppResult<ApiResponse<PayResponse>> {
    let key_id = state
        .config
        .razorpay_key_id
        .clone()
        .ok_or(AppError::GatewayConfig)?;

    let (amount, total_items, address) = state
        .sessions
        .with(&session.0, |s| {
            if s.flow.step != CheckoutStep::Summary {
                return Err(AppError::BadRequest("shipping address not captured".into()));
            }
            if s.flow.busy {
                return Err(AppError::BadRequest("payment already in progress".into()));
            }
            if s.cart.is_empty() {
                return Err(AppError::BadRequest("cart is empty".into()));
            }
            let address = s
                .flow
                .address
                .clone()
                .ok_or_else(|| AppError::BadRequest("shipping address not captured".into()))?;
            s.flow.busy = true;
            Ok((s.cart.total_price(), s.cart.total_items(), address))
        })
        .await?;

    let receipt = format!("tsank_{}", Utc::now().timestamp_millis());
    let gateway_order = match state.gateway.create_order(amount, "INR", &receipt).await {
        Ok(order) => order,
        Err(err) => {
            state
                .sessions
                .with(&session.0, |s| s.flow.cancel_payment())
                .await;
            return Err(err);
        }
    };

    // The widget may have been dismissed while the gateway call was in
    // flight; a cleared busy flag means the attempt is dead.
    let installed = state
        .sessions
        .with(&session.0, |s| {
            if !s.flow.busy {
                return false;
            }
            s.flow.pending = Some(PendingPayment {
                gateway_order_id: gateway_order.id.clone(),
                amount,
            });
            true
        })
        .await;
    if !installed {
        return Err(AppError::BadRequest("payment was cancelled".into()));
    }

    tracing::info!(
        gateway_order_id = %gateway_order.id,
        total = amount.value(),
        "payment started"
    );

    let data = PayResponse {
        gateway_order_id: gateway_order.id,
        amount: gateway_order.amount,
        currency: gateway_order.currency,
        key_id,
        description: format!("{total_items} item(s) - Premium Transformers Merch"),
        prefill_name: address.full_name,
        prefill_email: address.email,
        prefill_phone: address.phone,
    };
    Ok(ApiResponse::success("Gateway order created", data, None))
}

/// Widget dismissed before completion. No order artifact exists; the flow
/// is interactive again.
pub async fn cancel_payment(
    state: &AppState,
    session: &SessionId,
    identity: Option<&Identity>,
) -> AppResult<ApiResponse<CheckoutView>> {
    let view = state
        .sessions
        .with(&session.0, |s| {
            s.flow.cancel_payment();
            view_of(s, identity)
        })
        .await;
    Ok(ApiResponse::success("Payment cancelled", view, None))
}

/// The monetary trust boundary. The callback is verified against the
/// server-held secret before anything is persisted; a rejection leaves the
/// cart untouched and the flow in an interactive summary state.
pub async fn complete_payment(
    state: &AppState,
    session: &SessionId,
    identity: Option<&Identity>,
    callback: PaymentCallback,
) -> AppResult<ApiResponse<ConfirmResponse>> {
    let secret = state
        .config
        .razorpay_key_secret
        .clone()
        .ok_or(AppError::GatewayConfig)?;

    if let Err(err) = verify::verify_payment(&secret, &callback) {
        state
            .sessions
            .with(&session.0, |s| s.flow.cancel_payment())
            .await;
        tracing::warn!(gateway_order_id = %callback.gateway_order_id, "payment verification rejected");
        return Err(err);
    }

    // Snapshot the cart and address in one critical section; the total is
    // taken here, at the moment of successful verification.
    let (lines, address, total) = state
        .sessions
        .with(&session.0, |s| {
            let pending = s
                .flow
                .pending
                .clone()
                .ok_or_else(|| AppError::BadRequest("no payment in progress".into()))?;
            if pending.gateway_order_id != callback.gateway_order_id {
                s.flow.cancel_payment();
                return Err(AppError::VerificationRejected(
                    "payment does not match this checkout".into(),
                ));
            }
            let address = s
                .flow
                .address
                .clone()
                .ok_or_else(|| AppError::BadRequest("shipping address not captured".into()))?;
            if s.cart.is_empty() {
                return Err(AppError::BadRequest("cart is empty".into()));
            }
            let total = s.cart.total_price();
            // The cart is frozen while busy, so a divergence here means the
            // charge no longer matches what would be persisted.
            if total != pending.amount {
                s.flow.cancel_payment();
                return Err(AppError::VerificationRejected(
                    "order total changed after payment started".into(),
                ));
            }
            Ok((s.cart.lines().to_vec(), address, total))
        })
        .await?;

    let owner = owner_key(identity, session);
    let order = order_service::create_order(
        &state.orm,
        &owner,
        &lines,
        &address,
        total,
        &callback.gateway_payment_id,
        &callback.gateway_order_id,
    )
    .await?;

    state
        .sessions
        .with(&session.0, |s| {
            s.cart.clear();
            s.flow.reset();
        })
        .await;

    tracing::info!(order_id = %order.id, total = order.total.value(), "order confirmed");

    Ok(ApiResponse::success(
        "Payment verified",
        ConfirmResponse {
            verified: true,
            order,
        },
        Some(Meta::empty()),
    ))
}
