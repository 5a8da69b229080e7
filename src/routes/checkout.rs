use axum::{
    Json, Router,
    extract::State,
    routing::{get, post},
};

use crate::{
    dto::checkout::{CheckoutView, ConfirmResponse, PayResponse},
    error::AppResult,
    middleware::auth::MaybeIdentity,
    middleware::session::SessionId,
    models::ShippingAddress,
    response::ApiResponse,
    services::checkout_service,
    state::AppState,
    verify::PaymentCallback,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(view_checkout))
        .route("/open", post(open_checkout))
        .route("/address", post(submit_address))
        .route("/back", post(back_to_address))
        .route("/pay", post(begin_payment))
        .route("/cancel", post(cancel_payment))
        .route("/confirm", post(confirm_payment))
}

#[utoipa::path(
    get,
    path = "/api/checkout",
    responses(
        (status = 200, description = "Current checkout flow state", body = ApiResponse<CheckoutView>)
    ),
    tag = "Checkout"
)]
pub async fn view_checkout(
    State(state): State<AppState>,
    session: SessionId,
    MaybeIdentity(identity): MaybeIdentity,
) -> AppResult<Json<ApiResponse<CheckoutView>>> {
    let resp = checkout_service::view(&state, &session, identity.as_ref()).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/checkout/open",
    responses(
        (status = 200, description = "Reset to the address step, prefill from identity", body = ApiResponse<CheckoutView>)
    ),
    tag = "Checkout"
)]
pub async fn open_checkout(
    State(state): State<AppState>,
    session: SessionId,
    MaybeIdentity(identity): MaybeIdentity,
) -> AppResult<Json<ApiResponse<CheckoutView>>> {
    let resp = checkout_service::open(&state, &session, identity.as_ref()).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/checkout/address",
    request_body = ShippingAddress,
    responses(
        (status = 200, description = "Address captured, flow advances to summary", body = ApiResponse<CheckoutView>),
        (status = 400, description = "Address incomplete"),
    ),
    tag = "Checkout"
)]
pub async fn submit_address(
    State(state): State<AppState>,
    session: SessionId,
    MaybeIdentity(identity): MaybeIdentity,
    Json(payload): Json<ShippingAddress>,
) -> AppResult<Json<ApiResponse<CheckoutView>>> {
    let resp =
        checkout_service::submit_address(&state, &session, identity.as_ref(), payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/checkout/back",
    responses(
        (status = 200, description = "Back to the address step (kept address)", body = ApiResponse<CheckoutView>)
    ),
    tag = "Checkout"
)]
pub async fn back_to_address(
    State(state): State<AppState>,
    session: SessionId,
    MaybeIdentity(identity): MaybeIdentity,
) -> AppResult<Json<ApiResponse<CheckoutView>>> {
    let resp = checkout_service::back_to_address(&state, &session, identity.as_ref()).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/checkout/pay",
    responses(
        (status = 200, description = "Gateway order created; open the hosted widget", body = ApiResponse<PayResponse>),
        (status = 400, description = "Flow not ready or payment already in progress"),
        (status = 500, description = "Gateway credentials missing"),
    ),
    tag = "Checkout"
)]
pub async fn begin_payment(
    State(state): State<AppState>,
    session: SessionId,
) -> AppResult<Json<ApiResponse<PayResponse>>> {
    let resp = checkout_service::begin_payment(&state, &session).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/checkout/cancel",
    responses(
        (status = 200, description = "Widget dismissed; flow interactive again", body = ApiResponse<CheckoutView>)
    ),
    tag = "Checkout"
)]
pub async fn cancel_payment(
    State(state): State<AppState>,
    session: SessionId,
    MaybeIdentity(identity): MaybeIdentity,
) -> AppResult<Json<ApiResponse<CheckoutView>>> {
    let resp = checkout_service::cancel_payment(&state, &session, identity.as_ref()).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/checkout/confirm",
    request_body = PaymentCallback,
    responses(
        (status = 200, description = "Signature verified, order persisted, cart cleared", body = ApiResponse<ConfirmResponse>),
        (status = 400, description = "Verification rejected; no order created"),
    ),
    tag = "Checkout"
)]
pub async fn confirm_payment(
    State(state): State<AppState>,
    session: SessionId,
    MaybeIdentity(identity): MaybeIdentity,
    Json(payload): Json<PaymentCallback>,
) -> AppResult<Json<ApiResponse<ConfirmResponse>>> {
    let resp =
        checkout_service::complete_payment(&state, &session, identity.as_ref(), payload).await?;
    Ok(Json(resp))
}
