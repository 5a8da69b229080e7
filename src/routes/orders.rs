use axum::{
    Json, Router,
    extract::{Path, State},
    routing::get,
};

use crate::{
    dto::orders::OrderList,
    error::AppResult,
    middleware::auth::MaybeIdentity,
    middleware::session::SessionId,
    models::Order,
    response::ApiResponse,
    services::{checkout_service::owner_key, order_service},
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_orders))
        .route("/{id}", get(get_order))
}

#[utoipa::path(
    get,
    path = "/api/orders",
    responses(
        (status = 200, description = "Caller's orders, newest first", body = ApiResponse<OrderList>)
    ),
    tag = "Orders"
)]
pub async fn list_orders(
    State(state): State<AppState>,
    session: SessionId,
    MaybeIdentity(identity): MaybeIdentity,
) -> AppResult<Json<ApiResponse<OrderList>>> {
    let owner = owner_key(identity.as_ref(), &session);
    let resp = order_service::list_orders(&state.orm, &owner).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/orders/{id}",
    params(
        ("id" = String, Path, description = "Order ID")
    ),
    responses(
        (status = 200, description = "One of the caller's orders", body = ApiResponse<Order>),
        (status = 404, description = "Not Found"),
    ),
    tag = "Orders"
)]
pub async fn get_order(
    State(state): State<AppState>,
    session: SessionId,
    MaybeIdentity(identity): MaybeIdentity,
    Path(id): Path<String>,
) -> AppResult<Json<ApiResponse<Order>>> {
    let owner = owner_key(identity.as_ref(), &session);
    let resp = order_service::get_order(&state.orm, &owner, &id).await?;
    Ok(Json(resp))
}
