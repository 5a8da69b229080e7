use std::collections::HashMap;

use sea_orm::ActiveValue::Set;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, IntoActiveModel, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect,
};

use crate::{
    audit::log_audit,
    dto::orders::OrderList,
    entity::{
        order_items::{Column as OrderItemCol, Entity as OrderItems, Model as OrderItemModel},
        orders::{Column as OrderCol, Entity as Orders},
    },
    error::{AppError, AppResult},
    middleware::auth::{Identity, ensure_admin},
    models::{Order, OrderStatus},
    response::{ApiResponse, Meta},
    routes::admin::UpdateOrderStatusRequest,
    routes::params::{OrderListQuery, SortOrder},
    services::order_service::{order_from_entity, stored_status},
    state::AppState,
};

/// All orders regardless of owner, newest first by default.
pub async fn list_all_orders(
    state: &AppState,
    identity: &Identity,
    query: OrderListQuery,
) -> AppResult<ApiResponse<OrderList>> {
    ensure_admin(identity)?;
    let (page, limit, offset) = query.pagination.normalize();

    let mut condition = Condition::all();
    if let Some(status) = query.status.as_ref().filter(|s| !s.is_empty()) {
        condition = condition.add(OrderCol::Status.eq(status.clone()));
    }

    let mut finder = Orders::find().filter(condition);
    let sort_order = query.sort_order.unwrap_or(SortOrder::Desc);
    finder = match sort_order {
        SortOrder::Asc => finder.order_by_asc(OrderCol::CreatedAt),
        SortOrder::Desc => finder.order_by_desc(OrderCol::CreatedAt),
    };

    let total = finder.clone().count(&state.orm).await? as i64;

    let orders = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?;

    // One items query for the whole page, grouped back by order id.
    let ids: Vec<String> = orders.iter().map(|o| o.id.clone()).collect();
    let mut items_by_order: HashMap<String, Vec<OrderItemModel>> = HashMap::new();
    if !ids.is_empty() {
        for item in OrderItems::find()
            .filter(OrderItemCol::OrderId.is_in(ids))
            .all(&state.orm)
            .await?
        {
            items_by_order
                .entry(item.order_id.clone())
                .or_default()
                .push(item);
        }
    }

    let items = orders
        .into_iter()
        .map(|order| {
            let order_items = items_by_order.remove(&order.id).unwrap_or_default();
            order_from_entity(order, order_items)
        })
        .collect();

    let meta = Meta::new(page, limit, total);
    Ok(ApiResponse::success("Orders", OrderList { items }, Some(meta)))
}

pub async fn get_order_admin(
    state: &AppState,
    identity: &Identity,
    id: &str,
) -> AppResult<ApiResponse<Order>> {
    ensure_admin(identity)?;
    let order = Orders::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;

    let items = OrderItems::find()
        .filter(OrderItemCol::OrderId.eq(order.id.clone()))
        .all(&state.orm)
        .await?;

    Ok(ApiResponse::success(
        "OK",
        order_from_entity(order, items),
        Some(Meta::empty()),
    ))
}

/// Transition an order's status. The lifecycle only moves forward; unknown
/// ids leave everything unchanged.
pub async fn update_order_status(
    state: &AppState,
    identity: &Identity,
    id: &str,
    payload: UpdateOrderStatusRequest,
) -> AppResult<ApiResponse<Order>> {
    ensure_admin(identity)?;

    let new_status = OrderStatus::parse(&payload.status)
        .ok_or_else(|| AppError::BadRequest(format!("unknown status {}", payload.status)))?;

    let order = Orders::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;

    let current = stored_status(&order.status);
    if new_status.ordinal() <= current.ordinal() {
        return Err(AppError::BadRequest(format!(
            "cannot move order from {current} to {new_status}"
        )));
    }

    let mut active = order.into_active_model();
    active.status = Set(new_status.as_str().to_string());
    let order = active.update(&state.orm).await?;

    if let Err(err) = log_audit(
        &state.orm,
        Some(&identity.uid),
        "order_status_updated",
        Some("orders"),
        Some(serde_json::json!({ "order_id": order.id, "status": new_status.as_str() })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    let items = OrderItems::find()
        .filter(OrderItemCol::OrderId.eq(order.id.clone()))
        .all(&state.orm)
        .await?;

    Ok(ApiResponse::success(
        "Status updated",
        order_from_entity(order, items),
        Some(Meta::empty()),
    ))
}
