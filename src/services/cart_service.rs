use crate::{
    dto::cart::{AddItemRequest, CartView, UpdateQuantityRequest},
    error::{AppError, AppResult},
    middleware::session::SessionId,
    response::{ApiResponse, Meta},
    session::SessionState,
    state::AppState,
};

fn view_of(state: &SessionState) -> CartView {
    CartView {
        items: state.cart.lines().to_vec(),
        total_items: state.cart.total_items(),
        total_price: state.cart.total_price(),
    }
}

/// A cart frozen by an in-flight payment must not change what the gateway
/// was asked to charge. Reads stay allowed.
fn ensure_unlocked(state: &SessionState) -> AppResult<()> {
    if state.flow.busy {
        return Err(AppError::BadRequest("payment in progress".into()));
    }
    Ok(())
}

pub async fn view_cart(state: &AppState, session: &SessionId) -> AppResult<ApiResponse<CartView>> {
    let view = state.sessions.with(&session.0, |s| view_of(s)).await;
    Ok(ApiResponse::success("OK", view, Some(Meta::empty())))
}

pub async fn add_item(
    state: &AppState,
    session: &SessionId,
    payload: AddItemRequest,
) -> AppResult<ApiResponse<CartView>> {
    let product = state
        .catalog
        .get(&payload.product_id)
        .ok_or_else(|| AppError::BadRequest("product not found".to_string()))?;
    if !product.sizes.contains(&payload.size) {
        return Err(AppError::BadRequest(format!(
            "size {} not available for {}",
            payload.size, product.id
        )));
    }

    let product = product.clone();
    let view = state
        .sessions
        .with(&session.0, |s| {
            ensure_unlocked(s)?;
            s.cart.add_item(product, &payload.size);
            Ok::<_, AppError>(view_of(s))
        })
        .await?;

    Ok(ApiResponse::success("Added to cart", view, None))
}

pub async fn update_quantity(
    state: &AppState,
    session: &SessionId,
    payload: UpdateQuantityRequest,
) -> AppResult<ApiResponse<CartView>> {
    let view = state
        .sessions
        .with(&session.0, |s| {
            ensure_unlocked(s)?;
            s.cart
                .update_quantity(&payload.product_id, &payload.size, payload.quantity);
            Ok::<_, AppError>(view_of(s))
        })
        .await?;

    Ok(ApiResponse::success("Cart updated", view, None))
}

pub async fn remove_item(
    state: &AppState,
    session: &SessionId,
    product_id: &str,
    size: &str,
) -> AppResult<ApiResponse<CartView>> {
    // Removing an absent line is a no-op by contract, not a 404.
    let view = state
        .sessions
        .with(&session.0, |s| {
            ensure_unlocked(s)?;
            s.cart.remove_item(product_id, size);
            Ok::<_, AppError>(view_of(s))
        })
        .await?;

    Ok(ApiResponse::success("Removed from cart", view, None))
}

pub async fn clear_cart(state: &AppState, session: &SessionId) -> AppResult<ApiResponse<CartView>> {
    let view = state
        .sessions
        .with(&session.0, |s| {
            ensure_unlocked(s)?;
            s.cart.clear();
            Ok::<_, AppError>(view_of(s))
        })
        .await?;

    Ok(ApiResponse::success("Cart cleared", view, None))
}
