use chrono::Utc;
use rand::Rng;
use sea_orm::ActiveValue::Set;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, TransactionTrait,
};
use uuid::Uuid;

use crate::{
    audit::log_audit,
    cart::CartLine,
    db::OrmConn,
    dto::orders::OrderList,
    entity::{
        order_items::{
            ActiveModel as OrderItemActive, Column as OrderItemCol, Entity as OrderItems,
            Model as OrderItemModel,
        },
        orders::{ActiveModel as OrderActive, Column as OrderCol, Entity as Orders, Model as OrderModel},
    },
    error::{AppError, AppResult},
    models::{Order, OrderItem, OrderStatus, ShippingAddress},
    money::Money,
    response::{ApiResponse, Meta},
};

const ID_ALPHABET: &[u8] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// `ORD-<epoch_ms>-<4 base36 chars>`. The timestamp makes collisions need
/// the same millisecond and the same random suffix.
pub fn generate_order_id() -> String {
    let mut rng = rand::thread_rng();
    let suffix: String = (0..4)
        .map(|_| ID_ALPHABET[rng.gen_range(0..ID_ALPHABET.len())] as char)
        .collect();
    format!("ORD-{}-{}", Utc::now().timestamp_millis(), suffix)
}

/// Persist a verified payment as an order. Items and address are copied at
/// this moment; the caller may clear the cart right after without touching
/// the stored record. Called at most once per verified payment.
pub async fn create_order(
    orm: &OrmConn,
    owner_id: &str,
    lines: &[CartLine],
    address: &ShippingAddress,
    total: Money,
    payment_id: &str,
    gateway_order_id: &str,
) -> AppResult<Order> {
    let txn = orm.begin().await?;

    let id = generate_order_id();
    let now = Utc::now();

    let order = OrderActive {
        id: Set(id),
        owner_id: Set(owner_id.to_string()),
        full_name: Set(address.full_name.clone()),
        phone: Set(address.phone.clone()),
        email: Set(address.email.clone()),
        address: Set(address.address.clone()),
        city: Set(address.city.clone()),
        state: Set(address.state.clone()),
        pincode: Set(address.pincode.clone()),
        total: Set(total.value()),
        status: Set(OrderStatus::Confirmed.as_str().to_string()),
        payment_id: Set(payment_id.to_string()),
        gateway_order_id: Set(gateway_order_id.to_string()),
        created_at: Set(now.into()),
    }
    .insert(&txn)
    .await?;

    let mut items: Vec<OrderItemModel> = Vec::with_capacity(lines.len());
    for line in lines {
        let item = OrderItemActive {
            id: Set(Uuid::new_v4()),
            order_id: Set(order.id.clone()),
            product_id: Set(line.product.id.clone()),
            product_name: Set(line.product.name.clone()),
            product_image: Set(line.product.image.clone()),
            size: Set(line.size.clone()),
            quantity: Set(line.quantity),
            price: Set(line.product.price.value()),
        }
        .insert(&txn)
        .await?;
        items.push(item);
    }

    txn.commit().await?;

    if let Err(err) = log_audit(
        orm,
        Some(owner_id),
        "order_created",
        Some("orders"),
        Some(serde_json::json!({ "order_id": order.id, "total": total.value() })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(order_from_entity(order, items))
}

/// Orders visible to one owner context, newest first.
pub async fn list_orders(orm: &OrmConn, owner_id: &str) -> AppResult<ApiResponse<OrderList>> {
    let rows = Orders::find()
        .filter(OrderCol::OwnerId.eq(owner_id))
        .order_by_desc(OrderCol::CreatedAt)
        .find_with_related(OrderItems)
        .all(orm)
        .await?;

    let total = rows.len() as i64;
    let items = rows
        .into_iter()
        .map(|(order, items)| order_from_entity(order, items))
        .collect();

    let meta = Meta::new(1, total, total);
    Ok(ApiResponse::success("Ok", OrderList { items }, Some(meta)))
}

pub async fn get_order(orm: &OrmConn, owner_id: &str, id: &str) -> AppResult<ApiResponse<Order>> {
    let order = Orders::find_by_id(id)
        .filter(OrderCol::OwnerId.eq(owner_id))
        .one(orm)
        .await?
        .ok_or(AppError::NotFound)?;

    let items = OrderItems::find()
        .filter(OrderItemCol::OrderId.eq(order.id.clone()))
        .all(orm)
        .await?;

    Ok(ApiResponse::success(
        "OK",
        order_from_entity(order, items),
        Some(Meta::empty()),
    ))
}

/// A stored status should always parse; a row that does not is corrupt and
/// gets read as the earliest stage rather than failing the whole listing.
pub(crate) fn stored_status(raw: &str) -> OrderStatus {
    OrderStatus::parse(raw).unwrap_or_else(|| {
        tracing::warn!(status = raw, "unrecognized stored order status");
        OrderStatus::Confirmed
    })
}

pub(crate) fn order_from_entity(model: OrderModel, items: Vec<OrderItemModel>) -> Order {
    Order {
        id: model.id,
        items: items.into_iter().map(order_item_from_entity).collect(),
        address: ShippingAddress {
            full_name: model.full_name,
            phone: model.phone,
            email: model.email,
            address: model.address,
            city: model.city,
            state: model.state,
            pincode: model.pincode,
        },
        total: Money::rupees(model.total),
        status: stored_status(&model.status),
        payment_id: model.payment_id,
        order_id: model.gateway_order_id,
        created_at: model.created_at.with_timezone(&Utc),
    }
}

fn order_item_from_entity(model: OrderItemModel) -> OrderItem {
    OrderItem {
        product_id: model.product_id,
        product_name: model.product_name,
        product_image: model.product_image,
        size: model.size,
        quantity: model.quantity,
        price: Money::rupees(model.price),
    }
}
