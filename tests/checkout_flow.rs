use std::sync::Arc;

use async_trait::async_trait;
use uuid::Uuid;

use tsank_storefront_api::{
    catalog::Catalog,
    checkout::CheckoutStep,
    config::AppConfig,
    db::create_orm_conn,
    db::run_migrations,
    dto::cart::AddItemRequest,
    error::{AppError, AppResult},
    gateway::{GatewayOrder, PaymentGateway},
    middleware::auth::Identity,
    middleware::session::SessionId,
    models::{OrderStatus, ShippingAddress},
    money::Money,
    routes::admin::UpdateOrderStatusRequest,
    routes::params::{OrderListQuery, Pagination},
    services::{admin_service, cart_service, checkout_service, order_service},
    session::Sessions,
    state::AppState,
    verify::{PaymentCallback, sign_payment},
};

const SECRET: &str = "rzp_test_secret";

/// Stands in for the Razorpay orders API so the pipeline can run without
/// network access. Mirrors the real adapter's guards.
struct FakeGateway;

#[async_trait]
impl PaymentGateway for FakeGateway {
    async fn create_order(
        &self,
        amount: Money,
        currency: &str,
        receipt: &str,
    ) -> AppResult<GatewayOrder> {
        if !amount.is_positive() {
            return Err(AppError::InvalidAmount);
        }
        Ok(GatewayOrder {
            id: format!("order_fake_{receipt}"),
            amount: amount.to_minor().value(),
            currency: currency.to_string(),
        })
    }
}

// Allow skipping when no DB is configured in the environment.
async fn setup_state() -> anyhow::Result<Option<AppState>> {
    setup_state_with(Sessions::default(), Arc::new(FakeGateway)).await
}

async fn setup_state_with(
    sessions: Sessions,
    gateway: Arc<dyn PaymentGateway>,
) -> anyhow::Result<Option<AppState>> {
    let database_url =
        match std::env::var("TEST_DATABASE_URL").or_else(|_| std::env::var("DATABASE_URL")) {
            Ok(url) => url,
            Err(_) => {
                eprintln!(
                    "Skipping test: set TEST_DATABASE_URL or DATABASE_URL to run integration flow tests."
                );
                return Ok(None);
            }
        };

    let orm = create_orm_conn(&database_url).await?;
    run_migrations(&orm).await?;

    let config = AppConfig {
        database_url,
        host: "127.0.0.1".into(),
        port: 0,
        razorpay_key_id: Some("rzp_test_key".into()),
        razorpay_key_secret: Some(SECRET.into()),
    };

    Ok(Some(AppState {
        orm,
        sessions,
        catalog: Arc::new(Catalog::seeded()),
        gateway,
        config: Arc::new(config),
    }))
}

fn fresh_session(label: &str) -> SessionId {
    SessionId(format!("{label}-{}", Uuid::new_v4()))
}

fn valid_address() -> ShippingAddress {
    ShippingAddress {
        full_name: "Sanket Kokate".into(),
        phone: "9876543210".into(),
        email: "sanket@example.com".into(),
        address: "12 MG Road".into(),
        city: "Pune".into(),
        state: "Maharashtra".into(),
        pincode: "411001".into(),
    }
}

async fn add_optimus_twice(state: &AppState, session: &SessionId) -> anyhow::Result<()> {
    for _ in 0..2 {
        cart_service::add_item(
            state,
            session,
            AddItemRequest {
                product_id: "optimus-prime".into(),
                size: "L".into(),
            },
        )
        .await?;
    }
    Ok(())
}

// Scenario: two Optimus tees, valid address, correctly signed callback.
#[tokio::test]
async fn verified_payment_creates_exactly_one_confirmed_order() -> anyhow::Result<()> {
    let Some(state) = setup_state().await? else {
        return Ok(());
    };
    let session = fresh_session("happy");

    add_optimus_twice(&state, &session).await?;
    let cart = cart_service::view_cart(&state, &session).await?.data.unwrap();
    assert_eq!(cart.total_price, Money::rupees(2598));
    assert_eq!(cart.items.len(), 1);
    assert_eq!(cart.items[0].quantity, 2);

    checkout_service::submit_address(&state, &session, None, valid_address()).await?;
    let pay = checkout_service::begin_payment(&state, &session)
        .await?
        .data
        .unwrap();
    assert_eq!(pay.amount, 259_800, "gateway amount is in paise");

    let signature = sign_payment(SECRET, &pay.gateway_order_id, "pay_TEST001");
    let confirm = checkout_service::complete_payment(
        &state,
        &session,
        None,
        PaymentCallback {
            gateway_order_id: pay.gateway_order_id.clone(),
            gateway_payment_id: "pay_TEST001".into(),
            gateway_signature: signature,
        },
    )
    .await?
    .data
    .unwrap();

    let order = confirm.order;
    assert!(confirm.verified);
    assert_eq!(order.status, OrderStatus::Confirmed);
    assert_eq!(order.total, Money::rupees(2598));
    assert_eq!(order.items.len(), 1);
    assert_eq!(order.items[0].quantity, 2);
    assert_eq!(order.order_id, pay.gateway_order_id);
    assert!(order.id.starts_with("ORD-"));

    // Cart was cleared by the verified payment.
    let cart = cart_service::view_cart(&state, &session).await?.data.unwrap();
    assert_eq!(cart.total_items, 0);

    // The persisted record is a snapshot: the cleared cart changed nothing.
    let listed = order_service::list_orders(&state.orm, &session.0)
        .await?
        .data
        .unwrap();
    assert_eq!(listed.items.len(), 1);
    assert_eq!(listed.items[0].total, Money::rupees(2598));
    assert_eq!(listed.items[0].items[0].quantity, 2);
    assert_eq!(listed.items[0].address.pincode, "411001");

    Ok(())
}

// Scenario: signature computed with the wrong secret.
#[tokio::test]
async fn rejected_verification_creates_no_order_and_keeps_the_cart() -> anyhow::Result<()> {
    let Some(state) = setup_state().await? else {
        return Ok(());
    };
    let session = fresh_session("tampered");

    add_optimus_twice(&state, &session).await?;
    checkout_service::submit_address(&state, &session, None, valid_address()).await?;
    let pay = checkout_service::begin_payment(&state, &session)
        .await?
        .data
        .unwrap();

    let forged = sign_payment("wrong_secret", &pay.gateway_order_id, "pay_TEST002");
    let err = checkout_service::complete_payment(
        &state,
        &session,
        None,
        PaymentCallback {
            gateway_order_id: pay.gateway_order_id,
            gateway_payment_id: "pay_TEST002".into(),
            gateway_signature: forged,
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::VerificationRejected(_)));

    // No order, cart intact, flow interactive again on the summary step.
    let listed = order_service::list_orders(&state.orm, &session.0)
        .await?
        .data
        .unwrap();
    assert!(listed.items.is_empty());

    let cart = cart_service::view_cart(&state, &session).await?.data.unwrap();
    assert_eq!(cart.total_items, 2);

    let view = checkout_service::view(&state, &session, None)
        .await?
        .data
        .unwrap();
    assert!(!view.busy);
    assert_eq!(view.step, CheckoutStep::Summary);

    Ok(())
}

// Scenario: admin ships an order; the owner sees the new status; unknown
// ids change nothing.
#[tokio::test]
async fn admin_status_updates_are_visible_and_forward_only() -> anyhow::Result<()> {
    let Some(state) = setup_state().await? else {
        return Ok(());
    };
    let session = fresh_session("admin-flow");
    let admin = Identity {
        uid: "admin-1".into(),
        email: Some("admin@example.com".into()),
        display_name: None,
        role: "admin".into(),
    };

    add_optimus_twice(&state, &session).await?;
    checkout_service::submit_address(&state, &session, None, valid_address()).await?;
    let pay = checkout_service::begin_payment(&state, &session)
        .await?
        .data
        .unwrap();
    let signature = sign_payment(SECRET, &pay.gateway_order_id, "pay_TEST003");
    let order = checkout_service::complete_payment(
        &state,
        &session,
        None,
        PaymentCallback {
            gateway_order_id: pay.gateway_order_id,
            gateway_payment_id: "pay_TEST003".into(),
            gateway_signature: signature,
        },
    )
    .await?
    .data
    .unwrap()
    .order;

    let updated = admin_service::update_order_status(
        &state,
        &admin,
        &order.id,
        UpdateOrderStatusRequest {
            status: "shipped".into(),
        },
    )
    .await?
    .data
    .unwrap();
    assert_eq!(updated.status, OrderStatus::Shipped);

    // The owner's own listing reflects the transition.
    let listed = order_service::list_orders(&state.orm, &session.0)
        .await?
        .data
        .unwrap();
    assert_eq!(listed.items[0].status, OrderStatus::Shipped);

    // Unknown id: not found, nothing mutated.
    let err = admin_service::update_order_status(
        &state,
        &admin,
        "ORD-000000000000-XXXX",
        UpdateOrderStatusRequest {
            status: "delivered".into(),
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::NotFound));

    let listed = order_service::list_orders(&state.orm, &session.0)
        .await?
        .data
        .unwrap();
    assert_eq!(listed.items[0].status, OrderStatus::Shipped);

    // Backwards transitions are refused.
    let err = admin_service::update_order_status(
        &state,
        &admin,
        &order.id,
        UpdateOrderStatusRequest {
            status: "confirmed".into(),
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::BadRequest(_)));

    // Non-admin callers are refused outright.
    let customer = Identity {
        uid: "user-1".into(),
        email: None,
        display_name: None,
        role: "user".into(),
    };
    let err = admin_service::list_all_orders(
        &state,
        &customer,
        OrderListQuery {
            pagination: Pagination {
                page: Some(1),
                per_page: Some(20),
            },
            status: None,
            sort_order: None,
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::Forbidden));

    Ok(())
}

// Duplicate submission guard: a second pay while the widget is open is
// refused until the first attempt is dismissed.
#[tokio::test]
async fn busy_flag_blocks_duplicate_payment_submission() -> anyhow::Result<()> {
    let Some(state) = setup_state().await? else {
        return Ok(());
    };
    let session = fresh_session("busy");

    add_optimus_twice(&state, &session).await?;
    checkout_service::submit_address(&state, &session, None, valid_address()).await?;
    checkout_service::begin_payment(&state, &session).await?;

    let err = checkout_service::begin_payment(&state, &session)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::BadRequest(_)));

    // Dismissing the widget makes the flow interactive again.
    checkout_service::cancel_payment(&state, &session, None).await?;
    checkout_service::begin_payment(&state, &session).await?;

    Ok(())
}

// The gateway was asked to charge a fixed amount; the cart must not change
// underneath the open widget.
#[tokio::test]
async fn cart_is_frozen_while_a_payment_is_in_flight() -> anyhow::Result<()> {
    let Some(state) = setup_state().await? else {
        return Ok(());
    };
    let session = fresh_session("frozen");

    add_optimus_twice(&state, &session).await?;
    checkout_service::submit_address(&state, &session, None, valid_address()).await?;
    checkout_service::begin_payment(&state, &session).await?;

    let err = cart_service::add_item(
        &state,
        &session,
        AddItemRequest {
            product_id: "bumblebee-chibi".into(),
            size: "M".into(),
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::BadRequest(_)));

    let err = cart_service::clear_cart(&state, &session).await.unwrap_err();
    assert!(matches!(err, AppError::BadRequest(_)));

    // Reads still work and show the untouched cart.
    let cart = cart_service::view_cart(&state, &session).await?.data.unwrap();
    assert_eq!(cart.total_price, Money::rupees(2598));

    // Dismissing the widget thaws it.
    checkout_service::cancel_payment(&state, &session, None).await?;
    cart_service::add_item(
        &state,
        &session,
        AddItemRequest {
            product_id: "bumblebee-chibi".into(),
            size: "M".into(),
        },
    )
    .await?;

    Ok(())
}

/// Dismisses its own payment attempt while the gateway call is in flight,
/// like a user hitting cancel during a slow order-creation round trip.
struct SelfCancellingGateway {
    sessions: Sessions,
    session: String,
}

#[async_trait]
impl PaymentGateway for SelfCancellingGateway {
    async fn create_order(
        &self,
        amount: Money,
        currency: &str,
        _receipt: &str,
    ) -> AppResult<GatewayOrder> {
        self.sessions
            .with(&self.session, |s| s.flow.cancel_payment())
            .await;
        Ok(GatewayOrder {
            id: "order_fake_dismissed".into(),
            amount: amount.to_minor().value(),
            currency: currency.to_string(),
        })
    }
}

// A dismissal that races the gateway call wins; the attempt stays dead.
#[tokio::test]
async fn cancel_during_gateway_call_is_not_undone() -> anyhow::Result<()> {
    let session = fresh_session("mid-cancel");
    let sessions = Sessions::default();
    let gateway = Arc::new(SelfCancellingGateway {
        sessions: sessions.clone(),
        session: session.0.clone(),
    });
    let Some(state) = setup_state_with(sessions, gateway).await? else {
        return Ok(());
    };

    add_optimus_twice(&state, &session).await?;
    checkout_service::submit_address(&state, &session, None, valid_address()).await?;

    let err = checkout_service::begin_payment(&state, &session)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::BadRequest(_)));

    let view = checkout_service::view(&state, &session, None)
        .await?
        .data
        .unwrap();
    assert!(!view.busy);

    // No resurrected attempt: confirming against the dismissed order fails.
    let signature = sign_payment(SECRET, "order_fake_dismissed", "pay_TEST004");
    let err = checkout_service::complete_payment(
        &state,
        &session,
        None,
        PaymentCallback {
            gateway_order_id: "order_fake_dismissed".into(),
            gateway_payment_id: "pay_TEST004".into(),
            gateway_signature: signature,
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::BadRequest(_)));

    Ok(())
}

// Paying with an empty cart never reaches the gateway.
#[tokio::test]
async fn empty_cart_cannot_start_a_payment() -> anyhow::Result<()> {
    let Some(state) = setup_state().await? else {
        return Ok(());
    };
    let session = fresh_session("empty");

    checkout_service::submit_address(&state, &session, None, valid_address()).await?;
    let err = checkout_service::begin_payment(&state, &session)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::BadRequest(_)));

    Ok(())
}
