use utoipa::{
    Modify, OpenApi,
    openapi::{
        self,
        OpenApi as OpenApiSpec,
        security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    },
};
use utoipa_scalar::{Scalar, Servable};

use crate::{
    cart::CartLine,
    dto::{
        cart::{AddItemRequest, CartView, UpdateQuantityRequest},
        checkout::{AddressPrefill, CheckoutView, ConfirmResponse, PayResponse},
        orders::OrderList,
        products::ProductList,
    },
    models::{Order, OrderItem, OrderStatus, Product, ShippingAddress},
    response::{ApiResponse, Meta},
    routes::{admin, cart, checkout, health, orders, params, products},
    verify::PaymentCallback,
};

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health_check,
        products::list_products,
        products::get_product,
        cart::view_cart,
        cart::add_item,
        cart::update_quantity,
        cart::remove_item,
        cart::clear_cart,
        checkout::view_checkout,
        checkout::open_checkout,
        checkout::submit_address,
        checkout::back_to_address,
        checkout::begin_payment,
        checkout::cancel_payment,
        checkout::confirm_payment,
        orders::list_orders,
        orders::get_order,
        admin::list_all_orders,
        admin::get_order_admin,
        admin::update_order_status
    ),
    components(
        schemas(
            Product,
            ProductList,
            CartLine,
            CartView,
            AddItemRequest,
            UpdateQuantityRequest,
            ShippingAddress,
            CheckoutView,
            AddressPrefill,
            PayResponse,
            PaymentCallback,
            ConfirmResponse,
            Order,
            OrderItem,
            OrderStatus,
            OrderList,
            admin::UpdateOrderStatusRequest,
            params::Pagination,
            params::OrderListQuery,
            Meta,
            ApiResponse<Product>,
            ApiResponse<ProductList>,
            ApiResponse<CartView>,
            ApiResponse<CheckoutView>,
            ApiResponse<PayResponse>,
            ApiResponse<ConfirmResponse>,
            ApiResponse<Order>,
            ApiResponse<OrderList>
        )
    ),
    security(
        ("bearer_auth" = [])
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Health check endpoint"),
        (name = "Products", description = "Read-only product catalog"),
        (name = "Cart", description = "Session cart endpoints"),
        (name = "Checkout", description = "Checkout flow and payment endpoints"),
        (name = "Orders", description = "Customer order visibility"),
        (name = "Admin", description = "Admin order management"),
    )
)]
pub struct ApiDoc;

pub fn scalar_docs() -> Scalar<OpenApiSpec> {
    Scalar::with_url("/docs", ApiDoc::openapi())
}
