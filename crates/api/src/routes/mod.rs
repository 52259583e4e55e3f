//! HTTP route handlers.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                                    - Liveness message
//! GET  /health                              - Health check
//!
//! # Auth
//! POST /api/auth/register                   - Create account, issue token
//! POST /api/auth/login                      - Issue token
//! GET  /api/auth/me                         - Current user (auth)
//! POST /api/auth/logout                     - Client-side token disposal (auth)
//! DELETE /api/auth/delete                   - Delete own account (auth)
//! POST /api/auth/send-code                  - Issue verification OTP
//! POST /api/auth/test-verify-otp            - Verify-and-consume an OTP
//! POST /api/auth/forgot-password            - Issue password-reset OTP
//! POST /api/auth/verify-forgot-password-code - Trade OTP for reset token
//! POST /api/auth/reset-password             - Reset password with token
//! PUT  /api/auth/address                    - Legacy profile address (auth)
//!
//! # Catalog
//! GET  /api/categories                      - List categories
//! GET  /api/categories/{id}                 - Category with its products
//! POST/PUT/DELETE /api/categories[/{id}]    - Admin CRUD
//! GET  /api/products                        - Filtered, paginated listing
//! GET  /api/products/{id}                   - Product with relations
//! POST/PUT/DELETE /api/products[/{id}]      - Admin CRUD
//! GET  /api/products/{id}/images            - Product images (auth)
//! POST /api/products/{id}/images            - Append image (admin)
//! DELETE /api/products/images/{image_id}    - Delete image (admin)
//!
//! # Cart (auth)
//! POST /api/cart                            - Add / increment
//! GET  /api/cart                            - List with products
//! DELETE /api/cart/{product_id}             - Decrement or remove
//! DELETE /api/cart/all/{product_id}         - Remove entirely
//!
//! # Addresses (auth)
//! POST/GET /api/addresses                   - Create / list
//! PUT/DELETE /api/addresses/{id}            - Update / delete (owned)
//! GET  /api/addresses/delivery-price/pincode/{pincode}
//! GET  /api/addresses/delivery-price/address/{id}
//!
//! # Orders
//! POST /api/orders                          - From cart or explicit lines (auth)
//! GET  /api/orders                          - Own orders (auth)
//! PUT  /api/orders/{id}/status              - Status transition (admin)
//!
//! # Payments (auth)
//! POST /api/payment/order                   - Create gateway order
//! POST /api/payment/verify                  - Verify signature, record payment
//!
//! # Location (auth)
//! GET/POST /api/location/istricity          - Service-area flag
//!
//! # Admin
//! GET  /api/admin/users                     - Paginated accounts
//! GET  /api/admin/orders                    - Paginated undelivered orders
//! GET  /api/admin/dashboard/stats           - Counts and revenue sum
//! POST /api/admin/pincode                   - Upsert delivery price
//! GET  /api/admin/pincodes                  - Paginated pincodes
//! ```

pub mod addresses;
pub mod admin;
pub mod auth;
pub mod cart;
pub mod categories;
pub mod location;
pub mod orders;
pub mod payments;
pub mod products;

use axum::{
    Router,
    routing::{delete, get, post, put},
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .route("/me", get(auth::me))
        .route("/logout", post(auth::logout))
        .route("/delete", delete(auth::delete_account))
        .route("/send-code", post(auth::send_code))
        .route("/test-verify-otp", post(auth::test_verify_otp))
        .route("/forgot-password", post(auth::forgot_password))
        .route(
            "/verify-forgot-password-code",
            post(auth::verify_forgot_password_code),
        )
        .route("/reset-password", post(auth::reset_password))
        .route("/address", put(auth::update_address))
}

/// Create the category routes router.
pub fn category_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(categories::list).post(categories::create))
        .route(
            "/{id}",
            get(categories::show)
                .put(categories::update)
                .delete(categories::remove),
        )
}

/// Create the product routes router.
pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(products::list).post(products::create))
        .route(
            "/{id}",
            get(products::show)
                .put(products::update)
                .delete(products::remove),
        )
        .route(
            "/{id}/images",
            get(products::list_images).post(products::add_image),
        )
        .route("/images/{image_id}", delete(products::remove_image))
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(cart::add).get(cart::list))
        .route("/{product_id}", delete(cart::remove_one))
        .route("/all/{product_id}", delete(cart::remove_all))
}

/// Create the address routes router.
pub fn address_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(addresses::create).get(addresses::list))
        .route(
            "/{id}",
            put(addresses::update).delete(addresses::remove),
        )
        .route(
            "/delivery-price/pincode/{pincode}",
            get(addresses::delivery_price_for_pincode),
        )
        .route(
            "/delivery-price/address/{id}",
            get(addresses::delivery_price_for_address),
        )
}

/// Create the order routes router.
pub fn order_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(orders::create).get(orders::list))
        .route("/{id}/status", put(orders::update_status))
}

/// Create the payment routes router.
pub fn payment_routes() -> Router<AppState> {
    Router::new()
        .route("/order", post(payments::create_gateway_order))
        .route("/verify", post(payments::verify))
}

/// Create the location routes router.
pub fn location_routes() -> Router<AppState> {
    Router::new().route(
        "/istricity",
        get(location::tricity_status).post(location::set_tricity_status),
    )
}

/// Create the admin routes router.
pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/users", get(admin::list_users))
        .route("/orders", get(admin::list_orders))
        .route("/dashboard/stats", get(admin::dashboard_stats))
        .route("/pincode", post(admin::upsert_pincode_price))
        .route("/pincodes", get(admin::list_pincodes))
}

/// Assemble the full application router.
pub fn router(state: AppState) -> Router {
    let api = Router::new()
        .nest("/auth", auth_routes())
        .nest("/categories", category_routes())
        .nest("/products", product_routes())
        .nest("/cart", cart_routes())
        .nest("/addresses", address_routes())
        .nest("/orders", order_routes())
        .nest("/payment", payment_routes())
        .nest("/location", location_routes())
        .nest("/admin", admin_routes());

    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .nest("/api", api)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn root() -> &'static str {
    "Tricity Commerce backend is running!"
}

async fn health() -> &'static str {
    "ok"
}
