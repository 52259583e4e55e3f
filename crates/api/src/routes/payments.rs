//! Payment route handlers.
//!
//! Order creation is relayed to the external gateway; verification
//! recomputes the HMAC signature locally and only then records the payment
//! and marks the order paid.

use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::json;

use tricity_core::{OrderId, OrderStatus};

use crate::db::{OrderRepository, PaymentRepository};
use crate::error::{AppError, Result};
use crate::middleware::RequireUser;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateGatewayOrderRequest {
    /// Rupees.
    pub amount: Option<Decimal>,
}

#[derive(Debug, Deserialize)]
pub struct VerifyRequest {
    pub razorpay_order_id: Option<String>,
    pub razorpay_payment_id: Option<String>,
    pub razorpay_signature: Option<String>,
    #[serde(alias = "orderId")]
    pub order_id: Option<i32>,
    pub amount: Option<Decimal>,
}

/// POST /api/payment/order
pub async fn create_gateway_order(
    State(state): State<AppState>,
    RequireUser(_user): RequireUser,
    Json(body): Json<CreateGatewayOrderRequest>,
) -> Result<impl IntoResponse> {
    let amount = body
        .amount
        .ok_or_else(|| AppError::Validation("Amount is required".to_owned()))?;

    let order = state.gateway().create_order(amount).await?;

    Ok(Json(order))
}

/// POST /api/payment/verify
///
/// A bad signature is rejected without touching the database; a good one
/// records the payment and transitions the order to paid.
pub async fn verify(
    State(state): State<AppState>,
    RequireUser(_user): RequireUser,
    Json(body): Json<VerifyRequest>,
) -> Result<impl IntoResponse> {
    let missing = "Payment verification fields are required";
    let order_ref = body
        .razorpay_order_id
        .as_deref()
        .ok_or_else(|| AppError::Validation(missing.to_owned()))?;
    let payment_id = body
        .razorpay_payment_id
        .as_deref()
        .ok_or_else(|| AppError::Validation(missing.to_owned()))?;
    let signature = body
        .razorpay_signature
        .as_deref()
        .ok_or_else(|| AppError::Validation(missing.to_owned()))?;
    let order_id = body
        .order_id
        .ok_or_else(|| AppError::Validation(missing.to_owned()))?;
    let amount = body
        .amount
        .ok_or_else(|| AppError::Validation(missing.to_owned()))?;

    if !state.gateway().verify_signature(order_ref, payment_id, signature) {
        return Ok((
            StatusCode::BAD_REQUEST,
            Json(json!({ "message": "Invalid signature", "success": false })),
        ));
    }

    let order_id = OrderId::new(order_id);

    let payment = PaymentRepository::new(state.pool())
        .create(order_id, order_ref, payment_id, signature, amount, "success")
        .await?;

    OrderRepository::new(state.pool())
        .update_status(order_id, OrderStatus::Paid)
        .await?;

    Ok((
        StatusCode::OK,
        Json(json!({
            "message": "Payment verified & saved",
            "success": true,
            "payment": payment,
        })),
    ))
}
