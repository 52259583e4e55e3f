//! Service-area route handlers.
//!
//! The storefront checks the caller's Tricity flag before payment and can
//! flip it after a login-time locality check.

use axum::{Json, extract::State, response::IntoResponse};
use serde::Deserialize;
use serde_json::json;

use crate::db::UserRepository;
use crate::error::{AppError, Result};
use crate::middleware::RequireUser;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetTricityRequest {
    pub is_tricity: Option<bool>,
}

/// GET /api/location/istricity
pub async fn tricity_status(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
) -> Result<impl IntoResponse> {
    let message = if user.is_tricity {
        "Service available in your area"
    } else {
        "Service not available in your area. Please contact us on WhatsApp for queries."
    };
    let whatsapp_number = if user.is_tricity {
        None
    } else {
        state.config().whatsapp_number.clone()
    };

    Ok(Json(json!({
        "success": true,
        "data": {
            "isTricity": user.is_tricity,
            "message": message,
            "whatsappNumber": whatsapp_number,
        },
    })))
}

/// POST /api/location/istricity
pub async fn set_tricity_status(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Json(body): Json<SetTricityRequest>,
) -> Result<impl IntoResponse> {
    let is_tricity = body.is_tricity.ok_or_else(|| {
        AppError::Validation("isTricity must be a boolean value (true or false)".to_owned())
    })?;

    let updated = UserRepository::new(state.pool())
        .set_tricity(user.id, is_tricity)
        .await?;

    Ok(Json(json!({ "success": true, "data": updated })))
}
