//! Address route handlers.
//!
//! All routes require a user; ownership is checked per handler. City
//! validation only applies on update, where the allow-list is matched
//! case-insensitively - creation accepts any city, as the storefront always
//! has. Pincode resolution goes through the race-safe get-or-create.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;
use serde_json::json;

use tricity_core::AddressId;

use crate::db::addresses::{AddressChanges, NewAddress};
use crate::db::{AddressRepository, PincodeRepository};
use crate::error::{AppError, Result};
use crate::middleware::RequireUser;
use crate::models::address::AddressView;
use crate::services::delivery::DeliveryService;
use crate::state::AppState;

/// Allow-list for address updates, matched case-insensitively.
const UPDATE_CITIES: [&str; 3] = ["panchkula", "mohali", "chandigarh"];

#[derive(Debug, Deserialize)]
pub struct AddressBody {
    pub label: Option<String>,
    pub house: Option<String>,
    pub street: Option<String>,
    pub landmark: Option<String>,
    pub address1: Option<String>,
    pub city: Option<String>,
    pub pincode: Option<i32>,
}

/// POST /api/addresses
pub async fn create(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Json(body): Json<AddressBody>,
) -> Result<impl IntoResponse> {
    let missing = "House, street, city, label, and pincode are required";
    let required = |value: &Option<String>| -> Result<String> {
        value
            .clone()
            .filter(|v| !v.is_empty())
            .ok_or_else(|| AppError::Validation(missing.to_owned()))
    };

    let house = required(&body.house)?;
    let street = required(&body.street)?;
    let city = required(&body.city)?;
    let label = required(&body.label)?;
    let pincode_value = body
        .pincode
        .ok_or_else(|| AppError::Validation(missing.to_owned()))?;

    let pincode = DeliveryService::new(state.pool())
        .resolve_pincode(pincode_value)
        .await?;

    let address = AddressRepository::new(state.pool())
        .create(&NewAddress {
            user_id: user.id,
            label: &label,
            house: &house,
            street: &street,
            landmark: body.landmark.as_deref(),
            address1: body.address1.as_deref(),
            city: &city,
            pincode_id: pincode.id,
        })
        .await?;

    let delivery_price = pincode.delivery_price;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Address added",
            "address": AddressView::new(address, &pincode),
            "deliveryPrice": delivery_price,
        })),
    ))
}

/// GET /api/addresses
pub async fn list(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
) -> Result<impl IntoResponse> {
    let addresses = AddressRepository::new(state.pool())
        .list_for_user(user.id)
        .await?;

    let pincodes = PincodeRepository::new(state.pool());
    let mut views = Vec::with_capacity(addresses.len());
    for address in addresses {
        let pincode = pincodes.get_by_id(address.pincode_id).await?.ok_or_else(|| {
            AppError::Internal(format!("address {} references missing pincode", address.id))
        })?;
        views.push(AddressView::new(address, &pincode));
    }

    Ok(Json(json!({ "addresses": views })))
}

/// PUT /api/addresses/{id}
pub async fn update(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Path(id): Path<i32>,
    Json(body): Json<AddressBody>,
) -> Result<impl IntoResponse> {
    let id = AddressId::new(id);
    let repo = AddressRepository::new(state.pool());

    let existing = repo
        .get(id)
        .await?
        .filter(|a| a.user_id == user.id)
        .ok_or_else(|| AppError::NotFound("Address not found".to_owned()))?;

    // City allow-list applies on update only.
    let city = match &body.city {
        Some(city) if !city.is_empty() => {
            let normalized = city.to_lowercase();
            if !UPDATE_CITIES.contains(&normalized.as_str()) {
                return Err(AppError::Validation(
                    "City must be one of: panchkula, mohali, chandigarh".to_owned(),
                ));
            }
            Some(normalized)
        }
        _ => None,
    };

    let pincode = match body.pincode {
        Some(code) => DeliveryService::new(state.pool()).resolve_pincode(code).await?,
        None => PincodeRepository::new(state.pool())
            .get_by_id(existing.pincode_id)
            .await?
            .ok_or_else(|| {
                AppError::Internal(format!("address {id} references missing pincode"))
            })?,
    };

    let updated = repo
        .update(
            id,
            &AddressChanges {
                label: body.label.as_deref(),
                house: body.house.as_deref(),
                street: body.street.as_deref(),
                landmark: body.landmark.as_deref(),
                address1: body.address1.as_deref(),
                city: city.as_deref(),
                pincode_id: Some(pincode.id),
            },
        )
        .await?;

    let delivery_price = pincode.delivery_price;

    Ok(Json(json!({
        "message": "Address updated",
        "address": AddressView::new(updated, &pincode),
        "deliveryPrice": delivery_price,
    })))
}

/// DELETE /api/addresses/{id}
///
/// Refused while any order references the address; both rows stay intact.
pub async fn remove(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse> {
    let id = AddressId::new(id);
    let repo = AddressRepository::new(state.pool());

    repo.get(id)
        .await?
        .filter(|a| a.user_id == user.id)
        .ok_or_else(|| AppError::NotFound("Address not found".to_owned()))?;

    if repo.is_referenced_by_order(id).await? {
        return Err(AppError::Conflict(
            "Cannot delete address used in an order".to_owned(),
        ));
    }

    repo.delete(id).await?;

    Ok(Json(json!({ "message": "Address deleted" })))
}

/// GET /api/addresses/delivery-price/pincode/{pincode}
///
/// Read-only quote; unseen pincodes answer with the default price without
/// creating a row.
pub async fn delivery_price_for_pincode(
    State(state): State<AppState>,
    RequireUser(_user): RequireUser,
    Path(pincode): Path<i32>,
) -> Result<impl IntoResponse> {
    let quote = DeliveryService::new(state.pool())
        .quote_for_pincode(pincode)
        .await?;

    Ok(Json(json!({
        "pincode": pincode,
        "deliveryPrice": quote.delivery_price,
        "found": quote.found,
    })))
}

/// GET /api/addresses/delivery-price/address/{id}
pub async fn delivery_price_for_address(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse> {
    let (address, pincode) = DeliveryService::new(state.pool())
        .quote_for_address(user.id, AddressId::new(id))
        .await?;

    Ok(Json(json!({
        "addressId": address.id,
        "pincode": pincode.code,
        "deliveryPrice": pincode.delivery_price,
    })))
}
