//! Authentication route handlers.
//!
//! Registration, login, the OTP verification flow, and password reset.
//! Token issuance is a signed JWT; logout is client-side disposal.

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use serde::Deserialize;
use serde_json::json;

use tricity_core::Email;

use crate::error::{AppError, Result};
use crate::middleware::RequireUser;
use crate::services::auth::{AuthService, RegisterInput, TRICITY_CITIES};
use crate::services::codes::VerifyOutcome;
use crate::state::AppState;

// =============================================================================
// Request Types
// =============================================================================

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub city: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SendCodeRequest {
    pub email: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct VerifyCodeRequest {
    pub email: Option<String>,
    pub code: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResetPasswordRequest {
    pub email: Option<String>,
    pub new_password: Option<String>,
    pub reset_token: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateAddressRequest {
    pub address: Option<String>,
    pub city: Option<String>,
    pub phone: Option<String>,
}

fn field<'a>(value: &'a Option<String>, message: &str) -> Result<&'a str> {
    value
        .as_deref()
        .filter(|v| !v.is_empty())
        .ok_or_else(|| AppError::Validation(message.to_owned()))
}

fn parse_email(value: &str) -> Result<Email> {
    Email::parse(value).map_err(|e| AppError::Validation(e.to_string()))
}

// =============================================================================
// Account Handlers
// =============================================================================

/// POST /api/auth/register
pub async fn register(
    State(state): State<AppState>,
    Json(body): Json<RegisterRequest>,
) -> Result<impl IntoResponse> {
    let missing = "All fields are required";
    let input = RegisterInput {
        name: field(&body.name, missing)?,
        phone: field(&body.phone, missing)?,
        email: field(&body.email, missing)?,
        password: field(&body.password, missing)?,
        city: field(&body.city, missing)?,
    };

    let auth = AuthService::new(state.pool(), state.tokens());
    let (user, token) = auth.register(&input).await?;

    tracing::info!(email = %user.email, "User registered successfully");

    Ok((
        StatusCode::CREATED,
        Json(json!({ "user": user, "token": token })),
    ))
}

/// POST /api/auth/login
pub async fn login(
    State(state): State<AppState>,
    Json(body): Json<LoginRequest>,
) -> Result<impl IntoResponse> {
    let missing = "Email and password required";
    let email = field(&body.email, missing)?;
    let password = field(&body.password, missing)?;

    let auth = AuthService::new(state.pool(), state.tokens());
    let (user, token) = auth.login(email, password).await?;

    Ok(Json(json!({ "user": user, "token": token })))
}

/// GET /api/auth/me
pub async fn me(RequireUser(user): RequireUser) -> Result<impl IntoResponse> {
    Ok(Json(user))
}

/// POST /api/auth/logout
pub async fn logout(RequireUser(_user): RequireUser) -> Result<impl IntoResponse> {
    Ok(Json(
        json!({ "message": "Logout success (client deletes token)" }),
    ))
}

/// DELETE /api/auth/delete
pub async fn delete_account(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
) -> Result<impl IntoResponse> {
    crate::db::UserRepository::new(state.pool())
        .delete(user.id)
        .await?;

    Ok(Json(json!({ "message": "User deleted successfully" })))
}

// =============================================================================
// Verification Flow Handlers
// =============================================================================

/// POST /api/auth/send-code
pub async fn send_code(
    State(state): State<AppState>,
    Json(body): Json<SendCodeRequest>,
) -> Result<impl IntoResponse> {
    let email = parse_email(field(&body.email, "Email is required")?)?;

    let code = state.codes().issue_otp(&email).await;
    tracing::info!(email = %email, "Issued verification code");

    state
        .mailer()
        .send_verification_code(&email, &code)
        .await
        .map_err(|e| AppError::Internal(format!("failed to send verification code: {e}")))?;

    Ok(Json(
        json!({ "message": "Verification code sent to your email" }),
    ))
}

/// POST /api/auth/test-verify-otp
///
/// Verifies and consumes an OTP without issuing a reset token; used by the
/// registration flow.
pub async fn test_verify_otp(
    State(state): State<AppState>,
    Json(body): Json<VerifyCodeRequest>,
) -> Result<impl IntoResponse> {
    let missing = "Email and code are required";
    let email = parse_email(field(&body.email, missing)?)?;
    let code = field(&body.code, missing)?;

    match state.codes().verify_otp(&email, code).await {
        VerifyOutcome::Missing => Err(AppError::Validation(
            "No verification code found. Please request a new one.".to_owned(),
        )),
        VerifyOutcome::Mismatch => {
            Err(AppError::Validation("Invalid verification code".to_owned()))
        }
        VerifyOutcome::Verified => Ok(Json(
            json!({ "message": "OTP verified successfully!", "email": email }),
        )),
    }
}

/// POST /api/auth/forgot-password
pub async fn forgot_password(
    State(state): State<AppState>,
    Json(body): Json<SendCodeRequest>,
) -> Result<impl IntoResponse> {
    let email = parse_email(field(&body.email, "Email is required")?)?;

    let user = crate::db::UserRepository::new(state.pool())
        .get_by_email(&email)
        .await?;
    if user.is_none() {
        return Err(AppError::NotFound("User not found".to_owned()));
    }

    let code = state.codes().issue_otp(&email).await;
    tracing::info!(email = %email, "Issued password reset code");

    state
        .mailer()
        .send_password_reset_code(&email, &code)
        .await
        .map_err(|e| AppError::Internal(format!("failed to send reset code: {e}")))?;

    Ok(Json(
        json!({ "message": "Password reset code sent to your email" }),
    ))
}

/// POST /api/auth/verify-forgot-password-code
///
/// A matching OTP is consumed and traded for a single-use reset token.
pub async fn verify_forgot_password_code(
    State(state): State<AppState>,
    Json(body): Json<VerifyCodeRequest>,
) -> Result<impl IntoResponse> {
    let missing = "Email and code are required";
    let email = parse_email(field(&body.email, missing)?)?;
    let code = field(&body.code, missing)?;

    match state.codes().verify_otp(&email, code).await {
        VerifyOutcome::Missing => Err(AppError::NotFound("Code not found or expired".to_owned())),
        VerifyOutcome::Mismatch => Err(AppError::Validation("Invalid code".to_owned())),
        VerifyOutcome::Verified => {
            let reset_token = state.codes().issue_reset_token(&email).await;
            tracing::info!(email = %email, "Issued password reset token");

            Ok(Json(json!({
                "message": "Code verified successfully",
                "resetToken": reset_token,
                "email": email,
            })))
        }
    }
}

/// POST /api/auth/reset-password
pub async fn reset_password(
    State(state): State<AppState>,
    Json(body): Json<ResetPasswordRequest>,
) -> Result<impl IntoResponse> {
    let missing = "Email, new password, and reset token are required";
    let email = parse_email(field(&body.email, missing)?)?;
    let new_password = field(&body.new_password, missing)?;
    let reset_token = field(&body.reset_token, missing)?;

    match state.codes().verify_reset_token(&email, reset_token).await {
        VerifyOutcome::Missing => Err(AppError::Unauthorized(
            "Reset token not found or expired. Please verify your OTP again.".to_owned(),
        )),
        VerifyOutcome::Mismatch => Err(AppError::Unauthorized(
            "Invalid reset token. Please verify your OTP again.".to_owned(),
        )),
        VerifyOutcome::Verified => {
            let auth = AuthService::new(state.pool(), state.tokens());
            auth.reset_password(&email, new_password).await?;

            tracing::info!(email = %email, "Password reset successfully");

            Ok(Json(json!({
                "message": "Password reset successfully. You can now login with your new password.",
            })))
        }
    }
}

// =============================================================================
// Profile Handlers
// =============================================================================

/// PUT /api/auth/address
///
/// Legacy free-form profile address. Unlike address-book updates, the city
/// here must be one of the Tricity names exactly.
pub async fn update_address(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Json(body): Json<UpdateAddressRequest>,
) -> Result<impl IntoResponse> {
    let missing = "Address, city, and phone are required";
    let address = field(&body.address, missing)?;
    let city = field(&body.city, missing)?;
    let phone = field(&body.phone, missing)?;

    if !TRICITY_CITIES.contains(&city) {
        return Err(AppError::Validation("Only Tricity users allowed".to_owned()));
    }

    let updated = crate::db::UserRepository::new(state.pool())
        .update_profile_address(user.id, address, city, phone)
        .await?;

    tracing::info!(email = %updated.email, "User address updated successfully");

    Ok(Json(json!({
        "message": "Address updated successfully",
        "user": updated,
    })))
}
