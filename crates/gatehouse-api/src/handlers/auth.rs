//! Auth handlers: registration, login, session check, and account lifecycle.

use axum::Json;
use axum::body::Bytes;
use axum::extract::{Query, State};
use axum::http::HeaderMap;

use gatehouse_core::error::AppError;
use gatehouse_entity::decision::Decision;

use crate::dto::request::{
    ChangeEmailRequest, ChangePasswordRequest, CheckRequest, CredentialsRequest,
    DestroyAccountRequest, RequestPasswordResetRequest, ResetPasswordRequest,
    VerifyEmailRequest,
};
use crate::dto::response::TokenResponse;
use crate::error::ApiResult;
use crate::extractors::{SessionUser, ValidatedJson, bearer_token, header_token};
use crate::state::AppState;

/// POST /auth/register
pub async fn register(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<CredentialsRequest>,
) -> ApiResult<Json<TokenResponse>> {
    let result = state.accounts.register(&req.email, &req.password).await?;
    Ok(Json(result.into()))
}

/// POST /auth/login
pub async fn login(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<CredentialsRequest>,
) -> ApiResult<Json<TokenResponse>> {
    let result = state.accounts.login(&req.email, &req.password).await?;
    Ok(Json(result.into()))
}

/// GET /auth/check
pub async fn check_query(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<CheckRequest>,
) -> ApiResult<Json<Decision>> {
    let token = bearer_token(&headers, query.token.as_deref());
    Ok(Json(state.authority.authorize(&token).await?))
}

/// POST /auth/check
///
/// The body is optional and only read when no `Authorization` header is
/// given; when read it must be JSON.
pub async fn check_body(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> ApiResult<Json<Decision>> {
    let token = match header_token(&headers) {
        Some(token) => token,
        None if body.iter().all(u8::is_ascii_whitespace) => String::new(),
        None => {
            let req: CheckRequest = serde_json::from_slice(&body)
                .map_err(|e| AppError::invalid_input(format!("Invalid request body: {e}")))?;
            bearer_token(&headers, req.token.as_deref())
        }
    };
    Ok(Json(state.authority.authorize(&token).await?))
}

/// POST /auth/resend-verification
pub async fn resend_verification(
    State(state): State<AppState>,
    session: SessionUser,
) -> ApiResult<Json<bool>> {
    state.accounts.resend_verification(&session).await?;
    Ok(Json(true))
}

/// POST /auth/verify-email
pub async fn verify_email(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<VerifyEmailRequest>,
) -> ApiResult<Json<bool>> {
    state.accounts.verify_email(&req.code).await?;
    Ok(Json(true))
}

/// POST /auth/request-password-reset
pub async fn request_password_reset(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<RequestPasswordResetRequest>,
) -> ApiResult<Json<bool>> {
    state.accounts.request_password_reset(&req.email).await?;
    Ok(Json(true))
}

/// POST /auth/reset-password
pub async fn reset_password(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<ResetPasswordRequest>,
) -> ApiResult<Json<bool>> {
    state
        .accounts
        .complete_password_reset(&req.email, &req.code, &req.new_password)
        .await?;
    Ok(Json(true))
}

/// POST /auth/change-password
pub async fn change_password(
    State(state): State<AppState>,
    session: SessionUser,
    ValidatedJson(req): ValidatedJson<ChangePasswordRequest>,
) -> ApiResult<Json<bool>> {
    state
        .accounts
        .change_password(&session, &req.old_password, &req.new_password)
        .await?;
    Ok(Json(true))
}

/// POST /auth/change-email
pub async fn change_email(
    State(state): State<AppState>,
    session: SessionUser,
    ValidatedJson(req): ValidatedJson<ChangeEmailRequest>,
) -> ApiResult<Json<bool>> {
    state
        .accounts
        .change_email(&session, &req.password, &req.new_email)
        .await?;
    Ok(Json(true))
}

/// POST /auth/destroy-account
pub async fn destroy_account(
    State(state): State<AppState>,
    session: SessionUser,
    ValidatedJson(req): ValidatedJson<DestroyAccountRequest>,
) -> ApiResult<Json<bool>> {
    state.accounts.destroy_account(&session, &req.password).await?;
    Ok(Json(true))
}
