// handlers/public/auth.rs - token acquisition endpoints

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use serde::Deserialize;

use crate::app::AppState;
use crate::auth::TokenPair;
use crate::domain::{SignInInput, SignUpInput};
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::AuthSession;

#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

/// POST /auth/sign-up - register and receive a token pair (201)
pub async fn sign_up(
    State(state): State<AppState>,
    payload: Result<Json<SignUpInput>, JsonRejection>,
) -> ApiResult<AuthSession> {
    let Json(input) = payload?;
    let session = state.services.users.sign_up(&state.ctx(), input).await?;
    Ok(ApiResponse::created(session))
}

/// POST /auth/sign-in - exchange credentials for a token pair
pub async fn sign_in(
    State(state): State<AppState>,
    payload: Result<Json<SignInInput>, JsonRejection>,
) -> ApiResult<AuthSession> {
    let Json(input) = payload?;
    let session = state.services.users.sign_in(&state.ctx(), input).await?;
    Ok(ApiResponse::success(session))
}

/// POST /auth/refresh - exchange a refresh token for a new pair
pub async fn refresh(
    State(state): State<AppState>,
    payload: Result<Json<RefreshRequest>, JsonRejection>,
) -> ApiResult<TokenPair> {
    let Json(body) = payload?;
    let tokens = state
        .services
        .users
        .refresh(&state.ctx(), &body.refresh_token)
        .await?;
    Ok(ApiResponse::success(tokens))
}
