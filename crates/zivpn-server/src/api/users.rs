//! Credential endpoints.

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
};
use serde::{Deserialize, Serialize};
use zivpn_core::services::{CredentialGrant, CredentialRecord};

use crate::api::{error::ApiError, response::ApiResponse, state::AppState};

#[derive(Debug, Serialize, Deserialize)]
pub struct UserRequest {
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub days: i64,
}

type ApiResult<T> = Result<Json<ApiResponse<T>>, ApiError>;

pub async fn create_user(
    State(state): State<AppState>,
    payload: Result<Json<UserRequest>, JsonRejection>,
) -> ApiResult<CredentialGrant> {
    let Json(req) = payload?;
    let grant = state.credentials.create(&req.password, req.days).await?;
    Ok(Json(ApiResponse::ok_with_message(grant, "User created")))
}

pub async fn create_trial(State(state): State<AppState>) -> ApiResult<CredentialGrant> {
    let grant = state.credentials.create_trial().await?;
    Ok(Json(ApiResponse::ok_with_message(grant, "Trial user created")))
}

pub async fn delete_user(
    State(state): State<AppState>,
    payload: Result<Json<UserRequest>, JsonRejection>,
) -> ApiResult<()> {
    let Json(req) = payload?;
    state.credentials.delete(&req.password).await?;
    Ok(Json(ApiResponse::message("User deleted")))
}

pub async fn renew_user(
    State(state): State<AppState>,
    payload: Result<Json<UserRequest>, JsonRejection>,
) -> ApiResult<CredentialGrant> {
    let Json(req) = payload?;
    let grant = state.credentials.renew(&req.password, req.days).await?;
    Ok(Json(ApiResponse::ok_with_message(grant, "User renewed")))
}

pub async fn list_users(State(state): State<AppState>) -> ApiResult<Vec<CredentialRecord>> {
    let users = state.credentials.list()?;
    Ok(Json(ApiResponse::ok(users)))
}
