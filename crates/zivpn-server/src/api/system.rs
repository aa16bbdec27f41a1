use axum::{Json, extract::State};
use serde::Serialize;
use zivpn_core::services::SystemInfo;

use crate::api::{error::ApiError, response::ApiResponse, state::AppState};

#[derive(Serialize)]
pub struct Health {
    status: &'static str,
}

pub async fn health() -> Json<Health> {
    Json(Health { status: "ok" })
}

pub async fn system_info(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<SystemInfo>>, ApiError> {
    let info = state.system_info()?;
    Ok(Json(ApiResponse::ok(info)))
}
