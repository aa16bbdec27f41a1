//! Backup, restore and auto-backup endpoints.

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
};
use serde::{Deserialize, Serialize};
use zivpn_core::backup::RemoteBackup;
use zivpn_core::services::{AutoBackupPolicy, BackupCreated, CleanupReport, RestoreReport};

use crate::api::{error::ApiError, response::ApiResponse, state::AppState};

#[derive(Debug, Serialize, Deserialize)]
pub struct RestoreRequest {
    #[serde(default)]
    pub backup_id: String,
}

type ApiResult<T> = Result<Json<ApiResponse<T>>, ApiError>;

pub async fn create_backup(State(state): State<AppState>) -> ApiResult<BackupCreated> {
    let created = state.backups.create().await?;
    Ok(Json(ApiResponse::ok_with_message(created, "Backup created")))
}

pub async fn list_backups(State(state): State<AppState>) -> ApiResult<Vec<RemoteBackup>> {
    let backups = state.backups.list().await?;
    Ok(Json(ApiResponse::ok(backups)))
}

pub async fn restore_backup(
    State(state): State<AppState>,
    payload: Result<Json<RestoreRequest>, JsonRejection>,
) -> ApiResult<RestoreReport> {
    let Json(req) = payload?;
    let report = state.backups.restore(&req.backup_id).await?;
    Ok(Json(ApiResponse::ok_with_message(report, "Backup restored")))
}

pub async fn cleanup_backups(State(state): State<AppState>) -> ApiResult<CleanupReport> {
    let report = state.backups.cleanup().await?;
    let message = format!("Deleted {} old backups", report.deleted);
    Ok(Json(ApiResponse::ok_with_message(report, message)))
}

pub async fn auto_backup_status(State(state): State<AppState>) -> ApiResult<AutoBackupPolicy> {
    let policy = state.auto_backup.status()?;
    Ok(Json(ApiResponse::ok(policy)))
}

pub async fn toggle_auto_backup(State(state): State<AppState>) -> ApiResult<AutoBackupPolicy> {
    let policy = state.auto_backup.toggle().await?;
    let message = if policy.enabled {
        "Auto backup enabled"
    } else {
        "Auto backup disabled"
    };
    Ok(Json(ApiResponse::ok_with_message(policy, message)))
}
