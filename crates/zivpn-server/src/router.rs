use axum::{
    Router,
    http::{HeaderName, Method, header},
    routing::{get, post},
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use zivpn_core::AppCore;

use crate::api::{backups::*, system::*, users::*};
use crate::config::ServerConfig;
use crate::middleware;

pub fn build_router(core: Arc<AppCore>, config: &ServerConfig) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, HeaderName::from_static("x-api-key")]);

    let api_key: Option<Arc<str>> = config.api_key.as_deref().map(Arc::from);

    Router::new()
        .route("/health", get(health))
        // Credentials
        .route("/api/user/create", post(create_user))
        .route("/api/user/trial", post(create_trial))
        .route("/api/user/delete", post(delete_user))
        .route("/api/user/renew", post(renew_user))
        .route("/api/users", get(list_users))
        // System
        .route("/api/info", get(system_info))
        // Backups
        .route("/api/backup", post(create_backup))
        .route("/api/backup/list", get(list_backups))
        .route("/api/restore", post(restore_backup))
        .route("/api/backup/cleanup", post(cleanup_backups))
        .route(
            "/api/backup/auto",
            get(auto_backup_status).post(toggle_auto_backup),
        )
        .layer(axum::middleware::from_fn(move |req, next| {
            let api_key = api_key.clone();
            async move { middleware::require_api_key(req, next, api_key).await }
        }))
        .layer(cors)
        .with_state(core)
}
