//! ZiVPN admin HTTP API
//!
//! Thin axum glue over [`zivpn_core::AppCore`]: every route maps one core
//! operation onto the JSON envelope in [`api::ApiResponse`].

pub mod api;
pub mod config;
pub mod middleware;
pub mod router;

pub use config::ServerConfig;
pub use router::build_router;
