pub mod config;
pub mod error;
pub mod handlers;
pub mod services;
pub mod utils;

use crate::config::AppConfig;
use crate::services::runner::ScanRunner;
use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post},
};
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub runner: ScanRunner,
}

pub fn create_app(state: AppState) -> Router {
    let body_limit = DefaultBodyLimit::max(state.config.max_upload_size);

    Router::new()
        .route("/", get(handlers::reports::index))
        .route(
            "/upload_and_execute",
            post(handlers::upload::upload_and_execute),
        )
        .route("/:filename", get(handlers::reports::download_report))
        .layer(body_limit)
        .with_state(state)
}
