pub mod health;
pub mod projects;
pub mod travels;

use crate::config::Config;
use crate::db::Repository;
use axum::http::HeaderValue;
use axum::{routing::get, Router};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

#[derive(Clone)]
pub struct AppState {
    pub repo: Arc<Repository>,
    pub config: Config,
}

pub fn create_router(state: AppState) -> Router {
    let cors = match state
        .config
        .cors_address
        .as_deref()
        .and_then(|s| s.parse::<HeaderValue>().ok())
    {
        Some(origin) => CorsLayer::new()
            .allow_origin(origin)
            .allow_methods(Any)
            .allow_headers(Any),
        None => CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any),
    };

    Router::new()
        .route("/health", get(health::health))
        .nest("/projects", projects::router())
        .nest("/travels", travels::router())
        .layer(cors)
        .with_state(state)
}
