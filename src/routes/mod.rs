pub mod home;
pub mod webhook_handler;

use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;

use crate::app_state::AppState;

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/webhook", post(webhook_handler::webhook_handler))
        .route("/healthz", get(home::healthz))
        .route("/", get(home::home))
        .with_state(state)
}
