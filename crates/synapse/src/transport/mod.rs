// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! HTTP and MQTT transport adapters over the core pipeline.

pub mod http;
pub mod mqtt;

use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;

use crate::manager::Manager;

/// Shared state for HTTP handlers.
pub struct AppState {
    pub manager: Arc<Manager>,
}

/// Build the axum `Router` with all API routes.
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/v1/services", get(http::list_services))
        .route("/api/v1/services/{id}", get(http::get_service))
        .route("/api/v1/services/{id}/actions/{action_id}", post(http::execute_action))
        .route("/api/v1/discovery", post(http::register_service))
        .layer(CorsLayer::permissive())
        .with_state(state)
}
