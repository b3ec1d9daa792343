// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! HTTP handlers — thin adapters from routes to the manager.

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::Json;
use serde::Serialize;

use crate::transport::AppState;

#[derive(Debug, Serialize)]
pub struct DiscoveryResponse {
    pub id: String,
    pub registered: bool,
}

#[derive(Debug, Serialize)]
pub struct ActionResponse {
    pub action_id: String,
    pub dispatched: bool,
}

/// `GET /api/v1/services`
pub async fn list_services(State(s): State<Arc<AppState>>) -> impl IntoResponse {
    match s.manager.list().await {
        Ok(services) => Json(services).into_response(),
        Err(e) => e.to_http_response().into_response(),
    }
}

/// `GET /api/v1/services/{id}`
pub async fn get_service(
    State(s): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    match s.manager.get(&id).await {
        Ok(svc) => Json(svc).into_response(),
        Err(e) => e.to_http_response().into_response(),
    }
}

/// `POST /api/v1/services/{id}/actions/{action_id}`
pub async fn execute_action(
    State(s): State<Arc<AppState>>,
    Path((id, action_id)): Path<(String, String)>,
) -> impl IntoResponse {
    match s.manager.execute_action(&id, &action_id).await {
        Ok(()) => Json(ActionResponse { action_id, dispatched: true }).into_response(),
        Err(e) => e.to_http_response().into_response(),
    }
}

/// `POST /api/v1/discovery` — the same payload axons publish over MQTT.
pub async fn register_service(State(s): State<Arc<AppState>>, body: Bytes) -> impl IntoResponse {
    match s.manager.upsert(&body).await {
        Ok(id) => Json(DiscoveryResponse { id, registered: true }).into_response(),
        Err(e) => e.to_http_response().into_response(),
    }
}
