// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Orchestration of the ingestion pipeline and outbound commands.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;

use crate::alert::AlertTracker;
use crate::error::SynapseError;
use crate::evaluator;
use crate::merge;
use crate::model::{Service, ServicePayload};
use crate::store::Store;

/// Wildcard subscription covering all discovery topics.
pub const DISCOVERY_TOPIC_FILTER: &str = "synapse/v1/discovery/#";
/// Prefix of per-axon discovery topics.
pub const DISCOVERY_TOPIC_PREFIX: &str = "synapse/v1/discovery/";
/// Prefix of per-axon command topics.
pub const COMMAND_TOPIC_PREFIX: &str = "synapse/v1/command/";

/// TTL applied when a payload omits it or sets it to zero or less.
const DEFAULT_TTL_SECONDS: i64 = 60;

/// Outbound command published to an axon.
#[derive(Debug, Serialize)]
pub struct Command {
    pub action_id: String,
    pub issued_by: &'static str,
    /// RFC3339 issue time.
    pub timestamp: String,
}

/// Seam for publishing commands back to axons.
#[async_trait::async_trait]
pub trait CommandPublisher: Send + Sync {
    async fn publish(&self, topic: &str, payload: Vec<u8>) -> anyhow::Result<()>;
}

/// Constant-time string comparison to prevent timing side-channel attacks.
fn constant_time_eq(a: &str, b: &str) -> bool {
    let a = a.as_bytes();
    let b = b.as_bytes();
    if a.len() != b.len() {
        return false;
    }
    let mut acc = 0u8;
    for (x, y) in a.iter().zip(b.iter()) {
        acc |= x ^ y;
    }
    acc == 0
}

pub struct Manager {
    store: Store,
    auth_token: String,
    tracker: Arc<AlertTracker>,
    publisher: Option<Arc<dyn CommandPublisher>>,
    /// Per-service write locks serializing the read-merge-write window
    /// so concurrent upserts for one id cannot drop log entries.
    id_locks: parking_lot::Mutex<HashMap<String, Arc<tokio::sync::Mutex<()>>>>,
}

impl Manager {
    pub fn new(
        store: Store,
        auth_token: String,
        tracker: Arc<AlertTracker>,
        publisher: Option<Arc<dyn CommandPublisher>>,
    ) -> Self {
        Self {
            store,
            auth_token,
            tracker,
            publisher,
            id_locks: parking_lot::Mutex::new(HashMap::new()),
        }
    }

    /// Validate, merge, persist, and evaluate one discovery payload.
    ///
    /// Returns the service id on success. Persistence precedes
    /// evaluation: an alert always corresponds to a committed state.
    pub async fn upsert(&self, raw: &[u8]) -> Result<String, SynapseError> {
        let payload: ServicePayload = serde_json::from_slice(raw)
            .map_err(|e| SynapseError::InvalidPayload(format!("invalid json: {e}")))?;

        let mut svc = payload.service;
        if svc.id.is_empty() {
            return Err(SynapseError::InvalidPayload("service id is required".to_owned()));
        }
        if !constant_time_eq(&payload.auth_token, &self.auth_token) {
            tracing::warn!(service = %svc.id, "discovery payload rejected: bad auth token");
            return Err(SynapseError::Unauthorized);
        }
        if svc.ttl <= 0 {
            svc.ttl = DEFAULT_TTL_SECONDS;
        }

        let lock = self.id_lock(&svc.id);
        let _guard = lock.lock().await;

        let existing = self
            .store
            .get(&svc.id)
            .await
            .map_err(|e| SynapseError::Store(e.to_string()))?;

        // Timestamps are server-assigned, inside the per-id window so
        // last_seen is monotonic per service.
        let now = Utc::now();
        svc.last_seen = now;
        svc.updated_at = now;
        svc.created_at = existing.as_ref().map(|prev| prev.created_at).unwrap_or(now);

        merge::carry_forward(existing.as_ref(), &mut svc);

        self.store.upsert(&svc).await.map_err(|e| {
            tracing::error!(service = %svc.id, err = %e, "failed to persist service");
            SynapseError::Store(e.to_string())
        })?;

        self.evaluate_monitors(&svc);

        tracing::info!(service = %svc.id, name = %svc.name, "service registered");
        Ok(svc.id)
    }

    /// Run every monitor of every component against its post-merge
    /// value. Evaluation errors skip that monitor only.
    fn evaluate_monitors(&self, svc: &Service) {
        for (comp_id, component) in &svc.components {
            for (index, monitor) in component.monitors.iter().enumerate() {
                match evaluator::evaluate(&monitor.condition, &component.value) {
                    Ok(triggered) => {
                        let key = format!("{}:{}:m{}", svc.id, comp_id, index);
                        self.tracker.check_and_alert(
                            &key,
                            triggered,
                            monitor.severity,
                            &monitor.message,
                            &svc.name,
                        );
                    }
                    Err(e) => {
                        tracing::warn!(
                            service = %svc.id,
                            component = %comp_id,
                            condition = %monitor.condition,
                            err = %e,
                            "monitor evaluation failed"
                        );
                    }
                }
            }
        }
    }

    /// Dispatch a UI-initiated action back to the owning axon.
    pub async fn execute_action(
        &self,
        service_id: &str,
        action_id: &str,
    ) -> Result<(), SynapseError> {
        let svc = self
            .store
            .get(service_id)
            .await
            .map_err(|e| SynapseError::Store(e.to_string()))?
            .ok_or(SynapseError::NotFound)?;

        if !svc.has_action(action_id) {
            return Err(SynapseError::UnknownAction(format!(
                "service '{service_id}' has no action '{action_id}'"
            )));
        }

        let publisher = self.publisher.as_ref().ok_or(SynapseError::Unavailable)?;
        let command = Command {
            action_id: action_id.to_owned(),
            issued_by: "synapse-ui",
            timestamp: Utc::now().to_rfc3339(),
        };
        let payload =
            serde_json::to_vec(&command).map_err(|e| SynapseError::Internal(e.to_string()))?;
        let topic = format!("{COMMAND_TOPIC_PREFIX}{service_id}");

        publisher.publish(&topic, payload).await.map_err(|e| {
            tracing::error!(service = %service_id, action = %action_id, err = %e, "command publish failed");
            SynapseError::Unavailable
        })?;

        tracing::info!(service = %service_id, action = %action_id, "command dispatched");
        Ok(())
    }

    pub async fn get(&self, id: &str) -> Result<Service, SynapseError> {
        self.store
            .get(id)
            .await
            .map_err(|e| SynapseError::Store(e.to_string()))?
            .ok_or(SynapseError::NotFound)
    }

    pub async fn list(&self) -> Result<Vec<Service>, SynapseError> {
        self.store.list().await.map_err(|e| SynapseError::Store(e.to_string()))
    }

    fn id_lock(&self, id: &str) -> Arc<tokio::sync::Mutex<()>> {
        let mut locks = self.id_locks.lock();
        Arc::clone(locks.entry(id.to_owned()).or_default())
    }
}

#[cfg(test)]
#[path = "manager_tests.rs"]
mod tests;
