// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Edge-triggered alert deduplication.
//!
//! One `AlertState` per (service, component, monitor) key. A
//! notification fires only on the ok → severity transition; repeats of
//! the same level are silent and resolution is log-only. The state map
//! is process-local on purpose: after a restart the first triggered
//! evaluation legitimately re-notifies.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use tokio_util::task::TaskTracker;

use crate::model::Severity;
use crate::notify::Notifier;

/// Level currently recorded for an alert key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertLevel {
    Ok,
    Warning,
    Error,
}

impl AlertLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ok => "ok",
            Self::Warning => "warning",
            Self::Error => "error",
        }
    }
}

impl From<Severity> for AlertLevel {
    fn from(severity: Severity) -> Self {
        match severity {
            Severity::Warning => Self::Warning,
            Severity::Error => Self::Error,
        }
    }
}

#[derive(Debug, Clone)]
struct AlertState {
    last_status: AlertLevel,
    last_alert_time: Option<DateTime<Utc>>,
}

/// Tracks alert state transitions and dispatches notifications.
pub struct AlertTracker {
    notifier: Arc<dyn Notifier>,
    states: Mutex<HashMap<String, AlertState>>,
    tasks: TaskTracker,
}

impl AlertTracker {
    pub fn new(notifier: Arc<dyn Notifier>) -> Self {
        Self { notifier, states: Mutex::new(HashMap::new()), tasks: TaskTracker::new() }
    }

    /// Record a monitor outcome and notify on a rising edge.
    ///
    /// The compare-and-update runs under the tracker lock; the
    /// notification is dispatched on a detached task after the lock is
    /// released so a slow transport cannot stall ingestion.
    pub fn check_and_alert(
        &self,
        key: &str,
        triggered: bool,
        severity: Severity,
        message: &str,
        service_name: &str,
    ) {
        let current = if triggered { AlertLevel::from(severity) } else { AlertLevel::Ok };

        let changed = {
            let mut states = self.states.lock();
            let state = states
                .entry(key.to_owned())
                .or_insert(AlertState { last_status: AlertLevel::Ok, last_alert_time: None });
            if state.last_status == current {
                false
            } else {
                state.last_status = current;
                state.last_alert_time = Some(Utc::now());
                true
            }
        };
        if !changed {
            return;
        }

        if triggered {
            let subject = format!("{}: {} - {}", current.as_str(), service_name, message);
            let body = format!(
                "Service: {service_name}\nAlert: {message}\nSeverity: {}\nTime: {}",
                current.as_str(),
                Utc::now().format("%a, %d %b %Y %H:%M:%S GMT"),
            );
            let notifier = Arc::clone(&self.notifier);
            let key = key.to_owned();
            tokio::spawn(self.tasks.track_future(async move {
                if let Err(e) = notifier.send(&subject, &body).await {
                    tracing::error!(key = %key, err = %e, "alert notification failed");
                }
            }));
        } else {
            tracing::info!(key = %key, service = %service_name, "alert resolved: {message}");
        }
    }

    /// Wait for in-flight notifications to finish, up to `deadline`.
    pub async fn drain(&self, deadline: Duration) {
        self.tasks.close();
        if tokio::time::timeout(deadline, self.tasks.wait()).await.is_err() {
            tracing::warn!("notification drain timed out");
        }
    }
}

#[cfg(test)]
#[path = "alert_tests.rs"]
mod tests;
