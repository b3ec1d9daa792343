// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Data model for registered services, their UI components, and the
//! discovery payload axons publish.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Runtime status of a registered service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ServiceStatus {
    Online,
    Warning,
    Error,
    Offline,
}

impl ServiceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Online => "online",
            Self::Warning => "warning",
            Self::Error => "error",
            Self::Offline => "offline",
        }
    }

    /// Parse a stored status column; unknown text degrades to offline.
    pub fn parse(s: &str) -> Self {
        match s {
            "online" => Self::Online,
            "warning" => Self::Warning,
            "error" => Self::Error,
            _ => Self::Offline,
        }
    }
}

impl Default for ServiceStatus {
    /// A payload without a status is treated as online: the axon has
    /// just proven liveness by publishing at all.
    fn default() -> Self {
        Self::Online
    }
}

/// Severity attached to a monitor rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Warning,
    Error,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Warning => "warning",
            Self::Error => "error",
        }
    }
}

/// Discriminant of the component tagged union.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComponentKind {
    Stat,
    StatusIndicator,
    Gauge,
    LogStream,
    ActionGroup,
    Link,
}

/// Server-side alert rule attached to a component.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Monitor {
    /// Boolean expression over the bound identifier `value`.
    pub condition: String,
    pub severity: Severity,
    #[serde(default)]
    pub message: String,
}

/// One entry of an `action_group` component.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionItem {
    pub action_id: String,
    #[serde(default)]
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<String>,
    #[serde(default)]
    pub require_confirmation: bool,
}

/// A UI widget definition that doubles as a carrier of live state.
///
/// The shape is a tagged union discriminated by `type`; fields that
/// only apply to some kinds are optional and omitted when absent so a
/// GET/POST round trip is lossless.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Component {
    #[serde(default)]
    pub id: String,
    #[serde(rename = "type")]
    pub kind: ComponentKind,
    #[serde(default)]
    pub label: String,
    /// Dynamically typed: scalar, list, or object.
    #[serde(default, skip_serializing_if = "serde_json::Value::is_null")]
    pub value: serde_json::Value,
    #[serde(default)]
    pub unit: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub monitors: Vec<Monitor>,

    // gauge
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thresholds: Option<serde_json::Value>,

    // status_indicator
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mapping: Option<serde_json::Value>,

    // log_stream
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_items: Option<i64>,

    // action_group
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub items: Vec<ActionItem>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action_id: Option<String>,

    // link
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uri: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

/// Ordered presentation layout for a service card.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Layout {
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub root: Vec<LayoutSection>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutSection {
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub title: String,
    /// Component ids in display order.
    #[serde(default)]
    pub children: Vec<String>,
}

/// The authoritative representation of a registered axon.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Service {
    // Identity
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub group: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub icon: String,
    #[serde(default)]
    pub url: String,

    // Runtime state
    #[serde(default)]
    pub status: ServiceStatus,
    #[serde(default)]
    pub message: String,
    /// Seconds of grace after `last_seen` before forced offline.
    #[serde(default)]
    pub ttl: i64,

    // Presentation
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub markdown_docs: String,
    #[serde(default)]
    pub api_version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub layout: Option<Layout>,
    #[serde(default)]
    pub components: HashMap<String, Component>,

    // Metadata (server-assigned; payload values are overwritten)
    #[serde(default = "unix_epoch")]
    pub last_seen: DateTime<Utc>,
    #[serde(default = "unix_epoch")]
    pub created_at: DateTime<Utc>,
    #[serde(default = "unix_epoch")]
    pub updated_at: DateTime<Utc>,
}

impl Service {
    /// Whether any component exposes the given action id, either in an
    /// `action_group` item list or as a bare `action_id` field.
    pub fn has_action(&self, action_id: &str) -> bool {
        self.components.values().any(|c| {
            c.action_id.as_deref() == Some(action_id)
                || (c.kind == ComponentKind::ActionGroup
                    && c.items.iter().any(|item| item.action_id == action_id))
        })
    }
}

/// On-wire ingress shape: a Service plus the shared secret.
///
/// `auth_token` is consumed here and never reaches the persisted
/// record; `api_version` and everything else flatten into the Service.
#[derive(Debug, Clone, Deserialize)]
pub struct ServicePayload {
    #[serde(default)]
    pub auth_token: String,
    #[serde(flatten)]
    pub service: Service,
}

fn unix_epoch() -> DateTime<Utc> {
    DateTime::<Utc>::UNIX_EPOCH
}

#[cfg(test)]
#[path = "model_tests.rs"]
mod tests;
