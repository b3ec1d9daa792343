// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Carry-forward of server-maintained component state across upserts.
//!
//! Axons are not expected to republish the full history of a
//! `log_stream` on every publish; the stored history is the running
//! state and the incoming value either appends to it or replaces it.
//! Every other component kind is replaced wholesale by the payload.

use serde_json::Value;

use crate::model::{Component, ComponentKind, Service};

/// History length used when a log_stream does not set `max_items`
/// (or sets it to zero or less).
const DEFAULT_LOG_CAP: i64 = 10;

/// Merge ephemeral state from the previously stored service into the
/// incoming record, in place.
pub fn carry_forward(previous: Option<&Service>, incoming: &mut Service) {
    // Map entries are materialized and reassigned by key; the merged
    // component must land back in the outgoing record.
    let ids: Vec<String> = incoming
        .components
        .iter()
        .filter(|(_, c)| c.kind == ComponentKind::LogStream)
        .map(|(id, _)| id.clone())
        .collect();

    for id in ids {
        let Some(component) = incoming.components.get(&id) else { continue };
        let mut merged = component.clone();
        merge_log_stream(previous.and_then(|p| p.components.get(&id)), &mut merged);
        incoming.components.insert(id, merged);
    }
}

fn merge_log_stream(previous: Option<&Component>, incoming: &mut Component) {
    // The stored list, if any, is the running history.
    let mut history: Vec<Value> = match previous.map(|c| &c.value) {
        Some(Value::Array(entries)) => entries.clone(),
        _ => Vec::new(),
    };

    match incoming.value.take() {
        // A list means the axon is asserting a full history.
        Value::Array(entries) => history = entries,
        // Nothing new this publish; keep what we have.
        Value::Null => {}
        // Scalars append as the newest entry.
        entry => history.push(entry),
    }

    let cap = incoming.max_items.filter(|m| *m > 0).unwrap_or(DEFAULT_LOG_CAP).max(1) as usize;
    if history.len() > cap {
        history.drain(..history.len() - cap);
    }

    incoming.value = Value::Array(history);
}

#[cfg(test)]
#[path = "merge_tests.rs"]
mod tests;
