// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use serde_json::json;

fn sample_payload() -> serde_json::Value {
    json!({
        "api_version": "v2",
        "auth_token": "secret",
        "id": "db-primary",
        "name": "Database (Primary)",
        "ttl": 30,
        "status": "online",
        "layout": {
            "type": "sections",
            "root": [{"type": "section", "title": "Load", "children": ["cpu"]}]
        },
        "components": {
            "cpu": {
                "id": "cpu", "type": "gauge", "label": "CPU",
                "value": 42, "unit": "%", "min": 0, "max": 100,
                "monitors": [
                    {"condition": "value > 90", "severity": "error", "message": "CPU high"}
                ]
            }
        }
    })
}

#[test]
fn payload_parses_and_flattens() -> anyhow::Result<()> {
    let payload: ServicePayload = serde_json::from_value(sample_payload())?;
    assert_eq!(payload.auth_token, "secret");

    let svc = payload.service;
    assert_eq!(svc.id, "db-primary");
    assert_eq!(svc.api_version, "v2");
    assert_eq!(svc.status, ServiceStatus::Online);
    assert_eq!(svc.ttl, 30);

    let cpu = &svc.components["cpu"];
    assert_eq!(cpu.kind, ComponentKind::Gauge);
    assert_eq!(cpu.value, json!(42));
    assert_eq!(cpu.monitors.len(), 1);
    assert_eq!(cpu.monitors[0].severity, Severity::Error);

    let layout = svc.layout.as_ref().ok_or_else(|| anyhow::anyhow!("layout missing"))?;
    assert_eq!(layout.root[0].children, vec!["cpu"]);
    Ok(())
}

#[test]
fn auth_token_is_not_reserialized() -> anyhow::Result<()> {
    let payload: ServicePayload = serde_json::from_value(sample_payload())?;
    let out = serde_json::to_value(&payload.service)?;
    assert!(out.get("auth_token").is_none());
    assert_eq!(out["api_version"], "v2");
    Ok(())
}

#[test]
fn service_round_trips_losslessly() -> anyhow::Result<()> {
    let payload: ServicePayload = serde_json::from_value(sample_payload())?;
    let svc = payload.service;
    let echoed: Service = serde_json::from_value(serde_json::to_value(&svc)?)?;
    assert_eq!(svc, echoed);
    Ok(())
}

#[test]
fn minimal_payload_defaults() -> anyhow::Result<()> {
    let payload: ServicePayload =
        serde_json::from_value(json!({"id": "api-1", "auth_token": "secret"}))?;
    let svc = payload.service;
    assert_eq!(svc.status, ServiceStatus::Online);
    assert_eq!(svc.ttl, 0);
    assert!(svc.components.is_empty());
    assert!(svc.layout.is_none());
    Ok(())
}

#[test]
fn missing_id_defaults_to_empty() -> anyhow::Result<()> {
    let payload: ServicePayload = serde_json::from_value(json!({"auth_token": "secret"}))?;
    assert!(payload.service.id.is_empty());
    Ok(())
}

#[test]
fn unknown_component_kind_is_rejected() {
    let result: Result<Component, _> =
        serde_json::from_value(json!({"id": "x", "type": "sparkline"}));
    assert!(result.is_err());
}

#[test]
fn status_parse_degrades_to_offline() {
    assert_eq!(ServiceStatus::parse("online"), ServiceStatus::Online);
    assert_eq!(ServiceStatus::parse("warning"), ServiceStatus::Warning);
    assert_eq!(ServiceStatus::parse("bogus"), ServiceStatus::Offline);
}

#[test]
fn has_action_matches_group_items_and_bare_field() -> anyhow::Result<()> {
    let svc: Service = serde_json::from_value(json!({
        "id": "svc",
        "components": {
            "ops": {
                "id": "ops", "type": "action_group",
                "items": [{"action_id": "restart", "label": "Restart"}]
            },
            "flush": {"id": "flush", "type": "stat", "action_id": "flush-cache"}
        }
    }))?;
    assert!(svc.has_action("restart"));
    assert!(svc.has_action("flush-cache"));
    assert!(!svc.has_action("scale-up"));
    Ok(())
}
