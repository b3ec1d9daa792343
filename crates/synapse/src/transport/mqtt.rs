// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! MQTT ingress (discovery) and egress (commands).
//!
//! Connects to the external broker and re-subscribes to the discovery
//! wildcard on every ConnAck so the subscription survives reconnects.
//! Each discovery publish is handed to `Manager::upsert` as raw bytes;
//! every message is treated independently.

use std::sync::Arc;
use std::time::Duration;

use rumqttc::{AsyncClient, Event, EventLoop, MqttOptions, Packet, QoS};
use tokio_util::sync::CancellationToken;

use crate::config::SynapseConfig;
use crate::error::SynapseError;
use crate::manager::{CommandPublisher, Manager, DISCOVERY_TOPIC_FILTER, DISCOVERY_TOPIC_PREFIX};

/// Delay before polling again after a broker connection error.
const RECONNECT_DELAY: Duration = Duration::from_secs(1);

/// Create the MQTT client for the configured broker. The connection
/// is not dialed until the event loop is polled.
pub fn connect(config: &SynapseConfig) -> (AsyncClient, EventLoop) {
    let mut options = MqttOptions::new("synapse-hub", config.mqtt_host.clone(), config.mqtt_port);
    options.set_keep_alive(Duration::from_secs(30));
    AsyncClient::new(options, 64)
}

/// Outbound command publisher backed by the shared MQTT client.
pub struct MqttPublisher {
    client: AsyncClient,
}

impl MqttPublisher {
    pub fn new(client: AsyncClient) -> Self {
        Self { client }
    }
}

#[async_trait::async_trait]
impl CommandPublisher for MqttPublisher {
    async fn publish(&self, topic: &str, payload: Vec<u8>) -> anyhow::Result<()> {
        // Fire-and-forget: idempotence is the axon's responsibility.
        self.client.publish(topic, QoS::AtMostOnce, false, payload).await?;
        Ok(())
    }
}

/// Spawn the ingress event loop as a background task.
pub fn spawn_ingress(
    manager: Arc<Manager>,
    client: AsyncClient,
    mut eventloop: EventLoop,
    shutdown: CancellationToken,
) {
    tokio::spawn(async move {
        loop {
            tokio::select! {
                _ = shutdown.cancelled() => {
                    let _ = client.disconnect().await;
                    break;
                }
                event = eventloop.poll() => match event {
                    Ok(Event::Incoming(Packet::ConnAck(_))) => {
                        tracing::info!("connected to mqtt broker");
                        if let Err(e) = client.subscribe(DISCOVERY_TOPIC_FILTER, QoS::AtMostOnce).await {
                            tracing::error!(err = %e, "discovery subscription failed");
                        }
                    }
                    Ok(Event::Incoming(Packet::Publish(publish))) => {
                        handle_publish(&manager, &publish.topic, &publish.payload).await;
                    }
                    Ok(_) => {}
                    Err(e) => {
                        tracing::warn!(err = %e, "mqtt connection error, retrying");
                        tokio::time::sleep(RECONNECT_DELAY).await;
                    }
                }
            }
        }
    });
}

async fn handle_publish(manager: &Manager, topic: &str, payload: &[u8]) {
    if !topic.starts_with(DISCOVERY_TOPIC_PREFIX) {
        tracing::trace!(topic, "ignoring message on unexpected topic");
        return;
    }

    match manager.upsert(payload).await {
        Ok(_) => {}
        Err(SynapseError::InvalidPayload(msg)) => {
            tracing::debug!(topic, msg, "discovery payload dropped");
        }
        // Bad tokens are already logged at warn by the manager.
        Err(SynapseError::Unauthorized) => {}
        Err(e) => {
            tracing::warn!(topic, err = %e, "discovery ingest failed");
        }
    }
}
