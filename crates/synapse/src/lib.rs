// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Synapse: self-hosted service dashboard and lightweight monitoring hub.
//!
//! Remote axons publish declarative self-descriptions over MQTT or
//! HTTP. Synapse validates and persists them, carries bounded log
//! histories forward across updates, evaluates monitor conditions on
//! every upsert, emails on alert edges, expires stale services by TTL,
//! and relays UI-initiated actions back to axons as MQTT commands.

pub mod alert;
pub mod config;
pub mod error;
pub mod evaluator;
pub mod manager;
pub mod merge;
pub mod model;
pub mod notify;
pub mod store;
pub mod sweeper;
pub mod transport;

use std::sync::Arc;
use std::time::Duration;

use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;

use crate::alert::AlertTracker;
use crate::config::SynapseConfig;
use crate::manager::{CommandPublisher, Manager};
use crate::notify::{NoopNotifier, Notifier, SmtpNotifier};
use crate::store::Store;
use crate::transport::AppState;

/// How long shutdown waits for in-flight alert notifications.
const NOTIFY_DRAIN: Duration = Duration::from_secs(5);

/// Run the hub until shutdown.
pub async fn run(config: SynapseConfig) -> anyhow::Result<()> {
    let shutdown = CancellationToken::new();
    spawn_signal_handler(shutdown.clone());

    let store = Store::connect(&config.db_path).await?;
    store.init_schema().await?;
    tracing::info!(path = %config.db_path.display(), "database ready");

    let notifier: Arc<dyn Notifier> = if config.smtp_ready() {
        Arc::new(SmtpNotifier::new(&config)?)
    } else {
        tracing::info!("email alerting disabled");
        Arc::new(NoopNotifier)
    };
    let tracker = Arc::new(AlertTracker::new(notifier));

    let (client, eventloop) = transport::mqtt::connect(&config);
    let publisher: Arc<dyn CommandPublisher> =
        Arc::new(transport::mqtt::MqttPublisher::new(client.clone()));
    let manager = Arc::new(Manager::new(
        store.clone(),
        config.auth_token.clone(),
        Arc::clone(&tracker),
        Some(publisher),
    ));

    transport::mqtt::spawn_ingress(Arc::clone(&manager), client, eventloop, shutdown.clone());
    sweeper::spawn_ttl_sweeper(store.clone(), config.sweep_interval(), shutdown.clone());

    let addr = config.http_addr();
    let listener = TcpListener::bind(&addr).await?;
    tracing::info!("synapse listening on {addr}");
    let router = transport::build_router(Arc::new(AppState { manager }));
    axum::serve(listener, router).with_graceful_shutdown(shutdown.cancelled_owned()).await?;

    // Drain in-flight notifications with a bounded deadline, then
    // close the store.
    tracker.drain(NOTIFY_DRAIN).await;
    store.close().await;
    Ok(())
}

fn spawn_signal_handler(shutdown: CancellationToken) {
    tokio::spawn(async move {
        let ctrl_c = tokio::signal::ctrl_c();

        #[cfg(unix)]
        {
            let mut term = match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
                Ok(signal) => signal,
                Err(e) => {
                    tracing::error!(err = %e, "failed to install SIGTERM handler");
                    return;
                }
            };
            tokio::select! {
                _ = ctrl_c => {}
                _ = term.recv() => {}
            }
        }
        #[cfg(not(unix))]
        {
            let _ = ctrl_c.await;
        }

        tracing::info!("shutdown signal received");
        shutdown.cancel();
    });
}
