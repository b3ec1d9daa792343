// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Periodic TTL sweep marking overdue services offline.

use chrono::Utc;
use tokio_util::sync::CancellationToken;

use crate::store::Store;

/// Spawn the TTL sweeper as a background task.
///
/// A single timer, so sweeps never overlap; if one runs longer than
/// the interval the next tick is deferred rather than fired late in a
/// burst.
pub fn spawn_ttl_sweeper(store: Store, interval: std::time::Duration, shutdown: CancellationToken) {
    tokio::spawn(async move {
        let mut timer = tokio::time::interval(interval);
        timer.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = shutdown.cancelled() => break,
                _ = timer.tick() => {}
            }

            match store.expire_stale(Utc::now()).await {
                Ok(0) => {}
                Ok(count) => tracing::info!(count, "marked services offline"),
                Err(e) => tracing::error!(err = %e, "ttl sweep failed"),
            }
        }
    });
}
