// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

use async_trait::async_trait;
use tokio::sync::mpsc;

struct ChannelNotifier {
    tx: mpsc::UnboundedSender<(String, String)>,
}

#[async_trait]
impl Notifier for ChannelNotifier {
    async fn send(&self, subject: &str, body: &str) -> anyhow::Result<()> {
        let _ = self.tx.send((subject.to_owned(), body.to_owned()));
        Ok(())
    }
}

fn tracker() -> (AlertTracker, mpsc::UnboundedReceiver<(String, String)>) {
    let (tx, rx) = mpsc::unbounded_channel();
    (AlertTracker::new(Arc::new(ChannelNotifier { tx })), rx)
}

async fn settled(tracker: &AlertTracker, rx: &mut mpsc::UnboundedReceiver<(String, String)>) -> Vec<(String, String)> {
    tracker.drain(Duration::from_secs(1)).await;
    let mut sent = Vec::new();
    while let Ok(pair) = rx.try_recv() {
        sent.push(pair);
    }
    sent
}

#[tokio::test]
async fn notifies_only_on_rising_edges() {
    let (tracker, mut rx) = tracker();
    let key = "svc:cpu:m0";

    tracker.check_and_alert(key, false, Severity::Error, "CPU high", "API");
    assert_eq!(settled(&tracker, &mut rx).await.len(), 0);

    tracker.check_and_alert(key, true, Severity::Error, "CPU high", "API");
    assert_eq!(settled(&tracker, &mut rx).await.len(), 1);

    // Steady state repeats are silent.
    tracker.check_and_alert(key, true, Severity::Error, "CPU high", "API");
    tracker.check_and_alert(key, true, Severity::Error, "CPU high", "API");
    assert_eq!(settled(&tracker, &mut rx).await.len(), 0);

    // Resolution is log-only.
    tracker.check_and_alert(key, false, Severity::Error, "CPU high", "API");
    assert_eq!(settled(&tracker, &mut rx).await.len(), 0);

    // A fresh rising edge notifies again.
    tracker.check_and_alert(key, true, Severity::Error, "CPU high", "API");
    assert_eq!(settled(&tracker, &mut rx).await.len(), 1);
}

#[tokio::test]
async fn subject_and_body_formatting() {
    let (tracker, mut rx) = tracker();
    tracker.check_and_alert("db:disk:m1", true, Severity::Warning, "disk filling", "Database");

    let sent = settled(&tracker, &mut rx).await;
    assert_eq!(sent.len(), 1);
    let (subject, body) = &sent[0];
    assert_eq!(subject, "warning: Database - disk filling");
    assert!(body.contains("Service: Database"));
    assert!(body.contains("Alert: disk filling"));
    assert!(body.contains("Severity: warning"));
    assert!(body.contains("GMT"));
}

#[tokio::test]
async fn severity_change_while_triggered_renotifies() {
    let (tracker, mut rx) = tracker();
    let key = "svc:mem:m0";

    tracker.check_and_alert(key, true, Severity::Warning, "memory", "API");
    assert_eq!(settled(&tracker, &mut rx).await.len(), 1);

    tracker.check_and_alert(key, true, Severity::Error, "memory", "API");
    assert_eq!(settled(&tracker, &mut rx).await.len(), 1);
}

#[tokio::test]
async fn keys_are_independent() {
    let (tracker, mut rx) = tracker();

    tracker.check_and_alert("svc:cpu:m0", true, Severity::Error, "cpu", "API");
    tracker.check_and_alert("svc:cpu:m1", true, Severity::Error, "cpu slope", "API");
    tracker.check_and_alert("other:cpu:m0", true, Severity::Error, "cpu", "Worker");

    assert_eq!(settled(&tracker, &mut rx).await.len(), 3);
}
