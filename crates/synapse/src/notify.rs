// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Alert delivery transports.

use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

use crate::config::SynapseConfig;

/// Bound on a single SMTP submission; a stuck notification must not
/// stall ingestion past this.
const SMTP_TIMEOUT: Duration = Duration::from_secs(10);

/// Delivery seam for alert notifications.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, subject: &str, body: &str) -> anyhow::Result<()>;
}

/// Notifier used when alerting is disabled; accepts and drops everything.
pub struct NoopNotifier;

#[async_trait]
impl Notifier for NoopNotifier {
    async fn send(&self, _subject: &str, _body: &str) -> anyhow::Result<()> {
        Ok(())
    }
}

/// SMTP notifier for authenticated submission.
pub struct SmtpNotifier {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
    to: Vec<Mailbox>,
}

impl SmtpNotifier {
    /// Build a notifier from the configured SMTP settings.
    ///
    /// Port 587 negotiates explicit STARTTLS, 465 uses implicit TLS,
    /// anything else is plaintext.
    pub fn new(config: &SynapseConfig) -> anyhow::Result<Self> {
        let builder = match config.smtp_port {
            587 => AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.smtp_host)
                .context("smtp starttls setup failed")?,
            465 => AsyncSmtpTransport::<Tokio1Executor>::relay(&config.smtp_host)
                .context("smtp tls setup failed")?,
            _ => AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&config.smtp_host),
        };
        let mut builder = builder.port(config.smtp_port).timeout(Some(SMTP_TIMEOUT));
        if !config.smtp_user.is_empty() {
            builder = builder
                .credentials(Credentials::new(config.smtp_user.clone(), config.smtp_pass.clone()));
        }

        let from: Mailbox = config
            .smtp_from
            .parse()
            .with_context(|| format!("bad SYNAPSE_SMTP_FROM '{}'", config.smtp_from))?;
        let to: Vec<Mailbox> = config
            .smtp_to
            .split(',')
            .map(str::trim)
            .filter(|addr| !addr.is_empty())
            .map(|addr| addr.parse().with_context(|| format!("bad recipient '{addr}'")))
            .collect::<anyhow::Result<_>>()?;
        anyhow::ensure!(!to.is_empty(), "SYNAPSE_SMTP_TO has no recipients");

        Ok(Self { transport: builder.build(), from, to })
    }
}

#[async_trait]
impl Notifier for SmtpNotifier {
    async fn send(&self, subject: &str, body: &str) -> anyhow::Result<()> {
        let mut message = Message::builder()
            .from(self.from.clone())
            .subject(format!("[Synapse] {subject}"))
            .header(ContentType::TEXT_PLAIN);
        for recipient in &self.to {
            message = message.to(recipient.clone());
        }
        let message = message.body(body.to_owned()).context("failed to build alert email")?;

        self.transport.send(message).await.context("smtp send failed")?;
        tracing::info!(subject, "alert email sent");
        Ok(())
    }
}
