// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

/// Configuration for the synapse hub.
#[derive(Debug, Clone, clap::Parser)]
#[command(name = "synapse", about = "Self-hosted service dashboard and monitoring hub")]
pub struct SynapseConfig {
    /// SQLite database file path.
    #[arg(long, default_value = "synapse.db", env = "SYNAPSE_DB_PATH")]
    pub db_path: std::path::PathBuf,

    /// Host to bind the HTTP API on.
    #[arg(long, default_value = "0.0.0.0", env = "SYNAPSE_HTTP_HOST")]
    pub http_host: String,

    /// Port for the HTTP API.
    #[arg(long, default_value_t = 8080, env = "SYNAPSE_HTTP_PORT")]
    pub http_port: u16,

    /// Host of the MQTT broker.
    #[arg(long, default_value = "127.0.0.1", env = "SYNAPSE_MQTT_HOST")]
    pub mqtt_host: String,

    /// TCP port of the MQTT broker.
    #[arg(long, default_value_t = 1883, env = "SYNAPSE_MQTT_PORT")]
    pub mqtt_port: u16,

    /// WebSocket port of the MQTT broker (used by the frontend; the
    /// core never dials it).
    #[arg(long, default_value_t = 8083, env = "SYNAPSE_WS_PORT")]
    pub ws_port: u16,

    /// Shared secret axons must present in discovery payloads.
    #[arg(long, default_value = "synapse-secret", env = "SYNAPSE_AUTH_TOKEN")]
    pub auth_token: String,

    /// TTL sweep interval in milliseconds.
    #[arg(long, default_value_t = 10_000, env = "SYNAPSE_SWEEP_INTERVAL_MS")]
    pub sweep_interval_ms: u64,

    /// Enable email alerting.
    #[arg(long, default_value_t = false, env = "SYNAPSE_ENABLE_ALERTS")]
    pub enable_alerts: bool,

    /// SMTP server hostname.
    #[arg(long, default_value = "", env = "SYNAPSE_SMTP_HOST")]
    pub smtp_host: String,

    /// SMTP server port (587 STARTTLS, 465 implicit TLS, other plaintext).
    #[arg(long, default_value_t = 587, env = "SYNAPSE_SMTP_PORT")]
    pub smtp_port: u16,

    /// SMTP submission username.
    #[arg(long, default_value = "", env = "SYNAPSE_SMTP_USER")]
    pub smtp_user: String,

    /// SMTP submission password.
    #[arg(long, default_value = "", env = "SYNAPSE_SMTP_PASS")]
    pub smtp_pass: String,

    /// Sender address for alert email.
    #[arg(long, default_value = "", env = "SYNAPSE_SMTP_FROM")]
    pub smtp_from: String,

    /// Comma-separated recipient list for alert email.
    #[arg(long, default_value = "", env = "SYNAPSE_SMTP_TO")]
    pub smtp_to: String,
}

impl SynapseConfig {
    pub fn http_addr(&self) -> String {
        format!("{}:{}", self.http_host, self.http_port)
    }

    pub fn sweep_interval(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.sweep_interval_ms)
    }

    /// Whether email alerting is enabled and sufficiently configured.
    pub fn smtp_ready(&self) -> bool {
        self.enable_alerts
            && !self.smtp_host.is_empty()
            && !self.smtp_from.is_empty()
            && !self.smtp_to.is_empty()
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
