// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Durable service store backed by an embedded SQLite file.
//!
//! One `services` table keyed by id. Complex fields (tags, layout,
//! components) are JSON text columns; timestamps are unix seconds so
//! the TTL expiry predicate stays integer arithmetic.

use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use sqlx::sqlite::{
    SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteRow, SqliteSynchronous,
};
use sqlx::{Row, SqlitePool};

use crate::model::{Component, Layout, Service, ServiceStatus};

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS services (
    id            TEXT PRIMARY KEY,
    name          TEXT NOT NULL DEFAULT '',
    "group"       TEXT NOT NULL DEFAULT '',
    tags          TEXT NOT NULL DEFAULT '[]',
    icon          TEXT NOT NULL DEFAULT '',
    url           TEXT NOT NULL DEFAULT '',
    status        TEXT NOT NULL DEFAULT 'offline',
    message       TEXT NOT NULL DEFAULT '',
    ttl           INTEGER NOT NULL DEFAULT 0,
    description   TEXT NOT NULL DEFAULT '',
    markdown_docs TEXT NOT NULL DEFAULT '',
    api_version   TEXT NOT NULL DEFAULT '',
    layout        TEXT,
    components    TEXT NOT NULL DEFAULT '{}',
    last_seen     INTEGER NOT NULL DEFAULT 0,
    created_at    INTEGER NOT NULL DEFAULT 0,
    updated_at    INTEGER NOT NULL DEFAULT 0
);
CREATE INDEX IF NOT EXISTS idx_services_status ON services (status);
CREATE INDEX IF NOT EXISTS idx_services_last_seen ON services (last_seen);
"#;

const COLUMNS: &str = r#"id, name, "group", tags, icon, url, status, message, ttl,
    description, markdown_docs, api_version, layout, components,
    last_seen, created_at, updated_at"#;

#[derive(Clone)]
pub struct Store {
    pool: SqlitePool,
}

impl Store {
    /// Open (or create) the database file with WAL journaling and
    /// normal-durability fsync.
    pub async fn connect(path: &Path) -> Result<Self> {
        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            .busy_timeout(Duration::from_secs(5));

        let pool = SqlitePoolOptions::new()
            .max_connections(4)
            .connect_with(options)
            .await
            .with_context(|| format!("failed to open database at {}", path.display()))?;

        Ok(Self { pool })
    }

    pub async fn init_schema(&self) -> Result<()> {
        sqlx::raw_sql(SCHEMA).execute(&self.pool).await.context("failed to create schema")?;
        Ok(())
    }

    /// Insert or fully replace a service row by primary key. Callers
    /// provide the merged record; there are no partial updates.
    pub async fn upsert(&self, svc: &Service) -> Result<()> {
        let tags = serde_json::to_string(&svc.tags)?;
        let layout = svc.layout.as_ref().map(serde_json::to_string).transpose()?;
        let components = serde_json::to_string(&svc.components)?;

        sqlx::query(
            r#"
            INSERT INTO services (
                id, name, "group", tags, icon, url, status, message, ttl,
                description, markdown_docs, api_version, layout, components,
                last_seen, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17)
            ON CONFLICT(id) DO UPDATE SET
                name = excluded.name,
                "group" = excluded."group",
                tags = excluded.tags,
                icon = excluded.icon,
                url = excluded.url,
                status = excluded.status,
                message = excluded.message,
                ttl = excluded.ttl,
                description = excluded.description,
                markdown_docs = excluded.markdown_docs,
                api_version = excluded.api_version,
                layout = excluded.layout,
                components = excluded.components,
                last_seen = excluded.last_seen,
                created_at = excluded.created_at,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(&svc.id)
        .bind(&svc.name)
        .bind(&svc.group)
        .bind(tags)
        .bind(&svc.icon)
        .bind(&svc.url)
        .bind(svc.status.as_str())
        .bind(&svc.message)
        .bind(svc.ttl)
        .bind(&svc.description)
        .bind(&svc.markdown_docs)
        .bind(&svc.api_version)
        .bind(layout)
        .bind(components)
        .bind(svc.last_seen.timestamp())
        .bind(svc.created_at.timestamp())
        .bind(svc.updated_at.timestamp())
        .execute(&self.pool)
        .await
        .with_context(|| format!("failed to upsert service '{}'", svc.id))?;

        Ok(())
    }

    pub async fn get(&self, id: &str) -> Result<Option<Service>> {
        let row = sqlx::query(&format!("SELECT {COLUMNS} FROM services WHERE id = ?1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .with_context(|| format!("failed to load service '{id}'"))?;
        row.map(row_to_service).transpose()
    }

    pub async fn list(&self) -> Result<Vec<Service>> {
        let rows = sqlx::query(&format!("SELECT {COLUMNS} FROM services ORDER BY id"))
            .fetch_all(&self.pool)
            .await
            .context("failed to list services")?;
        rows.into_iter().map(row_to_service).collect()
    }

    /// Mark every overdue row offline in a single statement, avoiding
    /// read-modify-write races with concurrent upserts. Returns the
    /// affected row count.
    pub async fn expire_stale(&self, now: DateTime<Utc>) -> Result<u64> {
        let result = sqlx::query(
            "UPDATE services SET status = 'offline', updated_at = ?1
             WHERE status != 'offline' AND last_seen + ttl < ?1",
        )
        .bind(now.timestamp())
        .execute(&self.pool)
        .await
        .context("failed to expire stale services")?;

        Ok(result.rows_affected())
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }
}

fn row_to_service(row: SqliteRow) -> Result<Service> {
    let tags: String = row.try_get("tags")?;
    let layout: Option<String> = row.try_get("layout")?;
    let components: String = row.try_get("components")?;
    let status: String = row.try_get("status")?;

    let layout: Option<Layout> =
        layout.as_deref().map(serde_json::from_str).transpose().context("corrupt layout column")?;
    let components: HashMap<String, Component> =
        serde_json::from_str(&components).context("corrupt components column")?;
    let tags: Vec<String> = serde_json::from_str(&tags).context("corrupt tags column")?;

    Ok(Service {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        group: row.try_get("group")?,
        tags,
        icon: row.try_get("icon")?,
        url: row.try_get("url")?,
        status: ServiceStatus::parse(&status),
        message: row.try_get("message")?,
        ttl: row.try_get("ttl")?,
        description: row.try_get("description")?,
        markdown_docs: row.try_get("markdown_docs")?,
        api_version: row.try_get("api_version")?,
        layout,
        components,
        last_seen: timestamp(row.try_get("last_seen")?),
        created_at: timestamp(row.try_get("created_at")?),
        updated_at: timestamp(row.try_get("updated_at")?),
    })
}

fn timestamp(secs: i64) -> DateTime<Utc> {
    DateTime::<Utc>::from_timestamp(secs, 0).unwrap_or(DateTime::<Utc>::UNIX_EPOCH)
}

#[cfg(test)]
#[path = "store_tests.rs"]
mod tests;
