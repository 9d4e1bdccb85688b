// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, anyhow, bail};
use folio_app::ProfileRecord;
use rusqlite::{Connection, OptionalExtension, params};
use serde_json::Value;
use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;
use tracing::debug;

use crate::{DEFAULT_TABLE, ProfileBackend, validate_db_path};

const REQUIRED_COLUMNS: [&str; 3] = ["key", "value", "updated_at"];

#[derive(Debug)]
pub struct SqliteBackend {
    conn: Mutex<Connection>,
}

impl SqliteBackend {
    pub fn open(path: &Path) -> Result<Self> {
        let printable = path.to_string_lossy().to_string();
        validate_db_path(&printable)?;
        let conn = Connection::open(path)
            .with_context(|| format!("open database at {}", path.display()))?;
        configure_connection(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    pub fn open_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().context("open in-memory database")?;
        configure_connection(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    pub fn bootstrap(&self) -> Result<()> {
        let conn = self.lock()?;
        conn.execute_batch(&format!(
            "
            CREATE TABLE IF NOT EXISTS {DEFAULT_TABLE} (
              key TEXT PRIMARY KEY,
              value TEXT NOT NULL,
              updated_at TEXT NOT NULL
            );
            "
        ))
        .context("create profile table")?;

        let mut stmt = conn
            .prepare(&format!("PRAGMA table_info({DEFAULT_TABLE})"))
            .context("inspect profile table")?;
        let columns = stmt
            .query_map([], |row| row.get::<_, String>(1))
            .context("query profile table columns")?
            .collect::<rusqlite::Result<Vec<_>>>()
            .context("collect profile table columns")?;
        let missing = REQUIRED_COLUMNS
            .iter()
            .copied()
            .filter(|column| !columns.iter().any(|existing| existing == column))
            .collect::<Vec<_>>();
        if !missing.is_empty() {
            bail!(
                "table `{DEFAULT_TABLE}` is missing required columns: {}; use a folio-compatible database",
                missing.join(", ")
            );
        }
        Ok(())
    }

    // Inserts records for keys that have none. Existing rows are left alone.
    // Returns the keys that were inserted.
    pub fn seed(&self, records: &[ProfileRecord]) -> Result<Vec<String>> {
        let conn = self.lock()?;
        let now = now_rfc3339()?;
        let mut inserted = Vec::new();
        for record in records {
            let raw = serde_json::to_string(&record.value)
                .with_context(|| format!("encode seed record {}", record.key))?;
            let changed = conn
                .execute(
                    &format!(
                        "INSERT OR IGNORE INTO {DEFAULT_TABLE} (key, value, updated_at) VALUES (?, ?, ?)"
                    ),
                    params![record.key, raw, now],
                )
                .with_context(|| format!("seed record {}", record.key))?;
            if changed > 0 {
                inserted.push(record.key.clone());
            }
        }
        Ok(inserted)
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| anyhow!("database connection lock poisoned"))
    }
}

impl ProfileBackend for SqliteBackend {
    fn fetch(&self, key: &str) -> Result<Option<Value>> {
        debug!(key, "sqlite fetch");
        let conn = self.lock()?;
        let raw = conn
            .query_row(
                &format!("SELECT value FROM {DEFAULT_TABLE} WHERE key = ?"),
                params![key],
                |row| row.get::<_, String>(0),
            )
            .optional()
            .with_context(|| format!("read record {key}"))?;
        raw.map(|raw| {
            serde_json::from_str(&raw).with_context(|| format!("record {key} is not valid JSON"))
        })
        .transpose()
    }

    fn fetch_all(&self) -> Result<Vec<ProfileRecord>> {
        debug!("sqlite fetch all");
        let conn = self.lock()?;
        let mut stmt = conn
            .prepare(&format!(
                "SELECT key, value FROM {DEFAULT_TABLE} ORDER BY key ASC"
            ))
            .context("prepare record listing")?;
        let rows = stmt
            .query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?)))
            .context("list records")?
            .collect::<rusqlite::Result<Vec<_>>>()
            .context("collect records")?;

        rows.into_iter()
            .map(|(key, raw)| {
                let value = serde_json::from_str(&raw)
                    .with_context(|| format!("record {key} is not valid JSON"))?;
                Ok(ProfileRecord { key, value })
            })
            .collect()
    }

    fn update(&self, key: &str, value: &Value) -> Result<()> {
        debug!(key, "sqlite update");
        let raw = serde_json::to_string(value).with_context(|| format!("encode record {key}"))?;
        let now = now_rfc3339()?;
        let conn = self.lock()?;
        let changed = conn
            .execute(
                &format!("UPDATE {DEFAULT_TABLE} SET value = ?, updated_at = ? WHERE key = ?"),
                params![raw, now, key],
            )
            .with_context(|| format!("update record {key}"))?;
        if changed == 0 {
            bail!("no record for key `{key}`; seed it before saving");
        }
        Ok(())
    }
}

fn configure_connection(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        PRAGMA journal_mode = WAL;
        PRAGMA synchronous = NORMAL;
        PRAGMA busy_timeout = 5000;
        ",
    )
    .context("configure sqlite pragmas")
}

fn now_rfc3339() -> Result<String> {
    OffsetDateTime::now_utc()
        .format(&Rfc3339)
        .context("format current timestamp")
}
