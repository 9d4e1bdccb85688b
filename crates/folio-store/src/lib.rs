// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

mod sqlite;
mod store;
pub mod validation;

use anyhow::{Context, Result, anyhow, bail};
use folio_app::ProfileRecord;
use serde_json::Value;
use std::env;
use std::fs;
use std::path::PathBuf;

pub use sqlite::SqliteBackend;
pub use store::{
    FetchFailure, FetchOutcome, PendingFetch, ProfileQuery, ProfileSnapshot, ProfileStore,
    RejectedRecord, WriteError,
};
pub use validation::{ValidationError, schema_for, validate_value};

pub const APP_NAME: &str = "folio";
pub const DEFAULT_TABLE: &str = "profile_settings";

// Keyed document storage. Implementations must treat `update` as
// update-only: a key with no existing record is an error, never an insert.
pub trait ProfileBackend: Send + Sync {
    fn fetch(&self, key: &str) -> Result<Option<Value>>;

    fn fetch_all(&self) -> Result<Vec<ProfileRecord>>;

    fn update(&self, key: &str, value: &Value) -> Result<()>;
}

pub fn default_db_path() -> Result<PathBuf> {
    if let Some(override_path) = env::var_os("FOLIO_DB_PATH") {
        return Ok(PathBuf::from(override_path));
    }

    let data_root = dirs::data_local_dir().ok_or_else(|| {
        anyhow!("cannot resolve data directory; set FOLIO_DB_PATH to a writable database path")
    })?;

    let app_dir = data_root.join(APP_NAME);
    fs::create_dir_all(&app_dir)
        .with_context(|| format!("create data directory {}", app_dir.display()))?;
    Ok(app_dir.join("folio.db"))
}

pub fn validate_db_path(path: &str) -> Result<()> {
    if path.is_empty() {
        bail!("database path must not be empty");
    }
    if path == ":memory:" {
        return Ok(());
    }

    if let Some(index) = path.find("://")
        && index > 0
    {
        let scheme = &path[..index];
        if scheme.chars().all(char::is_alphabetic) {
            bail!(
                "database path {path:?} looks like a URI ({scheme}://); pass a filesystem path instead"
            );
        }
    }

    if path.starts_with("file:") {
        bail!("database path {path:?} uses file: URI syntax; pass a plain filesystem path");
    }

    if path.contains('?') {
        bail!(
            "database path {path:?} contains '?'; remove query parameters and use a plain file path"
        );
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::validate_db_path;

    #[test]
    fn db_path_rejects_uri_forms() {
        for bad in [
            "",
            "https://db.example.com/folio",
            "file:folio.db",
            "folio.db?mode=ro",
        ] {
            assert!(validate_db_path(bad).is_err(), "path {bad:?}");
        }
    }

    #[test]
    fn db_path_accepts_plain_paths() {
        for good in [":memory:", "folio.db", "/var/lib/folio/folio.db", "C:\\folio\\folio.db"] {
            validate_db_path(good).expect("plain path should pass");
        }
    }
}
