// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, anyhow, bail};
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing_subscriber::EnvFilter;

const CONFIG_VERSION: i64 = 1;
const DEFAULT_TIMEOUT: &str = "5s";
const DEFAULT_LOG_LEVEL: &str = "info";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    Remote,
    #[default]
    Sqlite,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub version: i64,
    #[serde(default)]
    pub backend: Backend,
    #[serde(default)]
    pub remote: Remote,
    #[serde(default)]
    pub storage: Storage,
    #[serde(default)]
    pub log: Log,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            backend: Backend::default(),
            remote: Remote::default(),
            storage: Storage::default(),
            log: Log::default(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Backend {
    #[serde(default)]
    pub kind: BackendKind,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Remote {
    pub base_url: Option<String>,
    pub api_key: Option<String>,
    pub table: Option<String>,
    pub timeout: Option<String>,
}

impl Default for Remote {
    fn default() -> Self {
        Self {
            base_url: None,
            api_key: None,
            table: Some(folio_store::DEFAULT_TABLE.to_owned()),
            timeout: Some(DEFAULT_TIMEOUT.to_owned()),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Storage {
    pub db_path: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Log {
    pub level: Option<String>,
}

impl Default for Log {
    fn default() -> Self {
        Self {
            level: Some(DEFAULT_LOG_LEVEL.to_owned()),
        }
    }
}

impl Config {
    pub fn default_path() -> Result<PathBuf> {
        if let Some(path) = env::var_os("FOLIO_CONFIG_PATH") {
            return Ok(PathBuf::from(path));
        }

        let config_root = dirs::config_dir().ok_or_else(|| {
            anyhow!("cannot resolve config directory; set FOLIO_CONFIG_PATH to the config file")
        })?;

        let app_dir = config_root.join(folio_store::APP_NAME);
        fs::create_dir_all(&app_dir)
            .with_context(|| format!("create config directory {}", app_dir.display()))?;
        Ok(app_dir.join("config.toml"))
    }

    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let raw = fs::read_to_string(path)
            .with_context(|| format!("read config file {}", path.display()))?;
        let value: toml::Value = toml::from_str(&raw)
            .with_context(|| format!("parse TOML config {}", path.display()))?;

        let version = value
            .get("version")
            .and_then(toml::Value::as_integer)
            .ok_or_else(|| {
                anyhow!(
                    "config file {} is not versioned. Add `version = 1` and put values under [backend], [remote], [storage], and [log]",
                    path.display()
                )
            })?;

        if version != CONFIG_VERSION {
            bail!(
                "unsupported config version {} in {}; expected version = 1",
                version,
                path.display()
            );
        }

        let config: Config = value
            .try_into()
            .with_context(|| format!("decode config {}", path.display()))?;
        config.validate(path)?;
        Ok(config)
    }

    fn validate(&self, path: &Path) -> Result<()> {
        if let Some(db_path) = &self.storage.db_path {
            folio_store::validate_db_path(db_path)
                .with_context(|| format!("storage.db_path in {}", path.display()))?;
        }

        if let Some(timeout) = &self.remote.timeout {
            let parsed = parse_duration(timeout)
                .with_context(|| format!("remote.timeout in {}", path.display()))?;
            if parsed <= Duration::ZERO {
                bail!(
                    "remote.timeout in {} must be positive, got {}",
                    path.display(),
                    timeout
                );
            }
        }

        if let Some(base_url) = &self.remote.base_url {
            url::Url::parse(base_url.trim_end_matches('/')).with_context(|| {
                format!(
                    "remote.base_url in {} is not a valid URL: {base_url:?}",
                    path.display()
                )
            })?;
        }

        if self.backend.kind == BackendKind::Remote && self.remote.base_url.is_none() {
            bail!(
                "backend.kind = \"remote\" in {} needs remote.base_url",
                path.display()
            );
        }

        if let Some(level) = &self.log.level {
            EnvFilter::try_new(level).with_context(|| {
                format!("log.level in {} is not a valid filter: {level:?}", path.display())
            })?;
        }

        Ok(())
    }

    pub fn backend_kind(&self) -> BackendKind {
        self.backend.kind
    }

    pub fn db_path(&self) -> Result<PathBuf> {
        match &self.storage.db_path {
            Some(path) => Ok(PathBuf::from(path)),
            None => folio_store::default_db_path(),
        }
    }

    pub fn remote_base_url(&self) -> Result<&str> {
        self.remote
            .base_url
            .as_deref()
            .map(|url| url.trim_end_matches('/'))
            .ok_or_else(|| anyhow!("remote.base_url is not set; add it under [remote]"))
    }

    pub fn remote_api_key(&self) -> Result<String> {
        if let Some(key) = &self.remote.api_key
            && !key.trim().is_empty()
        {
            return Ok(key.clone());
        }
        match env::var("FOLIO_API_KEY") {
            Ok(key) if !key.trim().is_empty() => Ok(key),
            _ => bail!("no API key; set remote.api_key or FOLIO_API_KEY"),
        }
    }

    pub fn remote_table(&self) -> &str {
        self.remote
            .table
            .as_deref()
            .unwrap_or(folio_store::DEFAULT_TABLE)
    }

    pub fn remote_timeout(&self) -> Result<Duration> {
        parse_duration(self.remote.timeout.as_deref().unwrap_or(DEFAULT_TIMEOUT))
    }

    pub fn log_level(&self) -> &str {
        self.log.level.as_deref().unwrap_or(DEFAULT_LOG_LEVEL)
    }

    pub fn example_config(path: &Path) -> String {
        format!(
            "# folio config\n# Place this file at: {}\n\nversion = 1\n\n[backend]\n# \"sqlite\" for a local database, \"remote\" for the hosted table\nkind = \"sqlite\"\n\n[remote]\n# base_url = \"https://your-project.example.co\"\n# Optional. FOLIO_API_KEY is used when unset\n# api_key = \"\"\ntable = \"{}\"\ntimeout = \"{}\"\n\n[storage]\n# Optional. Default is platform data dir (for example ~/.local/share/folio/folio.db)\n# db_path = \"/absolute/path/to/folio.db\"\n\n[log]\n# Any tracing filter; RUST_LOG wins when set\nlevel = \"{}\"\n",
            path.display(),
            folio_store::DEFAULT_TABLE,
            DEFAULT_TIMEOUT,
            DEFAULT_LOG_LEVEL,
        )
    }
}

fn parse_duration(raw: &str) -> Result<Duration> {
    if let Some(value) = raw.strip_suffix("ms") {
        let millis: u64 = value
            .parse()
            .with_context(|| format!("invalid timeout duration {raw:?}"))?;
        return Ok(Duration::from_millis(millis));
    }
    if let Some(value) = raw.strip_suffix('s') {
        let secs: u64 = value
            .parse()
            .with_context(|| format!("invalid timeout duration {raw:?}"))?;
        return Ok(Duration::from_secs(secs));
    }
    if let Some(value) = raw.strip_suffix('m') {
        let mins: u64 = value
            .parse()
            .with_context(|| format!("invalid timeout duration {raw:?}"))?;
        let secs = mins
            .checked_mul(60)
            .ok_or_else(|| anyhow!("timeout duration {raw:?} is too large"))?;
        return Ok(Duration::from_secs(secs));
    }

    bail!("invalid duration {raw:?}; use one of: <N>ms, <N>s, <N>m (for example 500ms or 5s)")
}

#[cfg(test)]
mod tests {
    use super::{BackendKind, Config, parse_duration};
    use anyhow::Result;
    use std::path::PathBuf;
    use std::sync::{Mutex, OnceLock};
    use std::time::Duration;

    fn write_config(content: &str) -> Result<(tempfile::TempDir, PathBuf)> {
        let temp = tempfile::tempdir()?;
        let path = temp.path().join("config.toml");
        std::fs::write(&path, content)?;
        Ok((temp, path))
    }

    fn env_lock() -> std::sync::MutexGuard<'static, ()> {
        static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();
        match ENV_LOCK.get_or_init(|| Mutex::new(())).lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    #[test]
    fn missing_config_uses_defaults() -> Result<()> {
        let temp = tempfile::tempdir()?;
        let config = Config::load(&temp.path().join("missing.toml"))?;
        assert_eq!(config.version, 1);
        assert_eq!(config.backend_kind(), BackendKind::Sqlite);
        assert_eq!(config.remote_table(), "profile_settings");
        assert_eq!(config.remote_timeout()?, Duration::from_secs(5));
        assert_eq!(config.log_level(), "info");
        Ok(())
    }

    #[test]
    fn unversioned_config_is_rejected_with_actionable_message() -> Result<()> {
        let (_temp, path) = write_config("[remote]\ntable = \"profile\"\n")?;
        let error = Config::load(&path).expect_err("unversioned config should fail");
        let message = error.to_string();
        assert!(message.contains("version = 1"));
        assert!(message.contains("[backend], [remote], [storage], and [log]"));
        Ok(())
    }

    #[test]
    fn remote_config_parses() -> Result<()> {
        let (_temp, path) = write_config(
            "version = 1\n[backend]\nkind = \"remote\"\n[remote]\nbase_url = \"https://abc.example.co/\"\napi_key = \"anon\"\ntable = \"profile_settings\"\ntimeout = \"750ms\"\n[log]\nlevel = \"folio_store=debug\"\n",
        )?;

        let config = Config::load(&path)?;
        assert_eq!(config.backend_kind(), BackendKind::Remote);
        assert_eq!(config.remote_base_url()?, "https://abc.example.co");
        assert_eq!(config.remote_api_key()?, "anon");
        assert_eq!(config.remote_timeout()?, Duration::from_millis(750));
        assert_eq!(config.log_level(), "folio_store=debug");
        Ok(())
    }

    #[test]
    fn remote_backend_requires_base_url() -> Result<()> {
        let (_temp, path) = write_config("version = 1\n[backend]\nkind = \"remote\"\n")?;
        let error = Config::load(&path).expect_err("remote without url should fail");
        assert!(error.to_string().contains("needs remote.base_url"));
        Ok(())
    }

    #[test]
    fn unknown_backend_kind_is_rejected() -> Result<()> {
        let (_temp, path) = write_config("version = 1\n[backend]\nkind = \"postgres\"\n")?;
        let error = Config::load(&path).expect_err("unknown kind should fail");
        assert!(format!("{error:#}").contains("decode config"));
        Ok(())
    }

    #[test]
    fn malformed_config_returns_parse_error() -> Result<()> {
        let (_temp, path) = write_config("{{not toml")?;
        let error = Config::load(&path).expect_err("malformed config should fail");
        assert!(error.to_string().contains("parse TOML config"));
        Ok(())
    }

    #[test]
    fn unsupported_config_version_is_rejected() -> Result<()> {
        let (_temp, path) = write_config("version = 2\n")?;
        let error = Config::load(&path).expect_err("v2 config should fail");
        assert!(error.to_string().contains("unsupported config version 2"));
        Ok(())
    }

    #[test]
    fn api_key_falls_back_to_env() -> Result<()> {
        let _guard = env_lock();
        let (_temp, path) = write_config("version = 1\n")?;
        let config = Config::load(&path)?;

        // SAFETY: test-only process-local env mutation.
        unsafe {
            std::env::set_var("FOLIO_API_KEY", "from-env");
        }
        let resolved = config.remote_api_key();
        // SAFETY: test cleanup for process-local env mutation.
        unsafe {
            std::env::remove_var("FOLIO_API_KEY");
        }
        assert_eq!(resolved?, "from-env");

        let error = config
            .remote_api_key()
            .expect_err("no key anywhere should fail");
        assert!(error.to_string().contains("FOLIO_API_KEY"));
        Ok(())
    }

    #[test]
    fn default_path_honors_env_override() -> Result<()> {
        let _guard = env_lock();
        let temp = tempfile::tempdir()?;
        let override_path = temp.path().join("custom-config.toml");
        // SAFETY: test-only process-local env mutation.
        unsafe {
            std::env::set_var("FOLIO_CONFIG_PATH", &override_path);
        }
        let resolved = Config::default_path()?;
        // SAFETY: test cleanup for process-local env mutation.
        unsafe {
            std::env::remove_var("FOLIO_CONFIG_PATH");
        }
        assert_eq!(resolved, override_path);
        Ok(())
    }

    #[test]
    fn db_path_prefers_storage_config_over_env_override() -> Result<()> {
        let _guard = env_lock();
        let (_temp, path) =
            write_config("version = 1\n[storage]\ndb_path = \"/explicit/from-config.db\"\n")?;
        // SAFETY: test-only process-local env mutation.
        unsafe {
            std::env::set_var("FOLIO_DB_PATH", "/from/env.db");
        }
        let config = Config::load(&path)?;
        // SAFETY: test cleanup for process-local env mutation.
        unsafe {
            std::env::remove_var("FOLIO_DB_PATH");
        }
        assert_eq!(config.db_path()?, PathBuf::from("/explicit/from-config.db"));
        Ok(())
    }

    #[test]
    fn db_path_uses_env_override_when_storage_db_path_missing() -> Result<()> {
        let _guard = env_lock();
        let (_temp, path) = write_config("version = 1\n")?;
        // SAFETY: test-only process-local env mutation.
        unsafe {
            std::env::set_var("FOLIO_DB_PATH", "/from/env-only.db");
        }
        let config = Config::load(&path)?;
        let resolved = config.db_path()?;
        // SAFETY: test cleanup for process-local env mutation.
        unsafe {
            std::env::remove_var("FOLIO_DB_PATH");
        }
        assert_eq!(resolved, PathBuf::from("/from/env-only.db"));
        Ok(())
    }

    #[test]
    fn db_path_rejects_uri_style_storage_value() -> Result<()> {
        let (_temp, path) =
            write_config("version = 1\n[storage]\ndb_path = \"https://evil.example/folio.db\"\n")?;
        let error = Config::load(&path).expect_err("URI db_path should fail validation");
        let message = format!("{error:#}");
        assert!(message.contains("storage.db_path"));
        assert!(message.contains("looks like a URI"), "unexpected message: {message}");
        Ok(())
    }

    #[test]
    fn timeout_parses_ms_seconds_and_minutes() -> Result<()> {
        assert_eq!(parse_duration("500ms")?, Duration::from_millis(500));
        assert_eq!(parse_duration("5s")?, Duration::from_secs(5));
        assert_eq!(parse_duration("2m")?, Duration::from_secs(120));
        Ok(())
    }

    #[test]
    fn timeout_rejects_invalid_and_zero_values() -> Result<()> {
        let error = parse_duration("oops").expect_err("invalid duration should fail");
        assert!(error.to_string().contains("invalid duration"));

        let (_temp, path) = write_config("version = 1\n[remote]\ntimeout = \"0s\"\n")?;
        let error = Config::load(&path).expect_err("zero timeout should fail");
        assert!(error.to_string().contains("must be positive"));
        Ok(())
    }

    #[test]
    fn timeout_rejects_minutes_that_overflow() {
        let error = parse_duration("307445734561825861m").expect_err("overflow should fail");
        assert!(error.to_string().contains("too large"));
    }

    #[test]
    fn invalid_log_level_is_rejected() -> Result<()> {
        let (_temp, path) = write_config("version = 1\n[log]\nlevel = \"folio=loud\"\n")?;
        let error = Config::load(&path).expect_err("bad filter should fail");
        assert!(error.to_string().contains("log.level"));
        Ok(())
    }

    #[test]
    fn example_config_round_trips() -> Result<()> {
        let temp = tempfile::tempdir()?;
        let path = temp.path().join("config.toml");
        let example = Config::example_config(&path);
        assert!(example.contains("version = 1"));
        for section in ["[backend]", "[remote]", "[storage]", "[log]"] {
            assert!(example.contains(section), "section {section}");
        }

        std::fs::write(&path, &example)?;
        let config = Config::load(&path)?;
        assert_eq!(config.backend_kind(), BackendKind::Sqlite);
        Ok(())
    }
}
