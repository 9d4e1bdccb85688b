// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, anyhow, bail};
use folio_app::{
    ContactData, Education, Experience, HeroData, ProfileDocument, ProfileKey, ProfileRecord,
    Project, Responsibility, Skills,
};
use folio_store::{FetchOutcome, ProfileBackend, ProfileStore, SqliteBackend, validate_value};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value, json};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;

use crate::config::{BackendKind, Config};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Keys,
    Get { key: String },
    Dump,
    Validate { key: String, file: PathBuf },
    Put { key: String, file: PathBuf },
    Move { key: String, from: String, to: String },
    Add { key: String },
    Remove { key: String, entry: String },
    Seed { file: Option<PathBuf> },
}

pub struct Runtime {
    store: ProfileStore,
    sqlite: Option<Arc<SqliteBackend>>,
}

impl Runtime {
    pub fn from_config(config: &Config) -> Result<Self> {
        match config.backend_kind() {
            BackendKind::Remote => {
                let client = folio_remote::Client::new(
                    config.remote_base_url()?,
                    &config.remote_api_key()?,
                    config.remote_table(),
                    config.remote_timeout()?,
                )
                .context("invalid [remote] config; fix base_url/api_key/table/timeout values")?;
                Ok(Self::with_backend(Arc::new(client)))
            }
            BackendKind::Sqlite => {
                let db_path = config.db_path()?;
                let backend = SqliteBackend::open(&db_path).with_context(|| {
                    format!(
                        "open database {} -- if this path is wrong, set [storage].db_path or FOLIO_DB_PATH",
                        db_path.display()
                    )
                })?;
                backend.bootstrap()?;
                Ok(Self::with_sqlite(Arc::new(backend)))
            }
        }
    }

    pub fn with_backend(backend: Arc<dyn ProfileBackend>) -> Self {
        Self {
            store: ProfileStore::new(backend),
            sqlite: None,
        }
    }

    pub fn with_sqlite(backend: Arc<SqliteBackend>) -> Self {
        Self {
            store: ProfileStore::new(Arc::clone(&backend) as Arc<dyn ProfileBackend>),
            sqlite: Some(backend),
        }
    }

    pub fn run(&self, command: &Command, out: &mut dyn Write) -> Result<()> {
        match command {
            Command::Keys => self.keys(out),
            Command::Get { key } => self.get(key, out),
            Command::Dump => self.dump(out),
            Command::Validate { key, file } => {
                let value = read_json(file)?;
                validate_value(key, &value)
                    .with_context(|| format!("{} is not a valid {key} document", file.display()))?;
                writeln!(out, "{key}: valid")?;
                Ok(())
            }
            Command::Put { key, file } => {
                let value = read_json(file)?;
                let message = self.store.save_value(key, &value)?;
                writeln!(out, "{message}")?;
                Ok(())
            }
            Command::Move { key, from, to } => self.move_item(key, from, to, out),
            Command::Add { key } => self.add_item(key, out),
            Command::Remove { key, entry } => self.remove_item(key, entry, out),
            Command::Seed { file } => self.seed(file.as_deref(), out),
        }
    }

    fn keys(&self, out: &mut dyn Write) -> Result<()> {
        for key in ProfileKey::ALL {
            let shape = if key.is_list() { "list" } else { "object" };
            writeln!(out, "{:<18}{:<12}{}", key.as_str(), shape, key.label())?;
        }
        Ok(())
    }

    fn get(&self, key: &str, out: &mut dyn Write) -> Result<()> {
        let value = match ProfileKey::parse(key) {
            Some(ProfileKey::Hero) => self.fetch_typed::<HeroData>(key)?,
            Some(ProfileKey::Experiences) => self.fetch_typed::<Vec<Experience>>(key)?,
            Some(ProfileKey::Responsibilities) => self.fetch_typed::<Vec<Responsibility>>(key)?,
            Some(ProfileKey::Education) => self.fetch_typed::<Vec<Education>>(key)?,
            Some(ProfileKey::Projects) => self.fetch_typed::<Vec<Project>>(key)?,
            Some(ProfileKey::Skills) => self.fetch_typed::<Skills>(key)?,
            Some(ProfileKey::Contact) => self.fetch_typed::<ContactData>(key)?,
            None => self.store.load(key, Value::Null).into_value(),
        };
        writeln!(out, "{}", serde_json::to_string_pretty(&value)?)?;
        Ok(())
    }

    fn fetch_typed<T>(&self, key: &str) -> Result<Value>
    where
        T: DeserializeOwned + Serialize + Default,
    {
        let query = self.store.load(key, T::default());
        serde_json::to_value(query.value()).with_context(|| format!("encode {key}"))
    }

    fn dump(&self, out: &mut dyn Write) -> Result<()> {
        let snapshot = self.store.load_all()?;

        let mut documents = Map::new();
        for (key, document) in &snapshot.documents {
            documents.insert(key.as_str().to_owned(), document.to_value()?);
        }
        let unknown = snapshot
            .unknown
            .iter()
            .map(|record| (record.key.clone(), record.value.clone()))
            .collect::<Map<_, _>>();
        let rejected = snapshot
            .rejected
            .iter()
            .map(|rejected| (rejected.key.as_str().to_owned(), json!(rejected.message)))
            .collect::<Map<_, _>>();
        let missing = snapshot
            .missing()
            .into_iter()
            .map(ProfileKey::as_str)
            .collect::<Vec<_>>();

        let report = json!({
            "documents": documents,
            "unknown": unknown,
            "rejected": rejected,
            "missing": missing,
        });
        writeln!(out, "{}", serde_json::to_string_pretty(&report)?)?;
        Ok(())
    }

    // List edits act on what is stored, so a missing record is an error here.
    fn stored_list(&self, key: &str, verb: &str) -> Result<ProfileDocument> {
        let profile_key = ProfileKey::parse(key)
            .filter(|key| key.is_list())
            .ok_or_else(|| {
                anyhow!("{key:?} is not a list; {verb} works on experiences, responsibilities, education, projects")
            })?;
        let raw = self
            .store
            .backend()
            .fetch(key)?
            .ok_or_else(|| anyhow!("no record for {key}; seed it first"))?;
        ProfileDocument::from_value(profile_key, raw)
            .with_context(|| format!("stored {key} does not decode"))
    }

    fn move_item(&self, key: &str, from: &str, to: &str, out: &mut dyn Write) -> Result<()> {
        let document = self.stored_list(key, "move")?;
        let ids = document.item_ids().unwrap_or_default();
        let headings = document.headings().unwrap_or_default();
        let source = resolve_position(from, &headings)?;
        let destination = resolve_position(to, &headings)?;

        let Some(moved) = document.with_moved_item(&ids[source], &ids[destination]) else {
            writeln!(out, "{key}: nothing to move")?;
            return Ok(());
        };
        info!(key, source, destination, "moving list entry");
        let message = self.store.save(&moved)?;
        writeln!(out, "{message}")?;
        Ok(())
    }

    fn add_item(&self, key: &str, out: &mut dyn Write) -> Result<()> {
        let document = self.stored_list(key, "add")?;
        let appended = document
            .with_appended_item()
            .ok_or_else(|| anyhow!("{key} cannot take new entries"))?;
        let message = self.store.save(&appended).with_context(|| {
            format!("new {key} entry is blank; fill its required fields and save with `folio put`")
        })?;
        writeln!(out, "{message}")?;
        Ok(())
    }

    fn remove_item(&self, key: &str, entry: &str, out: &mut dyn Write) -> Result<()> {
        let document = self.stored_list(key, "remove")?;
        let ids = document.item_ids().unwrap_or_default();
        let headings = document.headings().unwrap_or_default();
        let index = resolve_position(entry, &headings)?;
        let remaining = document
            .with_removed_item(&ids[index])
            .ok_or_else(|| anyhow!("no entry {entry:?} in {key}"))?;
        info!(key, index, "removing list entry");
        let message = self.store.save(&remaining)?;
        writeln!(out, "{message}")?;
        Ok(())
    }

    fn seed(&self, file: Option<&Path>, out: &mut dyn Write) -> Result<()> {
        let Some(sqlite) = &self.sqlite else {
            bail!("seed only works with backend.kind = \"sqlite\"; hosted rows are managed by the service");
        };

        let records = match file {
            Some(path) => seed_file_records(path)?,
            None => ProfileKey::ALL
                .into_iter()
                .map(|key| {
                    Ok(ProfileRecord {
                        key: key.as_str().to_owned(),
                        value: ProfileDocument::empty(key).to_value()?,
                    })
                })
                .collect::<Result<Vec<_>>>()?,
        };

        let inserted = sqlite.seed(&records)?;
        if inserted.is_empty() {
            writeln!(out, "all keys already present")?;
        } else {
            writeln!(out, "seeded: {}", inserted.join(", "))?;
        }
        Ok(())
    }
}

// An exact heading wins over a 0-based position.
fn resolve_position(raw: &str, headings: &[&str]) -> Result<usize> {
    if let Some(index) = headings.iter().position(|heading| *heading == raw) {
        return Ok(index);
    }
    if let Ok(index) = raw.parse::<usize>() {
        if index >= headings.len() {
            bail!(
                "position {index} is out of range; the list has {} entries",
                headings.len()
            );
        }
        return Ok(index);
    }
    bail!("no entry titled {raw:?}")
}

fn read_json(path: &Path) -> Result<Value> {
    let raw = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("parse JSON in {}", path.display()))
}

fn seed_file_records(path: &Path) -> Result<Vec<ProfileRecord>> {
    let Value::Object(entries) = read_json(path)? else {
        bail!("{} must hold a JSON object of key: document pairs", path.display());
    };
    entries
        .into_iter()
        .map(|(key, value)| {
            validate_value(&key, &value)
                .with_context(|| format!("seed entry {key} in {}", path.display()))?;
            Ok(ProfileRecord { key, value })
        })
        .collect()
}
