// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, anyhow};
use folio_app::{ProfileDocument, ProfileKey, ProfileRecord};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;
use tracing::{debug, info, warn};

use crate::ProfileBackend;
use crate::validation::{ValidationError, validate_value};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FetchFailure {
    #[error("fetch {key} failed: {message}")]
    Remote { key: String, message: String },
    #[error("no record stored for {key}")]
    Missing { key: String },
    #[error("record for {key} does not decode: {message}")]
    Undecodable { key: String, message: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    Fetched,
    Fallback(FetchFailure),
    Skipped,
}

#[derive(Debug, thiserror::Error)]
pub enum WriteError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("could not encode {key}: {message}")]
    Encode { key: String, message: String },
    #[error("could not save {key}: {message}")]
    Remote { key: String, message: String },
}

#[derive(Debug, Clone)]
pub struct ProfileQuery<T> {
    key: String,
    value: T,
    loading: bool,
}

impl<T: DeserializeOwned> ProfileQuery<T> {
    pub fn new(key: impl Into<String>, default: T) -> Self {
        Self {
            key: key.into(),
            value: default,
            loading: true,
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn value(&self) -> &T {
        &self.value
    }

    pub fn into_value(self) -> T {
        self.value
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn set_value(&mut self, value: T) {
        self.value = value;
    }

    pub fn fetch(&mut self, backend: &dyn ProfileBackend) -> FetchOutcome {
        if !self.loading {
            return FetchOutcome::Skipped;
        }
        debug!(key = %self.key, "fetching profile record");
        let result = backend.fetch(&self.key);
        self.settle(result)
    }

    fn settle(&mut self, result: Result<Option<Value>>) -> FetchOutcome {
        if !self.loading {
            return FetchOutcome::Skipped;
        }
        self.loading = false;

        let decoded = match result {
            Err(error) => Err(FetchFailure::Remote {
                key: self.key.clone(),
                message: format!("{error:#}"),
            }),
            Ok(None) => Err(FetchFailure::Missing {
                key: self.key.clone(),
            }),
            Ok(Some(raw)) => {
                serde_json::from_value::<T>(raw).map_err(|error| FetchFailure::Undecodable {
                    key: self.key.clone(),
                    message: error.to_string(),
                })
            }
        };

        match decoded {
            Ok(value) => {
                self.value = value;
                FetchOutcome::Fetched
            }
            Err(failure) => {
                warn!(key = %self.key, error = %failure, "keeping default profile data");
                FetchOutcome::Fallback(failure)
            }
        }
    }
}

#[derive(Debug)]
pub struct PendingFetch<T> {
    query: ProfileQuery<T>,
    receiver: Receiver<Result<Option<Value>>>,
}

impl<T: DeserializeOwned> PendingFetch<T> {
    pub fn query(&self) -> &ProfileQuery<T> {
        &self.query
    }

    // Returns the outcome once, the first time the worker's result is
    // available. `None` while pending and after settling.
    pub fn try_settle(&mut self) -> Option<FetchOutcome> {
        if !self.query.loading {
            return None;
        }
        match self.receiver.try_recv() {
            Ok(result) => Some(self.query.settle(result)),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => {
                let result = Err(anyhow!("fetch worker for {} exited", self.query.key));
                Some(self.query.settle(result))
            }
        }
    }

    pub fn wait(mut self) -> (ProfileQuery<T>, FetchOutcome) {
        if !self.query.loading {
            return (self.query, FetchOutcome::Skipped);
        }
        let result = self
            .receiver
            .recv()
            .unwrap_or_else(|_| Err(anyhow!("fetch worker for {} exited", self.query.key)));
        let outcome = self.query.settle(result);
        (self.query, outcome)
    }

    pub fn into_query(self) -> ProfileQuery<T> {
        self.query
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RejectedRecord {
    pub key: ProfileKey,
    pub message: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProfileSnapshot {
    pub documents: BTreeMap<ProfileKey, ProfileDocument>,
    pub unknown: Vec<ProfileRecord>,
    pub rejected: Vec<RejectedRecord>,
}

impl ProfileSnapshot {
    pub fn missing(&self) -> Vec<ProfileKey> {
        ProfileKey::ALL
            .into_iter()
            .filter(|key| {
                !self.documents.contains_key(key)
                    && !self.rejected.iter().any(|rejected| rejected.key == *key)
            })
            .collect()
    }
}

#[derive(Clone)]
pub struct ProfileStore {
    backend: Arc<dyn ProfileBackend>,
}

impl ProfileStore {
    pub fn new(backend: Arc<dyn ProfileBackend>) -> Self {
        Self { backend }
    }

    pub fn backend(&self) -> &dyn ProfileBackend {
        self.backend.as_ref()
    }

    pub fn load<T: DeserializeOwned>(&self, key: &str, default: T) -> ProfileQuery<T> {
        let mut query = ProfileQuery::new(key, default);
        query.fetch(self.backend.as_ref());
        query
    }

    pub fn spawn_fetch<T: DeserializeOwned>(&self, query: ProfileQuery<T>) -> PendingFetch<T> {
        let (sender, receiver) = mpsc::channel();
        if query.loading {
            let backend = Arc::clone(&self.backend);
            let key = query.key.clone();
            thread::spawn(move || {
                debug!(key = %key, "fetching profile record in background");
                let _ = sender.send(backend.fetch(&key));
            });
        }
        PendingFetch { query, receiver }
    }

    pub fn save(&self, document: &ProfileDocument) -> Result<String, WriteError> {
        let key = document.key().as_str();
        let value = document.to_value().map_err(|error| WriteError::Encode {
            key: key.to_owned(),
            message: error.to_string(),
        })?;
        self.save_value(key, &value)
    }

    pub fn save_value(&self, key: &str, value: &Value) -> Result<String, WriteError> {
        validate_value(key, value)?;

        debug!(key, "updating profile record");
        self.backend
            .update(key, value)
            .map_err(|error| WriteError::Remote {
                key: key.to_owned(),
                message: format!("{error:#}"),
            })?;

        info!(key, "saved profile record");
        Ok(saved_message(key))
    }

    pub fn load_all(&self) -> Result<ProfileSnapshot> {
        debug!("fetching all profile records");
        let records = self
            .backend
            .fetch_all()
            .context("load profile records")?;

        let mut snapshot = ProfileSnapshot::default();
        for record in records {
            let Some(key) = ProfileKey::parse(&record.key) else {
                snapshot.unknown.push(record);
                continue;
            };
            match ProfileDocument::from_value(key, record.value) {
                Ok(document) => {
                    snapshot.documents.insert(key, document);
                }
                Err(error) => {
                    warn!(key = key.as_str(), %error, "stored profile record does not decode");
                    snapshot.rejected.push(RejectedRecord {
                        key,
                        message: error.to_string(),
                    });
                }
            }
        }
        Ok(snapshot)
    }
}

fn saved_message(key: &str) -> String {
    let mut chars = key.chars();
    match chars.next() {
        Some(first) => format!("{}{} saved!", first.to_uppercase(), chars.as_str()),
        None => "Saved!".to_owned(),
    }
}

#[cfg(test)]
mod tests {
    use super::{FetchFailure, FetchOutcome, ProfileQuery, ProfileStore, saved_message};
    use crate::ProfileBackend;
    use anyhow::{Result, bail};
    use folio_app::{ProfileRecord, Skills};
    use serde_json::{Value, json};
    use std::sync::Arc;

    struct Fixed(Option<Value>);

    impl ProfileBackend for Fixed {
        fn fetch(&self, _key: &str) -> Result<Option<Value>> {
            Ok(self.0.clone())
        }

        fn fetch_all(&self) -> Result<Vec<ProfileRecord>> {
            Ok(Vec::new())
        }

        fn update(&self, key: &str, _value: &Value) -> Result<()> {
            bail!("{key} is read-only")
        }
    }

    #[test]
    fn query_starts_loading_with_default() {
        let query = ProfileQuery::new("skills", Skills::default());
        assert!(query.is_loading());
        assert_eq!(query.value(), &Skills::default());
        assert_eq!(query.key(), "skills");
    }

    #[test]
    fn fetch_settles_once() {
        let backend = Fixed(Some(json!({
            "software": ["vim"],
            "hardware": [],
            "domains": [],
            "programming": ["rust"],
        })));
        let mut query = ProfileQuery::new("skills", Skills::default());

        assert_eq!(query.fetch(&backend), FetchOutcome::Fetched);
        assert!(!query.is_loading());
        assert_eq!(query.value().programming, vec!["rust".to_owned()]);

        assert_eq!(query.fetch(&Fixed(None)), FetchOutcome::Skipped);
        assert_eq!(query.value().software, vec!["vim".to_owned()]);
    }

    #[test]
    fn undecodable_record_keeps_default() {
        let default = Skills {
            software: vec!["default".to_owned()],
            ..Skills::default()
        };
        let mut query = ProfileQuery::new("skills", default.clone());
        let outcome = query.fetch(&Fixed(Some(json!("not an object"))));

        assert!(matches!(
            outcome,
            FetchOutcome::Fallback(FetchFailure::Undecodable { .. })
        ));
        assert_eq!(query.value(), &default);
        assert!(!query.is_loading());
    }

    #[test]
    fn set_value_replaces_edit_buffer() {
        let mut query = ProfileQuery::new("skills", Skills::default());
        query.set_value(Skills {
            domains: vec!["embedded".to_owned()],
            ..Skills::default()
        });
        assert_eq!(query.value().domains, vec!["embedded".to_owned()]);
        assert!(query.is_loading());
    }

    #[test]
    fn spawned_fetch_settles_through_wait() {
        let store = ProfileStore::new(Arc::new(Fixed(None)));
        let pending = store.spawn_fetch(ProfileQuery::new("skills", Skills::default()));
        assert!(pending.query().is_loading());

        let (query, outcome) = pending.wait();
        assert_eq!(
            outcome,
            FetchOutcome::Fallback(FetchFailure::Missing {
                key: "skills".to_owned()
            })
        );
        assert!(!query.is_loading());
    }

    #[test]
    fn saved_message_capitalizes_key() {
        assert_eq!(saved_message("hero"), "Hero saved!");
        assert_eq!(saved_message("projects"), "Projects saved!");
        assert_eq!(saved_message(""), "Saved!");
    }
}
