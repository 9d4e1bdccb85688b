// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, anyhow, bail};
use folio_app::{
    ContactData, Education, Experience, HeroData, ProfileDocument, ProfileKey, ProfileRecord,
    Project, Responsibility, Skills,
};
use folio_store::ProfileBackend;
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::{Mutex, MutexGuard};

const TAGS: [&str; 14] = [
    "rust",
    "embedded",
    "fpga",
    "pcb",
    "rtos",
    "linux",
    "robotics",
    "sensors",
    "cad",
    "python",
    "networking",
    "firmware",
    "testing",
    "ci",
];

const VERBS: [&str; 10] = [
    "Designed",
    "Built",
    "Shipped",
    "Led",
    "Reduced",
    "Automated",
    "Prototyped",
    "Validated",
    "Migrated",
    "Documented",
];

const NOUNS: [&str; 10] = [
    "motor controller",
    "sensor array",
    "test harness",
    "build pipeline",
    "telemetry link",
    "power stage",
    "bootloader",
    "flight log parser",
    "calibration rig",
    "device driver",
];

const COMPANIES: [&str; 8] = [
    "Northwind Robotics",
    "Helix Labs",
    "Orbital Works",
    "Quarry Systems",
    "Lumen Devices",
    "Tidewater Instruments",
    "Arcadia Motion",
    "Kestrel Avionics",
];

#[derive(Debug, Clone)]
struct DeterministicRng {
    state: u64,
}

impl DeterministicRng {
    fn new(seed: u64) -> Self {
        let mut state = seed ^ 0x9E37_79B9_7F4A_7C15;
        if state == 0 {
            state = 0xA409_3822_299F_31D0;
        }
        Self { state }
    }

    fn next_u64(&mut self) -> u64 {
        self.state = self
            .state
            .wrapping_mul(6_364_136_223_846_793_005)
            .wrapping_add(1_442_695_040_888_963_407);

        let mut x = self.state;
        x ^= x >> 13;
        x ^= x << 7;
        x ^= x >> 17;
        x
    }

    fn int_n(&mut self, n: usize) -> usize {
        if n <= 1 {
            return 0;
        }
        (self.next_u64() % (n as u64)) as usize
    }
}

#[derive(Debug, Clone)]
pub struct PortfolioFaker {
    rng: DeterministicRng,
}

impl PortfolioFaker {
    pub fn new(seed: u64) -> Self {
        let normalized = if seed == 0 { 1 } else { seed };
        Self {
            rng: DeterministicRng::new(normalized),
        }
    }

    pub fn project(&mut self, tag_count: usize) -> Project {
        let year = 2015 + self.rng.int_n(10);
        Project {
            title: format!("{} {}", self.pick(&VERBS), self.pick(&NOUNS)),
            period: format!("{year} - {}", year + 1),
            description: self.sentence(),
            achievements: vec![self.sentence(), self.sentence()],
            tags: (0..tag_count)
                .map(|index| format!("{}-{index}", self.pick(&TAGS)))
                .collect(),
        }
    }

    pub fn experience(&mut self) -> Experience {
        let year = 2012 + self.rng.int_n(12);
        Experience {
            title: format!("{} Engineer", self.pick(&["Hardware", "Firmware", "Systems"])),
            company: self.pick(&COMPANIES).to_owned(),
            period: format!("{year} - {}", year + 2),
            achievements: vec![self.sentence()],
        }
    }

    fn pick<'a>(&mut self, items: &'a [&'a str]) -> &'a str {
        items[self.rng.int_n(items.len())]
    }

    fn sentence(&mut self) -> String {
        format!("{} the {}.", self.pick(&VERBS), self.pick(&NOUNS))
    }
}

pub fn hero() -> HeroData {
    HeroData {
        name: "Ada Lovelace".to_owned(),
        title: "Hardware & Systems Engineer".to_owned(),
        summary: "Builds instruments, firmware and the tooling around them.".to_owned(),
        email: "ada@example.com".to_owned(),
        phone: "+44 20 7946 0000".to_owned(),
        github: "https://github.com/ada".to_owned(),
        linkedin: "https://www.linkedin.com/in/ada".to_owned(),
        specialties: Some(vec![
            "Embedded systems".to_owned(),
            "Signal processing".to_owned(),
        ]),
    }
}

pub fn experiences() -> Vec<Experience> {
    vec![
        Experience {
            title: "Senior Firmware Engineer".to_owned(),
            company: "Northwind Robotics".to_owned(),
            period: "2021 - Present".to_owned(),
            achievements: vec!["Cut boot time by 40%".to_owned()],
        },
        Experience {
            title: "Hardware Engineer".to_owned(),
            company: "Helix Labs".to_owned(),
            period: "2017 - 2021".to_owned(),
            achievements: vec!["Brought three boards to production".to_owned()],
        },
    ]
}

pub fn responsibilities() -> Vec<Responsibility> {
    vec![Responsibility {
        title: "Lab Safety Officer".to_owned(),
        period: "2019 - 2021".to_owned(),
        description: "Ran inductions and audits for the electronics lab.".to_owned(),
    }]
}

pub fn education() -> Vec<Education> {
    vec![Education {
        degree: "MEng Electronic Engineering".to_owned(),
        institution: "University of Example".to_owned(),
        period: "2013 - 2017".to_owned(),
        coursework: Some(vec!["Control Systems".to_owned(), "VLSI".to_owned()]),
        grade: Some("First".to_owned()),
    }]
}

pub fn projects() -> Vec<Project> {
    ["A", "B", "C", "D"]
        .into_iter()
        .map(|title| Project {
            title: title.to_owned(),
            period: "2024".to_owned(),
            description: format!("Project {title}"),
            achievements: Vec::new(),
            tags: vec!["rust".to_owned()],
        })
        .collect()
}

pub fn skills() -> Skills {
    Skills {
        software: vec!["KiCad".to_owned(), "Git".to_owned()],
        hardware: vec!["Oscilloscope".to_owned()],
        domains: vec!["Robotics".to_owned()],
        programming: vec!["Rust".to_owned(), "C".to_owned()],
    }
}

pub fn contact() -> ContactData {
    ContactData {
        email: "ada@example.com".to_owned(),
        phone: "+44 20 7946 0000".to_owned(),
        github: "https://github.com/ada".to_owned(),
        linkedin: String::new(),
        location: "London, UK".to_owned(),
    }
}

pub fn document(key: ProfileKey) -> ProfileDocument {
    match key {
        ProfileKey::Hero => ProfileDocument::Hero(hero()),
        ProfileKey::Experiences => ProfileDocument::Experiences(experiences()),
        ProfileKey::Responsibilities => ProfileDocument::Responsibilities(responsibilities()),
        ProfileKey::Education => ProfileDocument::Education(education()),
        ProfileKey::Projects => ProfileDocument::Projects(projects()),
        ProfileKey::Skills => ProfileDocument::Skills(skills()),
        ProfileKey::Contact => ProfileDocument::Contact(contact()),
    }
}

pub fn seed_records() -> Result<Vec<ProfileRecord>> {
    ProfileKey::ALL
        .into_iter()
        .map(|key| {
            let value = document(key)
                .to_value()
                .with_context(|| format!("encode fixture {}", key.as_str()))?;
            Ok(ProfileRecord {
                key: key.as_str().to_owned(),
                value,
            })
        })
        .collect()
}

pub fn temp_db_path() -> Result<(tempfile::TempDir, PathBuf)> {
    let dir = tempfile::tempdir().context("create temp dir")?;
    let db_path = dir.path().join("folio.db");
    Ok((dir, db_path))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendCall {
    Fetch(String),
    FetchAll,
    Update(String),
}

#[derive(Debug, Default)]
struct MemoryState {
    records: BTreeMap<String, Value>,
    calls: Vec<BackendCall>,
    fail_with: Option<String>,
}

#[derive(Debug, Default)]
pub struct MemoryBackend {
    state: Mutex<MemoryState>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seeded() -> Result<Self> {
        let backend = Self::new();
        for record in seed_records()? {
            backend.insert(&record.key, record.value)?;
        }
        Ok(backend)
    }

    pub fn insert(&self, key: &str, value: Value) -> Result<()> {
        self.lock()?.records.insert(key.to_owned(), value);
        Ok(())
    }

    pub fn record(&self, key: &str) -> Result<Option<Value>> {
        Ok(self.lock()?.records.get(key).cloned())
    }

    pub fn fail_with(&self, message: &str) -> Result<()> {
        self.lock()?.fail_with = Some(message.to_owned());
        Ok(())
    }

    pub fn clear_failure(&self) -> Result<()> {
        self.lock()?.fail_with = None;
        Ok(())
    }

    pub fn calls(&self) -> Result<Vec<BackendCall>> {
        Ok(self.lock()?.calls.clone())
    }

    pub fn update_count(&self) -> Result<usize> {
        Ok(self
            .lock()?
            .calls
            .iter()
            .filter(|call| matches!(call, BackendCall::Update(_)))
            .count())
    }

    fn lock(&self) -> Result<MutexGuard<'_, MemoryState>> {
        self.state
            .lock()
            .map_err(|_| anyhow!("memory backend lock poisoned"))
    }
}

impl ProfileBackend for MemoryBackend {
    fn fetch(&self, key: &str) -> Result<Option<Value>> {
        let mut state = self.lock()?;
        state.calls.push(BackendCall::Fetch(key.to_owned()));
        if let Some(message) = &state.fail_with {
            bail!("{message}");
        }
        Ok(state.records.get(key).cloned())
    }

    fn fetch_all(&self) -> Result<Vec<ProfileRecord>> {
        let mut state = self.lock()?;
        state.calls.push(BackendCall::FetchAll);
        if let Some(message) = &state.fail_with {
            bail!("{message}");
        }
        Ok(state
            .records
            .iter()
            .map(|(key, value)| ProfileRecord {
                key: key.clone(),
                value: value.clone(),
            })
            .collect())
    }

    fn update(&self, key: &str, value: &Value) -> Result<()> {
        let mut state = self.lock()?;
        state.calls.push(BackendCall::Update(key.to_owned()));
        if let Some(message) = &state.fail_with {
            bail!("{message}");
        }
        match state.records.get_mut(key) {
            Some(stored) => {
                *stored = value.clone();
                Ok(())
            }
            None => bail!("no record for key `{key}`"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{BackendCall, MemoryBackend, PortfolioFaker, document, seed_records};
    use folio_app::ProfileKey;
    use folio_store::{ProfileBackend, validate_value};
    use serde_json::json;

    #[test]
    fn faker_is_deterministic() {
        let mut left = PortfolioFaker::new(42);
        let mut right = PortfolioFaker::new(42);
        assert_eq!(left.project(3), right.project(3));
        assert_eq!(left.experience(), right.experience());
    }

    #[test]
    fn faker_honours_tag_count() {
        let mut faker = PortfolioFaker::new(7);
        assert_eq!(faker.project(51).tags.len(), 51);
        assert!(faker.project(0).tags.is_empty());
    }

    #[test]
    fn fixtures_cover_catalogue_and_validate() {
        let records = seed_records().expect("fixtures encode");
        assert_eq!(records.len(), ProfileKey::ALL.len());
        for record in &records {
            assert_eq!(
                validate_value(&record.key, &record.value),
                Ok(()),
                "key {}",
                record.key
            );
        }
        assert_eq!(document(ProfileKey::Skills).key(), ProfileKey::Skills);
    }

    #[test]
    fn memory_backend_is_update_only() {
        let backend = MemoryBackend::new();
        backend.insert("hero", json!({})).expect("insert");

        backend
            .update("hero", &json!({ "name": "Ada" }))
            .expect("existing key updates");
        backend
            .update("contact", &json!({}))
            .expect_err("missing key should fail");
        assert_eq!(backend.record("contact").expect("read"), None);
        assert_eq!(
            backend.calls().expect("calls"),
            vec![
                BackendCall::Update("hero".to_owned()),
                BackendCall::Update("contact".to_owned()),
            ]
        );
    }

    #[test]
    fn memory_backend_failure_injection() {
        let backend = MemoryBackend::seeded().expect("seeded");
        backend.fail_with("service unavailable").expect("arm");
        let error = backend.fetch("hero").expect_err("armed failure");
        assert_eq!(error.to_string(), "service unavailable");

        backend.clear_failure().expect("disarm");
        assert!(backend.fetch("hero").expect("fetch").is_some());
    }
}
