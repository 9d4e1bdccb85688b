// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::ids::{ItemId, item_identity};
use crate::reorder::{position_of, reorder};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProfileKey {
    Hero,
    Experiences,
    Responsibilities,
    Education,
    Projects,
    Skills,
    Contact,
}

impl ProfileKey {
    pub const ALL: [Self; 7] = [
        Self::Hero,
        Self::Experiences,
        Self::Responsibilities,
        Self::Education,
        Self::Projects,
        Self::Skills,
        Self::Contact,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Hero => "hero",
            Self::Experiences => "experiences",
            Self::Responsibilities => "responsibilities",
            Self::Education => "education",
            Self::Projects => "projects",
            Self::Skills => "skills",
            Self::Contact => "contact",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "hero" => Some(Self::Hero),
            "experiences" => Some(Self::Experiences),
            "responsibilities" => Some(Self::Responsibilities),
            "education" => Some(Self::Education),
            "projects" => Some(Self::Projects),
            "skills" => Some(Self::Skills),
            "contact" => Some(Self::Contact),
            _ => None,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Hero => "Profile",
            Self::Experiences => "Experience",
            Self::Responsibilities => "Positions",
            Self::Education => "Education",
            Self::Projects => "Projects",
            Self::Skills => "Skills",
            Self::Contact => "Contact",
        }
    }

    pub const fn is_list(self) -> bool {
        matches!(
            self,
            Self::Experiences | Self::Responsibilities | Self::Education | Self::Projects
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileRecord {
    pub key: String,
    pub value: Value,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct HeroData {
    pub name: String,
    pub title: String,
    pub summary: String,
    pub email: String,
    pub phone: String,
    pub github: String,
    pub linkedin: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub specialties: Option<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Experience {
    pub title: String,
    pub company: String,
    pub period: String,
    pub achievements: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Responsibility {
    pub title: String,
    pub period: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Education {
    pub degree: String,
    pub institution: String,
    pub period: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coursework: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grade: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Project {
    pub title: String,
    pub period: String,
    pub description: String,
    pub achievements: Vec<String>,
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Skills {
    pub software: Vec<String>,
    pub hardware: Vec<String>,
    pub domains: Vec<String>,
    pub programming: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ContactData {
    pub email: String,
    pub phone: String,
    pub github: String,
    pub linkedin: String,
    pub location: String,
}

pub trait ListEntry {
    fn heading(&self) -> &str;
}

impl ListEntry for Experience {
    fn heading(&self) -> &str {
        &self.title
    }
}

impl ListEntry for Responsibility {
    fn heading(&self) -> &str {
        &self.title
    }
}

impl ListEntry for Education {
    fn heading(&self) -> &str {
        &self.degree
    }
}

impl ListEntry for Project {
    fn heading(&self) -> &str {
        &self.title
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ProfileDocument {
    Hero(HeroData),
    Experiences(Vec<Experience>),
    Responsibilities(Vec<Responsibility>),
    Education(Vec<Education>),
    Projects(Vec<Project>),
    Skills(Skills),
    Contact(ContactData),
}

impl ProfileDocument {
    pub const fn key(&self) -> ProfileKey {
        match self {
            Self::Hero(_) => ProfileKey::Hero,
            Self::Experiences(_) => ProfileKey::Experiences,
            Self::Responsibilities(_) => ProfileKey::Responsibilities,
            Self::Education(_) => ProfileKey::Education,
            Self::Projects(_) => ProfileKey::Projects,
            Self::Skills(_) => ProfileKey::Skills,
            Self::Contact(_) => ProfileKey::Contact,
        }
    }

    pub fn from_value(key: ProfileKey, value: Value) -> serde_json::Result<Self> {
        Ok(match key {
            ProfileKey::Hero => Self::Hero(serde_json::from_value(value)?),
            ProfileKey::Experiences => Self::Experiences(serde_json::from_value(value)?),
            ProfileKey::Responsibilities => Self::Responsibilities(serde_json::from_value(value)?),
            ProfileKey::Education => Self::Education(serde_json::from_value(value)?),
            ProfileKey::Projects => Self::Projects(serde_json::from_value(value)?),
            ProfileKey::Skills => Self::Skills(serde_json::from_value(value)?),
            ProfileKey::Contact => Self::Contact(serde_json::from_value(value)?),
        })
    }

    pub fn empty(key: ProfileKey) -> Self {
        match key {
            ProfileKey::Hero => Self::Hero(HeroData::default()),
            ProfileKey::Experiences => Self::Experiences(Vec::new()),
            ProfileKey::Responsibilities => Self::Responsibilities(Vec::new()),
            ProfileKey::Education => Self::Education(Vec::new()),
            ProfileKey::Projects => Self::Projects(Vec::new()),
            ProfileKey::Skills => Self::Skills(Skills::default()),
            ProfileKey::Contact => Self::Contact(ContactData::default()),
        }
    }

    pub fn to_value(&self) -> serde_json::Result<Value> {
        serde_json::to_value(self)
    }

    pub fn headings(&self) -> Option<Vec<&str>> {
        match self {
            Self::Experiences(items) => Some(headings(items)),
            Self::Responsibilities(items) => Some(headings(items)),
            Self::Education(items) => Some(headings(items)),
            Self::Projects(items) => Some(headings(items)),
            Self::Hero(_) | Self::Skills(_) | Self::Contact(_) => None,
        }
    }

    pub fn item_ids(&self) -> Option<Vec<ItemId>> {
        match self {
            Self::Experiences(items) => Some(identities(items)),
            Self::Responsibilities(items) => Some(identities(items)),
            Self::Education(items) => Some(identities(items)),
            Self::Projects(items) => Some(identities(items)),
            Self::Hero(_) | Self::Skills(_) | Self::Contact(_) => None,
        }
    }

    pub fn with_moved_item(&self, source: &ItemId, destination: &ItemId) -> Option<Self> {
        match self {
            Self::Experiences(items) => {
                moved(items, source, destination).map(Self::Experiences)
            }
            Self::Responsibilities(items) => {
                moved(items, source, destination).map(Self::Responsibilities)
            }
            Self::Education(items) => moved(items, source, destination).map(Self::Education),
            Self::Projects(items) => moved(items, source, destination).map(Self::Projects),
            Self::Hero(_) | Self::Skills(_) | Self::Contact(_) => None,
        }
    }

    pub fn with_appended_item(&self) -> Option<Self> {
        match self {
            Self::Experiences(items) => Some(Self::Experiences(appended(
                items,
                Experience {
                    achievements: vec![String::new()],
                    ..Experience::default()
                },
            ))),
            Self::Responsibilities(items) => Some(Self::Responsibilities(appended(
                items,
                Responsibility::default(),
            ))),
            Self::Education(items) => Some(Self::Education(appended(
                items,
                Education {
                    coursework: Some(Vec::new()),
                    grade: Some(String::new()),
                    ..Education::default()
                },
            ))),
            Self::Projects(items) => Some(Self::Projects(appended(
                items,
                Project {
                    achievements: vec![String::new()],
                    ..Project::default()
                },
            ))),
            Self::Hero(_) | Self::Skills(_) | Self::Contact(_) => None,
        }
    }

    // None when the document is not a list or `id` names no entry.
    pub fn with_removed_item(&self, id: &ItemId) -> Option<Self> {
        match self {
            Self::Experiences(items) => removed(items, id).map(Self::Experiences),
            Self::Responsibilities(items) => removed(items, id).map(Self::Responsibilities),
            Self::Education(items) => removed(items, id).map(Self::Education),
            Self::Projects(items) => removed(items, id).map(Self::Projects),
            Self::Hero(_) | Self::Skills(_) | Self::Contact(_) => None,
        }
    }
}

fn appended<T: Clone>(items: &[T], blank: T) -> Vec<T> {
    let mut next = items.to_vec();
    next.push(blank);
    next
}

fn removed<T: ListEntry + Clone>(items: &[T], id: &ItemId) -> Option<Vec<T>> {
    let index = position_of(items, |item: &T, index| item_identity(item.heading(), index), id)?;
    let mut next = items.to_vec();
    next.remove(index);
    Some(next)
}

fn headings<T: ListEntry>(items: &[T]) -> Vec<&str> {
    items.iter().map(|item| item.heading()).collect()
}

fn identities<T: ListEntry>(items: &[T]) -> Vec<ItemId> {
    items
        .iter()
        .enumerate()
        .map(|(index, item)| item_identity(item.heading(), index))
        .collect()
}

fn moved<T: ListEntry + Clone>(
    items: &[T],
    source: &ItemId,
    destination: &ItemId,
) -> Option<Vec<T>> {
    reorder(
        items,
        |item: &T, index| item_identity(item.heading(), index),
        source,
        destination,
    )
}

#[cfg(test)]
mod tests {
    use super::{Education, Experience, HeroData, ProfileDocument, ProfileKey, Project, Skills};
    use crate::ItemId;
    use serde_json::json;

    #[test]
    fn profile_key_parse_round_trip() {
        for key in ProfileKey::ALL {
            assert_eq!(ProfileKey::parse(key.as_str()), Some(key));
        }
        assert_eq!(ProfileKey::parse("resume"), None);
    }

    #[test]
    fn only_sequence_documents_are_lists() {
        let lists = ProfileKey::ALL
            .into_iter()
            .filter(|key| key.is_list())
            .collect::<Vec<_>>();
        assert_eq!(
            lists,
            vec![
                ProfileKey::Experiences,
                ProfileKey::Responsibilities,
                ProfileKey::Education,
                ProfileKey::Projects,
            ]
        );
    }

    #[test]
    fn hero_without_specialties_decodes() {
        let value = json!({
            "name": "Ada",
            "title": "Engineer",
            "summary": "",
            "email": "ada@example.com",
            "phone": "",
            "github": "",
            "linkedin": "",
        });
        let document =
            ProfileDocument::from_value(ProfileKey::Hero, value).expect("hero should decode");
        let ProfileDocument::Hero(hero) = document else {
            panic!("expected hero document");
        };
        assert_eq!(hero.name, "Ada");
        assert!(hero.specialties.is_none());
    }

    #[test]
    fn to_value_omits_absent_optional_fields() {
        let document = ProfileDocument::Education(vec![Education {
            degree: "BSc".to_owned(),
            institution: "Uni".to_owned(),
            period: "2010".to_owned(),
            coursework: None,
            grade: None,
        }]);
        let value = document.to_value().expect("encode education");
        assert_eq!(
            value,
            json!([{ "degree": "BSc", "institution": "Uni", "period": "2010" }])
        );
    }

    #[test]
    fn wrong_shape_is_a_decode_error() {
        let error = ProfileDocument::from_value(ProfileKey::Skills, json!(["rust"]))
            .expect_err("array is not a skills object");
        assert!(error.to_string().contains("invalid type"));
    }

    #[test]
    fn with_moved_item_reorders_list_documents() {
        let experience = |title: &str| Experience {
            title: title.to_owned(),
            ..Experience::default()
        };
        let document = ProfileDocument::Experiences(vec![
            experience("A"),
            experience("B"),
            experience("C"),
        ]);
        let ids = document.item_ids().expect("experiences is a list");
        assert_eq!(ids[2], ItemId::from("C-2"));

        let moved = document
            .with_moved_item(&ids[2], &ids[0])
            .expect("move should apply");
        let ProfileDocument::Experiences(items) = moved else {
            panic!("expected experiences");
        };
        let titles = items.iter().map(|item| item.title.as_str()).collect::<Vec<_>>();
        assert_eq!(titles, vec!["C", "A", "B"]);
    }

    #[test]
    fn with_moved_item_ignores_single_object_documents() {
        let hero = ProfileDocument::Hero(HeroData::default());
        assert!(hero.item_ids().is_none());
        assert!(
            hero.with_moved_item(&ItemId::from("a"), &ItemId::from("b"))
                .is_none()
        );

        let skills = ProfileDocument::Skills(Skills::default());
        assert_eq!(skills.key(), ProfileKey::Skills);
        assert!(skills.headings().is_none());
    }

    #[test]
    fn empty_documents_match_their_key() {
        for key in ProfileKey::ALL {
            let document = ProfileDocument::empty(key);
            assert_eq!(document.key(), key);
            assert_eq!(document.headings().map(|items| items.len()), key.is_list().then_some(0));
        }
    }

    #[test]
    fn education_headings_use_degree() {
        let document = ProfileDocument::Education(vec![Education {
            degree: "BSc".to_owned(),
            ..Education::default()
        }]);
        assert_eq!(document.headings(), Some(vec!["BSc"]));
        assert_eq!(document.item_ids(), Some(vec![ItemId::from("BSc-0")]));
    }

    #[test]
    fn with_appended_item_adds_blank_entry_per_list() {
        let projects = ProfileDocument::Projects(vec![Project {
            title: "A".to_owned(),
            ..Project::default()
        }]);
        let ProfileDocument::Projects(items) = projects
            .with_appended_item()
            .expect("projects is a list")
        else {
            panic!("expected projects");
        };
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].title, "A");
        assert_eq!(items[1].achievements, vec![String::new()]);
        assert!(items[1].tags.is_empty());

        let education = ProfileDocument::empty(ProfileKey::Education)
            .with_appended_item()
            .expect("education is a list");
        assert_eq!(
            education.to_value().expect("encode education"),
            json!([{
                "degree": "",
                "institution": "",
                "period": "",
                "coursework": [],
                "grade": "",
            }])
        );

        assert!(ProfileDocument::empty(ProfileKey::Contact).with_appended_item().is_none());
    }

    #[test]
    fn with_removed_item_drops_only_the_named_entry() {
        let experience = |title: &str| Experience {
            title: title.to_owned(),
            ..Experience::default()
        };
        let document = ProfileDocument::Experiences(vec![
            experience("A"),
            experience("B"),
            experience("A"),
        ]);

        let ProfileDocument::Experiences(items) = document
            .with_removed_item(&ItemId::from("A-2"))
            .expect("A-2 exists")
        else {
            panic!("expected experiences");
        };
        let titles = items.iter().map(|item| item.title.as_str()).collect::<Vec<_>>();
        assert_eq!(titles, vec!["A", "B"]);
    }

    #[test]
    fn with_removed_item_ignores_unknown_ids() {
        let document = ProfileDocument::Projects(vec![Project {
            title: "A".to_owned(),
            ..Project::default()
        }]);
        assert!(document.with_removed_item(&ItemId::from("A-1")).is_none());
        assert!(document.with_removed_item(&ItemId::from("Z-0")).is_none());
        assert!(
            ProfileDocument::empty(ProfileKey::Hero)
                .with_removed_item(&ItemId::from("A-0"))
                .is_none()
        );
    }
}
