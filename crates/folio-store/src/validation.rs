// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use folio_app::ProfileKey;
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{field}: {message}")]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

impl ValidationError {
    fn new(field: &str, message: impl Into<String>) -> Self {
        Self {
            field: field.to_owned(),
            message: message.into(),
        }
    }
}

pub type ValidationResult<T> = std::result::Result<T, ValidationError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextFormat {
    Email(&'static str),
    UrlOrEmpty(&'static str),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextRule {
    pub required: Option<&'static str>,
    pub format: Option<TextFormat>,
    pub max: usize,
    pub too_long: &'static str,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    pub name: &'static str,
    pub optional: bool,
    pub schema: Schema,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Schema {
    Text(TextRule),
    List {
        item: Box<Schema>,
        max: usize,
        too_many: &'static str,
    },
    Object(Vec<Field>),
}

impl Schema {
    pub fn check(&self, path: &str, value: &Value) -> ValidationResult<()> {
        match self {
            Self::Text(rule) => check_text(rule, path, value),
            Self::List {
                item,
                max,
                too_many,
            } => {
                let Value::Array(items) = value else {
                    return Err(type_error(path, "array", value));
                };
                if items.len() > *max {
                    return Err(ValidationError::new(path, *too_many));
                }
                for (index, entry) in items.iter().enumerate() {
                    item.check(&format!("{path}[{index}]"), entry)?;
                }
                Ok(())
            }
            Self::Object(fields) => {
                let Value::Object(map) = value else {
                    return Err(type_error(path, "object", value));
                };
                for field in fields {
                    let field_path = format!("{path}.{}", field.name);
                    match map.get(field.name) {
                        None if field.optional => {}
                        None => return Err(ValidationError::new(&field_path, "Required")),
                        Some(entry) => field.schema.check(&field_path, entry)?,
                    }
                }
                Ok(())
            }
        }
    }
}

pub fn schema_for(key: &str) -> Option<Schema> {
    ProfileKey::parse(key).map(catalogue_schema)
}

pub fn validate_value(key: &str, value: &Value) -> ValidationResult<()> {
    match schema_for(key) {
        Some(schema) => schema.check(key, value),
        None => Ok(()),
    }
}

pub fn catalogue_schema(key: ProfileKey) -> Schema {
    match key {
        ProfileKey::Hero => Schema::Object(vec![
            field("name", required_text("Name is required", 100, "Name must be less than 100 characters")),
            field("title", required_text("Title is required", 200, "Title must be less than 200 characters")),
            field("summary", text(2000, "Summary must be less than 2000 characters")),
            field("email", email()),
            field("phone", text(30, "Phone must be less than 30 characters")),
            field("github", url_or_empty("Invalid GitHub URL")),
            field("linkedin", url_or_empty("Invalid LinkedIn URL")),
            optional(
                "specialties",
                list(
                    text(50, "Specialty must be less than 50 characters"),
                    20,
                    "Maximum 20 specialties allowed",
                ),
            ),
        ]),
        ProfileKey::Experiences => list(
            Schema::Object(vec![
                field("title", required_text("Title is required", 200, "Title must be less than 200 characters")),
                field("company", required_text("Company is required", 200, "Company must be less than 200 characters")),
                field("period", text(100, "Period must be less than 100 characters")),
                field("achievements", achievements()),
            ]),
            50,
            "Maximum 50 experiences allowed",
        ),
        ProfileKey::Responsibilities => list(
            Schema::Object(vec![
                field("title", required_text("Title is required", 200, "Title must be less than 200 characters")),
                field("period", text(100, "Period must be less than 100 characters")),
                field("description", text(2000, "Description must be less than 2000 characters")),
            ]),
            50,
            "Maximum 50 responsibilities allowed",
        ),
        ProfileKey::Education => list(
            Schema::Object(vec![
                field("degree", required_text("Degree is required", 200, "Degree must be less than 200 characters")),
                field(
                    "institution",
                    required_text("Institution is required", 200, "Institution must be less than 200 characters"),
                ),
                field("period", text(100, "Period must be less than 100 characters")),
                optional(
                    "coursework",
                    list(
                        text(100, "Coursework item must be less than 100 characters"),
                        30,
                        "Maximum 30 coursework items allowed",
                    ),
                ),
                optional("grade", text(50, "Grade must be less than 50 characters")),
            ]),
            20,
            "Maximum 20 education entries allowed",
        ),
        ProfileKey::Projects => list(
            Schema::Object(vec![
                field("title", required_text("Title is required", 200, "Title must be less than 200 characters")),
                field("period", text(100, "Period must be less than 100 characters")),
                field("description", text(2000, "Description must be less than 2000 characters")),
                field("achievements", achievements()),
                field(
                    "tags",
                    list(text(50, "Tag must be less than 50 characters"), 50, "Maximum 50 tags allowed"),
                ),
            ]),
            50,
            "Maximum 50 projects allowed",
        ),
        ProfileKey::Skills => Schema::Object(vec![
            field("software", skill_list("Skill must be less than 100 characters", "Maximum 50 skills allowed")),
            field("hardware", skill_list("Skill must be less than 100 characters", "Maximum 50 skills allowed")),
            field("domains", skill_list("Domain must be less than 100 characters", "Maximum 50 domains allowed")),
            field(
                "programming",
                skill_list("Language must be less than 100 characters", "Maximum 50 languages allowed"),
            ),
        ]),
        ProfileKey::Contact => Schema::Object(vec![
            field("email", email()),
            field("phone", text(30, "Phone must be less than 30 characters")),
            field("github", url_or_empty("Invalid GitHub URL")),
            field("linkedin", url_or_empty("Invalid LinkedIn URL")),
            field("location", text(200, "Location must be less than 200 characters")),
        ]),
    }
}

fn field(name: &'static str, schema: Schema) -> Field {
    Field {
        name,
        optional: false,
        schema,
    }
}

fn optional(name: &'static str, schema: Schema) -> Field {
    Field {
        name,
        optional: true,
        schema,
    }
}

fn text(max: usize, too_long: &'static str) -> Schema {
    Schema::Text(TextRule {
        required: None,
        format: None,
        max,
        too_long,
    })
}

fn required_text(required: &'static str, max: usize, too_long: &'static str) -> Schema {
    Schema::Text(TextRule {
        required: Some(required),
        format: None,
        max,
        too_long,
    })
}

fn email() -> Schema {
    Schema::Text(TextRule {
        required: None,
        format: Some(TextFormat::Email("Invalid email address")),
        max: 255,
        too_long: "Email must be less than 255 characters",
    })
}

fn url_or_empty(invalid: &'static str) -> Schema {
    Schema::Text(TextRule {
        required: None,
        format: Some(TextFormat::UrlOrEmpty(invalid)),
        max: 500,
        too_long: "URL must be less than 500 characters",
    })
}

fn list(item: Schema, max: usize, too_many: &'static str) -> Schema {
    Schema::List {
        item: Box::new(item),
        max,
        too_many,
    }
}

fn achievements() -> Schema {
    list(
        text(500, "Achievement must be less than 500 characters"),
        20,
        "Maximum 20 achievements allowed",
    )
}

fn skill_list(too_long: &'static str, too_many: &'static str) -> Schema {
    list(text(100, too_long), 50, too_many)
}

fn check_text(rule: &TextRule, path: &str, value: &Value) -> ValidationResult<()> {
    let Value::String(text) = value else {
        return Err(type_error(path, "string", value));
    };
    let length = text.chars().count();

    if let Some(required) = rule.required
        && length == 0
    {
        return Err(ValidationError::new(path, required));
    }

    match rule.format {
        Some(TextFormat::Email(invalid)) if !is_email(text) => {
            return Err(ValidationError::new(path, invalid));
        }
        Some(TextFormat::UrlOrEmpty(invalid)) if !text.is_empty() && url::Url::parse(text).is_err() => {
            return Err(ValidationError::new(path, invalid));
        }
        _ => {}
    }

    if length > rule.max {
        return Err(ValidationError::new(path, rule.too_long));
    }
    Ok(())
}

fn type_error(path: &str, expected: &str, value: &Value) -> ValidationError {
    let received = match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    };
    ValidationError::new(path, format!("Expected {expected}, received {received}"))
}

fn is_email(input: &str) -> bool {
    let Some((local, domain)) = input.rsplit_once('@') else {
        return false;
    };
    if local.is_empty() || local.starts_with('.') || local.ends_with('.') || local.contains("..") {
        return false;
    }
    if !local
        .chars()
        .all(|ch| ch.is_ascii_alphanumeric() || matches!(ch, '_' | '\'' | '+' | '-' | '.'))
    {
        return false;
    }
    if !local.ends_with(|ch: char| ch.is_ascii_alphanumeric() || matches!(ch, '_' | '+' | '-')) {
        return false;
    }

    let labels = domain.split('.').collect::<Vec<_>>();
    let Some((tld, hosts)) = labels.split_last() else {
        return false;
    };
    if hosts.is_empty() || tld.len() < 2 || !tld.chars().all(|ch| ch.is_ascii_alphabetic()) {
        return false;
    }
    hosts.iter().all(|label| {
        label.starts_with(|ch: char| ch.is_ascii_alphanumeric())
            && label.chars().all(|ch| ch.is_ascii_alphanumeric() || ch == '-')
    })
}
