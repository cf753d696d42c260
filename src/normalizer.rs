//! Schema normalization for directory documents
//!
//! Remote directories have been published in several JSON layouts over time.
//! Each entity is parsed into [`RawEntity`], trying the canonical layout first
//! and then each legacy layout in turn, and only then converted into the
//! canonical [`Entity`]. Entities that match no layout are skipped with a
//! warning; normalization itself never fails because of a single entity.

use crate::directory::{ContactKind, ContactRecord, Directory, Entity};
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::{debug, warn};

/// Source reported for vendor documents that do not name one
pub const DEFAULT_VENDOR_SOURCE: &str = "https://docs.virustotal.com/docs/false-positive-contacts";

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ShapeError {
    #[error("expected a JSON object at the top level, found {0}")]
    NotAnObject(&'static str),
}

/// Overall layout of a vendor document
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentShape {
    /// `companies` is non-empty and its first entity already uses typed contact objects
    Canonical,
    /// Anything else; converted entity by entity
    Legacy,
}

/// Detect whether a vendor document is already canonical.
///
/// Only the first entity is inspected: its `contacts` must be a non-empty
/// array whose items are all objects carrying both `type` and `contact`.
pub fn detect_shape(document: &Value) -> DocumentShape {
    let first = document
        .get("companies")
        .and_then(Value::as_object)
        .and_then(|companies| companies.values().next());

    let canonical = first
        .and_then(|entity| entity.get("contacts"))
        .and_then(Value::as_array)
        .is_some_and(|contacts| {
            !contacts.is_empty()
                && contacts.iter().all(|c| {
                    c.get("type").is_some_and(Value::is_string) && c.get("contact").is_some_and(Value::is_string)
                })
        });

    if canonical {
        DocumentShape::Canonical
    } else {
        DocumentShape::Legacy
    }
}

/// Normalize a security vendor document.
///
/// Expects `{ source?, last_updated?, companies: { name: entity } }`. A
/// document without `companies` yields an empty directory.
pub fn normalize_vendor_document(document: Value) -> Result<Directory, ShapeError> {
    let shape = detect_shape(&document);
    let mut envelope = into_object(document)?;

    match shape {
        DocumentShape::Canonical => debug!("Vendor document is already canonical"),
        DocumentShape::Legacy => debug!("Converting legacy vendor document"),
    }

    let mut directory = Directory::new(
        take_string(&mut envelope, "source").unwrap_or_else(|| DEFAULT_VENDOR_SOURCE.to_string()),
        parse_last_updated(take_string(&mut envelope, "last_updated").as_deref()),
    );

    match envelope.remove("companies") {
        Some(Value::Object(companies)) => fill_entities(&mut directory, companies),
        Some(other) => warn!("Vendor document 'companies' is {}, expected an object", json_type(&other)),
        None => warn!("Vendor document has no 'companies' section"),
    }

    Ok(directory)
}

/// Normalize a company document.
///
/// Accepts either the `{ source?, last_updated?, companies }` envelope or a
/// bare name-to-record mapping. `default_source` is used when the document
/// does not name its source.
pub fn normalize_company_document(document: Value, default_source: &str) -> Result<Directory, ShapeError> {
    let mut root = into_object(document)?;

    if matches!(root.get("companies"), Some(Value::Object(_))) {
        let source = take_string(&mut root, "source").unwrap_or_else(|| default_source.to_string());
        let last_updated = parse_last_updated(take_string(&mut root, "last_updated").as_deref());
        let mut directory = Directory::new(source, last_updated);
        if let Some(Value::Object(companies)) = root.remove("companies") {
            fill_entities(&mut directory, companies);
        }
        return Ok(directory);
    }

    let mut directory = Directory::new(default_source, today());
    fill_entities(&mut directory, root);
    Ok(directory)
}

fn fill_entities(directory: &mut Directory, entities: Map<String, Value>) {
    for (name, value) in entities {
        let raw = match RawEntity::deserialize(value) {
            Ok(raw) => raw,
            Err(e) => {
                warn!("Unreadable entry for {}, skipping: {}", name, e);
                continue;
            }
        };
        if let Some(entity) = raw.into_entity(&name) {
            directory.insert(entity);
        }
    }
}

/// One entity in any of the layouts seen in the wild.
///
/// Variant order is the order in which layouts are tried.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawEntity {
    /// `{ type?, message?, contacts: [ { type, contact, description? } ] }`
    Canonical(CanonicalEntity),
    /// `[ "abuse@x.com", "https://x.com/report" ]`; non-string items are skipped
    LegacyList(Vec<RawContact>),
    /// `{ type?, contacts: [ "string" | { type?, contact? } ] }`
    LegacyMixed(MixedEntity),
    /// `{ type, contact, message_pt? }`, the historical company record
    SingleContact(SingleContactEntity),
    Unrecognized(Value),
}

#[derive(Debug, Deserialize)]
struct CanonicalEntity {
    contacts: Vec<CanonicalContact>,
    #[serde(flatten)]
    notes: Notes,
}

#[derive(Debug, Deserialize)]
struct CanonicalContact {
    #[serde(rename = "type")]
    kind: ContactKind,
    contact: String,
    description: Option<String>,
    description_pt: Option<String>,
}

#[derive(Debug, Deserialize)]
struct MixedEntity {
    contacts: Vec<RawContact>,
    #[serde(flatten)]
    notes: Notes,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawContact {
    Text(String),
    Partial(PartialContact),
    Other(Value),
}

#[derive(Debug, Deserialize)]
struct PartialContact {
    #[serde(rename = "type")]
    kind: Option<String>,
    contact: Option<String>,
    description: Option<String>,
    description_pt: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SingleContactEntity {
    #[serde(rename = "type")]
    kind: Option<String>,
    contact: String,
    #[serde(flatten)]
    notes: Notes,
}

/// Optional guidance text, under either its neutral or its localized key
#[derive(Debug, Default, Deserialize)]
struct Notes {
    message: Option<String>,
    message_pt: Option<String>,
}

impl Notes {
    fn into_message(self) -> Option<String> {
        self.message.or(self.message_pt)
    }
}

impl RawEntity {
    fn into_entity(self, name: &str) -> Option<Entity> {
        let (contacts, message) = match self {
            RawEntity::Canonical(entity) => {
                let contacts: Vec<ContactRecord> = entity
                    .contacts
                    .into_iter()
                    .filter_map(|c| {
                        ContactRecord::new(&c.contact, Some(c.kind))
                            .map(|r| r.with_description(c.description.or(c.description_pt)))
                    })
                    .collect();
                (contacts, entity.notes.into_message())
            }
            RawEntity::LegacyList(values) => {
                let contacts: Vec<ContactRecord> = values.into_iter().filter_map(|c| c.into_record(name)).collect();
                (contacts, None)
            }
            RawEntity::LegacyMixed(entity) => {
                let contacts: Vec<ContactRecord> =
                    entity.contacts.into_iter().filter_map(|c| c.into_record(name)).collect();
                (contacts, entity.notes.into_message())
            }
            RawEntity::SingleContact(entity) => {
                let kind = entity.kind.as_deref().and_then(ContactKind::from_label);
                let contacts: Vec<ContactRecord> = ContactRecord::new(&entity.contact, kind).into_iter().collect();
                (contacts, entity.notes.into_message())
            }
            RawEntity::Unrecognized(value) => {
                warn!("Unknown structure for {} ({}), skipping", name, json_type(&value));
                return None;
            }
        };

        match Entity::new(name, contacts) {
            Some(entity) => Some(entity.with_message(message)),
            None => {
                warn!("{} has no usable contacts, skipping", name);
                None
            }
        }
    }
}

impl RawContact {
    fn into_record(self, entity_name: &str) -> Option<ContactRecord> {
        match self {
            RawContact::Text(value) => ContactRecord::new(&value, None),
            RawContact::Partial(partial) => {
                let kind = partial.kind.as_deref().and_then(ContactKind::from_label);
                let value = partial.contact.unwrap_or_default();
                ContactRecord::new(&value, kind)
                    .map(|r| r.with_description(partial.description.or(partial.description_pt)))
            }
            RawContact::Other(value) => {
                debug!("Ignoring {} contact entry for {}", json_type(&value), entity_name);
                None
            }
        }
    }
}

fn into_object(document: Value) -> Result<Map<String, Value>, ShapeError> {
    match document {
        Value::Object(map) => Ok(map),
        other => Err(ShapeError::NotAnObject(json_type(&other))),
    }
}

fn take_string(map: &mut Map<String, Value>, key: &str) -> Option<String> {
    match map.remove(key) {
        Some(Value::String(s)) if !s.trim().is_empty() => Some(s),
        _ => None,
    }
}

/// Accepts `YYYY-MM-DD`, optionally followed by a time part.
fn parse_last_updated(raw: Option<&str>) -> NaiveDate {
    raw.and_then(|s| s.get(..10))
        .and_then(|date| NaiveDate::parse_from_str(date, "%Y-%m-%d").ok())
        .unwrap_or_else(today)
}

fn today() -> NaiveDate {
    chrono::Utc::now().date_naive()
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
