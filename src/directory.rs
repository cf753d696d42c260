//! Canonical contact model shared by both directories
//!
//! Every loader converges to [`Directory`]: a named set of [`Entity`] records,
//! each carrying one or more [`ContactRecord`]s.

use chrono::NaiveDate;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// How a contact is reached
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ContactKind {
    Email,
    Form,
}

impl ContactKind {
    /// Best-effort classification of a raw contact string.
    ///
    /// URLs are web forms; everything else is treated as an e-mail address.
    pub fn classify(value: &str) -> Self {
        if value.starts_with("http://") || value.starts_with("https://") {
            ContactKind::Form
        } else {
            ContactKind::Email
        }
    }

    /// Parse an explicit wire `type`. Unknown labels yield `None`.
    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim().to_ascii_lowercase().as_str() {
            "email" => Some(ContactKind::Email),
            "form" => Some(ContactKind::Form),
            _ => None,
        }
    }
}

impl fmt::Display for ContactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContactKind::Email => write!(f, "email"),
            ContactKind::Form => write!(f, "form"),
        }
    }
}

/// Summary of the contact kinds an entity offers
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum Classification {
    Email,
    Form,
    Multiple,
}

impl Classification {
    /// Derive the classification from a sequence of contact kinds.
    ///
    /// Both kinds present gives `Multiple`, forms only gives `Form`, anything
    /// else (including no contacts at all) gives `Email`.
    pub fn from_kinds<I>(kinds: I) -> Self
    where
        I: IntoIterator<Item = ContactKind>,
    {
        let (mut email, mut form) = (false, false);
        for kind in kinds {
            match kind {
                ContactKind::Email => email = true,
                ContactKind::Form => form = true,
            }
        }
        match (email, form) {
            (true, true) => Classification::Multiple,
            (false, true) => Classification::Form,
            _ => Classification::Email,
        }
    }
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Classification::Email => write!(f, "email"),
            Classification::Form => write!(f, "form"),
            Classification::Multiple => write!(f, "multiple"),
        }
    }
}

/// A single way of reporting to an entity
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ContactRecord {
    #[serde(rename = "type")]
    pub kind: ContactKind,
    #[serde(rename = "contact")]
    pub value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl ContactRecord {
    /// Build a record from a raw value, classifying it unless `kind` is given.
    /// Returns `None` when the value is blank.
    pub fn new(value: &str, kind: Option<ContactKind>) -> Option<Self> {
        let value = value.trim();
        if value.is_empty() {
            return None;
        }
        Some(Self {
            kind: kind.unwrap_or_else(|| ContactKind::classify(value)),
            value: value.to_string(),
            description: None,
        })
    }

    pub fn with_description(mut self, description: Option<String>) -> Self {
        self.description = description.filter(|d| !d.trim().is_empty());
        self
    }
}

/// A company or vendor with its report contacts
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entity {
    pub name: String,
    pub classification: Classification,
    pub contacts: Vec<ContactRecord>,
    /// Free-text guidance shown alongside the contacts
    pub message: Option<String>,
}

impl Entity {
    /// Build an entity, deriving its classification from `contacts`.
    /// Returns `None` when there is nothing to contact or the name is blank.
    pub fn new(name: impl Into<String>, contacts: Vec<ContactRecord>) -> Option<Self> {
        let name = name.into();
        let name = name.trim();
        if contacts.is_empty() || name.is_empty() {
            return None;
        }
        Some(Self {
            name: name.to_string(),
            classification: Classification::from_kinds(contacts.iter().map(|c| c.kind)),
            contacts,
            message: None,
        })
    }

    pub fn with_message(mut self, message: Option<String>) -> Self {
        self.message = message.filter(|m| !m.trim().is_empty());
        self
    }

    pub fn emails(&self) -> impl Iterator<Item = &ContactRecord> {
        self.contacts.iter().filter(|c| c.kind == ContactKind::Email)
    }

    pub fn forms(&self) -> impl Iterator<Item = &ContactRecord> {
        self.contacts.iter().filter(|c| c.kind == ContactKind::Form)
    }
}

/// The full set of entities returned by a loader
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Directory {
    pub source_url: String,
    pub last_updated: NaiveDate,
    /// Keyed by entity name, in source document order
    pub entities: IndexMap<String, Entity>,
}

impl Directory {
    pub fn new(source_url: impl Into<String>, last_updated: NaiveDate) -> Self {
        Self {
            source_url: source_url.into(),
            last_updated,
            entities: IndexMap::new(),
        }
    }

    /// Insert an entity under its own name, replacing any previous entry.
    pub fn insert(&mut self, entity: Entity) {
        self.entities.insert(entity.name.clone(), entity);
    }

    pub fn get(&self, name: &str) -> Option<&Entity> {
        self.entities.get(name)
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Entity> {
        self.entities.values()
    }

    /// Canonical wire representation.
    ///
    /// Feeding this value back through the vendor normalizer yields an equal
    /// directory.
    pub fn to_wire(&self) -> serde_json::Value {
        let companies: serde_json::Map<String, serde_json::Value> = self
            .entities
            .iter()
            .map(|(name, entity)| {
                let mut record = serde_json::Map::new();
                record.insert("type".to_string(), serde_json::json!(entity.classification));
                if let Some(message) = &entity.message {
                    record.insert("message".to_string(), serde_json::json!(message));
                }
                record.insert("contacts".to_string(), serde_json::json!(entity.contacts));
                (name.clone(), serde_json::Value::Object(record))
            })
            .collect();

        serde_json::json!({
            "source": self.source_url,
            "last_updated": self.last_updated.format("%Y-%m-%d").to_string(),
            "companies": companies,
        })
    }
}
