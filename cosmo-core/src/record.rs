//! The analysis record.
//!
//! A [`Record`] holds four fixed categories, each an ordered set of string
//! fields. Every field is always a `String` (possibly empty), so a record that
//! exists is always complete. Payloads coming from outside (the analysis
//! service, durable storage) are applied through [`Record::fill`], which only
//! touches fields that are actually present.

use chrono::{DateTime, Utc};
use cosmo_macros::CategoryFields;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Label written into every export envelope.
pub const EXPORT_SOURCE: &str = "CosmoSorter · Demo Workspace";

/// Format version written into every export envelope.
pub const EXPORT_VERSION: &str = "1.0.0";

/// Field table and by-name access for one record category.
///
/// Implemented through `#[derive(CategoryFields)]`.
pub trait CategoryFields {
    /// Key of the category in JSON payloads.
    const KEY: &'static str;

    /// Wire names of the fields, in display order.
    const FIELDS: &'static [&'static str];

    /// Look up a field by wire name or Rust name.
    fn field(&self, name: &str) -> Option<&str>;

    /// Mutable lookup by wire name or Rust name.
    fn field_mut(&mut self, name: &str) -> Option<&mut String>;

    /// Copy every present field of `object` into `self`.
    ///
    /// Missing keys and `null` values leave the current value untouched;
    /// non-string scalars are coerced to their JSON text. Returns the number
    /// of fields written.
    fn fill_from(&mut self, object: &Map<String, Value>) -> usize {
        let mut written = 0;
        for name in Self::FIELDS {
            let Some(text) = object.get(*name).and_then(coerce_to_string) else {
                continue;
            };
            if let Some(slot) = self.field_mut(name) {
                *slot = text;
                written += 1;
            }
        }
        written
    }
}

fn coerce_to_string(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, CategoryFields)]
#[serde(default)]
#[category(key = "character")]
pub struct Character {
    pub name: String,
    pub race: String,
    pub ability: String,
    pub backstory: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, CategoryFields)]
#[serde(default, rename_all = "camelCase")]
#[category(key = "worldview")]
pub struct Worldview {
    #[category(rename = "magicSystem")]
    pub magic_system: String,
    pub era: String,
    pub factions: String,
    pub cosmology: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, CategoryFields)]
#[serde(default)]
#[category(key = "geography")]
pub struct Geography {
    pub name: String,
    pub location: String,
    pub climate: String,
    pub features: String,
    pub danger: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, CategoryFields)]
#[serde(default)]
#[category(key = "items")]
pub struct Item {
    pub name: String,
    #[serde(rename = "type")]
    #[category(rename = "type")]
    pub kind: String,
    pub ability: String,
    pub origin: String,
    pub state: String,
}

/// A complete analysis result.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Record {
    pub character: Character,
    pub worldview: Worldview,
    pub geography: Geography,
    #[serde(rename = "items", alias = "item")]
    pub item: Item,
}

impl Record {
    /// Build a record from a JSON payload.
    ///
    /// Returns `None` when the payload is not a JSON object. Fields the
    /// payload omits stay empty.
    pub fn from_payload(payload: &Value) -> Option<Self> {
        if !payload.is_object() {
            return None;
        }
        let mut record = Self::default();
        record.fill(payload);
        Some(record)
    }

    /// Write every present sub-field of `payload` into this record.
    ///
    /// Absent or `null` values never overwrite the current text. Returns the
    /// number of fields written.
    pub fn fill(&mut self, payload: &Value) -> usize {
        let Some(root) = payload.as_object() else {
            return 0;
        };

        fill_category(&mut self.character, root, &[])
            + fill_category(&mut self.worldview, root, &[])
            + fill_category(&mut self.geography, root, &[])
            + fill_category(&mut self.item, root, &["item"])
    }

    /// Snapshot the current values into a fresh export envelope.
    pub fn read(&self) -> ExportEnvelope {
        ExportEnvelope::new(self.clone())
    }

    /// Read a field of the given category.
    pub fn field(&self, category: Category, name: &str) -> Option<&str> {
        match category {
            Category::Character => self.character.field(name),
            Category::Worldview => self.worldview.field(name),
            Category::Geography => self.geography.field(name),
            Category::Item => self.item.field(name),
        }
    }

    /// Mutable access to a field of the given category.
    pub fn field_mut(&mut self, category: Category, name: &str) -> Option<&mut String> {
        match category {
            Category::Character => self.character.field_mut(name),
            Category::Worldview => self.worldview.field_mut(name),
            Category::Geography => self.geography.field_mut(name),
            Category::Item => self.item.field_mut(name),
        }
    }

    /// Iterate `(field name, value)` pairs of one category in display order.
    pub fn fields(&self, category: Category) -> impl Iterator<Item = (&'static str, &str)> + '_ {
        category
            .field_names()
            .iter()
            .map(move |name| (*name, self.field(category, name).unwrap_or_default()))
    }
}

fn fill_category<C: CategoryFields>(
    category: &mut C,
    root: &Map<String, Value>,
    aliases: &[&str],
) -> usize {
    std::iter::once(C::KEY)
        .chain(aliases.iter().copied())
        .find_map(|key| root.get(key))
        .and_then(Value::as_object)
        .map(|object| category.fill_from(object))
        .unwrap_or(0)
}

/// One of the four record categories, also used as the active tab.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    #[default]
    Character,
    Worldview,
    Geography,
    Item,
}

impl Category {
    /// All categories in tab order.
    pub const ALL: [Category; 4] = [
        Category::Character,
        Category::Worldview,
        Category::Geography,
        Category::Item,
    ];

    pub fn key(self) -> &'static str {
        match self {
            Category::Character => "character",
            Category::Worldview => "worldview",
            Category::Geography => "geography",
            Category::Item => "item",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Category::Character => "Character",
            Category::Worldview => "Worldview",
            Category::Geography => "Geography",
            Category::Item => "Item",
        }
    }

    /// Wire names of this category's fields.
    pub fn field_names(self) -> &'static [&'static str] {
        match self {
            Category::Character => Character::FIELDS,
            Category::Worldview => Worldview::FIELDS,
            Category::Geography => Geography::FIELDS,
            Category::Item => Item::FIELDS,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Returned when a category name is not recognised.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown category `{0}` (expected character, worldview, geography or item)")]
pub struct UnknownCategory(pub String);

impl FromStr for Category {
    type Err = UnknownCategory;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "character" => Ok(Category::Character),
            "worldview" => Ok(Category::Worldview),
            "geography" => Ok(Category::Geography),
            "item" | "items" => Ok(Category::Item),
            _ => Err(UnknownCategory(s.to_string())),
        }
    }
}

/// Metadata attached to an export.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportMeta {
    #[serde(rename = "exportedAt")]
    pub exported_at: DateTime<Utc>,
    pub source: String,
    pub version: String,
}

/// A record plus export metadata. Built at export time, never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportEnvelope {
    #[serde(rename = "_meta")]
    pub meta: ExportMeta,
    #[serde(flatten)]
    pub record: Record,
}

impl ExportEnvelope {
    pub fn new(record: Record) -> Self {
        Self {
            meta: ExportMeta {
                exported_at: Utc::now(),
                source: EXPORT_SOURCE.to_string(),
                version: EXPORT_VERSION.to_string(),
            },
            record,
        }
    }
}
