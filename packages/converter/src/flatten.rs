//! Row flattening: one row per entity, one column per section header.

use std::collections::{HashMap, HashSet};

use tracing::debug;

use crate::error::Result;
use crate::types::{Entity, Section};

/// A section column value on its way from the flattener to the exploder.
///
/// The flattener always produces `Structured` values. Values read back from
/// intermediate storage arrive as `Serialized` JSON text and are resolved
/// by the exploder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FlatValue {
    Structured(Section),
    Serialized(String),
}

impl FlatValue {
    /// Text form of the value, for storage.
    pub fn to_text(&self) -> Result<String> {
        match self {
            Self::Structured(section) => Ok(serde_json::to_string(section)?),
            Self::Serialized(text) => Ok(text.clone()),
        }
    }
}

/// One entity's row.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FlatRow {
    /// Identity values, aligned with `FlatTable::identity_columns`.
    pub identity: Vec<Option<String>>,

    /// Section values keyed by header. Missing headers are null cells.
    pub cells: HashMap<String, FlatValue>,
}

impl FlatRow {
    /// Value of a section column, `None` when the entity has no such section.
    #[must_use]
    pub fn get(&self, column: &str) -> Option<&FlatValue> {
        self.cells.get(column)
    }
}

/// The flat table: identity columns, then section columns in order of first
/// appearance.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FlatTable {
    pub identity_columns: Vec<String>,
    pub section_columns: Vec<String>,
    pub rows: Vec<FlatRow>,
}

impl FlatTable {
    /// Create an empty table with the given identity columns.
    #[must_use]
    pub fn new(identity_columns: &[&str]) -> Self {
        Self {
            identity_columns: identity_columns.iter().map(|c| c.to_string()).collect(),
            section_columns: Vec::new(),
            rows: Vec::new(),
        }
    }

    /// All column names: identity columns first.
    #[must_use]
    pub fn columns(&self) -> Vec<&str> {
        self.identity_columns
            .iter()
            .chain(&self.section_columns)
            .map(String::as_str)
            .collect()
    }

    /// Register a section column if it has not been seen yet.
    pub fn add_section_column(&mut self, column: &str) {
        if !self.section_columns.iter().any(|c| c == column) {
            self.section_columns.push(column.to_string());
        }
    }
}

/// Flatten entities into one row each.
///
/// Sections are applied in document order. When two sections of an entity
/// share a header, the later one overwrites the earlier one; the column
/// keeps the position where the header was first seen.
pub fn flatten(entities: Vec<Entity>, identity_fields: &[&str]) -> FlatTable {
    let mut table = FlatTable::new(identity_fields);
    let mut seen: HashSet<String> = HashSet::new();

    for entity in entities {
        let identity: Vec<Option<String>> = identity_fields
            .iter()
            .map(|field| entity.identity_value(field).map(str::to_string))
            .collect();

        let mut cells = HashMap::new();
        for section in entity.sections {
            if seen.insert(section.header.clone()) {
                table.section_columns.push(section.header.clone());
            }
            if cells.contains_key(&section.header) {
                debug!(
                    entity = %identity_label(&identity),
                    header = %section.header,
                    "duplicate section header, keeping the last one"
                );
            }
            cells.insert(section.header.clone(), FlatValue::Structured(section));
        }

        table.rows.push(FlatRow { identity, cells });
    }

    debug!(
        rows = table.rows.len(),
        columns = table.section_columns.len(),
        "flattened entities"
    );
    table
}

fn identity_label(identity: &[Option<String>]) -> &str {
    identity
        .first()
        .and_then(|value| value.as_deref())
        .unwrap_or("<unnamed>")
}
