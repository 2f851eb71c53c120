//! Core data types for the converter.
//!
//! These types form the nested record model built from one XML document:
//! entities own ordered sections, and every section carries exactly one
//! payload variant. Serde field names follow the source XML vocabulary so
//! that serialized section values stay readable inside CSV cells.

use serde::{Deserialize, Serialize};

use crate::config::EntityKind;

/// One grid cell of a section table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "CellRepr", into = "CellRepr")]
pub enum Cell {
    /// Ordinary cell holding its paragraph text.
    Text(String),

    /// Cell spanning several grid columns (`namest` + `nameend`).
    Span(String),
}

impl Cell {
    /// Text carried by the cell, regardless of span.
    #[must_use]
    pub fn text(&self) -> &str {
        match self {
            Self::Text(text) | Self::Span(text) => text,
        }
    }

    /// Whether this cell spans multiple columns.
    #[must_use]
    pub fn is_span(&self) -> bool {
        matches!(self, Self::Span(_))
    }
}

/// Wire form of a cell: a bare string, or `{"span": true, "text": ...}`.
#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum CellRepr {
    Text(String),
    Span { span: bool, text: String },
}

impl From<CellRepr> for Cell {
    fn from(repr: CellRepr) -> Self {
        match repr {
            CellRepr::Text(text) => Self::Text(text),
            CellRepr::Span { span: true, text } => Self::Span(text),
            CellRepr::Span { span: false, text } => Self::Text(text),
        }
    }
}

impl From<Cell> for CellRepr {
    fn from(cell: Cell) -> Self {
        match cell {
            Cell::Text(text) => Self::Text(text),
            Cell::Span(text) => Self::Span { span: true, text },
        }
    }
}

/// One table row: cells in document order.
pub type Row = Vec<Cell>;

/// A `table` element of a section.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Table {
    #[serde(rename = "ID")]
    pub id: Option<String>,

    #[serde(rename = "updatedate")]
    pub update_date: Option<String>,

    #[serde(rename = "Rows", default)]
    pub rows: Vec<Row>,
}

/// A `PAR` element: free text with an update date.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Paragraph {
    #[serde(rename = "ID")]
    pub id: Option<String>,

    #[serde(rename = "updatedate")]
    pub update_date: Option<String>,

    #[serde(rename = "Text")]
    pub text: Option<String>,
}

/// Grid content of a section, with any `PAR` notes found next to it.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TablePayload {
    #[serde(rename = "Tables", default)]
    pub tables: Vec<Table>,

    #[serde(rename = "PARs", default)]
    pub notes: Vec<Paragraph>,
}

/// Free-text content of a section.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ParagraphPayload {
    #[serde(rename = "PARs", default)]
    pub paragraphs: Vec<Paragraph>,
}

/// Flat key/value list (the country "Holidays" section).
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct KeyValuePayload {
    #[serde(rename = "Pairs", default)]
    pub pairs: Vec<(String, String)>,
}

/// Section content, decided once during normalization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "shape", rename_all = "snake_case")]
pub enum SectionPayload {
    Table(TablePayload),
    Paragraph(ParagraphPayload),
    KeyValue(KeyValuePayload),
}

impl SectionPayload {
    /// Tables of the payload (empty for non-grid payloads).
    #[must_use]
    pub fn tables(&self) -> &[Table] {
        match self {
            Self::Table(payload) => &payload.tables,
            Self::Paragraph(_) | Self::KeyValue(_) => &[],
        }
    }

    /// Paragraphs of the payload, including notes attached to a table.
    #[must_use]
    pub fn paragraphs(&self) -> &[Paragraph] {
        match self {
            Self::Table(payload) => &payload.notes,
            Self::Paragraph(payload) => &payload.paragraphs,
            Self::KeyValue(_) => &[],
        }
    }

    /// Short name of the variant for logging.
    #[must_use]
    pub fn shape(&self) -> &'static str {
        match self {
            Self::Table(_) => "table",
            Self::Paragraph(_) => "paragraph",
            Self::KeyValue(_) => "key_value",
        }
    }
}

/// A named sub-record of an entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Section {
    #[serde(rename = "SectionHeader")]
    pub header: String,

    #[serde(rename = "ID")]
    pub id: Option<String>,

    pub payload: SectionPayload,
}

impl Section {
    /// Create a new section.
    #[must_use]
    pub fn new(header: impl Into<String>, id: Option<String>, payload: SectionPayload) -> Self {
        Self {
            header: header.into(),
            id,
            payload,
        }
    }
}

/// A port or country record: identity fields plus ordered sections.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entity {
    /// Kind of entity this record was extracted as.
    pub kind: EntityKind,

    /// Identity fields in the kind's fixed order. Values are `None` when
    /// the element exists but has no text.
    pub identity: Vec<(String, Option<String>)>,

    /// Sections in document order.
    pub sections: Vec<Section>,
}

impl Entity {
    /// Look up an identity value by field name.
    #[must_use]
    pub fn identity_value(&self, field: &str) -> Option<&str> {
        self.identity
            .iter()
            .find(|(name, _)| name == field)
            .and_then(|(_, value)| value.as_deref())
    }

    /// Human readable label for log messages (the first identity value).
    #[must_use]
    pub fn label(&self) -> &str {
        self.identity
            .first()
            .and_then(|(_, value)| value.as_deref())
            .unwrap_or("<unnamed>")
    }
}
