//! Column explosion: every section column becomes three derived columns.
//!
//! For a section header `H` the derived columns are `H` (row data),
//! `HUpdateDate` and `HPARs`. Only the first table and the first paragraph
//! of a section survive; later ones are dropped.

use std::borrow::Cow;

use serde::Serialize;
use tracing::{debug, warn};

use crate::config::{PARS_SUFFIX, UPDATE_DATE_SUFFIX};
use crate::error::{ConverterError, Result};
use crate::flatten::{FlatTable, FlatValue};
use crate::types::{Row, Section, SectionPayload};

/// Row data of a section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowData {
    /// Rows of the first table.
    Grid(Vec<Row>),

    /// Key/value pairs, rendered as a list of one-entry mappings.
    Pairs(Vec<(String, String)>),
}

impl RowData {
    /// Render as compact JSON.
    pub fn to_json(&self) -> Result<String> {
        match self {
            Self::Grid(rows) => Ok(serde_json::to_string(rows)?),
            Self::Pairs(pairs) => {
                let maps: Vec<serde_json::Map<String, serde_json::Value>> = pairs
                    .iter()
                    .map(|(key, value)| {
                        let mut map = serde_json::Map::new();
                        map.insert(key.clone(), serde_json::Value::String(value.clone()));
                        map
                    })
                    .collect();
                Ok(serde_json::to_string(&maps)?)
            }
        }
    }
}

/// Update date and text of a section's first paragraph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParSummary {
    #[serde(rename = "updatedate")]
    pub update_date: Option<String>,

    #[serde(rename = "Text")]
    pub text: Option<String>,
}

/// The three derived values of one section cell.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExplodedSection {
    pub rows: Option<RowData>,
    pub update_date: Option<String>,
    pub pars: Option<ParSummary>,
}

impl ExplodedSection {
    /// Derive the values from a structured section.
    #[must_use]
    pub fn from_section(section: &Section) -> Self {
        let (rows, update_date) = match &section.payload {
            SectionPayload::Table(payload) => match payload.tables.first() {
                Some(table) => (
                    Some(RowData::Grid(table.rows.clone())),
                    table.update_date.clone(),
                ),
                None => (None, None),
            },
            SectionPayload::KeyValue(payload) => (Some(RowData::Pairs(payload.pairs.clone())), None),
            SectionPayload::Paragraph(_) => (None, None),
        };

        let pars = section.payload.paragraphs().first().map(|par| ParSummary {
            update_date: par.update_date.clone(),
            text: par.text.clone(),
        });

        Self {
            rows,
            update_date,
            pars,
        }
    }

    /// `<Header>` cell: JSON rows, or empty.
    pub fn rows_cell(&self) -> Result<String> {
        self.rows
            .as_ref()
            .map_or_else(|| Ok(String::new()), RowData::to_json)
    }

    /// `<Header>UpdateDate` cell: the date, or empty.
    #[must_use]
    pub fn update_date_cell(&self) -> String {
        self.update_date.clone().unwrap_or_default()
    }

    /// `<Header>PARs` cell: a JSON mapping, `{}` when there is no paragraph.
    pub fn pars_cell(&self) -> Result<String> {
        match &self.pars {
            Some(pars) => Ok(serde_json::to_string(pars)?),
            None => Ok("{}".to_string()),
        }
    }
}

/// One output row.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FinalRow {
    pub identity: Vec<Option<String>>,

    /// Aligned with `FinalTable::section_columns`.
    pub sections: Vec<ExplodedSection>,
}

/// The fully tabular result of a conversion.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FinalTable {
    pub identity_columns: Vec<String>,
    pub section_columns: Vec<String>,
    pub rows: Vec<FinalRow>,

    /// Non-fatal problems met while exploding (unparseable cells).
    pub warnings: Vec<String>,
}

impl FinalTable {
    /// Output header: identity columns, then one triple per section column.
    #[must_use]
    pub fn header(&self) -> Vec<String> {
        let mut header = self.identity_columns.clone();
        for column in &self.section_columns {
            header.push(column.clone());
            header.push(format!("{column}{UPDATE_DATE_SUFFIX}"));
            header.push(format!("{column}{PARS_SUFFIX}"));
        }
        header
    }

    /// Derived values of a row for a section column.
    #[must_use]
    pub fn section(&self, row: usize, column: &str) -> Option<&ExplodedSection> {
        let index = self.section_columns.iter().position(|c| c == column)?;
        self.rows.get(row)?.sections.get(index)
    }
}

/// Turn a flat value into a section record.
///
/// Blank serialized text is treated as null.
///
/// # Errors
/// * `ConverterError::PayloadParse` when serialized text is not a section
pub fn resolve<'a>(value: &'a FlatValue, column: &str) -> Result<Option<Cow<'a, Section>>> {
    match value {
        FlatValue::Structured(section) => Ok(Some(Cow::Borrowed(section))),
        FlatValue::Serialized(text) if text.trim().is_empty() => Ok(None),
        FlatValue::Serialized(text) => serde_json::from_str(text)
            .map(|section| Some(Cow::Owned(section)))
            .map_err(|source| ConverterError::PayloadParse {
                column: column.to_string(),
                source,
            }),
    }
}

/// Explode every section column of a flat table.
///
/// Unparseable cells never abort: they are logged, recorded in
/// `FinalTable::warnings` and yield empty derived values.
#[must_use]
pub fn explode(table: &FlatTable) -> FinalTable {
    let mut warnings = Vec::new();

    let rows = table
        .rows
        .iter()
        .enumerate()
        .map(|(row_index, row)| {
            let sections = table
                .section_columns
                .iter()
                .map(|column| {
                    let Some(value) = row.get(column) else {
                        return ExplodedSection::default();
                    };
                    match resolve(value, column) {
                        Ok(Some(section)) => ExplodedSection::from_section(&section),
                        Ok(None) => ExplodedSection::default(),
                        Err(err) => {
                            warn!(row = row_index + 1, "{err}");
                            warnings.push(format!("Row {}: {err}", row_index + 1));
                            ExplodedSection::default()
                        }
                    }
                })
                .collect();

            FinalRow {
                identity: row.identity.clone(),
                sections,
            }
        })
        .collect::<Vec<_>>();

    debug!(
        rows = rows.len(),
        warnings = warnings.len(),
        "exploded section columns"
    );

    FinalTable {
        identity_columns: table.identity_columns.clone(),
        section_columns: table.section_columns.clone(),
        rows,
        warnings,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flatten::FlatRow;
    use crate::types::{
        Cell, KeyValuePayload, Paragraph, ParagraphPayload, Table, TablePayload,
    };
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;

    fn text(s: &str) -> Cell {
        Cell::Text(s.to_string())
    }

    fn pilotage() -> Section {
        Section::new(
            "Pilotage",
            Some("S1".to_string()),
            SectionPayload::Table(TablePayload {
                tables: vec![
                    Table {
                        id: Some("T1".to_string()),
                        update_date: Some("2023-05-01".to_string()),
                        rows: vec![vec![text("Yes"), text("24h")]],
                    },
                    Table {
                        id: Some("T2".to_string()),
                        update_date: Some("2019-01-01".to_string()),
                        rows: vec![vec![text("dropped")]],
                    },
                ],
                notes: Vec::new(),
            }),
        )
    }

    fn table_with(column: &str, values: Vec<Option<FlatValue>>) -> FlatTable {
        let mut table = FlatTable::new(&["PortName"]);
        table.add_section_column(column);
        for (i, value) in values.into_iter().enumerate() {
            let mut cells = HashMap::new();
            if let Some(value) = value {
                cells.insert(column.to_string(), value);
            }
            table.rows.push(FlatRow {
                identity: vec![Some(format!("P{i}"))],
                cells,
            });
        }
        table
    }

    #[test]
    fn test_first_table_only() {
        let exploded = ExplodedSection::from_section(&pilotage());
        assert_eq!(
            exploded.rows,
            Some(RowData::Grid(vec![vec![text("Yes"), text("24h")]]))
        );
        assert_eq!(exploded.update_date.as_deref(), Some("2023-05-01"));
        assert_eq!(exploded.rows_cell().unwrap(), r#"[["Yes","24h"]]"#);
        assert_eq!(exploded.pars_cell().unwrap(), "{}");
    }

    #[test]
    fn test_first_paragraph_only() {
        let section = Section::new(
            "Anchorage",
            None,
            SectionPayload::Paragraph(ParagraphPayload {
                paragraphs: vec![
                    Paragraph {
                        id: Some("P1".to_string()),
                        update_date: Some("2021-02-03".to_string()),
                        text: Some("Good holding ground.".to_string()),
                    },
                    Paragraph {
                        id: Some("P2".to_string()),
                        update_date: Some("2024-01-01".to_string()),
                        text: Some("Second.".to_string()),
                    },
                ],
            }),
        );
        let exploded = ExplodedSection::from_section(&section);
        assert_eq!(exploded.rows, None);
        assert_eq!(exploded.update_date, None);
        assert_eq!(
            exploded.pars_cell().unwrap(),
            r#"{"updatedate":"2021-02-03","Text":"Good holding ground."}"#
        );
    }

    #[test]
    fn test_paragraph_with_missing_fields_keeps_both_keys() {
        let section = Section::new(
            "Tides",
            None,
            SectionPayload::Paragraph(ParagraphPayload {
                paragraphs: vec![Paragraph::default()],
            }),
        );
        let exploded = ExplodedSection::from_section(&section);
        assert_eq!(
            exploded.pars_cell().unwrap(),
            r#"{"updatedate":null,"Text":null}"#
        );
    }

    #[test]
    fn test_key_value_rows() {
        let section = Section::new(
            "Holidays",
            None,
            SectionPayload::KeyValue(KeyValuePayload {
                pairs: vec![("2024-01-01".to_string(), "New Year".to_string())],
            }),
        );
        let exploded = ExplodedSection::from_section(&section);
        assert_eq!(exploded.rows_cell().unwrap(), r#"[{"2024-01-01":"New Year"}]"#);
        assert_eq!(exploded.update_date, None);
        assert_eq!(exploded.pars, None);
    }

    #[test]
    fn test_table_payload_without_tables() {
        let section = Section::new("Empty", None, SectionPayload::Table(TablePayload::default()));
        let exploded = ExplodedSection::from_section(&section);
        assert_eq!(exploded, ExplodedSection::default());
    }

    #[test]
    fn test_serialized_and_structured_agree() {
        let structured = FlatValue::Structured(pilotage());
        let serialized = FlatValue::Serialized(structured.to_text().unwrap());
        let table = table_with("Pilotage", vec![Some(structured), Some(serialized)]);

        let exploded = explode(&table);
        assert!(exploded.warnings.is_empty());
        assert_eq!(exploded.rows[0].sections, exploded.rows[1].sections);
    }

    #[test]
    fn test_null_and_blank_cells() {
        let table = table_with(
            "Pilotage",
            vec![None, Some(FlatValue::Serialized("   ".to_string()))],
        );
        let exploded = explode(&table);
        assert!(exploded.warnings.is_empty());
        for row in &exploded.rows {
            assert_eq!(row.sections, vec![ExplodedSection::default()]);
        }
    }

    #[test]
    fn test_unparseable_cell_degrades_and_warns() {
        let table = table_with(
            "Pilotage",
            vec![
                Some(FlatValue::Serialized("{'Tables': [".to_string())),
                Some(FlatValue::Structured(pilotage())),
            ],
        );
        let exploded = explode(&table);

        assert_eq!(exploded.rows.len(), 2);
        assert_eq!(exploded.rows[0].sections[0], ExplodedSection::default());
        assert_eq!(
            exploded.section(1, "Pilotage").unwrap().update_date.as_deref(),
            Some("2023-05-01")
        );
        assert_eq!(exploded.warnings.len(), 1);
        assert!(exploded.warnings[0].starts_with("Row 1:"));
        assert!(exploded.warnings[0].contains("Pilotage"));
    }

    #[test]
    fn test_header_triples() {
        let table = table_with("Pilotage", vec![None]);
        let exploded = explode(&table);
        assert_eq!(
            exploded.header(),
            vec!["PortName", "Pilotage", "PilotageUpdateDate", "PilotagePARs"]
        );
    }
}
