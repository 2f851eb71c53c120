//! Intermediate storage of the flat table.
//!
//! Section cells are stored as JSON text. Reading the file back yields
//! `FlatValue::Serialized` cells, which the exploder parses again.

use std::collections::HashMap;
use std::path::Path;

use tracing::debug;

use crate::error::{ConverterError, Result};
use crate::flatten::{FlatRow, FlatTable, FlatValue};
use crate::reader::read_source;
use crate::writer::{write_atomic, write_records};

/// Serialize a flat table to CSV text.
pub fn flat_table_to_csv(table: &FlatTable) -> Result<String> {
    let header: Vec<String> = table.columns().into_iter().map(str::to_string).collect();

    let records = table
        .rows
        .iter()
        .map(|row| {
            let mut record: Vec<String> = row
                .identity
                .iter()
                .map(|value| value.clone().unwrap_or_default())
                .collect();
            for column in &table.section_columns {
                let cell = match row.get(column) {
                    Some(value) => value.to_text()?,
                    None => String::new(),
                };
                record.push(cell);
            }
            Ok(record)
        })
        .collect::<Result<Vec<_>>>()?;

    write_records(&header, records)
}

/// Store a flat table at `path`.
pub fn write_flat_table(table: &FlatTable, path: &Path) -> Result<()> {
    write_atomic(path, &flat_table_to_csv(table)?)?;
    debug!(path = %path.display(), rows = table.rows.len(), "stored intermediate table");
    Ok(())
}

/// Parse a stored flat table.
///
/// Every identity field must be present as a column; all other columns are
/// section columns. Empty cells are null.
///
/// `path` is only used for error context.
pub fn flat_table_from_csv(text: &str, identity_fields: &[&str], path: &Path) -> Result<FlatTable> {
    let mut reader = csv::Reader::from_reader(text.as_bytes());
    let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();

    let identity_indices = identity_fields
        .iter()
        .map(|field| {
            headers
                .iter()
                .position(|h| h.as_str() == *field)
                .ok_or_else(|| ConverterError::MissingColumn {
                    column: field.to_string(),
                    path: path.to_path_buf(),
                })
        })
        .collect::<Result<Vec<_>>>()?;

    let mut table = FlatTable::new(identity_fields);
    let section_indices: Vec<usize> = (0..headers.len())
        .filter(|i| !identity_indices.contains(i))
        .collect();
    for &index in &section_indices {
        table.add_section_column(&headers[index]);
    }

    for record in reader.records() {
        let record = record?;
        let non_empty = |index: usize| record.get(index).filter(|cell| !cell.is_empty());

        let identity = identity_indices
            .iter()
            .map(|&index| non_empty(index).map(str::to_string))
            .collect();

        let cells: HashMap<String, FlatValue> = section_indices
            .iter()
            .filter_map(|&index| {
                non_empty(index)
                    .map(|cell| (headers[index].clone(), FlatValue::Serialized(cell.to_string())))
            })
            .collect();

        table.rows.push(FlatRow { identity, cells });
    }

    Ok(table)
}

/// Read a stored flat table from `path`.
pub fn read_flat_table(path: &Path, identity_fields: &[&str]) -> Result<FlatTable> {
    let text = read_source(path)?;
    let table = flat_table_from_csv(&text, identity_fields, path)?;
    debug!(path = %path.display(), rows = table.rows.len(), "loaded intermediate table");
    Ok(table)
}
