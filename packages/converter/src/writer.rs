//! CSV output for exploded tables.

use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tracing::info;

use crate::error::{ConverterError, Result};
use crate::explode::{FinalRow, FinalTable};

/// Serialize a header and records to CSV text.
///
/// Comma-delimited, with a header row and no index column.
pub fn write_records<I>(header: &[String], records: I) -> Result<String>
where
    I: IntoIterator<Item = Vec<String>>,
{
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(header)?;
    for record in records {
        writer.write_record(&record)?;
    }
    let bytes = writer.into_inner().map_err(|e| e.into_error())?;
    String::from_utf8(bytes)
        .map_err(|e| ConverterError::Io(io::Error::new(io::ErrorKind::InvalidData, e)))
}

/// Render one output row in header order.
pub fn render_row(row: &FinalRow) -> Result<Vec<String>> {
    let mut record: Vec<String> = row
        .identity
        .iter()
        .map(|value| value.clone().unwrap_or_default())
        .collect();

    for section in &row.sections {
        record.push(section.rows_cell()?);
        record.push(section.update_date_cell());
        record.push(section.pars_cell()?);
    }

    Ok(record)
}

/// Generate the CSV text of a final table.
pub fn generate_csv(table: &FinalTable) -> Result<String> {
    let records = table
        .rows
        .iter()
        .map(render_row)
        .collect::<Result<Vec<_>>>()?;
    write_records(&table.header(), records)
}

/// Write `content` to `path`, replacing any existing file.
///
/// Uses atomic write pattern: writes to temp file, syncs to disk, then renames.
/// A failure leaves no partial output behind.
pub fn write_atomic(path: &Path, content: &str) -> Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    fs::create_dir_all(&dir)?;

    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "output.csv".to_string());
    let temp_file = dir.join(format!(".{file_name}.tmp"));

    {
        let mut file = File::create(&temp_file)?;
        file.write_all(content.as_bytes())?;
        file.sync_all()?;
    }

    // On Windows, rename fails if the destination already exists
    #[cfg(target_os = "windows")]
    if path.exists() {
        fs::remove_file(path)?;
    }

    if let Err(e) = fs::rename(&temp_file, path) {
        let _ = fs::remove_file(&temp_file);
        return Err(e.into());
    }
    Ok(())
}

/// Save a final table as CSV.
///
/// # Returns
/// Path to the saved file
pub fn save_csv(table: &FinalTable, path: &Path) -> Result<PathBuf> {
    let content = generate_csv(table)?;
    write_atomic(path, &content)?;
    info!(path = %path.display(), rows = table.rows.len(), "CSV written");
    Ok(path.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::explode::{ExplodedSection, ParSummary, RowData};
    use crate::types::Cell;
    use pretty_assertions::assert_eq;
    use tempfile::tempdir;

    fn sample_table() -> FinalTable {
        FinalTable {
            identity_columns: vec!["PortName".to_string(), "PortID".to_string()],
            section_columns: vec!["Pilotage".to_string(), "Tides".to_string()],
            rows: vec![FinalRow {
                identity: vec![Some("Rotterdam".to_string()), None],
                sections: vec![
                    ExplodedSection {
                        rows: Some(RowData::Grid(vec![vec![
                            Cell::Text("Yes".to_string()),
                            Cell::Text("24h".to_string()),
                        ]])),
                        update_date: Some("2023-05-01".to_string()),
                        pars: None,
                    },
                    ExplodedSection {
                        rows: None,
                        update_date: None,
                        pars: Some(ParSummary {
                            update_date: Some("2020-01-01".to_string()),
                            text: Some("Range 4m, \"spring\"".to_string()),
                        }),
                    },
                ],
            }],
            warnings: Vec::new(),
        }
    }

    #[test]
    fn test_generate_csv() {
        let csv = generate_csv(&sample_table()).unwrap();
        let mut lines = csv.lines();
        assert_eq!(
            lines.next().unwrap(),
            "PortName,PortID,Pilotage,PilotageUpdateDate,PilotagePARs,Tides,TidesUpdateDate,TidesPARs"
        );
        assert_eq!(
            lines.next().unwrap(),
            r#"Rotterdam,,"[[""Yes"",""24h""]]",2023-05-01,{},,,"{""updatedate"":""2020-01-01"",""Text"":""Range 4m, \""spring\""""}""#
        );
        assert!(lines.next().is_none());
    }

    #[test]
    fn test_generate_csv_reads_back() {
        let csv = generate_csv(&sample_table()).unwrap();
        let mut reader = csv::Reader::from_reader(csv.as_bytes());
        let record = reader.records().next().unwrap().unwrap();
        assert_eq!(&record[2], r#"[["Yes","24h"]]"#);
        assert_eq!(&record[4], "{}");
        assert_eq!(&record[5], "");
    }

    #[test]
    fn test_save_csv_overwrites() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out").join("Navigation.csv");
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "stale").unwrap();

        let saved = save_csv(&sample_table(), &path).unwrap();
        assert_eq!(saved, path);

        let content = fs::read_to_string(&path).unwrap();
        assert!(content.starts_with("PortName,PortID,"));
        assert!(!dir.path().join("out").join(".Navigation.csv.tmp").exists());
    }

    #[test]
    fn test_write_atomic_creates_parent() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("deeper").join("x.csv");
        write_atomic(&path, "a,b\n").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "a,b\n");
    }
}
