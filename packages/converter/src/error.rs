//! Error types for the converter.
//!
//! File-level failures abort a run. Payload parse failures are surfaced as
//! `ConverterError::PayloadParse` and downgraded to report warnings by the
//! exploder, so they never abort a conversion.

use std::path::PathBuf;

use thiserror::Error;

/// Main error type for the converter library.
#[derive(Debug, Error)]
pub enum ConverterError {
    /// Input file does not exist.
    #[error("File not found: {}", .path.display())]
    FileNotFound { path: PathBuf },

    /// Input file is not well-formed XML.
    #[error("Malformed XML in {}: {source}", .path.display())]
    MalformedXml {
        path: PathBuf,
        #[source]
        source: roxmltree::Error,
    },

    /// Required identity element missing from an entity.
    #[error("Missing required field <{field}> in {entity} #{position}")]
    MissingRequiredField {
        field: String,
        entity: String,
        position: usize,
    },

    /// Section value could not be read back into a structured record.
    #[error("Could not parse section value in column '{column}': {source}")]
    PayloadParse {
        column: String,
        #[source]
        source: serde_json::Error,
    },

    /// Document contained no entities for the selected domain.
    #[error("No {entity} entities found in {}", .path.display())]
    NoEntities { entity: String, path: PathBuf },

    /// Unknown domain name.
    #[error("Unknown domain: '{0}'. Expected one of berths-and-cargo, navigation, port-countries")]
    UnknownDomain(String),

    /// Intermediate table is missing an identity column.
    #[error("Intermediate table {} is missing column '{column}'", .path.display())]
    MissingColumn { column: String, path: PathBuf },

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV reading or writing failed.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON serialization failed.
    #[error("JSON serialization failed: {0}")]
    Json(#[from] serde_json::Error),

    /// Job file could not be parsed.
    #[error("Invalid job file: {0}")]
    JobFile(#[from] serde_yaml_ng::Error),
}

/// Result type alias for converter operations.
pub type Result<T> = std::result::Result<T, ConverterError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_field_display() {
        let err = ConverterError::MissingRequiredField {
            field: "PortID".to_string(),
            entity: "Port".to_string(),
            position: 3,
        };
        assert_eq!(err.to_string(), "Missing required field <PortID> in Port #3");
    }

    #[test]
    fn test_file_not_found_display() {
        let err = ConverterError::FileNotFound {
            path: PathBuf::from("Navigation.xml"),
        };
        assert_eq!(err.to_string(), "File not found: Navigation.xml");
    }

    #[test]
    fn test_payload_parse_display() {
        let source = serde_json::from_str::<serde_json::Value>("{oops").unwrap_err();
        let err = ConverterError::PayloadParse {
            column: "Pilotage".to_string(),
            source,
        };
        assert!(err.to_string().contains("'Pilotage'"));
    }
}
