//! Reading source files into an XML tree.
//!
//! Reading and parsing are split because `roxmltree::Document` borrows the
//! source text: the caller owns the `String` for the duration of a run.

use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use roxmltree::Document;
use tracing::debug;

use crate::error::{ConverterError, Result};
use crate::xml::get_tag_name;

/// Read an XML source file into memory.
///
/// # Errors
/// * `ConverterError::FileNotFound` if the path does not exist
/// * `ConverterError::Io` for any other read failure
pub fn read_source(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|e| match e.kind() {
        ErrorKind::NotFound => ConverterError::FileNotFound {
            path: path.to_path_buf(),
        },
        _ => ConverterError::Io(e),
    })
}

/// Parse XML text into a document tree.
///
/// `path` is only used for error context.
///
/// # Errors
/// * `ConverterError::MalformedXml` if the text is not well-formed XML
pub fn parse_tree<'input>(source: &'input str, path: &Path) -> Result<Document<'input>> {
    let doc = Document::parse(source).map_err(|e| ConverterError::MalformedXml {
        path: path.to_path_buf(),
        source: e,
    })?;

    let root = doc.root_element();
    debug!(root = get_tag_name(root), "parsed XML document");
    for child in root.children().filter(|n| n.is_element()) {
        debug!(tag = get_tag_name(child), "top-level element");
    }

    Ok(doc)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_read_source_missing_file() {
        let err = read_source(Path::new("/definitely/not/here.xml")).unwrap_err();
        assert!(matches!(err, ConverterError::FileNotFound { .. }));
    }

    #[test]
    fn test_read_source_existing_file() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "<Root/>").unwrap();
        assert_eq!(read_source(file.path()).unwrap(), "<Root/>");
    }

    #[test]
    fn test_read_source_directory_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = read_source(dir.path()).unwrap_err();
        assert!(matches!(err, ConverterError::Io(_)));
    }

    #[test]
    fn test_parse_tree_malformed() {
        let err = parse_tree("<Root><Group></Root>", Path::new("bad.xml")).unwrap_err();
        match err {
            ConverterError::MalformedXml { path, .. } => assert_eq!(path, Path::new("bad.xml")),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_parse_tree_ok() {
        let doc = parse_tree("<Root><Group/></Root>", Path::new("ok.xml")).unwrap();
        assert_eq!(get_tag_name(doc.root_element()), "Root");
    }
}
