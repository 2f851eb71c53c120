//! Conversion pipeline that ties all components together.

use std::path::{Path, PathBuf};

use roxmltree::Document;
use tracing::info;

use crate::config::{ConvertOptions, Domain, MissingIdentityPolicy};
use crate::error::{ConverterError, Result};
use crate::explode::{explode, FinalTable};
use crate::extract::extract_entities;
use crate::flatten::{flatten, FlatTable};
use crate::intermediate::{read_flat_table, write_flat_table};
use crate::reader::{parse_tree, read_source};
use crate::writer::save_csv;

/// Outcome of one conversion run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionReport {
    pub domain: Domain,
    pub input: PathBuf,
    pub output: PathBuf,

    /// Number of entities written, one output row each.
    pub entities: usize,

    /// Section headers found in the document, in column order.
    pub section_columns: Vec<String>,

    /// Non-fatal problems: skipped entities and unparseable cells.
    pub warnings: Vec<String>,
}

/// Extract and flatten the entities of a parsed document.
///
/// Returns the flat table and the extraction warnings.
///
/// # Errors
/// * `ConverterError::NoEntities` if the document holds no entity of the
///   domain's kind
pub fn flatten_document(
    doc: &Document<'_>,
    domain: Domain,
    policy: MissingIdentityPolicy,
    path: &Path,
) -> Result<(FlatTable, Vec<String>)> {
    let kind = domain.entity_kind();
    let extraction = extract_entities(doc, kind, policy)?;

    if extraction.entities.is_empty() {
        return Err(ConverterError::NoEntities {
            entity: kind.tag().to_string(),
            path: path.to_path_buf(),
        });
    }

    let flat = flatten(extraction.entities, kind.identity_fields());
    Ok((flat, extraction.warnings))
}

/// Convert XML text held in memory into a final table.
pub fn convert_str(xml: &str, domain: Domain, policy: MissingIdentityPolicy) -> Result<FinalTable> {
    let path = Path::new("<memory>");
    let doc = parse_tree(xml, path)?;
    let (flat, warnings) = flatten_document(&doc, domain, policy, path)?;

    let mut table = explode(&flat);
    table.warnings.splice(0..0, warnings);
    Ok(table)
}

/// Run one conversion: read, extract, flatten, explode and write.
///
/// When `options.intermediate` is set, the flat table is stored there and
/// read back before exploding. Nothing is written to `options.output` unless
/// every stage succeeds.
pub fn convert(options: &ConvertOptions) -> Result<ConversionReport> {
    info!(domain = %options.domain, input = %options.input.display(), "reading file");
    let source = read_source(&options.input)?;
    let doc = parse_tree(&source, &options.input)?;

    let (flat, mut warnings) =
        flatten_document(&doc, options.domain, options.missing_identity, &options.input)?;
    info!(
        entities = flat.rows.len(),
        sections = flat.section_columns.len(),
        "flattened document"
    );

    let flat = match &options.intermediate {
        Some(path) => {
            write_flat_table(&flat, path)?;
            read_flat_table(path, options.domain.entity_kind().identity_fields())?
        }
        None => flat,
    };

    let mut table = explode(&flat);
    warnings.append(&mut table.warnings);
    table.warnings.clone_from(&warnings);

    let output = save_csv(&table, &options.output)?;

    Ok(ConversionReport {
        domain: options.domain,
        input: options.input.clone(),
        output,
        entities: table.rows.len(),
        section_columns: table.section_columns,
        warnings,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_convert_str_no_entities() {
        let err = convert_str(
            "<Root><Group/></Root>",
            Domain::Navigation,
            MissingIdentityPolicy::Fail,
        )
        .unwrap_err();
        assert!(matches!(err, ConverterError::NoEntities { .. }));
    }

    #[test]
    fn test_convert_str_collects_skip_warnings() {
        let xml = r#"<Root><Group>
            <Port><PortName>A</PortName><PortID>X</PortID><WorldPortNumber>1</WorldPortNumber></Port>
            <Port><PortName>B</PortName></Port>
        </Group></Root>"#;
        let table = convert_str(xml, Domain::BerthsAndCargo, MissingIdentityPolicy::Skip).unwrap();
        assert_eq!(table.rows.len(), 1);
        assert_eq!(table.warnings.len(), 1);
    }

    #[test]
    fn test_convert_str_malformed() {
        let err = convert_str("<Root>", Domain::Navigation, MissingIdentityPolicy::Fail).unwrap_err();
        assert!(matches!(err, ConverterError::MalformedXml { .. }));
    }
}
