//! Section normalization.
//!
//! Every `Section` element is turned into one `SectionPayload` variant. The
//! variants are produced by shape handlers, tried in registration order;
//! the first handler whose `can_handle` accepts the section wins.

use roxmltree::Node;
use tracing::debug;

use crate::config::EntityKind;
use crate::types::{
    Cell, KeyValuePayload, Paragraph, ParagraphPayload, Row, Section, SectionPayload, Table,
    TablePayload,
};
use crate::xml::{
    attribute_owned, find_child, find_children, find_descendants, get_text, has_all_attributes,
    raw_text,
};

/// Attributes marking a cell that spans several grid columns.
const SPAN_ATTRIBUTES: [&str; 2] = ["namest", "nameend"];

/// Context handed to shape handlers.
#[derive(Debug, Clone, Copy)]
pub struct NormalizeContext<'h> {
    pub kind: EntityKind,
    pub header: &'h str,
}

/// Trait for section shape handlers.
pub trait SectionShape: Send + Sync {
    /// Name of the shape, for logging.
    fn name(&self) -> &'static str;

    /// Check if this handler can normalize the given section.
    fn can_handle(&self, section: Node<'_, '_>, context: &NormalizeContext<'_>) -> bool;

    /// Build the payload for the section.
    fn normalize(&self, section: Node<'_, '_>, context: &NormalizeContext<'_>) -> SectionPayload;
}

/// Key/value list built from the first table of a section.
///
/// Only rows with exactly two paragraph texts survive.
pub struct KeyValueShape;

impl SectionShape for KeyValueShape {
    fn name(&self) -> &'static str {
        "key_value"
    }

    fn can_handle(&self, _section: Node<'_, '_>, context: &NormalizeContext<'_>) -> bool {
        context.kind.key_value_header() == Some(context.header)
    }

    fn normalize(&self, section: Node<'_, '_>, _context: &NormalizeContext<'_>) -> SectionPayload {
        let pairs = find_child(section, "table")
            .map(|table| {
                find_descendants(table, "row")
                    .filter_map(|row| {
                        let texts: Vec<String> = find_children(row, "entry")
                            .flat_map(|entry| find_children(entry, "para"))
                            .map(get_text)
                            .collect();
                        match <[String; 2]>::try_from(texts) {
                            Ok([key, value]) => Some((key, value)),
                            Err(_) => None,
                        }
                    })
                    .collect()
            })
            .unwrap_or_default();

        SectionPayload::KeyValue(KeyValuePayload { pairs })
    }
}

/// Grid content: every `table` child plus any `PAR` notes.
pub struct TableShape;

impl SectionShape for TableShape {
    fn name(&self) -> &'static str {
        "table"
    }

    fn can_handle(&self, section: Node<'_, '_>, _context: &NormalizeContext<'_>) -> bool {
        find_child(section, "table").is_some()
    }

    fn normalize(&self, section: Node<'_, '_>, _context: &NormalizeContext<'_>) -> SectionPayload {
        SectionPayload::Table(TablePayload {
            tables: find_children(section, "table").map(parse_table).collect(),
            notes: parse_paragraphs(section),
        })
    }
}

/// Free text; also the fallback for sections without tables or PARs.
pub struct ParagraphShape;

impl SectionShape for ParagraphShape {
    fn name(&self) -> &'static str {
        "paragraph"
    }

    fn can_handle(&self, _section: Node<'_, '_>, _context: &NormalizeContext<'_>) -> bool {
        true
    }

    fn normalize(&self, section: Node<'_, '_>, _context: &NormalizeContext<'_>) -> SectionPayload {
        SectionPayload::Paragraph(ParagraphPayload {
            paragraphs: parse_paragraphs(section),
        })
    }
}

/// Ordered list of shape handlers.
pub struct ShapeRegistry {
    shapes: Vec<Box<dyn SectionShape>>,
}

impl ShapeRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self { shapes: Vec::new() }
    }

    /// Append a handler; earlier handlers take priority.
    pub fn register(&mut self, shape: impl SectionShape + 'static) {
        self.shapes.push(Box::new(shape));
    }

    /// Standard registry: key/value, then table, then paragraph.
    #[must_use]
    pub fn standard() -> Self {
        let mut registry = Self::new();
        registry.register(KeyValueShape);
        registry.register(TableShape);
        registry.register(ParagraphShape);
        registry
    }

    /// Find the handler for a section.
    pub fn get_shape(
        &self,
        section: Node<'_, '_>,
        context: &NormalizeContext<'_>,
    ) -> Option<&dyn SectionShape> {
        self.shapes
            .iter()
            .find(|shape| shape.can_handle(section, context))
            .map(|shape| shape.as_ref())
    }

    /// Normalize a `Section` element.
    ///
    /// Returns `None` for sections without a `SectionHeader` or with an
    /// empty header; those are skipped.
    pub fn normalize(&self, section: Node<'_, '_>, kind: EntityKind) -> Option<Section> {
        let Some(header_node) = find_child(section, "SectionHeader") else {
            debug!("skipping section without SectionHeader");
            return None;
        };
        let header = get_text(header_node);
        if header.is_empty() {
            debug!("skipping section with empty SectionHeader");
            return None;
        }

        let context = NormalizeContext {
            kind,
            header: &header,
        };
        let payload = match self.get_shape(section, &context) {
            Some(shape) => {
                debug!(header = %header, shape = shape.name(), "normalizing section");
                shape.normalize(section, &context)
            }
            None => SectionPayload::Paragraph(ParagraphPayload::default()),
        };

        Some(Section::new(header, attribute_owned(header_node, "ID"), payload))
    }
}

impl Default for ShapeRegistry {
    fn default() -> Self {
        Self::standard()
    }
}

/// Parse one `table` element. Rows are searched at any depth.
pub fn parse_table(table: Node<'_, '_>) -> Table {
    Table {
        id: attribute_owned(table, "ID"),
        update_date: attribute_owned(table, "updatedate"),
        rows: find_descendants(table, "row").map(parse_row).collect(),
    }
}

/// Parse the direct `entry` children of a `row`.
pub fn parse_row(row: Node<'_, '_>) -> Row {
    find_children(row, "entry").map(parse_cell).collect()
}

/// Parse one `entry` into a cell.
///
/// The text is that of the first `para` child, or empty when the `para`
/// or its text is absent.
pub fn parse_cell(entry: Node<'_, '_>) -> Cell {
    let text = find_child(entry, "para")
        .and_then(raw_text)
        .unwrap_or_default();

    if has_all_attributes(entry, &SPAN_ATTRIBUTES) {
        Cell::Span(text)
    } else {
        Cell::Text(text)
    }
}

/// Parse every `PAR` child of a section.
pub fn parse_paragraphs(section: Node<'_, '_>) -> Vec<Paragraph> {
    find_children(section, "PAR")
        .map(|par| Paragraph {
            id: attribute_owned(par, "ID"),
            update_date: attribute_owned(par, "updatedate"),
            text: raw_text(par),
        })
        .collect()
}
