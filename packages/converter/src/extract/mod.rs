//! Extraction of entity records from a parsed document.

mod entity;
mod section;

pub use entity::{entity_nodes, extract_entities, extract_entity, Extraction};
pub use section::{
    parse_cell, parse_paragraphs, parse_row, parse_table, KeyValueShape, NormalizeContext,
    ParagraphShape, SectionShape, ShapeRegistry, TableShape,
};
