//! Port data converter - flatten port and country XML documents into CSV.
//!
//! Each source document holds `Port` or `Country` records grouped under
//! `Group` elements. Every record becomes one CSV row: identity columns
//! first, then three derived columns per section header.
//!
//! # Example
//!
//! ```
//! use port_data_converter::{convert_str, Domain, MissingIdentityPolicy};
//!
//! let xml = r#"<Root><Group><Port>
//!     <PortName>Rotterdam</PortName><PortID>NLRTM</PortID>
//!     <WorldPortNumber>1</WorldPortNumber>
//! </Port></Group></Root>"#;
//! let table = convert_str(xml, Domain::Navigation, MissingIdentityPolicy::Fail).unwrap();
//! assert_eq!(table.rows.len(), 1);
//! ```
//!
//! # Architecture
//!
//! The converter is organized into several modules:
//!
//! - [`config`]: Domains, entity kinds, options and job files
//! - [`types`]: Core data types (Entity, Section, Table, Cell, etc.)
//! - [`error`]: Error types and Result alias
//! - [`reader`]: File loading and XML parsing
//! - [`xml`]: XML utilities
//! - [`extract`]: Entity extraction and section normalization
//! - [`flatten`]: One row per entity, one column per section header
//! - [`intermediate`]: Flat table storage as CSV
//! - [`explode`]: Derived columns per section
//! - [`writer`]: CSV output
//! - [`converter`]: Pipeline tying the stages together
//! - [`cli`]: Command-line interface

pub mod cli;
pub mod config;
pub mod converter;
pub mod error;
pub mod explode;
pub mod extract;
pub mod flatten;
pub mod intermediate;
pub mod reader;
pub mod types;
pub mod writer;
pub mod xml;

// Re-export main functions
pub use converter::{convert, convert_str, ConversionReport};

// Re-export commonly used items
pub use config::{ConvertOptions, Domain, EntityKind, JobFile, MissingIdentityPolicy};
pub use error::{ConverterError, Result};
pub use explode::FinalTable;
pub use flatten::{FlatTable, FlatValue};
pub use types::{Cell, Entity, Section, SectionPayload};
