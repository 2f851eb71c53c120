//! Entity extraction: Group → Port/Country → `Entity`.

use roxmltree::{Document, Node};
use tracing::{debug, warn};

use super::section::ShapeRegistry;
use crate::config::{EntityKind, MissingIdentityPolicy, GROUP_HEADER_TAG, GROUP_TAG};
use crate::error::{ConverterError, Result};
use crate::types::{Entity, Section};
use crate::xml::{find_child, find_children, get_text, has_tag, raw_text};

/// Entities extracted from one document, with non-fatal warnings.
#[derive(Debug, Clone, Default)]
pub struct Extraction {
    pub entities: Vec<Entity>,
    pub warnings: Vec<String>,
}

/// Locate the entity elements of a document in document order.
///
/// Ports live under root-level `Group` elements. Countries are accepted
/// both under a root-level `Group` and directly under the root.
pub fn entity_nodes<'a, 'input>(doc: &'a Document<'input>, kind: EntityKind) -> Vec<Node<'a, 'input>> {
    let root = doc.root_element();
    let mut nodes = Vec::new();

    for child in root.children().filter(|n| n.is_element()) {
        if has_tag(child, GROUP_TAG) {
            nodes.extend(find_children(child, kind.tag()));
        } else if kind == EntityKind::Country && has_tag(child, kind.tag()) {
            nodes.push(child);
        }
    }

    nodes
}

/// Extract every entity of the given kind from a document.
///
/// # Errors
/// * `ConverterError::MissingRequiredField` when an identity element is
///   absent and the policy is `MissingIdentityPolicy::Fail`
pub fn extract_entities(
    doc: &Document<'_>,
    kind: EntityKind,
    policy: MissingIdentityPolicy,
) -> Result<Extraction> {
    let registry = ShapeRegistry::standard();
    let mut extraction = Extraction::default();

    for (index, node) in entity_nodes(doc, kind).into_iter().enumerate() {
        match extract_entity(node, kind, index + 1, &registry) {
            Ok(entity) => extraction.entities.push(entity),
            Err(err @ ConverterError::MissingRequiredField { .. })
                if policy == MissingIdentityPolicy::Skip =>
            {
                warn!("{err}; entity skipped");
                extraction.warnings.push(format!("{err}; entity skipped"));
            }
            Err(err) => return Err(err),
        }
    }

    debug!(
        kind = kind.tag(),
        count = extraction.entities.len(),
        "extracted entities"
    );
    Ok(extraction)
}

/// Build one entity record.
///
/// `position` is the 1-based index of the entity in the document, used for
/// error context.
pub fn extract_entity(
    node: Node<'_, '_>,
    kind: EntityKind,
    position: usize,
    registry: &ShapeRegistry,
) -> Result<Entity> {
    let identity = kind
        .identity_fields()
        .iter()
        .map(|field| {
            find_child(node, field)
                .map(|child| (field.to_string(), raw_text(child)))
                .ok_or_else(|| ConverterError::MissingRequiredField {
                    field: field.to_string(),
                    entity: kind.tag().to_string(),
                    position,
                })
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(Entity {
        kind,
        identity,
        sections: collect_sections(node, kind, registry),
    })
}

/// Normalize the sections of an entity in document order.
///
/// Direct `Section` children are always read. Sections inside nested
/// groups are read only when the group header is one the entity kind
/// accepts.
fn collect_sections(node: Node<'_, '_>, kind: EntityKind, registry: &ShapeRegistry) -> Vec<Section> {
    let mut sections = Vec::new();

    for child in node.children().filter(|n| n.is_element()) {
        if has_tag(child, "Section") {
            sections.extend(registry.normalize(child, kind));
        } else if has_tag(child, GROUP_TAG) && accepts_group(child, kind) {
            sections.extend(
                find_children(child, "Section").filter_map(|section| registry.normalize(section, kind)),
            );
        }
    }

    sections
}

fn accepts_group(group: Node<'_, '_>, kind: EntityKind) -> bool {
    let Some(header) = find_child(group, GROUP_HEADER_TAG) else {
        return false;
    };
    let header = get_text(header);
    kind.nested_group_headers().iter().any(|accepted| *accepted == header)
}
