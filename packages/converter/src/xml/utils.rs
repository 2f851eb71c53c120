//! XML utility functions for navigating and extracting data from DOM trees.

use roxmltree::Node;

/// Get the tag name without namespace prefix.
///
/// # Examples
/// ```
/// use roxmltree::Document;
/// use port_data_converter::xml::get_tag_name;
///
/// let xml = r#"<root><Port>text</Port></root>"#;
/// let doc = Document::parse(xml).unwrap();
/// let port = doc.root_element().first_element_child().unwrap();
/// assert_eq!(get_tag_name(port), "Port");
/// ```
pub fn get_tag_name<'a>(node: Node<'a, '_>) -> &'a str {
    node.tag_name().name()
}

/// Check if a node is an element with a specific tag name.
pub fn has_tag(node: Node<'_, '_>, tag: &str) -> bool {
    node.is_element() && get_tag_name(node) == tag
}

/// Find the first child element with the given tag name.
///
/// # Examples
/// ```
/// use roxmltree::Document;
/// use port_data_converter::xml::find_child;
///
/// let xml = r#"<Port><PortName>Rotterdam</PortName></Port>"#;
/// let doc = Document::parse(xml).unwrap();
/// let port = doc.root_element();
///
/// assert!(find_child(port, "PortName").is_some());
/// assert!(find_child(port, "PortID").is_none());
/// ```
pub fn find_child<'a, 'input>(node: Node<'a, 'input>, tag: &str) -> Option<Node<'a, 'input>> {
    node.children().find(|child| has_tag(*child, tag))
}

/// Find all child elements with the given tag name, in document order.
pub fn find_children<'a, 'input>(
    node: Node<'a, 'input>,
    tag: &'a str,
) -> impl Iterator<Item = Node<'a, 'input>> {
    node.children().filter(move |child| has_tag(*child, tag))
}

/// Find all descendant elements with the given tag name, at any depth.
///
/// The node itself is not included.
///
/// # Examples
/// ```
/// use roxmltree::Document;
/// use port_data_converter::xml::find_descendants;
///
/// let xml = r#"<table><tgroup><tbody><row/><row/></tbody></tgroup></table>"#;
/// let doc = Document::parse(xml).unwrap();
/// assert_eq!(find_descendants(doc.root_element(), "row").count(), 2);
/// ```
pub fn find_descendants<'a, 'input>(
    node: Node<'a, 'input>,
    tag: &'a str,
) -> impl Iterator<Item = Node<'a, 'input>> {
    node.descendants()
        .skip(1)
        .filter(move |child| has_tag(*child, tag))
}

/// Leading text of an element, untouched.
///
/// This is the text before the first child element; `None` when the
/// element is empty or starts with a child element.
pub fn raw_text(node: Node<'_, '_>) -> Option<String> {
    node.text().map(str::to_string)
}

/// Get the text content of a node, trimmed.
///
/// Returns an empty string if the node has no text.
pub fn get_text(node: Node<'_, '_>) -> String {
    node.text()
        .map(|s| s.trim().to_string())
        .unwrap_or_default()
}

/// Get an attribute value as an owned string.
pub fn attribute_owned(node: Node<'_, '_>, name: &str) -> Option<String> {
    node.attribute(name).map(str::to_string)
}

/// Check that a node carries every one of the named attributes.
///
/// Attribute values are not inspected.
pub fn has_all_attributes(node: Node<'_, '_>, names: &[&str]) -> bool {
    names.iter().all(|name| node.has_attribute(*name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use roxmltree::Document;

    #[test]
    fn test_get_tag_name_with_namespace() {
        let xml = r#"<ns:root xmlns:ns="http://example.com"><ns:child/></ns:root>"#;
        let doc = Document::parse(xml).unwrap();
        assert_eq!(get_tag_name(doc.root_element()), "root");
    }

    #[test]
    fn test_find_children() {
        let xml = r#"<Group><Port/><GroupHeader/><Port/></Group>"#;
        let doc = Document::parse(xml).unwrap();
        let items: Vec<_> = find_children(doc.root_element(), "Port").collect();
        assert_eq!(items.len(), 2);
    }

    #[test]
    fn test_find_descendants_excludes_self() {
        let xml = r#"<row><entry><row/></entry></row>"#;
        let doc = Document::parse(xml).unwrap();
        assert_eq!(find_descendants(doc.root_element(), "row").count(), 1);
    }

    #[test]
    fn test_raw_text_keeps_whitespace() {
        let xml = r#"<PAR>  spaced  </PAR>"#;
        let doc = Document::parse(xml).unwrap();
        assert_eq!(raw_text(doc.root_element()), Some("  spaced  ".to_string()));
    }

    #[test]
    fn test_raw_text_empty_element() {
        let xml = r#"<para/>"#;
        let doc = Document::parse(xml).unwrap();
        assert_eq!(raw_text(doc.root_element()), None);
    }

    #[test]
    fn test_get_text() {
        let xml = r#"<para>  trimmed text  </para>"#;
        let doc = Document::parse(xml).unwrap();
        assert_eq!(get_text(doc.root_element()), "trimmed text");
    }

    #[test]
    fn test_has_all_attributes() {
        let xml = r#"<entry namest="c1" nameend="c3"/>"#;
        let doc = Document::parse(xml).unwrap();
        let entry = doc.root_element();

        assert!(has_all_attributes(entry, &["namest", "nameend"]));
        assert!(!has_all_attributes(entry, &["namest", "morerows"]));
    }

    #[test]
    fn test_attribute_owned() {
        let xml = r#"<table ID="T1"/>"#;
        let doc = Document::parse(xml).unwrap();
        let table = doc.root_element();

        assert_eq!(attribute_owned(table, "ID"), Some("T1".to_string()));
        assert_eq!(attribute_owned(table, "updatedate"), None);
    }
}
