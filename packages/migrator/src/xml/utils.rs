//! Utility functions for navigating parsed `roxmltree` documents.

use roxmltree::Node;

/// Get the tag name as written in the source, including its namespace prefix.
///
/// WXR relies on prefixes (`wp:post_id`, `content:encoded`) to tell fields
/// apart, so lookups use the prefixed name rather than the local name.
///
/// # Examples
/// ```
/// use roxmltree::Document;
/// use polylang_migrator::xml::qualified_name;
///
/// let xml = r#"<rss xmlns:wp="http://wordpress.org/export/1.2/"><wp:post_id>1</wp:post_id></rss>"#;
/// let doc = Document::parse(xml).unwrap();
/// let id = doc.root_element().first_element_child().unwrap();
/// assert_eq!(qualified_name(id), "wp:post_id");
/// ```
pub fn qualified_name(node: Node<'_, '_>) -> String {
    let tag = node.tag_name();
    prefixed(node, tag.namespace(), tag.name())
}

/// Qualified name of an attribute of `node`.
pub fn qualified_attribute_name(
    node: Node<'_, '_>,
    namespace: Option<&str>,
    name: &str,
) -> String {
    prefixed(node, namespace, name)
}

fn prefixed(node: Node<'_, '_>, namespace: Option<&str>, name: &str) -> String {
    match namespace.and_then(|uri| node.lookup_prefix(uri)) {
        Some(prefix) if !prefix.is_empty() => format!("{prefix}:{name}"),
        _ => name.to_string(),
    }
}

/// Find the first child element with the given qualified name.
///
/// # Examples
/// ```
/// use roxmltree::Document;
/// use polylang_migrator::xml::find_child;
///
/// let xml = r#"<root><child1/><child2/></root>"#;
/// let doc = Document::parse(xml).unwrap();
/// let root = doc.root_element();
///
/// assert!(find_child(root, "child1").is_some());
/// assert!(find_child(root, "missing").is_none());
/// ```
pub fn find_child<'a, 'input>(node: Node<'a, 'input>, name: &str) -> Option<Node<'a, 'input>> {
    node.children()
        .find(|child| child.is_element() && qualified_name(*child) == name)
}

/// Find all descendant elements with the given qualified name.
pub fn find_descendants<'a, 'input>(
    node: Node<'a, 'input>,
    name: &'a str,
) -> impl Iterator<Item = Node<'a, 'input>> {
    node.descendants()
        .filter(move |n| n.is_element() && qualified_name(*n) == name)
}

/// Get the concatenated text of a node's children, trimmed.
///
/// Text and CDATA children both contribute.
pub fn get_text(node: Node<'_, '_>) -> String {
    node.children()
        .filter(|child| child.is_text())
        .filter_map(|child| child.text())
        .collect::<String>()
        .trim()
        .to_string()
}

/// Text of a named child element, trimmed.
pub fn child_text(node: Node<'_, '_>, name: &str) -> Option<String> {
    find_child(node, name).map(get_text)
}
