//! Owned, mutable XML element trees.
//!
//! `roxmltree` documents are read-only, while the migration needs to copy
//! items and rewrite their fields. Items are therefore converted into this
//! small owned model, edited, and serialized back to XML text.

use roxmltree::Node;

use super::utils::{qualified_attribute_name, qualified_name};

/// A node inside an owned element tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum XmlNode {
    /// Child element.
    Element(Element),

    /// Character data, escaped on output.
    Text(String),

    /// Character data written as a CDATA section.
    CData(String),

    /// Comment.
    Comment(String),
}

/// An owned XML element with prefixed names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    /// Qualified tag name (e.g., "wp:post_id").
    pub name: String,

    /// Attributes in source order, names qualified.
    pub attributes: Vec<(String, String)>,

    /// Child nodes in source order.
    pub children: Vec<XmlNode>,
}

impl Element {
    /// Create an empty element.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Add an attribute.
    #[must_use]
    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.push((name.into(), value.into()));
        self
    }

    /// Add a text child.
    #[must_use]
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.children.push(XmlNode::Text(text.into()));
        self
    }

    /// Add a CDATA child.
    #[must_use]
    pub fn with_cdata(mut self, text: impl Into<String>) -> Self {
        self.children.push(XmlNode::CData(text.into()));
        self
    }

    /// Add a child element.
    #[must_use]
    pub fn with_child(mut self, child: Element) -> Self {
        self.children.push(XmlNode::Element(child));
        self
    }

    /// Convert a parsed element (and its subtree) into an owned element.
    ///
    /// `input` must be the source the node was parsed from; it is used to
    /// tell CDATA sections apart from plain text, which `roxmltree` merges.
    /// Namespace declarations made on this element itself are kept as
    /// `xmlns` attributes; inherited ones are left to the enclosing document.
    #[must_use]
    pub fn from_node(node: Node<'_, '_>, input: &str) -> Self {
        let mut element = Self::new(qualified_name(node));

        let inherited: Vec<_> = node
            .parent_element()
            .map(|p| p.namespaces().map(|ns| (ns.name(), ns.uri())).collect())
            .unwrap_or_default();
        for ns in node.namespaces() {
            if inherited.contains(&(ns.name(), ns.uri())) || ns.name() == Some("xml") {
                continue;
            }
            let name = match ns.name() {
                Some(prefix) => format!("xmlns:{prefix}"),
                None => "xmlns".to_string(),
            };
            element.attributes.push((name, ns.uri().to_string()));
        }

        for attr in node.attributes() {
            element.attributes.push((
                qualified_attribute_name(node, attr.namespace(), attr.name()),
                attr.value().to_string(),
            ));
        }

        for child in node.children() {
            if child.is_element() {
                element
                    .children
                    .push(XmlNode::Element(Self::from_node(child, input)));
            } else if child.is_text() {
                let text = child.text().unwrap_or_default().to_string();
                let raw = input.get(child.range()).unwrap_or_default();
                if raw.contains("<![CDATA[") {
                    element.children.push(XmlNode::CData(text));
                } else {
                    element.children.push(XmlNode::Text(text));
                }
            } else if child.is_comment() {
                element
                    .children
                    .push(XmlNode::Comment(child.text().unwrap_or_default().to_string()));
            }
        }

        // Keep `<x></x>` and `<x><![CDATA[]]></x>` apart from `<x/>`.
        if element.children.is_empty() {
            let raw = input.get(node.range()).unwrap_or_default();
            if raw.contains("<![CDATA[") {
                element.children.push(XmlNode::CData(String::new()));
            } else if !raw.ends_with("/>") {
                element.children.push(XmlNode::Text(String::new()));
            }
        }

        element
    }

    /// First child element with the given name.
    #[must_use]
    pub fn child(&self, name: &str) -> Option<&Element> {
        self.children.iter().find_map(|node| match node {
            XmlNode::Element(e) if e.name == name => Some(e),
            _ => None,
        })
    }

    /// First child element with the given name, mutably.
    pub fn child_mut(&mut self, name: &str) -> Option<&mut Element> {
        self.children.iter_mut().find_map(|node| match node {
            XmlNode::Element(e) if e.name == name => Some(e),
            _ => None,
        })
    }

    /// Iterate child elements.
    pub fn child_elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(|node| match node {
            XmlNode::Element(e) => Some(e),
            _ => None,
        })
    }

    /// Value of an attribute.
    #[must_use]
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    /// Content of this element as text, untrimmed.
    ///
    /// Character data is taken verbatim; child elements are serialized as
    /// markup, so `<title><lang_en>Hi</lang_en></title>` reads as
    /// `<lang_en>Hi</lang_en>`. Comments are skipped.
    #[must_use]
    pub fn text(&self) -> String {
        let mut out = String::new();
        for node in &self.children {
            match node {
                XmlNode::Text(t) | XmlNode::CData(t) => out.push_str(t),
                XmlNode::Element(e) => e.write_to(&mut out),
                XmlNode::Comment(_) => {}
            }
        }
        out
    }

    /// Replace the content of this element with character data.
    ///
    /// Elements that held a CDATA section keep holding one, so HTML content
    /// stays readable in the output.
    pub fn set_text(&mut self, text: impl Into<String>) {
        let was_cdata = self
            .children
            .iter()
            .any(|node| matches!(node, XmlNode::CData(_)));
        self.replace_text(text.into(), was_cdata);
    }

    /// Replace the character data of this element with a CDATA section.
    pub fn set_cdata(&mut self, text: impl Into<String>) {
        self.replace_text(text.into(), true);
    }

    fn replace_text(&mut self, text: String, cdata: bool) {
        let node = if cdata {
            XmlNode::CData(text)
        } else {
            XmlNode::Text(text)
        };
        self.children = vec![node];
    }

    /// Append a child element, repeating the indentation used before the
    /// last existing child element so the output stays aligned.
    pub fn append_child(&mut self, child: Element) {
        let last_element = self
            .children
            .iter()
            .rposition(|node| matches!(node, XmlNode::Element(_)));
        let indent = last_element
            .and_then(|pos| pos.checked_sub(1))
            .and_then(|pos| match &self.children[pos] {
                XmlNode::Text(t) if t.trim().is_empty() => Some(t.clone()),
                _ => None,
            });

        let insert_at = last_element.map_or(self.children.len(), |pos| pos + 1);
        let mut nodes = Vec::with_capacity(2);
        if let Some(indent) = indent {
            nodes.push(XmlNode::Text(indent));
        }
        nodes.push(XmlNode::Element(child));
        self.children.splice(insert_at..insert_at, nodes);
    }

    /// Serialize this element as XML text.
    #[must_use]
    pub fn to_xml(&self) -> String {
        let mut out = String::new();
        self.write_to(&mut out);
        out
    }

    /// Serialize this element into `out`.
    pub fn write_to(&self, out: &mut String) {
        out.push('<');
        out.push_str(&self.name);
        for (name, value) in &self.attributes {
            out.push(' ');
            out.push_str(name);
            out.push_str("=\"");
            out.push_str(&escape_attribute(value));
            out.push('"');
        }

        if self.children.is_empty() {
            out.push_str("/>");
            return;
        }

        out.push('>');
        for child in &self.children {
            match child {
                XmlNode::Element(e) => e.write_to(out),
                XmlNode::Text(t) => out.push_str(&escape_text(t)),
                XmlNode::CData(t) => write_cdata(t, out),
                XmlNode::Comment(c) => {
                    out.push_str("<!--");
                    out.push_str(c);
                    out.push_str("-->");
                }
            }
        }
        out.push_str("</");
        out.push_str(&self.name);
        out.push('>');
    }
}

/// Escape character data.
///
/// # Examples
/// ```
/// use polylang_migrator::xml::escape_text;
///
/// assert_eq!(escape_text("a < b & c"), "a &lt; b &amp; c");
/// ```
pub fn escape_text(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// Escape an attribute value for double-quoted output.
pub fn escape_attribute(value: &str) -> String {
    escape_text(value).replace('"', "&quot;")
}

/// Write a CDATA section, splitting it where the content contains `]]>`.
fn write_cdata(text: &str, out: &mut String) {
    out.push_str("<![CDATA[");
    out.push_str(&text.replace("]]>", "]]]]><![CDATA[>"));
    out.push_str("]]>");
}
