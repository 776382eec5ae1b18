//! Typed access to the fields of a WXR `<item>`.

use roxmltree::Node;

use crate::error::{MigratorError, Result};
use crate::types::ItemKind;
use crate::xml::Element;

/// `wp:post_id`: the item id.
pub const POST_ID: &str = "wp:post_id";
/// `wp:post_type`: post, page, attachment, ...
pub const POST_TYPE: &str = "wp:post_type";
/// `wp:post_parent`: parent item id, 0 for none.
pub const POST_PARENT: &str = "wp:post_parent";
/// `wp:post_name`: the slug.
pub const POST_NAME: &str = "wp:post_name";
/// `title`: the item title.
pub const TITLE: &str = "title";
/// `content:encoded`: the body.
pub const CONTENT: &str = "content:encoded";
/// `excerpt:encoded`: the excerpt.
pub const EXCERPT: &str = "excerpt:encoded";
/// `link`: the permalink at export time.
pub const LINK: &str = "link";
/// `guid`: the globally unique reference.
pub const GUID: &str = "guid";

/// Fields every item must carry for the migration to run.
pub const REQUIRED_FIELDS: [&str; 8] = [
    POST_ID, POST_TYPE, TITLE, CONTENT, EXCERPT, POST_NAME, LINK, GUID,
];

/// One `<item>` of a WXR channel.
///
/// A parsed item remembers its source text and serializes to it until the
/// first change, so untouched items keep their exact character and entity
/// references.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Item {
    element: Element,
    source: Option<String>,
}

impl Item {
    /// Wrap an owned `<item>` element.
    #[must_use]
    pub fn new(element: Element) -> Self {
        Self {
            element,
            source: None,
        }
    }

    /// Convert a parsed `<item>` node.
    #[must_use]
    pub fn from_node(node: Node<'_, '_>, input: &str) -> Self {
        Self {
            element: Element::from_node(node, input),
            source: input.get(node.range()).map(str::to_string),
        }
    }

    /// Check whether the item is still exactly as parsed.
    #[must_use]
    pub fn is_unchanged(&self) -> bool {
        self.source.is_some()
    }

    /// The underlying element.
    #[must_use]
    pub fn element(&self) -> &Element {
        &self.element
    }

    /// Human-readable identification for error messages.
    #[must_use]
    pub fn label(&self) -> String {
        self.element
            .child(POST_ID)
            .map(|e| e.text().trim().to_string())
            .filter(|id| !id.is_empty())
            .unwrap_or_else(|| "<without id>".to_string())
    }

    /// Check whether the item has a field.
    #[must_use]
    pub fn has_field(&self, name: &str) -> bool {
        self.element.child(name).is_some()
    }

    /// Raw text of a field.
    pub fn text(&self, name: &str) -> Result<String> {
        self.element
            .child(name)
            .map(Element::text)
            .ok_or_else(|| MigratorError::missing(name, self.label()))
    }

    /// Replace the text of a field.
    pub fn set_text(&mut self, name: &str, value: impl Into<String>) -> Result<()> {
        let label = self.label();
        let field = self
            .element
            .child_mut(name)
            .ok_or_else(|| MigratorError::missing(name, label))?;
        field.set_text(value);
        self.source = None;
        Ok(())
    }

    /// Replace the text of a field with a CDATA section.
    pub fn set_cdata(&mut self, name: &str, value: impl Into<String>) -> Result<()> {
        let label = self.label();
        let field = self
            .element
            .child_mut(name)
            .ok_or_else(|| MigratorError::missing(name, label))?;
        field.set_cdata(value);
        self.source = None;
        Ok(())
    }

    fn number(&self, name: &str) -> Result<i64> {
        let raw = self.text(name)?;
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Ok(0);
        }
        trimmed.parse().map_err(|_| MigratorError::InvalidNumber {
            element: name.to_string(),
            value: trimmed.to_string(),
            item: self.label(),
        })
    }

    /// Item id.
    pub fn id(&self) -> Result<i64> {
        self.number(POST_ID)
    }

    /// Set the item id.
    pub fn set_id(&mut self, id: i64) -> Result<()> {
        self.set_text(POST_ID, id.to_string())
    }

    /// Post type as written in the export.
    pub fn post_type(&self) -> Result<String> {
        Ok(self.text(POST_TYPE)?.trim().to_string())
    }

    /// Kind of the item.
    pub fn kind(&self) -> Result<ItemKind> {
        Ok(ItemKind::from_post_type(&self.post_type()?))
    }

    /// Parent id; 0 when the item has no parent.
    pub fn parent_id(&self) -> Result<i64> {
        self.number(POST_PARENT)
    }

    /// Set the parent id.
    pub fn set_parent_id(&mut self, id: i64) -> Result<()> {
        self.set_text(POST_PARENT, id.to_string())
    }

    /// Slug.
    pub fn slug(&self) -> Result<String> {
        self.text(POST_NAME)
    }

    /// Permalink.
    pub fn link(&self) -> Result<String> {
        self.text(LINK)
    }

    /// Append a child element at the end of the item.
    pub fn push_child(&mut self, child: Element) {
        self.element.append_child(child);
        self.source = None;
    }

    /// Check that the item carries every field the migration touches.
    ///
    /// Returns the item id.
    pub fn validate(&self) -> Result<i64> {
        for field in REQUIRED_FIELDS {
            if !self.has_field(field) {
                return Err(MigratorError::missing(field, self.label()));
            }
        }
        let id = self.id()?;
        if self.kind()? == ItemKind::Attachment {
            self.parent_id()?;
        }
        Ok(id)
    }

    /// Serialize the item.
    #[must_use]
    pub fn to_xml(&self) -> String {
        let mut out = String::new();
        self.write_to(&mut out);
        out
    }

    /// Serialize the item into `out`.
    pub fn write_to(&self, out: &mut String) {
        match &self.source {
            Some(source) => out.push_str(source),
            None => self.element.write_to(out),
        }
    }
}
