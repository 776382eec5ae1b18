//! WXR documents as an ordered arena of channel nodes.
//!
//! Only `<item>` elements are converted into owned trees; everything else
//! in the channel (site metadata, authors, terms, whitespace) is kept as
//! verbatim source text, so untouched parts are written back unchanged.

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use roxmltree::Document;

use super::item::Item;
use crate::error::{MigratorError, Result};
use crate::output::write_atomic;
use crate::types::ItemKind;
use crate::xml::qualified_name;

/// One child of the `<channel>` element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChannelNode {
    /// Source text kept as-is.
    Raw(String),

    /// An item, owned and editable.
    Item(Item),
}

/// A parsed WXR export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WxrDocument {
    prologue: String,
    nodes: Vec<ChannelNode>,
    epilogue: String,
}

impl WxrDocument {
    /// Parse a WXR export.
    pub fn parse(xml: &str) -> Result<Self> {
        let doc = Document::parse(xml)?;
        let channel = doc
            .descendants()
            .find(|n| n.is_element() && qualified_name(*n) == "channel")
            .ok_or(MigratorError::MissingChannel)?;

        let (Some(first), Some(last)) = (channel.first_child(), channel.last_child()) else {
            return Ok(Self {
                prologue: xml.to_string(),
                nodes: Vec::new(),
                epilogue: String::new(),
            });
        };

        let mut nodes = Vec::new();
        for child in channel.children() {
            if child.is_element() && qualified_name(child) == "item" {
                nodes.push(ChannelNode::Item(Item::from_node(child, xml)));
            } else {
                let raw = xml.get(child.range()).unwrap_or_default();
                nodes.push(ChannelNode::Raw(raw.to_string()));
            }
        }

        let prologue = xml.get(..first.range().start).unwrap_or_default();
        let epilogue = xml.get(last.range().end..).unwrap_or_default();

        Ok(Self {
            prologue: prologue.to_string(),
            nodes,
            epilogue: epilogue.to_string(),
        })
    }

    /// Read and parse a WXR file.
    pub fn load(path: &Path) -> Result<Self> {
        let xml = fs::read_to_string(path)?;
        Self::parse(&xml)
    }

    /// Serialize the document.
    #[must_use]
    pub fn to_xml(&self) -> String {
        let mut out = String::with_capacity(self.prologue.len() + self.epilogue.len());
        out.push_str(&self.prologue);
        for node in &self.nodes {
            match node {
                ChannelNode::Raw(raw) => out.push_str(raw),
                ChannelNode::Item(item) => item.write_to(&mut out),
            }
        }
        out.push_str(&self.epilogue);
        out
    }

    /// Serialize the document to a file.
    pub fn save(&self, path: &Path) -> Result<()> {
        write_atomic(path, &self.to_xml())
    }

    /// Number of channel nodes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Check whether the channel is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Item at a channel position, if that position holds an item.
    #[must_use]
    pub fn item_at(&self, index: usize) -> Option<&Item> {
        match self.nodes.get(index) {
            Some(ChannelNode::Item(item)) => Some(item),
            _ => None,
        }
    }

    /// Item at a channel position, mutably.
    pub fn item_at_mut(&mut self, index: usize) -> Option<&mut Item> {
        match self.nodes.get_mut(index) {
            Some(ChannelNode::Item(item)) => Some(item),
            _ => None,
        }
    }

    /// Iterate items in document order.
    pub fn items(&self) -> impl Iterator<Item = &Item> {
        self.nodes.iter().filter_map(|node| match node {
            ChannelNode::Item(item) => Some(item),
            ChannelNode::Raw(_) => None,
        })
    }

    /// Replace the item at `index` by two items, in order.
    ///
    /// The copies take the original's position; the whitespace that preceded
    /// the original is repeated between them. Returns the position of the
    /// node that followed the original, where traversal resumes.
    pub fn replace_item(&mut self, index: usize, copies: [Item; 2]) -> usize {
        let separator = index
            .checked_sub(1)
            .and_then(|prev| match &self.nodes[prev] {
                ChannelNode::Raw(raw) if raw.trim().is_empty() => Some(raw.clone()),
                _ => None,
            })
            .unwrap_or_else(|| "\n".to_string());

        let [first, second] = copies;
        let replacement = [
            ChannelNode::Item(first),
            ChannelNode::Raw(separator),
            ChannelNode::Item(second),
        ];
        let inserted = replacement.len();
        self.nodes.splice(index..=index, replacement);
        index + inserted
    }

    /// Keep only the items matching `keep`.
    ///
    /// Whitespace directly before a removed item is removed with it.
    pub fn retain_items(&mut self, mut keep: impl FnMut(&Item) -> bool) {
        let mut retained: Vec<ChannelNode> = Vec::with_capacity(self.nodes.len());
        for node in self.nodes.drain(..) {
            match node {
                ChannelNode::Item(item) if !keep(&item) => {
                    if matches!(retained.last(), Some(ChannelNode::Raw(raw)) if raw.trim().is_empty())
                    {
                        retained.pop();
                    }
                }
                other => retained.push(other),
            }
        }
        self.nodes = retained;
    }

    /// Check every item for the fields the migration needs and for
    /// duplicate ids.
    ///
    /// Runs before any transformation so that a bad export aborts the run
    /// without producing partial output. Returns the ids of all items.
    pub fn validate_items(&self) -> Result<HashSet<i64>> {
        let mut seen = HashSet::new();
        for item in self.items() {
            let id = item.validate()?;
            if id <= 0 {
                return Err(MigratorError::InvalidNumber {
                    element: super::item::POST_ID.to_string(),
                    value: id.to_string(),
                    item: item.label(),
                });
            }
            if !seen.insert(id) {
                return Err(MigratorError::DuplicateItemId(id));
            }
        }
        Ok(seen)
    }

    /// Ids of all items in document order.
    pub fn item_ids(&self) -> Result<Vec<i64>> {
        self.items().map(Item::id).collect()
    }

    /// Split the document into an attachments-only and a posts-only copy.
    ///
    /// Useful when importing the full export times out: the posts can be
    /// imported once, the attachments retried until they succeed.
    pub fn separate_attachments(&self) -> Result<(Self, Self)> {
        for item in self.items() {
            item.kind()?;
        }
        let is_attachment =
            |item: &Item| matches!(item.kind(), Ok(ItemKind::Attachment));

        let mut attachments = self.clone();
        attachments.retain_items(is_attachment);

        let mut posts = self.clone();
        posts.retain_items(|item| !is_attachment(item));

        Ok((attachments, posts))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const NS: &str = r#"xmlns:wp="http://wordpress.org/export/1.2/""#;

    fn doc(items: &str) -> String {
        format!(
            "<?xml version=\"1.0\"?>\n<rss {NS}>\n<channel>\n\t<title>Blog</title>{items}\n</channel>\n</rss>\n"
        )
    }

    fn item(id: i64, post_type: &str) -> String {
        format!("\n\t<item><wp:post_id>{id}</wp:post_id><wp:post_type>{post_type}</wp:post_type></item>")
    }

    #[test]
    fn test_round_trip_is_identical() {
        let xml = doc(&format!("{}{}", item(1, "post"), item(2, "attachment")));
        let parsed = WxrDocument::parse(&xml).unwrap();
        assert_eq!(parsed.to_xml(), xml);
        assert_eq!(parsed.items().count(), 2);
    }

    #[test]
    fn test_missing_channel() {
        let err = WxrDocument::parse("<rss/>").unwrap_err();
        assert!(matches!(err, MigratorError::MissingChannel));
    }

    #[test]
    fn test_empty_channel() {
        let xml = "<rss><channel></channel></rss>";
        let parsed = WxrDocument::parse(xml).unwrap();
        assert!(parsed.is_empty());
        assert_eq!(parsed.to_xml(), xml);
    }

    #[test]
    fn test_replace_item_keeps_order_and_resumes_after() {
        let xml = doc(&format!("{}{}", item(1, "post"), item(2, "post")));
        let mut parsed = WxrDocument::parse(&xml).unwrap();

        let index = (0..parsed.len())
            .find(|i| parsed.item_at(*i).is_some())
            .unwrap();
        let original = parsed.item_at(index).unwrap().clone();
        let mut a = original.clone();
        a.set_id(10).unwrap();
        let mut b = original;
        b.set_id(11).unwrap();

        let next = parsed.replace_item(index, [a, b]);
        assert_eq!(parsed.item_ids().unwrap(), vec![10, 11, 2]);

        let following: Vec<i64> = (next..parsed.len())
            .filter_map(|i| parsed.item_at(i))
            .map(|item| item.id().unwrap())
            .collect();
        assert_eq!(following, vec![2]);
        assert!(parsed
            .to_xml()
            .contains("<wp:post_type>post</wp:post_type></item>\n\t<item><wp:post_id>11</wp:post_id>"));
    }

    #[test]
    fn test_separate_attachments() {
        let xml = doc(&format!(
            "{}{}{}",
            item(1, "post"),
            item(2, "attachment"),
            item(3, "page")
        ));
        let parsed = WxrDocument::parse(&xml).unwrap();
        let (attachments, posts) = parsed.separate_attachments().unwrap();

        assert_eq!(attachments.item_ids().unwrap(), vec![2]);
        assert_eq!(posts.item_ids().unwrap(), vec![1, 3]);
        assert!(posts.to_xml().contains("<title>Blog</title>"));
        assert_eq!(
            attachments.to_xml(),
            doc(&item(2, "attachment"))
        );
    }

    #[test]
    fn test_validate_rejects_duplicates() {
        let full = |id: i64| {
            format!(
                "<item><title>t</title><link>l</link><guid>g</guid>\
                 <content:encoded xmlns:content=\"urn:c\">c</content:encoded>\
                 <excerpt:encoded xmlns:excerpt=\"urn:e\"></excerpt:encoded>\
                 <wp:post_id>{id}</wp:post_id><wp:post_name>n</wp:post_name>\
                 <wp:post_type>post</wp:post_type></item>"
            )
        };
        let xml = doc(&format!("{}{}", full(1), full(1)));
        let parsed = WxrDocument::parse(&xml).unwrap();
        assert!(matches!(
            parsed.validate_items().unwrap_err(),
            MigratorError::DuplicateItemId(1)
        ));

        let xml = doc(&format!("{}{}", full(1), full(2)));
        let ids = WxrDocument::parse(&xml).unwrap().validate_items().unwrap();
        assert_eq!(ids, HashSet::from([1, 2]));
    }
}
