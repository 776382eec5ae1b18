//! Other-language copies of post tags.
//!
//! Tags are created directly in the database rather than through the WXR
//! importer. The importer silently skips tags it considers duplicates,
//! which would leave the Polylang metadata pointing at the wrong terms.

use std::path::{Path, PathBuf};

use roxmltree::Document;
use serde::Serialize;

use crate::config::{MigrationConfig, TRANSLATIONS_META_KEY};
use crate::error::{MigratorError, Result};
use crate::ids::{IdAllocator, TranslationPair};
use crate::output::{companion_path, write_atomic};
use crate::sql::sql_string;
use crate::wxr::translations_value;
use crate::xml::{child_text, find_child, find_descendants};

/// Element holding a tag in the channel header.
const TAG: &str = "wp:tag";

/// A post tag and its other-language copy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LocalizedTag {
    /// Term ids: the existing tag and the new copy.
    pub terms: TranslationPair,

    /// Tag name, shared by both terms.
    pub name: String,

    /// Slug of the existing tag.
    pub slug: String,

    /// Slug of the new copy.
    pub localized_slug: String,
}

/// Collect the post tags of an export and plan their other-language copies.
///
/// Elements without a `wp:tag_slug` belong to other taxonomies and are
/// skipped. Copy term ids come from a term allocator seeded with
/// `next_term_id`, independent of the item id allocator.
pub fn localize_tags(
    xml: &str,
    config: &MigrationConfig,
    next_term_id: i64,
) -> Result<Vec<LocalizedTag>> {
    let doc = Document::parse(xml)?;
    let channel = find_child(doc.root_element(), "channel").ok_or(MigratorError::MissingChannel)?;
    let suffix = format!("-{}", config.languages.other.code);
    let mut terms = IdAllocator::new(next_term_id);
    let mut tags = Vec::new();

    for tag in find_descendants(channel, TAG) {
        let Some(slug) = child_text(tag, "wp:tag_slug") else {
            continue;
        };
        let id_text = child_text(tag, "wp:term_id")
            .ok_or_else(|| MigratorError::missing("wp:term_id", &slug))?;
        let id = id_text
            .parse::<i64>()
            .map_err(|_| MigratorError::InvalidNumber {
                element: "wp:term_id".to_string(),
                value: id_text.clone(),
                item: slug.clone(),
            })?;
        let name = child_text(tag, "wp:tag_name").unwrap_or_default();

        let localized = LocalizedTag {
            terms: TranslationPair {
                default: id,
                other: terms.next_id(),
            },
            localized_slug: format!("{slug}{suffix}"),
            name,
            slug,
        };
        tracing::debug!(
            slug = %localized.slug,
            term = localized.terms.other,
            "Localized tag"
        );
        tags.push(localized);
    }

    tracing::info!(tags = tags.len(), "Collected post tags");
    Ok(tags)
}

/// SQL creating the other-language terms and their Polylang metadata.
///
/// Per tag: the term, its `post_tag` taxonomy row, its language, and the
/// translation association on both terms, followed by a blank line.
#[must_use]
pub fn tag_statements(tags: &[LocalizedTag], config: &MigrationConfig) -> String {
    let terms = config.table("terms");
    let taxonomy = config.table("term_taxonomy");
    let termmeta = config.table("termmeta");
    let mut sql = String::new();

    for tag in tags {
        let copy = tag.terms.other;
        let translations = sql_string(&translations_value(&config.languages, tag.terms));

        sql.push_str(&format!(
            "INSERT INTO {terms} (term_id, name, slug) VALUES ( {copy}, {}, {} );\n",
            sql_string(&tag.name),
            sql_string(&tag.localized_slug)
        ));
        sql.push_str(&format!(
            "INSERT INTO {taxonomy} (term_id, taxonomy) VALUES ( {copy}, 'post_tag' );\n"
        ));
        sql.push_str(&format!(
            "INSERT INTO {termmeta} (term_id, meta_key, meta_value) VALUES ( {copy}, '_language', {} );\n",
            config.language_term_id
        ));
        for term in [tag.terms.default, copy] {
            sql.push_str(&format!(
                "INSERT INTO {termmeta} (term_id, meta_key, meta_value) VALUES ( {term}, '{TRANSLATIONS_META_KEY}', {translations} );\n"
            ));
        }
        sql.push('\n');
    }
    sql
}

/// Path of the tag script written next to the export: `<input>.tagmeta.sql`.
#[must_use]
pub fn tag_script_path(input: &Path) -> PathBuf {
    companion_path(input, ".tagmeta.sql")
}

/// Read an export, plan its tag copies, and write the tag script.
pub fn localize_tags_file(
    input: &Path,
    config: &MigrationConfig,
    next_term_id: i64,
) -> Result<(Vec<LocalizedTag>, PathBuf)> {
    let xml = std::fs::read_to_string(input)?;
    let tags = localize_tags(&xml, config, next_term_id)?;
    let output = write_tag_script(&tags, input, config)?;
    Ok((tags, output))
}

/// Write the tag statements next to `input`; returns the script path.
pub fn write_tag_script(
    tags: &[LocalizedTag],
    input: &Path,
    config: &MigrationConfig,
) -> Result<PathBuf> {
    let output = tag_script_path(input);
    write_atomic(&output, &tag_statements(tags, config))?;
    Ok(output)
}
