//! Migration service that ties all components together.

use std::collections::HashMap;
use std::path::Path;

use chrono::Utc;

use crate::config::{validate_start_id, MigrationConfig};
use crate::error::Result;
use crate::ids::IdentifierMap;
use crate::output::{companion_path, write_atomic};
use crate::report::{save_report, MigrationReport, SlugCollision, TitleCollision};
use crate::splitting::{
    relink_attachments, split_multilingual_items, CopyOrigin, MigrationStats, SplitEngine,
    SplitState,
};
use crate::sql::{parent_statements, slug_statements};
use crate::types::{LanguageRole, ParentCorrection, SlugCorrection, TitleCorrection};
use crate::wxr::item::TITLE;
use crate::wxr::WxrDocument;

/// Everything a migration produces.
#[derive(Debug, Clone)]
pub struct MigrationOutcome {
    /// The migrated export.
    pub document: WxrDocument,

    /// Original item id to copy ids, for every split item.
    pub id_map: IdentifierMap,

    /// One entry per attachment, in visiting order.
    pub parent_corrections: Vec<ParentCorrection>,

    /// One entry per other-language post copy, in document order.
    pub slug_corrections: Vec<SlugCorrection>,

    /// Other-language titles that received the language suffix.
    pub title_corrections: Vec<TitleCorrection>,

    /// Suffixed titles equal to the title of another item.
    pub title_collisions: Vec<TitleCollision>,

    /// Suffixed slugs equal to the slug of another item.
    pub slug_collisions: Vec<SlugCollision>,

    /// Counters.
    pub stats: MigrationStats,

    /// First item id left unused.
    pub next_post_id: i64,
}

impl MigrationOutcome {
    /// Report of this outcome, stamped with the current time.
    #[must_use]
    pub fn report(&self) -> MigrationReport<'_> {
        MigrationReport {
            generated_at: Utc::now(),
            next_post_id: self.next_post_id,
            stats: self.stats,
            id_map: &self.id_map,
            title_corrections: &self.title_corrections,
            title_collisions: &self.title_collisions,
            slug_collisions: &self.slug_collisions,
        }
    }
}

/// Migrate a Polyglot export to Polylang.
///
/// Validates every item first, so a malformed export is rejected before
/// anything is changed. Then splits multilingual items (pass 1) and
/// relinks attachments (pass 2).
///
/// # Arguments
/// * `document` - The loaded export
/// * `config` - Languages, site URL, and table prefix
/// * `next_post_id` - First free post id in the target database
pub fn migrate(
    mut document: WxrDocument,
    config: &MigrationConfig,
    next_post_id: i64,
) -> Result<MigrationOutcome> {
    validate_start_id(next_post_id)?;
    let source_ids = document.validate_items()?;

    let engine = SplitEngine::new(config)?;
    let mut state = SplitState::with_source_ids(next_post_id, source_ids);

    split_multilingual_items(&mut document, &engine, &mut state)?;
    relink_attachments(&mut document, &engine, &mut state)?;

    let title_collisions = find_title_collisions(&document, &state.title_corrections)?;
    let slug_collisions = find_slug_collisions(&document, &state.copies)?;

    Ok(MigrationOutcome {
        document,
        id_map: state.id_map,
        parent_corrections: state.parent_corrections,
        slug_corrections: state.slug_corrections,
        title_corrections: state.title_corrections,
        title_collisions,
        slug_collisions,
        stats: state.stats,
        next_post_id: state.allocator.peek(),
    })
}

/// Find suffixed titles that another item already carries.
fn find_title_collisions(
    document: &WxrDocument,
    corrections: &[TitleCorrection],
) -> Result<Vec<TitleCollision>> {
    let mut titles: HashMap<String, Vec<i64>> = HashMap::new();
    for item in document.items() {
        titles.entry(item.text(TITLE)?).or_default().push(item.id()?);
    }

    let mut collisions = Vec::new();
    for correction in corrections {
        let Some(ids) = titles.get(&correction.title) else {
            continue;
        };
        for &existing_id in ids.iter().filter(|&&id| id != correction.id) {
            tracing::warn!(
                id = correction.id,
                existing = existing_id,
                title = %correction.title,
                "Suffixed title collides with an existing title"
            );
            collisions.push(TitleCollision {
                id: correction.id,
                existing_id,
                title: correction.title.clone(),
            });
        }
    }
    Ok(collisions)
}

/// Find slugs of other-language copies that another item already carries.
///
/// Empty slugs are left to WordPress and never collide.
fn find_slug_collisions(
    document: &WxrDocument,
    copies: &HashMap<i64, CopyOrigin>,
) -> Result<Vec<SlugCollision>> {
    let mut slugs: HashMap<String, Vec<i64>> = HashMap::new();
    let mut suffixed = Vec::new();
    for item in document.items() {
        let id = item.id()?;
        let slug = item.slug()?.trim().to_string();
        if slug.is_empty() {
            continue;
        }
        if matches!(copies.get(&id), Some(origin) if origin.role == LanguageRole::Other) {
            suffixed.push((id, slug.clone()));
        }
        slugs.entry(slug).or_default().push(id);
    }

    let mut collisions = Vec::new();
    for (id, slug) in suffixed {
        let Some(ids) = slugs.get(&slug) else {
            continue;
        };
        for &existing_id in ids.iter().filter(|&&other| other != id) {
            tracing::warn!(
                id,
                existing = existing_id,
                slug = %slug,
                "Suffixed slug collides with an existing slug"
            );
            collisions.push(SlugCollision {
                id,
                existing_id,
                slug: slug.clone(),
            });
        }
    }
    Ok(collisions)
}

/// Migrate an export file and write all result files.
///
/// Writes the migrated export to `output`, and next to it
/// `<output>.attach.sql` (parent corrections), `<output>.names.sql`
/// (slug corrections), and `<output>.report.yaml`.
pub fn migrate_file(
    input: &Path,
    output: &Path,
    config: &MigrationConfig,
    next_post_id: i64,
) -> Result<MigrationOutcome> {
    let document = WxrDocument::load(input)?;
    let outcome = migrate(document, config, next_post_id)?;
    write_migration(&outcome, output, config)?;
    Ok(outcome)
}

/// Write a migration outcome: the export to `output` and its companion
/// files next to it.
pub fn write_migration(
    outcome: &MigrationOutcome,
    output: &Path,
    config: &MigrationConfig,
) -> Result<()> {
    outcome.document.save(output)?;
    write_atomic(
        &companion_path(output, ".attach.sql"),
        &parent_statements(&outcome.parent_corrections, config),
    )?;
    write_atomic(
        &companion_path(output, ".names.sql"),
        &slug_statements(&outcome.slug_corrections, config),
    )?;
    save_report(&outcome.report(), &companion_path(output, ".report.yaml"))?;

    tracing::info!(
        output = %output.display(),
        next_post_id = outcome.next_post_id,
        "Migration written"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::MigratorError;
    use crate::ids::TranslationPair;
    use pretty_assertions::assert_eq;

    const HEADER: &str = r#"<?xml version="1.0" encoding="UTF-8" ?>
<rss version="2.0" xmlns:excerpt="http://wordpress.org/export/1.2/excerpt/" xmlns:content="http://purl.org/rss/1.0/modules/content/" xmlns:wp="http://wordpress.org/export/1.2/">
<channel>
	<title>Blog</title>"#;

    fn post(id: i64, title: &str, content: &str) -> String {
        format!(
            r#"
	<item>
		<title>{title}</title>
		<link>http://blog.example/p{id}/</link>
		<guid isPermaLink="false">http://blog.example/?p={id}</guid>
		<content:encoded><![CDATA[{content}]]></content:encoded>
		<excerpt:encoded><![CDATA[]]></excerpt:encoded>
		<wp:post_id>{id}</wp:post_id>
		<wp:post_name>p{id}</wp:post_name>
		<wp:post_parent>0</wp:post_parent>
		<wp:post_type>post</wp:post_type>
	</item>"#
        )
    }

    fn export(items: &[String]) -> WxrDocument {
        let xml = format!("{HEADER}{}\n</channel>\n</rss>\n", items.concat());
        WxrDocument::parse(&xml).unwrap()
    }

    #[test]
    fn test_migrate_example_post() {
        let doc = export(&[post(
            100,
            "Hello",
            "<lang_en>Hi</lang_en><lang_it>Ciao</lang_it>",
        )]);

        let outcome = migrate(doc, &MigrationConfig::default(), 500).unwrap();

        assert_eq!(outcome.document.item_ids().unwrap(), vec![500, 501]);
        assert_eq!(
            outcome.id_map.get(100),
            Some(TranslationPair { default: 500, other: 501 })
        );
        assert_eq!(outcome.slug_corrections.len(), 1);
        assert!(outcome.parent_corrections.is_empty());
        assert_eq!(outcome.title_corrections[0].title, "Hello (Italiano)");
        assert_eq!(outcome.next_post_id, 502);
    }

    fn attachment(id: i64, parent: i64) -> String {
        format!(
            r#"
	<item>
		<title>photo</title>
		<link>http://blog.example/photo/</link>
		<guid isPermaLink="false">http://blog.example/wp-content/uploads/photo.jpg</guid>
		<content:encoded><![CDATA[]]></content:encoded>
		<excerpt:encoded><![CDATA[]]></excerpt:encoded>
		<wp:post_id>{id}</wp:post_id>
		<wp:post_name>photo</wp:post_name>
		<wp:post_parent>{parent}</wp:post_parent>
		<wp:post_type>attachment</wp:post_type>
	</item>"#
        )
    }

    #[test]
    fn test_start_id_below_source_ids() {
        let doc = export(&[
            post(100, "Hello", "<lang_en>Hi</lang_en><lang_it>Ciao</lang_it>"),
            attachment(900, 100),
        ]);

        let outcome = migrate(doc, &MigrationConfig::default(), 500).unwrap();

        assert_eq!(outcome.document.item_ids().unwrap(), vec![500, 501, 502, 503]);
        assert_eq!(
            outcome.id_map.get(900),
            Some(TranslationPair { default: 502, other: 503 })
        );
        assert_eq!(
            outcome.parent_corrections,
            vec![
                ParentCorrection { id: 502, parent_id: 500 },
                ParentCorrection { id: 503, parent_id: 501 },
            ]
        );
        assert_eq!(outcome.next_post_id, 504);
    }

    #[test]
    fn test_allocated_id_hitting_source_id_is_rejected() {
        let doc = export(&[
            post(1, "A", "<lang_en>a</lang_en>"),
            post(501, "B", "plain"),
        ]);

        let err = migrate(doc, &MigrationConfig::default(), 500).unwrap_err();
        assert!(matches!(err, MigratorError::IdInUse(501)));
    }

    #[test]
    fn test_start_id_inside_unsplit_ids_is_accepted() {
        let doc = export(&[post(500, "A", "plain"), post(501, "B", "plain")]);

        let outcome = migrate(doc, &MigrationConfig::default(), 500).unwrap();
        assert_eq!(outcome.document.item_ids().unwrap(), vec![500, 501]);
        assert_eq!(outcome.next_post_id, 500);
    }

    #[test]
    fn test_suffixed_slugs_are_unique_across_the_tree() {
        let draft = |id: i64| {
            post(id, "Draft", "<lang_en>a</lang_en><lang_it>b</lang_it>").replace(
                &format!("<wp:post_name>p{id}</wp:post_name>"),
                "<wp:post_name></wp:post_name>",
            )
        };
        let doc = export(&[draft(1), draft(2), post(3, "C", "<lang_en>c</lang_en>")]);

        let outcome = migrate(doc, &MigrationConfig::default(), 500).unwrap();

        let slugs: Vec<String> = outcome
            .document
            .items()
            .map(|item| item.slug().unwrap())
            .filter(|slug| !slug.is_empty())
            .collect();
        let unique: std::collections::HashSet<&String> = slugs.iter().collect();
        assert_eq!(slugs, vec!["501-italiano", "503-italiano", "p3", "p3-italiano"]);
        assert_eq!(unique.len(), slugs.len());
        assert!(outcome.slug_collisions.is_empty());
    }

    #[test]
    fn test_slug_collision_is_reported() {
        let doc = export(&[
            post(1, "Hello", "<lang_en>Hi</lang_en><lang_it>Ciao</lang_it>"),
            post(2, "Other", "plain").replace(
                "<wp:post_name>p2</wp:post_name>",
                "<wp:post_name>p1-italiano</wp:post_name>",
            ),
        ]);

        let outcome = migrate(doc, &MigrationConfig::default(), 500).unwrap();

        assert_eq!(
            outcome.slug_collisions,
            vec![SlugCollision {
                id: 501,
                existing_id: 2,
                slug: "p1-italiano".to_string(),
            }]
        );
    }

    #[test]
    fn test_invalid_item_aborts_before_splitting() {
        let broken = "\n\t<item><title>x</title><wp:post_id>7</wp:post_id></item>".to_string();
        let doc = export(&[post(1, "A", "<lang_en>a</lang_en>"), broken]);

        let err = migrate(doc, &MigrationConfig::default(), 500).unwrap_err();
        assert!(matches!(err, MigratorError::MissingElement { .. }));
    }

    #[test]
    fn test_title_collision_is_reported() {
        let doc = export(&[
            post(1, "Hello (Italiano)", "plain"),
            post(2, "Hello", "<lang_en>Hi</lang_en><lang_it>Ciao</lang_it>"),
        ]);

        let outcome = migrate(doc, &MigrationConfig::default(), 500).unwrap();

        assert_eq!(
            outcome.title_collisions,
            vec![TitleCollision {
                id: 501,
                existing_id: 1,
                title: "Hello (Italiano)".to_string(),
            }]
        );
    }
}
