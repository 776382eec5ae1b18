//! End-to-end integration tests for the migration pipeline.
//!
//! Runs the migration on a small Polyglot export with multilingual posts,
//! a single-language page, and attachments of split and unsplit parents.

use std::fs;
use std::path::{Path, PathBuf};

use pretty_assertions::assert_eq;
use tempfile::tempdir;

use polylang_migrator::config::MigrationConfig;
use polylang_migrator::ids::TranslationPair;
use polylang_migrator::migration::{migrate, migrate_file};
use polylang_migrator::tags::{localize_tags, tag_statements};
use polylang_migrator::wxr::item::{CONTENT, EXCERPT, GUID, LINK, TITLE};
use polylang_migrator::wxr::{Item, WxrDocument};

/// Path of a fixture file.
fn fixture_path(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join("polyglot")
        .join(name)
}

/// Load fixture file content.
fn load_fixture(name: &str) -> String {
    let path = fixture_path(name);
    fs::read_to_string(&path).unwrap_or_else(|e| panic!("Failed to load {}: {}", path.display(), e))
}

fn config() -> MigrationConfig {
    MigrationConfig {
        site_url: "http://blog.example".to_string(),
        ..MigrationConfig::default()
    }
}

fn item(doc: &WxrDocument, id: i64) -> &Item {
    doc.items()
        .find(|item| item.id().unwrap() == id)
        .unwrap_or_else(|| panic!("no item {id}"))
}

/// Run the migration on the fixture export.
fn run_pipeline() -> polylang_migrator::MigrationOutcome {
    let doc = WxrDocument::parse(&load_fixture("export.xml")).expect("Failed to parse export");
    migrate(doc, &config(), 500).expect("Migration failed")
}

#[test]
fn test_pipeline_item_order() {
    let outcome = run_pipeline();
    assert_eq!(
        outcome.document.item_ids().unwrap(),
        vec![500, 501, 101, 502, 503, 504, 505, 901, 902]
    );
    assert_eq!(outcome.next_post_id, 506);
}

#[test]
fn test_pipeline_stats() {
    let stats = run_pipeline().stats;
    assert_eq!(stats.items, 6);
    assert_eq!(stats.split_items, 2);
    assert_eq!(stats.attachments, 3);
    assert_eq!(stats.split_attachments, 1);
}

#[test]
fn test_pipeline_identifier_map() {
    let outcome = run_pipeline();
    let entries: Vec<(i64, TranslationPair)> = outcome.id_map.iter().collect();
    assert_eq!(
        entries,
        vec![
            (100, TranslationPair { default: 500, other: 501 }),
            (102, TranslationPair { default: 502, other: 503 }),
            (900, TranslationPair { default: 504, other: 505 }),
        ]
    );
}

#[test]
fn test_pipeline_post_copies() {
    let outcome = run_pipeline();
    let doc = &outcome.document;

    let en = item(doc, 502);
    assert_eq!(en.text(TITLE).unwrap(), "News");
    assert_eq!(en.text(CONTENT).unwrap(), "<p>The lake\nwas calm.</p>");
    assert_eq!(en.text(EXCERPT).unwrap(), "Calm");
    assert_eq!(en.slug().unwrap(), "news");
    assert_eq!(en.text(LINK).unwrap(), "http://blog.example/2013/03/news/");
    assert_eq!(en.text(GUID).unwrap(), "http://blog.example/?p=502");

    let it = item(doc, 503);
    assert_eq!(it.text(TITLE).unwrap(), "Notizie");
    assert_eq!(it.text(CONTENT).unwrap(), "<p>Il lago\nera calmo.</p>");
    assert_eq!(it.text(EXCERPT).unwrap(), "Calma");
    assert_eq!(it.slug().unwrap(), "news-italiano");
    assert_eq!(it.text(LINK).unwrap(), "http://blog.example/2013/03/news-italiano/");
    assert_eq!(it.text(GUID).unwrap(), "http://blog.example/?p=503");
}

#[test]
fn test_pipeline_untranslated_title_is_suffixed() {
    let outcome = run_pipeline();
    assert_eq!(item(&outcome.document, 500).text(TITLE).unwrap(), "Hello");
    assert_eq!(
        item(&outcome.document, 501).text(TITLE).unwrap(),
        "Hello (Italiano)"
    );

    let corrected: Vec<(i64, &str)> = outcome
        .title_corrections
        .iter()
        .map(|c| (c.id, c.title.as_str()))
        .collect();
    assert_eq!(
        corrected,
        vec![(501, "Hello (Italiano)"), (505, "photo (Italiano)")]
    );
    assert!(outcome.title_collisions.is_empty());
}

#[test]
fn test_pipeline_attachment_copies() {
    let outcome = run_pipeline();
    let doc = &outcome.document;

    let en = item(doc, 504);
    assert_eq!(en.parent_id().unwrap(), 500);
    assert_eq!(en.text(TITLE).unwrap(), "photo");
    assert_eq!(en.slug().unwrap(), "photo");
    assert_eq!(en.text(GUID).unwrap(), "http://blog.example/?attachment_id=504");

    let it = item(doc, 505);
    assert_eq!(it.parent_id().unwrap(), 501);
    assert_eq!(it.slug().unwrap(), "photo-italiano");
    assert!(it
        .to_xml()
        .contains("<wp:attachment_url>http://blog.example/wp-content/uploads/2013/03/photo.jpg</wp:attachment_url>"));
}

#[test]
fn test_pipeline_untouched_items_are_verbatim() {
    let source = load_fixture("export.xml");
    let outcome = run_pipeline();
    let output = outcome.document.to_xml();

    for id in [101, 901, 902] {
        let xml = item(&outcome.document, id).to_xml();
        assert!(source.contains(&xml), "item {id} changed");
        assert!(output.contains(&xml), "item {id} not written as parsed");
    }
    assert!(output.contains("<title>About &#8220;us&#8221; &amp; friends</title>"));
    assert!(output.contains("<title>team &quot;2013&quot; &#x2014; Como</title>"));
    assert_eq!(
        item(&outcome.document, 901).text(TITLE).unwrap(),
        "team \"2013\" \u{2014} Como"
    );
    let header_end = source.find("\t<item>").unwrap();
    assert!(output.starts_with(&source[..header_end]));
    assert!(output.ends_with("\t</item>\n</channel>\n</rss>\n"));
}

#[test]
fn test_pipeline_corrections() {
    let outcome = run_pipeline();

    let parents: Vec<(i64, i64)> = outcome
        .parent_corrections
        .iter()
        .map(|c| (c.id, c.parent_id))
        .collect();
    assert_eq!(parents, vec![(504, 500), (505, 501), (901, 101), (902, 0)]);

    let slugs: Vec<(i64, &str)> = outcome
        .slug_corrections
        .iter()
        .map(|c| (c.id, c.slug.as_str()))
        .collect();
    assert_eq!(slugs, vec![(501, "hello"), (503, "news")]);
}

#[test]
fn test_output_parses_again_without_markup() {
    let outcome = run_pipeline();
    let reparsed = WxrDocument::parse(&outcome.document.to_xml()).unwrap();
    reparsed.validate_items().unwrap();

    let engine_config = config();
    let again = migrate(reparsed, &engine_config, 600).unwrap();
    assert!(again.id_map.is_empty());
    assert_eq!(again.stats.split_items, 0);
}

#[test]
fn test_migrate_file_writes_companions() {
    let dir = tempdir().unwrap();
    let output = dir.path().join("migrated.xml");

    migrate_file(&fixture_path("export.xml"), &output, &config(), 500).unwrap();

    let attach = fs::read_to_string(dir.path().join("migrated.xml.attach.sql")).unwrap();
    assert_eq!(
        attach,
        "UPDATE wp_posts SET post_parent=500 WHERE ID=504;\n\
         UPDATE wp_posts SET post_parent=501 WHERE ID=505;\n\
         UPDATE wp_posts SET post_parent=101 WHERE ID=901;\n\
         UPDATE wp_posts SET post_parent=0 WHERE ID=902;\n"
    );

    let names = fs::read_to_string(dir.path().join("migrated.xml.names.sql")).unwrap();
    assert_eq!(
        names,
        "UPDATE wp_posts SET post_name='hello' WHERE ID=501;\n\
         UPDATE wp_posts SET post_name='news' WHERE ID=503;\n"
    );

    let report = fs::read_to_string(dir.path().join("migrated.xml.report.yaml")).unwrap();
    assert!(report.starts_with("---\n"));
    assert!(report.contains("next_post_id: 506"));

    let migrated = WxrDocument::load(&output).unwrap();
    assert_eq!(migrated.items().count(), 9);
}

#[test]
fn test_localize_fixture_tags() {
    let tags = localize_tags(&load_fixture("export.xml"), &config(), 3000).unwrap();
    let slugs: Vec<&str> = tags.iter().map(|t| t.localized_slug.as_str()).collect();
    assert_eq!(slugs, vec!["mountains-it", "lake-como-it"]);

    let sql = tag_statements(&tags, &config());
    assert_eq!(sql.matches("INSERT INTO wp_terms ").count(), 2);
    assert!(sql.contains("VALUES ( 3001, 'Lake Como', 'lake-como-it' );"));
    assert!(sql.ends_with(";\n\n"));
}

mod cli {
    use super::*;
    use assert_cmd::Command;
    use pretty_assertions::assert_eq;
    use predicates::prelude::*;

    #[allow(deprecated)]
    fn migrator() -> Command {
        Command::cargo_bin("polylang-migrator").unwrap()
    }

    #[test]
    fn test_cli_help() {
        migrator()
            .arg("--help")
            .assert()
            .success()
            .stdout(predicate::str::contains("migrate"))
            .stdout(predicate::str::contains("localize-tags"));
    }

    #[test]
    fn test_cli_migrate() {
        let dir = tempdir().unwrap();
        let output = dir.path().join("out.xml");

        migrator()
            .arg("migrate")
            .arg(fixture_path("export.xml"))
            .arg(&output)
            .args(["--next-post-id", "500", "--site-url", "http://blog.example"])
            .assert()
            .success()
            .stdout(predicate::str::contains("Split items: 2"));

        assert!(output.exists());
        assert!(dir.path().join("out.xml.attach.sql").exists());
        assert!(dir.path().join("out.xml.names.sql").exists());
        assert!(dir.path().join("out.xml.report.yaml").exists());
    }

    #[test]
    fn test_cli_rejects_used_start_id() {
        let dir = tempdir().unwrap();

        migrator()
            .arg("migrate")
            .arg(fixture_path("export.xml"))
            .arg(dir.path().join("out.xml"))
            .args(["--next-post-id", "100"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("Error: Allocated id 100 is already used"));

        assert!(!dir.path().join("out.xml").exists());
    }

    #[test]
    fn test_cli_bad_tag_writes_nothing() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("export.xml");
        let broken = load_fixture("export.xml")
            .replace("<wp:term_id>8</wp:term_id>", "<wp:term_id>eight</wp:term_id>");
        fs::write(&input, broken).unwrap();
        let output = dir.path().join("out.xml");

        migrator()
            .arg("migrate")
            .arg(&input)
            .arg(&output)
            .args(["--next-post-id", "500", "--next-term-id", "3000"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("Error:"));

        assert!(!output.exists());
        assert!(!dir.path().join("out.xml.attach.sql").exists());
        assert!(!dir.path().join("out.xml.names.sql").exists());
        assert!(!dir.path().join("out.xml.report.yaml").exists());
        assert!(!dir.path().join("export.xml.tagmeta.sql").exists());
    }

    #[test]
    fn test_cli_missing_input() {
        migrator()
            .args(["item-ids", "does-not-exist.xml"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("Input file does not exist"));
    }

    #[test]
    fn test_cli_item_ids() {
        migrator()
            .arg("item-ids")
            .arg(fixture_path("export.xml"))
            .assert()
            .success()
            .stdout(predicate::str::contains("100\n101\n102\n900\n901\n902\n"))
            .stdout(predicate::str::contains("Items: 6"));
    }

    #[test]
    fn test_cli_titles() {
        let dir = tempdir().unwrap();
        let output = dir.path().join("titles.sql");

        migrator()
            .arg("titles")
            .arg(fixture_path("titles.txt"))
            .arg(&output)
            .assert()
            .success();

        assert_eq!(
            fs::read_to_string(&output).unwrap(),
            "UPDATE wp_posts SET post_title='Ciao' WHERE post_title='Hello (Italiano)';\n\
             UPDATE wp_posts SET post_title='La passeggiata d''oggi' WHERE post_title='Today''s walk (Italiano)';\n"
        );
    }

    #[test]
    fn test_cli_localize_tags() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("export.xml");
        fs::copy(fixture_path("export.xml"), &input).unwrap();

        migrator()
            .arg("localize-tags")
            .arg(&input)
            .args(["--next-term-id", "3000"])
            .assert()
            .success()
            .stdout(predicate::str::contains("Tags: 2"));

        let sql = fs::read_to_string(dir.path().join("export.xml.tagmeta.sql")).unwrap();
        assert!(sql.contains("'_language', 1561"));
    }

    #[test]
    fn test_cli_separate_attachments() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("site.xml");
        fs::copy(fixture_path("export.xml"), &input).unwrap();

        migrator()
            .arg("separate-attachments")
            .arg(&input)
            .assert()
            .success();

        let attachments = WxrDocument::load(&dir.path().join("site.attachments.xml")).unwrap();
        assert_eq!(attachments.item_ids().unwrap(), vec![900, 901, 902]);
        let posts = WxrDocument::load(&dir.path().join("site.posts.xml")).unwrap();
        assert_eq!(posts.item_ids().unwrap(), vec![100, 101, 102]);
    }
}
