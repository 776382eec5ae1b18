//! Command-line interface for the migrator.

use std::fs;
use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};

use crate::config::{
    validate_site_url, validate_start_id, LanguagePair, LanguageSpec, MigrationConfig,
    DEFAULT_LANGUAGE_TERM_ID, DEFAULT_SITE_URL, DEFAULT_TABLE_PREFIX,
};
use crate::error::{MigratorError, Result};
use crate::migration::{migrate, write_migration, MigrationOutcome};
use crate::output::companion_path;
use crate::tags::{localize_tags, localize_tags_file, write_tag_script, LocalizedTag};
use crate::titles::convert_titles_file;
use crate::wxr::WxrDocument;

/// Polylang Migrator - Split Polyglot multilingual WordPress exports for Polylang.
#[derive(Parser)]
#[command(name = "polylang-migrator")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Split multilingual items of a WXR export into per-language items.
    Migrate {
        /// WXR export to read
        input: PathBuf,

        /// Migrated WXR file to write
        output: PathBuf,

        /// First free post id in the target database
        #[arg(long)]
        next_post_id: i64,

        /// First free term id; also writes the localized tag script
        #[arg(long)]
        next_term_id: Option<i64>,

        /// Term id of the other language's Polylang language term
        #[arg(long, default_value_t = DEFAULT_LANGUAGE_TERM_ID)]
        language_term_id: i64,

        #[command(flatten)]
        site: SiteArgs,
    },

    /// Write SQL creating other-language copies of all post tags.
    LocalizeTags {
        /// WXR export to read
        input: PathBuf,

        /// First free term id in the target database
        #[arg(long)]
        next_term_id: i64,

        /// Term id of the other language's Polylang language term
        #[arg(long, default_value_t = DEFAULT_LANGUAGE_TERM_ID)]
        language_term_id: i64,

        #[command(flatten)]
        site: SiteArgs,
    },

    /// Write SQL restoring other-language titles from a list of multilingual titles.
    Titles {
        /// Text file with one multilingual title per line
        input: PathBuf,

        /// SQL file to write
        output: PathBuf,

        #[command(flatten)]
        site: SiteArgs,
    },

    /// List the ids of all items in a WXR export.
    ItemIds {
        /// WXR export to read
        input: PathBuf,
    },

    /// Split a WXR export into an attachments-only and a posts-only file.
    SeparateAttachments {
        /// WXR export to read
        input: PathBuf,
    },
}

/// Options describing the target site, shared by several commands.
#[derive(Args, Debug, Clone)]
pub struct SiteArgs {
    /// Site URL used for generated guids
    #[arg(long, default_value = DEFAULT_SITE_URL)]
    pub site_url: String,

    /// Default language as CODE:NAME; keeps original slugs
    #[arg(long, default_value = "en:English")]
    pub default_lang: String,

    /// Other language as CODE:NAME; gets suffixed slugs
    #[arg(long, default_value = "it:Italiano")]
    pub other_lang: String,

    /// Database table prefix
    #[arg(long, default_value = DEFAULT_TABLE_PREFIX)]
    pub table_prefix: String,
}

impl SiteArgs {
    /// Validate the options into a migration configuration.
    pub fn to_config(&self, language_term_id: i64) -> Result<MigrationConfig> {
        let languages = LanguagePair::new(
            LanguageSpec::parse(&self.default_lang)?,
            LanguageSpec::parse(&self.other_lang)?,
        )?;
        Ok(MigrationConfig {
            languages,
            site_url: validate_site_url(&self.site_url)?,
            table_prefix: self.table_prefix.clone(),
            language_term_id: validate_start_id(language_term_id)?,
        })
    }
}

/// Run the CLI.
pub fn run() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Migrate {
            input,
            output,
            next_post_id,
            next_term_id,
            language_term_id,
            site,
        } => migrate_command(
            &input,
            &output,
            next_post_id,
            next_term_id,
            &site.to_config(language_term_id)?,
        ),
        Commands::LocalizeTags {
            input,
            next_term_id,
            language_term_id,
            site,
        } => localize_tags_command(&input, next_term_id, &site.to_config(language_term_id)?),
        Commands::Titles {
            input,
            output,
            site,
        } => titles_command(&input, &output, &site.to_config(DEFAULT_LANGUAGE_TERM_ID)?),
        Commands::ItemIds { input } => item_ids_command(&input),
        Commands::SeparateAttachments { input } => separate_attachments_command(&input),
    }
}

/// Create the progress spinner used by long-running commands.
fn spinner(message: &'static str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    #[allow(clippy::expect_used)] // Static template string that is guaranteed to be valid
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .expect("valid template"),
    );
    pb.set_message(message);
    pb.enable_steady_tick(std::time::Duration::from_millis(100));
    pb
}

/// Fail early when the input file is missing.
fn require_file(path: &Path) -> Result<()> {
    if !path.is_file() {
        return Err(MigratorError::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("Input file does not exist: {}", path.display()),
        )));
    }
    Ok(())
}

/// Execute the migrate command.
fn migrate_command(
    input: &Path,
    output: &Path,
    next_post_id: i64,
    next_term_id: Option<i64>,
    config: &MigrationConfig,
) -> Result<()> {
    require_file(input)?;
    validate_start_id(next_post_id)?;
    if let Some(next_term_id) = next_term_id {
        validate_start_id(next_term_id)?;
    }

    println!(
        "{} {} ({} + {})",
        style("Migrating").bold(),
        style(input.display()).cyan(),
        style(&config.languages.default.name).green(),
        style(&config.languages.other.name).green()
    );
    println!();

    let pb = spinner("Splitting multilingual items...");
    let result = migrate_with_tags(input, output, next_post_id, next_term_id, config, &pb);
    pb.finish_and_clear();
    let (outcome, tags) = result?;

    let stats = outcome.stats;
    println!("  Items: {}", stats.items);
    println!("  Split items: {}", style(stats.split_items).green());
    println!("  Attachments: {}", stats.attachments);
    println!("  Split attachments: {}", style(stats.split_attachments).green());
    if !outcome.title_corrections.is_empty() {
        println!(
            "  Suffixed titles: {}",
            style(outcome.title_corrections.len()).yellow().bold()
        );
    }
    if !outcome.title_collisions.is_empty() {
        println!(
            "  Title collisions: {}",
            style(outcome.title_collisions.len()).red().bold()
        );
    }
    if !outcome.slug_collisions.is_empty() {
        println!(
            "  Slug collisions: {}",
            style(outcome.slug_collisions.len()).red().bold()
        );
    }
    println!("  Next free post id: {}", outcome.next_post_id);

    println!();
    println!("{} {}", style("Saved to:").green().bold(), output.display());
    for suffix in [".attach.sql", ".names.sql", ".report.yaml"] {
        println!("          {}", companion_path(output, suffix).display());
    }
    if let Some((tags, path)) = tags {
        println!("          {} ({} tags)", path.display(), tags.len());
    }

    Ok(())
}

/// Migrate and optionally localize tags, then write every result file.
///
/// Nothing is written unless both steps succeed.
fn migrate_with_tags(
    input: &Path,
    output: &Path,
    next_post_id: i64,
    next_term_id: Option<i64>,
    config: &MigrationConfig,
    pb: &ProgressBar,
) -> Result<(MigrationOutcome, Option<(Vec<LocalizedTag>, PathBuf)>)> {
    let xml = fs::read_to_string(input)?;
    let outcome = migrate(WxrDocument::parse(&xml)?, config, next_post_id)?;

    let tags = match next_term_id {
        Some(next_term_id) => {
            pb.set_message("Localizing tags...");
            Some(localize_tags(&xml, config, next_term_id)?)
        }
        None => None,
    };

    pb.set_message("Writing results...");
    write_migration(&outcome, output, config)?;
    let tags = match tags {
        Some(tags) => {
            let path = write_tag_script(&tags, input, config)?;
            Some((tags, path))
        }
        None => None,
    };
    Ok((outcome, tags))
}

/// Execute the localize-tags command.
fn localize_tags_command(input: &Path, next_term_id: i64, config: &MigrationConfig) -> Result<()> {
    require_file(input)?;
    validate_start_id(next_term_id)?;

    let (tags, path) = localize_tags_file(input, config, next_term_id)?;

    println!("  Tags: {}", style(tags.len()).green());
    println!("{} {}", style("Saved to:").green().bold(), path.display());
    Ok(())
}

/// Execute the titles command.
fn titles_command(input: &Path, output: &Path, config: &MigrationConfig) -> Result<()> {
    require_file(input)?;

    let count = convert_titles_file(input, output, config)?;

    println!("  Titles: {}", style(count).green());
    println!("{} {}", style("Saved to:").green().bold(), output.display());
    Ok(())
}

/// Execute the item-ids command.
fn item_ids_command(input: &Path) -> Result<()> {
    require_file(input)?;

    let ids = WxrDocument::load(input)?.item_ids()?;
    for id in &ids {
        println!("{id}");
    }
    println!("{} {}", style("Items:").bold(), ids.len());
    Ok(())
}

/// Paths written by separate-attachments: `<stem>.attachments.xml` and
/// `<stem>.posts.xml` next to the input.
#[must_use]
pub fn separated_paths(input: &Path) -> (PathBuf, PathBuf) {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    (
        input.with_file_name(format!("{stem}.attachments.xml")),
        input.with_file_name(format!("{stem}.posts.xml")),
    )
}

/// Execute the separate-attachments command.
fn separate_attachments_command(input: &Path) -> Result<()> {
    require_file(input)?;

    let pb = spinner("Separating attachments...");
    let result = WxrDocument::load(input).and_then(|doc| doc.separate_attachments());
    let (attachments, posts) = match result {
        Ok(docs) => docs,
        Err(e) => {
            pb.finish_and_clear();
            return Err(e);
        }
    };

    let (attachments_path, posts_path) = separated_paths(input);
    let saved = attachments
        .save(&attachments_path)
        .and_then(|()| posts.save(&posts_path));
    pb.finish_and_clear();
    saved?;

    println!(
        "  Attachments: {} -> {}",
        style(attachments.items().count()).green(),
        attachments_path.display()
    );
    println!(
        "  Other items: {} -> {}",
        style(posts.items().count()).green(),
        posts_path.display()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parse_migrate() {
        let cli = Cli::parse_from([
            "polylang-migrator",
            "migrate",
            "in.xml",
            "out.xml",
            "--next-post-id",
            "500",
        ]);

        let Commands::Migrate {
            input,
            output,
            next_post_id,
            next_term_id,
            language_term_id,
            site,
        } = cli.command
        else {
            panic!("expected migrate command");
        };
        assert_eq!(input, PathBuf::from("in.xml"));
        assert_eq!(output, PathBuf::from("out.xml"));
        assert_eq!(next_post_id, 500);
        assert!(next_term_id.is_none());
        assert_eq!(language_term_id, 1561);
        assert_eq!(site.site_url, "http://localhost");
        assert_eq!(site.other_lang, "it:Italiano");
    }

    #[test]
    fn test_cli_parse_migrate_with_languages() {
        let cli = Cli::parse_from([
            "polylang-migrator",
            "migrate",
            "in.xml",
            "out.xml",
            "--next-post-id",
            "500",
            "--default-lang",
            "de:Deutsch",
            "--other-lang",
            "fr:Français",
            "--site-url",
            "https://blog.example/",
        ]);

        let Commands::Migrate { site, .. } = cli.command else {
            panic!("expected migrate command");
        };
        let config = site.to_config(1561).unwrap();
        assert_eq!(config.languages.default.code, "de");
        assert_eq!(config.languages.other.name, "Français");
        assert_eq!(config.site_url, "https://blog.example");
    }

    #[test]
    fn test_cli_parse_localize_tags() {
        let cli = Cli::parse_from([
            "polylang-migrator",
            "localize-tags",
            "in.xml",
            "--next-term-id",
            "2000",
            "--language-term-id",
            "7",
        ]);

        let Commands::LocalizeTags {
            next_term_id,
            language_term_id,
            ..
        } = cli.command
        else {
            panic!("expected localize-tags command");
        };
        assert_eq!(next_term_id, 2000);
        assert_eq!(language_term_id, 7);
    }

    #[test]
    fn test_site_args_reject_same_language() {
        let site = SiteArgs {
            site_url: DEFAULT_SITE_URL.to_string(),
            default_lang: "it:Italiano".to_string(),
            other_lang: "it:Italiano".to_string(),
            table_prefix: DEFAULT_TABLE_PREFIX.to_string(),
        };
        assert!(site.to_config(1561).is_err());
    }

    #[test]
    fn test_separated_paths() {
        let (attachments, posts) = separated_paths(Path::new("dump/site.xml"));
        assert_eq!(attachments, PathBuf::from("dump/site.attachments.xml"));
        assert_eq!(posts, PathBuf::from("dump/site.posts.xml"));
    }
}
