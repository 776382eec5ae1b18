//! Polylang Migrator - Split Polyglot multilingual WordPress exports for Polylang.
//!
//! Polyglot keeps all languages of a post in one item, with the text of
//! each language wrapped in `<lang_xx>` markers. Polylang needs one post
//! per language, linked through metadata. This crate rewrites a WXR export
//! accordingly and produces the SQL fix-ups the WordPress importer cannot
//! apply by itself.
//!
//! # Example
//!
//! ```
//! use polylang_migrator::config::LanguagePair;
//! use polylang_migrator::markup::MarkupStripper;
//! use polylang_migrator::types::LanguageRole;
//!
//! let stripper = MarkupStripper::new(&LanguagePair::default()).unwrap();
//! let text = "<lang_en>Hello</lang_en><lang_it>Ciao</lang_it>";
//! assert_eq!(stripper.strip(text, LanguageRole::Other), "Ciao");
//! ```
//!
//! # Architecture
//!
//! - [`config`]: Configuration constants and validation
//! - [`types`]: Core data types (language roles, corrections)
//! - [`error`]: Error types and Result alias
//! - [`markup`]: Language marker detection and stripping
//! - [`ids`]: Id allocation and the identifier map
//! - [`xml`]: Owned element model and XML utilities
//! - [`wxr`]: WXR document model and Polylang metadata
//! - [`splitting`]: Item splitting and attachment relinking
//! - [`sql`]: SQL statements for parent and slug fix-ups
//! - [`tags`]: Other-language copies of post tags
//! - [`titles`]: Restoring lost title translations
//! - [`report`]: YAML migration report
//! - [`output`]: Writing result files
//! - [`migration`]: Main migration service
//! - [`cli`]: Command-line interface

pub mod cli;
pub mod config;
pub mod error;
pub mod ids;
pub mod markup;
pub mod migration;
pub mod output;
pub mod report;
pub mod splitting;
pub mod sql;
pub mod tags;
pub mod titles;
pub mod types;
pub mod wxr;
pub mod xml;

// Re-export main functions
pub use migration::{migrate, migrate_file, MigrationOutcome};

// Re-export commonly used items
pub use config::{LanguagePair, LanguageSpec, MigrationConfig};
pub use error::{MigratorError, Result};
pub use wxr::WxrDocument;
