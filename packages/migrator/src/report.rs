//! YAML report of a migration run.
//!
//! Lists everything a maintainer needs after the import: the id map, the
//! titles that were given the language suffix, and suffixed titles or
//! slugs that collide with existing ones.

use std::path::Path;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::error::Result;
use crate::ids::IdentifierMap;
use crate::output::write_atomic;
use crate::splitting::MigrationStats;
use crate::types::TitleCorrection;

/// A suffixed title that equals the title of another item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TitleCollision {
    /// Id of the copy that received the suffix.
    pub id: i64,

    /// Id of the item already carrying the same title.
    pub existing_id: i64,

    /// The colliding title.
    pub title: String,
}

/// A suffixed slug that equals the slug of another item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SlugCollision {
    /// Id of the other-language copy.
    pub id: i64,

    /// Id of the item already carrying the same slug.
    pub existing_id: i64,

    /// The colliding slug.
    pub slug: String,
}

/// Report representation for YAML serialization.
#[derive(Debug, Serialize)]
pub struct MigrationReport<'a> {
    /// When the report was generated.
    pub generated_at: DateTime<Utc>,

    /// First item id left unused by the run.
    pub next_post_id: i64,

    /// Counters.
    pub stats: MigrationStats,

    /// Original item id to the ids of its language copies.
    pub id_map: &'a IdentifierMap,

    /// Titles that received the language suffix.
    pub title_corrections: &'a [TitleCorrection],

    /// Suffixed titles clashing with other titles.
    pub title_collisions: &'a [TitleCollision],

    /// Suffixed slugs clashing with other slugs.
    pub slug_collisions: &'a [SlugCollision],
}

/// Serialize a report, with a document start marker.
pub fn generate_report(report: &MigrationReport<'_>) -> Result<String> {
    let yaml = serde_yaml_ng::to_string(report)?;
    let lines: Vec<&str> = yaml.lines().map(str::trim_end).collect();
    Ok(format!("---\n{}\n", lines.join("\n")))
}

/// Write a report file.
pub fn save_report(report: &MigrationReport<'_>, path: &Path) -> Result<()> {
    write_atomic(path, &generate_report(report)?)
}
