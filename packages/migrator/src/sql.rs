//! SQL companion files for fix-ups the WXR importer cannot express.
//!
//! Attachment parents and slugs of other-language copies are corrected
//! with plain `UPDATE` statements run against the target database after
//! the import.

use crate::config::MigrationConfig;
use crate::types::{ParentCorrection, SlugCorrection};

/// Quote a string as an SQL literal, doubling embedded single quotes.
///
/// # Examples
/// ```
/// use polylang_migrator::sql::sql_string;
///
/// assert_eq!(sql_string("it's"), "'it''s'");
/// ```
#[must_use]
pub fn sql_string(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

/// One `UPDATE` per parent correction, in recording order.
#[must_use]
pub fn parent_statements(corrections: &[ParentCorrection], config: &MigrationConfig) -> String {
    let posts = config.table("posts");
    corrections
        .iter()
        .map(|c| {
            format!(
                "UPDATE {posts} SET post_parent={} WHERE ID={};\n",
                c.parent_id, c.id
            )
        })
        .collect()
}

/// One `UPDATE` per slug correction, in recording order.
#[must_use]
pub fn slug_statements(corrections: &[SlugCorrection], config: &MigrationConfig) -> String {
    let posts = config.table("posts");
    corrections
        .iter()
        .map(|c| {
            format!(
                "UPDATE {posts} SET post_name={} WHERE ID={};\n",
                sql_string(&c.slug),
                c.id
            )
        })
        .collect()
}
