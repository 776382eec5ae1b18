//! Restoring other-language titles lost by the Polyglot exporter.
//!
//! Polyglot drops title translations from WXR exports, so after migration
//! the other-language copy carries the default title plus the language
//! suffix. Given the original multilingual titles (one per line), these
//! statements rename each such copy to its real translation.

use std::fs;
use std::path::Path;

use crate::config::MigrationConfig;
use crate::error::Result;
use crate::markup::MarkupStripper;
use crate::output::write_atomic;
use crate::sql::sql_string;
use crate::types::LanguageRole;

/// `UPDATE` renaming the suffixed copy of one multilingual title.
pub fn title_statement(line: &str, config: &MigrationConfig) -> Result<String> {
    let stripper = MarkupStripper::new(&config.languages)?;
    Ok(statement(&stripper, line, config))
}

fn statement(stripper: &MarkupStripper, line: &str, config: &MigrationConfig) -> String {
    let other = stripper.strip(line, LanguageRole::Other);
    let suffixed = format!(
        "{}{}",
        stripper.strip(line, LanguageRole::Default),
        config.languages.other.title_suffix()
    );
    format!(
        "UPDATE {} SET post_title={} WHERE post_title={};\n",
        config.table("posts"),
        sql_string(&other),
        sql_string(&suffixed)
    )
}

/// Statements for every line of a title list.
pub fn title_statements(text: &str, config: &MigrationConfig) -> Result<String> {
    let stripper = MarkupStripper::new(&config.languages)?;
    Ok(text
        .lines()
        .map(|line| statement(&stripper, line, config))
        .collect())
}

/// Convert a file of multilingual titles into an SQL script.
///
/// Returns the number of statements written.
pub fn convert_titles_file(input: &Path, output: &Path, config: &MigrationConfig) -> Result<usize> {
    let text = fs::read_to_string(input)?;
    let sql = title_statements(&text, config)?;
    write_atomic(output, &sql)?;
    let count = text.lines().count();
    tracing::info!(titles = count, path = %output.display(), "Wrote title statements");
    Ok(count)
}
