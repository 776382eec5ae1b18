//! Error types for the migrator.
//!
//! Every error aborts the whole run: a partially written export with an
//! inconsistent identifier map is worse than no export at all.

use thiserror::Error;

/// Main error type for the migrator library.
#[derive(Debug, Error)]
pub enum MigratorError {
    /// XML parsing failed.
    #[error("XML parsing failed: {0}")]
    XmlParse(#[from] roxmltree::Error),

    /// The document has no `<channel>` element.
    #[error("No <channel> element found; is this a WXR export?")]
    MissingChannel,

    /// An item lacks a field the migration needs.
    #[error("Missing required element <{element}> in item {item}")]
    MissingElement { element: String, item: String },

    /// A numeric field could not be parsed.
    #[error("Invalid number '{value}' in <{element}> of item {item}")]
    InvalidNumber {
        element: String,
        value: String,
        item: String,
    },

    /// Two items in the source export share an id.
    #[error("Duplicate item id {0} in source export")]
    DuplicateItemId(i64),

    /// An identifier map entry would be written twice.
    #[error("Item {0} was already split; refusing to overwrite its identifier map entry")]
    IdentifierMapConflict(i64),

    /// Invalid language specification.
    #[error("Invalid language '{0}'. Expected CODE:NAME with a two-letter code (e.g., it:Italiano)")]
    InvalidLanguage(String),

    /// A language marker pattern could not be compiled.
    #[error("Invalid language marker pattern: {0}")]
    Pattern(#[from] regex::Error),

    /// Invalid site URL.
    #[error("Invalid site URL '{0}'. Expected an http(s) URL without query string")]
    InvalidSiteUrl(String),

    /// Invalid starting identifier.
    #[error("Invalid starting id {0}. Expected a positive integer")]
    InvalidStartId(i64),

    /// A freshly allocated id is already carried by an item of the export.
    #[error("Allocated id {0} is already used by an item in the export. Choose a starting id clear of the export's ids")]
    IdInUse(i64),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Report serialization error.
    #[error("Report serialization failed: {0}")]
    Report(#[from] serde_yaml_ng::Error),
}

impl MigratorError {
    /// Build a `MissingElement` error for an item.
    pub fn missing(element: &str, item: impl ToString) -> Self {
        Self::MissingElement {
            element: element.to_string(),
            item: item.to_string(),
        }
    }
}

/// Result type alias for migrator operations.
pub type Result<T> = std::result::Result<T, MigratorError>;
