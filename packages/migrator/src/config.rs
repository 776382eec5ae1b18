//! Configuration constants and validation functions for the migrator.

use regex::Regex;
use std::sync::LazyLock;

use crate::error::{MigratorError, Result};

/// Site URL used for generated guids when none is given.
pub const DEFAULT_SITE_URL: &str = "http://localhost";

/// Database table prefix of the target WordPress installation.
pub const DEFAULT_TABLE_PREFIX: &str = "wp_";

/// Term id of the Polylang language term assigned to localized tags.
pub const DEFAULT_LANGUAGE_TERM_ID: i64 = 1561;

/// Default language: keeps the original slugs and permalinks.
pub const DEFAULT_LANGUAGE: (&str, &str) = ("en", "English");

/// Other language: gets suffixed slugs and permalinks.
pub const OTHER_LANGUAGE: (&str, &str) = ("it", "Italiano");

/// Polylang taxonomy holding the language assignment of a post.
pub const LANGUAGE_TAXONOMY: &str = "language";

/// Post meta key linking the language versions of a post.
pub const TRANSLATIONS_META_KEY: &str = "_translations";

/// Language argument pattern: two-letter code, colon, display name.
#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static LANGUAGE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([a-z]{2}):(\S.*)$").expect("valid regex"));

/// Site URL pattern: http(s) URL without query string or fragment.
#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static SITE_URL_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^https?://[^\s?#]+$").expect("valid regex"));

/// One of the two languages handled by a migration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LanguageSpec {
    /// Two-letter code used in `<lang_xx>` markers (e.g., "it").
    pub code: String,

    /// Display name used for taxonomy terms and suffixes (e.g., "Italiano").
    pub name: String,
}

impl LanguageSpec {
    /// Create a language from code and display name.
    #[must_use]
    pub fn new(code: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            name: name.into(),
        }
    }

    /// Parse a `CODE:NAME` command-line value.
    ///
    /// # Examples
    /// ```
    /// use polylang_migrator::config::LanguageSpec;
    ///
    /// let lang = LanguageSpec::parse("it:Italiano").unwrap();
    /// assert_eq!(lang.code, "it");
    /// assert_eq!(lang.name, "Italiano");
    /// assert!(LanguageSpec::parse("italian").is_err());
    /// ```
    pub fn parse(value: &str) -> Result<Self> {
        let caps = LANGUAGE_PATTERN
            .captures(value.trim())
            .ok_or_else(|| MigratorError::InvalidLanguage(value.to_string()))?;
        Ok(Self::new(&caps[1], caps[2].trim()))
    }

    /// Suffix appended to slugs and permalinks of this language's copies.
    ///
    /// # Examples
    /// ```
    /// use polylang_migrator::config::LanguageSpec;
    ///
    /// assert_eq!(LanguageSpec::new("it", "Italiano").slug_suffix(), "-italiano");
    /// ```
    #[must_use]
    pub fn slug_suffix(&self) -> String {
        let slug: String = self
            .name
            .to_lowercase()
            .chars()
            .map(|c| if c.is_alphanumeric() { c } else { '-' })
            .collect();
        format!("-{}", slug.trim_matches('-'))
    }

    /// Suffix appended to titles that would otherwise collide.
    #[must_use]
    pub fn title_suffix(&self) -> String {
        format!(" ({})", self.name)
    }
}

/// The two languages of a migration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LanguagePair {
    /// Language that keeps the original addressing.
    pub default: LanguageSpec,

    /// Language that gets suffixed addressing.
    pub other: LanguageSpec,
}

impl LanguagePair {
    /// Create a language pair, rejecting identical codes.
    pub fn new(default: LanguageSpec, other: LanguageSpec) -> Result<Self> {
        if default.code == other.code {
            return Err(MigratorError::InvalidLanguage(format!(
                "{}:{} (same code as the default language)",
                other.code, other.name
            )));
        }
        Ok(Self { default, other })
    }
}

impl Default for LanguagePair {
    fn default() -> Self {
        Self {
            default: LanguageSpec::new(DEFAULT_LANGUAGE.0, DEFAULT_LANGUAGE.1),
            other: LanguageSpec::new(OTHER_LANGUAGE.0, OTHER_LANGUAGE.1),
        }
    }
}

/// Settings shared by all migration steps.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationConfig {
    /// Languages handled by the migration.
    pub languages: LanguagePair,

    /// Base URL for generated guids, without trailing slash.
    pub site_url: String,

    /// Database table prefix used in companion SQL.
    pub table_prefix: String,

    /// Polylang language term id for localized tags.
    pub language_term_id: i64,
}

impl Default for MigrationConfig {
    fn default() -> Self {
        Self {
            languages: LanguagePair::default(),
            site_url: DEFAULT_SITE_URL.to_string(),
            table_prefix: DEFAULT_TABLE_PREFIX.to_string(),
            language_term_id: DEFAULT_LANGUAGE_TERM_ID,
        }
    }
}

impl MigrationConfig {
    /// Guid of a post-like item with the given id.
    #[must_use]
    pub fn post_guid(&self, id: i64) -> String {
        format!("{}/?p={id}", self.site_url)
    }

    /// Guid of an attachment item with the given id.
    #[must_use]
    pub fn attachment_guid(&self, id: i64) -> String {
        format!("{}/?attachment_id={id}", self.site_url)
    }

    /// Fully qualified table name.
    #[must_use]
    pub fn table(&self, name: &str) -> String {
        format!("{}{name}", self.table_prefix)
    }
}

/// Validate and normalize a site URL.
///
/// # Examples
/// ```
/// use polylang_migrator::config::validate_site_url;
///
/// assert_eq!(validate_site_url("http://example.org/").unwrap(), "http://example.org");
/// assert!(validate_site_url("example.org").is_err());
/// assert!(validate_site_url("http://example.org/?p=1").is_err());
/// ```
pub fn validate_site_url(url: &str) -> Result<String> {
    let trimmed = url.trim();
    if SITE_URL_PATTERN.is_match(trimmed) {
        Ok(trimmed.trim_end_matches('/').to_string())
    } else {
        Err(MigratorError::InvalidSiteUrl(url.to_string()))
    }
}

/// Validate an externally supplied allocator seed.
pub fn validate_start_id(id: i64) -> Result<i64> {
    if id > 0 {
        Ok(id)
    } else {
        Err(MigratorError::InvalidStartId(id))
    }
}
