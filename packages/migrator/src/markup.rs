//! Polyglot language markup stripping.
//!
//! Polyglot stores translations inline as `<lang_en>...</lang_en>` spans.
//! Stripping for one language removes every span of the other language,
//! then any stray half-markers of the other language left behind by
//! corrupted documents, and finally the markers (not the content) of the
//! kept language.

use regex::Regex;
use std::sync::LazyLock;

use crate::config::{LanguagePair, LanguageSpec};
use crate::error::Result;
use crate::types::LanguageRole;

/// Any Polyglot marker, for any two-letter language.
#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static ANY_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"</?lang_..>").expect("valid regex"));

/// Check whether text carries Polyglot markup of any language.
///
/// # Examples
/// ```
/// use polylang_migrator::markup::has_language_markup;
///
/// assert!(has_language_markup("<lang_en>Hi</lang_en>"));
/// assert!(has_language_markup("stray </lang_de> marker"));
/// assert!(!has_language_markup("plain <em>html</em>"));
/// ```
pub fn has_language_markup(text: &str) -> bool {
    ANY_MARKER.is_match(text)
}

/// Compiled patterns for keeping one language.
#[derive(Debug, Clone)]
struct KeepPatterns {
    /// Well-formed spans of the dropped language, shortest match.
    drop_span: Regex,
    /// Stray markers of the dropped language.
    drop_marker: Regex,
    /// Markers of the kept language.
    keep_marker: Regex,
}

impl KeepPatterns {
    fn new(keep: &LanguageSpec, drop: &LanguageSpec) -> Result<Self> {
        let drop_code = regex::escape(&drop.code);
        let keep_code = regex::escape(&keep.code);
        Ok(Self {
            drop_span: Regex::new(&format!(r"(?s)<lang_{drop_code}>.+?</lang_{drop_code}>"))?,
            drop_marker: Regex::new(&format!(r"</?lang_{drop_code}>"))?,
            keep_marker: Regex::new(&format!(r"</?lang_{keep_code}>"))?,
        })
    }

    fn strip(&self, text: &str) -> String {
        let without_spans = self.drop_span.replace_all(text, "");
        if self.drop_marker.is_match(&without_spans) {
            tracing::warn!(
                "Removing unpaired language marker (malformed source markup)"
            );
        }
        let without_stray = self.drop_marker.replace_all(&without_spans, "");
        self.keep_marker.replace_all(&without_stray, "").into_owned()
    }
}

/// Markup stripper for a configured language pair.
#[derive(Debug, Clone)]
pub struct MarkupStripper {
    to_default: KeepPatterns,
    to_other: KeepPatterns,
}

impl MarkupStripper {
    /// Compile the stripping patterns for both languages of a pair.
    pub fn new(languages: &LanguagePair) -> Result<Self> {
        Ok(Self {
            to_default: KeepPatterns::new(&languages.default, &languages.other)?,
            to_other: KeepPatterns::new(&languages.other, &languages.default)?,
        })
    }

    /// Produce the text of one language, without any markers of either.
    ///
    /// Text without markers is returned unchanged.
    ///
    /// # Examples
    /// ```
    /// use polylang_migrator::config::LanguagePair;
    /// use polylang_migrator::markup::MarkupStripper;
    /// use polylang_migrator::types::LanguageRole;
    ///
    /// let stripper = MarkupStripper::new(&LanguagePair::default()).unwrap();
    /// let text = "<lang_en>Hi</lang_en><lang_it>Ciao</lang_it>";
    /// assert_eq!(stripper.strip(text, LanguageRole::Default), "Hi");
    /// assert_eq!(stripper.strip(text, LanguageRole::Other), "Ciao");
    /// ```
    #[must_use]
    pub fn strip(&self, text: &str, keep: LanguageRole) -> String {
        match keep {
            LanguageRole::Default => self.to_default.strip(text),
            LanguageRole::Other => self.to_other.strip(text),
        }
    }
}
