//! Polylang metadata written into WXR items.

use crate::config::{LanguagePair, LanguageSpec, LANGUAGE_TAXONOMY, TRANSLATIONS_META_KEY};
use crate::ids::TranslationPair;
use crate::xml::Element;

/// PHP-serialized `array(code => id, ...)` as Polylang stores translations.
///
/// # Examples
/// ```
/// use polylang_migrator::wxr::serialize_translations;
///
/// assert_eq!(
///     serialize_translations(&[("en", 500), ("it", 501)]),
///     r#"a:2:{s:2:"en";i:500;s:2:"it";i:501;}"#
/// );
/// ```
pub fn serialize_translations(entries: &[(&str, i64)]) -> String {
    let body: String = entries
        .iter()
        .map(|(code, id)| format!("s:{}:\"{code}\";i:{id};", code.len()))
        .collect();
    format!("a:{}:{{{body}}}", entries.len())
}

/// Translation association of a split item, default language first.
#[must_use]
pub fn translations_value(languages: &LanguagePair, pair: TranslationPair) -> String {
    serialize_translations(&[
        (languages.default.code.as_str(), pair.default),
        (languages.other.code.as_str(), pair.other),
    ])
}

/// `<category domain="language">` assigning an item to a language.
#[must_use]
pub fn language_category(language: &LanguageSpec) -> Element {
    Element::new("category")
        .with_attribute("domain", LANGUAGE_TAXONOMY)
        .with_attribute("nicename", &language.code)
        .with_cdata(&language.name)
}

/// `<wp:postmeta>` linking the two language copies of an item.
///
/// Each copy needs its own element; callers clone the returned value rather
/// than sharing one element between two items.
#[must_use]
pub fn translations_meta(languages: &LanguagePair, pair: TranslationPair) -> Element {
    Element::new("wp:postmeta")
        .with_child(Element::new("wp:meta_key").with_text(TRANSLATIONS_META_KEY))
        .with_child(Element::new("wp:meta_value").with_cdata(translations_value(languages, pair)))
}
