//! Strategies for deriving the language-specific fields of a copy.

use super::engine::SplitEngine;
use crate::error::Result;
use crate::ids::TranslationPair;
use crate::types::LanguageRole;
use crate::wxr::item::{CONTENT, EXCERPT, TITLE};
use crate::wxr::Item;

/// Strategy trait for the parts of a split that differ by item kind.
///
/// The engine handles ids, addressing, and Polylang metadata; the strategy
/// only adapts text fields and references of each copy.
pub trait SplitStrategy {
    /// Adapt one copy to its language.
    ///
    /// `original` is the unmodified source item.
    ///
    /// Returns the suffixed title when the copy's title had to be
    /// disambiguated.
    fn localize(
        &self,
        engine: &SplitEngine<'_>,
        copy: &mut Item,
        original: &Item,
        role: LanguageRole,
    ) -> Result<Option<String>>;

    /// Whether other-language copies need a slug correction statement.
    fn corrects_slug(&self) -> bool;
}

/// Strategy for multilingual posts and pages.
///
/// Title, content, and excerpt are stripped down to the copy's language.
/// When stripping leaves the other-language title identical to the
/// original title, the title carried no translation and gets the language
/// suffix so the importer does not reject it as a duplicate.
#[derive(Debug, Clone, Copy, Default)]
pub struct PostSplitStrategy;

impl SplitStrategy for PostSplitStrategy {
    fn localize(
        &self,
        engine: &SplitEngine<'_>,
        copy: &mut Item,
        original: &Item,
        role: LanguageRole,
    ) -> Result<Option<String>> {
        let stripper = engine.stripper();

        for field in [CONTENT, EXCERPT] {
            let stripped = stripper.strip(&original.text(field)?, role);
            copy.set_cdata(field, stripped)?;
        }

        let original_title = original.text(TITLE)?;
        let mut title = stripper.strip(&original_title, role);
        let mut disambiguated = None;
        if role == LanguageRole::Other && title == original_title {
            title.push_str(&engine.config().languages.other.title_suffix());
            tracing::debug!(title = %title, "Other-language title made unique");
            disambiguated = Some(title.clone());
        }
        copy.set_text(TITLE, title)?;

        Ok(disambiguated)
    }

    fn corrects_slug(&self) -> bool {
        true
    }
}

/// Strategy for attachments whose parent item was split.
///
/// Attachment text is not translated; each copy is re-parented to the copy
/// of the parent in its own language, and the other-language title always
/// gets the language suffix.
#[derive(Debug, Clone, Copy)]
pub struct AttachmentSplitStrategy {
    parents: TranslationPair,
}

impl AttachmentSplitStrategy {
    /// Create a strategy re-parenting copies to the given parent copies.
    #[must_use]
    pub fn new(parents: TranslationPair) -> Self {
        Self { parents }
    }
}

impl SplitStrategy for AttachmentSplitStrategy {
    fn localize(
        &self,
        engine: &SplitEngine<'_>,
        copy: &mut Item,
        original: &Item,
        role: LanguageRole,
    ) -> Result<Option<String>> {
        copy.set_parent_id(self.parents.get(role))?;

        if role == LanguageRole::Other {
            let mut title = original.text(TITLE)?;
            title.push_str(&engine.config().languages.other.title_suffix());
            copy.set_text(TITLE, title.clone())?;
            return Ok(Some(title));
        }
        Ok(None)
    }

    fn corrects_slug(&self) -> bool {
        false
    }
}
