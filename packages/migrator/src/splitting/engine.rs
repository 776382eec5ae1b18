//! Split engine that turns one multilingual item into two language copies.

use super::strategy::SplitStrategy;
use super::types::{CopyOrigin, SplitState};
use crate::config::MigrationConfig;
use crate::error::Result;
use crate::markup::{has_language_markup, MarkupStripper};
use crate::types::{ItemKind, LanguageRole, SlugCorrection, TitleCorrection};
use crate::wxr::item::{CONTENT, EXCERPT, GUID, LINK, POST_NAME, TITLE};
use crate::wxr::{language_category, translations_meta, Item};

/// Engine for splitting items.
///
/// Holds the configuration and compiled markup patterns; all mutable
/// bookkeeping lives in the `SplitState` passed to each call.
pub struct SplitEngine<'a> {
    config: &'a MigrationConfig,
    stripper: MarkupStripper,
}

impl<'a> SplitEngine<'a> {
    /// Create a new split engine.
    pub fn new(config: &'a MigrationConfig) -> Result<Self> {
        Ok(Self {
            config,
            stripper: MarkupStripper::new(&config.languages)?,
        })
    }

    /// The migration configuration.
    #[must_use]
    pub fn config(&self) -> &MigrationConfig {
        self.config
    }

    /// The markup stripper for the configured languages.
    #[must_use]
    pub fn stripper(&self) -> &MarkupStripper {
        &self.stripper
    }

    /// Check whether an item carries language markup in its content,
    /// excerpt, or title.
    pub fn is_multilingual(&self, item: &Item) -> Result<bool> {
        for field in [CONTENT, EXCERPT, TITLE] {
            if has_language_markup(&item.text(field)?) {
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// Split an item into its default-language and other-language copies.
    ///
    /// Allocates the copy ids, records them in the identifier map, and
    /// returns the copies in that order. The caller splices them into the
    /// document in place of `original`.
    pub fn split<S: SplitStrategy>(
        &self,
        original: &Item,
        strategy: &S,
        state: &mut SplitState,
    ) -> Result<[Item; 2]> {
        let original_id = original.id()?;
        let kind = original.kind()?;

        let pair = state.allocate_pair()?;
        state.id_map.insert(original_id, pair)?;
        tracing::debug!(
            id = original_id,
            default = pair.default,
            other = pair.other,
            "Splitting item"
        );

        let translations = translations_meta(&self.config.languages, pair);

        let mut copies = [original.clone(), original.clone()];
        for (copy, role) in copies.iter_mut().zip(LanguageRole::BOTH) {
            let id = pair.get(role);
            copy.set_id(id)?;
            copy.set_text(GUID, self.guid(kind, id))?;

            if role == LanguageRole::Other {
                self.suffix_addressing(copy, id)?;
                if strategy.corrects_slug() && kind == ItemKind::PostLike {
                    state.slug_corrections.push(SlugCorrection {
                        id,
                        slug: original.slug()?.trim().to_string(),
                    });
                }
            }

            if let Some(title) = strategy.localize(self, copy, original, role)? {
                state.title_corrections.push(TitleCorrection {
                    id,
                    title,
                    source_title: original.text(TITLE)?,
                });
            }

            let language = match role {
                LanguageRole::Default => &self.config.languages.default,
                LanguageRole::Other => &self.config.languages.other,
            };
            copy.push_child(language_category(language));
            copy.push_child(translations.clone());

            state.copies.insert(
                id,
                CopyOrigin {
                    original: original_id,
                    role,
                },
            );
        }

        Ok(copies)
    }

    /// Guid for a copy, derived from its new id.
    fn guid(&self, kind: ItemKind, id: i64) -> String {
        match kind {
            ItemKind::PostLike => self.config.post_guid(id),
            ItemKind::Attachment => self.config.attachment_guid(id),
        }
    }

    /// Append the other language's suffix to slug and permalink.
    ///
    /// An empty slug (drafts) is replaced by the copy id, so suffixed slugs
    /// never coincide.
    fn suffix_addressing(&self, copy: &mut Item, id: i64) -> Result<()> {
        let suffix = self.config.languages.other.slug_suffix();
        let slug = copy.slug()?;
        let base = match slug.trim() {
            "" => id.to_string(),
            trimmed => trimmed.to_string(),
        };
        copy.set_text(POST_NAME, format!("{base}{suffix}"))?;
        let link = suffix_permalink(&copy.link()?, &suffix);
        copy.set_text(LINK, link)?;
        Ok(())
    }
}

/// Insert `suffix` at the end of a permalink's last path segment.
///
/// # Examples
/// ```
/// use polylang_migrator::splitting::suffix_permalink;
///
/// assert_eq!(suffix_permalink("http://x/hello/", "-italiano"), "http://x/hello-italiano/");
/// assert_eq!(suffix_permalink("http://x/?p=5", "-italiano"), "http://x/?p=5-italiano");
/// ```
pub fn suffix_permalink(link: &str, suffix: &str) -> String {
    let link = link.trim();
    match link.strip_suffix('/') {
        Some(base) => format!("{base}{suffix}/"),
        None => format!("{link}{suffix}"),
    }
}
