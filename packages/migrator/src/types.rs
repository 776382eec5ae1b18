//! Core data types shared by the migration passes.

use serde::Serialize;

/// Which of the two configured languages a copy belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LanguageRole {
    /// Keeps original slug and permalink.
    Default,

    /// Gets suffixed slug and permalink.
    Other,
}

impl LanguageRole {
    /// Both roles, default first. Copies are always produced in this order.
    pub const BOTH: [LanguageRole; 2] = [LanguageRole::Default, LanguageRole::Other];
}

/// Kind of a WXR item as far as the migration is concerned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemKind {
    /// Posts, pages, and every other non-attachment post type.
    PostLike,

    /// Media library entries.
    Attachment,
}

impl ItemKind {
    /// Classify a `wp:post_type` value.
    #[must_use]
    pub fn from_post_type(post_type: &str) -> Self {
        if post_type.trim() == "attachment" {
            Self::Attachment
        } else {
            Self::PostLike
        }
    }
}

/// Corrected parent of an attachment, for the `attach.sql` companion file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ParentCorrection {
    /// Attachment id after remapping.
    pub id: i64,

    /// Parent id the attachment must point to.
    pub parent_id: i64,
}

/// Corrected slug of an other-language copy, for the `names.sql` companion file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SlugCorrection {
    /// Id of the other-language copy.
    pub id: i64,

    /// Slug the copy must carry.
    pub slug: String,
}

/// Title of an other-language copy that received the language suffix.
///
/// For posts this means the title carried no translation in the export and
/// needs manual attention after import.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TitleCorrection {
    /// Id of the other-language copy.
    pub id: i64,

    /// Title as written to the export, suffix included.
    pub title: String,

    /// Title of the original item, markup included.
    pub source_title: String,
}
