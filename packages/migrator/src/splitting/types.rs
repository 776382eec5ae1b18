//! State accumulated while splitting items.

use std::collections::{HashMap, HashSet};

use serde::Serialize;

use crate::error::{MigratorError, Result};
use crate::ids::{IdAllocator, IdentifierMap, TranslationPair};
use crate::types::{LanguageRole, ParentCorrection, SlugCorrection, TitleCorrection};

/// Counters reported after a migration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MigrationStats {
    /// Items in the source export.
    pub items: usize,

    /// Items split in the first pass.
    pub split_items: usize,

    /// Attachments visited in the second pass.
    pub attachments: usize,

    /// Attachments split in the second pass because their parent was split.
    pub split_attachments: usize,
}

/// Where a copy produced by a split came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CopyOrigin {
    /// Id of the item that was split.
    pub original: i64,

    /// Language of the copy.
    pub role: LanguageRole,
}

/// Mutable state threaded through both passes.
///
/// The identifier map is the only channel from the first pass to the
/// second; the correction lists are the companion outputs.
#[derive(Debug, Clone)]
pub struct SplitState {
    /// Source of fresh item ids.
    pub allocator: IdAllocator,

    /// Ids carried by the source export, never handed out again.
    pub source_ids: HashSet<i64>,

    /// Original id to copy ids, for every split item.
    pub id_map: IdentifierMap,

    /// Copy id to its origin, for every copy produced.
    pub copies: HashMap<i64, CopyOrigin>,

    /// Parent fix-ups for every attachment.
    pub parent_corrections: Vec<ParentCorrection>,

    /// Slug fix-ups for other-language post copies.
    pub slug_corrections: Vec<SlugCorrection>,

    /// Titles that received the disambiguation suffix.
    pub title_corrections: Vec<TitleCorrection>,

    /// Counters.
    pub stats: MigrationStats,
}

impl SplitState {
    /// Create state with the item allocator seeded at `next_post_id`.
    #[must_use]
    pub fn new(next_post_id: i64) -> Self {
        Self {
            allocator: IdAllocator::new(next_post_id),
            source_ids: HashSet::new(),
            id_map: IdentifierMap::new(),
            copies: HashMap::new(),
            parent_corrections: Vec::new(),
            slug_corrections: Vec::new(),
            title_corrections: Vec::new(),
            stats: MigrationStats::default(),
        }
    }

    /// Create state that refuses to allocate any of `source_ids`.
    #[must_use]
    pub fn with_source_ids(next_post_id: i64, source_ids: HashSet<i64>) -> Self {
        Self {
            source_ids,
            ..Self::new(next_post_id)
        }
    }

    /// Allocate the copy ids for one split.
    ///
    /// Fails when either id is already carried by a source item.
    pub fn allocate_pair(&mut self) -> Result<TranslationPair> {
        let pair = TranslationPair::allocate(&mut self.allocator);
        for id in [pair.default, pair.other] {
            if self.source_ids.contains(&id) {
                return Err(MigratorError::IdInUse(id));
            }
        }
        Ok(pair)
    }
}
