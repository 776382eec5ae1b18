//! Identifier allocation and bookkeeping for split items.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::error::{MigratorError, Result};
use crate::types::LanguageRole;

/// Monotonic source of fresh identifiers.
///
/// Identifiers are never handed out twice, even when the item they were
/// allocated for is later discarded. Posts and taxonomy terms use separate
/// allocators because they live in separate id spaces.
#[derive(Debug, Clone)]
pub struct IdAllocator {
    next: i64,
}

impl IdAllocator {
    /// Create an allocator that starts at `first` (the next free id).
    #[must_use]
    pub fn new(first: i64) -> Self {
        Self { next: first }
    }

    /// Hand out the next identifier.
    pub fn next_id(&mut self) -> i64 {
        let id = self.next;
        self.next += 1;
        id
    }

    /// The identifier the next call to `next_id` will return.
    #[must_use]
    pub fn peek(&self) -> i64 {
        self.next
    }
}

/// New identifiers of the two language copies of one original item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TranslationPair {
    /// Id of the default-language copy.
    pub default: i64,

    /// Id of the other-language copy.
    pub other: i64,
}

impl TranslationPair {
    /// Allocate a fresh pair, default first.
    pub fn allocate(allocator: &mut IdAllocator) -> Self {
        let default = allocator.next_id();
        let other = allocator.next_id();
        Self { default, other }
    }

    /// Id of the copy in the given language.
    #[must_use]
    pub fn get(&self, role: LanguageRole) -> i64 {
        match role {
            LanguageRole::Default => self.default,
            LanguageRole::Other => self.other,
        }
    }
}

/// Original item id to the ids of its language copies.
///
/// Only split items have an entry. Entries are write-once: Pass 2 reads the
/// entries written by Pass 1 and adds its own, but never replaces one.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(transparent)]
pub struct IdentifierMap {
    entries: BTreeMap<i64, TranslationPair>,
}

impl IdentifierMap {
    /// Create an empty map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the copies of a split item.
    pub fn insert(&mut self, original: i64, pair: TranslationPair) -> Result<()> {
        if self.entries.contains_key(&original) {
            return Err(MigratorError::IdentifierMapConflict(original));
        }
        self.entries.insert(original, pair);
        Ok(())
    }

    /// Look up the copies of an original item.
    #[must_use]
    pub fn get(&self, original: i64) -> Option<TranslationPair> {
        self.entries.get(&original).copied()
    }

    /// Check whether an item was split.
    #[must_use]
    pub fn contains(&self, original: i64) -> bool {
        self.entries.contains_key(&original)
    }

    /// Number of split items.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check whether no item was split.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate entries ordered by original id.
    pub fn iter(&self) -> impl Iterator<Item = (i64, TranslationPair)> + '_ {
        self.entries.iter().map(|(id, pair)| (*id, *pair))
    }
}
