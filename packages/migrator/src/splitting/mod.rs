//! Item splitting for Polyglot to Polylang migrations.
//!
//! A multilingual item is replaced in place by one copy per language,
//! each with a fresh id, language-specific text, unique addressing, and
//! Polylang metadata linking the two copies.

mod engine;
mod passes;
mod strategy;
mod types;

pub use engine::{suffix_permalink, SplitEngine};
pub use passes::{relink_attachments, split_multilingual_items};
pub use strategy::{AttachmentSplitStrategy, PostSplitStrategy, SplitStrategy};
pub use types::{CopyOrigin, MigrationStats, SplitState};
