//! The two traversals of a migration.
//!
//! Pass 1 splits every multilingual item. Pass 2 then visits attachments
//! and follows their parents into the language copies. The passes cannot
//! be merged: an attachment may come before its parent in the export.

use super::engine::SplitEngine;
use super::strategy::{AttachmentSplitStrategy, PostSplitStrategy};
use super::types::SplitState;
use crate::error::Result;
use crate::types::{ItemKind, ParentCorrection};
use crate::wxr::WxrDocument;

/// Pass 1: replace every multilingual item by its two language copies.
///
/// Items without language markup stay in the document exactly as loaded.
pub fn split_multilingual_items(
    doc: &mut WxrDocument,
    engine: &SplitEngine<'_>,
    state: &mut SplitState,
) -> Result<()> {
    let mut index = 0;
    while index < doc.len() {
        let Some(item) = doc.item_at(index) else {
            index += 1;
            continue;
        };
        state.stats.items += 1;

        if !engine.is_multilingual(item)? {
            tracing::debug!(id = %item.label(), "No language markup, keeping item");
            index += 1;
            continue;
        }

        let copies = engine.split(item, &PostSplitStrategy, state)?;
        state.stats.split_items += 1;
        index = doc.replace_item(index, copies);
    }

    tracing::info!(
        items = state.stats.items,
        split = state.stats.split_items,
        "Split multilingual items"
    );
    Ok(())
}

/// Pass 2: re-parent attachments of split items.
///
/// Every attachment yields parent corrections: attachments of unsplit
/// parents restate their parent, attachments of split parents are split
/// themselves and each copy points to the parent copy of its language.
pub fn relink_attachments(
    doc: &mut WxrDocument,
    engine: &SplitEngine<'_>,
    state: &mut SplitState,
) -> Result<()> {
    let mut index = 0;
    while index < doc.len() {
        let Some(item) = doc.item_at(index) else {
            index += 1;
            continue;
        };
        if item.kind()? != ItemKind::Attachment {
            index += 1;
            continue;
        }
        state.stats.attachments += 1;

        let id = item.id()?;
        let parent_id = item.parent_id()?;

        let Some(parents) = state.id_map.get(parent_id) else {
            state
                .parent_corrections
                .push(ParentCorrection { id, parent_id });
            index += 1;
            continue;
        };

        // Attachments with language markup were already split in pass 1;
        // their copies only need to follow the parent copy of their language.
        if let Some(origin) = state.copies.get(&id).copied() {
            let new_parent = parents.get(origin.role);
            if let Some(copy) = doc.item_at_mut(index) {
                copy.set_parent_id(new_parent)?;
            }
            tracing::debug!(id, parent = new_parent, "Re-parented attachment copy");
            state.parent_corrections.push(ParentCorrection {
                id,
                parent_id: new_parent,
            });
            index += 1;
            continue;
        }

        tracing::debug!(id, parent = parent_id, "Parent was split, splitting attachment");
        let copies = engine.split(item, &AttachmentSplitStrategy::new(parents), state)?;
        for copy in &copies {
            state.parent_corrections.push(ParentCorrection {
                id: copy.id()?,
                parent_id: copy.parent_id()?,
            });
        }
        state.stats.split_attachments += 1;
        index = doc.replace_item(index, copies);
    }

    tracing::info!(
        attachments = state.stats.attachments,
        split = state.stats.split_attachments,
        "Relinked attachments"
    );
    Ok(())
}
