//! WordPress eXtended RSS (WXR) export documents.

mod document;
pub mod item;
mod polylang;

pub use document::{ChannelNode, WxrDocument};
pub use item::Item;
pub use polylang::{language_category, serialize_translations, translations_meta, translations_value};
