//! XML utilities: `roxmltree` navigation helpers and owned element trees.

mod element;
mod utils;

pub use element::{escape_attribute, escape_text, Element, XmlNode};
pub use utils::{
    child_text, find_child, find_descendants, get_text, qualified_attribute_name, qualified_name,
};
