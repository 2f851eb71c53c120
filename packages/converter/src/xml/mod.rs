//! XML helpers over `roxmltree` nodes.

mod utils;

pub use utils::{
    attribute_owned, find_child, find_children, find_descendants, get_tag_name, get_text,
    has_all_attributes, has_tag, raw_text,
};
