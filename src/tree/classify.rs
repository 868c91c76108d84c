//! Leaf / branch classification

use crate::persona::NodeType;

/// Default minimum number of textual files for a folder to be content-driven
pub const MIN_TEXT_FILES: usize = 5;

/// Decide whether a folder's meaning comes from its own files or its children
///
/// An empty folder is a BRANCH (an empty category). Otherwise a folder is a LEAF
/// only when it has at least `min_text_files` textual files and those files
/// outnumber its subfolders at least two to one.
pub fn classify(
    textual_file_count: usize,
    subfolder_count: usize,
    is_empty: bool,
    min_text_files: usize,
) -> NodeType {
    if is_empty {
        return NodeType::Branch;
    }
    if textual_file_count >= min_text_files && textual_file_count >= 2 * subfolder_count {
        NodeType::Leaf
    } else {
        NodeType::Branch
    }
}
