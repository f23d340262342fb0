//! Edit-operation semantics over configuration trees

pub mod edit;
pub mod tree;

pub use edit::{split_edits, DefaultOperation, EditEntity, EditOperation};
pub use tree::{apply_edit, exists, lookup};
