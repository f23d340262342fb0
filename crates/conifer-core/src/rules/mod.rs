//! Structural validation rules shared by commit and validate

pub mod validation;

pub use validation::validate_tree;
