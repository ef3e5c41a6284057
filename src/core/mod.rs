//! Core version types: classification and ordering.

pub mod sort_key;
pub mod version;

pub use sort_key::for_sorting;
pub use version::{is_incompatible, is_pseudo, parse_type, VersionType, LATEST};
