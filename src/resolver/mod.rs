//! Version selection.

pub mod latest;

pub use latest::{latest_of, latest_version, later};
