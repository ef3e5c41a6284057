//! Command implementations

pub mod branches;
pub mod classify;
pub mod clone;
pub mod latest;
pub mod resolve;
pub mod sort_key;
pub mod tag;
pub mod versions;
pub mod zip;
