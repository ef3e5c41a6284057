//! High-level operations.
//!
//! This module contains the resolution and materialization steps behind
//! each `stdver` command.

pub mod archive;
pub mod content;
pub mod resolve;

pub use archive::{content_dir, materialize, zip, Archive};
pub use content::{ContentDir, DirEntry};
pub use resolve::{
    resolve_revision, resolve_supported_branches, resolve_version, versions, ResolvedRevision,
};
