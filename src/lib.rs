//! stdver - version identity and resolution for the Go standard library
//!
//! This crate provides the core library functionality for stdver,
//! including version classification and ordering, latest-version
//! selection, tag mapping, and materialization of the standard library
//! as a module zip archive.

pub mod core;
pub mod ops;
pub mod resolver;
pub mod sources;
pub mod stdlib;
pub mod util;

/// Test utilities for stdver unit tests.
///
/// This module is only available when compiling with `--cfg test` or
/// running tests. It provides canned histories and helpers for the
/// fixture backend.
#[cfg(test)]
pub mod test_support;

pub use core::{for_sorting, parse_type, VersionType, LATEST};
pub use ops::{Archive, ContentDir, ResolvedRevision};
pub use resolver::{latest_of, latest_version, later};
pub use sources::RepoBackend;
pub use util::cancel::CancelToken;
pub use util::context::GlobalContext;
pub use util::errors::{Error, ErrorKind};
