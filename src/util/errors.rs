//! Error taxonomy shared by every resolution step.
//!
//! Library functions return `anyhow::Result` and wrap failures with their
//! own call signature as context. The root cause of every failure produced
//! here is an [`Error`], so callers can recover the category with
//! [`Error::kind_of`] regardless of how many context layers were added.

use thiserror::Error;

/// Typed root cause of a failed resolution.
#[derive(Debug, Error)]
pub enum Error {
    /// Malformed version string or prerelease encoding. Never retried.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The requested version, tag or sub-path does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// The backend does not implement the requested capability.
    #[error("unsupported: {0}")]
    Unsupported(String),

    /// Network or process failure while talking to source control.
    #[error("`{command}` failed\n{stderr}")]
    Upstream { command: String, stderr: String },

    /// The caller-supplied cancellation token fired.
    #[error("operation cancelled")]
    Cancelled,
}

/// Coarse category of an [`Error`], convenient for matching by callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    InvalidArgument,
    NotFound,
    Unsupported,
    Upstream,
    Cancelled,
}

impl Error {
    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Error::InvalidArgument(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Error::NotFound(msg.into())
    }

    pub fn unsupported(msg: impl Into<String>) -> Self {
        Error::Unsupported(msg.into())
    }

    pub fn upstream(command: impl Into<String>, stderr: impl Into<String>) -> Self {
        Error::Upstream {
            command: command.into(),
            stderr: stderr.into(),
        }
    }

    /// The category of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::InvalidArgument(_) => ErrorKind::InvalidArgument,
            Error::NotFound(_) => ErrorKind::NotFound,
            Error::Unsupported(_) => ErrorKind::Unsupported,
            Error::Upstream { .. } => ErrorKind::Upstream,
            Error::Cancelled => ErrorKind::Cancelled,
        }
    }

    /// Find the typed root cause anywhere in an `anyhow` chain.
    pub fn kind_of(err: &anyhow::Error) -> Option<ErrorKind> {
        err.chain()
            .find_map(|cause| cause.downcast_ref::<Error>())
            .map(Error::kind)
    }
}

/// Wrap a `git2` failure as an upstream error naming the operation.
pub fn git_error(operation: impl Into<String>, err: git2::Error) -> Error {
    Error::upstream(operation, err.message().to_string())
}
