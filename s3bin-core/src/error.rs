//! Error types for pointer sync operations.

use crate::store::StoreError;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type for s3bin operations.
pub type BinResult<T> = Result<T, BinError>;

/// Coarse classification of a [`BinError`], stable across context layers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Read,
    Write,
    Naming,
    Format,
    UnsupportedVersion,
    Store,
    Integrity,
}

/// Errors that can occur while hashing, packing or syncing a file.
#[derive(Debug, Error)]
pub enum BinError {
    #[error("failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to write {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("pointer file {} does not have the .sha1 extension", .0.display())]
    Naming(PathBuf),

    #[error("malformed {what}: {reason}")]
    Format { what: String, reason: String },

    #[error("unsupported envelope version {found} (supported: {supported})")]
    UnsupportedVersion { found: i64, supported: u32 },

    #[error("object store {op} failed for {key}: {source}")]
    Store {
        op: &'static str,
        key: String,
        #[source]
        source: StoreError,
    },

    #[error("content of {key} hashes to {actual}, expected {expected}")]
    Integrity {
        key: String,
        expected: String,
        actual: String,
    },

    #[error("{context}: {source}")]
    Context {
        context: String,
        #[source]
        source: Box<BinError>,
    },
}

impl BinError {
    pub fn format(what: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Format {
            what: what.into(),
            reason: reason.into(),
        }
    }

    /// Returns the kind of the innermost error, looking through context layers.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Read { .. } => ErrorKind::Read,
            Self::Write { .. } => ErrorKind::Write,
            Self::Naming(_) => ErrorKind::Naming,
            Self::Format { .. } => ErrorKind::Format,
            Self::UnsupportedVersion { .. } => ErrorKind::UnsupportedVersion,
            Self::Store { .. } => ErrorKind::Store,
            Self::Integrity { .. } => ErrorKind::Integrity,
            Self::Context { source, .. } => source.kind(),
        }
    }

    /// Strips context layers and returns the error that started the chain.
    pub fn root(&self) -> &BinError {
        match self {
            Self::Context { source, .. } => source.root(),
            other => other,
        }
    }

    /// Wraps the error in another context layer.
    pub fn context(self, context: impl Into<String>) -> Self {
        Self::Context {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// True if this is a local read failure caused by a missing file.
    pub fn is_not_found(&self) -> bool {
        matches!(self.root(), Self::Read { source, .. } if source.kind() == io::ErrorKind::NotFound)
    }
}

/// Adds context to the error side of a [`BinResult`].
pub trait ResultExt<T> {
    fn context(self, context: impl Into<String>) -> BinResult<T>;

    fn with_context<F, C>(self, f: F) -> BinResult<T>
    where
        F: FnOnce() -> C,
        C: Into<String>;
}

impl<T> ResultExt<T> for BinResult<T> {
    fn context(self, context: impl Into<String>) -> BinResult<T> {
        self.map_err(|e| e.context(context))
    }

    fn with_context<F, C>(self, f: F) -> BinResult<T>
    where
        F: FnOnce() -> C,
        C: Into<String>,
    {
        self.map_err(|e| e.context(f()))
    }
}
