//! Error types for protodep-core

use std::path::PathBuf;

/// Result type for protodep-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that abort a resolution run
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A include/ignore entry is not a valid glob
    #[error("Invalid pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: glob::PatternError,
    },

    /// `proto_outdir` does not name a directory strictly below the output directory
    #[error("proto_outdir '{proto_outdir}' must be a sub-directory of the output directory")]
    InvalidOutputDir { proto_outdir: String },

    /// The target's sub-path does not exist in the fetched repository
    #[error("Proto root {path} not found in {repository}")]
    ProtoRootNotFound { repository: String, path: PathBuf },

    /// Directory traversal failed below a proto root
    #[error("Failed to walk {path}: {source}")]
    Walk {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },

    // Transparent wrappers for underlying crate errors
    /// Manifest loading, lock writing or protocol selection
    #[error(transparent)]
    Meta(#[from] protodep_meta::Error),

    /// Clone, fetch or checkout
    #[error(transparent)]
    Git(#[from] protodep_git::Error),

    /// Reading sources, writing output, purging directories
    #[error(transparent)]
    Fs(#[from] protodep_fs::Error),
}

/// Coarse classification of a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Bad protocol, bad glob, missing manifest
    Configuration,
    /// Network, authentication, unknown branch or revision
    Fetch,
    /// Permission, missing path, failed write
    Filesystem,
    /// Malformed manifest or lock file
    Parse,
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::InvalidPattern { .. } | Error::InvalidOutputDir { .. } => {
                ErrorKind::Configuration
            }
            Error::ProtoRootNotFound { .. } | Error::Walk { .. } | Error::Fs(_) => {
                ErrorKind::Filesystem
            }
            Error::Meta(protodep_meta::Error::Parse { .. })
            | Error::Meta(protodep_meta::Error::InvalidConfig { .. }) => ErrorKind::Parse,
            Error::Meta(protodep_meta::Error::Fs(_))
            | Error::Meta(protodep_meta::Error::Serialize { .. }) => ErrorKind::Filesystem,
            Error::Meta(_) => ErrorKind::Configuration,
            Error::Git(protodep_git::Error::Fs(_)) => ErrorKind::Filesystem,
            Error::Git(_) => ErrorKind::Fetch,
        }
    }
}
