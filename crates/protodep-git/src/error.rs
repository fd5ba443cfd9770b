//! Error types for protodep-git

use std::path::PathBuf;

/// Result type for protodep-git operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while fetching a repository
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Git error: {0}")]
    Git(#[from] git2::Error),

    #[error("Filesystem error: {0}")]
    Fs(#[from] protodep_fs::Error),

    #[error("Failed to clone {url}: {message}")]
    CloneFailed { url: String, message: String },

    #[error("Failed to fetch {repository}: {message}")]
    FetchFailed { repository: String, message: String },

    #[error("Branch '{branch}' not found in {repository}")]
    BranchNotFound { repository: String, branch: String },

    #[error("Revision '{revision}' not found in {repository}")]
    RevisionNotFound { repository: String, revision: String },

    #[error("Cache entry {path} is not a git repository")]
    CorruptCache { path: PathBuf },
}
