//! Error types for protodep-meta

use std::path::PathBuf;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Filesystem error: {0}")]
    Fs(#[from] protodep_fs::Error),

    #[error("Neither protodep.toml nor protodep.lock found in {dir}")]
    ConfigNotFound { dir: PathBuf },

    #[error("Failed to parse {path}: {message}")]
    Parse { path: PathBuf, message: String },

    #[error("Failed to serialize {path}: {message}")]
    Serialize { path: PathBuf, message: String },

    #[error("Invalid configuration at {path}: {message}")]
    InvalidConfig { path: PathBuf, message: String },

    #[error("{protocol} protocol is not accepted (ssh or https only)")]
    UnsupportedProtocol { protocol: String },
}
