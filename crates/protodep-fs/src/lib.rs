//! Filesystem helpers for protodep
//!
//! Provides forward-slash path handling and the write/purge operations the
//! resolver performs on the output tree, the dependency cache and the lock file.

pub mod error;
pub mod io;
pub mod path;

pub use error::{Error, Result};
pub use path::NormalizedPath;
