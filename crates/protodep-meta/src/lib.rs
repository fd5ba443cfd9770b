//! Manifest and lock file model for protodep.
//!
//! `protodep.toml` declares the dependencies of a project; `protodep.lock`
//! records the exact revision each of them resolved to. Both share the
//! [`ProtoDep`] shape.

pub mod error;
pub mod loader;
pub mod schema;

pub use error::{Error, Result};
pub use loader::{LOCK_FILE, LoadedManifest, MANIFEST_FILE, ManifestLoader};
pub use schema::{Dependency, ProtoDep, Protocol, ResolvedDependency};
