//! Resolution pipeline for protodep
//!
//! - [`filter`]: include/ignore matching of discovered files
//! - [`patch`]: namespace rewriting and provenance annotations
//! - [`resolver`]: the end-to-end run that produces the output tree and lock

pub mod error;
pub mod filter;
pub mod patch;
pub mod resolver;

pub use error::{Error, ErrorKind, Result};
pub use filter::{Decision, DependencyFilter, PathFilter};
pub use patch::ProtoPatcher;
pub use resolver::{ProtoResource, Resolution, Resolver, ResolverConfig};
