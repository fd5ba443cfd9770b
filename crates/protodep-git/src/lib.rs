//! Repository sources for protodep
//!
//! The resolver only needs a local directory holding `.proto` files and the
//! commit it was taken from. [`RepositorySource`] is that seam; [`GitSource`]
//! implements it with a `git2` clone cache under `~/.protodep`.

pub mod auth;
pub mod error;
pub mod git;
pub mod source;

pub use auth::AuthMethod;
pub use error::{Error, Result};
pub use git::GitSource;
pub use source::{OpenedRepository, RepositorySource};
