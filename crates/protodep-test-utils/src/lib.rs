//! Shared test utilities for the protodep workspace.
//!
//! Dev-dependency only, never published.
//!
//! # Modules
//!
//! - [`git`]: local git repositories filled with `.proto` files, standing in
//!   for remote dependencies
//! - [`project`]: [`project::TestProject`], a project directory with a
//!   manifest and assertion helpers

pub mod git;
pub mod project;

pub use git::ProtoRepo;
pub use project::TestProject;
