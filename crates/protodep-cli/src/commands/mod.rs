//! Command implementations for protodep-cli

pub mod up;
pub mod version;

pub use up::run_up;
pub use version::run_version;
