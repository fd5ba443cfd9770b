//! Version command implementation

use colored::Colorize;
use serde::Serialize;

use crate::error::Result;

#[derive(Debug, Serialize)]
struct VersionInfo {
    version: &'static str,
}

/// Print the crate version, as JSON when `json` is set
pub fn run_version(json: bool) -> Result<()> {
    let info = VersionInfo {
        version: env!("CARGO_PKG_VERSION"),
    };

    if json {
        println!("{}", serde_json::to_string(&info)?);
    } else {
        println!("{} {}", "protodep".bold(), info.version);
    }
    Ok(())
}
