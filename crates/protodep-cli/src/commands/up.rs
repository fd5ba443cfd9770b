//! Up command implementation

use std::path::Path;

use colored::Colorize;
use protodep_core::{Resolver, ResolverConfig};
use protodep_meta::LOCK_FILE;

use crate::cli::UpArgs;
use crate::error::Result;

/// Build the run configuration for `project_dir`.
///
/// The manifest is read from, and the output tree written to, `project_dir`.
pub fn resolver_config(project_dir: &Path, home_dir: &Path, args: &UpArgs) -> ResolverConfig {
    ResolverConfig {
        use_https: args.use_https,
        basic_auth_username: args.basic_auth_username.clone(),
        basic_auth_password: args.basic_auth_password.clone(),
        identity_file: args.identity_file.clone(),
        identity_password: args.password.clone(),
        ..ResolverConfig::new(home_dir, project_dir, project_dir)
    }
}

/// Run the up command
pub fn run_up(project_dir: &Path, home_dir: &Path, args: &UpArgs) -> Result<()> {
    let config = resolver_config(project_dir, home_dir, args);
    tracing::debug!(
        project = %config.target_dir,
        cache = %config.cache_dir(),
        force = args.force,
        cleanup = args.cleanup,
        "Starting resolution"
    );

    let resolver = Resolver::new(config)?;
    let resolution = resolver.resolve(args.force, args.cleanup)?;

    for dependency in &resolution.lock.dependencies {
        println!(
            "  {} {} {}",
            "+".green(),
            dependency.target.cyan(),
            short_hash(&dependency.revision).dimmed()
        );
    }
    println!(
        "{} {} dependencies, {} files",
        "Resolved".green().bold(),
        resolution.lock.dependencies.len(),
        resolution.files_written
    );
    if resolution.lock_written {
        println!("{} {}", "Updated".green().bold(), LOCK_FILE);
    }

    Ok(())
}

fn short_hash(hash: &str) -> &str {
    hash.get(..7).unwrap_or(hash)
}
