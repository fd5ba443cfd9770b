//! CLI argument parsing using clap derive

use clap::{Args, Parser, Subcommand};

/// protodep - vendor protobuf definitions from git repositories
#[derive(Parser, Debug)]
#[command(name = "protodep")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// The command to run
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available commands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Populate the output directory from protodep.toml
    ///
    /// Examples:
    ///   protodep up                  # Use revisions from protodep.lock
    ///   protodep up -f               # Ignore the lock, take branch heads
    ///   protodep up -u               # Fetch every dependency over HTTPS
    ///   protodep up -i id_ed25519    # Authenticate with ~/.ssh/id_ed25519
    Up(UpArgs),

    /// Show version information
    Version {
        /// Output as JSON for scripting
        #[arg(long)]
        json: bool,
    },
}

/// Options of `protodep up`
#[derive(Args, Debug, Clone, Default, PartialEq, Eq)]
pub struct UpArgs {
    /// Ignore protodep.lock and update every unpinned dependency
    #[arg(short, long)]
    pub force: bool,

    /// Clear the dependency cache before fetching
    #[arg(short, long)]
    pub cleanup: bool,

    /// Use HTTPS for every dependency
    #[arg(short = 'u', long)]
    pub use_https: bool,

    /// SSH key file name inside ~/.ssh
    #[arg(short, long, default_value = "")]
    pub identity_file: String,

    /// Passphrase of the SSH key
    #[arg(short, long, default_value = "")]
    pub password: String,

    /// Username for HTTPS basic auth
    #[arg(long, env = "PROTODEP_BASIC_AUTH_USERNAME", default_value = "")]
    pub basic_auth_username: String,

    /// Password or token for HTTPS basic auth
    #[arg(
        long,
        env = "PROTODEP_BASIC_AUTH_PASSWORD",
        default_value = "",
        hide_env_values = true
    )]
    pub basic_auth_password: String,
}
