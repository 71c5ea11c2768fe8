use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use avatar_core::config::Config;
use avatar_store::DEFAULT_MIN_AGE;

#[derive(Parser)]
#[command(name = "avatar-service")]
#[command(author, version, about = "User avatar upload service")]
pub struct Cli {
    /// Path to config file (JSON)
    #[arg(short, long, global = true, env = "AVATAR_CONFIG")]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the HTTP server
    Start(Overrides),

    /// Remove avatar files that no user record references
    Sweep {
        /// List orphaned files without deleting them
        #[arg(long)]
        dry_run: bool,

        /// Keep unreferenced files modified less than this many seconds ago
        #[arg(long, value_name = "SECONDS", default_value_t = DEFAULT_MIN_AGE.as_secs())]
        min_age: u64,

        #[command(flatten)]
        overrides: Overrides,
    },

    /// Validate configuration file
    Validate {
        /// Config file to validate (uses --config if not specified)
        config: Option<PathBuf>,
    },

    /// Display version information
    Version,
}

/// Settings that override the config file when given.
#[derive(Args, Debug, Default, Clone)]
pub struct Overrides {
    /// Host to bind to
    #[arg(long, env = "AVATAR_HOST")]
    pub host: Option<String>,

    /// Port to listen on
    #[arg(short, long, env = "AVATAR_PORT")]
    pub port: Option<u16>,

    /// Public base URL used to build avatar URLs
    #[arg(long, env = "AVATAR_BASE_URL")]
    pub base_url: Option<String>,

    /// SQLite database file
    #[arg(long, env = "AVATAR_DB_PATH")]
    pub db_path: Option<PathBuf>,

    /// Storage root for uploaded avatars
    #[arg(long, env = "AVATAR_UPLOAD_DIR")]
    pub upload_dir: Option<PathBuf>,

    /// Maximum avatar size in bytes
    #[arg(long, env = "AVATAR_MAX_SIZE")]
    pub max_avatar_size: Option<usize>,
}

impl Overrides {
    /// Apply every override that was given on top of `config`.
    pub fn apply(self, config: &mut Config) {
        if let Some(host) = self.host {
            config.server.host = host;
        }
        if let Some(port) = self.port {
            config.server.port = port;
        }
        if let Some(base_url) = self.base_url {
            config.server.base_url = base_url;
        }
        if let Some(path) = self.db_path {
            config.database.path = path;
        }
        if let Some(dir) = self.upload_dir {
            config.storage.upload_dir = dir;
        }
        if let Some(max) = self.max_avatar_size {
            config.storage.max_avatar_size = max;
        }
    }
}
