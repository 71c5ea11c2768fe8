mod cli;

use std::collections::HashSet;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;

use avatar_core::config::Config;
use avatar_store::{AvatarStore, StoreConfig, SweepOptions};
use cli::{Cli, Commands, Overrides};

fn load_config(path: Option<&Path>, overrides: Overrides) -> Config {
    let mut config = Config::load_or_default(path);
    overrides.apply(&mut config);
    config
}

/// Like [`load_config`], but an unreadable or malformed file is an error.
fn load_config_strict(path: Option<&Path>, overrides: Overrides) -> Result<Config> {
    let mut config = match path {
        Some(p) => Config::load(p).with_context(|| format!("Invalid config {}", p.display()))?,
        None => Config::default(),
    };
    overrides.apply(&mut config);
    Ok(config)
}

async fn start_server(config: Config) -> Result<()> {
    tracing::info!("Starting avatar service");
    tracing::info!(
        "Server will listen on {}:{}",
        config.server.host,
        config.server.port
    );

    avatar_server::start(config).await?;
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Respect RUST_LOG env var if set, otherwise use defaults based on verbose flag
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| {
        if cli.verbose {
            "avatar_service=trace,avatar_server=trace,avatar_store=trace,avatar_db=debug,tower_http=debug".to_string()
        } else {
            "avatar_service=debug,avatar_server=debug,avatar_store=debug,avatar_db=info,tower_http=info".to_string()
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(&env_filter)
        .init();

    match cli.command {
        Commands::Start(overrides) => {
            let config = load_config(cli.config.as_deref(), overrides);
            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(start_server(config))
        }
        Commands::Sweep {
            dry_run,
            min_age,
            overrides,
        } => {
            let config = load_config_strict(cli.config.as_deref(), overrides)?;
            let options = SweepOptions {
                dry_run,
                min_age: Duration::from_secs(min_age),
            };
            sweep(&config, options)
        }
        Commands::Validate {
            config: config_path,
        } => {
            let path = config_path.or(cli.config);
            validate_config(path.as_deref())
        }
        Commands::Version => {
            println!("avatar-service {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}

fn sweep(config: &Config, options: SweepOptions) -> Result<()> {
    let dry_run = options.dry_run;
    let db_path = config.database.path.to_string_lossy();
    if !config.database.path.exists() {
        anyhow::bail!("Database does not exist: {db_path}");
    }

    let pool = avatar_db::pool::init_pool(&db_path)?;
    let conn = avatar_db::pool::get_conn(&pool)?;
    let referenced: HashSet<String> = avatar_db::queries::users::list_avatar_paths(&conn)?
        .into_iter()
        .collect();

    let store = AvatarStore::new(StoreConfig::from_config(config))?;
    let report = store
        .sweep_orphans(&referenced, options)
        .with_context(|| format!("Sweep of {} failed", store.root().display()))?;

    let verb = if dry_run { "Would remove" } else { "Removed" };
    for path in &report.removed {
        println!("{verb} {path}");
    }
    for path in &report.failed {
        println!("Failed to remove {path}");
    }
    println!(
        "Scanned {} files, {} {}, {} failed, {} too recent",
        report.scanned,
        report.removed.len(),
        if dry_run { "orphaned" } else { "removed" },
        report.failed.len(),
        report.skipped_recent
    );

    Ok(())
}

fn validate_config(path: Option<&Path>) -> Result<()> {
    let config = match path {
        Some(p) => {
            println!("Validating config: {}", p.display());
            let config =
                Config::load(p).with_context(|| format!("Invalid config {}", p.display()))?;
            println!("✓ Configuration is valid");
            config
        }
        None => {
            println!("No config file specified, using defaults");
            Config::default()
        }
    };

    println!("  Server: {}:{}", config.server.host, config.server.port);
    println!("  Base URL: {}", config.server.base_url);
    println!("  Database: {}", config.database.path.display());
    println!("  Upload dir: {}", config.storage.upload_dir.display());
    println!("  Max avatar size: {} bytes", config.storage.max_avatar_size);

    for warning in config.validate() {
        println!("  Warning: {warning}");
    }

    Ok(())
}
