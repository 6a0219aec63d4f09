mod commands;
mod config;
mod logging;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

use commands::Backend;
use config::{AppConfig, CliOverrides};

/// qbench - seed users and questions, then time how they are read back
#[derive(Parser)]
#[command(name = "qbench")]
#[command(about = "qbench - compare three sequential queries with one join on SQLite and PostgreSQL")]
#[command(version)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Print effective configuration (YAML) and exit
    #[arg(long)]
    print_config: bool,

    /// Log verbosity level (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the schema, or drop it with --down
    Migrate {
        #[arg(long, value_enum, default_value_t = Backend::All)]
        backend: Backend,
        #[arg(long)]
        down: bool,
    },
    /// Clear the tables and generate users, settings and questions
    Seed {
        #[arg(long, value_enum, default_value_t = Backend::All)]
        backend: Backend,
        /// Number of users (overrides config)
        #[arg(long)]
        users: Option<u32>,
        /// Users per batch (overrides config)
        #[arg(long)]
        batch_size: Option<u32>,
        /// Seed for a reproducible data set
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Run the read-strategy benchmark suite
    Bench {
        #[arg(long, value_enum, default_value_t = Backend::All)]
        backend: Backend,
        /// Email of the user to query (overrides config)
        #[arg(long)]
        email: Option<String>,
    },
    /// Validate configuration and exit
    Check,
}

impl Commands {
    fn overrides(&self) -> CliOverrides {
        match self {
            Commands::Seed {
                users, batch_size, ..
            } => CliOverrides {
                total_users: *users,
                batch_size: *batch_size,
                target_email: None,
            },
            Commands::Bench { email, .. } => CliOverrides {
                target_email: email.clone(),
                ..CliOverrides::default()
            },
            Commands::Migrate { .. } | Commands::Check => CliOverrides::default(),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Some(path) = &cli.config
        && !path.is_file()
    {
        anyhow::bail!("config file does not exist: {}", path.display());
    }

    let command = cli.command.unwrap_or(Commands::Check);

    // 1) defaults -> 2) YAML (if provided) -> 3) env (QBENCH__*) -> 4) CLI overrides
    let mut config = AppConfig::load_or_default(cli.config.as_deref())?;
    config.apply_cli_overrides(&command.overrides());

    logging::init_logging(&config.logging, cli.verbose)?;

    if cli.print_config {
        println!("Effective configuration:\n{}", config.to_yaml()?);
        return Ok(());
    }

    match command {
        Commands::Migrate { backend, down } => commands::migrate(&config, backend, down).await,
        Commands::Seed { backend, seed, .. } => commands::seed(&config, backend, seed).await,
        Commands::Bench { backend, .. } => commands::bench(&config, backend).await,
        Commands::Check => commands::check(&config),
    }
}
