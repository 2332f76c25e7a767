//! tomem CLI - park files in memcached

use anyhow::Result;
use clap::{ArgAction, Parser, Subcommand};
use cli_lib::Config;
use std::path::PathBuf;
use tracing::Level;

mod cmd;

/// Store and retrieve files in memory using memcached
#[derive(Parser)]
#[command(name = "tomem")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// memcached server as host:port (repeatable, overrides the config file)
    #[arg(long = "server", global = true, value_name = "HOST:PORT")]
    servers: Vec<String>,

    /// Cache key holding the ledger
    #[arg(long, global = true, value_name = "KEY")]
    ledger_key: Option<String>,

    /// Config file to use instead of the default location
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Store files; prefix a path with `id::` to choose its identifier
    Store {
        /// Files to store, as `path` or `id::path`
        #[arg(required = true, value_name = "FILE")]
        files: Vec<String>,

        /// Delete each source file once it is stored
        #[arg(long)]
        remove_source: bool,
    },
    /// Retrieve a stored file (removes it from memory)
    Retrieve {
        /// Identifier of the file
        id: String,
        /// Directory or file path to write to (default: current directory)
        dest: Option<PathBuf>,
    },
    /// List stored files
    List {
        /// Show sizes and checksums
        #[arg(short, long)]
        long: bool,
    },
    /// Wipe every stored file from memory
    FlushAll,
    /// Inspect configuration
    #[command(subcommand)]
    Config(ConfigCommands),
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Print the effective configuration
    Show,
    /// Print the config file location
    Path,
    /// Print a commented default config file
    Example,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let level = match cli.verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();

    let config = load_config(&cli)?;

    match cli.command {
        Commands::Store { files, remove_source } => cmd::store::run(&config, &files, remove_source),
        Commands::Retrieve { id, dest } => cmd::retrieve::run(&config, &id, dest.as_deref()),
        Commands::List { long } => cmd::list::run(&config, long),
        Commands::FlushAll => cmd::flush::run(&config),
        Commands::Config(config_cmd) => match config_cmd {
            ConfigCommands::Show => cmd::config::run_show(&config),
            ConfigCommands::Path => cmd::config::run_path(cli.config.as_deref()),
            ConfigCommands::Example => cmd::config::run_example(),
        },
    }
}

/// Config file, then command-line overrides
fn load_config(cli: &Cli) -> Result<Config> {
    let mut config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };

    if !cli.servers.is_empty() {
        config.cache.servers = cli.servers.clone();
    }
    if let Some(key) = &cli.ledger_key {
        config.ledger.key = key.clone();
    }

    config.validate()?;
    Ok(config)
}
