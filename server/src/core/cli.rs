use clap::{Parser, Subcommand};

use std::path::PathBuf;

use super::config::StoreBackend;
use super::constants::{
    ENV_CONFIG, ENV_DATABASE_BACKEND, ENV_HOST, ENV_MONGODB_COLLECTION, ENV_MONGODB_DATABASE,
    ENV_MONGODB_URI, ENV_PORT,
};

#[derive(Parser)]
#[command(name = "habitrack")]
#[command(version, about = "Habit tracking API server", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Server host address
    #[arg(long, short = 'H', global = true, env = ENV_HOST)]
    pub host: Option<String>,

    /// Server port
    #[arg(long, short = 'p', global = true, env = ENV_PORT)]
    pub port: Option<u16>,

    /// Path to config file
    #[arg(long, short = 'c', global = true, env = ENV_CONFIG)]
    pub config: Option<PathBuf>,

    /// Habit store backend (mongo or memory)
    #[arg(long, global = true, env = ENV_DATABASE_BACKEND, value_parser = parse_store_backend)]
    pub database_backend: Option<StoreBackend>,

    /// MongoDB connection URI
    #[arg(long, global = true, env = ENV_MONGODB_URI, hide_env_values = true)]
    pub mongodb_uri: Option<String>,

    /// MongoDB database name
    #[arg(long, global = true, env = ENV_MONGODB_DATABASE)]
    pub mongodb_database: Option<String>,

    /// MongoDB habits collection name
    #[arg(long, global = true, env = ENV_MONGODB_COLLECTION)]
    pub mongodb_collection: Option<String>,
}

/// Parse store backend from CLI/env string
fn parse_store_backend(s: &str) -> Result<StoreBackend, String> {
    match s.to_lowercase().as_str() {
        "mongo" | "mongodb" => Ok(StoreBackend::Mongo),
        "memory" => Ok(StoreBackend::Memory),
        _ => Err(format!(
            "Invalid database backend '{}'. Valid options: mongo, memory",
            s
        )),
    }
}

#[derive(Subcommand, Clone, Debug, PartialEq, Eq)]
pub enum Commands {
    /// Start the server (default command)
    Start,
    /// Print the resolved configuration (credentials redacted)
    Config,
}

/// Configuration derived from CLI arguments
#[derive(Debug, Clone, Default)]
pub struct CliConfig {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub config: Option<PathBuf>,
    pub database_backend: Option<StoreBackend>,
    pub mongodb_uri: Option<String>,
    pub mongodb_database: Option<String>,
    pub mongodb_collection: Option<String>,
}

impl From<Cli> for CliConfig {
    fn from(cli: Cli) -> Self {
        Self {
            host: cli.host,
            port: cli.port,
            config: cli.config,
            database_backend: cli.database_backend,
            mongodb_uri: cli.mongodb_uri,
            mongodb_database: cli.mongodb_database,
            mongodb_collection: cli.mongodb_collection,
        }
    }
}

/// Parse CLI arguments and return config with command
pub fn parse() -> (CliConfig, Option<Commands>) {
    let mut cli = Cli::parse();
    let command = cli.command.take();
    (cli.into(), command)
}
