//! Application lifecycle: config, store, HTTP server, shutdown

use anyhow::{Context, Result};

use crate::api::ApiServer;
use crate::core::banner;
use crate::core::cli::{self, CliConfig, Commands};
use crate::core::config::AppConfig;
use crate::core::constants::{APP_NAME_LOWER, ENV_LOG};
use crate::core::shutdown::ShutdownService;
use crate::data::HabitStore;
use crate::domain::HabitService;

pub struct CoreApp {
    pub shutdown: ShutdownService,
    pub config: AppConfig,
    pub store: HabitStore,
    pub habits: HabitService,
}

impl CoreApp {
    /// Run the application with CLI argument parsing
    pub async fn run() -> Result<()> {
        dotenvy::dotenv().ok();
        Self::init_logging();

        tracing::debug!(version = env!("CARGO_PKG_VERSION"), "Habitrack starting");

        let (cli_config, command) = cli::parse();
        tracing::trace!(command = ?command, "Parsed command");

        match command {
            Some(Commands::Config) => return Self::print_config(&cli_config),
            Some(Commands::Start) | None => {}
        }

        let app = Self::init(&cli_config).await?;
        Self::start_server(app).await
    }

    async fn init(cli: &CliConfig) -> Result<Self> {
        let config = AppConfig::load(cli)?;
        let store = HabitStore::init(&config.database)
            .await
            .context("Failed to initialize habit store")?;
        Ok(Self::from_parts(config, store))
    }

    /// Assemble the application around an initialized store
    pub fn from_parts(config: AppConfig, store: HabitStore) -> Self {
        let habits = HabitService::with_email_policy(store.clone());
        let shutdown = ShutdownService::new(store.clone());
        Self {
            shutdown,
            config,
            store,
            habits,
        }
    }

    fn print_config(cli: &CliConfig) -> Result<()> {
        let config = AppConfig::load(cli)?;
        let rendered = serde_json::to_string_pretty(&config.to_redacted_json())
            .context("Failed to render configuration")?;
        println!("{}", rendered);
        Ok(())
    }

    fn init_logging() {
        let default_filter = format!("info,{}_server=info", APP_NAME_LOWER);

        let filter = std::env::var(ENV_LOG)
            .or_else(|_| std::env::var("RUST_LOG"))
            .unwrap_or(default_filter);

        tracing_subscriber::fmt()
            .with_target(false)
            .with_thread_ids(false)
            .with_level(true)
            .with_ansi(true)
            .compact()
            .with_env_filter(filter)
            .init();
    }

    async fn start_server(app: Self) -> Result<()> {
        // Signal handlers first so Ctrl+C during startup is honored
        app.shutdown.install_signal_handlers();

        banner::print_banner(&app.config, app.store.backend_name());

        let server = ApiServer::new(app);
        let app = server.start().await?;
        app.shutdown.shutdown().await;

        Ok(())
    }
}
