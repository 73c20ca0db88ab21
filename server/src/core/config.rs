use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use super::cli::CliConfig;
use super::constants::{
    APP_DOT_FOLDER, CONFIG_FILE_NAME, DEFAULT_HOST, DEFAULT_PORT, MONGO_DEFAULT_COLLECTION,
    MONGO_DEFAULT_CONNECT_ATTEMPTS, MONGO_DEFAULT_DATABASE,
};

// =============================================================================
// Store Backend Enum
// =============================================================================

/// Habit store backend
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    #[default]
    Mongo,
    Memory,
}

impl fmt::Display for StoreBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreBackend::Mongo => write!(f, "mongo"),
            StoreBackend::Memory => write!(f, "memory"),
        }
    }
}

// =============================================================================
// File Config Structs (JSON deserialization)
// =============================================================================

/// Server configuration section
#[derive(Debug, Default, Clone, Deserialize)]
pub struct ServerFileConfig {
    pub host: Option<String>,
    pub port: Option<u16>,
    /// Allowed CORS origins; empty or absent allows any origin
    pub cors_origins: Option<Vec<String>>,
}

/// MongoDB configuration section (from JSON config file)
#[derive(Debug, Default, Clone, Deserialize)]
pub struct MongoFileConfig {
    /// Connection URI (or use HABITRACK_MONGODB_URI env var)
    pub uri: Option<String>,
    /// Database name (default: "habitrack")
    pub database: Option<String>,
    /// Habits collection name (default: "habits")
    pub collection: Option<String>,
    /// Startup ping attempts before giving up (default: 3)
    pub connect_attempts: Option<u32>,
}

/// Database configuration section (from JSON config file)
#[derive(Debug, Default, Clone, Deserialize)]
pub struct DatabaseFileConfig {
    /// Store backend: mongo (default) or memory
    pub backend: Option<StoreBackend>,
    pub mongo: Option<MongoFileConfig>,
}

/// File-based configuration (JSON)
#[derive(Debug, Default, Deserialize)]
pub struct FileConfig {
    pub server: Option<ServerFileConfig>,
    pub database: Option<DatabaseFileConfig>,
    #[serde(flatten)]
    pub extra: serde_json::Value,
}

impl FileConfig {
    /// Load configuration from a JSON file
    fn load_from_file(path: &Path) -> Result<Self> {
        tracing::debug!(path = %path.display(), "Loading config file");
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config: Self = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        Ok(config)
    }

    /// Names of unknown top-level fields
    fn unknown_fields(&self) -> Vec<String> {
        match &self.extra {
            serde_json::Value::Object(map) => map.keys().cloned().collect(),
            _ => Vec::new(),
        }
    }

    /// Warn about unknown fields in the config
    fn warn_unknown_fields(&self) {
        let unknown = self.unknown_fields();
        if !unknown.is_empty() {
            tracing::warn!(
                fields = %unknown.join(", "),
                "Unknown fields in config file (possible typos)"
            );
        }
    }

    /// Merge another FileConfig into this one (other takes precedence)
    fn merge(&mut self, other: FileConfig) {
        if let Some(server) = other.server {
            let current = self.server.get_or_insert_with(ServerFileConfig::default);
            if server.host.is_some() {
                tracing::trace!(host = ?server.host, "Merging server.host");
                current.host = server.host;
            }
            if server.port.is_some() {
                tracing::trace!(port = ?server.port, "Merging server.port");
                current.port = server.port;
            }
            if server.cors_origins.is_some() {
                current.cors_origins = server.cors_origins;
            }
        }

        if let Some(database) = other.database {
            let current = self
                .database
                .get_or_insert_with(DatabaseFileConfig::default);
            if database.backend.is_some() {
                tracing::trace!(backend = ?database.backend, "Merging database.backend");
                current.backend = database.backend;
            }
            if let Some(mongo) = database.mongo {
                let current_mongo = current.mongo.get_or_insert_with(MongoFileConfig::default);
                if mongo.uri.is_some() {
                    current_mongo.uri = mongo.uri;
                }
                if mongo.database.is_some() {
                    current_mongo.database = mongo.database;
                }
                if mongo.collection.is_some() {
                    current_mongo.collection = mongo.collection;
                }
                if mongo.connect_attempts.is_some() {
                    current_mongo.connect_attempts = mongo.connect_attempts;
                }
            }
        }
    }
}

// =============================================================================
// Resolved Config Structs
// =============================================================================

/// HTTP server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub cors_origins: Vec<String>,
}

/// MongoDB connection settings
#[derive(Clone)]
pub struct MongoConfig {
    pub uri: String,
    pub database: String,
    pub collection: String,
    pub connect_attempts: u32,
}

impl fmt::Debug for MongoConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MongoConfig")
            .field("uri", &redact_uri(&self.uri))
            .field("database", &self.database)
            .field("collection", &self.collection)
            .field("connect_attempts", &self.connect_attempts)
            .finish()
    }
}

/// Habit store configuration
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub backend: StoreBackend,
    /// Present whenever a MongoDB URI was configured
    pub mongo: Option<MongoConfig>,
}

/// Final merged application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
}

impl AppConfig {
    /// Load configuration from all sources
    ///
    /// Priority (lowest to highest):
    /// 1. Defaults
    /// 2. Profile directory config (~/.habitrack/habitrack.json)
    /// 3. Local directory config OR CLI-specified config path
    /// 4. CLI arguments (which include env var fallbacks via clap)
    pub fn load(cli: &CliConfig) -> Result<Self> {
        Self::load_with_profile(cli, get_profile_config_path())
    }

    fn load_with_profile(cli: &CliConfig, profile_path: Option<PathBuf>) -> Result<Self> {
        tracing::debug!("Loading application configuration");

        let mut file_config = FileConfig::default();
        let mut found_configs: Vec<String> = Vec::new();

        // 1. Profile dir, skipped if absent
        if let Some(profile_path) = profile_path
            && profile_path.exists()
        {
            let profile_config = FileConfig::load_from_file(&profile_path)?;
            profile_config.warn_unknown_fields();
            file_config.merge(profile_config);
            found_configs.push(profile_path.display().to_string());
        }

        // 2. CLI-specified path OR local directory
        let overlay_path = if let Some(ref path) = cli.config {
            let expanded = expand_home(path);
            if !expanded.exists() {
                anyhow::bail!("Config file not found: {}", expanded.display());
            }
            Some(expanded)
        } else {
            let local = PathBuf::from(CONFIG_FILE_NAME);
            if local.exists() { Some(local) } else { None }
        };

        if let Some(path) = overlay_path {
            let overlay_config = FileConfig::load_from_file(&path)?;
            overlay_config.warn_unknown_fields();
            file_config.merge(overlay_config);
            found_configs.push(path.display().to_string());
        }

        tracing::debug!(configs = ?found_configs, "Config files loaded");

        let config = Self::resolve(cli, file_config);
        config.validate()?;
        Ok(config)
    }

    /// Layer configs: defaults -> file config -> CLI/env overrides
    fn resolve(cli: &CliConfig, file_config: FileConfig) -> Self {
        let file_server = file_config.server.unwrap_or_default();
        let file_database = file_config.database.unwrap_or_default();
        let file_mongo = file_database.mongo.unwrap_or_default();

        let server = ServerConfig {
            host: cli
                .host
                .clone()
                .or(file_server.host)
                .unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port: cli.port.or(file_server.port).unwrap_or(DEFAULT_PORT),
            cors_origins: file_server.cors_origins.unwrap_or_default(),
        };

        let backend = cli
            .database_backend
            .or(file_database.backend)
            .unwrap_or_default();

        let mongo = cli
            .mongodb_uri
            .clone()
            .or(file_mongo.uri)
            .filter(|uri| !uri.trim().is_empty())
            .map(|uri| MongoConfig {
                uri,
                database: cli
                    .mongodb_database
                    .clone()
                    .or(file_mongo.database)
                    .unwrap_or_else(|| MONGO_DEFAULT_DATABASE.to_string()),
                collection: cli
                    .mongodb_collection
                    .clone()
                    .or(file_mongo.collection)
                    .unwrap_or_else(|| MONGO_DEFAULT_COLLECTION.to_string()),
                connect_attempts: file_mongo
                    .connect_attempts
                    .unwrap_or(MONGO_DEFAULT_CONNECT_ATTEMPTS),
            });

        Self {
            server,
            database: DatabaseConfig { backend, mongo },
        }
    }

    /// Validate the configuration for consistency and correctness
    fn validate(&self) -> Result<()> {
        if self.server.host.is_empty() {
            anyhow::bail!("Configuration error: server.host must not be empty");
        }

        // Port 0 would bind a random port
        if self.server.port == 0 {
            anyhow::bail!("Configuration error: server.port must be greater than 0");
        }

        if self.database.backend == StoreBackend::Mongo {
            let Some(ref mongo) = self.database.mongo else {
                anyhow::bail!(
                    "Configuration error: database.mongo.uri is required when database.backend is 'mongo'"
                );
            };
            if mongo.database.is_empty() || mongo.collection.is_empty() {
                anyhow::bail!(
                    "Configuration error: database.mongo.database and database.mongo.collection must not be empty"
                );
            }
            if mongo.connect_attempts == 0 {
                anyhow::bail!(
                    "Configuration error: database.mongo.connect_attempts must be greater than 0"
                );
            }
        }

        if is_all_interfaces(&self.server.host) && self.server.cors_origins.is_empty() {
            tracing::warn!(
                host = %self.server.host,
                "Binding to all interfaces with CORS open to any origin"
            );
        }

        Ok(())
    }

    /// Resolved configuration as JSON with credentials redacted
    pub fn to_redacted_json(&self) -> serde_json::Value {
        serde_json::json!({
            "server": {
                "host": self.server.host,
                "port": self.server.port,
                "cors_origins": self.server.cors_origins,
            },
            "database": {
                "backend": self.database.backend,
                "mongo": self.database.mongo.as_ref().map(|m| serde_json::json!({
                    "uri": redact_uri(&m.uri),
                    "database": m.database,
                    "collection": m.collection,
                    "connect_attempts": m.connect_attempts,
                })),
            },
        })
    }
}

/// Replace the userinfo part of a connection URI with `***`
pub fn redact_uri(uri: &str) -> String {
    let Some((scheme, rest)) = uri.split_once("://") else {
        return uri.to_string();
    };
    // Userinfo ends at the last `@` ahead of any query or fragment; an
    // unencoded `/` in the password must not end the search early
    let query_start = rest.find(['?', '#']).unwrap_or(rest.len());
    match rest[..query_start].rfind('@') {
        Some(at) => format!("{}://***@{}", scheme, &rest[at + 1..]),
        None => uri.to_string(),
    }
}

/// Expand a leading `~/` to the home directory
fn expand_home(path: &Path) -> PathBuf {
    match path.strip_prefix("~") {
        Ok(rest) => dirs::home_dir()
            .map(|home| home.join(rest))
            .unwrap_or_else(|| path.to_path_buf()),
        Err(_) => path.to_path_buf(),
    }
}

/// Get the profile config path (~/.habitrack/habitrack.json)
fn get_profile_config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(APP_DOT_FOLDER).join(CONFIG_FILE_NAME))
}

/// Check if host binds to all network interfaces
pub fn is_all_interfaces(host: &str) -> bool {
    matches!(host, "0.0.0.0" | "::" | "[::]")
}
