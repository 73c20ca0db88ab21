// =============================================================================
// Application Identity
// =============================================================================

/// Application name in title case (for display)
pub const APP_NAME: &str = "Habitrack";

/// Application name in lowercase (for paths and identifiers)
pub const APP_NAME_LOWER: &str = "habitrack";

/// Unix-style dotfile folder name
pub const APP_DOT_FOLDER: &str = ".habitrack";

// =============================================================================
// Configuration Files
// =============================================================================

/// Config file name
pub const CONFIG_FILE_NAME: &str = "habitrack.json";

/// Environment variable for config file path
pub const ENV_CONFIG: &str = "HABITRACK_CONFIG";

// =============================================================================
// Environment Variables - Server
// =============================================================================

/// Environment variable for server host
pub const ENV_HOST: &str = "HABITRACK_HOST";

/// Environment variable for server port
pub const ENV_PORT: &str = "HABITRACK_PORT";

/// Environment variable for log level/filter
pub const ENV_LOG: &str = "HABITRACK_LOG";

// =============================================================================
// Server Defaults
// =============================================================================

/// Default server host
pub const DEFAULT_HOST: &str = "127.0.0.1";

/// Default server port
pub const DEFAULT_PORT: u16 = 3000;

/// Default request body limit (habit payloads are small)
pub const DEFAULT_BODY_LIMIT: usize = 64 * 1024;

/// Graceful shutdown timeout in seconds
pub const SHUTDOWN_TIMEOUT_SECS: u64 = 30;

// =============================================================================
// Environment Variables - Database
// =============================================================================

/// Environment variable for the habit store backend (mongo or memory)
pub const ENV_DATABASE_BACKEND: &str = "HABITRACK_DATABASE_BACKEND";

/// Environment variable for the MongoDB connection URI
pub const ENV_MONGODB_URI: &str = "HABITRACK_MONGODB_URI";

/// Environment variable for the MongoDB database name
pub const ENV_MONGODB_DATABASE: &str = "HABITRACK_MONGODB_DATABASE";

/// Environment variable for the MongoDB habits collection name
pub const ENV_MONGODB_COLLECTION: &str = "HABITRACK_MONGODB_COLLECTION";

// =============================================================================
// MongoDB
// =============================================================================

/// Default database name
pub const MONGO_DEFAULT_DATABASE: &str = "habitrack";

/// Default habits collection name
pub const MONGO_DEFAULT_COLLECTION: &str = "habits";

/// Default number of startup ping attempts
pub const MONGO_DEFAULT_CONNECT_ATTEMPTS: u32 = 3;

/// Server selection and connect timeout in milliseconds
pub const MONGO_CONNECT_TIMEOUT_MS: u64 = 3000;

/// Base delay for startup ping retries
pub const MONGO_RETRY_BASE_DELAY_MS: u64 = 500;

// =============================================================================
// Habit Queries
// =============================================================================

/// Maximum habits returned by a list query
pub const HABIT_LIST_LIMIT: usize = 500;

/// Habits returned by the recent-habits feed
pub const RECENT_HABITS_LIMIT: usize = 6;
