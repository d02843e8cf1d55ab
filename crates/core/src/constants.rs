//! Constants used throughout the keeper core crate.

/// Identifier of the virtual folder that holds top-level folders and files.
pub const ROOT_FOLDER_ID: &str = "root";

/// Name reported for the virtual root folder.
pub const ROOT_FOLDER_NAME: &str = "root";

/// Database used when `DATABASE_URL` is not configured.
pub const DEFAULT_DATABASE_URL: &str = "sqlite://keeper.db";

/// Default page size for alias listings.
pub const DEFAULT_ALIAS_LIMIT: i64 = 10;

/// Default offset for alias listings.
pub const DEFAULT_ALIAS_OFFSET: i64 = 0;

/// Content formats seeded into a fresh database.
pub const SEEDED_CONTENT_FORMATS: [&str; 5] = ["json", "yaml", "toml", "env", "text"];

/// URL schemes accepted for listener callback endpoints.
pub const CALLBACK_SCHEMES: [&str; 2] = ["http", "https"];
