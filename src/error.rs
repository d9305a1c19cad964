//! Error types for routedrill.
//!
//! Only the outer layers (configuration, stores, import/export) fail. The
//! matching and review engine degrades to empty or no-op results instead.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum RouteDrillError {
    // Configuration errors
    #[error("Configuration file not found at {path}")]
    ConfigFileNotFound { path: String },

    #[error("Failed to parse configuration: {message}")]
    ConfigParse { message: String },

    #[error("Invalid configuration value for {key}: {message}")]
    ConfigInvalidValue { key: String, message: String },

    #[error("Configuration error: {0}")]
    Config(#[from] toml::de::Error),

    // Record store errors
    #[error("Record store unavailable: {message}")]
    StoreUnavailable { message: String },

    #[error("Record store at {path} is corrupt: {source}")]
    StoreFormat {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Record not found: {id}")]
    RecordNotFound { id: String },

    // Import/export errors
    #[error("Spreadsheet error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Import file is missing the {column} column")]
    ImportMissingColumn { column: String },

    // General I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    // Generic error for cases not covered above
    #[error("{0}")]
    Other(String),
}

// Type alias for convenience
pub type Result<T> = std::result::Result<T, RouteDrillError>;
