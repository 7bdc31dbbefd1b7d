use std::path::PathBuf;
use thiserror::Error;

/// Main error type for scout-elastic
#[derive(Error, Debug)]
pub enum ScoutError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid engine configuration: {errors:?}")]
    ConfigValidation { errors: Vec<ValidationError> },

    #[error("No engine configuration at {path}")]
    ConfigNotFound { path: PathBuf },

    #[error("Bad value for {path}: {message}")]
    InvalidConfigValue { path: String, message: String },

    /// Record type has no index configurator
    #[error("An index configurator for the {model} model is not specified.")]
    MissingIndexConfigurator { model: String },

    /// Illegal builder arguments
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Compilation produced no payload
    #[error("no query found")]
    NoQueryFound,

    /// One or more bulk items failed
    #[error("ElasticSearch responded with an error")]
    Bulk {
        #[source]
        source: Option<BulkItemError>,
    },

    /// Transport collaborator failure
    #[error("Transport error: {0}")]
    Transport(String),

    /// Response is missing a path we need
    #[error("Unexpected response: {0}")]
    UnexpectedResponse(String),

    #[error("IO error: {context}: {source}")]
    Io {
        source: std::io::Error,
        context: String,
    },

    #[error("Cannot parse engine configuration: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Cannot serialize engine configuration: {0}")]
    TomlSerialization(#[from] toml::ser::Error),

    /// JSON errors
    #[error("JSON error: {context}: {source}")]
    Json {
        source: serde_json::Error,
        context: String,
    },

    /// Failure reported by an application collaborator (record provider,
    /// transport client)
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// One rejected configuration value
#[derive(Debug, Clone)]
pub struct ValidationError {
    /// Dotted key, e.g. `engine.document_refresh`
    pub path: String,
    pub message: String,
}

impl ValidationError {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// A single failed bulk item, linked to the item that failed before it.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("{error_type} - {reason}")]
pub struct BulkItemError {
    pub error_type: String,
    pub reason: String,
    #[source]
    pub previous: Option<Box<BulkItemError>>,
}

impl BulkItemError {
    /// Iterate the chain starting at this (most recent) item.
    pub fn chain(&self) -> impl Iterator<Item = &BulkItemError> {
        std::iter::successors(Some(self), |e| e.previous.as_deref())
    }
}

/// Result type for scout-elastic operations
pub type Result<T> = std::result::Result<T, ScoutError>;
