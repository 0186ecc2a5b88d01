//! Error types for handvol.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum HandvolError {
    // Configuration errors
    #[error("Configuration file not found at {path}")]
    ConfigFileNotFound { path: String },

    #[error("Invalid configuration value for {key}: {message}")]
    ConfigInvalidValue { key: String, message: String },

    #[error("Configuration error: {0}")]
    Config(#[from] toml::de::Error),

    // Frame source / tracker errors
    #[error("Tracker unavailable: {message}")]
    TrackerUnavailable { message: String },

    #[error("Failed to read frame: {message}")]
    FrameRead { message: String },

    #[error("Malformed tracker frame at line {line}: {source}")]
    FrameParse {
        line: u64,
        #[source]
        source: serde_json::Error,
    },

    // Volume errors
    #[error("Volume tool not found: {tool}")]
    VolumeToolNotFound { tool: String },

    #[error("Audio control unavailable: {message}")]
    AudioUnavailable { message: String },

    #[error("Setting volume failed: {message}")]
    VolumeSetFailed { message: String },

    // Display errors
    #[error("Display error: {message}")]
    Display { message: String },

    // General I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    // Generic error for cases not covered above
    #[error("{0}")]
    Other(String),
}

// Type alias for convenience
pub type Result<T> = std::result::Result<T, HandvolError>;
