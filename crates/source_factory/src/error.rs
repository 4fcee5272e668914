//! Error types for source construction.

use thiserror::Error;

/// Source factory error
///
/// Construction failure is fatal at startup; the engine assumes functioning
/// sources once its cycle loop begins.
#[derive(Debug, Error)]
pub enum FactoryError {
    /// Source could not be brought up
    #[error("source init failed for '{label}': {message}")]
    Init { label: String, message: String },

    /// Recorded readings could not be loaded
    #[error("replay load failed for '{path}': {message}")]
    ReplayLoad { path: String, message: String },

    /// A required source parameter is missing
    #[error("missing parameter '{param}' for sensor '{label}'")]
    MissingParam { label: String, param: String },

    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl FactoryError {
    /// Create an init error
    pub fn init(label: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Init {
            label: label.into(),
            message: message.into(),
        }
    }

    /// Create a replay load error
    pub fn replay_load(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ReplayLoad {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create a missing parameter error
    pub fn missing_param(label: impl Into<String>, param: impl Into<String>) -> Self {
        Self::MissingParam {
            label: label.into(),
            param: param.into(),
        }
    }
}
