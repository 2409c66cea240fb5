//! Error types for Synheart Persona

use thiserror::Error;

use crate::schema::ValidationError;

/// Errors that can occur while starting an analyzer or processing input streams.
///
/// The metric core itself never fails: insufficient data yields neutral defaults.
#[derive(Debug, Error)]
pub enum AnalyzerError {
    #[error("Presentation sink is missing required slot: {0}")]
    MissingSlot(String),

    #[error("Invalid viewport: {width}x{height}")]
    InvalidViewport { width: f64, height: f64 },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid JSON: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Failed to parse interaction events: {0}")]
    ParseError(String),

    #[error("Invalid interaction event: {0}")]
    Validation(#[from] ValidationError),

    #[error("Session spans {span_ms} ms, longer than the {max_ms} ms maximum")]
    SessionTooLong { span_ms: u64, max_ms: u64 },
}
