//! Synheart Persona - On-device interaction telemetry and behavioral trait scoring
//!
//! Persona turns raw interaction events into live trait labels through a
//! deterministic pipeline: event buffering → metric extraction → rule-based
//! classification → presentation sink.
//!
//! ## Modules
//!
//! - **Collection**: [`buffer`] holds rate-gated pointer, click, and scroll samples
//! - **Scoring**: [`features`] derives metrics, [`classifier`] maps them to traits
//! - **Session**: [`analyzer`] owns one session and drives the [`sink`]
//! - **Replay**: [`schema`] and [`replay`] run recorded event streams offline

pub mod analyzer;
pub mod buffer;
pub mod classifier;
pub mod config;
pub mod encoder;
pub mod error;
pub mod features;
pub mod replay;
pub mod schema;
pub mod sink;
pub mod types;

// FFI bindings for C interop
pub mod ffi;

pub use analyzer::{AnalysisReport, BehaviorAnalyzer};
pub use classifier::{Classification, TraitClassifier};
pub use config::AnalyzerConfig;
pub use error::AnalyzerError;
pub use features::MetricExtractor;
pub use replay::{interactions_to_report, SessionReplayer};
pub use sink::{PresentationSink, RecordingSink};
pub use types::{MetricSlot, MetricsSnapshot, Trait, TraitStyle, Viewport};

// Schema exports
pub use schema::{InteractionEvent, InteractionEventAdapter, SCHEMA_VERSION};

/// Persona version embedded in all reports
pub const PERSONA_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Producer name for reports
pub const PRODUCER_NAME: &str = "synheart-persona";
