//! Report encoder
//!
//! Encodes an analyzer's session state and analysis history into a
//! `persona.report.v1` JSON payload.

use chrono::{TimeZone, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::analyzer::{AnalysisReport, BehaviorAnalyzer};
use crate::error::AnalyzerError;
use crate::sink::{DisplayState, RecordingSink};
use crate::{PERSONA_VERSION, PRODUCER_NAME};

/// Current report schema version
pub const REPORT_SCHEMA_VERSION: &str = "persona.report.v1";

/// Producer metadata
#[derive(Debug, Clone, Serialize)]
pub struct ReportProducer {
    pub name: String,
    pub version: String,
    pub instance_id: String,
}

/// Session identity and timing
#[derive(Debug, Clone, Serialize)]
pub struct ReportSession {
    pub session_id: String,
    /// Session start, when the host clock is Unix epoch milliseconds
    pub started_at_utc: Option<String>,
    pub computed_at_utc: String,
    pub duration_sec: f64,
}

/// Number of samples held in each buffer
#[derive(Debug, Clone, Serialize)]
pub struct BufferSummary {
    pub pointer_samples: usize,
    pub movement_points: usize,
    pub clicks: usize,
    pub scroll_samples: usize,
}

/// Complete report payload
#[derive(Debug, Clone, Serialize)]
pub struct PersonaReport {
    pub schema_version: String,
    pub producer: ReportProducer,
    pub session: ReportSession,
    pub buffer_summary: BufferSummary,
    pub analyses: Vec<AnalysisReport>,
    pub latest: Option<AnalysisReport>,
    pub display: DisplayState,
}

/// Encoder for session reports
pub struct ReportEncoder {
    instance_id: String,
}

impl Default for ReportEncoder {
    fn default() -> Self {
        Self::new()
    }
}

impl ReportEncoder {
    /// Create a new encoder with a unique instance ID
    pub fn new() -> Self {
        Self {
            instance_id: Uuid::new_v4().to_string(),
        }
    }

    /// Create an encoder with a specific instance ID
    pub fn with_instance_id(instance_id: String) -> Self {
        Self { instance_id }
    }

    /// Build the report payload for an analyzer and its analysis history
    pub fn encode(
        &self,
        analyzer: &BehaviorAnalyzer<RecordingSink>,
        analyses: &[AnalysisReport],
    ) -> PersonaReport {
        let buffer = analyzer.buffer();
        let start_ms = analyzer.session_start_ms();

        let started_at_utc = i64::try_from(start_ms)
            .ok()
            .and_then(|ms| Utc.timestamp_millis_opt(ms).single())
            .map(|t| t.to_rfc3339());

        PersonaReport {
            schema_version: REPORT_SCHEMA_VERSION.to_string(),
            producer: ReportProducer {
                name: PRODUCER_NAME.to_string(),
                version: PERSONA_VERSION.to_string(),
                instance_id: self.instance_id.clone(),
            },
            session: ReportSession {
                session_id: analyzer.session_id().to_string(),
                started_at_utc,
                computed_at_utc: Utc::now().to_rfc3339(),
                duration_sec: (analyzer.clock_ms() - start_ms) as f64 / 1000.0,
            },
            buffer_summary: BufferSummary {
                pointer_samples: buffer.pointer_samples().len(),
                movement_points: buffer.movement_points().len(),
                clicks: buffer.clicks().len(),
                scroll_samples: buffer.scroll_samples().len(),
            },
            analyses: analyses.to_vec(),
            latest: analyzer.latest_report().cloned(),
            display: analyzer.sink().display_state(),
        }
    }

    /// Encode to a pretty-printed JSON string
    pub fn encode_to_json(
        &self,
        analyzer: &BehaviorAnalyzer<RecordingSink>,
        analyses: &[AnalysisReport],
    ) -> Result<String, AnalyzerError> {
        let report = self.encode(analyzer, analyses);
        serde_json::to_string_pretty(&report).map_err(AnalyzerError::JsonError)
    }
}
