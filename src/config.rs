//! Analyzer configuration
//!
//! Timing and display parameters. Scoring thresholds are fixed heuristics and
//! live in [`crate::classifier`], not here.

use serde::{Deserialize, Serialize};

use crate::error::AnalyzerError;

/// Minimum interval between accepted pointer samples (ms)
pub const DEFAULT_POINTER_GATE_MS: u64 = 50;

/// Interval of the session-time display tick (ms)
pub const DEFAULT_SESSION_TICK_MS: u64 = 1_000;

/// Interval of the full analysis tick (ms)
pub const DEFAULT_ANALYSIS_TICK_MS: u64 = 3_000;

/// Number of heatmap points a recording sink keeps
pub const DEFAULT_HEATMAP_CAPACITY: usize = 50;

/// Upper bound accepted for `heatmap_capacity`
pub const MAX_HEATMAP_CAPACITY: usize = 10_000;

/// Session time below which click frequency reports 0 (ms)
pub const DEFAULT_MIN_FREQUENCY_ELAPSED_MS: u64 = 1_000;

/// Longest session a replay will simulate ticks for (24 h)
pub const DEFAULT_MAX_SESSION_MS: u64 = 24 * 60 * 60 * 1_000;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyzerConfig {
    pub pointer_gate_ms: u64,
    pub session_tick_ms: u64,
    pub analysis_tick_ms: u64,
    pub heatmap_capacity: usize,
    pub min_frequency_elapsed_ms: u64,
    /// Replays spanning more than this are rejected
    pub max_session_ms: u64,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            pointer_gate_ms: DEFAULT_POINTER_GATE_MS,
            session_tick_ms: DEFAULT_SESSION_TICK_MS,
            analysis_tick_ms: DEFAULT_ANALYSIS_TICK_MS,
            heatmap_capacity: DEFAULT_HEATMAP_CAPACITY,
            min_frequency_elapsed_ms: DEFAULT_MIN_FREQUENCY_ELAPSED_MS,
            max_session_ms: DEFAULT_MAX_SESSION_MS,
        }
    }
}

impl AnalyzerConfig {
    /// Parse a configuration from JSON; missing fields take their defaults
    pub fn from_json(json: &str) -> Result<Self, AnalyzerError> {
        let config: AnalyzerConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), AnalyzerError> {
        if self.session_tick_ms == 0 {
            return Err(AnalyzerError::InvalidConfig(
                "session_tick_ms must be positive".to_string(),
            ));
        }
        if self.analysis_tick_ms == 0 {
            return Err(AnalyzerError::InvalidConfig(
                "analysis_tick_ms must be positive".to_string(),
            ));
        }
        if self.heatmap_capacity == 0 {
            return Err(AnalyzerError::InvalidConfig(
                "heatmap_capacity must be positive".to_string(),
            ));
        }
        if self.heatmap_capacity > MAX_HEATMAP_CAPACITY {
            return Err(AnalyzerError::InvalidConfig(format!(
                "heatmap_capacity must be at most {}",
                MAX_HEATMAP_CAPACITY
            )));
        }
        if self.max_session_ms == 0 {
            return Err(AnalyzerError::InvalidConfig(
                "max_session_ms must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_defaults() {
        let config = AnalyzerConfig::default();
        assert_eq!(config.pointer_gate_ms, 50);
        assert_eq!(config.session_tick_ms, 1_000);
        assert_eq!(config.analysis_tick_ms, 3_000);
        assert_eq!(config.heatmap_capacity, 50);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = AnalyzerConfig::from_json(r#"{ "analysis_tick_ms": 5000 }"#).unwrap();
        assert_eq!(
            config,
            AnalyzerConfig {
                analysis_tick_ms: 5000,
                ..AnalyzerConfig::default()
            }
        );
    }

    #[test]
    fn test_rejects_zero_intervals() {
        assert!(AnalyzerConfig::from_json(r#"{ "session_tick_ms": 0 }"#).is_err());
        assert!(AnalyzerConfig::from_json(r#"{ "heatmap_capacity": 0 }"#).is_err());
        assert!(AnalyzerConfig::from_json(r#"{ "max_session_ms": 0 }"#).is_err());
        assert!(AnalyzerConfig::from_json("not json").is_err());
    }

    #[test]
    fn test_rejects_oversized_heatmap() {
        let result = AnalyzerConfig::from_json(r#"{ "heatmap_capacity": 18446744073709551615 }"#);
        assert!(matches!(result, Err(AnalyzerError::InvalidConfig(_))));

        assert!(AnalyzerConfig::from_json(r#"{ "heatmap_capacity": 10000 }"#).is_ok());
        assert!(AnalyzerConfig::from_json(r#"{ "heatmap_capacity": 10001 }"#).is_err());
    }
}
