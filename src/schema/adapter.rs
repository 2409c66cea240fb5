//! Parsing and stream validation for interaction events

use crate::error::AnalyzerError;
use crate::schema::interaction_event::{InteractionEvent, ValidationError};

/// Adapter for reading interaction event streams
pub struct InteractionEventAdapter;

impl InteractionEventAdapter {
    /// Parse a JSON string containing an array of events
    pub fn parse_array(json: &str) -> Result<Vec<InteractionEvent>, AnalyzerError> {
        let events: Vec<InteractionEvent> = serde_json::from_str(json)?;
        Ok(events)
    }

    /// Parse NDJSON (newline-delimited JSON), one event per line
    pub fn parse_ndjson(ndjson: &str) -> Result<Vec<InteractionEvent>, AnalyzerError> {
        let mut events = Vec::new();
        for (line_num, line) in ndjson.lines().enumerate() {
            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }
            match serde_json::from_str::<InteractionEvent>(trimmed) {
                Ok(event) => events.push(event),
                Err(e) => {
                    return Err(AnalyzerError::ParseError(format!(
                        "Failed to parse line {}: {}",
                        line_num + 1,
                        e
                    )));
                }
            }
        }
        Ok(events)
    }

    /// Validate every event and the stream ordering.
    ///
    /// Returns one entry per invalid event; an empty vector means the stream
    /// is valid.
    pub fn validate_events(events: &[InteractionEvent]) -> Vec<ValidationResult> {
        let mut results = Vec::new();
        let mut previous_ms: Option<u64> = None;

        for (index, event) in events.iter().enumerate() {
            let outcome = event.validate().and_then(|()| match previous_ms {
                Some(prev) if event.timestamp_ms < prev => Err(ValidationError::OutOfOrder {
                    timestamp_ms: event.timestamp_ms,
                    previous_ms: prev,
                }),
                _ => Ok(()),
            });

            if let Err(error) = outcome {
                results.push(ValidationResult {
                    index,
                    kind: event.kind.name(),
                    error,
                });
            }
            previous_ms = Some(previous_ms.map_or(event.timestamp_ms, |p| p.max(event.timestamp_ms)));
        }

        results
    }
}

/// A validation failure for one event
#[derive(Debug, Clone)]
pub struct ValidationResult {
    pub index: usize,
    pub kind: &'static str,
    pub error: ValidationError,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_ndjson() -> &'static str {
        r#"{"timestamp_ms": 0, "type": "pointer_move", "x": 10, "y": 10}

{"timestamp_ms": 100, "type": "click", "x": 10, "y": 10, "pressure": 0.4}
{"timestamp_ms": 200, "type": "scroll", "offset": 120}
{"timestamp_ms": 300, "type": "key_press", "key": "a"}
"#
    }

    #[test]
    fn test_parse_ndjson() {
        let events = InteractionEventAdapter::parse_ndjson(sample_ndjson()).unwrap();
        assert_eq!(events.len(), 4);
        assert_eq!(events[1].kind.name(), "click");
        assert!(InteractionEventAdapter::validate_events(&events).is_empty());
    }

    #[test]
    fn test_parse_ndjson_reports_line() {
        let input = "{\"timestamp_ms\": 0, \"type\": \"scroll\", \"offset\": 1}\nnot json\n";
        let err = InteractionEventAdapter::parse_ndjson(input).unwrap_err();
        assert!(err.to_string().contains("line 2"));
    }

    #[test]
    fn test_parse_array() {
        let json = r#"[
            {"timestamp_ms": 0, "type": "resize", "width": 800, "height": 600},
            {"timestamp_ms": 10, "type": "pointer_move", "x": 1, "y": 2}
        ]"#;
        let events = InteractionEventAdapter::parse_array(json).unwrap();
        assert_eq!(events.len(), 2);
        assert!(InteractionEventAdapter::parse_array("{}").is_err());
    }

    #[test]
    fn test_validate_events_flags_out_of_order() {
        let events = vec![
            InteractionEvent::pointer_move(1_000, 0.0, 0.0),
            InteractionEvent::click(500, 0.0, 0.0, None),
            InteractionEvent::click(900, 0.0, 0.0, Some(2.0)),
            InteractionEvent::scroll(1_200, 5.0),
        ];

        let results = InteractionEventAdapter::validate_events(&events);
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].index, 1);
        assert!(matches!(results[0].error, ValidationError::OutOfOrder { .. }));
        assert_eq!(results[1].index, 2);
        assert_eq!(results[1].kind, "click");
        assert!(matches!(results[1].error, ValidationError::PressureOutOfRange(_)));
    }
}
