//! persona.interaction_event.v1 schema definition
//!
//! One record per raw input event, in the order the host delivered them:
//! pointer moves, clicks, scroll positions, key presses, and viewport resizes.

use serde::{Deserialize, Serialize};

/// Current schema version
pub const SCHEMA_VERSION: &str = "persona.interaction_event.v1";

fn default_schema_version() -> String {
    SCHEMA_VERSION.to_string()
}

/// Event-specific payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InteractionKind {
    PointerMove {
        x: f64,
        y: f64,
    },
    Click {
        x: f64,
        y: f64,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pressure: Option<f64>,
    },
    Scroll {
        /// Current vertical scroll offset in pixels
        offset: f64,
    },
    KeyPress {
        key: String,
    },
    Resize {
        width: f64,
        height: f64,
    },
}

impl InteractionKind {
    pub fn name(&self) -> &'static str {
        match self {
            InteractionKind::PointerMove { .. } => "pointer_move",
            InteractionKind::Click { .. } => "click",
            InteractionKind::Scroll { .. } => "scroll",
            InteractionKind::KeyPress { .. } => "key_press",
            InteractionKind::Resize { .. } => "resize",
        }
    }
}

/// A single raw interaction event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InteractionEvent {
    /// Schema version (defaults to the current version when omitted)
    #[serde(default = "default_schema_version")]
    pub schema_version: String,

    /// Milliseconds on the host clock (typically Unix epoch ms)
    pub timestamp_ms: u64,

    #[serde(flatten)]
    pub kind: InteractionKind,
}

impl InteractionEvent {
    pub fn new(timestamp_ms: u64, kind: InteractionKind) -> Self {
        Self {
            schema_version: SCHEMA_VERSION.to_string(),
            timestamp_ms,
            kind,
        }
    }

    pub fn pointer_move(timestamp_ms: u64, x: f64, y: f64) -> Self {
        Self::new(timestamp_ms, InteractionKind::PointerMove { x, y })
    }

    pub fn click(timestamp_ms: u64, x: f64, y: f64, pressure: Option<f64>) -> Self {
        Self::new(timestamp_ms, InteractionKind::Click { x, y, pressure })
    }

    pub fn scroll(timestamp_ms: u64, offset: f64) -> Self {
        Self::new(timestamp_ms, InteractionKind::Scroll { offset })
    }

    pub fn key_press(timestamp_ms: u64, key: impl Into<String>) -> Self {
        Self::new(timestamp_ms, InteractionKind::KeyPress { key: key.into() })
    }

    pub fn resize(timestamp_ms: u64, width: f64, height: f64) -> Self {
        Self::new(timestamp_ms, InteractionKind::Resize { width, height })
    }

    /// Validate a single event in isolation
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.schema_version != SCHEMA_VERSION {
            return Err(ValidationError::InvalidSchemaVersion {
                expected: SCHEMA_VERSION.to_string(),
                actual: self.schema_version.clone(),
            });
        }

        match &self.kind {
            InteractionKind::PointerMove { x, y } => check_finite("pointer_move", &[*x, *y]),
            InteractionKind::Click { x, y, pressure } => {
                check_finite("click", &[*x, *y])?;
                match pressure {
                    Some(p) if !(0.0..=1.0).contains(p) => {
                        Err(ValidationError::PressureOutOfRange(*p))
                    }
                    _ => Ok(()),
                }
            }
            InteractionKind::Scroll { offset } => check_finite("scroll", &[*offset]),
            InteractionKind::KeyPress { key } => {
                if key.is_empty() {
                    Err(ValidationError::EmptyKey)
                } else {
                    Ok(())
                }
            }
            InteractionKind::Resize { width, height } => {
                if width.is_finite() && height.is_finite() && *width > 0.0 && *height > 0.0 {
                    Ok(())
                } else {
                    Err(ValidationError::InvalidViewport {
                        width: *width,
                        height: *height,
                    })
                }
            }
        }
    }
}

fn check_finite(kind: &'static str, values: &[f64]) -> Result<(), ValidationError> {
    if values.iter().all(|v| v.is_finite()) {
        Ok(())
    } else {
        Err(ValidationError::NonFiniteCoordinate(kind))
    }
}

/// Validation errors for interaction events
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("Invalid schema version: expected {expected}, got {actual}")]
    InvalidSchemaVersion { expected: String, actual: String },

    #[error("Non-finite coordinate in {0} event")]
    NonFiniteCoordinate(&'static str),

    #[error("Click pressure {0} outside [0, 1]")]
    PressureOutOfRange(f64),

    #[error("Key press with empty key")]
    EmptyKey,

    #[error("Invalid viewport: {width}x{height}")]
    InvalidViewport { width: f64, height: f64 },

    #[error("Timestamp {timestamp_ms} is earlier than preceding event at {previous_ms}")]
    OutOfOrder { timestamp_ms: u64, previous_ms: u64 },
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_serialize_click() {
        let event = InteractionEvent::click(1_000, 10.0, 20.0, Some(0.7));
        let value = serde_json::to_value(&event).unwrap();

        assert_eq!(value["schema_version"], SCHEMA_VERSION);
        assert_eq!(value["timestamp_ms"], 1_000);
        assert_eq!(value["type"], "click");
        assert_eq!(value["x"], 10.0);
        assert_eq!(value["pressure"], 0.7);
    }

    #[test]
    fn test_deserialize_without_schema_version() {
        let json = r#"{ "timestamp_ms": 42, "type": "key_press", "key": "Tab" }"#;
        let event: InteractionEvent = serde_json::from_str(json).unwrap();

        assert_eq!(event, InteractionEvent::key_press(42, "Tab"));
        assert!(event.validate().is_ok());
    }

    #[test]
    fn test_deserialize_click_without_pressure() {
        let json = r#"{ "timestamp_ms": 5, "type": "click", "x": 1, "y": 2 }"#;
        let event: InteractionEvent = serde_json::from_str(json).unwrap();
        assert_eq!(
            event.kind,
            InteractionKind::Click {
                x: 1.0,
                y: 2.0,
                pressure: None
            }
        );
    }

    #[test]
    fn test_validation() {
        let mut event = InteractionEvent::scroll(0, 10.0);
        assert!(event.validate().is_ok());

        event.schema_version = "persona.interaction_event.v0".to_string();
        assert!(matches!(
            event.validate(),
            Err(ValidationError::InvalidSchemaVersion { .. })
        ));

        let bad_pressure = InteractionEvent::click(0, 1.0, 1.0, Some(1.5));
        assert_eq!(
            bad_pressure.validate(),
            Err(ValidationError::PressureOutOfRange(1.5))
        );

        let bad_resize = InteractionEvent::resize(0, 0.0, 600.0);
        assert!(bad_resize.validate().is_err());

        let bad_key = InteractionEvent::key_press(0, "");
        assert_eq!(bad_key.validate(), Err(ValidationError::EmptyKey));

        let bad_move = InteractionEvent::pointer_move(0, f64::INFINITY, 0.0);
        assert_eq!(
            bad_move.validate(),
            Err(ValidationError::NonFiniteCoordinate("pointer_move"))
        );
    }
}
