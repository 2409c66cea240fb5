//! Core data types for interaction telemetry
//!
//! This module defines the raw samples held by the event buffer, the derived
//! metrics snapshot, and the trait/insight labels produced by the classifier.

use serde::{Deserialize, Serialize};

/// Default click pressure when the input source does not report one
pub const DEFAULT_CLICK_PRESSURE: f64 = 0.5;

/// Pointer position accepted past the rate gate
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointerSample {
    pub x: f64,
    pub y: f64,
    /// Speed relative to the previously accepted sample, in pixels per second
    pub speed_px_per_sec: f64,
    pub timestamp_ms: u64,
}

/// Pointer position normalized against the viewport at capture time
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MovementPoint {
    /// Horizontal position in [0, 1]
    pub x_ratio: f64,
    /// Vertical position in [0, 1]
    pub y_ratio: f64,
    pub timestamp_ms: u64,
}

/// A single click
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClickSample {
    pub x: f64,
    pub y: f64,
    pub timestamp_ms: u64,
    /// Pressure in [0, 1]
    pub pressure: f64,
}

/// Vertical scroll position observation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScrollSample {
    pub vertical_offset: f64,
    pub timestamp_ms: u64,
    /// Velocity against the preceding sample, in pixels per second
    pub velocity: f64,
}

/// Viewport dimensions in CSS pixels
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

impl Viewport {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Both dimensions are finite and strictly positive
    pub fn is_valid(&self) -> bool {
        self.width.is_finite() && self.height.is_finite() && self.width > 0.0 && self.height > 0.0
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: 1920.0,
            height: 1080.0,
        }
    }
}

/// Derived behavioral statistics, recomputed on every analysis tick
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    /// Mean pointer speed (px/sec)
    pub avg_speed: f64,
    /// Clicks per minute of session time
    pub click_frequency_per_minute: f64,
    /// Peak scroll velocity (px/sec)
    pub scroll_intensity: f64,
    /// Steadiness of normalized pointer speed (0-1)
    pub movement_consistency: f64,
    /// Inverse of mean inter-click interval (0-1)
    pub decision_speed: f64,
}

impl MetricsSnapshot {
    /// Snapshot of an empty session: zero rates and neutral scores
    pub fn neutral() -> Self {
        Self {
            avg_speed: 0.0,
            click_frequency_per_minute: 0.0,
            scroll_intensity: 0.0,
            movement_consistency: 0.5,
            decision_speed: 0.5,
        }
    }
}

impl Default for MetricsSnapshot {
    fn default() -> Self {
        Self::neutral()
    }
}

/// Display category of a trait badge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TraitStyle {
    Confident,
    Cautious,
    Impulsive,
}

impl TraitStyle {
    pub fn as_str(&self) -> &'static str {
        match self {
            TraitStyle::Confident => "confident",
            TraitStyle::Cautious => "cautious",
            TraitStyle::Impulsive => "impulsive",
        }
    }
}

/// Behavioral label selected by a threshold rule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Trait {
    pub name: &'static str,
    pub style: TraitStyle,
}

impl Trait {
    pub const fn new(name: &'static str, style: TraitStyle) -> Self {
        Self { name, style }
    }
}

/// Which insight rule produced the insight sentence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InsightKind {
    GoalDriven,
    Methodical,
    Intuitive,
    Balanced,
}

/// Natural-language summary of the dominant behavioral pattern
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Insight {
    pub kind: InsightKind,
    pub text: &'static str,
}

/// Scroll style label shown in the `scrollPattern` slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScrollPattern {
    Energetic,
    Smooth,
}

impl ScrollPattern {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScrollPattern::Energetic => "Energetic",
            ScrollPattern::Smooth => "Smooth",
        }
    }
}

/// Named display slots the analyzer writes text values into
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MetricSlot {
    MouseSpeed,
    ClickCount,
    ScrollDistance,
    SessionTime,
    AvgSpeed,
    ClickActivity,
    ScrollPattern,
}

impl MetricSlot {
    /// Every slot the analyzer writes to; a sink must provide all of them
    pub const ALL: [MetricSlot; 7] = [
        MetricSlot::MouseSpeed,
        MetricSlot::ClickCount,
        MetricSlot::ScrollDistance,
        MetricSlot::SessionTime,
        MetricSlot::AvgSpeed,
        MetricSlot::ClickActivity,
        MetricSlot::ScrollPattern,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MetricSlot::MouseSpeed => "mouseSpeed",
            MetricSlot::ClickCount => "clickCount",
            MetricSlot::ScrollDistance => "scrollDistance",
            MetricSlot::SessionTime => "sessionTime",
            MetricSlot::AvgSpeed => "avgSpeed",
            MetricSlot::ClickActivity => "clickActivity",
            MetricSlot::ScrollPattern => "scrollPattern",
        }
    }
}

/// Kind of a timeline entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimelineKind {
    Click,
    Keypress,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metric_slot_names_match_serde() {
        for slot in MetricSlot::ALL {
            let json = serde_json::to_string(&slot).unwrap();
            assert_eq!(json, format!("\"{}\"", slot.as_str()));
        }
    }

    #[test]
    fn test_trait_serializes_lowercase_style() {
        let t = Trait::new("Decisive", TraitStyle::Confident);
        let value = serde_json::to_value(t).unwrap();
        assert_eq!(value["name"], "Decisive");
        assert_eq!(value["style"], "confident");
    }

    #[test]
    fn test_viewport_validity() {
        assert!(Viewport::new(800.0, 600.0).is_valid());
        assert!(!Viewport::new(0.0, 600.0).is_valid());
        assert!(!Viewport::new(800.0, f64::NAN).is_valid());
    }
}
