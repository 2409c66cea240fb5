//! Presentation sink
//!
//! The analyzer never renders anything itself. It writes display-ready values
//! into a [`PresentationSink`]; what the sink does with them (DOM updates, a
//! terminal UI, a JSON snapshot) is up to the host.

use std::collections::{BTreeMap, BTreeSet, VecDeque};

use serde::Serialize;

use crate::config::DEFAULT_HEATMAP_CAPACITY;
use crate::types::{Insight, MetricSlot, TimelineKind, Trait};

/// Write-only display contract
pub trait PresentationSink {
    /// Whether the sink can display the given slot. Checked once at startup.
    fn has_slot(&self, _slot: MetricSlot) -> bool {
        true
    }

    fn set_metric_text(&mut self, slot: MetricSlot, value: &str);

    /// Progress bar fill in [0, 100]
    fn set_progress_ratio(&mut self, value: f64);

    fn set_traits(&mut self, traits: &[Trait]);

    fn set_insight(&mut self, insight: &Insight);

    /// `at_ms` is session-relative time of the entry
    fn append_timeline_entry(&mut self, at_ms: u64, kind: TimelineKind, text: &str);

    fn append_heatmap_point(&mut self, x: f64, y: f64, intensity: f64);
}

/// One entry of the activity timeline
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimelineEntry {
    pub at_ms: u64,
    pub kind: TimelineKind,
    pub text: String,
}

/// One rendered heatmap cell
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct HeatmapPoint {
    pub x: f64,
    pub y: f64,
    pub intensity: f64,
}

/// Everything a recording sink currently displays
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DisplayState {
    pub metrics: BTreeMap<MetricSlot, String>,
    pub progress: f64,
    pub traits: Vec<Trait>,
    pub insight: Option<Insight>,
    pub timeline: Vec<TimelineEntry>,
    pub heatmap: Vec<HeatmapPoint>,
}

/// In-memory sink that keeps the latest displayed values.
///
/// The heatmap holds at most `heatmap_capacity` points, evicting the oldest
/// first. The timeline is append-only.
#[derive(Debug, Clone)]
pub struct RecordingSink {
    slots: BTreeSet<MetricSlot>,
    metrics: BTreeMap<MetricSlot, String>,
    progress: f64,
    traits: Vec<Trait>,
    insight: Option<Insight>,
    timeline: Vec<TimelineEntry>,
    heatmap: VecDeque<HeatmapPoint>,
    heatmap_capacity: usize,
}

impl Default for RecordingSink {
    fn default() -> Self {
        Self::new(DEFAULT_HEATMAP_CAPACITY)
    }
}

impl RecordingSink {
    /// Sink providing every slot
    pub fn new(heatmap_capacity: usize) -> Self {
        Self::with_slots(MetricSlot::ALL, heatmap_capacity)
    }

    /// Sink providing only the given slots
    pub fn with_slots(slots: impl IntoIterator<Item = MetricSlot>, heatmap_capacity: usize) -> Self {
        Self {
            slots: slots.into_iter().collect(),
            metrics: BTreeMap::new(),
            progress: 0.0,
            traits: Vec::new(),
            insight: None,
            timeline: Vec::new(),
            heatmap: VecDeque::with_capacity(heatmap_capacity.min(DEFAULT_HEATMAP_CAPACITY)),
            heatmap_capacity,
        }
    }

    pub fn metric(&self, slot: MetricSlot) -> Option<&str> {
        self.metrics.get(&slot).map(String::as_str)
    }

    pub fn progress(&self) -> f64 {
        self.progress
    }

    pub fn traits(&self) -> &[Trait] {
        &self.traits
    }

    pub fn insight(&self) -> Option<&Insight> {
        self.insight.as_ref()
    }

    pub fn timeline(&self) -> &[TimelineEntry] {
        &self.timeline
    }

    pub fn heatmap(&self) -> impl Iterator<Item = &HeatmapPoint> {
        self.heatmap.iter()
    }

    pub fn heatmap_len(&self) -> usize {
        self.heatmap.len()
    }

    pub fn display_state(&self) -> DisplayState {
        DisplayState {
            metrics: self.metrics.clone(),
            progress: self.progress,
            traits: self.traits.clone(),
            insight: self.insight,
            timeline: self.timeline.clone(),
            heatmap: self.heatmap.iter().copied().collect(),
        }
    }
}

impl PresentationSink for RecordingSink {
    fn has_slot(&self, slot: MetricSlot) -> bool {
        self.slots.contains(&slot)
    }

    fn set_metric_text(&mut self, slot: MetricSlot, value: &str) {
        if self.slots.contains(&slot) {
            self.metrics.insert(slot, value.to_string());
        }
    }

    fn set_progress_ratio(&mut self, value: f64) {
        self.progress = value.clamp(0.0, 100.0);
    }

    fn set_traits(&mut self, traits: &[Trait]) {
        self.traits = traits.to_vec();
    }

    fn set_insight(&mut self, insight: &Insight) {
        self.insight = Some(*insight);
    }

    fn append_timeline_entry(&mut self, at_ms: u64, kind: TimelineKind, text: &str) {
        self.timeline.push(TimelineEntry {
            at_ms,
            kind,
            text: text.to_string(),
        });
    }

    fn append_heatmap_point(&mut self, x: f64, y: f64, intensity: f64) {
        self.heatmap.push_back(HeatmapPoint { x, y, intensity });
        while self.heatmap.len() > self.heatmap_capacity {
            self.heatmap.pop_front();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::TraitStyle;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_heatmap_keeps_most_recent_points() {
        let mut sink = RecordingSink::default();

        for i in 0..60 {
            sink.append_heatmap_point(i as f64, 0.0, 0.5);
        }

        assert_eq!(sink.heatmap_len(), 50);
        let xs: Vec<f64> = sink.heatmap().map(|p| p.x).collect();
        let expected: Vec<f64> = (10..60).map(|i| i as f64).collect();
        assert_eq!(xs, expected);
    }

    #[test]
    fn test_large_capacity_is_not_preallocated() {
        let mut sink = RecordingSink::new(usize::MAX);
        for i in 0..60 {
            sink.append_heatmap_point(i as f64, 0.0, 0.5);
        }
        assert_eq!(sink.heatmap_len(), 60);
    }

    #[test]
    fn test_timeline_is_append_only() {
        let mut sink = RecordingSink::default();
        for i in 0..100 {
            sink.append_timeline_entry(i, TimelineKind::Keypress, "Pressed key: a");
        }
        assert_eq!(sink.timeline().len(), 100);
        assert_eq!(sink.timeline()[0].at_ms, 0);
    }

    #[test]
    fn test_missing_slots() {
        let sink = RecordingSink::with_slots([MetricSlot::MouseSpeed], 10);
        assert!(sink.has_slot(MetricSlot::MouseSpeed));
        assert!(!sink.has_slot(MetricSlot::SessionTime));
    }

    #[test]
    fn test_metric_text_overwrites() {
        let mut sink = RecordingSink::default();
        sink.set_metric_text(MetricSlot::ClickCount, "1");
        sink.set_metric_text(MetricSlot::ClickCount, "2");
        assert_eq!(sink.metric(MetricSlot::ClickCount), Some("2"));
        assert_eq!(sink.metric(MetricSlot::AvgSpeed), None);
    }

    #[test]
    fn test_progress_is_clamped() {
        let mut sink = RecordingSink::default();
        sink.set_progress_ratio(250.0);
        assert_eq!(sink.progress(), 100.0);
        sink.set_progress_ratio(-1.0);
        assert_eq!(sink.progress(), 0.0);
    }

    #[test]
    fn test_display_state_serializes_slot_names() {
        let mut sink = RecordingSink::default();
        sink.set_metric_text(MetricSlot::SessionTime, "12");
        sink.set_traits(&[Trait::new("Systematic", TraitStyle::Confident)]);

        let value = serde_json::to_value(sink.display_state()).unwrap();
        assert_eq!(value["metrics"]["sessionTime"], "12");
        assert_eq!(value["traits"][0]["name"], "Systematic");
        assert!(value["insight"].is_null());
    }
}
