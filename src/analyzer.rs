//! Session coordinator
//!
//! [`BehaviorAnalyzer`] owns the event buffer and the presentation sink for
//! one session. Input handlers record samples and push immediate display
//! updates; the two periodic ticks refresh session time and run the full
//! extraction → classification → display cycle.

use serde::Serialize;
use tracing::{debug, error, info, trace, warn};
use uuid::Uuid;

use crate::buffer::EventBuffer;
use crate::classifier::TraitClassifier;
use crate::config::AnalyzerConfig;
use crate::error::AnalyzerError;
use crate::features::MetricExtractor;
use crate::sink::PresentationSink;
use crate::types::{
    Insight, MetricSlot, MetricsSnapshot, ScrollPattern, TimelineKind, Trait, Viewport,
};

/// Scroll intensity above which the scroll pattern reads "Energetic"
const ENERGETIC_SCROLL_THRESHOLD: f64 = 100.0;

/// Result of one analysis tick
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisReport {
    /// Session-relative time of the tick
    pub elapsed_ms: u64,
    pub metrics: MetricsSnapshot,
    pub traits: Vec<Trait>,
    pub insight: Insight,
    pub scroll_pattern: ScrollPattern,
    /// Progress bar fill in [0, 100]
    pub progress: f64,
}

/// Single owned coordinator for one interaction session
pub struct BehaviorAnalyzer<S: PresentationSink> {
    session_id: Uuid,
    session_start_ms: u64,
    /// Latest observed timestamp; samples are never recorded before it
    clock_ms: u64,
    viewport: Viewport,
    config: AnalyzerConfig,
    buffer: EventBuffer,
    sink: S,
    latest_report: Option<AnalysisReport>,
}

impl<S: PresentationSink> BehaviorAnalyzer<S> {
    /// Create an analyzer for a session starting at `session_start_ms`.
    ///
    /// Fails if the sink lacks a required display slot, the viewport is not
    /// positive, or the configuration is invalid.
    pub fn new(
        sink: S,
        viewport: Viewport,
        session_start_ms: u64,
        config: AnalyzerConfig,
    ) -> Result<Self, AnalyzerError> {
        config.validate()?;

        if !viewport.is_valid() {
            return Err(AnalyzerError::InvalidViewport {
                width: viewport.width,
                height: viewport.height,
            });
        }

        if let Some(missing) = MetricSlot::ALL.iter().find(|slot| !sink.has_slot(**slot)) {
            return Err(AnalyzerError::MissingSlot(missing.as_str().to_string()));
        }

        let session_id = Uuid::new_v4();
        info!(%session_id, session_start_ms, "behavior analyzer started");

        Ok(Self {
            session_id,
            session_start_ms,
            clock_ms: session_start_ms,
            viewport,
            buffer: EventBuffer::new(config.pointer_gate_ms),
            config,
            sink,
            latest_report: None,
        })
    }

    /// Like [`BehaviorAnalyzer::new`], but a startup failure is logged and
    /// yields `None` so the host can carry on without telemetry.
    pub fn start(
        sink: S,
        viewport: Viewport,
        session_start_ms: u64,
        config: AnalyzerConfig,
    ) -> Option<Self> {
        match Self::new(sink, viewport, session_start_ms, config) {
            Ok(analyzer) => Some(analyzer),
            Err(e) => {
                error!(error = %e, "behavior analyzer failed to start; telemetry disabled");
                None
            }
        }
    }

    /// Advance the session clock, never backwards. The clock starts at the
    /// session start, so the returned time is never before it.
    fn observe(&mut self, now_ms: u64) -> u64 {
        if now_ms < self.clock_ms {
            warn!(now_ms, clock_ms = self.clock_ms, "out-of-order timestamp clamped");
        }
        self.clock_ms = self.clock_ms.max(now_ms);
        self.clock_ms
    }

    fn elapsed_at(&self, now_ms: u64) -> u64 {
        now_ms.max(self.clock_ms).saturating_sub(self.session_start_ms)
    }

    /// Record a pointer move; returns whether it passed the rate gate
    pub fn record_pointer_move(&mut self, x: f64, y: f64, now_ms: u64) -> bool {
        let now_ms = self.observe(now_ms);
        match self.buffer.record_pointer_move(x, y, now_ms, self.viewport) {
            Some(sample) => {
                let speed = sample.speed_px_per_sec.round() as i64;
                self.sink
                    .set_metric_text(MetricSlot::MouseSpeed, &speed.to_string());
                true
            }
            None => {
                trace!(now_ms, "pointer move within rate gate");
                false
            }
        }
    }

    /// Record a click; `pressure` defaults to 0.5 when the source has none
    pub fn record_click(&mut self, x: f64, y: f64, pressure: Option<f64>, now_ms: u64) {
        let now_ms = self.observe(now_ms);
        let sample = self.buffer.record_click(x, y, pressure, now_ms);

        self.sink.set_metric_text(
            MetricSlot::ClickCount,
            &self.buffer.click_count().to_string(),
        );
        self.sink.append_heatmap_point(x, y, sample.pressure);
        let text = format!("Clicked at ({}, {})", x.round() as i64, y.round() as i64);
        self.sink.append_timeline_entry(
            now_ms - self.session_start_ms,
            TimelineKind::Click,
            &text,
        );
    }

    /// Record the current vertical scroll offset
    pub fn record_scroll(&mut self, vertical_offset: f64, now_ms: u64) {
        let now_ms = self.observe(now_ms);
        self.buffer.record_scroll(vertical_offset, now_ms);

        let offset = vertical_offset.round() as i64;
        self.sink
            .set_metric_text(MetricSlot::ScrollDistance, &offset.to_string());
    }

    /// Forward a key press to the timeline; key presses are not buffered
    pub fn record_key_press(&mut self, key: &str, now_ms: u64) {
        let now_ms = self.observe(now_ms);
        let text = format!("Pressed key: {key}");
        self.sink.append_timeline_entry(
            now_ms - self.session_start_ms,
            TimelineKind::Keypress,
            &text,
        );
    }

    /// Update the viewport used to normalize subsequent movement points
    pub fn set_viewport(&mut self, viewport: Viewport) {
        if viewport.is_valid() {
            self.viewport = viewport;
        } else {
            warn!(
                width = viewport.width,
                height = viewport.height,
                "ignoring invalid viewport"
            );
        }
    }

    /// Fast tick: refresh the session time display. Returns whole seconds.
    pub fn on_session_tick(&mut self, now_ms: u64) -> u64 {
        let now_ms = self.observe(now_ms);
        let seconds = (now_ms - self.session_start_ms) / 1000;
        self.sink
            .set_metric_text(MetricSlot::SessionTime, &seconds.to_string());
        seconds
    }

    /// Slow tick: extract metrics, classify, and update the display
    pub fn on_analysis_tick(&mut self, now_ms: u64) -> AnalysisReport {
        let now_ms = self.observe(now_ms);
        let elapsed_ms = now_ms - self.session_start_ms;

        let metrics =
            MetricExtractor::extract(&self.buffer, elapsed_ms, self.config.min_frequency_elapsed_ms);
        let classification = TraitClassifier::classify(&metrics);
        let scroll_pattern = scroll_pattern(&metrics);
        let progress = (metrics.avg_speed / 10.0).clamp(0.0, 100.0);

        debug!(
            elapsed_ms,
            avg_speed = metrics.avg_speed,
            click_frequency = metrics.click_frequency_per_minute,
            scroll_intensity = metrics.scroll_intensity,
            consistency = metrics.movement_consistency,
            decision_speed = metrics.decision_speed,
            traits = classification.traits.len(),
            "analysis tick"
        );

        self.sink.set_metric_text(
            MetricSlot::AvgSpeed,
            &format!("{} px/sec", metrics.avg_speed.round() as i64),
        );
        self.sink.set_metric_text(
            MetricSlot::ClickActivity,
            &format!("{:.1}/min", metrics.click_frequency_per_minute),
        );
        self.sink
            .set_metric_text(MetricSlot::ScrollPattern, scroll_pattern.as_str());
        self.sink.set_progress_ratio(progress);
        self.sink.set_traits(&classification.traits);
        self.sink.set_insight(&classification.insight);

        let report = AnalysisReport {
            elapsed_ms,
            metrics,
            traits: classification.traits,
            insight: classification.insight,
            scroll_pattern,
            progress,
        };
        self.latest_report = Some(report.clone());
        report
    }

    /// Current metrics without touching the display or the clock
    pub fn metrics(&self, now_ms: u64) -> MetricsSnapshot {
        MetricExtractor::extract(
            &self.buffer,
            self.elapsed_at(now_ms),
            self.config.min_frequency_elapsed_ms,
        )
    }

    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    pub fn session_start_ms(&self) -> u64 {
        self.session_start_ms
    }

    /// Latest observed timestamp
    pub fn clock_ms(&self) -> u64 {
        self.clock_ms
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn config(&self) -> &AnalyzerConfig {
        &self.config
    }

    pub fn buffer(&self) -> &EventBuffer {
        &self.buffer
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn latest_report(&self) -> Option<&AnalysisReport> {
        self.latest_report.as_ref()
    }

    pub fn into_sink(self) -> S {
        self.sink
    }
}

/// Display label for the scroll style
pub fn scroll_pattern(metrics: &MetricsSnapshot) -> ScrollPattern {
    if metrics.scroll_intensity > ENERGETIC_SCROLL_THRESHOLD {
        ScrollPattern::Energetic
    } else {
        ScrollPattern::Smooth
    }
}
