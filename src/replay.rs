//! Session replay
//!
//! Drives a [`BehaviorAnalyzer`] from a recorded event stream, firing the
//! session and analysis ticks at the instants a live host's timers would.

use tracing::{debug, info};

use crate::analyzer::{AnalysisReport, BehaviorAnalyzer};
use crate::config::AnalyzerConfig;
use crate::encoder::ReportEncoder;
use crate::error::AnalyzerError;
use crate::schema::{InteractionEvent, InteractionEventAdapter, InteractionKind};
use crate::sink::RecordingSink;
use crate::types::Viewport;

/// Convert a JSON array of interaction events to a report JSON (stateless, one-shot).
///
/// # Example
/// ```ignore
/// let report_json = interactions_to_report(events_json)?;
/// ```
pub fn interactions_to_report(events_json: &str) -> Result<String, AnalyzerError> {
    // Stage 1: Parse events
    let events = InteractionEventAdapter::parse_array(events_json)?;

    // Stage 2: Replay through a fresh analyzer
    let outcome = SessionReplayer::default().replay(&events)?;

    // Stage 3: Encode
    ReportEncoder::new().encode_to_json(&outcome.analyzer, &outcome.reports)
}

/// Result of replaying a session
pub struct ReplayOutcome {
    pub analyzer: BehaviorAnalyzer<RecordingSink>,
    /// Every analysis tick fired during the replay, in order
    pub reports: Vec<AnalysisReport>,
}

/// Replays event streams with simulated periodic ticks
#[derive(Debug, Clone, Default)]
pub struct SessionReplayer {
    config: AnalyzerConfig,
    viewport: Viewport,
    session_start_ms: Option<u64>,
    session_end_ms: Option<u64>,
}

impl SessionReplayer {
    pub fn new(config: AnalyzerConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    /// Viewport in effect until the first resize event
    pub fn with_viewport(mut self, viewport: Viewport) -> Self {
        self.viewport = viewport;
        self
    }

    /// Session start; defaults to the first event's timestamp
    pub fn with_session_start(mut self, session_start_ms: u64) -> Self {
        self.session_start_ms = Some(session_start_ms);
        self
    }

    /// Keep ticking after the last event until this time
    pub fn with_session_end(mut self, session_end_ms: u64) -> Self {
        self.session_end_ms = Some(session_end_ms);
        self
    }

    /// Replay `events`, which must be valid and in non-decreasing time order.
    ///
    /// The span from session start to session end may not exceed
    /// `max_session_ms`; longer streams fail with
    /// [`AnalyzerError::SessionTooLong`] before any tick fires.
    ///
    /// Ticks due at or before an event fire before it is dispatched; when both
    /// ticks are due at the same instant the session tick fires first. A final
    /// analysis runs at the end of the session unless one already ran there.
    pub fn replay(&self, events: &[InteractionEvent]) -> Result<ReplayOutcome, AnalyzerError> {
        if let Some(invalid) = InteractionEventAdapter::validate_events(events).into_iter().next() {
            return Err(AnalyzerError::Validation(invalid.error));
        }

        let start_ms = self
            .session_start_ms
            .or_else(|| events.first().map(|e| e.timestamp_ms))
            .unwrap_or(0);
        let last_event_ms = events.last().map_or(start_ms, |e| e.timestamp_ms);
        let end_ms = self
            .session_end_ms
            .map_or(last_event_ms, |end| end.max(last_event_ms))
            .max(start_ms);

        let span_ms = end_ms - start_ms;
        if span_ms > self.config.max_session_ms {
            return Err(AnalyzerError::SessionTooLong {
                span_ms,
                max_ms: self.config.max_session_ms,
            });
        }

        let sink = RecordingSink::new(self.config.heatmap_capacity);
        let analyzer = BehaviorAnalyzer::new(sink, self.viewport, start_ms, self.config.clone())?;

        let mut scheduler = TickScheduler::new(start_ms, &self.config);
        let mut state = ReplayOutcome {
            analyzer,
            reports: Vec::new(),
        };

        for event in events {
            scheduler.fire_due(event.timestamp_ms, &mut state);
            dispatch(&mut state.analyzer, event);
        }
        scheduler.fire_due(end_ms, &mut state);

        let ran_at_end = state
            .reports
            .last()
            .is_some_and(|r| r.elapsed_ms == span_ms);
        if !ran_at_end {
            let report = state.analyzer.on_analysis_tick(end_ms);
            state.reports.push(report);
        }

        info!(
            events = events.len(),
            analyses = state.reports.len(),
            duration_ms = span_ms,
            "session replay complete"
        );

        Ok(state)
    }
}

/// Next due instants of the two periodic ticks; `None` once a tick would
/// fall past the end of the clock
struct TickScheduler {
    next_session_ms: Option<u64>,
    next_analysis_ms: Option<u64>,
    session_interval_ms: u64,
    analysis_interval_ms: u64,
}

impl TickScheduler {
    fn new(start_ms: u64, config: &AnalyzerConfig) -> Self {
        Self {
            next_session_ms: start_ms.checked_add(config.session_tick_ms),
            next_analysis_ms: start_ms.checked_add(config.analysis_tick_ms),
            session_interval_ms: config.session_tick_ms,
            analysis_interval_ms: config.analysis_tick_ms,
        }
    }

    fn fire_due(&mut self, now_ms: u64, state: &mut ReplayOutcome) {
        loop {
            let session_first = match (self.next_session_ms, self.next_analysis_ms) {
                (Some(session), Some(analysis)) => session <= analysis,
                (Some(_), None) => true,
                (None, Some(_)) => false,
                (None, None) => break,
            };

            if session_first {
                let Some(due) = self.next_session_ms.filter(|&due| due <= now_ms) else {
                    break;
                };
                state.analyzer.on_session_tick(due);
                self.next_session_ms = due.checked_add(self.session_interval_ms);
            } else {
                let Some(due) = self.next_analysis_ms.filter(|&due| due <= now_ms) else {
                    break;
                };
                let report = state.analyzer.on_analysis_tick(due);
                state.reports.push(report);
                self.next_analysis_ms = due.checked_add(self.analysis_interval_ms);
            }
        }
    }
}

fn dispatch(analyzer: &mut BehaviorAnalyzer<RecordingSink>, event: &InteractionEvent) {
    let now_ms = event.timestamp_ms;
    match &event.kind {
        InteractionKind::PointerMove { x, y } => {
            analyzer.record_pointer_move(*x, *y, now_ms);
        }
        InteractionKind::Click { x, y, pressure } => {
            analyzer.record_click(*x, *y, *pressure, now_ms);
        }
        InteractionKind::Scroll { offset } => analyzer.record_scroll(*offset, now_ms),
        InteractionKind::KeyPress { key } => analyzer.record_key_press(key, now_ms),
        InteractionKind::Resize { width, height } => {
            debug!(width, height, "viewport resized");
            analyzer.set_viewport(Viewport::new(*width, *height));
        }
    }
}
