//! Session event buffer
//!
//! Append-only, time-ordered storage for pointer, click, and scroll samples.
//! Buffers grow for the lifetime of the session; nothing is evicted.

use crate::config::DEFAULT_POINTER_GATE_MS;
use crate::types::{
    ClickSample, MovementPoint, PointerSample, ScrollSample, Viewport, DEFAULT_CLICK_PRESSURE,
};

/// Raw sample storage for one session
#[derive(Debug, Clone)]
pub struct EventBuffer {
    pointer_samples: Vec<PointerSample>,
    movement_points: Vec<MovementPoint>,
    clicks: Vec<ClickSample>,
    scroll_samples: Vec<ScrollSample>,
    /// Position and time of the last accepted pointer sample
    last_pointer: Option<(f64, f64, u64)>,
    pointer_gate_ms: u64,
}

impl Default for EventBuffer {
    fn default() -> Self {
        Self::new(DEFAULT_POINTER_GATE_MS)
    }
}

impl EventBuffer {
    /// Create an empty buffer with the given pointer rate gate
    pub fn new(pointer_gate_ms: u64) -> Self {
        Self {
            pointer_samples: Vec::new(),
            movement_points: Vec::new(),
            clicks: Vec::new(),
            scroll_samples: Vec::new(),
            last_pointer: None,
            pointer_gate_ms,
        }
    }

    /// Record a pointer move.
    ///
    /// Returns `None` when the move falls within the rate gate of the last
    /// accepted sample. The first move of a session has no reference point and
    /// is accepted with speed 0.
    pub fn record_pointer_move(
        &mut self,
        x: f64,
        y: f64,
        now_ms: u64,
        viewport: Viewport,
    ) -> Option<PointerSample> {
        let speed_px_per_sec = match self.last_pointer {
            Some((last_x, last_y, last_ms)) => {
                let time_diff = now_ms.saturating_sub(last_ms);
                if time_diff <= self.pointer_gate_ms {
                    return None;
                }
                let distance = ((x - last_x).powi(2) + (y - last_y).powi(2)).sqrt();
                distance / (time_diff as f64 / 1000.0)
            }
            None => 0.0,
        };

        let sample = PointerSample {
            x,
            y,
            speed_px_per_sec,
            timestamp_ms: now_ms,
        };
        self.pointer_samples.push(sample);
        self.movement_points.push(MovementPoint {
            x_ratio: (x / viewport.width).clamp(0.0, 1.0),
            y_ratio: (y / viewport.height).clamp(0.0, 1.0),
            timestamp_ms: now_ms,
        });
        self.last_pointer = Some((x, y, now_ms));

        Some(sample)
    }

    /// Record a click; never gated
    pub fn record_click(&mut self, x: f64, y: f64, pressure: Option<f64>, now_ms: u64) -> ClickSample {
        let pressure = pressure
            .filter(|p| p.is_finite())
            .unwrap_or(DEFAULT_CLICK_PRESSURE)
            .clamp(0.0, 1.0);

        let sample = ClickSample {
            x,
            y,
            timestamp_ms: now_ms,
            pressure,
        };
        self.clicks.push(sample);
        sample
    }

    /// Record the current vertical scroll offset
    pub fn record_scroll(&mut self, vertical_offset: f64, now_ms: u64) -> ScrollSample {
        let velocity = match self.scroll_samples.last() {
            Some(prev) => {
                let dt = now_ms.saturating_sub(prev.timestamp_ms);
                if dt == 0 {
                    0.0
                } else {
                    (vertical_offset - prev.vertical_offset).abs() / (dt as f64 / 1000.0)
                }
            }
            None => 0.0,
        };

        let sample = ScrollSample {
            vertical_offset,
            timestamp_ms: now_ms,
            velocity,
        };
        self.scroll_samples.push(sample);
        sample
    }

    pub fn pointer_samples(&self) -> &[PointerSample] {
        &self.pointer_samples
    }

    pub fn movement_points(&self) -> &[MovementPoint] {
        &self.movement_points
    }

    pub fn clicks(&self) -> &[ClickSample] {
        &self.clicks
    }

    pub fn scroll_samples(&self) -> &[ScrollSample] {
        &self.scroll_samples
    }

    pub fn click_count(&self) -> usize {
        self.clicks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pointer_samples.is_empty() && self.clicks.is_empty() && self.scroll_samples.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn viewport() -> Viewport {
        Viewport::new(1000.0, 500.0)
    }

    #[test]
    fn test_pointer_moves_within_gate_are_dropped() {
        let mut buffer = EventBuffer::default();

        assert!(buffer.record_pointer_move(0.0, 0.0, 1_000, viewport()).is_some());
        for t in [1_010, 1_030, 1_050] {
            assert!(buffer.record_pointer_move(10.0, 10.0, t, viewport()).is_none());
        }

        assert_eq!(buffer.pointer_samples().len(), 1);
        assert_eq!(buffer.movement_points().len(), 1);
    }

    #[test]
    fn test_pointer_moves_past_gate_are_accepted() {
        let mut buffer = EventBuffer::default();

        for i in 0..5u64 {
            let accepted = buffer.record_pointer_move(i as f64, 0.0, i * 51, viewport());
            assert!(accepted.is_some());
        }

        assert_eq!(buffer.pointer_samples().len(), 5);
    }

    #[test]
    fn test_gate_measures_from_last_accepted_sample() {
        let mut buffer = EventBuffer::default();

        buffer.record_pointer_move(0.0, 0.0, 0, viewport());
        // 40ms after accepted sample: dropped
        assert!(buffer.record_pointer_move(1.0, 1.0, 40, viewport()).is_none());
        // 60ms after accepted sample (20ms after the dropped one): accepted
        assert!(buffer.record_pointer_move(2.0, 2.0, 60, viewport()).is_some());
    }

    #[test]
    fn test_pointer_speed() {
        let mut buffer = EventBuffer::default();

        let first = buffer.record_pointer_move(0.0, 0.0, 0, viewport()).unwrap();
        assert_eq!(first.speed_px_per_sec, 0.0);

        // 3-4-5 triangle: 50px in 100ms = 500px/s
        let second = buffer.record_pointer_move(30.0, 40.0, 100, viewport()).unwrap();
        assert!((second.speed_px_per_sec - 500.0).abs() < 1e-9);
    }

    #[test]
    fn test_movement_points_are_normalized() {
        let mut buffer = EventBuffer::default();

        buffer.record_pointer_move(500.0, 250.0, 0, viewport());
        buffer.record_pointer_move(2000.0, -10.0, 100, viewport());

        let points = buffer.movement_points();
        assert_eq!(points[0].x_ratio, 0.5);
        assert_eq!(points[0].y_ratio, 0.5);
        assert_eq!(points[1].x_ratio, 1.0);
        assert_eq!(points[1].y_ratio, 0.0);
    }

    #[test]
    fn test_click_pressure_defaults() {
        let mut buffer = EventBuffer::default();

        assert_eq!(buffer.record_click(1.0, 2.0, None, 0).pressure, 0.5);
        assert_eq!(buffer.record_click(1.0, 2.0, Some(0.9), 10).pressure, 0.9);
        assert_eq!(buffer.record_click(1.0, 2.0, Some(3.0), 20).pressure, 1.0);
        assert_eq!(buffer.click_count(), 3);
    }

    #[test]
    fn test_clicks_are_not_gated() {
        let mut buffer = EventBuffer::default();
        for _ in 0..4 {
            buffer.record_click(0.0, 0.0, None, 100);
        }
        assert_eq!(buffer.click_count(), 4);
    }

    #[test]
    fn test_scroll_velocity() {
        let mut buffer = EventBuffer::default();

        let velocities: Vec<f64> = [(0.0, 0), (100.0, 1_000), (100.0, 2_000)]
            .iter()
            .map(|&(offset, t)| buffer.record_scroll(offset, t).velocity)
            .collect();

        assert_eq!(velocities, vec![0.0, 100.0, 0.0]);
    }

    #[test]
    fn test_scroll_velocity_same_timestamp() {
        let mut buffer = EventBuffer::default();
        buffer.record_scroll(0.0, 500);
        assert_eq!(buffer.record_scroll(300.0, 500).velocity, 0.0);
    }

    #[test]
    fn test_empty_buffer() {
        let buffer = EventBuffer::default();
        assert!(buffer.is_empty());
        assert_eq!(buffer.click_count(), 0);
    }
}
