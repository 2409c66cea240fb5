//! Behavioral metric extraction
//!
//! Pure functions that compute a [`MetricsSnapshot`] from the current buffer
//! contents. Nothing here mutates the buffer; repeated calls with the same
//! inputs give the same snapshot.

use crate::buffer::EventBuffer;
use crate::types::{ClickSample, MetricsSnapshot, MovementPoint, PointerSample, ScrollSample};

/// Movement points required before consistency is computed
const MIN_CONSISTENCY_POINTS: usize = 10;

/// Clicks required before decision speed is computed
const MIN_DECISION_CLICKS: usize = 2;

/// Neutral score returned when there is not enough data
const NEUTRAL_SCORE: f64 = 0.5;

/// Empirical scale for the variance of normalized pointer speed.
///
/// Not derived from any data distribution; tune alongside the consistency
/// threshold in the classifier.
pub const CONSISTENCY_VARIANCE_SCALE: f64 = 10_000.0;

/// Extractor for the per-tick metrics snapshot
pub struct MetricExtractor;

impl MetricExtractor {
    /// Compute all metrics.
    ///
    /// `elapsed_ms` is session time at the moment of extraction. Click
    /// frequency reports 0 until `min_frequency_elapsed_ms` has passed.
    pub fn extract(
        buffer: &EventBuffer,
        elapsed_ms: u64,
        min_frequency_elapsed_ms: u64,
    ) -> MetricsSnapshot {
        MetricsSnapshot {
            avg_speed: average_speed(buffer.pointer_samples()),
            click_frequency_per_minute: click_frequency_per_minute(
                buffer.click_count(),
                elapsed_ms,
                min_frequency_elapsed_ms,
            ),
            scroll_intensity: scroll_intensity(buffer.scroll_samples()),
            movement_consistency: movement_consistency(buffer.movement_points()),
            decision_speed: decision_speed(buffer.clicks()),
        }
    }
}

/// Mean pointer speed in px/sec, 0 when no samples exist
pub fn average_speed(samples: &[PointerSample]) -> f64 {
    if samples.is_empty() {
        return 0.0;
    }
    samples.iter().map(|s| s.speed_px_per_sec).sum::<f64>() / samples.len() as f64
}

/// Clicks per minute of elapsed session time
///
/// Formula: `clicks / (elapsed_ms / 60000)`
/// Returns 0 while elapsed time is below `min_elapsed_ms`, where the rate would
/// be dominated by the tiny denominator.
pub fn click_frequency_per_minute(click_count: usize, elapsed_ms: u64, min_elapsed_ms: u64) -> f64 {
    if elapsed_ms == 0 || elapsed_ms < min_elapsed_ms {
        return 0.0;
    }
    let elapsed_minutes = elapsed_ms as f64 / 60_000.0;
    click_count as f64 / elapsed_minutes
}

/// Peak scroll velocity in px/sec, 0 when no samples exist
pub fn scroll_intensity(samples: &[ScrollSample]) -> f64 {
    samples
        .iter()
        .map(|s| s.velocity)
        .fold(0.0_f64, f64::max)
}

/// Steadiness of pointer speed in normalized viewport space
///
/// Formula: `max(0, 1 - variance(step_speeds) / CONSISTENCY_VARIANCE_SCALE)`
/// Step speed is normalized distance divided by elapsed seconds between
/// consecutive points. Fewer than 10 points yields 0.5.
pub fn movement_consistency(points: &[MovementPoint]) -> f64 {
    if points.len() < MIN_CONSISTENCY_POINTS {
        return NEUTRAL_SCORE;
    }

    let speeds: Vec<f64> = points
        .windows(2)
        .filter_map(|pair| {
            let dt_ms = pair[1].timestamp_ms.saturating_sub(pair[0].timestamp_ms);
            if dt_ms == 0 {
                return None;
            }
            let dx = pair[1].x_ratio - pair[0].x_ratio;
            let dy = pair[1].y_ratio - pair[0].y_ratio;
            Some((dx * dx + dy * dy).sqrt() / (dt_ms as f64 / 1000.0))
        })
        .collect();

    if speeds.is_empty() {
        return NEUTRAL_SCORE;
    }

    let n = speeds.len() as f64;
    let mean = speeds.iter().sum::<f64>() / n;
    let variance = speeds.iter().map(|s| (s - mean).powi(2)).sum::<f64>() / n;

    (1.0 - variance / CONSISTENCY_VARIANCE_SCALE).max(0.0)
}

/// How quickly clicks follow one another
///
/// Formula: `min(1, 1000 / mean_interval_ms)`
/// Fewer than 2 clicks yields 0.5; a zero mean interval saturates at 1.
pub fn decision_speed(clicks: &[ClickSample]) -> f64 {
    if clicks.len() < MIN_DECISION_CLICKS {
        return NEUTRAL_SCORE;
    }

    let mut timestamps: Vec<u64> = clicks.iter().map(|c| c.timestamp_ms).collect();
    timestamps.sort_unstable();

    let total_interval: u64 = timestamps.windows(2).map(|pair| pair[1] - pair[0]).sum();
    let mean_interval_ms = total_interval as f64 / (timestamps.len() - 1) as f64;

    if mean_interval_ms <= 0.0 {
        return 1.0;
    }
    (1000.0 / mean_interval_ms).min(1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Viewport;

    fn click_at(timestamp_ms: u64) -> ClickSample {
        ClickSample {
            x: 0.0,
            y: 0.0,
            timestamp_ms,
            pressure: 0.5,
        }
    }

    fn point(x_ratio: f64, y_ratio: f64, timestamp_ms: u64) -> MovementPoint {
        MovementPoint {
            x_ratio,
            y_ratio,
            timestamp_ms,
        }
    }

    #[test]
    fn test_average_speed() {
        assert_eq!(average_speed(&[]), 0.0);

        let samples: Vec<PointerSample> = [100.0, 200.0, 600.0]
            .iter()
            .enumerate()
            .map(|(i, &speed)| PointerSample {
                x: 0.0,
                y: 0.0,
                speed_px_per_sec: speed,
                timestamp_ms: i as u64 * 100,
            })
            .collect();
        assert!((average_speed(&samples) - 300.0).abs() < 1e-9);
    }

    #[test]
    fn test_click_frequency() {
        // 10 clicks over 2 minutes
        assert!((click_frequency_per_minute(10, 120_000, 1_000) - 5.0).abs() < 1e-9);

        // Below the elapsed floor the rate is not meaningful
        assert_eq!(click_frequency_per_minute(3, 500, 1_000), 0.0);
        assert_eq!(click_frequency_per_minute(3, 0, 0), 0.0);
    }

    #[test]
    fn test_scroll_intensity() {
        let mut buffer = EventBuffer::default();
        buffer.record_scroll(0.0, 0);
        buffer.record_scroll(100.0, 1_000);
        buffer.record_scroll(100.0, 2_000);

        assert_eq!(scroll_intensity(buffer.scroll_samples()), 100.0);
        assert_eq!(scroll_intensity(&[]), 0.0);
    }

    #[test]
    fn test_consistency_neutral_below_ten_points() {
        assert_eq!(movement_consistency(&[]), 0.5);

        // Wildly erratic values still give the neutral default
        let erratic: Vec<MovementPoint> = (0..9)
            .map(|i| point((i % 2) as f64, 1.0 - (i % 2) as f64, i))
            .collect();
        assert_eq!(movement_consistency(&erratic), 0.5);
    }

    #[test]
    fn test_consistency_steady_motion() {
        // Constant speed along x: zero variance
        let steady: Vec<MovementPoint> = (0..12)
            .map(|i| point(i as f64 * 0.05, 0.5, i * 100))
            .collect();
        assert!((movement_consistency(&steady) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_consistency_clamped_at_zero() {
        // Alternate full-width jumps in 1ms with 1ms pauses:
        // step speeds alternate 1000 and 0, variance 250000
        let mut points = Vec::new();
        let mut x = 0.0;
        for i in 0..12u64 {
            if i % 2 == 1 {
                x = 1.0 - x;
            }
            points.push(point(x, 0.0, i));
        }
        assert_eq!(movement_consistency(&points), 0.0);
    }

    #[test]
    fn test_decision_speed_neutral_with_few_clicks() {
        assert_eq!(decision_speed(&[]), 0.5);
        assert_eq!(decision_speed(&[click_at(1_000)]), 0.5);
    }

    #[test]
    fn test_decision_speed() {
        let quick: Vec<ClickSample> = [0, 500, 1_000, 1_500].into_iter().map(click_at).collect();
        assert_eq!(decision_speed(&quick), 1.0);

        let slow: Vec<ClickSample> = [4_000, 0, 2_000].into_iter().map(click_at).collect();
        assert!((decision_speed(&slow) - 0.5).abs() < 1e-9);

        let simultaneous = vec![click_at(700), click_at(700)];
        assert_eq!(decision_speed(&simultaneous), 1.0);
    }

    #[test]
    fn test_extract_empty_buffer_is_neutral() {
        let buffer = EventBuffer::default();
        let snapshot = MetricExtractor::extract(&buffer, 0, 1_000);
        assert_eq!(snapshot, MetricsSnapshot::neutral());
    }

    #[test]
    fn test_extract_is_idempotent() {
        let mut buffer = EventBuffer::default();
        let viewport = Viewport::new(1000.0, 1000.0);
        for i in 0..15u64 {
            buffer.record_pointer_move(i as f64 * 40.0, 100.0, i * 100, viewport);
        }
        buffer.record_click(10.0, 10.0, None, 200);
        buffer.record_click(12.0, 12.0, None, 700);

        let first = MetricExtractor::extract(&buffer, 6_000, 1_000);
        let second = MetricExtractor::extract(&buffer, 6_000, 1_000);
        assert_eq!(first, second);
        assert!(first.avg_speed > 0.0);
        assert!((first.click_frequency_per_minute - 20.0).abs() < 1e-9);
        assert!((first.decision_speed - 1.0).abs() < 1e-9);
    }
}
