//! Interior time-axis markers.
//!
//! Markers split the session span `[first.start, last.end]` into `count + 1`
//! equal parts, so the default of three yields gridlines at 25%, 50% and 75%.

use crate::providers::{ClockLabelFormatter, TimeLabelFormatter};
use crate::{session_span, SleepInterval};
use chrono::Duration;
use serde::{Deserialize, Serialize};

pub const DEFAULT_MARKER_COUNT: usize = 3;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TimeMarker {
    pub label: String,
    /// Fraction of the session span, in `[0, 1]`.
    pub position: f64,
}

/// Markers labeled with the default wall-clock format.
pub fn generate_markers(intervals: &[SleepInterval], count: usize) -> Vec<TimeMarker> {
    generate_markers_with(intervals, count, &ClockLabelFormatter::default())
}

/// Markers labeled by `formatter`.
///
/// Empty input or a null span produces no markers.
pub fn generate_markers_with(
    intervals: &[SleepInterval],
    count: usize,
    formatter: &dyn TimeLabelFormatter,
) -> Vec<TimeMarker> {
    let Ok((start, _, span)) = session_span(intervals) else {
        return Vec::new();
    };
    let span_ms = span.num_milliseconds() as f64;

    (1..=count)
        .map(|i| {
            let position = i as f64 / (count + 1) as f64;
            let at = start + Duration::milliseconds((span_ms * position).round() as i64);
            TimeMarker {
                label: formatter.format(&at),
                position,
            }
        })
        .collect()
}
