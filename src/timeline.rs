//! # Timeline Layout
//!
//! Maps a night onto a grid: time runs left to right across the canvas width,
//! and each stage owns a fixed horizontal lane.
//!
//! ```text
//! row 0  Awake        ▌        ▌
//! row 1  REM               ███
//! row 2  Core     ████  ███     ███
//! row 3  Deep         ██
//! row 4  Asleep / In Bed
//! ```
//!
//! ## Rules
//! - `x = (start - first.start) / T * width`, `w = max(min_bar_width, duration / T * width)`
//! - In-bed samples are dropped whenever any other stage was recorded
//! - Consecutive retained bars with different stages are joined by an S-shaped
//!   [`ConnectorCurve`] from the trailing edge of one to the leading edge of the next

use crate::geometry::{ConnectorCurve, LayoutRect, Size};
use crate::{seconds, session_span, validate_intervals, LayoutError, SleepInterval, SleepStage};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Lanes needed to give every stage its fixed row.
pub const MIN_ROW_COUNT: usize = 5;

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimelineOptions {
    pub row_count: usize,
    /// Floor on bar width so zero-length samples still show as a thin mark.
    pub min_bar_width: f64,
    /// Bar thickness. `None` fills each lane completely; otherwise lanes are
    /// separated by the leftover height.
    pub bar_height: Option<f64>,
}

impl Default for TimelineOptions {
    fn default() -> Self {
        TimelineOptions {
            row_count: MIN_ROW_COUNT,
            min_bar_width: 2.0,
            bar_height: None,
        }
    }
}

impl TimelineOptions {
    pub fn validate(&self) -> Result<(), LayoutError> {
        if self.row_count < MIN_ROW_COUNT {
            return Err(LayoutError::InvalidConfig(format!(
                "row_count must be at least {}, got {}",
                MIN_ROW_COUNT, self.row_count
            )));
        }
        if !self.min_bar_width.is_finite() || self.min_bar_width < 0.0 {
            return Err(LayoutError::InvalidConfig(format!(
                "min_bar_width must be a non-negative number, got {}",
                self.min_bar_width
            )));
        }
        if let Some(h) = self.bar_height {
            if !h.is_finite() || h <= 0.0 {
                return Err(LayoutError::InvalidConfig(format!(
                    "bar_height must be positive, got {}",
                    h
                )));
            }
        }
        Ok(())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct TimelineBar {
    pub stage: SleepStage,
    pub rect: LayoutRect,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TimelineLayout {
    pub bars: Vec<TimelineBar>,
    pub connectors: Vec<ConnectorCurve>,
    /// Top of every lane, so painters can draw lane guides.
    pub row_tops: Vec<f64>,
    pub bar_height: f64,
}

impl TimelineLayout {
    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }
}

/// Bar height and the top of every lane for the given canvas.
pub fn row_metrics(options: &TimelineOptions, canvas: Size) -> (f64, Vec<f64>) {
    let rows = options.row_count.max(1);
    let pitch = canvas.height / rows as f64;
    let bar_height = options.bar_height.map_or(pitch, |h| h.min(pitch));
    let spacing = if rows > 1 {
        (canvas.height - rows as f64 * bar_height).max(0.0) / (rows - 1) as f64
    } else {
        0.0
    };
    let tops = (0..rows).map(|i| i as f64 * (bar_height + spacing)).collect();
    (bar_height, tops)
}

/// Lay out `intervals` (sorted by start) on a `canvas`-sized grid.
///
/// Empty input produces an empty layout. A zero-length session (every sample
/// instantaneous and simultaneous) produces minimum-width marks at `x = 0`
/// with no connectors.
pub fn layout_timeline(
    intervals: &[SleepInterval],
    options: &TimelineOptions,
    canvas: Size,
) -> Result<TimelineLayout, LayoutError> {
    options.validate()?;
    if !canvas.is_valid() {
        return Err(LayoutError::InvalidConfig(format!(
            "canvas must be finite and non-negative, got {}x{}",
            canvas.width, canvas.height
        )));
    }
    validate_intervals(intervals)?;

    let (bar_height, row_tops) = row_metrics(options, canvas);

    // A null span has no proportional geometry: instantaneous samples are
    // stacked at the left edge as minimum-width marks and left unconnected.
    let (session_start, total) = match session_span(intervals) {
        Ok((start, _, span)) => (start, Some(seconds(span))),
        Err(_) => match intervals.first() {
            Some(first) => {
                debug!(count = intervals.len(), "timeline has a null span, degenerate layout");
                (first.start, None)
            }
            None => {
                return Ok(TimelineLayout {
                    row_tops,
                    bar_height,
                    ..TimelineLayout::default()
                })
            }
        },
    };

    let suppress_in_bed = intervals.iter().any(|i| i.stage != SleepStage::InBed);
    if suppress_in_bed {
        debug!("in-bed samples superseded by staged sleep, dropping them");
    }

    let mut bars: Vec<TimelineBar> = Vec::with_capacity(intervals.len());
    let mut connectors = Vec::new();

    for interval in intervals {
        if suppress_in_bed && interval.stage == SleepStage::InBed {
            continue;
        }

        let (offset, share) = match total {
            Some(total) => (
                seconds(interval.start - session_start) / total,
                seconds(interval.duration()) / total,
            ),
            None => (0.0, 0.0),
        };
        let rect = LayoutRect {
            x: offset * canvas.width,
            y: row_tops[interval.stage.timeline_row()],
            width: (share * canvas.width).max(options.min_bar_width),
            height: bar_height,
        };

        if let (Some(previous), Some(_)) = (bars.last(), total) {
            if previous.stage != interval.stage {
                connectors.push(ConnectorCurve::s_curve(
                    previous.rect.trailing_mid(),
                    rect.leading_mid(),
                ));
            }
        }

        bars.push(TimelineBar {
            stage: interval.stage,
            rect,
        });
    }

    debug!(bars = bars.len(), connectors = connectors.len(), "timeline laid out");

    Ok(TimelineLayout {
        bars,
        connectors,
        row_tops,
        bar_height,
    })
}
