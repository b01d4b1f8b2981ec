//! # Sleep Chart Core Library
//!
//! This library turns a night of labeled sleep stage samples into pure geometry:
//! positioned bars and connector curves for a horizontal timeline, or arc segments,
//! round caps and icon anchors for a clock-face ring. Nothing here paints; every
//! output is expressed in the caller's canvas coordinates and can be handed to any
//! drawing surface (see [`paint`] for an `embedded-graphics` painter and
//! [`renderer`] for the terminal preview).
//!
//! ## Design Philosophy
//!
//! ### Pure Layout
//! - **No retained state**: every layout is a function of `(intervals, config)`
//! - **Degenerate data is not an error**: an empty night yields an empty layout that
//!   callers simply don't draw, and a zero-length night is drawn as thin marks
//! - **Corrupt data is**: an interval ending before it starts is reported as
//!   [`LayoutError::InvalidInterval`] instead of being clamped
//!
//! ### Caller Contracts
//! Intervals must be sorted by `start` ascending. The engine never re-sorts and never
//! merges overlapping samples; sources in [`source`] sort before handing data over.
//!
//! ## Data Flow
//! 1. **Source**: an [`source::IntervalSource`] produces `Vec<SleepInterval>`
//! 2. **Assemble**: [`assemble::ChartAssembler`] runs the aggregator, marker generator
//!    and the configured layout engine
//! 3. **Paint**: the resulting [`assemble::LayoutResult`] is drawn by the caller
//!
//! ## Core Types
//! - [`SleepStage`]: the six-way stage taxonomy, ordered
//! - [`SleepInterval`]: one stage-labeled time range

use chrono::{DateTime, Duration, FixedOffset};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod aggregate;
pub mod assemble;
pub mod circular;
pub mod config;
pub mod geometry;
pub mod markers;
pub mod paint;
pub mod providers;
pub mod renderer;
pub mod source;
pub mod timeline;

#[cfg(test)]
mod tests;

/// An absolute instant that remembers the wall-clock offset it was recorded in.
///
/// The offset matters for two things only: which calendar day a night belongs to
/// (clock-face mode) and how axis labels read.
pub type Timestamp = DateTime<FixedOffset>;

/// Sleep stage reported by a sample.
///
/// Declaration order is significant: it is the legend order, the default color and
/// name lookup order, and (mostly) the timeline row order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum SleepStage {
    #[serde(rename = "awake")]
    Awake,
    #[serde(rename = "remSleep")]
    Rem,
    #[serde(rename = "coreSleep")]
    Core,
    #[serde(rename = "deepSleep")]
    Deep,
    #[serde(rename = "unspecifiedSleep")]
    Unspecified,
    #[serde(rename = "inBed")]
    InBed,
}

impl SleepStage {
    /// Every stage in ordinal order.
    pub const ALL: [SleepStage; 6] = [
        SleepStage::Awake,
        SleepStage::Rem,
        SleepStage::Core,
        SleepStage::Deep,
        SleepStage::Unspecified,
        SleepStage::InBed,
    ];

    pub fn ordinal(self) -> usize {
        self as usize
    }

    /// Fixed timeline lane for this stage.
    ///
    /// Unspecified sleep and in-bed share the bottom lane: in-bed is only drawn
    /// when nothing more specific was recorded, so the two never collide.
    pub fn timeline_row(self) -> usize {
        match self {
            SleepStage::Awake => 0,
            SleepStage::Rem => 1,
            SleepStage::Core => 2,
            SleepStage::Deep => 3,
            SleepStage::Unspecified | SleepStage::InBed => 4,
        }
    }

    /// True for stages that count as time asleep.
    pub fn is_asleep(self) -> bool {
        !matches!(self, SleepStage::Awake | SleepStage::InBed)
    }
}

/// One stage-labeled time range.
///
/// `end >= start` is required; zero-length intervals are legal and represent
/// instantaneous events such as a brief awakening.
///
/// # Example
/// ```
/// use chrono::DateTime;
/// use sleep_chart_lib::{SleepInterval, SleepStage};
///
/// let start = DateTime::parse_from_rfc3339("2024-03-01T23:00:00+01:00").unwrap();
/// let end = DateTime::parse_from_rfc3339("2024-03-02T00:30:00+01:00").unwrap();
/// let deep = SleepInterval::new(SleepStage::Deep, start, end).unwrap();
///
/// assert_eq!(deep.duration().num_minutes(), 90);
/// assert!(SleepInterval::new(SleepStage::Deep, end, start).is_err());
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SleepInterval {
    pub stage: SleepStage,
    pub start: Timestamp,
    pub end: Timestamp,
}

impl SleepInterval {
    /// Build a validated interval.
    pub fn new(stage: SleepStage, start: Timestamp, end: Timestamp) -> Result<Self, LayoutError> {
        let interval = SleepInterval { stage, start, end };
        interval.validate(0)?;
        Ok(interval)
    }

    pub fn duration(&self) -> Duration {
        self.end - self.start
    }

    fn validate(&self, index: usize) -> Result<(), LayoutError> {
        if self.end < self.start {
            return Err(LayoutError::InvalidInterval {
                index,
                start: self.start,
                end: self.end,
            });
        }
        Ok(())
    }
}

/// Conditions the layout engines can report.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LayoutError {
    /// An interval ends before it starts. This is upstream data corruption and is
    /// never silently repaired.
    #[error("interval {index} ends before it starts ({start} > {end})")]
    InvalidInterval {
        index: usize,
        start: Timestamp,
        end: Timestamp,
    },

    /// The session has no measurable length, so proportional layout is undefined.
    /// The engines absorb it; it only escapes through [`session_span`].
    #[error("session span is empty")]
    NullSpan,

    /// A layout option is out of range (row count, canvas size, threshold, ...).
    #[error("invalid layout configuration: {0}")]
    InvalidConfig(String),
}

/// Check every interval for `end >= start`.
pub fn validate_intervals(intervals: &[SleepInterval]) -> Result<(), LayoutError> {
    intervals
        .iter()
        .enumerate()
        .try_for_each(|(index, interval)| interval.validate(index))
}

/// Session bounds `[first.start, last.end]` and their length.
///
/// Returns [`LayoutError::NullSpan`] for an empty list or a non-positive span.
pub fn session_span(intervals: &[SleepInterval]) -> Result<(Timestamp, Timestamp, Duration), LayoutError> {
    let (first, last) = match (intervals.first(), intervals.last()) {
        (Some(first), Some(last)) => (first, last),
        _ => return Err(LayoutError::NullSpan),
    };
    let span = last.end - first.start;
    if span <= Duration::zero() {
        return Err(LayoutError::NullSpan);
    }
    Ok((first.start, last.end, span))
}

/// Duration as fractional seconds, the unit every ratio in the engines uses.
pub(crate) fn seconds(duration: Duration) -> f64 {
    duration.num_milliseconds() as f64 / 1000.0
}
