//! # Interval Sources
//!
//! Where nights come from. The layout engines only ever see a sorted slice of
//! [`SleepInterval`]s; this module turns exported sample files (or a built-in
//! demo night) into that slice.
//!
//! ## Export Format
//!
//! A JSON array of category samples, as written by health-data exporters:
//!
//! ```json
//! [
//!   { "value": 3, "start": "2024-03-01T23:10:00-05:00", "end": "2024-03-01T23:42:00-05:00" },
//!   { "value": 4, "start": "2024-03-01T23:42:00-05:00", "end": "2024-03-02T00:15:00-05:00" }
//! ]
//! ```
//!
//! | value | stage        |
//! |-------|--------------|
//! | 0     | in bed       |
//! | 1     | asleep (unspecified) |
//! | 2     | awake        |
//! | 3     | core         |
//! | 4     | deep         |
//! | 5     | REM          |
//!
//! Samples are sorted by start time before being handed out, so exporters
//! that write newest-first are fine.

use crate::{LayoutError, SleepInterval, SleepStage, Timestamp};
use chrono::Duration;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::{fs, io};
use thiserror::Error;
use tracing::{debug, info};

/// Errors raised while reading a night from disk.
#[derive(Error, Debug)]
pub enum SourceError {
    /// Export file could not be read
    #[error("source IO: {0}")]
    Io(#[from] io::Error),

    /// Export file is not the expected JSON shape
    #[error("malformed export: {0}")]
    Json(#[from] serde_json::Error),

    /// Sample carries a category code outside 0..=5
    #[error("unknown sleep category {0}")]
    UnknownCategory(i64),

    /// Sample ends before it starts
    #[error(transparent)]
    Interval(#[from] LayoutError),
}

/// Anything that can produce one night of samples, sorted by start.
pub trait IntervalSource {
    fn intervals(&self) -> Result<Vec<SleepInterval>, SourceError>;
}

/// Map an exporter category code to a stage.
pub fn stage_from_code(code: i64) -> Result<SleepStage, SourceError> {
    match code {
        0 => Ok(SleepStage::InBed),
        1 => Ok(SleepStage::Unspecified),
        2 => Ok(SleepStage::Awake),
        3 => Ok(SleepStage::Core),
        4 => Ok(SleepStage::Deep),
        5 => Ok(SleepStage::Rem),
        other => Err(SourceError::UnknownCategory(other)),
    }
}

#[derive(Deserialize)]
struct RawSample {
    value: i64,
    start: Timestamp,
    end: Timestamp,
}

/// Parse an export document held in memory.
pub fn parse_export(json: &str) -> Result<Vec<SleepInterval>, SourceError> {
    let raw: Vec<RawSample> = serde_json::from_str(json)?;
    let mut intervals = raw
        .into_iter()
        .map(|sample| -> Result<SleepInterval, SourceError> {
            let stage = stage_from_code(sample.value)?;
            Ok(SleepInterval::new(stage, sample.start, sample.end)?)
        })
        .collect::<Result<Vec<_>, SourceError>>()?;

    intervals.sort_by_key(|i| i.start);
    Ok(intervals)
}

/// Export file on disk.
#[derive(Clone, Debug)]
pub struct JsonFileSource {
    path: PathBuf,
}

impl JsonFileSource {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        JsonFileSource {
            path: path.as_ref().to_path_buf(),
        }
    }
}

impl IntervalSource for JsonFileSource {
    fn intervals(&self) -> Result<Vec<SleepInterval>, SourceError> {
        let contents = fs::read_to_string(&self.path)?;
        let intervals = parse_export(&contents)?;
        info!(path = %self.path.display(), samples = intervals.len(), "loaded sleep export");
        Ok(intervals)
    }
}

/// Built-in night for demos and previews without an export file.
#[derive(Clone, Copy, Debug)]
pub struct DemoSource {
    pub start: Timestamp,
}

impl IntervalSource for DemoSource {
    fn intervals(&self) -> Result<Vec<SleepInterval>, SourceError> {
        Ok(synthetic_night(self.start))
    }
}

/// Stage pattern of the demo night: four shortening cycles with brief
/// awakenings, deep sleep front-loaded and REM growing toward morning.
const DEMO_PATTERN: &[(SleepStage, i64)] = &[
    (SleepStage::InBed, 12),
    (SleepStage::Awake, 6),
    (SleepStage::Core, 28),
    (SleepStage::Deep, 52),
    (SleepStage::Core, 24),
    (SleepStage::Rem, 14),
    (SleepStage::Awake, 3),
    (SleepStage::Core, 34),
    (SleepStage::Deep, 38),
    (SleepStage::Core, 22),
    (SleepStage::Rem, 27),
    (SleepStage::Core, 41),
    (SleepStage::Deep, 16),
    (SleepStage::Rem, 36),
    (SleepStage::Awake, 4),
    (SleepStage::Core, 47),
    (SleepStage::Rem, 44),
    (SleepStage::Awake, 9),
];

/// A plausible night of about seven and a half hours beginning at `start`.
///
/// Samples are contiguous and sorted, so the result always validates.
pub fn synthetic_night(start: Timestamp) -> Vec<SleepInterval> {
    let mut cursor = start;
    let night: Vec<SleepInterval> = DEMO_PATTERN
        .iter()
        .map(|&(stage, minutes)| {
            let begin = cursor;
            cursor = cursor + Duration::minutes(minutes);
            SleepInterval {
                stage,
                start: begin,
                end: cursor,
            }
        })
        .collect();
    debug!(samples = night.len(), "generated demo night");
    night
}
