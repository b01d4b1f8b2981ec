//! # Clock-Face Layout
//!
//! Maps a night onto arc segments around a ring. Two interchangeable strategies
//! decide where each interval lands; everything else (ring fitting, round caps,
//! icon anchors) is shared.
//!
//! ## Angle Strategies
//!
//! ### 24-hour clock ([`ClockMapper`])
//! `angle(t) = (t - midnight) / 86400 * 360 - 90`, with midnight taken in the first
//! sample's own offset. Daytime before and after the session is emitted as
//! [`BackgroundArcSegment`]s so the ring can be dimmed there.
//!
//! ### Percentage of goal ([`ThresholdMapper`])
//! The whole night sweeps `min(total / threshold, 1) * 360` degrees from the top,
//! each sample taking a share proportional to its duration. Wall-clock gaps are
//! ignored and there is no background.
//!
//! ## Terminals
//! Only the two ends of the ring get round caps; boundaries between stages stay
//! square so colors meet cleanly. Icon anchors sit just inside each end.

use crate::geometry::{ArcSegment, BackgroundArcSegment, IconAnchor, Ring, RoundCap, Size};
use crate::{seconds, validate_intervals, LayoutError, SleepInterval, Timestamp};
use chrono::{Duration, Timelike};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Angle of the top of the ring.
pub const TOP_DEG: f64 = -90.0;
pub const FULL_TURN_DEG: f64 = 360.0;
pub const SECONDS_PER_DAY: f64 = 86_400.0;
pub const DEFAULT_THRESHOLD_HOURS: f64 = 9.0;

/// Which angle strategy a circular chart uses.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CircularMode {
    Clock24h,
    Threshold { threshold_hours: f64 },
}

impl Default for CircularMode {
    fn default() -> Self {
        CircularMode::Threshold {
            threshold_hours: DEFAULT_THRESHOLD_HOURS,
        }
    }
}

impl CircularMode {
    /// Build the strategy for this mode.
    pub fn mapper(&self) -> Result<Box<dyn ArcMapper>, LayoutError> {
        match *self {
            CircularMode::Clock24h => Ok(Box::new(ClockMapper)),
            CircularMode::Threshold { threshold_hours } => {
                Ok(Box::new(ThresholdMapper::from_hours(threshold_hours)?))
            }
        }
    }
}

/// Segments produced by an [`ArcMapper`].
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ArcSweep {
    pub segments: Vec<ArcSegment>,
    pub background: Vec<BackgroundArcSegment>,
}

/// Angle strategy: where each interval sits on the ring.
pub trait ArcMapper {
    /// `intervals` are sorted by start and already validated.
    fn map(&self, intervals: &[SleepInterval]) -> ArcSweep;
}

/// Absolute 24-hour clock face.
#[derive(Clone, Copy, Debug, Default)]
pub struct ClockMapper;

impl ArcMapper for ClockMapper {
    fn map(&self, intervals: &[SleepInterval]) -> ArcSweep {
        let (first, last) = match (intervals.first(), intervals.last()) {
            (Some(first), Some(last)) => (first, last),
            _ => return ArcSweep::default(),
        };

        let local = first.start.time();
        let day_start = first.start
            - Duration::seconds(i64::from(local.num_seconds_from_midnight()))
            - Duration::nanoseconds(i64::from(local.nanosecond()));
        let day_end = day_start + Duration::days(1);
        let angle = |t: Timestamp| seconds(t - day_start) / SECONDS_PER_DAY * FULL_TURN_DEG + TOP_DEG;

        let segments = intervals
            .iter()
            .map(|interval| ArcSegment {
                stage: interval.stage,
                start_angle_deg: angle(interval.start),
                end_angle_deg: angle(interval.end),
            })
            .collect();

        let mut background = Vec::with_capacity(2);
        if first.start > day_start {
            background.push(BackgroundArcSegment {
                start_angle_deg: TOP_DEG,
                end_angle_deg: angle(first.start),
            });
        }
        if last.end < day_end {
            background.push(BackgroundArcSegment {
                start_angle_deg: angle(last.end),
                end_angle_deg: TOP_DEG + FULL_TURN_DEG,
            });
        }

        ArcSweep {
            segments,
            background,
        }
    }
}

/// Night drawn as a fraction of a sleep goal.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ThresholdMapper {
    threshold_secs: f64,
}

impl ThresholdMapper {
    pub fn from_hours(hours: f64) -> Result<Self, LayoutError> {
        if !hours.is_finite() || hours <= 0.0 {
            return Err(LayoutError::InvalidConfig(format!(
                "threshold must be a positive number of hours, got {}",
                hours
            )));
        }
        Ok(ThresholdMapper {
            threshold_secs: hours * 3600.0,
        })
    }
}

impl ArcMapper for ThresholdMapper {
    fn map(&self, intervals: &[SleepInterval]) -> ArcSweep {
        let total: f64 = intervals.iter().map(|i| seconds(i.duration())).sum();
        if total <= 0.0 {
            debug!("no recorded duration, empty sweep");
            return ArcSweep::default();
        }

        let total_sweep = (total / self.threshold_secs).min(1.0) * FULL_TURN_DEG;
        let mut cursor = TOP_DEG;
        let last_index = intervals.len() - 1;

        let segments = intervals
            .iter()
            .enumerate()
            .map(|(index, interval)| {
                let start = cursor;
                let end = if index == last_index {
                    // Land exactly on the target so accumulated error can't leak past it
                    TOP_DEG + total_sweep
                } else {
                    cursor + seconds(interval.duration()) / total * total_sweep
                };
                cursor = end;
                ArcSegment {
                    stage: interval.stage,
                    start_angle_deg: start,
                    end_angle_deg: end,
                }
            })
            .collect();

        ArcSweep {
            segments,
            background: Vec::new(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CircularOptions {
    pub mode: CircularMode,
    pub stroke_width: f64,
    /// Inset of the start/end icons from the ends of the ring, in degrees.
    pub icon_padding_deg: f64,
}

impl Default for CircularOptions {
    fn default() -> Self {
        CircularOptions {
            mode: CircularMode::default(),
            stroke_width: 16.0,
            icon_padding_deg: 2.0,
        }
    }
}

impl CircularOptions {
    pub fn validate(&self) -> Result<(), LayoutError> {
        if !self.stroke_width.is_finite() || self.stroke_width <= 0.0 {
            return Err(LayoutError::InvalidConfig(format!(
                "stroke_width must be positive, got {}",
                self.stroke_width
            )));
        }
        if !self.icon_padding_deg.is_finite() {
            return Err(LayoutError::InvalidConfig(
                "icon_padding_deg must be finite".to_string(),
            ));
        }
        Ok(())
    }
}

/// Round caps and icon anchors at both ends of the drawn ring.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct RingTerminals {
    pub start_cap: RoundCap,
    pub end_cap: RoundCap,
    pub sleep_start: IconAnchor,
    pub sleep_end: IconAnchor,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CircularLayout {
    pub ring: Ring,
    pub segments: Vec<ArcSegment>,
    pub background: Vec<BackgroundArcSegment>,
    /// `None` when there is nothing to draw.
    pub terminals: Option<RingTerminals>,
}

impl CircularLayout {
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Angular span covered by sleep segments.
    pub fn total_sweep_deg(&self) -> f64 {
        self.segments.iter().map(ArcSegment::sweep_deg).sum()
    }
}

/// Lay out `intervals` (sorted by start) around a ring fitted to `canvas`.
pub fn layout_circular(
    intervals: &[SleepInterval],
    options: &CircularOptions,
    canvas: Size,
) -> Result<CircularLayout, LayoutError> {
    options.validate()?;
    if !canvas.is_valid() {
        return Err(LayoutError::InvalidConfig(format!(
            "canvas must be finite and non-negative, got {}x{}",
            canvas.width, canvas.height
        )));
    }
    validate_intervals(intervals)?;

    let ring = Ring::fitted(canvas, options.stroke_width);
    let ArcSweep {
        segments,
        background,
    } = options.mode.mapper()?.map(intervals);

    let terminals = match (segments.first(), segments.last()) {
        (Some(first), Some(last)) => Some(terminals(&ring, first, last, options.icon_padding_deg)),
        _ => None,
    };

    debug!(
        segments = segments.len(),
        background = background.len(),
        "circular layout built"
    );

    Ok(CircularLayout {
        ring,
        segments,
        background,
        terminals,
    })
}

fn terminals(ring: &Ring, first: &ArcSegment, last: &ArcSegment, padding_deg: f64) -> RingTerminals {
    let cap_radius = ring.stroke_width / 2.0;
    let start_angle = first.start_angle_deg;
    let end_angle = last.end_angle_deg;
    let anchor = |angle_deg: f64| IconAnchor {
        angle_deg,
        point: ring.point_at(angle_deg),
    };

    RingTerminals {
        start_cap: RoundCap {
            center: ring.point_at(start_angle),
            radius: cap_radius,
            facing_deg: start_angle - 90.0,
        },
        end_cap: RoundCap {
            center: ring.point_at(end_angle),
            radius: cap_radius,
            facing_deg: end_angle + 90.0,
        },
        sleep_start: anchor(start_angle + padding_deg),
        sleep_end: anchor(end_angle - padding_deg),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::{interval, interval_with_offset};
    use crate::SleepStage;

    const EPS: f64 = 1e-9;

    fn threshold(hours: f64) -> CircularOptions {
        CircularOptions {
            mode: CircularMode::Threshold {
                threshold_hours: hours,
            },
            ..CircularOptions::default()
        }
    }

    fn clock() -> CircularOptions {
        CircularOptions {
            mode: CircularMode::Clock24h,
            ..CircularOptions::default()
        }
    }

    fn canvas() -> Size {
        Size::new(200.0, 200.0)
    }

    #[test]
    fn clock_angles_follow_wall_time() {
        let night = [
            interval(SleepStage::Core, "18:00", "21:00"),
            interval(SleepStage::Deep, "21:00", "23:00"),
        ];
        let layout = layout_circular(&night, &clock(), canvas()).unwrap();
        // 18:00 is three quarters of the way round from midnight at the top
        assert!((layout.segments[0].start_angle_deg - 180.0).abs() < EPS);
        assert!((layout.segments[0].end_angle_deg - 225.0).abs() < EPS);
        assert!((layout.segments[1].end_angle_deg - 255.0).abs() < EPS);
    }

    #[test]
    fn clock_background_complements_the_session() {
        let night = [
            interval(SleepStage::Core, "13:00", "15:00"),
            interval(SleepStage::Rem, "15:00", "16:30"),
        ];
        let layout = layout_circular(&night, &clock(), canvas()).unwrap();
        assert_eq!(layout.background.len(), 2);
        assert_eq!(layout.background[0].start_angle_deg, TOP_DEG);
        assert_eq!(layout.background[1].end_angle_deg, 270.0);

        let covered: f64 = layout.total_sweep_deg()
            + layout.background.iter().map(|b| b.sweep_deg()).sum::<f64>();
        assert!((covered - 360.0).abs() < EPS);
    }

    #[test]
    fn clock_uses_the_samples_own_midnight() {
        let night = [interval_with_offset(
            SleepStage::Core,
            "2024-03-01T06:00:00+09:00",
            "2024-03-01T12:00:00+09:00",
        )];
        let layout = layout_circular(&night, &clock(), canvas()).unwrap();
        assert!((layout.segments[0].start_angle_deg - 0.0).abs() < EPS);
        assert!((layout.segments[0].end_angle_deg - 90.0).abs() < EPS);
    }

    #[test]
    fn session_starting_at_midnight_has_one_background_arc() {
        let night = [interval_with_offset(
            SleepStage::Deep,
            "2024-03-02T00:00:00+00:00",
            "2024-03-02T06:00:00+00:00",
        )];
        let layout = layout_circular(&night, &clock(), canvas()).unwrap();
        assert_eq!(layout.background.len(), 1);
        assert!((layout.background[0].start_angle_deg - 0.0).abs() < EPS);
    }

    #[test]
    fn threshold_sweep_is_a_fraction_of_the_goal() {
        let full = [
            interval(SleepStage::Core, "22:00", "01:00"),
            interval(SleepStage::Deep, "01:00", "07:00"),
        ];
        let layout = layout_circular(&full, &threshold(9.0), canvas()).unwrap();
        assert!((layout.total_sweep_deg() - 360.0).abs() < EPS);
        assert_eq!(layout.segments[1].end_angle_deg, 270.0);

        let half = [interval(SleepStage::Core, "22:00", "02:30")];
        let layout = layout_circular(&half, &threshold(9.0), canvas()).unwrap();
        assert_eq!(layout.total_sweep_deg(), 180.0);
    }

    #[test]
    fn threshold_sweep_caps_at_full_turn() {
        let long = [interval(SleepStage::Core, "20:00", "08:00")];
        let layout = layout_circular(&long, &threshold(9.0), canvas()).unwrap();
        assert_eq!(layout.total_sweep_deg(), 360.0);
        assert!(layout.background.is_empty());
    }

    #[test]
    fn threshold_segments_ignore_wall_clock_gaps() {
        let night = [
            interval(SleepStage::Core, "22:00", "23:00"),
            interval(SleepStage::Deep, "03:00", "04:00"),
        ];
        let layout = layout_circular(&night, &threshold(4.0), canvas()).unwrap();
        assert_eq!(layout.segments[0].end_angle_deg, layout.segments[1].start_angle_deg);
        assert!((layout.segments[0].sweep_deg() - 90.0).abs() < EPS);
        assert!((layout.total_sweep_deg() - 180.0).abs() < EPS);
    }

    #[test]
    fn zero_total_is_an_empty_sweep() {
        let instant = [interval(SleepStage::Awake, "03:00", "03:00")];
        let layout = layout_circular(&instant, &threshold(9.0), canvas()).unwrap();
        assert!(layout.is_empty());
        assert!(layout.terminals.is_none());
        assert_eq!(layout.total_sweep_deg(), 0.0);
    }

    #[test]
    fn empty_input_draws_nothing_in_either_mode() {
        for options in [clock(), threshold(9.0)] {
            let layout = layout_circular(&[], &options, canvas()).unwrap();
            assert!(layout.is_empty());
            assert!(layout.background.is_empty());
            assert!(layout.terminals.is_none());
        }
    }

    #[test]
    fn caps_and_icons_sit_on_the_ends() {
        let night = [
            interval(SleepStage::Core, "22:00", "01:00"),
            interval(SleepStage::Rem, "01:00", "02:30"),
        ];
        let layout = layout_circular(&night, &threshold(9.0), canvas()).unwrap();
        let ends = layout.terminals.unwrap();

        assert_eq!(ends.start_cap.radius, 8.0);
        assert_eq!(ends.start_cap.facing_deg, -180.0);
        assert!((ends.start_cap.center.x - 100.0).abs() < EPS);
        assert!((ends.start_cap.center.y - 8.0).abs() < EPS);

        assert_eq!(ends.end_cap.facing_deg, 90.0 + 90.0);
        assert_eq!(ends.sleep_start.angle_deg, -88.0);
        assert_eq!(ends.sleep_end.angle_deg, 88.0);
        let r = layout.ring;
        let d = ((ends.sleep_end.point.x - r.center.x).powi(2)
            + (ends.sleep_end.point.y - r.center.y).powi(2))
        .sqrt();
        assert!((d - r.radius).abs() < EPS);
    }

    #[test]
    fn clock_caps_and_icons_follow_wall_time() {
        let night = [
            interval(SleepStage::Core, "18:00", "21:00"),
            interval(SleepStage::Deep, "21:00", "23:00"),
        ];
        let layout = layout_circular(&night, &clock(), canvas()).unwrap();
        let ends = layout.terminals.unwrap();

        // 18:00 sits at the left of the dial, 23:00 at 255°
        assert!((ends.start_cap.center.x - 8.0).abs() < EPS);
        assert!((ends.start_cap.center.y - 100.0).abs() < EPS);
        assert!((ends.start_cap.facing_deg - 90.0).abs() < EPS);
        assert!((ends.end_cap.facing_deg - 345.0).abs() < EPS);
        assert!((ends.sleep_start.angle_deg - 182.0).abs() < EPS);
        assert!((ends.sleep_end.angle_deg - 253.0).abs() < EPS);
        let expected = layout.ring.point_at(253.0);
        assert!((ends.sleep_end.point.x - expected.x).abs() < 1e-6);
        assert!((ends.sleep_end.point.y - expected.y).abs() < 1e-6);
    }

    #[test]
    fn non_positive_threshold_is_rejected() {
        let night = [interval(SleepStage::Core, "22:00", "23:00")];
        for hours in [0.0, -1.0, f64::NAN] {
            assert!(matches!(
                layout_circular(&night, &threshold(hours), canvas()),
                Err(LayoutError::InvalidConfig(_))
            ));
        }
    }
}
