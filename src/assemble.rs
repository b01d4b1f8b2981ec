//! # Chart Assembly
//!
//! The composition root: runs the aggregator, the marker generator and the
//! configured layout engine, then attaches human-readable labels through the
//! injected [`crate::providers`] strategies.
//!
//! The assembler holds only its strategies, never results, so one instance can
//! serve any number of threads laying out independent nights.

use crate::aggregate::{aggregate, StageTotals};
use crate::circular::{layout_circular, CircularLayout, CircularOptions};
use crate::geometry::Size;
use crate::markers::{generate_markers_with, TimeMarker, DEFAULT_MARKER_COUNT};
use crate::providers::{
    ClockLabelFormatter, Color, ColorResolver, DefaultColors, DefaultNames, DisplayNameResolver,
    DurationTextFormatter, HoursMinutesFormatter, TimeLabelFormatter,
};
use crate::timeline::{layout_timeline, TimelineLayout, TimelineOptions};
use crate::{LayoutError, SleepInterval, SleepStage};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartKind {
    #[default]
    Timeline,
    Circular,
}

/// Everything a layout pass needs besides the intervals.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChartConfig {
    pub kind: ChartKind,
    pub canvas: Size,
    pub timeline: TimelineOptions,
    pub circular: CircularOptions,
    pub marker_count: usize,
}

impl Default for ChartConfig {
    fn default() -> Self {
        ChartConfig {
            kind: ChartKind::Timeline,
            canvas: Size::new(400.0, 300.0),
            timeline: TimelineOptions::default(),
            circular: CircularOptions::default(),
            marker_count: DEFAULT_MARKER_COUNT,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ChartLayout {
    Timeline(TimelineLayout),
    Circular(CircularLayout),
}

impl ChartLayout {
    pub fn is_empty(&self) -> bool {
        match self {
            ChartLayout::Timeline(layout) => layout.is_empty(),
            ChartLayout::Circular(layout) => layout.is_empty(),
        }
    }

    /// Stages that actually appear in the drawn geometry, in ordinal order.
    pub fn drawn_stages(&self) -> Vec<SleepStage> {
        let mut stages: Vec<SleepStage> = match self {
            ChartLayout::Timeline(layout) => layout.bars.iter().map(|b| b.stage).collect(),
            ChartLayout::Circular(layout) => layout.segments.iter().map(|s| s.stage).collect(),
        };
        stages.sort();
        stages.dedup();
        stages
    }
}

/// Header labels for the night.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSummary {
    /// First sample's start.
    pub start_label: String,
    /// Last sample's end.
    pub end_label: String,
    /// Wall-clock length of the session.
    pub in_bed_label: String,
    /// Time spent in sleeping stages.
    pub asleep_label: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LegendEntry {
    pub stage: SleepStage,
    pub name: String,
    pub duration_label: String,
}

/// Fully resolved layout, ready to paint.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LayoutResult {
    pub chart: ChartLayout,
    pub markers: Vec<TimeMarker>,
    pub totals: StageTotals,
    /// `None` for an empty night.
    pub summary: Option<SessionSummary>,
    pub legend: Vec<LegendEntry>,
}

impl LayoutResult {
    pub fn is_empty(&self) -> bool {
        self.chart.is_empty()
    }
}

/// Builds [`LayoutResult`]s with swappable presentation strategies.
///
/// # Example
/// ```
/// use sleep_chart_lib::assemble::{ChartAssembler, ChartConfig};
/// use sleep_chart_lib::providers::PastelColors;
///
/// let assembler = ChartAssembler::new().with_color_resolver(PastelColors);
/// let result = assembler.assemble(&[], &ChartConfig::default()).unwrap();
///
/// assert!(result.is_empty());
/// assert!(result.summary.is_none());
/// ```
pub struct ChartAssembler {
    colors: Box<dyn ColorResolver>,
    names: Box<dyn DisplayNameResolver>,
    durations: Box<dyn DurationTextFormatter>,
    times: Box<dyn TimeLabelFormatter>,
}

impl Default for ChartAssembler {
    fn default() -> Self {
        ChartAssembler {
            colors: Box::new(DefaultColors),
            names: Box::new(DefaultNames),
            durations: Box::new(HoursMinutesFormatter),
            times: Box::new(ClockLabelFormatter::default()),
        }
    }
}

impl ChartAssembler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_color_resolver(mut self, colors: impl ColorResolver + 'static) -> Self {
        self.colors = Box::new(colors);
        self
    }

    pub fn with_name_resolver(mut self, names: impl DisplayNameResolver + 'static) -> Self {
        self.names = Box::new(names);
        self
    }

    pub fn with_duration_formatter(mut self, durations: impl DurationTextFormatter + 'static) -> Self {
        self.durations = Box::new(durations);
        self
    }

    pub fn with_time_formatter(mut self, times: impl TimeLabelFormatter + 'static) -> Self {
        self.times = Box::new(times);
        self
    }

    /// The color strategy, for painters working from this assembler's output.
    pub fn colors(&self) -> &dyn ColorResolver {
        self.colors.as_ref()
    }

    /// Lay out `intervals` (sorted by start) according to `config`.
    pub fn assemble(
        &self,
        intervals: &[SleepInterval],
        config: &ChartConfig,
    ) -> Result<LayoutResult, LayoutError> {
        let totals = aggregate(intervals)?;

        let chart = match config.kind {
            ChartKind::Timeline => ChartLayout::Timeline(layout_timeline(
                intervals,
                &config.timeline,
                config.canvas,
            )?),
            ChartKind::Circular => ChartLayout::Circular(layout_circular(
                intervals,
                &config.circular,
                config.canvas,
            )?),
        };

        let markers = generate_markers_with(intervals, config.marker_count, self.times.as_ref());
        let summary = self.summary(intervals, &totals);
        let legend = totals
            .iter()
            .map(|(stage, total)| LegendEntry {
                stage,
                name: self.names.display_name(stage),
                duration_label: self.durations.format(total),
            })
            .collect();

        debug!(
            kind = ?config.kind,
            intervals = intervals.len(),
            markers = markers.len(),
            "chart assembled"
        );

        Ok(LayoutResult {
            chart,
            markers,
            totals,
            summary,
            legend,
        })
    }

    /// Resolve a color for every stage drawn in `result`.
    pub fn colorize(&self, result: &LayoutResult) -> BTreeMap<SleepStage, Color> {
        result
            .chart
            .drawn_stages()
            .into_iter()
            .map(|stage| (stage, self.colors.color(stage)))
            .collect()
    }

    fn summary(&self, intervals: &[SleepInterval], totals: &StageTotals) -> Option<SessionSummary> {
        let (first, last) = (intervals.first()?, intervals.last()?);
        Some(SessionSummary {
            start_label: self.times.format(&first.start),
            end_label: self.times.format(&last.end),
            in_bed_label: self.durations.format(last.end - first.start),
            asleep_label: self.durations.format(totals.asleep_total()),
        })
    }
}
