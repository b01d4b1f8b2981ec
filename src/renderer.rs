//! # Terminal Rendering
//!
//! Text rendering of a [`LayoutResult`] for development and for terminals. The
//! pixel painter lives in [`crate::paint`]; this module only needs the geometry
//! and the labels the assembler already resolved.
//!
//! ## Timeline
//! One text line per lane, scaled to `columns` characters, with the time-axis
//! markers underneath:
//!
//! ```text
//!  10:15 PM → 2:15 AM   in bed 4h 00m   asleep 3h 40m
//!
//! Awake  │                ██
//! REM    │                  ████████████
//! Core   │████████████████
//! Deep   │         ███████
//! Asleep │
//!        └─────────┬─────────┬─────────┬─────────
//!               11:15 PM  12:15 AM  1:15 AM
//! ```
//!
//! ## Circular
//! The ring cannot be drawn legibly in text, so each arc is listed with its
//! angular span instead.

use crate::assemble::{ChartLayout, LayoutResult};
use crate::circular::CircularLayout;
use crate::providers::{DefaultNames, DisplayNameResolver};
use crate::timeline::TimelineLayout;
use crate::SleepStage;
use std::fmt::Write;

/// Width of the lane label column, axis included.
const LABEL_WIDTH: usize = 8;

const BAR: char = '█';

/// Render `result` as text, with the plot area `columns` characters wide.
pub fn draw_ascii(result: &LayoutResult, columns: usize) -> String {
    let mut out = String::new();

    let Some(summary) = &result.summary else {
        out.push_str("No sleep recorded\n");
        return out;
    };

    let _ = writeln!(
        out,
        " {} → {}   in bed {}   asleep {}\n",
        summary.start_label, summary.end_label, summary.in_bed_label, summary.asleep_label
    );

    match &result.chart {
        ChartLayout::Timeline(layout) => draw_timeline(&mut out, layout, result, columns.max(1)),
        ChartLayout::Circular(layout) => draw_circular(&mut out, layout),
    }

    out.push('\n');
    for entry in &result.legend {
        let _ = writeln!(out, "{:<8}{:>8}", entry.name, entry.duration_label);
    }
    out
}

/// Name of the lane, taken from the first stage assigned to it.
fn lane_label(row: usize) -> String {
    SleepStage::ALL
        .iter()
        .find(|stage| stage.timeline_row() == row)
        .map(|&stage| DefaultNames.display_name(stage))
        .unwrap_or_default()
}

fn draw_timeline(out: &mut String, layout: &TimelineLayout, result: &LayoutResult, columns: usize) {
    // Rightmost bar edge stands in for the canvas width
    let extent = layout
        .bars
        .iter()
        .map(|bar| bar.rect.x + bar.rect.width)
        .fold(0.0_f64, f64::max);
    let to_column = |x: f64| {
        if extent > 0.0 {
            ((x / extent) * columns as f64) as usize
        } else {
            0
        }
    };

    let mut grid = vec![vec![' '; columns]; layout.row_tops.len()];
    for bar in &layout.bars {
        let row = bar.stage.timeline_row();
        let first = to_column(bar.rect.x).min(columns - 1);
        let last = to_column(bar.rect.x + bar.rect.width).clamp(first + 1, columns);
        if let Some(lane) = grid.get_mut(row) {
            lane[first..last].iter_mut().for_each(|cell| *cell = BAR);
        }
    }

    for (row, lane) in grid.into_iter().enumerate() {
        let label = format!("{:<width$}", lane_label(row), width = LABEL_WIDTH - 1);
        let _ = writeln!(out, "{}│{}", label, lane.into_iter().collect::<String>());
    }

    // Axis with a tick under every marker, labels centered on their ticks
    let mut axis = vec!['─'; columns];
    let mut labels = vec![' '; columns + LABEL_WIDTH];
    for marker in &result.markers {
        let column = ((marker.position * columns as f64) as usize).min(columns - 1);
        axis[column] = '┬';
        let begin = column.saturating_sub(marker.label.chars().count() / 2);
        for (offset, ch) in marker.label.chars().enumerate() {
            if let Some(cell) = labels.get_mut(begin + offset) {
                *cell = ch;
            }
        }
    }

    let _ = writeln!(
        out,
        "{}└{}",
        " ".repeat(LABEL_WIDTH - 1),
        axis.into_iter().collect::<String>()
    );
    let _ = writeln!(
        out,
        "{}{}",
        " ".repeat(LABEL_WIDTH),
        labels.into_iter().collect::<String>().trim_end()
    );
}

fn draw_circular(out: &mut String, layout: &CircularLayout) {
    let ring = &layout.ring;
    let _ = writeln!(
        out,
        "ring at ({:.0}, {:.0}) radius {:.1} stroke {:.0}",
        ring.center.x, ring.center.y, ring.radius, ring.stroke_width
    );

    for segment in &layout.segments {
        let _ = writeln!(
            out,
            "  {:<8}{:>8.1}° → {:>6.1}°  ({:.1}°)",
            DefaultNames.display_name(segment.stage),
            segment.start_angle_deg,
            segment.end_angle_deg,
            segment.sweep_deg()
        );
    }
    for background in &layout.background {
        let _ = writeln!(
            out,
            "  {:<8}{:>8.1}° → {:>6.1}°",
            "·",
            background.start_angle_deg,
            background.end_angle_deg
        );
    }

    let _ = writeln!(out, "sweep {:.1}° of 360°", layout.total_sweep_deg());
}
