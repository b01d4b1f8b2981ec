//! # Pluggable Presentation Strategies
//!
//! The layout engines only ever carry a [`SleepStage`]; colors, stage names and
//! human-readable durations are resolved by small single-method strategies that
//! callers swap in when building a [`crate::assemble::ChartAssembler`].
//!
//! ## Available Strategies
//! - [`ColorResolver`]: [`DefaultColors`], [`SystemColors`], [`HighContrastColors`], [`PastelColors`]
//! - [`DisplayNameResolver`]: [`DefaultNames`]
//! - [`DurationTextFormatter`]: [`HoursMinutesFormatter`]
//! - [`TimeLabelFormatter`]: [`ClockLabelFormatter`]

use crate::{SleepStage, Timestamp};
use chrono::Duration;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// 24-bit RGB color.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Color { r, g, b }
    }

    const fn hex(value: u32) -> Self {
        Color {
            r: (value >> 16) as u8,
            g: (value >> 8) as u8,
            b: value as u8,
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
#[error("invalid hex color: {0:?}")]
pub struct ParseColorError(String);

impl FromStr for Color {
    type Err = ParseColorError;

    /// Parses `#rrggbb` or `rrggbb`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = s.strip_prefix('#').unwrap_or(s);
        if digits.len() != 6 || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(ParseColorError(s.to_string()));
        }
        u32::from_str_radix(digits, 16)
            .map(Color::hex)
            .map_err(|_| ParseColorError(s.to_string()))
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

pub trait ColorResolver: Send + Sync {
    fn color(&self, stage: SleepStage) -> Color;
}

impl<T: ColorResolver + ?Sized> ColorResolver for Box<T> {
    fn color(&self, stage: SleepStage) -> Color {
        (**self).color(stage)
    }
}

pub trait DisplayNameResolver: Send + Sync {
    fn display_name(&self, stage: SleepStage) -> String;
}

pub trait DurationTextFormatter: Send + Sync {
    fn format(&self, duration: Duration) -> String;
}

pub trait TimeLabelFormatter: Send + Sync {
    fn format(&self, at: &Timestamp) -> String;
}

/// Saturated palette used when nothing else is configured.
#[derive(Clone, Copy, Debug, Default)]
pub struct DefaultColors;

impl ColorResolver for DefaultColors {
    fn color(&self, stage: SleepStage) -> Color {
        match stage {
            SleepStage::Awake => Color::hex(0xff6b5b),
            SleepStage::Rem => Color::hex(0x4fc3f7),
            SleepStage::Core => Color::hex(0x3d7bf2),
            SleepStage::Deep => Color::hex(0x3b2ca6),
            SleepStage::Unspecified => Color::hex(0x5c8df6),
            SleepStage::InBed => Color::hex(0x8e8e93),
        }
    }
}

/// Palette matching the platform health app's stage colors.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemColors;

impl ColorResolver for SystemColors {
    fn color(&self, stage: SleepStage) -> Color {
        match stage {
            SleepStage::Awake => Color::hex(0xff9f0a),
            SleepStage::Rem => Color::hex(0x64d2ff),
            SleepStage::Core => Color::hex(0x0a84ff),
            SleepStage::Deep => Color::hex(0x5e5ce6),
            SleepStage::Unspecified => Color::hex(0x0a84ff),
            SleepStage::InBed => Color::hex(0x98989d),
        }
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct HighContrastColors;

impl ColorResolver for HighContrastColors {
    fn color(&self, stage: SleepStage) -> Color {
        match stage {
            SleepStage::Awake => Color::hex(0xff0000),
            SleepStage::Rem => Color::hex(0x00ffff),
            SleepStage::Core => Color::hex(0x0000ff),
            SleepStage::Deep => Color::hex(0x000000),
            SleepStage::Unspecified => Color::hex(0x00ff00),
            SleepStage::InBed => Color::hex(0x808080),
        }
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct PastelColors;

impl ColorResolver for PastelColors {
    fn color(&self, stage: SleepStage) -> Color {
        match stage {
            SleepStage::Awake => Color::hex(0xffb3ba),
            SleepStage::Rem => Color::hex(0xbae1ff),
            SleepStage::Core => Color::hex(0xa7c7e7),
            SleepStage::Deep => Color::hex(0xc3b1e1),
            SleepStage::Unspecified => Color::hex(0xbaffc9),
            SleepStage::InBed => Color::hex(0xe0e0e0),
        }
    }
}

/// English stage names.
#[derive(Clone, Copy, Debug, Default)]
pub struct DefaultNames;

impl DisplayNameResolver for DefaultNames {
    fn display_name(&self, stage: SleepStage) -> String {
        match stage {
            SleepStage::Awake => "Awake",
            SleepStage::Rem => "REM",
            SleepStage::Core => "Core",
            SleepStage::Deep => "Deep",
            SleepStage::Unspecified => "Asleep",
            SleepStage::InBed => "In Bed",
        }
        .to_string()
    }
}

/// `7h 05m`, `45m`, `0m`. Seconds are truncated; negative input reads as `0m`.
#[derive(Clone, Copy, Debug, Default)]
pub struct HoursMinutesFormatter;

impl DurationTextFormatter for HoursMinutesFormatter {
    fn format(&self, duration: Duration) -> String {
        let minutes = duration.num_minutes().max(0);
        let (hours, minutes) = (minutes / 60, minutes % 60);
        if hours > 0 {
            format!("{}h {:02}m", hours, minutes)
        } else {
            format!("{}m", minutes)
        }
    }
}

/// Wall-clock labels using a `chrono` format pattern, in the timestamp's own offset.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClockLabelFormatter {
    pub pattern: String,
}

impl Default for ClockLabelFormatter {
    fn default() -> Self {
        ClockLabelFormatter {
            pattern: "%-I:%M %p".to_string(),
        }
    }
}

impl TimeLabelFormatter for ClockLabelFormatter {
    fn format(&self, at: &Timestamp) -> String {
        at.format(&self.pattern).to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::at;

    #[test]
    fn hex_round_trip() {
        let color: Color = "#3D7BF2".parse().unwrap();
        assert_eq!(color, Color::rgb(0x3d, 0x7b, 0xf2));
        assert_eq!(color.to_string(), "#3d7bf2");
        assert!("3d7bf".parse::<Color>().is_err());
        assert!("#zzzzzz".parse::<Color>().is_err());
    }

    #[test]
    fn palettes_distinguish_sleep_stages() {
        let palettes: [&dyn ColorResolver; 3] = [&DefaultColors, &HighContrastColors, &PastelColors];
        for palette in palettes {
            let specific = [SleepStage::Awake, SleepStage::Rem, SleepStage::Core, SleepStage::Deep];
            for (i, a) in specific.iter().enumerate() {
                for b in &specific[i + 1..] {
                    assert_ne!(palette.color(*a), palette.color(*b), "{:?} vs {:?}", a, b);
                }
            }
        }
    }

    #[test]
    fn duration_text() {
        let fmt = HoursMinutesFormatter;
        assert_eq!(fmt.format(Duration::minutes(425)), "7h 05m");
        assert_eq!(fmt.format(Duration::minutes(45)), "45m");
        assert_eq!(fmt.format(Duration::seconds(59)), "0m");
        assert_eq!(fmt.format(Duration::minutes(-5)), "0m");
    }

    #[test]
    fn clock_labels_use_twelve_hour_time() {
        let fmt = ClockLabelFormatter::default();
        assert_eq!(fmt.format(&at("23:05")), "11:05 PM");
        assert_eq!(fmt.format(&at("06:30")), "6:30 AM");

        let custom = ClockLabelFormatter {
            pattern: "%H:%M".to_string(),
        };
        assert_eq!(custom.format(&at("06:30")), "06:30");
    }

    #[test]
    fn names_are_distinct() {
        let names: std::collections::HashSet<_> =
            SleepStage::ALL.iter().map(|s| DefaultNames.display_name(*s)).collect();
        assert_eq!(names.len(), SleepStage::ALL.len());
    }
}
