//! # Configuration Management
//!
//! This module handles loading and parsing configuration from the sleep-chart.toml file.
//! It provides a centralized way to pick the chart style, size the canvas and tune
//! the layout engines without recompiling.
//!
//! ```toml
//! [chart]
//! style = "circular"        # "timeline" | "circular"
//! circular_mode = "goal"    # "goal" | "clock"
//! goal_hours = 8.0
//! marker_count = 3
//!
//! [display]
//! width = 400
//! height = 300
//! palette = "system"        # "default" | "system" | "high_contrast" | "pastel"
//! ```

use crate::assemble::{ChartConfig, ChartKind};
use crate::circular::{CircularMode, CircularOptions, DEFAULT_THRESHOLD_HOURS};
use crate::geometry::Size;
use crate::markers::DEFAULT_MARKER_COUNT;
use crate::providers::{ColorResolver, DefaultColors, HighContrastColors, PastelColors, SystemColors};
use crate::timeline::TimelineOptions;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;
use tracing::{info, warn};

/// Default config file name, looked up in the working directory.
pub const CONFIG_FILE: &str = "sleep-chart.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("config IO: {0}")]
    Io(#[from] std::io::Error),

    #[error("config serialization: {0}")]
    Serialize(#[from] toml::ser::Error),
}

/// Application configuration loaded from sleep-chart.toml
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    /// Chart style and layout tuning
    pub chart: ChartSection,
    /// Canvas and color configuration
    pub display: DisplaySection,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CircularStyle {
    /// Percentage of a sleep goal
    Goal,
    /// Absolute 24-hour dial
    Clock,
}

/// Chart style and engine parameters
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ChartSection {
    /// Timeline or circular chart
    pub style: ChartKind,
    /// Angle mapping for circular charts
    pub circular_mode: CircularStyle,
    /// Sleep goal in hours; a night this long fills the ring in goal mode
    pub goal_hours: f64,
    /// Interior time-axis markers
    pub marker_count: usize,
    /// Timeline lanes (at least 5)
    pub row_count: usize,
    /// Thinnest timeline bar, so brief awakenings stay visible
    pub min_bar_width: f64,
    /// Ring thickness for circular charts
    pub stroke_width: f64,
}

/// Canvas and color configuration
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct DisplaySection {
    /// Canvas width in pixels
    pub width: u32,
    /// Canvas height in pixels
    pub height: u32,
    /// Stage color palette
    pub palette: Palette,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Palette {
    Default,
    System,
    HighContrast,
    Pastel,
}

impl Palette {
    pub fn resolver(self) -> Box<dyn ColorResolver> {
        match self {
            Palette::Default => Box::new(DefaultColors),
            Palette::System => Box::new(SystemColors),
            Palette::HighContrast => Box::new(HighContrastColors),
            Palette::Pastel => Box::new(PastelColors),
        }
    }
}

impl Default for ChartSection {
    fn default() -> Self {
        let timeline = TimelineOptions::default();
        ChartSection {
            style: ChartKind::Timeline,
            circular_mode: CircularStyle::Goal,
            goal_hours: DEFAULT_THRESHOLD_HOURS,
            marker_count: DEFAULT_MARKER_COUNT,
            row_count: timeline.row_count,
            min_bar_width: timeline.min_bar_width,
            stroke_width: CircularOptions::default().stroke_width,
        }
    }
}

impl Default for DisplaySection {
    fn default() -> Self {
        DisplaySection {
            width: 400,
            height: 300,
            palette: Palette::Default,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            chart: ChartSection::default(),
            display: DisplaySection::default(),
        }
    }
}

impl Config {
    /// Load configuration from sleep-chart.toml
    /// Falls back to default configuration if file doesn't exist or is invalid
    pub fn load() -> Self {
        Self::load_from_path(CONFIG_FILE)
    }

    /// Load configuration from specified path
    /// Falls back to default configuration if file doesn't exist or is invalid
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();
        match fs::read_to_string(path) {
            Ok(contents) => match toml::from_str::<Config>(&contents) {
                Ok(config) => {
                    info!(path = %path.display(), style = ?config.chart.style, "loaded configuration");
                    config
                }
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "invalid config file, using defaults");
                    Self::default()
                }
            },
            Err(_) => {
                info!(path = %path.display(), "no config file found, using defaults");
                Self::default()
            }
        }
    }

    /// Save current configuration to `path`
    pub fn save_to_path<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let contents = toml::to_string_pretty(self)?;
        fs::write(path.as_ref(), contents)?;
        info!(path = %path.as_ref().display(), "configuration saved");
        Ok(())
    }

    /// Engine configuration for the assembler.
    pub fn chart_config(&self) -> ChartConfig {
        let chart = &self.chart;
        let mode = match chart.circular_mode {
            CircularStyle::Goal => CircularMode::Threshold {
                threshold_hours: chart.goal_hours,
            },
            CircularStyle::Clock => CircularMode::Clock24h,
        };

        ChartConfig {
            kind: chart.style,
            canvas: Size::new(f64::from(self.display.width), f64::from(self.display.height)),
            timeline: TimelineOptions {
                row_count: chart.row_count,
                min_bar_width: chart.min_bar_width,
                bar_height: None,
            },
            circular: CircularOptions {
                mode,
                stroke_width: chart.stroke_width,
                ..CircularOptions::default()
            },
            marker_count: chart.marker_count,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.chart.style, ChartKind::Timeline);
        assert_eq!(config.chart.goal_hours, 9.0);
        assert_eq!(config.chart.marker_count, 3);
        assert_eq!(config.chart.row_count, 5);
        assert_eq!(config.display.width, 400);
        assert_eq!(config.display.height, 300);
    }

    #[test]
    fn test_config_roundtrip() {
        let config = Config::default();
        let toml_str = toml::to_string(&config).unwrap();
        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(config, parsed);
    }

    #[test]
    fn test_load_nonexistent_file() {
        let config = Config::load_from_path("/nonexistent/path");
        // Should fallback to default
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let file = NamedTempFile::new().unwrap();
        fs::write(
            file.path(),
            "[chart]\nstyle = \"circular\"\ncircular_mode = \"clock\"\n\n[display]\npalette = \"pastel\"\n",
        )
        .unwrap();

        let config = Config::load_from_path(file.path());
        assert_eq!(config.chart.style, ChartKind::Circular);
        assert_eq!(config.chart.circular_mode, CircularStyle::Clock);
        assert_eq!(config.chart.marker_count, 3);
        assert_eq!(config.display.palette, Palette::Pastel);
        assert_eq!(config.display.width, 400);

        let chart = config.chart_config();
        assert_eq!(chart.circular.mode, CircularMode::Clock24h);
        assert_eq!(chart.canvas, Size::new(400.0, 300.0));
    }

    #[test]
    fn test_single_section_file_is_kept() {
        let file = NamedTempFile::new().unwrap();
        fs::write(file.path(), "[chart]\nstyle = \"circular\"\ngoal_hours = 7.0\n").unwrap();

        let config = Config::load_from_path(file.path());
        assert_eq!(config.chart.style, ChartKind::Circular);
        assert_eq!(config.chart.goal_hours, 7.0);
        assert_eq!(config.display, DisplaySection::default());
    }

    #[test]
    fn test_invalid_file_falls_back() {
        let file = NamedTempFile::new().unwrap();
        fs::write(file.path(), "[chart\nstyle = ").unwrap();
        assert_eq!(Config::load_from_path(file.path()), Config::default());
    }

    #[test]
    fn test_save_and_reload() {
        let file = NamedTempFile::new().unwrap();
        let mut config = Config::default();
        config.chart.goal_hours = 7.5;
        config.display.palette = Palette::HighContrast;
        config.save_to_path(file.path()).unwrap();

        let loaded = Config::load_from_path(file.path());
        assert_eq!(loaded, config);
        assert_eq!(
            loaded.chart_config().circular.mode,
            CircularMode::Threshold {
                threshold_hours: 7.5
            }
        );
    }
}
