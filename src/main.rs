//! # Sleep Chart Command Line
//!
//! Lays out one night and prints it. Without `--input` a built-in demo night
//! ending around now is used, so the chart can be previewed without an export.
//!
//! ```text
//! sleep-chart [--input FILE] [--config FILE] [--timeline | --circular | --clock]
//!             [--json] [--ppm FILE] [--columns N]
//! ```
//!
//! Logging goes to stderr and is controlled by `RUST_LOG` (default `warn`).

use anyhow::{bail, Context};
use chrono::{Duration, DurationRound, Local};
use serde::Serialize;
use sleep_chart_lib::{
    assemble::{ChartAssembler, ChartKind, LayoutResult},
    circular::CircularMode,
    config::Config,
    paint::{self, Framebuffer},
    providers::Color,
    renderer::draw_ascii,
    source::{DemoSource, IntervalSource, JsonFileSource},
    SleepStage,
};
use std::collections::BTreeMap;
use std::io::{self, Write};
use std::path::PathBuf;
use std::{env, fs};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

const DEFAULT_COLUMNS: usize = 72;

/// Chart style forced from the command line.
#[derive(Clone, Copy, Debug, PartialEq)]
enum StyleOverride {
    Timeline,
    Circular,
    Clock,
}

#[derive(Debug, Default)]
struct Args {
    input: Option<PathBuf>,
    config: Option<PathBuf>,
    style: Option<StyleOverride>,
    json: bool,
    ppm: Option<PathBuf>,
    columns: Option<usize>,
}

fn parse_args<I: Iterator<Item = String>>(mut args: I) -> anyhow::Result<Args> {
    let mut parsed = Args::default();
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--input" => parsed.input = Some(args.next().context("--input needs a file")?.into()),
            "--config" => parsed.config = Some(args.next().context("--config needs a file")?.into()),
            "--ppm" => parsed.ppm = Some(args.next().context("--ppm needs a file")?.into()),
            "--columns" => {
                let value = args.next().context("--columns needs a number")?;
                parsed.columns = Some(value.parse().with_context(|| format!("bad column count {value:?}"))?);
            }
            "--timeline" => parsed.style = Some(StyleOverride::Timeline),
            "--circular" => parsed.style = Some(StyleOverride::Circular),
            "--clock" => parsed.style = Some(StyleOverride::Clock),
            "--json" => parsed.json = true,
            other => bail!("unknown argument {other:?}"),
        }
    }
    Ok(parsed)
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();
}

#[derive(Serialize)]
struct JsonOutput<'a> {
    layout: &'a LayoutResult,
    colors: BTreeMap<SleepStage, Color>,
}

fn main() -> anyhow::Result<()> {
    init_logging();
    let args = parse_args(env::args().skip(1))?;

    let config = match &args.config {
        Some(path) => Config::load_from_path(path),
        None => Config::load(),
    };
    let mut chart = config.chart_config();
    match args.style {
        Some(StyleOverride::Timeline) => chart.kind = ChartKind::Timeline,
        Some(StyleOverride::Circular) => chart.kind = ChartKind::Circular,
        Some(StyleOverride::Clock) => {
            chart.kind = ChartKind::Circular;
            chart.circular.mode = CircularMode::Clock24h;
        }
        None => {}
    }

    let intervals = match &args.input {
        Some(path) => JsonFileSource::new(path)
            .intervals()
            .with_context(|| format!("reading {}", path.display()))?,
        None => {
            let now = Local::now();
            let start = now.with_timezone(now.offset()) - Duration::hours(8);
            let start = start.duration_trunc(Duration::minutes(5)).unwrap_or(start);
            info!(%start, "no input given, using the demo night");
            DemoSource { start }.intervals()?
        }
    };

    let assembler = ChartAssembler::new().with_color_resolver(config.display.palette.resolver());
    let result = assembler.assemble(&intervals, &chart).context("laying out the night")?;
    if result.is_empty() {
        warn!("nothing to draw");
    }

    if let Some(path) = &args.ppm {
        let mut buffer = Framebuffer::new(config.display.width, config.display.height);
        // Framebuffer drawing cannot fail
        let _ = paint::paint(&result, assembler.colors(), &mut buffer);
        let file = fs::File::create(path).with_context(|| format!("creating {}", path.display()))?;
        let mut writer = io::BufWriter::new(file);
        buffer.write_ppm(&mut writer)?;
        writer.flush()?;
        info!(path = %path.display(), "image written");
    }

    if args.json {
        let output = JsonOutput {
            layout: &result,
            colors: assembler.colorize(&result),
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        print!("{}", draw_ascii(&result, args.columns.unwrap_or(DEFAULT_COLUMNS)));
    }

    Ok(())
}
