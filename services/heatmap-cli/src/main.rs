//! Heat map command-line renderer.
//!
//! Loads a style and a point file, renders the overlay to a PNG and can
//! answer a click query against the rendered map.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread;

use anyhow::{bail, Context, Result};
use clap::Parser;
use serde::Serialize;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use heatmap_common::{Argb, DataPoint, HeatMapStyle};
use heatmap_renderer::{png, CircleMarker, HeatMap};

#[derive(Parser, Debug)]
#[command(name = "heatmap-cli")]
#[command(about = "Render weighted points as a heat map PNG")]
struct Args {
    /// Style file (JSON, or YAML by .yaml/.yml extension)
    #[arg(short, long, env = "HEATMAP_STYLE")]
    style: Option<PathBuf>,

    /// JSON array of points: [{"x": 0.5, "y": 0.5, "value": 3.0}, ...]
    #[arg(short, long, env = "HEATMAP_POINTS")]
    points: PathBuf,

    /// Output PNG path
    #[arg(short, long, env = "HEATMAP_OUTPUT", default_value = "heatmap.png")]
    output: PathBuf,

    /// Destination width in pixels
    #[arg(long, default_value = "800")]
    width: u32,

    /// Destination height in pixels
    #[arg(long, default_value = "600")]
    height: u32,

    /// Draw a circle marker over every point in this color
    #[arg(long)]
    marker_color: Option<String>,

    /// Report the nearest point to a destination pixel, as "x,y"
    #[arg(long, value_parser = parse_click)]
    click: Option<(f32, f32)>,

    /// Number of threads the points are loaded from
    #[arg(long, default_value = "1")]
    producers: usize,

    /// Log level
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[derive(Debug, Serialize)]
struct ClickReport {
    x: i32,
    y: i32,
    nearest: Option<DataPoint>,
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let args = Args::parse();

    // Initialize tracing
    let level = match args.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .json()
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    let style = match &args.style {
        Some(path) => HeatMapStyle::from_file(path)
            .with_context(|| format!("Failed to load style from {}", path.display()))?,
        None => HeatMapStyle::default(),
    };
    let points = load_points(&args.points)?;
    info!(
        points = points.len(),
        width = args.width,
        height = args.height,
        producers = args.producers,
        "Starting heat map render"
    );

    let map = Arc::new(HeatMap::with_style(style).context("Invalid style")?);
    if let Some(color) = &args.marker_color {
        let color = Argb::parse(color).with_context(|| format!("Invalid marker color '{}'", color))?;
        map.set_marker_callback(CircleMarker::new(color));
    }

    feed_points(&map, points, args.producers)?;

    map.resize(args.width, args.height);
    map.force_refresh_off_context().context("Heat map refresh failed")?;

    let mut surface = tiny_skia::Pixmap::new(args.width, args.height)
        .with_context(|| format!("Cannot allocate a {}x{} surface", args.width, args.height))?;
    map.draw(&mut surface).context("Heat map draw failed")?;

    let png = png::encode_surface(&surface).context("PNG encoding failed")?;
    std::fs::write(&args.output, &png)
        .with_context(|| format!("Failed to write {}", args.output.display()))?;
    info!(path = %args.output.display(), bytes = png.len(), "Wrote heat map");

    if let Some((x, y)) = args.click {
        let report = Arc::new(std::sync::Mutex::new(None));
        let sink = Arc::clone(&report);
        map.set_click_listener(move |px: i32, py: i32, nearest: Option<&DataPoint>| {
            if let Ok(mut slot) = sink.lock() {
                *slot = Some(ClickReport {
                    x: px,
                    y: py,
                    nearest: nearest.cloned(),
                });
            }
        });
        map.click(x, y);

        let report = report
            .lock()
            .map_err(|_| anyhow::anyhow!("Click listener panicked"))?
            .take();
        if let Some(report) = report {
            info!(x = report.x, y = report.y, found = report.nearest.is_some(), "Click query");
            println!("{}", serde_json::to_string(&report)?);
        }
    }

    Ok(())
}

fn load_points(path: &Path) -> Result<Vec<DataPoint>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read points from {}", path.display()))?;
    let points: Vec<DataPoint> = serde_json::from_str(&text)
        .with_context(|| format!("Failed to parse points in {}", path.display()))?;
    Ok(points)
}

/// Add points to the map from `producers` threads.
fn feed_points(map: &Arc<HeatMap>, points: Vec<DataPoint>, producers: usize) -> Result<()> {
    if producers <= 1 || points.len() < producers {
        map.add_data_points(points);
        return Ok(());
    }

    let chunk = points.len().div_ceil(producers);
    thread::scope(|scope| {
        let handles: Vec<_> = points
            .chunks(chunk)
            .map(|batch| {
                let map = Arc::clone(map);
                scope.spawn(move || {
                    for point in batch {
                        map.add_data_point(point.clone());
                    }
                })
            })
            .collect();

        for handle in handles {
            if handle.join().is_err() {
                bail!("Point producer thread panicked");
            }
        }
        Ok(())
    })
}

fn parse_click(s: &str) -> std::result::Result<(f32, f32), String> {
    let (x, y) = s
        .split_once(',')
        .ok_or_else(|| format!("expected \"x,y\", got '{}'", s))?;
    let x = x.trim().parse::<f32>().map_err(|e| format!("bad x '{}': {}", x, e))?;
    let y = y.trim().parse::<f32>().map_err(|e| format!("bad y '{}': {}", y, e))?;
    Ok((x, y))
}
