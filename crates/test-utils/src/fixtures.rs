//! Common test fixtures: gradient stop sets, styles and style files.

use std::io::Write;

use heatmap_common::{Argb, GradientStop, HeatMapStyle, Padding};
use tempfile::NamedTempFile;

/// Gradient stop sets used across the test suite.
pub mod stops {
    use super::*;

    /// Library default: red at 0, green at 1.
    pub fn red_green() -> Vec<GradientStop> {
        vec![
            GradientStop::new(0.0, Argb::RED),
            GradientStop::new(1.0, Argb::GREEN),
        ]
    }

    /// Blue at 0, red at 1. Dense areas come out red.
    pub fn blue_red() -> Vec<GradientStop> {
        vec![
            GradientStop::new(0.0, Argb::BLUE),
            GradientStop::new(1.0, Argb::RED),
        ]
    }

    /// Five-stop ramp given out of order.
    pub fn unordered_rainbow() -> Vec<GradientStop> {
        vec![
            GradientStop::new(1.0, Argb::RED),
            GradientStop::new(0.0, Argb::BLUE),
            GradientStop::new(0.5, Argb::GREEN),
            GradientStop::new(0.75, Argb::rgb(255, 255, 0)),
            GradientStop::new(0.25, Argb::rgb(0, 255, 255)),
        ]
    }

    /// Stops that do not reach either end of the ramp.
    pub fn inset() -> Vec<GradientStop> {
        vec![
            GradientStop::new(0.25, Argb::WHITE),
            GradientStop::new(0.75, Argb::BLACK),
        ]
    }
}

/// Solid discs, value range [0, 100], blue to red, no padding.
pub fn solid_disc_style(radius: f64) -> HeatMapStyle {
    HeatMapStyle {
        stops: stops::blue_red(),
        blur: 0.0,
        minimum: 0.0,
        maximum: 100.0,
        opacity: 0,
        min_opacity: 0,
        max_opacity: 255,
        radius,
        padding: Padding::default(),
        ..HeatMapStyle::default()
    }
}

/// Blurred points with a fixed output opacity.
pub fn blurred_style(radius: f64, opacity: i32) -> HeatMapStyle {
    HeatMapStyle {
        stops: stops::unordered_rainbow(),
        blur: 0.5,
        minimum: 0.0,
        maximum: 10.0,
        opacity,
        radius,
        ..HeatMapStyle::default()
    }
}

pub const SAMPLE_STYLE_JSON: &str = r##"{
    "stops": [
        { "position": 0.0, "color": "#0000FF" },
        { "position": 0.5, "color": "#00FF00" },
        { "position": 1.0, "color": "red" }
    ],
    "blur": 0.25,
    "minimum": 0,
    "maximum": 50,
    "min_opacity": 16,
    "max_opacity": 224,
    "radius": 40,
    "padding": { "top": 8, "left": 8 },
    "max_drawing_size": { "width": 256, "height": 256 },
    "background": "#80000000"
}"##;

pub const SAMPLE_STYLE_YAML: &str = r##"
stops:
  - position: 0.0
    color: "#0000FF"
  - position: 0.5
    color: "#00FF00"
  - position: 1.0
    color: red
blur: 0.25
minimum: 0
maximum: 50
min_opacity: 16
max_opacity: 224
radius: 40
padding:
  top: 8
  left: 8
max_drawing_size:
  width: 256
  height: 256
background: "#80000000"
"##;

/// Write `contents` to a temporary file ending in `.{extension}`.
///
/// The file is removed when the returned handle is dropped.
pub fn write_style_file(contents: &str, extension: &str) -> NamedTempFile {
    let mut file = tempfile::Builder::new()
        .suffix(&format!(".{}", extension))
        .tempfile()
        .expect("create temp style file");
    file.write_all(contents.as_bytes()).expect("write temp style file");
    file.flush().expect("flush temp style file");
    file
}
