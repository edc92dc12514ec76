//! Style configuration for heat-map rendering.
//!
//! A style describes everything about how points become pixels: the color
//! ramp, the falloff of each point, the value range and the opacity rules.
//! Styles load from JSON or YAML and are checked with the same rules the
//! `HeatMap` setters apply.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::color::Argb;
use crate::error::{HeatMapError, HeatMapResult};

/// Root style configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeatMapStyle {
    /// Color stops defining the palette ramp
    #[serde(default = "default_stops")]
    pub stops: Vec<GradientStop>,

    /// Blur factor in [0, 1]; 0 draws solid discs
    #[serde(default = "default_blur")]
    pub blur: f64,

    /// Value mapped to the bottom of the palette
    #[serde(default = "default_minimum")]
    pub minimum: f64,

    /// Value mapped to the top of the palette
    #[serde(default = "default_maximum")]
    pub maximum: f64,

    /// Fixed opacity for the whole map when greater than 0
    #[serde(default)]
    pub opacity: i32,

    /// Lower opacity clamp, used when `opacity` is 0
    #[serde(default)]
    pub min_opacity: i32,

    /// Upper opacity clamp, used when `opacity` is 0
    #[serde(default = "default_max_opacity")]
    pub max_opacity: i32,

    /// Radius of each point's disc in drawing-surface pixels
    #[serde(default = "default_radius")]
    pub radius: f64,

    /// Space between the surface edge and the data area
    #[serde(default)]
    pub padding: Padding,

    /// Optional cap on the offscreen drawing surface size
    #[serde(default)]
    pub max_drawing_size: MaxDrawingSize,

    /// Background fill; `None` keeps the destination transparent
    #[serde(default)]
    pub background: Option<Argb>,
}

fn default_stops() -> Vec<GradientStop> {
    vec![
        GradientStop::new(0.0, Argb::RED),
        GradientStop::new(1.0, Argb::GREEN),
    ]
}

fn default_blur() -> f64 {
    0.85
}

fn default_minimum() -> f64 {
    0.0
}

fn default_maximum() -> f64 {
    1.0
}

fn default_max_opacity() -> i32 {
    255
}

fn default_radius() -> f64 {
    200.0
}

impl Default for HeatMapStyle {
    fn default() -> Self {
        Self {
            stops: default_stops(),
            blur: default_blur(),
            minimum: default_minimum(),
            maximum: default_maximum(),
            opacity: 0,
            min_opacity: 0,
            max_opacity: default_max_opacity(),
            radius: default_radius(),
            padding: Padding::default(),
            max_drawing_size: MaxDrawingSize::default(),
            background: None,
        }
    }
}

impl HeatMapStyle {
    /// Load a style from a file, picking the format from the extension
    /// (`.yaml`/`.yml` for YAML, anything else is read as JSON).
    pub fn from_file(path: impl AsRef<Path>) -> HeatMapResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| HeatMapError::Style(format!("{}: {}", path.display(), e)))?;

        let is_yaml = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml"))
            .unwrap_or(false);

        if is_yaml {
            Self::from_yaml(&content)
        } else {
            Self::from_json(&content)
        }
    }

    /// Parse and validate a JSON style.
    pub fn from_json(json: &str) -> HeatMapResult<Self> {
        let style: Self = serde_json::from_str(json)?;
        style.validate()?;
        Ok(style)
    }

    /// Parse and validate a YAML style.
    pub fn from_yaml(yaml: &str) -> HeatMapResult<Self> {
        let style: Self = serde_yaml::from_str(yaml)?;
        style.validate()?;
        Ok(style)
    }

    pub fn validate(&self) -> HeatMapResult<()> {
        validate_stops(&self.stops)?;
        validate_blur(self.blur)?;
        validate_opacity("opacity", self.opacity)?;
        validate_opacity("min_opacity", self.min_opacity)?;
        validate_opacity("max_opacity", self.max_opacity)?;
        validate_radius(self.radius)?;
        self.padding.validate()?;
        self.max_drawing_size.validate()?;
        Ok(())
    }
}

/// A color stop in the palette ramp.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GradientStop {
    /// Position along the ramp in [0, 1]
    pub position: f32,

    /// Color at this position
    pub color: Argb,
}

impl GradientStop {
    pub fn new(position: f32, color: Argb) -> Self {
        Self { position, color }
    }
}

/// Per-edge padding in destination-surface pixels.
///
/// Deserializes from either a single number (all edges) or an object with
/// any of `top`, `left`, `right`, `bottom`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "PaddingRepr")]
pub struct Padding {
    pub top: f32,
    pub left: f32,
    pub right: f32,
    pub bottom: f32,
}

impl Padding {
    pub fn uniform(all: f32) -> Self {
        Self {
            top: all,
            left: all,
            right: all,
            bottom: all,
        }
    }

    /// Padding divided by a downscale factor.
    pub fn scaled(&self, scale: f32) -> Self {
        Self {
            top: self.top / scale,
            left: self.left / scale,
            right: self.right / scale,
            bottom: self.bottom / scale,
        }
    }

    pub fn validate(&self) -> HeatMapResult<()> {
        validate_padding("padding.top", self.top)?;
        validate_padding("padding.left", self.left)?;
        validate_padding("padding.right", self.right)?;
        validate_padding("padding.bottom", self.bottom)?;
        Ok(())
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum PaddingRepr {
    All(f32),
    Edges {
        #[serde(default)]
        top: f32,
        #[serde(default)]
        left: f32,
        #[serde(default)]
        right: f32,
        #[serde(default)]
        bottom: f32,
    },
}

impl From<PaddingRepr> for Padding {
    fn from(repr: PaddingRepr) -> Self {
        match repr {
            PaddingRepr::All(all) => Padding::uniform(all),
            PaddingRepr::Edges {
                top,
                left,
                right,
                bottom,
            } => Padding {
                top,
                left,
                right,
                bottom,
            },
        }
    }
}

/// Upper bound on the offscreen drawing surface; unset axes follow the
/// destination surface.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaxDrawingSize {
    #[serde(default)]
    pub width: Option<u32>,
    #[serde(default)]
    pub height: Option<u32>,
}

impl MaxDrawingSize {
    pub fn new(width: Option<u32>, height: Option<u32>) -> Self {
        Self { width, height }
    }

    pub fn validate(&self) -> HeatMapResult<()> {
        if self.width == Some(0) {
            return Err(HeatMapError::config(
                "max_drawing_size.width",
                "must be greater than 0",
            ));
        }
        if self.height == Some(0) {
            return Err(HeatMapError::config(
                "max_drawing_size.height",
                "must be greater than 0",
            ));
        }
        Ok(())
    }
}

// ============================================================================
// Validation shared with the HeatMap setters
// ============================================================================

pub fn validate_stops(stops: &[GradientStop]) -> HeatMapResult<()> {
    if stops.len() < 2 {
        return Err(HeatMapError::config(
            "stops",
            format!("there must be at least 2 color stops, got {}", stops.len()),
        ));
    }
    if let Some(stop) = stops.iter().find(|s| !s.position.is_finite()) {
        return Err(HeatMapError::config(
            "stops",
            format!("stop position {} is not finite", stop.position),
        ));
    }
    Ok(())
}

pub fn validate_blur(blur: f64) -> HeatMapResult<()> {
    if !(0.0..=1.0).contains(&blur) {
        return Err(HeatMapError::config(
            "blur",
            format!("must be between 0 and 1, got {}", blur),
        ));
    }
    Ok(())
}

/// Check an opacity lies in 0..=255 and narrow it.
pub fn validate_opacity(param: &'static str, opacity: i32) -> HeatMapResult<u8> {
    u8::try_from(opacity).map_err(|_| {
        HeatMapError::config(param, format!("must be in the range [0,255], got {}", opacity))
    })
}

pub fn validate_radius(radius: f64) -> HeatMapResult<()> {
    if !radius.is_finite() || radius < 0.0 {
        return Err(HeatMapError::config(
            "radius",
            format!("must be a non-negative number of pixels, got {}", radius),
        ));
    }
    Ok(())
}

pub fn validate_padding(param: &'static str, padding: f32) -> HeatMapResult<()> {
    if !padding.is_finite() || padding < 0.0 {
        return Err(HeatMapError::config(
            param,
            format!("must be a non-negative number of pixels, got {}", padding),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let style = HeatMapStyle::default();
        assert!(style.validate().is_ok());
        assert_eq!(style.blur, 0.85);
        assert_eq!(style.radius, 200.0);
        assert_eq!(style.max_opacity, 255);
        assert!(style.background.is_none());
    }

    #[test]
    fn test_empty_json_uses_defaults() {
        let style = HeatMapStyle::from_json("{}").unwrap();
        assert_eq!(style, HeatMapStyle::default());
    }

    #[test]
    fn test_validate_opacity() {
        assert_eq!(validate_opacity("opacity", 0).unwrap(), 0);
        assert_eq!(validate_opacity("opacity", 255).unwrap(), 255);
        assert!(validate_opacity("opacity", 256).is_err());
        assert!(validate_opacity("opacity", -1).is_err());
    }

    #[test]
    fn test_validate_blur() {
        assert!(validate_blur(0.0).is_ok());
        assert!(validate_blur(1.0).is_ok());
        assert!(validate_blur(1.01).is_err());
        assert!(validate_blur(-0.1).is_err());
        assert!(validate_blur(f64::NAN).is_err());
    }

    #[test]
    fn test_padding_shorthand() {
        let p: Padding = serde_json::from_str("12").unwrap();
        assert_eq!(p, Padding::uniform(12.0));

        let p: Padding = serde_json::from_str(r#"{"left": 4}"#).unwrap();
        assert_eq!(p.left, 4.0);
        assert_eq!(p.top, 0.0);
    }

    #[test]
    fn test_padding_scaled() {
        let p = Padding::uniform(100.0).scaled(4.0);
        assert_eq!(p, Padding::uniform(25.0));
    }
}
