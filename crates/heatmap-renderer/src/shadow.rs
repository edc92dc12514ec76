//! Shadow layer rasterization.
//!
//! Every point is drawn in black with its intensity carried only by alpha.
//! Overlapping points blend source-over, so dense regions accumulate alpha;
//! the compositor later turns that alpha into color.

use heatmap_common::{DataPoint, HeatMapError, HeatMapResult, Padding};
use tiny_skia::{
    Color, FillRule, Paint, PathBuilder, Pixmap, Point, PremultipliedColorU8, RadialGradient,
    SpreadMode, Transform,
};

use crate::layout::to_pixel;

/// Region of the shadow layer touched by the last pass, in drawing pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderBounds {
    pub min_x: f32,
    pub min_y: f32,
    pub max_x: f32,
    pub max_y: f32,
}

impl RenderBounds {
    /// Inverted sentinel; any included point replaces it.
    pub const EMPTY: RenderBounds = RenderBounds {
        min_x: f32::INFINITY,
        min_y: f32::INFINITY,
        max_x: f32::NEG_INFINITY,
        max_y: f32::NEG_INFINITY,
    };

    pub fn is_empty(&self) -> bool {
        self.min_x > self.max_x || self.min_y > self.max_y
    }

    /// Grow to cover the square of half-size `radius` around (x, y).
    pub fn include(&mut self, x: f32, y: f32, radius: f32) {
        self.min_x = self.min_x.min(x - radius);
        self.min_y = self.min_y.min(y - radius);
        self.max_x = self.max_x.max(x + radius);
        self.max_y = self.max_y.max(y + radius);
    }

    /// Whole-pixel rectangle covering the bounds, clipped to a surface.
    /// `None` when nothing of the bounds lies on the surface.
    pub fn pixel_rect(&self, width: u32, height: u32) -> Option<PixelRect> {
        if self.is_empty() {
            return None;
        }

        let x0 = self.min_x.floor().max(0.0);
        let y0 = self.min_y.floor().max(0.0);
        let x1 = self.max_x.ceil().min(width as f32);
        let y1 = self.max_y.ceil().min(height as f32);
        if x0 >= x1 || y0 >= y1 {
            return None;
        }

        Some(PixelRect {
            x0: x0 as u32,
            y0: y0 as u32,
            x1: x1 as u32,
            y1: y1 as u32,
        })
    }
}

impl Default for RenderBounds {
    fn default() -> Self {
        Self::EMPTY
    }
}

/// Half-open pixel rectangle `[x0, x1) x [y0, y1)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelRect {
    pub x0: u32,
    pub y0: u32,
    pub x1: u32,
    pub y1: u32,
}

impl PixelRect {
    pub fn width(&self) -> u32 {
        self.x1 - self.x0
    }

    pub fn height(&self) -> u32 {
        self.y1 - self.y0
    }

    pub fn area(&self) -> usize {
        self.width() as usize * self.height() as usize
    }
}

/// Per-pass drawing parameters, all in drawing-surface units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShadowParams {
    /// Disc radius in pixels
    pub radius: f64,
    /// Blur factor in [0, 1]
    pub blur: f64,
    /// Value mapped to alpha 0
    pub minimum: f64,
    /// Value mapped to alpha 1
    pub maximum: f64,
    /// Padding already divided by the layout scale
    pub padding: Padding,
}

/// Offscreen alpha buffer the points are drawn into.
#[derive(Clone)]
pub struct ShadowLayer {
    pixmap: Pixmap,
}

impl ShadowLayer {
    /// Allocate a transparent layer.
    pub fn new(width: u32, height: u32) -> HeatMapResult<Self> {
        let pixmap = Pixmap::new(width, height).ok_or(HeatMapError::Resource { width, height })?;
        Ok(Self { pixmap })
    }

    pub fn width(&self) -> u32 {
        self.pixmap.width()
    }

    pub fn height(&self) -> u32 {
        self.pixmap.height()
    }

    pub fn pixmap(&self) -> &Pixmap {
        &self.pixmap
    }

    pub fn pixels(&self) -> &[PremultipliedColorU8] {
        self.pixmap.pixels()
    }

    /// Alpha at a pixel, 0 outside the layer.
    pub fn alpha_at(&self, x: u32, y: u32) -> u8 {
        if x >= self.width() || y >= self.height() {
            return 0;
        }
        self.pixmap
            .pixel(x, y)
            .map(|p| p.alpha())
            .unwrap_or(0)
    }

    pub fn clear(&mut self) {
        self.pixmap.fill(Color::TRANSPARENT);
    }
}

impl std::fmt::Debug for ShadowLayer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShadowLayer")
            .field("width", &self.width())
            .field("height", &self.height())
            .finish()
    }
}

/// True when `[minimum, maximum]` cannot be used to normalize values.
pub fn is_degenerate_range(minimum: f64, maximum: f64) -> bool {
    let span = maximum - minimum;
    !span.is_finite() || span <= 0.0
}

/// Normalized intensity of a value in [0, 1].
///
/// A degenerate range (empty, inverted or infinite) maps every value to 0.
pub fn point_alpha(value: f64, minimum: f64, maximum: f64) -> f64 {
    if is_degenerate_range(minimum, maximum) {
        return 0.0;
    }
    let alpha = (value.clamp(minimum, maximum) - minimum) / (maximum - minimum);
    if alpha.is_nan() {
        0.0
    } else {
        alpha.clamp(0.0, 1.0)
    }
}

/// Clear the layer and draw every point, returning the touched bounds.
pub fn draw_shadow(layer: &mut ShadowLayer, points: &[DataPoint], params: &ShadowParams) -> RenderBounds {
    layer.clear();

    if !points.is_empty() && is_degenerate_range(params.minimum, params.maximum) {
        tracing::warn!(
            minimum = params.minimum,
            maximum = params.maximum,
            "Degenerate value range, all points drawn with zero intensity"
        );
    }

    let width = layer.width() as f32;
    let height = layer.height() as f32;
    let falloff = 1.0 - params.blur;
    let radius = params.radius as f32;

    let mut bounds = RenderBounds::EMPTY;
    for point in points {
        let (x, y) = to_pixel(point.x, point.y, width, height, &params.padding);
        let alpha = point_alpha(point.value, params.minimum, params.maximum);

        draw_point(&mut layer.pixmap, x, y, params.radius, falloff, alpha);
        bounds.include(x, y, radius);
    }

    tracing::debug!(
        points = points.len(),
        width = layer.width(),
        height = layer.height(),
        min_x = bounds.min_x,
        min_y = bounds.min_y,
        max_x = bounds.max_x,
        max_y = bounds.max_y,
        "Shadow layer drawn"
    );

    bounds
}

/// Draw one point in black, intensity carried by alpha.
///
/// With no falloff (`falloff == 1`) the point is a solid disc of `radius`
/// carrying the point's own alpha, not an opaque one, so a zero-intensity
/// point stays invisible with or without blur. Otherwise a radial gradient
/// runs from `alpha` at the center to transparent at `radius * falloff`,
/// filled over a disc of twice the radius so the gradient's padded tail is
/// never cut off.
fn draw_point(pixmap: &mut Pixmap, x: f32, y: f32, radius: f64, falloff: f64, alpha: f64) {
    let alpha8 = (alpha * 255.0) as u8;

    let mut paint = Paint::default();
    paint.anti_alias = true;

    let disc_radius = if falloff == 1.0 {
        paint.set_color_rgba8(0, 0, 0, alpha8);
        radius
    } else {
        let gradient = RadialGradient::new(
            Point::from_xy(x, y),
            Point::from_xy(x, y),
            (radius * falloff) as f32,
            vec![
                tiny_skia::GradientStop::new(0.0, Color::from_rgba8(0, 0, 0, alpha8)),
                tiny_skia::GradientStop::new(1.0, Color::TRANSPARENT),
            ],
            SpreadMode::Pad,
            Transform::identity(),
        );
        // A zero-length falloff (blur of 1) has no visible extent
        let Some(shader) = gradient else {
            return;
        };
        paint.shader = shader;
        2.0 * radius
    };

    if let Some(path) = PathBuilder::from_circle(x, y, disc_radius as f32) {
        pixmap.fill_path(&path, &paint, FillRule::Winding, Transform::identity(), None);
    }
}
