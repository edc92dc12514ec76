//! Mapping between the destination surface and the offscreen drawing surface.
//!
//! The shadow layer can be rendered smaller than the destination to save
//! work on large views; it is scaled back up when composited.

use heatmap_common::{MaxDrawingSize, Padding};

/// Destination size plus the optional cap on the drawing surface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrawingLayout {
    pub width: u32,
    pub height: u32,
    pub max: MaxDrawingSize,
}

impl DrawingLayout {
    pub fn new(width: u32, height: u32, max: MaxDrawingSize) -> Self {
        Self { width, height, max }
    }

    /// Downscale factor between the destination and the drawing surface.
    ///
    /// 1.0 unless both maximum dimensions are set. Otherwise the factor
    /// brings the axis that is relatively smaller down to its maximum, so
    /// the aspect ratio is kept.
    pub fn scale(&self) -> f32 {
        let (Some(max_w), Some(max_h)) = (self.max.width, self.max.height) else {
            return 1.0;
        };
        if self.width == 0 || self.height == 0 || max_w == 0 || max_h == 0 {
            return 1.0;
        }

        let source_ratio = self.width as f32 / self.height as f32;
        let target_ratio = max_w as f32 / max_h as f32;
        if source_ratio < target_ratio {
            self.width as f32 / max_w as f32
        } else {
            self.height as f32 / max_h as f32
        }
    }

    pub fn drawing_width(&self) -> u32 {
        match self.max.width {
            None => self.width,
            Some(_) => ((self.width as f32 / self.scale()) as u32).min(self.width),
        }
    }

    pub fn drawing_height(&self) -> u32 {
        match self.max.height {
            None => self.height,
            Some(_) => ((self.height as f32 / self.scale()) as u32).min(self.height),
        }
    }

    pub fn drawing_size(&self) -> (u32, u32) {
        (self.drawing_width(), self.drawing_height())
    }

    /// Padding expressed in drawing-surface pixels.
    pub fn drawing_padding(&self, padding: &Padding) -> Padding {
        padding.scaled(self.scale())
    }
}

/// Place a normalized point inside the padded area of a `width` x `height`
/// surface.
#[inline]
pub fn to_pixel(x: f32, y: f32, width: f32, height: f32, padding: &Padding) -> (f32, f32) {
    let inner_w = width - padding.left - padding.right;
    let inner_h = height - padding.top - padding.bottom;
    (x * inner_w + padding.left, y * inner_h + padding.top)
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_utils::{assert_approx_eq, assert_coords_approx_eq};

    #[test]
    fn test_unbounded_layout_is_identity() {
        let layout = DrawingLayout::new(640, 480, MaxDrawingSize::default());
        assert_eq!(layout.scale(), 1.0);
        assert_eq!(layout.drawing_size(), (640, 480));
    }

    #[test]
    fn test_single_axis_cap_keeps_scale_one() {
        let layout = DrawingLayout::new(640, 480, MaxDrawingSize::new(Some(100), None));
        assert_eq!(layout.scale(), 1.0);
        assert_eq!(layout.drawing_size(), (640, 480));
    }

    #[test]
    fn test_downscale_wide_surface() {
        // 1000x500 is wider than the 1:1 target, so height drives the scale
        let layout = DrawingLayout::new(1000, 500, MaxDrawingSize::new(Some(100), Some(100)));
        assert_eq!(layout.scale(), 5.0);
        assert_eq!(layout.drawing_size(), (200, 100));
    }

    #[test]
    fn test_downscale_tall_surface() {
        let layout = DrawingLayout::new(400, 800, MaxDrawingSize::new(Some(100), Some(100)));
        assert_eq!(layout.scale(), 4.0);
        assert_eq!(layout.drawing_size(), (100, 200));
    }

    #[test]
    fn test_never_upscales_past_surface() {
        let layout = DrawingLayout::new(50, 50, MaxDrawingSize::new(Some(100), Some(100)));
        assert_eq!(layout.scale(), 0.5);
        assert_eq!(layout.drawing_size(), (50, 50));
    }

    #[test]
    fn test_fractional_scale() {
        // 300x150 against 100x60: height drives the scale
        let layout = DrawingLayout::new(300, 150, MaxDrawingSize::new(Some(100), Some(60)));
        assert_approx_eq!(layout.scale(), 2.5, 1e-6);
        assert_eq!(layout.drawing_size(), (120, 60));
    }

    #[test]
    fn test_padding_follows_scale() {
        let layout = DrawingLayout::new(400, 400, MaxDrawingSize::new(Some(100), Some(100)));
        let padding = layout.drawing_padding(&Padding::uniform(40.0));
        assert_eq!(padding, Padding::uniform(10.0));
    }

    #[test]
    fn test_to_pixel_with_padding() {
        let padding = Padding {
            top: 10.0,
            left: 20.0,
            right: 0.0,
            bottom: 30.0,
        };
        let (x, y) = to_pixel(0.5, 1.0, 120.0, 140.0, &padding);
        assert_coords_approx_eq!((x, y), (70.0, 110.0), 1e-6);
        let (x, y) = to_pixel(0.1, 0.3, 120.0, 140.0, &padding);
        assert_coords_approx_eq!((x, y), (30.0, 40.0), 1e-4);
    }
}
