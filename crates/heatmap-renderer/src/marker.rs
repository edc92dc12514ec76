//! Markers drawn over each data point after compositing.

use heatmap_common::{Argb, DataPoint};
use tiny_skia::{FillRule, Paint, PathBuilder, Pixmap, Transform};

/// Draws a marker at a point's destination-surface position.
///
/// Called once per committed point, in list order, after the heat map has
/// been composited. Closures with the same signature implement it.
pub trait MarkerCallback: Send + Sync {
    fn draw_marker(&self, surface: &mut Pixmap, x: f32, y: f32, point: &DataPoint);
}

impl<F> MarkerCallback for F
where
    F: Fn(&mut Pixmap, f32, f32, &DataPoint) + Send + Sync,
{
    fn draw_marker(&self, surface: &mut Pixmap, x: f32, y: f32, point: &DataPoint) {
        self(surface, x, y, point)
    }
}

/// Filled circle of a single color.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CircleMarker {
    pub color: Argb,
    pub radius: f32,
}

impl CircleMarker {
    pub const DEFAULT_RADIUS: f32 = 10.0;

    pub fn new(color: Argb) -> Self {
        Self {
            color,
            radius: Self::DEFAULT_RADIUS,
        }
    }

    pub fn with_radius(mut self, radius: f32) -> Self {
        self.radius = radius;
        self
    }
}

impl MarkerCallback for CircleMarker {
    fn draw_marker(&self, surface: &mut Pixmap, x: f32, y: f32, _point: &DataPoint) {
        let Some(path) = PathBuilder::from_circle(x, y, self.radius) else {
            return;
        };

        let mut paint = Paint::default();
        paint.anti_alias = true;
        let (r, g, b, a) = self.color.to_rgba();
        paint.set_color_rgba8(r, g, b, a);

        surface.fill_path(&path, &paint, FillRule::Winding, Transform::identity(), None);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_circle_marker_fills_center_only() {
        let mut surface = Pixmap::new(64, 64).unwrap();
        let marker = CircleMarker::new(Argb::BLUE);
        marker.draw_marker(&mut surface, 32.0, 32.0, &DataPoint::new(0.5, 0.5, 1.0));

        let center = surface.pixel(32, 32).unwrap();
        assert_eq!((center.red(), center.green(), center.blue(), center.alpha()), (0, 0, 255, 255));

        // Outside the 10px radius
        assert_eq!(surface.pixel(32, 50).unwrap().alpha(), 0);
        assert_eq!(surface.pixel(0, 0).unwrap().alpha(), 0);
    }

    #[test]
    fn test_closure_marker() {
        let mut surface = Pixmap::new(8, 8).unwrap();
        let marker = |s: &mut Pixmap, x: f32, y: f32, _p: &DataPoint| {
            s.fill_rect(
                tiny_skia::Rect::from_xywh(x, y, 1.0, 1.0).unwrap(),
                &Paint::default(),
                Transform::identity(),
                None,
            );
        };
        marker.draw_marker(&mut surface, 2.0, 3.0, &DataPoint::new(0.0, 0.0, 0.0));
        assert_eq!(surface.pixel(2, 3).unwrap().alpha(), 255);
    }
}
