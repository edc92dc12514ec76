//! Nearest-point lookup in normalized space.

use heatmap_common::DataPoint;

/// Closest point to (x, y) by Euclidean distance.
///
/// Ties go to the earliest point in the slice. `None` when empty.
pub fn nearest(points: &[DataPoint], x: f32, y: f32) -> Option<&DataPoint> {
    let mut best: Option<(&DataPoint, f64)> = None;
    for point in points {
        let distance = point.distance_to(x, y);
        if distance.is_nan() {
            continue;
        }
        match best {
            Some((_, best_distance)) if distance >= best_distance => {}
            _ => best = Some((point, distance)),
        }
    }
    best.map(|(point, _)| point)
}
