//! Deterministic data point generators.
//!
//! Everything here is reproducible from its arguments so tests can assert
//! on exact counts, positions and values.

use heatmap_common::DataPoint;

/// Creates a `columns` x `rows` lattice of points covering [0, 1] on both
/// axes, in row-major order.
///
/// Each value is `col * 1000 + row`, so a point's value tells where it sits.
///
/// # Example
///
/// ```
/// use test_utils::create_point_grid;
///
/// let points = create_point_grid(3, 2);
/// assert_eq!(points.len(), 6);
/// assert_eq!((points[0].x, points[0].y), (0.0, 0.0));
/// assert_eq!((points[5].x, points[5].y), (1.0, 1.0));
/// assert_eq!(points[4].value, 1001.0);
/// ```
pub fn create_point_grid(columns: usize, rows: usize) -> Vec<DataPoint> {
    let mut points = Vec::with_capacity(columns * rows);
    for row in 0..rows {
        for col in 0..columns {
            points.push(DataPoint::new(
                fraction(col, columns),
                fraction(row, rows),
                (col * 1000 + row) as f64,
            ));
        }
    }
    points
}

/// Creates `count` scattered points with values in `[min_value, max_value]`.
///
/// Uses a simple hash so the same seed always gives the same points.
pub fn create_scattered_points(count: usize, seed: u32, min_value: f64, max_value: f64) -> Vec<DataPoint> {
    (0..count)
        .map(|i| {
            let i = i as u32;
            let x = unit(simple_hash(i, 0, seed));
            let y = unit(simple_hash(i, 1, seed));
            let t = unit(simple_hash(i, 2, seed)) as f64;
            DataPoint::new(x, y, min_value + t * (max_value - min_value))
        })
        .collect()
}

/// Creates `count` points on the diagonal from (0, 0) to (1, 1) with values
/// rising linearly from `min_value` to `max_value`.
pub fn create_diagonal_ramp(count: usize, min_value: f64, max_value: f64) -> Vec<DataPoint> {
    (0..count)
        .map(|i| {
            let t = fraction(i, count);
            DataPoint::new(t, t, min_value + t as f64 * (max_value - min_value))
        })
        .collect()
}

/// Creates points all carrying the same value.
pub fn create_constant_points(count: usize, value: f64) -> Vec<DataPoint> {
    create_scattered_points(count, 7, value, value)
}

/// Position of `index` among `count` evenly spaced samples on [0, 1].
fn fraction(index: usize, count: usize) -> f32 {
    if count <= 1 {
        0.0
    } else {
        index as f32 / (count - 1) as f32
    }
}

fn unit(hash: u32) -> f32 {
    (hash % 10_000) as f32 / 9_999.0
}

/// Simple deterministic hash for reproducible test data.
fn simple_hash(x: u32, y: u32, seed: u32) -> u32 {
    let mut h = seed;
    h = h.wrapping_mul(31).wrapping_add(x);
    h = h.wrapping_mul(31).wrapping_add(y);
    h ^= h >> 16;
    h = h.wrapping_mul(0x85eb_ca6b);
    h ^= h >> 13;
    h = h.wrapping_mul(0xc2b2_ae35);
    h ^= h >> 16;
    h
}
