//! Shared test utilities for the heatmap-overlay workspace.
//!
//! This crate provides common testing infrastructure including:
//! - Deterministic data point generators
//! - Gradient and style fixtures
//! - Pixel inspection helpers for rendered surfaces
//!
//! # Usage
//!
//! Add to your crate's `Cargo.toml`:
//!
//! ```toml
//! [dev-dependencies]
//! test-utils = { path = "../test-utils" }
//! ```
//!
//! Then import in your tests:
//!
//! ```ignore
//! use test_utils::{fixtures, create_point_grid, pixel_argb};
//! ```

pub mod fixtures;
pub mod generators;
pub mod surface;

// Re-export commonly used items at the crate root
pub use fixtures::*;
pub use generators::*;
pub use surface::*;

pub use heatmap_common::Argb;

/// Assert two numbers are within `epsilon` of each other.
///
/// Both sides are widened to `f64`, so `f32` layout math and `f64` values
/// compare the same way.
///
/// ```ignore
/// assert_approx_eq!(layout.scale(), 2.5, 1e-6);
/// ```
#[macro_export]
macro_rules! assert_approx_eq {
    ($left:expr, $right:expr, $epsilon:expr) => {{
        let (left, right, epsilon) = ($left as f64, $right as f64, $epsilon as f64);
        let diff = (left - right).abs();
        if !(diff <= epsilon) {
            panic!(
                "values differ by {:?} (epsilon {:?})\n  left: {:?}\n right: {:?}",
                diff, epsilon, left, right
            );
        }
    }};
}

/// Assert two `(x, y)` pixel positions are within `epsilon` on both axes.
///
/// ```ignore
/// assert_coords_approx_eq!((x, y), (60.0, 70.0), 1e-4);
/// ```
#[macro_export]
macro_rules! assert_coords_approx_eq {
    (($x1:expr, $y1:expr), ($x2:expr, $y2:expr), $epsilon:expr) => {{
        $crate::assert_approx_eq!($x1, $x2, $epsilon);
        $crate::assert_approx_eq!($y1, $y2, $epsilon);
    }};
}

/// Assert a surface pixel has the given straight-alpha color.
///
/// # Usage
///
/// ```ignore
/// use test_utils::assert_pixel_eq;
///
/// assert_pixel_eq!(surface, (99, 99), Argb::RED);
/// ```
#[macro_export]
macro_rules! assert_pixel_eq {
    ($surface:expr, ($x:expr, $y:expr), $expected:expr) => {{
        let actual = $crate::pixel_argb(&$surface, $x, $y);
        let expected: $crate::Argb = $expected;
        if actual != expected {
            panic!(
                "pixel ({}, {}) mismatch\n  actual: {}\nexpected: {}",
                $x, $y, actual, expected
            );
        }
    }};
}
