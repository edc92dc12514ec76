//! Common types shared by the heat-map renderer and its front ends.

pub mod color;
pub mod error;
pub mod point;
pub mod style;

pub use color::Argb;
pub use error::{HeatMapError, HeatMapResult};
pub use point::{DataPoint, UserData};
pub use style::{GradientStop, HeatMapStyle, MaxDrawingSize, Padding};
