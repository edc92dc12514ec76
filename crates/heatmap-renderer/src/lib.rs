//! Heat-map rasterization.
//!
//! Points are rendered in three stages:
//! - Shadow layer: each point becomes a black radial falloff whose alpha
//!   encodes its intensity, blended source-over into an offscreen pixmap
//! - Palette: a 256-entry color ramp built from gradient stops
//! - Compositing: every touched shadow pixel is mapped through the palette
//!   and an opacity clamp, then blitted onto the destination surface
//!
//! [`HeatMap`] ties the stages together with double-buffered point input and
//! a render lock so producers on other threads never race the renderer.

pub mod compositor;
pub mod data_buffer;
pub mod heatmap;
pub mod layer_pool;
pub mod layout;
pub mod marker;
pub mod nearest;
pub mod palette;
pub mod png;
pub mod shadow;

pub use compositor::OpacityRule;
pub use data_buffer::DataBuffer;
pub use heatmap::HeatMap;
pub use hit_test::{MapClickListener, TapTracker};
pub use layout::DrawingLayout;
pub use marker::{CircleMarker, MarkerCallback};
pub use palette::{build_palette, Palette};
pub use shadow::{RenderBounds, ShadowLayer, ShadowParams};

pub use heatmap_common::{Argb, DataPoint, HeatMapError, HeatMapResult, HeatMapStyle};
