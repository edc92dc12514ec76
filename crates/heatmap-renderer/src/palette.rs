//! Palette generation from gradient stops.
//!
//! The palette is a 256-entry lookup table indexed by shadow-layer alpha.
//! It is sampled evenly along a linear gradient through the stops, ordered
//! by position and clamped at both ends.

use heatmap_common::style::validate_stops;
use heatmap_common::{Argb, GradientStop, HeatMapResult};

/// Number of palette entries, one per 8-bit alpha bucket.
pub const PALETTE_SIZE: usize = 256;

/// A 256-entry color lookup table.
#[derive(Clone, PartialEq, Eq)]
pub struct Palette {
    colors: [Argb; PALETTE_SIZE],
}

impl Palette {
    /// Color for an alpha bucket.
    #[inline(always)]
    pub fn get(&self, index: u8) -> Argb {
        self.colors[index as usize]
    }

    pub fn colors(&self) -> &[Argb; PALETTE_SIZE] {
        &self.colors
    }

    pub fn len(&self) -> usize {
        PALETTE_SIZE
    }

    pub fn is_empty(&self) -> bool {
        false
    }
}

impl std::fmt::Debug for Palette {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Palette")
            .field("first", &self.colors[0])
            .field("last", &self.colors[PALETTE_SIZE - 1])
            .finish()
    }
}

/// Build the palette for a set of stops.
///
/// Stops may be given in any order; they are sorted by position (stable,
/// so stops sharing a position form a hard edge in input order). A sample
/// exactly on a shared position takes the earlier stop's color. Sample `i`
/// sits at `i / 255` along the ramp.
pub fn build_palette(stops: &[GradientStop]) -> HeatMapResult<Palette> {
    validate_stops(stops)?;

    let mut sorted = stops.to_vec();
    sorted.sort_by(|a, b| a.position.total_cmp(&b.position));

    let mut colors = [Argb::TRANSPARENT; PALETTE_SIZE];
    for (i, color) in colors.iter_mut().enumerate() {
        let t = i as f32 / (PALETTE_SIZE - 1) as f32;
        *color = sample(&sorted, t);
    }

    Ok(Palette { colors })
}

/// Color at `t` along sorted stops, clamped outside the first and last stop.
fn sample(sorted: &[GradientStop], t: f32) -> Argb {
    let Some(upper) = sorted.iter().position(|stop| t <= stop.position) else {
        return sorted[sorted.len() - 1].color;
    };
    if upper == 0 {
        return sorted[0].color;
    }

    let low = &sorted[upper - 1];
    let high = &sorted[upper];
    let span = high.position - low.position;
    let local = if span > 0.0 { (t - low.position) / span } else { 1.0 };
    low.color.lerp(high.color, local)
}
