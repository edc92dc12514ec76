//! Pixel inspection helpers for rendered surfaces.

use heatmap_common::Argb;
use tiny_skia::Pixmap;

/// Straight-alpha color of a surface pixel. Panics outside the surface.
pub fn pixel_argb(surface: &Pixmap, x: u32, y: u32) -> Argb {
    let pixel = surface
        .pixel(x, y)
        .unwrap_or_else(|| panic!("pixel ({}, {}) outside {}x{}", x, y, surface.width(), surface.height()))
        .demultiply();
    Argb::new(pixel.alpha(), pixel.red(), pixel.green(), pixel.blue())
}

pub fn pixel_alpha(surface: &Pixmap, x: u32, y: u32) -> u8 {
    pixel_argb(surface, x, y).alpha()
}

/// Number of pixels with any coverage.
pub fn count_visible(surface: &Pixmap) -> usize {
    surface.pixels().iter().filter(|p| p.alpha() > 0).count()
}

/// A transparent surface, for tests that know the size is valid.
pub fn blank_surface(width: u32, height: u32) -> Pixmap {
    Pixmap::new(width, height).expect("valid surface size")
}
