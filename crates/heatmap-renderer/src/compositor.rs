//! Colorizing the shadow layer and blitting it onto a destination surface.
//!
//! Only pixels inside the last pass's [`RenderBounds`] are colorized. Each
//! pixel's shadow alpha picks a palette entry and, through the
//! [`OpacityRule`], the output alpha. The colorized layer lives in a
//! per-thread pooled buffer, so the shadow layer itself is never modified
//! and compositing the same shadow twice gives the same pixels.

use heatmap_common::style::validate_opacity;
use heatmap_common::{Argb, HeatMapError, HeatMapResult, HeatMapStyle};
use rayon::prelude::*;
use tiny_skia::{
    BlendMode, Color, ColorU8, FilterQuality, Pixmap, PixmapPaint, PixmapRef,
    PremultipliedColorU8, Transform,
};

use crate::layer_pool::with_layer_buffer;
use crate::palette::Palette;
use crate::shadow::{PixelRect, RenderBounds, ShadowLayer};

/// Minimum bounded area before rows are colorized on the rayon pool.
const PARALLEL_THRESHOLD: usize = 128 * 128;

/// Output alpha as a function of shadow alpha.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OpacityRule {
    /// Fixed output alpha when greater than 0
    pub opacity: u8,
    pub min_opacity: u8,
    pub max_opacity: u8,
}

impl Default for OpacityRule {
    fn default() -> Self {
        Self {
            opacity: 0,
            min_opacity: 0,
            max_opacity: 255,
        }
    }
}

impl OpacityRule {
    pub fn from_style(style: &HeatMapStyle) -> HeatMapResult<Self> {
        Ok(Self {
            opacity: validate_opacity("opacity", style.opacity)?,
            min_opacity: validate_opacity("min_opacity", style.min_opacity)?,
            max_opacity: validate_opacity("max_opacity", style.max_opacity)?,
        })
    }

    /// Clamp a shadow alpha into the output alpha.
    #[inline(always)]
    pub fn clamp_alpha(&self, alpha: u8) -> u8 {
        if self.opacity > 0 {
            self.opacity
        } else if alpha < self.max_opacity {
            alpha.max(self.min_opacity)
        } else {
            self.max_opacity
        }
    }
}

/// Final color for one shadow pixel.
///
/// The palette is indexed by the raw shadow alpha; only the output alpha
/// goes through the opacity rule.
#[inline(always)]
pub fn colorize_pixel(alpha: u8, palette: &Palette, rule: &OpacityRule) -> Argb {
    let clamped = rule.clamp_alpha(alpha) as u32;
    Argb((clamped << 24) | palette.get(alpha).rgb_bits())
}

/// Colorize the shadow pixels inside `rect` into `out`.
///
/// `out` is premultiplied RGBA of the shadow's size; pixels outside `rect`
/// are left as they are.
pub fn colorize_into(
    shadow: &ShadowLayer,
    rect: PixelRect,
    palette: &Palette,
    rule: &OpacityRule,
    out: &mut [u8],
) {
    let width = shadow.width() as usize;
    let src = shadow.pixels();
    let stride = width * 4;
    let (x0, x1) = (rect.x0 as usize, rect.x1 as usize);

    if rect.area() < PARALLEL_THRESHOLD {
        let rows = out
            .chunks_mut(stride)
            .enumerate()
            .skip(rect.y0 as usize)
            .take(rect.height() as usize);
        for (y, row) in rows {
            let src_row = &src[y * width..(y + 1) * width];
            colorize_row(src_row, row, x0, x1, palette, rule);
        }
    } else {
        out.par_chunks_mut(stride)
            .enumerate()
            .skip(rect.y0 as usize)
            .take(rect.height() as usize)
            .for_each(|(y, row)| {
                let src_row = &src[y * width..(y + 1) * width];
                colorize_row(src_row, row, x0, x1, palette, rule);
            });
    }
}

#[inline]
fn colorize_row(
    src: &[PremultipliedColorU8],
    dst: &mut [u8],
    x0: usize,
    x1: usize,
    palette: &Palette,
    rule: &OpacityRule,
) {
    for x in x0..x1 {
        let color = colorize_pixel(src[x].alpha(), palette, rule);
        let p = ColorU8::from_rgba(color.red(), color.green(), color.blue(), color.alpha())
            .premultiply();
        let offset = x * 4;
        dst[offset..offset + 4].copy_from_slice(&[p.red(), p.green(), p.blue(), p.alpha()]);
    }
}

/// Composite a shadow layer onto `dest`.
///
/// Fills `dest` with `background` when one is given, then draws the
/// colorized layer stretched over the whole of `dest` with
/// nearest-neighbour sampling. Empty bounds leave only the background.
pub fn composite(
    dest: &mut Pixmap,
    shadow: &ShadowLayer,
    bounds: RenderBounds,
    palette: &Palette,
    rule: &OpacityRule,
    background: Option<Argb>,
) -> HeatMapResult<()> {
    if let Some(bg) = background {
        dest.fill(Color::from_rgba8(bg.red(), bg.green(), bg.blue(), bg.alpha()));
    }

    let (width, height) = (shadow.width(), shadow.height());
    let Some(rect) = bounds.pixel_rect(width, height) else {
        tracing::debug!("Nothing to composite, bounds outside the shadow layer");
        return Ok(());
    };

    let scale_x = dest.width() as f32 / width as f32;
    let scale_y = dest.height() as f32 / height as f32;

    with_layer_buffer(width, height, |buf| -> HeatMapResult<()> {
        colorize_into(shadow, rect, palette, rule, buf);

        let layer =
            PixmapRef::from_bytes(buf, width, height).ok_or(HeatMapError::Resource { width, height })?;
        let paint = PixmapPaint {
            opacity: 1.0,
            blend_mode: BlendMode::SourceOver,
            quality: FilterQuality::Nearest,
        };
        dest.draw_pixmap(0, 0, layer, &paint, Transform::from_scale(scale_x, scale_y), None);
        Ok(())
    })?;

    tracing::debug!(
        x0 = rect.x0,
        y0 = rect.y0,
        x1 = rect.x1,
        y1 = rect.y1,
        scale_x,
        scale_y,
        "Composited shadow layer"
    );
    Ok(())
}
