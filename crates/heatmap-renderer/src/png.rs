//! PNG encoding for rendered surfaces.
//!
//! Surfaces hold premultiplied RGBA; PNG wants straight alpha, so
//! [`encode_surface`] demultiplies before writing a color type 6 image.

use std::io::Write;

use heatmap_common::{HeatMapError, HeatMapResult};
use tiny_skia::Pixmap;

use crate::layer_pool::with_scanline_buffer;

const PNG_SIGNATURE: [u8; 8] = [137, 80, 78, 71, 13, 10, 26, 10];

/// Encode a destination surface.
pub fn encode_surface(surface: &Pixmap) -> HeatMapResult<Vec<u8>> {
    let mut rgba = Vec::with_capacity(surface.pixels().len() * 4);
    for pixel in surface.pixels() {
        let c = pixel.demultiply();
        rgba.extend_from_slice(&[c.red(), c.green(), c.blue(), c.alpha()]);
    }
    encode_rgba(&rgba, surface.width(), surface.height())
}

/// Encode straight-alpha RGBA bytes (4 per pixel, row major).
pub fn encode_rgba(pixels: &[u8], width: u32, height: u32) -> HeatMapResult<Vec<u8>> {
    let expected = width as usize * height as usize * 4;
    if width == 0 || height == 0 {
        return Err(HeatMapError::Encode(format!(
            "cannot encode an empty {}x{} image",
            width, height
        )));
    }
    if pixels.len() != expected {
        return Err(HeatMapError::Encode(format!(
            "expected {} bytes for {}x{} RGBA, got {}",
            expected,
            width,
            height,
            pixels.len()
        )));
    }

    let mut png = Vec::new();
    png.extend_from_slice(&PNG_SIGNATURE);

    let mut ihdr = Vec::with_capacity(13);
    ihdr.extend_from_slice(&width.to_be_bytes());
    ihdr.extend_from_slice(&height.to_be_bytes());
    ihdr.push(8); // bit depth
    ihdr.push(6); // color type RGBA
    ihdr.push(0); // compression
    ihdr.push(0); // filter
    ihdr.push(0); // interlace
    write_chunk(&mut png, b"IHDR", &ihdr);

    let idat = deflate_rows(pixels, width as usize * 4, height as usize)
        .map_err(|e| HeatMapError::Encode(format!("IDAT compression failed: {}", e)))?;
    write_chunk(&mut png, b"IDAT", &idat);

    write_chunk(&mut png, b"IEND", &[]);

    tracing::debug!(width, height, bytes = png.len(), "Encoded PNG");
    Ok(png)
}

fn write_chunk(png: &mut Vec<u8>, chunk_type: &[u8; 4], data: &[u8]) {
    png.extend_from_slice(&(data.len() as u32).to_be_bytes());
    png.extend_from_slice(chunk_type);
    png.extend_from_slice(data);

    let mut hasher = crc32fast::Hasher::new();
    hasher.update(chunk_type);
    hasher.update(data);
    png.extend_from_slice(&hasher.finalize().to_be_bytes());
}

/// Prefix every row with filter type 0 and zlib-compress.
fn deflate_rows(pixels: &[u8], stride: usize, height: usize) -> std::io::Result<Vec<u8>> {
    with_scanline_buffer(height * (stride + 1), |raw| {
        for row in pixels.chunks_exact(stride).take(height) {
            raw.push(0);
            raw.extend_from_slice(row);
        }

        let mut encoder = flate2::write::ZlibEncoder::new(Vec::new(), flate2::Compression::fast());
        encoder.write_all(raw)?;
        encoder.finish()
    })
}
