//! Tests for PNG encoding of rendered surfaces.
//!
//! Encoded images are decoded with the `image` crate and compared pixel by
//! pixel against the source surface.

use heatmap_renderer::png::{encode_rgba, encode_surface};
use heatmap_renderer::{DataPoint, HeatMap, HeatMapError};
use test_utils::{blank_surface, create_scattered_points, fixtures, pixel_argb};

// ============================================================================
// Helper functions
// ============================================================================

fn decode(png: &[u8]) -> image::RgbaImage {
    image::load_from_memory_with_format(png, image::ImageFormat::Png)
        .expect("valid PNG")
        .to_rgba8()
}

/// Gradient test pattern, straight RGBA.
fn pattern(width: u32, height: u32) -> Vec<u8> {
    let mut pixels = Vec::with_capacity((width * height * 4) as usize);
    for y in 0..height {
        for x in 0..width {
            pixels.extend_from_slice(&[
                (x * 255 / width.max(1)) as u8,
                (y * 255 / height.max(1)) as u8,
                128,
                ((x + y) % 256) as u8,
            ]);
        }
    }
    pixels
}

// ============================================================================
// Raw RGBA encoding
// ============================================================================

#[test]
fn test_rgba_round_trip_is_lossless() {
    let pixels = pattern(37, 21);
    let png = encode_rgba(&pixels, 37, 21).unwrap();

    let decoded = decode(&png);
    assert_eq!(decoded.dimensions(), (37, 21));
    assert_eq!(decoded.as_raw(), &pixels);
}

#[test]
fn test_wrong_buffer_size_is_rejected() {
    let err = encode_rgba(&[0; 10], 2, 2).unwrap_err();
    assert!(matches!(err, HeatMapError::Encode(_)));
}

// ============================================================================
// Surface encoding
// ============================================================================

#[test]
fn test_rendered_heat_map_survives_encoding() {
    let map = HeatMap::with_style(fixtures::blurred_style(30.0, 0)).unwrap();
    map.add_data_points(create_scattered_points(25, 5, 0.0, 10.0));

    let mut surface = blank_surface(160, 120);
    map.draw(&mut surface).unwrap();

    let decoded = decode(&encode_surface(&surface).unwrap());
    assert_eq!(decoded.dimensions(), (160, 120));

    for (x, y, pixel) in decoded.enumerate_pixels() {
        let expected = pixel_argb(&surface, x, y);
        let [r, g, b, a] = pixel.0;
        assert_eq!(
            (r, g, b, a),
            (expected.red(), expected.green(), expected.blue(), expected.alpha()),
            "pixel ({}, {})",
            x,
            y
        );
    }
}

#[test]
fn test_opaque_disc_encodes_exact_color() {
    let map = HeatMap::with_style(fixtures::solid_disc_style(20.0)).unwrap();
    map.add_data_point(DataPoint::new(0.5, 0.5, 100.0));

    let mut surface = blank_surface(64, 64);
    map.draw(&mut surface).unwrap();

    let decoded = decode(&encode_surface(&surface).unwrap());
    assert_eq!(decoded.get_pixel(32, 32).0, [255, 0, 0, 255]);
    assert_eq!(decoded.get_pixel(0, 0).0, [0, 0, 0, 0]);
}
