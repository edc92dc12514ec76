//! Packed ARGB colors.
//!
//! Colors are stored as `0xAARRGGBB`, the layout the palette and compositor
//! work in. In configuration files a color may be written as:
//! - Hex string: `"#RRGGBB"` (opaque) or `"#AARRGGBB"`, `0x` prefix also accepted
//! - Named color: `"red"`, `"transparent"`, ...
//! - Array: `[r, g, b]` or `[r, g, b, a]`
//! - Integer: `4294901760` (raw ARGB)

use serde::{Deserialize, Serialize};
use std::fmt;

/// A color packed as `0xAARRGGBB`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "ColorRepr", into = "String")]
pub struct Argb(pub u32);

impl Argb {
    pub const TRANSPARENT: Argb = Argb(0x0000_0000);
    pub const BLACK: Argb = Argb(0xff00_0000);
    pub const WHITE: Argb = Argb(0xffff_ffff);
    pub const RED: Argb = Argb(0xffff_0000);
    pub const GREEN: Argb = Argb(0xff00_ff00);
    pub const BLUE: Argb = Argb(0xff00_00ff);

    pub const fn new(a: u8, r: u8, g: u8, b: u8) -> Self {
        Argb(((a as u32) << 24) | ((r as u32) << 16) | ((g as u32) << 8) | (b as u32))
    }

    /// Opaque color from RGB components.
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::new(255, r, g, b)
    }

    pub const fn alpha(self) -> u8 {
        (self.0 >> 24) as u8
    }

    pub const fn red(self) -> u8 {
        (self.0 >> 16) as u8
    }

    pub const fn green(self) -> u8 {
        (self.0 >> 8) as u8
    }

    pub const fn blue(self) -> u8 {
        self.0 as u8
    }

    /// The RGB bits with alpha zeroed.
    pub const fn rgb_bits(self) -> u32 {
        self.0 & 0x00ff_ffff
    }

    /// Same RGB, different alpha.
    pub const fn with_alpha(self, alpha: u8) -> Self {
        Argb(((alpha as u32) << 24) | self.rgb_bits())
    }

    /// Straight (non-premultiplied) RGBA tuple.
    pub const fn to_rgba(self) -> (u8, u8, u8, u8) {
        (self.red(), self.green(), self.blue(), self.alpha())
    }

    /// Per-channel linear interpolation, `t` clamped to [0, 1].
    pub fn lerp(self, other: Argb, t: f32) -> Argb {
        let t = t.clamp(0.0, 1.0);
        let mix = |a: u8, b: u8| -> u8 {
            (a as f32 * (1.0 - t) + b as f32 * t).round().clamp(0.0, 255.0) as u8
        };
        Argb::new(
            mix(self.alpha(), other.alpha()),
            mix(self.red(), other.red()),
            mix(self.green(), other.green()),
            mix(self.blue(), other.blue()),
        )
    }

    /// Parse a hex (`#RRGGBB`, `#AARRGGBB`, `0xAARRGGBB`) or named color.
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim();
        if let Some(named) = named_color(s) {
            return Some(named);
        }

        let hex = s
            .strip_prefix('#')
            .or_else(|| s.strip_prefix("0x"))
            .or_else(|| s.strip_prefix("0X"))?;
        if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return None;
        }

        match hex.len() {
            6 => u32::from_str_radix(hex, 16).ok().map(|v| Argb(0xff00_0000 | v)),
            8 => u32::from_str_radix(hex, 16).ok().map(Argb),
            _ => None,
        }
    }
}

impl fmt::Display for Argb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:08X}", self.0)
    }
}

impl From<u32> for Argb {
    fn from(value: u32) -> Self {
        Argb(value)
    }
}

impl From<Argb> for u32 {
    fn from(color: Argb) -> Self {
        color.0
    }
}

impl From<Argb> for String {
    fn from(color: Argb) -> Self {
        color.to_string()
    }
}

fn named_color(name: &str) -> Option<Argb> {
    let color = match name.to_lowercase().as_str() {
        "transparent" => Argb::TRANSPARENT,
        "black" => Argb::BLACK,
        "white" => Argb::WHITE,
        "red" => Argb::RED,
        "green" => Argb::GREEN,
        "blue" => Argb::BLUE,
        "yellow" => Argb::rgb(255, 255, 0),
        "cyan" => Argb::rgb(0, 255, 255),
        "magenta" => Argb::rgb(255, 0, 255),
        "orange" => Argb::rgb(255, 165, 0),
        "purple" => Argb::rgb(128, 0, 128),
        "gray" | "grey" => Argb::rgb(128, 128, 128),
        _ => return None,
    };
    Some(color)
}

/// Accepted on-disk spellings of a color.
#[derive(Deserialize)]
#[serde(untagged)]
enum ColorRepr {
    Packed(u32),
    Text(String),
    Array(Vec<u8>),
}

impl TryFrom<ColorRepr> for Argb {
    type Error = String;

    fn try_from(repr: ColorRepr) -> Result<Self, Self::Error> {
        match repr {
            ColorRepr::Packed(v) => Ok(Argb(v)),
            ColorRepr::Text(s) => Argb::parse(&s).ok_or_else(|| format!("invalid color '{}'", s)),
            ColorRepr::Array(arr) => match arr.as_slice() {
                [r, g, b] => Ok(Argb::rgb(*r, *g, *b)),
                [r, g, b, a] => Ok(Argb::new(*a, *r, *g, *b)),
                _ => Err(format!(
                    "color array must have 3 or 4 components, got {}",
                    arr.len()
                )),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channels() {
        let c = Argb(0x80ff4020);
        assert_eq!(c.alpha(), 0x80);
        assert_eq!(c.red(), 0xff);
        assert_eq!(c.green(), 0x40);
        assert_eq!(c.blue(), 0x20);
        assert_eq!(c.rgb_bits(), 0x00ff4020);
        assert_eq!(c.with_alpha(0x10), Argb(0x10ff4020));
    }

    #[test]
    fn test_parse_hex() {
        assert_eq!(Argb::parse("#FF0000"), Some(Argb::RED));
        assert_eq!(Argb::parse("#80FF0000"), Some(Argb(0x80ff0000)));
        assert_eq!(Argb::parse("0xff00ff00"), Some(Argb::GREEN));
        assert_eq!(Argb::parse("#GGGGGG"), None);
        assert_eq!(Argb::parse("#FFF"), None);
        assert_eq!(Argb::parse("FF0000"), None);
    }

    #[test]
    fn test_parse_named() {
        assert_eq!(Argb::parse("Transparent"), Some(Argb::TRANSPARENT));
        assert_eq!(Argb::parse("orange"), Some(Argb::rgb(255, 165, 0)));
        assert_eq!(Argb::parse("chartreuse"), None);
    }

    #[test]
    fn test_lerp_endpoints_and_midpoint() {
        let a = Argb::RED;
        let b = Argb::GREEN;
        assert_eq!(a.lerp(b, 0.0), a);
        assert_eq!(a.lerp(b, 1.0), b);
        assert_eq!(a.lerp(b, 0.5), Argb::new(255, 128, 128, 0));
        assert_eq!(a.lerp(b, 7.0), b);
    }

    #[test]
    fn test_display() {
        assert_eq!(Argb(0xff102030).to_string(), "#FF102030");
    }

    #[test]
    fn test_serde_formats() {
        let colors: Vec<Argb> =
            serde_json::from_str(r##"["#00FF00", [0, 0, 255], [1, 2, 3, 4], 4278190080, "white"]"##)
                .unwrap();
        assert_eq!(colors[0], Argb::GREEN);
        assert_eq!(colors[1], Argb::BLUE);
        assert_eq!(colors[2], Argb::new(4, 1, 2, 3));
        assert_eq!(colors[3], Argb::BLACK);
        assert_eq!(colors[4], Argb::WHITE);

        let json = serde_json::to_string(&Argb::RED).unwrap();
        assert_eq!(json, r##""#FFFF0000""##);
    }

    #[test]
    fn test_serde_rejects_bad_color() {
        assert!(serde_json::from_str::<Argb>(r#""nope""#).is_err());
        assert!(serde_json::from_str::<Argb>("[1, 2]").is_err());
    }
}
