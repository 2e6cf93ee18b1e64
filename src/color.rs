//! RGBA color representation and the predefined annotation palette.

use serde::{Deserialize, Serialize};

/// An RGBA color with components in the range 0.0 to 1.0.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub r: f64,
    pub g: f64,
    pub b: f64,
    pub a: f64,
}

impl Color {
    /// Creates a new color from RGBA components in the 0.0 to 1.0 range.
    pub fn new(r: f64, g: f64, b: f64, a: f64) -> Self {
        Self { r, g, b, a }
    }

    /// Parses `#rrggbb` or `#rrggbbaa` hex notation.
    pub fn from_hex(hex: &str) -> Option<Self> {
        let digits = hex.strip_prefix('#')?;
        let channel = |range: std::ops::Range<usize>| u8::from_str_radix(digits.get(range)?, 16).ok();
        let (r, g, b, a) = match digits.len() {
            6 => (channel(0..2)?, channel(2..4)?, channel(4..6)?, 255),
            8 => (channel(0..2)?, channel(2..4)?, channel(4..6)?, channel(6..8)?),
            _ => return None,
        };
        Some(Self {
            r: r as f64 / 255.0,
            g: g as f64 / 255.0,
            b: b as f64 / 255.0,
            a: a as f64 / 255.0,
        })
    }

    /// Quantizes to 8-bit RGBA for pixel compositing.
    pub fn to_rgba8(self) -> [u8; 4] {
        let quantize = |c: f64| (c.clamp(0.0, 1.0) * 255.0).round() as u8;
        [
            quantize(self.r),
            quantize(self.g),
            quantize(self.b),
            quantize(self.a),
        ]
    }
}

// ============================================================================
// Predefined Colors
// ============================================================================

/// Red, the default annotation color
pub const RED: Color = Color {
    r: 1.0,
    g: 0.0,
    b: 0.0,
    a: 1.0,
};

/// Green
pub const GREEN: Color = Color {
    r: 0.0,
    g: 1.0,
    b: 0.0,
    a: 1.0,
};

/// Blue
pub const BLUE: Color = Color {
    r: 0.0,
    g: 0.0,
    b: 1.0,
    a: 1.0,
};

/// Yellow
pub const YELLOW: Color = Color {
    r: 1.0,
    g: 1.0,
    b: 0.0,
    a: 1.0,
};

/// Orange
pub const ORANGE: Color = Color {
    r: 1.0,
    g: 0.65,
    b: 0.0,
    a: 1.0,
};

/// Magenta
pub const MAGENTA: Color = Color {
    r: 1.0,
    g: 0.0,
    b: 1.0,
    a: 1.0,
};

/// White
pub const WHITE: Color = Color {
    r: 1.0,
    g: 1.0,
    b: 1.0,
    a: 1.0,
};

/// Black
pub const BLACK: Color = Color {
    r: 0.0,
    g: 0.0,
    b: 0.0,
    a: 1.0,
};

/// Maps a color name from a host toolbar or an options file to a palette
/// value. Returns `None` for unknown names.
pub fn name_to_color(name: &str) -> Option<Color> {
    match name.to_lowercase().as_str() {
        "red" => Some(RED),
        "green" => Some(GREEN),
        "blue" => Some(BLUE),
        "yellow" => Some(YELLOW),
        "orange" => Some(ORANGE),
        "magenta" => Some(MAGENTA),
        "white" => Some(WHITE),
        "black" => Some(BLACK),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_hex_parses_rgb_and_rgba() {
        assert_eq!(Color::from_hex("#ff0000"), Some(RED));
        let translucent = Color::from_hex("#00ff0080").unwrap();
        assert_eq!(translucent.g, 1.0);
        assert!((translucent.a - 128.0 / 255.0).abs() < 1e-9);
    }

    #[test]
    fn from_hex_rejects_bad_input() {
        assert_eq!(Color::from_hex("ff0000"), None);
        assert_eq!(Color::from_hex("#ff00"), None);
        assert_eq!(Color::from_hex("#gg0000"), None);
    }

    #[test]
    fn to_rgba8_quantizes_and_clamps() {
        assert_eq!(RED.to_rgba8(), [255, 0, 0, 255]);
        assert_eq!(Color::new(2.0, -1.0, 0.5, 1.0).to_rgba8(), [255, 0, 128, 255]);
    }

    #[test]
    fn name_lookup_is_case_insensitive() {
        assert_eq!(name_to_color("RED"), Some(RED));
        assert_eq!(name_to_color("chartreuse"), None);
    }
}
