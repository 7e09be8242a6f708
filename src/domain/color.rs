//! CSS color values used by backgrounds and shadows

use std::fmt;

/// Straight-alpha color with components in 0.0..=1.0
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgba {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

const NAMED: &[(&str, [u8; 3])] = &[
    ("black", [0, 0, 0]),
    ("white", [255, 255, 255]),
    ("red", [255, 0, 0]),
    ("green", [0, 128, 0]),
    ("lime", [0, 255, 0]),
    ("blue", [0, 0, 255]),
    ("yellow", [255, 255, 0]),
    ("cyan", [0, 255, 255]),
    ("aqua", [0, 255, 255]),
    ("magenta", [255, 0, 255]),
    ("fuchsia", [255, 0, 255]),
    ("gray", [128, 128, 128]),
    ("grey", [128, 128, 128]),
    ("silver", [192, 192, 192]),
    ("maroon", [128, 0, 0]),
    ("navy", [0, 0, 128]),
    ("olive", [128, 128, 0]),
    ("purple", [128, 0, 128]),
    ("teal", [0, 128, 128]),
    ("orange", [255, 165, 0]),
    ("pink", [255, 192, 203]),
];

impl Rgba {
    pub const BLACK: Rgba = Rgba::new(0.0, 0.0, 0.0, 1.0);
    pub const TRANSPARENT: Rgba = Rgba::new(0.0, 0.0, 0.0, 0.0);

    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    pub fn from_rgba8(r: u8, g: u8, b: u8, a: f32) -> Self {
        Self::new(
            r as f32 / 255.0,
            g as f32 / 255.0,
            b as f32 / 255.0,
            a.clamp(0.0, 1.0),
        )
    }

    /// Same color with a different alpha
    pub fn with_alpha(self, a: f32) -> Self {
        Self { a, ..self }
    }

    /// Convert to image crate RGBA format (0-255)
    pub fn to_rgba_u8(self) -> [u8; 4] {
        [
            (self.r * 255.0).round() as u8,
            (self.g * 255.0).round() as u8,
            (self.b * 255.0).round() as u8,
            (self.a * 255.0).round() as u8,
        ]
    }

    /// Parse a CSS color: hex, `rgb()`/`rgba()`, `transparent` or a basic named color.
    pub fn parse(input: &str) -> Option<Self> {
        let s = input.trim().to_ascii_lowercase();
        if let Some(hex) = s.strip_prefix('#') {
            return parse_hex(hex);
        }
        if s == "transparent" {
            return Some(Self::TRANSPARENT);
        }
        if let Some(args) = s
            .strip_prefix("rgba(")
            .or_else(|| s.strip_prefix("rgb("))
            .and_then(|rest| rest.strip_suffix(')'))
        {
            return parse_rgb_args(args);
        }
        NAMED
            .iter()
            .find(|(name, _)| *name == s)
            .map(|(_, [r, g, b])| Self::from_rgba8(*r, *g, *b, 1.0))
    }
}

impl fmt::Display for Rgba {
    /// Formats as `rgba(r, g, b, a)`; alpha keeps its shortest decimal form.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [r, g, b, _] = self.to_rgba_u8();
        write!(f, "rgba({r}, {g}, {b}, {})", round_alpha(self.a))
    }
}

/// Trim float noise (0.18000001 -> 0.18) for stable CSS output
fn round_alpha(a: f32) -> f32 {
    (a * 10_000.0).round() / 10_000.0
}

fn parse_hex(hex: &str) -> Option<Rgba> {
    if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    let nibble = |i: usize| u8::from_str_radix(&hex[i..=i], 16).ok().map(|v| v * 17);
    let byte = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
    match hex.len() {
        3 => Some(Rgba::from_rgba8(nibble(0)?, nibble(1)?, nibble(2)?, 1.0)),
        4 => Some(Rgba::from_rgba8(
            nibble(0)?,
            nibble(1)?,
            nibble(2)?,
            nibble(3)? as f32 / 255.0,
        )),
        6 => Some(Rgba::from_rgba8(byte(0)?, byte(2)?, byte(4)?, 1.0)),
        8 => Some(Rgba::from_rgba8(
            byte(0)?,
            byte(2)?,
            byte(4)?,
            byte(6)? as f32 / 255.0,
        )),
        _ => None,
    }
}

/// Accepts both `r, g, b[, a]` and `r g b[ / a]`
fn parse_rgb_args(args: &str) -> Option<Rgba> {
    let normalized = args.replace('/', " ").replace(',', " ");
    let parts: Vec<&str> = normalized.split_whitespace().collect();
    if parts.len() != 3 && parts.len() != 4 {
        return None;
    }
    let channel = |s: &str| -> Option<f32> {
        match s.strip_suffix('%') {
            Some(pct) => pct.parse::<f32>().ok().map(|v| v / 100.0),
            None => s.parse::<f32>().ok().map(|v| v / 255.0),
        }
    };
    let alpha = match parts.get(3) {
        Some(s) => match s.strip_suffix('%') {
            Some(pct) => pct.parse::<f32>().ok()? / 100.0,
            None => s.parse::<f32>().ok()?,
        },
        None => 1.0,
    };
    Some(Rgba::new(
        channel(parts[0])?.clamp(0.0, 1.0),
        channel(parts[1])?.clamp(0.0, 1.0),
        channel(parts[2])?.clamp(0.0, 1.0),
        alpha.clamp(0.0, 1.0),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hex_forms() {
        assert_eq!(
            Rgba::parse("#3b82f6").unwrap().to_rgba_u8(),
            [0x3b, 0x82, 0xf6, 255]
        );
        assert_eq!(Rgba::parse("#fff").unwrap().to_rgba_u8(), [255, 255, 255, 255]);
        assert_eq!(Rgba::parse("#00000080").unwrap().to_rgba_u8(), [0, 0, 0, 128]);
        assert!(Rgba::parse("#12345").is_none());
        assert!(Rgba::parse("#zzzzzz").is_none());
    }

    #[test]
    fn test_parse_rgb_functions() {
        assert_eq!(
            Rgba::parse("rgba(0, 0, 0, 0.5)").unwrap().to_rgba_u8(),
            [0, 0, 0, 128]
        );
        assert_eq!(
            Rgba::parse("rgb(255 0 0 / 50%)").unwrap().to_rgba_u8(),
            [255, 0, 0, 128]
        );
        assert!(Rgba::parse("rgb(1, 2)").is_none());
    }

    #[test]
    fn test_parse_named_and_transparent() {
        assert_eq!(Rgba::parse("White").unwrap().to_rgba_u8(), [255, 255, 255, 255]);
        assert_eq!(Rgba::parse("transparent").unwrap().a, 0.0);
        assert!(Rgba::parse("blurple").is_none());
    }

    #[test]
    fn test_display_rounds_alpha() {
        let color = Rgba::BLACK.with_alpha(0.1 + 0.2 * 0.4);
        assert_eq!(color.to_string(), "rgba(0, 0, 0, 0.18)");
    }
}
