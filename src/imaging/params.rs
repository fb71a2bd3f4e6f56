//! Parameter types for image operations.
//!
//! These structs describe *what* to draw, not *how*. They are the interface
//! between the [`Image`](super::wrapper::Image) wrapper and the
//! [`backend`](super::backend), so a mock engine can record them unchanged.
//!
//! ## Types
//!
//! - [`Color`]: RGBA colour parsed from a CSS-style name or hex string.
//! - [`Stroke`]: Outline colour and width drawn behind text.
//! - [`Drawer`]: Text style: font file, pixel size, fill, optional stroke.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unrecognized color '{0}'")]
pub struct ParseColorError(pub String);

/// An 8-bit RGBA colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color(pub [u8; 4]);

impl Color {
    pub const WHITE: Color = Color([255, 255, 255, 255]);
    pub const BLACK: Color = Color([0, 0, 0, 255]);
    pub const TRANSPARENT: Color = Color([0, 0, 0, 0]);

    pub fn rgba(self) -> [u8; 4] {
        self.0
    }

    pub fn alpha(self) -> u8 {
        self.0[3]
    }
}

/// Named colours understood by [`Color::from_str`].
const NAMED_COLORS: &[(&str, [u8; 4])] = &[
    ("white", [255, 255, 255, 255]),
    ("black", [0, 0, 0, 255]),
    ("red", [255, 0, 0, 255]),
    ("green", [0, 128, 0, 255]),
    ("lime", [0, 255, 0, 255]),
    ("blue", [0, 0, 255, 255]),
    ("yellow", [255, 255, 0, 255]),
    ("cyan", [0, 255, 255, 255]),
    ("aqua", [0, 255, 255, 255]),
    ("magenta", [255, 0, 255, 255]),
    ("fuchsia", [255, 0, 255, 255]),
    ("gray", [128, 128, 128, 255]),
    ("grey", [128, 128, 128, 255]),
    ("silver", [192, 192, 192, 255]),
    ("maroon", [128, 0, 0, 255]),
    ("olive", [128, 128, 0, 255]),
    ("navy", [0, 0, 128, 255]),
    ("teal", [0, 128, 128, 255]),
    ("purple", [128, 0, 128, 255]),
    ("orange", [255, 165, 0, 255]),
    ("pink", [255, 192, 203, 255]),
    ("brown", [165, 42, 42, 255]),
    ("transparent", [0, 0, 0, 0]),
    ("none", [0, 0, 0, 0]),
];

fn hex_nibble(c: u8) -> Option<u8> {
    (c as char).to_digit(16).map(|d| d as u8)
}

fn parse_hex(digits: &str) -> Option<[u8; 4]> {
    let bytes = digits.as_bytes();
    let nibbles: Option<Vec<u8>> = bytes.iter().map(|&b| hex_nibble(b)).collect();
    let n = nibbles?;
    match n.len() {
        // #rgb / #rgba: each nibble doubled (f → ff)
        3 => Some([n[0] * 17, n[1] * 17, n[2] * 17, 255]),
        4 => Some([n[0] * 17, n[1] * 17, n[2] * 17, n[3] * 17]),
        6 => Some([n[0] << 4 | n[1], n[2] << 4 | n[3], n[4] << 4 | n[5], 255]),
        8 => Some([
            n[0] << 4 | n[1],
            n[2] << 4 | n[3],
            n[4] << 4 | n[5],
            n[6] << 4 | n[7],
        ]),
        _ => None,
    }
}

impl FromStr for Color {
    type Err = ParseColorError;

    /// Parse `#rgb`, `#rgba`, `#rrggbb`, `#rrggbbaa`, or a CSS colour name.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if let Some(digits) = trimmed.strip_prefix('#') {
            return parse_hex(digits)
                .map(Color)
                .ok_or_else(|| ParseColorError(s.to_string()));
        }
        let lower = trimmed.to_ascii_lowercase();
        NAMED_COLORS
            .iter()
            .find(|(name, _)| *name == lower)
            .map(|(_, rgba)| Color(*rgba))
            .ok_or_else(|| ParseColorError(s.to_string()))
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [r, g, b, a] = self.0;
        if a == 255 {
            write!(f, "#{r:02x}{g:02x}{b:02x}")
        } else {
            write!(f, "#{r:02x}{g:02x}{b:02x}{a:02x}")
        }
    }
}

/// Widest outline the engine will draw, in pixels.
pub const MAX_STROKE_WIDTH: u32 = 64;

/// Outline drawn around glyphs before the fill.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Stroke {
    pub color: Color,
    /// Outline thickness in pixels. Zero disables the stroke.
    pub width: u32,
}

/// Text style used by annotate and metrics queries.
#[derive(Debug, Clone, PartialEq)]
pub struct Drawer {
    /// TrueType/OpenType font file.
    pub font: PathBuf,
    /// Glyph height in pixels.
    pub size: f32,
    pub fill: Color,
    pub stroke: Option<Stroke>,
}

impl Drawer {
    pub fn new(font: impl Into<PathBuf>, size: f32) -> Self {
        Self {
            font: font.into(),
            size,
            fill: Color::BLACK,
            stroke: None,
        }
    }

    pub fn with_fill(mut self, fill: Color) -> Self {
        self.fill = fill;
        self
    }

    pub fn with_stroke(mut self, color: Color, width: u32) -> Self {
        self.stroke = (width > 0).then_some(Stroke { color, width });
        self
    }

    /// Stroke width in pixels, zero when no stroke is set.
    pub fn stroke_width(&self) -> u32 {
        self.stroke.map(|s| s.width).unwrap_or(0)
    }
}
