//! Colors, the qualitative palette, and sequential colormaps.

use std::{fmt, str::FromStr};

use crate::error::ParseError;

/// An RGBA color with channels in `[0, 1]`.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Rgba {
    /// Red channel.
    pub r: f64,
    /// Green channel.
    pub g: f64,
    /// Blue channel.
    pub b: f64,
    /// Alpha channel.
    pub a: f64,
}

impl Rgba {
    /// Creates a color from its channels.
    #[must_use]
    pub const fn new(r: f64, g: f64, b: f64, a: f64) -> Self {
        Self { r, g, b, a }
    }

    /// Creates an opaque color from a packed `0xRRGGBB` value.
    ///
    /// # Examples
    /// ```
    /// use clustree_core::Rgba;
    ///
    /// let white = Rgba::from_hex(0xff_ff_ff);
    /// assert_eq!(white, Rgba::new(1.0, 1.0, 1.0, 1.0));
    /// ```
    #[must_use]
    #[expect(clippy::float_arithmetic, reason = "channels are scaled to [0, 1]")]
    pub const fn from_hex(rgb: u32) -> Self {
        Self {
            r: ((rgb >> 16) & 0xff) as f64 / 255.0,
            g: ((rgb >> 8) & 0xff) as f64 / 255.0,
            b: (rgb & 0xff) as f64 / 255.0,
            a: 1.0,
        }
    }

    /// Linear interpolation from `self` towards `other`.
    #[must_use]
    #[expect(clippy::float_arithmetic, reason = "interpolation is arithmetic")]
    pub fn lerp(self, other: Self, t: f64) -> Self {
        let mix = |from: f64, to: f64| from + (to - from) * t;
        Self {
            r: mix(self.r, other.r),
            g: mix(self.g, other.g),
            b: mix(self.b, other.b),
            a: mix(self.a, other.a),
        }
    }

    /// Formats the color as `#rrggbb`, or `#rrggbbaa` when translucent.
    ///
    /// # Examples
    /// ```
    /// use clustree_core::Rgba;
    ///
    /// assert_eq!(Rgba::from_hex(0x1f77b4).to_hex(), "#1f77b4");
    /// assert_eq!(Rgba::new(1.0, 0.0, 0.0, 0.5).to_hex(), "#ff000080");
    /// ```
    #[must_use]
    pub fn to_hex(self) -> String {
        let [r, g, b, a] = [self.r, self.g, self.b, self.a].map(channel_byte);
        if a == u8::MAX {
            format!("#{r:02x}{g:02x}{b:02x}")
        } else {
            format!("#{r:02x}{g:02x}{b:02x}{a:02x}")
        }
    }
}

#[expect(
    clippy::float_arithmetic,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    reason = "the clamped channel scales into the u8 range"
)]
fn channel_byte(value: f64) -> u8 {
    (value.clamp(0.0, 1.0) * 255.0).round() as u8
}

impl fmt::Display for Rgba {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl FromStr for Rgba {
    type Err = ParseError;

    /// Parses `#rrggbb`, `#rrggbbaa`, a palette reference `C0`..`C9`, or a
    /// palette name such as `tab:blue`.
    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let invalid = || ParseError::InvalidColor {
            raw: raw.to_owned(),
        };
        let trimmed = raw.trim();

        if let Some(hex) = trimmed.strip_prefix('#') {
            return parse_hex(hex).ok_or_else(invalid);
        }
        if let Some(index) = trimmed.strip_prefix('C') {
            return index
                .parse::<usize>()
                .ok()
                .and_then(|index| TAB10.get(index).copied())
                .ok_or_else(invalid);
        }
        TAB10_NAMES
            .iter()
            .position(|name| name.eq_ignore_ascii_case(trimmed))
            .and_then(|index| TAB10.get(index).copied())
            .ok_or_else(invalid)
    }
}

#[expect(clippy::float_arithmetic, reason = "alpha is scaled to [0, 1]")]
fn parse_hex(hex: &str) -> Option<Rgba> {
    if !hex.bytes().all(|byte| byte.is_ascii_hexdigit()) {
        return None;
    }
    match hex.len() {
        6 => u32::from_str_radix(hex, 16).ok().map(Rgba::from_hex),
        8 => {
            let packed = u32::from_str_radix(hex, 16).ok()?;
            let alpha = f64::from(packed & 0xff) / 255.0;
            Some(Rgba {
                a: alpha,
                ..Rgba::from_hex(packed >> 8)
            })
        }
        _ => None,
    }
}

/// The Tableau-10 qualitative palette, referenced as `C0`..`C9`.
pub const TAB10: [Rgba; 10] = [
    Rgba::from_hex(0x1f77b4),
    Rgba::from_hex(0xff7f0e),
    Rgba::from_hex(0x2ca02c),
    Rgba::from_hex(0xd62728),
    Rgba::from_hex(0x9467bd),
    Rgba::from_hex(0x8c564b),
    Rgba::from_hex(0xe377c2),
    Rgba::from_hex(0x7f7f7f),
    Rgba::from_hex(0xbcbd22),
    Rgba::from_hex(0x17becf),
];

const TAB10_NAMES: [&str; 10] = [
    "tab:blue",
    "tab:orange",
    "tab:green",
    "tab:red",
    "tab:purple",
    "tab:brown",
    "tab:pink",
    "tab:gray",
    "tab:olive",
    "tab:cyan",
];

/// Returns the palette entry for `index`, cycling every ten entries.
///
/// # Examples
/// ```
/// use clustree_core::{palette_color, TAB10};
///
/// assert_eq!(palette_color(3), TAB10[3]);
/// assert_eq!(palette_color(13), TAB10[3]);
/// ```
#[must_use]
pub fn palette_color(index: usize) -> Rgba {
    TAB10[index % TAB10.len()]
}

/// Maps a position in `[0, 1]` to a color.
///
/// Implementations clamp positions outside the unit interval and treat `NaN`
/// as `0`.
pub trait Colormap: fmt::Debug + Send + Sync {
    /// Human-readable name used in logs.
    fn name(&self) -> &str;

    /// Color at `position`.
    fn map(&self, position: f64) -> Rgba;
}

/// Built-in sequential colormaps.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum NamedColormap {
    /// White to dark blue.
    Blues,
    /// White to dark red.
    Reds,
    /// White to dark green.
    Greens,
    /// White to black.
    Greys,
    /// White to dark orange.
    Oranges,
}

impl NamedColormap {
    /// Every built-in colormap.
    pub const ALL: [Self; 5] = [
        Self::Blues,
        Self::Reds,
        Self::Greens,
        Self::Greys,
        Self::Oranges,
    ];

    /// Canonical name of the colormap.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Blues => "Blues",
            Self::Reds => "Reds",
            Self::Greens => "Greens",
            Self::Greys => "Greys",
            Self::Oranges => "Oranges",
        }
    }

    const fn stops(self) -> &'static [u32; 9] {
        match self {
            Self::Blues => &[
                0xf7fbff, 0xdeebf7, 0xc6dbef, 0x9ecae1, 0x6baed6, 0x4292c6, 0x2171b5, 0x08519c,
                0x08306b,
            ],
            Self::Reds => &[
                0xfff5f0, 0xfee0d2, 0xfcbba1, 0xfc9272, 0xfb6a4a, 0xef3b2c, 0xcb181d, 0xa50f15,
                0x67000d,
            ],
            Self::Greens => &[
                0xf7fcf5, 0xe5f5e0, 0xc7e9c0, 0xa1d99b, 0x74c476, 0x41ab5d, 0x238b45, 0x006d2c,
                0x00441b,
            ],
            Self::Greys => &[
                0xffffff, 0xf0f0f0, 0xd9d9d9, 0xbdbdbd, 0x969696, 0x737373, 0x525252, 0x252525,
                0x000000,
            ],
            Self::Oranges => &[
                0xfff5eb, 0xfee6ce, 0xfdd0a2, 0xfdae6b, 0xfd8d3c, 0xf16913, 0xd94801, 0xa63603,
                0x7f2704,
            ],
        }
    }
}

impl fmt::Display for NamedColormap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NamedColormap {
    type Err = ParseError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|map| map.as_str().eq_ignore_ascii_case(name.trim()))
            .ok_or_else(|| ParseError::UnknownColormap {
                name: name.to_owned(),
            })
    }
}

impl Colormap for NamedColormap {
    fn name(&self) -> &str {
        self.as_str()
    }

    #[expect(
        clippy::float_arithmetic,
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        clippy::cast_precision_loss,
        reason = "piecewise-linear interpolation between colormap stops"
    )]
    fn map(&self, position: f64) -> Rgba {
        let stops = self.stops();
        let last = stops.len() - 1;
        let position = if position.is_nan() {
            0.0
        } else {
            position.clamp(0.0, 1.0)
        };
        let scaled = position * last as f64;
        let lower = (scaled.floor() as usize).min(last);
        let fraction = scaled - lower as f64;
        let start = Rgba::from_hex(stops[lower]);
        if lower == last || fraction == 0.0 {
            return start;
        }
        start.lerp(Rgba::from_hex(stops[lower + 1]), fraction)
    }
}
