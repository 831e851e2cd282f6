//! Colors and the perceptual spaces they are blended in.
//!
//! Channels are stored as 8-bit sRGB. Blending converts both endpoints into
//! the requested `ColorSpace`, interpolates there (hues along the shorter arc)
//! and converts back.

use serde::{de::SeqAccess, Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ColorError {
    #[error("invalid hex color {0:?}")]
    InvalidHex(String),
}

/// Space in which two colors are interpolated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColorSpace {
    /// Per-channel blend of the gamma-encoded values.
    Rgb,
    LinearRgb,
    Hsv,
    #[default]
    Lab,
    Lch,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Default for Color {
    fn default() -> Self {
        Color::BLACK
    }
}

impl Color {
    /// "No paint": fully transparent.
    pub const NONE: Color = Color::rgba(0, 0, 0, 0);
    pub const BLACK: Color = Color::rgb(0, 0, 0);
    pub const WHITE: Color = Color::rgb(255, 255, 255);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub fn is_none(&self) -> bool {
        self.a == 0
    }

    /// Parses `#rgb`, `#rrggbb` or `#rrggbbaa`; the leading `#` is optional.
    pub fn from_hex(hex: &str) -> Result<Self, ColorError> {
        let err = || ColorError::InvalidHex(hex.to_string());
        let digits = hex.trim().trim_start_matches('#');
        if !digits.is_ascii() {
            return Err(err());
        }
        let channel = |s: &str| u8::from_str_radix(s, 16).map_err(|_| err());
        match digits.len() {
            3 => {
                let mut c = [0u8; 3];
                for (i, ch) in digits.chars().enumerate() {
                    let v = ch.to_digit(16).ok_or_else(err)? as u8;
                    c[i] = v * 17;
                }
                Ok(Color::rgb(c[0], c[1], c[2]))
            }
            6 => Ok(Color::rgb(
                channel(&digits[0..2])?,
                channel(&digits[2..4])?,
                channel(&digits[4..6])?,
            )),
            8 => Ok(Color::rgba(
                channel(&digits[0..2])?,
                channel(&digits[2..4])?,
                channel(&digits[4..6])?,
                channel(&digits[6..8])?,
            )),
            _ => Err(err()),
        }
    }

    pub fn to_hex(&self) -> String {
        if self.a == 255 {
            format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
        } else {
            format!("#{:02x}{:02x}{:02x}{:02x}", self.r, self.g, self.b, self.a)
        }
    }

    fn channels(&self) -> [f64; 3] {
        [
            self.r as f64 / 255.0,
            self.g as f64 / 255.0,
            self.b as f64 / 255.0,
        ]
    }

    fn from_channels(c: [f64; 3], alpha: f64) -> Self {
        let to_u8 = |v: f64| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
        Color::rgba(to_u8(c[0]), to_u8(c[1]), to_u8(c[2]), to_u8(alpha))
    }

    /// Blends towards `other` in `space`.
    ///
    /// A `NONE` endpoint borrows the other endpoint's hue so the blend is a
    /// pure fade instead of passing through black.
    pub fn interpolate(&self, other: &Color, t: f64, space: ColorSpace) -> Color {
        if self == other {
            return *self;
        }
        let (from, to) = match (self.is_none(), other.is_none()) {
            (true, false) => (Color { a: 0, ..*other }, *other),
            (false, true) => (*self, Color { a: 0, ..*self }),
            _ => (*self, *other),
        };
        let alpha = lerp(from.a as f64, to.a as f64, t) / 255.0;
        let (a, b) = (from.channels(), to.channels());
        let rgb = match space {
            ColorSpace::Rgb => lerp3(a, b, t),
            ColorSpace::LinearRgb => {
                let mixed = lerp3(a.map(srgb_to_linear), b.map(srgb_to_linear), t);
                mixed.map(linear_to_srgb)
            }
            ColorSpace::Hsv => hsv_to_rgb(lerp_hue_triplet(rgb_to_hsv(a), rgb_to_hsv(b), t, 0)),
            ColorSpace::Lab => lab_to_rgb(lerp3(rgb_to_lab(a), rgb_to_lab(b), t)),
            ColorSpace::Lch => {
                let mixed = lerp_hue_triplet(lab_to_lch(rgb_to_lab(a)), lab_to_lch(rgb_to_lab(b)), t, 2);
                lab_to_rgb(lch_to_lab(mixed))
            }
        };
        Color::from_channels(rgb, alpha)
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl Serialize for Color {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

// Accepts "#rrggbb" strings or [r, g, b(, a)] arrays.
impl<'de> Deserialize<'de> for Color {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct ColorVisitor;
        impl<'de> serde::de::Visitor<'de> for ColorVisitor {
            type Value = Color;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("a hex color string or an [r, g, b, a] array")
            }

            fn visit_str<E: serde::de::Error>(self, v: &str) -> Result<Color, E> {
                Color::from_hex(v).map_err(E::custom)
            }

            fn visit_seq<A>(self, mut seq: A) -> Result<Color, A::Error>
            where
                A: SeqAccess<'de>,
            {
                let mut c = [0u8, 0, 0, 255];
                for (i, slot) in c.iter_mut().enumerate() {
                    match seq.next_element::<u8>()? {
                        Some(v) => *slot = v,
                        None if i >= 3 => break,
                        None => return Err(serde::de::Error::invalid_length(i, &self)),
                    }
                }
                Ok(Color::rgba(c[0], c[1], c[2], c[3]))
            }
        }
        deserializer.deserialize_any(ColorVisitor)
    }
}

fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}

fn lerp3(a: [f64; 3], b: [f64; 3], t: f64) -> [f64; 3] {
    [lerp(a[0], b[0], t), lerp(a[1], b[1], t), lerp(a[2], b[2], t)]
}

/// Interpolates a triplet whose component `hue` is an angle in degrees and
/// whose middle component is saturation or chroma. The hue of an achromatic
/// endpoint is undefined, so the other endpoint's is used.
fn lerp_hue_triplet(a: [f64; 3], b: [f64; 3], t: f64, hue: usize) -> [f64; 3] {
    let (mut ha, mut hb) = (a[hue], b[hue]);
    if a[1] < 1e-6 {
        ha = hb;
    }
    if b[1] < 1e-6 {
        hb = ha;
    }
    let mut diff = (hb - ha).rem_euclid(360.0);
    if diff > 180.0 {
        diff -= 360.0;
    }
    let mut out = lerp3(a, b, t);
    out[hue] = (ha + diff * t).rem_euclid(360.0);
    out
}

fn srgb_to_linear(c: f64) -> f64 {
    if c <= 0.04045 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}

fn linear_to_srgb(c: f64) -> f64 {
    let c = c.max(0.0);
    if c <= 0.003_130_8 {
        c * 12.92
    } else {
        1.055 * c.powf(1.0 / 2.4) - 0.055
    }
}

/// Returns (hue degrees, saturation, value).
fn rgb_to_hsv([r, g, b]: [f64; 3]) -> [f64; 3] {
    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let delta = max - min;
    let hue = if delta == 0.0 {
        0.0
    } else if max == r {
        60.0 * ((g - b) / delta).rem_euclid(6.0)
    } else if max == g {
        60.0 * ((b - r) / delta + 2.0)
    } else {
        60.0 * ((r - g) / delta + 4.0)
    };
    let saturation = if max == 0.0 { 0.0 } else { delta / max };
    [hue, saturation, max]
}

fn hsv_to_rgb([h, s, v]: [f64; 3]) -> [f64; 3] {
    let c = v * s;
    let h = h.rem_euclid(360.0) / 60.0;
    let x = c * (1.0 - (h % 2.0 - 1.0).abs());
    let (r, g, b) = match h as u32 {
        0 => (c, x, 0.0),
        1 => (x, c, 0.0),
        2 => (0.0, c, x),
        3 => (0.0, x, c),
        4 => (x, 0.0, c),
        _ => (c, 0.0, x),
    };
    let m = v - c;
    [r + m, g + m, b + m]
}

// D65 reference white.
const WHITE_X: f64 = 0.950_47;
const WHITE_Y: f64 = 1.0;
const WHITE_Z: f64 = 1.088_83;
const DELTA: f64 = 6.0 / 29.0;

fn lab_f(t: f64) -> f64 {
    if t > DELTA.powi(3) {
        t.cbrt()
    } else {
        t / (3.0 * DELTA * DELTA) + 4.0 / 29.0
    }
}

fn lab_f_inv(t: f64) -> f64 {
    if t > DELTA {
        t.powi(3)
    } else {
        3.0 * DELTA * DELTA * (t - 4.0 / 29.0)
    }
}

fn rgb_to_lab(rgb: [f64; 3]) -> [f64; 3] {
    let [r, g, b] = rgb.map(srgb_to_linear);
    let x = 0.412_456_4 * r + 0.357_576_1 * g + 0.180_437_5 * b;
    let y = 0.212_672_9 * r + 0.715_152_2 * g + 0.072_175_0 * b;
    let z = 0.019_333_9 * r + 0.119_192_0 * g + 0.950_304_1 * b;
    let (fx, fy, fz) = (lab_f(x / WHITE_X), lab_f(y / WHITE_Y), lab_f(z / WHITE_Z));
    [116.0 * fy - 16.0, 500.0 * (fx - fy), 200.0 * (fy - fz)]
}

fn lab_to_rgb([l, a, b]: [f64; 3]) -> [f64; 3] {
    let fy = (l + 16.0) / 116.0;
    let fx = fy + a / 500.0;
    let fz = fy - b / 200.0;
    let (x, y, z) = (
        WHITE_X * lab_f_inv(fx),
        WHITE_Y * lab_f_inv(fy),
        WHITE_Z * lab_f_inv(fz),
    );
    let r = 3.240_454_2 * x - 1.537_138_5 * y - 0.498_531_4 * z;
    let g = -0.969_266_0 * x + 1.876_010_8 * y + 0.041_556_0 * z;
    let b = 0.055_643_4 * x - 0.204_025_9 * y + 1.057_225_2 * z;
    [r, g, b].map(linear_to_srgb)
}

/// Returns (lightness, chroma, hue degrees).
fn lab_to_lch([l, a, b]: [f64; 3]) -> [f64; 3] {
    [l, a.hypot(b), b.atan2(a).to_degrees().rem_euclid(360.0)]
}

fn lch_to_lab([l, c, h]: [f64; 3]) -> [f64; 3] {
    let (sin, cos) = h.to_radians().sin_cos();
    [l, c * cos, c * sin]
}
