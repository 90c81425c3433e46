use std::fmt;

use serde::{Deserialize, Serialize};

use crate::color::named;

/// RGBA color with `r`, `g`, `b` premultiplied by `a`; all channels in `[0, 1]`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
    /// Red channel premultiplied by alpha.
    pub r: f64,
    /// Green channel premultiplied by alpha.
    pub g: f64,
    /// Blue channel premultiplied by alpha.
    pub b: f64,
    /// Alpha channel.
    pub a: f64,
}

impl Color {
    /// Opaque black.
    pub const BLACK: Self = Self::new(0.0, 0.0, 0.0, 1.0);
    /// Opaque white.
    pub const WHITE: Self = Self::new(1.0, 1.0, 1.0, 1.0);
    /// Fully transparent black.
    pub const TRANSPARENT: Self = Self::new(0.0, 0.0, 0.0, 0.0);

    /// Build from channels that are already premultiplied.
    pub const fn new(r: f64, g: f64, b: f64, a: f64) -> Self {
        Self { r, g, b, a }
    }

    /// Build from straight-alpha channels in `[0, 1]`.
    pub fn from_straight(r: f64, g: f64, b: f64, a: f64) -> Self {
        Self::new(r * a, g * a, b * a, a)
    }

    /// Build from straight-alpha `0..=255` color channels and `[0, 1]` alpha.
    pub fn from_rgba255(r: f64, g: f64, b: f64, a: f64) -> Self {
        Self::from_straight(r / 255.0, g / 255.0, b / 255.0, a)
    }

    /// Parse a CSS color string (named, `#rgb`, `#rrggbb`, `rgb[a](..)`, `hsl[a](..)`).
    ///
    /// Returns `None` when the string is not a recognizable color.
    pub fn parse(input: &str) -> Option<Self> {
        let [r, g, b, a] = parse_css_color(input)?;
        Some(Self::from_rgba255(r, g, b, a))
    }

    /// Straight-alpha channels: `[r, g, b]` in `0..=255` plus alpha in `[0, 1]`.
    pub fn to_rgba_array(self) -> [f64; 4] {
        if self.a == 0.0 {
            return [0.0, 0.0, 0.0, 0.0];
        }
        [
            self.r * 255.0 / self.a,
            self.g * 255.0 / self.a,
            self.b * 255.0 / self.a,
            self.a,
        ]
    }

    /// Straight-alpha channels, each in `[0, 1]`.
    pub(crate) fn to_straight(self) -> [f64; 4] {
        if self.a == 0.0 {
            return [0.0, 0.0, 0.0, 0.0];
        }
        [self.r / self.a, self.g / self.a, self.b / self.a, self.a]
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [r, g, b, a] = self.to_rgba_array();
        write!(
            f,
            "rgba({},{},{},{})",
            r.round(),
            g.round(),
            b.round(),
            crate::expression::value::format_number(a)
        )
    }
}

impl Serialize for Color {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Color {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Self::parse(&s)
            .ok_or_else(|| serde::de::Error::custom(format!("could not parse color \"{s}\"")))
    }
}

/// Parse into straight-alpha `[r, g, b]` in `0..=255` plus alpha in `[0, 1]`.
fn parse_css_color(input: &str) -> Option<[f64; 4]> {
    let s: String = input
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_ascii_lowercase();

    if let Some(rgba) = named::lookup(&s) {
        return Some(rgba);
    }

    if let Some(hex) = s.strip_prefix('#') {
        return parse_hex(hex);
    }

    let open = s.find('(')?;
    let body = s[open + 1..].strip_suffix(')')?;
    let params: Vec<&str> = body.split(',').collect();

    match &s[..open] {
        "rgba" => {
            let [r, g, b, a] = params.as_slice() else {
                return None;
            };
            Some([css_byte(r)?, css_byte(g)?, css_byte(b)?, css_unit(a)?])
        }
        "rgb" => {
            let [r, g, b] = params.as_slice() else {
                return None;
            };
            Some([css_byte(r)?, css_byte(g)?, css_byte(b)?, 1.0])
        }
        "hsla" => {
            let [h, sat, l, a] = params.as_slice() else {
                return None;
            };
            hsl_to_rgb255(h, sat, l, css_unit(a)?)
        }
        "hsl" => {
            let [h, sat, l] = params.as_slice() else {
                return None;
            };
            hsl_to_rgb255(h, sat, l, 1.0)
        }
        _ => None,
    }
}

fn parse_hex(hex: &str) -> Option<[f64; 4]> {
    if !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    match hex.len() {
        3 => {
            let v = u32::from_str_radix(hex, 16).ok()?;
            let expand = |n: u32| f64::from((n << 4) | n);
            Some([
                expand((v >> 8) & 0xf),
                expand((v >> 4) & 0xf),
                expand(v & 0xf),
                1.0,
            ])
        }
        6 => {
            let v = u32::from_str_radix(hex, 16).ok()?;
            Some([
                f64::from((v >> 16) & 0xff),
                f64::from((v >> 8) & 0xff),
                f64::from(v & 0xff),
                1.0,
            ])
        }
        _ => None,
    }
}

fn clamp_byte(v: f64) -> f64 {
    v.round().clamp(0.0, 255.0)
}

/// Integer channel or percentage, clamped to `0..=255`.
fn css_byte(s: &str) -> Option<f64> {
    if let Some(pct) = s.strip_suffix('%') {
        let v: f64 = pct.parse().ok()?;
        return Some(clamp_byte(v / 100.0 * 255.0));
    }
    let v: f64 = s.parse().ok()?;
    Some(clamp_byte(v.trunc()))
}

/// Float or percentage, clamped to `[0, 1]`.
fn css_unit(s: &str) -> Option<f64> {
    let v = match s.strip_suffix('%') {
        Some(pct) => pct.parse::<f64>().ok()? / 100.0,
        None => s.parse::<f64>().ok()?,
    };
    Some(v.clamp(0.0, 1.0))
}

fn hsl_to_rgb255(h: &str, s: &str, l: &str, alpha: f64) -> Option<[f64; 4]> {
    let h: f64 = h.parse().ok()?;
    let h = ((h % 360.0) + 360.0) % 360.0 / 360.0;
    let s = css_unit(s)?;
    let l = css_unit(l)?;

    let m2 = if l <= 0.5 { l * (s + 1.0) } else { l + s - l * s };
    let m1 = l * 2.0 - m2;

    fn hue_to_rgb(m1: f64, m2: f64, mut h: f64) -> f64 {
        if h < 0.0 {
            h += 1.0;
        } else if h > 1.0 {
            h -= 1.0;
        }
        if h * 6.0 < 1.0 {
            return m1 + (m2 - m1) * h * 6.0;
        }
        if h * 2.0 < 1.0 {
            return m2;
        }
        if h * 3.0 < 2.0 {
            return m1 + (m2 - m1) * (2.0 / 3.0 - h) * 6.0;
        }
        m1
    }

    Some([
        clamp_byte(hue_to_rgb(m1, m2, h + 1.0 / 3.0) * 255.0),
        clamp_byte(hue_to_rgb(m1, m2, h) * 255.0),
        clamp_byte(hue_to_rgb(m1, m2, h - 1.0 / 3.0) * 255.0),
        alpha,
    ])
}

#[cfg(test)]
#[path = "../../tests/unit/color/rgba.rs"]
mod tests;
