//! CSS color parsing and contrast evaluation.
//!
//! DESIGN
//! ======
//! Parsing happens in two steps. The grammar turns an expression into a
//! [`ColorModel`] (whatever model the syntax names), then conversion keeps
//! only the models this widget can use: RGB as-is and HSL through the
//! standard transform. Recognized-but-unsupported models (`hwb()`) and
//! syntax errors both come out as `None`; callers substitute their own
//! defaults and nothing is ever surfaced as an error.

pub mod contrast;
mod named;

pub use contrast::{ContrastEvaluator, STROKE_CONTRAST_THRESHOLD, contrast_ratio, invert_color, relative_luminance};

use std::fmt;

// =============================================================================
// RGB
// =============================================================================

/// An sRGB color with 8-bit channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const BLACK: Self = Self::new(0, 0, 0);
    pub const WHITE: Self = Self::new(0xff, 0xff, 0xff);
    /// Panel background used until the host sends a style configuration.
    pub const DEFAULT_BACKGROUND: Self = Self::new(0x28, 0x28, 0x28);
    /// Text color used when a configured or per-user color does not parse.
    pub const DEFAULT_FOREGROUND: Self = Self::new(0xee, 0xee, 0xee);

    #[must_use]
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

/// Format as a lowercase `#rrggbb` CSS string.
#[must_use]
pub fn rgb_to_hex(rgb: Rgb) -> String {
    rgb.to_string()
}

// =============================================================================
// GRAMMAR
// =============================================================================

/// The color model an expression was written in.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ColorModel {
    Rgb(Rgb),
    /// Hue in degrees `[0, 360)`, saturation and lightness in `[0, 100]`.
    Hsl { h: f64, s: f64, l: f64 },
    /// Hue in degrees, whiteness and blackness in `[0, 100]`.
    Hwb { h: f64, w: f64, b: f64 },
}

/// Parse a CSS color expression into an RGB triple.
///
/// Accepts hex, named colors, `rgb()`/`rgba()` and `hsl()`/`hsla()`. Alpha is
/// accepted and discarded.
#[must_use]
pub fn parse_color(expr: &str) -> Option<Rgb> {
    match parse_model(expr)? {
        ColorModel::Rgb(rgb) => Some(rgb),
        ColorModel::Hsl { h, s, l } => Some(hsl_to_rgb(h, s, l)),
        ColorModel::Hwb { .. } => None,
    }
}

/// Parse an expression into whichever color model it is written in.
#[must_use]
pub fn parse_model(expr: &str) -> Option<ColorModel> {
    let expr = expr.trim();
    if let Some(hex) = expr.strip_prefix('#') {
        return parse_hex(hex).map(ColorModel::Rgb);
    }

    let lower = expr.to_ascii_lowercase();
    if lower == "transparent" {
        return Some(ColorModel::Rgb(Rgb::BLACK));
    }

    if let Some((name, args)) = split_function(&lower) {
        return match name {
            "rgb" | "rgba" => parse_rgb_args(args),
            "hsl" | "hsla" => parse_hsl_args(args),
            "hwb" => parse_hwb_args(args),
            _ => None,
        };
    }

    named::lookup(&lower).map(ColorModel::Rgb)
}

fn parse_hex(hex: &str) -> Option<Rgb> {
    fn digit(c: u8) -> Option<u8> {
        match c {
            b'0'..=b'9' => Some(c - b'0'),
            b'a'..=b'f' => Some(c - b'a' + 10),
            b'A'..=b'F' => Some(c - b'A' + 10),
            _ => None,
        }
    }

    fn byte(s: &[u8], i: usize) -> Option<u8> {
        Some((digit(s[i])? << 4) | digit(s[i + 1])?)
    }

    let bytes = hex.as_bytes();
    match bytes.len() {
        // #rgb and #rgba
        3 | 4 => {
            let r = digit(bytes[0])?;
            let g = digit(bytes[1])?;
            let b = digit(bytes[2])?;
            if bytes.len() == 4 {
                digit(bytes[3])?;
            }
            Some(Rgb::new((r << 4) | r, (g << 4) | g, (b << 4) | b))
        }
        // #rrggbb and #rrggbbaa
        6 | 8 => {
            let rgb = Rgb::new(byte(bytes, 0)?, byte(bytes, 2)?, byte(bytes, 4)?);
            if bytes.len() == 8 {
                byte(bytes, 6)?;
            }
            Some(rgb)
        }
        _ => None,
    }
}

/// Split `name(args)` into its name and argument text.
fn split_function(expr: &str) -> Option<(&str, &str)> {
    let open = expr.find('(')?;
    let args = expr[open + 1..].strip_suffix(')')?;
    Some((expr[..open].trim_end(), args))
}

/// Split function arguments into three components plus optional alpha.
///
/// Both the legacy comma form `a, b, c[, alpha]` and the space form
/// `a b c[ / alpha]` are accepted.
fn split_args(args: &str) -> Option<([&str; 3], Option<&str>)> {
    if args.contains(',') {
        let parts: Vec<&str> = args.split(',').map(str::trim).collect();
        return match parts.as_slice() {
            [a, b, c] => Some(([*a, *b, *c], None)),
            [a, b, c, alpha] => Some(([*a, *b, *c], Some(*alpha))),
            _ => None,
        };
    }

    let (channels, alpha) = match args.split_once('/') {
        Some((channels, alpha)) => (channels, Some(alpha.trim())),
        None => (args, None),
    };
    let parts: Vec<&str> = channels.split_whitespace().collect();
    match parts.as_slice() {
        [a, b, c] => Some(([*a, *b, *c], alpha)),
        _ => None,
    }
}

fn parse_rgb_args(args: &str) -> Option<ColorModel> {
    let ([r, g, b], alpha) = split_args(args)?;
    check_alpha(alpha)?;
    Some(ColorModel::Rgb(Rgb::new(rgb_channel(r)?, rgb_channel(g)?, rgb_channel(b)?)))
}

fn parse_hsl_args(args: &str) -> Option<ColorModel> {
    let ([h, s, l], alpha) = split_args(args)?;
    check_alpha(alpha)?;
    Some(ColorModel::Hsl { h: hue(h)?, s: percentage(s)?, l: percentage(l)? })
}

fn parse_hwb_args(args: &str) -> Option<ColorModel> {
    let ([h, w, b], alpha) = split_args(args)?;
    check_alpha(alpha)?;
    Some(ColorModel::Hwb { h: hue(h)?, w: percentage(w)?, b: percentage(b)? })
}

fn number(s: &str) -> Option<f64> {
    s.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// An rgb channel: `0..=255` or a percentage of 255.
fn rgb_channel(s: &str) -> Option<u8> {
    let value = match s.strip_suffix('%') {
        Some(pct) => number(pct)? / 100.0 * 255.0,
        None => number(s)?,
    };
    Some(to_channel(value))
}

/// Hue in degrees, normalized into `[0, 360)`.
fn hue(s: &str) -> Option<f64> {
    let degrees = if let Some(v) = s.strip_suffix("deg") {
        number(v)?
    } else if let Some(v) = s.strip_suffix("grad") {
        number(v)? * 0.9
    } else if let Some(v) = s.strip_suffix("rad") {
        number(v)?.to_degrees()
    } else if let Some(v) = s.strip_suffix("turn") {
        number(v)? * 360.0
    } else {
        number(s)?
    };
    Some(degrees.rem_euclid(360.0))
}

/// A percentage clamped to `[0, 100]`. The `%` sign is optional.
fn percentage(s: &str) -> Option<f64> {
    let v = number(s.strip_suffix('%').unwrap_or(s))?;
    Some(v.clamp(0.0, 100.0))
}

/// Validate an alpha component if present. Its value is not kept.
fn check_alpha(alpha: Option<&str>) -> Option<()> {
    match alpha {
        None => Some(()),
        Some(a) => number(a.strip_suffix('%').unwrap_or(a)).map(|_| ()),
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn to_channel(value: f64) -> u8 {
    value.round().clamp(0.0, 255.0) as u8
}

// =============================================================================
// CONVERSION
// =============================================================================

/// Standard HSL to RGB transform. `h` in degrees, `s` and `l` in percent.
#[must_use]
pub fn hsl_to_rgb(h: f64, s: f64, l: f64) -> Rgb {
    let h = h.rem_euclid(360.0) / 360.0;
    let s = s.clamp(0.0, 100.0) / 100.0;
    let l = l.clamp(0.0, 100.0) / 100.0;

    if s <= 0.0 {
        let v = to_channel(l * 255.0);
        return Rgb::new(v, v, v);
    }

    let t2 = if l < 0.5 { l * (1.0 + s) } else { l + s - l * s };
    let t1 = 2.0 * l - t2;

    let channel = |offset: f64| {
        let t3 = (h + offset).rem_euclid(1.0);
        let v = if 6.0 * t3 < 1.0 {
            t1 + (t2 - t1) * 6.0 * t3
        } else if 2.0 * t3 < 1.0 {
            t2
        } else if 3.0 * t3 < 2.0 {
            t1 + (t2 - t1) * (2.0 / 3.0 - t3) * 6.0
        } else {
            t1
        };
        to_channel(v * 255.0)
    };

    Rgb::new(channel(1.0 / 3.0), channel(0.0), channel(-1.0 / 3.0))
}

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;
