#![forbid(unsafe_code)]

//! Color parsing, mixing, and WCAG contrast utilities.
//!
//! All arithmetic is done on 8-bit sRGB channels. Every mix rounds back to an
//! integer channel, so repeated mixing (as in [`ensure_contrast`]) walks the
//! same lattice a hex round-trip would.
//!
//! # Invariants
//!
//! - `contrast_ratio(a, b) == contrast_ratio(b, a)` and is always in `[1, 21]`.
//! - `mix(c, x, 0.0) == c` for any `x`.
//! - [`ensure_contrast`] never fails; it returns its best effort after at most
//!   [`MAX_CONTRAST_ATTEMPTS`] steps.

use std::fmt;
use std::str::FromStr;

/// Upper bound on the mixing steps [`ensure_contrast`] will take.
pub const MAX_CONTRAST_ATTEMPTS: u32 = 12;

/// Fraction mixed toward white or black on each contrast step.
const CONTRAST_STEP: f64 = 0.1;

/// RGB color (opaque).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgb {
    /// Red channel (0–255).
    pub r: u8,
    /// Green channel (0–255).
    pub g: u8,
    /// Blue channel (0–255).
    pub b: u8,
}

impl Rgb {
    pub const WHITE: Rgb = Rgb::new(255, 255, 255);
    pub const BLACK: Rgb = Rgb::new(0, 0, 0);

    /// Create a new RGB color.
    #[must_use]
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parse `#rgb`, `rgb`, `#rrggbb` or `rrggbb`.
    pub fn from_hex(hex: &str) -> Result<Self, ColorParseError> {
        let digits = hex.strip_prefix('#').unwrap_or(hex);
        if let Some(bad) = digits.chars().find(|c| !c.is_ascii_hexdigit()) {
            return Err(ColorParseError::InvalidDigit(bad));
        }
        // All digits are ASCII from here on, so byte slicing is safe.
        let channel = |s: &str| u8::from_str_radix(s, 16).map_err(|_| ColorParseError::Length(digits.len()));
        match digits.len() {
            3 => {
                let b = digits.as_bytes();
                let expand = |d: u8| -> Result<u8, ColorParseError> {
                    let v = (d as char).to_digit(16).ok_or(ColorParseError::InvalidDigit(d as char))?;
                    Ok((v * 17) as u8)
                };
                Ok(Self::new(expand(b[0])?, expand(b[1])?, expand(b[2])?))
            }
            6 => Ok(Self::new(
                channel(&digits[0..2])?,
                channel(&digits[2..4])?,
                channel(&digits[4..6])?,
            )),
            n => Err(ColorParseError::Length(n)),
        }
    }

    /// Lower-case `#rrggbb`.
    #[must_use]
    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    /// Build from floating-point channels, rounding and clamping each to 0–255.
    #[must_use]
    pub fn from_f64(r: f64, g: f64, b: f64) -> Self {
        let q = |v: f64| v.round().clamp(0.0, 255.0) as u8;
        Self::new(q(r), q(g), q(b))
    }

    /// WCAG 2.x relative luminance in `[0, 1]`.
    #[must_use]
    pub fn relative_luminance(self) -> f64 {
        relative_luminance(self)
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl FromStr for Rgb {
    type Err = ColorParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

/// A malformed hex color literal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColorParseError {
    /// Digit count other than 3 or 6.
    Length(usize),
    /// A non-hexadecimal character.
    InvalidDigit(char),
}

impl fmt::Display for ColorParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColorParseError::Length(n) => write!(f, "expected 3 or 6 hex digits, got {n}"),
            ColorParseError::InvalidDigit(c) => write!(f, "invalid hex digit {c:?}"),
        }
    }
}

impl std::error::Error for ColorParseError {}

// ---------------------------------------------------------------------------
// Mixing
// ---------------------------------------------------------------------------

/// Per-channel `fg * (1 - w) + bg * w`, with `w` clamped to `[0, 1]`.
#[must_use]
pub fn mix(fg: Rgb, bg: Rgb, weight: f64) -> Rgb {
    let w = if weight.is_nan() { 0.0 } else { weight.clamp(0.0, 1.0) };
    let ch = |from: u8, to: u8| f64::from(from) * (1.0 - w) + f64::from(to) * w;
    Rgb::from_f64(ch(fg.r, bg.r), ch(fg.g, bg.g), ch(fg.b, bg.b))
}

/// Mix toward white.
#[must_use]
pub fn lighten(color: Rgb, amount: f64) -> Rgb {
    mix(color, Rgb::WHITE, amount)
}

/// Mix toward black.
#[must_use]
pub fn darken(color: Rgb, amount: f64) -> Rgb {
    mix(color, Rgb::BLACK, amount)
}

// ---------------------------------------------------------------------------
// Contrast
// ---------------------------------------------------------------------------

fn srgb_to_linear(c: f64) -> f64 {
    if c <= 0.03928 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}

/// WCAG 2.x relative luminance.
#[must_use]
pub fn relative_luminance(color: Rgb) -> f64 {
    let r = srgb_to_linear(f64::from(color.r) / 255.0);
    let g = srgb_to_linear(f64::from(color.g) / 255.0);
    let b = srgb_to_linear(f64::from(color.b) / 255.0);
    0.2126 * r + 0.7152 * g + 0.0722 * b
}

/// `(lighter + 0.05) / (darker + 0.05)`.
#[must_use]
pub fn contrast_ratio(a: Rgb, b: Rgb) -> f64 {
    let la = relative_luminance(a);
    let lb = relative_luminance(b);
    let (lighter, darker) = if la > lb { (la, lb) } else { (lb, la) };
    (lighter + 0.05) / (darker + 0.05)
}

/// Result of a contrast adjustment.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContrastOutcome {
    /// The adjusted foreground.
    pub color: Rgb,
    /// Contrast of `color` against the background.
    pub ratio: f64,
    /// Mixing steps taken (0 when the input already met the target).
    pub attempts: u32,
    /// Whether `ratio >= target`.
    pub met: bool,
}

/// Push `fg` toward white (dark backgrounds) or black (light backgrounds)
/// until it reaches `target` contrast against `bg`, reporting what happened.
#[must_use]
pub fn ensure_contrast_report(fg: Rgb, bg: Rgb, target: f64) -> ContrastOutcome {
    let mut current = fg;
    let mut ratio = contrast_ratio(current, bg);
    let mut attempts = 0;
    if ratio < target {
        let direction = if relative_luminance(bg) <= 0.5 {
            Rgb::WHITE
        } else {
            Rgb::BLACK
        };
        while ratio < target && attempts < MAX_CONTRAST_ATTEMPTS {
            current = mix(current, direction, CONTRAST_STEP);
            ratio = contrast_ratio(current, bg);
            attempts += 1;
        }
    }
    ContrastOutcome {
        color: current,
        ratio,
        attempts,
        met: ratio >= target,
    }
}

/// Best-effort contrast enforcement; see [`ensure_contrast_report`].
#[must_use]
pub fn ensure_contrast(fg: Rgb, bg: Rgb, target: f64) -> Rgb {
    ensure_contrast_report(fg, bg, target).color
}
