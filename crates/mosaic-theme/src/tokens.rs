#![forbid(unsafe_code)]

//! Theme token names and the derivation engine.
//!
//! [`build_tokens`] is a pure function from [`ThemeOptions`] to a total
//! [`ThemeTokens`] map. The pipeline:
//!
//! 1. Surface palette (light, dark, or their high-contrast variants).
//! 2. Accent and semantic hues, substituted per color-vision mode.
//! 3. Dark-mode lightening of semantic hues, then contrast enforcement against
//!    the page background.
//! 4. Soft/border/contrast variants via [`mix`](crate::color::mix).
//! 5. Achromatopsia and high-contrast passes.
//!
//! # Invariants
//!
//! - Every [`TokenName`] has a value; the map is never partial.
//! - Identical options always produce identical tokens.

use std::fmt;
use std::str::FromStr;

use crate::color::{Rgb, darken, ensure_contrast, lighten};
use crate::options::{Accent, Appearance, ColorVision, ThemeOptions};

macro_rules! token_names {
    ($($variant:ident => $name:literal,)*) => {
        /// One named design value. The string form is the external contract
        /// (`--mosaic-<name>` in CSS).
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub enum TokenName {
            $($variant,)*
        }

        impl TokenName {
            /// Every token, in output order.
            pub const ALL: [TokenName; TokenName::COUNT] = [$(TokenName::$variant,)*];

            /// The token's external name.
            #[must_use]
            pub const fn as_str(self) -> &'static str {
                match self {
                    $(TokenName::$variant => $name,)*
                }
            }
        }
    };
}

token_names! {
    ColorBackground => "color-background",
    ColorSurface => "color-surface",
    ColorSurfaceHover => "color-surface-hover",
    ColorSurfaceActive => "color-surface-active",
    ColorBorder => "color-border",
    ColorRing => "color-ring",
    ColorText => "color-text",
    ColorTextSubtle => "color-text-subtle",
    ColorTextMuted => "color-text-muted",
    ColorInverted => "color-inverted",
    ColorPrimary => "color-primary",
    ColorPrimaryContrast => "color-primary-contrast",
    ColorPrimarySoft => "color-primary-soft",
    ColorPrimaryBorder => "color-primary-border",
    ColorSuccess => "color-success",
    ColorSuccessContrast => "color-success-contrast",
    ColorSuccessSoft => "color-success-soft",
    ColorSuccessBorder => "color-success-border",
    ColorWarning => "color-warning",
    ColorWarningContrast => "color-warning-contrast",
    ColorWarningSoft => "color-warning-soft",
    ColorWarningBorder => "color-warning-border",
    ColorDanger => "color-danger",
    ColorDangerContrast => "color-danger-contrast",
    ColorDangerSoft => "color-danger-soft",
    ColorDangerBorder => "color-danger-border",
    ColorNeutral => "color-neutral",
    ColorNeutralContrast => "color-neutral-contrast",
    ColorNeutralSoft => "color-neutral-soft",
    ColorNeutralBorder => "color-neutral-border",
    FontFamilyBase => "font-family-base",
    FontFamilyMono => "font-family-mono",
    TextSizeXs => "text-size-xs",
    TextSizeSm => "text-size-sm",
    TextSizeMd => "text-size-md",
    TextSizeLg => "text-size-lg",
    TextSizeXl => "text-size-xl",
    TextSize2xl => "text-size-2xl",
    LineHeightTight => "line-height-tight",
    LineHeightNormal => "line-height-normal",
    LineHeightRelaxed => "line-height-relaxed",
    RadiusSm => "radius-sm",
    RadiusMd => "radius-md",
    RadiusLg => "radius-lg",
    ShadowSm => "shadow-sm",
    ShadowMd => "shadow-md",
    ShadowLg => "shadow-lg",
    BorderWidth => "border-width",
    MotionDuration => "motion-duration",
    MotionEase => "motion-ease",
    SpacingXs => "spacing-xs",
    SpacingSm => "spacing-sm",
    SpacingMd => "spacing-md",
    SpacingLg => "spacing-lg",
}

impl TokenName {
    /// Number of tokens.
    pub const COUNT: usize = 54;

    const fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for TokenName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A string that names no token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownTokenError(pub String);

impl fmt::Display for UnknownTokenError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown theme token {:?}", self.0)
    }
}

impl std::error::Error for UnknownTokenError {}

impl FromStr for TokenName {
    type Err = UnknownTokenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TokenName::ALL
            .iter()
            .copied()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| UnknownTokenError(s.to_owned()))
    }
}

/// Total mapping from [`TokenName`] to its value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThemeTokens {
    values: [String; TokenName::COUNT],
}

impl ThemeTokens {
    /// Value of one token.
    #[must_use]
    pub fn get(&self, name: TokenName) -> &str {
        &self.values[name.index()]
    }

    /// Parse a color token back into [`Rgb`]. `None` for non-color tokens.
    #[must_use]
    pub fn color(&self, name: TokenName) -> Option<Rgb> {
        Rgb::from_hex(self.get(name)).ok()
    }

    /// `(name, value)` pairs in output order.
    pub fn iter(&self) -> impl Iterator<Item = (TokenName, &str)> {
        TokenName::ALL.iter().map(move |&n| (n, self.get(n)))
    }
}

impl std::ops::Index<TokenName> for ThemeTokens {
    type Output = str;

    fn index(&self, name: TokenName) -> &str {
        self.get(name)
    }
}

// ---------------------------------------------------------------------------
// Palettes
// ---------------------------------------------------------------------------

const WHITE: Rgb = Rgb::WHITE;
const BLACK: Rgb = Rgb::BLACK;
const SLATE_900: Rgb = Rgb::new(0x0f, 0x17, 0x2a);
const SLATE_50: Rgb = Rgb::new(0xf8, 0xfa, 0xfc);

const SUCCESS: Rgb = Rgb::new(0x16, 0xa3, 0x4a);
const WARNING: Rgb = Rgb::new(0xf9, 0x73, 0x16);
const DANGER: Rgb = Rgb::new(0xdc, 0x26, 0x26);

const FONT_BASE: &str = "'Inter var', 'Inter', 'SF Pro Text', system-ui, -apple-system, BlinkMacSystemFont, 'Segoe UI', sans-serif";
const FONT_MONO: &str =
    "'JetBrains Mono', 'Fira Code', ui-monospace, SFMono-Regular, Menlo, monospace";
const NO_SHADOW: &str = "0 0 0 0 transparent";
const EASE_OUT: &str = "cubic-bezier(0.16, 1, 0.3, 1)";

fn accent_color(accent: Accent) -> Rgb {
    match accent {
        Accent::Indigo => Rgb::new(0x43, 0x38, 0xca),
        Accent::Azure => Rgb::new(0x1d, 0x4e, 0xd8),
        Accent::Violet => Rgb::new(0x6d, 0x28, 0xd9),
        Accent::Emerald => Rgb::new(0x04, 0x78, 0x57),
        Accent::Amber => Rgb::new(0xf5, 0x9e, 0x0b),
        Accent::Rose => Rgb::new(0xe1, 0x1d, 0x48),
        Accent::Neutral => Rgb::new(0x18, 0x18, 0x1b),
    }
}

/// Primary/success/warning/danger substitutes for a color-vision mode.
struct VisionHues {
    primary: Rgb,
    success: Rgb,
    warning: Rgb,
    danger: Rgb,
}

fn vision_hues(mode: ColorVision) -> Option<VisionHues> {
    let h = |p: u32, s: u32, w: u32, d: u32| VisionHues {
        primary: rgb24(p),
        success: rgb24(s),
        warning: rgb24(w),
        danger: rgb24(d),
    };
    match mode {
        ColorVision::Normal => None,
        ColorVision::Protanopia => Some(h(0x1f77b4, 0x1b9e77, 0xd95f02, 0x7570b3)),
        ColorVision::Deuteranopia => Some(h(0x386cb0, 0x2ca25f, 0xff7f00, 0x984ea3)),
        ColorVision::Tritanopia => Some(h(0x009e73, 0x56b4e9, 0xe69f00, 0xcc79a7)),
        ColorVision::Achromatopsia => Some(h(0x525252, 0x737373, 0x8c8c8c, 0x404040)),
    }
}

const fn rgb24(v: u32) -> Rgb {
    Rgb::new((v >> 16) as u8, (v >> 8) as u8, v as u8)
}

struct Surfaces {
    background: Rgb,
    surface: Rgb,
    hover: Rgb,
    active: Rgb,
    border: Rgb,
}

fn surfaces(appearance: Appearance, high_contrast: bool) -> Surfaces {
    match (appearance, high_contrast) {
        (Appearance::Light, false) => Surfaces {
            background: rgb24(0xf5f6fa),
            surface: rgb24(0xffffff),
            hover: rgb24(0xeef1f8),
            active: rgb24(0xe1e6f0),
            border: rgb24(0xd7deeb),
        },
        (Appearance::Dark, false) => Surfaces {
            background: rgb24(0x050b1c),
            surface: rgb24(0x0b1220),
            hover: rgb24(0x141d2e),
            active: rgb24(0x1d2739),
            border: rgb24(0x2a3448),
        },
        (Appearance::Light, true) => Surfaces {
            background: WHITE,
            surface: rgb24(0xf4f4f5),
            hover: rgb24(0xe4e4e7),
            active: rgb24(0xd4d4d8),
            border: BLACK,
        },
        (Appearance::Dark, true) => {
            let surface = rgb24(0x111111);
            Surfaces {
                background: BLACK,
                surface,
                hover: lighten(surface, 0.12),
                active: lighten(surface, 0.2),
                border: WHITE,
            }
        }
    }
}

/// One semantic family: base, readable foreground on it, tint and outline.
struct Family {
    base: Rgb,
    contrast: Rgb,
    soft: Rgb,
    border: Rgb,
}

/// Every derived color, after all passes.
struct Palette {
    surfaces: Surfaces,
    ring: Rgb,
    text: Rgb,
    text_subtle: Rgb,
    text_muted: Rgb,
    inverted: Rgb,
    primary: Family,
    success: Family,
    warning: Family,
    danger: Family,
    neutral: Family,
}

impl Palette {
    fn derive(o: &ThemeOptions) -> Self {
        let light = !o.appearance.is_dark();
        let hc = o.high_contrast;
        let pick = |l: Rgb, d: Rgb| if light { l } else { d };
        let soft = |c: Rgb| if light { lighten(c, 0.9) } else { darken(c, 0.55) };
        let outline = |c: Rgb| if light { lighten(c, 0.65) } else { darken(c, 0.35) };

        let surfaces = surfaces(o.appearance, hc);
        let bg = surfaces.background;
        let hues = vision_hues(o.color_vision);

        let accent = hues.as_ref().map_or(accent_color(o.accent), |h| h.primary);
        let primary = ensure_contrast(accent, bg, if hc { 6.5 } else { 4.5 });

        let semantic = |base: Rgb, dark_lift: f64| {
            let lifted = if light { base } else { lighten(base, dark_lift) };
            ensure_contrast(lifted, bg, if hc { 6.0 } else { 4.5 })
        };
        let success = semantic(hues.as_ref().map_or(SUCCESS, |h| h.success), 0.12);
        let warning = semantic(hues.as_ref().map_or(WARNING, |h| h.warning), 0.15);
        let danger = semantic(hues.as_ref().map_or(DANGER, |h| h.danger), 0.1);
        let neutral = pick(rgb24(0x1c2534), rgb24(0xc9d4f8));

        let fill_target = if hc { 6.5 } else { 4.5 };
        let on_fill = pick(SLATE_50, SLATE_900);

        let mut palette = Self {
            ring: ensure_contrast(
                if light { lighten(primary, 0.4) } else { darken(primary, 0.35) },
                bg,
                if hc { 7.0 } else { 5.0 },
            ),
            text: if hc {
                pick(BLACK, WHITE)
            } else {
                pick(SLATE_900, rgb24(0xe2e8f0))
            },
            text_subtle: pick(rgb24(0x64748b), rgb24(0xcbd5f5)),
            text_muted: pick(rgb24(0x475569), rgb24(0x94a3b8)),
            inverted: pick(rgb24(0x020817), SLATE_50),
            primary: Family {
                base: primary,
                contrast: ensure_contrast(pick(WHITE, SLATE_900), primary, if hc { 7.0 } else { 4.5 }),
                soft: if light { lighten(primary, 0.92) } else { darken(primary, 0.55) },
                border: outline(primary),
            },
            success: Family {
                base: success,
                contrast: ensure_contrast(on_fill, success, fill_target),
                soft: soft(success),
                border: outline(success),
            },
            warning: Family {
                base: warning,
                contrast: ensure_contrast(pick(SLATE_900, SLATE_50), warning, fill_target),
                soft: soft(warning),
                border: outline(warning),
            },
            danger: Family {
                base: danger,
                contrast: ensure_contrast(on_fill, danger, fill_target),
                soft: soft(danger),
                border: outline(danger),
            },
            neutral: Family {
                base: neutral,
                contrast: ensure_contrast(on_fill, neutral, if hc { 6.0 } else { 4.5 }),
                soft: soft(neutral),
                border: if light { lighten(neutral, 0.72) } else { darken(neutral, 0.5) },
            },
            surfaces,
        };

        // Greyscale hues are told apart by lightness alone.
        if o.color_vision == ColorVision::Achromatopsia {
            palette.primary.soft = lighten(primary, if light { 0.6 } else { 0.3 });
            palette.success.base = ensure_contrast(success, bg, 7.0);
            palette.warning.base = ensure_contrast(warning, bg, 7.0);
            palette.danger.base = ensure_contrast(danger, bg, 7.0);
        }
        palette
    }

    fn color(&self, name: TokenName) -> Option<Rgb> {
        use TokenName as T;
        let c = match name {
            T::ColorBackground => self.surfaces.background,
            T::ColorSurface => self.surfaces.surface,
            T::ColorSurfaceHover => self.surfaces.hover,
            T::ColorSurfaceActive => self.surfaces.active,
            T::ColorBorder => self.surfaces.border,
            T::ColorRing => self.ring,
            T::ColorText => self.text,
            T::ColorTextSubtle => self.text_subtle,
            T::ColorTextMuted => self.text_muted,
            T::ColorInverted => self.inverted,
            T::ColorPrimary => self.primary.base,
            T::ColorPrimaryContrast => self.primary.contrast,
            T::ColorPrimarySoft => self.primary.soft,
            T::ColorPrimaryBorder => self.primary.border,
            T::ColorSuccess => self.success.base,
            T::ColorSuccessContrast => self.success.contrast,
            T::ColorSuccessSoft => self.success.soft,
            T::ColorSuccessBorder => self.success.border,
            T::ColorWarning => self.warning.base,
            T::ColorWarningContrast => self.warning.contrast,
            T::ColorWarningSoft => self.warning.soft,
            T::ColorWarningBorder => self.warning.border,
            T::ColorDanger => self.danger.base,
            T::ColorDangerContrast => self.danger.contrast,
            T::ColorDangerSoft => self.danger.soft,
            T::ColorDangerBorder => self.danger.border,
            T::ColorNeutral => self.neutral.base,
            T::ColorNeutralContrast => self.neutral.contrast,
            T::ColorNeutralSoft => self.neutral.soft,
            T::ColorNeutralBorder => self.neutral.border,
            _ => return None,
        };
        Some(c)
    }
}

/// Non-color tokens.
fn scalar(name: TokenName, o: &ThemeOptions) -> &'static str {
    use TokenName as T;
    let light = !o.appearance.is_dark();
    let shadow = |l: &'static str, d: &'static str| {
        if o.high_contrast {
            NO_SHADOW
        } else if light {
            l
        } else {
            d
        }
    };
    match name {
        T::FontFamilyBase => FONT_BASE,
        T::FontFamilyMono => FONT_MONO,
        T::TextSizeXs => "0.75rem",
        T::TextSizeSm => "0.875rem",
        T::TextSizeMd => "1rem",
        T::TextSizeLg => "1.125rem",
        T::TextSizeXl => "1.25rem",
        T::TextSize2xl => "1.5rem",
        T::LineHeightTight => "1.2",
        T::LineHeightNormal => "1.5",
        T::LineHeightRelaxed => "1.7",
        T::RadiusSm => "0.25rem",
        T::RadiusMd => "0.375rem",
        T::RadiusLg => "0.5rem",
        T::ShadowSm => shadow("0 1px 0 rgba(15, 23, 42, 0.08)", "0 1px 0 rgba(2, 6, 23, 0.6)"),
        T::ShadowMd => shadow(
            "0 6px 12px -6px rgba(15, 23, 42, 0.16)",
            "0 6px 12px -6px rgba(2, 6, 23, 0.65)",
        ),
        T::ShadowLg => shadow(
            "0 18px 48px -24px rgba(15, 23, 42, 0.28)",
            "0 20px 52px -26px rgba(2, 6, 23, 0.7)",
        ),
        T::BorderWidth => {
            if o.high_contrast {
                "2px"
            } else {
                "1px"
            }
        }
        T::MotionDuration => {
            if o.reduced_motion {
                "0ms"
            } else {
                "180ms"
            }
        }
        T::MotionEase => {
            if o.reduced_motion {
                "linear"
            } else {
                EASE_OUT
            }
        }
        T::SpacingXs => "0.375rem",
        T::SpacingSm => "0.75rem",
        T::SpacingMd => "1.125rem",
        T::SpacingLg => "1.5rem",
        // Colors are handled by Palette::color.
        _ => "",
    }
}

/// Derive the full token set for `options`.
#[must_use]
pub fn build_tokens(options: &ThemeOptions) -> ThemeTokens {
    #[cfg(feature = "tracing")]
    let _span = tracing::debug_span!(
        "build_tokens",
        appearance = options.appearance.as_str(),
        accent = options.accent.as_str(),
        color_vision = options.color_vision.as_str(),
        high_contrast = options.high_contrast,
        reduced_motion = options.reduced_motion,
    )
    .entered();

    let palette = Palette::derive(options);
    ThemeTokens {
        values: std::array::from_fn(|i| {
            let name = TokenName::ALL[i];
            match palette.color(name) {
                Some(c) => c.to_hex(),
                None => scalar(name, options).to_owned(),
            }
        }),
    }
}
