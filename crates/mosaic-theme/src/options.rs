#![forbid(unsafe_code)]

//! Theme preference snapshot and its partial (persisted) form.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Light or dark surfaces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Appearance {
    #[default]
    Light,
    Dark,
}

impl Appearance {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Dark => "dark",
        }
    }

    /// The other appearance.
    #[must_use]
    pub const fn toggled(self) -> Self {
        match self {
            Self::Light => Self::Dark,
            Self::Dark => Self::Light,
        }
    }

    #[must_use]
    pub const fn is_dark(self) -> bool {
        matches!(self, Self::Dark)
    }
}

/// Brand accent hue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Accent {
    #[default]
    Indigo,
    Azure,
    Violet,
    Emerald,
    Amber,
    Rose,
    Neutral,
}

impl Accent {
    pub const ALL: [Accent; 7] = [
        Self::Indigo,
        Self::Azure,
        Self::Violet,
        Self::Emerald,
        Self::Amber,
        Self::Rose,
        Self::Neutral,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Indigo => "indigo",
            Self::Azure => "azure",
            Self::Violet => "violet",
            Self::Emerald => "emerald",
            Self::Amber => "amber",
            Self::Rose => "rose",
            Self::Neutral => "neutral",
        }
    }
}

/// Color-vision accommodation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorVision {
    #[default]
    Normal,
    Protanopia,
    Deuteranopia,
    Tritanopia,
    Achromatopsia,
}

impl ColorVision {
    pub const ALL: [ColorVision; 5] = [
        Self::Normal,
        Self::Protanopia,
        Self::Deuteranopia,
        Self::Tritanopia,
        Self::Achromatopsia,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Normal => "normal",
            Self::Protanopia => "protanopia",
            Self::Deuteranopia => "deuteranopia",
            Self::Tritanopia => "tritanopia",
            Self::Achromatopsia => "achromatopsia",
        }
    }
}

macro_rules! impl_display_as_str {
    ($($ty:ty),*) => {
        $(impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        })*
    };
}

impl_display_as_str!(Appearance, Accent, ColorVision);

/// The five user-facing theme preferences.
///
/// Serializes as the persisted record: camelCase keys, lower-case values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThemeOptions {
    pub appearance: Appearance,
    pub accent: Accent,
    pub color_vision: ColorVision,
    pub high_contrast: bool,
    pub reduced_motion: bool,
}

impl ThemeOptions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn appearance(mut self, appearance: Appearance) -> Self {
        self.appearance = appearance;
        self
    }

    #[must_use]
    pub fn accent(mut self, accent: Accent) -> Self {
        self.accent = accent;
        self
    }

    #[must_use]
    pub fn color_vision(mut self, mode: ColorVision) -> Self {
        self.color_vision = mode;
        self
    }

    #[must_use]
    pub fn high_contrast(mut self, on: bool) -> Self {
        self.high_contrast = on;
        self
    }

    #[must_use]
    pub fn reduced_motion(mut self, on: bool) -> Self {
        self.reduced_motion = on;
        self
    }

    /// Overlay every field `overrides` sets.
    #[must_use]
    pub fn merged(self, overrides: &PartialThemeOptions) -> Self {
        Self {
            appearance: overrides.appearance.unwrap_or(self.appearance),
            accent: overrides.accent.unwrap_or(self.accent),
            color_vision: overrides.color_vision.unwrap_or(self.color_vision),
            high_contrast: overrides.high_contrast.unwrap_or(self.high_contrast),
            reduced_motion: overrides.reduced_motion.unwrap_or(self.reduced_motion),
        }
    }
}

/// [`ThemeOptions`] with every field optional.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PartialThemeOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub appearance: Option<Appearance>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub accent: Option<Accent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color_vision: Option<ColorVision>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub high_contrast: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reduced_motion: Option<bool>,
}

impl PartialThemeOptions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn appearance(mut self, appearance: Appearance) -> Self {
        self.appearance = Some(appearance);
        self
    }

    #[must_use]
    pub fn accent(mut self, accent: Accent) -> Self {
        self.accent = Some(accent);
        self
    }

    #[must_use]
    pub fn color_vision(mut self, mode: ColorVision) -> Self {
        self.color_vision = Some(mode);
        self
    }

    #[must_use]
    pub fn high_contrast(mut self, on: bool) -> Self {
        self.high_contrast = Some(on);
        self
    }

    #[must_use]
    pub fn reduced_motion(mut self, on: bool) -> Self {
        self.reduced_motion = Some(on);
        self
    }

    /// Whether no field is set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

impl From<ThemeOptions> for PartialThemeOptions {
    fn from(o: ThemeOptions) -> Self {
        Self {
            appearance: Some(o.appearance),
            accent: Some(o.accent),
            color_vision: Some(o.color_vision),
            high_contrast: Some(o.high_contrast),
            reduced_motion: Some(o.reduced_motion),
        }
    }
}
