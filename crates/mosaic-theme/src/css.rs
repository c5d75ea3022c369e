#![forbid(unsafe_code)]

//! Token ↔ CSS custom-property mapping.
//!
//! Token `X` is published as `--mosaic-X`. These names are a stable external
//! contract; stylesheets reference them through [`token_var`].

use std::fmt::Write as _;

use crate::options::ThemeOptions;
use crate::tokens::{ThemeTokens, TokenName};

/// Prefix shared by every custom property.
pub const VAR_PREFIX: &str = "--mosaic-";

/// `--mosaic-<name>`.
#[must_use]
pub fn css_var_name(name: TokenName) -> String {
    format!("{VAR_PREFIX}{}", name.as_str())
}

/// `var(--mosaic-<name>)`.
#[must_use]
pub fn token_var(name: TokenName) -> String {
    format!("var({VAR_PREFIX}{})", name.as_str())
}

/// `(--mosaic-<name>, value)` for every token, in token order.
#[must_use]
pub fn css_variables(tokens: &ThemeTokens) -> Vec<(String, String)> {
    tokens
        .iter()
        .map(|(name, value)| (css_var_name(name), value.to_owned()))
        .collect()
}

/// A `:root { … }` block declaring the color scheme and every variable.
#[must_use]
pub fn css_text(options: &ThemeOptions, tokens: &ThemeTokens) -> String {
    let mut out = String::with_capacity(4096);
    out.push_str(":root {\n");
    let _ = writeln!(out, "  color-scheme: {};", options.appearance);
    for (name, value) in tokens.iter() {
        let _ = writeln!(out, "  {VAR_PREFIX}{name}: {value};");
    }
    out.push('}');
    out
}

/// Attributes the host sets on the document root so stylesheets can branch
/// on preferences.
#[must_use]
pub fn root_attributes(options: &ThemeOptions) -> [(&'static str, String); 4] {
    let flag = |on: bool| if on { "true" } else { "false" }.to_owned();
    [
        ("data-mosaic-theme", options.appearance.as_str().to_owned()),
        (
            "data-mosaic-color-vision",
            options.color_vision.as_str().to_owned(),
        ),
        ("data-mosaic-high-contrast", flag(options.high_contrast)),
        ("data-mosaic-reduced-motion", flag(options.reduced_motion)),
    ]
}
