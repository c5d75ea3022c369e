#![forbid(unsafe_code)]

//! Theming for Mosaic: color math, token derivation, CSS mapping and the
//! persisted, system-aware [`ThemeStore`].
//!
//! ```
//! use mosaic_theme::{ThemeOptions, TokenName, build_tokens};
//!
//! let tokens = build_tokens(&ThemeOptions::default());
//! assert_eq!(tokens.get(TokenName::ColorBackground), "#f5f6fa");
//! ```

pub mod color;
pub mod css;
pub mod options;
pub mod persistence;
pub mod preferences;
pub mod store;
pub mod tokens;

pub use color::{
    ColorParseError, ContrastOutcome, MAX_CONTRAST_ATTEMPTS, Rgb, contrast_ratio, darken,
    ensure_contrast, ensure_contrast_report, lighten, mix, relative_luminance,
};
pub use css::{css_text, css_var_name, css_variables, root_attributes, token_var};
pub use options::{Accent, Appearance, ColorVision, PartialThemeOptions, ThemeOptions};
pub use persistence::{
    FileStorage, MemoryStorage, NoStorage, StorageBackend, StorageError, StorageResult,
};
pub use preferences::{
    PreferenceCallback, PreferenceSource, StaticPreferences, SystemPreference,
    TerminalPreferences, WatchGuard,
};
pub use store::{Subscription, ThemeStore, ThemeStoreConfig};
pub use tokens::{ThemeTokens, TokenName, UnknownTokenError, build_tokens};
