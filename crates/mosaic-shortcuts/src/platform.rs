#![forbid(unsafe_code)]

//! Host platform detection for combo expansion and display.

use std::fmt;

/// Which modifier conventions apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Platform {
    /// macOS and iOS: `mod` displays as ⌘, modifiers as symbols.
    Mac,
    /// Everything else: `mod` displays as Ctrl, modifiers as words.
    #[default]
    Other,
}

impl Platform {
    /// Classify a host platform string (`navigator.platform`,
    /// `std::env::consts::OS`, a user agent fragment, ...).
    ///
    /// Anything containing `mac`, `iphone`, `ipad` or `ipod` (any case) is
    /// [`Platform::Mac`].
    #[must_use]
    pub fn detect(platform: &str) -> Self {
        let lower = platform.to_ascii_lowercase();
        if ["mac", "iphone", "ipad", "ipod"]
            .iter()
            .any(|needle| lower.contains(needle))
        {
            Self::Mac
        } else {
            Self::Other
        }
    }

    /// The platform this binary was compiled for.
    #[must_use]
    pub fn current() -> Self {
        if cfg!(any(target_os = "macos", target_os = "ios")) {
            Self::Mac
        } else {
            Self::Other
        }
    }

    #[must_use]
    pub const fn is_mac(self) -> bool {
        matches!(self, Self::Mac)
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Mac => "mac",
            Self::Other => "other",
        })
    }
}
