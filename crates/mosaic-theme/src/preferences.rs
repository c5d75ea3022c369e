#![forbid(unsafe_code)]

//! Environment preference signals (dark mode, reduced motion, more contrast).
//!
//! A [`PreferenceSource`] answers "what does the system want right now?" and
//! optionally pushes changes. Hosts wire it to whatever they have: media
//! queries, desktop settings, environment variables.
//!
//! # Failure Modes
//!
//! | Condition | Behavior |
//! |-----------|----------|
//! | Signal unsupported | `current` returns `None`; store skips it with a warning |
//! | Signal readable but static | `watch` returns `None`; no live updates |

use std::cell::RefCell;
use std::collections::HashMap;
use std::env;
use std::fmt;
use std::rc::{Rc, Weak};

/// One system preference signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SystemPreference {
    /// `prefers-color-scheme: dark`.
    PrefersDark,
    /// `prefers-reduced-motion: reduce`.
    PrefersReducedMotion,
    /// `prefers-contrast: more`.
    PrefersMoreContrast,
}

impl SystemPreference {
    pub const ALL: [SystemPreference; 3] = [
        Self::PrefersDark,
        Self::PrefersReducedMotion,
        Self::PrefersMoreContrast,
    ];

    /// The equivalent CSS media query.
    #[must_use]
    pub const fn media_query(self) -> &'static str {
        match self {
            Self::PrefersDark => "(prefers-color-scheme: dark)",
            Self::PrefersReducedMotion => "(prefers-reduced-motion: reduce)",
            Self::PrefersMoreContrast => "(prefers-contrast: more)",
        }
    }
}

impl fmt::Display for SystemPreference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.media_query())
    }
}

/// Callback receiving a signal's new value.
pub type PreferenceCallback = Box<dyn Fn(bool)>;

/// Keeps a watcher installed; dropping it removes the watcher.
#[must_use = "dropping the guard removes the watcher"]
pub struct WatchGuard {
    cancel: Option<Box<dyn FnOnce()>>,
}

impl WatchGuard {
    /// Wrap a cancellation closure.
    pub fn new(cancel: impl FnOnce() + 'static) -> Self {
        Self {
            cancel: Some(Box::new(cancel)),
        }
    }
}

impl Drop for WatchGuard {
    fn drop(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl fmt::Debug for WatchGuard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WatchGuard")
            .field("active", &self.cancel.is_some())
            .finish()
    }
}

/// Source of system preference signals.
pub trait PreferenceSource {
    /// Current value; `None` when the signal is unavailable.
    fn current(&self, pref: SystemPreference) -> Option<bool>;

    /// Subscribe to changes; `None` when the signal cannot be watched.
    fn watch(&self, pref: SystemPreference, callback: PreferenceCallback) -> Option<WatchGuard>;
}

// ---------------------------------------------------------------------------
// StaticPreferences
// ---------------------------------------------------------------------------

#[derive(Default)]
struct StaticState {
    values: HashMap<SystemPreference, bool>,
    watchers: Vec<(u64, SystemPreference, Rc<dyn Fn(bool)>)>,
    next_id: u64,
}

/// Programmable preference source.
///
/// Signals start unavailable; [`set`](Self::set) makes one available and
/// notifies its watchers.
#[derive(Clone, Default)]
pub struct StaticPreferences {
    state: Rc<RefCell<StaticState>>,
}

impl StaticPreferences {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`set`](Self::set) for construction-time values.
    #[must_use]
    pub fn with(self, pref: SystemPreference, value: bool) -> Self {
        self.state.borrow_mut().values.insert(pref, value);
        self
    }

    /// Change a signal and notify its watchers.
    pub fn set(&self, pref: SystemPreference, value: bool) {
        let watchers: Vec<Rc<dyn Fn(bool)>> = {
            let mut state = self.state.borrow_mut();
            if state.values.insert(pref, value) == Some(value) {
                return;
            }
            state
                .watchers
                .iter()
                .filter(|(_, p, _)| *p == pref)
                .map(|(_, _, cb)| Rc::clone(cb))
                .collect()
        };
        for cb in watchers {
            cb(value);
        }
    }

    /// Make a signal unavailable.
    pub fn clear(&self, pref: SystemPreference) {
        self.state.borrow_mut().values.remove(&pref);
    }

    /// Number of installed watchers.
    #[must_use]
    pub fn watcher_count(&self) -> usize {
        self.state.borrow().watchers.len()
    }
}

impl PreferenceSource for StaticPreferences {
    fn current(&self, pref: SystemPreference) -> Option<bool> {
        self.state.borrow().values.get(&pref).copied()
    }

    fn watch(&self, pref: SystemPreference, callback: PreferenceCallback) -> Option<WatchGuard> {
        let mut state = self.state.borrow_mut();
        if !state.values.contains_key(&pref) {
            return None;
        }
        let id = state.next_id;
        state.next_id += 1;
        state.watchers.push((id, pref, Rc::from(callback)));
        let weak: Weak<RefCell<StaticState>> = Rc::downgrade(&self.state);
        Some(WatchGuard::new(move || {
            if let Some(state) = weak.upgrade() {
                state.borrow_mut().watchers.retain(|(w, _, _)| *w != id);
            }
        }))
    }
}

// ---------------------------------------------------------------------------
// TerminalPreferences
// ---------------------------------------------------------------------------

/// Preferences read once from the process environment.
///
/// - `COLORFGBG` (`"fg;bg"`): background index 7 or 15 means light, any other
///   parsable index means dark. Absent or malformed: unavailable.
/// - `NO_MOTION` / `REDUCE_MOTION`: set to anything but `""` or `"0"` means
///   reduced motion.
/// - Contrast: unavailable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TerminalPreferences {
    dark: Option<bool>,
    reduced_motion: bool,
}

impl TerminalPreferences {
    /// Read the current environment.
    #[must_use]
    pub fn from_env() -> Self {
        let motion = env::var("NO_MOTION")
            .ok()
            .or_else(|| env::var("REDUCE_MOTION").ok());
        Self::from_values(env::var("COLORFGBG").ok().as_deref(), motion.as_deref())
    }

    /// Build from raw variable values.
    #[must_use]
    pub fn from_values(colorfgbg: Option<&str>, reduce_motion: Option<&str>) -> Self {
        Self {
            dark: dark_from_colorfgbg(colorfgbg),
            reduced_motion: reduce_motion.is_some_and(|v| !v.is_empty() && v != "0"),
        }
    }
}

fn dark_from_colorfgbg(colorfgbg: Option<&str>) -> Option<bool> {
    let bg = colorfgbg?.split(';').next_back()?.trim().parse::<u8>().ok()?;
    Some(bg != 7 && bg != 15)
}

impl PreferenceSource for TerminalPreferences {
    fn current(&self, pref: SystemPreference) -> Option<bool> {
        match pref {
            SystemPreference::PrefersDark => self.dark,
            SystemPreference::PrefersReducedMotion => Some(self.reduced_motion),
            SystemPreference::PrefersMoreContrast => None,
        }
    }

    fn watch(&self, _pref: SystemPreference, _callback: PreferenceCallback) -> Option<WatchGuard> {
        None
    }
}
