#![forbid(unsafe_code)]

//! The theme token store.
//!
//! [`ThemeStore`] owns the current [`ThemeOptions`] snapshot and the tokens
//! derived from it, persists the snapshot, follows system preference changes
//! and notifies subscribers.
//!
//! # Construction precedence
//!
//! ```text
//! defaults  <  stored record  <  system preferences  <  initial overrides
//! ```
//!
//! System preferences only contribute signals that are currently on: a
//! system that does not prefer dark leaves the stored appearance alone.
//!
//! # Invariants
//!
//! 1. `tokens() == build_tokens(&options())` at all times.
//! 2. A setter producing an identical snapshot neither recomputes, persists
//!    nor notifies.
//! 3. Listeners run with no store borrow held; they may read the store or
//!    call setters.
//! 4. A system watcher only ever writes its own field.
//!
//! # Failure Modes
//!
//! | Condition | Behavior |
//! |-----------|----------|
//! | Stored record is not valid JSON | Warning; treated as absent |
//! | Storage read/write error | Warning; store keeps working in memory |
//! | Storage unavailable | Warning once; persistence skipped |
//! | Preference signal unavailable | Warning; signal skipped |

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use crate::css;
use crate::options::{Accent, Appearance, ColorVision, PartialThemeOptions, ThemeOptions};
use crate::persistence::{NoStorage, StorageBackend};
use crate::preferences::{PreferenceSource, StaticPreferences, SystemPreference, WatchGuard};
use crate::tokens::{ThemeTokens, TokenName, build_tokens};

/// Store configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThemeStoreConfig {
    /// Storage key for the persisted record. `None` disables persistence.
    pub storage_key: Option<String>,
    /// Follow live system preference changes.
    pub sync_with_system: bool,
    /// Explicit overrides; win over everything else at construction.
    pub initial: PartialThemeOptions,
}

impl Default for ThemeStoreConfig {
    fn default() -> Self {
        Self {
            storage_key: None,
            sync_with_system: true,
            initial: PartialThemeOptions::default(),
        }
    }
}

impl ThemeStoreConfig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn storage_key(mut self, key: impl Into<String>) -> Self {
        self.storage_key = Some(key.into());
        self
    }

    #[must_use]
    pub fn sync_with_system(mut self, sync: bool) -> Self {
        self.sync_with_system = sync;
        self
    }

    #[must_use]
    pub fn initial(mut self, initial: PartialThemeOptions) -> Self {
        self.initial = initial;
        self
    }
}

type Listener = Rc<dyn Fn(&ThemeOptions, &ThemeTokens)>;

struct StoreState {
    options: ThemeOptions,
    tokens: Rc<ThemeTokens>,
    listeners: Vec<(u64, Listener)>,
    next_listener: u64,
    storage_key: Option<String>,
    backend: Rc<dyn StorageBackend>,
    warned_unavailable: bool,
    watches: Vec<WatchGuard>,
}

/// Cloneable handle to the theme state.
#[derive(Clone)]
pub struct ThemeStore {
    state: Rc<RefCell<StoreState>>,
}

impl fmt::Debug for ThemeStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.borrow();
        f.debug_struct("ThemeStore")
            .field("options", &state.options)
            .field("storage_key", &state.storage_key)
            .field("listeners", &state.listeners.len())
            .finish()
    }
}

impl Default for ThemeStore {
    fn default() -> Self {
        Self::new(
            ThemeStoreConfig::default(),
            Rc::new(NoStorage),
            &StaticPreferences::new(),
        )
    }
}

impl ThemeStore {
    /// Build a store, resolving the initial snapshot and installing system
    /// watchers.
    pub fn new(
        config: ThemeStoreConfig,
        backend: Rc<dyn StorageBackend>,
        preferences: &dyn PreferenceSource,
    ) -> Self {
        let stored = config
            .storage_key
            .as_deref()
            .map(|key| read_stored(backend.as_ref(), key))
            .unwrap_or_default();
        let system = system_layer(preferences);
        let options = ThemeOptions::default()
            .merged(&stored)
            .merged(&system)
            .merged(&config.initial);

        mosaic_core::debug!(
            appearance = options.appearance.as_str(),
            accent = options.accent.as_str(),
            color_vision = options.color_vision.as_str(),
            "theme store created"
        );

        let store = Self {
            state: Rc::new(RefCell::new(StoreState {
                options,
                tokens: Rc::new(build_tokens(&options)),
                listeners: Vec::new(),
                next_listener: 0,
                storage_key: config.storage_key,
                backend,
                warned_unavailable: false,
                watches: Vec::new(),
            })),
        };

        if config.sync_with_system {
            let watches = store.install_watchers(preferences);
            store.state.borrow_mut().watches = watches;
        }
        store.persist();
        store
    }

    /// An unpersisted store with default options and no system signals.
    #[must_use]
    pub fn ephemeral() -> Self {
        Self::default()
    }

    fn install_watchers(&self, preferences: &dyn PreferenceSource) -> Vec<WatchGuard> {
        let mut guards = Vec::new();
        for pref in SystemPreference::ALL {
            if preferences.current(pref).is_none() {
                continue;
            }
            let weak: Weak<RefCell<StoreState>> = Rc::downgrade(&self.state);
            let callback = Box::new(move |on: bool| {
                if let Some(state) = weak.upgrade() {
                    let store = ThemeStore { state };
                    store.update(|o| apply_signal(o, pref, on));
                }
            });
            match preferences.watch(pref, callback) {
                Some(guard) => guards.push(guard),
                None => mosaic_core::debug!(preference = %pref, "preference is not watchable"),
            }
        }
        guards
    }

    // ---------------------------------------------------------------------
    // Accessors
    // ---------------------------------------------------------------------

    /// Current snapshot.
    #[must_use]
    pub fn options(&self) -> ThemeOptions {
        self.state.borrow().options
    }

    /// Current tokens (shared; cheap to clone).
    #[must_use]
    pub fn tokens(&self) -> Rc<ThemeTokens> {
        Rc::clone(&self.state.borrow().tokens)
    }

    /// Current value of one token.
    #[must_use]
    pub fn token(&self, name: TokenName) -> String {
        self.state.borrow().tokens.get(name).to_owned()
    }

    /// `var(--mosaic-<name>)`.
    #[must_use]
    pub fn var(&self, name: TokenName) -> String {
        css::token_var(name)
    }

    /// `:root { … }` block for the current state.
    #[must_use]
    pub fn css_text(&self) -> String {
        let state = self.state.borrow();
        css::css_text(&state.options, &state.tokens)
    }

    /// Document-root attributes for the current state.
    #[must_use]
    pub fn root_attributes(&self) -> [(&'static str, String); 4] {
        css::root_attributes(&self.state.borrow().options)
    }

    // ---------------------------------------------------------------------
    // Setters
    // ---------------------------------------------------------------------

    pub fn set_appearance(&self, appearance: Appearance) {
        self.update(|o| o.appearance(appearance));
    }

    pub fn toggle_appearance(&self) {
        self.update(|o| o.appearance(o.appearance.toggled()));
    }

    pub fn set_accent(&self, accent: Accent) {
        self.update(|o| o.accent(accent));
    }

    pub fn set_color_vision(&self, mode: ColorVision) {
        self.update(|o| o.color_vision(mode));
    }

    pub fn set_high_contrast(&self, on: bool) {
        self.update(|o| o.high_contrast(on));
    }

    pub fn toggle_high_contrast(&self) {
        self.update(|o| o.high_contrast(!o.high_contrast));
    }

    pub fn set_reduced_motion(&self, on: bool) {
        self.update(|o| o.reduced_motion(on));
    }

    pub fn toggle_reduced_motion(&self) {
        self.update(|o| o.reduced_motion(!o.reduced_motion));
    }

    /// Replace the whole snapshot.
    pub fn set_options(&self, options: ThemeOptions) {
        self.update(|_| options);
    }

    /// Apply `f` to the snapshot. Returns whether anything changed.
    fn update(&self, f: impl FnOnce(ThemeOptions) -> ThemeOptions) -> bool {
        let (options, tokens, listeners) = {
            let mut state = self.state.borrow_mut();
            let next = f(state.options);
            if next == state.options {
                return false;
            }
            state.options = next;
            state.tokens = Rc::new(build_tokens(&next));
            let listeners: Vec<Listener> =
                state.listeners.iter().map(|(_, l)| Rc::clone(l)).collect();
            (next, Rc::clone(&state.tokens), listeners)
        };

        mosaic_core::debug!(
            appearance = options.appearance.as_str(),
            accent = options.accent.as_str(),
            color_vision = options.color_vision.as_str(),
            high_contrast = options.high_contrast,
            reduced_motion = options.reduced_motion,
            "theme options changed"
        );

        self.persist();
        for listener in listeners {
            listener(&options, &tokens);
        }
        true
    }

    /// Write the snapshot if a storage key is configured.
    fn persist(&self) {
        let (backend, key, options) = {
            let state = self.state.borrow();
            let Some(key) = state.storage_key.clone() else {
                return;
            };
            (Rc::clone(&state.backend), key, state.options)
        };

        if !backend.is_available() {
            let mut state = self.state.borrow_mut();
            if !state.warned_unavailable {
                state.warned_unavailable = true;
                mosaic_core::warn!(
                    backend = backend.name(),
                    key = %key,
                    "theme storage unavailable; preferences will not persist"
                );
            }
            return;
        }

        let record = match serde_json::to_string(&options) {
            Ok(record) => record,
            Err(e) => {
                mosaic_core::warn!(error = %e, "failed to persist theme");
                return;
            }
        };
        if let Err(e) = backend.set(&key, &record) {
            mosaic_core::warn!(backend = backend.name(), key = %key, error = %e, "failed to persist theme");
        }
    }

    // ---------------------------------------------------------------------
    // Subscriptions
    // ---------------------------------------------------------------------

    /// Run `listener` after every change. Dropping the guard unsubscribes.
    pub fn subscribe(
        &self,
        listener: impl Fn(&ThemeOptions, &ThemeTokens) + 'static,
    ) -> Subscription {
        let mut state = self.state.borrow_mut();
        let id = state.next_listener;
        state.next_listener += 1;
        state.listeners.push((id, Rc::new(listener)));
        Subscription {
            state: Rc::downgrade(&self.state),
            id,
        }
    }

    /// Number of live subscriptions.
    #[must_use]
    pub fn listener_count(&self) -> usize {
        self.state.borrow().listeners.len()
    }
}

/// Keeps a listener registered; dropping it unsubscribes.
#[must_use = "dropping the subscription unsubscribes immediately"]
pub struct Subscription {
    state: Weak<RefCell<StoreState>>,
    id: u64,
}

impl Subscription {
    /// Unsubscribe now.
    pub fn unsubscribe(self) {}
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(state) = self.state.upgrade() {
            state.borrow_mut().listeners.retain(|(id, _)| *id != self.id);
        }
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription").field("id", &self.id).finish()
    }
}

// ---------------------------------------------------------------------------
// Layers
// ---------------------------------------------------------------------------

fn read_stored(backend: &dyn StorageBackend, key: &str) -> PartialThemeOptions {
    if !backend.is_available() {
        mosaic_core::warn!(backend = backend.name(), key = %key, "theme storage unavailable");
        return PartialThemeOptions::default();
    }
    let raw = match backend.get(key) {
        Ok(Some(raw)) => raw,
        Ok(None) => return PartialThemeOptions::default(),
        Err(e) => {
            mosaic_core::warn!(backend = backend.name(), key = %key, error = %e, "failed to read stored theme");
            return PartialThemeOptions::default();
        }
    };
    match serde_json::from_str::<PartialThemeOptions>(&raw) {
        Ok(stored) => stored,
        Err(e) => {
            mosaic_core::warn!(key = %key, error = %e, "failed to parse stored theme");
            PartialThemeOptions::default()
        }
    }
}

fn system_layer(preferences: &dyn PreferenceSource) -> PartialThemeOptions {
    let mut layer = PartialThemeOptions::default();
    for pref in SystemPreference::ALL {
        match preferences.current(pref) {
            None => {
                mosaic_core::warn!(preference = %pref, "preference signal unavailable");
            }
            Some(false) => {}
            Some(true) => layer = apply_partial(layer, pref),
        }
    }
    layer
}

fn apply_partial(layer: PartialThemeOptions, pref: SystemPreference) -> PartialThemeOptions {
    match pref {
        SystemPreference::PrefersDark => layer.appearance(Appearance::Dark),
        SystemPreference::PrefersReducedMotion => layer.reduced_motion(true),
        SystemPreference::PrefersMoreContrast => layer.high_contrast(true),
    }
}

fn apply_signal(options: ThemeOptions, pref: SystemPreference, on: bool) -> ThemeOptions {
    match pref {
        SystemPreference::PrefersDark => options.appearance(if on {
            Appearance::Dark
        } else {
            Appearance::Light
        }),
        SystemPreference::PrefersReducedMotion => options.reduced_motion(on),
        SystemPreference::PrefersMoreContrast => options.high_contrast(on),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::MemoryStorage;
    use std::cell::Cell;

    fn memory_store(storage: &Rc<MemoryStorage>, prefs: &StaticPreferences) -> ThemeStore {
        ThemeStore::new(
            ThemeStoreConfig::new().storage_key("theme"),
            Rc::clone(storage) as Rc<dyn StorageBackend>,
            prefs,
        )
    }

    #[test]
    fn defaults_without_layers() {
        let store = ThemeStore::ephemeral();
        assert_eq!(store.options(), ThemeOptions::default());
        assert_eq!(*store.tokens(), build_tokens(&ThemeOptions::default()));
    }

    #[test]
    fn setters_recompute_tokens() {
        let store = ThemeStore::ephemeral();
        store.set_appearance(Appearance::Dark);
        assert_eq!(store.token(TokenName::ColorBackground), "#050b1c");
        store.toggle_appearance();
        assert_eq!(store.options().appearance, Appearance::Light);
        store.toggle_high_contrast();
        assert!(store.options().high_contrast);
        store.toggle_reduced_motion();
        assert_eq!(store.token(TokenName::MotionDuration), "0ms");
        assert_eq!(store.var(TokenName::MotionDuration), "var(--mosaic-motion-duration)");
    }

    #[test]
    fn identical_snapshot_does_not_notify() {
        let store = ThemeStore::ephemeral();
        let hits = Rc::new(Cell::new(0));
        let sink = Rc::clone(&hits);
        let _sub = store.subscribe(move |_, _| sink.set(sink.get() + 1));
        store.set_accent(Accent::Indigo);
        assert_eq!(hits.get(), 0);
        store.set_accent(Accent::Rose);
        assert_eq!(hits.get(), 1);
    }

    #[test]
    fn listener_may_reenter_store() {
        let store = ThemeStore::ephemeral();
        let inner = store.clone();
        let _sub = store.subscribe(move |options, _| {
            if options.appearance == Appearance::Dark {
                inner.set_high_contrast(true);
            }
            let _ = inner.token(TokenName::ColorText);
        });
        store.set_appearance(Appearance::Dark);
        assert!(store.options().high_contrast);
    }

    #[test]
    fn dropping_subscription_unsubscribes() {
        let store = ThemeStore::ephemeral();
        let sub = store.subscribe(|_, _| {});
        assert_eq!(store.listener_count(), 1);
        drop(sub);
        assert_eq!(store.listener_count(), 0);
    }

    #[test]
    fn persists_on_construction_and_change() {
        let storage = Rc::new(MemoryStorage::new());
        let store = memory_store(&storage, &StaticPreferences::new());
        let record = storage.peek("theme").expect("written on construction");
        assert!(record.contains(r#""appearance":"light""#));
        store.set_color_vision(ColorVision::Protanopia);
        let record = storage.peek("theme").expect("written after change");
        assert!(record.contains(r#""colorVision":"protanopia""#));
    }

    #[test]
    fn no_key_means_no_persistence() {
        let storage = Rc::new(MemoryStorage::new());
        let store = ThemeStore::new(
            ThemeStoreConfig::new(),
            Rc::clone(&storage) as Rc<dyn StorageBackend>,
            &StaticPreferences::new(),
        );
        store.set_accent(Accent::Amber);
        assert!(storage.peek("theme").is_none());
    }

    #[test]
    fn write_failure_keeps_store_working() {
        let storage = Rc::new(MemoryStorage::new());
        storage.fail_writes(true);
        let store = memory_store(&storage, &StaticPreferences::new());
        store.set_accent(Accent::Violet);
        assert_eq!(store.options().accent, Accent::Violet);
        assert!(storage.peek("theme").is_none());
    }

    #[test]
    fn system_watcher_updates_only_its_field() {
        let prefs = StaticPreferences::new()
            .with(SystemPreference::PrefersDark, false)
            .with(SystemPreference::PrefersReducedMotion, false);
        let store = ThemeStore::new(ThemeStoreConfig::new(), Rc::new(NoStorage), &prefs);
        store.set_accent(Accent::Emerald);
        prefs.set(SystemPreference::PrefersDark, true);
        let o = store.options();
        assert_eq!(o.appearance, Appearance::Dark);
        assert_eq!(o.accent, Accent::Emerald);
        assert!(!o.reduced_motion);
        prefs.set(SystemPreference::PrefersReducedMotion, true);
        assert!(store.options().reduced_motion);
        assert_eq!(store.options().appearance, Appearance::Dark);
    }

    #[test]
    fn sync_disabled_installs_no_watchers() {
        let prefs = StaticPreferences::new().with(SystemPreference::PrefersDark, true);
        let store = ThemeStore::new(
            ThemeStoreConfig::new().sync_with_system(false),
            Rc::new(NoStorage),
            &prefs,
        );
        assert_eq!(store.options().appearance, Appearance::Dark);
        assert_eq!(prefs.watcher_count(), 0);
        prefs.set(SystemPreference::PrefersDark, false);
        assert_eq!(store.options().appearance, Appearance::Dark);
    }

    #[test]
    fn dropping_store_removes_watchers() {
        let prefs = StaticPreferences::new().with(SystemPreference::PrefersDark, false);
        let store = ThemeStore::new(ThemeStoreConfig::new(), Rc::new(NoStorage), &prefs);
        assert_eq!(prefs.watcher_count(), 1);
        drop(store);
        assert_eq!(prefs.watcher_count(), 0);
    }
}
