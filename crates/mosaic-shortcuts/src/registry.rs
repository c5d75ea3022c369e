#![forbid(unsafe_code)]

//! The shortcut registry: registration, lookup and dispatch.
//!
//! One [`ShortcutRegistry`] exists per application root. Cloning it yields
//! another handle to the same registrations.
//!
//! # Invariants
//!
//! 1. Ids are unique. Re-registering an id replaces the entry in place, so its
//!    dispatch position does not change.
//! 2. A [`ShortcutGuard`] only removes the registration it created; once its
//!    id has been re-registered the guard is stale and dropping it is a no-op.
//! 3. Dispatch fires every matching entry (fan-out) in registration order.
//! 4. Dispatch works from a snapshot taken before the first handler runs.
//!    Entries unregistered by an earlier handler are skipped; entries added
//!    during the pass wait for the next event.
//! 5. Handlers run with no registry borrow held, so they may register,
//!    unregister or dispatch.
//!
//! # Failure Modes
//!
//! | Condition | Behavior |
//! |-----------|----------|
//! | Combo string normalizes to nothing | entry is kept (palette-only command), never matches |
//! | Event is a bare modifier or a key release | nothing fires |
//! | Editable target without `allow_in_input` | entry skipped |

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use mosaic_core::{KeyboardEvent, KeyEventKind};

use crate::combo::{Combo, event_to_combo, normalize_combo};
use crate::format::format_combo;
use crate::platform::Platform;

/// Shortcut callback. Receives the triggering event, or `None` when run from
/// a non-keyboard surface such as the command palette.
pub type ShortcutHandler = Rc<dyn Fn(Option<&KeyboardEvent>)>;

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// What to register.
#[derive(Clone)]
pub struct ShortcutConfig {
    /// Stable id; generated as `shortcut-N` when absent.
    pub id: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    /// Palette grouping.
    pub section: Option<String>,
    /// Extra palette search terms.
    pub keywords: Vec<String>,
    /// User-written combos (`"mod+k"`); each may expand to several variants.
    pub combos: Vec<String>,
    /// Fire even when focus is in an editable field.
    pub allow_in_input: bool,
    /// Mark the event default-prevented when firing (default: true).
    pub prevent_default: bool,
    /// Keep out of palette and help listings.
    pub hidden: bool,
    run: ShortcutHandler,
}

impl ShortcutConfig {
    /// A config with only a handler.
    pub fn new(run: impl Fn(Option<&KeyboardEvent>) + 'static) -> Self {
        Self {
            id: None,
            title: None,
            description: None,
            section: None,
            keywords: Vec::new(),
            combos: Vec::new(),
            allow_in_input: false,
            prevent_default: true,
            hidden: false,
            run: Rc::new(run),
        }
    }

    #[must_use]
    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    #[must_use]
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    #[must_use]
    pub fn section(mut self, section: impl Into<String>) -> Self {
        self.section = Some(section.into());
        self
    }

    #[must_use]
    pub fn keyword(mut self, keyword: impl Into<String>) -> Self {
        self.keywords.push(keyword.into());
        self
    }

    /// Add one combo.
    #[must_use]
    pub fn combo(mut self, combo: impl Into<String>) -> Self {
        self.combos.push(combo.into());
        self
    }

    /// Add several combos.
    #[must_use]
    pub fn combos<I, S>(mut self, combos: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.combos.extend(combos.into_iter().map(Into::into));
        self
    }

    #[must_use]
    pub fn allow_in_input(mut self, allow: bool) -> Self {
        self.allow_in_input = allow;
        self
    }

    #[must_use]
    pub fn prevent_default(mut self, prevent: bool) -> Self {
        self.prevent_default = prevent;
        self
    }

    #[must_use]
    pub fn hidden(mut self, hidden: bool) -> Self {
        self.hidden = hidden;
        self
    }
}

impl fmt::Debug for ShortcutConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ShortcutConfig")
            .field("id", &self.id)
            .field("title", &self.title)
            .field("combos", &self.combos)
            .finish_non_exhaustive()
    }
}

// ---------------------------------------------------------------------------
// Registered entries
// ---------------------------------------------------------------------------

/// A registration as stored by the registry.
#[derive(Clone)]
pub struct RegisteredShortcut {
    pub id: String,
    pub title: Option<String>,
    pub description: Option<String>,
    pub section: Option<String>,
    pub keywords: Vec<String>,
    /// Normalized combos, all `mod` variants expanded.
    pub combos: Vec<Combo>,
    /// Platform label, `None` when there are no combos.
    pub display_combo: Option<String>,
    pub allow_in_input: bool,
    pub prevent_default: bool,
    pub hidden: bool,
    run: ShortcutHandler,
}

impl RegisteredShortcut {
    /// Invoke the handler.
    pub fn run(&self, event: Option<&KeyboardEvent>) {
        (self.run)(event);
    }

    /// Whether `combo` triggers this entry.
    #[must_use]
    pub fn matches(&self, combo: &Combo) -> bool {
        self.combos.contains(combo)
    }
}

impl fmt::Debug for RegisteredShortcut {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegisteredShortcut")
            .field("id", &self.id)
            .field("title", &self.title)
            .field("combos", &self.combos)
            .field("display_combo", &self.display_combo)
            .field("hidden", &self.hidden)
            .finish_non_exhaustive()
    }
}

/// What a dispatch did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DispatchOutcome {
    /// The combo the event produced, if any.
    pub combo: Option<Combo>,
    /// Ids of the entries that fired, in order.
    pub fired: Vec<String>,
}

impl DispatchOutcome {
    #[must_use]
    pub fn handled(&self) -> bool {
        !self.fired.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Registry
// ---------------------------------------------------------------------------

struct Slot {
    generation: u64,
    entry: Rc<RegisteredShortcut>,
}

struct RegistryState {
    platform: Platform,
    slots: Vec<Slot>,
    next_id: u64,
    next_generation: u64,
}

impl RegistryState {
    fn position(&self, id: &str) -> Option<usize> {
        self.slots.iter().position(|s| s.entry.id == id)
    }

    fn is_current(&self, id: &str, generation: u64) -> bool {
        self.slots
            .iter()
            .any(|s| s.generation == generation && s.entry.id == id)
    }
}

/// Shared shortcut registry handle.
#[derive(Clone)]
pub struct ShortcutRegistry {
    state: Rc<RefCell<RegistryState>>,
}

impl Default for ShortcutRegistry {
    fn default() -> Self {
        Self::new(Platform::current())
    }
}

impl fmt::Debug for ShortcutRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.borrow();
        f.debug_struct("ShortcutRegistry")
            .field("platform", &state.platform)
            .field("entries", &state.slots.len())
            .finish()
    }
}

impl ShortcutRegistry {
    #[must_use]
    pub fn new(platform: Platform) -> Self {
        Self {
            state: Rc::new(RefCell::new(RegistryState {
                platform,
                slots: Vec::new(),
                next_id: 1,
                next_generation: 0,
            })),
        }
    }

    #[must_use]
    pub fn platform(&self) -> Platform {
        self.state.borrow().platform
    }

    #[must_use]
    pub fn is_mac(&self) -> bool {
        self.platform().is_mac()
    }

    /// Format user-written combos for this registry's platform.
    #[must_use]
    pub fn format<S: AsRef<str>>(&self, combos: &[S]) -> String {
        let normalized: Vec<Combo> = combos
            .iter()
            .flat_map(|c| normalize_combo(c.as_ref()))
            .collect();
        format_combo(self.platform(), &normalized)
    }

    /// Add or replace a registration.
    pub fn register(&self, config: ShortcutConfig) -> ShortcutGuard {
        let combos: Vec<Combo> = config
            .combos
            .iter()
            .flat_map(|c| normalize_combo(c))
            .collect();

        let mut state = self.state.borrow_mut();
        let id = match config.id {
            Some(id) => id,
            None => {
                let n = state.next_id;
                state.next_id += 1;
                format!("shortcut-{n}")
            }
        };
        let display_combo =
            (!combos.is_empty()).then(|| format_combo(state.platform, &combos));
        let generation = state.next_generation;
        state.next_generation += 1;

        let entry = Rc::new(RegisteredShortcut {
            id: id.clone(),
            title: config.title,
            description: config.description,
            section: config.section,
            keywords: config.keywords,
            combos,
            display_combo,
            allow_in_input: config.allow_in_input,
            prevent_default: config.prevent_default,
            hidden: config.hidden,
            run: config.run,
        });

        match state.position(&id) {
            Some(pos) => {
                mosaic_core::debug!(id = %id, "shortcut replaced");
                state.slots[pos] = Slot { generation, entry };
            }
            None => {
                mosaic_core::debug!(id = %id, "shortcut registered");
                state.slots.push(Slot { generation, entry });
            }
        }

        ShortcutGuard {
            registry: Rc::downgrade(&self.state),
            id,
            generation,
        }
    }

    /// Remove a registration by id regardless of which guard owns it.
    pub fn unregister(&self, id: &str) -> bool {
        let mut state = self.state.borrow_mut();
        match state.position(id) {
            Some(pos) => {
                state.slots.remove(pos);
                mosaic_core::debug!(id = %id, "shortcut unregistered");
                true
            }
            None => false,
        }
    }

    /// Snapshot of every registration, in registration order.
    #[must_use]
    pub fn shortcuts(&self) -> Vec<Rc<RegisteredShortcut>> {
        self.state
            .borrow()
            .slots
            .iter()
            .map(|s| Rc::clone(&s.entry))
            .collect()
    }

    #[must_use]
    pub fn get(&self, id: &str) -> Option<Rc<RegisteredShortcut>> {
        let state = self.state.borrow();
        state.position(id).map(|pos| Rc::clone(&state.slots[pos].entry))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.state.borrow().slots.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.state.borrow().slots.is_empty()
    }

    /// Run every entry matching `event`.
    pub fn dispatch(&self, event: &mut KeyboardEvent) -> DispatchOutcome {
        if event.key.kind == KeyEventKind::Release {
            return DispatchOutcome::default();
        }
        let Some(combo) = event_to_combo(&event.key) else {
            return DispatchOutcome::default();
        };

        let snapshot: Vec<(u64, Rc<RegisteredShortcut>)> = self
            .state
            .borrow()
            .slots
            .iter()
            .filter(|s| s.entry.matches(&combo))
            .map(|s| (s.generation, Rc::clone(&s.entry)))
            .collect();

        mosaic_core::trace!(combo = %combo, candidates = snapshot.len(), "shortcut dispatch");

        let mut fired = Vec::new();
        for (generation, entry) in snapshot {
            if !self.state.borrow().is_current(&entry.id, generation) {
                continue;
            }
            if event.is_editable_target() && !entry.allow_in_input {
                continue;
            }
            if entry.prevent_default {
                event.prevent_default();
            }
            entry.run(Some(&*event));
            fired.push(entry.id.clone());
        }

        DispatchOutcome {
            combo: Some(combo),
            fired,
        }
    }
}

// ---------------------------------------------------------------------------
// Guard
// ---------------------------------------------------------------------------

/// Keeps a registration alive; dropping it unregisters.
#[must_use = "dropping the guard unregisters the shortcut"]
pub struct ShortcutGuard {
    registry: Weak<RefCell<RegistryState>>,
    id: String,
    generation: u64,
}

impl ShortcutGuard {
    /// The registered id.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Whether this guard's registration is still the live one.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.registry
            .upgrade()
            .is_some_and(|state| state.borrow().is_current(&self.id, self.generation))
    }

    /// Unregister now.
    pub fn unregister(self) {}
}

impl Drop for ShortcutGuard {
    fn drop(&mut self) {
        let Some(state) = self.registry.upgrade() else {
            return;
        };
        let mut state = state.borrow_mut();
        if let Some(pos) = state
            .slots
            .iter()
            .position(|s| s.generation == self.generation && s.entry.id == self.id)
        {
            state.slots.remove(pos);
            mosaic_core::debug!(id = %self.id, "shortcut unregistered");
        }
    }
}

impl fmt::Debug for ShortcutGuard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ShortcutGuard")
            .field("id", &self.id)
            .field("generation", &self.generation)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mosaic_core::{KeyCode, Modifiers};
    use std::cell::{Cell, RefCell};

    fn counter() -> (Rc<Cell<u32>>, impl Fn(Option<&KeyboardEvent>) + 'static) {
        let hits = Rc::new(Cell::new(0));
        let sink = Rc::clone(&hits);
        (hits, move |_: Option<&KeyboardEvent>| sink.set(sink.get() + 1))
    }

    #[test]
    fn generated_ids_count_per_registry() {
        let a = ShortcutRegistry::new(Platform::Other);
        let b = ShortcutRegistry::new(Platform::Other);
        let g1 = a.register(ShortcutConfig::new(|_| {}));
        let g2 = a.register(ShortcutConfig::new(|_| {}));
        let g3 = b.register(ShortcutConfig::new(|_| {}));
        assert_eq!(g1.id(), "shortcut-1");
        assert_eq!(g2.id(), "shortcut-2");
        assert_eq!(g3.id(), "shortcut-1");
    }

    #[test]
    fn display_combo_follows_platform() {
        let mac = ShortcutRegistry::new(Platform::Mac);
        let pc = ShortcutRegistry::new(Platform::Other);
        let _a = mac.register(ShortcutConfig::new(|_| {}).id("x").combo("mod+k"));
        let _b = pc.register(ShortcutConfig::new(|_| {}).id("x").combo("mod+k"));
        assert_eq!(mac.get("x").and_then(|e| e.display_combo.clone()).as_deref(), Some("⌘ K"));
        assert_eq!(pc.get("x").and_then(|e| e.display_combo.clone()).as_deref(), Some("Ctrl + K"));
    }

    #[test]
    fn no_combos_means_no_display() {
        let registry = ShortcutRegistry::new(Platform::Other);
        let _g = registry.register(ShortcutConfig::new(|_| {}).id("cmd").title("Palette only"));
        let entry = registry.get("cmd").expect("registered");
        assert!(entry.combos.is_empty());
        assert_eq!(entry.display_combo, None);
    }

    #[test]
    fn replacement_keeps_position() {
        let registry = ShortcutRegistry::new(Platform::Other);
        let _a = registry.register(ShortcutConfig::new(|_| {}).id("a"));
        let _b = registry.register(ShortcutConfig::new(|_| {}).id("b"));
        let _a2 = registry.register(ShortcutConfig::new(|_| {}).id("a").title("again"));
        let ids: Vec<String> = registry.shortcuts().iter().map(|e| e.id.clone()).collect();
        assert_eq!(ids, ["a", "b"]);
        assert_eq!(registry.get("a").and_then(|e| e.title.clone()).as_deref(), Some("again"));
    }

    #[test]
    fn stale_guard_does_not_remove_newer_entry() {
        let registry = ShortcutRegistry::new(Platform::Other);
        let old = registry.register(ShortcutConfig::new(|_| {}).id("a"));
        let new = registry.register(ShortcutConfig::new(|_| {}).id("a"));
        assert!(!old.is_active());
        drop(old);
        assert_eq!(registry.len(), 1);
        assert!(new.is_active());
        new.unregister();
        assert!(registry.is_empty());
    }

    #[test]
    fn guard_outliving_registry_is_harmless() {
        let registry = ShortcutRegistry::new(Platform::Other);
        let guard = registry.register(ShortcutConfig::new(|_| {}));
        drop(registry);
        assert!(!guard.is_active());
        drop(guard);
    }

    #[test]
    fn fan_out_in_registration_order() {
        let registry = ShortcutRegistry::new(Platform::Other);
        let order = Rc::new(RefCell::new(Vec::new()));
        let mut guards = Vec::new();
        for name in ["first", "second"] {
            let log = Rc::clone(&order);
            guards.push(registry.register(
                ShortcutConfig::new(move |_| log.borrow_mut().push(name)).combo("ctrl+s"),
            ));
        }
        let mut ev = KeyboardEvent::press(KeyCode::Char('s'), Modifiers::CTRL);
        let out = registry.dispatch(&mut ev);
        assert_eq!(*order.borrow(), ["first", "second"]);
        assert_eq!(out.fired, ["shortcut-1", "shortcut-2"]);
    }

    #[test]
    fn editable_targets_need_opt_in() {
        let registry = ShortcutRegistry::new(Platform::Other);
        let (blocked, run_blocked) = counter();
        let (allowed, run_allowed) = counter();
        let _a = registry.register(ShortcutConfig::new(run_blocked).combo("esc"));
        let _b = registry.register(
            ShortcutConfig::new(run_allowed)
                .combo("esc")
                .allow_in_input(true)
                .prevent_default(false),
        );
        let mut ev = KeyboardEvent::press(KeyCode::Escape, Modifiers::NONE).in_editable();
        registry.dispatch(&mut ev);
        assert_eq!(blocked.get(), 0);
        assert_eq!(allowed.get(), 1);
        assert!(!ev.is_default_prevented());
    }

    #[test]
    fn releases_and_bare_modifiers_are_ignored() {
        let registry = ShortcutRegistry::new(Platform::Other);
        let (hits, run) = counter();
        let _g = registry.register(ShortcutConfig::new(run).combo("k"));
        let mut release = KeyboardEvent::new(
            mosaic_core::KeyEvent::new(KeyCode::Char('k')).with_kind(KeyEventKind::Release),
        );
        assert!(!registry.dispatch(&mut release).handled());
        let mut shift = KeyboardEvent::press(
            KeyCode::Modifier(mosaic_core::ModifierKey::Shift),
            Modifiers::SHIFT,
        );
        assert_eq!(registry.dispatch(&mut shift), DispatchOutcome::default());
        assert_eq!(hits.get(), 0);
    }

    #[test]
    fn format_accepts_raw_strings() {
        let registry = ShortcutRegistry::new(Platform::Mac);
        assert_eq!(registry.format(&["mod+shift+p"]), "⌘ ⇧ P");
        assert_eq!(registry.format::<&str>(&[]), "");
    }
}
