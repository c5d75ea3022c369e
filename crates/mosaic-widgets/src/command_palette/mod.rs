#![forbid(unsafe_code)]

//! Command palette over the shortcut registry.
//!
//! Every titled, non-hidden shortcut is a command. The palette filters them
//! by a whitespace-separated query, groups the matches by section and runs
//! the chosen command on the next scheduler turn, after the palette has
//! closed.
//!
//! # Usage
//!
//! ```ignore
//! let palette = CommandPalette::new(&registry, &scheduler, PaletteConfig::default());
//! // mod+k now toggles the palette through the registry.
//! palette.set_query("git com");
//! if let Some(PaletteAction::Execute(id)) = palette.handle_key(&mut enter) {
//!     // `id` runs on the next scheduler turn.
//! }
//! ```
//!
//! # Invariants
//!
//! 1. The active id is `None` exactly when nothing is visible; otherwise it
//!    names a visible command.
//! 2. Opening and closing both clear the query.
//! 3. At most one selected command is waiting to run.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fmt;
use std::rc::{Rc, Weak};

use mosaic_core::{KeyCode, KeyboardEvent, Scheduler, TaskId};
use mosaic_shortcuts::{RegisteredShortcut, ShortcutConfig, ShortcutGuard, ShortcutRegistry};

use crate::roving::Direction;

/// Id of the hidden shortcut that toggles the palette.
pub const PALETTE_SHORTCUT_ID: &str = "mosaic.command-palette";

/// Section used for commands registered without one.
pub const DEFAULT_SECTION: &str = "General";

// ---------------------------------------------------------------------------
// Filtering
// ---------------------------------------------------------------------------

/// Commands matching `query`, at most `max_results` of them.
///
/// Hidden and untitled entries are skipped. Duplicate ids keep their first
/// position and their last registration. Every query term must appear in the
/// title, description, section or keywords, case-insensitively.
#[must_use]
pub fn visible_commands(
    commands: &[Rc<RegisteredShortcut>],
    query: &str,
    max_results: usize,
) -> Vec<Rc<RegisteredShortcut>> {
    let mut unique: Vec<Rc<RegisteredShortcut>> = Vec::new();
    for command in commands {
        if command.hidden || command.title.is_none() {
            continue;
        }
        match unique.iter().position(|c| c.id == command.id) {
            Some(pos) => unique[pos] = Rc::clone(command),
            None => unique.push(Rc::clone(command)),
        }
    }

    let query = query.trim().to_lowercase();
    let terms: Vec<&str> = query.split_whitespace().collect();
    unique
        .into_iter()
        .filter(|command| {
            if terms.is_empty() {
                return true;
            }
            let haystack = haystack(command);
            terms.iter().all(|term| haystack.contains(term))
        })
        .take(max_results)
        .collect()
}

fn haystack(command: &RegisteredShortcut) -> String {
    let mut parts: Vec<&str> = vec![
        command.title.as_deref().unwrap_or_default(),
        command.description.as_deref().unwrap_or_default(),
        command.section.as_deref().unwrap_or_default(),
    ];
    parts.extend(command.keywords.iter().map(String::as_str));
    parts.join(" ").to_lowercase()
}

/// Commands sharing a section.
#[derive(Debug, Clone)]
pub struct PaletteGroup {
    pub section: String,
    pub items: Vec<Rc<RegisteredShortcut>>,
}

/// Group by section, with sections and titles in ascending order.
#[must_use]
pub fn group_commands(visible: &[Rc<RegisteredShortcut>]) -> Vec<PaletteGroup> {
    let mut sections: BTreeMap<String, Vec<Rc<RegisteredShortcut>>> = BTreeMap::new();
    for command in visible {
        let section = command
            .section
            .clone()
            .unwrap_or_else(|| DEFAULT_SECTION.to_owned());
        sections.entry(section).or_default().push(Rc::clone(command));
    }
    sections
        .into_iter()
        .map(|(section, mut items)| {
            items.sort_by(|a, b| a.title.cmp(&b.title));
            PaletteGroup { section, items }
        })
        .collect()
}

/// Element id of a command row.
#[must_use]
pub fn option_id(command_id: &str) -> String {
    format!("mosaic-command-{command_id}")
}

// ---------------------------------------------------------------------------
// Palette Action
// ---------------------------------------------------------------------------

/// Action returned from key handling.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaletteAction {
    /// A command was chosen; it runs on the next scheduler turn.
    Execute(String),
    /// The palette was dismissed (Esc).
    Dismiss,
}

// ---------------------------------------------------------------------------
// Palette Config
// ---------------------------------------------------------------------------

/// Command palette options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaletteConfig {
    /// Cap on listed commands. Default: 50.
    pub max_results: usize,
    /// Combo that toggles the palette. Default: `mod+k`.
    pub toggle_combo: String,
    pub title: String,
    pub placeholder: String,
    pub empty_message: String,
}

impl Default for PaletteConfig {
    fn default() -> Self {
        Self {
            max_results: 50,
            toggle_combo: "mod+k".to_owned(),
            title: "Command palette".to_owned(),
            placeholder: "Search commands…".to_owned(),
            empty_message: "No results found".to_owned(),
        }
    }
}

impl PaletteConfig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn max_results(mut self, n: usize) -> Self {
        self.max_results = n;
        self
    }

    #[must_use]
    pub fn toggle_combo(mut self, combo: impl Into<String>) -> Self {
        self.toggle_combo = combo.into();
        self
    }

    #[must_use]
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    #[must_use]
    pub fn placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = placeholder.into();
        self
    }

    #[must_use]
    pub fn empty_message(mut self, message: impl Into<String>) -> Self {
        self.empty_message = message.into();
        self
    }
}

// ---------------------------------------------------------------------------
// Command Palette
// ---------------------------------------------------------------------------

#[derive(Default)]
struct PaletteState {
    open: bool,
    query: String,
    active: Option<String>,
    in_flight: Option<TaskId>,
    on_open_change: Option<Rc<dyn Fn(bool)>>,
}

struct PaletteShared {
    registry: ShortcutRegistry,
    scheduler: Scheduler,
    config: PaletteConfig,
    state: RefCell<PaletteState>,
}

impl PaletteShared {
    /// Visible commands in display order (grouped, sorted).
    fn entries(&self) -> Vec<Rc<RegisteredShortcut>> {
        let query = self.state.borrow().query.clone();
        let visible = visible_commands(&self.registry.shortcuts(), &query, self.config.max_results);
        group_commands(&visible)
            .into_iter()
            .flat_map(|group| group.items)
            .collect()
    }

    /// Entries plus the index of the active one, re-seeding a stale id.
    fn reconcile(&self) -> (Vec<Rc<RegisteredShortcut>>, Option<usize>) {
        let entries = self.entries();
        let mut state = self.state.borrow_mut();
        let current = state
            .active
            .as_deref()
            .and_then(|id| entries.iter().position(|e| e.id == id));
        let index = current.or(if entries.is_empty() { None } else { Some(0) });
        state.active = index.map(|i| entries[i].id.clone());
        drop(state);
        (entries, index)
    }

    fn set_active_index(&self, entries: &[Rc<RegisteredShortcut>], index: usize) {
        self.state.borrow_mut().active = entries.get(index).map(|e| e.id.clone());
    }

    fn set_open(&self, open: bool) {
        let callback = {
            let mut state = self.state.borrow_mut();
            if state.open == open {
                return;
            }
            state.open = open;
            state.query.clear();
            state.active = None;
            state.on_open_change.clone()
        };
        if open {
            self.reconcile();
        }
        mosaic_core::debug!(open, "command palette toggled");
        if let Some(callback) = callback {
            callback(open);
        }
    }

    fn toggle(&self) {
        let open = self.state.borrow().open;
        self.set_open(!open);
    }
}

/// Searchable launcher for registered shortcuts.
pub struct CommandPalette {
    shared: Rc<PaletteShared>,
    _toggle: ShortcutGuard,
}

impl fmt::Debug for CommandPalette {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.shared.state.borrow();
        f.debug_struct("CommandPalette")
            .field("open", &state.open)
            .field("query", &state.query)
            .field("active", &state.active)
            .field("config", &self.shared.config)
            .finish_non_exhaustive()
    }
}

impl CommandPalette {
    /// Create the palette and register its hidden toggle shortcut.
    #[must_use]
    pub fn new(registry: &ShortcutRegistry, scheduler: &Scheduler, config: PaletteConfig) -> Self {
        let toggle_combo = config.toggle_combo.clone();
        let shared = Rc::new(PaletteShared {
            registry: registry.clone(),
            scheduler: scheduler.clone(),
            config,
            state: RefCell::new(PaletteState::default()),
        });
        let weak: Weak<PaletteShared> = Rc::downgrade(&shared);
        let toggle = registry.register(
            ShortcutConfig::new(move |_| {
                if let Some(shared) = weak.upgrade() {
                    shared.toggle();
                }
            })
            .id(PALETTE_SHORTCUT_ID)
            .title("Toggle command palette")
            .combo(toggle_combo)
            .allow_in_input(true)
            .hidden(true),
        );
        Self {
            shared,
            _toggle: toggle,
        }
    }

    #[must_use]
    pub fn config(&self) -> &PaletteConfig {
        &self.shared.config
    }

    /// Hear every open/close transition.
    pub fn on_open_change(&self, callback: impl Fn(bool) + 'static) {
        self.shared.state.borrow_mut().on_open_change = Some(Rc::new(callback));
    }

    // --- Visibility ---

    /// Open with an empty query.
    pub fn open(&self) {
        self.shared.set_open(true);
    }

    /// Close and clear the query.
    pub fn close(&self) {
        self.shared.set_open(false);
    }

    pub fn toggle(&self) {
        self.shared.toggle();
    }

    #[must_use]
    pub fn is_open(&self) -> bool {
        self.shared.state.borrow().open
    }

    /// The toggle combo formatted for the registry's platform.
    #[must_use]
    pub fn shortcut_label(&self) -> String {
        self.shared.registry.format(&[self.shared.config.toggle_combo.as_str()])
    }

    // --- Query ---

    #[must_use]
    pub fn query(&self) -> String {
        self.shared.state.borrow().query.clone()
    }

    /// Replace the query; the first match becomes active.
    pub fn set_query(&self, query: impl Into<String>) {
        {
            let mut state = self.shared.state.borrow_mut();
            state.query = query.into();
            state.active = None;
        }
        self.shared.reconcile();
    }

    /// Visible commands in display order.
    #[must_use]
    pub fn visible(&self) -> Vec<Rc<RegisteredShortcut>> {
        self.shared.reconcile().0
    }

    /// Visible commands grouped by section.
    #[must_use]
    pub fn groups(&self) -> Vec<PaletteGroup> {
        let query = self.query();
        let visible = visible_commands(
            &self.shared.registry.shortcuts(),
            &query,
            self.shared.config.max_results,
        );
        group_commands(&visible)
    }

    /// Message for the empty list, when nothing matches.
    #[must_use]
    pub fn empty_state(&self) -> Option<String> {
        self.visible()
            .is_empty()
            .then(|| self.shared.config.empty_message.clone())
    }

    // --- Active entry ---

    /// The highlighted command. Re-seeded to the first visible command when
    /// the previous one stopped matching or was unregistered.
    #[must_use]
    pub fn active_id(&self) -> Option<String> {
        self.shared.reconcile();
        self.shared.state.borrow().active.clone()
    }

    /// Move the highlight one step, stopping at either end.
    pub fn move_active(&self, direction: Direction) {
        let (entries, index) = self.shared.reconcile();
        let Some(index) = index else {
            return;
        };
        let next = match direction {
            Direction::Forward => (index + 1).min(entries.len() - 1),
            Direction::Backward => index.saturating_sub(1),
        };
        self.shared.set_active_index(&entries, next);
    }

    pub fn home(&self) {
        let (entries, _) = self.shared.reconcile();
        self.shared.set_active_index(&entries, 0);
    }

    pub fn end(&self) {
        let (entries, _) = self.shared.reconcile();
        self.shared
            .set_active_index(&entries, entries.len().saturating_sub(1));
    }

    // --- Execution ---

    /// Close the palette and run `id` on the next scheduler turn.
    ///
    /// Returns `false` for ids that are not visible, and while an earlier
    /// selection is still waiting to run.
    pub fn select(&self, id: &str) -> bool {
        let Some(command) = self.visible().into_iter().find(|c| c.id == id) else {
            return false;
        };
        if self.shared.state.borrow().in_flight.is_some() {
            mosaic_core::debug!(id = %id, "command selection ignored while another is pending");
            return false;
        }
        self.close();
        let weak = Rc::downgrade(&self.shared);
        let task = self.shared.scheduler.defer(move || {
            if let Some(shared) = weak.upgrade() {
                shared.state.borrow_mut().in_flight = None;
            }
            mosaic_core::debug!(id = %command.id, "command executed");
            command.run(None);
        });
        self.shared.state.borrow_mut().in_flight = Some(task);
        true
    }

    /// Whether a selected command is waiting to run.
    #[must_use]
    pub fn is_executing(&self) -> bool {
        self.shared.state.borrow().in_flight.is_some()
    }

    // --- Event Handling ---

    /// Handle a key press while the palette is open.
    ///
    /// Returns a [`PaletteAction`] when a command was chosen or the palette
    /// was dismissed.
    pub fn handle_key(&self, event: &mut KeyboardEvent) -> Option<PaletteAction> {
        if !self.is_open() || !event.key.is_press() || event.is_default_prevented() {
            return None;
        }
        let key = event.key;
        match key.code {
            KeyCode::Down => self.move_active(Direction::Forward),
            KeyCode::Up => self.move_active(Direction::Backward),
            KeyCode::Home => self.home(),
            KeyCode::End => self.end(),
            KeyCode::Enter => {
                event.prevent_default();
                let id = self.active_id()?;
                return self.select(&id).then_some(PaletteAction::Execute(id));
            }
            KeyCode::Escape => {
                event.prevent_default();
                self.close();
                return Some(PaletteAction::Dismiss);
            }
            KeyCode::Backspace => {
                let mut query = self.query();
                if query.pop().is_some() {
                    self.set_query(query);
                }
                return None;
            }
            // Ctrl+U: clear query
            KeyCode::Char('u') if key.ctrl() => self.set_query(""),
            KeyCode::Char(c) if !key.ctrl() && !key.alt() && !key.meta() => {
                let mut query = self.query();
                query.push(c);
                self.set_query(query);
                return None;
            }
            _ => return None,
        }
        event.prevent_default();
        None
    }
}

impl Drop for CommandPalette {
    fn drop(&mut self) {
        if let Some(task) = self.shared.state.borrow_mut().in_flight.take() {
            self.shared.scheduler.cancel(task);
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
