#![forbid(unsafe_code)]

//! Tabs: a set of triggers with exactly one selected panel.
//!
//! [`Tabs`] is the root; triggers ([`TabsTrigger`]) register themselves and
//! panels ([`TabsPanel`]) only read the selection. The selected id is a
//! [`Controllable`] `Option<String>`.
//!
//! # Invariants
//!
//! 1. Uncontrolled: once any enabled trigger is registered, something is
//!    selected. Removing or disabling the selected trigger advances to the
//!    first enabled one, or to no selection.
//! 2. Controlled: no reconciliation at all. Selection attempts (clicks, keys,
//!    automatic activation) are proposed to the change callback.
//! 3. The change callback never hears about a cleared selection.
//! 4. Exactly one enabled trigger is a tab stop: the selected one, or the
//!    first enabled one while nothing is selected.
//!
//! # Failure Modes
//!
//! | Condition | Behavior |
//! |-----------|----------|
//! | Part used after its root is dropped | `ContextError::MissingRoot` |
//! | Select a disabled trigger | Ignored |
//! | Controlled value names an unknown id | No trigger is a tab stop |

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use mosaic_core::{
    ContextError, ContextResult, Controllable, EventResult, FocusRef, KeyCode, KeyboardEvent,
    PendingChange,
};

use crate::disclosure::DisclosureRegistry;
use crate::roving::Direction;

/// Whether moving focus also selects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ActivationMode {
    /// Arrow keys select the tab they land on.
    #[default]
    Automatic,
    /// Arrow keys only move focus; Enter/Space/click select.
    Manual,
}

/// Which arrow keys move between triggers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Orientation {
    /// ArrowLeft / ArrowRight.
    #[default]
    Horizontal,
    /// ArrowUp / ArrowDown.
    Vertical,
}

impl Orientation {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Horizontal => "horizontal",
            Self::Vertical => "vertical",
        }
    }

    fn direction_for(self, code: KeyCode) -> Option<Direction> {
        match (self, code) {
            (Self::Horizontal, KeyCode::Right) | (Self::Vertical, KeyCode::Down) => {
                Some(Direction::Forward)
            }
            (Self::Horizontal, KeyCode::Left) | (Self::Vertical, KeyCode::Up) => {
                Some(Direction::Backward)
            }
            _ => None,
        }
    }
}

impl fmt::Display for Orientation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

struct TabsState {
    value: Controllable<Option<String>>,
    activation: ActivationMode,
    orientation: Orientation,
    items: DisclosureRegistry,
}

impl TabsState {
    /// Move an uncontrolled selection to the first enabled trigger.
    fn reselect_first(&mut self) -> Option<PendingChange<Option<String>>> {
        if self.value.is_controlled() {
            return None;
        }
        let first = self.items.first_enabled().map(str::to_owned);
        self.value.propose(first)
    }
}

fn announce(change: Option<PendingChange<Option<String>>>) {
    if let Some(change) = change {
        mosaic_core::debug!(
            selected = ?change.value(),
            applied = change.applied(),
            "tab selection changed"
        );
        if change.value().is_some() {
            change.notify();
        }
    }
}

/// Tabs root handle. Clones share state.
#[derive(Clone)]
pub struct Tabs {
    state: Rc<RefCell<TabsState>>,
}

impl fmt::Debug for Tabs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.borrow();
        f.debug_struct("Tabs")
            .field("value", &state.value)
            .field("activation", &state.activation)
            .field("orientation", &state.orientation)
            .field("items", &state.items)
            .finish()
    }
}

impl Default for Tabs {
    fn default() -> Self {
        Self::new(Controllable::uncontrolled(None))
    }
}

impl Tabs {
    #[must_use]
    pub fn new(value: Controllable<Option<String>>) -> Self {
        Self {
            state: Rc::new(RefCell::new(TabsState {
                value,
                activation: ActivationMode::default(),
                orientation: Orientation::default(),
                items: DisclosureRegistry::with_generated_prefix("tab"),
            })),
        }
    }

    #[must_use]
    pub fn activation(self, activation: ActivationMode) -> Self {
        self.state.borrow_mut().activation = activation;
        self
    }

    #[must_use]
    pub fn orientation(self, orientation: Orientation) -> Self {
        self.state.borrow_mut().orientation = orientation;
        self
    }

    /// Replace the generated DOM id prefix. Registered triggers are kept.
    #[must_use]
    pub fn with_id_prefix(self, prefix: &str) -> Self {
        self.state.borrow_mut().items.set_prefix(prefix);
        self
    }

    #[must_use]
    pub fn activation_mode(&self) -> ActivationMode {
        self.state.borrow().activation
    }

    #[must_use]
    pub fn orientation_value(&self) -> Orientation {
        self.state.borrow().orientation
    }

    #[must_use]
    pub fn selected(&self) -> Option<String> {
        self.state.borrow().value.get().clone()
    }

    #[must_use]
    pub fn is_selected(&self, id: &str) -> bool {
        self.state.borrow().value.get().as_deref() == Some(id)
    }

    #[must_use]
    pub fn is_controlled(&self) -> bool {
        self.state.borrow().value.is_controlled()
    }

    /// Mirror the caller's value into a controlled root.
    pub fn sync(&self, value: Option<String>) -> bool {
        self.state.borrow_mut().value.sync(value)
    }

    /// Register a trigger and return its part handle.
    pub fn register(&self, id: impl Into<String>) -> TabsTrigger {
        let id = id.into();
        let change = {
            let mut state = self.state.borrow_mut();
            state.items.register(&id);
            if state.value.get().is_none() {
                state.reselect_first()
            } else {
                None
            }
        };
        announce(change);
        TabsTrigger {
            root: Rc::downgrade(&self.state),
            id,
        }
    }

    /// A panel bound to `id`. Panels do not register.
    #[must_use]
    pub fn panel(&self, id: impl Into<String>) -> TabsPanel {
        TabsPanel {
            root: Rc::downgrade(&self.state),
            id: id.into(),
        }
    }

    fn unregister(&self, id: &str) {
        let change = {
            let mut state = self.state.borrow_mut();
            if !state.items.unregister(id) {
                return;
            }
            if state.value.get().as_deref() == Some(id) {
                state.reselect_first()
            } else {
                None
            }
        };
        announce(change);
    }

    /// Enable or disable a trigger. Disabling the selected one advances.
    pub fn set_disabled(&self, id: &str, disabled: bool) {
        let change = {
            let mut state = self.state.borrow_mut();
            if !state.items.set_disabled(id, disabled) {
                return;
            }
            if disabled && state.value.get().as_deref() == Some(id) {
                state.reselect_first()
            } else {
                None
            }
        };
        announce(change);
    }

    #[must_use]
    pub fn is_disabled(&self, id: &str) -> bool {
        self.state.borrow().items.is_disabled(id)
    }

    pub fn set_trigger(&self, id: &str, handle: Option<FocusRef>) {
        self.state.borrow_mut().items.set_handle(id, handle);
    }

    /// Select a trigger.
    pub fn select(&self, id: &str) {
        let change = {
            let mut state = self.state.borrow_mut();
            if state.items.is_disabled(id) {
                return;
            }
            state.value.propose(Some(id.to_owned()))
        };
        announce(change);
    }

    /// Focus `id` and, in automatic mode, select it.
    fn land_on(&self, id: Option<String>) {
        let Some(id) = id else {
            return;
        };
        let (handle, automatic) = {
            let state = self.state.borrow();
            (
                state.items.handle(&id),
                state.activation == ActivationMode::Automatic,
            )
        };
        if let Some(handle) = handle {
            handle.focus();
        }
        if automatic {
            self.select(&id);
        }
    }

    /// Move to the next enabled trigger after `from`, wrapping.
    pub fn move_focus(&self, from: Option<&str>, direction: Direction) {
        let next = self
            .state
            .borrow()
            .items
            .next_enabled(from, direction)
            .map(str::to_owned);
        self.land_on(next);
    }

    pub fn focus_first(&self) {
        let first = self.state.borrow().items.first_enabled().map(str::to_owned);
        self.land_on(first);
    }

    pub fn focus_last(&self) {
        let last = self.state.borrow().items.last_enabled().map(str::to_owned);
        self.land_on(last);
    }

    /// Whether the trigger for `id` takes part in the page tab order.
    #[must_use]
    pub fn is_tab_stop(&self, id: &str) -> bool {
        let state = self.state.borrow();
        if !state.items.contains(id) || state.items.is_disabled(id) {
            return false;
        }
        match state.value.get() {
            Some(selected) => selected == id,
            None => state.items.first_enabled() == Some(id),
        }
    }

    #[must_use]
    pub fn trigger_id(&self, id: &str) -> String {
        self.state.borrow().items.dom_id(id, "trigger")
    }

    #[must_use]
    pub fn panel_id(&self, id: &str) -> String {
        self.state.borrow().items.dom_id(id, "panel")
    }

    /// Keyboard handling for the trigger of `id`.
    pub fn handle_key(&self, id: &str, event: &mut KeyboardEvent) -> EventResult {
        if event.is_default_prevented() || !event.key.is_press() || self.is_disabled(id) {
            return EventResult::NotHandled;
        }
        let code = event.code();
        if let Some(direction) = self.orientation_value().direction_for(code) {
            self.move_focus(Some(id), direction);
        } else {
            match code {
                KeyCode::Home => self.focus_first(),
                KeyCode::End => self.focus_last(),
                KeyCode::Enter | KeyCode::Char(' ') => self.select(id),
                _ => return EventResult::NotHandled,
            }
        }
        event.prevent_default();
        EventResult::Handled
    }
}

// ---------------------------------------------------------------------------
// Parts
// ---------------------------------------------------------------------------

fn missing(part: &'static str) -> ContextError {
    ContextError::MissingRoot { part, root: "Tabs" }
}

/// A registered trigger. Unregisters on drop.
pub struct TabsTrigger {
    root: Weak<RefCell<TabsState>>,
    id: String,
}

impl fmt::Debug for TabsTrigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TabsTrigger").field("id", &self.id).finish()
    }
}

impl TabsTrigger {
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    fn root(&self) -> ContextResult<Tabs> {
        self.root
            .upgrade()
            .map(|state| Tabs { state })
            .ok_or_else(|| missing("TabsTrigger"))
    }

    pub fn is_selected(&self) -> ContextResult<bool> {
        Ok(self.root()?.is_selected(&self.id))
    }

    pub fn is_tab_stop(&self) -> ContextResult<bool> {
        Ok(self.root()?.is_tab_stop(&self.id))
    }

    /// Pointer activation.
    pub fn click(&self) -> ContextResult<()> {
        self.root()?.select(&self.id);
        Ok(())
    }

    pub fn set_disabled(&self, disabled: bool) -> ContextResult<()> {
        self.root()?.set_disabled(&self.id, disabled);
        Ok(())
    }

    pub fn set_trigger(&self, handle: Option<FocusRef>) -> ContextResult<()> {
        self.root()?.set_trigger(&self.id, handle);
        Ok(())
    }

    pub fn trigger_id(&self) -> ContextResult<String> {
        Ok(self.root()?.trigger_id(&self.id))
    }

    /// The panel this trigger controls (`aria-controls`).
    pub fn panel_id(&self) -> ContextResult<String> {
        Ok(self.root()?.panel_id(&self.id))
    }

    pub fn handle_key(&self, event: &mut KeyboardEvent) -> ContextResult<EventResult> {
        Ok(self.root()?.handle_key(&self.id, event))
    }
}

impl Drop for TabsTrigger {
    fn drop(&mut self) {
        if let Some(state) = self.root.upgrade() {
            Tabs { state }.unregister(&self.id);
        }
    }
}

/// A panel. Visible while its id is selected.
pub struct TabsPanel {
    root: Weak<RefCell<TabsState>>,
    id: String,
}

impl fmt::Debug for TabsPanel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TabsPanel").field("id", &self.id).finish()
    }
}

impl TabsPanel {
    fn root(&self) -> ContextResult<Tabs> {
        self.root
            .upgrade()
            .map(|state| Tabs { state })
            .ok_or_else(|| missing("TabsPanel"))
    }

    pub fn is_selected(&self) -> ContextResult<bool> {
        Ok(self.root()?.is_selected(&self.id))
    }

    pub fn panel_id(&self) -> ContextResult<String> {
        Ok(self.root()?.panel_id(&self.id))
    }

    /// The trigger labelling this panel (`aria-labelledby`).
    pub fn labelled_by(&self) -> ContextResult<String> {
        Ok(self.root()?.trigger_id(&self.id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mosaic_core::Modifiers;
    use mosaic_core::testing::FocusDocument;

    fn press(code: KeyCode) -> KeyboardEvent {
        KeyboardEvent::press(code, Modifiers::NONE)
    }

    fn recorder() -> (
        Rc<RefCell<Vec<Option<String>>>>,
        impl Fn(&Option<String>) + 'static,
    ) {
        let log = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&log);
        (log, move |v: &Option<String>| sink.borrow_mut().push(v.clone()))
    }

    #[test]
    fn first_registration_selects_and_removal_advances() {
        let tabs = Tabs::default();
        let a = tabs.register("a");
        let _b = tabs.register("b");
        let _c = tabs.register("c");
        assert_eq!(tabs.selected().as_deref(), Some("a"));
        drop(a);
        assert_eq!(tabs.selected().as_deref(), Some("b"));
    }

    #[test]
    fn removing_last_clears_without_notifying() {
        let (log, cb) = recorder();
        let tabs = Tabs::new(Controllable::uncontrolled(None).with_on_change(cb));
        let a = tabs.register("a");
        drop(a);
        assert_eq!(tabs.selected(), None);
        assert_eq!(*log.borrow(), vec![Some("a".to_owned())]);
    }

    #[test]
    fn disabling_selected_advances() {
        let tabs = Tabs::default();
        let a = tabs.register("a");
        let _b = tabs.register("b");
        a.set_disabled(true).unwrap();
        assert_eq!(tabs.selected().as_deref(), Some("b"));
        a.click().unwrap();
        assert_eq!(tabs.selected().as_deref(), Some("b"));
    }

    #[test]
    fn disabling_the_only_trigger_clears_until_the_next_registration() {
        let tabs = Tabs::default();
        let a = tabs.register("a");
        a.set_disabled(true).unwrap();
        assert_eq!(tabs.selected(), None);
        let _b = tabs.register("b");
        assert_eq!(tabs.selected().as_deref(), Some("b"));
    }

    #[test]
    fn controlled_suppresses_reconciliation() {
        let (log, cb) = recorder();
        let tabs = Tabs::new(Controllable::controlled(None).with_on_change(cb));
        let _a = tabs.register("a");
        assert_eq!(tabs.selected(), None);
        assert!(log.borrow().is_empty());

        let b = tabs.register("b");
        b.click().unwrap();
        assert_eq!(tabs.selected(), None);
        assert_eq!(*log.borrow(), vec![Some("b".to_owned())]);

        tabs.sync(Some("b".to_owned()));
        drop(b);
        assert_eq!(tabs.selected().as_deref(), Some("b"));
        assert_eq!(log.borrow().len(), 1);
    }

    #[test]
    fn tab_stop_tracks_selection() {
        let tabs = Tabs::new(Controllable::controlled(None));
        let a = tabs.register("a");
        let b = tabs.register("b");
        assert!(a.is_tab_stop().unwrap());
        assert!(!b.is_tab_stop().unwrap());
        tabs.sync(Some("b".to_owned()));
        assert!(!a.is_tab_stop().unwrap());
        assert!(b.is_tab_stop().unwrap());
        b.set_disabled(true).unwrap();
        assert!(!b.is_tab_stop().unwrap());
    }

    #[test]
    fn automatic_activation_selects_on_arrow() {
        let doc = FocusDocument::new();
        let tabs = Tabs::default();
        let triggers: Vec<_> = ["a", "b", "c"].iter().map(|id| tabs.register(*id)).collect();
        for t in &triggers {
            t.set_trigger(Some(doc.element(t.id()).handle())).unwrap();
        }
        let mut right = press(KeyCode::Right);
        assert_eq!(triggers[0].handle_key(&mut right).unwrap(), EventResult::Handled);
        assert_eq!(doc.active_name().as_deref(), Some("b"));
        assert_eq!(tabs.selected().as_deref(), Some("b"));

        // Vertical arrows are ignored in a horizontal list.
        let mut down = press(KeyCode::Down);
        assert_eq!(triggers[1].handle_key(&mut down).unwrap(), EventResult::NotHandled);

        let mut left = press(KeyCode::Left);
        triggers[0].handle_key(&mut left).unwrap();
        assert_eq!(tabs.selected().as_deref(), Some("c"));
    }

    #[test]
    fn manual_activation_only_moves_focus() {
        let doc = FocusDocument::new();
        let tabs = Tabs::default()
            .activation(ActivationMode::Manual)
            .orientation(Orientation::Vertical);
        let triggers: Vec<_> = ["a", "b"].iter().map(|id| tabs.register(*id)).collect();
        for t in &triggers {
            t.set_trigger(Some(doc.element(t.id()).handle())).unwrap();
        }
        let mut end = press(KeyCode::End);
        triggers[0].handle_key(&mut end).unwrap();
        assert_eq!(doc.active_name().as_deref(), Some("b"));
        assert_eq!(tabs.selected().as_deref(), Some("a"));

        let mut enter = press(KeyCode::Enter);
        triggers[1].handle_key(&mut enter).unwrap();
        assert!(enter.is_default_prevented());
        assert_eq!(tabs.selected().as_deref(), Some("b"));
    }

    #[test]
    fn late_prefix_keeps_registered_triggers() {
        let tabs = Tabs::default();
        let a = tabs.register("a");
        let b = tabs.register("b");
        b.set_disabled(true).unwrap();
        let tabs = tabs.with_id_prefix("nav");

        assert_eq!(tabs.selected().as_deref(), Some("a"));
        assert!(tabs.is_disabled("b"));
        assert_eq!(a.trigger_id().unwrap(), "mosaic-tab-nav-a-1-trigger");
        assert_eq!(b.panel_id().unwrap(), "mosaic-tab-nav-b-2-panel");

        let mut right = press(KeyCode::Right);
        a.handle_key(&mut right).unwrap();
        assert_eq!(tabs.selected().as_deref(), Some("a"));
    }

    #[test]
    fn parts_need_their_root() {
        let tabs = Tabs::default().with_id_prefix("nav");
        let panel = tabs.panel("a");
        let trigger = tabs.register("a");
        assert_eq!(panel.panel_id().unwrap(), "mosaic-tab-nav-a-1-panel");
        assert_eq!(panel.labelled_by().unwrap(), "mosaic-tab-nav-a-1-trigger");
        assert!(panel.is_selected().unwrap());
        drop(tabs);
        assert_eq!(
            panel.is_selected().unwrap_err().to_string(),
            "TabsPanel must be used within Tabs"
        );
        assert_eq!(
            trigger.click().unwrap_err().to_string(),
            "TabsTrigger must be used within Tabs"
        );
    }
}
