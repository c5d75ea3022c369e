#![forbid(unsafe_code)]

//! Accordion: a stack of collapsible sections.
//!
//! [`Accordion`] is the root; each section is an [`AccordionItem`] obtained
//! from [`Accordion::register`]. The open set is a [`Controllable`] list of
//! ids.
//!
//! # Invariants
//!
//! 1. In single mode at most one id is open.
//! 2. Uncontrolled: the open set only holds registered, enabled ids once
//!    they have been registered; unregistering or disabling an open id
//!    closes it.
//! 3. Controlled: the open set moves only through [`Accordion::sync`]; every
//!    change, including eviction, is only proposed to the change callback.
//! 4. Change callbacks and focus moves run with no internal borrow held.
//!
//! # Failure Modes
//!
//! | Condition | Behavior |
//! |-----------|----------|
//! | Item used after its root is dropped | `ContextError::MissingRoot` |
//! | Toggle of a disabled id | Ignored |
//! | Single mode, toggle the open item, not collapsible | No-op |

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use mosaic_core::{
    ContextError, ContextResult, Controllable, EventResult, FocusRef, KeyCode, KeyboardEvent,
};

use crate::disclosure::DisclosureRegistry;
use crate::roving::Direction;

/// How many sections may be open at once.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccordionMode {
    /// At most one open section. `collapsible` allows closing it again.
    Single { collapsible: bool },
    /// Any subset of sections.
    Multiple,
}

impl Default for AccordionMode {
    fn default() -> Self {
        Self::Single { collapsible: false }
    }
}

struct AccordionState {
    mode: AccordionMode,
    value: Controllable<Vec<String>>,
    items: DisclosureRegistry,
}

impl AccordionState {
    fn normalize(&self, mut values: Vec<String>) -> Vec<String> {
        if matches!(self.mode, AccordionMode::Single { .. }) {
            values.truncate(1);
        }
        values
    }
}

/// Accordion root handle. Clones share state.
#[derive(Clone)]
pub struct Accordion {
    state: Rc<RefCell<AccordionState>>,
}

impl std::fmt::Debug for Accordion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.borrow();
        f.debug_struct("Accordion")
            .field("mode", &state.mode)
            .field("value", &state.value)
            .field("items", &state.items)
            .finish()
    }
}

impl Accordion {
    /// Create a root. In single mode only the first initial value is kept.
    #[must_use]
    pub fn new(mode: AccordionMode, value: Controllable<Vec<String>>) -> Self {
        let mut state = AccordionState {
            mode,
            value,
            items: DisclosureRegistry::with_generated_prefix("accordion"),
        };
        let initial = state.normalize(state.value.get().clone());
        if state.value.is_controlled() {
            state.value.sync(initial);
        } else if let Some(change) = state.value.propose(initial) {
            // Construction-time normalization is not a user-visible change.
            drop(change);
        }
        Self {
            state: Rc::new(RefCell::new(state)),
        }
    }

    /// Uncontrolled single-mode accordion with nothing open.
    #[must_use]
    pub fn single(collapsible: bool) -> Self {
        Self::new(
            AccordionMode::Single { collapsible },
            Controllable::uncontrolled(Vec::new()),
        )
    }

    /// Uncontrolled multiple-mode accordion with nothing open.
    #[must_use]
    pub fn multiple() -> Self {
        Self::new(AccordionMode::Multiple, Controllable::uncontrolled(Vec::new()))
    }

    /// Replace the generated DOM id prefix.
    #[must_use]
    pub fn with_id_prefix(self, prefix: &str) -> Self {
        self.state.borrow_mut().items.set_prefix(prefix);
        self
    }

    #[must_use]
    pub fn mode(&self) -> AccordionMode {
        self.state.borrow().mode
    }

    #[must_use]
    pub fn is_controlled(&self) -> bool {
        self.state.borrow().value.is_controlled()
    }

    /// Open ids, in the order they were opened.
    #[must_use]
    pub fn open_values(&self) -> Vec<String> {
        self.state.borrow().value.get().clone()
    }

    #[must_use]
    pub fn is_open(&self, id: &str) -> bool {
        self.state.borrow().value.get().iter().any(|v| v == id)
    }

    /// Mirror the caller's value into a controlled accordion.
    pub fn sync(&self, values: Vec<String>) -> bool {
        let mut state = self.state.borrow_mut();
        let values = state.normalize(values);
        state.value.sync(values)
    }

    /// Register a section and return its part handle.
    ///
    /// Dropping the handle unregisters the id, so keep one handle per id.
    pub fn register(&self, id: impl Into<String>) -> AccordionItem {
        let id = id.into();
        if self.state.borrow_mut().items.register(&id) {
            mosaic_core::trace!(id = %id, "accordion item registered");
        }
        AccordionItem {
            root: Rc::downgrade(&self.state),
            id,
        }
    }

    fn unregister(&self, id: &str) {
        if self.state.borrow_mut().items.unregister(id) {
            mosaic_core::trace!(id = %id, "accordion item unregistered");
            self.evict(id);
        }
    }

    /// Propose the open set without `id`.
    fn evict(&self, id: &str) {
        let change = {
            let mut state = self.state.borrow_mut();
            let current = state.value.get();
            if !current.iter().any(|v| v == id) {
                return;
            }
            let next: Vec<String> = current.iter().filter(|v| *v != id).cloned().collect();
            state.value.propose(next)
        };
        if let Some(change) = change {
            change.notify();
        }
    }

    /// Enable or disable a section. Disabling an open section closes it.
    pub fn set_disabled(&self, id: &str, disabled: bool) {
        let known = self.state.borrow_mut().items.set_disabled(id, disabled);
        if known && disabled {
            self.evict(id);
        }
    }

    #[must_use]
    pub fn is_disabled(&self, id: &str) -> bool {
        self.state.borrow().items.is_disabled(id)
    }

    /// Attach the focus handle of a section's trigger.
    pub fn set_trigger(&self, id: &str, handle: Option<FocusRef>) {
        self.state.borrow_mut().items.set_handle(id, handle);
    }

    /// Open or close a section according to the mode.
    pub fn toggle(&self, id: &str) {
        let change = {
            let mut state = self.state.borrow_mut();
            if state.items.is_disabled(id) {
                return;
            }
            let current = state.value.get();
            let is_open = current.iter().any(|v| v == id);
            let next = match state.mode {
                AccordionMode::Multiple if is_open => {
                    current.iter().filter(|v| *v != id).cloned().collect()
                }
                AccordionMode::Multiple => {
                    let mut next = current.clone();
                    next.push(id.to_owned());
                    next
                }
                AccordionMode::Single { collapsible } if is_open => {
                    if !collapsible {
                        return;
                    }
                    Vec::new()
                }
                AccordionMode::Single { .. } => vec![id.to_owned()],
            };
            state.value.propose(next)
        };
        if let Some(change) = change {
            mosaic_core::debug!(
                id = %id,
                applied = change.applied(),
                open = change.value().len(),
                "accordion toggled"
            );
            change.notify();
        }
    }

    fn focus_id(&self, id: Option<String>) {
        let handle = id.and_then(|id| self.state.borrow().items.handle(&id));
        if let Some(handle) = handle {
            handle.focus();
        }
    }

    /// Focus the next enabled trigger after `from`, wrapping.
    pub fn move_focus(&self, from: &str, direction: Direction) {
        let next = self
            .state
            .borrow()
            .items
            .next_enabled(Some(from), direction)
            .map(str::to_owned);
        self.focus_id(next);
    }

    pub fn focus_first(&self) {
        let first = self.state.borrow().items.first_enabled().map(str::to_owned);
        self.focus_id(first);
    }

    pub fn focus_last(&self) {
        let last = self.state.borrow().items.last_enabled().map(str::to_owned);
        self.focus_id(last);
    }

    #[must_use]
    pub fn trigger_id(&self, id: &str) -> String {
        self.state.borrow().items.dom_id(id, "trigger")
    }

    #[must_use]
    pub fn content_id(&self, id: &str) -> String {
        self.state.borrow().items.dom_id(id, "content")
    }

    /// Keyboard handling for the trigger of `id`.
    ///
    /// ArrowDown/ArrowUp move focus, Home/End jump, Enter/Space toggle.
    pub fn handle_key(&self, id: &str, event: &mut KeyboardEvent) -> EventResult {
        if event.is_default_prevented() || !event.key.is_press() || self.is_disabled(id) {
            return EventResult::NotHandled;
        }
        match event.code() {
            KeyCode::Down => self.move_focus(id, Direction::Forward),
            KeyCode::Up => self.move_focus(id, Direction::Backward),
            KeyCode::Home => self.focus_first(),
            KeyCode::End => self.focus_last(),
            KeyCode::Enter | KeyCode::Char(' ') => self.toggle(id),
            _ => return EventResult::NotHandled,
        }
        event.prevent_default();
        EventResult::Handled
    }
}

// ---------------------------------------------------------------------------
// AccordionItem
// ---------------------------------------------------------------------------

/// One registered section. Unregisters on drop.
pub struct AccordionItem {
    root: Weak<RefCell<AccordionState>>,
    id: String,
}

impl std::fmt::Debug for AccordionItem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccordionItem")
            .field("id", &self.id)
            .field("attached", &(self.root.strong_count() > 0))
            .finish()
    }
}

impl AccordionItem {
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    fn root(&self) -> ContextResult<Accordion> {
        self.root
            .upgrade()
            .map(|state| Accordion { state })
            .ok_or(ContextError::MissingRoot {
                part: "AccordionItem",
                root: "Accordion",
            })
    }

    pub fn is_open(&self) -> ContextResult<bool> {
        Ok(self.root()?.is_open(&self.id))
    }

    pub fn is_disabled(&self) -> ContextResult<bool> {
        Ok(self.root()?.is_disabled(&self.id))
    }

    pub fn toggle(&self) -> ContextResult<()> {
        self.root()?.toggle(&self.id);
        Ok(())
    }

    /// Pointer activation of the trigger.
    pub fn click(&self) -> ContextResult<()> {
        self.toggle()
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

    pub fn content_id(&self) -> ContextResult<String> {
        Ok(self.root()?.content_id(&self.id))
    }

    pub fn handle_key(&self, event: &mut KeyboardEvent) -> ContextResult<EventResult> {
        Ok(self.root()?.handle_key(&self.id, event))
    }
}

impl Drop for AccordionItem {
    fn drop(&mut self) {
        if let Some(state) = self.root.upgrade() {
            Accordion { state }.unregister(&self.id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mosaic_core::Modifiers;
    use mosaic_core::testing::FocusDocument;

    fn recorder() -> (Rc<RefCell<Vec<Vec<String>>>>, impl Fn(&Vec<String>) + 'static) {
        let log = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&log);
        (log, move |v: &Vec<String>| sink.borrow_mut().push(v.clone()))
    }

    fn press(code: KeyCode) -> KeyboardEvent {
        KeyboardEvent::press(code, Modifiers::NONE)
    }

    #[test]
    fn single_mode_is_exclusive() {
        let acc = Accordion::single(false);
        let _a = acc.register("a");
        let _b = acc.register("b");
        acc.toggle("a");
        assert_eq!(acc.open_values(), vec!["a"]);
        acc.toggle("b");
        assert_eq!(acc.open_values(), vec!["b"]);
    }

    #[test]
    fn single_mode_without_collapsible_keeps_item_open() {
        let (log, cb) = recorder();
        let acc = Accordion::new(
            AccordionMode::Single { collapsible: false },
            Controllable::uncontrolled(vec!["a".to_owned()]).with_on_change(cb),
        );
        let _a = acc.register("a");
        acc.toggle("a");
        assert_eq!(acc.open_values(), vec!["a"]);
        assert!(log.borrow().is_empty());
    }

    #[test]
    fn collapsible_single_mode_closes() {
        let acc = Accordion::single(true);
        let _a = acc.register("a");
        acc.toggle("a");
        acc.toggle("a");
        assert!(acc.open_values().is_empty());
    }

    #[test]
    fn multiple_mode_toggles_independently() {
        let acc = Accordion::multiple();
        let _items: Vec<_> = ["a", "b", "c"].iter().map(|id| acc.register(*id)).collect();
        acc.toggle("a");
        acc.toggle("c");
        assert_eq!(acc.open_values(), vec!["a", "c"]);
        acc.toggle("a");
        assert_eq!(acc.open_values(), vec!["c"]);
    }

    #[test]
    fn single_mode_truncates_initial_value() {
        let acc = Accordion::new(
            AccordionMode::Single { collapsible: true },
            Controllable::uncontrolled(vec!["a".to_owned(), "b".to_owned()]),
        );
        assert_eq!(acc.open_values(), vec!["a"]);
    }

    #[test]
    fn unregister_and_disable_evict_open_ids() {
        let (log, cb) = recorder();
        let acc = Accordion::new(
            AccordionMode::Multiple,
            Controllable::uncontrolled(Vec::new()).with_on_change(cb),
        );
        let a = acc.register("a");
        let b = acc.register("b");
        a.toggle().unwrap();
        b.toggle().unwrap();
        drop(a);
        assert_eq!(acc.open_values(), vec!["b"]);
        b.set_disabled(true).unwrap();
        assert!(acc.open_values().is_empty());
        assert_eq!(log.borrow().len(), 4);
        assert_eq!(log.borrow()[2], vec!["b".to_owned()]);
    }

    #[test]
    fn disabled_items_do_not_toggle() {
        let acc = Accordion::multiple();
        let a = acc.register("a");
        a.set_disabled(true).unwrap();
        a.toggle().unwrap();
        assert!(!a.is_open().unwrap());
    }

    #[test]
    fn controlled_only_notifies() {
        let (log, cb) = recorder();
        let acc = Accordion::new(
            AccordionMode::Multiple,
            Controllable::controlled(vec!["a".to_owned()]).with_on_change(cb),
        );
        let a = acc.register("a");
        let _b = acc.register("b");
        acc.toggle("b");
        assert_eq!(acc.open_values(), vec!["a"]);
        assert_eq!(*log.borrow(), vec![vec!["a".to_owned(), "b".to_owned()]]);

        // Eviction is proposed, not applied.
        drop(a);
        assert_eq!(acc.open_values(), vec!["a"]);
        assert_eq!(log.borrow().last().cloned(), Some(Vec::<String>::new()));

        assert!(acc.sync(vec!["b".to_owned()]));
        assert!(acc.is_open("b"));
    }

    #[test]
    fn item_outside_root_is_an_error() {
        let acc = Accordion::multiple();
        let item = acc.register("a");
        drop(acc);
        let err = item.toggle().unwrap_err();
        assert_eq!(
            err,
            ContextError::MissingRoot {
                part: "AccordionItem",
                root: "Accordion"
            }
        );
        assert!(item.trigger_id().is_err());
    }

    #[test]
    fn keyboard_moves_focus_and_toggles() {
        let doc = FocusDocument::new();
        let acc = Accordion::multiple();
        let items: Vec<_> = ["a", "b", "c"].iter().map(|id| acc.register(*id)).collect();
        for item in &items {
            item.set_trigger(Some(doc.element(item.id()).handle())).unwrap();
        }
        items[1].set_disabled(true).unwrap();

        let mut down = press(KeyCode::Down);
        assert_eq!(items[0].handle_key(&mut down).unwrap(), EventResult::Handled);
        assert!(down.is_default_prevented());
        assert_eq!(doc.active_name().as_deref(), Some("c"));

        let mut down = press(KeyCode::Down);
        items[2].handle_key(&mut down).unwrap();
        assert_eq!(doc.active_name().as_deref(), Some("a"));

        let mut end = press(KeyCode::End);
        items[0].handle_key(&mut end).unwrap();
        assert_eq!(doc.active_name().as_deref(), Some("c"));

        let mut space = press(KeyCode::Char(' '));
        items[2].handle_key(&mut space).unwrap();
        assert_eq!(acc.open_values(), vec!["c"]);

        // Disabled triggers and prevented events are left alone.
        let mut enter = press(KeyCode::Enter);
        assert_eq!(items[1].handle_key(&mut enter).unwrap(), EventResult::NotHandled);
        let mut enter = press(KeyCode::Enter);
        enter.prevent_default();
        assert_eq!(items[0].handle_key(&mut enter).unwrap(), EventResult::NotHandled);
        assert!(!acc.is_open("a"));
    }

    #[test]
    fn dom_ids_follow_prefix() {
        let acc = Accordion::multiple().with_id_prefix("faq");
        let item = acc.register("Billing & plans");
        assert_eq!(
            item.trigger_id().unwrap(),
            "mosaic-accordion-faq-Billing---plans-1-trigger"
        );
        assert_eq!(
            item.content_id().unwrap(),
            "mosaic-accordion-faq-Billing---plans-1-content"
        );
    }
}
