#![forbid(unsafe_code)]

//! Filterable single-select combobox.
//!
//! The input text doubles as the filter query while the list is open. When
//! the list closes the text snaps back to the selected option's label.
//!
//! # Invariants
//!
//! 1. The highlighted index is re-seeded to the first enabled match every
//!    time the list opens or the filtered set changes.
//! 2. Arrow traversal wraps and never lands on a disabled option.
//! 3. Disabled options are never selected.
//!
//! # Failure Modes
//!
//! | Condition | Behavior |
//! |-----------|----------|
//! | No matches | Enter does nothing; `active_descendant` is `None` |
//! | Selected value not among options | Input shows `""` |

use std::fmt;

use mosaic_core::{Controllable, EventResult, HandlerChain, KeyCode, KeyboardEvent};

use crate::disclosure::next_instance;
use crate::roving::{self, Direction};

/// One choice.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ComboOption {
    pub value: String,
    pub label: String,
    pub description: Option<String>,
    pub disabled: bool,
}

impl ComboOption {
    #[must_use]
    pub fn new(value: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            label: label.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    #[must_use]
    pub fn disabled(mut self, disabled: bool) -> Self {
        self.disabled = disabled;
        self
    }

    fn matches(&self, query: &str) -> bool {
        self.label.to_lowercase().contains(query) || self.value.to_lowercase().contains(query)
    }
}

/// Combobox state.
pub struct Combobox {
    options: Vec<ComboOption>,
    value: Controllable<Option<String>>,
    input: String,
    open: bool,
    highlighted: usize,
    disabled: bool,
    listbox_id: String,
    empty_message: String,
    key_handlers: HandlerChain<KeyboardEvent>,
}

impl fmt::Debug for Combobox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Combobox")
            .field("value", &self.value)
            .field("input", &self.input)
            .field("open", &self.open)
            .field("highlighted", &self.highlighted)
            .field("disabled", &self.disabled)
            .finish_non_exhaustive()
    }
}

impl Combobox {
    #[must_use]
    pub fn new(options: Vec<ComboOption>, value: Controllable<Option<String>>) -> Self {
        let mut combobox = Self {
            options,
            value,
            input: String::new(),
            open: false,
            highlighted: 0,
            disabled: false,
            listbox_id: format!("mosaic-combobox-r{}-listbox", next_instance()),
            empty_message: "No results".to_owned(),
            key_handlers: HandlerChain::new(),
        };
        combobox.reset_input();
        combobox
    }

    /// Derive the listbox id from the input's id.
    #[must_use]
    pub fn with_input_id(mut self, id: &str) -> Self {
        self.listbox_id = format!("{id}-listbox");
        self
    }

    #[must_use]
    pub fn empty_message(mut self, message: impl Into<String>) -> Self {
        self.empty_message = message.into();
        self
    }

    #[must_use]
    pub fn disabled(mut self, disabled: bool) -> Self {
        self.set_disabled(disabled);
        self
    }

    /// Disabling closes the list.
    pub fn set_disabled(&mut self, disabled: bool) {
        self.disabled = disabled;
        if disabled {
            self.close();
        }
    }

    /// Add a caller key handler; it runs before the built-in keys.
    pub fn on_key(&mut self, handler: impl FnMut(&mut KeyboardEvent) -> EventResult + 'static) {
        self.key_handlers.push(handler);
    }

    #[must_use]
    pub fn options(&self) -> &[ComboOption] {
        &self.options
    }

    /// Replace the options.
    pub fn set_options(&mut self, options: Vec<ComboOption>) {
        self.options = options;
        if self.open {
            self.rehighlight();
        } else {
            self.reset_input();
        }
    }

    #[must_use]
    pub fn value(&self) -> Option<&str> {
        self.value.get().as_deref()
    }

    #[must_use]
    pub fn selected_option(&self) -> Option<&ComboOption> {
        let value = self.value()?;
        self.options.iter().find(|o| o.value == value)
    }

    #[must_use]
    pub fn input(&self) -> &str {
        &self.input
    }

    #[must_use]
    pub fn is_open(&self) -> bool {
        self.open
    }

    #[must_use]
    pub fn is_disabled(&self) -> bool {
        self.disabled
    }

    #[must_use]
    pub fn is_controlled(&self) -> bool {
        self.value.is_controlled()
    }

    #[must_use]
    pub fn listbox_id(&self) -> &str {
        &self.listbox_id
    }

    /// Index into [`filtered`](Self::filtered).
    #[must_use]
    pub fn highlighted(&self) -> usize {
        self.highlighted
    }

    /// Options matching the input text, or every option for a blank query.
    #[must_use]
    pub fn filtered(&self) -> Vec<&ComboOption> {
        let query = self.input.trim().to_lowercase();
        self.options
            .iter()
            .filter(|o| query.is_empty() || o.matches(&query))
            .collect()
    }

    /// Message for the empty list, when nothing matches.
    #[must_use]
    pub fn empty_state(&self) -> Option<&str> {
        self.filtered()
            .is_empty()
            .then_some(self.empty_message.as_str())
    }

    /// `aria-activedescendant` for the input.
    #[must_use]
    pub fn active_descendant(&self) -> Option<String> {
        if !self.open || self.highlighted >= self.filtered().len() {
            return None;
        }
        Some(self.option_id(self.highlighted))
    }

    /// Element id of the filtered option at `index`.
    #[must_use]
    pub fn option_id(&self, index: usize) -> String {
        format!("{}-{}", self.listbox_id, index)
    }

    fn rehighlight(&mut self) {
        let filtered = self.filtered();
        self.highlighted = roving::first(filtered.len(), |i| !filtered[i].disabled).unwrap_or(0);
    }

    fn reset_input(&mut self) {
        self.input = self
            .selected_option()
            .map(|o| o.label.clone())
            .unwrap_or_default();
    }

    fn open(&mut self) {
        if self.disabled {
            return;
        }
        if !self.open {
            self.open = true;
            mosaic_core::trace!(listbox = %self.listbox_id, "combobox opened");
        }
        self.rehighlight();
    }

    fn close(&mut self) {
        self.open = false;
    }

    /// The input gained focus.
    pub fn focus(&mut self) {
        self.open();
    }

    /// The user edited the input text.
    pub fn input_changed(&mut self, text: impl Into<String>) {
        if self.disabled {
            return;
        }
        self.input = text.into();
        self.open = false;
        self.open();
    }

    /// The input lost focus. `focus_in_list` is true when focus moved into
    /// the listbox, which keeps the list open.
    pub fn blur(&mut self, focus_in_list: bool) {
        if focus_in_list {
            return;
        }
        self.close();
        self.reset_input();
    }

    /// Pointer over the filtered option at `index`.
    pub fn hover(&mut self, index: usize) {
        if self.filtered().get(index).is_some_and(|o| !o.disabled) {
            self.highlighted = index;
        }
    }

    /// Click on the filtered option at `index`.
    pub fn click(&mut self, index: usize) -> bool {
        let value = match self.filtered().get(index) {
            Some(option) if !option.disabled => option.value.clone(),
            _ => return false,
        };
        self.commit(Some(value));
        true
    }

    /// Select by value. Unknown and disabled values are refused.
    pub fn select(&mut self, value: &str) -> bool {
        let known = self
            .options
            .iter()
            .any(|o| o.value == value && !o.disabled);
        if known {
            self.commit(Some(value.to_owned()));
        }
        known
    }

    /// The clear button.
    pub fn clear(&mut self) {
        self.commit(None);
    }

    fn commit(&mut self, value: Option<String>) {
        let pending = self.value.propose(value);
        self.close();
        self.reset_input();
        if let Some(change) = pending {
            mosaic_core::debug!(value = ?change.value(), applied = change.applied(), "combobox selection changed");
            change.notify();
        }
    }

    /// Mirror the caller's value (controlled mode).
    pub fn sync(&mut self, value: Option<String>) -> bool {
        let synced = self.value.sync(value);
        if synced && !self.open {
            self.reset_input();
        }
        synced
    }

    /// Keys on the input.
    pub fn handle_key(&mut self, event: &mut KeyboardEvent) -> EventResult {
        if self.key_handlers.dispatch(event).is_handled() {
            return EventResult::Handled;
        }
        if event.is_default_prevented() || !event.key.is_press() || self.disabled {
            return EventResult::NotHandled;
        }
        let code = event.code();
        let direction = match code {
            KeyCode::Down => Some(Direction::Forward),
            KeyCode::Up => Some(Direction::Backward),
            _ => None,
        };
        match (direction, code) {
            (Some(_), _) if !self.open => self.open(),
            (Some(direction), _) => {
                let filtered = self.filtered();
                let next = roving::step(
                    filtered.len(),
                    Some(self.highlighted),
                    direction,
                    |i| !filtered[i].disabled,
                );
                if let Some(next) = next {
                    self.highlighted = next;
                }
            }
            (None, KeyCode::Enter) => {
                let highlighted = self.highlighted;
                self.click(highlighted);
            }
            (None, KeyCode::Escape) => self.close(),
            _ => return EventResult::NotHandled,
        }
        event.prevent_default();
        EventResult::Handled
    }
}
