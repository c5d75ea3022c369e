#![forbid(unsafe_code)]

//! Right-click and keyboard context menu.
//!
//! The menu opens at the pointer, or at the trigger's bottom-left corner for
//! the ContextMenu key and Shift+F10. Its position is re-clamped into the
//! viewport whenever the host reports new measurements, so scrolling or
//! resizing keeps it on screen instead of dismissing it.
//!
//! Focus, Escape, Tab and outside presses go through an [`Overlay`].

use std::fmt;
use std::rc::Rc;

use mosaic_core::{
    EventResult, FocusScope, HandlerChain, KeyCode, KeyboardEvent, Point, Rect, Scheduler, Size,
    clamp_to_viewport,
};
use mosaic_shortcuts::ShortcutRegistry;

use crate::overlay::{Overlay, OverlayConfig};
use crate::roving::{self, Direction};

/// Clearance kept between the menu and the viewport edges.
pub const VIEWPORT_INSET: f64 = 8.0;

/// One row of a context menu.
#[derive(Clone, Default)]
pub struct MenuItem {
    pub id: Option<String>,
    pub label: String,
    /// Combos shown as a hint next to the label.
    pub shortcut: Vec<String>,
    pub disabled: bool,
    pub separator: bool,
    on_select: Option<Rc<dyn Fn()>>,
}

impl fmt::Debug for MenuItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MenuItem")
            .field("id", &self.id)
            .field("label", &self.label)
            .field("shortcut", &self.shortcut)
            .field("disabled", &self.disabled)
            .field("separator", &self.separator)
            .finish_non_exhaustive()
    }
}

impl MenuItem {
    #[must_use]
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            ..Self::default()
        }
    }

    /// A divider row; never active or selectable.
    #[must_use]
    pub fn separator() -> Self {
        Self {
            separator: true,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    #[must_use]
    pub fn shortcut(mut self, combo: impl Into<String>) -> Self {
        self.shortcut.push(combo.into());
        self
    }

    #[must_use]
    pub fn disabled(mut self, disabled: bool) -> Self {
        self.disabled = disabled;
        self
    }

    #[must_use]
    pub fn on_select(mut self, f: impl Fn() + 'static) -> Self {
        self.on_select = Some(Rc::new(f));
        self
    }

    /// Neither a separator nor disabled.
    #[must_use]
    pub fn is_selectable(&self) -> bool {
        !self.separator && !self.disabled
    }
}

/// Context menu state for one trigger.
pub struct ContextMenu {
    overlay: Overlay,
    items: Vec<MenuItem>,
    shortcut_labels: Vec<Option<String>>,
    anchor: Point,
    position: Point,
    measured: Option<(Size, Size)>,
    active: usize,
    trigger_handlers: HandlerChain<KeyboardEvent>,
}

impl fmt::Debug for ContextMenu {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContextMenu")
            .field("items", &self.items.len())
            .field("open", &self.is_open())
            .field("position", &self.position)
            .field("active", &self.active)
            .finish_non_exhaustive()
    }
}

impl ContextMenu {
    /// `scope` is the menu surface; it receives focus when the menu opens.
    #[must_use]
    pub fn new(scheduler: &Scheduler, scope: Rc<dyn FocusScope>, items: Vec<MenuItem>) -> Self {
        let shortcut_labels = items
            .iter()
            .map(|item| (!item.shortcut.is_empty()).then(|| item.shortcut.join(" / ")))
            .collect();
        Self {
            overlay: Overlay::new(scheduler, scope, OverlayConfig::default()),
            items,
            shortcut_labels,
            anchor: Point::default(),
            position: Point::default(),
            measured: None,
            active: 0,
            trigger_handlers: HandlerChain::new(),
        }
    }

    /// Format shortcut hints for the registry's platform.
    #[must_use]
    pub fn with_registry(mut self, registry: &ShortcutRegistry) -> Self {
        self.shortcut_labels = self
            .items
            .iter()
            .map(|item| (!item.shortcut.is_empty()).then(|| registry.format(&item.shortcut)))
            .collect();
        self
    }

    /// Add a caller key handler for the trigger; it runs before the built-in
    /// open keys.
    pub fn on_trigger_key(
        &mut self,
        handler: impl FnMut(&mut KeyboardEvent) -> EventResult + 'static,
    ) {
        self.trigger_handlers.push(handler);
    }

    #[must_use]
    pub fn items(&self) -> &[MenuItem] {
        &self.items
    }

    #[must_use]
    pub fn shortcut_label(&self, index: usize) -> Option<&str> {
        self.shortcut_labels.get(index).and_then(Option::as_deref)
    }

    #[must_use]
    pub fn is_open(&self) -> bool {
        self.overlay.is_open()
    }

    #[must_use]
    pub fn position(&self) -> Point {
        self.position
    }

    #[must_use]
    pub fn active_index(&self) -> usize {
        self.active
    }

    fn selectable(&self) -> impl Fn(usize) -> bool + '_ {
        |i| self.items.get(i).is_some_and(MenuItem::is_selectable)
    }

    /// Open with the top-left corner at `at`. Reopening moves the menu.
    pub fn open_at(&mut self, at: Point) {
        self.anchor = at;
        self.position = self.clamped();
        self.active = roving::first(self.items.len(), self.selectable()).unwrap_or(0);
        self.overlay.open();
        mosaic_core::debug!(x = at.x, y = at.y, active = self.active, "context menu opened");
    }

    pub fn close(&mut self) {
        self.overlay.close();
    }

    /// Report the menu's measured size and the viewport (first render,
    /// scroll, resize). Returns the clamped position.
    pub fn layout(&mut self, menu: Size, viewport: Size) -> Point {
        self.measured = Some((menu, viewport));
        self.position = self.clamped();
        self.position
    }

    fn clamped(&self) -> Point {
        match self.measured {
            Some((menu, viewport)) => clamp_to_viewport(self.anchor, menu, viewport, VIEWPORT_INSET),
            None => self.anchor,
        }
    }

    /// Pointer entered row `index`.
    pub fn hover(&mut self, index: usize) {
        if self.selectable()(index) {
            self.active = index;
        }
    }

    /// Activate row `index`. Returns whether an item was selected.
    pub fn click(&mut self, index: usize) -> bool {
        self.select(index)
    }

    fn select(&mut self, index: usize) -> bool {
        if !self.is_open() || !self.selectable()(index) {
            return false;
        }
        let handler = self.items[index].on_select.clone();
        self.overlay.close();
        mosaic_core::debug!(index, "context menu item selected");
        if let Some(handler) = handler {
            handler();
        }
        true
    }

    /// Keys on the open menu.
    pub fn handle_key(&mut self, event: &mut KeyboardEvent) -> EventResult {
        if !self.is_open() || !event.key.is_press() || event.is_default_prevented() {
            return EventResult::NotHandled;
        }
        let len = self.items.len();
        match event.code() {
            KeyCode::Down | KeyCode::Up => {
                let direction = if event.code() == KeyCode::Down {
                    Direction::Forward
                } else {
                    Direction::Backward
                };
                if let Some(next) = roving::step(len, Some(self.active), direction, self.selectable())
                {
                    self.active = next;
                }
            }
            KeyCode::Home => {
                if let Some(first) = roving::first(len, self.selectable()) {
                    self.active = first;
                }
            }
            KeyCode::End => {
                if let Some(last) = roving::last(len, self.selectable()) {
                    self.active = last;
                }
            }
            KeyCode::Enter | KeyCode::Char(' ') => {
                let active = self.active;
                self.select(active);
            }
            KeyCode::Escape | KeyCode::Tab => return self.overlay.handle_key(event),
            _ => return EventResult::NotHandled,
        }
        event.prevent_default();
        EventResult::Handled
    }

    /// Keys on the trigger: the ContextMenu key or Shift+F10 open the menu
    /// below `trigger`.
    pub fn handle_trigger_key(&mut self, event: &mut KeyboardEvent, trigger: Rect) -> EventResult {
        if self.trigger_handlers.dispatch(event).is_handled() {
            return EventResult::Handled;
        }
        if event.is_default_prevented() || !event.key.is_press() {
            return EventResult::NotHandled;
        }
        let opens = match event.code() {
            KeyCode::ContextMenu => true,
            KeyCode::F(10) => event.key.shift(),
            _ => false,
        };
        if !opens {
            return EventResult::NotHandled;
        }
        event.prevent_default();
        self.open_at(Point::new(trigger.left(), trigger.bottom()));
        EventResult::Handled
    }

    /// A pointer went down; `inside` says whether it hit the menu.
    pub fn handle_pointer_down(&mut self, inside: bool) -> EventResult {
        self.overlay.handle_pointer_down(inside)
    }
}
