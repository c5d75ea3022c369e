#![forbid(unsafe_code)]

//! Overlay focus lifecycle shared by dialogs, sheets and menus.
//!
//! ```text
//!  Closed ──open()──▶ Opening ──next turn──▶ Open
//!    ▲                   │                    │
//!    └──── Closing ◀─────┴──────close()───────┘
//! ```
//!
//! Opening records the focused element and defers the initial focus move to
//! the next scheduler turn, so the host has rendered the surface by then.
//! Closing cancels that move if it has not happened yet and hands focus back.
//!
//! # Invariants
//!
//! 1. At most one deferred focus task is pending, and only while `Opening`.
//! 2. Focus is restored only to an element that is still focusable.
//! 3. Focus calls, scope queries and close handlers run with no internal
//!    borrow held.
//! 4. Dropping an open overlay closes it, so no task outlives it.
//!
//! # Failure Modes
//!
//! | Condition | Behavior |
//! |-----------|----------|
//! | No focusable descendants | Initial focus and Tab go to the container |
//! | Recorded element removed | Focus is left alone on close |
//! | Escape already prevented | Ignored |

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use mosaic_core::{
    EventResult, FocusHandle, FocusRef, FocusScope, KeyCode, KeyboardEvent, Scheduler, TaskId,
    same_handle,
};

/// Lifecycle phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OverlayPhase {
    #[default]
    Closed,
    /// Visible; initial focus not applied yet.
    Opening,
    Open,
    /// Handing focus back.
    Closing,
}

/// Why a close was requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseReason {
    EscapeKey,
    OutsidePress,
    Programmatic,
}

/// Overlay behaviour switches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OverlayConfig {
    /// Escape requests a close. Default: true.
    pub close_on_escape: bool,
    /// A pointer-down outside the surface requests a close. Default: true.
    pub close_on_outside_press: bool,
    /// Tab and Shift+Tab wrap inside the surface. Default: true.
    pub trap_focus: bool,
    /// Focus returns to the previously focused element. Default: true.
    pub restore_focus: bool,
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            close_on_escape: true,
            close_on_outside_press: true,
            trap_focus: true,
            restore_focus: true,
        }
    }
}

impl OverlayConfig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn close_on_escape(mut self, enabled: bool) -> Self {
        self.close_on_escape = enabled;
        self
    }

    #[must_use]
    pub fn close_on_outside_press(mut self, enabled: bool) -> Self {
        self.close_on_outside_press = enabled;
        self
    }

    #[must_use]
    pub fn trap_focus(mut self, enabled: bool) -> Self {
        self.trap_focus = enabled;
        self
    }

    #[must_use]
    pub fn restore_focus(mut self, enabled: bool) -> Self {
        self.restore_focus = enabled;
        self
    }
}

/// Receives close requests instead of the overlay closing itself.
pub type CloseHandler = Rc<dyn Fn(CloseReason)>;

struct OverlayState {
    config: OverlayConfig,
    phase: OverlayPhase,
    scope: Rc<dyn FocusScope>,
    initial_focus: Option<FocusRef>,
    return_focus: Option<Weak<dyn FocusHandle>>,
    pending_focus: Option<TaskId>,
    on_close_request: Option<CloseHandler>,
}

/// Focus manager for one overlay surface.
pub struct Overlay {
    state: Rc<RefCell<OverlayState>>,
    scheduler: Scheduler,
}

impl fmt::Debug for Overlay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.borrow();
        f.debug_struct("Overlay")
            .field("phase", &state.phase)
            .field("config", &state.config)
            .field("pending_focus", &state.pending_focus)
            .finish_non_exhaustive()
    }
}

impl Overlay {
    #[must_use]
    pub fn new(scheduler: &Scheduler, scope: Rc<dyn FocusScope>, config: OverlayConfig) -> Self {
        Self {
            state: Rc::new(RefCell::new(OverlayState {
                config,
                phase: OverlayPhase::Closed,
                scope,
                initial_focus: None,
                return_focus: None,
                pending_focus: None,
                on_close_request: None,
            })),
            scheduler: scheduler.clone(),
        }
    }

    /// Element to focus on open instead of the first focusable descendant.
    pub fn set_initial_focus(&self, target: Option<FocusRef>) {
        self.state.borrow_mut().initial_focus = target;
    }

    /// Route Escape and outside presses to `handler` instead of closing.
    pub fn on_close_request(&self, handler: impl Fn(CloseReason) + 'static) {
        self.state.borrow_mut().on_close_request = Some(Rc::new(handler));
    }

    #[must_use]
    pub fn phase(&self) -> OverlayPhase {
        self.state.borrow().phase
    }

    /// Opening or open.
    #[must_use]
    pub fn is_open(&self) -> bool {
        matches!(self.phase(), OverlayPhase::Opening | OverlayPhase::Open)
    }

    #[must_use]
    pub fn config(&self) -> OverlayConfig {
        self.state.borrow().config
    }

    /// Closed → Opening. No-op in any other phase.
    pub fn open(&self) {
        let scope = {
            let mut state = self.state.borrow_mut();
            if state.phase != OverlayPhase::Closed {
                return;
            }
            state.phase = OverlayPhase::Opening;
            Rc::clone(&state.scope)
        };
        let previous = scope.active();
        let weak = Rc::downgrade(&self.state);
        let task = self.scheduler.defer(move || {
            if let Some(state) = weak.upgrade() {
                apply_initial_focus(&state);
            }
        });
        let mut state = self.state.borrow_mut();
        state.return_focus = previous.as_ref().map(Rc::downgrade);
        state.pending_focus = Some(task);
        mosaic_core::debug!(task = task.get(), "overlay opening");
    }

    /// Opening/Open → Closing → Closed.
    pub fn close(&self) {
        let (pending, previous) = {
            let mut state = self.state.borrow_mut();
            if !matches!(state.phase, OverlayPhase::Opening | OverlayPhase::Open) {
                return;
            }
            state.phase = OverlayPhase::Closing;
            let restore = state.config.restore_focus;
            let previous = state
                .return_focus
                .take()
                .filter(|_| restore)
                .and_then(|weak| weak.upgrade());
            (state.pending_focus.take(), previous)
        };
        if let Some(task) = pending {
            self.scheduler.cancel(task);
        }
        if let Some(previous) = previous
            && previous.is_focusable()
        {
            previous.focus();
        }
        self.state.borrow_mut().phase = OverlayPhase::Closed;
        mosaic_core::debug!("overlay closed");
    }

    /// Follow an external open flag.
    pub fn set_open(&self, open: bool) {
        if open {
            self.open();
        } else {
            self.close();
        }
    }

    /// Ask to close: the close handler decides, or the overlay closes itself.
    pub fn request_close(&self, reason: CloseReason) {
        let handler = self.state.borrow().on_close_request.clone();
        mosaic_core::trace!(reason = ?reason, "overlay close requested");
        match handler {
            Some(handler) => handler(reason),
            None => self.close(),
        }
    }

    /// Escape and the Tab trap. Only acts while open.
    pub fn handle_key(&self, event: &mut KeyboardEvent) -> EventResult {
        if !self.is_open() || !event.key.is_press() {
            return EventResult::NotHandled;
        }
        match event.code() {
            KeyCode::Escape => {
                if event.is_default_prevented() || !self.config().close_on_escape {
                    return EventResult::NotHandled;
                }
                event.prevent_default();
                self.request_close(CloseReason::EscapeKey);
                EventResult::Handled
            }
            KeyCode::Tab => self.trap_tab(event),
            _ => EventResult::NotHandled,
        }
    }

    fn trap_tab(&self, event: &mut KeyboardEvent) -> EventResult {
        let scope = {
            let state = self.state.borrow();
            if !state.config.trap_focus {
                return EventResult::NotHandled;
            }
            Rc::clone(&state.scope)
        };
        let focusables = scope.focusables();
        let (Some(first), Some(last)) = (focusables.first(), focusables.last()) else {
            event.prevent_default();
            scope.container().focus();
            return EventResult::Handled;
        };
        let active = scope.active();
        let is_active = |handle: &FocusRef| active.as_ref().is_some_and(|a| same_handle(a, handle));
        let target = if event.key.shift() {
            is_active(first).then_some(last)
        } else {
            is_active(last).then_some(first)
        };
        match target {
            Some(target) => {
                event.prevent_default();
                target.focus();
                EventResult::Handled
            }
            None => EventResult::NotHandled,
        }
    }

    /// A pointer went down; `inside` says whether it hit the surface.
    pub fn handle_pointer_down(&self, inside: bool) -> EventResult {
        if inside || !self.is_open() || !self.config().close_on_outside_press {
            return EventResult::NotHandled;
        }
        self.request_close(CloseReason::OutsidePress);
        EventResult::Handled
    }
}

fn apply_initial_focus(state: &Rc<RefCell<OverlayState>>) {
    let (scope, initial) = {
        let mut state = state.borrow_mut();
        if state.phase != OverlayPhase::Opening {
            return;
        }
        state.phase = OverlayPhase::Open;
        state.pending_focus = None;
        (Rc::clone(&state.scope), state.initial_focus.clone())
    };
    let target = initial
        .filter(|h| h.is_focusable())
        .or_else(|| scope.focusables().into_iter().next())
        .unwrap_or_else(|| scope.container());
    target.focus();
    mosaic_core::debug!("overlay open");
}

impl Drop for Overlay {
    fn drop(&mut self) {
        self.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mosaic_core::Modifiers;
    use mosaic_core::testing::{FakeScope, FocusDocument};
    use std::cell::Cell;

    fn setup(children: &[&str]) -> (Scheduler, FocusDocument, Rc<FakeScope>) {
        let doc = FocusDocument::new();
        let scope = Rc::new(FakeScope::new(&doc, "panel", children));
        (Scheduler::new(), doc, scope)
    }

    fn overlay(sched: &Scheduler, scope: &Rc<FakeScope>) -> Overlay {
        Overlay::new(sched, Rc::clone(scope) as Rc<dyn FocusScope>, OverlayConfig::default())
    }

    #[test]
    fn focus_moves_on_the_next_turn() {
        let (sched, doc, scope) = setup(&["a", "b"]);
        let trigger = doc.element("trigger");
        trigger.focus();
        let ov = overlay(&sched, &scope);
        ov.open();
        assert_eq!(ov.phase(), OverlayPhase::Opening);
        assert_eq!(doc.active_name().as_deref(), Some("trigger"));
        sched.run_pending();
        assert_eq!(ov.phase(), OverlayPhase::Open);
        assert_eq!(doc.active_name().as_deref(), Some("a"));
        ov.close();
        assert_eq!(ov.phase(), OverlayPhase::Closed);
        assert_eq!(doc.active_name().as_deref(), Some("trigger"));
    }

    #[test]
    fn initial_focus_target_wins() {
        let (sched, doc, scope) = setup(&["a", "b"]);
        let ov = overlay(&sched, &scope);
        ov.set_initial_focus(scope.child("b").map(|b| b.handle()));
        ov.open();
        sched.run_pending();
        assert_eq!(doc.active_name().as_deref(), Some("b"));
    }

    #[test]
    fn empty_scope_focuses_container() {
        let (sched, doc, scope) = setup(&[]);
        let ov = overlay(&sched, &scope);
        ov.open();
        sched.run_pending();
        assert_eq!(doc.active_name().as_deref(), Some("panel"));

        let mut tab = KeyboardEvent::press(KeyCode::Tab, Modifiers::NONE);
        assert_eq!(ov.handle_key(&mut tab), EventResult::Handled);
        assert!(tab.is_default_prevented());
        assert_eq!(doc.active_name().as_deref(), Some("panel"));
    }

    #[test]
    fn close_before_focus_cancels_the_task() {
        let (sched, doc, scope) = setup(&["a"]);
        let ov = overlay(&sched, &scope);
        ov.open();
        assert_eq!(sched.pending_count(), 1);
        ov.close();
        assert_eq!(sched.pending_count(), 0);
        sched.run_pending();
        assert_eq!(doc.active_name(), None);
    }

    #[test]
    fn removed_return_target_is_not_focused() {
        let (sched, doc, scope) = setup(&["a"]);
        let trigger = doc.element("trigger");
        trigger.focus();
        let ov = overlay(&sched, &scope);
        ov.open();
        sched.run_pending();
        trigger.disconnect();
        ov.close();
        assert_eq!(doc.active_name().as_deref(), Some("a"));
    }

    #[test]
    fn escape_uses_close_handler_when_present() {
        let (sched, _doc, scope) = setup(&["a"]);
        let ov = overlay(&sched, &scope);
        let reasons = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&reasons);
        ov.on_close_request(move |r| sink.borrow_mut().push(r));
        ov.open();
        let mut esc = KeyboardEvent::press(KeyCode::Escape, Modifiers::NONE);
        assert_eq!(ov.handle_key(&mut esc), EventResult::Handled);
        assert!(ov.is_open());
        assert_eq!(ov.handle_pointer_down(false), EventResult::Handled);
        assert_eq!(ov.handle_pointer_down(true), EventResult::NotHandled);
        assert_eq!(
            *reasons.borrow(),
            vec![CloseReason::EscapeKey, CloseReason::OutsidePress]
        );
    }

    #[test]
    fn escape_and_outside_press_are_configurable() {
        let (sched, _doc, scope) = setup(&["a"]);
        let ov = Overlay::new(
            &sched,
            Rc::clone(&scope) as Rc<dyn FocusScope>,
            OverlayConfig::new()
                .close_on_escape(false)
                .close_on_outside_press(false),
        );
        ov.open();
        let mut esc = KeyboardEvent::press(KeyCode::Escape, Modifiers::NONE);
        assert_eq!(ov.handle_key(&mut esc), EventResult::NotHandled);
        assert_eq!(ov.handle_pointer_down(false), EventResult::NotHandled);
        assert!(ov.is_open());

        let mut esc = KeyboardEvent::press(KeyCode::Escape, Modifiers::NONE);
        let ov2 = overlay(&sched, &scope);
        ov2.open();
        esc.prevent_default();
        assert_eq!(ov2.handle_key(&mut esc), EventResult::NotHandled);
    }

    #[test]
    fn closed_overlay_ignores_keys() {
        let (sched, _doc, scope) = setup(&["a"]);
        let ov = overlay(&sched, &scope);
        let mut tab = KeyboardEvent::press(KeyCode::Tab, Modifiers::NONE);
        assert_eq!(ov.handle_key(&mut tab), EventResult::NotHandled);
        assert!(!tab.is_default_prevented());
    }

    #[test]
    fn overlay_does_not_keep_the_opener_alive() {
        let (sched, doc, scope) = setup(&["a"]);
        let trigger = doc.element("trigger");
        trigger.focus();
        let alive = Rc::downgrade(&trigger);
        let ov = overlay(&sched, &scope);
        ov.open();
        sched.run_pending();
        assert_eq!(doc.active_name().as_deref(), Some("a"));

        drop(trigger);
        assert!(alive.upgrade().is_none());
        ov.close();
        assert_eq!(doc.active_name().as_deref(), Some("a"));
        assert_eq!(doc.focus_log(), vec!["trigger", "a"]);
    }

    #[test]
    fn dropping_an_open_overlay_restores_and_cancels() {
        let (sched, doc, scope) = setup(&["a"]);
        let trigger = doc.element("trigger");
        trigger.focus();
        let ran = Rc::new(Cell::new(false));
        {
            let ov = overlay(&sched, &scope);
            ov.open();
            let flag = Rc::clone(&ran);
            sched.defer(move || flag.set(true));
        }
        assert_eq!(sched.pending_count(), 1);
        sched.run_pending();
        assert!(ran.get());
        assert_eq!(doc.active_name().as_deref(), Some("trigger"));
    }
}
