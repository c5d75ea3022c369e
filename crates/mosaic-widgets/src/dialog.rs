#![forbid(unsafe_code)]

//! Modal dialog and sheet.
//!
//! A [`Dialog`] is controlled: the caller owns the open flag and mirrors it
//! with [`Dialog::set_open`]. Escape, backdrop presses and the close button
//! only ask the caller to close through `on_open_change(false)`.

use std::fmt;
use std::rc::Rc;

use mosaic_core::{EventResult, FocusRef, FocusScope, KeyboardEvent, Scheduler};

use crate::overlay::{CloseReason, Overlay, OverlayConfig, OverlayPhase};

/// Edge a sheet slides in from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SheetSide {
    Left,
    #[default]
    Right,
    Bottom,
}

impl SheetSide {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Left => "left",
            Self::Right => "right",
            Self::Bottom => "bottom",
        }
    }
}

/// Dialog presentation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DialogVariant {
    /// Centered modal.
    #[default]
    Default,
    /// Edge-anchored panel.
    Sheet { side: SheetSide },
    /// Command palette surface.
    Command,
}

impl DialogVariant {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Default => "default",
            Self::Sheet { .. } => "sheet",
            Self::Command => "command",
        }
    }

    /// The sheet side, for `data-side`.
    #[must_use]
    pub const fn side(self) -> Option<SheetSide> {
        match self {
            Self::Sheet { side } => Some(side),
            _ => None,
        }
    }
}

/// Width preset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DialogSize {
    Sm,
    #[default]
    Md,
    Lg,
    Xl,
    Full,
}

impl DialogSize {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Sm => "sm",
            Self::Md => "md",
            Self::Lg => "lg",
            Self::Xl => "xl",
            Self::Full => "full",
        }
    }
}

/// Dialog options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DialogConfig {
    pub variant: DialogVariant,
    pub size: DialogSize,
    /// Pressing the backdrop requests a close. Default: true.
    pub close_on_overlay_click: bool,
    /// Escape requests a close. Default: true.
    pub close_on_escape: bool,
    pub show_close_button: bool,
    pub close_label: String,
}

impl Default for DialogConfig {
    fn default() -> Self {
        Self {
            variant: DialogVariant::Default,
            size: DialogSize::Md,
            close_on_overlay_click: true,
            close_on_escape: true,
            show_close_button: true,
            close_label: "Close dialog".to_owned(),
        }
    }
}

impl DialogConfig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn variant(mut self, variant: DialogVariant) -> Self {
        self.variant = variant;
        self
    }

    /// Shorthand for a sheet on `side`.
    #[must_use]
    pub fn sheet(self, side: SheetSide) -> Self {
        self.variant(DialogVariant::Sheet { side })
    }

    #[must_use]
    pub fn size(mut self, size: DialogSize) -> Self {
        self.size = size;
        self
    }

    #[must_use]
    pub fn close_on_overlay_click(mut self, enabled: bool) -> Self {
        self.close_on_overlay_click = enabled;
        self
    }

    #[must_use]
    pub fn close_on_escape(mut self, enabled: bool) -> Self {
        self.close_on_escape = enabled;
        self
    }

    #[must_use]
    pub fn show_close_button(mut self, show: bool) -> Self {
        self.show_close_button = show;
        self
    }

    #[must_use]
    pub fn close_label(mut self, label: impl Into<String>) -> Self {
        self.close_label = label.into();
        self
    }
}

/// A controlled modal surface.
pub struct Dialog {
    overlay: Overlay,
    config: DialogConfig,
}

impl fmt::Debug for Dialog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dialog")
            .field("config", &self.config)
            .field("overlay", &self.overlay)
            .finish()
    }
}

impl Dialog {
    /// `on_open_change` hears every close request; without it the dialog
    /// can only be closed through [`set_open`](Self::set_open).
    #[must_use]
    pub fn new(
        scheduler: &Scheduler,
        scope: Rc<dyn FocusScope>,
        config: DialogConfig,
        on_open_change: Option<Rc<dyn Fn(bool)>>,
    ) -> Self {
        let overlay = Overlay::new(
            scheduler,
            scope,
            OverlayConfig::new()
                .close_on_outside_press(config.close_on_overlay_click)
                .close_on_escape(config.close_on_escape),
        );
        overlay.on_close_request(move |_reason| {
            mosaic_core::debug!(reason = ?_reason, "dialog close requested");
            if let Some(cb) = &on_open_change {
                cb(false);
            }
        });
        Self { overlay, config }
    }

    /// Element to focus when the dialog opens.
    #[must_use]
    pub fn initial_focus(self, target: FocusRef) -> Self {
        self.overlay.set_initial_focus(Some(target));
        self
    }

    #[must_use]
    pub fn config(&self) -> &DialogConfig {
        &self.config
    }

    #[must_use]
    pub fn is_open(&self) -> bool {
        self.overlay.is_open()
    }

    #[must_use]
    pub fn phase(&self) -> OverlayPhase {
        self.overlay.phase()
    }

    /// Mirror the caller's open flag.
    pub fn set_open(&self, open: bool) {
        self.overlay.set_open(open);
    }

    /// The close button.
    pub fn request_close(&self) {
        self.overlay.request_close(CloseReason::Programmatic);
    }

    /// Escape and the Tab trap.
    pub fn handle_key(&self, event: &mut KeyboardEvent) -> EventResult {
        self.overlay.handle_key(event)
    }

    /// Pointer-down on the overlay layer; `on_backdrop` is true when it hit
    /// the backdrop rather than the content.
    pub fn handle_overlay_pointer_down(&self, on_backdrop: bool) -> EventResult {
        self.overlay.handle_pointer_down(!on_backdrop)
    }

    /// `data-variant` value.
    #[must_use]
    pub fn data_variant(&self) -> &'static str {
        self.config.variant.as_str()
    }

    /// `data-side` value, present for sheets only.
    #[must_use]
    pub fn data_side(&self) -> Option<&'static str> {
        self.config.variant.side().map(SheetSide::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mosaic_core::testing::{FakeScope, FocusDocument};
    use mosaic_core::{FocusHandle, KeyCode, Modifiers};
    use std::cell::RefCell;

    struct Harness {
        sched: Scheduler,
        doc: FocusDocument,
        scope: Rc<FakeScope>,
        requests: Rc<RefCell<Vec<bool>>>,
    }

    fn harness() -> Harness {
        let doc = FocusDocument::new();
        let scope = Rc::new(FakeScope::new(&doc, "dialog", &["first", "second", "third"]));
        Harness {
            sched: Scheduler::new(),
            doc,
            scope,
            requests: Rc::new(RefCell::new(Vec::new())),
        }
    }

    fn dialog(h: &Harness, config: DialogConfig) -> Dialog {
        let sink = Rc::clone(&h.requests);
        let cb: Rc<dyn Fn(bool)> = Rc::new(move |open| sink.borrow_mut().push(open));
        Dialog::new(
            &h.sched,
            Rc::clone(&h.scope) as Rc<dyn FocusScope>,
            config,
            Some(cb),
        )
    }

    #[test]
    fn escape_requests_close_but_stays_open() {
        let h = harness();
        let d = dialog(&h, DialogConfig::new());
        d.set_open(true);
        h.sched.run_pending();
        let mut esc = KeyboardEvent::press(KeyCode::Escape, Modifiers::NONE);
        assert_eq!(d.handle_key(&mut esc), EventResult::Handled);
        assert!(esc.is_default_prevented());
        assert_eq!(*h.requests.borrow(), vec![false]);
        assert!(d.is_open());
        d.set_open(false);
        assert!(!d.is_open());
    }

    #[test]
    fn backdrop_press_is_configurable() {
        let h = harness();
        let d = dialog(&h, DialogConfig::new());
        d.set_open(true);
        assert_eq!(d.handle_overlay_pointer_down(false), EventResult::NotHandled);
        assert_eq!(d.handle_overlay_pointer_down(true), EventResult::Handled);
        assert_eq!(h.requests.borrow().len(), 1);

        let h = harness();
        let d = dialog(&h, DialogConfig::new().close_on_overlay_click(false));
        d.set_open(true);
        assert_eq!(d.handle_overlay_pointer_down(true), EventResult::NotHandled);
        assert!(h.requests.borrow().is_empty());
    }

    #[test]
    fn initial_focus_and_restore() {
        let h = harness();
        let opener = h.doc.element("opener");
        opener.focus();
        let target = h.scope.child("third").map(|e| e.handle());
        let d = dialog(&h, DialogConfig::new());
        let d = match target {
            Some(t) => d.initial_focus(t),
            None => d,
        };
        d.set_open(true);
        h.sched.run_pending();
        assert_eq!(h.doc.active_name().as_deref(), Some("third"));
        d.set_open(false);
        assert_eq!(h.doc.active_name().as_deref(), Some("opener"));
    }

    #[test]
    fn sheet_attributes() {
        let h = harness();
        let d = dialog(&h, DialogConfig::new().sheet(SheetSide::Left).size(DialogSize::Lg));
        assert_eq!(d.data_variant(), "sheet");
        assert_eq!(d.data_side(), Some("left"));
        assert_eq!(d.config().size.as_str(), "lg");
        let d = dialog(&h, DialogConfig::new().variant(DialogVariant::Command));
        assert_eq!(d.data_side(), None);
        assert_eq!(DialogVariant::Sheet { side: SheetSide::default() }.side(), Some(SheetSide::Right));
    }

    #[test]
    fn close_button_requests_close() {
        let h = harness();
        let d = dialog(&h, DialogConfig::new());
        d.set_open(true);
        d.request_close();
        assert_eq!(*h.requests.borrow(), vec![false]);
    }
}
