#![forbid(unsafe_code)]

//! Hover and focus tooltip.
//!
//! The trigger forwards its pointer, focus and key events to
//! [`Tooltip::handle`]. Showing waits for `delay`, hiding waits for
//! `hide_delay`; every new event clears both timers first, so moving the
//! pointer across a trigger quickly never flashes the tooltip.
//!
//! # Invariants
//!
//! 1. At most one of the show and hide timers is pending.
//! 2. The position is only computed while the tooltip is visible.
//! 3. Caller handlers run first; `Handled` or a prevented event skips the
//!    built-in behaviour.

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};
use std::time::Duration;

use mosaic_core::{
    EventResult, HandlerChain, KeyCode, KeyEvent, Point, Rect, Scheduler, Size, TaskId,
    clamp_to_viewport,
};
use mosaic_shortcuts::ShortcutRegistry;

use crate::disclosure::next_instance;

/// Which side of the trigger the tooltip sits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TooltipSide {
    #[default]
    Top,
    Right,
    Bottom,
    Left,
}

impl TooltipSide {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Top => "top",
            Self::Right => "right",
            Self::Bottom => "bottom",
            Self::Left => "left",
        }
    }
}

/// Alignment along the trigger edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TooltipAlign {
    Start,
    #[default]
    Center,
    End,
}

impl TooltipAlign {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::Center => "center",
            Self::End => "end",
        }
    }
}

/// Tooltip options.
#[derive(Debug, Clone, PartialEq)]
pub struct TooltipConfig {
    pub side: TooltipSide,
    pub align: TooltipAlign,
    /// Wait before showing. Default: 120 ms.
    pub delay: Duration,
    /// Wait before hiding. Default: 60 ms.
    pub hide_delay: Duration,
    /// Gap between trigger and tooltip in pixels. Default: 8.
    pub offset: f64,
    /// Clearance kept from the viewport edges. Default: 8.
    pub viewport_inset: f64,
    /// Explicit element id; generated when `None`.
    pub id: Option<String>,
}

impl Default for TooltipConfig {
    fn default() -> Self {
        Self {
            side: TooltipSide::Top,
            align: TooltipAlign::Center,
            delay: Duration::from_millis(120),
            hide_delay: Duration::from_millis(60),
            offset: 8.0,
            viewport_inset: 8.0,
            id: None,
        }
    }
}

impl TooltipConfig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn side(mut self, side: TooltipSide) -> Self {
        self.side = side;
        self
    }

    #[must_use]
    pub fn align(mut self, align: TooltipAlign) -> Self {
        self.align = align;
        self
    }

    #[must_use]
    pub fn delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    #[must_use]
    pub fn hide_delay(mut self, delay: Duration) -> Self {
        self.hide_delay = delay;
        self
    }

    #[must_use]
    pub fn offset(mut self, offset: f64) -> Self {
        self.offset = offset;
        self
    }

    #[must_use]
    pub fn viewport_inset(mut self, inset: f64) -> Self {
        self.viewport_inset = inset;
        self
    }

    #[must_use]
    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }
}

/// Top-left corner for a tooltip of `size` next to `trigger`.
///
/// The side picks the main axis and the alignment the cross axis; the result
/// is clamped into `viewport` with `inset` clearance.
#[must_use]
pub fn compute_position(
    trigger: Rect,
    size: Size,
    viewport: Size,
    side: TooltipSide,
    align: TooltipAlign,
    offset: f64,
    inset: f64,
) -> Point {
    let origin = match side {
        TooltipSide::Top | TooltipSide::Bottom => {
            let y = if side == TooltipSide::Top {
                trigger.top() - size.height - offset
            } else {
                trigger.bottom() + offset
            };
            let x = match align {
                TooltipAlign::Start => trigger.left(),
                TooltipAlign::Center => trigger.center_x() - size.width / 2.0,
                TooltipAlign::End => trigger.right() - size.width,
            };
            Point::new(x, y)
        }
        TooltipSide::Left | TooltipSide::Right => {
            let x = if side == TooltipSide::Left {
                trigger.left() - size.width - offset
            } else {
                trigger.right() + offset
            };
            let y = match align {
                TooltipAlign::Start => trigger.top(),
                TooltipAlign::Center => trigger.center_y() - size.height / 2.0,
                TooltipAlign::End => trigger.bottom() - size.height,
            };
            Point::new(x, y)
        }
    };
    clamp_to_viewport(origin, size, viewport, inset)
}

// ---------------------------------------------------------------------------
// Trigger events
// ---------------------------------------------------------------------------

/// What happened on the trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerEventKind {
    PointerEnter,
    PointerLeave,
    Focus,
    Blur,
    Key(KeyEvent),
}

/// A trigger event in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TriggerEvent {
    pub kind: TriggerEventKind,
    default_prevented: bool,
}

impl TriggerEvent {
    #[must_use]
    pub const fn new(kind: TriggerEventKind) -> Self {
        Self {
            kind,
            default_prevented: false,
        }
    }

    pub fn prevent_default(&mut self) {
        self.default_prevented = true;
    }

    #[must_use]
    pub const fn is_default_prevented(&self) -> bool {
        self.default_prevented
    }
}

// ---------------------------------------------------------------------------
// Tooltip
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy)]
struct Layout {
    trigger: Rect,
    size: Size,
    viewport: Size,
}

#[derive(Debug)]
struct TooltipState {
    config: TooltipConfig,
    id: String,
    visible: bool,
    show_timer: Option<TaskId>,
    hide_timer: Option<TaskId>,
    layout: Option<Layout>,
    position: Option<Point>,
}

impl TooltipState {
    fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
        self.position = if visible { self.position_for_layout() } else { None };
    }

    fn position_for_layout(&self) -> Option<Point> {
        let layout = self.layout?;
        Some(compute_position(
            layout.trigger,
            layout.size,
            layout.viewport,
            self.config.side,
            self.config.align,
            self.config.offset,
            self.config.viewport_inset,
        ))
    }
}

/// Tooltip state for one trigger.
pub struct Tooltip {
    state: Rc<RefCell<TooltipState>>,
    scheduler: Scheduler,
    caller: RefCell<HandlerChain<TriggerEvent>>,
    shortcut_label: Option<String>,
}

impl fmt::Debug for Tooltip {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tooltip")
            .field("state", &self.state.borrow())
            .field("shortcut_label", &self.shortcut_label)
            .finish_non_exhaustive()
    }
}

impl Tooltip {
    #[must_use]
    pub fn new(scheduler: &Scheduler, config: TooltipConfig) -> Self {
        let id = config
            .id
            .clone()
            .unwrap_or_else(|| format!("mosaic-tooltip-r{}", next_instance()));
        Self {
            state: Rc::new(RefCell::new(TooltipState {
                config,
                id,
                visible: false,
                show_timer: None,
                hide_timer: None,
                layout: None,
                position: None,
            })),
            scheduler: scheduler.clone(),
            caller: RefCell::new(HandlerChain::new()),
            shortcut_label: None,
        }
    }

    /// Attach a shortcut hint. With a registry the combos are formatted for
    /// its platform; without one they are joined with `" / "`.
    #[must_use]
    pub fn with_shortcut<S: AsRef<str>>(
        mut self,
        combos: &[S],
        registry: Option<&ShortcutRegistry>,
    ) -> Self {
        self.shortcut_label = if combos.is_empty() {
            None
        } else {
            Some(match registry {
                Some(registry) => registry.format(combos),
                None => combos
                    .iter()
                    .map(AsRef::as_ref)
                    .collect::<Vec<_>>()
                    .join(" / "),
            })
        };
        self
    }

    /// Add a caller handler that runs before the built-in behaviour.
    pub fn on_trigger_event(&self, handler: impl FnMut(&mut TriggerEvent) -> EventResult + 'static) {
        self.caller.borrow_mut().push(handler);
    }

    #[must_use]
    pub fn id(&self) -> String {
        self.state.borrow().id.clone()
    }

    #[must_use]
    pub fn shortcut_label(&self) -> Option<&str> {
        self.shortcut_label.as_deref()
    }

    #[must_use]
    pub fn is_visible(&self) -> bool {
        self.state.borrow().visible
    }

    /// `data-side` value.
    #[must_use]
    pub fn side(&self) -> TooltipSide {
        self.state.borrow().config.side
    }

    /// `data-align` value.
    #[must_use]
    pub fn align(&self) -> TooltipAlign {
        self.state.borrow().config.align
    }

    /// Current top-left corner, once visible and measured.
    #[must_use]
    pub fn position(&self) -> Option<Point> {
        self.state.borrow().position
    }

    /// Feed a trigger event through the caller handlers, then the built-in
    /// show/hide behaviour.
    pub fn handle(&self, event: &mut TriggerEvent) -> EventResult {
        let caller = match self.caller.try_borrow_mut() {
            Ok(mut chain) => chain.dispatch(event),
            Err(_) => EventResult::NotHandled,
        };
        if caller.is_handled() {
            return EventResult::Handled;
        }
        if event.is_default_prevented() {
            return EventResult::NotHandled;
        }
        match event.kind {
            TriggerEventKind::PointerEnter | TriggerEventKind::Focus => {
                self.schedule_show();
                EventResult::Handled
            }
            TriggerEventKind::PointerLeave | TriggerEventKind::Blur => {
                self.schedule_hide();
                EventResult::Handled
            }
            TriggerEventKind::Key(key) if key.is_press() && key.code == KeyCode::Escape => {
                self.schedule_hide();
                EventResult::Handled
            }
            TriggerEventKind::Key(_) => EventResult::NotHandled,
        }
    }

    /// Report fresh measurements (first render, scroll, resize). Returns the
    /// new position while visible.
    pub fn update_layout(&self, trigger: Rect, size: Size, viewport: Size) -> Option<Point> {
        let mut state = self.state.borrow_mut();
        state.layout = Some(Layout {
            trigger,
            size,
            viewport,
        });
        if state.visible {
            state.position = state.position_for_layout();
        }
        state.position
    }

    /// `aria-describedby` for the trigger: the existing value plus this
    /// tooltip's id while visible.
    #[must_use]
    pub fn described_by(&self, existing: Option<&str>) -> Option<String> {
        let state = self.state.borrow();
        let existing = existing.filter(|s| !s.is_empty());
        if !state.visible {
            return existing.map(str::to_owned);
        }
        Some(match existing {
            Some(existing) => format!("{existing} {}", state.id),
            None => state.id.clone(),
        })
    }

    fn clear_timers(&self) {
        let (show, hide) = {
            let mut state = self.state.borrow_mut();
            (state.show_timer.take(), state.hide_timer.take())
        };
        for task in [show, hide].into_iter().flatten() {
            self.scheduler.cancel(task);
        }
    }

    fn schedule_show(&self) {
        self.clear_timers();
        let delay = self.state.borrow().config.delay;
        let weak = Rc::downgrade(&self.state);
        let task = self
            .scheduler
            .schedule(delay, move || settle(&weak, true));
        self.state.borrow_mut().show_timer = Some(task);
        mosaic_core::trace!(delay_ms = delay.as_millis() as u64, "tooltip show scheduled");
    }

    fn schedule_hide(&self) {
        self.clear_timers();
        let delay = self.state.borrow().config.hide_delay;
        let weak = Rc::downgrade(&self.state);
        let task = self
            .scheduler
            .schedule(delay, move || settle(&weak, false));
        self.state.borrow_mut().hide_timer = Some(task);
        mosaic_core::trace!(delay_ms = delay.as_millis() as u64, "tooltip hide scheduled");
    }
}

fn settle(state: &Weak<RefCell<TooltipState>>, visible: bool) {
    let Some(state) = state.upgrade() else {
        return;
    };
    let mut state = state.borrow_mut();
    state.show_timer = None;
    state.hide_timer = None;
    if state.visible != visible {
        state.set_visible(visible);
        mosaic_core::debug!(id = %state.id, visible, "tooltip visibility changed");
    }
}

impl Drop for Tooltip {
    fn drop(&mut self) {
        self.clear_timers();
    }
}
