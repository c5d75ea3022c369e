#![forbid(unsafe_code)]

//! Transient notifications.
//!
//! A [`ToastManager`] keeps a bounded stack of toasts. Each toast with a
//! non-zero duration owns one scheduler timer that dismisses it.
//!
//! # Example
//!
//! ```ignore
//! let toasts = ToastManager::new(&scheduler, ToastConfig::default());
//! let id = toasts.toast(
//!     ToastOptions::new("File saved")
//!         .tone(ToastTone::Success)
//!         .duration(Duration::from_secs(3)),
//! );
//! ```
//!
//! # Invariants
//!
//! 1. Ids are unique within the stack; reusing one replaces the old toast
//!    and its timer.
//! 2. The stack never holds more than `max_toasts` entries; the oldest go
//!    first.
//! 3. A timer exists exactly for each listed toast with a non-zero duration.

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::{Rc, Weak};
use std::time::Duration;

use mosaic_core::{Scheduler, TaskId};

/// Default auto-dismiss delay.
pub const DEFAULT_DURATION: Duration = Duration::from_millis(5000);

/// Unique identifier for a toast notification.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ToastId(String);

impl ToastId {
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ToastId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ToastId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for ToastId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Visual tone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ToastTone {
    #[default]
    Neutral,
    Primary,
    Success,
    Warning,
    Danger,
}

impl ToastTone {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Neutral => "neutral",
            Self::Primary => "primary",
            Self::Success => "success",
            Self::Warning => "warning",
            Self::Danger => "danger",
        }
    }
}

/// Corner of the viewport the stack is anchored to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ToastPlacement {
    TopLeft,
    TopRight,
    BottomLeft,
    #[default]
    BottomRight,
}

impl ToastPlacement {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::TopLeft => "top-left",
            Self::TopRight => "top-right",
            Self::BottomLeft => "bottom-left",
            Self::BottomRight => "bottom-right",
        }
    }
}

/// A button on a toast.
#[derive(Clone)]
pub struct ToastAction {
    pub label: String,
    /// Accessible label; falls back to `label`.
    pub alt_text: Option<String>,
    on_action: Rc<dyn Fn()>,
}

impl fmt::Debug for ToastAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ToastAction")
            .field("label", &self.label)
            .field("alt_text", &self.alt_text)
            .finish_non_exhaustive()
    }
}

impl ToastAction {
    #[must_use]
    pub fn new(label: impl Into<String>, on_action: impl Fn() + 'static) -> Self {
        Self {
            label: label.into(),
            alt_text: None,
            on_action: Rc::new(on_action),
        }
    }

    #[must_use]
    pub fn alt_text(mut self, text: impl Into<String>) -> Self {
        self.alt_text = Some(text.into());
        self
    }

    #[must_use]
    pub fn aria_label(&self) -> &str {
        self.alt_text.as_deref().unwrap_or(&self.label)
    }
}

/// What to show.
#[derive(Debug, Clone, Default)]
pub struct ToastOptions {
    pub id: Option<ToastId>,
    pub title: String,
    pub description: Option<String>,
    pub tone: ToastTone,
    /// `None` uses the manager's default; zero keeps the toast until
    /// dismissed.
    pub duration: Option<Duration>,
    pub action: Option<ToastAction>,
}

impl ToastOptions {
    #[must_use]
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn id(mut self, id: impl Into<ToastId>) -> Self {
        self.id = Some(id.into());
        self
    }

    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    #[must_use]
    pub fn tone(mut self, tone: ToastTone) -> Self {
        self.tone = tone;
        self
    }

    #[must_use]
    pub fn duration(mut self, duration: Duration) -> Self {
        self.duration = Some(duration);
        self
    }

    /// Stay until dismissed.
    #[must_use]
    pub fn persistent(self) -> Self {
        self.duration(Duration::ZERO)
    }

    #[must_use]
    pub fn action(mut self, action: ToastAction) -> Self {
        self.action = Some(action);
        self
    }
}

/// A listed toast.
#[derive(Debug, Clone)]
pub struct Toast {
    pub id: ToastId,
    pub title: String,
    pub description: Option<String>,
    pub tone: ToastTone,
    /// `None` for persistent toasts.
    pub duration: Option<Duration>,
    pub action: Option<ToastAction>,
    /// Scheduler time at creation.
    pub created_at: Duration,
}

/// Manager options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ToastConfig {
    /// Default: 4.
    pub max_toasts: usize,
    /// Default: 5 s.
    pub default_duration: Duration,
    pub placement: ToastPlacement,
}

impl Default for ToastConfig {
    fn default() -> Self {
        Self {
            max_toasts: 4,
            default_duration: DEFAULT_DURATION,
            placement: ToastPlacement::BottomRight,
        }
    }
}

impl ToastConfig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn max_toasts(mut self, n: usize) -> Self {
        self.max_toasts = n;
        self
    }

    #[must_use]
    pub fn default_duration(mut self, duration: Duration) -> Self {
        self.default_duration = duration;
        self
    }

    #[must_use]
    pub fn placement(mut self, placement: ToastPlacement) -> Self {
        self.placement = placement;
        self
    }
}

// ---------------------------------------------------------------------------
// Manager
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
struct ManagerState {
    toasts: Vec<Toast>,
    timers: HashMap<ToastId, TaskId>,
    next_id: u64,
}

impl ManagerState {
    /// Drop `id` from the stack, handing back its timer.
    fn remove(&mut self, id: &ToastId) -> (bool, Option<TaskId>) {
        let before = self.toasts.len();
        self.toasts.retain(|t| &t.id != id);
        (self.toasts.len() != before, self.timers.remove(id))
    }
}

/// Owner of the toast stack.
pub struct ToastManager {
    state: Rc<RefCell<ManagerState>>,
    scheduler: Scheduler,
    config: ToastConfig,
}

impl fmt::Debug for ToastManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.borrow();
        f.debug_struct("ToastManager")
            .field("config", &self.config)
            .field("toasts", &state.toasts.len())
            .field("timers", &state.timers.len())
            .finish()
    }
}

impl ToastManager {
    #[must_use]
    pub fn new(scheduler: &Scheduler, config: ToastConfig) -> Self {
        Self {
            state: Rc::new(RefCell::new(ManagerState::default())),
            scheduler: scheduler.clone(),
            config,
        }
    }

    #[must_use]
    pub fn config(&self) -> ToastConfig {
        self.config
    }

    /// `data-placement` value for the viewport.
    #[must_use]
    pub fn placement(&self) -> &'static str {
        self.config.placement.as_str()
    }

    /// Show a toast and return its id.
    pub fn toast(&self, options: ToastOptions) -> ToastId {
        let duration = options.duration.unwrap_or(self.config.default_duration);
        let mut cancelled = Vec::new();
        let (id, listed) = {
            let mut state = self.state.borrow_mut();
            let id = match options.id {
                Some(id) => id,
                None => {
                    state.next_id += 1;
                    ToastId(format!("toast-{}", state.next_id))
                }
            };
            let (_, timer) = state.remove(&id);
            cancelled.extend(timer);
            state.toasts.push(Toast {
                id: id.clone(),
                title: options.title,
                description: options.description,
                tone: options.tone,
                duration: (!duration.is_zero()).then_some(duration),
                action: options.action,
                created_at: self.scheduler.now(),
            });
            while state.toasts.len() > self.config.max_toasts {
                let evicted = state.toasts.remove(0);
                mosaic_core::debug!(id = %evicted.id, "toast evicted");
                cancelled.extend(state.timers.remove(&evicted.id));
            }
            let listed = state.toasts.iter().any(|t| t.id == id);
            (id, listed)
        };
        for task in cancelled {
            self.scheduler.cancel(task);
        }

        if listed && !duration.is_zero() {
            let weak = Rc::downgrade(&self.state);
            let expired = id.clone();
            let task = self
                .scheduler
                .schedule(duration, move || expire(&weak, &expired));
            self.state.borrow_mut().timers.insert(id.clone(), task);
        }
        mosaic_core::debug!(id = %id, duration_ms = duration.as_millis() as u64, "toast shown");
        id
    }

    /// Remove a toast. Returns whether it was listed.
    pub fn dismiss(&self, id: &ToastId) -> bool {
        let (removed, timer) = self.state.borrow_mut().remove(id);
        if let Some(task) = timer {
            self.scheduler.cancel(task);
        }
        if removed {
            mosaic_core::debug!(id = %id, "toast dismissed");
        }
        removed
    }

    /// Remove every toast and cancel every timer.
    pub fn clear(&self) {
        let timers: Vec<TaskId> = {
            let mut state = self.state.borrow_mut();
            state.toasts.clear();
            state.timers.drain().map(|(_, task)| task).collect()
        };
        for task in timers {
            self.scheduler.cancel(task);
        }
    }

    /// Snapshot of the stack, oldest first.
    #[must_use]
    pub fn toasts(&self) -> Vec<Toast> {
        self.state.borrow().toasts.clone()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.state.borrow().toasts.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.state.borrow().toasts.is_empty()
    }

    /// Run the toast's action, then dismiss it. Returns whether an action
    /// ran.
    pub fn invoke_action(&self, id: &ToastId) -> bool {
        let action = self
            .state
            .borrow()
            .toasts
            .iter()
            .find(|t| &t.id == id)
            .and_then(|t| t.action.as_ref())
            .map(|a| Rc::clone(&a.on_action));
        let Some(action) = action else {
            return false;
        };
        action();
        self.dismiss(id);
        true
    }
}

fn expire(state: &Weak<RefCell<ManagerState>>, id: &ToastId) {
    let Some(state) = state.upgrade() else {
        return;
    };
    let mut state = state.borrow_mut();
    state.timers.remove(id);
    state.toasts.retain(|t| &t.id != id);
    mosaic_core::debug!(id = %id, "toast expired");
}

impl Drop for ToastManager {
    fn drop(&mut self) {
        self.clear();
    }
}
