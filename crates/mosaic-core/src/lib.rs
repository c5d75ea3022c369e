#![forbid(unsafe_code)]

//! Core: key events, geometry, focus handles, state cells, handler chains and
//! the virtual-clock scheduler shared by every Mosaic crate.

pub mod controllable;
pub mod error;
pub mod event;
pub mod focus;
pub mod geometry;
pub mod handler;
pub mod logging;
pub mod scheduler;

pub use controllable::{ChangeCallback, Controllable, PendingChange};
pub use error::{ContextError, ContextResult};
pub use event::{
    EventTarget, KeyCode, KeyEvent, KeyEventKind, KeyboardEvent, ModifierKey, Modifiers,
};
pub use focus::{FocusHandle, FocusRef, FocusScope, same_handle};
#[cfg(any(test, feature = "test-helpers"))]
pub use focus::testing;
pub use geometry::{Point, Rect, Size, clamp_to_viewport};
pub use handler::{EventResult, HandlerChain};
pub use scheduler::{Scheduler, TaskId};

// Re-export tracing macros at crate root for ergonomic use.
#[cfg(feature = "tracing")]
pub use logging::{debug, debug_span, error, info, trace, trace_span, warn};
