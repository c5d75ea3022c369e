#![forbid(unsafe_code)]

//! Application-wide keyboard shortcuts.
//!
//! Combos are written the way users read them (`"mod+shift+t"`, `"ctrl+k"`,
//! `"escape"`) and normalized into canonical [`Combo`]s. The
//! [`ShortcutRegistry`] owns every registration for one application root and
//! turns keyboard events into handler calls.
//!
//! ```
//! use mosaic_core::{KeyCode, KeyboardEvent, Modifiers};
//! use mosaic_shortcuts::{Platform, ShortcutConfig, ShortcutRegistry};
//! use std::cell::Cell;
//! use std::rc::Rc;
//!
//! let registry = ShortcutRegistry::new(Platform::Mac);
//! let hits = Rc::new(Cell::new(0));
//! let sink = Rc::clone(&hits);
//! let _guard = registry.register(
//!     ShortcutConfig::new(move |_| sink.set(sink.get() + 1))
//!         .title("Open")
//!         .combo("mod+o"),
//! );
//!
//! let mut event = KeyboardEvent::press(KeyCode::Char('o'), Modifiers::META);
//! registry.dispatch(&mut event);
//! assert_eq!(hits.get(), 1);
//! assert!(event.is_default_prevented());
//! ```

pub mod combo;
pub mod format;
pub mod platform;
pub mod registry;

pub use combo::{Combo, event_to_combo, key_name, normalize_combo, normalize_key};
pub use format::{format_combo, format_key_label};
pub use platform::Platform;
pub use registry::{
    DispatchOutcome, RegisteredShortcut, ShortcutConfig, ShortcutGuard, ShortcutHandler,
    ShortcutRegistry,
};
