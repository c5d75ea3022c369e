#![forbid(unsafe_code)]

//! Mosaic public facade crate.
//!
//! This crate provides the stable, ergonomic surface area for users. It
//! re-exports common types from the internal crates, offers a lightweight
//! prelude, and defines [`Mosaic`], the application root that owns the
//! shared registries.
//!
//! ```
//! use mosaic::prelude::*;
//!
//! let app = Mosaic::new(MosaicConfig::new().platform(Platform::Other));
//! let _save = app.shortcuts().register(
//!     ShortcutConfig::new(|_| {}).id("save").title("Save").combo("mod+s"),
//! );
//!
//! let mut ctrl_k = KeyboardEvent::press(KeyCode::Char('k'), Modifiers::CTRL);
//! assert!(app.handle_key(&mut ctrl_k).is_handled());
//! assert!(app.palette().is_open());
//! ```

use std::fmt;
use std::rc::Rc;
use std::time::Duration;

// --- Core re-exports -------------------------------------------------------

pub use mosaic_core::{
    ContextError, ContextResult, Controllable, EventResult, EventTarget, FocusHandle, FocusRef,
    FocusScope, HandlerChain, KeyCode, KeyEvent, KeyEventKind, KeyboardEvent, Modifiers, Point,
    Rect, Scheduler, Size, TaskId,
};

// --- Theme re-exports ------------------------------------------------------

pub use mosaic_theme::{
    Accent, Appearance, ColorVision, FileStorage, MemoryStorage, NoStorage, PartialThemeOptions,
    PreferenceSource, StaticPreferences, StorageBackend, StorageError, SystemPreference,
    TerminalPreferences, ThemeOptions, ThemeStore, ThemeStoreConfig, ThemeTokens, TokenName,
};

// --- Shortcut re-exports ---------------------------------------------------

pub use mosaic_shortcuts::{
    DispatchOutcome, Platform, RegisteredShortcut, ShortcutConfig, ShortcutGuard,
    ShortcutRegistry,
};

// --- Widget re-exports -----------------------------------------------------

pub use mosaic_widgets::{
    Accordion, AccordionItem, AccordionMode, ActivationMode, ComboOption, Combobox,
    CommandPalette, ContextMenu, Dialog, DialogConfig, DialogVariant, MenuItem, Orientation,
    Overlay, OverlayConfig, PaletteAction, PaletteConfig, SheetSide, Tabs, TabsPanel, TabsTrigger,
    ToastConfig, ToastId, ToastManager, ToastOptions, ToastTone, Tooltip, TooltipConfig,
};

// --- Errors ---------------------------------------------------------------

/// Top-level error type for Mosaic apps.
#[derive(Debug)]
pub enum Error {
    /// A widget part was used outside its root.
    Context(ContextError),
    /// A persistence backend failed.
    Storage(StorageError),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Context(err) => write!(f, "{err}"),
            Self::Storage(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Context(err) => Some(err),
            Self::Storage(err) => Some(err),
        }
    }
}

impl From<ContextError> for Error {
    fn from(err: ContextError) -> Self {
        Self::Context(err)
    }
}

impl From<StorageError> for Error {
    fn from(err: StorageError) -> Self {
        Self::Storage(err)
    }
}

/// Standard result type for Mosaic APIs.
pub type Result<T> = std::result::Result<T, Error>;

// --- Application root ------------------------------------------------------

/// Settings for [`Mosaic::new`].
#[derive(Debug, Clone, Default)]
pub struct MosaicConfig {
    /// `None` uses the platform this binary was built for.
    pub platform: Option<Platform>,
    pub theme: ThemeStoreConfig,
    pub palette: PaletteConfig,
    pub toasts: ToastConfig,
}

impl MosaicConfig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn platform(mut self, platform: Platform) -> Self {
        self.platform = Some(platform);
        self
    }

    #[must_use]
    pub fn theme(mut self, theme: ThemeStoreConfig) -> Self {
        self.theme = theme;
        self
    }

    #[must_use]
    pub fn palette(mut self, palette: PaletteConfig) -> Self {
        self.palette = palette;
        self
    }

    #[must_use]
    pub fn toasts(mut self, toasts: ToastConfig) -> Self {
        self.toasts = toasts;
        self
    }
}

/// The application root: one scheduler, shortcut registry, theme store,
/// toast stack and command palette per app.
///
/// Widgets that need a scheduler or registry borrow them from here rather
/// than from globals.
pub struct Mosaic {
    scheduler: Scheduler,
    shortcuts: ShortcutRegistry,
    theme: ThemeStore,
    toasts: ToastManager,
    palette: CommandPalette,
}

impl fmt::Debug for Mosaic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Mosaic")
            .field("scheduler", &self.scheduler)
            .field("shortcuts", &self.shortcuts)
            .field("theme", &self.theme)
            .field("toasts", &self.toasts)
            .finish_non_exhaustive()
    }
}

impl Mosaic {
    /// A root with an unpersisted theme and no system preference signals.
    #[must_use]
    pub fn new(config: MosaicConfig) -> Self {
        Self::with_environment(config, Rc::new(NoStorage), &StaticPreferences::new())
    }

    /// A root whose theme store reads and writes `backend` and follows
    /// `preferences`.
    #[must_use]
    pub fn with_environment(
        config: MosaicConfig,
        backend: Rc<dyn StorageBackend>,
        preferences: &dyn PreferenceSource,
    ) -> Self {
        let scheduler = Scheduler::new();
        let shortcuts = ShortcutRegistry::new(config.platform.unwrap_or_else(Platform::current));
        let theme = ThemeStore::new(config.theme, backend, preferences);
        let toasts = ToastManager::new(&scheduler, config.toasts);
        let palette = CommandPalette::new(&shortcuts, &scheduler, config.palette);
        mosaic_core::debug!(platform = ?shortcuts.platform(), "mosaic root created");
        Self {
            scheduler,
            shortcuts,
            theme,
            toasts,
            palette,
        }
    }

    #[must_use]
    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    #[must_use]
    pub fn shortcuts(&self) -> &ShortcutRegistry {
        &self.shortcuts
    }

    #[must_use]
    pub fn theme(&self) -> &ThemeStore {
        &self.theme
    }

    #[must_use]
    pub fn toasts(&self) -> &ToastManager {
        &self.toasts
    }

    #[must_use]
    pub fn palette(&self) -> &CommandPalette {
        &self.palette
    }

    /// Show a toast.
    pub fn toast(&self, options: ToastOptions) -> ToastId {
        self.toasts.toast(options)
    }

    /// Route a document-level key press.
    ///
    /// While the palette is open its search field owns focus: the palette
    /// sees the event first and the registry then treats it as coming from
    /// an editable field.
    pub fn handle_key(&self, event: &mut KeyboardEvent) -> EventResult {
        if self.palette.is_open() {
            event.target = EventTarget::Editable;
            if self.palette.handle_key(event).is_some() || event.is_default_prevented() {
                return EventResult::Handled;
            }
        }
        if self.shortcuts.dispatch(event).handled() {
            EventResult::Handled
        } else {
            EventResult::NotHandled
        }
    }

    /// Move the virtual clock forward, running due timers.
    pub fn advance(&self, elapsed: Duration) {
        self.scheduler.advance(elapsed);
    }

    /// Run every task that is already due.
    pub fn run_pending(&self) {
        self.scheduler.run_pending();
    }
}

// --- Prelude --------------------------------------------------------------

pub mod prelude {
    pub use crate::{
        Appearance, CommandPalette, ContextError, Error, EventResult, FocusHandle, FocusRef,
        FocusScope, KeyCode, KeyEvent, KeyboardEvent, Modifiers, Mosaic, MosaicConfig, Platform,
        Result, Scheduler, ShortcutConfig, ShortcutRegistry, ThemeOptions, ThemeStore, ToastManager,
        ToastOptions, TokenName,
    };

    pub use crate::{core, shortcuts, theme, widgets};
}

pub use mosaic_core as core;
pub use mosaic_shortcuts as shortcuts;
pub use mosaic_theme as theme;
pub use mosaic_widgets as widgets;

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    fn app() -> Mosaic {
        Mosaic::new(MosaicConfig::new().platform(Platform::Other))
    }

    #[test]
    fn palette_toggle_is_installed() {
        let app = app();
        assert!(app.shortcuts().get(mosaic_widgets::PALETTE_SHORTCUT_ID).is_some());
        assert_eq!(app.palette().shortcut_label(), "Ctrl + K");
    }

    #[test]
    fn typing_in_the_palette_does_not_fire_plain_shortcuts() {
        let app = app();
        let hits = Rc::new(Cell::new(0));
        let sink = Rc::clone(&hits);
        let _guard = app
            .shortcuts()
            .register(ShortcutConfig::new(move |_| sink.set(sink.get() + 1)).combo("g"));

        let mut g = KeyboardEvent::press(KeyCode::Char('g'), Modifiers::NONE);
        assert!(app.handle_key(&mut g).is_handled());
        assert_eq!(hits.get(), 1);

        app.palette().open();
        let mut g = KeyboardEvent::press(KeyCode::Char('g'), Modifiers::NONE);
        assert_eq!(app.handle_key(&mut g), EventResult::NotHandled);
        assert_eq!(hits.get(), 1);
        assert_eq!(app.palette().query(), "g");

        let mut ctrl_k = KeyboardEvent::press(KeyCode::Char('k'), Modifiers::CTRL);
        assert!(app.handle_key(&mut ctrl_k).is_handled());
        assert!(!app.palette().is_open());
    }

    #[test]
    fn toasts_follow_the_root_clock() {
        let app = Mosaic::new(
            MosaicConfig::new().toasts(ToastConfig::default().default_duration(Duration::from_secs(1))),
        );
        app.toast(ToastOptions::new("hello"));
        app.advance(Duration::from_millis(999));
        assert_eq!(app.toasts().len(), 1);
        app.advance(Duration::from_millis(1));
        assert!(app.toasts().is_empty());
    }

    #[test]
    fn errors_convert_and_display() {
        fn part_outside_root() -> Result<()> {
            Err(ContextError::MissingRoot {
                part: "TabsTrigger",
                root: "Tabs",
            })?;
            Ok(())
        }
        let err = part_outside_root().unwrap_err();
        assert!(matches!(err, Error::Context(_)));
        assert_eq!(err.to_string(), "TabsTrigger must be used within Tabs");

        let err = Error::from(StorageError::Unavailable("no window".into()));
        assert!(std::error::Error::source(&err).is_some());
    }
}
