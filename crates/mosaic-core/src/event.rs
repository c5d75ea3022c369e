#![forbid(unsafe_code)]

//! Canonical keyboard event types.
//!
//! The render layer translates whatever its host delivers (DOM key names,
//! terminal escape sequences, test fixtures) into [`KeyEvent`]s and wraps them
//! in a [`KeyboardEvent`] envelope before handing them to the state machines.
//!
//! # Design Notes
//!
//! - `KeyEventKind` defaults to `Press`; consumers ignore `Release`.
//! - `Modifiers` use bitflags for easy combination.
//! - Bare modifier presses are represented as [`KeyCode::Modifier`] so that
//!   consumers can recognise and skip them.
//! - The envelope carries the "default prevented" flag the host consults after
//!   dispatch, and whether the event originated in an editable field.

use bitflags::bitflags;

/// A keyboard event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyEvent {
    /// The key code that was pressed.
    pub code: KeyCode,

    /// Modifier keys held during the event.
    pub modifiers: Modifiers,

    /// The type of key event (press, repeat, or release).
    pub kind: KeyEventKind,
}

impl KeyEvent {
    /// Create a new key event with no modifiers and Press kind.
    #[must_use]
    pub const fn new(code: KeyCode) -> Self {
        Self {
            code,
            modifiers: Modifiers::NONE,
            kind: KeyEventKind::Press,
        }
    }

    /// Replace the modifier set.
    #[must_use]
    pub const fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }

    /// Replace the event kind.
    #[must_use]
    pub const fn with_kind(mut self, kind: KeyEventKind) -> Self {
        self.kind = kind;
        self
    }

    /// Check if this is a specific character key.
    #[must_use]
    pub fn is_char(&self, c: char) -> bool {
        matches!(self.code, KeyCode::Char(ch) if ch == c)
    }

    /// Check if Ctrl modifier is held.
    #[must_use]
    pub const fn ctrl(&self) -> bool {
        self.modifiers.contains(Modifiers::CTRL)
    }

    /// Check if Alt/Option modifier is held.
    #[must_use]
    pub const fn alt(&self) -> bool {
        self.modifiers.contains(Modifiers::ALT)
    }

    /// Check if Shift modifier is held.
    #[must_use]
    pub const fn shift(&self) -> bool {
        self.modifiers.contains(Modifiers::SHIFT)
    }

    /// Check if Meta/Command/Windows modifier is held.
    #[must_use]
    pub const fn meta(&self) -> bool {
        self.modifiers.contains(Modifiers::META)
    }

    /// Whether this is the Space bar (any modifiers).
    #[must_use]
    pub fn is_space(&self) -> bool {
        self.is_char(' ')
    }

    /// True for presses and auto-repeats.
    #[must_use]
    pub const fn is_press(&self) -> bool {
        !matches!(self.kind, KeyEventKind::Release)
    }
}

/// Key codes for keyboard events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyCode {
    /// A regular character key. Space is `Char(' ')`.
    Char(char),

    /// Enter/Return key.
    Enter,

    /// Escape key.
    Escape,

    /// Backspace key.
    Backspace,

    /// Tab key. Shift+Tab is `Tab` with [`Modifiers::SHIFT`].
    Tab,

    /// Delete key.
    Delete,

    /// Insert key.
    Insert,

    /// Home key.
    Home,

    /// End key.
    End,

    /// Page Up key.
    PageUp,

    /// Page Down key.
    PageDown,

    /// Up arrow key.
    Up,

    /// Down arrow key.
    Down,

    /// Left arrow key.
    Left,

    /// Right arrow key.
    Right,

    /// Function key (F1-F24).
    F(u8),

    /// The dedicated context-menu ("Apps") key.
    ContextMenu,

    /// A modifier key pressed on its own.
    Modifier(ModifierKey),
}

/// Which modifier key produced a bare [`KeyCode::Modifier`] event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModifierKey {
    Shift,
    Control,
    Alt,
    Meta,
}

impl KeyCode {
    /// Parse a host key name (`"ArrowUp"`, `"Escape"`, `"a"`, `"F10"`, ...).
    ///
    /// Names are matched case-insensitively. Single grapheme names become
    /// [`KeyCode::Char`]. Returns `None` for names this toolkit has no use for.
    #[must_use]
    pub fn from_key_name(name: &str) -> Option<Self> {
        if name == " " {
            return Some(Self::Char(' '));
        }
        let mut chars = name.chars();
        if let (Some(c), None) = (chars.next(), chars.next()) {
            return Some(Self::Char(c));
        }
        let lower = name.to_ascii_lowercase();
        let code = match lower.as_str() {
            "enter" | "return" => Self::Enter,
            "escape" | "esc" => Self::Escape,
            "backspace" => Self::Backspace,
            "tab" => Self::Tab,
            "delete" | "del" => Self::Delete,
            "insert" => Self::Insert,
            "home" => Self::Home,
            "end" => Self::End,
            "pageup" => Self::PageUp,
            "pagedown" => Self::PageDown,
            "arrowup" | "up" => Self::Up,
            "arrowdown" | "down" => Self::Down,
            "arrowleft" | "left" => Self::Left,
            "arrowright" | "right" => Self::Right,
            "space" | "spacebar" => Self::Char(' '),
            "contextmenu" | "apps" => Self::ContextMenu,
            "shift" => Self::Modifier(ModifierKey::Shift),
            "control" | "ctrl" => Self::Modifier(ModifierKey::Control),
            "alt" | "altgraph" | "option" => Self::Modifier(ModifierKey::Alt),
            "meta" | "os" | "super" | "command" => Self::Modifier(ModifierKey::Meta),
            other => {
                let n = other.strip_prefix('f')?.parse::<u8>().ok()?;
                if (1..=24).contains(&n) {
                    Self::F(n)
                } else {
                    return None;
                }
            }
        };
        Some(code)
    }

    /// Whether this is a bare modifier key.
    #[must_use]
    pub const fn is_modifier(&self) -> bool {
        matches!(self, Self::Modifier(_))
    }
}

/// The type of key event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum KeyEventKind {
    /// Key was pressed (default when not distinguishable).
    #[default]
    Press,

    /// Key is being held (repeat event).
    Repeat,

    /// Key was released.
    Release,
}

bitflags! {
    /// Modifier keys that can be held during a key event.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Modifiers: u8 {
        /// No modifiers.
        const NONE  = 0b0000;
        /// Shift key.
        const SHIFT = 0b0001;
        /// Alt/Option key.
        const ALT   = 0b0010;
        /// Control key.
        const CTRL  = 0b0100;
        /// Meta/Command/Windows key.
        const META  = 0b1000;
    }
}

impl Default for Modifiers {
    fn default() -> Self {
        Self::NONE
    }
}

/// Where a keyboard event originated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum EventTarget {
    /// A text input, textarea or content-editable region.
    Editable,
    /// Anything else.
    #[default]
    Other,
}

/// A key event in flight, as seen by dispatchers.
///
/// Handlers call [`KeyboardEvent::prevent_default`] to tell the host to
/// suppress its native behaviour once dispatch finishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyboardEvent {
    /// The key that was pressed.
    pub key: KeyEvent,
    /// Where the event originated.
    pub target: EventTarget,
    default_prevented: bool,
}

impl KeyboardEvent {
    /// Wrap a key event targeting a non-editable element.
    #[must_use]
    pub const fn new(key: KeyEvent) -> Self {
        Self {
            key,
            target: EventTarget::Other,
            default_prevented: false,
        }
    }

    /// Shorthand for a press of `code` with `modifiers`.
    #[must_use]
    pub const fn press(code: KeyCode, modifiers: Modifiers) -> Self {
        Self::new(KeyEvent::new(code).with_modifiers(modifiers))
    }

    /// Mark the event as originating from an editable field.
    #[must_use]
    pub const fn in_editable(mut self) -> Self {
        self.target = EventTarget::Editable;
        self
    }

    /// Whether the event originated from an editable field.
    #[must_use]
    pub const fn is_editable_target(&self) -> bool {
        matches!(self.target, EventTarget::Editable)
    }

    /// Ask the host to suppress native handling.
    pub fn prevent_default(&mut self) {
        self.default_prevented = true;
    }

    /// Whether any handler called [`prevent_default`](Self::prevent_default).
    #[must_use]
    pub const fn is_default_prevented(&self) -> bool {
        self.default_prevented
    }

    /// The key code.
    #[must_use]
    pub const fn code(&self) -> KeyCode {
        self.key.code
    }

    /// The held modifiers.
    #[must_use]
    pub const fn modifiers(&self) -> Modifiers {
        self.key.modifiers
    }
}

impl From<KeyEvent> for KeyboardEvent {
    fn from(key: KeyEvent) -> Self {
        Self::new(key)
    }
}
