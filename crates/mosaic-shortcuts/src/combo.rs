#![forbid(unsafe_code)]

//! Combo normalization.
//!
//! A [`Combo`] is the canonical `modifier+…+key` form used for matching:
//! lower-case, modifiers in the fixed order `ctrl`, `meta`, `alt`, `shift`,
//! then exactly one key name.
//!
//! # Invariants
//!
//! | Property | Guarantee |
//! |----------|-----------|
//! | Ordering | Modifiers always appear as ctrl, meta, alt, shift |
//! | Uniqueness | [`normalize_combo`] never returns duplicates |
//! | `mod` | Expands to one meta variant and one ctrl variant |
//! | Bare modifiers | [`event_to_combo`] returns `None` for a lone modifier key |
//!
//! # Failure Modes
//!
//! | Input | Result |
//! |-------|--------|
//! | Empty or whitespace-only string | no combos |
//! | Only modifiers (`"ctrl+shift"`) | no combos |
//! | Several keys (`"a+b"`) | the last key wins |

use std::fmt;

use mosaic_core::{KeyCode, KeyEvent, Modifiers};

/// Canonical modifier order with the name each one prints as.
const MODIFIER_ORDER: [(Modifiers, &str); 4] = [
    (Modifiers::CTRL, "ctrl"),
    (Modifiers::META, "meta"),
    (Modifiers::ALT, "alt"),
    (Modifiers::SHIFT, "shift"),
];

/// A normalized key combination such as `ctrl+shift+t`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Combo {
    text: String,
    modifiers: Modifiers,
}

impl Combo {
    fn build(modifiers: Modifiers, key: &str) -> Self {
        let mut text = String::with_capacity(key.len() + 16);
        for (flag, name) in MODIFIER_ORDER {
            if modifiers.contains(flag) {
                text.push_str(name);
                text.push('+');
            }
        }
        text.push_str(key);
        Self { text, modifiers }
    }

    /// The canonical text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Held modifiers.
    #[must_use]
    pub const fn modifiers(&self) -> Modifiers {
        self.modifiers
    }

    /// The key part (after the last `+`).
    #[must_use]
    pub fn key(&self) -> &str {
        self.text.rsplit('+').next().unwrap_or(&self.text)
    }

    /// Modifier names in canonical order.
    pub fn modifier_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        MODIFIER_ORDER
            .iter()
            .filter(|(flag, _)| self.modifiers.contains(*flag))
            .map(|(_, name)| *name)
    }
}

impl fmt::Display for Combo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

impl PartialEq<str> for Combo {
    fn eq(&self, other: &str) -> bool {
        self.text == other
    }
}

impl PartialEq<&str> for Combo {
    fn eq(&self, other: &&str) -> bool {
        self.text == *other
    }
}

// ---------------------------------------------------------------------------
// Parsing
// ---------------------------------------------------------------------------

/// Either a concrete modifier or the platform-dependent `mod`.
enum ModifierToken {
    Concrete(Modifiers),
    Platform,
}

fn modifier_alias(token: &str) -> Option<ModifierToken> {
    let flag = match token {
        "mod" => return Some(ModifierToken::Platform),
        "cmd" | "command" | "meta" | "win" | "windows" => Modifiers::META,
        "control" | "ctrl" => Modifiers::CTRL,
        "option" | "alt" => Modifiers::ALT,
        "shift" => Modifiers::SHIFT,
        _ => return None,
    };
    Some(ModifierToken::Concrete(flag))
}

/// Canonical key name: aliases folded, everything else lower-cased.
#[must_use]
pub fn normalize_key(key: &str) -> String {
    let lower = key.to_lowercase();
    let canonical = match lower.as_str() {
        " " | "space" | "spacebar" => "space",
        "escape" | "esc" => "esc",
        "enter" | "return" => "enter",
        "delete" | "del" => "delete",
        "arrowup" | "up" => "arrowup",
        "arrowdown" | "down" => "arrowdown",
        "arrowleft" | "left" => "arrowleft",
        "arrowright" | "right" => "arrowright",
        _ => return lower,
    };
    canonical.to_owned()
}

/// Expand a user-written combo into its canonical variants.
///
/// ```
/// use mosaic_shortcuts::normalize_combo;
///
/// let combos = normalize_combo("Mod+Shift+T");
/// assert_eq!(combos[0], "meta+shift+t");
/// assert_eq!(combos[1], "ctrl+shift+t");
/// ```
#[must_use]
pub fn normalize_combo(input: &str) -> Vec<Combo> {
    let mut modifiers = Modifiers::NONE;
    let mut platform = false;
    let mut key = None;

    for part in input.split('+').map(str::trim).filter(|p| !p.is_empty()) {
        let lower = part.to_lowercase();
        match modifier_alias(&lower) {
            Some(ModifierToken::Platform) => platform = true,
            Some(ModifierToken::Concrete(flag)) => modifiers |= flag,
            None => key = Some(normalize_key(&lower)),
        }
    }

    let Some(key) = key else {
        return Vec::new();
    };

    if !platform {
        return vec![Combo::build(modifiers, &key)];
    }
    let meta = Combo::build(modifiers | Modifiers::META, &key);
    let ctrl = Combo::build(modifiers | Modifiers::CTRL, &key);
    if meta == ctrl {
        vec![meta]
    } else {
        vec![meta, ctrl]
    }
}

/// Canonical name for a key code; `None` for bare modifiers.
#[must_use]
pub fn key_name(code: KeyCode) -> Option<String> {
    let name = match code {
        KeyCode::Char(' ') => "space",
        KeyCode::Char(c) => return Some(c.to_lowercase().collect()),
        KeyCode::Enter => "enter",
        KeyCode::Escape => "esc",
        KeyCode::Backspace => "backspace",
        KeyCode::Tab => "tab",
        KeyCode::Delete => "delete",
        KeyCode::Insert => "insert",
        KeyCode::Home => "home",
        KeyCode::End => "end",
        KeyCode::PageUp => "pageup",
        KeyCode::PageDown => "pagedown",
        KeyCode::Up => "arrowup",
        KeyCode::Down => "arrowdown",
        KeyCode::Left => "arrowleft",
        KeyCode::Right => "arrowright",
        KeyCode::F(n) => return Some(format!("f{n}")),
        KeyCode::ContextMenu => "contextmenu",
        KeyCode::Modifier(_) => return None,
    };
    Some(name.to_owned())
}

/// The combo a key event produces, or `None` for a lone modifier key.
#[must_use]
pub fn event_to_combo(event: &KeyEvent) -> Option<Combo> {
    let key = key_name(event.code)?;
    Some(Combo::build(event.modifiers, &key))
}

#[cfg(test)]
mod tests {
    use super::*;
    use mosaic_core::ModifierKey;

    fn texts(input: &str) -> Vec<String> {
        normalize_combo(input).iter().map(|c| c.to_string()).collect()
    }

    #[test]
    fn aliases_fold_into_canonical_modifiers() {
        assert_eq!(texts("cmd+k"), ["meta+k"]);
        assert_eq!(texts("Command+K"), ["meta+k"]);
        assert_eq!(texts("win+e"), ["meta+e"]);
        assert_eq!(texts("control+c"), ["ctrl+c"]);
        assert_eq!(texts("option+x"), ["alt+x"]);
    }

    #[test]
    fn modifiers_are_sorted() {
        assert_eq!(texts("shift+alt+meta+ctrl+a"), ["ctrl+meta+alt+shift+a"]);
        assert_eq!(texts("shift + ctrl + p"), ["ctrl+shift+p"]);
    }

    #[test]
    fn mod_expands_to_meta_and_ctrl() {
        assert_eq!(texts("mod+k"), ["meta+k", "ctrl+k"]);
        assert_eq!(texts("mod+shift+t"), ["meta+shift+t", "ctrl+shift+t"]);
    }

    #[test]
    fn mod_with_both_platform_modifiers_dedupes() {
        assert_eq!(texts("mod+ctrl+meta+k"), ["ctrl+meta+k"]);
    }

    #[test]
    fn key_aliases() {
        assert_eq!(texts("Escape"), ["esc"]);
        assert_eq!(texts("return"), ["enter"]);
        assert_eq!(texts("del"), ["delete"]);
        assert_eq!(texts("spacebar"), ["space"]);
        assert_eq!(texts("shift+ArrowUp"), ["shift+arrowup"]);
        assert_eq!(texts("F5"), ["f5"]);
    }

    #[test]
    fn degenerate_inputs() {
        assert!(normalize_combo("").is_empty());
        assert!(normalize_combo("   ").is_empty());
        assert!(normalize_combo("ctrl+shift").is_empty());
        assert!(normalize_combo("mod").is_empty());
        assert_eq!(texts("a+b"), ["b"]);
    }

    #[test]
    fn combo_parts() {
        let combo = &normalize_combo("alt+shift+Tab")[0];
        assert_eq!(combo.key(), "tab");
        assert_eq!(combo.modifiers(), Modifiers::ALT | Modifiers::SHIFT);
        assert_eq!(combo.modifier_names().collect::<Vec<_>>(), ["alt", "shift"]);
    }

    #[test]
    fn events_map_to_combos() {
        let ev = KeyEvent::new(KeyCode::Char('T')).with_modifiers(Modifiers::SHIFT | Modifiers::META);
        assert_eq!(event_to_combo(&ev).expect("combo"), "meta+shift+t");

        let ev = KeyEvent::new(KeyCode::Char(' ')).with_modifiers(Modifiers::CTRL);
        assert_eq!(event_to_combo(&ev).expect("combo"), "ctrl+space");

        let ev = KeyEvent::new(KeyCode::Escape);
        assert_eq!(event_to_combo(&ev).expect("combo"), "esc");
    }

    #[test]
    fn bare_modifier_produces_nothing() {
        let ev = KeyEvent::new(KeyCode::Modifier(ModifierKey::Shift)).with_modifiers(Modifiers::SHIFT);
        assert!(event_to_combo(&ev).is_none());
    }

    #[test]
    fn registered_and_event_forms_agree() {
        let registered = normalize_combo("mod+shift+t");
        let ev = KeyEvent::new(KeyCode::Char('t')).with_modifiers(Modifiers::CTRL | Modifiers::SHIFT);
        let combo = event_to_combo(&ev).expect("combo");
        assert!(registered.contains(&combo));
    }
}
