#![forbid(unsafe_code)]

//! Human-readable combo labels.
//!
//! Mac labels use modifier symbols separated by spaces (`⌘ ⇧ T`); other
//! platforms spell modifiers out and join with `" + "` (`Ctrl + Shift + T`).

use unicode_segmentation::UnicodeSegmentation;

use crate::combo::Combo;
use crate::platform::Platform;

fn mac_symbol(modifier: &str) -> &'static str {
    match modifier {
        "meta" => "⌘",
        "ctrl" => "⌃",
        "alt" => "⌥",
        _ => "⇧",
    }
}

fn pc_label(modifier: &str) -> &'static str {
    match modifier {
        "meta" => "Win",
        "ctrl" => "Ctrl",
        "alt" => "Alt",
        _ => "Shift",
    }
}

/// Display label for a canonical key name.
#[must_use]
pub fn format_key_label(key: &str) -> String {
    let fixed = match key {
        "arrowup" => "↑",
        "arrowdown" => "↓",
        "arrowleft" => "←",
        "arrowright" => "→",
        "esc" => "Esc",
        "enter" => "Enter",
        "space" => "Space",
        "backspace" => "Backspace",
        "delete" => "Delete",
        "tab" => "Tab",
        "home" => "Home",
        "end" => "End",
        "pageup" => "Page Up",
        "pagedown" => "Page Down",
        _ => return free_form_label(key),
    };
    fixed.to_owned()
}

fn free_form_label(key: &str) -> String {
    if key.graphemes(true).count() == 1 {
        return key.to_uppercase();
    }
    key.replace(['-', '_'], " ")
        .split_word_bounds()
        .map(|segment| {
            let mut chars = segment.chars();
            match chars.next() {
                Some(first) if first.is_alphanumeric() => {
                    first.to_uppercase().chain(chars).collect::<String>()
                }
                _ => segment.to_owned(),
            }
        })
        .collect()
}

/// Label for a set of combo variants.
///
/// Picks the variant holding the platform's primary modifier (meta on Mac,
/// ctrl elsewhere), falling back to the first. Empty input yields `""`.
#[must_use]
pub fn format_combo(platform: Platform, combos: &[Combo]) -> String {
    let primary = if platform.is_mac() { "meta" } else { "ctrl" };
    let Some(preferred) = combos
        .iter()
        .find(|c| c.modifier_names().any(|m| m == primary))
        .or_else(|| combos.first())
    else {
        return String::new();
    };

    let mut parts: Vec<String> = preferred
        .modifier_names()
        .map(|m| {
            let label = if platform.is_mac() {
                mac_symbol(m)
            } else {
                pc_label(m)
            };
            label.to_owned()
        })
        .collect();
    parts.push(format_key_label(preferred.key()));
    let joiner = if platform.is_mac() { " " } else { " + " };
    parts.join(joiner).trim().to_owned()
}
