#![forbid(unsafe_code)]

//! Item registry shared by the disclosure widgets ([`Accordion`] and [`Tabs`]).
//!
//! Tracks registration order, the disabled flag and the focus handle of every
//! trigger, plus the stable DOM ids the render layer stamps on triggers and
//! their content.
//!
//! # Invariants
//!
//! 1. Ids are unique; registering a known id keeps its position.
//! 2. Traversal only visits enabled ids and wraps at both ends.
//! 3. Each registration gets a fresh numeric suffix, so DOM ids never collide
//!    even when sanitizing maps two values onto the same text.
//!
//! [`Accordion`]: crate::accordion::Accordion
//! [`Tabs`]: crate::tabs::Tabs

use std::sync::atomic::{AtomicU64, Ordering};

use mosaic_core::FocusRef;

use crate::roving::Direction;

static NEXT_INSTANCE: AtomicU64 = AtomicU64::new(1);

/// A process-unique number for generated id prefixes.
pub(crate) fn next_instance() -> u64 {
    NEXT_INSTANCE.fetch_add(1, Ordering::Relaxed)
}

/// Replace everything outside `[a-zA-Z0-9_-]` with `-`.
#[must_use]
pub fn sanitize(value: &str) -> String {
    value
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '_' || c == '-' {
                c
            } else {
                '-'
            }
        })
        .collect()
}

struct Entry {
    id: String,
    unique: String,
    disabled: bool,
    handle: Option<FocusRef>,
}

/// Ordered trigger registry for one disclosure root.
pub struct DisclosureRegistry {
    kind: &'static str,
    prefix: String,
    entries: Vec<Entry>,
    next_suffix: u64,
}

impl std::fmt::Debug for DisclosureRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DisclosureRegistry")
            .field("kind", &self.kind)
            .field("prefix", &self.prefix)
            .field("ids", &self.ids())
            .finish()
    }
}

impl DisclosureRegistry {
    /// `kind` names the widget in generated DOM ids (`accordion`, `tab`).
    #[must_use]
    pub fn new(kind: &'static str, prefix: impl Into<String>) -> Self {
        Self {
            kind,
            prefix: sanitize(&prefix.into()),
            entries: Vec::new(),
            next_suffix: 1,
        }
    }

    /// Registry with a generated prefix.
    #[must_use]
    pub fn with_generated_prefix(kind: &'static str) -> Self {
        Self::new(kind, format!("r{}", next_instance()))
    }

    /// Swap the DOM id prefix, keeping every registration as it is.
    pub fn set_prefix(&mut self, prefix: &str) {
        self.prefix = sanitize(prefix);
    }

    fn position(&self, id: &str) -> Option<usize> {
        self.entries.iter().position(|e| e.id == id)
    }

    fn entry(&self, id: &str) -> Option<&Entry> {
        self.entries.iter().find(|e| e.id == id)
    }

    fn entry_mut(&mut self, id: &str) -> Option<&mut Entry> {
        self.entries.iter_mut().find(|e| e.id == id)
    }

    /// Add an id. Returns `false` if it was already registered.
    pub fn register(&mut self, id: &str) -> bool {
        if self.position(id).is_some() {
            return false;
        }
        let unique = format!("{}-{}", sanitize(id), self.next_suffix);
        self.next_suffix += 1;
        self.entries.push(Entry {
            id: id.to_owned(),
            unique,
            disabled: false,
            handle: None,
        });
        true
    }

    /// Remove an id. Returns whether it was registered.
    pub fn unregister(&mut self, id: &str) -> bool {
        match self.position(id) {
            Some(pos) => {
                self.entries.remove(pos);
                true
            }
            None => false,
        }
    }

    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.position(id).is_some()
    }

    /// Update the disabled flag. Returns `false` for unknown ids.
    pub fn set_disabled(&mut self, id: &str, disabled: bool) -> bool {
        match self.entry_mut(id) {
            Some(entry) => {
                entry.disabled = disabled;
                true
            }
            None => false,
        }
    }

    /// Whether `id` is registered and disabled.
    #[must_use]
    pub fn is_disabled(&self, id: &str) -> bool {
        self.entry(id).is_some_and(|e| e.disabled)
    }

    /// Attach (or detach) the trigger's focus handle.
    pub fn set_handle(&mut self, id: &str, handle: Option<FocusRef>) -> bool {
        match self.entry_mut(id) {
            Some(entry) => {
                entry.handle = handle;
                true
            }
            None => false,
        }
    }

    #[must_use]
    pub fn handle(&self, id: &str) -> Option<FocusRef> {
        self.entry(id).and_then(|e| e.handle.clone())
    }

    /// Every registered id in registration order.
    #[must_use]
    pub fn ids(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.id.as_str()).collect()
    }

    /// Registered ids that are not disabled.
    #[must_use]
    pub fn enabled_ids(&self) -> Vec<&str> {
        self.entries
            .iter()
            .filter(|e| !e.disabled)
            .map(|e| e.id.as_str())
            .collect()
    }

    #[must_use]
    pub fn first_enabled(&self) -> Option<&str> {
        self.entries
            .iter()
            .find(|e| !e.disabled)
            .map(|e| e.id.as_str())
    }

    #[must_use]
    pub fn last_enabled(&self) -> Option<&str> {
        self.entries
            .iter()
            .rev()
            .find(|e| !e.disabled)
            .map(|e| e.id.as_str())
    }

    /// The enabled id after `from`, wrapping.
    ///
    /// An unknown or disabled `from` yields the first enabled id going
    /// forward and the last going backward.
    #[must_use]
    pub fn next_enabled(&self, from: Option<&str>, direction: Direction) -> Option<&str> {
        let enabled = self.enabled_ids();
        let len = enabled.len();
        if len == 0 {
            return None;
        }
        let current = from.and_then(|id| enabled.iter().position(|e| *e == id));
        let next = match (current, direction) {
            (None, Direction::Forward) => 0,
            (None, Direction::Backward) => len - 1,
            (Some(i), Direction::Forward) => (i + 1) % len,
            (Some(i), Direction::Backward) => (i + len - 1) % len,
        };
        Some(enabled[next])
    }

    /// `mosaic-<kind>-<prefix>-<unique>-<part>`.
    ///
    /// Unregistered ids fall back to their sanitized value.
    #[must_use]
    pub fn dom_id(&self, id: &str, part: &str) -> String {
        let unique = self
            .entry(id)
            .map_or_else(|| sanitize(id), |e| e.unique.clone());
        format!("mosaic-{}-{}-{}-{}", self.kind, self.prefix, unique, part)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
