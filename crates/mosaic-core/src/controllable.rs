#![forbid(unsafe_code)]

//! Controlled/uncontrolled state cells.
//!
//! A widget value is either owned by the caller (controlled: the widget only
//! proposes changes) or owned by the widget (uncontrolled: proposals are
//! applied). Both modes report every accepted proposal to the change
//! callback.
//!
//! # Invariants
//!
//! - A proposal equal to the current value is dropped and notifies nobody.
//! - A controlled value only moves through [`Controllable::sync`].
//! - The callback is never invoked while the cell is borrowed: proposals
//!   return a [`PendingChange`] that the owner fires after releasing its
//!   own borrows.

use std::fmt;
use std::rc::Rc;

/// Callback receiving the proposed next value.
pub type ChangeCallback<T> = Rc<dyn Fn(&T)>;

/// Who owns a widget value.
pub enum Controllable<T> {
    /// The caller owns the value and mirrors it back via [`Controllable::sync`].
    Controlled {
        value: T,
        on_change: Option<ChangeCallback<T>>,
    },
    /// The widget owns the value.
    Uncontrolled {
        value: T,
        on_change: Option<ChangeCallback<T>>,
    },
}

impl<T: fmt::Debug> fmt::Debug for Controllable<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (mode, value) = match self {
            Self::Controlled { value, .. } => ("Controlled", value),
            Self::Uncontrolled { value, .. } => ("Uncontrolled", value),
        };
        f.debug_struct(mode).field("value", value).finish()
    }
}

impl<T: Clone + PartialEq> Controllable<T> {
    /// A caller-owned value.
    #[must_use]
    pub fn controlled(value: T) -> Self {
        Self::Controlled {
            value,
            on_change: None,
        }
    }

    /// A widget-owned value starting at `initial`.
    #[must_use]
    pub fn uncontrolled(initial: T) -> Self {
        Self::Uncontrolled {
            value: initial,
            on_change: None,
        }
    }

    /// Attach the change callback.
    #[must_use]
    pub fn with_on_change(mut self, callback: impl Fn(&T) + 'static) -> Self {
        let cb: ChangeCallback<T> = Rc::new(callback);
        match &mut self {
            Self::Controlled { on_change, .. } | Self::Uncontrolled { on_change, .. } => {
                *on_change = Some(cb);
            }
        }
        self
    }

    /// Current value (for controlled cells, the last mirrored value).
    #[must_use]
    pub fn get(&self) -> &T {
        match self {
            Self::Controlled { value, .. } | Self::Uncontrolled { value, .. } => value,
        }
    }

    #[must_use]
    pub fn is_controlled(&self) -> bool {
        matches!(self, Self::Controlled { .. })
    }

    /// Mirror the caller's value into a controlled cell.
    ///
    /// Returns `false` (and changes nothing) for uncontrolled cells.
    pub fn sync(&mut self, next: T) -> bool {
        match self {
            Self::Controlled { value, .. } => {
                *value = next;
                true
            }
            Self::Uncontrolled { .. } => false,
        }
    }

    /// Propose a new value.
    ///
    /// Uncontrolled cells apply it immediately. Either way the returned
    /// [`PendingChange`] must be fired once the caller has released its
    /// borrows. `None` means the proposal equals the current value.
    #[must_use = "the change callback only runs when the pending change is notified"]
    pub fn propose(&mut self, next: T) -> Option<PendingChange<T>> {
        if *self.get() == next {
            return None;
        }
        match self {
            Self::Controlled { on_change, .. } => Some(PendingChange {
                value: next,
                callback: on_change.clone(),
                applied: false,
            }),
            Self::Uncontrolled { value, on_change } => {
                *value = next.clone();
                Some(PendingChange {
                    value: next,
                    callback: on_change.clone(),
                    applied: true,
                })
            }
        }
    }
}

/// A change that has been decided but not yet announced.
#[must_use = "call notify() after releasing borrows"]
pub struct PendingChange<T> {
    value: T,
    callback: Option<ChangeCallback<T>>,
    applied: bool,
}

impl<T> PendingChange<T> {
    /// The proposed value.
    #[must_use]
    pub fn value(&self) -> &T {
        &self.value
    }

    /// Whether the owning cell already holds the new value.
    #[must_use]
    pub fn applied(&self) -> bool {
        self.applied
    }

    /// Fire the change callback, if any.
    pub fn notify(self) {
        if let Some(cb) = self.callback {
            cb(&self.value);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    #[test]
    fn uncontrolled_applies_and_notifies() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let log = Rc::clone(&seen);
        let mut cell = Controllable::uncontrolled(1).with_on_change(move |v| log.borrow_mut().push(*v));
        let change = cell.propose(2).expect("value differs");
        assert!(change.applied());
        assert_eq!(*cell.get(), 2);
        change.notify();
        assert_eq!(*seen.borrow(), vec![2]);
    }

    #[test]
    fn controlled_only_notifies() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let log = Rc::clone(&seen);
        let mut cell = Controllable::controlled(1).with_on_change(move |v| log.borrow_mut().push(*v));
        let change = cell.propose(5).expect("value differs");
        assert!(!change.applied());
        change.notify();
        assert_eq!(*cell.get(), 1);
        assert_eq!(*seen.borrow(), vec![5]);
        assert!(cell.sync(5));
        assert_eq!(*cell.get(), 5);
    }

    #[test]
    fn equal_proposal_is_dropped() {
        let mut cell = Controllable::uncontrolled("a".to_owned());
        assert!(cell.propose("a".to_owned()).is_none());
    }

    #[test]
    fn sync_ignored_when_uncontrolled() {
        let mut cell = Controllable::uncontrolled(3);
        assert!(!cell.sync(9));
        assert_eq!(*cell.get(), 3);
    }
}
