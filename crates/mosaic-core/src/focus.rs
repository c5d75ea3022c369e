#![forbid(unsafe_code)]

//! Focus handles supplied by the render layer.
//!
//! The state machines never touch a real element. They hold opaque
//! [`FocusHandle`] trait objects and ask a [`FocusScope`] for tab order and the
//! currently active element.
//!
//! # Invariants
//!
//! - Handle identity is pointer identity ([`same_handle`]); two `Rc`s to the
//!   same element compare equal even through different vtables.
//! - `focus()` is always called with no internal borrow held, so an
//!   implementation may call back into the toolkit.

use std::rc::Rc;

/// Something that can receive keyboard focus.
pub trait FocusHandle {
    /// Move focus to this element.
    fn focus(&self);

    /// Whether the element is still attached and can take focus right now.
    fn is_focusable(&self) -> bool {
        true
    }
}

/// Shared reference to a focus handle.
pub type FocusRef = Rc<dyn FocusHandle>;

/// Pointer identity for focus handles.
#[must_use]
pub fn same_handle(a: &FocusRef, b: &FocusRef) -> bool {
    std::ptr::addr_eq(Rc::as_ptr(a), Rc::as_ptr(b))
}

/// Focus context for one overlay surface.
pub trait FocusScope {
    /// The surface container; focused when nothing inside can take focus.
    fn container(&self) -> FocusRef;

    /// Focusable descendants in tab order.
    fn focusables(&self) -> Vec<FocusRef>;

    /// The element that currently has focus anywhere on the page.
    fn active(&self) -> Option<FocusRef>;
}

/// Lightweight in-memory focus model for tests and headless hosts.
#[cfg(any(test, feature = "test-helpers"))]
pub mod testing {
    use super::{FocusHandle, FocusRef, FocusScope};
    use std::cell::{Cell, RefCell};
    use std::collections::HashMap;
    use std::rc::{Rc, Weak};

    #[derive(Default)]
    struct DocState {
        active: Option<String>,
        elements: HashMap<String, Weak<FakeElement>>,
        log: Vec<String>,
    }

    /// A page with a single active element.
    #[derive(Clone, Default)]
    pub struct FocusDocument {
        state: Rc<RefCell<DocState>>,
    }

    impl FocusDocument {
        #[must_use]
        pub fn new() -> Self {
            Self::default()
        }

        /// Create a focusable element owned by this document.
        pub fn element(&self, name: &str) -> Rc<FakeElement> {
            let el = Rc::new(FakeElement {
                name: name.to_owned(),
                doc: Rc::downgrade(&self.state),
                focusable: Cell::new(true),
                connected: Cell::new(true),
            });
            self.state
                .borrow_mut()
                .elements
                .insert(name.to_owned(), Rc::downgrade(&el));
            el
        }

        /// Name of the focused element.
        #[must_use]
        pub fn active_name(&self) -> Option<String> {
            self.state.borrow().active.clone()
        }

        /// The focused element as a handle, if it is still alive.
        #[must_use]
        pub fn active(&self) -> Option<FocusRef> {
            let state = self.state.borrow();
            let name = state.active.as_ref()?;
            let el = state.elements.get(name)?.upgrade()?;
            Some(el as FocusRef)
        }

        /// Every successful `focus()` call, in order.
        #[must_use]
        pub fn focus_log(&self) -> Vec<String> {
            self.state.borrow().log.clone()
        }

        /// Drop focus without focusing anything else.
        pub fn blur(&self) {
            self.state.borrow_mut().active = None;
        }
    }

    /// A named element in a [`FocusDocument`].
    pub struct FakeElement {
        name: String,
        doc: Weak<RefCell<DocState>>,
        focusable: Cell<bool>,
        connected: Cell<bool>,
    }

    impl FakeElement {
        #[must_use]
        pub fn name(&self) -> &str {
            &self.name
        }

        pub fn set_focusable(&self, focusable: bool) {
            self.focusable.set(focusable);
        }

        /// Detach from the page; further focus calls are ignored.
        pub fn disconnect(&self) {
            self.connected.set(false);
        }

        /// Shorthand for a type-erased handle.
        #[must_use]
        pub fn handle(self: &Rc<Self>) -> FocusRef {
            Rc::clone(self) as FocusRef
        }
    }

    impl FocusHandle for FakeElement {
        fn focus(&self) {
            if !self.is_focusable() {
                return;
            }
            if let Some(doc) = self.doc.upgrade() {
                let mut doc = doc.borrow_mut();
                doc.active = Some(self.name.clone());
                doc.log.push(self.name.clone());
            }
        }

        fn is_focusable(&self) -> bool {
            self.connected.get() && self.focusable.get()
        }
    }

    /// A container plus ordered focusable children.
    pub struct FakeScope {
        doc: FocusDocument,
        container: Rc<FakeElement>,
        children: RefCell<Vec<Rc<FakeElement>>>,
    }

    impl FakeScope {
        #[must_use]
        pub fn new(doc: &FocusDocument, container: &str, children: &[&str]) -> Self {
            Self {
                doc: doc.clone(),
                container: doc.element(container),
                children: RefCell::new(children.iter().map(|c| doc.element(c)).collect()),
            }
        }

        /// Child element by name.
        #[must_use]
        pub fn child(&self, name: &str) -> Option<Rc<FakeElement>> {
            self.children
                .borrow()
                .iter()
                .find(|c| c.name == name)
                .cloned()
        }

        /// Remove every child.
        pub fn clear(&self) {
            self.children.borrow_mut().clear();
        }
    }

    impl FocusScope for FakeScope {
        fn container(&self) -> FocusRef {
            self.container.handle()
        }

        fn focusables(&self) -> Vec<FocusRef> {
            self.children
                .borrow()
                .iter()
                .filter(|c| c.is_focusable())
                .map(FakeElement::handle)
                .collect()
        }

        fn active(&self) -> Option<FocusRef> {
            self.doc.active()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::testing::FocusDocument;
    use super::*;

    #[test]
    fn identity_is_pointer_based() {
        let doc = FocusDocument::new();
        let a = doc.element("a");
        let b = doc.element("b");
        assert!(same_handle(&a.handle(), &a.handle()));
        assert!(!same_handle(&a.handle(), &b.handle()));
    }

    #[test]
    fn disconnected_elements_ignore_focus() {
        let doc = FocusDocument::new();
        let a = doc.element("a");
        a.focus();
        assert_eq!(doc.active_name().as_deref(), Some("a"));
        let b = doc.element("b");
        b.disconnect();
        b.focus();
        assert_eq!(doc.active_name().as_deref(), Some("a"));
        assert!(!b.is_focusable());
    }

    #[test]
    fn scope_helpers_are_reachable_from_the_crate_root() {
        let doc = crate::testing::FocusDocument::new();
        let scope = crate::testing::FakeScope::new(&doc, "panel", &["a", "b"]);
        if let Some(a) = scope.child("a") {
            a.set_focusable(false);
        }
        assert_eq!(scope.focusables().len(), 1);
        scope.container().focus();
        assert_eq!(doc.active_name().as_deref(), Some("panel"));
        assert!(scope.active().is_some());
    }
}
