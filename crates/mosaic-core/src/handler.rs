#![forbid(unsafe_code)]

//! Ordered event-handler composition.
//!
//! Widgets attach internal behaviour to events the caller may also handle.
//! The caller's handler runs first; returning [`EventResult::Handled`] stops
//! the chain so built-in behaviour can be overridden.

/// Whether a handler consumed the event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EventResult {
    /// Stop; later handlers do not run.
    Handled,
    /// Continue with the next handler.
    #[default]
    NotHandled,
}

impl EventResult {
    #[must_use]
    pub const fn is_handled(self) -> bool {
        matches!(self, Self::Handled)
    }
}

type Handler<E> = Box<dyn FnMut(&mut E) -> EventResult>;

/// Handlers for one event type, run in insertion order.
pub struct HandlerChain<E> {
    handlers: Vec<Handler<E>>,
}

impl<E> Default for HandlerChain<E> {
    fn default() -> Self {
        Self {
            handlers: Vec::new(),
        }
    }
}

impl<E> std::fmt::Debug for HandlerChain<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HandlerChain")
            .field("len", &self.handlers.len())
            .finish()
    }
}

impl<E> HandlerChain<E> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a handler.
    pub fn push(&mut self, handler: impl FnMut(&mut E) -> EventResult + 'static) {
        self.handlers.push(Box::new(handler));
    }

    /// Builder form of [`push`](Self::push).
    #[must_use]
    pub fn with(mut self, handler: impl FnMut(&mut E) -> EventResult + 'static) -> Self {
        self.push(handler);
        self
    }

    /// Run handlers until one reports [`EventResult::Handled`].
    pub fn dispatch(&mut self, event: &mut E) -> EventResult {
        for handler in &mut self.handlers {
            if handler(event).is_handled() {
                return EventResult::Handled;
            }
        }
        EventResult::NotHandled
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn runs_in_order_until_handled() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let (a, b, c) = (Rc::clone(&log), Rc::clone(&log), Rc::clone(&log));
        let mut chain = HandlerChain::<u32>::new()
            .with(move |_| {
                a.borrow_mut().push("caller");
                EventResult::NotHandled
            })
            .with(move |_| {
                b.borrow_mut().push("internal");
                EventResult::Handled
            })
            .with(move |_| {
                c.borrow_mut().push("never");
                EventResult::NotHandled
            });
        assert_eq!(chain.dispatch(&mut 0), EventResult::Handled);
        assert_eq!(*log.borrow(), vec!["caller", "internal"]);
    }

    #[test]
    fn handlers_may_mutate_the_event() {
        let mut chain = HandlerChain::<u32>::new().with(|n| {
            *n += 1;
            EventResult::NotHandled
        });
        let mut n = 1;
        assert_eq!(chain.dispatch(&mut n), EventResult::NotHandled);
        assert_eq!(n, 2);
    }

    #[test]
    fn empty_chain_is_not_handled() {
        let mut chain = HandlerChain::<()>::new();
        assert!(chain.is_empty());
        assert!(!chain.dispatch(&mut ()).is_handled());
    }
}
