#![forbid(unsafe_code)]

//! Errors for structural misuse of composite widgets.

use std::fmt;

/// A widget part was used outside the root that owns it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContextError {
    /// The part's root has been dropped (or was never attached).
    MissingRoot {
        /// The part being used, e.g. `"TabsTrigger"`.
        part: &'static str,
        /// The root it requires, e.g. `"Tabs"`.
        root: &'static str,
    },
}

impl fmt::Display for ContextError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContextError::MissingRoot { part, root } => {
                write!(f, "{part} must be used within {root}")
            }
        }
    }
}

impl std::error::Error for ContextError {}

/// Result type for operations on widget parts.
pub type ContextResult<T> = Result<T, ContextError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_names_part_and_root() {
        let err = ContextError::MissingRoot {
            part: "TabsTrigger",
            root: "Tabs",
        };
        assert_eq!(err.to_string(), "TabsTrigger must be used within Tabs");
    }
}
