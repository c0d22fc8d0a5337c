//! State consistency error types

/// A read or write addressed a node that does not exist.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PathError {
    /// The path string could not be parsed.
    #[error("Invalid path '{path}': {reason}")]
    Syntax {
        /// The path as given.
        path: String,
        /// What is wrong with it.
        reason: &'static str,
    },

    /// A group has no child with this name.
    #[error("No node named '{name}' under '{parent}'")]
    MissingChild {
        /// Path of the group searched.
        parent: String,
        /// The missing name.
        name: String,
    },

    /// An array index past the end.
    #[error("Index {index} out of bounds for '{parent}' (len {len})")]
    OutOfBounds {
        /// Path of the array searched.
        parent: String,
        /// The requested index.
        index: usize,
        /// Current number of elements.
        len: usize,
    },

    /// A segment tried to descend into a node that has no children of that kind.
    #[error("Cannot resolve '{segment}' under {kind} '{parent}'")]
    NotAContainer {
        /// Path of the node reached so far.
        parent: String,
        /// The segment that could not be applied.
        segment: String,
        /// Kind of node found.
        kind: &'static str,
    },

    /// A composite write whose value does not match the node's shape.
    #[error("Value for '{path}' does not match its shape: expected {expected}, got {actual}")]
    ShapeMismatch {
        /// Path of the node written.
        path: String,
        /// What the node needs.
        expected: String,
        /// What was supplied.
        actual: String,
    },
}

impl PathError {
    /// Creates a new syntax error.
    pub fn syntax(path: impl Into<String>, reason: &'static str) -> Self {
        Self::Syntax {
            path: path.into(),
            reason,
        }
    }

    /// Creates a new shape mismatch error.
    pub fn shape_mismatch(
        path: impl Into<String>,
        expected: impl Into<String>,
        actual: impl Into<String>,
    ) -> Self {
        Self::ShapeMismatch {
            path: path.into(),
            expected: expected.into(),
            actual: actual.into(),
        }
    }
}
