//! Configuration error types

/// A programming mistake in a form definition.
///
/// These indicate a broken form, never bad user input, and stop the
/// operation that hit them.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    /// A cross-field rule names a child the group does not have.
    #[error("Rule '{rule}' references unknown field '{field}' in group '{group}'")]
    UnknownSibling {
        /// Key of the offending rule.
        rule: String,
        /// Path of the group the rule is attached to.
        group: String,
        /// The missing child name.
        field: String,
    },

    /// A cross-field rule was attached to a node that is not a group.
    #[error("Rule '{rule}' can only be attached to a group, '{path}' is a {kind}")]
    NotAGroup {
        /// Key of the offending rule.
        rule: String,
        /// Path of the node.
        path: String,
        /// Kind of node found instead.
        kind: &'static str,
    },

    /// The addressed node is not an array.
    #[error("Node '{path}' is a {kind}, not an array")]
    NotAnArray {
        /// Path of the node.
        path: String,
        /// Kind of node found instead.
        kind: &'static str,
    },

    /// An array was asked to grow but has no element factory.
    #[error("Array '{0}' has no element factory")]
    NoElementFactory(String),

    /// A pattern rule whose regular expression does not compile.
    #[error("Invalid pattern '{pattern}': {message}")]
    InvalidPattern {
        /// The pattern as given.
        pattern: String,
        /// Compiler message.
        message: String,
    },

    /// A feedback pipeline id that was never registered.
    #[error("Unknown feedback pipeline {0}")]
    UnknownPipeline(String),

    /// A feedback pipeline was registered without a timer runtime.
    #[error("Feedback pipeline for '{0}' must be registered inside a tokio runtime")]
    NoRuntime(String),
}

impl ConfigError {
    /// Creates a new unknown sibling error.
    pub fn unknown_sibling(
        rule: impl Into<String>,
        group: impl Into<String>,
        field: impl Into<String>,
    ) -> Self {
        Self::UnknownSibling {
            rule: rule.into(),
            group: group.into(),
            field: field.into(),
        }
    }
}
