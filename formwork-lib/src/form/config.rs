//! Form configuration

use std::time::Duration;

use indexmap::IndexMap;

use crate::node::Node;

/// Configuration shared by every part of one form.
///
/// # Example
///
/// ```
/// use std::time::Duration;
/// use formwork_lib::form::FormConfig;
///
/// let config = FormConfig::default().with_debounce(Duration::from_millis(250));
/// assert_eq!(config.debounce, Duration::from_millis(250));
/// ```
#[derive(Debug, Clone)]
pub struct FormConfig {
    /// Quiescence window of feedback pipelines.
    ///
    /// Default: 1 second
    pub debounce: Duration,
}

impl Default for FormConfig {
    fn default() -> Self {
        Self {
            debounce: Duration::from_millis(1000),
        }
    }
}

impl FormConfig {
    /// Creates a new form config with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the feedback debounce window.
    pub fn with_debounce(mut self, debounce: Duration) -> Self {
        self.debounce = debounce;
        self
    }
}

/// Human-readable messages per rule key.
///
/// [`MessageCatalog::default`] carries English text for every built-in
/// rule; [`MessageCatalog::new`] starts empty so a form can list exactly the
/// messages it wants.
#[derive(Debug, Clone)]
pub struct MessageCatalog {
    messages: IndexMap<String, String>,
    fallback: String,
}

impl Default for MessageCatalog {
    fn default() -> Self {
        Self::new()
            .with_message("required", "This field is required.")
            .with_message("minlength", "This value is too short.")
            .with_message("maxlength", "This value is too long.")
            .with_message("email", "Please enter a valid email address.")
            .with_message("pattern", "This value has the wrong format.")
            .with_message("min", "This value is too small.")
            .with_message("max", "This value is too large.")
            .with_message("range", "This value is out of range.")
            .with_message("match", "The values do not match.")
    }
}

impl MessageCatalog {
    /// Creates an empty catalog.
    pub fn new() -> Self {
        Self {
            messages: IndexMap::new(),
            fallback: "Please check this field.".to_string(),
        }
    }

    /// Sets the message for a rule key.
    pub fn with_message(mut self, key: impl Into<String>, message: impl Into<String>) -> Self {
        self.messages.insert(key.into(), message.into());
        self
    }

    /// Sets the message used for keys without an entry.
    pub fn with_fallback(mut self, message: impl Into<String>) -> Self {
        self.fallback = message.into();
        self
    }

    /// Looks up the message for a rule key.
    pub fn message(&self, key: &str) -> &str {
        self.messages
            .get(key)
            .map(String::as_str)
            .unwrap_or(&self.fallback)
    }

    /// Derives the message a node should display right now.
    ///
    /// Empty until the user has changed or visited the node, and empty while
    /// it has no errors. With several failures the earliest declared rule
    /// wins.
    pub fn message_for(&self, node: &Node) -> String {
        if !node.interaction().is_interacted() {
            return String::new();
        }
        node.errors()
            .first()
            .map(|key| self.message(key).to_string())
            .unwrap_or_default()
    }
}
