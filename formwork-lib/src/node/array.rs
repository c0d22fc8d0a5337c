use std::fmt;
use std::sync::Arc;

use super::Node;
use crate::validation::{ErrorSet, Rule, ValidationState};

/// Builds one new array element with its default values and rules.
pub type ElementFactory = Arc<dyn Fn() -> Node + Send + Sync>;

/// An ordered, resizable sequence of structurally identical elements.
///
/// Elements are addressed by position; removing one shifts the indices of
/// everything after it.
#[derive(Clone)]
pub struct ArrayNode {
    pub(crate) elements: Vec<Node>,
    factory: Option<ElementFactory>,
    /// Elements requested through `with_len` that no factory could build.
    pub(crate) unbuilt: usize,
    pub(crate) rules: Vec<Rule>,
    pub(crate) errors: ErrorSet,
    pub(crate) status: ValidationState,
}

impl ArrayNode {
    /// Creates an empty array without a factory; it cannot grow on demand.
    pub fn new() -> Self {
        Self {
            elements: Vec::new(),
            factory: None,
            unbuilt: 0,
            rules: Vec::new(),
            errors: ErrorSet::new(),
            status: ValidationState::Pending,
        }
    }

    /// Creates an empty array that builds new elements with `factory`.
    pub fn with_factory<F>(factory: F) -> Self
    where
        F: Fn() -> Node + Send + Sync + 'static,
    {
        Self {
            factory: Some(Arc::new(factory)),
            ..Self::new()
        }
    }

    /// Appends `len` factory-built elements.
    ///
    /// Without a factory the request is kept and reported as
    /// [`ConfigError::NoElementFactory`](crate::ConfigError::NoElementFactory)
    /// when the form is built.
    pub fn with_len(mut self, len: usize) -> Self {
        match self.factory.clone() {
            Some(factory) => self.elements.extend((0..len).map(|_| factory())),
            None => self.unbuilt += len,
        }
        self
    }

    /// Appends an explicit element.
    pub fn with_element(mut self, element: impl Into<Node>) -> Self {
        self.elements.push(element.into());
        self
    }

    /// Appends an array-level rule, evaluated against the list value.
    pub fn with_rule(mut self, rule: Rule) -> Self {
        self.rules.push(rule);
        self
    }

    /// Get the elements in order.
    pub fn elements(&self) -> &[Node] {
        &self.elements
    }

    /// Get the array-level rules.
    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// Check if new elements can be built on demand.
    pub fn has_factory(&self) -> bool {
        self.factory.is_some()
    }

    /// Number of elements.
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    /// Check if the array has no elements.
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Builds and appends one element, returning its index.
    ///
    /// Returns `None` when there is no factory.
    pub(crate) fn push_from_factory(&mut self) -> Option<usize> {
        let factory = self.factory.as_ref()?;
        self.elements.push(factory());
        Some(self.elements.len() - 1)
    }

    /// Removes the element at `index`.
    pub(crate) fn remove(&mut self, index: usize) -> Option<Node> {
        (index < self.elements.len()).then(|| self.elements.remove(index))
    }
}

impl Default for ArrayNode {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ArrayNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ArrayNode")
            .field("elements", &self.elements)
            .field("factory", &self.factory.as_ref().map(|_| "<fn>"))
            .field("unbuilt", &self.unbuilt)
            .field("rules", &self.rules)
            .field("errors", &self.errors)
            .field("status", &self.status)
            .finish()
    }
}
