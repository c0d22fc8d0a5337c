use indexmap::IndexMap;

use super::Node;
use crate::validation::{ErrorSet, Rule, ValidationState};

/// Named children plus cross-field rules.
///
/// Children keep insertion order. The group's own [`ErrorSet`] only holds
/// failures of its own rules.
///
/// # Example
///
/// ```
/// use formwork_lib::node::{FieldNode, GroupNode};
/// use formwork_lib::validation::Rule;
///
/// let emails = GroupNode::new()
///     .with_child("email", FieldNode::new("").with_rules([Rule::Required, Rule::Email]))
///     .with_child("confirmEmail", FieldNode::new("").with_rule(Rule::Required))
///     .with_rule(Rule::fields_match("email", "confirmEmail"));
/// assert_eq!(emails.len(), 2);
/// ```
#[derive(Debug, Clone)]
pub struct GroupNode {
    pub(crate) children: IndexMap<String, Node>,
    pub(crate) rules: Vec<Rule>,
    pub(crate) errors: ErrorSet,
    pub(crate) status: ValidationState,
}

impl GroupNode {
    /// Creates an empty group.
    pub fn new() -> Self {
        Self {
            children: IndexMap::new(),
            rules: Vec::new(),
            errors: ErrorSet::new(),
            status: ValidationState::Pending,
        }
    }

    /// Adds a child; a child with the same name is replaced in place.
    pub fn with_child(mut self, name: impl Into<String>, node: impl Into<Node>) -> Self {
        self.children.insert(name.into(), node.into());
        self
    }

    /// Appends a group-level rule.
    pub fn with_rule(mut self, rule: Rule) -> Self {
        self.rules.push(rule);
        self
    }

    /// Get a child by name.
    pub fn child(&self, name: &str) -> Option<&Node> {
        self.children.get(name)
    }

    /// Iterate over children in insertion order.
    pub fn children(&self) -> impl Iterator<Item = (&str, &Node)> {
        self.children.iter().map(|(name, node)| (name.as_str(), node))
    }

    /// Get the group-level rules.
    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// Number of children.
    pub fn len(&self) -> usize {
        self.children.len()
    }

    /// Check if the group has no children.
    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }
}

impl Default for GroupNode {
    fn default() -> Self {
        Self::new()
    }
}
