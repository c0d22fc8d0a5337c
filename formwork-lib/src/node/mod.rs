//! The form tree.
//!
//! A form is a tree of [`Node`]s: [`FieldNode`] leaves hold values,
//! [`GroupNode`]s map names to children and [`ArrayNode`]s hold an ordered,
//! resizable list of structurally identical elements. Every node carries its
//! own rules and the [`ErrorSet`] they produced; a composite's
//! [`ValidationState`] folds its own verdict with its children's states.
//!
//! Nodes are plain owned data. Mutation and notification are orchestrated by
//! [`FormModel`](crate::form::FormModel), which recomputes validity from the
//! changed node up to the root after every write.

mod array;
mod field;
mod group;

pub use array::{ArrayNode, ElementFactory};
pub use field::FieldNode;
pub use group::GroupNode;

use indexmap::IndexMap;

use crate::error::{ConfigError, FormResult, PathError};
use crate::path::{Path, Segment};
use crate::validation::{ErrorSet, InteractionState, Rule, ValidationResult, ValidationState};
use crate::value::Value;

/// Any addressable unit in the form tree.
#[derive(Debug, Clone)]
pub enum Node {
    /// A leaf holding one value.
    Field(FieldNode),
    /// Named children with cross-field rules.
    Group(GroupNode),
    /// Repeated sub-sections.
    Array(ArrayNode),
}

impl Node {
    /// Returns the node kind as a lowercase name.
    pub fn kind(&self) -> &'static str {
        match self {
            Node::Field(_) => "field",
            Node::Group(_) => "group",
            Node::Array(_) => "array",
        }
    }

    /// Returns the current value; composites assemble theirs from children.
    pub fn value(&self) -> Value {
        match self {
            Node::Field(field) => field.value().clone(),
            Node::Group(group) => Value::Map(
                group
                    .children()
                    .map(|(name, child)| (name.to_string(), child.value()))
                    .collect::<IndexMap<_, _>>(),
            ),
            Node::Array(array) => Value::List(array.elements().iter().map(Node::value).collect()),
        }
    }

    /// Returns the rules attached directly to this node.
    pub fn rules(&self) -> &[Rule] {
        match self {
            Node::Field(field) => field.rules(),
            Node::Group(group) => group.rules(),
            Node::Array(array) => array.rules(),
        }
    }

    /// Returns the failures of this node's own rules.
    ///
    /// Failures of children are not copied up; query the child instead.
    pub fn errors(&self) -> &ErrorSet {
        match self {
            Node::Field(field) => &field.errors,
            Node::Group(group) => &group.errors,
            Node::Array(array) => &array.errors,
        }
    }

    /// Returns the last computed validity.
    pub fn status(&self) -> ValidationState {
        match self {
            Node::Field(field) => field.status,
            Node::Group(group) => group.status,
            Node::Array(array) => array.status,
        }
    }

    /// Returns the interaction flags; composites merge their descendants'.
    pub fn interaction(&self) -> InteractionState {
        match self {
            Node::Field(field) => field.interaction,
            Node::Group(group) => group
                .children()
                .map(|(_, child)| child.interaction())
                .fold(InteractionState::default(), InteractionState::merge),
            Node::Array(array) => array
                .elements()
                .iter()
                .map(Node::interaction)
                .fold(InteractionState::default(), InteractionState::merge),
        }
    }

    /// Returns the group if this node is one.
    pub fn as_group(&self) -> Option<&GroupNode> {
        match self {
            Node::Group(group) => Some(group),
            _ => None,
        }
    }

    /// Returns the array if this node is one.
    pub fn as_array(&self) -> Option<&ArrayNode> {
        match self {
            Node::Array(array) => Some(array),
            _ => None,
        }
    }

    pub(crate) fn as_array_mut(&mut self) -> Option<&mut ArrayNode> {
        match self {
            Node::Array(array) => Some(array),
            _ => None,
        }
    }

    /// Replaces the rule list. Validity is stale until the next recompute.
    pub(crate) fn set_rules(&mut self, rules: Vec<Rule>) {
        match self {
            Node::Field(field) => field.rules = rules,
            Node::Group(group) => group.rules = rules,
            Node::Array(array) => array.rules = rules,
        }
    }

    // -------------------------------------------------------------------------
    // Path resolution
    // -------------------------------------------------------------------------

    /// Resolves a path relative to this node.
    pub fn resolve(&self, path: &Path) -> Result<&Node, PathError> {
        let mut node = self;
        for (depth, segment) in path.segments().iter().enumerate() {
            node = node.step(segment, &path.prefix(depth))?;
        }
        Ok(node)
    }

    /// Resolves a path relative to this node for mutation.
    pub fn resolve_mut(&mut self, path: &Path) -> Result<&mut Node, PathError> {
        let mut node = self;
        for (depth, segment) in path.segments().iter().enumerate() {
            node = node.step_mut(segment, &path.prefix(depth))?;
        }
        Ok(node)
    }

    fn step(&self, segment: &Segment, parent: &Path) -> Result<&Node, PathError> {
        match (self, segment) {
            (Node::Group(group), Segment::Key(name)) => group
                .child(name)
                .ok_or_else(|| missing_child(parent, name)),
            (Node::Group(group), Segment::Index(index)) => {
                let name = index.to_string();
                group
                    .child(&name)
                    .ok_or_else(|| missing_child(parent, &name))
            }
            (Node::Array(array), Segment::Index(index)) => array
                .elements()
                .get(*index)
                .ok_or_else(|| out_of_bounds(parent, *index, array.len())),
            _ => Err(not_a_container(parent, segment, self.kind())),
        }
    }

    fn step_mut(&mut self, segment: &Segment, parent: &Path) -> Result<&mut Node, PathError> {
        let kind = self.kind();
        match (self, segment) {
            (Node::Group(group), Segment::Key(name)) => group
                .children
                .get_mut(name)
                .ok_or_else(|| missing_child(parent, name)),
            (Node::Group(group), Segment::Index(index)) => {
                let name = index.to_string();
                group
                    .children
                    .get_mut(&name)
                    .ok_or_else(|| missing_child(parent, &name))
            }
            (Node::Array(array), Segment::Index(index)) => {
                let len = array.len();
                array
                    .elements
                    .get_mut(*index)
                    .ok_or_else(|| out_of_bounds(parent, *index, len))
            }
            _ => Err(not_a_container(parent, segment, kind)),
        }
    }

    // -------------------------------------------------------------------------
    // Validity
    // -------------------------------------------------------------------------

    /// Re-runs this node's own rules and folds in its children's current
    /// states. Children are not re-evaluated.
    pub(crate) fn recompute_self(&mut self, path: &Path) -> Result<ValidationState, ConfigError> {
        if let Node::Array(array) = self
            && array.unbuilt > 0
        {
            return Err(ConfigError::NoElementFactory(path.to_string()));
        }

        let mut errors = ErrorSet::new();
        for rule in self.rules() {
            if let ValidationResult::Invalid(key) = rule.validate(self, path)? {
                errors.insert(key);
            }
        }

        let own = if errors.is_empty() {
            ValidationState::Valid
        } else {
            ValidationState::Invalid
        };
        let status = match &*self {
            Node::Field(_) => own,
            Node::Group(group) => group
                .children()
                .fold(own, |acc, (_, child)| acc.combine(child.status())),
            Node::Array(array) => array
                .elements()
                .iter()
                .fold(own, |acc, element| acc.combine(element.status())),
        };

        log::trace!("recomputed '{}': {:?} {:?}", path, status, errors);
        match self {
            Node::Field(field) => {
                field.errors = errors;
                field.status = status;
            }
            Node::Group(group) => {
                group.errors = errors;
                group.status = status;
            }
            Node::Array(array) => {
                array.errors = errors;
                array.status = status;
            }
        }
        Ok(status)
    }

    /// Re-evaluates every node in this subtree, leaves first.
    pub(crate) fn recompute_subtree(&mut self, path: &Path) -> Result<ValidationState, ConfigError> {
        match self {
            Node::Field(_) => {}
            Node::Group(group) => {
                for (name, child) in group.children.iter_mut() {
                    child.recompute_subtree(&path.key(name.as_str()))?;
                }
            }
            Node::Array(array) => {
                for (index, element) in array.elements.iter_mut().enumerate() {
                    element.recompute_subtree(&path.index(index))?;
                }
            }
        }
        self.recompute_self(path)
    }

    /// Re-evaluates the subtree at `path`, then every ancestor up to this
    /// node, so the root reflects the change.
    pub(crate) fn refresh(&mut self, path: &Path) -> FormResult<ValidationState> {
        self.resolve_mut(path)?.recompute_subtree(path)?;
        for depth in (0..path.segments().len()).rev() {
            let ancestor = path.prefix(depth);
            self.resolve_mut(&ancestor)?.recompute_self(&ancestor)?;
        }
        Ok(self.status())
    }

    // -------------------------------------------------------------------------
    // Writes
    // -------------------------------------------------------------------------

    /// Writes a value into this subtree, marking every written field dirty.
    ///
    /// Composites take a map (groups) or list (arrays) whose shape matches
    /// their children exactly. The whole value is checked before anything is
    /// written. Paths of written fields are appended to `written`.
    pub(crate) fn write(
        &mut self,
        value: Value,
        path: &Path,
        written: &mut Vec<Path>,
    ) -> Result<(), PathError> {
        self.check_shape(&value, path)?;
        self.apply_write(value, path, written);
        Ok(())
    }

    fn check_shape(&self, value: &Value, path: &Path) -> Result<(), PathError> {
        match (self, value) {
            (Node::Field(_), _) => Ok(()),
            (Node::Group(group), Value::Map(map)) => {
                let expected: Vec<&str> = group.children().map(|(name, _)| name).collect();
                let same_keys = map.len() == expected.len()
                    && expected.iter().all(|name| map.contains_key(*name));
                if !same_keys {
                    return Err(PathError::shape_mismatch(
                        path.to_string(),
                        format!("keys [{}]", expected.join(", ")),
                        format!(
                            "keys [{}]",
                            map.keys().map(String::as_str).collect::<Vec<_>>().join(", ")
                        ),
                    ));
                }
                for (name, child) in group.children() {
                    child.check_shape(&map[name], &path.key(name))?;
                }
                Ok(())
            }
            (Node::Array(array), Value::List(items)) => {
                if items.len() != array.len() {
                    return Err(PathError::shape_mismatch(
                        path.to_string(),
                        format!("list of {}", array.len()),
                        format!("list of {}", items.len()),
                    ));
                }
                for (index, (element, item)) in array.elements().iter().zip(items).enumerate() {
                    element.check_shape(item, &path.index(index))?;
                }
                Ok(())
            }
            (Node::Group(_), other) => Err(PathError::shape_mismatch(
                path.to_string(),
                "map",
                other.type_name(),
            )),
            (Node::Array(_), other) => Err(PathError::shape_mismatch(
                path.to_string(),
                "list",
                other.type_name(),
            )),
        }
    }

    fn apply_write(&mut self, value: Value, path: &Path, written: &mut Vec<Path>) {
        match (self, value) {
            (Node::Field(field), value) => {
                field.write(value);
                written.push(path.clone());
            }
            (Node::Group(group), Value::Map(mut map)) => {
                for (name, child) in group.children.iter_mut() {
                    let value = map.shift_remove(name).unwrap_or_default();
                    child.apply_write(value, &path.key(name.as_str()), written);
                }
            }
            (Node::Array(array), Value::List(items)) => {
                for (index, (element, item)) in array.elements.iter_mut().zip(items).enumerate() {
                    element.apply_write(item, &path.index(index), written);
                }
            }
            // check_shape rejected every other combination
            (node, value) => {
                log::error!(
                    "skipping write of {} into {} '{}'",
                    value.type_name(),
                    node.kind(),
                    path
                );
            }
        }
    }

    /// Marks every field in this subtree as touched.
    pub(crate) fn mark_touched(&mut self) {
        match self {
            Node::Field(field) => field.interaction.touched = true,
            Node::Group(group) => group.children.values_mut().for_each(Node::mark_touched),
            Node::Array(array) => array.elements.iter_mut().for_each(Node::mark_touched),
        }
    }

    /// Restores every field in this subtree to its initial value and clears
    /// its interaction flags. Paths of reset fields are appended to `written`.
    pub(crate) fn reset(&mut self, path: &Path, written: &mut Vec<Path>) {
        match self {
            Node::Field(field) => {
                field.reset();
                written.push(path.clone());
            }
            Node::Group(group) => {
                for (name, child) in group.children.iter_mut() {
                    child.reset(&path.key(name.as_str()), written);
                }
            }
            Node::Array(array) => {
                for (index, element) in array.elements.iter_mut().enumerate() {
                    element.reset(&path.index(index), written);
                }
            }
        }
    }
}

fn missing_child(parent: &Path, name: &str) -> PathError {
    PathError::MissingChild {
        parent: parent.to_string(),
        name: name.to_string(),
    }
}

fn out_of_bounds(parent: &Path, index: usize, len: usize) -> PathError {
    PathError::OutOfBounds {
        parent: parent.to_string(),
        index,
        len,
    }
}

fn not_a_container(parent: &Path, segment: &Segment, kind: &'static str) -> PathError {
    PathError::NotAContainer {
        parent: parent.to_string(),
        segment: segment.to_string(),
        kind,
    }
}

impl From<FieldNode> for Node {
    fn from(field: FieldNode) -> Self {
        Node::Field(field)
    }
}

impl From<GroupNode> for Node {
    fn from(group: GroupNode) -> Self {
        Node::Group(group)
    }
}

impl From<ArrayNode> for Node {
    fn from(array: ArrayNode) -> Self {
        Node::Array(array)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn address() -> GroupNode {
        GroupNode::new()
            .with_child("street", FieldNode::new("").with_rule(Rule::Required))
            .with_child("city", FieldNode::new("Ghent"))
    }

    fn tree() -> Node {
        Node::Group(
            GroupNode::new()
                .with_child("name", FieldNode::new("Ada").with_rule(Rule::min_length(3)))
                .with_child(
                    "pair",
                    GroupNode::new()
                        .with_child("a", FieldNode::new("x"))
                        .with_child("b", FieldNode::new("x"))
                        .with_rule(Rule::fields_match("a", "b")),
                )
                .with_child(
                    "addresses",
                    ArrayNode::with_factory(|| address().into()).with_len(1),
                ),
        )
    }

    #[test]
    fn test_fresh_nodes_are_pending() {
        let root = tree();
        assert_eq!(root.status(), ValidationState::Pending);
        let name = root.resolve(&Path::parse("name").unwrap()).unwrap();
        assert_eq!(name.status(), ValidationState::Pending);
    }

    #[test]
    fn test_recompute_subtree_folds_children() {
        let mut root = tree();
        let status = root.recompute_subtree(&Path::root()).unwrap();
        assert_eq!(status, ValidationState::Invalid);
        assert!(root.errors().is_empty());

        let street = root.resolve(&Path::parse("addresses.0.street").unwrap()).unwrap();
        assert!(street.errors().contains("required"));
        let pair = root.resolve(&Path::parse("pair").unwrap()).unwrap();
        assert_eq!(pair.status(), ValidationState::Valid);
        assert_eq!(pair.as_group().map(GroupNode::len), Some(2));
        assert!(pair.as_array().is_none());

        let addresses = root.resolve(&Path::parse("addresses").unwrap()).unwrap();
        assert!(addresses.as_array().is_some_and(ArrayNode::has_factory));
        assert!(addresses.as_group().is_none());
    }

    #[test]
    fn test_write_and_refresh_bubbles_to_root() {
        let mut root = tree();
        root.recompute_subtree(&Path::root()).unwrap();

        let street = Path::parse("addresses.0.street").unwrap();
        let mut written = Vec::new();
        root.resolve_mut(&street)
            .unwrap()
            .write(Value::from("Main St"), &street, &mut written)
            .unwrap();
        assert_eq!(written, vec![street.clone()]);
        assert_eq!(root.refresh(&street).unwrap(), ValidationState::Valid);
        assert!(root.resolve(&street).unwrap().interaction().dirty);
        assert!(root.interaction().dirty);
    }

    #[test]
    fn test_group_write_checks_shape_first() {
        let mut root = tree();
        let pair = Path::parse("pair").unwrap();
        let mut bad = IndexMap::new();
        bad.insert("a".to_string(), Value::from("y"));
        let mut written = Vec::new();
        let err = root
            .resolve_mut(&pair)
            .unwrap()
            .write(Value::Map(bad), &pair, &mut written)
            .unwrap_err();
        assert!(matches!(err, PathError::ShapeMismatch { .. }));
        assert!(written.is_empty());
        assert_eq!(
            root.resolve(&Path::parse("pair.a").unwrap()).unwrap().value(),
            Value::from("x")
        );
    }

    #[test]
    fn test_resolution_errors() {
        let root = tree();
        assert!(matches!(
            root.resolve(&Path::parse("nope").unwrap()),
            Err(PathError::MissingChild { .. })
        ));
        assert!(matches!(
            root.resolve(&Path::parse("addresses.3").unwrap()),
            Err(PathError::OutOfBounds { index: 3, len: 1, .. })
        ));
        assert!(matches!(
            root.resolve(&Path::parse("name.first").unwrap()),
            Err(PathError::NotAContainer { kind: "field", .. })
        ));
    }

    #[test]
    fn test_unknown_sibling_is_config_error() {
        let mut root = Node::Group(
            GroupNode::new()
                .with_child("a", FieldNode::new(""))
                .with_rule(Rule::fields_match("a", "missing")),
        );
        let err = root.recompute_subtree(&Path::root()).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::UnknownSibling { ref field, .. } if field == "missing"
        ));
    }

    #[test]
    fn test_length_without_factory_is_config_error() {
        let mut root = Node::Group(
            GroupNode::new().with_child("items", ArrayNode::new().with_len(3)),
        );
        let err = root.recompute_subtree(&Path::root()).unwrap_err();
        assert_eq!(err, ConfigError::NoElementFactory("items".to_string()));
    }

    #[test]
    fn test_reset_restores_initial_values() {
        let mut root = tree();
        let name = Path::parse("name").unwrap();
        let mut written = Vec::new();
        root.resolve_mut(&name)
            .unwrap()
            .write(Value::from("Bo"), &name, &mut written)
            .unwrap();
        root.mark_touched();
        let mut reset = Vec::new();
        root.reset(&Path::root(), &mut reset);
        assert_eq!(reset.len(), 5);
        let node = root.resolve(&name).unwrap();
        assert_eq!(node.value(), Value::from("Ada"));
        assert_eq!(node.interaction(), InteractionState::default());
        let Node::Field(field) = node else {
            panic!("name should be a field");
        };
        assert_eq!(field.initial(), field.value());
    }
}
