use crate::validation::{ErrorSet, InteractionState, Rule, ValidationState};
use crate::value::Value;

/// A leaf node holding one value.
///
/// # Example
///
/// ```
/// use formwork_lib::node::FieldNode;
/// use formwork_lib::validation::Rule;
///
/// let first_name = FieldNode::new("").with_rules([Rule::Required, Rule::min_length(3)]);
/// assert_eq!(first_name.rules().len(), 2);
/// ```
#[derive(Debug, Clone)]
pub struct FieldNode {
    value: Value,
    /// Value restored by a reset.
    initial: Value,
    pub(crate) rules: Vec<Rule>,
    pub(crate) errors: ErrorSet,
    pub(crate) interaction: InteractionState,
    pub(crate) status: ValidationState,
}

impl FieldNode {
    /// Creates a field with an initial value and no rules.
    pub fn new(value: impl Into<Value>) -> Self {
        let value = value.into();
        Self {
            initial: value.clone(),
            value,
            rules: Vec::new(),
            errors: ErrorSet::new(),
            interaction: InteractionState::default(),
            status: ValidationState::Pending,
        }
    }

    /// Appends a rule.
    pub fn with_rule(mut self, rule: Rule) -> Self {
        self.rules.push(rule);
        self
    }

    /// Appends several rules in order.
    pub fn with_rules(mut self, rules: impl IntoIterator<Item = Rule>) -> Self {
        self.rules.extend(rules);
        self
    }

    /// Get the current value.
    pub fn value(&self) -> &Value {
        &self.value
    }

    /// Get the value a reset restores.
    pub fn initial(&self) -> &Value {
        &self.initial
    }

    /// Get the attached rules in declaration order.
    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub(crate) fn write(&mut self, value: Value) {
        self.value = value;
        self.interaction.dirty = true;
    }

    pub(crate) fn reset(&mut self) {
        self.value = self.initial.clone();
        self.interaction = InteractionState::default();
    }
}

impl Default for FieldNode {
    fn default() -> Self {
        Self::new(Value::Null)
    }
}
