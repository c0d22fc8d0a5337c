//! Rules that switch on and off with another field's value.

use crate::error::PathError;
use crate::path::{IntoPath, Path};
use crate::validation::Rule;
use crate::value::Value;

/// "While `trigger` holds `activation`, `target` also has `rule`."
///
/// The controller keeps no state of its own: every time the trigger changes
/// it looks at the target's current rule list, adds or removes `rule`, and
/// has the form recompute the target. Re-applying the same trigger value
/// changes nothing.
///
/// # Example
///
/// ```
/// use formwork_lib::form::ConditionalRule;
/// use formwork_lib::validation::Rule;
///
/// // phone becomes required when text notifications are chosen
/// let rule = ConditionalRule::new("notification", "text", "phone", Rule::Required).unwrap();
/// assert_eq!(rule.target().to_string(), "phone");
/// ```
#[derive(Debug, Clone)]
pub struct ConditionalRule {
    trigger: Path,
    activation: Value,
    target: Path,
    rule: Rule,
}

impl ConditionalRule {
    /// Creates a conditional rule.
    pub fn new(
        trigger: impl IntoPath,
        activation: impl Into<Value>,
        target: impl IntoPath,
        rule: Rule,
    ) -> Result<Self, PathError> {
        Ok(Self {
            trigger: trigger.into_path()?,
            activation: activation.into(),
            target: target.into_path()?,
            rule,
        })
    }

    /// Path of the node whose value switches the rule.
    pub fn trigger(&self) -> &Path {
        &self.trigger
    }

    /// Trigger value that activates the rule.
    pub fn activation(&self) -> &Value {
        &self.activation
    }

    /// Path of the node that receives the rule.
    pub fn target(&self) -> &Path {
        &self.target
    }

    /// The rule that is attached and detached.
    pub fn rule(&self) -> &Rule {
        &self.rule
    }

    /// Returns `true` if `trigger_value` activates the rule.
    pub fn is_active(&self, trigger_value: &Value) -> bool {
        *trigger_value == self.activation
    }

    /// Brings `rules` in line with `trigger_value`.
    ///
    /// Returns `true` if the list changed and the target needs a recompute.
    pub(crate) fn reconcile(&self, rules: &mut Vec<Rule>, trigger_value: &Value) -> bool {
        let present = rules.contains(&self.rule);
        match (self.is_active(trigger_value), present) {
            (true, false) => {
                rules.push(self.rule.clone());
                true
            }
            (false, true) => {
                rules.retain(|rule| *rule != self.rule);
                true
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn phone_rule() -> ConditionalRule {
        ConditionalRule::new("notification", "text", "phone", Rule::Required).unwrap()
    }

    #[test]
    fn test_attach_when_active() {
        let rule = phone_rule();
        let mut rules = vec![Rule::max_length(20)];
        assert!(rule.reconcile(&mut rules, &Value::from("text")));
        assert_eq!(rules, vec![Rule::max_length(20), Rule::Required]);
    }

    #[test]
    fn test_reapplying_is_a_no_op() {
        let rule = phone_rule();
        let mut rules = Vec::new();
        assert!(rule.reconcile(&mut rules, &Value::from("text")));
        assert!(!rule.reconcile(&mut rules, &Value::from("text")));
        assert_eq!(rules.len(), 1);
    }

    #[test]
    fn test_detach_keeps_other_rules() {
        let rule = phone_rule();
        let mut rules = vec![Rule::Required, Rule::max_length(20)];
        assert!(rule.reconcile(&mut rules, &Value::from("email")));
        assert_eq!(rules, vec![Rule::max_length(20)]);
        assert!(!rule.reconcile(&mut rules, &Value::from("email")));
    }
}
