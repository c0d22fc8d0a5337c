//! Built-in validation rules.

use std::fmt;
use std::sync::Arc;

use email_address::{EmailAddress, Options};
use regex::Regex;

use super::ValidationResult;
use crate::error::ConfigError;
use crate::node::Node;
use crate::path::Path;
use crate::value::Value;

/// Predicate behind a [`Rule::Custom`]; returns `true` when the value passes.
pub type RuleCheck = Arc<dyn Fn(&Value) -> bool + Send + Sync>;

/// A validation rule attached to a node.
///
/// Rules are data: the variant names the rule kind and the fields carry its
/// parameters. Each rule reports failures under a fixed key (see
/// [`Rule::key`]). Length, format and bound rules pass on an empty value;
/// combine them with [`Rule::Required`] when emptiness should fail too.
#[derive(Clone)]
pub enum Rule {
    /// Fails on null, whitespace-only text and empty lists. Key `required`.
    Required,
    /// Fails unless the value is `true`. Key `required`.
    RequiredTrue,
    /// Fails on text shorter than `n` characters. Key `minlength`.
    MinLength(usize),
    /// Fails on text longer than `n` characters. Key `maxlength`.
    MaxLength(usize),
    /// Fails on text that is not an email address. Key `email`.
    Email,
    /// Fails on text that does not fully match the pattern. Key `pattern`.
    Pattern(Regex),
    /// Fails on numbers below the bound. Key `min`.
    Min(f64),
    /// Fails on numbers above the bound. Key `max`.
    Max(f64),
    /// Fails unless the value is a number within `[min, max]`.
    ///
    /// Null and other non-numbers fail as well. Key `range`.
    NumericRange {
        /// Inclusive lower bound.
        min: f64,
        /// Inclusive upper bound.
        max: f64,
    },
    /// Cross-field rule for groups: fails when the two named children hold
    /// different values. Key `match`.
    FieldsMatch {
        /// First child name.
        first: String,
        /// Second child name.
        second: String,
    },
    /// A named user predicate.
    Custom {
        /// Key reported on failure.
        key: String,
        /// Returns `true` when the value passes.
        check: RuleCheck,
    },
}

impl Rule {
    /// Creates a minimum length rule.
    pub fn min_length(min: usize) -> Self {
        Self::MinLength(min)
    }

    /// Creates a maximum length rule.
    pub fn max_length(max: usize) -> Self {
        Self::MaxLength(max)
    }

    /// Creates an inclusive numeric range rule.
    pub fn numeric_range(min: f64, max: f64) -> Self {
        Self::NumericRange { min, max }
    }

    /// Creates a cross-field equality rule.
    pub fn fields_match(first: impl Into<String>, second: impl Into<String>) -> Self {
        Self::FieldsMatch {
            first: first.into(),
            second: second.into(),
        }
    }

    /// Creates a pattern rule; the pattern must match the whole text.
    pub fn pattern(pattern: &str) -> Result<Self, ConfigError> {
        Regex::new(&format!("^(?:{})$", pattern))
            .map(Self::Pattern)
            .map_err(|e| ConfigError::InvalidPattern {
                pattern: pattern.to_string(),
                message: e.to_string(),
            })
    }

    /// Creates a rule from a named predicate.
    pub fn custom<F>(key: impl Into<String>, check: F) -> Self
    where
        F: Fn(&Value) -> bool + Send + Sync + 'static,
    {
        Self::Custom {
            key: key.into(),
            check: Arc::new(check),
        }
    }

    /// The key this rule reports in an error set.
    pub fn key(&self) -> &str {
        match self {
            Self::Required | Self::RequiredTrue => "required",
            Self::MinLength(_) => "minlength",
            Self::MaxLength(_) => "maxlength",
            Self::Email => "email",
            Self::Pattern(_) => "pattern",
            Self::Min(_) => "min",
            Self::Max(_) => "max",
            Self::NumericRange { .. } => "range",
            Self::FieldsMatch { .. } => "match",
            Self::Custom { key, .. } => key,
        }
    }

    /// Returns `true` for rules that only make sense on a group.
    pub fn is_cross_field(&self) -> bool {
        matches!(self, Self::FieldsMatch { .. })
    }

    /// Evaluates the rule against a bare value.
    ///
    /// `FieldsMatch` reads its two entries from a map value; a missing entry
    /// compares as null.
    pub fn check(&self, value: &Value) -> ValidationResult {
        let passed = match self {
            Self::Required => !value.is_empty(),
            Self::RequiredTrue => value.as_bool() == Some(true),
            Self::MinLength(min) => {
                value.is_empty() || value.char_len().is_none_or(|len| len >= *min)
            }
            Self::MaxLength(max) => {
                value.is_empty() || value.char_len().is_none_or(|len| len <= *max)
            }
            Self::Email => {
                value.is_empty()
                    || value.as_str().is_some_and(|s| {
                        EmailAddress::parse_with_options(s, plain_address()).is_ok()
                    })
            }
            Self::Pattern(re) => {
                value.is_empty() || value.as_str().is_some_and(|s| re.is_match(s))
            }
            Self::Min(min) => value.as_number().is_none_or(|n| n >= *min),
            Self::Max(max) => value.as_number().is_none_or(|n| n <= *max),
            Self::NumericRange { min, max } => value
                .as_number()
                .is_some_and(|n| n >= *min && n <= *max),
            Self::FieldsMatch { first, second } => match value {
                Value::Map(map) => map.get(first) == map.get(second),
                _ => true,
            },
            Self::Custom { check, .. } => check(value),
        };

        if passed {
            ValidationResult::Valid
        } else {
            ValidationResult::invalid(self.key())
        }
    }

    /// Evaluates the rule against a node at `path`, reading live values.
    ///
    /// Cross-field rules must sit on a group whose children include both
    /// named fields; anything else is a broken form definition.
    pub fn validate(&self, node: &Node, path: &Path) -> Result<ValidationResult, ConfigError> {
        if let Self::FieldsMatch { first, second } = self {
            let Node::Group(group) = node else {
                return Err(ConfigError::NotAGroup {
                    rule: self.key().to_string(),
                    path: path.to_string(),
                    kind: node.kind(),
                });
            };
            let (Some(a), Some(b)) = (group.child(first), group.child(second)) else {
                let missing = if group.child(first).is_none() {
                    first
                } else {
                    second
                };
                return Err(ConfigError::unknown_sibling(
                    self.key(),
                    path.to_string(),
                    missing.clone(),
                ));
            };
            return Ok(if a.value() == b.value() {
                ValidationResult::Valid
            } else {
                ValidationResult::invalid(self.key())
            });
        }

        Ok(self.check(&node.value()))
    }
}

/// Bare `local@domain` addresses only; no display name.
fn plain_address() -> Options {
    Options::default().without_display_text()
}

impl PartialEq for Rule {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Required, Self::Required) => true,
            (Self::RequiredTrue, Self::RequiredTrue) => true,
            (Self::MinLength(a), Self::MinLength(b)) => a == b,
            (Self::MaxLength(a), Self::MaxLength(b)) => a == b,
            (Self::Email, Self::Email) => true,
            (Self::Pattern(a), Self::Pattern(b)) => a.as_str() == b.as_str(),
            (Self::Min(a), Self::Min(b)) => a == b,
            (Self::Max(a), Self::Max(b)) => a == b,
            (
                Self::NumericRange { min, max },
                Self::NumericRange {
                    min: other_min,
                    max: other_max,
                },
            ) => min == other_min && max == other_max,
            (
                Self::FieldsMatch { first, second },
                Self::FieldsMatch {
                    first: other_first,
                    second: other_second,
                },
            ) => first == other_first && second == other_second,
            (
                Self::Custom { key, check },
                Self::Custom {
                    key: other_key,
                    check: other_check,
                },
            ) => key == other_key && Arc::ptr_eq(check, other_check),
            _ => false,
        }
    }
}

impl fmt::Debug for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Required => write!(f, "Required"),
            Self::RequiredTrue => write!(f, "RequiredTrue"),
            Self::MinLength(n) => write!(f, "MinLength({})", n),
            Self::MaxLength(n) => write!(f, "MaxLength({})", n),
            Self::Email => write!(f, "Email"),
            Self::Pattern(re) => write!(f, "Pattern({:?})", re.as_str()),
            Self::Min(n) => write!(f, "Min({})", n),
            Self::Max(n) => write!(f, "Max({})", n),
            Self::NumericRange { min, max } => write!(f, "NumericRange({}..={})", min, max),
            Self::FieldsMatch { first, second } => {
                write!(f, "FieldsMatch({}, {})", first, second)
            }
            Self::Custom { key, .. } => write!(f, "Custom({})", key),
        }
    }
}

#[cfg(test)]
mod tests {
    use indexmap::IndexMap;

    use super::*;

    fn fails(rule: &Rule, value: impl Into<Value>) -> bool {
        rule.check(&value.into()).is_invalid()
    }

    #[test]
    fn test_required() {
        assert!(fails(&Rule::Required, ""));
        assert!(fails(&Rule::Required, "   "));
        assert!(fails(&Rule::Required, Value::Null));
        assert!(!fails(&Rule::Required, "x"));
        assert!(!fails(&Rule::Required, false));
        assert_eq!(
            Rule::Required.check(&Value::Null).error_key(),
            Some("required")
        );
    }

    #[test]
    fn test_required_true() {
        assert!(fails(&Rule::RequiredTrue, false));
        assert!(fails(&Rule::RequiredTrue, Value::Null));
        assert!(!fails(&Rule::RequiredTrue, true));
    }

    #[test]
    fn test_lengths_count_characters_and_skip_empty() {
        let min = Rule::min_length(3);
        assert!(fails(&min, "ab"));
        assert!(!fails(&min, "äöü"));
        assert!(!fails(&min, ""));

        let max = Rule::max_length(2);
        assert!(fails(&max, "abc"));
        assert!(!fails(&max, "ab"));
        assert!(!fails(&max, Value::Null));
    }

    #[test]
    fn test_email() {
        assert!(!fails(&Rule::Email, "a@b.com"));
        assert!(!fails(&Rule::Email, ""));
        assert!(fails(&Rule::Email, "not-an-email"));
        assert!(fails(&Rule::Email, 42));
        assert!(fails(&Rule::Email, "Ada <a@b.com>"));
        assert!(fails(&Rule::Email, " a@b.com "));
    }

    #[test]
    fn test_pattern_matches_whole_text() {
        let zip = Rule::pattern(r"\d{5}").unwrap();
        assert!(!fails(&zip, "12345"));
        assert!(fails(&zip, "123456"));
        assert!(fails(&zip, "a12345"));
        assert!(!fails(&zip, ""));
        assert!(matches!(
            Rule::pattern("("),
            Err(ConfigError::InvalidPattern { .. })
        ));
    }

    #[test]
    fn test_numeric_range_fails_on_null() {
        let range = Rule::numeric_range(0.0, 5.0);
        assert!(fails(&range, 7));
        assert!(fails(&range, -1));
        assert!(fails(&range, Value::Null));
        assert!(fails(&range, "abc"));
        assert!(!fails(&range, 0));
        assert!(!fails(&range, 5));
        assert!(!fails(&range, "3"));
    }

    #[test]
    fn test_min_max_exempt_non_numbers() {
        assert!(fails(&Rule::Min(1.0), 0));
        assert!(!fails(&Rule::Min(1.0), Value::Null));
        assert!(fails(&Rule::Max(1.0), 2));
        assert!(!fails(&Rule::Max(1.0), ""));
    }

    #[test]
    fn test_fields_match_on_map_value() {
        let rule = Rule::fields_match("a", "b");
        let mut map = IndexMap::new();
        map.insert("a".to_string(), Value::from("x"));
        map.insert("b".to_string(), Value::from("x"));
        assert!(!fails(&rule, Value::Map(map.clone())));
        map.insert("b".to_string(), Value::from("y"));
        assert!(fails(&rule, Value::Map(map)));
    }

    #[test]
    fn test_custom_rule() {
        let even = Rule::custom("even", |v| v.as_number().is_some_and(|n| n % 2.0 == 0.0));
        assert_eq!(even.key(), "even");
        assert!(fails(&even, 3));
        assert!(!fails(&even, 4));
        assert_eq!(even.clone(), even);
        assert_ne!(even, Rule::custom("even", |_| true));
    }

    #[test]
    fn test_rule_equality_by_parameters() {
        assert_eq!(Rule::min_length(3), Rule::min_length(3));
        assert_ne!(Rule::min_length(3), Rule::min_length(4));
        assert_ne!(Rule::Required, Rule::RequiredTrue);
        assert_eq!(Rule::pattern("a+").unwrap(), Rule::pattern("a+").unwrap());
    }
}
