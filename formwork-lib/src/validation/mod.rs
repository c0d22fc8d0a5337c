//! Validation rules and the state they produce.
//!
//! Rules are plain data ([`Rule`]) attached to nodes in declaration order.
//! Evaluating every rule of a node yields its [`ErrorSet`]; the set together
//! with the node's children determines its [`ValidationState`].
//!
//! # Example
//!
//! ```
//! use formwork_lib::validation::{Rule, ValidationResult};
//! use formwork_lib::Value;
//!
//! let rule = Rule::min_length(3);
//! assert_eq!(rule.check(&Value::from("ab")), ValidationResult::invalid("minlength"));
//! assert!(rule.check(&Value::from("abc")).is_valid());
//! ```

mod errors;
mod result;
mod rule;
mod state;

pub use errors::ErrorSet;
pub use result::ValidationResult;
pub use rule::{Rule, RuleCheck};
pub use state::{InteractionState, ValidationState};
