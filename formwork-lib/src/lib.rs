//! Dynamic form validation engine
//!
//! A form is a tree of fields, groups and arrays. Rules attached to nodes
//! produce error sets, validity bubbles up to the root after every write,
//! conditional rules switch other rules on and off, and debounced feedback
//! pipelines turn errors into a single user-facing message.

pub mod customer;
pub mod error;
pub mod form;
pub mod node;
pub mod path;
pub mod validation;

mod value;

pub use error::{ConfigError, FormError, FormResult, PathError};
pub use form::{FormModel, Submission};
pub use path::Path;
pub use value::Value;
