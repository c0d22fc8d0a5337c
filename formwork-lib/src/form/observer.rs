//! Value-change notifications and subscription handles.

use std::fmt;
use std::sync::{Arc, RwLock, Weak};

use super::conditional::ConditionalRule;
use super::feedback::PipelineId;
use super::FormState;
use crate::path::Path;
use crate::validation::ValidationState;
use crate::value::Value;

/// Callback invoked for every value change of a node.
pub type ValueCallback = Arc<dyn Fn(&ValueChange) + Send + Sync>;

/// Callback invoked for every message a feedback pipeline publishes.
pub type MessageCallback = Arc<dyn Fn(&str) + Send + Sync>;

/// A node's value was written.
#[derive(Debug, Clone, PartialEq)]
pub struct ValueChange {
    /// Path of the written node.
    pub path: Path,
    /// The node's value after the write.
    pub value: Value,
    /// The node's validity after propagation.
    pub status: ValidationState,
}

/// Identifies one registration on a form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(pub(crate) u64);

impl fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "__subscription_{}", self.0)
    }
}

/// What reacts to a node's value changes.
///
/// Observers of one node run in registration order within the write that
/// triggered them.
#[derive(Clone)]
pub(crate) enum Observer {
    /// An external callback.
    Callback(ValueCallback),
    /// Attaches or detaches a rule on another node.
    Conditional(ConditionalRule),
    /// Restarts a feedback pipeline's debounce window.
    Feedback(PipelineId),
}

impl fmt::Debug for Observer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Observer::Callback(_) => write!(f, "Callback"),
            Observer::Conditional(rule) => write!(f, "Conditional({:?})", rule),
            Observer::Feedback(id) => write!(f, "Feedback({})", id),
        }
    }
}

#[derive(Debug, Clone)]
pub(crate) struct ObserverEntry {
    pub id: SubscriptionId,
    pub path: Path,
    pub observer: Observer,
}

/// Handle returned by every registration.
///
/// Dropping the handle keeps the registration alive; call
/// [`Subscription::unsubscribe`] to remove it.
#[derive(Debug)]
#[must_use = "keep the handle to be able to unsubscribe"]
pub struct Subscription {
    id: SubscriptionId,
    form: Weak<RwLock<FormState>>,
}

impl Subscription {
    pub(crate) fn new(id: SubscriptionId, form: Weak<RwLock<FormState>>) -> Self {
        Self { id, form }
    }

    /// Get the registration id.
    pub fn id(&self) -> SubscriptionId {
        self.id
    }

    /// Removes the registration.
    ///
    /// Returns `false` if it was already gone or the form was dropped.
    pub fn unsubscribe(self) -> bool {
        let Some(form) = self.form.upgrade() else {
            return false;
        };
        let mut state = form.write().unwrap_or_else(|poisoned| poisoned.into_inner());
        state.remove_subscription(self.id)
    }
}
