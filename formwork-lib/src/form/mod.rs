//! The form model: one root group plus the wiring around it.
//!
//! [`FormModel`] is the only way to touch a form. It is a cheap-to-clone
//! handle over shared state; every operation takes the lock, mutates the
//! tree, recomputes validity from the changed node up to the root, releases
//! the lock and only then notifies observers. Observers may therefore call
//! back into the form.
//!
//! # Example
//!
//! ```
//! use formwork_lib::form::FormModel;
//! use formwork_lib::node::{FieldNode, GroupNode};
//! use formwork_lib::validation::{Rule, ValidationState};
//!
//! let form = FormModel::new(
//!     GroupNode::new().with_child("name", FieldNode::new("").with_rule(Rule::Required)),
//! )
//! .unwrap();
//! assert_eq!(form.validation_state("").unwrap(), ValidationState::Invalid);
//!
//! form.set_value("name", "Ada").unwrap();
//! assert!(form.submit().is_valid());
//! ```

mod conditional;
mod config;
mod feedback;
mod observer;

pub use conditional::ConditionalRule;
pub use config::{FormConfig, MessageCatalog};
pub use feedback::PipelineId;
pub use observer::{MessageCallback, Subscription, SubscriptionId, ValueCallback, ValueChange};

use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use serde::Serialize;

use self::feedback::FeedbackPipeline;
use self::observer::{Observer, ObserverEntry};
use crate::error::{ConfigError, FormResult, PathError};
use crate::node::{GroupNode, Node};
use crate::path::{IntoPath, Path};
use crate::validation::{ErrorSet, InteractionState, Rule, ValidationState};
use crate::value::Value;

/// Result of [`FormModel::submit`]: validity plus the full value tree.
///
/// Submitting performs no I/O; sending the value anywhere is up to the caller.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Submission {
    /// Validity of the root group.
    pub status: ValidationState,
    /// Value of the root group.
    pub value: Value,
}

impl Submission {
    /// Check if the whole form is valid.
    pub fn is_valid(&self) -> bool {
        self.status.is_valid()
    }

    /// Serialises the submission as JSON.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

pub(crate) struct FormState {
    root: Node,
    config: FormConfig,
    observers: Vec<ObserverEntry>,
    pipelines: HashMap<PipelineId, FeedbackPipeline>,
    last_id: u64,
}

impl FormState {
    fn next_id(&mut self) -> u64 {
        self.last_id += 1;
        self.last_id
    }

    fn add_observer(&mut self, path: Path, observer: Observer) -> SubscriptionId {
        let id = SubscriptionId(self.next_id());
        self.observers.push(ObserverEntry { id, path, observer });
        id
    }

    fn observers_of(&self, path: &Path) -> Vec<Observer> {
        self.observers
            .iter()
            .filter(|entry| entry.path == *path)
            .map(|entry| entry.observer.clone())
            .collect()
    }

    pub(crate) fn remove_subscription(&mut self, id: SubscriptionId) -> bool {
        let before = self.observers.len();
        self.observers.retain(|entry| entry.id != id);
        if self.observers.len() != before {
            return true;
        }
        self.pipelines.values_mut().any(|pipeline| {
            let before = pipeline.listeners.len();
            pipeline.listeners.retain(|(sub_id, _)| *sub_id != id);
            pipeline.listeners.len() != before
        })
    }

    fn pipeline(&self, id: PipelineId) -> Result<&FeedbackPipeline, ConfigError> {
        self.pipelines
            .get(&id)
            .ok_or_else(|| ConfigError::UnknownPipeline(id.to_string()))
    }

    fn pipeline_mut(&mut self, id: PipelineId) -> Result<&mut FeedbackPipeline, ConfigError> {
        self.pipelines
            .get_mut(&id)
            .ok_or_else(|| ConfigError::UnknownPipeline(id.to_string()))
    }

    fn change_at(&self, path: Path) -> FormResult<ValueChange> {
        let node = self.root.resolve(&path)?;
        Ok(ValueChange {
            value: node.value(),
            status: node.status(),
            path,
        })
    }
}

impl Drop for FormState {
    fn drop(&mut self) {
        for pipeline in self.pipelines.values_mut() {
            pipeline.cancel();
        }
    }
}

/// Handle to one live form.
///
/// Clones share the same tree. Observer callbacks that capture a clone keep
/// the form alive for as long as they are registered.
#[derive(Clone)]
pub struct FormModel {
    inner: Arc<RwLock<FormState>>,
}

impl FormModel {
    /// Creates a form with the default configuration.
    pub fn new(root: GroupNode) -> FormResult<Self> {
        Self::with_config(root, FormConfig::default())
    }

    /// Creates a form and evaluates every node once.
    ///
    /// Broken definitions (e.g. a cross-field rule naming a missing child)
    /// are reported here.
    pub fn with_config(root: GroupNode, config: FormConfig) -> FormResult<Self> {
        let mut root = Node::Group(root);
        let status = root.recompute_subtree(&Path::root())?;
        log::debug!("form built: {:?}", status);

        Ok(Self {
            inner: Arc::new(RwLock::new(FormState {
                root,
                config,
                observers: Vec::new(),
                pipelines: HashMap::new(),
                last_id: 0,
            })),
        })
    }

    fn read(&self) -> RwLockReadGuard<'_, FormState> {
        self.inner
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, FormState> {
        self.inner
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Get the form configuration.
    pub fn config(&self) -> FormConfig {
        self.read().config.clone()
    }

    // -------------------------------------------------------------------------
    // Read methods
    // -------------------------------------------------------------------------

    /// Get the value of a node.
    pub fn get_value(&self, path: impl IntoPath) -> FormResult<Value> {
        let path = path.into_path()?;
        Ok(self.read().root.resolve(&path)?.value())
    }

    /// Get the validity of a node.
    pub fn validation_state(&self, path: impl IntoPath) -> FormResult<ValidationState> {
        let path = path.into_path()?;
        Ok(self.read().root.resolve(&path)?.status())
    }

    /// Get the failures of a node's own rules.
    pub fn errors(&self, path: impl IntoPath) -> FormResult<ErrorSet> {
        let path = path.into_path()?;
        Ok(self.read().root.resolve(&path)?.errors().clone())
    }

    /// Get the interaction flags of a node.
    pub fn interaction_state(&self, path: impl IntoPath) -> FormResult<InteractionState> {
        let path = path.into_path()?;
        Ok(self.read().root.resolve(&path)?.interaction())
    }

    /// Get the rules attached to a node.
    pub fn validators(&self, path: impl IntoPath) -> FormResult<Vec<Rule>> {
        let path = path.into_path()?;
        Ok(self.read().root.resolve(&path)?.rules().to_vec())
    }

    /// Get the number of elements of an array node.
    pub fn array_len(&self, path: impl IntoPath) -> FormResult<usize> {
        let path = path.into_path()?;
        let state = self.read();
        let node = state.root.resolve(&path)?;
        let array = node.as_array().ok_or_else(|| ConfigError::NotAnArray {
            path: path.to_string(),
            kind: node.kind(),
        })?;
        Ok(array.len())
    }

    /// Check if the whole form is valid.
    pub fn is_valid(&self) -> bool {
        self.read().root.status().is_valid()
    }

    /// Returns the root validity and the full value tree.
    pub fn submit(&self) -> Submission {
        let state = self.read();
        let submission = Submission {
            status: state.root.status(),
            value: state.root.value(),
        };
        log::debug!("submit: {:?}", submission.status);
        submission
    }

    // -------------------------------------------------------------------------
    // Write methods
    // -------------------------------------------------------------------------

    /// Writes a value and propagates validity up to the root.
    ///
    /// Writing a group or array distributes a map or list value to its
    /// children. Every written field is marked dirty and notifies its own
    /// observers, followed by the addressed node's observers. Writing the
    /// current value again still runs the whole cycle.
    pub fn set_value(&self, path: impl IntoPath, value: impl Into<Value>) -> FormResult<()> {
        let path = path.into_path()?;
        let changes = {
            let mut state = self.write();
            let mut written = Vec::new();
            state
                .root
                .resolve_mut(&path)?
                .write(value.into(), &path, &mut written)?;
            if written.last() != Some(&path) {
                written.push(path.clone());
            }
            let status = state.root.refresh(&path)?;
            log::debug!("set '{}' ({} fields), form {:?}", path, written.len(), status);

            written
                .into_iter()
                .map(|written_path| state.change_at(written_path))
                .collect::<FormResult<Vec<_>>>()?
        };

        for change in &changes {
            self.notify(change)?;
        }
        Ok(())
    }

    /// Marks every field at or below `path` as visited.
    pub fn mark_touched(&self, path: impl IntoPath) -> FormResult<()> {
        let path = path.into_path()?;
        self.write().root.resolve_mut(&path)?.mark_touched();
        Ok(())
    }

    /// Restores every field at or below `path` to its initial value and
    /// clears its interaction flags.
    ///
    /// Every reset field notifies its observers, so conditional rules follow
    /// the restored values.
    pub fn reset(&self, path: impl IntoPath) -> FormResult<()> {
        let path = path.into_path()?;
        let changes = {
            let mut state = self.write();
            let mut written = Vec::new();
            state.root.resolve_mut(&path)?.reset(&path, &mut written);
            if written.last() != Some(&path) {
                written.push(path.clone());
            }
            state.root.refresh(&path)?;
            log::debug!("reset '{}' ({} fields)", path, written.len());

            written
                .into_iter()
                .map(|written_path| state.change_at(written_path))
                .collect::<FormResult<Vec<_>>>()?
        };

        for change in &changes {
            self.notify(change)?;
        }
        Ok(())
    }

    /// Replaces a node's rules and recomputes its validity in one step.
    ///
    /// Cross-field rules are checked against the node before anything is
    /// replaced.
    pub fn set_validators(&self, path: impl IntoPath, rules: Vec<Rule>) -> FormResult<()> {
        let path = path.into_path()?;
        let mut state = self.write();
        let node = state.root.resolve_mut(&path)?;
        for rule in rules.iter().filter(|rule| rule.is_cross_field()) {
            rule.validate(node, &path)?;
        }
        log::debug!("validators of '{}' set to {:?}", path, rules);
        node.set_rules(rules);
        state.root.refresh(&path)?;
        Ok(())
    }

    /// Removes every rule of a node and recomputes its validity.
    pub fn clear_validators(&self, path: impl IntoPath) -> FormResult<()> {
        self.set_validators(path, Vec::new())
    }

    /// Re-evaluates the node at `path` and its ancestors.
    pub fn recompute(&self, path: impl IntoPath) -> FormResult<ValidationState> {
        let path = path.into_path()?;
        let mut state = self.write();
        state.root.refresh(&path)?;
        Ok(state.root.resolve(&path)?.status())
    }

    // -------------------------------------------------------------------------
    // Arrays
    // -------------------------------------------------------------------------

    /// Appends a factory-built element to the array at `path`.
    ///
    /// Returns the new element's index. The element takes part in validity
    /// right away.
    pub fn add_array_element(&self, path: impl IntoPath) -> FormResult<usize> {
        let path = path.into_path()?;
        let (index, change) = {
            let mut state = self.write();
            let node = state.root.resolve_mut(&path)?;
            let kind = node.kind();
            let array = node.as_array_mut().ok_or_else(|| ConfigError::NotAnArray {
                path: path.to_string(),
                kind,
            })?;
            let index = array
                .push_from_factory()
                .ok_or_else(|| ConfigError::NoElementFactory(path.to_string()))?;

            let element = path.index(index);
            if let Err(e) = state.root.refresh(&element) {
                // keep the tree shape consistent with what was validated
                if let Some(array) = state.root.resolve_mut(&path)?.as_array_mut() {
                    array.remove(index);
                }
                return Err(e);
            }
            log::debug!("added '{}'", element);
            (index, state.change_at(path)?)
        };

        self.notify(&change)?;
        Ok(index)
    }

    /// Removes the element at `index` from the array at `path`.
    ///
    /// Later elements shift down; paths into them now resolve one index lower.
    pub fn remove_array_element(&self, path: impl IntoPath, index: usize) -> FormResult<()> {
        let path = path.into_path()?;
        let change = {
            let mut state = self.write();
            let node = state.root.resolve_mut(&path)?;
            let kind = node.kind();
            let array = node.as_array_mut().ok_or_else(|| ConfigError::NotAnArray {
                path: path.to_string(),
                kind,
            })?;
            let len = array.len();
            array
                .remove(index)
                .ok_or_else(|| PathError::OutOfBounds {
                    parent: path.to_string(),
                    index,
                    len,
                })?;
            state.root.refresh(&path)?;
            log::debug!("removed '{}'", path.index(index));
            state.change_at(path)?
        };

        self.notify(&change)
    }

    // -------------------------------------------------------------------------
    // Observers
    // -------------------------------------------------------------------------

    /// Registers a callback for value changes of the node at `path`.
    pub fn subscribe<F>(&self, path: impl IntoPath, callback: F) -> FormResult<Subscription>
    where
        F: Fn(&ValueChange) + Send + Sync + 'static,
    {
        let path = path.into_path()?;
        let mut state = self.write();
        state.root.resolve(&path)?;
        let id = state.add_observer(path, Observer::Callback(Arc::new(callback)));
        Ok(Subscription::new(id, Arc::downgrade(&self.inner)))
    }

    /// Registers a conditional rule and applies it to the trigger's current
    /// value right away.
    pub fn add_conditional_rule(&self, rule: ConditionalRule) -> FormResult<Subscription> {
        let trigger_value = {
            let state = self.read();
            let target = state.root.resolve(rule.target())?;
            if rule.rule().is_cross_field() {
                rule.rule().validate(target, rule.target())?;
            }
            state.root.resolve(rule.trigger())?.value()
        };
        self.apply_conditional(&rule, &trigger_value)?;

        let mut state = self.write();
        log::debug!(
            "conditional {:?} on '{}' when '{}' = {}",
            rule.rule(),
            rule.target(),
            rule.trigger(),
            rule.activation()
        );
        let id = state.add_observer(rule.trigger().clone(), Observer::Conditional(rule));
        Ok(Subscription::new(id, Arc::downgrade(&self.inner)))
    }

    fn apply_conditional(&self, rule: &ConditionalRule, trigger_value: &Value) -> FormResult<()> {
        let mut state = self.write();
        let target = state.root.resolve_mut(rule.target())?;
        let mut rules = target.rules().to_vec();
        if !rule.reconcile(&mut rules, trigger_value) {
            return Ok(());
        }
        log::debug!("validators of '{}' now {:?}", rule.target(), rules);
        target.set_rules(rules);
        state.root.refresh(rule.target())?;
        Ok(())
    }

    /// Delivers a change to the node's observers in registration order.
    fn notify(&self, change: &ValueChange) -> FormResult<()> {
        let observers = self.read().observers_of(&change.path);
        for observer in observers {
            match observer {
                Observer::Callback(callback) => callback(change),
                Observer::Conditional(rule) => self.apply_conditional(&rule, &change.value)?,
                Observer::Feedback(id) => self.schedule_feedback(id)?,
            }
        }
        Ok(())
    }
}

impl std::fmt::Debug for FormModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.read();
        f.debug_struct("FormModel")
            .field("root", &state.root)
            .field("observers", &state.observers.len())
            .field("pipelines", &state.pipelines.len())
            .finish()
    }
}
