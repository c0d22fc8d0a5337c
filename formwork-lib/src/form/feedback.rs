//! Debounced feedback messages.
//!
//! A pipeline watches one node. Every value change restarts a single pending
//! timer; only when the node stays quiet for the whole window does the
//! pipeline read the node's current errors and publish one message. Older
//! timers are aborted and additionally fenced by a generation counter, so a
//! superseded timer can never publish.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use super::config::MessageCatalog;
use super::observer::{MessageCallback, Observer, Subscription, SubscriptionId};
use super::FormModel;
use crate::error::{ConfigError, FormResult};
use crate::path::{IntoPath, Path};

/// Identifies a feedback pipeline on a form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PipelineId(pub(crate) u64);

impl fmt::Display for PipelineId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "__pipeline_{}", self.0)
    }
}

pub(crate) struct FeedbackPipeline {
    path: Path,
    catalog: MessageCatalog,
    window: Duration,
    runtime: Handle,
    /// Bumped on every restart; a timer only publishes for its own generation.
    generation: u64,
    pending: Option<JoinHandle<()>>,
    current: watch::Sender<String>,
    pub(crate) listeners: Vec<(SubscriptionId, MessageCallback)>,
}

impl FeedbackPipeline {
    pub(crate) fn cancel(&mut self) {
        if let Some(handle) = self.pending.take() {
            handle.abort();
        }
    }
}

impl FormModel {
    /// Registers a feedback pipeline on the node at `path`.
    ///
    /// The pipeline uses the form's debounce window and must be registered
    /// from inside a tokio runtime, which then runs its timers.
    pub fn feedback(&self, path: impl IntoPath, catalog: MessageCatalog) -> FormResult<PipelineId> {
        let path = path.into_path()?;
        let runtime =
            Handle::try_current().map_err(|_| ConfigError::NoRuntime(path.to_string()))?;

        let mut state = self.write();
        state.root.resolve(&path)?;

        let id = PipelineId(state.next_id());
        let (current, _) = watch::channel(String::new());
        let pipeline = FeedbackPipeline {
            path: path.clone(),
            catalog,
            window: state.config.debounce,
            runtime,
            generation: 0,
            pending: None,
            current,
            listeners: Vec::new(),
        };
        state.pipelines.insert(id, pipeline);
        state.add_observer(path.clone(), Observer::Feedback(id));

        log::debug!("registered feedback {} on '{}'", id, path);
        Ok(id)
    }

    /// Get the message a pipeline last published.
    pub fn message(&self, id: PipelineId) -> FormResult<String> {
        let state = self.read();
        let pipeline = state.pipeline(id)?;
        Ok(pipeline.current.borrow().clone())
    }

    /// Returns a receiver that observes the pipeline's current message.
    pub fn watch_message(&self, id: PipelineId) -> FormResult<watch::Receiver<String>> {
        let state = self.read();
        Ok(state.pipeline(id)?.current.subscribe())
    }

    /// Registers a callback for every message the pipeline publishes.
    pub fn subscribe_message<F>(&self, id: PipelineId, callback: F) -> FormResult<Subscription>
    where
        F: Fn(&str) + Send + Sync + 'static,
    {
        let mut state = self.write();
        let sub_id = SubscriptionId(state.next_id());
        state
            .pipeline_mut(id)?
            .listeners
            .push((sub_id, Arc::new(callback)));
        Ok(Subscription::new(sub_id, Arc::downgrade(&self.inner)))
    }

    /// Restarts the pipeline's window after a value change.
    pub(crate) fn schedule_feedback(&self, id: PipelineId) -> FormResult<()> {
        let form = Arc::downgrade(&self.inner);
        let mut state = self.write();
        let pipeline = state.pipeline_mut(id)?;

        pipeline.cancel();
        pipeline.generation += 1;
        let generation = pipeline.generation;
        let window = pipeline.window;

        pipeline.pending = Some(pipeline.runtime.spawn(async move {
            tokio::time::sleep(window).await;
            match form.upgrade() {
                Some(inner) => FormModel { inner }.fire_feedback(id, generation),
                None => log::debug!("form dropped before feedback {} fired", id),
            }
        }));

        log::debug!("feedback {} scheduled (generation {})", id, generation);
        Ok(())
    }

    fn fire_feedback(&self, id: PipelineId, generation: u64) {
        let (message, listeners) = {
            let mut state = self.write();
            let state = &mut *state;
            let Some(pipeline) = state.pipelines.get_mut(&id) else {
                log::warn!("feedback {} fired after removal", id);
                return;
            };
            if pipeline.generation != generation {
                log::debug!("feedback {} generation {} superseded", id, generation);
                return;
            }
            pipeline.pending = None;

            let message = match state.root.resolve(&pipeline.path) {
                Ok(node) => pipeline.catalog.message_for(node),
                Err(e) => {
                    log::error!("feedback {} lost its node: {}", id, e);
                    String::new()
                }
            };
            pipeline.current.send_replace(message.clone());
            let listeners: Vec<MessageCallback> = pipeline
                .listeners
                .iter()
                .map(|(_, listener)| Arc::clone(listener))
                .collect();
            (message, listeners)
        };

        log::debug!("feedback {} published {:?}", id, message);
        for listener in listeners {
            listener(&message);
        }
    }
}
