//! Serialized model transitions.
//!
//! A widget can only animate one batch at a time, and a batch is only valid
//! against the model the widget is showing when it starts. The
//! [`UpdateScheduler`] owns the displayed model and runs one transition at a
//! time; requests arriving mid-transition wait in a queue and are started one
//! per completed transition.
//!
//! ```text
//!            request_update                 Completion::complete
//!   Idle ─────────────────────▶ Transitioning ─────────────────────▶ Idle
//!                                   │   ▲                               │
//!                  request_update   │   │    pending queue not empty    │
//!                  (queued)         ▼   └───────────────────────────────┘
//! ```
//!
//! Non-animated transitions reload the widget and complete on the next tick of
//! the [`RunLoop`], so the widget finishes its layout pass before the callback
//! runs.

use std::collections::VecDeque;
use std::fmt;
use std::sync::{Arc, Weak};

use cellobject_core::logging::{perf_span, span_names, targets};
use cellobject_core::{RunLoop, Signal, ThreadAffinity};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use super::widget::{CollectionWidget, Completion};
use crate::model::{DataModel, EditBatch, diff};

/// Callback run once a requested transition has finished.
pub type DoneCallback = Box<dyn FnOnce() + Send>;

/// How requests arriving mid-transition are queued.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UpdatePolicy {
    /// Every request is shown, in arrival order.
    #[default]
    Fifo,
    /// Only the latest queued request is shown. Callbacks of the requests it
    /// replaced still run, in arrival order, just before its own.
    CoalesceLatest,
}

/// Whether a transition is in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    Idle,
    Transitioning,
}

/// Describes one transition, as passed to the scheduler's signals.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionInfo {
    /// Increases by one for every started transition.
    pub generation: u64,
    pub animated: bool,
    /// Operations in the batch; zero for a full reload.
    pub operations: usize,
    /// Requests still queued behind this one.
    pub pending: usize,
}

/// A request waiting for the current transition to finish.
pub struct PendingUpdate {
    model: Arc<DataModel>,
    animated: bool,
    callbacks: Vec<DoneCallback>,
}

impl PendingUpdate {
    pub fn model(&self) -> &Arc<DataModel> {
        &self.model
    }

    pub fn animated(&self) -> bool {
        self.animated
    }
}

impl fmt::Debug for PendingUpdate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PendingUpdate")
            .field("items", &self.model.item_count())
            .field("animated", &self.animated)
            .field("callbacks", &self.callbacks.len())
            .finish()
    }
}

struct InFlight {
    info: TransitionInfo,
    callbacks: Vec<DoneCallback>,
    span: tracing::Span,
}

struct Inner {
    displayed: Arc<DataModel>,
    state: SchedulerState,
    generation: u64,
    pending: VecDeque<PendingUpdate>,
    in_flight: Option<InFlight>,
    policy: UpdatePolicy,
}

/// Work decided under the lock and carried out after releasing it.
struct Launch {
    info: TransitionInfo,
    batch: Option<EditBatch>,
    span: tracing::Span,
}

struct Shared {
    inner: Mutex<Inner>,
    widget: Arc<dyn CollectionWidget>,
    run_loop: RunLoop,
    affinity: ThreadAffinity,
    transition_started: Arc<Signal<TransitionInfo>>,
    transition_finished: Arc<Signal<TransitionInfo>>,
}

/// Runs model transitions on a widget one at a time.
///
/// Cloning yields another handle to the same scheduler. All calls are
/// expected on the thread that created it; debug builds assert this.
#[derive(Clone)]
pub struct UpdateScheduler {
    shared: Arc<Shared>,
}

impl UpdateScheduler {
    /// Creates an idle scheduler showing an empty model.
    pub fn new(widget: Arc<dyn CollectionWidget>, run_loop: RunLoop) -> Self {
        Self {
            shared: Arc::new(Shared {
                inner: Mutex::new(Inner {
                    displayed: Arc::new(DataModel::empty()),
                    state: SchedulerState::Idle,
                    generation: 0,
                    pending: VecDeque::new(),
                    in_flight: None,
                    policy: UpdatePolicy::default(),
                }),
                widget,
                run_loop,
                affinity: ThreadAffinity::current(),
                transition_started: Arc::new(Signal::new()),
                transition_finished: Arc::new(Signal::new()),
            }),
        }
    }

    /// Sets the queueing policy.
    pub fn with_policy(self, policy: UpdatePolicy) -> Self {
        self.set_policy(policy);
        self
    }

    /// Requests a transition to `model`.
    ///
    /// Starts immediately when idle; otherwise the request is queued and
    /// returns at once. `on_done` runs after the transition to `model` has
    /// finished.
    pub fn request_update<F>(&self, model: impl Into<Arc<DataModel>>, animated: bool, on_done: F)
    where
        F: FnOnce() + Send + 'static,
    {
        self.enqueue(model.into(), animated, vec![Box::new(on_done)]);
    }

    /// Requests a transition to `model` without a completion callback.
    pub fn set_model(&self, model: impl Into<Arc<DataModel>>, animated: bool) {
        self.enqueue(model.into(), animated, Vec::new());
    }

    fn enqueue(&self, model: Arc<DataModel>, animated: bool, callbacks: Vec<DoneCallback>) {
        self.shared
            .affinity
            .debug_assert_same_thread_with_msg("UpdateScheduler used off its owner thread");

        let launch = {
            let mut inner = self.shared.inner.lock();
            let request = PendingUpdate {
                model,
                animated,
                callbacks,
            };

            if inner.state == SchedulerState::Transitioning || !inner.pending.is_empty() {
                inner.queue(request);
                tracing::debug!(
                    target: targets::SCHEDULER,
                    pending = inner.pending.len(),
                    animated,
                    "transition in flight, request queued"
                );
                return;
            }

            inner.begin(request)
        };

        self.shared.launch(launch);
    }

    /// The model the widget shows, or is transitioning to.
    pub fn displayed_model(&self) -> Arc<DataModel> {
        self.shared.inner.lock().displayed.clone()
    }

    /// The most recently requested model: the last queued one, or the
    /// displayed model when nothing is queued.
    pub fn latest_model(&self) -> Arc<DataModel> {
        let inner = self.shared.inner.lock();
        inner
            .pending
            .back()
            .map_or_else(|| inner.displayed.clone(), |last| last.model.clone())
    }

    pub fn state(&self) -> SchedulerState {
        self.shared.inner.lock().state
    }

    pub fn is_transitioning(&self) -> bool {
        self.state() == SchedulerState::Transitioning
    }

    /// Number of queued requests.
    pub fn pending_count(&self) -> usize {
        self.shared.inner.lock().pending.len()
    }

    pub fn policy(&self) -> UpdatePolicy {
        self.shared.inner.lock().policy
    }

    /// Changes the queueing policy. Already queued requests are kept.
    pub fn set_policy(&self, policy: UpdatePolicy) {
        self.shared.inner.lock().policy = policy;
    }

    /// The widget this scheduler drives.
    pub fn widget(&self) -> &Arc<dyn CollectionWidget> {
        &self.shared.widget
    }

    /// Emitted when a transition starts, before the widget is touched.
    pub fn transition_started(&self) -> &Arc<Signal<TransitionInfo>> {
        &self.shared.transition_started
    }

    /// Emitted when a transition finishes, before its callbacks run.
    pub fn transition_finished(&self) -> &Arc<Signal<TransitionInfo>> {
        &self.shared.transition_finished
    }
}

impl fmt::Debug for UpdateScheduler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.shared.inner.lock();
        f.debug_struct("UpdateScheduler")
            .field("state", &inner.state)
            .field("generation", &inner.generation)
            .field("pending", &inner.pending.len())
            .field("policy", &inner.policy)
            .finish_non_exhaustive()
    }
}

impl Inner {
    fn queue(&mut self, mut request: PendingUpdate) {
        match self.policy {
            UpdatePolicy::Fifo => self.pending.push_back(request),
            UpdatePolicy::CoalesceLatest => {
                let mut callbacks: Vec<DoneCallback> = self
                    .pending
                    .drain(..)
                    .flat_map(|superseded| superseded.callbacks)
                    .collect();
                if !callbacks.is_empty() {
                    tracing::trace!(
                        target: targets::SCHEDULER,
                        superseded = callbacks.len(),
                        "coalescing queued requests"
                    );
                }
                callbacks.append(&mut request.callbacks);
                request.callbacks = callbacks;
                self.pending.push_back(request);
            }
        }
    }

    /// Swaps in the requested model and records the transition.
    fn begin(&mut self, request: PendingUpdate) -> Launch {
        self.generation += 1;
        let previous = std::mem::replace(&mut self.displayed, request.model);

        let batch = request
            .animated
            .then(|| diff(&previous, &self.displayed));

        let info = TransitionInfo {
            generation: self.generation,
            animated: request.animated,
            operations: batch.as_ref().map_or(0, EditBatch::len),
            pending: self.pending.len(),
        };

        // Open until the transition's completion is handled.
        let span = perf_span(span_names::TRANSITION);
        self.state = SchedulerState::Transitioning;
        self.in_flight = Some(InFlight {
            info: info.clone(),
            callbacks: request.callbacks,
            span: span.clone(),
        });

        Launch { info, batch, span }
    }
}

impl Shared {
    fn launch(self: &Arc<Self>, launch: Launch) {
        let Launch { info, batch, span } = launch;
        let _entered = span.enter();
        tracing::debug!(
            target: targets::SCHEDULER,
            generation = info.generation,
            animated = info.animated,
            operations = info.operations,
            pending = info.pending,
            "transition started"
        );
        self.transition_started.emit(info.clone());

        let completion = Completion::new(info.generation, {
            let shared: Weak<Shared> = Arc::downgrade(self);
            let generation = info.generation;
            move || {
                if let Some(shared) = shared.upgrade() {
                    shared.finish(generation);
                }
            }
        });

        match batch {
            Some(batch) => self.widget.apply_batch(batch, completion),
            None => {
                self.widget.reload_all();
                self.run_loop.post(move || completion.complete());
            }
        }
    }

    fn finish(self: &Arc<Self>, generation: u64) {
        self.affinity
            .debug_assert_same_thread_with_msg("transition completed off the owner thread");

        let flight = {
            let mut inner = self.inner.lock();
            match inner.in_flight.take_if(|flight| flight.info.generation == generation) {
                Some(flight) => {
                    inner.state = SchedulerState::Idle;
                    flight
                }
                None => {
                    tracing::warn!(
                        target: targets::SCHEDULER,
                        generation,
                        current = inner.generation,
                        "ignoring stale completion"
                    );
                    return;
                }
            }
        };

        let InFlight {
            info,
            callbacks,
            span,
        } = flight;
        span.in_scope(|| {
            tracing::debug!(
                target: targets::SCHEDULER,
                generation,
                callbacks = callbacks.len(),
                "transition finished"
            );
            self.transition_finished.emit(info);
            for callback in callbacks {
                callback();
            }
        });
        drop(span);

        let launch = {
            let mut inner = self.inner.lock();
            if inner.state == SchedulerState::Idle {
                inner.pending.pop_front().map(|next| inner.begin(next))
            } else {
                None
            }
        };
        if let Some(launch) = launch {
            self.launch(launch);
        }
    }
}

static_assertions::assert_impl_all!(UpdateScheduler: Send, Sync);
