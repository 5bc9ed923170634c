//! Lifecycle events and the observer registry.
//!
//! Observers subscribe to one [`Event`] kind at a time and are notified
//! synchronously, in subscription order, with a read-only [`EventPayload`].
//! An observer that returns an error is reported (logged and recorded as
//! [`Error::ObserverFailure`]) and never interrupts the optimization loop.

use core::fmt;
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::space::NamedObservation;

/// Kinds of lifecycle events fired by the optimizer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Event {
    /// Fired once at the start of every `maximize` call.
    OptimizationStart,
    /// Fired after every registered evaluation.
    OptimizationStep,
    /// Fired once when a `maximize` call finishes its budget.
    OptimizationEnd,
}

impl Event {
    /// Every event kind, in lifecycle order.
    pub const ALL: [Self; 3] = [
        Self::OptimizationStart,
        Self::OptimizationStep,
        Self::OptimizationEnd,
    ];
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::OptimizationStart => "optimization:start",
            Self::OptimizationStep => "optimization:step",
            Self::OptimizationEnd => "optimization:end",
        })
    }
}

/// Snapshot of the optimizer handed to observers.
#[derive(Clone, Debug, PartialEq)]
pub struct EventPayload {
    /// The event being dispatched.
    pub event: Event,
    /// Best observation so far, if any.
    pub best: Option<NamedObservation>,
    /// The observation that triggered a step event; for start/end events the
    /// most recent observation, if any.
    pub latest: Option<NamedObservation>,
    /// Number of model-guided iterations completed over the optimizer's
    /// lifetime.
    pub iteration: usize,
    /// Number of stored observations.
    pub n_observations: usize,
}

/// Error type observers may return.
pub type ObserverError = Box<dyn core::error::Error + Send + Sync>;

/// Result type of [`Observer::update`].
pub type ObserverResult = core::result::Result<(), ObserverError>;

/// Receives optimizer events.
///
/// Implemented for every `FnMut(&EventPayload) -> ObserverResult`.
pub trait Observer {
    /// Handles one event.
    ///
    /// # Errors
    ///
    /// Any error; it is recorded by the optimizer and otherwise ignored.
    fn update(&mut self, payload: &EventPayload) -> ObserverResult;
}

impl<F> Observer for F
where
    F: FnMut(&EventPayload) -> ObserverResult,
{
    fn update(&mut self, payload: &EventPayload) -> ObserverResult {
        self(payload)
    }
}

/// Handle returned by `subscribe`, used to unsubscribe.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriberId(u64);

/// Ordered observer registry, one list per event kind.
#[derive(Default)]
pub(crate) struct Dispatcher {
    next_id: u64,
    subscribers: BTreeMap<Event, Vec<(SubscriberId, Box<dyn Observer>)>>,
    failures: Vec<Error>,
}

impl Dispatcher {
    pub(crate) fn subscribe(&mut self, event: Event, observer: Box<dyn Observer>) -> SubscriberId {
        let id = SubscriberId(self.next_id);
        self.next_id += 1;
        self.subscribers
            .entry(event)
            .or_default()
            .push((id, observer));
        id
    }

    pub(crate) fn unsubscribe(&mut self, event: Event, id: SubscriberId) -> bool {
        let Some(list) = self.subscribers.get_mut(&event) else {
            return false;
        };
        let before = list.len();
        list.retain(|(sid, _)| *sid != id);
        list.len() != before
    }

    pub(crate) fn has_subscribers(&self, event: Event) -> bool {
        self.subscribers.get(&event).is_some_and(|l| !l.is_empty())
    }

    /// Notifies every observer of `payload.event`, isolating failures.
    pub(crate) fn dispatch(&mut self, payload: &EventPayload) {
        let Some(list) = self.subscribers.get_mut(&payload.event) else {
            return;
        };
        for (_, observer) in list.iter_mut() {
            if let Err(e) = observer.update(payload) {
                let message = e.to_string();
                trace_warn!(event = %payload.event, %message, "observer failed");
                self.failures.push(Error::ObserverFailure {
                    event: payload.event,
                    message,
                });
            }
        }
    }

    pub(crate) fn failures(&self) -> &[Error] {
        &self.failures
    }

    pub(crate) fn take_failures(&mut self) -> Vec<Error> {
        core::mem::take(&mut self.failures)
    }
}

impl fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let counts: BTreeMap<Event, usize> =
            self.subscribers.iter().map(|(e, l)| (*e, l.len())).collect();
        f.debug_struct("Dispatcher")
            .field("subscribers", &counts)
            .field("failures", &self.failures.len())
            .finish()
    }
}
