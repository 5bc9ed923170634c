//! The optimization loop driver.

use core::fmt;
use std::collections::VecDeque;

use crate::acquisition::{AcquisitionFunction, AcquisitionOptimizer, KappaDecay};
use crate::domain_reduction::BoundsTransformer;
use crate::error::{Error, Result};
use crate::event::{Dispatcher, Event, EventPayload, Observer, ObserverResult, SubscriberId};
use crate::gp::GaussianProcess;
use crate::objective::Objective;
use crate::space::{Bounds, NamedObservation, Observation, ParamMap, ParameterSpace, Params};
use crate::types::OptimizerState;

mod builder;
mod maximize;

pub use builder::BayesianOptimizationBuilder;

/// Sequential Bayesian optimizer.
///
/// Owns the [`ParameterSpace`], the surrogate, the acquisition settings,
/// the lazy-probe queue, and the only random generator of the run, so a
/// seed fixes every suggestion.
///
/// # Examples
///
/// ```
/// use bayes_opt::prelude::*;
///
/// let objective = |p: &ParamMap| -> Result<f64, Error> { Ok(-(p["x"] - 0.3).powi(2)) };
/// let mut optimizer = BayesianOptimization::builder(objective, Bounds::from([("x", (0.0, 1.0))]))
///     .seed(3)
///     .acquisition(AcquisitionFunction::ei(0.0))
///     .build()?;
///
/// optimizer.probe([("x", 0.5)], true)?;
/// optimizer.maximize(2, 4)?;
///
/// assert_eq!(optimizer.res().len(), 7);
/// assert_eq!(optimizer.state(), OptimizerState::Idle);
/// # Ok::<_, Error>(())
/// ```
pub struct BayesianOptimization<O: Objective> {
    pub(crate) objective: O,
    pub(crate) space: ParameterSpace,
    pub(crate) rng: fastrand::Rng,
    pub(crate) model: GaussianProcess,
    pub(crate) acquisition: AcquisitionFunction,
    pub(crate) kappa_decay: KappaDecay,
    pub(crate) acq_optimizer: AcquisitionOptimizer,
    pub(crate) bounds_transformer: Option<Box<dyn BoundsTransformer>>,
    /// Points queued by lazy probes, evaluated first-in first-out.
    pub(crate) queue: VecDeque<Vec<f64>>,
    pub(crate) dispatcher: Dispatcher,
    pub(crate) state: OptimizerState,
    /// Model-guided iterations completed over the optimizer's lifetime.
    pub(crate) iteration: usize,
    /// Space revision the surrogate was last trained on.
    pub(crate) fitted_revision: Option<u64>,
    pub(crate) latest: Option<NamedObservation>,
}

impl<O: Objective> BayesianOptimization<O> {
    /// Returns a builder for an optimizer maximizing `objective` within
    /// `bounds`.
    #[must_use]
    pub fn builder(objective: O, bounds: impl Into<Bounds>) -> BayesianOptimizationBuilder<O> {
        BayesianOptimizationBuilder::new(objective, bounds.into())
    }

    /// Parameter names in canonical order.
    #[must_use]
    pub fn keys(&self) -> &[String] {
        self.space.keys()
    }

    /// The parameter space with all observations.
    #[must_use]
    pub fn space(&self) -> &ParameterSpace {
        &self.space
    }

    /// The surrogate model.
    #[must_use]
    pub fn model(&self) -> &GaussianProcess {
        &self.model
    }

    /// The acquisition function, including any kappa decay applied so far.
    #[must_use]
    pub fn acquisition(&self) -> AcquisitionFunction {
        self.acquisition
    }

    /// Current phase of the loop. `Idle` whenever no `maximize` call runs.
    #[must_use]
    pub fn state(&self) -> OptimizerState {
        self.state
    }

    /// Model-guided iterations completed so far.
    #[must_use]
    pub fn iteration(&self) -> usize {
        self.iteration
    }

    /// Number of lazily probed points still waiting for evaluation.
    #[must_use]
    pub fn queue_len(&self) -> usize {
        self.queue.len()
    }

    /// Best observation so far.
    #[must_use]
    pub fn max(&self) -> Option<NamedObservation> {
        self.space.max().map(|o| self.space.named(o))
    }

    /// Every observation, in registration order.
    #[must_use]
    pub fn res(&self) -> Vec<NamedObservation> {
        self.space
            .observations()
            .iter()
            .map(|o| self.space.named(o))
            .collect()
    }

    /// Mutable access to the objective.
    pub fn objective_mut(&mut self) -> &mut O {
        &mut self.objective
    }

    /// Replaces some or all of the current bounds.
    ///
    /// # Errors
    ///
    /// [`Error::UnknownParameter`] or [`Error::InvalidBounds`]; the bounds are
    /// unchanged on error.
    pub fn set_bounds(&mut self, partial: impl Into<Bounds>) -> Result<()> {
        self.space.set_bounds(partial)?;
        trace_debug!(bounds = ?self.space.intervals(), "bounds updated");
        Ok(())
    }

    /// Subscribes `observer` to `event`. Observers of one event run in
    /// subscription order.
    pub fn subscribe(&mut self, event: Event, observer: impl Observer + 'static) -> SubscriberId {
        self.dispatcher.subscribe(event, Box::new(observer))
    }

    /// Subscribes a closure to `event`.
    ///
    /// Same as [`subscribe`](Self::subscribe), with a signature that lets the
    /// closure's argument type be inferred.
    pub fn subscribe_fn<F>(&mut self, event: Event, f: F) -> SubscriberId
    where
        F: FnMut(&EventPayload) -> ObserverResult + 'static,
    {
        self.dispatcher.subscribe(event, Box::new(f))
    }

    /// Removes a subscription. Returns `false` if it did not exist.
    pub fn unsubscribe(&mut self, event: Event, id: SubscriberId) -> bool {
        self.dispatcher.unsubscribe(event, id)
    }

    /// Observer failures recorded so far, each an [`Error::ObserverFailure`].
    #[must_use]
    pub fn observer_failures(&self) -> &[Error] {
        self.dispatcher.failures()
    }

    /// Returns and clears the recorded observer failures.
    pub fn take_observer_failures(&mut self) -> Vec<Error> {
        self.dispatcher.take_failures()
    }

    /// Evaluates `params` now, or queues them when `lazy` is set.
    ///
    /// Queued points are evaluated at the start of the next `maximize`
    /// iteration, before any model-guided suggestion.
    ///
    /// # Errors
    ///
    /// Structural errors ([`Error::DimensionMismatch`],
    /// [`Error::UnknownParameter`], [`Error::NonFinite`]) in either mode;
    /// for an eager probe, any objective error unchanged.
    pub fn probe(&mut self, params: impl Into<Params>, lazy: bool) -> Result<(), O::Error> {
        let point = self.space.to_point(params)?;
        if point.iter().any(|v| !v.is_finite()) {
            return Err(Error::NonFinite("point").into());
        }
        if lazy {
            trace_debug!(queued = self.queue.len() + 1, "queued lazy probe");
            self.queue.push_back(point);
            return Ok(());
        }
        let result = self.evaluate(point);
        self.state = OptimizerState::Idle;
        result
    }

    /// Proposes the next point to evaluate without evaluating it.
    ///
    /// With no observations the proposal is a uniform random point.
    ///
    /// # Errors
    ///
    /// [`Error::IllConditionedModel`] if the surrogate cannot be fitted.
    pub fn suggest(&mut self) -> Result<ParamMap> {
        let point = self.next_point()?;
        self.space.to_param_map(&point)
    }

    /// Records an externally evaluated point and notifies step observers.
    ///
    /// # Errors
    ///
    /// Same as [`ParameterSpace::register`].
    pub fn register(&mut self, params: impl Into<Params>, target: f64) -> Result<()> {
        let point = self.space.to_point(params)?;
        self.space.register(point.clone(), target)?;
        self.record_step(point, target);
        Ok(())
    }

    /// Next point from the acquisition optimizer, or a random one while the
    /// space is empty.
    pub(crate) fn next_point(&mut self) -> Result<Vec<f64>> {
        if self.space.is_empty() {
            return Ok(self.space.random_sample(&mut self.rng));
        }
        self.refresh_model()?;
        let y_max = self.space.max().map_or(f64::NEG_INFINITY, |o| o.target);
        let candidate = self.acq_optimizer.maximize(
            &self.acquisition,
            &self.model,
            &self.space,
            y_max,
            &mut self.rng,
        );
        trace_debug!(score = candidate.score, point = ?candidate.point, "suggested point");
        Ok(candidate.point)
    }

    /// Retrains the surrogate if observations or bounds changed since the
    /// last fit.
    fn refresh_model(&mut self) -> Result<()> {
        let revision = self.space.revision();
        if self.fitted_revision != Some(revision) {
            self.model
                .set_training_data(self.space.params(), self.space.targets())?;
            self.fitted_revision = Some(revision);
        }
        self.model.fit()
    }

    /// Evaluates the objective at `point`, registers the result, and fires a
    /// step event.
    pub(crate) fn evaluate(&mut self, point: Vec<f64>) -> Result<(), O::Error> {
        self.state = OptimizerState::Evaluating;
        let target = self.space.probe(point.clone(), &mut self.objective)?;
        self.state = OptimizerState::Registering;
        self.record_step(point, target);
        Ok(())
    }

    fn record_step(&mut self, point: Vec<f64>, target: f64) {
        let is_best = self.space.max().is_some_and(|b| b.params == point);
        let observation = self.space.named(&Observation {
            params: point,
            target,
        });
        trace_debug!(target, n = self.space.len(), "registered observation");
        if is_best {
            trace_info!(target, params = ?observation.params, "new best observation");
        }
        self.latest = Some(observation);
        self.notify(Event::OptimizationStep);
    }

    pub(crate) fn notify(&mut self, event: Event) {
        if !self.dispatcher.has_subscribers(event) {
            return;
        }
        let payload = EventPayload {
            event,
            best: self.max(),
            latest: self.latest.clone(),
            iteration: self.iteration,
            n_observations: self.space.len(),
        };
        self.dispatcher.dispatch(&payload);
    }
}

impl<O: Objective> fmt::Debug for BayesianOptimization<O> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BayesianOptimization")
            .field("space", &self.space)
            .field("model", &self.model)
            .field("acquisition", &self.acquisition)
            .field("state", &self.state)
            .field("iteration", &self.iteration)
            .field("queue_len", &self.queue.len())
            .field("dispatcher", &self.dispatcher)
            .finish_non_exhaustive()
    }
}
