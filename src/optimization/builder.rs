use std::collections::VecDeque;

use crate::acquisition::{AcquisitionFunction, AcquisitionOptimizer, KappaDecay};
use crate::domain_reduction::BoundsTransformer;
use crate::error::Result;
use crate::event::Dispatcher;
use crate::gp::{GaussianProcess, Hyperparameters, Kernel};
use crate::objective::Objective;
use crate::space::{Bounds, ParameterSpace};
use crate::types::OptimizerState;

use super::BayesianOptimization;

/// A builder for constructing [`BayesianOptimization`] instances with a
/// fluent API.
///
/// Created via [`BayesianOptimization::builder()`].
///
/// # Defaults
///
/// - Seed: drawn from the system (runs are not reproducible)
/// - Acquisition: [`AcquisitionFunction::ucb`] with `kappa = 2.576`
/// - Kappa decay: none
/// - Kernel: [`Kernel::Matern52`], noise variance `1e-6`, hyperparameters
///   re-estimated after every new observation
/// - Acquisition optimizer: [`AcquisitionOptimizer::new`]
/// - Bounds transformer: none
///
/// # Examples
///
/// ```
/// use bayes_opt::prelude::*;
///
/// let objective = |p: &ParamMap| -> Result<f64, Error> { Ok(p["a"] - p["b"]) };
/// let optimizer = BayesianOptimization::builder(
///     objective,
///     Bounds::from([("a", (0.0, 1.0)), ("b", (0.0, 1.0))]),
/// )
/// .seed(42)
/// .acquisition(AcquisitionFunction::ucb(5.0))
/// .kappa_decay(KappaDecay::new(0.95, 5))
/// .kernel(Kernel::SquaredExponential)
/// .bounds_transformer(DomainReduction::new())
/// .build()?;
///
/// assert_eq!(optimizer.keys(), ["a", "b"]);
/// # Ok::<_, Error>(())
/// ```
pub struct BayesianOptimizationBuilder<O: Objective> {
    objective: O,
    bounds: Bounds,
    seed: Option<u64>,
    acquisition: Option<AcquisitionFunction>,
    kappa_decay: Option<KappaDecay>,
    kernel: Option<Kernel>,
    hyperparameters: Option<Hyperparameters>,
    noise_variance: Option<f64>,
    refit_interval: Option<usize>,
    acquisition_optimizer: Option<AcquisitionOptimizer>,
    bounds_transformer: Option<Box<dyn BoundsTransformer>>,
}

impl<O: Objective> BayesianOptimizationBuilder<O> {
    pub(super) fn new(objective: O, bounds: Bounds) -> Self {
        Self {
            objective,
            bounds,
            seed: None,
            acquisition: None,
            kappa_decay: None,
            kernel: None,
            hyperparameters: None,
            noise_variance: None,
            refit_interval: None,
            acquisition_optimizer: None,
            bounds_transformer: None,
        }
    }

    /// Seeds the random generator; the same seed reproduces the same run.
    #[must_use]
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Sets the acquisition function.
    #[must_use]
    pub fn acquisition(mut self, acquisition: AcquisitionFunction) -> Self {
        self.acquisition = Some(acquisition);
        self
    }

    /// Sets the UCB kappa decay schedule.
    #[must_use]
    pub fn kappa_decay(mut self, decay: KappaDecay) -> Self {
        self.kappa_decay = Some(decay);
        self
    }

    /// Sets the surrogate's covariance kernel.
    #[must_use]
    pub fn kernel(mut self, kernel: Kernel) -> Self {
        self.kernel = Some(kernel);
        self
    }

    /// Sets the surrogate's initial kernel hyperparameters.
    ///
    /// Combined with `refit_interval(0)` they stay fixed for the whole run.
    #[must_use]
    pub fn hyperparameters(mut self, hyper: Hyperparameters) -> Self {
        self.hyperparameters = Some(hyper);
        self
    }

    /// Sets the surrogate's observation noise variance.
    #[must_use]
    pub fn noise_variance(mut self, v: f64) -> Self {
        self.noise_variance = Some(v);
        self
    }

    /// Sets how many new observations trigger a hyperparameter
    /// re-estimation. `0` keeps the initial hyperparameters.
    #[must_use]
    pub fn refit_interval(mut self, n: usize) -> Self {
        self.refit_interval = Some(n);
        self
    }

    /// Sets the acquisition optimizer.
    #[must_use]
    pub fn acquisition_optimizer(mut self, optimizer: AcquisitionOptimizer) -> Self {
        self.acquisition_optimizer = Some(optimizer);
        self
    }

    /// Sets a transformer that updates the bounds after every model-guided
    /// iteration, such as [`DomainReduction`](crate::DomainReduction).
    #[must_use]
    pub fn bounds_transformer(mut self, transformer: impl BoundsTransformer + 'static) -> Self {
        self.bounds_transformer = Some(Box::new(transformer));
        self
    }

    /// Builds the optimizer.
    ///
    /// # Errors
    ///
    /// [`Error::EmptyBounds`](crate::Error::EmptyBounds) or
    /// [`Error::InvalidBounds`](crate::Error::InvalidBounds) for unusable
    /// bounds.
    pub fn build(self) -> Result<BayesianOptimization<O>> {
        let space = ParameterSpace::new(self.bounds)?;

        let mut model = GaussianProcess::builder();
        if let Some(kernel) = self.kernel {
            model = model.kernel(kernel);
        }
        if let Some(hyper) = self.hyperparameters {
            model = model.hyperparameters(hyper);
        }
        if let Some(v) = self.noise_variance {
            model = model.noise_variance(v);
        }
        if let Some(n) = self.refit_interval {
            model = model.refit_interval(n);
        }

        let mut bounds_transformer = self.bounds_transformer;
        if let Some(transformer) = bounds_transformer.as_mut() {
            transformer.initialize(&space);
        }

        Ok(BayesianOptimization {
            objective: self.objective,
            space,
            rng: self
                .seed
                .map_or_else(fastrand::Rng::new, fastrand::Rng::with_seed),
            model: model.build(),
            acquisition: self.acquisition.unwrap_or_default(),
            kappa_decay: self.kappa_decay.unwrap_or_default(),
            acq_optimizer: self.acquisition_optimizer.unwrap_or_default(),
            bounds_transformer,
            queue: VecDeque::new(),
            dispatcher: Dispatcher::default(),
            state: OptimizerState::Idle,
            iteration: 0,
            fitted_revision: None,
            latest: None,
        })
    }
}
