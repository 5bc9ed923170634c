//! Gaussian Process regression surrogate.
//!
//! The model standardizes targets (zero mean, unit variance), builds the
//! kernel matrix `K + (σ_n² + jitter) I` over all training points, and keeps
//! its Cholesky factor for posterior inference:
//!
//! - mean: `μ(x*) = k*ᵀ α` with `α = (K + σ_n² I)⁻¹ y`
//! - variance: `σ²(x*) = k(x*, x*) - k*ᵀ (K + σ_n² I)⁻¹ k*`
//!
//! # Numerical policy
//!
//! If the factorization fails, it is retried with jitter starting at `1e-10`
//! and growing a hundredfold per attempt. After [`MAX_JITTER_ATTEMPTS`]
//! attempts the fit fails with [`Error::IllConditionedModel`].
//!
//! Negative posterior variance from round-off is clamped to zero. At a
//! training point (within [`DUPLICATE_TOLERANCE`] on every coordinate) the
//! standard deviation is reported as exactly `0.0`.
//!
//! # Hyperparameters
//!
//! Length scales and signal variance are re-estimated by maximizing the log
//! marginal likelihood every `refit_interval` new training points. When
//! estimation fails the last known-good values are kept.
//!
//! # Examples
//!
//! ```
//! use bayes_opt::gp::GaussianProcess;
//!
//! let mut gp = GaussianProcess::new();
//! gp.set_training_data(vec![vec![0.0], vec![1.0], vec![2.0]], vec![0.0, 1.0, 0.0])?;
//! gp.fit()?;
//!
//! let at_data = gp.predict(&[1.0])?;
//! assert!((at_data.mean - 1.0).abs() < 1e-3);
//! assert_eq!(at_data.std, 0.0);
//!
//! let between = gp.predict(&[1.5])?;
//! assert!(between.std > 0.0);
//! # Ok::<_, bayes_opt::Error>(())
//! ```

mod kernel;
mod likelihood;

use core::fmt;

use nalgebra::DVector;
use nalgebra::linalg::Cholesky;

pub use kernel::{Hyperparameters, Kernel};

use crate::error::{Error, Result};
use crate::space::DUPLICATE_TOLERANCE;

/// Maximum number of factorization attempts per fit.
pub const MAX_JITTER_ATTEMPTS: usize = 6;
/// Jitter used on the first retry.
const INITIAL_JITTER: f64 = 1e-10;
/// Jitter growth factor between retries.
const JITTER_GROWTH: f64 = 100.0;

/// Default observation noise variance.
const DEFAULT_NOISE_VAR: f64 = 1e-6;
/// Default number of new points between hyperparameter re-estimations.
const DEFAULT_REFIT_INTERVAL: usize = 1;

/// Posterior predictive distribution at a single point.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Prediction {
    /// Posterior mean, in target units.
    pub mean: f64,
    /// Posterior standard deviation, in target units. Never negative.
    pub std: f64,
}

/// Cached factorization and weights for the current training set.
#[derive(Clone, Debug)]
struct Posterior {
    /// Cholesky factor of `K + (σ_n² + jitter) I`.
    cholesky: Cholesky<f64, nalgebra::Dyn>,
    /// `α = (K + (σ_n² + jitter) I)⁻¹ y_standardized`.
    alpha: DVector<f64>,
    y_mean: f64,
    y_std: f64,
    log_marginal_likelihood: f64,
}

/// Gaussian Process regression model.
///
/// Owns its training set. Replacing the data with
/// [`set_training_data`](Self::set_training_data) drops the cached
/// factorization; [`fit`](Self::fit) rebuilds it.
#[derive(Clone)]
pub struct GaussianProcess {
    kernel: Kernel,
    noise_variance: f64,
    refit_interval: usize,
    /// Last known-good hyperparameters.
    hyper: Option<Hyperparameters>,
    x_train: Vec<Vec<f64>>,
    y_train: Vec<f64>,
    /// Training-set size when hyperparameters were last estimated.
    n_at_estimate: usize,
    posterior: Option<Posterior>,
}

impl GaussianProcess {
    /// Creates a model with a Matérn 5/2 kernel and default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::builder().build()
    }

    /// Creates a builder for configuring a `GaussianProcess`.
    #[must_use]
    pub fn builder() -> GaussianProcessBuilder {
        GaussianProcessBuilder::new()
    }

    /// The kernel in use.
    #[must_use]
    pub fn kernel(&self) -> Kernel {
        self.kernel
    }

    /// Observation noise variance added to the kernel diagonal.
    #[must_use]
    pub fn noise_variance(&self) -> f64 {
        self.noise_variance
    }

    /// Current hyperparameters, if any have been set or estimated.
    #[must_use]
    pub fn hyperparameters(&self) -> Option<&Hyperparameters> {
        self.hyper.as_ref()
    }

    /// Number of training points.
    #[must_use]
    pub fn n_train(&self) -> usize {
        self.y_train.len()
    }

    /// Returns `true` if a factorization for the current data is cached.
    #[must_use]
    pub fn is_fitted(&self) -> bool {
        self.posterior.is_some()
    }

    /// Log marginal likelihood of the fitted model.
    #[must_use]
    pub fn log_marginal_likelihood(&self) -> Option<f64> {
        self.posterior.as_ref().map(|p| p.log_marginal_likelihood)
    }

    /// Replaces the training set and invalidates the cached factorization.
    ///
    /// # Errors
    ///
    /// [`Error::DimensionMismatch`] if `x` and `y` differ in length or the
    /// rows of `x` differ in width, [`Error::NonFinite`] for NaN/inf values.
    pub fn set_training_data(&mut self, x: Vec<Vec<f64>>, y: Vec<f64>) -> Result<()> {
        if x.len() != y.len() {
            return Err(Error::DimensionMismatch {
                expected: x.len(),
                got: y.len(),
            });
        }
        if let Some(width) = x.first().map(Vec::len)
            && let Some(row) = x.iter().find(|r| r.len() != width)
        {
            return Err(Error::DimensionMismatch {
                expected: width,
                got: row.len(),
            });
        }
        if x.iter().flatten().chain(&y).any(|v| !v.is_finite()) {
            return Err(Error::NonFinite("training data"));
        }
        if let Some(h) = &self.hyper
            && x.first().is_some_and(|r| r.len() != h.length_scales.len())
        {
            self.hyper = None;
        }
        if y.len() < self.n_at_estimate {
            self.n_at_estimate = 0;
        }

        self.x_train = x;
        self.y_train = y;
        self.posterior = None;
        Ok(())
    }

    /// Factorizes the kernel matrix over the current training set.
    ///
    /// A no-op when the cached factorization is still valid, so repeated
    /// calls with unchanged data give identical results.
    ///
    /// # Errors
    ///
    /// [`Error::NoObservations`] without training data,
    /// [`Error::IllConditionedModel`] if every jitter attempt fails.
    #[allow(clippy::cast_precision_loss)]
    pub fn fit(&mut self) -> Result<()> {
        if self.posterior.is_some() {
            return Ok(());
        }
        let n = self.y_train.len();
        if n == 0 {
            return Err(Error::NoObservations);
        }

        let (y_mean, y_std) = standardization(&self.y_train);
        let y_standardized: Vec<f64> = self
            .y_train
            .iter()
            .map(|&y| (y - y_mean) / y_std)
            .collect();

        let dim = self.x_train[0].len();
        let mut hyper = self.hyper.clone().unwrap_or_else(|| Hyperparameters {
            length_scales: likelihood::input_spread(&self.x_train, dim),
            signal_variance: 1.0,
        });

        let due = self.refit_interval > 0
            && n >= 2
            && (self.hyper.is_none() || n >= self.n_at_estimate + self.refit_interval);
        if due {
            let estimated = likelihood::estimate(
                self.kernel,
                &self.x_train,
                &y_standardized,
                self.noise_variance,
                &hyper,
            );
            hyper = self.accept_estimate(n, hyper, estimated);
        }

        let posterior = factorize(
            self.kernel,
            &self.x_train,
            &y_standardized,
            &hyper,
            self.noise_variance,
        )?;
        self.posterior = Some(Posterior {
            y_mean,
            y_std,
            ..posterior
        });
        self.hyper = Some(hyper);
        Ok(())
    }

    /// Posterior mean and standard deviation at `x`.
    ///
    /// # Errors
    ///
    /// [`Error::ModelNotFitted`] before a successful [`fit`](Self::fit),
    /// [`Error::DimensionMismatch`] if `x` has the wrong length.
    pub fn predict(&self, x: &[f64]) -> Result<Prediction> {
        let (Some(posterior), Some(hyper)) = (&self.posterior, &self.hyper) else {
            return Err(Error::ModelNotFitted);
        };
        if x.len() != hyper.length_scales.len() {
            return Err(Error::DimensionMismatch {
                expected: hyper.length_scales.len(),
                got: x.len(),
            });
        }

        let k_star = kernel::kernel_vector(self.kernel, x, &self.x_train, hyper);
        let mean = k_star.dot(&posterior.alpha);

        let k_self = self.kernel.eval(x, x, hyper);
        let v = posterior.cholesky.solve(&k_star);
        let var = if self.is_training_point(x) {
            0.0
        } else {
            (k_self - k_star.dot(&v)).max(0.0)
        };

        Ok(Prediction {
            mean: posterior.y_mean + posterior.y_std * mean,
            std: posterior.y_std * var.sqrt(),
        })
    }

    fn is_training_point(&self, x: &[f64]) -> bool {
        self.x_train
            .iter()
            .any(|row| row.iter().zip(x).all(|(a, b)| (a - b).abs() <= DUPLICATE_TOLERANCE))
    }

    /// Adopts `estimated` if re-estimation succeeded, else keeps `current`.
    ///
    /// A failed estimation leaves the estimate counter alone so the next fit
    /// tries again.
    fn accept_estimate(
        &mut self,
        n: usize,
        current: Hyperparameters,
        estimated: Option<(Hyperparameters, f64)>,
    ) -> Hyperparameters {
        match estimated {
            Some((estimated, lml)) => {
                trace_debug!(n_train = n, lml, "re-estimated kernel hyperparameters");
                #[cfg(not(feature = "tracing"))]
                let _ = lml;
                self.n_at_estimate = n;
                estimated
            }
            None => {
                trace_warn!(
                    n_train = n,
                    "hyperparameter estimation failed, keeping previous values"
                );
                current
            }
        }
    }
}

impl Default for GaussianProcess {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for GaussianProcess {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GaussianProcess")
            .field("kernel", &self.kernel)
            .field("noise_variance", &self.noise_variance)
            .field("hyperparameters", &self.hyper)
            .field("n_train", &self.y_train.len())
            .field("fitted", &self.posterior.is_some())
            .finish_non_exhaustive()
    }
}

/// Builder for configuring a [`GaussianProcess`].
///
/// Defaults:
/// - `kernel`: [`Kernel::Matern52`]
/// - `noise_variance`: 1e-6
/// - `refit_interval`: 1 (re-estimate on every new point; 0 disables)
/// - `hyperparameters`: derived from the data spread
///
/// # Examples
///
/// ```
/// use bayes_opt::gp::{GaussianProcess, Hyperparameters, Kernel};
///
/// let gp = GaussianProcess::builder()
///     .kernel(Kernel::SquaredExponential)
///     .noise_variance(1e-4)
///     .hyperparameters(Hyperparameters::isotropic(2, 0.3, 1.0))
///     .refit_interval(0)
///     .build();
/// assert_eq!(gp.kernel(), Kernel::SquaredExponential);
/// ```
#[derive(Clone, Debug, Default)]
pub struct GaussianProcessBuilder {
    kernel: Option<Kernel>,
    noise_variance: Option<f64>,
    refit_interval: Option<usize>,
    hyperparameters: Option<Hyperparameters>,
}

impl GaussianProcessBuilder {
    /// Creates a new builder with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the covariance kernel.
    #[must_use]
    pub fn kernel(mut self, kernel: Kernel) -> Self {
        self.kernel = Some(kernel);
        self
    }

    /// Sets the observation noise variance added to the kernel diagonal.
    ///
    /// Values are on standardized targets. Larger values make the model
    /// smoother and tolerate noisy objectives.
    #[must_use]
    pub fn noise_variance(mut self, v: f64) -> Self {
        self.noise_variance = Some(v);
        self
    }

    /// Sets how many new training points trigger a hyperparameter
    /// re-estimation. `0` keeps the hyperparameters fixed.
    #[must_use]
    pub fn refit_interval(mut self, n: usize) -> Self {
        self.refit_interval = Some(n);
        self
    }

    /// Sets the initial hyperparameters.
    #[must_use]
    pub fn hyperparameters(mut self, hyper: Hyperparameters) -> Self {
        self.hyperparameters = Some(hyper);
        self
    }

    /// Builds the configured [`GaussianProcess`].
    #[must_use]
    pub fn build(self) -> GaussianProcess {
        GaussianProcess {
            kernel: self.kernel.unwrap_or_default(),
            noise_variance: self
                .noise_variance
                .filter(|v| v.is_finite() && *v >= 0.0)
                .unwrap_or(DEFAULT_NOISE_VAR),
            refit_interval: self.refit_interval.unwrap_or(DEFAULT_REFIT_INTERVAL),
            hyper: self.hyperparameters,
            x_train: Vec::new(),
            y_train: Vec::new(),
            n_at_estimate: 0,
            posterior: None,
        }
    }
}

/// Mean and scale used to standardize targets.
///
/// A single target, or identical targets, use unit scale.
#[allow(clippy::cast_precision_loss)]
fn standardization(y: &[f64]) -> (f64, f64) {
    let n = y.len();
    let mean = y.iter().sum::<f64>() / n as f64;
    if n < 2 {
        return (mean, 1.0);
    }
    let var = y.iter().map(|&v| (v - mean).powi(2)).sum::<f64>() / n as f64;
    let std = var.sqrt();
    (mean, if std > 1e-12 { std } else { 1.0 })
}

/// Cholesky factorization with escalating jitter.
#[allow(clippy::cast_precision_loss)]
fn factorize(
    kernel: Kernel,
    x: &[Vec<f64>],
    y: &[f64],
    hyper: &Hyperparameters,
    noise_variance: f64,
) -> Result<Posterior> {
    let mut jitter = 0.0;
    for attempt in 0..MAX_JITTER_ATTEMPTS {
        let diag = noise_variance + jitter;
        let k = kernel::kernel_matrix(kernel, x, hyper, diag);
        if let Some(cholesky) = Cholesky::new(k) {
            let y_vec = DVector::from_column_slice(y);
            let alpha = cholesky.solve(&y_vec);
            if alpha.iter().all(|v| v.is_finite()) {
                let log_det_half: f64 = cholesky
                    .l_dirty()
                    .diagonal()
                    .iter()
                    .map(|v| v.ln())
                    .sum();
                let lml = -0.5 * y_vec.dot(&alpha)
                    - log_det_half
                    - 0.5 * y.len() as f64 * (2.0 * core::f64::consts::PI).ln();
                return Ok(Posterior {
                    cholesky,
                    alpha,
                    y_mean: 0.0,
                    y_std: 1.0,
                    log_marginal_likelihood: lml,
                });
            }
        }
        jitter = if attempt == 0 {
            INITIAL_JITTER
        } else {
            jitter * JITTER_GROWTH
        };
        trace_warn!(attempt, jitter, "kernel matrix factorization failed, retrying");
    }
    Err(Error::IllConditionedModel {
        attempts: MAX_JITTER_ATTEMPTS,
    })
}
