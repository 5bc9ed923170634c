//! Acquisition functions scoring candidates under the GP posterior.

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::gp::{GaussianProcess, Prediction};

/// Default UCB exploration weight.
pub const DEFAULT_KAPPA: f64 = 2.576;
/// Default EI / PI improvement margin.
pub const DEFAULT_XI: f64 = 0.0;

/// Scores how promising a candidate is, from the posterior mean and
/// standard deviation at that point.
///
/// All variants are maximized. With `y*` the best target observed so far and
/// `z = (μ - y* - ξ) / σ`:
///
/// | Variant | Score |
/// |---------|-------|
/// | `UpperConfidenceBound` | `μ + κ σ` |
/// | `ExpectedImprovement` | `(μ - y* - ξ) Φ(z) + σ φ(z)` |
/// | `ProbabilityOfImprovement` | `Φ(z)` |
///
/// When `σ` is zero (the candidate coincides with a training point) EI and
/// PI are exactly `0.0`.
///
/// # Examples
///
/// ```
/// use bayes_opt::AcquisitionFunction;
/// use bayes_opt::gp::Prediction;
///
/// let ucb = AcquisitionFunction::ucb(2.0);
/// let p = Prediction { mean: 1.0, std: 0.5 };
/// assert_eq!(ucb.evaluate(p, 0.0), 2.0);
///
/// let ei = AcquisitionFunction::ei(0.0);
/// assert_eq!(ei.evaluate(Prediction { mean: 3.0, std: 0.0 }, 1.0), 0.0);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum AcquisitionFunction {
    /// Optimistic bound `μ + κ σ`; larger `kappa` explores more.
    UpperConfidenceBound {
        /// Exploration weight.
        kappa: f64,
    },
    /// Expected amount by which a candidate beats the incumbent.
    ExpectedImprovement {
        /// Improvement margin; larger values explore more.
        xi: f64,
    },
    /// Probability that a candidate beats the incumbent.
    ProbabilityOfImprovement {
        /// Improvement margin; larger values explore more.
        xi: f64,
    },
}

impl AcquisitionFunction {
    /// Upper confidence bound with the given `kappa`.
    #[must_use]
    pub fn ucb(kappa: f64) -> Self {
        Self::UpperConfidenceBound { kappa }
    }

    /// Expected improvement with the given `xi`.
    #[must_use]
    pub fn ei(xi: f64) -> Self {
        Self::ExpectedImprovement { xi }
    }

    /// Probability of improvement with the given `xi`.
    #[must_use]
    pub fn poi(xi: f64) -> Self {
        Self::ProbabilityOfImprovement { xi }
    }

    /// Score for an already computed posterior prediction.
    #[must_use]
    pub fn evaluate(&self, prediction: Prediction, y_max: f64) -> f64 {
        let Prediction { mean, std } = prediction;
        match *self {
            Self::UpperConfidenceBound { kappa } => mean + kappa * std,
            Self::ExpectedImprovement { xi } => {
                if std <= 0.0 {
                    return 0.0;
                }
                let improvement = mean - y_max - xi;
                let z = improvement / std;
                improvement * norm_cdf(z) + std * norm_pdf(z)
            }
            Self::ProbabilityOfImprovement { xi } => {
                if std <= 0.0 {
                    return 0.0;
                }
                norm_cdf((mean - y_max - xi) / std)
            }
        }
    }

    /// Score at `x` under `model`.
    ///
    /// # Errors
    ///
    /// Propagates prediction errors from the model
    /// ([`ModelNotFitted`](crate::Error::ModelNotFitted),
    /// [`DimensionMismatch`](crate::Error::DimensionMismatch)).
    pub fn score(&self, x: &[f64], model: &GaussianProcess, y_max: f64) -> Result<f64> {
        Ok(self.evaluate(model.predict(x)?, y_max))
    }

    /// Multiplies UCB's `kappa` by `factor`. Other variants are unchanged.
    pub fn decay_kappa(&mut self, factor: f64) {
        if let Self::UpperConfidenceBound { kappa } = self {
            *kappa *= factor;
        }
    }
}

impl Default for AcquisitionFunction {
    fn default() -> Self {
        Self::ucb(DEFAULT_KAPPA)
    }
}

/// Schedule shrinking UCB's `kappa` over the course of a run.
///
/// After `delay` iterations, `kappa` is multiplied by `factor` once per
/// iteration. A factor of `1.0` disables the schedule.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct KappaDecay {
    /// Multiplier applied per iteration, in `(0, 1]`.
    pub factor: f64,
    /// Number of iterations before decay starts.
    pub delay: usize,
}

impl KappaDecay {
    /// Creates a schedule.
    #[must_use]
    pub fn new(factor: f64, delay: usize) -> Self {
        Self { factor, delay }
    }

    /// Applies one iteration's worth of decay, given the number of
    /// iterations completed so far.
    pub fn apply(&self, acquisition: &mut AcquisitionFunction, iteration: usize) {
        if self.factor < 1.0 && iteration > self.delay {
            acquisition.decay_kappa(self.factor);
        }
    }
}

impl Default for KappaDecay {
    fn default() -> Self {
        Self::new(1.0, 0)
    }
}

// ---------------------------------------------------------------------------
// Normal distribution helpers (Abramowitz-Stegun approximation)
// ---------------------------------------------------------------------------

/// Standard normal PDF.
pub(crate) fn norm_pdf(x: f64) -> f64 {
    const INV_SQRT_2PI: f64 = 0.398_942_280_401_432_7;
    INV_SQRT_2PI * (-0.5 * x * x).exp()
}

/// Polynomial coefficients `b1..b5` of Abramowitz-Stegun 26.2.17.
const CDF_COEFFS: [f64; 5] = [
    0.319_381_530,
    -0.356_563_782,
    1.781_477_937,
    -1.821_255_978,
    1.330_274_429,
];

/// Standard normal CDF (Abramowitz-Stegun 26.2.17, |error| < 7.5e-8).
pub(crate) fn norm_cdf(x: f64) -> f64 {
    if x < -8.0 {
        return 0.0;
    }
    if x > 8.0 {
        return 1.0;
    }

    let abs_x = x.abs();
    let t = 1.0 / (1.0 + 0.231_641_9 * abs_x);
    let poly = t * CDF_COEFFS.iter().rev().fold(0.0, |acc, c| c + t * acc);
    let upper = norm_pdf(abs_x) * poly;

    if x >= 0.0 { 1.0 - upper } else { upper }
}
