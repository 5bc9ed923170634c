//! Continuous maximization of the acquisition surface.
//!
//! The surface is non-convex, so the search combines two strategies:
//!
//! 1. **Warm-up** — `n_warmup` uniform random candidates are scored and the
//!    best is kept. This is the fallback floor.
//! 2. **Local refinement** — projected gradient ascent (central finite
//!    differences, backtracking step, clipping onto the bounds) from the
//!    warm-up best and from `n_restarts` fresh random starts.
//!
//! The best point across all candidates wins, ties going to the first one
//! found. Local runs that hit a model error are discarded; if nothing could
//! be scored at all, a plain random sample is returned, so a suggestion is
//! always produced.

use crate::acquisition::AcquisitionFunction;
use crate::error::Result;
use crate::gp::GaussianProcess;
use crate::space::{self, ParameterSpace};

/// Default number of random warm-up candidates.
const DEFAULT_N_WARMUP: usize = 10_000;
/// Default number of random starts for local refinement.
const DEFAULT_N_RESTARTS: usize = 10;
/// Default iteration cap per local run.
const DEFAULT_MAX_LOCAL_ITERS: usize = 50;
/// Default gradient-norm threshold for stopping a local run.
const DEFAULT_TOLERANCE: f64 = 1e-9;

/// Finite-difference step in unit-cube coordinates.
const FD_STEP: f64 = 1e-6;
/// Initial line-search step in unit-cube coordinates.
const INITIAL_STEP: f64 = 0.1;
/// Smallest line-search step tried before giving up.
const MIN_STEP: f64 = 1e-9;

/// A scored candidate point.
#[derive(Clone, Debug, PartialEq)]
pub struct Candidate {
    /// Coordinates in canonical key order, inside the current bounds.
    pub point: Vec<f64>,
    /// Acquisition value, `-inf` if the point could not be scored.
    pub score: f64,
}

/// Finds the point maximizing an acquisition function within the bounds.
///
/// # Examples
///
/// ```
/// use bayes_opt::acquisition::AcquisitionOptimizer;
///
/// let optimizer = AcquisitionOptimizer::builder()
///     .n_warmup(2_000)
///     .n_restarts(5)
///     .build();
/// assert_eq!(optimizer.n_restarts(), 5);
/// ```
#[derive(Clone, Debug)]
pub struct AcquisitionOptimizer {
    n_warmup: usize,
    n_restarts: usize,
    max_local_iters: usize,
    tolerance: f64,
}

impl AcquisitionOptimizer {
    /// Creates an optimizer with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::builder().build()
    }

    /// Creates a builder for configuring an `AcquisitionOptimizer`.
    #[must_use]
    pub fn builder() -> AcquisitionOptimizerBuilder {
        AcquisitionOptimizerBuilder::new()
    }

    /// Number of random warm-up candidates.
    #[must_use]
    pub fn n_warmup(&self) -> usize {
        self.n_warmup
    }

    /// Number of random starting points for local refinement.
    #[must_use]
    pub fn n_restarts(&self) -> usize {
        self.n_restarts
    }

    /// Returns the best point found for `acquisition` under `model`.
    ///
    /// Every random draw comes from `rng`, via
    /// [`ParameterSpace::random_sample`], and the result always lies within
    /// the space's current bounds.
    pub fn maximize(
        &self,
        acquisition: &AcquisitionFunction,
        model: &GaussianProcess,
        space: &ParameterSpace,
        y_max: f64,
        rng: &mut fastrand::Rng,
    ) -> Candidate {
        let intervals = space.intervals();
        let score = |x: &[f64]| acquisition.score(x, model, y_max);

        let mut best: Option<Candidate> = None;

        for _ in 0..self.n_warmup {
            let point = space.random_sample(rng);
            if let Ok(value) = score(&point)
                && !value.is_nan()
            {
                consider(
                    &mut best,
                    Candidate {
                        point,
                        score: value,
                    },
                );
            }
        }

        let mut starts = Vec::with_capacity(self.n_restarts + 1);
        if let Some(b) = &best {
            starts.push(b.point.clone());
        }
        starts.extend((0..self.n_restarts).map(|_| space.random_sample(rng)));

        let mut local_failures = 0usize;
        for start in starts {
            match self.local_ascent(&score, start, intervals) {
                Ok(candidate) => consider(&mut best, candidate),
                Err(_) => local_failures += 1,
            }
        }
        if local_failures > 0 {
            trace_debug!(local_failures, "local acquisition searches failed");
        }

        match best {
            Some(mut candidate) => {
                space.clip(&mut candidate.point);
                candidate
            }
            None => {
                trace_warn!("no candidate could be scored, falling back to a random point");
                Candidate {
                    point: space.random_sample(rng),
                    score: f64::NEG_INFINITY,
                }
            }
        }
    }

    /// Projected gradient ascent in unit-cube coordinates.
    fn local_ascent<F>(&self, f: &F, start: Vec<f64>, intervals: &[(f64, f64)]) -> Result<Candidate>
    where
        F: Fn(&[f64]) -> Result<f64>,
    {
        let to_unit = |x: &[f64]| -> Vec<f64> {
            x.iter()
                .zip(intervals)
                .map(|(&v, &(lo, hi))| ((v - lo) / (hi - lo)).clamp(0.0, 1.0))
                .collect()
        };
        let from_unit = |u: &[f64]| -> Vec<f64> {
            let mut x: Vec<f64> = u
                .iter()
                .zip(intervals)
                .map(|(&v, &(lo, hi))| lo + v * (hi - lo))
                .collect();
            space::clip_to(&mut x, intervals);
            x
        };
        let eval = |u: &[f64]| -> Result<f64> {
            let value = f(&from_unit(u))?;
            if value.is_nan() {
                return Ok(f64::NEG_INFINITY);
            }
            Ok(value)
        };

        let mut u = to_unit(&start);
        let mut fu = eval(&u)?;
        let mut step = INITIAL_STEP;

        for _ in 0..self.max_local_iters {
            let mut grad = gradient(&eval, &u)?;
            for (g, &ui) in grad.iter_mut().zip(&u) {
                if (ui <= 0.0 && *g < 0.0) || (ui >= 1.0 && *g > 0.0) {
                    *g = 0.0;
                }
            }
            let norm = grad.iter().map(|g| g * g).sum::<f64>().sqrt();
            if !norm.is_finite() || norm < self.tolerance {
                break;
            }

            let mut moved = false;
            while step >= MIN_STEP {
                let trial: Vec<f64> = u
                    .iter()
                    .zip(&grad)
                    .map(|(&ui, &gi)| (ui + step * gi / norm).clamp(0.0, 1.0))
                    .collect();
                let f_trial = eval(&trial)?;
                if f_trial > fu {
                    u = trial;
                    fu = f_trial;
                    step = (step * 2.0).min(1.0);
                    moved = true;
                    break;
                }
                step *= 0.5;
            }
            if !moved {
                break;
            }
        }

        Ok(Candidate {
            point: from_unit(&u),
            score: fu,
        })
    }
}

impl Default for AcquisitionOptimizer {
    fn default() -> Self {
        Self::new()
    }
}

/// Keeps `candidate` if it beats the current best; ties keep the earlier one.
fn consider(best: &mut Option<Candidate>, candidate: Candidate) {
    if best.as_ref().is_none_or(|b| candidate.score > b.score) {
        *best = Some(candidate);
    }
}

/// Central-difference gradient, one-sided where a bound is in the way.
fn gradient<F>(f: &F, u: &[f64]) -> Result<Vec<f64>>
where
    F: Fn(&[f64]) -> Result<f64>,
{
    let mut shifted = u.to_vec();
    let mut grad = Vec::with_capacity(u.len());
    for i in 0..u.len() {
        let plus = (u[i] + FD_STEP).min(1.0);
        let minus = (u[i] - FD_STEP).max(0.0);
        shifted[i] = plus;
        let f_plus = f(&shifted)?;
        shifted[i] = minus;
        let f_minus = f(&shifted)?;
        shifted[i] = u[i];
        grad.push((f_plus - f_minus) / (plus - minus));
    }
    Ok(grad)
}

/// Builder for configuring an [`AcquisitionOptimizer`].
///
/// Defaults:
/// - `n_warmup`: 10 000
/// - `n_restarts`: 10
/// - `max_local_iters`: 50
/// - `tolerance`: 1e-9
#[derive(Clone, Debug, Default)]
pub struct AcquisitionOptimizerBuilder {
    n_warmup: Option<usize>,
    n_restarts: Option<usize>,
    max_local_iters: Option<usize>,
    tolerance: Option<f64>,
}

impl AcquisitionOptimizerBuilder {
    /// Creates a new builder with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the number of random warm-up candidates.
    #[must_use]
    pub fn n_warmup(mut self, n: usize) -> Self {
        self.n_warmup = Some(n);
        self
    }

    /// Sets the number of random starts for local refinement.
    #[must_use]
    pub fn n_restarts(mut self, n: usize) -> Self {
        self.n_restarts = Some(n);
        self
    }

    /// Sets the iteration cap of each local run.
    #[must_use]
    pub fn max_local_iters(mut self, n: usize) -> Self {
        self.max_local_iters = Some(n);
        self
    }

    /// Sets the gradient-norm threshold that ends a local run.
    #[must_use]
    pub fn tolerance(mut self, tol: f64) -> Self {
        self.tolerance = Some(tol);
        self
    }

    /// Builds the configured [`AcquisitionOptimizer`].
    #[must_use]
    pub fn build(self) -> AcquisitionOptimizer {
        AcquisitionOptimizer {
            n_warmup: self.n_warmup.unwrap_or(DEFAULT_N_WARMUP),
            n_restarts: self.n_restarts.unwrap_or(DEFAULT_N_RESTARTS),
            max_local_iters: self.max_local_iters.unwrap_or(DEFAULT_MAX_LOCAL_ITERS),
            tolerance: self.tolerance.unwrap_or(DEFAULT_TOLERANCE),
        }
    }
}
