//! Type-II maximum likelihood estimation of kernel hyperparameters.
//!
//! The search runs over `θ = (ln l_1, …, ln l_d, ln σ²)` with a bounded
//! compass (pattern) search: try ± `step` along each coordinate, accept the
//! first improvement, halve the step when a full sweep finds none. It is
//! derivative-free and fully deterministic, so re-estimation never disturbs
//! the reproducibility of a seeded run.

use core::f64::consts::PI;

use nalgebra::DVector;
use nalgebra::linalg::Cholesky;

use super::kernel::{Hyperparameters, Kernel, kernel_matrix};

/// Upper bound on likelihood evaluations per estimation.
const MAX_EVALS: usize = 400;
/// Initial compass step in log space.
const INITIAL_STEP: f64 = 1.0;
/// Search stops once the step falls below this.
const MIN_STEP: f64 = 1e-3;
/// Length-scale box relative to each dimension's data spread.
const LENGTH_SCALE_RANGE: (f64, f64) = (1e-3, 1e3);
/// Signal-variance box (targets are standardized).
const SIGNAL_VARIANCE_RANGE: (f64, f64) = (1e-2, 1e2);
/// Jitter added during estimation so that near-singular trial settings
/// are scored instead of rejected outright.
const ESTIMATION_JITTER: f64 = 1e-10;

/// Log marginal likelihood of standardized targets `y` under `hyper`.
///
/// Returns `None` when the kernel matrix cannot be factorized or the value
/// is not finite.
#[allow(clippy::cast_precision_loss)]
pub(crate) fn log_marginal_likelihood(
    kernel: Kernel,
    x: &[Vec<f64>],
    y: &[f64],
    hyper: &Hyperparameters,
    diag: f64,
) -> Option<f64> {
    let k = kernel_matrix(kernel, x, hyper, diag);
    let cholesky = Cholesky::new(k)?;
    let y_vec = DVector::from_column_slice(y);
    let alpha = cholesky.solve(&y_vec);
    let log_det_half: f64 = cholesky
        .l_dirty()
        .diagonal()
        .iter()
        .map(|v| v.ln())
        .sum();
    let n = y.len() as f64;
    let lml = -0.5 * y_vec.dot(&alpha) - log_det_half - 0.5 * n * (2.0 * PI).ln();
    lml.is_finite().then_some(lml)
}

/// Per-dimension spread of the training inputs, `1.0` where it is zero.
pub(crate) fn input_spread(x: &[Vec<f64>], dim: usize) -> Vec<f64> {
    (0..dim)
        .map(|j| {
            let (lo, hi) = x
                .iter()
                .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), row| {
                    (lo.min(row[j]), hi.max(row[j]))
                });
            let spread = hi - lo;
            if spread.is_finite() && spread > 0.0 {
                spread
            } else {
                1.0
            }
        })
        .collect()
}

/// Maximizes the log marginal likelihood starting from `start`.
///
/// Returns `None` if not a single setting could be scored; callers then keep
/// their previous hyperparameters.
pub(crate) fn estimate(
    kernel: Kernel,
    x: &[Vec<f64>],
    y: &[f64],
    noise_variance: f64,
    start: &Hyperparameters,
) -> Option<(Hyperparameters, f64)> {
    let dim = start.length_scales.len();
    let spread = input_spread(x, dim);

    let mut lower = Vec::with_capacity(dim + 1);
    let mut upper = Vec::with_capacity(dim + 1);
    for s in &spread {
        lower.push((s * LENGTH_SCALE_RANGE.0).ln());
        upper.push((s * LENGTH_SCALE_RANGE.1).ln());
    }
    lower.push(SIGNAL_VARIANCE_RANGE.0.ln());
    upper.push(SIGNAL_VARIANCE_RANGE.1.ln());

    let mut theta: Vec<f64> = start
        .length_scales
        .iter()
        .chain(core::iter::once(&start.signal_variance))
        .map(|v| v.ln())
        .zip(lower.iter().zip(&upper))
        .map(|(t, (&lo, &hi))| {
            if t.is_finite() {
                t.clamp(lo, hi)
            } else {
                0.5 * (lo + hi)
            }
        })
        .collect();

    let diag = noise_variance + ESTIMATION_JITTER;
    let score = |theta: &[f64]| log_marginal_likelihood(kernel, x, y, &from_log(theta), diag);

    let mut best = score(&theta)?;
    let mut evals = 1;
    let mut step = INITIAL_STEP;

    'search: while step >= MIN_STEP {
        let mut improved = false;
        for i in 0..theta.len() {
            for direction in [1.0, -1.0] {
                let mut candidate = theta.clone();
                candidate[i] = (candidate[i] + direction * step).clamp(lower[i], upper[i]);
                if candidate[i] == theta[i] {
                    continue;
                }
                evals += 1;
                if let Some(value) = score(&candidate)
                    && value > best
                {
                    theta = candidate;
                    best = value;
                    improved = true;
                    break;
                }
                if evals >= MAX_EVALS {
                    break 'search;
                }
            }
        }
        if !improved {
            step *= 0.5;
        }
    }

    Some((from_log(&theta), best))
}

fn from_log(theta: &[f64]) -> Hyperparameters {
    let (signal, scales) = theta.split_last().map_or((0.0, theta), |(s, l)| (*s, l));
    Hyperparameters {
        length_scales: scales.iter().map(|v| v.exp()).collect(),
        signal_variance: signal.exp(),
    }
}
