//! Stationary covariance kernels with ARD length scales.

use nalgebra::{DMatrix, DVector};
use serde::{Deserialize, Serialize};

/// √5, used by the Matérn 5/2 kernel.
const SQRT_5: f64 = 2.236_067_977_499_79;

/// Covariance function of the Gaussian Process.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Kernel {
    /// Matérn ν = 5/2: twice differentiable sample paths.
    ///
    /// `k(r) = σ² (1 + √5 r + 5/3 r²) exp(-√5 r)`
    #[default]
    Matern52,
    /// Squared exponential (RBF): infinitely smooth sample paths.
    ///
    /// `k(r) = σ² exp(-r² / 2)`
    SquaredExponential,
}

/// Kernel hyperparameters.
///
/// `r` in the kernel formulas is the ARD-scaled distance
/// `sqrt(Σ ((x1_i - x2_i) / l_i)²)`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Hyperparameters {
    /// One length scale per input dimension.
    pub length_scales: Vec<f64>,
    /// Signal variance `σ²` (on standardized targets).
    pub signal_variance: f64,
}

impl Hyperparameters {
    /// Isotropic hyperparameters: the same length scale on every dimension.
    #[must_use]
    pub fn isotropic(dim: usize, length_scale: f64, signal_variance: f64) -> Self {
        Self {
            length_scales: vec![length_scale; dim],
            signal_variance,
        }
    }
}

impl Kernel {
    /// Covariance between two points.
    #[must_use]
    pub fn eval(self, x1: &[f64], x2: &[f64], hyper: &Hyperparameters) -> f64 {
        let r_sq: f64 = x1
            .iter()
            .zip(x2)
            .zip(&hyper.length_scales)
            .map(|((a, b), l)| {
                let d = (a - b) / l;
                d * d
            })
            .sum();

        match self {
            Self::Matern52 => {
                let sqrt5_r = SQRT_5 * r_sq.sqrt();
                hyper.signal_variance * (1.0 + sqrt5_r + 5.0 / 3.0 * r_sq) * (-sqrt5_r).exp()
            }
            Self::SquaredExponential => hyper.signal_variance * (-0.5 * r_sq).exp(),
        }
    }
}

/// Build `K + diag · I` over the training inputs.
pub(crate) fn kernel_matrix(
    kernel: Kernel,
    x: &[Vec<f64>],
    hyper: &Hyperparameters,
    diag: f64,
) -> DMatrix<f64> {
    let n = x.len();
    DMatrix::from_fn(n, n, |i, j| {
        let k = kernel.eval(&x[i], &x[j], hyper);
        if i == j { k + diag } else { k }
    })
}

/// The kernel vector `k(x*, X)` for a test point.
pub(crate) fn kernel_vector(
    kernel: Kernel,
    x_star: &[f64],
    x_train: &[Vec<f64>],
    hyper: &Hyperparameters,
) -> DVector<f64> {
    DVector::from_fn(x_train.len(), |i, _| {
        kernel.eval(x_star, &x_train[i], hyper)
    })
}
