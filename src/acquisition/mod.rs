//! Acquisition functions and their maximization.
//!
//! An [`AcquisitionFunction`] turns the surrogate's posterior into a score
//! that trades predicted value against uncertainty; the
//! [`AcquisitionOptimizer`] searches the current bounds for the highest
//! score, which becomes the next point to evaluate.

mod function;
mod optimizer;

pub use function::{AcquisitionFunction, DEFAULT_KAPPA, DEFAULT_XI, KappaDecay};
pub use optimizer::{AcquisitionOptimizer, AcquisitionOptimizerBuilder, Candidate};
