//! Core types for the optimizer library.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Phase of the optimization loop.
///
/// `maximize` walks `Initializing`, then repeats
/// `LazyDraining → Suggesting → Evaluating → Registering` once per iteration,
/// and always comes back to `Idle`, also when it returns an error.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OptimizerState {
    /// No `maximize` call is running.
    #[default]
    Idle,
    /// Taking the initial random probes.
    Initializing,
    /// Evaluating points queued with a lazy `probe`.
    LazyDraining,
    /// Fitting the surrogate and maximizing the acquisition function.
    Suggesting,
    /// Calling the objective.
    Evaluating,
    /// Storing the result and notifying observers.
    Registering,
}

impl fmt::Display for OptimizerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Idle => "idle",
            Self::Initializing => "initializing",
            Self::LazyDraining => "lazy-draining",
            Self::Suggesting => "suggesting",
            Self::Evaluating => "evaluating",
            Self::Registering => "registering",
        })
    }
}
