#![forbid(unsafe_code)]
#![deny(clippy::all)]
#![deny(unreachable_pub)]
#![deny(clippy::correctness)]
#![deny(clippy::suspicious)]
#![deny(clippy::style)]
#![deny(clippy::complexity)]
#![deny(clippy::perf)]
#![deny(clippy::pedantic)]
#![deny(clippy::std_instead_of_core)]

//! Sequential Bayesian optimization of expensive black-box functions.
//!
//! A Gaussian Process surrogate is fitted to every evaluation made so far,
//! an acquisition function turns its posterior into a score that balances
//! exploitation against exploration, and the highest-scoring point in the
//! bounds becomes the next evaluation. The loop is meant for objectives that
//! are costly to call: a few dozen evaluations typically suffice.
//!
//! # Getting Started
//!
//! ```
//! use bayes_opt::prelude::*;
//!
//! let objective = |p: &ParamMap| -> Result<f64, Error> {
//!     Ok(-p["x"].powi(2) - (p["y"] - 1.0).powi(2) + 1.0)
//! };
//! let bounds = Bounds::from([("x", (2.0, 4.0)), ("y", (-3.0, 3.0))]);
//!
//! let mut optimizer = BayesianOptimization::builder(objective, bounds)
//!     .seed(1)
//!     .build()?;
//! optimizer.maximize(2, 5)?;
//!
//! let best = optimizer.max().unwrap();
//! println!("best target {:.3} at {:?}", best.target, best.params);
//! # Ok::<_, Error>(())
//! ```
//!
//! # Core Concepts
//!
//! | Type | Role |
//! |------|------|
//! | [`BayesianOptimization`] | Drives the loop: random initialization, lazy probes, suggest, evaluate, register. |
//! | [`ParameterSpace`] | Canonical key order, current [`Bounds`], the observation store, random sampling. |
//! | [`GaussianProcess`](gp::GaussianProcess) | Surrogate posterior `(mean, std)` with Cholesky fitting and likelihood-based hyperparameters. |
//! | [`AcquisitionFunction`] | UCB, EI, or PI score of a candidate. |
//! | [`AcquisitionOptimizer`](acquisition::AcquisitionOptimizer) | Random warm-up plus multi-start local ascent over the bounds. |
//! | [`Objective`] | The function being maximized. Any `FnMut(&ParamMap) -> Result<f64, E>` qualifies. |
//! | [`Observer`] | Receives [`Event`]s; failures are recorded and never stop the loop. |
//!
//! # Ask and tell
//!
//! When the objective cannot be called in-process, build the optimizer with
//! [`External`] and alternate [`suggest`](BayesianOptimization::suggest) with
//! [`register`](BayesianOptimization::register).
//!
//! # Feature Flags
//!
//! | Flag | What it enables | Default |
//! |------|----------------|---------|
//! | `tracing` | Structured log events via [`tracing`](https://docs.rs/tracing) at key optimization points | on |

/// Emit a `tracing::info!` event when the `tracing` feature is enabled.
/// No-op otherwise.
#[cfg(feature = "tracing")]
macro_rules! trace_info {
    ($($arg:tt)*) => { tracing::info!($($arg)*) };
}

#[cfg(not(feature = "tracing"))]
macro_rules! trace_info {
    ($($arg:tt)*) => {};
}

/// Emit a `tracing::debug!` event when the `tracing` feature is enabled.
/// No-op otherwise.
#[cfg(feature = "tracing")]
macro_rules! trace_debug {
    ($($arg:tt)*) => { tracing::debug!($($arg)*) };
}

#[cfg(not(feature = "tracing"))]
macro_rules! trace_debug {
    ($($arg:tt)*) => {};
}

/// Emit a `tracing::warn!` event when the `tracing` feature is enabled.
/// No-op otherwise.
#[cfg(feature = "tracing")]
macro_rules! trace_warn {
    ($($arg:tt)*) => { tracing::warn!($($arg)*) };
}

#[cfg(not(feature = "tracing"))]
macro_rules! trace_warn {
    ($($arg:tt)*) => {};
}

pub mod acquisition;
pub mod domain_reduction;
mod error;
pub mod event;
pub mod gp;
pub mod journal;
pub mod objective;
mod optimization;
mod rng_util;
pub mod space;
mod types;

pub use acquisition::{AcquisitionFunction, KappaDecay};
pub use domain_reduction::{BoundsTransformer, DomainReduction};
pub use error::{Error, Result};
pub use event::{Event, EventPayload, Observer, ObserverError, ObserverResult, SubscriberId};
pub use journal::{JsonLogger, load_logs};
pub use objective::{External, Objective};
pub use optimization::{BayesianOptimization, BayesianOptimizationBuilder};
pub use space::{Bounds, NamedObservation, Observation, ParamMap, ParameterSpace, Params};
pub use types::OptimizerState;

/// Convenient wildcard import for the most common types.
///
/// ```
/// use bayes_opt::prelude::*;
/// ```
pub mod prelude {
    pub use crate::acquisition::{AcquisitionFunction, AcquisitionOptimizer, KappaDecay};
    pub use crate::domain_reduction::{BoundsTransformer, DomainReduction};
    pub use crate::error::{Error, Result};
    pub use crate::event::{Event, EventPayload, Observer, ObserverResult, SubscriberId};
    pub use crate::gp::{GaussianProcess, Kernel};
    pub use crate::journal::{JsonLogger, load_logs};
    pub use crate::objective::{External, Objective};
    pub use crate::optimization::{BayesianOptimization, BayesianOptimizationBuilder};
    pub use crate::space::{Bounds, NamedObservation, ParamMap, ParameterSpace, Params};
    pub use crate::types::OptimizerState;
}
