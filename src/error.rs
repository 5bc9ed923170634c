//! Error types for the bayes-opt crate.
//!
//! All fallible engine operations return [`Result<T>`], an alias for
//! `core::result::Result<T, Error>`. Errors raised by the caller's objective
//! function are never wrapped: they travel through the optimizer with the
//! objective's own error type (see [`Objective`](crate::Objective)).

use crate::event::Event;

/// Errors returned by optimizer operations.
///
/// Structural problems (bad dimensionality, unknown names, invalid bounds)
/// surface immediately. Numerical trouble in the surrogate is absorbed where
/// a documented fallback exists and reported as
/// [`IllConditionedModel`](Error::IllConditionedModel) where it does not.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// An interval is empty, reversed, or has a non-finite endpoint.
    #[error("invalid bounds for '{name}': low ({low}) must be less than high ({high})")]
    InvalidBounds {
        /// The parameter the interval belongs to.
        name: String,
        /// The lower bound value.
        low: f64,
        /// The upper bound value.
        high: f64,
    },

    /// A parameter space was created without any parameters.
    #[error("bounds must declare at least one parameter")]
    EmptyBounds,

    /// A point does not have one coordinate per declared parameter.
    #[error("dimension mismatch: expected {expected} coordinates, got {got}")]
    DimensionMismatch {
        /// The number of declared parameters.
        expected: usize,
        /// The number of coordinates supplied.
        got: usize,
    },

    /// A parameter name that was never declared in the initial bounds.
    #[error("unknown parameter '{0}'")]
    UnknownParameter(String),

    /// A coordinate or target value is NaN or infinite.
    #[error("non-finite value in {0}")]
    NonFinite(&'static str),

    /// The surrogate was queried before it was fitted on any observation.
    #[error("gaussian process has not been fitted")]
    ModelNotFitted,

    /// The kernel matrix could not be factorized even with added jitter.
    #[error("kernel matrix is not positive definite after {attempts} jitter attempts")]
    IllConditionedModel {
        /// The number of factorization attempts made.
        attempts: usize,
    },

    /// An event observer returned an error. Recorded, never fatal.
    #[error("observer for {event} failed: {message}")]
    ObserverFailure {
        /// The event being dispatched.
        event: Event,
        /// The observer's error message.
        message: String,
    },

    /// An operation needed at least one registered observation.
    #[error("no observations registered")]
    NoObservations,

    /// The optimizer has no objective attached to evaluate points with.
    #[error("no objective attached: evaluate points externally and register them")]
    NoObjective,

    /// Reading or writing a progress log failed.
    #[error("storage error: {0}")]
    Storage(String),
}

/// Convenience alias used throughout the crate.
pub type Result<T, E = Error> = core::result::Result<T, E>;
