//! The [`Objective`] trait defines what gets maximized.
//!
//! Closures taking a [`ParamMap`] work directly:
//!
//! ```
//! use bayes_opt::prelude::*;
//!
//! let objective = |p: &ParamMap| Ok::<_, Error>(-(p["x"] - 1.0).powi(2));
//! let mut optimizer = BayesianOptimization::builder(objective, Bounds::from([("x", (-2.0, 2.0))]))
//!     .seed(7)
//!     .build()?;
//! optimizer.maximize(3, 2)?;
//! assert_eq!(optimizer.res().len(), 5);
//! # Ok::<_, Error>(())
//! ```
//!
//! Implement the trait on a struct when the objective carries state or its
//! own error type. The only requirement on that error type is
//! `From<bayes_opt::Error>`, so engine errors can be reported through the
//! same channel while the objective's own errors pass through unchanged.

use crate::error::Error;
use crate::space::ParamMap;

/// An expensive black-box function to maximize.
///
/// # Examples
///
/// ```
/// use bayes_opt::{Error, Objective, ParamMap};
///
/// struct Counting {
///     calls: usize,
/// }
///
/// impl Objective for Counting {
///     type Error = Error;
///
///     fn evaluate(&mut self, params: &ParamMap) -> Result<f64, Error> {
///         self.calls += 1;
///         Ok(-params["x"].powi(2))
///     }
/// }
/// ```
pub trait Objective {
    /// Error type of a failed evaluation.
    type Error: From<Error>;

    /// Evaluates the function at `params`.
    ///
    /// `params` holds exactly one value per declared parameter.
    ///
    /// # Errors
    ///
    /// Any error the function wants to report. It aborts the running
    /// `maximize` call and is handed back to the caller as-is.
    fn evaluate(&mut self, params: &ParamMap) -> Result<f64, Self::Error>;
}

impl<F, E> Objective for F
where
    F: FnMut(&ParamMap) -> Result<f64, E>,
    E: From<Error>,
{
    type Error = E;

    fn evaluate(&mut self, params: &ParamMap) -> Result<f64, E> {
        self(params)
    }
}

/// Objective for ask-and-tell use, where the caller evaluates points itself.
///
/// Calling [`evaluate`](Objective::evaluate) always fails with
/// [`Error::NoObjective`]; pair it with
/// [`suggest`](crate::BayesianOptimization::suggest) and
/// [`register`](crate::BayesianOptimization::register) instead of `maximize`.
#[derive(Clone, Copy, Debug, Default)]
pub struct External;

impl Objective for External {
    type Error = Error;

    fn evaluate(&mut self, _params: &ParamMap) -> Result<f64, Error> {
        Err(Error::NoObjective)
    }
}
