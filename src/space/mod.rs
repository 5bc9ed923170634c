//! The bounded parameter space and its observation store.
//!
//! [`ParameterSpace`] fixes a canonical coordinate order from the initial
//! [`Bounds`] (lexicographic by name), keeps every registered
//! [`Observation`], and draws uniform random points from the current bounds.
//!
//! Bounds may later be narrowed or widened with
//! [`set_bounds`](ParameterSpace::set_bounds). Observations that fall outside
//! the new bounds stay stored and keep informing the surrogate; only new
//! candidates are restricted to the current region.

mod bounds;
mod params;

pub use bounds::Bounds;
pub use params::{NamedObservation, Observation, ParamMap, Params};

use crate::error::{Error, Result};
use crate::objective::Objective;
use crate::rng_util;

/// Maximum per-coordinate difference for two points to count as the same.
pub const DUPLICATE_TOLERANCE: f64 = 1e-9;

/// Bounded coordinate system holding all observations made so far.
///
/// # Examples
///
/// ```
/// use bayes_opt::{Bounds, ParameterSpace};
///
/// let mut space = ParameterSpace::new(Bounds::from([("x", (0.0, 1.0)), ("y", (-1.0, 1.0))]))?;
/// space.register([("x", 0.25), ("y", 0.5)], 1.0)?;
/// space.register(vec![0.25, 0.5], 2.0)?; // same point, overwrites
///
/// assert_eq!(space.len(), 1);
/// assert_eq!(space.max().map(|o| o.target), Some(2.0));
/// # Ok::<_, bayes_opt::Error>(())
/// ```
#[derive(Clone, Debug)]
pub struct ParameterSpace {
    /// Parameter names in canonical order. Never changes after construction.
    keys: Vec<String>,
    /// Current `(low, high)` per key, parallel to `keys`.
    bounds: Vec<(f64, f64)>,
    observations: Vec<Observation>,
    revision: u64,
}

impl ParameterSpace {
    /// Creates a space from the initial bounds.
    ///
    /// # Errors
    ///
    /// Returns [`Error::EmptyBounds`] if no parameter is declared and
    /// [`Error::InvalidBounds`] for any interval without `low < high`.
    pub fn new(bounds: Bounds) -> Result<Self> {
        if bounds.is_empty() {
            return Err(Error::EmptyBounds);
        }
        bounds.validate()?;
        let (keys, intervals): (Vec<String>, Vec<(f64, f64)>) =
            bounds.iter().map(|(k, v)| (k.to_owned(), v)).unzip();
        Ok(Self {
            keys,
            bounds: intervals,
            observations: Vec::new(),
            revision: 0,
        })
    }

    /// Parameter names in canonical order.
    #[must_use]
    pub fn keys(&self) -> &[String] {
        &self.keys
    }

    /// Number of parameters.
    #[must_use]
    pub fn dim(&self) -> usize {
        self.keys.len()
    }

    /// The current bounds.
    #[must_use]
    pub fn bounds(&self) -> Bounds {
        self.keys.iter().cloned().zip(self.bounds.iter().copied()).collect()
    }

    /// The current `(low, high)` intervals in canonical order.
    #[must_use]
    pub fn intervals(&self) -> &[(f64, f64)] {
        &self.bounds
    }

    /// Number of registered observations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.observations.len()
    }

    /// Returns `true` if nothing has been registered yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }

    /// All observations in registration order.
    #[must_use]
    pub fn observations(&self) -> &[Observation] {
        &self.observations
    }

    /// Observation coordinates, one row per observation.
    #[must_use]
    pub fn params(&self) -> Vec<Vec<f64>> {
        self.observations.iter().map(|o| o.params.clone()).collect()
    }

    /// Observation targets in registration order.
    #[must_use]
    pub fn targets(&self) -> Vec<f64> {
        self.observations.iter().map(|o| o.target).collect()
    }

    /// Counter bumped on every mutation of observations or bounds.
    ///
    /// Dependents compare it against the value they last saw to decide
    /// whether cached state (e.g. a fitted surrogate) is stale.
    #[must_use]
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Converts caller-supplied parameters into a canonical point.
    ///
    /// # Errors
    ///
    /// [`Error::DimensionMismatch`] if the number of values differs from the
    /// number of parameters, [`Error::UnknownParameter`] if a named value
    /// does not belong to the space.
    pub fn to_point(&self, params: impl Into<Params>) -> Result<Vec<f64>> {
        match params.into() {
            Params::Ordered(values) => {
                self.check_dim(values.len())?;
                Ok(values)
            }
            Params::Named(map) => {
                if let Some(unknown) = map.keys().find(|k| !self.keys.contains(k)) {
                    return Err(Error::UnknownParameter(unknown.clone()));
                }
                self.check_dim(map.len())?;
                Ok(self.keys.iter().map(|k| map[k]).collect())
            }
        }
    }

    /// Names each coordinate of `point`.
    ///
    /// # Errors
    ///
    /// [`Error::DimensionMismatch`] if `point` has the wrong length.
    pub fn to_param_map(&self, point: &[f64]) -> Result<ParamMap> {
        self.check_dim(point.len())?;
        Ok(self
            .keys
            .iter()
            .cloned()
            .zip(point.iter().copied())
            .collect())
    }

    /// Attaches parameter names to an observation.
    #[must_use]
    pub fn named(&self, observation: &Observation) -> NamedObservation {
        NamedObservation {
            target: observation.target,
            params: self
                .keys
                .iter()
                .cloned()
                .zip(observation.params.iter().copied())
                .collect(),
        }
    }

    /// Records `target` at `params`.
    ///
    /// A point within [`DUPLICATE_TOLERANCE`] of an existing one overwrites
    /// that observation's target instead of adding a second entry.
    ///
    /// # Errors
    ///
    /// [`Error::DimensionMismatch`] / [`Error::UnknownParameter`] for a
    /// malformed point, [`Error::NonFinite`] for NaN or infinite values.
    pub fn register(&mut self, params: impl Into<Params>, target: f64) -> Result<()> {
        let point = self.to_point(params)?;
        if point.iter().any(|v| !v.is_finite()) {
            return Err(Error::NonFinite("point"));
        }
        if !target.is_finite() {
            return Err(Error::NonFinite("target"));
        }

        match self.find(&point) {
            Some(idx) => {
                trace_debug!(index = idx, target, "overwriting duplicate observation");
                self.observations[idx].target = target;
            }
            None => self.observations.push(Observation {
                params: point,
                target,
            }),
        }
        self.revision += 1;
        Ok(())
    }

    /// Evaluates `objective` at `params`, registers the result, and returns it.
    ///
    /// This is the single path through which the objective is invoked.
    ///
    /// # Errors
    ///
    /// Structural errors are converted into `O::Error`; errors from the
    /// objective itself are returned unchanged and nothing is registered.
    pub fn probe<O: Objective + ?Sized>(
        &mut self,
        params: impl Into<Params>,
        objective: &mut O,
    ) -> core::result::Result<f64, O::Error> {
        let point = self.to_point(params)?;
        let map = self.to_param_map(&point)?;
        let target = objective.evaluate(&map)?;
        self.register(point, target)?;
        Ok(target)
    }

    /// Draws a point uniformly from the current bounds.
    ///
    /// The generator is always supplied by the caller so that a single seed
    /// determines every random draw of an optimization run.
    pub fn random_sample(&self, rng: &mut fastrand::Rng) -> Vec<f64> {
        rng_util::uniform_point(rng, &self.bounds)
    }

    /// Merges new intervals into the current bounds.
    ///
    /// Keys absent from `partial` keep their interval. The canonical key
    /// order never changes. Validation happens before any interval is
    /// replaced, so a failed call leaves the bounds untouched.
    ///
    /// # Errors
    ///
    /// [`Error::UnknownParameter`] for a name that was not declared at
    /// construction, [`Error::InvalidBounds`] for a malformed interval.
    pub fn set_bounds(&mut self, partial: impl Into<Bounds>) -> Result<()> {
        let partial = partial.into();
        let mut updates = Vec::with_capacity(partial.len());
        for (name, (low, high)) in partial.iter() {
            let idx = self
                .index_of(name)
                .ok_or_else(|| Error::UnknownParameter(name.to_owned()))?;
            bounds::validate_interval(name, low, high)?;
            updates.push((idx, (low, high)));
        }
        for (idx, interval) in updates {
            self.bounds[idx] = interval;
        }
        self.revision += 1;
        Ok(())
    }

    /// The observation with the greatest target; ties go to the earliest.
    #[must_use]
    pub fn max(&self) -> Option<&Observation> {
        self.observations
            .iter()
            .fold(None, |best: Option<&Observation>, o| match best {
                Some(b) if b.target >= o.target => Some(b),
                _ => Some(o),
            })
    }

    /// Returns `true` if a registered point duplicates `point`.
    #[must_use]
    pub fn contains(&self, point: &[f64]) -> bool {
        self.find(point).is_some()
    }

    /// Returns `true` if `point` lies inside the current bounds.
    #[must_use]
    pub fn in_bounds(&self, point: &[f64]) -> bool {
        point.len() == self.dim()
            && point
                .iter()
                .zip(&self.bounds)
                .all(|(&v, &(lo, hi))| (lo..=hi).contains(&v))
    }

    /// Clamps every coordinate into the current bounds.
    pub fn clip(&self, point: &mut [f64]) {
        clip_to(point, &self.bounds);
    }

    fn index_of(&self, name: &str) -> Option<usize> {
        self.keys.iter().position(|k| k == name)
    }

    fn find(&self, point: &[f64]) -> Option<usize> {
        self.observations.iter().position(|o| {
            o.params
                .iter()
                .zip(point)
                .all(|(a, b)| (a - b).abs() <= DUPLICATE_TOLERANCE)
        })
    }

    fn check_dim(&self, got: usize) -> Result<()> {
        if got == self.dim() {
            Ok(())
        } else {
            Err(Error::DimensionMismatch {
                expected: self.dim(),
                got,
            })
        }
    }
}

/// Clamps `point` into `intervals`, coordinate by coordinate.
pub(crate) fn clip_to(point: &mut [f64], intervals: &[(f64, f64)]) {
    for (v, &(lo, hi)) in point.iter_mut().zip(intervals) {
        *v = v.clamp(lo, hi);
    }
}
