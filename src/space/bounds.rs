use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Closed per-parameter intervals, keyed by parameter name.
///
/// Names are kept in a `BTreeMap`, so iteration is always lexicographic.
/// That order is the canonical coordinate order of every point the
/// optimizer produces or accepts as a vector.
///
/// Construction does not validate; intervals are checked when the bounds
/// are handed to a [`ParameterSpace`](super::ParameterSpace).
///
/// # Examples
///
/// ```
/// use bayes_opt::Bounds;
///
/// let bounds = Bounds::from([("y", (-3.0, 3.0)), ("x", (2.0, 4.0))]);
/// let keys: Vec<&str> = bounds.keys().collect();
/// assert_eq!(keys, ["x", "y"]);
/// ```
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Bounds {
    intervals: BTreeMap<String, (f64, f64)>,
}

impl Bounds {
    /// Creates an empty set of bounds.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds (or replaces) the interval for `name`, builder style.
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, low: f64, high: f64) -> Self {
        self.intervals.insert(name.into(), (low, high));
        self
    }

    /// Inserts the interval for `name`, returning the previous one if any.
    pub fn insert(&mut self, name: impl Into<String>, low: f64, high: f64) -> Option<(f64, f64)> {
        self.intervals.insert(name.into(), (low, high))
    }

    /// Returns the interval for `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<(f64, f64)> {
        self.intervals.get(name).copied()
    }

    /// Parameter names in canonical order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.intervals.keys().map(String::as_str)
    }

    /// `(name, (low, high))` pairs in canonical order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, (f64, f64))> {
        self.intervals.iter().map(|(k, v)| (k.as_str(), *v))
    }

    /// Number of parameters.
    #[must_use]
    pub fn len(&self) -> usize {
        self.intervals.len()
    }

    /// Returns `true` if no parameter is declared.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.intervals.is_empty()
    }

    /// Checks every interval for `low < high` with finite endpoints.
    pub(crate) fn validate(&self) -> Result<()> {
        for (name, (low, high)) in self.iter() {
            validate_interval(name, low, high)?;
        }
        Ok(())
    }
}

pub(crate) fn validate_interval(name: &str, low: f64, high: f64) -> Result<()> {
    if low.is_finite() && high.is_finite() && low < high {
        Ok(())
    } else {
        Err(Error::InvalidBounds {
            name: name.to_owned(),
            low,
            high,
        })
    }
}

impl<K: Into<String>, const N: usize> From<[(K, (f64, f64)); N]> for Bounds {
    fn from(entries: [(K, (f64, f64)); N]) -> Self {
        entries.into_iter().collect()
    }
}

impl<K: Into<String>> FromIterator<(K, (f64, f64))> for Bounds {
    fn from_iter<T: IntoIterator<Item = (K, (f64, f64))>>(iter: T) -> Self {
        Self {
            intervals: iter.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }
}

impl From<BTreeMap<String, (f64, f64)>> for Bounds {
    fn from(intervals: BTreeMap<String, (f64, f64)>) -> Self {
        Self { intervals }
    }
}

impl<'a> IntoIterator for &'a Bounds {
    type Item = (&'a String, &'a (f64, f64));
    type IntoIter = std::collections::btree_map::Iter<'a, String, (f64, f64)>;

    fn into_iter(self) -> Self::IntoIter {
        self.intervals.iter()
    }
}
