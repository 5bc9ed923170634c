use std::collections::{BTreeMap, HashMap};
use std::hash::BuildHasher;

use serde::{Deserialize, Serialize};

/// Parameter values keyed by name, in canonical order.
pub type ParamMap = BTreeMap<String, f64>;

/// Parameter values as accepted by `probe` and `register`.
///
/// Either a name→value mapping or a vector already in canonical key order.
/// Most callers never name this type; the `From` impls let plain vectors,
/// arrays, and maps be passed directly.
///
/// # Examples
///
/// ```
/// use bayes_opt::Params;
///
/// let named: Params = [("x", 0.5), ("y", 0.7)].into();
/// let ordered: Params = vec![0.5, 0.7].into();
/// assert!(matches!(named, Params::Named(_)));
/// assert!(matches!(ordered, Params::Ordered(_)));
/// ```
#[derive(Clone, Debug, PartialEq)]
pub enum Params {
    /// Values keyed by parameter name.
    Named(ParamMap),
    /// Values in canonical (lexicographic) key order.
    Ordered(Vec<f64>),
}

impl From<Vec<f64>> for Params {
    fn from(values: Vec<f64>) -> Self {
        Self::Ordered(values)
    }
}

impl From<&[f64]> for Params {
    fn from(values: &[f64]) -> Self {
        Self::Ordered(values.to_vec())
    }
}

impl From<&Vec<f64>> for Params {
    fn from(values: &Vec<f64>) -> Self {
        Self::Ordered(values.clone())
    }
}

impl<const N: usize> From<[f64; N]> for Params {
    fn from(values: [f64; N]) -> Self {
        Self::Ordered(values.to_vec())
    }
}

impl From<ParamMap> for Params {
    fn from(values: ParamMap) -> Self {
        Self::Named(values)
    }
}

impl From<&ParamMap> for Params {
    fn from(values: &ParamMap) -> Self {
        Self::Named(values.clone())
    }
}

impl<S: BuildHasher> From<HashMap<String, f64, S>> for Params {
    fn from(values: HashMap<String, f64, S>) -> Self {
        Self::Named(values.into_iter().collect())
    }
}

impl<S: BuildHasher> From<HashMap<&str, f64, S>> for Params {
    fn from(values: HashMap<&str, f64, S>) -> Self {
        Self::Named(
            values
                .into_iter()
                .map(|(k, v)| (k.to_owned(), v))
                .collect(),
        )
    }
}

impl<K: Into<String>, const N: usize> From<[(K, f64); N]> for Params {
    fn from(values: [(K, f64); N]) -> Self {
        Self::Named(values.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}

/// A registered `(point, target)` pair in canonical coordinate order.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    /// Coordinates in canonical key order.
    pub params: Vec<f64>,
    /// Objective value observed at `params`.
    pub target: f64,
}

/// An observation with its coordinates keyed by parameter name.
///
/// This is the shape handed to event observers and returned by the
/// optimizer's history accessors.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NamedObservation {
    /// Objective value.
    pub target: f64,
    /// Coordinates keyed by parameter name.
    pub params: ParamMap,
}

impl NamedObservation {
    /// Value of a single parameter.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<f64> {
        self.params.get(name).copied()
    }
}
