//! Sequential domain reduction of the search bounds.
//!
//! After every model-guided iteration the optimizer can hand the space to a
//! [`BoundsTransformer`], whose returned bounds replace the current ones via
//! `set_bounds`. [`DomainReduction`] implements the sequential domain
//! reduction scheme: the region is re-centred on the incumbent and its width
//! contracts by a rate that adapts to whether the incumbent keeps moving in
//! the same direction (panning) or jumps back and forth (oscillation).
//!
//! The reduced region never leaves the original bounds. Observations outside
//! it stay registered.

use crate::space::{Bounds, ParameterSpace};

/// Policy deciding new bounds from the current state of the space.
pub trait BoundsTransformer {
    /// Captures the starting bounds. Called once, when the optimizer is built.
    fn initialize(&mut self, space: &ParameterSpace);

    /// Returns the bounds to use from now on, or `None` to keep them.
    fn transform(&mut self, space: &ParameterSpace) -> Option<Bounds>;
}

/// Sequential domain reduction transformer.
///
/// | Parameter | Default | Role |
/// |-----------|---------|------|
/// | `gamma_osc` | 0.7 | Shrinkage when the incumbent oscillates |
/// | `gamma_pan` | 1.0 | Shrinkage when the incumbent pans |
/// | `eta` | 0.9 | Base contraction per iteration |
/// | `minimum_window` | 0.0 | Smallest width any dimension may shrink to |
///
/// # Examples
///
/// ```
/// use bayes_opt::domain_reduction::{BoundsTransformer, DomainReduction};
/// use bayes_opt::{Bounds, ParameterSpace};
///
/// let mut space = ParameterSpace::new(Bounds::from([("x", (-10.0, 10.0))]))?;
/// let mut reduction = DomainReduction::new().minimum_window(0.5);
/// reduction.initialize(&space);
///
/// space.register(vec![2.0], 1.0)?;
/// let bounds = reduction.transform(&space).unwrap();
/// let (lo, hi) = bounds.get("x").unwrap();
/// assert!(lo >= -10.0 && hi <= 10.0 && hi - lo < 20.0);
/// # Ok::<_, bayes_opt::Error>(())
/// ```
#[derive(Clone, Debug)]
pub struct DomainReduction {
    gamma_osc: f64,
    gamma_pan: f64,
    eta: f64,
    minimum_window: f64,
    state: Option<ReductionState>,
}

#[derive(Clone, Debug)]
struct ReductionState {
    keys: Vec<String>,
    original: Vec<(f64, f64)>,
    previous_optimal: Vec<f64>,
    current_optimal: Vec<f64>,
    previous_d: Vec<f64>,
    current_d: Vec<f64>,
    /// Current region width per dimension.
    r: Vec<f64>,
}

impl DomainReduction {
    /// Creates a transformer with the default coefficients.
    #[must_use]
    pub fn new() -> Self {
        Self {
            gamma_osc: 0.7,
            gamma_pan: 1.0,
            eta: 0.9,
            minimum_window: 0.0,
            state: None,
        }
    }

    /// Sets the shrinkage coefficient used when the incumbent oscillates.
    #[must_use]
    pub fn gamma_osc(mut self, v: f64) -> Self {
        self.gamma_osc = v;
        self
    }

    /// Sets the shrinkage coefficient used when the incumbent pans.
    #[must_use]
    pub fn gamma_pan(mut self, v: f64) -> Self {
        self.gamma_pan = v;
        self
    }

    /// Sets the base contraction rate.
    #[must_use]
    pub fn eta(mut self, v: f64) -> Self {
        self.eta = v;
        self
    }

    /// Sets the smallest width any dimension may be reduced to.
    #[must_use]
    pub fn minimum_window(mut self, v: f64) -> Self {
        self.minimum_window = v.max(0.0);
        self
    }

    /// Region widths after the last update, in canonical key order.
    #[must_use]
    pub fn widths(&self) -> Option<&[f64]> {
        self.state.as_ref().map(|s| s.r.as_slice())
    }

    /// Contracts `r` given the latest movement `current_d` / `previous_d`.
    fn contract(&self, state: &mut ReductionState) {
        for i in 0..state.r.len() {
            let c = state.current_d[i] * state.previous_d[i];
            let c_hat = c.abs().sqrt() * c.signum();
            let c_hat = if c == 0.0 { 0.0 } else { c_hat };
            let gamma = 0.5 * (self.gamma_pan * (1.0 + c_hat) + self.gamma_osc * (1.0 - c_hat));
            let rate = self.eta + state.current_d[i].abs() * (gamma - self.eta);
            let (lo, hi) = state.original[i];
            let floor = self.window(hi - lo);
            state.r[i] = (state.r[i] * rate).clamp(floor, (hi - lo).max(floor));
        }
    }

    /// Smallest admissible width for a dimension of the given original width.
    fn window(&self, original_width: f64) -> f64 {
        self.minimum_window.max(original_width * 1e-9)
    }

    /// Clips `[center ± r/2]` into the original bounds and enforces the
    /// minimum window.
    fn trim(&self, state: &ReductionState) -> Vec<(f64, f64)> {
        state
            .current_optimal
            .iter()
            .zip(&state.r)
            .zip(&state.original)
            .map(|((&center, &r), &(g_lo, g_hi))| {
                let mut lo = (center - 0.5 * r).max(g_lo);
                let mut hi = (center + 0.5 * r).min(g_hi);
                if lo > hi {
                    core::mem::swap(&mut lo, &mut hi);
                }

                let window = self.window(g_hi - g_lo);
                let width = hi - lo;
                if width < window {
                    let dw = 0.5 * (window - width);
                    let left_space = lo - g_lo;
                    let right_space = g_hi - hi;
                    let mut left = left_space.min(dw);
                    let mut right = right_space.min(dw);
                    // hand expansion a side cannot absorb to the other side
                    left += (dw - right).min(left_space - left).max(0.0);
                    right += (dw - left.min(dw)).min(right_space - right).max(0.0);
                    lo -= left;
                    hi += right;
                }
                (lo, hi)
            })
            .collect()
    }
}

impl Default for DomainReduction {
    fn default() -> Self {
        Self::new()
    }
}

impl BoundsTransformer for DomainReduction {
    fn initialize(&mut self, space: &ParameterSpace) {
        let original = space.intervals().to_vec();
        let center: Vec<f64> = original.iter().map(|&(lo, hi)| 0.5 * (lo + hi)).collect();
        let dim = original.len();
        let mut state = ReductionState {
            keys: space.keys().to_vec(),
            r: original.iter().map(|&(lo, hi)| hi - lo).collect(),
            original,
            previous_optimal: center.clone(),
            current_optimal: center,
            previous_d: vec![0.0; dim],
            current_d: vec![0.0; dim],
        };
        self.contract(&mut state);
        self.state = Some(state);
    }

    fn transform(&mut self, space: &ParameterSpace) -> Option<Bounds> {
        if self.state.is_none() {
            self.initialize(space);
        }
        let best = space.max()?.params.clone();
        let mut state = self.state.take()?;

        state.previous_optimal = core::mem::replace(&mut state.current_optimal, best);
        state.previous_d = core::mem::take(&mut state.current_d);
        state.current_d = state
            .current_optimal
            .iter()
            .zip(&state.previous_optimal)
            .zip(&state.r)
            .map(|((cur, prev), r)| 2.0 * (cur - prev) / r)
            .collect();
        self.contract(&mut state);

        let intervals = self.trim(&state);
        let bounds = state.keys.iter().cloned().zip(intervals).collect();
        self.state = Some(state);
        Some(bounds)
    }
}
