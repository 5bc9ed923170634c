/// Generate a random `f64` in the range `[low, high)`.
#[inline]
pub(crate) fn f64_range(rng: &mut fastrand::Rng, low: f64, high: f64) -> f64 {
    low + rng.f64() * (high - low)
}

/// Draw one point uniformly from a list of `(low, high)` intervals.
pub(crate) fn uniform_point<'a, I>(rng: &mut fastrand::Rng, intervals: I) -> Vec<f64>
where
    I: IntoIterator<Item = &'a (f64, f64)>,
{
    intervals
        .into_iter()
        .map(|&(low, high)| f64_range(rng, low, high))
        .collect()
}
