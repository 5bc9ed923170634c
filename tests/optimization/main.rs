#![allow(clippy::float_cmp)]

mod ask_tell;
mod bounds;
mod errors;
mod events;
mod lazy;
mod maximize;

use bayes_opt::prelude::*;

/// `f(x, y) = -x² - (y - 1)² + 1`, maximized at `(0, 1)`.
fn paraboloid(p: &ParamMap) -> Result<f64, Error> {
    Ok(-p["x"].powi(2) - (p["y"] - 1.0).powi(2) + 1.0)
}

fn paraboloid_bounds() -> Bounds {
    Bounds::from([("x", (2.0, 4.0)), ("y", (-3.0, 3.0))])
}

/// Acquisition optimizer small enough to keep the suite fast.
fn quick() -> AcquisitionOptimizer {
    AcquisitionOptimizer::builder()
        .n_warmup(1_000)
        .n_restarts(4)
        .build()
}
