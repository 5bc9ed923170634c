//! Maximizes f(x, y) = -x² - (y - 1)² + 1 over x in [2, 4], y in [-3, 3].
//!
//! The unconstrained optimum (0, 1) lies outside the bounds, so the search has
//! to find the constrained optimum on the edge x = 2. A lazy probe seeds the
//! run with a guess, and every step is logged to a JSON-lines file.
//!
//! Run with: `RUST_LOG=bayes_opt=debug cargo run --example quadratic`

use bayes_opt::prelude::*;

fn main() -> Result<(), Error> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "bayes_opt=info".into()),
        )
        .init();

    let objective = |p: &ParamMap| -> Result<f64, Error> {
        Ok(-p["x"].powi(2) - (p["y"] - 1.0).powi(2) + 1.0)
    };
    let bounds = Bounds::from([("x", (2.0, 4.0)), ("y", (-3.0, 3.0))]);

    let mut optimizer = BayesianOptimization::builder(objective, bounds)
        .seed(1)
        .acquisition(AcquisitionFunction::ei(0.0))
        .build()?;

    let log_path = std::env::temp_dir().join("bayes_opt_quadratic.jsonl");
    optimizer.subscribe(Event::OptimizationStep, JsonLogger::new(&log_path));
    optimizer.subscribe_fn(Event::OptimizationStep, |payload| {
        if let Some(latest) = &payload.latest {
            println!(
                "{:>3} | target {:>9.4} | x {:>7.4} | y {:>7.4}",
                payload.n_observations, latest.target, latest.params["x"], latest.params["y"]
            );
        }
        Ok(())
    });

    // Try a guess before the model takes over.
    optimizer.probe([("x", 2.5), ("y", 0.5)], true)?;
    optimizer.maximize(2, 20)?;

    if let Some(best) = optimizer.max() {
        println!("best target {:.4} at {:?}", best.target, best.params);
    }
    println!("log written to {}", log_path.display());
    Ok(())
}
