use bayes_opt::prelude::*;

use super::{paraboloid, paraboloid_bounds, quick};

#[test]
fn test_converges_to_boundary_optimum() {
    let mut optimizer = BayesianOptimization::builder(paraboloid, paraboloid_bounds())
        .seed(1)
        .acquisition(AcquisitionFunction::ei(0.0))
        .build()
        .unwrap();
    optimizer.maximize(2, 20).unwrap();

    // x is confined to [2, 4], so the constrained optimum is f(2, 1) = -3.
    let best = optimizer.max().unwrap();
    assert!((best.target + 3.0).abs() < 0.01, "best target {}", best.target);
    assert!((best.params["x"] - 2.0).abs() < 0.01);
    assert!((best.params["y"] - 1.0).abs() < 0.1);
}

#[test]
fn test_budget_and_iteration_count() {
    let mut optimizer = BayesianOptimization::builder(paraboloid, paraboloid_bounds())
        .seed(3)
        .acquisition_optimizer(quick())
        .build()
        .unwrap();
    optimizer.maximize(3, 4).unwrap();

    assert_eq!(optimizer.res().len(), 7);
    assert_eq!(optimizer.iteration(), 4);
    assert_eq!(optimizer.state(), OptimizerState::Idle);
}

#[test]
fn test_maximize_is_reentrant() {
    let mut optimizer = BayesianOptimization::builder(paraboloid, paraboloid_bounds())
        .seed(4)
        .acquisition_optimizer(quick())
        .build()
        .unwrap();
    optimizer.maximize(2, 2).unwrap();
    let first: Vec<_> = optimizer.res();

    optimizer.maximize(0, 3).unwrap();
    let all = optimizer.res();
    assert_eq!(all.len(), 7);
    assert_eq!(&all[..4], &first[..]);
    assert_eq!(optimizer.iteration(), 5);
}

#[test]
fn test_zero_budget_on_empty_space_takes_one_random_probe() {
    let mut optimizer = BayesianOptimization::builder(paraboloid, paraboloid_bounds())
        .seed(5)
        .build()
        .unwrap();
    optimizer.maximize(0, 0).unwrap();
    assert_eq!(optimizer.res().len(), 1);

    optimizer.maximize(0, 0).unwrap();
    assert_eq!(optimizer.res().len(), 1);
}

#[test]
fn test_same_seed_same_run() {
    let run = |seed: u64| {
        let mut optimizer = BayesianOptimization::builder(paraboloid, paraboloid_bounds())
            .seed(seed)
            .acquisition_optimizer(quick())
            .build()
            .unwrap();
        optimizer.maximize(2, 4).unwrap();
        optimizer.res()
    };
    assert_eq!(run(17), run(17));
    assert_ne!(run(17), run(18));
}

#[test]
fn test_suggestions_respect_bounds() {
    let mut optimizer = BayesianOptimization::builder(paraboloid, paraboloid_bounds())
        .seed(6)
        .acquisition(AcquisitionFunction::ucb(10.0))
        .acquisition_optimizer(quick())
        .build()
        .unwrap();
    optimizer.maximize(2, 6).unwrap();
    for o in optimizer.space().observations() {
        assert!(optimizer.space().in_bounds(&o.params), "{:?}", o.params);
    }
}

#[test]
fn test_kappa_decay_shrinks_exploration() {
    let mut optimizer = BayesianOptimization::builder(paraboloid, paraboloid_bounds())
        .seed(7)
        .acquisition(AcquisitionFunction::ucb(4.0))
        .kappa_decay(KappaDecay::new(0.5, 1))
        .acquisition_optimizer(quick())
        .build()
        .unwrap();
    optimizer.maximize(2, 3).unwrap();
    // decay applies after iterations 2 and 3
    assert_eq!(optimizer.acquisition(), AcquisitionFunction::ucb(1.0));
}

#[test]
fn test_model_is_fitted_on_all_observations() {
    let mut optimizer = BayesianOptimization::builder(paraboloid, paraboloid_bounds())
        .seed(8)
        .kernel(Kernel::SquaredExponential)
        .noise_variance(1e-5)
        .refit_interval(2)
        .acquisition_optimizer(quick())
        .build()
        .unwrap();
    optimizer.maximize(3, 2).unwrap();

    // the last suggestion was made with the four observations preceding it
    assert_eq!(optimizer.model().n_train(), 4);
    assert_eq!(optimizer.model().kernel(), Kernel::SquaredExponential);
    assert!(optimizer.model().is_fitted());
}
