use bayes_opt::prelude::*;

use super::{paraboloid_bounds, quick};

#[test]
fn test_suggest_register_loop() {
    let mut optimizer = BayesianOptimization::builder(External, paraboloid_bounds())
        .seed(11)
        .acquisition(AcquisitionFunction::ei(0.0))
        .acquisition_optimizer(quick())
        .build()
        .unwrap();

    for _ in 0..8 {
        let params = optimizer.suggest().unwrap();
        assert_eq!(params.keys().collect::<Vec<_>>(), ["x", "y"]);
        let target = -params["x"].powi(2) - (params["y"] - 1.0).powi(2) + 1.0;
        optimizer.register(params, target).unwrap();
    }

    assert_eq!(optimizer.res().len(), 8);
    assert!(optimizer.max().unwrap().target > -8.0);
}

#[test]
fn test_first_suggestion_is_random_and_in_bounds() {
    let mut optimizer = BayesianOptimization::builder(External, paraboloid_bounds())
        .seed(12)
        .build()
        .unwrap();
    let params = optimizer.suggest().unwrap();
    assert!((2.0..=4.0).contains(&params["x"]));
    assert!((-3.0..=3.0).contains(&params["y"]));
    assert!(optimizer.res().is_empty());
}

#[test]
fn test_external_objective_cannot_maximize() {
    let mut optimizer = BayesianOptimization::builder(External, paraboloid_bounds())
        .build()
        .unwrap();
    assert!(matches!(optimizer.maximize(1, 0), Err(Error::NoObjective)));
    assert_eq!(optimizer.state(), OptimizerState::Idle);
    assert!(optimizer.res().is_empty());
}

#[test]
fn test_register_rejects_bad_values() {
    let mut optimizer = BayesianOptimization::builder(External, paraboloid_bounds())
        .build()
        .unwrap();
    assert!(matches!(
        optimizer.register(vec![3.0, 0.0], f64::INFINITY),
        Err(Error::NonFinite(_))
    ));
    assert!(matches!(
        optimizer.register([("x", 3.0)], 1.0),
        Err(Error::DimensionMismatch { .. })
    ));
    assert!(optimizer.res().is_empty());
}

#[test]
fn test_duplicate_registration_overwrites() {
    let mut optimizer = BayesianOptimization::builder(External, paraboloid_bounds())
        .build()
        .unwrap();
    optimizer.register(vec![3.0, 0.0], 1.0).unwrap();
    optimizer.register([("y", 0.0), ("x", 3.0)], 2.0).unwrap();
    let res = optimizer.res();
    assert_eq!(res.len(), 1);
    assert_eq!(res[0].target, 2.0);
}
