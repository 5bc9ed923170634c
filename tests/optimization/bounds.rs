use std::cell::RefCell;
use std::rc::Rc;

use bayes_opt::prelude::*;

use super::{paraboloid, paraboloid_bounds, quick};

#[test]
fn test_set_bounds_restricts_new_suggestions() {
    let mut optimizer = BayesianOptimization::builder(paraboloid, paraboloid_bounds())
        .seed(9)
        .acquisition_optimizer(quick())
        .build()
        .unwrap();
    optimizer.maximize(3, 1).unwrap();

    optimizer
        .set_bounds(Bounds::from([("x", (3.0, 3.5)), ("y", (0.0, 0.5))]))
        .unwrap();

    // a repeated suggestion overwrites its earlier observation, so count the
    // evaluations through step events rather than stored results
    let stepped = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&stepped);
    optimizer.subscribe_fn(Event::OptimizationStep, move |payload| {
        if let Some(latest) = &payload.latest {
            sink.borrow_mut().push(latest.params.clone());
        }
        Ok(())
    });
    optimizer.maximize(0, 3).unwrap();

    let stepped = stepped.borrow();
    assert_eq!(stepped.len(), 3);
    for params in stepped.iter() {
        assert!((3.0..=3.5).contains(&params["x"]), "{params:?}");
        assert!((0.0..=0.5).contains(&params["y"]), "{params:?}");
    }
}

#[test]
fn test_unknown_key_leaves_bounds_unchanged() {
    let mut optimizer = BayesianOptimization::builder(paraboloid, paraboloid_bounds())
        .build()
        .unwrap();
    let err = optimizer
        .set_bounds(Bounds::from([("x", (2.0, 3.0)), ("z", (0.0, 1.0))]))
        .unwrap_err();
    assert!(matches!(err, Error::UnknownParameter(name) if name == "z"));
    assert_eq!(optimizer.space().bounds(), paraboloid_bounds());
}

#[test]
fn test_key_order_survives_bounds_updates() {
    let mut optimizer = BayesianOptimization::builder(paraboloid, paraboloid_bounds())
        .build()
        .unwrap();
    optimizer
        .set_bounds(Bounds::from([("y", (0.0, 1.0))]))
        .unwrap();
    assert_eq!(optimizer.keys(), ["x", "y"]);
}

#[test]
fn test_invalid_builder_bounds() {
    let build = |bounds: Bounds| {
        BayesianOptimization::builder(paraboloid, bounds)
            .build()
            .map(|_| ())
    };
    assert!(matches!(build(Bounds::new()), Err(Error::EmptyBounds)));
    assert!(matches!(
        build(Bounds::from([("x", (1.0, 0.0))])),
        Err(Error::InvalidBounds { .. })
    ));
}
