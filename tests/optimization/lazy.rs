use std::cell::RefCell;
use std::rc::Rc;

use bayes_opt::prelude::*;

use super::{paraboloid, paraboloid_bounds, quick};

#[test]
fn test_lazy_probe_runs_before_suggestions() {
    let mut optimizer = BayesianOptimization::builder(paraboloid, paraboloid_bounds())
        .seed(1)
        .acquisition_optimizer(quick())
        .build()
        .unwrap();

    let seen = Rc::new(RefCell::new(Vec::new()));
    let log = Rc::clone(&seen);
    optimizer.subscribe_fn(Event::OptimizationStep, move |payload| {
        let latest = payload.latest.clone().unwrap();
        log.borrow_mut().push(latest.params);
        Ok(())
    });

    optimizer.probe([("x", 0.5), ("y", 0.7)], true).unwrap();
    assert_eq!(optimizer.queue_len(), 1);
    assert!(optimizer.res().is_empty());

    optimizer.maximize(0, 1).unwrap();

    let seen = seen.borrow();
    assert_eq!(seen.len(), 2);
    assert_eq!(seen[0]["x"], 0.5);
    assert_eq!(seen[0]["y"], 0.7);
    assert_eq!(optimizer.queue_len(), 0);
    // the suggested point lies in the bounds, the lazy one need not
    let suggested = &optimizer.space().observations()[1];
    assert!(optimizer.space().in_bounds(&suggested.params));
}

#[test]
fn test_lazy_queue_is_fifo() {
    let mut optimizer = BayesianOptimization::builder(paraboloid, paraboloid_bounds())
        .seed(2)
        .acquisition_optimizer(quick())
        .build()
        .unwrap();
    optimizer.probe(vec![2.5, 0.0], true).unwrap();
    optimizer.probe(vec![3.5, 1.0], true).unwrap();
    optimizer.probe(vec![3.0, -1.0], true).unwrap();

    optimizer.maximize(0, 1).unwrap();
    let res = optimizer.res();
    assert_eq!(res.len(), 4);
    assert_eq!(res[0].params["x"], 2.5);
    assert_eq!(res[1].params["x"], 3.5);
    assert_eq!(res[2].params["x"], 3.0);
}

#[test]
fn test_queue_drains_even_without_iterations() {
    let mut optimizer = BayesianOptimization::builder(paraboloid, paraboloid_bounds())
        .seed(3)
        .build()
        .unwrap();
    optimizer.probe(vec![2.5, 0.0], true).unwrap();
    optimizer.probe(vec![3.5, 1.0], true).unwrap();

    optimizer.maximize(1, 0).unwrap();
    let res = optimizer.res();
    assert_eq!(res.len(), 3);
    assert_eq!(res[1].params["x"], 2.5);
    assert_eq!(res[2].params["x"], 3.5);
}

#[test]
fn test_eager_probe_registers_immediately() {
    let mut optimizer = BayesianOptimization::builder(paraboloid, paraboloid_bounds())
        .build()
        .unwrap();
    optimizer.probe([("x", 2.0), ("y", 1.0)], false).unwrap();

    let best = optimizer.max().unwrap();
    assert_eq!(best.target, -3.0);
    assert_eq!(optimizer.queue_len(), 0);
    assert_eq!(optimizer.state(), OptimizerState::Idle);
}

#[test]
fn test_malformed_lazy_probe_is_rejected_up_front() {
    let mut optimizer = BayesianOptimization::builder(paraboloid, paraboloid_bounds())
        .build()
        .unwrap();
    assert!(matches!(
        optimizer.probe(vec![1.0], true),
        Err(Error::DimensionMismatch { .. })
    ));
    assert!(matches!(
        optimizer.probe([("x", 1.0), ("w", 0.0)], true),
        Err(Error::UnknownParameter(_))
    ));
    assert!(matches!(
        optimizer.probe(vec![f64::NAN, 0.0], true),
        Err(Error::NonFinite(_))
    ));
    assert_eq!(optimizer.queue_len(), 0);
}
