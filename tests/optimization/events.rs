use std::cell::RefCell;
use std::rc::Rc;

use bayes_opt::prelude::*;

use super::{paraboloid, paraboloid_bounds, quick};

type Paraboloid = fn(&ParamMap) -> Result<f64, Error>;

fn optimizer(seed: u64) -> BayesianOptimization<Paraboloid> {
    BayesianOptimization::builder(paraboloid as Paraboloid, paraboloid_bounds())
        .seed(seed)
        .acquisition_optimizer(quick())
        .build()
        .unwrap()
}

fn record_all(optimizer: &mut BayesianOptimization<Paraboloid>) -> Rc<RefCell<Vec<Event>>> {
    let log = Rc::new(RefCell::new(Vec::new()));
    for event in Event::ALL {
        let log = Rc::clone(&log);
        optimizer.subscribe_fn(event, move |payload| {
            log.borrow_mut().push(payload.event);
            Ok(())
        });
    }
    log
}

#[test]
fn test_lifecycle_events_frame_every_step() {
    let mut optimizer = optimizer(1);
    let log = record_all(&mut optimizer);
    optimizer.maximize(2, 3).unwrap();

    let mut expected = vec![Event::OptimizationStart];
    expected.extend([Event::OptimizationStep; 5]);
    expected.push(Event::OptimizationEnd);
    assert_eq!(*log.borrow(), expected);
}

#[test]
fn test_observers_run_in_subscription_order() {
    let mut optimizer = optimizer(2);
    let order = Rc::new(RefCell::new(Vec::new()));
    for tag in 0..3 {
        let order = Rc::clone(&order);
        optimizer.subscribe_fn(Event::OptimizationEnd, move |_| {
            order.borrow_mut().push(tag);
            Ok(())
        });
    }
    optimizer.maximize(1, 0).unwrap();
    assert_eq!(*order.borrow(), [0, 1, 2]);
}

#[test]
fn test_payload_reports_best_and_progress() {
    let mut optimizer = optimizer(3);
    let payloads = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&payloads);
    optimizer.subscribe_fn(Event::OptimizationStep, move |payload| {
        sink.borrow_mut().push(payload.clone());
        Ok(())
    });
    optimizer.maximize(2, 2).unwrap();

    let payloads = payloads.borrow();
    assert_eq!(payloads.len(), 4);
    for (i, p) in payloads.iter().enumerate() {
        assert_eq!(p.n_observations, i + 1);
        let best = p.best.as_ref().unwrap();
        let latest = p.latest.as_ref().unwrap();
        assert!(best.target >= latest.target);
    }
    assert_eq!(payloads[1].iteration, 0);
    assert_eq!(payloads[3].iteration, 1);
    assert_eq!(payloads[3].best, optimizer.max());
}

#[test]
fn test_failing_observer_is_isolated() {
    let mut optimizer = optimizer(4);
    optimizer.subscribe_fn(Event::OptimizationStep, |_| Err("disk full".into()));
    let log = record_all(&mut optimizer);

    optimizer.maximize(2, 1).unwrap();

    assert_eq!(log.borrow().len(), 5);
    assert_eq!(optimizer.res().len(), 3);
    let failures = optimizer.observer_failures();
    assert_eq!(failures.len(), 3);
    assert!(failures.iter().all(|e| matches!(
        e,
        Error::ObserverFailure { event: Event::OptimizationStep, message } if message == "disk full"
    )));

    assert_eq!(optimizer.take_observer_failures().len(), 3);
    assert!(optimizer.observer_failures().is_empty());
}

#[test]
fn test_unsubscribed_observer_is_silent() {
    let mut optimizer = optimizer(5);
    let hits = Rc::new(RefCell::new(0));
    let counter = Rc::clone(&hits);
    let id = optimizer.subscribe_fn(Event::OptimizationStep, move |_| {
        *counter.borrow_mut() += 1;
        Ok(())
    });
    optimizer.maximize(1, 0).unwrap();
    assert!(optimizer.unsubscribe(Event::OptimizationStep, id));
    optimizer.maximize(1, 0).unwrap();

    assert_eq!(*hits.borrow(), 1);
    assert!(!optimizer.unsubscribe(Event::OptimizationStep, id));
}

#[test]
fn test_struct_observer() {
    #[derive(Default)]
    struct Counter {
        steps: Rc<RefCell<usize>>,
    }

    impl Observer for Counter {
        fn update(&mut self, payload: &EventPayload) -> ObserverResult {
            if payload.event == Event::OptimizationStep {
                *self.steps.borrow_mut() += 1;
            }
            Ok(())
        }
    }

    let counter = Counter::default();
    let steps = Rc::clone(&counter.steps);
    let mut optimizer = optimizer(6);
    optimizer.subscribe(Event::OptimizationStep, counter);
    optimizer.maximize(2, 1).unwrap();
    optimizer.register(vec![3.0, 0.0], -9.0).unwrap();
    assert_eq!(*steps.borrow(), 4);
}
