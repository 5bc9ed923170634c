use bayes_opt::gp::{Hyperparameters, MAX_JITTER_ATTEMPTS};
use bayes_opt::prelude::*;

use super::{paraboloid, paraboloid_bounds, quick};

#[derive(Debug, PartialEq)]
enum EvalError {
    Crashed { call: usize },
    Engine(String),
}

impl From<Error> for EvalError {
    fn from(e: Error) -> Self {
        Self::Engine(e.to_string())
    }
}

struct Flaky {
    calls: usize,
    fail_on: usize,
}

impl Objective for Flaky {
    type Error = EvalError;

    fn evaluate(&mut self, params: &ParamMap) -> Result<f64, EvalError> {
        self.calls += 1;
        if self.calls == self.fail_on {
            return Err(EvalError::Crashed { call: self.calls });
        }
        Ok(-params["x"].powi(2))
    }
}

#[test]
fn test_objective_error_is_returned_unchanged() {
    let flaky = Flaky {
        calls: 0,
        fail_on: 4,
    };
    let mut optimizer = BayesianOptimization::builder(flaky, paraboloid_bounds())
        .seed(1)
        .acquisition_optimizer(quick())
        .build()
        .unwrap();

    let err = optimizer.maximize(2, 5).unwrap_err();
    assert_eq!(err, EvalError::Crashed { call: 4 });
    assert_eq!(optimizer.res().len(), 3);
    assert_eq!(optimizer.state(), OptimizerState::Idle);

    // the run can be resumed after the failure
    optimizer.objective_mut().fail_on = 0;
    optimizer.maximize(0, 2).unwrap();
    assert_eq!(optimizer.res().len(), 5);
}

#[test]
fn test_engine_errors_convert_into_objective_error() {
    let flaky = Flaky {
        calls: 0,
        fail_on: 0,
    };
    let mut optimizer = BayesianOptimization::builder(flaky, paraboloid_bounds())
        .build()
        .unwrap();
    let err = optimizer.probe(vec![1.0, 2.0, 3.0], false).unwrap_err();
    assert!(matches!(err, EvalError::Engine(msg) if msg.contains("dimension mismatch")));
}

#[test]
fn test_closure_errors_propagate() {
    let objective = |p: &ParamMap| -> Result<f64, Error> {
        if p["y"] > 100.0 {
            Ok(0.0)
        } else {
            Err(Error::Storage("objective unavailable".into()))
        }
    };
    let mut optimizer = BayesianOptimization::builder(objective, paraboloid_bounds())
        .build()
        .unwrap();
    let err = optimizer.maximize(1, 1).unwrap_err();
    assert!(matches!(err, Error::Storage(msg) if msg == "objective unavailable"));
    assert!(optimizer.res().is_empty());
}

#[test]
fn test_ill_conditioned_surrogate_aborts_maximize() {
    let mut optimizer = BayesianOptimization::builder(paraboloid, paraboloid_bounds())
        .seed(3)
        .acquisition_optimizer(quick())
        .hyperparameters(Hyperparameters::isotropic(2, f64::NAN, 1.0))
        .refit_interval(0)
        .build()
        .unwrap();

    let err = optimizer.maximize(2, 3).unwrap_err();
    let Error::IllConditionedModel { attempts } = err else {
        panic!("expected an ill-conditioned model, got {err:?}");
    };
    assert_eq!(attempts, MAX_JITTER_ATTEMPTS);
    assert_eq!(optimizer.res().len(), 2);
    assert_eq!(optimizer.iteration(), 0);
    assert_eq!(optimizer.state(), OptimizerState::Idle);
}
