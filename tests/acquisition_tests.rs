//! Integration tests for acquisition functions and their optimizer.

use bayes_opt::acquisition::AcquisitionOptimizer;
use bayes_opt::gp::{GaussianProcess, Prediction};
use bayes_opt::{AcquisitionFunction, Bounds, ParameterSpace};

fn fitted(space: &ParameterSpace) -> GaussianProcess {
    let mut gp = GaussianProcess::new();
    gp.set_training_data(space.params(), space.targets())
        .unwrap();
    gp.fit().unwrap();
    gp
}

fn small_optimizer() -> AcquisitionOptimizer {
    AcquisitionOptimizer::builder()
        .n_warmup(500)
        .n_restarts(4)
        .build()
}

#[test]
fn ucb_is_mean_plus_scaled_std() {
    let p = Prediction {
        mean: 0.5,
        std: 0.25,
    };
    assert_eq!(AcquisitionFunction::ucb(2.0).evaluate(p, 10.0), 1.0);
    assert_eq!(AcquisitionFunction::default(), AcquisitionFunction::ucb(2.576));
}

#[test]
fn ei_and_pi_vanish_without_uncertainty() {
    let p = Prediction {
        mean: 100.0,
        std: 0.0,
    };
    assert_eq!(AcquisitionFunction::ei(0.0).evaluate(p, 0.0), 0.0);
    assert_eq!(AcquisitionFunction::poi(0.0).evaluate(p, 0.0), 0.0);
}

#[test]
fn larger_xi_lowers_improvement_scores() {
    let p = Prediction {
        mean: 1.0,
        std: 0.5,
    };
    let ei = |xi| AcquisitionFunction::ei(xi).evaluate(p, 1.0);
    let poi = |xi| AcquisitionFunction::poi(xi).evaluate(p, 1.0);
    assert!(ei(0.0) > ei(0.5));
    assert!(poi(0.0) > poi(0.5));
}

#[test]
fn score_requires_a_fitted_model() {
    let gp = GaussianProcess::new();
    let acq = AcquisitionFunction::default();
    assert!(acq.score(&[0.0], &gp, 0.0).is_err());
}

#[test]
fn suggestions_stay_inside_bounds() {
    let bounds = Bounds::from([("x", (-2.0, 2.0)), ("y", (0.0, 5.0))]);
    let mut space = ParameterSpace::new(bounds).unwrap();
    space.register(vec![0.0, 1.0], 1.0).unwrap();
    space.register(vec![1.5, 4.0], -2.0).unwrap();
    space.register(vec![-1.0, 2.5], 0.3).unwrap();
    let gp = fitted(&space);

    let mut rng = fastrand::Rng::with_seed(5);
    for acq in [
        AcquisitionFunction::ucb(10.0),
        AcquisitionFunction::ei(0.0),
        AcquisitionFunction::poi(0.01),
    ] {
        let c = small_optimizer().maximize(&acq, &gp, &space, 1.0, &mut rng);
        assert!(space.in_bounds(&c.point), "{:?}", c.point);
        assert!(c.score.is_finite());
    }
}

#[test]
fn boundary_maximum_is_reached_exactly() {
    // Monotone data pushes the UCB maximum onto the upper edge of x.
    let mut space = ParameterSpace::new(Bounds::from([("x", (0.0, 1.0))]))
        .unwrap();
    for i in 0..5 {
        let x = f64::from(i) / 4.0;
        space.register(vec![x * 0.8], x).unwrap();
    }
    let gp = fitted(&space);
    let mut rng = fastrand::Rng::with_seed(9);
    let acq = AcquisitionFunction::ucb(5.0);
    let c = small_optimizer().maximize(&acq, &gp, &space, 1.0, &mut rng);
    assert_eq!(c.point, vec![1.0]);
}

#[test]
fn same_seed_gives_same_suggestion() {
    let bounds = Bounds::from([("a", (0.0, 1.0)), ("b", (0.0, 1.0))]);
    let mut space = ParameterSpace::new(bounds).unwrap();
    space.register(vec![0.2, 0.3], 0.1).unwrap();
    space.register(vec![0.7, 0.9], 0.6).unwrap();
    let gp = fitted(&space);
    let acq = AcquisitionFunction::ei(0.01);

    let run = |seed| {
        let mut rng = fastrand::Rng::with_seed(seed);
        small_optimizer().maximize(&acq, &gp, &space, 0.6, &mut rng)
    };
    let (a, b) = (run(1), run(1));
    assert_eq!(a, b);
}

#[test]
fn zero_warmup_still_returns_a_point() {
    let mut space = ParameterSpace::new(Bounds::from([("x", (3.0, 4.0))]))
        .unwrap();
    space.register(vec![3.5], 0.0).unwrap();
    let gp = fitted(&space);
    let optimizer = AcquisitionOptimizer::builder()
        .n_warmup(0)
        .n_restarts(0)
        .build();
    let mut rng = fastrand::Rng::with_seed(2);
    let c = optimizer.maximize(&AcquisitionFunction::default(), &gp, &space, 0.0, &mut rng);
    assert!(space.in_bounds(&c.point));
}

#[test]
fn improvement_scores_vanish_at_observed_points() {
    let bounds = Bounds::from([("x", (0.0, 1.0)), ("y", (0.0, 1.0))]);
    let mut space = ParameterSpace::new(bounds).unwrap();
    space.register(vec![0.1, 0.2], 0.4).unwrap();
    space.register(vec![0.6, 0.9], 1.3).unwrap();
    space.register(vec![0.8, 0.3], -0.2).unwrap();
    let gp = fitted(&space);

    for o in space.observations() {
        for acq in [AcquisitionFunction::ei(0.0), AcquisitionFunction::poi(0.0)] {
            let score = acq.score(&o.params, &gp, 1.3).unwrap();
            assert_eq!(score, 0.0, "{acq:?} at {:?}", o.params);
        }
    }
    assert!(gp.predict(&[0.35, 0.55]).unwrap().std > 0.0);
}
