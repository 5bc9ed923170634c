use crate::event::Event;
use crate::objective::Objective;
use crate::types::OptimizerState;

use super::BayesianOptimization;

impl<O: Objective> BayesianOptimization<O> {
    /// Runs `init_points` random evaluations followed by `n_iter`
    /// model-guided iterations.
    ///
    /// Each iteration first evaluates every lazily probed point, in the
    /// order they were queued, then fits the surrogate, maximizes the
    /// acquisition function, and evaluates the result. Every evaluation fires
    /// [`Event::OptimizationStep`]; the call is framed by
    /// [`Event::OptimizationStart`] and [`Event::OptimizationEnd`].
    ///
    /// Calling it again continues from the accumulated observations. With an
    /// empty space, an empty queue, and `init_points == 0`, one random point
    /// is evaluated so the surrogate has data. With `n_iter == 0`, queued
    /// points are still evaluated.
    ///
    /// # Errors
    ///
    /// An objective error aborts the run and is returned unchanged; engine
    /// errors are converted into `O::Error`. The optimizer is `Idle`
    /// afterwards either way, and everything registered so far is kept.
    ///
    /// # Examples
    ///
    /// ```
    /// use bayes_opt::prelude::*;
    ///
    /// let objective = |p: &ParamMap| -> Result<f64, Error> { Ok(-p["x"].abs()) };
    /// let mut optimizer = BayesianOptimization::builder(objective, Bounds::from([("x", (-1.0, 1.0))]))
    ///     .seed(0)
    ///     .build()?;
    ///
    /// optimizer.maximize(2, 3)?;
    /// optimizer.maximize(0, 2)?;
    /// assert_eq!(optimizer.iteration(), 5);
    /// # Ok::<_, Error>(())
    /// ```
    pub fn maximize(&mut self, init_points: usize, n_iter: usize) -> Result<(), O::Error> {
        #[cfg(feature = "tracing")]
        let _span = tracing::info_span!("maximize", init_points, n_iter).entered();

        let result = self.run(init_points, n_iter);
        self.state = OptimizerState::Idle;
        result
    }

    fn run(&mut self, init_points: usize, n_iter: usize) -> Result<(), O::Error> {
        trace_info!(
            observations = self.space.len(),
            queued = self.queue.len(),
            "optimization started"
        );
        self.notify(Event::OptimizationStart);

        self.state = OptimizerState::Initializing;
        let init_points = if init_points == 0 && self.space.is_empty() && self.queue.is_empty() {
            1
        } else {
            init_points
        };
        for _ in 0..init_points {
            let point = self.space.random_sample(&mut self.rng);
            self.evaluate(point)?;
            self.state = OptimizerState::Initializing;
        }

        if n_iter == 0 {
            self.drain_queue()?;
        }
        for _ in 0..n_iter {
            self.drain_queue()?;

            self.state = OptimizerState::Suggesting;
            let point = self.next_point()?;
            self.evaluate(point)?;

            self.iteration += 1;
            self.after_iteration()?;
        }

        trace_info!(
            observations = self.space.len(),
            best = ?self.space.max().map(|o| o.target),
            "optimization finished"
        );
        self.notify(Event::OptimizationEnd);
        Ok(())
    }

    /// Evaluates queued lazy probes in FIFO order.
    fn drain_queue(&mut self) -> Result<(), O::Error> {
        while let Some(point) = self.queue.pop_front() {
            self.state = OptimizerState::LazyDraining;
            self.evaluate(point)?;
        }
        Ok(())
    }

    /// Applies the bounds transformer and the kappa decay schedule.
    fn after_iteration(&mut self) -> crate::Result<()> {
        if let Some(transformer) = self.bounds_transformer.as_mut()
            && let Some(bounds) = transformer.transform(&self.space)
        {
            self.set_bounds(bounds)?;
        }
        self.kappa_decay.apply(&mut self.acquisition, self.iteration);
        Ok(())
    }
}
