//! Backward induction driver
//!
//! A `Model` owns its parameters and a per-period solver. Solving runs the
//! solver backward from the terminal period:
//! - finite horizon: `periods` solves, stored in chronological order with the
//!   terminal solution last
//! - infinite horizon: repeated solves until the sup-norm distance between
//!   successive consumption functions falls below the tolerance

use std::time::Instant;

use crate::diagnostics::ModelFactors;
use crate::error::ModelError;
use crate::params::{Horizon, ModelParams};
use crate::solution::Solution;
use crate::solver::{IndShockSolver, KinkedRSolver, PeriodSolver};

/// A configured consumption-saving model and its solutions
pub struct Model {
    params: ModelParams,
    solver: Box<dyn PeriodSolver>,
    solutions: Vec<Solution>,
    iterations: usize,
}

impl Model {
    /// Kinked interest rate model
    pub fn new(params: ModelParams) -> Self {
        Self::with_solver(params, Box::new(KinkedRSolver))
    }

    /// Single interest factor model; fails when Rboro != Rsave
    pub fn ind_shock(params: ModelParams) -> Result<Self, ModelError> {
        IndShockSolver.check_rates(params.rates())?;
        Ok(Self::with_solver(params, Box::new(IndShockSolver)))
    }

    pub fn with_solver(params: ModelParams, solver: Box<dyn PeriodSolver>) -> Self {
        Self {
            params,
            solver,
            solutions: Vec::new(),
            iterations: 0,
        }
    }

    pub fn params(&self) -> &ModelParams {
        &self.params
    }

    pub fn solver_name(&self) -> &'static str {
        self.solver.name()
    }

    /// Solutions from the last successful `solve`, earliest period first
    pub fn solutions(&self) -> &[Solution] {
        &self.solutions
    }

    /// First-period (or converged) solution, if solved
    pub fn first(&self) -> Option<&Solution> {
        self.solutions.first()
    }

    /// Number of backward steps the last solve took
    pub fn iterations(&self) -> usize {
        self.iterations
    }

    /// Consume the model and keep only its solutions
    pub fn into_solutions(self) -> Vec<Solution> {
        self.solutions
    }

    /// Solve the model, replacing any earlier solutions
    pub fn solve(&mut self) -> Result<&[Solution], ModelError> {
        self.solutions.clear();
        self.iterations = 0;
        self.solver.check_rates(self.params.rates())?;

        let start = Instant::now();
        let terminal = Solution::terminal(self.params.utility())?;
        let solutions = match self.params.horizon() {
            Horizon::Finite { periods } => self.solve_finite(terminal, periods)?,
            Horizon::Infinite { tolerance, max_iterations } => {
                ModelFactors::compute(&self.params).log_failures();
                vec![self.solve_infinite(terminal, tolerance, max_iterations)?]
            }
        };
        log::info!(
            "{} model solved in {} steps ({:?})",
            self.solver.name(),
            self.iterations,
            start.elapsed()
        );
        self.solutions = solutions;
        Ok(&self.solutions)
    }

    fn solve_finite(&mut self, terminal: Solution, periods: usize) -> Result<Vec<Solution>, ModelError> {
        let mut backward = Vec::with_capacity(periods + 1);
        backward.push(terminal);
        for t in (0..periods).rev() {
            let soln = self.solver.solve_period(&self.params, &backward[backward.len() - 1])?;
            log::debug!(
                "period {t}: mNrmMin {:.6}, MPC range [{:.6}, {:.6}]",
                soln.m_nrm_min(),
                soln.mpc_min(),
                soln.mpc_max()
            );
            backward.push(soln);
            self.iterations += 1;
        }
        backward.reverse();
        Ok(backward)
    }

    fn solve_infinite(
        &mut self,
        terminal: Solution,
        tolerance: f64,
        max_iterations: usize,
    ) -> Result<Solution, ModelError> {
        let mut current = terminal;
        let mut distance = f64::INFINITY;
        for iteration in 1..=max_iterations {
            let soln = self.solver.solve_period(&self.params, &current)?;
            distance = soln.consumption().distance(current.consumption());
            current = soln;
            self.iterations = iteration;
            log::debug!("iteration {iteration}: distance {distance:.3e}");
            if distance < tolerance {
                log::info!("converged after {iteration} iterations (distance {distance:.3e})");
                return Ok(current);
            }
        }
        log::error!("no convergence after {max_iterations} iterations (distance {distance:.3e})");
        Err(ModelError::Convergence {
            iterations: max_iterations,
            distance,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::RawParams;
    use approx::assert_relative_eq;

    fn finite(periods: usize) -> ModelParams {
        RawParams { periods: Some(periods), ..Default::default() }.into_params().unwrap()
    }

    #[test]
    fn test_finite_horizon_order() {
        let mut model = Model::new(finite(3));
        let solutions = model.solve().unwrap();
        assert_eq!(solutions.len(), 4);

        // Terminal period last: consume everything
        let last = &solutions[3];
        assert_eq!(last.c(0.7), 0.7);
        assert_eq!(last.mpc_min(), 1.0);

        // Earlier periods save more at the top of the grid
        assert!(solutions[0].c(10.0) < solutions[2].c(10.0));
        assert!(solutions[0].h_nrm() > solutions[2].h_nrm());
        assert_eq!(model.iterations(), 3);
    }

    #[test]
    fn test_infinite_horizon_converges() {
        let params = RawParams { perm_gro_fac: 1.0, ..Default::default() }
            .into_params()
            .unwrap();
        let mut model = Model::new(params);
        model.solve().unwrap();
        assert_eq!(model.solutions().len(), 1);
        let soln = model.first().unwrap();

        // One more step from the fixed point barely moves it
        let again = KinkedRSolver.solve_period(model.params(), soln).unwrap();
        assert!(again.consumption().distance(soln.consumption()) < 1e-9);
        assert!(soln.consumption().kinks().is_some());
    }

    #[test]
    fn test_iteration_cap_reports_convergence_error() {
        let params = RawParams { max_iterations: 3, ..Default::default() }
            .into_params()
            .unwrap();
        let mut model = Model::new(params);
        match model.solve() {
            Err(ModelError::Convergence { iterations, distance }) => {
                assert_eq!(iterations, 3);
                assert!(distance > 1e-10);
            }
            other => panic!("expected convergence error, got {:?}", other.map(|s| s.len())),
        }
        assert!(model.solutions().is_empty());
    }

    #[test]
    fn test_ind_shock_model_rejects_kink() {
        assert!(Model::ind_shock(ModelParams::default_kinked()).is_err());
    }

    #[test]
    fn test_flat_rates_match_ind_shock() {
        let params = RawParams { rboro: 1.03, rsave: 1.03, periods: Some(4), ..Default::default() }
            .into_params()
            .unwrap();
        let mut kinked = Model::new(params.clone());
        let mut plain = Model::ind_shock(params).unwrap();
        let a = kinked.solve().unwrap().to_vec();
        let b = plain.solve().unwrap();
        assert_eq!(a.as_slice(), b);
        assert_relative_eq!(a[0].c(1.5), b[0].c(1.5));
    }
}
