//! Single interest factor solver (idiosyncratic shocks, no kink)

use super::{EndState, PeriodSolver};
use crate::error::ModelError;
use crate::params::{AssetGrid, InterestSchedule};

/// Endogenous grid solver for a consumer facing one interest factor
///
/// Only linear interpolation is supported.
#[derive(Debug, Clone, Copy, Default)]
pub struct IndShockSolver;

impl PeriodSolver for IndShockSolver {
    fn name(&self) -> &'static str {
        "IndShock"
    }

    fn check_rates(&self, rates: &InterestSchedule) -> Result<(), ModelError> {
        if rates.is_kinked() {
            return Err(ModelError::invalid(format!(
                "IndShock solver needs Rboro == Rsave (got {} and {})",
                rates.rboro(),
                rates.rsave()
            )));
        }
        Ok(())
    }

    fn end_of_period_states(
        &self,
        grid: &AssetGrid,
        a_nrm_min: f64,
        _rates: &InterestSchedule,
    ) -> Vec<EndState> {
        grid.points().iter().map(|x| EndState::at(x + a_nrm_min)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::{Horizon, ModelParams, RawParams};
    use crate::solution::Solution;
    use crate::solver::PeriodSolver;

    fn flat_params() -> ModelParams {
        RawParams { rboro: 1.03, rsave: 1.03, periods: Some(1), ..Default::default() }
            .into_params()
            .unwrap()
    }

    #[test]
    fn test_states_shift_grid_to_minimum() {
        let grid = AssetGrid::new(vec![0.5, 1.0, 2.0]).unwrap();
        let rates = InterestSchedule::flat(1.03).unwrap();
        let states = IndShockSolver.end_of_period_states(&grid, -1.0, &rates);
        let levels: Vec<f64> = states.iter().map(|s| s.a).collect();
        assert_eq!(levels, vec![-0.5, 0.0, 1.0]);
    }

    #[test]
    fn test_rejects_kinked_rates() {
        let params = ModelParams::default_kinked();
        let terminal = Solution::terminal(params.utility()).unwrap();
        let err = IndShockSolver.solve_period(&params, &terminal).unwrap_err();
        assert!(matches!(err, ModelError::InvalidParameter(_)));
    }

    #[test]
    fn test_one_period_solution_is_increasing_and_concave() {
        let params = flat_params();
        assert_eq!(params.horizon(), Horizon::Finite { periods: 1 });
        let terminal = Solution::terminal(params.utility()).unwrap();
        let soln = IndShockSolver.solve_period(&params, &terminal).unwrap();

        let cf = soln.consumption();
        assert!(cf.kinks().is_none());
        let pieces = cf.pieces();
        assert!(pieces.windows(2).all(|w| w[1].c > w[0].c));
        // MPC falls as resources grow
        let mpcs: Vec<f64> = pieces[1..pieces.len() - 1].iter().map(|p| p.slope).collect();
        assert!(mpcs.windows(2).all(|w| w[1] <= w[0] + 1e-9));
        // Natural borrowing limit is negative because unemployment pays 0.3
        assert!(soln.m_nrm_min() < 0.0);
        assert_eq!(soln.c(soln.m_nrm_min()), 0.0);
    }
}
