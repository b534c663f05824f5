//! Per-period solvers for the consumption-saving problem
//!
//! Both variants run the same endogenous grid method (see `egm`). They differ
//! only in how the end-of-period asset states are laid out:
//! - `IndShockSolver`: one interest factor, states are the asset grid shifted
//!   to the borrowing limit
//! - `KinkedRSolver`: borrowing costs more than saving pays, so the zero asset
//!   level is represented twice, once under each factor
//!
//! # Example
//!
//! ```rust,ignore
//! use kinked_r::{ModelParams, Solution, solver::{KinkedRSolver, PeriodSolver}};
//!
//! let params = ModelParams::default_kinked();
//! let terminal = Solution::terminal(params.utility())?;
//! let soln = KinkedRSolver.solve_period(&params, &terminal)?;
//! println!("kinks at {:?}", soln.consumption().kinks());
//! ```

mod egm;
mod ind_shock;
mod kinked;

pub use egm::{end_of_period_v, end_of_period_vp, natural_borrowing_limit};
pub use ind_shock::IndShockSolver;
pub use kinked::KinkedRSolver;

use crate::error::ModelError;
use crate::params::{AssetGrid, AssetSide, InterestSchedule, ModelParams};
use crate::solution::Solution;

/// An end-of-period asset level and the side of zero it belongs to
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EndState {
    pub a: f64,
    pub side: AssetSide,
}

impl EndState {
    /// An ordinary asset level; its side follows from its sign
    pub fn at(a: f64) -> Self {
        Self { a, side: AssetSide::of(a) }
    }
}

/// Capability to solve one period given the next period's solution
pub trait PeriodSolver: Send + Sync {
    /// Short name used in logs
    fn name(&self) -> &'static str;

    /// Reject interest schedules this variant cannot represent
    fn check_rates(&self, _rates: &InterestSchedule) -> Result<(), ModelError> {
        Ok(())
    }

    /// End-of-period states in increasing order of assets
    fn end_of_period_states(
        &self,
        grid: &AssetGrid,
        a_nrm_min: f64,
        rates: &InterestSchedule,
    ) -> Vec<EndState>;

    /// Solve this period backward from `next`
    fn solve_period(&self, params: &ModelParams, next: &Solution) -> Result<Solution, ModelError> {
        self.check_rates(params.rates())?;
        egm::solve_period(self, params, next)
    }
}
