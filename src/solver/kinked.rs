//! Kinked interest rate solver: Rboro on debt, Rsave on savings

use super::{EndState, PeriodSolver};
use crate::params::{AssetGrid, AssetSide, InterestSchedule};

/// Endogenous grid solver for a consumer who borrows at Rboro and saves at Rsave
///
/// When Rboro > Rsave and borrowing is possible, zero end-of-period assets
/// enter the grid twice: once carried at Rboro and once at Rsave. Both points
/// invert to a = 0, so they land on c = m and bound the no-trade plateau.
/// When the factors are equal no sentinels are added and the solver behaves
/// exactly like `IndShockSolver`.
#[derive(Debug, Clone, Copy, Default)]
pub struct KinkedRSolver;

impl PeriodSolver for KinkedRSolver {
    fn name(&self) -> &'static str {
        "KinkedR"
    }

    fn end_of_period_states(
        &self,
        grid: &AssetGrid,
        a_nrm_min: f64,
        rates: &InterestSchedule,
    ) -> Vec<EndState> {
        let with_kink = rates.is_kinked() && a_nrm_min <= 0.0;

        let mut states: Vec<EndState> = grid
            .points()
            .iter()
            .map(|x| x + a_nrm_min)
            // An ordinary point exactly at zero would duplicate the sentinels
            .filter(|a| !(with_kink && *a == 0.0))
            .map(EndState::at)
            .collect();

        if with_kink {
            let at = states.partition_point(|s| s.a < 0.0);
            states.splice(
                at..at,
                [
                    EndState { a: 0.0, side: AssetSide::NegativeZero },
                    EndState { a: 0.0, side: AssetSide::PositiveZero },
                ],
            );
        }
        states
    }
}
