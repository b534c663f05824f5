//! Batch solving for parameter sweeps
//!
//! Model instances share no mutable state, so independent parameterizations
//! are solved in parallel on the rayon thread pool.

use rayon::prelude::*;

use crate::error::ModelError;
use crate::model::Model;
use crate::params::{InterestSchedule, ModelParams};
use crate::solution::Solution;

/// Solve each parameterization with the kinked-R solver, in input order
pub fn solve_batch(params: &[ModelParams]) -> Vec<Result<Vec<Solution>, ModelError>> {
    params
        .par_iter()
        .map(|p| {
            let mut model = Model::new(p.clone());
            model.solve()?;
            Ok(model.into_solutions())
        })
        .collect()
}

/// One point of an Rboro sweep
#[derive(Debug, Clone)]
pub struct SweepPoint {
    pub rboro: f64,
    pub solution: Result<Solution, ModelError>,
}

/// Solve `base` once per borrowing factor, keeping the first-period solution
pub fn sweep_rboro(base: &ModelParams, rboro_values: &[f64]) -> Vec<SweepPoint> {
    let rsave = base.rates().rsave();
    rboro_values
        .par_iter()
        .map(|&rboro| {
            let solution = InterestSchedule::new(rboro, rsave).and_then(|rates| {
                let mut model = Model::new(base.with_rates(rates));
                model.solve()?;
                let first = model.into_solutions().into_iter().next();
                first.ok_or_else(|| ModelError::invalid("model produced no solutions"))
            });
            if let Err(e) = &solution {
                log::warn!("Rboro {rboro}: {e}");
            }
            SweepPoint { rboro, solution }
        })
        .collect()
}
