//! Kinked-R - consumption-saving solver for a consumer who borrows at a higher
//! interest rate than they save at
//!
//! This library provides:
//! - Validated model parameters and a JSON loader
//! - Discretized permanent/transitory income shocks with unemployment
//! - Endogenous grid method solvers with and without an interest rate kink
//! - Finite and infinite horizon backward induction
//! - Impatience diagnostics and target wealth
//! - Parallel batch solving for parameter sweeps

pub mod error;
pub mod utility;
pub mod interpolation;
pub mod params;
pub mod solution;
pub mod solver;
pub mod model;
pub mod diagnostics;
pub mod batch;

// Re-export commonly used types
pub use error::ModelError;
pub use utility::CrraUtility;
pub use params::{Horizon, InterestSchedule, ModelParams, Preferences, RawParams};
pub use solution::{ConsumptionFunction, Regime, Solution, ValueFunction};
pub use solver::{IndShockSolver, KinkedRSolver, PeriodSolver};
pub use model::Model;
pub use diagnostics::ModelFactors;
pub use batch::{solve_batch, sweep_rboro};
