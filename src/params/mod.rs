//! Model parameters: preferences, interest factors, income shocks and the asset grid
//!
//! `ModelParams` is the validated, immutable configuration a model instance is
//! solved from. It is built either in code via `ModelParams::new` or from a
//! JSON record via the loader.

mod interest;
mod grid;
mod income;
pub mod loader;

pub use interest::{AssetSide, InterestSchedule};
pub use grid::{AssetGrid, AssetGridParams, make_grid_exp_mult};
pub use income::{IncomeDistribution, IncomeParams, IncomeShock, mean_one_lognormal};
pub use loader::{RawParams, load_params, DEFAULT_PARAMS_PATH};

use serde::{Deserialize, Serialize};

use crate::error::ModelError;
use crate::utility::CrraUtility;

/// Default sup-norm tolerance for infinite-horizon convergence
pub const DEFAULT_TOLERANCE: f64 = 1e-10;

/// Default cap on infinite-horizon iterations
pub const DEFAULT_MAX_ITERATIONS: usize = 10_000;

/// Preference and growth parameters shared by every period
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Preferences {
    crra: f64,
    disc_fac: f64,
    liv_prb: f64,
    perm_gro_fac: f64,
}

impl Preferences {
    pub fn new(crra: f64, disc_fac: f64, liv_prb: f64, perm_gro_fac: f64) -> Result<Self, ModelError> {
        if !(crra > 0.0 && crra.is_finite()) {
            return Err(ModelError::invalid(format!("CRRA must be positive (got {crra})")));
        }
        if !(disc_fac > 0.0 && disc_fac.is_finite()) {
            return Err(ModelError::invalid(format!("DiscFac must be positive (got {disc_fac})")));
        }
        if !(liv_prb > 0.0 && liv_prb <= 1.0) {
            return Err(ModelError::invalid(format!("LivPrb must lie in (0, 1] (got {liv_prb})")));
        }
        if !(perm_gro_fac > 0.0 && perm_gro_fac.is_finite()) {
            return Err(ModelError::invalid(format!("PermGroFac must be positive (got {perm_gro_fac})")));
        }
        Ok(Self { crra, disc_fac, liv_prb, perm_gro_fac })
    }

    pub fn crra(&self) -> f64 {
        self.crra
    }

    pub fn disc_fac(&self) -> f64 {
        self.disc_fac
    }

    pub fn liv_prb(&self) -> f64 {
        self.liv_prb
    }

    pub fn perm_gro_fac(&self) -> f64 {
        self.perm_gro_fac
    }

    /// Discount factor adjusted for survival, β·L
    pub fn disc_fac_eff(&self) -> f64 {
        self.disc_fac * self.liv_prb
    }
}

/// Number of periods to solve
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Horizon {
    /// Solve this many periods back from the terminal period
    Finite { periods: usize },
    /// Iterate to a fixed point of the per-period solve
    Infinite { tolerance: f64, max_iterations: usize },
}

impl Horizon {
    pub fn infinite() -> Self {
        Horizon::Infinite {
            tolerance: DEFAULT_TOLERANCE,
            max_iterations: DEFAULT_MAX_ITERATIONS,
        }
    }

    fn validate(&self) -> Result<(), ModelError> {
        match *self {
            Horizon::Finite { periods } if periods == 0 => {
                Err(ModelError::invalid("finite horizon needs at least one period"))
            }
            Horizon::Infinite { tolerance, max_iterations } => {
                if !(tolerance > 0.0 && tolerance.is_finite()) {
                    return Err(ModelError::invalid("convergence tolerance must be positive"));
                }
                if max_iterations == 0 {
                    return Err(ModelError::invalid("max_iterations must be at least 1"));
                }
                Ok(())
            }
            Horizon::Finite { .. } => Ok(()),
        }
    }
}

/// Validated configuration of one model instance
#[derive(Debug, Clone, PartialEq)]
pub struct ModelParams {
    prefs: Preferences,
    rates: InterestSchedule,
    income: IncomeDistribution,
    /// Probability of unemployment, kept for the weak return impatience factor
    unemp_prb: f64,
    grid: AssetGrid,
    boro_cnst_art: Option<f64>,
    horizon: Horizon,
    vfunc_bool: bool,
}

impl ModelParams {
    /// Assemble a configuration, rejecting cubic interpolation up front
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        prefs: Preferences,
        rates: InterestSchedule,
        income: IncomeDistribution,
        unemp_prb: f64,
        grid: AssetGrid,
        boro_cnst_art: Option<f64>,
        horizon: Horizon,
        vfunc_bool: bool,
        cubic_bool: bool,
    ) -> Result<Self, ModelError> {
        if cubic_bool {
            return Err(ModelError::UnsupportedConfiguration(
                "cubic interpolation is not available for the kinked interest rate model".to_string(),
            ));
        }
        if let Some(cnst) = boro_cnst_art {
            if !cnst.is_finite() {
                return Err(ModelError::invalid("BoroCnstArt must be finite when given"));
            }
        }
        horizon.validate()?;
        Ok(Self {
            prefs,
            rates,
            income,
            unemp_prb,
            grid,
            boro_cnst_art,
            horizon,
            vfunc_bool,
        })
    }

    /// The default kinked-R consumer (Rboro 1.20, Rsave 1.02)
    pub fn default_kinked() -> Self {
        RawParams::default()
            .into_params()
            .expect("default parameters are valid")
    }

    pub fn prefs(&self) -> &Preferences {
        &self.prefs
    }

    pub fn rates(&self) -> &InterestSchedule {
        &self.rates
    }

    /// CRRA utility implied by the preferences
    pub fn utility(&self) -> CrraUtility {
        CrraUtility::new(self.prefs.crra())
    }

    pub fn income(&self) -> &IncomeDistribution {
        &self.income
    }

    pub fn unemp_prb(&self) -> f64 {
        self.unemp_prb
    }

    pub fn grid(&self) -> &AssetGrid {
        &self.grid
    }

    pub fn boro_cnst_art(&self) -> Option<f64> {
        self.boro_cnst_art
    }

    pub fn horizon(&self) -> Horizon {
        self.horizon
    }

    pub fn vfunc_bool(&self) -> bool {
        self.vfunc_bool
    }

    /// Copy with a different interest schedule (used by parameter sweeps)
    pub fn with_rates(&self, rates: InterestSchedule) -> Self {
        Self { rates, ..self.clone() }
    }

    /// Copy with a different horizon
    pub fn with_horizon(&self, horizon: Horizon) -> Result<Self, ModelError> {
        horizon.validate()?;
        Ok(Self { horizon, ..self.clone() })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preferences_validation() {
        assert!(Preferences::new(2.0, 0.96, 0.98, 1.01).is_ok());
        assert!(matches!(
            Preferences::new(0.0, 0.96, 0.98, 1.01),
            Err(ModelError::InvalidParameter(_))
        ));
        assert!(Preferences::new(-1.0, 0.96, 0.98, 1.01).is_err());
        assert!(Preferences::new(2.0, 0.96, 1.5, 1.01).is_err());
    }

    #[test]
    fn test_cubic_rejected() {
        let raw = RawParams { cubic_bool: true, ..Default::default() };
        let err = raw.into_params().unwrap_err();
        assert!(matches!(err, ModelError::UnsupportedConfiguration(_)));
    }

    #[test]
    fn test_default_kinked() {
        let params = ModelParams::default_kinked();
        assert!(params.rates().is_kinked());
        assert_eq!(params.grid().len(), 48);
        assert_eq!(params.horizon(), Horizon::infinite());
        assert_eq!(params.boro_cnst_art(), None);
    }

    #[test]
    fn test_zero_period_horizon_rejected() {
        let params = ModelParams::default_kinked();
        assert!(params.with_horizon(Horizon::Finite { periods: 0 }).is_err());
    }
}
