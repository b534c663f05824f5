//! JSON parameter loader
//!
//! Reads a flat parameter record from data/kinked_r.json or any other path.
//! Every field is optional and falls back to the kinked-R consumer defaults.
//! The conventional CamelCase names such as `CRRA` or `Rboro` are accepted
//! as aliases.

use std::error::Error;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::{
    AssetGrid, AssetGridParams, Horizon, IncomeDistribution, IncomeParams, InterestSchedule,
    ModelParams, Preferences, DEFAULT_MAX_ITERATIONS, DEFAULT_TOLERANCE,
};
use crate::error::ModelError;

/// Default path to the parameter file
pub const DEFAULT_PARAMS_PATH: &str = "data/kinked_r.json";

/// Unvalidated parameter record as it appears on disk
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawParams {
    #[serde(alias = "CRRA")]
    pub crra: f64,
    #[serde(alias = "DiscFac")]
    pub disc_fac: f64,
    #[serde(alias = "LivPrb")]
    pub liv_prb: f64,
    #[serde(alias = "PermGroFac")]
    pub perm_gro_fac: f64,
    #[serde(alias = "Rboro")]
    pub rboro: f64,
    #[serde(alias = "Rsave")]
    pub rsave: f64,
    #[serde(alias = "PermShkStd")]
    pub perm_shk_std: f64,
    #[serde(alias = "PermShkCount")]
    pub perm_shk_count: usize,
    #[serde(alias = "TranShkStd")]
    pub tran_shk_std: f64,
    #[serde(alias = "TranShkCount")]
    pub tran_shk_count: usize,
    #[serde(alias = "UnempPrb")]
    pub unemp_prb: f64,
    #[serde(alias = "IncUnemp")]
    pub inc_unemp: f64,
    #[serde(alias = "aXtraMin")]
    pub a_xtra_min: f64,
    #[serde(alias = "aXtraMax")]
    pub a_xtra_max: f64,
    #[serde(alias = "aXtraCount")]
    pub a_xtra_count: usize,
    #[serde(alias = "aXtraNestFac")]
    pub a_xtra_nest_fac: u32,
    #[serde(alias = "aXtraExtra")]
    pub a_xtra_extra: Vec<f64>,
    #[serde(alias = "BoroCnstArt")]
    pub boro_cnst_art: Option<f64>,
    /// Number of periods; absent means infinite horizon
    #[serde(alias = "T_cycle")]
    pub periods: Option<usize>,
    pub tolerance: f64,
    pub max_iterations: usize,
    #[serde(alias = "vFuncBool")]
    pub vfunc_bool: bool,
    #[serde(alias = "CubicBool")]
    pub cubic_bool: bool,
}

impl Default for RawParams {
    fn default() -> Self {
        let income = IncomeParams::default();
        let grid = AssetGridParams::default();
        Self {
            crra: 2.0,
            disc_fac: 0.96,
            liv_prb: 0.98,
            perm_gro_fac: 1.01,
            rboro: 1.20,
            rsave: 1.02,
            perm_shk_std: income.perm_shk_std,
            perm_shk_count: income.perm_shk_count,
            tran_shk_std: income.tran_shk_std,
            tran_shk_count: income.tran_shk_count,
            unemp_prb: income.unemp_prb,
            inc_unemp: income.inc_unemp,
            a_xtra_min: grid.a_xtra_min,
            a_xtra_max: grid.a_xtra_max,
            a_xtra_count: grid.a_xtra_count,
            a_xtra_nest_fac: grid.a_xtra_nest_fac,
            a_xtra_extra: grid.a_xtra_extra,
            boro_cnst_art: None,
            periods: None,
            tolerance: DEFAULT_TOLERANCE,
            max_iterations: DEFAULT_MAX_ITERATIONS,
            vfunc_bool: false,
            cubic_bool: false,
        }
    }
}

impl RawParams {
    pub fn income_params(&self) -> IncomeParams {
        IncomeParams {
            perm_shk_std: self.perm_shk_std,
            perm_shk_count: self.perm_shk_count,
            tran_shk_std: self.tran_shk_std,
            tran_shk_count: self.tran_shk_count,
            unemp_prb: self.unemp_prb,
            inc_unemp: self.inc_unemp,
        }
    }

    pub fn grid_params(&self) -> AssetGridParams {
        AssetGridParams {
            a_xtra_min: self.a_xtra_min,
            a_xtra_max: self.a_xtra_max,
            a_xtra_count: self.a_xtra_count,
            a_xtra_nest_fac: self.a_xtra_nest_fac,
            a_xtra_extra: self.a_xtra_extra.clone(),
        }
    }

    pub fn horizon(&self) -> Horizon {
        match self.periods {
            Some(periods) => Horizon::Finite { periods },
            None => Horizon::Infinite {
                tolerance: self.tolerance,
                max_iterations: self.max_iterations,
            },
        }
    }

    /// Validate and build the immutable configuration
    pub fn into_params(self) -> Result<ModelParams, ModelError> {
        // Checked first so a cubic request fails before any other work
        if self.cubic_bool {
            return Err(ModelError::UnsupportedConfiguration(
                "cubic interpolation is not available for the kinked interest rate model".to_string(),
            ));
        }
        let prefs = Preferences::new(self.crra, self.disc_fac, self.liv_prb, self.perm_gro_fac)?;
        let rates = InterestSchedule::new(self.rboro, self.rsave)?;
        let income = IncomeDistribution::from_params(&self.income_params())?;
        let grid = AssetGrid::from_params(&self.grid_params())?;
        ModelParams::new(
            prefs,
            rates,
            income,
            self.unemp_prb,
            grid,
            self.boro_cnst_art,
            self.horizon(),
            self.vfunc_bool,
            self.cubic_bool,
        )
    }
}

/// Read the raw parameter record from a JSON file
pub fn load_raw_params(path: &Path) -> Result<RawParams, Box<dyn Error>> {
    let file = File::open(path)?;
    let raw = serde_json::from_reader(BufReader::new(file))?;
    Ok(raw)
}

/// Read and validate parameters from a JSON file
pub fn load_params(path: &Path) -> Result<ModelParams, Box<dyn Error>> {
    let params = load_raw_params(path)?.into_params()?;
    Ok(params)
}

/// Read parameters from the default location
pub fn load_default_params() -> Result<ModelParams, Box<dyn Error>> {
    load_params(Path::new(DEFAULT_PARAMS_PATH))
}
