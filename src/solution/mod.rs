//! Per-period solution objects
//!
//! A `Solution` bundles the consumption function of one period, the minimum
//! feasible market resources and (optionally) the value function. Solutions
//! are immutable once built and serialize through serde.

mod consumption;

pub use consumption::{ConsumptionFunction, ConsumptionPiece, Regime};

use serde::{Deserialize, Serialize};

use crate::error::ModelError;
use crate::interpolation::{LinearInterp, LinearLimit};
use crate::utility::CrraUtility;

/// Value function stored through its pseudo-inverse vNvrs(m) = u⁻¹(v(m))
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValueFunction {
    vnvrs: LinearInterp,
    utility: CrraUtility,
}

impl ValueFunction {
    pub fn new(vnvrs: LinearInterp, utility: CrraUtility) -> Self {
        Self { vnvrs, utility }
    }

    /// Value v(m); finite only above the minimum market resources
    pub fn eval(&self, m: f64) -> f64 {
        self.utility.u(self.vnvrs.eval(m))
    }

    /// The interpolated pseudo-inverse value
    pub fn vnvrs(&self) -> &LinearInterp {
        &self.vnvrs
    }
}

/// Solution to one period of the consumption-saving problem
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Solution {
    consumption: ConsumptionFunction,
    value: Option<ValueFunction>,
    utility: CrraUtility,
    /// Minimum feasible normalized market resources
    m_nrm_min: f64,
    /// Normalized human wealth
    h_nrm: f64,
    /// Limiting MPC as market resources grow
    mpc_min: f64,
    /// Limiting MPC as market resources approach the minimum
    mpc_max: f64,
}

impl Solution {
    pub fn new(
        consumption: ConsumptionFunction,
        value: Option<ValueFunction>,
        utility: CrraUtility,
        h_nrm: f64,
        mpc_min: f64,
        mpc_max: f64,
    ) -> Self {
        Self {
            m_nrm_min: consumption.m_min(),
            consumption,
            value,
            utility,
            h_nrm,
            mpc_min,
            mpc_max,
        }
    }

    /// Last period of life: consume everything, c(m) = m
    pub fn terminal(utility: CrraUtility) -> Result<Self, ModelError> {
        let interp = LinearInterp::new(vec![0.0, 1.0], vec![0.0, 1.0], Some(LinearLimit::new(0.0, 1.0)))?;
        let consumption = ConsumptionFunction::new(interp, vec![Regime::Constrained, Regime::Saving])?;
        // vNvrs(m) = u⁻¹(u(m)) = m
        let vnvrs = LinearInterp::new(vec![0.0, 1.0], vec![0.0, 1.0], Some(LinearLimit::new(0.0, 1.0)))?;
        Ok(Self::new(
            consumption,
            Some(ValueFunction::new(vnvrs, utility)),
            utility,
            0.0,
            1.0,
            1.0,
        ))
    }

    pub fn consumption(&self) -> &ConsumptionFunction {
        &self.consumption
    }

    pub fn value(&self) -> Option<&ValueFunction> {
        self.value.as_ref()
    }

    pub fn utility(&self) -> CrraUtility {
        self.utility
    }

    pub fn m_nrm_min(&self) -> f64 {
        self.m_nrm_min
    }

    pub fn h_nrm(&self) -> f64 {
        self.h_nrm
    }

    pub fn mpc_min(&self) -> f64 {
        self.mpc_min
    }

    pub fn mpc_max(&self) -> f64 {
        self.mpc_max
    }

    /// c(m)
    pub fn c(&self, m: f64) -> f64 {
        self.consumption.eval(m)
    }

    /// Marginal value v'(m) = u'(c(m))
    pub fn marginal_value(&self, m: f64) -> f64 {
        self.utility.u_p(self.consumption.eval(m))
    }

    /// Marginal marginal value v''(m) = u''(c(m)) c'(m)
    pub fn marginal_marginal_value(&self, m: f64) -> f64 {
        self.utility.u_pp(self.consumption.eval(m)) * self.consumption.derivative(m)
    }
}
