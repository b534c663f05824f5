//! Piecewise-linear consumption function with tagged regimes

use serde::{Deserialize, Serialize};

use crate::error::ModelError;
use crate::interpolation::LinearInterp;

/// Which part of the problem produced a consumption gridpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Regime {
    /// On the borrowing constraint: c = m - mNrmMin
    Constrained,
    /// Euler equation with the borrowing factor, a < 0
    Borrowing,
    /// Zero assets approached from below; lower end of the plateau
    BorrowingKink,
    /// Zero assets approached from above; upper end of the plateau
    SavingKink,
    /// Euler equation with the saving factor, a > 0
    Saving,
}

/// One gridpoint of the consumption function and the slope to its right
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConsumptionPiece {
    pub m: f64,
    pub c: f64,
    pub slope: f64,
    pub regime: Regime,
}

/// Consumption as a function of normalized market resources
///
/// The first gridpoint is the minimum feasible market resources, where
/// consumption is zero. Below it the function returns m - mNrmMin, i.e.
/// it continues along the borrowing constraint with slope one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConsumptionFunction {
    interp: LinearInterp,
    regimes: Vec<Regime>,
}

impl ConsumptionFunction {
    pub fn new(interp: LinearInterp, regimes: Vec<Regime>) -> Result<Self, ModelError> {
        if regimes.len() != interp.x().len() {
            return Err(ModelError::invalid("one regime tag is needed per consumption gridpoint"));
        }
        Ok(Self { interp, regimes })
    }

    /// Minimum feasible market resources (first gridpoint)
    pub fn m_min(&self) -> f64 {
        self.interp.x()[0]
    }

    pub fn eval(&self, m: f64) -> f64 {
        let m_min = self.m_min();
        if m <= m_min {
            return m - m_min;
        }
        self.interp.eval(m)
    }

    /// Marginal propensity to consume; right derivative at gridpoints
    pub fn derivative(&self, m: f64) -> f64 {
        if m < self.m_min() {
            return 1.0;
        }
        self.interp.derivative(m)
    }

    pub fn interp(&self) -> &LinearInterp {
        &self.interp
    }

    pub fn regimes(&self) -> &[Regime] {
        &self.regimes
    }

    /// Gridpoints in order, each with the slope of the segment to its right
    pub fn pieces(&self) -> Vec<ConsumptionPiece> {
        self.interp
            .x()
            .iter()
            .zip(self.interp.y())
            .zip(&self.regimes)
            .map(|((&m, &c), &regime)| ConsumptionPiece {
                m,
                c,
                slope: self.interp.derivative(m),
                regime,
            })
            .collect()
    }

    fn regime_m(&self, wanted: Regime) -> Option<f64> {
        self.regimes
            .iter()
            .position(|&r| r == wanted)
            .map(|i| self.interp.x()[i])
    }

    /// Market resources at the two zero-asset kinks (m_boro, m_save)
    pub fn kinks(&self) -> Option<(f64, f64)> {
        Some((self.regime_m(Regime::BorrowingKink)?, self.regime_m(Regime::SavingKink)?))
    }

    /// Width of the no-trade plateau, zero without a kink
    pub fn plateau_width(&self) -> f64 {
        self.kinks().map(|(lo, hi)| hi - lo).unwrap_or(0.0)
    }

    /// Sup-norm distance to another consumption function on both sets of gridpoints
    pub fn distance(&self, other: &ConsumptionFunction) -> f64 {
        self.interp
            .x()
            .iter()
            .chain(other.interp.x())
            .map(|&m| (self.eval(m) - other.eval(m)).abs())
            .fold(0.0, f64::max)
    }
}
