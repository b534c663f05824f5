//! CRRA utility and the inverse functions used by the endogenous grid method
//!
//! u(c) = c^(1-ρ)/(1-ρ), with the log limit at ρ = 1.

use serde::{Deserialize, Serialize};

/// Below this distance from 1 the coefficient is treated as log utility
const LOG_UTILITY_BAND: f64 = 1e-12;

/// Constant relative risk aversion utility with coefficient `crra`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CrraUtility {
    crra: f64,
}

impl CrraUtility {
    /// Caller guarantees `crra > 0` (checked by `Preferences::new`)
    pub fn new(crra: f64) -> Self {
        Self { crra }
    }

    pub fn crra(&self) -> f64 {
        self.crra
    }

    /// True when ρ = 1, i.e. u(c) = ln c
    pub fn is_log(&self) -> bool {
        (self.crra - 1.0).abs() < LOG_UTILITY_BAND
    }

    /// Utility level u(c)
    pub fn u(&self, c: f64) -> f64 {
        if self.is_log() {
            c.ln()
        } else {
            c.powf(1.0 - self.crra) / (1.0 - self.crra)
        }
    }

    /// Marginal utility u'(c)
    pub fn u_p(&self, c: f64) -> f64 {
        c.powf(-self.crra)
    }

    /// Second derivative u''(c)
    pub fn u_pp(&self, c: f64) -> f64 {
        -self.crra * c.powf(-self.crra - 1.0)
    }

    /// Inverse utility: the consumption level that yields utility `v`
    pub fn u_inv(&self, v: f64) -> f64 {
        if self.is_log() {
            v.exp()
        } else {
            ((1.0 - self.crra) * v).powf(1.0 / (1.0 - self.crra))
        }
    }

    /// Inverse marginal utility: the consumption level with u'(c) = `vp`
    pub fn u_p_inv(&self, vp: f64) -> f64 {
        vp.powf(-1.0 / self.crra)
    }
}
