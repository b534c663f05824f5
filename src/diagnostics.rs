//! Model diagnostics: patience and growth factors, the impatience conditions
//! built on them, and stable points of a solved consumption function
//!
//! Saving is the relevant margin for the limiting behaviour of a kinked-R
//! consumer, so every factor here uses Rsave.

use serde::Serialize;

use crate::params::ModelParams;
use crate::solution::Solution;

/// Bisection stops when the bracket is narrower than this
const ROOT_TOLERANCE: f64 = 1e-12;
const MAX_BISECTIONS: usize = 200;
/// Doublings allowed when searching for the upper end of a bracket
const MAX_BRACKET_EXPANSIONS: usize = 60;

/// Patience and growth factors of a parameterization
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ModelFactors {
    /// Absolute patience factor (R β L)^(1/ρ)
    pub apf: f64,
    /// Return patience factor APF / R
    pub rpf: f64,
    /// Growth patience factor APF / Γ
    pub gpf_raw: f64,
    /// Growth patience factor normalized by E[1/ψ]
    pub gpf_nrm: f64,
    /// Growth patience factor adjusted for mortality
    pub gpf_liv: f64,
    /// Finite human wealth factor Γ / R
    pub fhwf: f64,
    /// Finite value of autarky factor β L Γ^(1-ρ) E[ψ^(1-ρ)]
    pub fvaf: f64,
    /// Weak return patience factor UnempPrb^(1/ρ) RPF
    pub wrpf: f64,
}

/// A named condition that holds when its factor is below one
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Condition {
    pub name: &'static str,
    pub about: &'static str,
    pub factor: f64,
}

impl Condition {
    pub fn holds(&self) -> bool {
        self.factor < 1.0
    }
}

impl ModelFactors {
    pub fn compute(params: &ModelParams) -> Self {
        let prefs = params.prefs();
        let income = params.income();
        let r = params.rates().rsave();
        let crra = prefs.crra();
        let gro = prefs.perm_gro_fac();

        let apf = (r * prefs.disc_fac_eff()).powf(1.0 / crra);
        let rpf = apf / r;
        let gpf_raw = apf / gro;
        let gpf_nrm = gpf_raw * income.expect(|s| 1.0 / s.perm);
        let gpf_liv = gpf_raw * prefs.liv_prb();
        let fhwf = gro / r;
        let fvaf = prefs.disc_fac_eff() * gro.powf(1.0 - crra) * income.expect(|s| s.perm.powf(1.0 - crra));
        let wrpf = params.unemp_prb().powf(1.0 / crra) * rpf;

        Self { apf, rpf, gpf_raw, gpf_nrm, gpf_liv, fhwf, fvaf, wrpf }
    }

    pub fn conditions(&self) -> Vec<Condition> {
        vec![
            Condition { name: "AIC", about: "absolute impatience", factor: self.apf },
            Condition { name: "RIC", about: "return impatience", factor: self.rpf },
            Condition { name: "WRIC", about: "weak return impatience", factor: self.wrpf },
            Condition { name: "GICRaw", about: "growth impatience", factor: self.gpf_raw },
            Condition { name: "GICNrm", about: "normalized growth impatience", factor: self.gpf_nrm },
            Condition { name: "GICLiv", about: "mortality-adjusted growth impatience", factor: self.gpf_liv },
            Condition { name: "FHWC", about: "finite human wealth", factor: self.fhwf },
            Condition { name: "FVAC", about: "finite value of autarky", factor: self.fvaf },
        ]
    }

    /// Warn about every condition that fails
    pub fn log_failures(&self) {
        for cond in self.conditions().iter().filter(|c| !c.holds()) {
            log::warn!("{} ({}) fails: factor {:.6} >= 1", cond.name, cond.about, cond.factor);
        }
    }
}

/// Market resources at which E[m_{t+1}] = m_t
pub fn target_m(params: &ModelParams, solution: &Solution) -> Option<f64> {
    let prefs = params.prefs();
    let income = params.income();
    let rates = params.rates();
    let gro = prefs.perm_gro_fac();
    let f = |m: f64| {
        let a = m - solution.c(m);
        let r = rates.factor_at(a);
        income.expect(|s| r * a / (gro * s.perm) + s.tran) - m
    };
    bracket_and_bisect(f, solution.m_nrm_min().max(0.0))
}

/// Market resources at which the level of resources grows with permanent
/// income, E[ψ m_{t+1}] = m_t
pub fn balanced_growth_m(params: &ModelParams, solution: &Solution) -> Option<f64> {
    let prefs = params.prefs();
    let income = params.income();
    let rates = params.rates();
    let gro = prefs.perm_gro_fac();
    let mean_income = income.expect(|s| s.perm * s.tran);
    let f = |m: f64| {
        let a = m - solution.c(m);
        rates.factor_at(a) * a / gro + mean_income - m
    };
    bracket_and_bisect(f, solution.m_nrm_min().max(0.0))
}

/// Find a root of a function positive at `lo` and eventually negative
fn bracket_and_bisect<F: Fn(f64) -> f64>(f: F, lo: f64) -> Option<f64> {
    let mut low = lo;
    if !(f(low) > 0.0) {
        return None;
    }
    let mut high = low + 1.0;
    let mut expansions = 0;
    while f(high) > 0.0 {
        low = high;
        high = 2.0 * high + 1.0;
        expansions += 1;
        if expansions > MAX_BRACKET_EXPANSIONS {
            return None;
        }
    }

    for _ in 0..MAX_BISECTIONS {
        let mid = 0.5 * (low + high);
        if high - low < ROOT_TOLERANCE {
            return Some(mid);
        }
        if f(mid) > 0.0 {
            low = mid;
        } else {
            high = mid;
        }
    }
    Some(0.5 * (low + high))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_default_factors() {
        let params = ModelParams::default_kinked();
        let factors = ModelFactors::compute(&params);
        let apf = (1.02_f64 * 0.96 * 0.98).sqrt();
        assert_relative_eq!(factors.apf, apf, epsilon = 1e-12);
        assert_relative_eq!(factors.rpf, apf / 1.02, epsilon = 1e-12);
        assert_relative_eq!(factors.fhwf, 1.01 / 1.02, epsilon = 1e-12);
        assert!(factors.conditions().iter().all(|c| c.holds()));
    }

    #[test]
    fn test_impatience_failure_detected() {
        let params = crate::params::RawParams { disc_fac: 1.2, ..Default::default() }
            .into_params()
            .unwrap();
        let factors = ModelFactors::compute(&params);
        let failing: Vec<&str> = factors
            .conditions()
            .iter()
            .filter(|c| !c.holds())
            .map(|c| c.name)
            .collect();
        assert!(failing.contains(&"AIC"));
        assert!(failing.contains(&"RIC"));
    }

    #[test]
    fn test_bisection_finds_linear_root() {
        let root = bracket_and_bisect(|x| 3.0 - x, 0.0).unwrap();
        assert_relative_eq!(root, 3.0, epsilon = 1e-10);
        assert!(bracket_and_bisect(|x| -1.0 - x, 0.0).is_none());
    }
}
