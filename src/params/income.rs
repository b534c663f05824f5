//! Discrete distribution of permanent and transitory income shocks
//!
//! Both shocks are mean-one lognormals discretized into equiprobable bins,
//! each atom being the conditional mean of its bin. Unemployment enters as an
//! extra transitory atom; the remaining transitory atoms are rescaled so the
//! transitory mean stays at one.

use serde::{Deserialize, Serialize};
use statrs::distribution::{ContinuousCDF, Normal};

use crate::error::ModelError;

/// Tolerance for the probabilities summing to one
const PROB_SUM_TOLERANCE: f64 = 1e-9;

/// One joint realization of the income shocks
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IncomeShock {
    /// Permanent shock ψ
    pub perm: f64,
    /// Transitory shock θ
    pub tran: f64,
    /// Probability of this realization
    pub prob: f64,
}

/// Settings for the lognormal income process with unemployment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IncomeParams {
    pub perm_shk_std: f64,
    pub perm_shk_count: usize,
    pub tran_shk_std: f64,
    pub tran_shk_count: usize,
    /// Probability of unemployment next period
    pub unemp_prb: f64,
    /// Transitory income when unemployed
    pub inc_unemp: f64,
}

impl Default for IncomeParams {
    fn default() -> Self {
        Self {
            perm_shk_std: 0.1,
            perm_shk_count: 7,
            tran_shk_std: 0.1,
            tran_shk_count: 7,
            unemp_prb: 0.05,
            inc_unemp: 0.3,
        }
    }
}

/// Discrete joint distribution of (ψ, θ)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IncomeDistribution {
    atoms: Vec<IncomeShock>,
}

impl IncomeDistribution {
    /// Wrap explicit atoms, checking they form a proper distribution
    pub fn new(atoms: Vec<IncomeShock>) -> Result<Self, ModelError> {
        if atoms.is_empty() {
            return Err(ModelError::invalid("income distribution has no atoms"));
        }
        for shock in &atoms {
            if !(shock.prob >= 0.0 && shock.prob.is_finite()) {
                return Err(ModelError::invalid(format!("negative shock probability {}", shock.prob)));
            }
            if !(shock.perm > 0.0 && shock.perm.is_finite()) {
                return Err(ModelError::invalid(format!("permanent shock {} must be positive", shock.perm)));
            }
            if !(shock.tran >= 0.0 && shock.tran.is_finite()) {
                return Err(ModelError::invalid(format!("transitory shock {} must be non-negative", shock.tran)));
            }
        }
        let total: f64 = atoms.iter().map(|s| s.prob).sum();
        if (total - 1.0).abs() > PROB_SUM_TOLERANCE {
            return Err(ModelError::invalid(format!("shock probabilities sum to {total}, not 1")));
        }
        let dist = Self { atoms };
        let mean_perm = dist.expect(|s| s.perm);
        let mean_tran = dist.expect(|s| s.tran);
        if (mean_perm - 1.0).abs() > 1e-6 || (mean_tran - 1.0).abs() > 1e-6 {
            log::warn!("income shocks are not mean one (E[perm]={mean_perm:.6}, E[tran]={mean_tran:.6})");
        }
        Ok(dist)
    }

    /// Lognormal permanent and transitory shocks with an unemployment state
    pub fn from_params(params: &IncomeParams) -> Result<Self, ModelError> {
        if !(0.0..1.0).contains(&params.unemp_prb) {
            return Err(ModelError::invalid(format!("UnempPrb {} must lie in [0, 1)", params.unemp_prb)));
        }
        if params.inc_unemp < 0.0 {
            return Err(ModelError::invalid("IncUnemp must be non-negative"));
        }

        let perm = mean_one_lognormal(params.perm_shk_count, params.perm_shk_std)?;
        let mut tran = mean_one_lognormal(params.tran_shk_count, params.tran_shk_std)?;

        if params.unemp_prb > 0.0 {
            let p = params.unemp_prb;
            let scale = (1.0 - p * params.inc_unemp) / (1.0 - p);
            tran = std::iter::once((params.inc_unemp, p))
                .chain(tran.into_iter().map(|(x, q)| (x * scale, q * (1.0 - p))))
                .collect();
        }

        let atoms = perm
            .iter()
            .flat_map(|&(psi, p_psi)| {
                tran.iter().map(move |&(theta, p_theta)| IncomeShock {
                    perm: psi,
                    tran: theta,
                    prob: p_psi * p_theta,
                })
            })
            .collect();
        Self::new(atoms)
    }

    /// A single riskless atom ψ = θ = 1
    pub fn degenerate() -> Self {
        Self {
            atoms: vec![IncomeShock { perm: 1.0, tran: 1.0, prob: 1.0 }],
        }
    }

    pub fn atoms(&self) -> &[IncomeShock] {
        &self.atoms
    }

    /// Probability-weighted sum of `f` over the atoms
    pub fn expect<F: Fn(&IncomeShock) -> f64>(&self, f: F) -> f64 {
        self.atoms.iter().map(|s| s.prob * f(s)).sum()
    }

    pub fn perm_min(&self) -> f64 {
        self.atoms.iter().map(|s| s.perm).fold(f64::INFINITY, f64::min)
    }

    pub fn tran_min(&self) -> f64 {
        self.atoms.iter().map(|s| s.tran).fold(f64::INFINITY, f64::min)
    }

    /// Probability of the lowest realization of ψθ
    pub fn worst_income_prob(&self) -> f64 {
        let worst = self.atoms.iter().map(|s| s.perm * s.tran).fold(f64::INFINITY, f64::min);
        self.atoms
            .iter()
            .filter(|s| s.perm * s.tran == worst)
            .map(|s| s.prob)
            .sum()
    }

    /// Probability that θ takes its lowest value (the unemployment probability
    /// when unemployment income is the minimum)
    pub fn min_tran_prob(&self) -> f64 {
        let lowest = self.tran_min();
        self.atoms.iter().filter(|s| s.tran == lowest).map(|s| s.prob).sum()
    }
}

/// Equiprobable discretization of a lognormal with mean one
///
/// Returns (value, probability) pairs. With ln X ~ N(-σ²/2, σ²) and bin
/// edges at standard-normal quantiles z_i, the conditional mean of bin i is
/// n * (Φ(z_{i+1} - σ) - Φ(z_i - σ)).
pub fn mean_one_lognormal(count: usize, sigma: f64) -> Result<Vec<(f64, f64)>, ModelError> {
    if count == 0 {
        return Err(ModelError::invalid("shock count must be at least 1"));
    }
    if !(sigma >= 0.0 && sigma.is_finite()) {
        return Err(ModelError::invalid(format!("shock standard deviation {sigma} must be non-negative")));
    }
    if sigma == 0.0 || count == 1 {
        return Ok(vec![(1.0, 1.0)]);
    }

    let normal = Normal::new(0.0, 1.0).map_err(|e| ModelError::invalid(e.to_string()))?;
    let n = count as f64;
    let shifted_cdf = |i: usize| -> f64 {
        if i == 0 {
            0.0
        } else if i == count {
            1.0
        } else {
            normal.cdf(normal.inverse_cdf(i as f64 / n) - sigma)
        }
    };

    Ok((0..count)
        .map(|i| (n * (shifted_cdf(i + 1) - shifted_cdf(i)), 1.0 / n))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_lognormal_mean_one() {
        let atoms = mean_one_lognormal(7, 0.1).unwrap();
        assert_eq!(atoms.len(), 7);
        let mean: f64 = atoms.iter().map(|(x, p)| x * p).sum();
        assert_relative_eq!(mean, 1.0, epsilon = 1e-9);
        assert!(atoms.windows(2).all(|w| w[1].0 > w[0].0));
        let total: f64 = atoms.iter().map(|(_, p)| p).sum();
        assert_relative_eq!(total, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_degenerate_when_no_risk() {
        assert_eq!(mean_one_lognormal(7, 0.0).unwrap(), vec![(1.0, 1.0)]);
    }

    #[test]
    fn test_default_process() {
        let dist = IncomeDistribution::from_params(&IncomeParams::default()).unwrap();
        // 7 permanent x (7 transitory + unemployment)
        assert_eq!(dist.atoms().len(), 56);
        assert_relative_eq!(dist.expect(|s| s.prob), 1.0, epsilon = 1e-12);
        assert_relative_eq!(dist.expect(|s| s.tran), 1.0, epsilon = 1e-9);
        assert_relative_eq!(dist.expect(|s| s.perm), 1.0, epsilon = 1e-9);
        assert_relative_eq!(dist.tran_min(), 0.3);
        assert_relative_eq!(dist.min_tran_prob(), 0.05, epsilon = 1e-12);
    }

    #[test]
    fn test_worst_income_probability() {
        let dist = IncomeDistribution::from_params(&IncomeParams::default()).unwrap();
        // Lowest permanent bin and unemployment: (1/7) * 0.05
        assert_relative_eq!(dist.worst_income_prob(), 0.05 / 7.0, epsilon = 1e-12);
    }

    #[test]
    fn test_rejects_improper_probabilities() {
        let atoms = vec![
            IncomeShock { perm: 1.0, tran: 0.5, prob: 0.5 },
            IncomeShock { perm: 1.0, tran: 1.5, prob: 0.4 },
        ];
        let err = IncomeDistribution::new(atoms).unwrap_err();
        assert!(matches!(err, ModelError::InvalidParameter(_)));
    }

    #[test]
    fn test_rejects_bad_unemployment() {
        let params = IncomeParams { unemp_prb: 1.0, ..Default::default() };
        assert!(IncomeDistribution::from_params(&params).is_err());
    }
}
