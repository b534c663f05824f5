//! Interest factors on borrowing and saving

use serde::{Deserialize, Serialize};

use crate::error::ModelError;

/// Which side of zero an end-of-period asset level sits on
///
/// The two zero variants are coincident asset levels that differ only in the
/// interest factor governing the transition into next period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AssetSide {
    /// Strictly negative assets
    Borrowing,
    /// Zero approached from below (borrowing factor)
    NegativeZero,
    /// Zero approached from above (saving factor)
    PositiveZero,
    /// Strictly positive assets
    Saving,
}

impl AssetSide {
    /// Side of an ordinary (non-sentinel) asset level
    pub fn of(a: f64) -> Self {
        if a < 0.0 {
            AssetSide::Borrowing
        } else {
            AssetSide::Saving
        }
    }
}

/// The pair (Rboro, Rsave) with Rboro >= Rsave
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct InterestSchedule {
    rboro: f64,
    rsave: f64,
}

impl InterestSchedule {
    pub fn new(rboro: f64, rsave: f64) -> Result<Self, ModelError> {
        if !(rboro.is_finite() && rsave.is_finite()) || rboro <= 0.0 || rsave <= 0.0 {
            return Err(ModelError::invalid(format!(
                "interest factors must be positive and finite (Rboro={rboro}, Rsave={rsave})"
            )));
        }
        if rboro < rsave {
            return Err(ModelError::invalid(format!(
                "Rboro ({rboro}) must not be below Rsave ({rsave})"
            )));
        }
        Ok(Self { rboro, rsave })
    }

    /// A single factor for both borrowing and saving
    pub fn flat(rfree: f64) -> Result<Self, ModelError> {
        Self::new(rfree, rfree)
    }

    pub fn rboro(&self) -> f64 {
        self.rboro
    }

    pub fn rsave(&self) -> f64 {
        self.rsave
    }

    /// Whether borrowing is strictly more expensive than saving pays
    pub fn is_kinked(&self) -> bool {
        self.rboro > self.rsave
    }

    /// Interest factor governing an end-of-period state
    pub fn factor(&self, side: AssetSide) -> f64 {
        match side {
            AssetSide::Borrowing | AssetSide::NegativeZero => self.rboro,
            AssetSide::PositiveZero | AssetSide::Saving => self.rsave,
        }
    }

    /// Interest factor for an ordinary asset level
    pub fn factor_at(&self, a: f64) -> f64 {
        self.factor(AssetSide::of(a))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_cheap_borrowing() {
        let err = InterestSchedule::new(1.01, 1.02).unwrap_err();
        assert!(matches!(err, ModelError::InvalidParameter(_)));
    }

    #[test]
    fn test_rejects_non_positive() {
        assert!(InterestSchedule::new(0.0, 0.0).is_err());
        assert!(InterestSchedule::new(f64::INFINITY, 1.0).is_err());
    }

    #[test]
    fn test_factor_selection() {
        let rates = InterestSchedule::new(1.20, 1.02).unwrap();
        assert!(rates.is_kinked());
        assert_eq!(rates.factor_at(-0.5), 1.20);
        assert_eq!(rates.factor_at(0.5), 1.02);
        assert_eq!(rates.factor(AssetSide::NegativeZero), 1.20);
        assert_eq!(rates.factor(AssetSide::PositiveZero), 1.02);
    }

    #[test]
    fn test_flat_schedule_not_kinked() {
        let rates = InterestSchedule::flat(1.03).unwrap();
        assert!(!rates.is_kinked());
        assert_eq!(rates.factor_at(-1.0), rates.factor_at(1.0));
    }
}
