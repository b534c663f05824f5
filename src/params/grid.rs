//! End-of-period asset grid ("assets above minimum")

use serde::{Deserialize, Serialize};

use crate::error::ModelError;

/// Settings for constructing the grid of assets above the borrowing limit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetGridParams {
    /// Smallest offset above the minimum
    pub a_xtra_min: f64,
    /// Largest offset above the minimum
    pub a_xtra_max: f64,
    /// Number of multi-exponentially spaced points
    pub a_xtra_count: usize,
    /// Times to nest ln(1+x) when spacing the points (0 = linear spacing)
    pub a_xtra_nest_fac: u32,
    /// Additional points merged into the grid
    pub a_xtra_extra: Vec<f64>,
}

impl Default for AssetGridParams {
    fn default() -> Self {
        Self {
            a_xtra_min: 0.001,
            a_xtra_max: 20.0,
            a_xtra_count: 48,
            a_xtra_nest_fac: 3,
            a_xtra_extra: Vec::new(),
        }
    }
}

/// Strictly positive, strictly increasing offsets above the asset minimum
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetGrid(Vec<f64>);

impl AssetGrid {
    /// Wrap caller-supplied offsets, rejecting anything not strictly increasing
    pub fn new(points: Vec<f64>) -> Result<Self, ModelError> {
        if points.is_empty() {
            return Err(ModelError::invalid("asset grid is empty"));
        }
        if points.iter().any(|a| !a.is_finite() || *a <= 0.0) {
            return Err(ModelError::invalid("asset grid offsets must be finite and strictly positive"));
        }
        if points.windows(2).any(|w| w[1] <= w[0]) {
            return Err(ModelError::invalid("asset grid is not strictly increasing"));
        }
        Ok(Self(points))
    }

    /// Build the grid from construction settings
    pub fn from_params(params: &AssetGridParams) -> Result<Self, ModelError> {
        if params.a_xtra_count < 2 {
            return Err(ModelError::invalid("aXtraCount must be at least 2"));
        }
        if !(params.a_xtra_min > 0.0 && params.a_xtra_max > params.a_xtra_min) {
            return Err(ModelError::invalid(format!(
                "need 0 < aXtraMin < aXtraMax (got {} and {})",
                params.a_xtra_min, params.a_xtra_max
            )));
        }
        let mut points = make_grid_exp_mult(
            params.a_xtra_min,
            params.a_xtra_max,
            params.a_xtra_count,
            params.a_xtra_nest_fac,
        );
        points.extend(params.a_xtra_extra.iter().copied());
        points.sort_by(f64::total_cmp);
        points.dedup();
        Self::new(points)
    }

    pub fn points(&self) -> &[f64] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn max(&self) -> f64 {
        self.0[self.0.len() - 1]
    }
}

/// Multi-exponentially spaced grid on [min, max] with `count` points
///
/// The bounds are pushed through x -> ln(1+x) `nest` times, spaced linearly,
/// then mapped back, which concentrates points near the lower bound.
pub fn make_grid_exp_mult(min: f64, max: f64, count: usize, nest: u32) -> Vec<f64> {
    let mut lo = min;
    let mut hi = max;
    for _ in 0..nest {
        lo = lo.ln_1p();
        hi = hi.ln_1p();
    }
    let step = (hi - lo) / (count - 1) as f64;
    (0..count)
        .map(|i| {
            // Pin the endpoints so they survive the nesting round trip exactly
            if i == 0 {
                return min;
            }
            if i == count - 1 {
                return max;
            }
            let mut x = lo + step * i as f64;
            for _ in 0..nest {
                x = x.exp_m1();
            }
            x
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_linear_grid_without_nesting() {
        let grid = make_grid_exp_mult(1.0, 5.0, 5, 0);
        assert_eq!(grid, vec![1.0, 2.0, 3.0, 4.0, 5.0]);
    }

    #[test]
    fn test_nested_grid_is_denser_near_bottom() {
        let grid = make_grid_exp_mult(0.001, 20.0, 48, 3);
        assert_eq!(grid.len(), 48);
        assert_relative_eq!(grid[0], 0.001);
        assert_relative_eq!(grid[47], 20.0);
        let first_gap = grid[1] - grid[0];
        let last_gap = grid[47] - grid[46];
        assert!(first_gap < last_gap);
    }

    #[test]
    fn test_default_grid_with_extras() {
        let params = AssetGridParams {
            a_xtra_extra: vec![0.5, 20.0, 100.0],
            ..Default::default()
        };
        let grid = AssetGrid::from_params(&params).unwrap();
        // 20.0 is already on the grid, so only two points are added
        assert_eq!(grid.len(), 50);
        assert_relative_eq!(grid.max(), 100.0);
    }

    #[test]
    fn test_rejects_non_increasing() {
        let err = AssetGrid::new(vec![0.1, 0.3, 0.2]).unwrap_err();
        assert_eq!(err, ModelError::invalid("asset grid is not strictly increasing"));
        assert!(AssetGrid::new(vec![0.1, 0.1]).is_err());
        assert!(AssetGrid::new(vec![0.0, 0.1]).is_err());
    }

    #[test]
    fn test_rejects_bad_bounds() {
        let params = AssetGridParams {
            a_xtra_min: 5.0,
            a_xtra_max: 1.0,
            ..Default::default()
        };
        assert!(AssetGrid::from_params(&params).is_err());
    }
}
