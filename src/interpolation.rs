//! Piecewise-linear interpolation with an optional limiting linear function
//!
//! Below the first node the first segment is extended. Above the last node the
//! interpolant either extends the last segment or, when a limiting function
//! `intercept + slope * x` is supplied and lies above the top node with a
//! steeper slope, approaches it with an exponentially decaying gap.

use serde::{Deserialize, Serialize};

use crate::error::ModelError;

/// Linear function the interpolant approaches as x grows without bound
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LinearLimit {
    pub intercept: f64,
    pub slope: f64,
}

impl LinearLimit {
    pub fn new(intercept: f64, slope: f64) -> Self {
        Self { intercept, slope }
    }

    pub fn value(&self, x: f64) -> f64 {
        self.intercept + self.slope * x
    }
}

/// Piecewise-linear interpolant over strictly increasing nodes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearInterp {
    x: Vec<f64>,
    y: Vec<f64>,
    limit: Option<LinearLimit>,
}

/// Parameters of y = limit(x) - a * exp(-b * (x - x_top))
#[derive(Debug, Clone, Copy)]
struct DecayExtrap {
    a: f64,
    b: f64,
}

impl LinearInterp {
    /// Build an interpolant, validating the nodes
    pub fn new(x: Vec<f64>, y: Vec<f64>, limit: Option<LinearLimit>) -> Result<Self, ModelError> {
        if x.len() != y.len() {
            return Err(ModelError::invalid("interpolation nodes and values differ in length"));
        }
        if x.len() < 2 {
            return Err(ModelError::invalid("interpolation needs at least two nodes"));
        }
        if x.iter().chain(y.iter()).any(|v| !v.is_finite()) {
            return Err(ModelError::invalid("interpolation nodes must be finite"));
        }
        if x.windows(2).any(|w| w[1] <= w[0]) {
            return Err(ModelError::invalid("interpolation nodes are not strictly increasing"));
        }
        Ok(Self { x, y, limit })
    }

    pub fn x(&self) -> &[f64] {
        &self.x
    }

    pub fn y(&self) -> &[f64] {
        &self.y
    }

    pub fn limit(&self) -> Option<LinearLimit> {
        self.limit
    }

    /// Index `i` of the segment [x_i, x_{i+1}] used for `xq`
    fn segment(&self, xq: f64) -> usize {
        let idx = self.x.partition_point(|v| *v <= xq);
        idx.saturating_sub(1).min(self.x.len() - 2)
    }

    fn slope(&self, i: usize) -> f64 {
        (self.y[i + 1] - self.y[i]) / (self.x[i + 1] - self.x[i])
    }

    fn decay(&self) -> Option<(LinearLimit, DecayExtrap)> {
        let limit = self.limit?;
        let n = self.x.len();
        let x_top = self.x[n - 1];
        let level_diff = limit.value(x_top) - self.y[n - 1];
        let slope_diff = limit.slope - self.slope(n - 2);
        if level_diff > 0.0 && slope_diff > 0.0 {
            Some((limit, DecayExtrap { a: level_diff, b: slope_diff / level_diff }))
        } else {
            None
        }
    }

    /// Interpolated value at `xq`
    pub fn eval(&self, xq: f64) -> f64 {
        let n = self.x.len();
        let x_top = self.x[n - 1];
        if xq > x_top {
            if let Some((limit, decay)) = self.decay() {
                return limit.value(xq) - decay.a * (-decay.b * (xq - x_top)).exp();
            }
        }
        let i = self.segment(xq);
        self.y[i] + self.slope(i) * (xq - self.x[i])
    }

    /// Derivative at `xq`; at a node the slope of the segment to its right
    pub fn derivative(&self, xq: f64) -> f64 {
        let n = self.x.len();
        let x_top = self.x[n - 1];
        if xq >= x_top {
            if let Some((limit, decay)) = self.decay() {
                return limit.slope + decay.a * decay.b * (-decay.b * (xq - x_top)).exp();
            }
            return self.slope(n - 2);
        }
        self.slope(self.segment(xq))
    }

    /// Sup-norm distance between two interpolants on the union of their nodes
    pub fn distance(&self, other: &LinearInterp) -> f64 {
        self.x
            .iter()
            .chain(other.x.iter())
            .map(|&xq| (self.eval(xq) - other.eval(xq)).abs())
            .fold(0.0, f64::max)
    }
}
