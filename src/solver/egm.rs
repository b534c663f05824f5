//! Endogenous grid method shared by both period solvers
//!
//! For each end-of-period state a (with its interest factor R):
//!   m' = R/(Γψ)·a + θ                      next period's market resources
//!   EndOfPrdvP(a) = βL·R·Γ^(-ρ)·E[ψ^(-ρ) u'(c'(m'))]
//!   c = EndOfPrdvP^(-1/ρ),  m = c + a
//! The resulting (m, c) pairs are prefixed with (BoroCnstNat, 0) and then
//! bounded by the artificial borrowing constraint c ≤ m − mNrmMin.

use super::{EndState, PeriodSolver};
use crate::error::ModelError;
use crate::interpolation::{LinearInterp, LinearLimit};
use crate::params::{AssetSide, IncomeDistribution, InterestSchedule, ModelParams, Preferences};
use crate::solution::{ConsumptionFunction, Regime, Solution, ValueFunction};
use crate::utility::CrraUtility;

#[derive(Debug, Clone, Copy)]
struct GridPoint {
    m: f64,
    c: f64,
    regime: Regime,
}

impl GridPoint {
    /// Gap between unconstrained consumption and the constraint m − m_min
    fn slack(&self, m_min: f64) -> f64 {
        self.c - (self.m - m_min)
    }
}

fn regime_of(side: AssetSide) -> Regime {
    match side {
        AssetSide::Borrowing => Regime::Borrowing,
        AssetSide::NegativeZero => Regime::BorrowingKink,
        AssetSide::PositiveZero => Regime::SavingKink,
        AssetSide::Saving => Regime::Saving,
    }
}

/// Lowest end-of-period assets that can be repaid in every state of the world
///
/// Borrowing is always governed by Rboro, so the limit uses it.
pub fn natural_borrowing_limit(
    prefs: &Preferences,
    income: &IncomeDistribution,
    rates: &InterestSchedule,
    next: &Solution,
) -> f64 {
    (next.m_nrm_min() - income.tran_min()) * prefs.perm_gro_fac() * income.perm_min() / rates.rboro()
}

/// End-of-period marginal value of assets `a` carried at factor `r`
pub fn end_of_period_vp(
    prefs: &Preferences,
    income: &IncomeDistribution,
    next: &Solution,
    a: f64,
    r: f64,
) -> f64 {
    let gro = prefs.perm_gro_fac();
    let crra = prefs.crra();
    let expected = income.expect(|s| {
        let m_next = r / (gro * s.perm) * a + s.tran;
        s.perm.powf(-crra) * next.marginal_value(m_next)
    });
    prefs.disc_fac_eff() * r * gro.powf(-crra) * expected
}

/// End-of-period value of assets `a` carried at factor `r`
pub fn end_of_period_v(
    prefs: &Preferences,
    income: &IncomeDistribution,
    next_value: &ValueFunction,
    a: f64,
    r: f64,
) -> f64 {
    let gro = prefs.perm_gro_fac();
    let crra = prefs.crra();
    let expected = income.expect(|s| {
        let m_next = r / (gro * s.perm) * a + s.tran;
        s.perm.powf(1.0 - crra) * next_value.eval(m_next)
    });
    prefs.disc_fac_eff() * gro.powf(1.0 - crra) * expected
}

/// (R·βL)^(1/ρ) / R
fn patience_factor(prefs: &Preferences, r: f64) -> f64 {
    (r * prefs.disc_fac_eff()).powf(1.0 / prefs.crra()) / r
}

pub(super) fn solve_period<S: PeriodSolver + ?Sized>(
    solver: &S,
    params: &ModelParams,
    next: &Solution,
) -> Result<Solution, ModelError> {
    let prefs = params.prefs();
    let income = params.income();
    let rates = params.rates();
    let utility = CrraUtility::new(prefs.crra());

    let boro_cnst_nat = natural_borrowing_limit(prefs, income, rates, next);
    let (m_nrm_min, art_binds) = match params.boro_cnst_art() {
        Some(art) if art > boro_cnst_nat => (art, true),
        _ => (boro_cnst_nat, false),
    };

    let states = solver.end_of_period_states(params.grid(), m_nrm_min, rates);
    let unconstrained = egm_points(prefs, income, rates, next, &utility, boro_cnst_nat, &states);
    let points = if art_binds {
        apply_artificial_constraint(&unconstrained, m_nrm_min)
    } else {
        unconstrained
    };

    // Saving-side bounds use Rsave, the borrowing-side bound uses Rboro
    let mpc_min = 1.0 / (1.0 + patience_factor(prefs, rates.rsave()) / next.mpc_min());
    let h_nrm = prefs.perm_gro_fac() / rates.rsave() * (income.expect(|s| s.perm * s.tran) + next.h_nrm());
    let mpc_max = if art_binds {
        1.0
    } else {
        let worst = income.worst_income_prob().powf(1.0 / prefs.crra());
        1.0 / (1.0 + worst * patience_factor(prefs, rates.rboro()) / next.mpc_max())
    };

    let interp = LinearInterp::new(
        points.iter().map(|p| p.m).collect(),
        points.iter().map(|p| p.c).collect(),
        Some(LinearLimit::new(mpc_min * h_nrm, mpc_min)),
    )?;
    let consumption = ConsumptionFunction::new(interp, points.iter().map(|p| p.regime).collect())?;

    let value = if params.vfunc_bool() {
        let next_value = next.value().ok_or_else(|| {
            ModelError::invalid("value function requested but next period has none")
        })?;
        Some(value_function(prefs, income, rates, next_value, &utility, &points, mpc_min, h_nrm)?)
    } else {
        None
    };

    log::trace!(
        "{}: mNrmMin={:.6} points={} MPCmin={:.6} hNrm={:.6}",
        solver.name(),
        m_nrm_min,
        points.len(),
        mpc_min,
        h_nrm
    );

    Ok(Solution::new(consumption, value, utility, h_nrm, mpc_min, mpc_max))
}

/// Invert the Euler equation on every end-of-period state
fn egm_points(
    prefs: &Preferences,
    income: &IncomeDistribution,
    rates: &InterestSchedule,
    next: &Solution,
    utility: &CrraUtility,
    boro_cnst_nat: f64,
    states: &[EndState],
) -> Vec<GridPoint> {
    let mut points = Vec::with_capacity(states.len() + 1);
    points.push(GridPoint { m: boro_cnst_nat, c: 0.0, regime: Regime::Constrained });

    for state in states {
        let r = rates.factor(state.side);
        let c = utility.u_p_inv(end_of_period_vp(prefs, income, next, state.a, r));
        let m = c + state.a;
        // Interpolation needs strictly increasing market resources
        if m <= points[points.len() - 1].m || !m.is_finite() {
            log::warn!("dropping non-increasing EGM point a={:.6} m={:.6}", state.a, m);
            continue;
        }
        points.push(GridPoint { m, c, regime: regime_of(state.side) });
    }
    points
}

/// Lower envelope of the unconstrained points and c = m − m_min
///
/// Starts at (m_min, 0), follows the constraint with slope one up to where
/// it crosses the unconstrained function, then continues with the
/// unconstrained points.
fn apply_artificial_constraint(unconstrained: &[GridPoint], m_min: f64) -> Vec<GridPoint> {
    let mut points = vec![GridPoint { m: m_min, c: 0.0, regime: Regime::Constrained }];

    // Unconstrained consumption at m_min, from the segment that straddles it
    let first_above = unconstrained.partition_point(|p| p.m <= m_min);
    let mut prev = match first_above {
        0 => unconstrained[0],
        i if i == unconstrained.len() => unconstrained[i - 1],
        i => {
            let (lo, hi) = (unconstrained[i - 1], unconstrained[i]);
            let c = lo.c + (hi.c - lo.c) * (m_min - lo.m) / (hi.m - lo.m);
            GridPoint { m: m_min, c, regime: Regime::Constrained }
        }
    };

    let mut crossed = false;
    for &p in &unconstrained[first_above..] {
        if crossed {
            points.push(p);
            continue;
        }
        let slack = p.slack(m_min);
        if slack > 0.0 {
            prev = p;
            continue;
        }
        let prev_slack = prev.slack(m_min);
        if slack < 0.0 && prev_slack > 0.0 {
            let m = prev.m + prev_slack / (prev_slack - slack) * (p.m - prev.m);
            if m > points[points.len() - 1].m && m < p.m {
                points.push(GridPoint { m, c: m - m_min, regime: Regime::Constrained });
            }
        }
        points.push(p);
        crossed = true;
    }

    if !crossed {
        // Binding over the whole grid: extend the constraint to the top point
        let top = unconstrained[unconstrained.len() - 1].m.max(m_min + 1.0);
        log::warn!("artificial borrowing constraint binds on the entire grid");
        points.push(GridPoint { m: top, c: top - m_min, regime: Regime::Constrained });
    }
    points
}

/// Pseudo-inverse value at the consumption gridpoints
#[allow(clippy::too_many_arguments)]
fn value_function(
    prefs: &Preferences,
    income: &IncomeDistribution,
    rates: &InterestSchedule,
    next_value: &ValueFunction,
    utility: &CrraUtility,
    points: &[GridPoint],
    mpc_min: f64,
    h_nrm: f64,
) -> Result<ValueFunction, ModelError> {
    let mut m_grid = Vec::with_capacity(points.len());
    let mut vnvrs = Vec::with_capacity(points.len());

    // v(m_min) = -inf for ρ ≥ 1; its pseudo-inverse is zero
    m_grid.push(points[0].m);
    vnvrs.push(0.0);

    for p in &points[1..] {
        let a = p.m - p.c;
        let v = utility.u(p.c) + end_of_period_v(prefs, income, next_value, a, rates.factor_at(a));
        m_grid.push(p.m);
        vnvrs.push(utility.u_inv(v));
    }

    let limit = if utility.is_log() {
        None
    } else {
        let crra = prefs.crra();
        let mpc_min_nvrs = mpc_min.powf(-crra / (1.0 - crra));
        Some(LinearLimit::new(mpc_min_nvrs * h_nrm, mpc_min_nvrs))
    };
    Ok(ValueFunction::new(LinearInterp::new(m_grid, vnvrs, limit)?, *utility))
}
