//! End-to-end properties of solved kinked-R models

use approx::assert_relative_eq;

use kinked_r::diagnostics::target_m;
use kinked_r::solver::{IndShockSolver, KinkedRSolver, PeriodSolver};
use kinked_r::{InterestSchedule, Model, ModelParams, RawParams, Regime, Solution};

fn solve(raw: RawParams) -> Vec<Solution> {
    let mut model = Model::new(raw.into_params().unwrap());
    model.solve().unwrap().to_vec()
}

/// Borrowing at 20%, saving at 1%, no borrowing allowed
fn no_borrowing_scenario() -> ModelParams {
    RawParams {
        crra: 2.0,
        rboro: 1.20,
        rsave: 1.01,
        disc_fac: 0.96,
        perm_gro_fac: 1.0,
        boro_cnst_art: Some(0.0),
        periods: None,
        ..Default::default()
    }
    .into_params()
    .unwrap()
}

#[test]
fn test_equal_rates_reproduce_ind_shock() {
    let params = RawParams { rboro: 1.02, rsave: 1.02, periods: Some(6), ..Default::default() }
        .into_params()
        .unwrap();
    let mut kinked = Model::new(params.clone());
    let mut plain = Model::ind_shock(params).unwrap();
    let kinked = kinked.solve().unwrap().to_vec();
    let plain = plain.solve().unwrap();

    assert_eq!(kinked.len(), 7);
    for (k, p) in kinked.iter().zip(plain) {
        assert_eq!(k.consumption().interp().x(), p.consumption().interp().x());
        assert_eq!(k.consumption().interp().y(), p.consumption().interp().y());
        assert_eq!(k.m_nrm_min(), p.m_nrm_min());
        assert!(k.consumption().kinks().is_none());
    }
}

#[test]
fn test_consumption_is_continuous_and_increasing() {
    let solutions = solve(RawParams { periods: Some(10), ..Default::default() });
    for soln in &solutions[..solutions.len() - 1] {
        let pieces = soln.consumption().pieces();
        assert!(pieces.windows(2).all(|w| w[1].m > w[0].m), "m grid not increasing");
        assert!(pieces.windows(2).all(|w| w[1].c > w[0].c), "consumption not increasing");
        assert!(pieces.iter().all(|p| p.slope > 0.0 && p.slope <= 1.0 + 1e-12));

        let (m_boro, m_save) = soln.consumption().kinks().unwrap();
        for m in [m_boro, m_save] {
            assert_relative_eq!(soln.c(m - 1e-9), soln.c(m), epsilon = 1e-8);
            assert_relative_eq!(soln.c(m + 1e-9), soln.c(m), epsilon = 1e-8);
        }
    }
}

#[test]
fn test_plateau_has_unit_slope() {
    let solutions = solve(RawParams { periods: Some(5), ..Default::default() });
    let cf = solutions[0].consumption();
    let (m_boro, m_save) = cf.kinks().unwrap();
    assert!(m_save > m_boro);

    let mid = 0.5 * (m_boro + m_save);
    assert_relative_eq!(cf.derivative(mid), 1.0, epsilon = 1e-12);
    // Neither borrowing nor saving on the plateau
    assert_relative_eq!(cf.eval(mid), mid, epsilon = 1e-12);

    let boro = cf.pieces().into_iter().find(|p| p.regime == Regime::BorrowingKink).unwrap();
    assert_relative_eq!(boro.slope, 1.0, epsilon = 1e-12);
}

#[test]
fn test_below_minimum_follows_constraint_exactly() {
    let solutions = solve(RawParams { periods: Some(3), ..Default::default() });
    let soln = &solutions[0];
    let m_min = soln.m_nrm_min();
    assert!(m_min < 0.0);
    assert_eq!(soln.c(m_min), 0.0);
    for m in [m_min - 0.25, m_min - 1.0, m_min - 10.0] {
        assert_eq!(soln.c(m), m - m_min);
    }
}

#[test]
fn test_plateau_widens_with_borrowing_rate() {
    let base = RawParams { periods: Some(1), ..Default::default() }.into_params().unwrap();
    let next = solve(RawParams { periods: Some(4), ..Default::default() }).remove(0);

    for prior in [Solution::terminal(base.utility()).unwrap(), next] {
        let widths: Vec<f64> = [1.04, 1.10, 1.20, 1.30]
            .iter()
            .map(|&rboro| {
                let params = base.with_rates(InterestSchedule::new(rboro, base.rates().rsave()).unwrap());
                let soln = KinkedRSolver.solve_period(&params, &prior).unwrap();
                soln.consumption().plateau_width()
            })
            .collect();
        assert!(widths[0] > 0.0);
        assert!(widths.windows(2).all(|w| w[1] > w[0]), "widths {:?}", widths);
    }
}

#[test]
fn test_no_borrowing_scenario() {
    let params = no_borrowing_scenario();
    let mut model = Model::new(params.clone());
    model.solve().unwrap();
    let soln = model.first().unwrap();

    assert_eq!(soln.m_nrm_min(), 0.0);
    assert_eq!(soln.c(0.0), 0.0);
    assert_eq!(soln.mpc_max(), 1.0);

    // Hand-to-mouth up to the saving kink, saving beyond it
    let (m_boro, m_save) = soln.consumption().kinks().unwrap();
    for m in [0.25 * m_boro, m_boro, 0.5 * (m_boro + m_save), m_save] {
        assert_relative_eq!(soln.c(m), m, epsilon = 1e-10);
    }
    for m in [m_save + 0.5, 5.0, 15.0] {
        assert!(soln.c(m) < m);
    }

    let target = target_m(&params, soln).unwrap();
    assert!(target > 0.0);
}

#[test]
fn test_matches_ind_shock_with_rsave_when_borrowing_is_forbidden() {
    // With no borrowing the kink only splits a point at a = 0
    let kinked = no_borrowing_scenario().with_horizon(kinked_r::Horizon::Finite { periods: 3 }).unwrap();
    let flat = kinked.with_rates(InterestSchedule::flat(1.01).unwrap());

    let terminal = Solution::terminal(kinked.utility()).unwrap();
    let a = KinkedRSolver.solve_period(&kinked, &terminal).unwrap();
    let b = IndShockSolver.solve_period(&flat, &terminal).unwrap();
    for m in [0.5, 1.0, 2.0, 5.0, 10.0] {
        assert_relative_eq!(a.c(m), b.c(m), epsilon = 1e-10);
    }
}

#[test]
fn test_solution_json_round_trip() {
    let solutions = solve(RawParams { periods: Some(2), vfunc_bool: true, ..Default::default() });
    let json = serde_json::to_string(&solutions[0]).unwrap();
    let back: Solution = serde_json::from_str(&json).unwrap();
    assert_eq!(back, solutions[0]);
    assert_eq!(back.c(1.3), solutions[0].c(1.3));
}

#[test]
fn test_value_function_envelope() {
    let solutions = solve(RawParams { periods: Some(3), vfunc_bool: true, ..Default::default() });
    let soln = &solutions[0];
    let value = soln.value().unwrap();

    let ms = [0.5, 1.0, 2.0, 4.0, 8.0];
    let vs: Vec<f64> = ms.iter().map(|&m| value.eval(m)).collect();
    assert!(vs.windows(2).all(|w| w[1] > w[0]), "value not increasing: {:?}", vs);

    // v'(m) = u'(c(m))
    let h = 1e-4;
    for m in [2.0, 4.0] {
        let dv = (value.eval(m + h) - value.eval(m - h)) / (2.0 * h);
        assert_relative_eq!(dv, soln.marginal_value(m), max_relative = 0.05);
    }
}
