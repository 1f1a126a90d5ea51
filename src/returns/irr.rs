//! Irregular-interval Internal Rate of Return (XIRR)
//!
//! The rate is found in two stages: a secant iteration started at zero, and,
//! if that fails, Brent's bracketing method over a wide rate interval.

use crate::error::SolveError;
use crate::series::{TimeSeries, DAYS_PER_YEAR};
use log::debug;
use serde::{Deserialize, Serialize};

/// Lowest rate in the fallback bracket (just above -100%)
pub const BRACKET_LOWER: f64 = -0.999999999999999;

/// Highest rate in the fallback bracket (+10 000%)
pub const BRACKET_UPPER: f64 = 100.0;

/// Tuning for the two-stage root finder
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SolverConfig {
    /// Relative tolerance of the secant stage
    pub secant_rtol: f64,
    /// Absolute tolerance of the secant stage
    pub secant_atol: f64,
    pub secant_max_iter: usize,
    /// A secant root is only accepted if `|f(root)|` is within this fraction
    /// of `max(|f(x0)|, 1)`
    pub secant_residual_rtol: f64,
    /// Rate interval searched by the fallback stage
    pub bracket: (f64, f64),
    pub bracket_xtol: f64,
    pub bracket_rtol: f64,
    pub bracket_max_iter: usize,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            secant_rtol: 1e-4,
            secant_atol: 1.48e-8,
            secant_max_iter: 50,
            secant_residual_rtol: 1e-4,
            bracket: (BRACKET_LOWER, BRACKET_UPPER),
            bracket_xtol: 2e-12,
            bracket_rtol: 4.0 * f64::EPSILON,
            bracket_max_iter: 10_000,
        }
    }
}

/// Calculate the XIRR of a dated, signed cashflow series.
///
/// Zero cashflows are dropped first. Without at least one strictly positive
/// and one strictly negative cashflow there is no real root and the result is
/// `Ok(NaN)`. An `Err` is returned only when the fallback stage fails too.
pub fn xirr(cashflows: &TimeSeries, config: &SolverConfig) -> Result<f64, SolveError> {
    let (amounts, dates): (Vec<f64>, Vec<_>) = cashflows
        .values()
        .iter()
        .zip(cashflows.dates())
        .filter(|(cf, _)| **cf != 0.0)
        .map(|(&cf, &d)| (cf, d))
        .unzip();

    // Check if there's at least one sign change (required for IRR to exist)
    let has_positive = amounts.iter().any(|&cf| cf > 0.0);
    let has_negative = amounts.iter().any(|&cf| cf < 0.0);
    if !has_positive || !has_negative {
        return Ok(f64::NAN);
    }

    // Filtered dates keep the series order, so the first one is the earliest
    let start = dates[0];
    let years: Vec<f64> = dates
        .iter()
        .map(|&d| (d - start).num_days() as f64 / DAYS_PER_YEAR)
        .collect();

    let rate = solve_root(|r| npv(&amounts, &years, r), config.bracket, 0.0, config)?;

    Ok(if rate.is_finite() { rate } else { f64::NAN })
}

/// Net present value of cashflows at year offsets `years` for annual `rate`
pub fn npv(amounts: &[f64], years: &[f64], rate: f64) -> f64 {
    amounts
        .iter()
        .zip(years)
        .map(|(&cf, &t)| cf / (1.0 + rate).powf(t))
        .sum()
}

/// Find a root of `f`, trying the secant method from `x0` first and falling
/// back to Brent's method over `bracket`.
pub fn solve_root<F>(f: F, bracket: (f64, f64), x0: f64, config: &SolverConfig) -> Result<f64, SolveError>
where
    F: Fn(f64) -> f64,
{
    let accepted = secant(&f, x0, config).and_then(|root| {
        let residual = f(root).abs();
        let scale = f(x0).abs().max(1.0);
        if residual <= config.secant_residual_rtol * scale {
            Ok(root)
        } else {
            Err(SolveError::Residual { rate: root, residual })
        }
    });

    match accepted {
        Ok(root) => Ok(root),
        Err(e) => {
            debug!("Secant stage failed ({}), falling back to Brent on [{}, {}]", e, bracket.0, bracket.1);
            brent(&f, bracket.0, bracket.1, config)
        }
    }
}

/// Secant iteration started at `x0` and a second point nudged by 1e-4
fn secant<F>(f: &F, x0: f64, config: &SolverConfig) -> Result<f64, SolveError>
where
    F: Fn(f64) -> f64,
{
    const METHOD: &str = "secant";
    let eps = 1e-4;

    let mut p0 = x0;
    let mut p1 = x0 * (1.0 + eps);
    p1 += if p1 >= 0.0 { eps } else { -eps };

    let mut q0 = f(p0);
    let mut q1 = f(p1);
    if q1.abs() < q0.abs() {
        std::mem::swap(&mut p0, &mut p1);
        std::mem::swap(&mut q0, &mut q1);
    }

    for iteration in 0..config.secant_max_iter {
        if !q0.is_finite() || !q1.is_finite() {
            return Err(SolveError::NonFinite { method: METHOD, rate: p1 });
        }

        // Flat secant: no information left to step with
        if q1 == q0 {
            return Err(SolveError::NonConvergence {
                method: METHOD,
                iterations: iteration,
            });
        }

        let p = if q1.abs() > q0.abs() {
            (-q0 / q1 * p1 + p0) / (1.0 - q0 / q1)
        } else {
            (-q1 / q0 * p0 + p1) / (1.0 - q1 / q0)
        };

        if !p.is_finite() {
            return Err(SolveError::NonFinite { method: METHOD, rate: p });
        }
        if (p - p1).abs() <= config.secant_atol + config.secant_rtol * p1.abs() {
            return Ok(p);
        }

        p0 = p1;
        q0 = q1;
        p1 = p;
        q1 = f(p1);
    }

    Err(SolveError::NonConvergence {
        method: METHOD,
        iterations: config.secant_max_iter,
    })
}

/// Brent's method on `[a, b]`; requires `f(a)` and `f(b)` of opposite sign
fn brent<F>(f: &F, a: f64, b: f64, config: &SolverConfig) -> Result<f64, SolveError>
where
    F: Fn(f64) -> f64,
{
    const METHOD: &str = "brent";

    let mut xpre = a;
    let mut xcur = b;
    let mut fpre = f(xpre);
    let mut fcur = f(xcur);

    if fpre * fcur > 0.0 || fpre.is_nan() || fcur.is_nan() {
        return Err(SolveError::NoSignChange { lower: a, upper: b });
    }
    if fpre == 0.0 {
        return Ok(xpre);
    }
    if fcur == 0.0 {
        return Ok(xcur);
    }

    let mut xblk = 0.0;
    let mut fblk = 0.0;
    let mut spre = 0.0;
    let mut scur = 0.0;

    for _ in 0..config.bracket_max_iter {
        if fpre != 0.0 && fcur != 0.0 && fpre.is_sign_negative() != fcur.is_sign_negative() {
            xblk = xpre;
            fblk = fpre;
            spre = xcur - xpre;
            scur = spre;
        }
        if fblk.abs() < fcur.abs() {
            xpre = xcur;
            xcur = xblk;
            xblk = xpre;

            fpre = fcur;
            fcur = fblk;
            fblk = fpre;
        }

        let delta = (config.bracket_xtol + config.bracket_rtol * xcur.abs()) / 2.0;
        let sbis = (xblk - xcur) / 2.0;
        if fcur == 0.0 || sbis.abs() < delta {
            return Ok(xcur);
        }

        if spre.abs() > delta && fcur.abs() < fpre.abs() {
            let stry = if xpre == xblk {
                // interpolate
                -fcur * (xcur - xpre) / (fcur - fpre)
            } else {
                // extrapolate
                let dpre = (fpre - fcur) / (xpre - xcur);
                let dblk = (fblk - fcur) / (xblk - xcur);
                -fcur * (fblk * dblk - fpre * dpre) / (dblk * dpre * (fblk - fpre))
            };

            if 2.0 * stry.abs() < spre.abs().min(3.0 * sbis.abs() - delta) {
                // good short step
                spre = scur;
                scur = stry;
            } else {
                // bisect
                spre = sbis;
                scur = sbis;
            }
        } else {
            spre = sbis;
            scur = sbis;
        }

        xpre = xcur;
        fpre = fcur;
        if scur.abs() > delta {
            xcur += scur;
        } else {
            xcur += if sbis > 0.0 { delta } else { -delta };
        }

        fcur = f(xcur);
        if fcur.is_nan() {
            return Err(SolveError::NonFinite { method: METHOD, rate: xcur });
        }
    }

    Err(SolveError::NonConvergence {
        method: METHOD,
        iterations: config.bracket_max_iter,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::series::date;
    use approx::assert_relative_eq;

    fn series(offsets: &[i64], values: Vec<f64>) -> TimeSeries {
        TimeSeries::from_day_offsets(date(2020, 1, 1), offsets, values).unwrap()
    }

    fn relative_residual(cashflows: &TimeSeries, rate: f64) -> f64 {
        let start = cashflows.first_date();
        let years: Vec<f64> = cashflows
            .dates()
            .iter()
            .map(|&d| (d - start).num_days() as f64 / DAYS_PER_YEAR)
            .collect();
        let scale: f64 = cashflows.values().iter().map(|cf| cf.abs()).sum();
        npv(cashflows.values(), &years, rate).abs() / scale
    }

    #[test]
    fn test_simple_irr() {
        // Investment of $1000, returns $1100 after 1 year
        let cashflows = series(&[0, 365], vec![-1000.0, 1100.0]);
        let irr = xirr(&cashflows, &SolverConfig::default()).unwrap();
        assert_relative_eq!(irr, 0.10, epsilon = 1e-6);
    }

    #[test]
    fn test_no_sign_change_is_nan() {
        let config = SolverConfig::default();
        assert!(xirr(&series(&[0, 100, 365], vec![100.0, 5.0, 10.0]), &config).unwrap().is_nan());
        assert!(xirr(&series(&[0, 100, 365], vec![-100.0, -5.0, -10.0]), &config).unwrap().is_nan());
        assert!(xirr(&series(&[0, 365], vec![0.0, 0.0]), &config).unwrap().is_nan());
        // Zeros do not count as either sign
        assert!(xirr(&series(&[0, 100, 365], vec![0.0, -5.0, 0.0]), &config).unwrap().is_nan());
    }

    #[test]
    fn test_leading_zeros_shift_time_origin() {
        // The first non-zero flow defines t = 0
        let cashflows = series(&[0, 365, 730], vec![0.0, -1000.0, 1100.0]);
        let irr = xirr(&cashflows, &SolverConfig::default()).unwrap();
        assert_relative_eq!(irr, 0.10, epsilon = 1e-6);
    }

    #[test]
    fn test_irregular_flows_residual() {
        let cashflows = series(
            &[0, 45, 182, 300, 365, 900],
            vec![-10_000.0, 2_500.0, -1_000.0, 3_000.0, 4_200.0, 5_000.0],
        );
        let irr = xirr(&cashflows, &SolverConfig::default()).unwrap();
        assert!(irr.is_finite());
        assert!(relative_residual(&cashflows, irr) < 1e-6, "residual too large at {}", irr);
    }

    #[test]
    fn test_falls_back_to_brent() {
        // A secant budget of one iteration cannot converge on this root
        let config = SolverConfig {
            secant_max_iter: 1,
            ..SolverConfig::default()
        };
        let cashflows = series(&[0, 365, 730], vec![-100.0, 10.0, 150.0]);
        let irr = xirr(&cashflows, &config).unwrap();
        assert!(relative_residual(&cashflows, irr) < 1e-9);
    }

    #[test]
    fn test_brent_without_bracket_sign_change() {
        let config = SolverConfig {
            secant_max_iter: 0,
            bracket: (0.5, 1.0),
            ..SolverConfig::default()
        };
        // Root at 10%, outside [0.5, 1.0]
        let cashflows = series(&[0, 365], vec![-1000.0, 1100.0]);
        let err = xirr(&cashflows, &config).unwrap_err();
        assert_eq!(err, SolveError::NoSignChange { lower: 0.5, upper: 1.0 });
    }

    #[test]
    fn test_solve_root_quadratic() {
        let root = solve_root(|x| x * x - 2.0, (0.0, 10.0), 1.0, &SolverConfig::default()).unwrap();
        assert_relative_eq!(root, 2.0_f64.sqrt(), epsilon = 1e-4);
    }

    #[test]
    fn test_losing_investment() {
        // Half the money is lost over one year
        let cashflows = series(&[0, 365], vec![-1000.0, 500.0]);
        let irr = xirr(&cashflows, &SolverConfig::default()).unwrap();
        assert_relative_eq!(irr, -0.5, epsilon = 1e-5);

        let cashflows = series(&[0, 365], vec![-1.0, 0.5]);
        let irr = xirr(&cashflows, &SolverConfig::default()).unwrap();
        assert_relative_eq!(irr, -0.5, epsilon = 1e-5);
    }

    #[test]
    fn test_loss_residual() {
        let config = SolverConfig::default();
        for &payback in &[1e-3, 0.2, 0.5, 0.9] {
            let cashflows = series(&[0, 120, 500], vec![-100.0, -20.0, 120.0 * payback]);
            let irr = xirr(&cashflows, &config).unwrap();
            assert!(irr < 0.0 && irr > -1.0, "rate {} for payback {}", irr, payback);
            assert!(relative_residual(&cashflows, irr) < 1e-4, "residual too large at {}", irr);
        }
    }

    #[test]
    fn test_loss_root_from_zero() {
        // The first secant step overshoots past -100%
        let f = |r: f64| -1.0 + 0.5 / (1.0 + r);
        let root = solve_root(f, (BRACKET_LOWER, BRACKET_UPPER), 0.0, &SolverConfig::default()).unwrap();
        assert_relative_eq!(root, -0.5, epsilon = 1e-4);
    }

    #[test]
    fn test_flat_function_is_not_a_root() {
        // Constant far from zero: the secant sees no slope and must not report one
        let config = SolverConfig::default();
        assert!(matches!(
            secant(&|_: f64| -1.0, 0.0, &config),
            Err(SolveError::NonConvergence { method: "secant", .. })
        ));

        let err = solve_root(|_: f64| -1.0, (BRACKET_LOWER, BRACKET_UPPER), 0.0, &config).unwrap_err();
        assert!(matches!(err, SolveError::NoSignChange { .. }));
    }

    #[test]
    fn test_deterministic() {
        let cashflows = series(&[0, 90, 400], vec![-500.0, -200.0, 800.0]);
        let config = SolverConfig::default();
        let a = xirr(&cashflows, &config).unwrap();
        let b = xirr(&cashflows, &config).unwrap();
        assert_eq!(a.to_bits(), b.to_bits());
    }
}
