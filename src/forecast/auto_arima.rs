//! Automatic ARIMA(p, d, 0) order selection.
//!
//! For a value column we fit every candidate order:
//! 1. difference the series `d ∈ 0..=max_d` times
//! 2. fit AR(p) with intercept for every `p ∈ 0..=max_p` by least squares
//! 3. score each fit with BIC = n * ln(SSE/n) + k * ln(n), k = p + 1
//!
//! Selection rules:
//! 1. Exclude underdetermined candidates: require `n >= k + MIN_N_BUFFER`
//! 2. Find the minimum BIC over all `(p, d)`
//! 3. Among candidates within 2 BIC points of it, pick the one with the
//!    fewest parameters, then the lowest `d`
//!
//! If no candidate survives, fall back to the naive forecaster.

use tracing::debug;

use crate::error::AppError;
use crate::forecast::forecaster::{Forecaster, ModelSummary, NaiveForecaster, Prediction};
use crate::math::{ar_design, difference, integrate, solve_least_squares, sse};

/// Minimum number of extra observations beyond parameter count.
const MIN_N_BUFFER: usize = 5;

/// BIC slack within which a simpler order is preferred.
const BIC_SIMPLICITY_SLACK: f64 = 2.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AutoArima {
    pub max_p: usize,
    pub max_d: usize,
}

impl Default for AutoArima {
    fn default() -> Self {
        Self { max_p: 3, max_d: 2 }
    }
}

/// One fitted AR candidate on the `d`-times differenced scale.
#[derive(Debug, Clone)]
struct ArFit {
    p: usize,
    d: usize,
    /// `[intercept, φ1, ..., φp]`.
    coefs: Vec<f64>,
    bic: f64,
    n: usize,
}

impl ArFit {
    fn n_params(&self) -> usize {
        self.p + 1
    }
}

impl AutoArima {
    fn fit_candidates(&self, values: &[f64]) -> Vec<ArFit> {
        let mut fits = Vec::new();
        for d in 0..=self.max_d {
            let diffed = difference(values, d);
            for p in 0..=self.max_p {
                let k = p + 1;
                let Some((x, y)) = ar_design(&diffed, p) else {
                    continue;
                };
                let n = y.len();
                if n < k + MIN_N_BUFFER {
                    debug!(p, d, n, "underdetermined AR candidate skipped");
                    continue;
                }
                let Some(beta) = solve_least_squares(&x, &y) else {
                    debug!(p, d, "AR candidate solve failed");
                    continue;
                };
                let fit_sse = sse(&x, &y, &beta);
                fits.push(ArFit {
                    p,
                    d,
                    coefs: beta.iter().copied().collect(),
                    bic: bic(n, fit_sse, k),
                    n,
                });
            }
        }
        fits
    }
}

impl Forecaster for AutoArima {
    fn fit_and_predict(&self, values: &[f64], horizon: usize) -> Result<Prediction, AppError> {
        if values.is_empty() {
            return Err(AppError::model("Cannot forecast an empty series."));
        }

        let fits = self.fit_candidates(values);
        let Some(best) = select_by_bic(&fits) else {
            debug!(n = values.len(), "no ARIMA candidate fits; using naive forecast");
            return NaiveForecaster.fit_and_predict(values, horizon);
        };
        let (p, d) = (best.p, best.d);
        debug!(p, d, bic = best.bic, candidates = fits.len(), "ARIMA order selected");

        let diffed = difference(values, d);
        let future = ar_recursion(&diffed, &best.coefs, horizon);
        let predicted = integrate(values, &future, d);
        if predicted.iter().any(|v| !v.is_finite()) {
            return Err(AppError::model(format!(
                "ARIMA({p}, {d}, 0) produced a non-finite forecast."
            )));
        }

        Ok(Prediction {
            values: predicted,
            summary: ModelSummary {
                display_name: format!("ARIMA({p},{d},0)"),
                p,
                d,
                bic: Some(best.bic),
                n_obs: best.n,
            },
        })
    }
}

/// Iterate `y_t = c + Σ φ_i y_{t-i}` forward `horizon` steps.
fn ar_recursion(history: &[f64], coefs: &[f64], horizon: usize) -> Vec<f64> {
    let p = coefs.len() - 1;
    let mut buf: Vec<f64> = history.to_vec();
    let mut out = Vec::with_capacity(horizon);
    for _ in 0..horizon {
        let mut next = coefs[0];
        for lag in 1..=p {
            next += coefs[lag] * buf[buf.len() - lag];
        }
        buf.push(next);
        out.push(next);
    }
    out
}

fn bic(n: usize, sse: f64, k: usize) -> f64 {
    let n_f = n as f64;
    let sse_per = (sse / n_f).max(1e-12);
    n_f * sse_per.ln() + (k as f64) * n_f.ln()
}

fn select_by_bic(fits: &[ArFit]) -> Option<&ArFit> {
    let best = fits
        .iter()
        .map(|f| f.bic)
        .min_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal))?;

    fits.iter()
        .filter(|f| f.bic < best + BIC_SIMPLICITY_SLACK)
        .min_by_key(|f| (f.n_params(), f.d))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fit(p: usize, d: usize, bic: f64) -> ArFit {
        ArFit { p, d, coefs: vec![0.0; p + 1], bic, n: 30 }
    }

    fn variance(values: &[f64]) -> f64 {
        let n = values.len() as f64;
        let mean = values.iter().sum::<f64>() / n;
        values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n
    }

    #[test]
    fn linear_trend_is_extrapolated() {
        let values: Vec<f64> = (0..20).map(|i| 10.0 + 2.0 * i as f64).collect();
        let pred = AutoArima::default().fit_and_predict(&values, 3).unwrap();
        assert_eq!(pred.summary.d, 1);
        assert_eq!(pred.summary.p, 0);
        let expected = [50.0, 52.0, 54.0];
        for (got, want) in pred.values.iter().zip(expected) {
            assert!((got - want).abs() < 1e-6, "got {got}, want {want}");
        }
    }

    #[test]
    fn constant_series_stays_constant() {
        let values = vec![4.0; 15];
        let pred = AutoArima::default().fit_and_predict(&values, 4).unwrap();
        assert_eq!(pred.summary.d, 0);
        assert_eq!(pred.summary.p, 0);
        assert!(pred.values.iter().all(|v| (v - 4.0).abs() < 1e-9));
    }

    #[test]
    fn order_is_chosen_jointly_not_by_variance() {
        // Slow trend plus a large alternating component. The levels have far
        // less variance than the first differences, yet the differences follow
        // an exact AR(1) while the levels need AR(2).
        let values: Vec<f64> = (0..40)
            .map(|t| 0.1 * t as f64 + if t % 2 == 0 { 5.0 } else { -5.0 })
            .collect();
        assert!(variance(&values) < variance(&difference(&values, 1)));

        let pred = AutoArima::default().fit_and_predict(&values, 2).unwrap();
        assert_eq!((pred.summary.p, pred.summary.d), (1, 1));
        assert_eq!(pred.summary.display_name, "ARIMA(1,1,0)");
        let expected = [9.0, -0.9];
        for (got, want) in pred.values.iter().zip(expected) {
            assert!((got - want).abs() < 1e-6, "got {got}, want {want}");
        }
    }

    #[test]
    fn ar1_process_picks_an_autoregressive_term() {
        // Deterministic AR(1) around mean 10 with alternating shocks.
        let mut values = vec![10.0];
        for i in 1..60 {
            let shock = if i % 3 == 0 { 1.0 } else { -0.5 };
            let prev = values[i - 1];
            values.push(10.0 + 0.8 * (prev - 10.0) + shock);
        }
        let pred = AutoArima::default().fit_and_predict(&values, 5).unwrap();
        assert_eq!(pred.values.len(), 5);
        assert!(pred.summary.bic.is_some());
        assert!(pred.values.iter().all(|v| v.is_finite()));
    }

    #[test]
    fn short_series_falls_back_to_naive() {
        let pred = AutoArima::default().fit_and_predict(&[1.0, 2.0, 3.0], 2).unwrap();
        assert_eq!(pred.summary.display_name, "Naive");
        assert_eq!(pred.values, vec![3.0, 3.0]);
    }

    #[test]
    fn bic_prefers_fewer_parameters_then_lower_d() {
        let fits = vec![fit(0, 0, 10.0), fit(1, 0, 8.5), fit(2, 0, 5.0)];
        assert_eq!(select_by_bic(&fits).unwrap().p, 2);

        let close = vec![fit(0, 0, 10.0), fit(1, 0, 8.5)];
        assert_eq!(select_by_bic(&close).unwrap().p, 0);

        // Same parameter count within the slack: lower d wins.
        let tied = vec![fit(1, 2, -40.0), fit(1, 1, -39.5), fit(2, 0, -41.0)];
        let chosen = select_by_bic(&tied).unwrap();
        assert_eq!((chosen.p, chosen.d), (1, 1));

        // Exactly 2 points worse is outside the slack.
        let edge = vec![fit(0, 1, -8.0), fit(2, 0, -10.0)];
        assert_eq!(select_by_bic(&edge).unwrap().p, 2);

        assert!(select_by_bic(&[]).is_none());
    }
}
