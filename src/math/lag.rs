//! Differencing and lag-matrix helpers for autoregressive fits.

use nalgebra::{DMatrix, DVector};

/// Apply first differences `d` times. Each pass shortens the series by one.
pub fn difference(values: &[f64], d: usize) -> Vec<f64> {
    let mut out = values.to_vec();
    for _ in 0..d {
        out = out.windows(2).map(|w| w[1] - w[0]).collect();
    }
    out
}

/// Undo `difference(history, d)` for values that continue past the end of `history`.
///
/// `future` is on the `d`-times differenced scale; the result is on the
/// original scale, continuing from the last observations of `history`.
pub fn integrate(history: &[f64], future: &[f64], d: usize) -> Vec<f64> {
    if d == 0 {
        return future.to_vec();
    }
    // Last value at each differencing level 0..d-1.
    let mut anchors = Vec::with_capacity(d);
    for level in 0..d {
        let diffed = difference(history, level);
        anchors.push(diffed.last().copied().unwrap_or(0.0));
    }

    let mut current = future.to_vec();
    for level in (0..d).rev() {
        let mut last = anchors[level];
        current = current
            .iter()
            .map(|&step| {
                last += step;
                last
            })
            .collect();
    }
    current
}

/// Design matrix for AR(p) with intercept.
///
/// Row `i` is `[1, y[i+p-1], ..., y[i]]` with target `y[i+p]`.
pub fn ar_design(values: &[f64], p: usize) -> Option<(DMatrix<f64>, DVector<f64>)> {
    if values.len() <= p {
        return None;
    }
    let rows = values.len() - p;
    let cols = p + 1;
    let mut x = DMatrix::zeros(rows, cols);
    let mut y = DVector::zeros(rows);
    for i in 0..rows {
        x[(i, 0)] = 1.0;
        for lag in 1..=p {
            x[(i, lag)] = values[i + p - lag];
        }
        y[i] = values[i + p];
    }
    Some((x, y))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn difference_then_integrate_continues_series() {
        let history = [1.0, 4.0, 9.0, 16.0];
        let d2 = difference(&history, 2);
        assert_eq!(d2, vec![2.0, 2.0]);

        // Continue with constant second difference 2: next squares are 25, 36.
        let out = integrate(&history, &[2.0, 2.0], 2);
        assert_eq!(out, vec![25.0, 36.0]);
    }

    #[test]
    fn ar_design_lays_out_lags() {
        let (x, y) = ar_design(&[1.0, 2.0, 3.0, 4.0], 2).unwrap();
        assert_eq!(x.nrows(), 2);
        assert_eq!(x.row(0).iter().copied().collect::<Vec<_>>(), vec![1.0, 2.0, 1.0]);
        assert_eq!(y.as_slice(), &[3.0, 4.0]);
        assert!(ar_design(&[1.0], 1).is_none());
    }
}
