use thiserror::Error;

use super::summary::{mean, sample_std};

/// z quantile for a two-sided 95% interval.
pub const Z95: f64 = 1.96;

/// Failures when fitting the degree-2 regression.
#[derive(Debug, Error)]
pub enum FitError {
    #[error("quadratic fit needs at least {needed} observations, got {got}")]
    TooFewPoints { got: usize, needed: usize },
    #[error("quadratic fit needs at least 3 distinct x values")]
    Degenerate,
}

// ---------------------------------------------------------------------------
// QuadraticFit – least-squares y = c0 + c1·x + c2·x²
// ---------------------------------------------------------------------------

/// An ordinary-least-squares quadratic with enough by-products to draw an
/// analytic confidence band for the conditional mean.
#[derive(Debug, Clone)]
pub struct QuadraticFit {
    /// Coefficients `[c0, c1, c2]` of `c0 + c1·x + c2·x²`.
    pub coeffs: [f64; 3],
    /// Residual variance s² with n−3 degrees of freedom.
    residual_var: f64,
    /// (XᵀX)⁻¹ of the design matrix, symmetric.
    xtx_inv: [[f64; 3]; 3],
    /// Number of observations.
    pub n: usize,
}

/// Fit `y = c0 + c1·x + c2·x²` by solving the normal equations.
pub fn fit_quadratic(pairs: &[(f64, f64)]) -> Result<QuadraticFit, FitError> {
    let n = pairs.len();
    // n ≥ 4 so the residual variance has at least one degree of freedom.
    if n < 4 {
        return Err(FitError::TooFewPoints { got: n, needed: 4 });
    }
    let mut distinct: Vec<f64> = pairs.iter().map(|(x, _)| *x).collect();
    distinct.sort_by(f64::total_cmp);
    distinct.dedup();
    if distinct.len() < 3 {
        return Err(FitError::Degenerate);
    }

    // XᵀX = moments s0..s4, Xᵀy = t0..t2.
    let mut s = [0.0f64; 5];
    let mut t = [0.0f64; 3];
    for &(x, y) in pairs {
        let mut xk = 1.0;
        for k in 0..5 {
            s[k] += xk;
            if k < 3 {
                t[k] += xk * y;
            }
            xk *= x;
        }
    }
    let xtx = [[s[0], s[1], s[2]], [s[1], s[2], s[3]], [s[2], s[3], s[4]]];

    let xtx_inv = invert_3x3(&xtx).ok_or(FitError::Degenerate)?;
    let mut coeffs = [0.0f64; 3];
    for i in 0..3 {
        for j in 0..3 {
            coeffs[i] += xtx_inv[i][j] * t[j];
        }
    }

    let rss: f64 = pairs
        .iter()
        .map(|&(x, y)| {
            let yhat = coeffs[0] + coeffs[1] * x + coeffs[2] * x * x;
            (y - yhat).powi(2)
        })
        .sum();
    let residual_var = rss / (n - 3) as f64;

    Ok(QuadraticFit {
        coeffs,
        residual_var,
        xtx_inv,
        n,
    })
}

impl QuadraticFit {
    /// Fitted value at `x`.
    pub fn predict(&self, x: f64) -> f64 {
        self.coeffs[0] + self.coeffs[1] * x + self.coeffs[2] * x * x
    }

    /// 95% confidence interval for the conditional mean at `x`:
    /// ŷ ± z·s·√(x₀ᵀ(XᵀX)⁻¹x₀).
    pub fn confidence_band(&self, x: f64) -> (f64, f64) {
        let x0 = [1.0, x, x * x];
        let mut quad_form = 0.0;
        for i in 0..3 {
            for j in 0..3 {
                quad_form += x0[i] * self.xtx_inv[i][j] * x0[j];
            }
        }
        // Numerical noise can push the quadratic form a hair below zero.
        let se = (self.residual_var * quad_form.max(0.0)).sqrt();
        let yhat = self.predict(x);
        (yhat - Z95 * se, yhat + Z95 * se)
    }

    /// Stationary point −c1/(2·c2) of the parabola; `None` unless the curve
    /// opens downward (only then is the stationary point a maximum).
    pub fn peak_x(&self) -> Option<f64> {
        if self.coeffs[2] < 0.0 {
            Some(-self.coeffs[1] / (2.0 * self.coeffs[2]))
        } else {
            None
        }
    }
}

fn invert_3x3(m: &[[f64; 3]; 3]) -> Option<[[f64; 3]; 3]> {
    let det = m[0][0] * (m[1][1] * m[2][2] - m[1][2] * m[2][1])
        - m[0][1] * (m[1][0] * m[2][2] - m[1][2] * m[2][0])
        + m[0][2] * (m[1][0] * m[2][1] - m[1][1] * m[2][0]);
    if det.abs() < 1e-12 {
        return None;
    }
    let inv_det = 1.0 / det;
    let mut inv = [[0.0f64; 3]; 3];
    for i in 0..3 {
        for j in 0..3 {
            let (r0, r1) = match i {
                0 => (1, 2),
                1 => (0, 2),
                _ => (0, 1),
            };
            let (c0, c1) = match j {
                0 => (1, 2),
                1 => (0, 2),
                _ => (0, 1),
            };
            let minor = m[r0][c0] * m[r1][c1] - m[r0][c1] * m[r1][c0];
            let sign = if (i + j) % 2 == 0 { 1.0 } else { -1.0 };
            // Adjugate transposes the cofactor matrix.
            inv[j][i] = sign * minor * inv_det;
        }
    }
    Some(inv)
}

// ---------------------------------------------------------------------------
// Peak estimate in raw units
// ---------------------------------------------------------------------------

/// Peak location in raw units: z-score the pairs' x axis with the full
/// column's sample statistics, fit on the standardized axis, and convert the
/// fitted coefficients back with [`peak_from_coefficients`]. The column may
/// hold x values whose outcome cell was null and therefore absent from
/// `pairs`; its mean/std still drive the conversion. `None` when the fitted
/// curve opens upward.
pub fn peak_in_raw_units(column: &[f64], pairs: &[(f64, f64)]) -> Result<Option<f64>, FitError> {
    let m = mean(column);
    let s = sample_std(column);
    if s <= 0.0 {
        return Err(FitError::Degenerate);
    }
    let z_pairs: Vec<(f64, f64)> = pairs.iter().map(|&(x, y)| ((x - m) / s, y)).collect();
    let fit = fit_quadratic(&z_pairs)?;
    Ok(fit
        .peak_x()
        .map(|_| peak_from_coefficients(fit.coeffs[2], fit.coeffs[1], s, m)))
}

/// Convert a standardized-axis quadratic `a·z² + b·z + c` into the raw-unit
/// location of its stationary point: `−b/(2a)·std + mean`.
///
/// The historical analysis hard-coded `a = −0.325`, `b = −0.186` here instead
/// of the coefficients actually fitted to the data; the pipeline now fits
/// first and converts with this same closed form, so the legacy numbers stay
/// checkable without being load-bearing.
pub fn peak_from_coefficients(a: f64, b: f64, std: f64, mean: f64) -> f64 {
    -b / (2.0 * a) * std + mean
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recovers_exact_coefficients_on_noiseless_parabola() {
        let pairs: Vec<(f64, f64)> = (0..8)
            .map(|i| {
                let x = i as f64;
                (x, 2.0 - 0.5 * x + 0.1 * x * x)
            })
            .collect();
        let fit = fit_quadratic(&pairs).unwrap();
        assert!((fit.coeffs[0] - 2.0).abs() < 1e-9);
        assert!((fit.coeffs[1] + 0.5).abs() < 1e-9);
        assert!((fit.coeffs[2] - 0.1).abs() < 1e-9);

        // Perfect fit → the band collapses onto the curve.
        let (lo, hi) = fit.confidence_band(3.0);
        let y = fit.predict(3.0);
        assert!((lo - y).abs() < 1e-6);
        assert!((hi - y).abs() < 1e-6);
    }

    #[test]
    fn peak_of_downward_parabola() {
        let pairs: Vec<(f64, f64)> = [0.0, 1.0, 2.0, 3.0, 4.0, 5.0, 6.0]
            .iter()
            .map(|&x| (x, -(x - 3.0) * (x - 3.0)))
            .collect();
        let fit = fit_quadratic(&pairs).unwrap();
        let peak = fit.peak_x().unwrap();
        assert!((peak - 3.0).abs() < 1e-9);
    }

    #[test]
    fn upward_parabola_has_no_peak() {
        let pairs: Vec<(f64, f64)> = (0..6).map(|i| (i as f64, (i * i) as f64)).collect();
        let fit = fit_quadratic(&pairs).unwrap();
        assert!(fit.peak_x().is_none());
    }

    #[test]
    fn band_widens_with_noise() {
        // Same parabola plus alternating offsets.
        let pairs: Vec<(f64, f64)> = (0..12)
            .map(|i| {
                let x = i as f64;
                let noise = if i % 2 == 0 { 0.4 } else { -0.4 };
                (x, 1.0 + x - 0.2 * x * x + noise)
            })
            .collect();
        let fit = fit_quadratic(&pairs).unwrap();
        let (lo, hi) = fit.confidence_band(5.0);
        assert!(hi > lo);
        assert!(hi - lo > 0.1);
    }

    #[test]
    fn too_few_points_is_an_error() {
        let pairs = [(0.0, 1.0), (1.0, 2.0), (2.0, 1.0)];
        assert!(matches!(
            fit_quadratic(&pairs),
            Err(FitError::TooFewPoints { got: 3, needed: 4 })
        ));
    }

    #[test]
    fn collinear_x_is_degenerate() {
        let pairs = [(1.0, 0.0), (1.0, 1.0), (2.0, 2.0), (2.0, 3.0)];
        assert!(matches!(fit_quadratic(&pairs), Err(FitError::Degenerate)));
    }

    #[test]
    fn legacy_peak_formula_matches_closed_form() {
        let (a, b) = (-0.325, -0.186);
        let (mean, std) = (103.75, 84.5);
        let expected = -b / (2.0 * a) * std + mean;
        assert_eq!(peak_from_coefficients(a, b, std, mean), expected);
        // Sanity: the legacy coefficients place the peak below the mean.
        assert!(expected < mean);
    }

    #[test]
    fn peak_conversion_uses_full_column_statistics() {
        // One row's outcome is missing: its x sits in the column but not in
        // the fitted pairs. The estimate still lands on the raw-axis peak of
        // the observed parabola.
        let mut pairs: Vec<(f64, f64)> = Vec::new();
        for &x in &[5.0, 70.0, 140.0, 200.0] {
            for dy in [-0.05, 0.05] {
                let y = -0.00004 * (x - 120.0) * (x - 120.0) + dy;
                pairs.push((x, y));
            }
        }
        let mut column: Vec<f64> = pairs.iter().map(|(x, _)| *x).collect();
        column.push(260.0); // outcome cell was null for this row

        let peak = peak_in_raw_units(&column, &pairs).unwrap().unwrap();
        assert!((peak - 120.0).abs() < 1e-6);
    }

    #[test]
    fn constant_column_cannot_locate_a_peak() {
        let pairs = [(5.0, 0.1), (5.0, 0.2), (5.0, 0.3), (5.0, 0.4)];
        let column = vec![5.0; 4];
        assert!(matches!(
            peak_in_raw_units(&column, &pairs),
            Err(FitError::Degenerate)
        ));
    }
}
