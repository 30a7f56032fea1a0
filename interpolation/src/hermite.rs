use crate::{InterpolationError, Result};

/// Hermite interpolant through `n` (t, y, ẏ) triples, built with Newton
/// divided differences over doubled abscissae. The polynomial has degree
/// `2n - 1` and matches both the values and the first derivatives at every
/// node.
///
/// This is the dense-output workhorse of the ODE stepper: four nodes of an
/// accepted step give the degree-7 interpolant used for event localization.
///
/// # Example
/// ```
/// # use interpolation::Hermite;
/// #
/// # fn main() -> interpolation::Result<()> {
/// // Two nodes with values and slopes pin down a cubic: 3t² - 2t³.
/// let h = Hermite::fit(&[0.0, 1.0], &[0.0, 1.0], &[0.0, 0.0])?;
/// assert!((h.eval(0.5) - 0.5).abs() < 1e-15);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct Hermite {
    /// Doubled abscissae.
    z: Vec<f64>,
    /// Newton-form coefficients.
    coef: Vec<f64>,
}

impl Hermite {
    /// Fits the interpolant. The abscissae must be distinct; values and
    /// derivatives must match the abscissae in length.
    pub fn fit(ts: &[f64], ys: &[f64], dys: &[f64]) -> Result<Self> {
        if ts.is_empty() {
            return Err(InterpolationError::EmptyData);
        }
        if ts.len() != ys.len() || ts.len() != dys.len() {
            return Err(InterpolationError::MismatchedLengths {
                xlen: ts.len(),
                ylen: ys.len().min(dys.len()),
            });
        }
        if ts.windows(2).any(|w| w[1] <= w[0]) {
            return Err(InterpolationError::DegenerateGrid);
        }

        let n2 = 2 * ts.len();
        let mut z = Vec::with_capacity(n2);
        for t in ts {
            z.push(*t);
            z.push(*t);
        }

        // dd[k] holds the order-j divided difference ending at node k.
        let mut dd: Vec<f64> = (0..n2).map(|k| ys[k / 2]).collect();
        let mut coef = Vec::with_capacity(n2);
        coef.push(dd[0]);
        for j in 1..n2 {
            for k in (j..n2).rev() {
                dd[k] = if z[k] == z[k - j] {
                    // Repeated abscissa: the difference degenerates to the
                    // prescribed derivative (only possible for j == 1).
                    dys[k / 2]
                } else {
                    (dd[k] - dd[k - 1]) / (z[k] - z[k - j])
                };
            }
            coef.push(dd[j]);
        }

        Ok(Self { z, coef })
    }

    /// Evaluates the polynomial at `t` (Horner on the Newton form).
    pub fn eval(&self, t: f64) -> f64 {
        let n = self.coef.len();
        let mut v = self.coef[n - 1];
        for i in (0..n - 1).rev() {
            v = v * (t - self.z[i]) + self.coef[i];
        }
        v
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use float_cmp::assert_approx_eq;

    #[test]
    fn test_degree7_exactness() {
        // 4 nodes with derivatives pin down any degree-7 polynomial.
        let p = |t: f64| 1.0 - 2.0 * t + 0.5 * t.powi(3) + 0.25 * t.powi(5) - 0.125 * t.powi(7);
        let dp = |t: f64| {
            -2.0 + 1.5 * t.powi(2) + 1.25 * t.powi(4) - 0.875 * t.powi(6)
        };
        let ts = [0.0, 1.0 / 3.0, 2.0 / 3.0, 1.0];
        let ys: Vec<f64> = ts.iter().map(|&t| p(t)).collect();
        let dys: Vec<f64> = ts.iter().map(|&t| dp(t)).collect();

        let h = Hermite::fit(&ts, &ys, &dys).unwrap();
        for i in 0..=20 {
            let t = i as f64 / 20.0;
            assert_approx_eq!(f64, h.eval(t), p(t), epsilon = 1e-12);
        }
    }

    #[test]
    fn test_nodes_and_derivatives_matched() {
        let ts = [0.0, 0.4, 1.1];
        let ys = [1.0, -0.3, 2.0];
        let dys = [0.0, 1.5, -2.0];
        let h = Hermite::fit(&ts, &ys, &dys).unwrap();

        for (t, y) in ts.iter().zip(ys.iter()) {
            assert_approx_eq!(f64, h.eval(*t), *y, epsilon = 1e-12);
        }
        // Derivatives via a symmetric difference.
        let eps = 1e-7;
        for (t, dy) in ts.iter().zip(dys.iter()) {
            let num = (h.eval(t + eps) - h.eval(t - eps)) / (2.0 * eps);
            assert_approx_eq!(f64, num, *dy, epsilon = 1e-5);
        }
    }

    #[test]
    fn test_length_mismatch() {
        assert!(matches!(
            Hermite::fit(&[0.0, 1.0], &[0.0], &[0.0, 0.0]).unwrap_err(),
            InterpolationError::MismatchedLengths { .. }
        ));
    }
}
