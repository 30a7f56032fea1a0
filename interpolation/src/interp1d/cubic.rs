//! Natural and periodic cubic splines.
//!
//! Both variants solve for the knot second derivatives and convert them to
//! the shared per-interval form. The natural variant pins the end curvatures
//! to zero; the periodic variant closes the tridiagonal system around the
//! seam (Sherman-Morrison on the two corner entries).

use super::PiecewiseCubic;

pub(super) fn natural(xa: &[f64], ya: &[f64]) -> PiecewiseCubic {
    let n = xa.len();
    let mut y2 = vec![0.0; n];

    let m = n - 2;
    let mut sub = vec![0.0; m];
    let mut diag = vec![0.0; m];
    let mut sup = vec![0.0; m];
    let mut rhs = vec![0.0; m];
    for k in 1..n - 1 {
        let h0 = xa[k] - xa[k - 1];
        let h1 = xa[k + 1] - xa[k];
        sub[k - 1] = h0;
        diag[k - 1] = 2.0 * (h0 + h1);
        sup[k - 1] = h1;
        rhs[k - 1] = 6.0 * ((ya[k + 1] - ya[k]) / h1 - (ya[k] - ya[k - 1]) / h0);
    }
    let interior = solve_tridiag(&sub, &diag, &sup, &rhs);
    y2[1..n - 1].copy_from_slice(&interior);

    from_second_derivatives(xa, ya, &y2)
}

pub(super) fn periodic(xa: &[f64], ya: &[f64]) -> PiecewiseCubic {
    let n = xa.len();
    let m = n - 1;
    let h: Vec<f64> = (0..m).map(|i| xa[i + 1] - xa[i]).collect();
    let d: Vec<f64> = (0..m).map(|i| (ya[i + 1] - ya[i]) / h[i]).collect();
    // Row i couples knots i-1, i, i+1 with all indices wrapping mod m.
    let rhs: Vec<f64> = (0..m)
        .map(|i| 6.0 * (d[i] - d[(i + m - 1) % m]))
        .collect();

    let mut sigma = match m {
        1 => vec![0.0],
        2 => {
            let b00 = 2.0 * (h[0] + h[1]);
            let b01 = h[0] + h[1];
            let det = b00 * b00 - b01 * b01;
            vec![
                (b00 * rhs[0] - b01 * rhs[1]) / det,
                (b00 * rhs[1] - b01 * rhs[0]) / det,
            ]
        }
        _ => {
            let mut sub = vec![0.0; m];
            let mut diag = vec![0.0; m];
            let mut sup = vec![0.0; m];
            for i in 0..m {
                sub[i] = h[(i + m - 1) % m];
                diag[i] = 2.0 * (h[(i + m - 1) % m] + h[i]);
                sup[i] = h[i];
            }
            // Corner entries (row 0, col m-1) and (row m-1, col 0).
            let corner = h[m - 1];
            let gamma = -diag[0];
            diag[0] -= gamma;
            diag[m - 1] -= corner * corner / gamma;

            let x = solve_tridiag(&sub, &diag, &sup, &rhs);
            let mut u = vec![0.0; m];
            u[0] = gamma;
            u[m - 1] = corner;
            let z = solve_tridiag(&sub, &diag, &sup, &u);

            let fact = (x[0] + corner * x[m - 1] / gamma)
                / (1.0 + z[0] + corner * z[m - 1] / gamma);
            (0..m).map(|i| x[i] - fact * z[i]).collect()
        }
    };
    sigma.push(sigma[0]);

    from_second_derivatives(xa, ya, &sigma)
}

fn from_second_derivatives(xa: &[f64], ya: &[f64], y2: &[f64]) -> PiecewiseCubic {
    let m = xa.len() - 1;
    let mut p = PiecewiseCubic {
        b: Vec::with_capacity(m),
        c: Vec::with_capacity(m),
        d: Vec::with_capacity(m),
    };
    for i in 0..m {
        let h = xa[i + 1] - xa[i];
        p.b.push((ya[i + 1] - ya[i]) / h - h / 6.0 * (2.0 * y2[i] + y2[i + 1]));
        p.c.push(y2[i] / 2.0);
        p.d.push((y2[i + 1] - y2[i]) / (6.0 * h));
    }
    p
}

/// Thomas algorithm. `sub[0]` and `sup[m-1]` are ignored.
fn solve_tridiag(sub: &[f64], diag: &[f64], sup: &[f64], rhs: &[f64]) -> Vec<f64> {
    let m = diag.len();
    let mut cp = vec![0.0; m];
    let mut dp = vec![0.0; m];
    cp[0] = sup[0] / diag[0];
    dp[0] = rhs[0] / diag[0];
    for i in 1..m {
        let den = diag[i] - sub[i] * cp[i - 1];
        if i < m - 1 {
            cp[i] = sup[i] / den;
        }
        dp[i] = (rhs[i] - sub[i] * dp[i - 1]) / den;
    }
    let mut x = vec![0.0; m];
    x[m - 1] = dp[m - 1];
    for i in (0..m - 1).rev() {
        x[i] = dp[i] - cp[i] * x[i + 1];
    }
    x
}
