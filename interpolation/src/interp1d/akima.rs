//! Non-rounded Akima splines (Wodicka's corner algorithm).
//!
//! The knot derivative is a weighted average of the two adjacent secant
//! slopes, weighted by the slope variation on the opposite side of the
//! four-difference window. The periodic variant wraps the window around the
//! seam instead of extrapolating phantom slopes.

use super::PiecewiseCubic;

pub(super) fn compute(xa: &[f64], ya: &[f64], wrap: bool) -> PiecewiseCubic {
    let n = xa.len();
    let nm = n - 1; // number of interval slopes

    let m: Vec<f64> = (0..nm)
        .map(|i| (ya[i + 1] - ya[i]) / (xa[i + 1] - xa[i]))
        .collect();

    // Slope window m[i-2]..m[i+1] around knot i, with indices off the ends
    // either wrapped (periodic) or linearly extrapolated.
    let slope = |i: isize| -> f64 {
        if (0..nm as isize).contains(&i) {
            return m[i as usize];
        }
        if wrap {
            m[i.rem_euclid(nm as isize) as usize]
        } else if i < 0 {
            let k = (-i) as f64;
            (k + 1.0) * m[0] - k * m[1]
        } else {
            let k = (i - nm as isize + 1) as f64;
            (k + 1.0) * m[nm - 1] - k * m[nm - 2]
        }
    };

    // Knot derivatives.
    let mut b = vec![0.0; n];
    for i in 0..n {
        let i = i as isize;
        let (m2, m1, p0, p1) = (slope(i - 2), slope(i - 1), slope(i), slope(i + 1));
        let w1 = (p1 - p0).abs();
        let w2 = (m1 - m2).abs();
        b[i as usize] = if w1 + w2 == 0.0 {
            0.5 * (m1 + p0)
        } else {
            (w1 * m1 + w2 * p0) / (w1 + w2)
        };
    }

    let mut p = PiecewiseCubic {
        b: Vec::with_capacity(nm),
        c: Vec::with_capacity(nm),
        d: Vec::with_capacity(nm),
    };
    for i in 0..nm {
        let h = xa[i + 1] - xa[i];
        p.b.push(b[i]);
        p.c.push((3.0 * m[i] - 2.0 * b[i] - b[i + 1]) / h);
        p.d.push((b[i] + b[i + 1] - 2.0 * m[i]) / (h * h));
    }
    p
}
