use crate::error::check_domain;
use crate::{Accelerator, DomainError, Interp2dType, InterpolationError, Result};

/// Caches the 16 patch coefficients of the last visited cell.
///
/// Like [`Accelerator`], the cache is owned by the caller and is purely an
/// optimization: ODE steppers query the same cell many times in a row, and
/// rebuilding the bicubic patch is the expensive part of an evaluation.
#[derive(Clone, Copy, Default)]
pub struct Cache {
    cell: Option<(usize, usize)>,
    a: [[f64; 4]; 4],
}

impl Cache {
    pub fn new() -> Self {
        Self::default()
    }
}

impl std::fmt::Debug for Cache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Cache").field("cell", &self.cell).finish()
    }
}

/// A 2D tensor-grid spline owning its data and precomputed knot derivatives.
///
/// `za` is row-major over the x index: `za[i * ya.len() + j]` holds
/// `z(xa[i], ya[j])`.
///
/// # Example
/// ```
/// # use interpolation::*;
/// #
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let xa: Vec<f64> = (0..12).map(|i| i as f64 * 0.1).collect();
/// let ya: Vec<f64> = (0..15).map(|j| j as f64 * 0.2).collect();
/// let mut za = Vec::new();
/// for x in &xa {
///     for y in &ya {
///         za.push(x * y);
///     }
/// }
///
/// let spline = Spline2d::build(Interp2dType::Bicubic, &xa, &ya, &za)?;
///
/// let (mut xacc, mut yacc) = (Accelerator::new(), Accelerator::new());
/// let mut cache = Cache::new();
/// let z = spline.eval(0.55, 1.3, &mut xacc, &mut yacc, &mut cache)?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct Spline2d {
    /// Interpolation type.
    pub typ: Interp2dType,
    /// The x data points, strictly increasing.
    pub xa: Vec<f64>,
    /// The y data points, strictly increasing.
    pub ya: Vec<f64>,
    /// The z values, row-major over x.
    pub za: Vec<f64>,
    /// Knot partials ∂z/∂x (bicubic only).
    zx: Vec<f64>,
    /// Knot partials ∂z/∂y (bicubic only).
    zy: Vec<f64>,
    /// Knot cross partials ∂²z/∂x∂y (bicubic only).
    zxy: Vec<f64>,
}

impl Spline2d {
    /// Constructs a [`Spline2d`] over the tensor grid `xa` × `ya`.
    pub fn build(typ: Interp2dType, xa: &[f64], ya: &[f64], za: &[f64]) -> Result<Self> {
        for grid in [xa, ya] {
            if grid.is_empty() {
                return Err(InterpolationError::EmptyData);
            }
            if grid.windows(2).any(|w| w[1] <= w[0]) {
                return Err(InterpolationError::DegenerateGrid);
            }
            if grid.len() < typ.min_size() {
                return Err(InterpolationError::NotEnoughPoints {
                    typ: typ.name(),
                    min_size: typ.min_size(),
                    len: grid.len(),
                });
            }
        }
        if za.len() != xa.len() * ya.len() {
            return Err(InterpolationError::MismatchedLengths {
                xlen: xa.len() * ya.len(),
                ylen: za.len(),
            });
        }

        let (zx, zy, zxy) = match typ {
            Interp2dType::Bilinear => (Vec::new(), Vec::new(), Vec::new()),
            Interp2dType::Bicubic => knot_derivatives(xa, ya, za),
        };

        Ok(Self {
            typ,
            xa: xa.to_vec(),
            ya: ya.to_vec(),
            za: za.to_vec(),
            zx,
            zy,
            zxy,
        })
    }

    fn z(&self, i: usize, j: usize) -> f64 {
        self.za[i * self.ya.len() + j]
    }
}

// Evaluation. All methods share the (xacc, yacc, cache) triple so callers can
// keep one set per worker.
macro_rules! eval_method {
    ($(#[$doc:meta])* $name:ident, $dx:expr, $dy:expr) => {
        $(#[$doc])*
        pub fn $name(
            &self,
            x: f64,
            y: f64,
            xacc: &mut Accelerator,
            yacc: &mut Accelerator,
            cache: &mut Cache,
        ) -> Result<f64, DomainError> {
            self.eval_derivs(x, y, $dx, $dy, xacc, yacc, cache)
        }
    };
}

impl Spline2d {
    eval_method!(
        /// Returns the interpolated value `z(x, y)`.
        eval, 0, 0
    );
    eval_method!(
        /// Returns the interpolated partial `∂z/∂x`.
        eval_deriv_x, 1, 0
    );
    eval_method!(
        /// Returns the interpolated partial `∂z/∂y`.
        eval_deriv_y, 0, 1
    );
    eval_method!(
        /// Returns the interpolated partial `∂²z/∂x²`.
        eval_deriv_xx, 2, 0
    );
    eval_method!(
        /// Returns the interpolated partial `∂²z/∂y²`.
        eval_deriv_yy, 0, 2
    );
    eval_method!(
        /// Returns the interpolated partial `∂²z/∂x∂y`.
        eval_deriv_xy, 1, 1
    );

    fn eval_derivs(
        &self,
        x: f64,
        y: f64,
        dx_order: u8,
        dy_order: u8,
        xacc: &mut Accelerator,
        yacc: &mut Accelerator,
        cache: &mut Cache,
    ) -> Result<f64, DomainError> {
        check_domain(&self.xa, x)?;
        check_domain(&self.ya, y)?;
        let i = xacc.find(&self.xa, x);
        let j = yacc.find(&self.ya, y);
        let dx = self.xa[i + 1] - self.xa[i];
        let dy = self.ya[j + 1] - self.ya[j];
        let t = (x - self.xa[i]) / dx;
        let u = (y - self.ya[j]) / dy;

        match self.typ {
            Interp2dType::Bilinear => Ok(self.bilinear(i, j, t, u, dx, dy, dx_order, dy_order)),
            Interp2dType::Bicubic => {
                if cache.cell != Some((i, j)) {
                    cache.a = self.patch(i, j, dx, dy);
                    cache.cell = Some((i, j));
                }
                Ok(poly_eval(&cache.a, t, u, dx, dy, dx_order, dy_order))
            }
        }
    }

    fn bilinear(
        &self,
        i: usize,
        j: usize,
        t: f64,
        u: f64,
        dx: f64,
        dy: f64,
        dx_order: u8,
        dy_order: u8,
    ) -> f64 {
        let (z00, z01) = (self.z(i, j), self.z(i, j + 1));
        let (z10, z11) = (self.z(i + 1, j), self.z(i + 1, j + 1));
        match (dx_order, dy_order) {
            (0, 0) => {
                z00 * (1.0 - t) * (1.0 - u) + z10 * t * (1.0 - u) + z01 * (1.0 - t) * u
                    + z11 * t * u
            }
            (1, 0) => ((z10 - z00) * (1.0 - u) + (z11 - z01) * u) / dx,
            (0, 1) => ((z01 - z00) * (1.0 - t) + (z11 - z10) * t) / dy,
            (1, 1) => (z11 - z10 - z01 + z00) / (dx * dy),
            // Pure second derivatives vanish inside a bilinear cell.
            _ => 0.0,
        }
    }

    /// Builds the 16-coefficient bicubic patch of cell (i, j):
    /// `z(t, u) = Σ a[p][q]·tᵖ·u^q` with `t`, `u` the cell-local coordinates.
    fn patch(&self, i: usize, j: usize, dx: f64, dy: f64) -> [[f64; 4]; 4] {
        let ny = self.ya.len();
        let at = |g: &[f64], ii: usize, jj: usize| g[ii * ny + jj];

        // Hermite data matrix: rows index {value@i, value@i+1, ∂x@i, ∂x@i+1},
        // columns the same in y. Derivatives are scaled to cell coordinates.
        let mut f = [[0.0; 4]; 4];
        for (r, ii) in [i, i + 1].into_iter().enumerate() {
            for (s, jj) in [j, j + 1].into_iter().enumerate() {
                f[r][s] = self.z(ii, jj);
                f[r][s + 2] = at(&self.zy, ii, jj) * dy;
                f[r + 2][s] = at(&self.zx, ii, jj) * dx;
                f[r + 2][s + 2] = at(&self.zxy, ii, jj) * dx * dy;
            }
        }

        // a = H·F·Hᵀ, with H the cubic Hermite basis conversion matrix.
        const H: [[f64; 4]; 4] = [
            [1.0, 0.0, 0.0, 0.0],
            [0.0, 0.0, 1.0, 0.0],
            [-3.0, 3.0, -2.0, -1.0],
            [2.0, -2.0, 1.0, 1.0],
        ];
        let mut hf = [[0.0; 4]; 4];
        for r in 0..4 {
            for s in 0..4 {
                hf[r][s] = (0..4).map(|k| H[r][k] * f[k][s]).sum();
            }
        }
        let mut a = [[0.0; 4]; 4];
        for r in 0..4 {
            for s in 0..4 {
                a[r][s] = (0..4).map(|k| hf[r][k] * H[s][k]).sum();
            }
        }
        a
    }
}

/// Evaluates the patch polynomial or one of its partials at (t, u).
fn poly_eval(a: &[[f64; 4]; 4], t: f64, u: f64, dx: f64, dy: f64, dxo: u8, dyo: u8) -> f64 {
    // Differentiating tᵖ (dxo times) gives p!/(p-dxo)!·t^(p-dxo).
    let fact = |p: usize, o: u8| -> f64 {
        match o {
            0 => 1.0,
            1 => p as f64,
            _ => (p * p.saturating_sub(1)) as f64,
        }
    };
    let mut sum = 0.0;
    for p in (dxo as usize)..4 {
        for q in (dyo as usize)..4 {
            sum += a[p][q]
                * fact(p, dxo)
                * fact(q, dyo)
                * t.powi((p - dxo as usize) as i32)
                * u.powi((q - dyo as usize) as i32);
        }
    }
    sum / dx.powi(dxo as i32) / dy.powi(dyo as i32)
}

/// First partials and cross derivative at every knot, from centered finite
/// differences (one-sided at the grid boundary).
fn knot_derivatives(xa: &[f64], ya: &[f64], za: &[f64]) -> (Vec<f64>, Vec<f64>, Vec<f64>) {
    let (nx, ny) = (xa.len(), ya.len());
    let at = |g: &[f64], i: usize, j: usize| g[i * ny + j];

    let diff_x = |g: &[f64]| -> Vec<f64> {
        let mut out = vec![0.0; nx * ny];
        for i in 0..nx {
            let (lo, hi) = (i.saturating_sub(1), (i + 1).min(nx - 1));
            for j in 0..ny {
                out[i * ny + j] = (at(g, hi, j) - at(g, lo, j)) / (xa[hi] - xa[lo]);
            }
        }
        out
    };
    let diff_y = |g: &[f64]| -> Vec<f64> {
        let mut out = vec![0.0; nx * ny];
        for i in 0..nx {
            for j in 0..ny {
                let (lo, hi) = (j.saturating_sub(1), (j + 1).min(ny - 1));
                out[i * ny + j] = (at(g, i, hi) - at(g, i, lo)) / (ya[hi] - ya[lo]);
            }
        }
        out
    };

    let zx = diff_x(za);
    let zy = diff_y(za);
    let zxy = diff_y(&zx);
    (zx, zy, zxy)
}

impl std::fmt::Debug for Spline2d {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Spline2d")
            .field("typ", &self.typ.name())
            .field("x range", &(self.xa[0], self.xa[self.xa.len() - 1]))
            .field("y range", &(self.ya[0], self.ya[self.ya.len() - 1]))
            .field("shape", &(self.xa.len(), self.ya.len()))
            .finish()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use float_cmp::assert_approx_eq;

    fn product_grid() -> (Vec<f64>, Vec<f64>, Vec<f64>) {
        let xa: Vec<f64> = (0..12).map(|i| i as f64 * 0.25).collect();
        let ya: Vec<f64> = (0..16).map(|j| j as f64 * 0.2 - 1.0).collect();
        let mut za = Vec::with_capacity(xa.len() * ya.len());
        for x in &xa {
            for y in &ya {
                za.push(x * y);
            }
        }
        (xa, ya, za)
    }

    fn trig_grid() -> (Vec<f64>, Vec<f64>, Vec<f64>) {
        let xa: Vec<f64> = (0..40).map(|i| i as f64 * 0.05).collect();
        let ya: Vec<f64> = (0..50).map(|j| j as f64 * 0.06).collect();
        let mut za = Vec::with_capacity(xa.len() * ya.len());
        for x in &xa {
            for y in &ya {
                za.push(x.sin() * y.cos());
            }
        }
        (xa, ya, za)
    }

    fn caches() -> (Accelerator, Accelerator, Cache) {
        (Accelerator::new(), Accelerator::new(), Cache::new())
    }

    #[test]
    fn test_knot_reproduction() {
        let (xa, ya, za) = trig_grid();
        for typ in [Interp2dType::Bilinear, Interp2dType::Bicubic] {
            let spline = Spline2d::build(typ, &xa, &ya, &za).unwrap();
            let (mut xacc, mut yacc, mut cache) = caches();
            for (i, x) in xa.iter().enumerate() {
                for (j, y) in ya.iter().enumerate() {
                    let v = spline.eval(*x, *y, &mut xacc, &mut yacc, &mut cache).unwrap();
                    assert!(
                        (v - za[i * ya.len() + j]).abs() < 1e-12,
                        "{}: z({x}, {y}) = {v}",
                        typ.name()
                    );
                }
            }
        }
    }

    #[test]
    fn test_bicubic_exact_on_product() {
        // z = x·y has exact centered differences, so the patches reproduce it.
        let (xa, ya, za) = product_grid();
        let spline = Spline2d::build(Interp2dType::Bicubic, &xa, &ya, &za).unwrap();
        let (mut xacc, mut yacc, mut cache) = caches();
        for (x, y) in [(0.3, -0.3), (1.12, 0.77), (2.6, 1.9), (0.01, -0.99)] {
            let v = spline.eval(x, y, &mut xacc, &mut yacc, &mut cache).unwrap();
            assert_approx_eq!(f64, v, x * y, epsilon = 1e-12);
        }
        for (x, y) in [(0.3, -0.3), (1.12, 0.77), (2.6, 1.9)] {
            assert_approx_eq!(f64, spline.eval_deriv_x(x, y, &mut xacc, &mut yacc, &mut cache).unwrap(), y, epsilon = 1e-11);
            assert_approx_eq!(f64, spline.eval_deriv_y(x, y, &mut xacc, &mut yacc, &mut cache).unwrap(), x, epsilon = 1e-11);
            assert_approx_eq!(f64, spline.eval_deriv_xy(x, y, &mut xacc, &mut yacc, &mut cache).unwrap(), 1.0, epsilon = 1e-10);
            assert_approx_eq!(f64, spline.eval_deriv_xx(x, y, &mut xacc, &mut yacc, &mut cache).unwrap(), 0.0, epsilon = 1e-10);
            assert_approx_eq!(f64, spline.eval_deriv_yy(x, y, &mut xacc, &mut yacc, &mut cache).unwrap(), 0.0, epsilon = 1e-10);
        }
    }

    #[test]
    fn test_bicubic_against_analytic() {
        let (xa, ya, za) = trig_grid();
        let spline = Spline2d::build(Interp2dType::Bicubic, &xa, &ya, &za).unwrap();
        let (mut xacc, mut yacc, mut cache) = caches();
        for k in 0..100 {
            let x = 0.1 + (k % 10) as f64 * 0.19;
            let y = 0.1 + (k / 10) as f64 * 0.27;
            let v = spline.eval(x, y, &mut xacc, &mut yacc, &mut cache).unwrap();
            assert_approx_eq!(f64, v, x.sin() * y.cos(), epsilon = 1e-4);
            let vx = spline.eval_deriv_x(x, y, &mut xacc, &mut yacc, &mut cache).unwrap();
            assert_approx_eq!(f64, vx, x.cos() * y.cos(), epsilon = 1e-2);
            let vy = spline.eval_deriv_y(x, y, &mut xacc, &mut yacc, &mut cache).unwrap();
            assert_approx_eq!(f64, vy, -x.sin() * y.sin(), epsilon = 1e-2);
        }
    }

    #[test]
    fn test_mixed_partial_symmetry() {
        // ∂xy from the patch must match the numerical ∂x(∂y z) and ∂y(∂x z).
        let (xa, ya, za) = trig_grid();
        let spline = Spline2d::build(Interp2dType::Bicubic, &xa, &ya, &za).unwrap();
        let (mut xacc, mut yacc, mut cache) = caches();
        let h = 1e-6;
        for (x, y) in [(0.31, 0.52), (1.07, 1.66), (1.55, 2.3), (0.77, 0.11)] {
            let mut dx_of_dy = spline.eval_deriv_y(x + h, y, &mut xacc, &mut yacc, &mut cache).unwrap();
            dx_of_dy -= spline.eval_deriv_y(x - h, y, &mut xacc, &mut yacc, &mut cache).unwrap();
            dx_of_dy /= 2.0 * h;
            let mut dy_of_dx = spline.eval_deriv_x(x, y + h, &mut xacc, &mut yacc, &mut cache).unwrap();
            dy_of_dx -= spline.eval_deriv_x(x, y - h, &mut xacc, &mut yacc, &mut cache).unwrap();
            dy_of_dx /= 2.0 * h;
            let dxy = spline.eval_deriv_xy(x, y, &mut xacc, &mut yacc, &mut cache).unwrap();

            assert_approx_eq!(f64, dx_of_dy, dy_of_dx, epsilon = 1e-4);
            assert_approx_eq!(f64, dxy, dy_of_dx, epsilon = 1e-4);
        }
    }

    #[test]
    fn test_degenerate_grid() {
        let xa = [0.0, 1.0, 1.0];
        let ya = [0.0, 1.0, 2.0];
        let za = [0.0; 9];
        assert!(matches!(
            Spline2d::build(Interp2dType::Bilinear, &xa, &ya, &za).unwrap_err(),
            InterpolationError::DegenerateGrid
        ));
    }

    #[test]
    fn test_shape_mismatch() {
        let xa = [0.0, 1.0, 2.0];
        let ya = [0.0, 1.0, 2.0];
        let za = [0.0; 8];
        assert!(matches!(
            Spline2d::build(Interp2dType::Bicubic, &xa, &ya, &za).unwrap_err(),
            InterpolationError::MismatchedLengths { .. }
        ));
    }

    #[test]
    fn test_out_of_domain() {
        let (xa, ya, za) = product_grid();
        let spline = Spline2d::build(Interp2dType::Bilinear, &xa, &ya, &za).unwrap();
        let (mut xacc, mut yacc, mut cache) = caches();
        assert!(spline.eval(-0.1, 0.0, &mut xacc, &mut yacc, &mut cache).is_err());
        assert!(spline.eval(0.1, 99.0, &mut xacc, &mut yacc, &mut cache).is_err());
    }
}
