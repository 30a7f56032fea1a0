use std::path::{Path, PathBuf};

use interpolation::{Accelerator, Cache, Interp2dType, Spline2d};
use ndarray::{Array1, Array2};
use utils::array1D_getter_impl;

use crate::Result;
use crate::{Flux, Radians};

/// Magnetic field strength B(ψp, θ) reconstructed from a netCDF file, in
/// Normalized Units (divided by B0).
pub struct Bfield {
    /// Path to the netCDF file.
    pub path: PathBuf,
    /// Interpolation type.
    pub typ: Interp2dType,

    /// Spline over the normalized field strength, as a function of (ψp, θ).
    pub b_spline: Spline2d,

    /// Magnetic field strength on the axis **in \[T\]**.
    pub baxis: f64,
    /// The tokamak's major radius **in \[m\]**.
    pub raxis: f64,
    /// The value of the poloidal flux ψp at the wall.
    pub psip_wall: Flux,
    /// The value of the toroidal flux ψ at the wall.
    pub psi_wall: Flux,
}

impl Bfield {
    /// Constructs a [`Bfield`] from a netCDF file at `path`, with a spline of
    /// the (case-insensitive) `typ` interpolation type.
    ///
    /// # Example
    /// ```no_run
    /// # use equilibrium::*;
    /// # use std::path::Path;
    /// #
    /// # fn main() -> Result<()> {
    /// let bfield = Bfield::from_dataset(Path::new("./data.nc"), "bicubic")?;
    /// # Ok(())
    /// # }
    /// ```
    pub fn from_dataset(path: &Path, typ: &str) -> Result<Self> {
        use crate::extract::*;
        use config::netcdf_fields::*;

        // Make path absolute for display purposes.
        let path = std::path::absolute(path)?;
        let f = open(&path)?;

        let baxis = extract_scalar::<f64>(&f, BAXIS)?;
        let raxis = extract_scalar::<f64>(&f, RAXIS)?;

        let psip_data = extract_1d_array::<f64>(&f, PSIP)?.to_vec();
        let psi_data = extract_1d_array::<f64>(&f, PSI)?.to_vec();
        let theta_data = extract_1d_array::<f64>(&f, THETA)?.to_vec();

        // Row-major over (ψp, θ), matching the file's dimension order.
        let b_data: Vec<f64> = extract_2d_array::<f64>(&f, B)?
            .iter()
            .map(|v| v / baxis)
            .collect();

        let typ: Interp2dType = typ.parse()?;
        let b_spline = Spline2d::build(typ, &psip_data, &theta_data, &b_data)?;

        let psip_wall = *psip_data.last().expect("grid is non-empty");
        let psi_wall = *psi_data.last().expect("grid is non-empty");

        Ok(Self {
            path,
            typ,
            b_spline,
            baxis,
            raxis,
            psip_wall,
            psi_wall,
        })
    }
}

// Evaluation. θ is reduced to [0, 2π) before every lookup, so any winding
// angle is valid.
macro_rules! bfield_eval_impl {
    ($(#[$doc:meta])* $name:ident, $spline_method:ident) => {
        $(#[$doc])*
        pub fn $name(
            &self,
            psip: Flux,
            theta: Radians,
            xacc: &mut Accelerator,
            yacc: &mut Accelerator,
            cache: &mut Cache,
        ) -> Result<f64> {
            Ok(self
                .b_spline
                .$spline_method(psip, mod2pi(theta), xacc, yacc, cache)?)
        }
    };
}

impl Bfield {
    bfield_eval_impl!(
        /// Calculates `B(ψp, θ)`.
        b, eval
    );
    bfield_eval_impl!(
        /// Calculates `𝜕B(ψp, θ)/𝜕ψp`.
        db_dpsip, eval_deriv_x
    );
    bfield_eval_impl!(
        /// Calculates `𝜕B(ψp, θ)/𝜕θ`.
        db_dtheta, eval_deriv_y
    );
    bfield_eval_impl!(
        /// Calculates `𝜕²B(ψp, θ)/𝜕ψp²`.
        d2b_dpsip2, eval_deriv_xx
    );
    bfield_eval_impl!(
        /// Calculates `𝜕²B(ψp, θ)/𝜕θ²`.
        d2b_dtheta2, eval_deriv_yy
    );
    bfield_eval_impl!(
        /// Calculates `𝜕²B(ψp, θ)/𝜕ψp𝜕θ`.
        d2b_dpsip_dtheta, eval_deriv_xy
    );
}

// Data extraction
impl Bfield {
    array1D_getter_impl!(psip_data, b_spline.xa, Flux);
    array1D_getter_impl!(theta_data, b_spline.ya, Radians);

    /// Returns the normalized field strength data as a 2D array.
    pub fn b_data(&self) -> Array2<f64> {
        let shape = (self.b_spline.xa.len(), self.b_spline.ya.len());
        Array2::from_shape_vec(shape, self.b_spline.za.clone())
            .expect("za matches the grid shape")
    }

    /// Returns `𝜕B/𝜕ψp` evaluated on the grid knots as a 2D array.
    pub fn db_dpsip_data(&self) -> Array2<f64> {
        self.derivative_grid(Self::db_dpsip)
    }

    /// Returns `𝜕B/𝜕θ` evaluated on the grid knots as a 2D array.
    pub fn db_dtheta_data(&self) -> Array2<f64> {
        self.derivative_grid(Self::db_dtheta)
    }

    fn derivative_grid(
        &self,
        method: impl Fn(&Self, Flux, Radians, &mut Accelerator, &mut Accelerator, &mut Cache) -> Result<f64>,
    ) -> Array2<f64> {
        let mut xacc = Accelerator::new();
        let mut yacc = Accelerator::new();
        let mut cache = Cache::new();

        let shape = (self.b_spline.xa.len(), self.b_spline.ya.len());
        let mut grid = Array2::from_elem(shape, f64::NAN);
        for i in 0..shape.0 {
            for j in 0..shape.1 {
                let psip = self.b_spline.xa[i];
                let theta = self.b_spline.ya[j];
                grid[[i, j]] = method(self, psip, theta, &mut xacc, &mut yacc, &mut cache)
                    .expect("knots are inside the domain");
            }
        }
        grid
    }
}

/// Returns θ % 2π.
fn mod2pi(theta: Radians) -> Radians {
    use std::f64::consts::TAU;
    theta.rem_euclid(TAU)
}

impl std::fmt::Debug for Bfield {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Bfield")
            .field("path", &self.path)
            .field("typ", &self.typ.name())
            .field("Baxis [T]", &format!("{:.7}", self.baxis))
            .field("Raxis [m]", &format!("{:.7}", self.raxis))
            .field("ψp_wall", &format!("{:.7}", self.psip_wall))
            .field("ψ_wall", &format!("{:.7}", self.psi_wall))
            .field("shape", &(self.b_spline.xa.len(), self.b_spline.ya.len()))
            .finish()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use float_cmp::assert_approx_eq;
    use std::f64::consts::PI;

    fn create_bfield() -> Bfield {
        Bfield::from_dataset(&crate::lar::test_file(), "bicubic").unwrap()
    }

    #[test]
    fn test_lar_field_values() {
        // b = 1 - √(2ψp)·cosθ in normalized units
        let b = create_bfield();
        let mut xacc = Accelerator::new();
        let mut yacc = Accelerator::new();
        let mut cache = Cache::new();

        for (psip, theta) in [(0.0, 0.0), (0.02, PI), (0.03, PI / 3.0), (0.04, 5.0)] {
            let expected = 1.0 - (2.0 * psip).sqrt() * theta.cos();
            let v = b.b(psip, theta, &mut xacc, &mut yacc, &mut cache).unwrap();
            assert_approx_eq!(f64, v, expected, epsilon = 1e-5);
        }
        // Winding angles reduce mod 2π
        let v1 = b.b(0.02, 1.0, &mut xacc, &mut yacc, &mut cache).unwrap();
        let v2 = b
            .b(0.02, 1.0 + 6.0 * PI, &mut xacc, &mut yacc, &mut cache)
            .unwrap();
        assert_approx_eq!(f64, v1, v2, epsilon = 1e-12);
    }

    #[test]
    fn test_derivatives_against_analytic() {
        let b = create_bfield();
        let mut xacc = Accelerator::new();
        let mut yacc = Accelerator::new();
        let mut cache = Cache::new();

        let (psip, theta) = (0.02, 1.2);
        let rn = (2.0 * psip).sqrt();
        let db_dpsip = b
            .db_dpsip(psip, theta, &mut xacc, &mut yacc, &mut cache)
            .unwrap();
        assert_approx_eq!(f64, db_dpsip, -theta.cos() / rn, epsilon = 1e-2);
        let db_dtheta = b
            .db_dtheta(psip, theta, &mut xacc, &mut yacc, &mut cache)
            .unwrap();
        assert_approx_eq!(f64, db_dtheta, rn * theta.sin(), epsilon = 1e-3);

        b.d2b_dpsip2(psip, theta, &mut xacc, &mut yacc, &mut cache)
            .unwrap();
        b.d2b_dtheta2(psip, theta, &mut xacc, &mut yacc, &mut cache)
            .unwrap();
        b.d2b_dpsip_dtheta(psip, theta, &mut xacc, &mut yacc, &mut cache)
            .unwrap();
    }

    #[test]
    fn test_extraction_methods() {
        let b = create_bfield();
        let _ = format!("{b:?}");

        assert_eq!(b.psip_data().ndim(), 1);
        assert_eq!(b.theta_data().ndim(), 1);
        assert_eq!(b.b_data().ndim(), 2);
        assert_eq!(b.db_dpsip_data().ndim(), 2);
        assert_eq!(b.db_dtheta_data().ndim(), 2);
        assert_eq!(
            b.b_data().dim(),
            (b.psip_data().len(), b.theta_data().len())
        );
    }
}
