use std::path::{Path, PathBuf};

use interpolation::{Accelerator, Cache, Interp1dType, Interp2dType, Spline1d, Spline2d};
use ndarray::{Array1, Array2};
use utils::array1D_getter_impl;

use crate::Result;
use crate::{Flux, Length, Radians};

/// Flux-surface geometry reconstructed from a netCDF file.
///
/// Maps the flux label ψp to the minor radius and to lab coordinates, and
/// tabulates the boozer Jacobian. The minor radius is normalized to R0; lab
/// coordinates stay **in \[m\]** for plotting.
pub struct Geometry {
    /// Path to the netCDF file.
    pub path: PathBuf,
    /// 1D interpolation type.
    pub typ1d: Interp1dType,
    /// 2D interpolation type.
    pub typ2d: Interp2dType,

    /// Magnetic field strength on the axis **in \[T\]**.
    pub baxis: f64,
    /// The magnetic axis' radial position **in \[m\]**.
    pub raxis: f64,
    /// The magnetic axis' vertical position **in \[m\]**.
    pub zaxis: f64,
    /// The tokamak's geometric center **in \[m\]**.
    pub rgeo: f64,
    /// The value of the poloidal flux ψp at the wall.
    pub psip_wall: Flux,
    /// The value of the toroidal flux ψ at the wall.
    pub psi_wall: Flux,
    /// The normalized minor radius at the wall.
    pub r_wall: Length,

    /// Spline over the minor radius, as a function of ψp.
    pub r_spline: Spline1d,
    /// Spline over ψp, as a function of the minor radius (the strict inverse
    /// tabulation of `r_spline`).
    pub psip_spline: Spline1d,
    /// Spline over the toroidal flux, as a function of ψp.
    pub psi_spline: Spline1d,
    /// Spline over the lab R coordinate, as a function of (ψp, θ).
    pub rlab_spline: Spline2d,
    /// Spline over the lab Z coordinate, as a function of (ψp, θ).
    pub zlab_spline: Spline2d,
    /// Spline over the boozer Jacobian, as a function of (ψp, θ).
    pub jacobian_spline: Spline2d,
}

impl Geometry {
    /// Constructs a [`Geometry`] from a netCDF file at `path`, with splines
    /// of the (case-insensitive) `typ1d`/`typ2d` interpolation types.
    ///
    /// # Example
    /// ```no_run
    /// # use equilibrium::*;
    /// # use std::path::Path;
    /// #
    /// # fn main() -> Result<()> {
    /// let geometry = Geometry::from_dataset(Path::new("./data.nc"), "steffen", "bicubic")?;
    /// # Ok(())
    /// # }
    /// ```
    pub fn from_dataset(path: &Path, typ1d: &str, typ2d: &str) -> Result<Self> {
        use crate::extract::*;
        use config::netcdf_fields::*;

        // Make path absolute for display purposes.
        let path = std::path::absolute(path)?;
        let f = open(&path)?;

        let baxis = extract_scalar::<f64>(&f, BAXIS)?;
        let raxis = extract_scalar::<f64>(&f, RAXIS)?;
        let zaxis = extract_scalar::<f64>(&f, ZAXIS)?;
        let rgeo = extract_scalar::<f64>(&f, RGEO)?;

        let psip_data = extract_1d_array::<f64>(&f, PSIP)?.to_vec();
        let psi_data = extract_1d_array::<f64>(&f, PSI)?.to_vec();
        let theta_data = extract_1d_array::<f64>(&f, THETA)?.to_vec();
        let r_data: Vec<f64> = extract_1d_array::<f64>(&f, R)?
            .iter()
            .map(|v| v / raxis)
            .collect();

        let rlab_data = extract_2d_array::<f64>(&f, RLAB)?.into_raw_vec_and_offset().0;
        let zlab_data = extract_2d_array::<f64>(&f, ZLAB)?.into_raw_vec_and_offset().0;
        let jacobian_data = extract_2d_array::<f64>(&f, JACOBIAN)?
            .into_raw_vec_and_offset()
            .0;

        let typ1d: Interp1dType = typ1d.parse()?;
        let typ2d: Interp2dType = typ2d.parse()?;

        let r_spline = Spline1d::build(typ1d, &psip_data, &r_data)?;
        let psip_spline = Spline1d::build(typ1d, &r_data, &psip_data)?;
        let psi_spline = Spline1d::build(typ1d, &psip_data, &psi_data)?;
        let rlab_spline = Spline2d::build(typ2d, &psip_data, &theta_data, &rlab_data)?;
        let zlab_spline = Spline2d::build(typ2d, &psip_data, &theta_data, &zlab_data)?;
        let jacobian_spline = Spline2d::build(typ2d, &psip_data, &theta_data, &jacobian_data)?;

        let psip_wall = *psip_data.last().expect("grid is non-empty");
        let psi_wall = *psi_data.last().expect("grid is non-empty");
        let r_wall = *r_data.last().expect("grid is non-empty");

        Ok(Self {
            path,
            typ1d,
            typ2d,
            baxis,
            raxis,
            zaxis,
            rgeo,
            psip_wall,
            psi_wall,
            r_wall,
            r_spline,
            psip_spline,
            psi_spline,
            rlab_spline,
            zlab_spline,
            jacobian_spline,
        })
    }
}

// 1D evaluation
impl Geometry {
    /// Calculates the normalized minor radius `r(ψp)`.
    pub fn r(&self, psip: Flux, acc: &mut Accelerator) -> Result<Length> {
        Ok(self.r_spline.eval(psip, acc)?)
    }

    /// Calculates `ψp(r)`, the strict inverse of [`Geometry::r`].
    ///
    /// The caller should keep a separate [`Accelerator`] for this spline; it
    /// is tabulated over the r grid, not the ψp grid.
    pub fn psip(&self, r: Length, acc: &mut Accelerator) -> Result<Flux> {
        Ok(self.psip_spline.eval(r, acc)?)
    }

    /// Calculates the toroidal flux `ψ(ψp)`.
    pub fn psi(&self, psip: Flux, acc: &mut Accelerator) -> Result<Flux> {
        Ok(self.psi_spline.eval(psip, acc)?)
    }
}

// 2D evaluation
impl Geometry {
    /// Calculates the lab coordinate `R(ψp, θ)` **in \[m\]**.
    pub fn rlab(
        &self,
        psip: Flux,
        theta: Radians,
        xacc: &mut Accelerator,
        yacc: &mut Accelerator,
        cache: &mut Cache,
    ) -> Result<f64> {
        Ok(self.rlab_spline.eval(psip, mod2pi(theta), xacc, yacc, cache)?)
    }

    /// Calculates the lab coordinate `Z(ψp, θ)` **in \[m\]**.
    pub fn zlab(
        &self,
        psip: Flux,
        theta: Radians,
        xacc: &mut Accelerator,
        yacc: &mut Accelerator,
        cache: &mut Cache,
    ) -> Result<f64> {
        Ok(self.zlab_spline.eval(psip, mod2pi(theta), xacc, yacc, cache)?)
    }

    /// Calculates the boozer Jacobian `J(ψp, θ)`.
    pub fn jacobian(
        &self,
        psip: Flux,
        theta: Radians,
        xacc: &mut Accelerator,
        yacc: &mut Accelerator,
        cache: &mut Cache,
    ) -> Result<f64> {
        Ok(self
            .jacobian_spline
            .eval(psip, mod2pi(theta), xacc, yacc, cache)?)
    }
}

// Data extraction
impl Geometry {
    array1D_getter_impl!(psip_data, r_spline.xa, Flux);
    array1D_getter_impl!(r_data, r_spline.ya, Length);
    array1D_getter_impl!(psi_data, psi_spline.ya, Flux);
    array1D_getter_impl!(theta_data, rlab_spline.ya, Radians);

    /// Returns the lab R coordinate data as a 2D array.
    pub fn rlab_data(&self) -> Array2<f64> {
        self.grid_2d(&self.rlab_spline)
    }

    /// Returns the lab Z coordinate data as a 2D array.
    pub fn zlab_data(&self) -> Array2<f64> {
        self.grid_2d(&self.zlab_spline)
    }

    /// Returns the Jacobian data as a 2D array.
    pub fn jacobian_data(&self) -> Array2<f64> {
        self.grid_2d(&self.jacobian_spline)
    }

    /// The (ψp, θ) grid shape.
    pub fn shape(&self) -> (usize, usize) {
        (self.rlab_spline.xa.len(), self.rlab_spline.ya.len())
    }

    fn grid_2d(&self, spline: &Spline2d) -> Array2<f64> {
        Array2::from_shape_vec(self.shape(), spline.za.clone())
            .expect("za matches the grid shape")
    }
}

fn mod2pi(theta: Radians) -> Radians {
    use std::f64::consts::TAU;
    theta.rem_euclid(TAU)
}

impl std::fmt::Debug for Geometry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Geometry")
            .field("path", &self.path)
            .field("typ1d", &self.typ1d.name())
            .field("typ2d", &self.typ2d.name())
            .field("Baxis [T]", &format!("{:.7}", self.baxis))
            .field("Raxis [m]", &format!("{:.7}", self.raxis))
            .field("ψp_wall", &format!("{:.7}", self.psip_wall))
            .field("ψ_wall", &format!("{:.7}", self.psi_wall))
            .field("r_wall", &format!("{:.7}", self.r_wall))
            .field("shape", &self.shape())
            .finish()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use float_cmp::assert_approx_eq;

    fn create_geometry() -> Geometry {
        Geometry::from_dataset(&crate::lar::test_file(), "steffen", "bicubic").unwrap()
    }

    #[test]
    fn test_derived_scalars() {
        let geometry = create_geometry();
        let _ = format!("{geometry:?}");

        assert_approx_eq!(f64, geometry.psip_wall, 0.0408163, epsilon = 1e-6);
        assert_approx_eq!(f64, geometry.r_wall, 2.0 / 7.0, epsilon = 1e-10);
        assert_eq!(geometry.raxis, 1.75);
        assert_eq!(geometry.zaxis, 0.0);
    }

    #[test]
    fn test_radius_round_trip() {
        // r(psip(r)) must recover r at every tabulated knot.
        let geometry = create_geometry();
        let mut racc = Accelerator::new();
        let mut pacc = Accelerator::new();

        for r in geometry.r_data().iter().skip(1) {
            let psip = geometry.psip(*r, &mut pacc).unwrap();
            let back = geometry.r(psip, &mut racc).unwrap();
            assert!(
                (back - r).abs() < 1e-10,
                "round trip failed at r = {r}: {back}"
            );
        }
    }

    #[test]
    fn test_lab_coordinates() {
        let geometry = create_geometry();
        let mut xacc = Accelerator::new();
        let mut yacc = Accelerator::new();
        let mut cache = Cache::new();

        // On the outboard midplane, R = R0 + r.
        let psip = 0.5 * geometry.psip_wall;
        let r = geometry.r(psip, &mut Accelerator::new()).unwrap();
        let rlab = geometry.rlab(psip, 0.0, &mut xacc, &mut yacc, &mut cache).unwrap();
        assert_approx_eq!(f64, rlab, geometry.raxis * (1.0 + r), epsilon = 1e-4);
        let zlab = geometry.zlab(psip, 0.0, &mut xacc, &mut yacc, &mut cache).unwrap();
        assert_approx_eq!(f64, zlab, 0.0, epsilon = 1e-6);

        geometry
            .jacobian(psip, 1.0, &mut xacc, &mut yacc, &mut cache)
            .unwrap();
    }

    #[test]
    fn test_extraction_methods() {
        let geometry = create_geometry();

        assert_eq!(geometry.psip_data().ndim(), 1);
        assert_eq!(geometry.r_data().ndim(), 1);
        assert_eq!(geometry.psi_data().ndim(), 1);
        assert_eq!(geometry.theta_data().ndim(), 1);
        assert_eq!(geometry.rlab_data().ndim(), 2);
        assert_eq!(geometry.zlab_data().ndim(), 2);
        assert_eq!(geometry.jacobian_data().ndim(), 2);
        assert_eq!(
            geometry.shape(),
            (geometry.psip_data().len(), geometry.theta_data().len())
        );
    }
}
