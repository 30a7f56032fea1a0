use std::path::{Path, PathBuf};

use interpolation::{Accelerator, Interp1dType, Spline1d};
use ndarray::Array1;
use utils::array1D_getter_impl;

use crate::Flux;
use crate::Result;

/// Covariant plasma currents g(ψp) and I(ψp), in Normalized Units
/// (divided by B0·R0).
///
/// Either reconstructed from a netCDF file or the analytic large-aspect-ratio
/// limit g ≡ 1, I ≡ 0.
#[derive(Debug)]
pub enum Currents {
    Numerical(NumericalCurrents),
    Lar,
}

impl Currents {
    /// Constructs tabulated [`Currents`] from a netCDF file at `path`, with
    /// splines of the (case-insensitive) `typ` interpolation type.
    ///
    /// # Example
    /// ```no_run
    /// # use equilibrium::*;
    /// # use std::path::Path;
    /// #
    /// # fn main() -> Result<()> {
    /// let currents = Currents::from_dataset(Path::new("./data.nc"), "steffen")?;
    /// # Ok(())
    /// # }
    /// ```
    pub fn from_dataset(path: &Path, typ: &str) -> Result<Self> {
        Ok(Self::Numerical(NumericalCurrents::from_dataset(path, typ)?))
    }

    /// The analytic large-aspect-ratio currents.
    pub fn lar() -> Self {
        Self::Lar
    }

    /// Calculates `g(ψp)`.
    pub fn g(&self, psip: Flux, acc: &mut Accelerator) -> Result<f64> {
        match self {
            Self::Numerical(num) => Ok(num.g_spline.eval(psip, acc)?),
            Self::Lar => Ok(1.0),
        }
    }

    /// Calculates `I(ψp)`.
    pub fn i(&self, psip: Flux, acc: &mut Accelerator) -> Result<f64> {
        match self {
            Self::Numerical(num) => Ok(num.i_spline.eval(psip, acc)?),
            Self::Lar => Ok(0.0),
        }
    }

    /// Calculates `𝜕g(ψp)/𝜕ψp`.
    pub fn dg_dpsip(&self, psip: Flux, acc: &mut Accelerator) -> Result<f64> {
        match self {
            Self::Numerical(num) => Ok(num.g_spline.eval_deriv(psip, acc)?),
            Self::Lar => Ok(0.0),
        }
    }

    /// Calculates `𝜕I(ψp)/𝜕ψp`.
    pub fn di_dpsip(&self, psip: Flux, acc: &mut Accelerator) -> Result<f64> {
        match self {
            Self::Numerical(num) => Ok(num.i_spline.eval_deriv(psip, acc)?),
            Self::Lar => Ok(0.0),
        }
    }
}

/// Plasma currents reconstructed from a netCDF file.
pub struct NumericalCurrents {
    /// Path to the netCDF file.
    pub path: PathBuf,
    /// Interpolation type.
    pub typ: Interp1dType,
    /// Spline over the normalized g-current data, as a function of ψp.
    pub g_spline: Spline1d,
    /// Spline over the normalized I-current data, as a function of ψp.
    pub i_spline: Spline1d,
}

impl NumericalCurrents {
    pub fn from_dataset(path: &Path, typ: &str) -> Result<Self> {
        use crate::extract::*;
        use config::netcdf_fields::*;

        // Make path absolute for display purposes.
        let path = std::path::absolute(path)?;
        let f = open(&path)?;

        let baxis = extract_scalar::<f64>(&f, BAXIS)?;
        let raxis = extract_scalar::<f64>(&f, RAXIS)?;
        let norm = baxis * raxis;

        let psip_data = extract_1d_array::<f64>(&f, PSIP)?.to_vec();
        let g_data: Vec<f64> = extract_1d_array::<f64>(&f, G)?
            .iter()
            .map(|v| v / norm)
            .collect();
        let i_data: Vec<f64> = extract_1d_array::<f64>(&f, I)?
            .iter()
            .map(|v| v / norm)
            .collect();

        let typ: Interp1dType = typ.parse()?;
        let g_spline = Spline1d::build(typ, &psip_data, &g_data)?;
        let i_spline = Spline1d::build(typ, &psip_data, &i_data)?;

        Ok(Self {
            path,
            typ,
            g_spline,
            i_spline,
        })
    }
}

// Data extraction
impl NumericalCurrents {
    array1D_getter_impl!(psip_data, g_spline.xa, Flux);
    array1D_getter_impl!(g_data, g_spline.ya, f64);
    array1D_getter_impl!(i_data, i_spline.ya, f64);

    /// Returns the value of the poloidal flux ψp at the wall.
    pub fn psip_wall(&self) -> Flux {
        *self.g_spline.xa.last().expect("grid is non-empty")
    }
}

impl std::fmt::Debug for NumericalCurrents {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NumericalCurrents")
            .field("path", &self.path)
            .field("typ", &self.typ.name())
            .field("ψp_wall", &format!("{:.7}", self.psip_wall()))
            .field("len", &self.g_spline.xa.len())
            .finish()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use float_cmp::assert_approx_eq;

    fn create_currents() -> Currents {
        Currents::from_dataset(&crate::lar::test_file(), "steffen").unwrap()
    }

    #[test]
    fn test_lar_currents_are_analytic() {
        // The stub writes g = B0·R0 and I = 0, so the normalized profiles
        // must come out as exactly 1 and 0 everywhere.
        let currents = create_currents();
        let mut acc = Accelerator::new();

        for i in 0..=20 {
            let psip = 0.0408 * i as f64 / 20.0;
            assert_approx_eq!(f64, currents.g(psip, &mut acc).unwrap(), 1.0, epsilon = 1e-12);
            assert_approx_eq!(f64, currents.i(psip, &mut acc).unwrap(), 0.0, epsilon = 1e-12);
            assert_approx_eq!(f64, currents.dg_dpsip(psip, &mut acc).unwrap(), 0.0, epsilon = 1e-10);
            assert_approx_eq!(f64, currents.di_dpsip(psip, &mut acc).unwrap(), 0.0, epsilon = 1e-10);
        }
    }

    #[test]
    fn test_extraction_methods() {
        let Currents::Numerical(c) = create_currents() else {
            unreachable!()
        };
        let _ = format!("{c:?}");

        assert_eq!(c.psip_data().ndim(), 1);
        assert_eq!(c.g_data().ndim(), 1);
        assert_eq!(c.i_data().ndim(), 1);
        assert!(c.psip_wall() > 0.0);
    }

    #[test]
    fn test_analytic_variant() {
        let currents = Currents::lar();
        let mut acc = Accelerator::new();

        assert_eq!(currents.g(0.015, &mut acc).unwrap(), 1.0);
        assert_eq!(currents.i(0.015, &mut acc).unwrap(), 0.0);
        assert_eq!(currents.dg_dpsip(0.015, &mut acc).unwrap(), 0.0);
        assert_eq!(currents.di_dpsip(0.015, &mut acc).unwrap(), 0.0);
    }
}
