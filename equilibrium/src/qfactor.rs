use std::path::{Path, PathBuf};

use interpolation::{Accelerator, Interp1dType, Spline1d};
use ndarray::Array1;
use utils::array1D_getter_impl;

use crate::Flux;
use crate::Result;

/// Safety factor profile.
///
/// Either reconstructed from a netCDF file or the analytic identity profile
/// (q ≡ 1, ψ = ψp), which is useful for testing against integrable motion.
#[derive(Debug)]
pub enum Qfactor {
    Numerical(NumericalQfactor),
    Unity { psip_wall: Flux },
}

impl Qfactor {
    /// Constructs a tabulated [`Qfactor`] from a netCDF file at `path`, with
    /// splines of the (case-insensitive) `typ` interpolation type.
    ///
    /// # Example
    /// ```no_run
    /// # use equilibrium::*;
    /// # use std::path::Path;
    /// #
    /// # fn main() -> Result<()> {
    /// let qfactor = Qfactor::from_dataset(Path::new("./data.nc"), "steffen")?;
    /// # Ok(())
    /// # }
    /// ```
    pub fn from_dataset(path: &Path, typ: &str) -> Result<Self> {
        Ok(Self::Numerical(NumericalQfactor::from_dataset(path, typ)?))
    }

    /// The identity profile over `[0, psip_wall]`.
    pub fn unity(psip_wall: Flux) -> Self {
        Self::Unity { psip_wall }
    }

    /// Calculates the q-factor `q(ψp)`.
    pub fn q(&self, psip: Flux, acc: &mut Accelerator) -> Result<f64> {
        match self {
            Self::Numerical(num) => Ok(num.q_spline.eval(psip, acc)?),
            Self::Unity { .. } => Ok(1.0),
        }
    }

    /// Calculates the toroidal flux `ψ(ψp)`.
    pub fn psi(&self, psip: Flux, acc: &mut Accelerator) -> Result<Flux> {
        match self {
            Self::Numerical(num) => Ok(num.psi_spline.eval(psip, acc)?),
            Self::Unity { .. } => Ok(psip),
        }
    }

    /// Returns the value of the poloidal flux ψp at the wall.
    pub fn psip_wall(&self) -> Flux {
        match self {
            Self::Numerical(num) => num.psip_wall(),
            Self::Unity { psip_wall } => *psip_wall,
        }
    }

    /// Returns the value of the toroidal flux ψ at the wall.
    pub fn psi_wall(&self) -> Flux {
        match self {
            Self::Numerical(num) => num.psi_wall(),
            Self::Unity { psip_wall } => *psip_wall,
        }
    }
}

/// q-factor reconstructed from a netCDF file.
pub struct NumericalQfactor {
    /// Path to the netCDF file.
    pub path: PathBuf,
    /// Interpolation type.
    pub typ: Interp1dType,
    /// Spline over the q-factor data, as a function of ψp.
    pub q_spline: Spline1d,
    /// Spline over the toroidal flux data, as a function of ψp.
    pub psi_spline: Spline1d,
}

impl NumericalQfactor {
    pub fn from_dataset(path: &Path, typ: &str) -> Result<Self> {
        use crate::extract::*;
        use config::netcdf_fields::*;

        // Make path absolute for display purposes.
        let path = std::path::absolute(path)?;
        let f = open(&path)?;

        let psip_data = extract_1d_array::<f64>(&f, PSIP)?.to_vec();
        let psi_data = extract_1d_array::<f64>(&f, PSI)?.to_vec();
        let q_data = extract_1d_array::<f64>(&f, Q)?.to_vec();

        let typ: Interp1dType = typ.parse()?;
        let q_spline = Spline1d::build(typ, &psip_data, &q_data)?;
        let psi_spline = Spline1d::build(typ, &psip_data, &psi_data)?;

        Ok(Self {
            path,
            typ,
            q_spline,
            psi_spline,
        })
    }
}

// Data extraction
impl NumericalQfactor {
    array1D_getter_impl!(psip_data, q_spline.xa, Flux);
    array1D_getter_impl!(psi_data, psi_spline.ya, Flux);
    array1D_getter_impl!(q_data, q_spline.ya, f64);

    /// Returns the `q` data recalculated from `dψ/dψp` at the knots.
    pub fn q_data_derived(&self) -> Result<Array1<f64>> {
        let mut acc = Accelerator::new();
        let mut q_data = Array1::from_elem(self.q_spline.xa.len(), f64::NAN);

        for (i, psip) in self.q_spline.xa.iter().enumerate() {
            q_data[[i]] = self.psi_spline.eval_deriv(*psip, &mut acc)?;
        }

        Ok(q_data)
    }

    /// Returns the value of the poloidal flux ψp at the wall.
    pub fn psip_wall(&self) -> Flux {
        *self.q_spline.xa.last().expect("grid is non-empty")
    }

    /// Returns the value of the toroidal flux ψ at the wall.
    pub fn psi_wall(&self) -> Flux {
        *self.psi_spline.ya.last().expect("grid is non-empty")
    }
}

impl std::fmt::Debug for NumericalQfactor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NumericalQfactor")
            .field("path", &self.path)
            .field("typ", &self.typ.name())
            .field("ψp_wall", &format!("{:.7}", self.psip_wall()))
            .field("ψ_wall", &format!("{:.7}", self.psi_wall()))
            .field("len", &self.q_spline.xa.len())
            .finish()
    }
}
