//! Data extraction from the NetCDF equilibrium file.
//!
//! Only the `extract_*` functions are needed by the field objects;
//! [`open`] also validates the file's convention version, so every loader
//! goes through the same check.

use std::path::Path;

use config::netcdf_fields::{ALPHAS, CONVENTION, M, N, PHASES};
use ndarray::{Array, Array1, Array2, Array3};
use netcdf::{AttributeValue, Extents, File, NcTypeDescriptor, Variable};

use crate::NcError;

type Result<T> = std::result::Result<T, NcError>;

/// NetCDF-supported data types.
pub trait NcType: NcTypeDescriptor + Copy {}
impl NcType for f64 {}
impl NcType for f32 {}
impl NcType for i64 {}
impl NcType for i32 {}

/// Opens a NetCDF [`File`] and checks its convention version.
///
/// # Errors
///
/// Returns an [`NcError`] if the path does not exist, the file cannot be
/// opened, or its `convention version` attribute differs from
/// [`config::CONVENTION_VERSION`] in the major version.
pub fn open(path: &Path) -> Result<File> {
    if !path.exists() {
        return Err(NcError::FileNotFound(path.into()));
    }
    let f = netcdf::open(path).map_err(|err| NcError::FileOpen {
        path: path.into(),
        err,
    })?;
    check_convention(&f)?;
    Ok(f)
}

fn check_convention(f: &File) -> Result<()> {
    let attr = f
        .attribute(CONVENTION)
        .ok_or(NcError::AttributeNotFound(CONVENTION.into()))?;
    let found = match attr.value() {
        Ok(AttributeValue::Str(s)) => s,
        _ => return Err(NcError::AttributeNotFound(CONVENTION.into())),
    };
    let version = semver::Version::parse(&found).map_err(|err| NcError::BadVersion {
        found: found.clone(),
        err,
    })?;
    // Infallible, the supported version is a compile-time constant.
    let supported = semver::Version::parse(config::CONVENTION_VERSION).unwrap();
    if version.major != supported.major {
        return Err(NcError::IncompatibleConvention {
            found,
            supported: config::CONVENTION_VERSION.into(),
        });
    }
    Ok(())
}

/// Extracts a [`Variable`] named `name` from a [`File`].
pub fn extract_variable<'f>(f: &'f File, name: &str) -> Result<Variable<'f>> {
    f.variable(name)
        .ok_or(NcError::VariableNotFound(name.into()))
}

/// Returns an `Array<T, D>` with the values of the [`Variable`] named `name`.
fn extract_array<T, D>(f: &File, name: &str) -> Result<Array<T, D>>
where
    T: NcType,
    D: ndarray::Dimension,
{
    let var = extract_variable(f, name)?;
    if var.len() == 0 {
        return Err(NcError::EmptyVariable(var.name()));
    }

    let dyn_array = var
        .get::<T, _>(Extents::All)
        .map_err(|err| NcError::GetValues {
            name: var.name(),
            err,
        })?
        .into_dimensionality::<D>()?;

    Ok(dyn_array)
}

/// Extracts a scalar value of type `T` from a [`File`].
pub fn extract_scalar<T: NcType>(f: &File, name: &str) -> Result<T> {
    Ok(extract_array::<T, ndarray::Ix0>(f, name)?.into_scalar())
}

/// Extracts an [`Array1<T>`] from a [`File`].
pub fn extract_1d_array<T: NcType>(f: &File, name: &str) -> Result<Array1<T>> {
    extract_array(f, name)
}

/// Extracts an [`Array2<T>`] from a [`File`].
pub fn extract_2d_array<T: NcType>(f: &File, name: &str) -> Result<Array2<T>> {
    extract_array(f, name)
}

/// Extracts an [`Array3<T>`] from a [`File`].
pub fn extract_3d_array<T: NcType>(f: &File, name: &str) -> Result<Array3<T>> {
    extract_array(f, name)
}

/// Extracts the `α{m,n}(ψp)` and `φ{m,n}(ψp)` 1D arrays of the specified
/// {m, n} mode.
///
/// # Errors
///
/// Returns [`NcError::HarmonicModeNotFound`] if the file does not tabulate
/// the {`m`, `n`} harmonic — including the case of an empty mode set.
pub fn extract_harmonic_arrays(f: &File, m: i64, n: i64) -> Result<(Array1<f64>, Array1<f64>)> {
    let m_index = logical_index(f, m, "m", M)?;
    let n_index = logical_index(f, n, "n", N)?;

    let alpha_3d = extract_3d_array::<f64>(f, ALPHAS)?;
    let phase_3d = extract_3d_array::<f64>(f, PHASES)?;

    let alpha_1d = alpha_3d.slice(ndarray::s![m_index, n_index, ..]).to_owned();
    let phase_1d = phase_3d.slice(ndarray::s![m_index, n_index, ..]).to_owned();

    Ok((alpha_1d, phase_1d))
}

/// Returns the index of `mode` inside the integer coordinate `field`.
///
/// The mode arrays need not be contiguous or sorted, e.g. m = [-1, 0, 2, 4],
/// so the position of the requested mode number is looked up by value.
fn logical_index(f: &File, mode: i64, which: &'static str, field: &str) -> Result<usize> {
    let var = extract_variable(f, field)?;
    if var.len() == 0 {
        // Empty mode coordinate: the file carries no perturbations.
        return Err(NcError::HarmonicModeNotFound { which, mode });
    }
    let coord = extract_1d_array::<i64>(f, field)?;

    coord
        .iter()
        .position(|&v| v == mode)
        .ok_or(NcError::HarmonicModeNotFound { which, mode })
}
