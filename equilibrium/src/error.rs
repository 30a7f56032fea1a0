use std::path::PathBuf;

/// Errors while opening or reading a NetCDF equilibrium file.
#[derive(thiserror::Error, Debug)]
pub enum NcError {
    /// The path does not exist.
    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    /// The underlying library could not open the file.
    #[error("Error opening '{path}': {err}")]
    FileOpen {
        path: PathBuf,
        #[source]
        err: netcdf::Error,
    },

    /// A required variable is missing.
    #[error("Variable not found: '{0}'")]
    VariableNotFound(String),

    /// A required variable has zero length.
    #[error("Variable '{0}' is empty")]
    EmptyVariable(String),

    /// The library failed reading a variable's values.
    #[error("Error reading values of '{name}': {err}")]
    GetValues {
        name: String,
        #[source]
        err: netcdf::Error,
    },

    /// A variable has a different dimensionality than expected.
    #[error("Shape error: {0}")]
    Shape(#[from] ndarray::ShapeError),

    /// The convention version attribute is missing.
    #[error("Attribute not found: '{0}'")]
    AttributeNotFound(String),

    /// The convention version attribute is not valid semver.
    #[error("Cannot parse convention version '{found}': {err}")]
    BadVersion {
        found: String,
        #[source]
        err: semver::Error,
    },

    /// The file follows a different major convention version.
    #[error("Incompatible convention version {found} (supported: {supported})")]
    IncompatibleConvention { found: String, supported: String },

    /// The requested perturbation mode is not tabulated in the file.
    #[error("Harmonic mode {which}={mode} not found in file")]
    HarmonicModeNotFound { which: &'static str, mode: i64 },

    /// Any other library error (file creation, writes).
    #[error("netCDF library error: {0}")]
    Library(#[from] netcdf::Error),
}

/// Errors while constructing or evaluating a field object.
#[derive(thiserror::Error, Debug)]
pub enum EqError {
    /// Filesystem error around the NetCDF file.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Error reading the NetCDF file.
    #[error("netCDF error: {0}")]
    Nc(#[from] NcError),

    /// Error constructing a spline.
    #[error("Interpolation error: {0}")]
    Interpolation(#[from] interpolation::InterpolationError),

    /// Evaluation outside the tabulated range.
    #[error("Interpolation domain error: {0}")]
    Domain(#[from] interpolation::DomainError),

    /// The `Resonance` phase policy found no ψp with q(ψp) = m/n.
    #[error("No resonance q = {m}/{n} inside (0, psip_wall]")]
    NoResonance { m: i64, n: i64 },

    /// The phase method string is not recognised.
    #[error("Unknown phase method: '{0}'")]
    UnknownPhaseMethod(String),
}
