//! Compile-time tunables shared across the workspace.

pub mod netcdf_fields;

// ==================== Solver

/// The maximum amount of steps a particle can make before its integration is
/// terminated with a `TimedOut` status.
pub const MAX_STEPS: usize = 1_000_000;

/// The initial trial step for the adaptive stepper. Should be small enough to
/// account for fast particles. The value is empirical.
pub const FIRST_STEP: f64 = 1e-3;

/// Absolute tolerance of the embedded error estimate in every step.
pub const ABS_TOL: f64 = 1e-10;

/// Relative tolerance of the embedded error estimate in every step.
pub const REL_TOL: f64 = 1e-9;

/// Tolerance (in time units) of the event root localization.
pub const EVENT_TOL: f64 = 1e-10;

// ==================== Mapping

/// The maximum allowed absolute deviation from 2π between two consecutive
/// intersection angles.
pub const MAP_THRESHOLD: f64 = 1e-9;

// ==================== Single period

/// Relative tolerance of the (θ, ψp) closure test, with θ measured against a
/// full turn and ψp against ψp_wall.
pub const CLOSURE_RTOL: f64 = 1e-3;

// ==================== Misc

/// The starting capacity of the Evolution time series vectors.
pub const EVOLUTION_INIT_CAPACITY: usize = 2000;

/// Progress bar template for ensemble runs.
pub const PBAR_STYLE: &str =
    "{spinner} [{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} particles ({eta})";

/// The NetCDF convention version this workspace understands. Files with a
/// different major version are rejected at load time.
pub const CONVENTION_VERSION: &str = "0.1.0";
