//! The name each variable is expected to appear with in the netCDF file.
//!
//! If the naming convention changes, this is the only file we must update.

// ================== Attributes ==================

/// The convention version attribute (semver string).
pub const CONVENTION: &str = "convention version";

// ================== Scalars ==================

/// Magnetic field strength on the axis `B0` **in \[T\]**.
pub const BAXIS: &str = "baxis";
/// The tokamak's major radius `R0` **in \[m\]**.
pub const RAXIS: &str = "raxis";
/// The magnetic axis' vertical position **in \[m\]**.
pub const ZAXIS: &str = "zaxis";
/// The tokamak's geometric center **in \[m\]**.
pub const RGEO: &str = "rgeo";

// ================= Coordinates =================

/// The normalized poloidal flux `ψp` grid in \[0, 1\].
pub const PSIP_NORM: &str = "psip_norm";
/// The boozer poloidal angle `θ` **in \[rads\]**.
pub const THETA: &str = "theta";
/// The normalized toroidal flux `ψ` grid.
pub const PSI_NORM: &str = "psi_norm";
/// The normalized minor radius `r` grid.
pub const R_NORM: &str = "r_norm";
/// The poloidal mode numbers `m`.
pub const M: &str = "m";
/// The toroidal mode numbers `n`.
pub const N: &str = "n";

// ================ 1D Variables ================

/// ψp: The poloidal flux **in \[Tm²\]**, over `psip_norm`.
pub const PSIP: &str = "psip";
/// q(ψp): The safety factor.
pub const Q: &str = "q";
/// g(ψp): The covariant toroidal plasma current **in \[Tm\]**.
pub const G: &str = "g";
/// I(ψp): The covariant poloidal plasma current **in \[Tm\]**.
pub const I: &str = "i";
/// ψ: The toroidal flux **in \[Tm²\]**, over `psi_norm`.
pub const PSI: &str = "psi";
/// r: The minor radius **in \[m\]**, over `r_norm`.
pub const R: &str = "r";

// ================ 2D Variables ================

/// B(ψp, θ): The magnetic field strength **in \[T\]**.
pub const B: &str = "b";
/// J(ψp, θ): The boozer coordinate Jacobian **in \[m/T\]**.
pub const JACOBIAN: &str = "jacobian";
/// R(ψp, θ): The lab `R` coordinate with respect to boozer coordinates **in \[m\]**.
pub const RLAB: &str = "rlab";
/// Z(ψp, θ): The lab `Z` coordinate with respect to boozer coordinates **in \[m\]**.
pub const ZLAB: &str = "zlab";

// ================ 3D Variables ================

/// The 3D array containing all the `α{m,n}(ψp)` 1D arrays **in \[m\]**.
pub const ALPHAS: &str = "alphas";
/// The 3D array containing all the `φ{m,n}(ψp)` 1D arrays **in \[rads\]**.
pub const PHASES: &str = "phases";
