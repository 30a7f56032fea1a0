/// Orbit frequencies extracted from a single-period integration.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Frequencies {
    /// The poloidal frequency `ωθ = 2π/T`.
    pub omega_theta: f64,
    /// The orbit-averaged toroidal frequency `ωζ = ⟨dζ/dt⟩`.
    pub omega_zeta: f64,
    /// The dynamically measured winding number `q_kinetic = ωζ/ωθ`.
    pub qkinetic: f64,
}

/// A particle's orbit type, determined from the sign history of dθ/dt over
/// a single period.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OrbitType {
    /// The orbit reverses its poloidal direction (banana orbit).
    Trapped,
    /// The orbit circulates poloidally without reversing.
    Passing,
    /// Classification inconclusive (particle not yet driven, or the run
    /// failed).
    #[default]
    Undefined,
}
