#[derive(thiserror::Error, Debug)]
pub enum ParticleError {
    /// Error from [`equilibrium`].
    #[error("Equilibrium error: {0}")]
    Eq(#[from] equilibrium::EqError),

    /// Evaluation outside the tabulated equilibrium range.
    #[error("Interpolation domain error: {0}")]
    Domain(#[from] interpolation::DomainError),

    /// Error constructing the dense-output interpolant.
    #[error("Interpolation error: {0}")]
    Interpolation(#[from] interpolation::InterpolationError),

    /// An interpolator or the equations of motion produced a non-finite
    /// value; the particle has left the valid grid.
    #[error("Non-finite value during evaluation")]
    EvaluationNaN,

    /// The adaptive step fell below machine precision relative to the
    /// current time.
    #[error("Step size underflow at t = {time}")]
    StepSizeUnderflow { time: f64 },

    /// The per-particle step budget was exhausted.
    #[error("Exceeded the maximum step count")]
    TimedOut,

    /// The mapping produced inconsistently spaced intersections.
    #[error("Inconsistent intersection spacing")]
    InvalidIntersections,

    /// A driver was invoked on a particle that is not `Initialized`.
    #[error("Particle already driven; reset it first")]
    AlreadyDriven,

    /// The host cancelled the run.
    #[error("Cancelled")]
    Cancelled,
}
