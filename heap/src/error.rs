#[derive(thiserror::Error, Debug)]
pub enum HeapError {
    /// Caller error surfaced by a particle driver (driving a non-reset
    /// ensemble); physics failures are recorded per particle instead.
    #[error("Particle error: {0}")]
    Particle(#[from] particle::ParticleError),

    /// The initial condition arrays differ in length.
    #[error("Initial condition arrays must all have the same length")]
    MismatchedLengths,
}
