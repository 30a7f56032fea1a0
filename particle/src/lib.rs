#![doc = include_str!("../README.md")]

mod error;
mod evolution;
mod frequencies;
mod initial;
mod mapping;
mod particle;
mod single_period;
mod solver;
mod state;

pub use error::ParticleError;
pub use evolution::Evolution;
pub use frequencies::{Frequencies, OrbitType};
pub use initial::InitialConditions;
pub use mapping::{MappingParameters, PoincareSection};
pub use particle::{IntegrationStatus, Particle};
pub use state::State;

pub type Result<T> = std::result::Result<T, ParticleError>;

pub use equilibrium::Flux;
pub use equilibrium::Length;
pub use equilibrium::Radians;

/// Time, in Normalized Units (inverse gyrofrequency on the magnetic axis).
#[doc(alias = "f64")]
pub type Time = f64;

/// Magnetic Moment, in Normalized Units.
#[doc(alias = "f64")]
pub type MagneticMoment = f64;

/// Canonical Momentum, in Normalized Units.
#[doc(alias = "f64")]
pub type CanonicalMomentum = f64;

/// Energy, in Normalized Units.
#[doc(alias = "f64")]
pub type Energy = f64;
