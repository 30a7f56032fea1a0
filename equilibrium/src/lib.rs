#![doc = include_str!("../README.md")]

mod bfield;
mod currents;
mod error;
mod geometry;
mod harmonic;
mod perturbation;
mod qfactor;

pub mod extract;
pub mod lar;

pub use bfield::Bfield;
pub use currents::{Currents, NumericalCurrents};
pub use error::{EqError, NcError};
pub use geometry::Geometry;
pub use harmonic::{Harmonic, HarmonicCache, PhaseMethod};
pub use perturbation::Perturbation;
pub use qfactor::{NumericalQfactor, Qfactor};

pub type Result<T> = std::result::Result<T, EqError>;

/// Magnetic flux, in Normalized Units.
#[doc(alias = "f64")]
pub type Flux = f64;

/// Angle in radians.
#[doc(alias = "f64")]
pub type Radians = f64;

/// Distance, in Normalized Units (normalized to the major radius R0).
#[doc(alias = "f64")]
pub type Length = f64;
