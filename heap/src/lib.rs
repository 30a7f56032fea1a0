#![doc = include_str!("../README.md")]

mod error;
mod heap;
mod initials;
mod results;

pub use error::HeapError;
pub use heap::Heap;
pub use initials::HeapInitialConditions;
pub use results::PoincareCrossings;

pub type Result<T> = std::result::Result<T, HeapError>;

pub use equilibrium::{Flux, Length, Radians};
pub use particle::{MagneticMoment, Time};
