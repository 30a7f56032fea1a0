#![doc = include_str!("../README.md")]

mod acc;
mod error;
mod hermite;
mod interp1d;
mod interp2d;
mod types;

pub use acc::Accelerator;
pub use error::{DomainError, InterpolationError};
pub use hermite::Hermite;
pub use interp1d::Spline1d;
pub use interp2d::{Cache, Spline2d};
pub use types::{Interp1dType, Interp2dType};

pub type Result<T, E = InterpolationError> = std::result::Result<T, E>;

/// Checks that `xa` is strictly increasing and matches `ya` in length.
pub(crate) fn check_grid(xa: &[f64], ya: &[f64]) -> Result<()> {
    if xa.is_empty() || ya.is_empty() {
        return Err(InterpolationError::EmptyData);
    }
    if xa.len() != ya.len() {
        return Err(InterpolationError::MismatchedLengths {
            xlen: xa.len(),
            ylen: ya.len(),
        });
    }
    if xa.windows(2).any(|w| w[1] <= w[0]) {
        return Err(InterpolationError::DegenerateGrid);
    }
    Ok(())
}
