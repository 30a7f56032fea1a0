use ndarray::Array1;
use utils::array1D_getter_impl;

use particle::{InitialConditions, Particle};

use crate::{HeapError, Result};

/// The initial conditions of an ensemble, as five parallel arrays.
#[derive(Clone)]
#[non_exhaustive]
pub struct HeapInitialConditions {
    pub thetas: Vec<f64>,
    pub psips: Vec<f64>,
    pub rhos: Vec<f64>,
    pub zetas: Vec<f64>,
    pub mus: Vec<f64>,
}

impl HeapInitialConditions {
    /// Creates a new [`HeapInitialConditions`].
    ///
    /// # Errors
    ///
    /// Returns [`HeapError::MismatchedLengths`] if the arrays differ in
    /// length.
    ///
    /// # Example
    /// ```
    /// # use heap::*;
    /// #
    /// # fn main() -> Result<()> {
    /// let init = HeapInitialConditions::build(
    ///     &[0.0, 0.1, 0.2],
    ///     &[0.01, 0.015, 0.02],
    ///     &[1e-3, 2e-3, 3e-3],
    ///     &[0.0, 0.1, 0.2],
    ///     &[0.0, 0.0, 0.0],
    /// )?;
    /// # Ok(())
    /// # }
    /// ```
    pub fn build(
        thetas: &[f64],
        psips: &[f64],
        rhos: &[f64],
        zetas: &[f64],
        mus: &[f64],
    ) -> Result<Self> {
        let len = thetas.len();
        if psips.len() != len || rhos.len() != len || zetas.len() != len || mus.len() != len {
            return Err(HeapError::MismatchedLengths);
        }

        Ok(Self {
            thetas: thetas.to_vec(),
            psips: psips.to_vec(),
            rhos: rhos.to_vec(),
            zetas: zetas.to_vec(),
            mus: mus.to_vec(),
        })
    }

    /// Creates one `Initialized` [`Particle`] per initial conditions set.
    pub(crate) fn to_particles(&self) -> Vec<Particle> {
        (0..self.len())
            .map(|index| {
                Particle::new(&InitialConditions::new(
                    0.0,
                    self.thetas[index],
                    self.psips[index],
                    self.rhos[index],
                    self.zetas[index],
                    self.mus[index],
                ))
            })
            .collect()
    }

    /// The number of seeds stored.
    pub fn len(&self) -> usize {
        self.thetas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.thetas.is_empty()
    }

    array1D_getter_impl!(thetas_data, thetas, f64);
    array1D_getter_impl!(psips_data, psips, f64);
    array1D_getter_impl!(rhos_data, rhos, f64);
    array1D_getter_impl!(zetas_data, zetas, f64);
    array1D_getter_impl!(mus_data, mus, f64);
}

impl std::fmt::Debug for HeapInitialConditions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HeapInitialConditions")
            .field("length", &self.len())
            .finish()
    }
}
