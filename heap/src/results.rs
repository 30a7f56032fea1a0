use ndarray::{Array1, Array2};
use utils::array2D_getter_impl;

use particle::{MappingParameters, Particle, PoincareSection};

use crate::{Flux, Radians};

/// The crossing matrices of a Poincaré run, as structure-of-arrays.
///
/// Every matrix has one row per particle and one column per requested
/// intersection (the seed points are dropped). Rows of particles that did
/// not complete the full crossing count are padded with NaN, so all four
/// matrices can be masked uniformly for plotting.
#[derive(Clone)]
pub struct PoincareCrossings {
    /// The θ crossing values.
    pub thetas: Array2<Radians>,
    /// The ζ crossing values.
    pub zetas: Array2<Radians>,
    /// The ψp crossing values.
    pub psips: Array2<Flux>,
    /// The ψ crossing values (for ConstZeta plotting).
    pub psis: Array2<Flux>,
    /// Snapshot of the parameters the run was made with.
    pub params: MappingParameters,
}

impl PoincareCrossings {
    /// Collects the evolutions of mapped particles into NaN-padded
    /// matrices.
    pub(crate) fn collect(particles: &[Particle], params: &MappingParameters) -> Self {
        let columns = params.intersections;
        let shape = (particles.len(), columns);

        let matrix_of = |values: fn(&Particle) -> &Vec<f64>| -> Array2<f64> {
            let mut matrix = Array2::from_elem(shape, f64::NAN);
            for (row, particle) in particles.iter().enumerate() {
                // Drop the seed point at index 0.
                let stored = values(particle);
                for (column, value) in stored.iter().skip(1).take(columns).enumerate() {
                    matrix[[row, column]] = *value;
                }
            }
            matrix
        };

        Self {
            thetas: matrix_of(|p| &p.evolution.theta),
            zetas: matrix_of(|p| &p.evolution.zeta),
            psips: matrix_of(|p| &p.evolution.psip),
            psis: matrix_of(|p| &p.evolution.psi),
            params: *params,
        }
    }

    /// The section-plane coordinate pair to plot: (ζ, ψp) for a ConstTheta
    /// section, (θ, ψ) for a ConstZeta section.
    pub fn section_plane(&self) -> (&Array2<Radians>, &Array2<Flux>) {
        match self.params.section {
            PoincareSection::ConstTheta => (&self.zetas, &self.psips),
            PoincareSection::ConstZeta => (&self.thetas, &self.psis),
        }
    }

    /// One particle's crossing row in the section plane.
    pub fn section_row(&self, row: usize) -> (Array1<Radians>, Array1<Flux>) {
        let (angles, fluxes) = self.section_plane();
        (angles.row(row).to_owned(), fluxes.row(row).to_owned())
    }

    array2D_getter_impl!(thetas_data, thetas, Radians);
    array2D_getter_impl!(zetas_data, zetas, Radians);
    array2D_getter_impl!(psips_data, psips, Flux);
    array2D_getter_impl!(psis_data, psis, Flux);
}

impl std::fmt::Debug for PoincareCrossings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PoincareCrossings")
            .field("shape", &self.thetas.shape())
            .field("params", &self.params)
            .finish()
    }
}
