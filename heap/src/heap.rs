use std::sync::Arc;
use std::sync::atomic::AtomicBool;

use indicatif::{ParallelProgressIterator, ProgressStyle};
use ndarray::Array1;
use rayon::iter::{IntoParallelRefMutIterator, ParallelIterator};

use config::PBAR_STYLE;
use equilibrium::{Bfield, Currents, Perturbation, Qfactor};
use particle::{MappingParameters, Particle};

use crate::{HeapInitialConditions, PoincareCrossings, Result};

/// An ensemble of particles sharing one equilibrium.
///
/// Every driver dispatches one task per particle on the rayon pool; the
/// equilibrium objects are shared read-only, and each particle owns its
/// evaluation caches. A cancelled run keeps the results of the particles
/// that finished.
pub struct Heap {
    /// The seeds of the ensemble.
    pub initials: HeapInitialConditions,
    /// The particles, in seed order.
    pub particles: Vec<Particle>,
    /// Poincaré crossing matrices, after a [`Heap::poincare`] run.
    pub crossings: Option<PoincareCrossings>,
    cancel: Arc<AtomicBool>,
}

impl Heap {
    /// Creates a [`Heap`] with one `Initialized` particle per seed.
    pub fn new(initials: HeapInitialConditions) -> Self {
        let particles = initials.to_particles();
        Self {
            initials,
            particles,
            crossings: None,
            cancel: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    /// A handle the host can set to stop the ensemble at the next step
    /// boundary of every running particle.
    pub fn cancel_handle(&self) -> Arc<AtomicBool> {
        self.cancel.clone()
    }

    /// Runs the Poincaré mapping driver over all particles concurrently and
    /// collects the crossing matrices.
    ///
    /// Per-particle failures (escapes, NaN evaluations, exhausted budgets)
    /// are recorded on each particle and padded with NaN in the collected
    /// matrices; they never abort the ensemble.
    pub fn poincare(
        &mut self,
        qfactor: &Qfactor,
        currents: &Currents,
        bfield: &Bfield,
        perturbation: &Perturbation,
        params: &MappingParameters,
    ) -> Result<()> {
        let cancel = self.cancel.clone();
        self.particles
            .par_iter_mut()
            .progress_with_style(pbar_style())
            .try_for_each(|p| {
                p.map_with_cancel(qfactor, currents, bfield, perturbation, params, Some(&cancel))
            })?;

        self.crossings = Some(PoincareCrossings::collect(&self.particles, params));
        Ok(())
    }

    /// Runs the single-period driver over all particles concurrently;
    /// afterwards the frequencies are addressable per particle and through
    /// the SoA getters.
    pub fn calculate_frequencies(
        &mut self,
        qfactor: &Qfactor,
        currents: &Currents,
        bfield: &Bfield,
        perturbation: &Perturbation,
    ) -> Result<()> {
        let cancel = self.cancel.clone();
        self.particles
            .par_iter_mut()
            .progress_with_style(pbar_style())
            .try_for_each(|p| {
                p.calculate_frequencies_with_cancel(
                    qfactor,
                    currents,
                    bfield,
                    perturbation,
                    Some(&cancel),
                )
            })?;
        Ok(())
    }

    /// The particles' ωθ, with NaN for particles without frequencies.
    pub fn omega_thetas(&self) -> Array1<f64> {
        self.frequency_component(|f| f.omega_theta)
    }

    /// The particles' ωζ, with NaN for particles without frequencies.
    pub fn omega_zetas(&self) -> Array1<f64> {
        self.frequency_component(|f| f.omega_zeta)
    }

    /// The particles' kinetic q, with NaN for particles without frequencies.
    pub fn qkinetics(&self) -> Array1<f64> {
        self.frequency_component(|f| f.qkinetic)
    }

    fn frequency_component(&self, get: impl Fn(&particle::Frequencies) -> f64) -> Array1<f64> {
        self.particles
            .iter()
            .map(|p| p.frequencies.as_ref().map(&get).unwrap_or(f64::NAN))
            .collect()
    }
}

fn pbar_style() -> ProgressStyle {
    ProgressStyle::with_template(PBAR_STYLE).unwrap_or(ProgressStyle::default_bar())
}

impl std::fmt::Debug for Heap {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let count = |pred: fn(&&Particle) -> bool| self.particles.iter().filter(pred).count();
        f.debug_struct("Heap")
            .field("particles", &self.len())
            .field("initialized", &count(|p| p.status.is_initialized()))
            .field("mapped", &count(|p| p.status.is_mapped()))
            .field(
                "single period integrated",
                &count(|p| p.status.is_single_period_integrated()),
            )
            .field("escaped", &count(|p| p.status.is_escaped()))
            .field("evaluation NaN", &count(|p| p.status.is_evaluation_nan()))
            .field("timed out", &count(|p| p.status.is_timed_out()))
            .field(
                "invalid intersections",
                &count(|p| p.status.is_invalid_intersections()),
            )
            .field("failed", &count(|p| p.status.is_failed()))
            .finish()
    }
}
