use std::f64::consts::TAU;
use std::sync::atomic::AtomicBool;

use crate::particle::cancelled;
use crate::solver::{AngleEvent, EventAngle, Solver};
use crate::{Particle, ParticleError, Radians, Result};

/// Defines the surface of the Poincaré section.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PoincareSection {
    /// The surface θ = α.
    ConstTheta,
    /// The surface ζ = α.
    ConstZeta,
}

/// All the parameters of a Poincaré mapping run.
#[non_exhaustive]
#[derive(Debug, Clone, Copy)]
pub struct MappingParameters {
    /// The surface of section Σ, defined by xᵢ = α with xᵢ = θ or ζ.
    pub section: PoincareSection,
    /// The angle value defining the surface of section.
    pub alpha: Radians,
    /// The number of intersections to calculate.
    pub intersections: usize,
}

impl MappingParameters {
    /// Creates new [`MappingParameters`].
    ///
    /// # Panics
    ///
    /// Panics if `intersections` is zero.
    pub fn new(section: PoincareSection, alpha: Radians, intersections: usize) -> Self {
        assert!(intersections >= 1, "at least one intersection is required");
        // mod α once here instead of at every step
        Self {
            section,
            alpha: alpha.rem_euclid(TAU),
            intersections,
        }
    }
}

/// Calculates the crossings with the Poincaré surface until
/// `params.intersections` of them are stored, on top of the already stored
/// seed point.
///
/// Only crossings in the direction of the orbit's first located crossing
/// are counted; the opposite-direction passes of trapped orbits would
/// otherwise double every island point.
pub(crate) fn map_integrate(
    particle: &mut Particle,
    solver: &mut Solver,
    params: &MappingParameters,
    cancel: Option<&AtomicBool>,
) -> Result<()> {
    let which = match params.section {
        PoincareSection::ConstTheta => EventAngle::Theta,
        PoincareSection::ConstZeta => EventAngle::Zeta,
    };
    let mut event = AngleEvent::new(which, params.alpha);

    let mut state = particle.initial_state.clone();
    while particle.evolution.steps_stored() <= params.intersections {
        if particle.evolution.steps_taken() >= config::MAX_STEPS {
            return Err(ParticleError::TimedOut);
        }
        if cancelled(cancel) {
            return Err(ParticleError::Cancelled);
        }

        let step = solver.step(&state, event.step_cap(&state))?;
        particle.evolution.steps += 1;

        if event.brackets(&state, &step.state) {
            if let Some(crossing) = event.locate(solver, &state, &step)? {
                particle.evolution.push_state(&crossing);
            }
        }
        // Always continue from the step's end state, never from the located
        // crossing; restarting on the section would re-detect the same
        // crossing and stall the orbit.
        state = step.state;
    }
    particle.final_state = state;
    Ok(())
}

/// Checks that no two consecutive intersections are further apart than a
/// full turn, which would mean the event detector skipped a crossing.
pub(crate) fn check_accuracy(angles: &[Radians], threshold: Radians) -> crate::Result<()> {
    // Skip the initial point, which is usually not on the section.
    match angles
        .windows(2)
        .skip(1)
        .all(|w| (w[1] - w[0]).abs() - TAU < threshold)
    {
        true => Ok(()),
        false => Err(crate::ParticleError::InvalidIntersections),
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use config::MAP_THRESHOLD;

    #[test]
    fn test_mapping_parameters_mod() {
        let params = MappingParameters::new(PoincareSection::ConstTheta, 3.0 + TAU, 10);
        assert!((params.alpha - 3.0).abs() < 1e-12);
    }

    #[test]
    #[should_panic]
    fn test_zero_intersections_rejected() {
        let _ = MappingParameters::new(PoincareSection::ConstZeta, 0.0, 0);
    }

    #[test]
    fn test_accuracy_check() {
        // Trapped-like (same branch) and passing-like (one turn apart)
        // sequences are both fine; a skipped crossing is not.
        let trapped = [100.0, 3.14, 3.14, 3.14, 3.14];
        let passing = [100.0, 3.14, 3.14 + TAU, 3.14 + 2.0 * TAU];
        let skipped = [100.0, 3.14, 3.14 + 2.0 * TAU + 1e-3];

        assert!(check_accuracy(&trapped, MAP_THRESHOLD).is_ok());
        assert!(check_accuracy(&passing, MAP_THRESHOLD).is_ok());
        assert!(check_accuracy(&skipped, MAP_THRESHOLD).is_err());
    }
}
