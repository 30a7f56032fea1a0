mod common;

use particle::{InitialConditions, IntegrationStatus, Particle};

use crate::common::create_equilibrium;

/// Axisymmetric integration conserves both the energy and Pζ to solver
/// accuracy over a long orbit.
#[test]
fn test_axisymmetric_invariants() {
    let (qfactor, currents, bfield, perturbation) = create_equilibrium();
    let psip_wall = qfactor.psip_wall();

    let initial = InitialConditions::new(0.0, 3.14, 0.5 * psip_wall, 0.01, 0.0, 0.0);
    let mut particle = Particle::new(&initial);
    assert!(particle.status.is_initialized());

    particle
        .integrate(&qfactor, &currents, &bfield, &perturbation, (0.0, 20000.0))
        .unwrap();

    assert!(
        particle.status.is_integrated(),
        "status: {:?}",
        particle.status
    );
    assert!(particle.evolution.steps_stored() > 2);
    assert_eq!(
        particle.evolution.steps_stored(),
        particle.evolution.steps_taken() + 1
    );

    // σ(E)/μ(E)
    assert!(
        particle.evolution.energy_std < 1e-6,
        "energy σ/μ = {:.3e}",
        particle.evolution.energy_std
    );

    // σ(Pζ)/|μ(Pζ)|
    let pzeta = particle.evolution.pzeta_data();
    let pzeta_std = pzeta.std(0.0) / pzeta.mean().unwrap().abs();
    assert!(pzeta_std < 1e-6, "Pζ σ/|μ| = {pzeta_std:.3e}");

    // The stored interval covers the requested one.
    let time = particle.evolution.time_data();
    assert_eq!(time[0], 0.0);
    assert!((time[time.len() - 1] - 20000.0).abs() < 1e-6);
}

/// A particle seeded outside the wall records `Escaped` without poisoning
/// the caller.
#[test]
fn test_seed_outside_wall_escapes() {
    let (qfactor, currents, bfield, perturbation) = create_equilibrium();
    let psip_wall = qfactor.psip_wall();

    let initial = InitialConditions::new(0.0, 0.0, 1.5 * psip_wall, 0.01, 0.0, 0.0);
    let mut particle = Particle::new(&initial);
    particle
        .integrate(&qfactor, &currents, &bfield, &perturbation, (0.0, 100.0))
        .unwrap();

    assert!(matches!(particle.status, IntegrationStatus::Escaped));
}

/// Driving an already driven particle is rejected until it is reset.
#[test]
fn test_redrive_rejected_until_reset() {
    let (qfactor, currents, bfield, perturbation) = create_equilibrium();
    let psip_wall = qfactor.psip_wall();

    let initial = InitialConditions::new(0.0, 1.0, 0.5 * psip_wall, 0.001, 0.0, 0.0);
    let mut particle = Particle::new(&initial);
    particle
        .integrate(&qfactor, &currents, &bfield, &perturbation, (0.0, 100.0))
        .unwrap();
    assert!(particle.status.is_integrated());

    let redrive =
        particle.integrate(&qfactor, &currents, &bfield, &perturbation, (0.0, 100.0));
    assert!(matches!(
        redrive.unwrap_err(),
        particle::ParticleError::AlreadyDriven
    ));

    particle.reset();
    assert!(particle.status.is_initialized());
    particle
        .integrate(&qfactor, &currents, &bfield, &perturbation, (0.0, 100.0))
        .unwrap();
    assert!(particle.status.is_integrated());
}

/// Host cancellation records a `Failed` particle.
#[test]
fn test_cancellation() {
    use std::sync::atomic::{AtomicBool, Ordering};

    let (qfactor, currents, bfield, perturbation) = create_equilibrium();
    let psip_wall = qfactor.psip_wall();

    let cancel = AtomicBool::new(false);
    cancel.store(true, Ordering::Relaxed);

    let initial = InitialConditions::new(0.0, 1.0, 0.5 * psip_wall, 0.001, 0.0, 0.0);
    let mut particle = Particle::new(&initial);
    particle
        .integrate_with_cancel(
            &qfactor,
            &currents,
            &bfield,
            &perturbation,
            (0.0, 1e6),
            Some(&cancel),
        )
        .unwrap();

    assert!(particle.status.is_failed());
}
