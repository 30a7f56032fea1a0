mod common;

use particle::{InitialConditions, OrbitType, Particle};

use crate::common::create_equilibrium;

/// For a low-energy axisymmetric passing orbit the kinetic q matches the
/// local safety factor.
#[test]
fn test_qkinetic_matches_qfactor() {
    let (qfactor, currents, bfield, perturbation) = create_equilibrium();
    let psip_wall = qfactor.psip_wall();
    let psip0 = 0.5 * psip_wall;

    let initial = InitialConditions::new(0.0, 2.0, psip0, 0.001, 0.0, 0.0);
    let mut particle = Particle::new(&initial);

    particle
        .calculate_frequencies(&qfactor, &currents, &bfield, &perturbation)
        .unwrap();

    assert!(
        particle.status.is_single_period_integrated(),
        "status: {:?}",
        particle.status
    );
    assert_eq!(particle.orbit_type, OrbitType::Passing);

    let frequencies = particle.frequencies.expect("status is SinglePeriodIntegrated");
    let mut acc = interpolation::Accelerator::new();
    let q_local = qfactor.q(psip0, &mut acc).unwrap();
    let rel = (frequencies.qkinetic - q_local).abs() / q_local;
    assert!(
        rel < 0.05,
        "q_kin = {}, q(ψp0) = {q_local}, rel err = {rel:.3e}",
        frequencies.qkinetic
    );

    // ωθ comes from the period, ωζ from the orbit average; both positive
    // for this orbit, and consistent with each other.
    assert!(frequencies.omega_theta > 0.0);
    assert!(frequencies.omega_zeta > 0.0);
    let ratio = frequencies.omega_zeta / frequencies.omega_theta;
    assert_eq!(ratio, frequencies.qkinetic);
}

/// Frequencies stay absent when the particle cannot close its orbit.
#[test]
fn test_no_frequencies_on_failure() {
    let (qfactor, currents, bfield, perturbation) = create_equilibrium();
    let psip_wall = qfactor.psip_wall();

    // Seeded outside the wall: the drive fails immediately.
    let initial = InitialConditions::new(0.0, 0.0, 2.0 * psip_wall, 0.001, 0.0, 0.0);
    let mut particle = Particle::new(&initial);
    particle
        .calculate_frequencies(&qfactor, &currents, &bfield, &perturbation)
        .unwrap();

    assert!(particle.frequencies.is_none());
    assert_eq!(particle.orbit_type, OrbitType::Undefined);
}

/// A deeply trapped orbit (μ > 0, ρ changing sign) classifies as Trapped
/// and still produces a finite bounce frequency.
#[test]
fn test_trapped_orbit_classification() {
    let (qfactor, currents, bfield, perturbation) = create_equilibrium();
    let psip_wall = qfactor.psip_wall();

    // Outboard midplane with E∥ < μ·ΔB: the mirror force reverses the
    // parallel motion before the inboard side.
    let initial = InitialConditions::new(0.0, 0.0, 0.5 * psip_wall, 0.005, 0.0, 4e-5);
    let mut particle = Particle::new(&initial);

    particle
        .calculate_frequencies(&qfactor, &currents, &bfield, &perturbation)
        .unwrap();

    assert!(
        particle.status.is_single_period_integrated(),
        "status: {:?}",
        particle.status
    );
    assert_eq!(particle.orbit_type, OrbitType::Trapped);
    let frequencies = particle.frequencies.unwrap();
    assert!(frequencies.omega_theta > 0.0);
    assert!(frequencies.omega_theta.is_finite());
}
