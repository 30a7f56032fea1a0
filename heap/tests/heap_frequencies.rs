mod common;

use heap::{Heap, HeapInitialConditions};
use interpolation::Accelerator;

use crate::common::{create_perturbed_equilibrium, linspace};

/// The ensemble frequency driver sets frequencies on every surviving
/// particle, and the kinetic q profile tracks the equilibrium q profile.
#[test]
fn test_ensemble_frequencies() {
    let (qfactor, currents, bfield, _) = create_perturbed_equilibrium();
    let perturbation = equilibrium::Perturbation::from_harmonics(&[]);
    let psip_wall = qfactor.psip_wall();

    let psips = linspace(0.3 * psip_wall, 0.7 * psip_wall, 5);
    let num = psips.len();
    let initials = HeapInitialConditions::build(
        &vec![2.0; num],
        &psips,
        &vec![1e-3; num],
        &vec![0.0; num],
        &vec![0.0; num],
    )
    .unwrap();

    let mut heap = Heap::new(initials);
    heap.calculate_frequencies(&qfactor, &currents, &bfield, &perturbation)
        .unwrap();

    let qkinetics = heap.qkinetics();
    let omega_thetas = heap.omega_thetas();
    let omega_zetas = heap.omega_zetas();
    assert_eq!(qkinetics.len(), num);

    let mut acc = Accelerator::new();
    for (particle, (psip, qkin)) in heap
        .particles
        .iter()
        .zip(psips.iter().zip(qkinetics.iter()))
    {
        assert!(
            particle.status.is_single_period_integrated(),
            "status: {:?}",
            particle.status
        );
        let q_local = qfactor.q(*psip, &mut acc).unwrap();
        let rel = (qkin - q_local).abs() / q_local;
        assert!(rel < 0.05, "q_kin {qkin} vs q {q_local} at ψp = {psip}");
    }
    assert!(omega_thetas.iter().all(|v| v.is_finite()));
    assert!(omega_zetas.iter().all(|v| v.is_finite()));
}

/// Particles that cannot produce frequencies appear as NaN in the SoA
/// getters.
#[test]
fn test_absent_frequencies_are_nan() {
    let (qfactor, currents, bfield, _) = create_perturbed_equilibrium();
    let perturbation = equilibrium::Perturbation::from_harmonics(&[]);
    let psip_wall = qfactor.psip_wall();

    let initials = HeapInitialConditions::build(
        &[2.0, 2.0],
        &[0.5 * psip_wall, 1.5 * psip_wall],
        &[1e-3, 1e-3],
        &[0.0, 0.0],
        &[0.0, 0.0],
    )
    .unwrap();

    let mut heap = Heap::new(initials);
    heap.calculate_frequencies(&qfactor, &currents, &bfield, &perturbation)
        .unwrap();

    let qkinetics = heap.qkinetics();
    assert!(qkinetics[0].is_finite());
    assert!(qkinetics[1].is_nan());
}
