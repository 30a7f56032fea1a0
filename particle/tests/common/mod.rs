use equilibrium::{Bfield, Currents, Harmonic, Perturbation, Qfactor};

/// Builds the LAR stub equilibrium with no perturbation.
pub fn create_equilibrium() -> (Qfactor, Currents, Bfield, Perturbation) {
    let path = equilibrium::lar::test_file();
    let qfactor = Qfactor::from_dataset(&path, "steffen").unwrap();
    let currents = Currents::from_dataset(&path, "steffen").unwrap();
    let bfield = Bfield::from_dataset(&path, "bicubic").unwrap();
    let perturbation = Perturbation::from_harmonics(&[]);

    (qfactor, currents, bfield, perturbation)
}

/// Builds the LAR stub equilibrium with the (1, 8) and (1, 9) harmonics.
#[allow(dead_code)]
pub fn create_perturbed_equilibrium() -> (Qfactor, Currents, Bfield, Perturbation) {
    let path = equilibrium::lar::test_file();
    let (qfactor, currents, bfield, _) = create_equilibrium();
    let harmonics = vec![
        Harmonic::from_dataset(&path, "steffen", 1, 8, "zero").unwrap(),
        Harmonic::from_dataset(&path, "steffen", 1, 9, "zero").unwrap(),
    ];

    (qfactor, currents, bfield, Perturbation::from_harmonics(&harmonics))
}
