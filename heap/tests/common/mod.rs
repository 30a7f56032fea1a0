use equilibrium::{Bfield, Currents, Harmonic, Perturbation, Qfactor};

/// Builds the LAR stub equilibrium with the (1, 8) and (1, 9) harmonics.
pub fn create_perturbed_equilibrium() -> (Qfactor, Currents, Bfield, Perturbation) {
    let path = equilibrium::lar::test_file();
    let qfactor = Qfactor::from_dataset(&path, "steffen").unwrap();
    let currents = Currents::from_dataset(&path, "steffen").unwrap();
    let bfield = Bfield::from_dataset(&path, "bicubic").unwrap();
    let harmonics = vec![
        Harmonic::from_dataset(&path, "steffen", 1, 8, "zero").unwrap(),
        Harmonic::from_dataset(&path, "steffen", 1, 9, "zero").unwrap(),
    ];

    (qfactor, currents, bfield, Perturbation::from_harmonics(&harmonics))
}

/// Evenly spaced values over [start, end], inclusive.
pub fn linspace(start: f64, end: f64, num: usize) -> Vec<f64> {
    (0..num)
        .map(|i| start + (end - start) * i as f64 / (num - 1) as f64)
        .collect()
}
