use std::f64::consts::PI;
use std::time::Duration;

use criterion::{Criterion, criterion_group, criterion_main};
use equilibrium::{Bfield, Currents, Harmonic, Perturbation, Qfactor};
use particle::{InitialConditions, State};

fn state_evaluation(c: &mut Criterion) {
    let path = equilibrium::lar::test_file();
    let qfactor = Qfactor::from_dataset(&path, "steffen").unwrap();
    let currents = Currents::from_dataset(&path, "steffen").unwrap();
    let bfield = Bfield::from_dataset(&path, "bicubic").unwrap();
    let harmonics = vec![
        Harmonic::from_dataset(&path, "steffen", 1, 8, "zero").unwrap(),
        Harmonic::from_dataset(&path, "steffen", 1, 9, "zero").unwrap(),
    ];
    let perturbation = Perturbation::from_harmonics(&harmonics);
    let psip_wall = qfactor.psip_wall();

    let initial = InitialConditions::new(0.0, 0.0, 0.5 * psip_wall, 0.01, 0.0, 0.0);
    let mut state = State::from_initial(&initial);

    let points = [(10.0 * PI, 0.1 * psip_wall), (15.0 * PI, 0.8 * psip_wall)];
    let mut points_iter = points.iter().cycle();

    let mut group = c.benchmark_group("State evaluation");
    group.warm_up_time(Duration::from_secs(1));
    group.measurement_time(Duration::from_secs(3));

    group.bench_function("moving State::evaluate()", |b| {
        b.iter(|| {
            let next = points_iter.next().unwrap();
            state.theta = next.0;
            state.psip = next.1;
            state
                .evaluate(&qfactor, &currents, &bfield, &perturbation)
                .unwrap();
        })
    });
    group.finish();
}

criterion_group!(benches, state_evaluation);
criterion_main!(benches);
