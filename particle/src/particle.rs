use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

use equilibrium::{Bfield, Currents, EqError, Perturbation, Qfactor};

use crate::mapping::{check_accuracy, map_integrate};
use crate::single_period::single_period_integrate;
use crate::solver::Solver;
use crate::{Evolution, Frequencies, InitialConditions, OrbitType, State};
use crate::{MappingParameters, ParticleError, PoincareSection, Result, Time};

/// A particle's integration status: its lifecycle is
/// `Initialized → driven exactly once → terminal status`.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum IntegrationStatus {
    /// Seeded from [`InitialConditions`], not driven yet.
    #[default]
    Initialized,
    /// Reached the end of the time interval successfully.
    Integrated,
    /// Reached the target intersection count successfully.
    Mapped,
    /// Found its orbit period and extracted the frequencies.
    SinglePeriodIntegrated,
    /// ψp left [0, ψp_wall]; the particle hit the wall or the axis.
    Escaped,
    /// An interpolation produced a non-finite value.
    EvaluationNaN,
    /// Exhausted the step budget ([`config::MAX_STEPS`]).
    TimedOut,
    /// The intersections found by mapping are inconsistently spaced.
    InvalidIntersections,
    /// Failed for any other reason (including host cancellation).
    Failed(Box<str>),
}

impl IntegrationStatus {
    pub fn is_initialized(&self) -> bool {
        matches!(self, Self::Initialized)
    }
    pub fn is_integrated(&self) -> bool {
        matches!(self, Self::Integrated)
    }
    pub fn is_mapped(&self) -> bool {
        matches!(self, Self::Mapped)
    }
    pub fn is_single_period_integrated(&self) -> bool {
        matches!(self, Self::SinglePeriodIntegrated)
    }
    pub fn is_escaped(&self) -> bool {
        matches!(self, Self::Escaped)
    }
    pub fn is_evaluation_nan(&self) -> bool {
        matches!(self, Self::EvaluationNaN)
    }
    pub fn is_timed_out(&self) -> bool {
        matches!(self, Self::TimedOut)
    }
    pub fn is_invalid_intersections(&self) -> bool {
        matches!(self, Self::InvalidIntersections)
    }
    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed(_))
    }
}

/// Representation of a single guiding-center test particle.
#[derive(Clone)]
pub struct Particle {
    /// The seed of the particle.
    pub initial_conditions: InitialConditions,
    /// The initial [`State`] of the particle.
    pub initial_state: State,
    /// The final [`State`] of the particle.
    pub final_state: State,
    /// The [`Evolution`] time series of the particle.
    pub evolution: Evolution,
    /// Status of the most recent drive.
    pub status: IntegrationStatus,
    /// Orbit classification, set by `calculate_frequencies`.
    pub orbit_type: OrbitType,
    /// Orbit frequencies; present iff `status` is `SinglePeriodIntegrated`.
    pub frequencies: Option<Frequencies>,
}

impl Particle {
    /// Creates a new [`Particle`] from an initial conditions set.
    pub fn new(initial: &InitialConditions) -> Self {
        Self {
            initial_conditions: initial.clone(),
            initial_state: State::from_initial(initial),
            final_state: State::default(),
            evolution: Evolution::default(),
            status: IntegrationStatus::default(),
            orbit_type: OrbitType::default(),
            frequencies: None,
        }
    }

    /// Makes a driven particle driveable again, dropping the previous
    /// results.
    pub fn reset(&mut self) {
        *self = Self::new(&self.initial_conditions);
    }

    /// Drivers only accept particles that have not been driven yet.
    fn take_initialized(&mut self) -> Result<()> {
        if !self.status.is_initialized() {
            return Err(ParticleError::AlreadyDriven);
        }
        self.evolution = Evolution::default();
        self.frequencies = None;
        Ok(())
    }

    /// Integrates the particle over `t_eval = (t_start, t_end)`, storing
    /// every accepted step in its [`Evolution`].
    ///
    /// Terminal statuses: `Integrated`, `Escaped`, `EvaluationNaN`,
    /// `TimedOut`, `Failed`. Per-particle failures are recorded, not
    /// returned; the `Err` variant is reserved for caller mistakes
    /// (re-driving a particle).
    pub fn integrate(
        &mut self,
        qfactor: &Qfactor,
        currents: &Currents,
        bfield: &Bfield,
        perturbation: &Perturbation,
        t_eval: (Time, Time),
    ) -> Result<()> {
        self.integrate_with_cancel(qfactor, currents, bfield, perturbation, t_eval, None)
    }

    /// Same as [`Particle::integrate`], checking `cancel` at every accepted
    /// step boundary.
    pub fn integrate_with_cancel(
        &mut self,
        qfactor: &Qfactor,
        currents: &Currents,
        bfield: &Bfield,
        perturbation: &Perturbation,
        t_eval: (Time, Time),
        cancel: Option<&AtomicBool>,
    ) -> Result<()> {
        self.take_initialized()?;
        let start = Instant::now();
        let mut solver = Solver::new(qfactor, currents, bfield, perturbation);

        self.initial_state.time = t_eval.0;
        if let Err(err) = solver.evaluate(&mut self.initial_state) {
            self.status = failure_status(&err, bfield.psip_wall);
            return Ok(());
        }

        let mut state = self.initial_state.clone();
        self.evolution.push_state(&state);
        self.status = IntegrationStatus::Integrated; // Overwritten on failure

        let t_end = t_eval.1;
        // Stop a little above the stepper's underflow threshold, so the last
        // capped step cannot trip it.
        let time_left = |t: Time| t_end - t > 32.0 * f64::EPSILON * t_end.abs().max(1.0);
        while time_left(state.time) {
            if self.evolution.steps_taken() >= config::MAX_STEPS {
                self.status = IntegrationStatus::TimedOut;
                break;
            }
            if cancelled(cancel) {
                self.status = IntegrationStatus::Failed("cancelled".into());
                break;
            }
            match solver.step(&state, Some(t_end - state.time)) {
                Ok(step) => {
                    state = step.state;
                    self.evolution.steps += 1;
                    self.evolution.push_state(&state);
                }
                Err(err) => {
                    self.status = failure_status(&err, bfield.psip_wall);
                    break;
                }
            }
        }

        self.evolution.duration = start.elapsed();
        self.evolution.finish();
        self.final_state = state;
        Ok(())
    }

    /// Integrates the particle until it has crossed the Poincaré surface
    /// defined by `params` exactly `params.intersections` times, storing the
    /// crossing states (plus the seed point) in its [`Evolution`].
    ///
    /// Terminal statuses: `Mapped`, `Escaped`, `EvaluationNaN`, `TimedOut`,
    /// `InvalidIntersections`, `Failed`.
    pub fn map(
        &mut self,
        qfactor: &Qfactor,
        currents: &Currents,
        bfield: &Bfield,
        perturbation: &Perturbation,
        params: &MappingParameters,
    ) -> Result<()> {
        self.map_with_cancel(qfactor, currents, bfield, perturbation, params, None)
    }

    /// Same as [`Particle::map`], checking `cancel` at every accepted step
    /// boundary.
    pub fn map_with_cancel(
        &mut self,
        qfactor: &Qfactor,
        currents: &Currents,
        bfield: &Bfield,
        perturbation: &Perturbation,
        params: &MappingParameters,
        cancel: Option<&AtomicBool>,
    ) -> Result<()> {
        self.take_initialized()?;
        let start = Instant::now();
        let mut solver = Solver::new(qfactor, currents, bfield, perturbation);

        if let Err(err) = solver.evaluate(&mut self.initial_state) {
            self.status = failure_status(&err, bfield.psip_wall);
            return Ok(());
        }
        self.evolution.push_state(&self.initial_state);
        self.status = IntegrationStatus::Mapped; // Overwritten on failure

        if let Err(err) = map_integrate(self, &mut solver, params, cancel) {
            self.status = failure_status(&err, bfield.psip_wall);
        }

        if self.status.is_mapped() {
            let angles = match params.section {
                PoincareSection::ConstTheta => &self.evolution.theta,
                PoincareSection::ConstZeta => &self.evolution.zeta,
            };
            if check_accuracy(angles, config::MAP_THRESHOLD).is_err() {
                self.status = IntegrationStatus::InvalidIntersections;
            }
        }

        self.evolution.duration = start.elapsed();
        self.evolution.finish();
        Ok(())
    }

    /// Integrates the particle over a single (θ, ψp) period and extracts
    /// ωθ, ωζ and the kinetic q.
    ///
    /// Terminal statuses: `SinglePeriodIntegrated` (frequencies set),
    /// `Escaped`, `EvaluationNaN`, `TimedOut`, `Failed`.
    pub fn calculate_frequencies(
        &mut self,
        qfactor: &Qfactor,
        currents: &Currents,
        bfield: &Bfield,
        perturbation: &Perturbation,
    ) -> Result<()> {
        self.calculate_frequencies_with_cancel(qfactor, currents, bfield, perturbation, None)
    }

    /// Same as [`Particle::calculate_frequencies`], checking `cancel` at
    /// every accepted step boundary.
    pub fn calculate_frequencies_with_cancel(
        &mut self,
        qfactor: &Qfactor,
        currents: &Currents,
        bfield: &Bfield,
        perturbation: &Perturbation,
        cancel: Option<&AtomicBool>,
    ) -> Result<()> {
        use std::f64::consts::TAU;

        self.take_initialized()?;
        let start = Instant::now();
        let mut solver = Solver::new(qfactor, currents, bfield, perturbation);

        if let Err(err) = solver.evaluate(&mut self.initial_state) {
            self.status = failure_status(&err, bfield.psip_wall);
            return Ok(());
        }
        self.evolution.push_state(&self.initial_state);

        match single_period_integrate(self, &mut solver, cancel) {
            Ok(outcome) => {
                let omega_theta = TAU / outcome.period;
                self.frequencies = Some(Frequencies {
                    omega_theta,
                    omega_zeta: outcome.omega_zeta,
                    qkinetic: outcome.omega_zeta / omega_theta,
                });
                self.orbit_type = outcome.orbit_type;
                self.status = IntegrationStatus::SinglePeriodIntegrated;
            }
            Err(err) => {
                self.status = failure_status(&err, bfield.psip_wall);
                self.orbit_type = OrbitType::Undefined;
            }
        }

        self.evolution.duration = start.elapsed();
        self.evolution.finish();
        Ok(())
    }
}

pub(crate) fn cancelled(cancel: Option<&AtomicBool>) -> bool {
    cancel.is_some_and(|flag| flag.load(Ordering::Relaxed))
}

/// Converts a driver error into the status recorded on the particle.
///
/// A domain error with the query off the [0, ψp_wall] interval means the
/// particle left the plasma; any other non-finite evaluation is an
/// interpolation blowup.
fn failure_status(err: &ParticleError, psip_wall: f64) -> IntegrationStatus {
    let escaped = |x: f64| x < 0.0 || x > psip_wall;
    match err {
        ParticleError::Domain(d) if escaped(d.x) => IntegrationStatus::Escaped,
        ParticleError::Eq(EqError::Domain(d)) if escaped(d.x) => IntegrationStatus::Escaped,
        ParticleError::Domain(_) | ParticleError::Eq(EqError::Domain(_)) => {
            IntegrationStatus::EvaluationNaN
        }
        ParticleError::EvaluationNaN => IntegrationStatus::EvaluationNaN,
        ParticleError::TimedOut => IntegrationStatus::TimedOut,
        ParticleError::InvalidIntersections => IntegrationStatus::InvalidIntersections,
        ParticleError::Cancelled => IntegrationStatus::Failed("cancelled".into()),
        other => IntegrationStatus::Failed(format!("{other:?}").into()),
    }
}

impl std::fmt::Debug for Particle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Particle")
            .field("initial", &self.initial_conditions)
            .field("status", &self.status)
            .field("orbit type", &self.orbit_type)
            .field("frequencies", &self.frequencies)
            .field("initial energy", &self.initial_state.energy())
            .field("final energy", &self.final_state.energy())
            .field("evolution", &self.evolution)
            .finish()
    }
}
