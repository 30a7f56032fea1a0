//! Single-period integration: finds the smallest T > 0 for which the orbit
//! closes in the (θ mod 2π, ψp) plane and accumulates the orbit average of
//! dζ/dt along the way.
//!
//! The detector watches recrossings of the starting θ with the same
//! direction as the initial poloidal velocity. At every such crossing the
//! orbit has either returned to (θ₀, ψp₀) — the closure of both trapped and
//! passing orbits — or, for orbits that never reversed direction, completed
//! one poloidal revolution, which defines the period of a drifting passing
//! orbit.

use std::sync::atomic::AtomicBool;

use crate::particle::cancelled;
use crate::solver::{AngleEvent, EventAngle, Solver};
use crate::{OrbitType, Particle, ParticleError, Result, Time};

pub(crate) struct SinglePeriodOutcome {
    /// The orbit period T.
    pub period: Time,
    /// The orbit average ⟨dζ/dt⟩ over the period (trapezoidal rule over the
    /// accepted steps).
    pub omega_zeta: f64,
    pub orbit_type: OrbitType,
}

pub(crate) fn single_period_integrate(
    particle: &mut Particle,
    solver: &mut Solver,
    cancel: Option<&AtomicBool>,
) -> Result<SinglePeriodOutcome> {
    let state0 = &particle.initial_state;
    let (t0, theta0, psip0) = (state0.time, state0.theta, state0.psip);
    let direction = if state0.theta_dot >= 0.0 { 1.0 } else { -1.0 };
    let psip_wall = solver.bfield.psip_wall;

    let mut event = AngleEvent::new(EventAngle::Theta, theta0).with_direction(direction);

    let mut state = particle.initial_state.clone();
    let mut zeta_integral = 0.0;
    let mut reversed = false;

    loop {
        if particle.evolution.steps_taken() >= config::MAX_STEPS {
            return Err(ParticleError::TimedOut);
        }
        if cancelled(cancel) {
            return Err(ParticleError::Cancelled);
        }

        let step = solver.step(&state, event.step_cap(&state))?;
        particle.evolution.steps += 1;
        if step.state.theta_dot * direction < 0.0 {
            reversed = true;
        }

        if event.brackets(&state, &step.state) {
            if let Some(crossing) = event.locate(solver, &state, &step)? {
                // θ is on the section by construction; the orbit closes when
                // ψp has come back too. Orbits that never reversed are
                // periodic in (θ mod 2π) alone and accept the first
                // same-direction recrossing as their period.
                let closes = ((crossing.psip - psip0) / psip_wall).abs() < config::CLOSURE_RTOL;
                if closes || !reversed {
                    zeta_integral += 0.5
                        * (state.zeta_dot + crossing.zeta_dot)
                        * (crossing.time - state.time);
                    particle.evolution.push_state(&crossing);

                    let period = crossing.time - t0;
                    let outcome = SinglePeriodOutcome {
                        period,
                        omega_zeta: zeta_integral / period,
                        orbit_type: match reversed {
                            true => OrbitType::Trapped,
                            false => OrbitType::Passing,
                        },
                    };
                    particle.final_state = crossing;
                    return Ok(outcome);
                }
            }
        }

        zeta_integral += 0.5 * (state.zeta_dot + step.state.zeta_dot) * step.h;
        particle.evolution.push_state(&step.state);
        state = step.state;
    }
}
