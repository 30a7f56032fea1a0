//! Adaptive embedded Runge-Kutta core with dense output and event
//! localization.

mod dense;
mod events;
mod tableau;

pub(crate) use dense::DenseStep;
pub(crate) use events::{AngleEvent, EventAngle};

use config::{ABS_TOL, REL_TOL};
use equilibrium::{Bfield, Currents, Perturbation, Qfactor};

use crate::{ParticleError, Result, State};
use tableau::{A, B7, B8, C, STAGES};

const SAFETY: f64 = 0.9;
/// PI controller exponents for an 8th-order error estimate.
const ALPHA: f64 = 1.0 / 8.0;
const BETA: f64 = 0.4 / 8.0;
/// Step scale clamps on acceptance.
const FAC_MIN: f64 = 0.2;
const FAC_MAX: f64 = 5.0;

/// An accepted step.
pub(crate) struct Step {
    /// The evaluated state at the end of the step.
    pub state: State,
    /// The size of the accepted step.
    pub h: f64,
}

/// The Prince-Dormand 8(7) stepper, borrowing the equilibrium bundle for
/// the duration of a drive.
pub(crate) struct Solver<'a> {
    pub qfactor: &'a Qfactor,
    pub currents: &'a Currents,
    pub bfield: &'a Bfield,
    pub perturbation: &'a Perturbation,

    k: [[f64; 4]; STAGES],
    /// Scratch state re-evaluated at every stage; keeps the interpolator
    /// caches warm across stages and steps.
    scratch: State,
    /// The current trial step size.
    h: f64,
    err_old: f64,
}

impl<'a> Solver<'a> {
    pub fn new(
        qfactor: &'a Qfactor,
        currents: &'a Currents,
        bfield: &'a Bfield,
        perturbation: &'a Perturbation,
    ) -> Self {
        Self {
            qfactor,
            currents,
            bfield,
            perturbation,
            k: [[0.0; 4]; STAGES],
            scratch: State::default(),
            h: config::FIRST_STEP,
            err_old: 1e-4,
        }
    }

    pub fn evaluate(&self, state: &mut State) -> Result<()> {
        state.evaluate(self.qfactor, self.currents, self.bfield, self.perturbation)
    }

    /// Performs one adaptive step from `state` (which must be evaluated),
    /// retrying with smaller trial steps until the embedded error estimate
    /// passes the tolerance. `h_cap` bounds the step size, so a driver can
    /// land exactly on a terminal time.
    pub fn step(&mut self, state: &State, h_cap: Option<f64>) -> Result<Step> {
        loop {
            let h = match h_cap {
                Some(cap) => self.h.min(cap),
                None => self.h,
            };
            if h <= 10.0 * f64::EPSILON * state.time.abs().max(1.0) {
                return Err(ParticleError::StepSizeUnderflow { time: state.time });
            }

            let (y8, err) = self.stages(state, h)?;

            if !err.is_finite() {
                // Overflowing stages; retry well below the current step.
                self.h = 0.1 * h;
                continue;
            }
            if err > 1.0 {
                // Reject: shrink and retry, no state advance.
                let fac = (SAFETY * err.powf(-ALPHA)).clamp(0.1, 1.0);
                self.h = h * fac;
                continue;
            }

            // Accept: PI update of the next trial step.
            let fac = (SAFETY * err.max(1e-30).powf(-ALPHA) * self.err_old.powf(BETA))
                .clamp(FAC_MIN, FAC_MAX);
            self.h = h * fac;
            self.err_old = err.max(1e-4);

            let mut next = self.scratch.clone();
            next.set_coordinates(state.time + h, &y8);
            next.mu = state.mu;
            self.evaluate(&mut next)?;
            return Ok(Step { state: next, h });
        }
    }

    /// Evaluates the 13 stages from `state` with step `h`, returning the
    /// 8th-order solution and the scaled error norm.
    fn stages(&mut self, state: &State, h: f64) -> Result<([f64; 4], f64)> {
        let y0 = state.coordinates();
        self.k[0] = state.derivatives();

        for s in 1..STAGES {
            let mut y = y0;
            for (d, yd) in y.iter_mut().enumerate() {
                let mut sum = 0.0;
                for j in 0..s {
                    sum += A[s][j] * self.k[j][d];
                }
                *yd += h * sum;
            }
            self.scratch.set_coordinates(state.time + C[s] * h, &y);
            self.scratch.mu = state.mu;
            self.scratch
                .evaluate(self.qfactor, self.currents, self.bfield, self.perturbation)?;
            self.k[s] = self.scratch.derivatives();
        }

        let mut y8 = y0;
        let mut err_norm = 0.0;
        for d in 0..4 {
            let mut sum8 = 0.0;
            let mut sum_err = 0.0;
            for s in 0..STAGES {
                sum8 += B8[s] * self.k[s][d];
                sum_err += (B8[s] - B7[s]) * self.k[s][d];
            }
            y8[d] = y0[d] + h * sum8;
            let scale = ABS_TOL + REL_TOL * y0[d].abs().max(y8[d].abs());
            err_norm += (h * sum_err / scale).powi(2);
        }

        Ok((y8, (err_norm / 4.0).sqrt()))
    }

    /// Re-integrates the step `[state0, state0 + h]` with two fixed h/3
    /// sub-steps and fits the degree-7 dense interpolant through the four
    /// resulting nodes. Only called when an event is bracketed, so the
    /// extra work stays off the unconditional hot path.
    pub fn dense(&mut self, state0: &State, step: &Step) -> Result<DenseStep> {
        let h3 = step.h / 3.0;
        let s1 = self.fixed_step(state0, h3)?;
        let s2 = self.fixed_step(&s1, h3)?;
        DenseStep::fit([state0, &s1, &s2, &step.state])
    }

    /// One fixed-size step with no error control.
    fn fixed_step(&mut self, state: &State, h: f64) -> Result<State> {
        let (y8, _) = self.stages(state, h)?;
        let mut next = self.scratch.clone();
        next.set_coordinates(state.time + h, &y8);
        next.mu = state.mu;
        self.evaluate(&mut next)?;
        Ok(next)
    }
}
