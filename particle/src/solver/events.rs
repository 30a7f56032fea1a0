//! Poincaré section crossing detection.
//!
//! The event function `g = sin((angle - α)/2)` vanishes exactly when the
//! watched angle equals α modulo 2π, with no branch cuts to special-case.
//! A sign change of g across an accepted step brackets a crossing, which is
//! then localized on the dense interpolant by bisection.

use config::EVENT_TOL;

use super::{DenseStep, Solver, Step};
use crate::{Radians, Result, State};

/// Which angle the section is defined on.
#[derive(Debug, Clone, Copy)]
pub(crate) enum EventAngle {
    Theta,
    Zeta,
}

impl EventAngle {
    /// Component index in the (θ, ψp, ρ, ζ) state vector.
    fn index(&self) -> usize {
        match self {
            Self::Theta => 0,
            Self::Zeta => 3,
        }
    }
}

/// Watches for crossings of `angle = α (mod 2π)` with a consistent
/// direction: only crossings whose angle velocity matches the reference
/// sign are counted. The reference is either prescribed (single-period
/// runs use the initial velocity) or taken from the first located crossing
/// (mapping runs).
pub(crate) struct AngleEvent {
    which: EventAngle,
    alpha: Radians,
    direction: Option<f64>,
}

impl AngleEvent {
    pub fn new(which: EventAngle, alpha: Radians) -> Self {
        Self {
            which,
            alpha,
            direction: None,
        }
    }

    pub fn with_direction(mut self, sign: f64) -> Self {
        self.direction = Some(sign.signum());
        self
    }

    fn g(&self, angle: Radians) -> f64 {
        ((angle - self.alpha) / 2.0).sin()
    }

    fn angle(&self, state: &State) -> Radians {
        state.coordinates()[self.which.index()]
    }

    fn angle_dot(&self, state: &State) -> f64 {
        state.derivatives()[self.which.index()]
    }

    /// A step cap keeping the watched angle from sweeping more than half a
    /// turn per step, so a crossing cannot slip through a single step
    /// unbracketed.
    pub fn step_cap(&self, state: &State) -> Option<f64> {
        let rate = self.angle_dot(state).abs();
        (rate > 0.0).then(|| std::f64::consts::PI / rate)
    }

    /// Whether `[prev, next]` brackets a crossing. An exact zero at `prev`
    /// is not a bracket; it was either the seed point or already located as
    /// the previous step's right end.
    pub fn brackets(&self, prev: &State, next: &State) -> bool {
        let g0 = self.g(self.angle(prev));
        let g1 = self.g(self.angle(next));
        g0 * g1 < 0.0 || (g1 == 0.0 && g0 != 0.0)
    }

    /// Localizes the bracketed crossing inside `step` and returns the
    /// evaluated state on the section, or `None` when the crossing runs
    /// against the reference direction.
    pub fn locate(
        &mut self,
        solver: &mut Solver,
        prev: &State,
        step: &Step,
    ) -> Result<Option<State>> {
        let dense = solver.dense(prev, step)?;
        let t_star = self.bisect(&dense);

        let mut crossing = step.state.clone();
        crossing.set_coordinates(t_star, &dense.eval(t_star));
        solver.evaluate(&mut crossing)?;

        let sign = self.angle_dot(&crossing).signum();
        match self.direction {
            None => {
                self.direction = Some(sign);
                Ok(Some(crossing))
            }
            Some(reference) if sign == reference => Ok(Some(crossing)),
            Some(_) => Ok(None),
        }
    }

    /// Bisects g over the dense interpolant down to [`EVENT_TOL`].
    fn bisect(&self, dense: &DenseStep) -> f64 {
        let index = self.which.index();
        let f = |t: f64| self.g(dense.eval_component(index, t));

        let (mut lo, mut hi) = (dense.t0, dense.t1);
        let f_lo = f(lo);
        if f(hi) == 0.0 {
            return hi;
        }

        while hi - lo > EVENT_TOL {
            let mid = 0.5 * (lo + hi);
            let f_mid = f(mid);
            if f_mid == 0.0 {
                return mid;
            }
            if f_lo * f_mid < 0.0 {
                hi = mid;
            } else {
                lo = mid;
            }
        }
        0.5 * (lo + hi)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn state_with(theta: f64, theta_dot: f64) -> State {
        State {
            theta,
            theta_dot,
            ..Default::default()
        }
    }

    #[test]
    fn test_bracketing() {
        use std::f64::consts::{PI, TAU};
        let event = AngleEvent::new(EventAngle::Theta, PI);

        assert!(event.brackets(&state_with(PI - 0.1, 1.0), &state_with(PI + 0.1, 1.0)));
        // Winding angles cross at every turn
        assert!(event.brackets(
            &state_with(3.0 * TAU + PI - 0.1, 1.0),
            &state_with(3.0 * TAU + PI + 0.1, 1.0)
        ));
        assert!(!event.brackets(&state_with(PI + 0.1, 1.0), &state_with(PI + 0.2, 1.0)));
        // An exact zero on the left end is not a (new) bracket
        assert!(!event.brackets(&state_with(PI, 1.0), &state_with(PI + 0.1, 1.0)));
        // No crossing at the antipode
        assert!(!event.brackets(&state_with(-0.1, 1.0), &state_with(0.1, 1.0)));
    }

    #[test]
    fn test_event_function_sign() {
        use std::f64::consts::PI;
        let event = AngleEvent::new(EventAngle::Theta, PI);
        assert_eq!(event.g(PI), 0.0);
        assert!(event.g(PI - 0.1) < 0.0);
        assert!(event.g(PI + 0.1) > 0.0);
    }
}
