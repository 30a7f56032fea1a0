use interpolation::Hermite;

use crate::{Result, State};

/// Dense output over one accepted step: a degree-7 Hermite interpolant per
/// component of (θ, ψp, ρ, ζ), through the values and time derivatives at
/// four nodes of the step.
pub(crate) struct DenseStep {
    pub t0: f64,
    pub t1: f64,
    components: [Hermite; 4],
}

impl DenseStep {
    /// Fits the interpolants through four evaluated states with increasing
    /// times.
    pub fn fit(states: [&State; 4]) -> Result<Self> {
        let ts: [f64; 4] = std::array::from_fn(|n| states[n].time);

        let fit_component = |d: usize| -> Result<Hermite> {
            let ys: [f64; 4] = std::array::from_fn(|n| states[n].coordinates()[d]);
            let dys: [f64; 4] = std::array::from_fn(|n| states[n].derivatives()[d]);
            Ok(Hermite::fit(&ts, &ys, &dys)?)
        };

        Ok(Self {
            t0: ts[0],
            t1: ts[3],
            components: [
                fit_component(0)?,
                fit_component(1)?,
                fit_component(2)?,
                fit_component(3)?,
            ],
        })
    }

    /// The interpolated (θ, ψp, ρ, ζ) at `t`.
    pub fn eval(&self, t: f64) -> [f64; 4] {
        std::array::from_fn(|d| self.components[d].eval(t))
    }

    /// One interpolated component at `t` (0 = θ, 1 = ψp, 2 = ρ, 3 = ζ).
    pub fn eval_component(&self, d: usize, t: f64) -> f64 {
        self.components[d].eval(t)
    }
}
