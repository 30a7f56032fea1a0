use std::f64::consts::TAU;

use equilibrium::HarmonicCache;
use equilibrium::{Bfield, Currents, Perturbation, Qfactor};
use interpolation::{Accelerator, Cache};

use crate::Result;
use crate::{Energy, Flux, InitialConditions, Length, MagneticMoment, Radians, Time};

/// The per-worker evaluation caches: bracket accelerators for the two grid
/// directions, the 2D patch cache, and one [`HarmonicCache`] per mode.
///
/// A [`State`] owns one set, so cloning a state hands the clone warm caches
/// while the equilibrium objects themselves stay shared and read-only.
#[derive(Clone, Default)]
pub struct EvaluationCaches {
    /// Bracket cache of the ψp grid direction.
    pub psip: Accelerator,
    /// Bracket cache of the θ grid direction.
    pub theta: Accelerator,
    /// The 2D interpolation patch cache.
    pub patch: Cache,
    /// One cache per harmonic of the [`Perturbation`].
    pub harmonics: Vec<HarmonicCache>,
}

/// Every equilibrium and perturbation quantity interpolated at one
/// (ψp, θ, ζ) point.
#[derive(Clone, Debug)]
pub struct FieldSample {
    /// The toroidal flux `ψ(ψp)`.
    pub psi: Flux,
    /// The safety factor `q(ψp)`.
    pub q: f64,
    /// The toroidal plasma current `g(ψp)`.
    pub g: f64,
    /// The poloidal plasma current `I(ψp)`.
    pub i: f64,
    /// `𝜕g/𝜕ψp`.
    pub dg_dpsip: f64,
    /// `𝜕I/𝜕ψp`.
    pub di_dpsip: f64,
    /// The field strength `B(ψp, θ)`.
    pub b: f64,
    /// `𝜕B/𝜕ψp`.
    pub db_dpsip: f64,
    /// `𝜕B/𝜕θ`.
    pub db_dtheta: f64,
    /// `𝜕B/𝜕ζ`. Always 0 in an axisymmetric equilibrium.
    pub db_dzeta: f64,
    /// The perturbation `p` (sum of harmonics).
    pub p: f64,
    /// `𝜕p/𝜕ψp`.
    pub dp_dpsip: f64,
    /// `𝜕p/𝜕θ`.
    pub dp_dtheta: f64,
    /// `𝜕p/𝜕ζ`.
    pub dp_dzeta: f64,
    /// `𝜕p/𝜕t`. Static perturbations do not drift in time.
    pub dp_dt: f64,
}

impl FieldSample {
    /// Interpolates every field quantity at (ψp, θ, ζ). The angles must
    /// already be reduced to [0, 2π).
    fn at(
        psip: Flux,
        theta: Radians,
        zeta: Radians,
        qfactor: &Qfactor,
        currents: &Currents,
        bfield: &Bfield,
        perturbation: &Perturbation,
        caches: &mut EvaluationCaches,
    ) -> Result<Self> {
        // The number of harmonics is not known before the first evaluation;
        // the caches follow the state through clones afterwards.
        if caches.harmonics.len() != perturbation.len() {
            caches.harmonics = perturbation.make_caches();
        }

        Ok(Self {
            psi: qfactor.psi(psip, &mut caches.psip)?,
            q: qfactor.q(psip, &mut caches.psip)?,
            g: currents.g(psip, &mut caches.psip)?,
            i: currents.i(psip, &mut caches.psip)?,
            dg_dpsip: currents.dg_dpsip(psip, &mut caches.psip)?,
            di_dpsip: currents.di_dpsip(psip, &mut caches.psip)?,
            b: bfield.b(psip, theta, &mut caches.psip, &mut caches.theta, &mut caches.patch)?,
            db_dpsip: bfield.db_dpsip(
                psip,
                theta,
                &mut caches.psip,
                &mut caches.theta,
                &mut caches.patch,
            )?,
            db_dtheta: bfield.db_dtheta(
                psip,
                theta,
                &mut caches.psip,
                &mut caches.theta,
                &mut caches.patch,
            )?,
            db_dzeta: 0.0,
            p: perturbation.p(psip, theta, zeta, &mut caches.harmonics, &mut caches.psip)?,
            dp_dpsip: perturbation.dp_dpsip(
                psip,
                theta,
                zeta,
                &mut caches.harmonics,
                &mut caches.psip,
            )?,
            dp_dtheta: perturbation.dp_dtheta(
                psip,
                theta,
                zeta,
                &mut caches.harmonics,
                &mut caches.psip,
            )?,
            dp_dzeta: perturbation.dp_dzeta(
                psip,
                theta,
                zeta,
                &mut caches.harmonics,
                &mut caches.psip,
            )?,
            dp_dt: perturbation.dp_dt(
                psip,
                theta,
                zeta,
                &mut caches.harmonics,
                &mut caches.psip,
            )?,
        })
    }
}

impl Default for FieldSample {
    /// All quantities start as NaN and are only defined after an
    /// interpolation.
    fn default() -> Self {
        Self {
            psi: f64::NAN,
            q: f64::NAN,
            g: f64::NAN,
            i: f64::NAN,
            dg_dpsip: f64::NAN,
            di_dpsip: f64::NAN,
            b: f64::NAN,
            db_dpsip: f64::NAN,
            db_dtheta: f64::NAN,
            db_dzeta: f64::NAN,
            p: f64::NAN,
            dp_dpsip: f64::NAN,
            dp_dtheta: f64::NAN,
            dp_dzeta: f64::NAN,
            dp_dt: f64::NAN,
        }
    }
}

/// The guiding-center velocities (θ̇, ψ̇p, ρ̇, ζ̇) at one phase-space point.
///
/// With the effective parallel momentum ρc = ρ + p, the canonical momenta
/// Pθ = ψ + ρc·I and Pζ = ρc·g − ψp couple the field gradients into a
/// linear system whose determinant divides every rate. The driving terms
/// are the parallel streaming ρB² and the mirror force (μ + ρ²B)·∇B; the
/// perturbation's angular gradients enter as a torque pushing ψp.
fn guiding_center_rates(f: &FieldSample, rho: Length, mu: MagneticMoment) -> [f64; 4] {
    let rho_c = rho + f.p;
    // ψp-derivatives of the canonical momenta, at fixed ρ.
    let dpzeta_dpsip = rho_c * f.dg_dpsip + f.g * f.dp_dpsip - 1.0;
    let dptheta_dpsip = rho_c * f.di_dpsip + f.i * f.dp_dpsip + f.q;
    let torque = f.g * f.dp_dtheta - f.i * f.dp_dzeta;
    let det = f.g * dptheta_dpsip - f.i * dpzeta_dpsip;

    let streaming = rho * f.b * f.b;
    let mirror = mu + rho * rho * f.b;
    let grad_psip = mirror * f.db_dpsip;
    let grad_theta = mirror * f.db_dtheta;
    let grad_zeta = mirror * f.db_dzeta;

    [
        (f.g * grad_psip - dpzeta_dpsip * streaming) / det,
        (torque * streaming - f.g * grad_theta + f.i * grad_zeta) / det,
        (dpzeta_dpsip * grad_theta - torque * grad_psip - dptheta_dpsip * grad_zeta) / det
            - f.dp_dt,
        (dptheta_dpsip * streaming - f.i * grad_psip) / det,
    ]
}

/// State of the system at a single point in configuration space: the
/// independent variables (t, θ, ψp, ρ, ζ) and constant μ, the
/// [`FieldSample`] interpolated there, and the derived diagnostics — the
/// canonical momenta and the 4-vector of time derivatives.
#[derive(Clone)]
pub struct State {
    /// The per-worker evaluation caches.
    pub caches: EvaluationCaches,

    /// The time of evaluation.
    pub time: Time,

    /// The `θ` angle.
    pub theta: Radians,
    /// The poloidal magnetic flux `ψp`.
    pub psip: Flux,
    /// The parallel gyroradius `ρ`.
    pub rho: Length,
    /// The `ζ` angle.
    pub zeta: Radians,
    /// The magnetic moment.
    pub mu: MagneticMoment,

    /// Every field quantity interpolated at (ψp, θ, ζ).
    pub fields: FieldSample,

    /// The canonical momentum `Pθ`.
    pub ptheta: f64,
    /// The canonical momentum `Pζ`.
    pub pzeta: f64,

    /// The `θ` angle time derivative.
    pub theta_dot: f64,
    /// The poloidal flux `ψp` time derivative.
    pub psip_dot: f64,
    /// The parallel gyroradius `ρ` time derivative.
    pub rho_dot: f64,
    /// The `ζ` angle time derivative.
    pub zeta_dot: f64,
}

impl State {
    /// Creates a non-evaluated [`State`] from an initial conditions set.
    pub fn from_initial(initial: &InitialConditions) -> Self {
        Self {
            time: initial.time0,
            theta: initial.theta0,
            psip: initial.psip0,
            rho: initial.rho0,
            zeta: initial.zeta0,
            mu: initial.mu,
            ..Default::default()
        }
    }

    /// Returns the state evaluated, consuming self.
    pub fn into_evaluated(
        mut self,
        qfactor: &Qfactor,
        currents: &Currents,
        bfield: &Bfield,
        perturbation: &Perturbation,
    ) -> Result<Self> {
        self.evaluate(qfactor, currents, bfield, perturbation)?;
        Ok(self)
    }

    /// Evaluates every quantity derived from (t, θ, ψp, ρ, ζ, μ): the field
    /// sample, the canonical momenta and the four time derivatives.
    pub fn evaluate(
        &mut self,
        qfactor: &Qfactor,
        currents: &Currents,
        bfield: &Bfield,
        perturbation: &Perturbation,
    ) -> Result<()> {
        let theta = self.theta.rem_euclid(TAU);
        let zeta = self.zeta.rem_euclid(TAU);
        self.fields = FieldSample::at(
            self.psip,
            theta,
            zeta,
            qfactor,
            currents,
            bfield,
            perturbation,
            &mut self.caches,
        )?;

        self.ptheta = self.fields.psi + self.rho * self.fields.i;
        self.pzeta = self.rho * self.fields.g - self.psip;
        [self.theta_dot, self.psip_dot, self.rho_dot, self.zeta_dot] =
            guiding_center_rates(&self.fields, self.rho, self.mu);

        self.check_finite()
    }

    fn check_finite(&self) -> Result<()> {
        let finite = self.theta_dot.is_finite()
            && self.psip_dot.is_finite()
            && self.rho_dot.is_finite()
            && self.zeta_dot.is_finite()
            && self.energy().is_finite();
        match finite {
            true => Ok(()),
            false => Err(crate::ParticleError::EvaluationNaN),
        }
    }

    /// The time derivatives as a 4-vector, in (θ, ψp, ρ, ζ) order.
    pub(crate) fn derivatives(&self) -> [f64; 4] {
        [self.theta_dot, self.psip_dot, self.rho_dot, self.zeta_dot]
    }

    /// The independent variables as a 4-vector, in (θ, ψp, ρ, ζ) order.
    pub(crate) fn coordinates(&self) -> [f64; 4] {
        [self.theta, self.psip, self.rho, self.zeta]
    }

    /// Overwrites the independent variables, invalidating every derived
    /// quantity until the next `evaluate()`.
    pub(crate) fn set_coordinates(&mut self, time: f64, y: &[f64; 4]) {
        self.time = time;
        self.theta = y[0];
        self.psip = y[1];
        self.rho = y[2];
        self.zeta = y[3];
    }

    pub fn energy(&self) -> Energy {
        self.parallel_energy() + self.perpendicular_energy()
    }

    pub fn parallel_energy(&self) -> Energy {
        0.5 * (self.rho * self.fields.b).powi(2)
    }

    pub fn perpendicular_energy(&self) -> Energy {
        self.mu * self.fields.b
    }
}

impl Default for State {
    fn default() -> Self {
        Self {
            caches: EvaluationCaches::default(),
            time: f64::NAN,
            theta: f64::NAN,
            psip: f64::NAN,
            rho: f64::NAN,
            zeta: f64::NAN,
            mu: f64::NAN,
            fields: FieldSample::default(),
            ptheta: f64::NAN,
            pzeta: f64::NAN,
            theta_dot: f64::NAN,
            psip_dot: f64::NAN,
            rho_dot: f64::NAN,
            zeta_dot: f64::NAN,
        }
    }
}

/// Keeps the caches out of the output.
impl std::fmt::Debug for State {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("State")
            .field("time", &self.time)
            .field("theta", &self.theta)
            .field("psip", &self.psip)
            .field("rho", &self.rho)
            .field("zeta", &self.zeta)
            .field("mu", &self.mu)
            .field("theta_dot", &self.theta_dot)
            .field("psip_dot", &self.psip_dot)
            .field("rho_dot", &self.rho_dot)
            .field("zeta_dot", &self.zeta_dot)
            .field("fields", &self.fields)
            .field("ptheta", &self.ptheta)
            .field("pzeta", &self.pzeta)
            .field("energy", &self.energy())
            .finish()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use float_cmp::assert_approx_eq;

    fn create_equilibrium() -> (Qfactor, Currents, Bfield, Perturbation) {
        let path = equilibrium::lar::test_file();
        (
            Qfactor::from_dataset(&path, "steffen").unwrap(),
            Currents::from_dataset(&path, "steffen").unwrap(),
            Bfield::from_dataset(&path, "bicubic").unwrap(),
            Perturbation::from_harmonics(&[]),
        )
    }

    fn evaluated_state(psip: f64, theta: f64, rho: f64, mu: f64) -> State {
        let (qfactor, currents, bfield, perturbation) = create_equilibrium();
        let initial = InitialConditions::new(0.0, theta, psip, rho, 0.0, mu);
        State::from_initial(&initial)
            .into_evaluated(&qfactor, &currents, &bfield, &perturbation)
            .unwrap()
    }

    #[test]
    fn test_axisymmetric_rates() {
        // With g = 1, I = 0 and no perturbation the system decouples:
        // ζ̇ = ρB², θ̇ = (ρB² + (μ+ρ²B)·∂B/∂ψp)/q and ψp drifts only
        // through ∂B/∂θ.
        let state = evaluated_state(0.02, 1.0, 0.01, 1e-5);
        let f = &state.fields;

        assert_approx_eq!(f64, f.g, 1.0, epsilon = 1e-10);
        assert_approx_eq!(f64, f.i, 0.0, epsilon = 1e-10);

        let mirror = state.mu + state.rho * state.rho * f.b;
        let streaming = state.rho * f.b * f.b;
        assert_approx_eq!(f64, state.zeta_dot, streaming, epsilon = 1e-9);
        assert_approx_eq!(
            f64,
            state.theta_dot,
            (streaming + mirror * f.db_dpsip) / f.q,
            epsilon = 1e-9
        );
        assert_approx_eq!(
            f64,
            state.psip_dot,
            -mirror * f.db_dtheta / f.q,
            epsilon = 1e-9
        );
        assert_approx_eq!(
            f64,
            state.rho_dot,
            -mirror * f.db_dtheta / f.q,
            epsilon = 1e-9
        );
    }

    #[test]
    fn test_canonical_momenta_and_energy() {
        let state = evaluated_state(0.02, 3.14, 0.01, 0.0);

        assert_approx_eq!(f64, state.ptheta, state.fields.psi, epsilon = 1e-10);
        assert_approx_eq!(f64, state.pzeta, state.rho - state.psip, epsilon = 1e-10);
        assert_approx_eq!(
            f64,
            state.energy(),
            0.5 * (state.rho * state.fields.b).powi(2),
            epsilon = 1e-15
        );
    }

    #[test]
    fn test_out_of_grid_is_domain_error() {
        let (qfactor, currents, bfield, perturbation) = create_equilibrium();
        let initial = InitialConditions::new(0.0, 1.0, 2.0 * qfactor.psip_wall(), 0.01, 0.0, 0.0);
        let result = State::from_initial(&initial)
            .into_evaluated(&qfactor, &currents, &bfield, &perturbation);
        assert!(matches!(
            result.unwrap_err(),
            crate::ParticleError::Domain(_) | crate::ParticleError::Eq(_)
        ));
    }
}
