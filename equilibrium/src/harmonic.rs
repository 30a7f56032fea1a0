use std::path::{Path, PathBuf};
use std::str::FromStr;

use interpolation::{Accelerator, Interp1dType, Spline1d};
use ndarray::Array1;
use utils::array1D_getter_impl;

use crate::{EqError, Result};
use crate::{Flux, Radians};

/// How a harmonic's phase `φ(ψp)` is resolved from the tabulated phase array
/// (case-insensitive string tags). There is deliberately no default; the
/// caller must pick one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhaseMethod {
    /// φ ≡ 0.
    Zero,
    /// φ ≡ the arithmetic mean of the tabulated phases.
    Average,
    /// φ ≡ φ(ψp*), where ψp* solves q(ψp*) = m/n. Construction fails with
    /// [`EqError::NoResonance`] if no such root exists inside the plasma.
    Resonance,
    /// φ(ψp) interpolated like any other 1D profile.
    Interpolation,
}

impl FromStr for PhaseMethod {
    type Err = EqError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "zero" => Ok(Self::Zero),
            "average" => Ok(Self::Average),
            "resonance" => Ok(Self::Resonance),
            "interpolation" => Ok(Self::Interpolation),
            _ => Err(EqError::UnknownPhaseMethod(s.into())),
        }
    }
}

/// The resolved phase: a constant for `Zero`/`Average`/`Resonance`, a spline
/// for `Interpolation`.
enum Phase {
    Constant(Radians),
    Interpolated(Spline1d),
}

/// A single (m, n) perturbation harmonic reconstructed from a netCDF file:
///
/// `h(ψp, θ, ζ) = α(ψp)·cos(mθ - nζ - φ(ψp))`
///
/// with the amplitude α in Normalized Units (divided by R0).
pub struct Harmonic {
    /// Path to the netCDF file.
    pub path: PathBuf,
    /// Interpolation type.
    pub typ: Interp1dType,
    /// The poloidal mode number.
    pub m: i64,
    /// The toroidal mode number.
    pub n: i64,
    /// The phase policy this harmonic was built with.
    pub phase_method: PhaseMethod,

    /// Spline over the normalized amplitude data, as a function of ψp.
    pub a_spline: Spline1d,
    phase: Phase,
    /// The tabulated phase data, kept for extraction.
    phase_data: Vec<Radians>,

    /// The maximum of the amplitude values.
    pub amax: f64,
    /// The value of the poloidal flux ψp at the wall.
    pub psip_wall: Flux,
}

impl Harmonic {
    /// Constructs a [`Harmonic`] for the (`m`, `n`) mode from a netCDF file
    /// at `path`, with a spline of the (case-insensitive) `typ` interpolation
    /// type and the given phase policy.
    ///
    /// # Example
    /// ```no_run
    /// # use equilibrium::*;
    /// # use std::path::Path;
    /// #
    /// # fn main() -> Result<()> {
    /// let harmonic = Harmonic::from_dataset(Path::new("./data.nc"), "steffen", 1, 8, "zero")?;
    /// # Ok(())
    /// # }
    /// ```
    pub fn from_dataset(
        path: &Path,
        typ: &str,
        m: i64,
        n: i64,
        phase_method: &str,
    ) -> Result<Self> {
        use crate::extract::*;
        use config::netcdf_fields::*;

        // Make path absolute for display purposes.
        let path = std::path::absolute(path)?;
        let f = open(&path)?;

        let raxis = extract_scalar::<f64>(&f, RAXIS)?;
        let psip_data = extract_1d_array::<f64>(&f, PSIP)?.to_vec();
        let psip_wall = *psip_data.last().expect("grid is non-empty");

        let (alpha_raw, phase_raw) = extract_harmonic_arrays(&f, m, n)?;
        let a_data: Vec<f64> = alpha_raw.iter().map(|v| v / raxis).collect();
        let phase_data: Vec<f64> = phase_raw.to_vec();

        let typ: Interp1dType = typ.parse()?;
        let a_spline = Spline1d::build(typ, &psip_data, &a_data)?;

        let phase_method: PhaseMethod = phase_method.parse()?;
        let phase = match phase_method {
            PhaseMethod::Zero => Phase::Constant(0.0),
            PhaseMethod::Average => {
                Phase::Constant(phase_data.iter().sum::<f64>() / phase_data.len() as f64)
            }
            PhaseMethod::Resonance => {
                let q_data = extract_1d_array::<f64>(&f, Q)?.to_vec();
                let q_spline = Spline1d::build(typ, &psip_data, &q_data)?;
                let phase_spline = Spline1d::build(typ, &psip_data, &phase_data)?;
                let psip_res = resonance_root(&q_spline, m, n)?;
                let mut acc = Accelerator::new();
                Phase::Constant(phase_spline.eval(psip_res, &mut acc)?)
            }
            PhaseMethod::Interpolation => {
                Phase::Interpolated(Spline1d::build(typ, &psip_data, &phase_data)?)
            }
        };

        let amax = a_data.iter().fold(0.0_f64, |max, v| max.max(*v));

        Ok(Self {
            path,
            typ,
            m,
            n,
            phase_method,
            a_spline,
            phase,
            phase_data,
            amax,
            psip_wall,
        })
    }

    /// The resolved phase `φ(ψp)`.
    pub fn phase(&self, psip: Flux, acc: &mut Accelerator) -> Result<Radians> {
        match &self.phase {
            Phase::Constant(phi) => Ok(*phi),
            Phase::Interpolated(spline) => Ok(spline.eval(psip, acc)?),
        }
    }

    /// The resolved phase derivative `𝜕φ(ψp)/𝜕ψp`.
    pub fn dphase_dpsip(&self, psip: Flux, acc: &mut Accelerator) -> Result<f64> {
        match &self.phase {
            Phase::Constant(_) => Ok(0.0),
            Phase::Interpolated(spline) => Ok(spline.eval_deriv(psip, acc)?),
        }
    }
}

/// Memoizes the interpolations and trigonometry of the last evaluated
/// (ψp, θ, ζ) point. The five `h`/`dh_*` methods are usually queried at the
/// same point back to back, so this saves the repeated work.
#[derive(Clone, Debug)]
pub struct HarmonicCache {
    psip: f64,
    theta: f64,
    zeta: f64,
    alpha: f64,
    dalpha: f64,
    dphi: f64,
    cosine: f64,
    sine: f64,
    /// Number of evaluations answered from the cache.
    pub hits: usize,
    /// Number of evaluations that had to interpolate.
    pub misses: usize,
}

impl HarmonicCache {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Default for HarmonicCache {
    fn default() -> Self {
        Self {
            psip: f64::NAN,
            theta: f64::NAN,
            zeta: f64::NAN,
            alpha: f64::NAN,
            dalpha: f64::NAN,
            dphi: f64::NAN,
            cosine: f64::NAN,
            sine: f64::NAN,
            hits: 0,
            misses: 0,
        }
    }
}

// Evaluation
impl Harmonic {
    /// Fills `cache` with the values at (ψp, θ, ζ) unless it already holds
    /// them.
    fn prepare(
        &self,
        psip: Flux,
        theta: Radians,
        zeta: Radians,
        cache: &mut HarmonicCache,
        acc: &mut Accelerator,
    ) -> Result<()> {
        if cache.psip == psip && cache.theta == theta && cache.zeta == zeta {
            cache.hits += 1;
            return Ok(());
        }
        cache.misses += 1;

        cache.alpha = self.a_spline.eval(psip, acc)?;
        cache.dalpha = self.a_spline.eval_deriv(psip, acc)?;
        let phi = self.phase(psip, acc)?;
        cache.dphi = self.dphase_dpsip(psip, acc)?;

        let angle = self.m as f64 * theta - self.n as f64 * zeta - phi;
        (cache.sine, cache.cosine) = angle.sin_cos();

        cache.psip = psip;
        cache.theta = theta;
        cache.zeta = zeta;
        Ok(())
    }

    /// Calculates the harmonic `h = α(ψp)·cos(mθ - nζ - φ(ψp))`.
    pub fn h(
        &self,
        psip: Flux,
        theta: Radians,
        zeta: Radians,
        cache: &mut HarmonicCache,
        acc: &mut Accelerator,
    ) -> Result<f64> {
        self.prepare(psip, theta, zeta, cache, acc)?;
        Ok(cache.alpha * cache.cosine)
    }

    /// Calculates the harmonic derivative `𝜕h/𝜕ψp`.
    pub fn dh_dpsip(
        &self,
        psip: Flux,
        theta: Radians,
        zeta: Radians,
        cache: &mut HarmonicCache,
        acc: &mut Accelerator,
    ) -> Result<f64> {
        self.prepare(psip, theta, zeta, cache, acc)?;
        // The chain rule pulls in φ' for interpolated phases.
        Ok(cache.dalpha * cache.cosine + cache.alpha * cache.sine * cache.dphi)
    }

    /// Calculates the harmonic derivative `𝜕h/𝜕θ`.
    pub fn dh_dtheta(
        &self,
        psip: Flux,
        theta: Radians,
        zeta: Radians,
        cache: &mut HarmonicCache,
        acc: &mut Accelerator,
    ) -> Result<f64> {
        self.prepare(psip, theta, zeta, cache, acc)?;
        Ok(-(self.m as f64) * cache.alpha * cache.sine)
    }

    /// Calculates the harmonic derivative `𝜕h/𝜕ζ`.
    pub fn dh_dzeta(
        &self,
        psip: Flux,
        theta: Radians,
        zeta: Radians,
        cache: &mut HarmonicCache,
        acc: &mut Accelerator,
    ) -> Result<f64> {
        self.prepare(psip, theta, zeta, cache, acc)?;
        Ok(self.n as f64 * cache.alpha * cache.sine)
    }

    /// Calculates the harmonic derivative `𝜕h/𝜕t`. Static perturbations do
    /// not drift in time.
    #[allow(unused_variables)]
    pub fn dh_dt(
        &self,
        psip: Flux,
        theta: Radians,
        zeta: Radians,
        cache: &mut HarmonicCache,
        acc: &mut Accelerator,
    ) -> Result<f64> {
        Ok(0.0)
    }
}

// Data extraction
impl Harmonic {
    array1D_getter_impl!(psip_data, a_spline.xa, Flux);
    array1D_getter_impl!(a_data, a_spline.ya, f64);
    array1D_getter_impl!(phase_data, phase_data, Radians);
}

/// Locates ψp* with q(ψp*) = m/n by scanning the knots for a sign change and
/// bisecting inside the bracketing interval.
fn resonance_root(q_spline: &Spline1d, m: i64, n: i64) -> Result<Flux> {
    let target = m as f64 / n as f64;
    let mut acc = Accelerator::new();

    let residual = |psip: f64, acc: &mut Accelerator| -> Result<f64> {
        Ok(q_spline.eval(psip, acc)? - target)
    };

    let knots = &q_spline.xa;
    let mut bracket = None;
    for w in knots.windows(2) {
        let f0 = residual(w[0], &mut acc)?;
        let f1 = residual(w[1], &mut acc)?;
        if f0 == 0.0 {
            return Ok(w[0]);
        }
        if f0 * f1 <= 0.0 {
            bracket = Some((w[0], w[1], f0));
            break;
        }
    }
    let Some((mut lo, mut hi, f_lo)) = bracket else {
        return Err(EqError::NoResonance { m, n });
    };

    for _ in 0..64 {
        let mid = 0.5 * (lo + hi);
        let f_mid = residual(mid, &mut acc)?;
        if f_mid == 0.0 {
            return Ok(mid);
        }
        if f_lo * f_mid < 0.0 {
            hi = mid;
        } else {
            lo = mid;
        }
    }
    Ok(0.5 * (lo + hi))
}

impl Clone for Harmonic {
    fn clone(&self) -> Self {
        Self {
            path: self.path.clone(),
            typ: self.typ,
            m: self.m,
            n: self.n,
            phase_method: self.phase_method,
            a_spline: self.a_spline.clone(),
            phase: match &self.phase {
                Phase::Constant(phi) => Phase::Constant(*phi),
                Phase::Interpolated(spline) => Phase::Interpolated(spline.clone()),
            },
            phase_data: self.phase_data.clone(),
            amax: self.amax,
            psip_wall: self.psip_wall,
        }
    }
}

impl std::fmt::Debug for Harmonic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Harmonic")
            .field("path", &self.path)
            .field("typ", &self.typ.name())
            .field("m", &self.m)
            .field("n", &self.n)
            .field("phase_method", &self.phase_method)
            .field("α_max", &self.amax)
            .field("ψp_wall", &format!("{:.7}", self.psip_wall))
            .finish()
    }
}
