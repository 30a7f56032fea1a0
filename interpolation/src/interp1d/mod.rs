mod akima;
mod cubic;
mod steffen;

use crate::error::check_domain;
use crate::{Accelerator, DomainError, Interp1dType, InterpolationError, Result, check_grid};

/// Per-interval cubic coefficients `y = y_i + dt·(b + dt·(c + dt·d))`.
///
/// Every non-linear 1D type reduces to this form once its knot derivatives
/// are known, so evaluation is shared and only construction differs.
#[derive(Debug, Clone, Default)]
pub(crate) struct PiecewiseCubic {
    pub b: Vec<f64>,
    pub c: Vec<f64>,
    pub d: Vec<f64>,
}

#[derive(Debug, Clone)]
enum Coeffs {
    Linear,
    Cubic(PiecewiseCubic),
}

/// A 1D spline owning its data and precomputed coefficients.
///
/// # Example
/// ```
/// # use interpolation::*;
/// #
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let xa: Vec<f64> = (0..16).map(|i| i as f64 / 3.0).collect();
/// let ya: Vec<f64> = xa.iter().map(|x| x.sin()).collect();
///
/// let spline = Spline1d::build(Interp1dType::Akima, &xa, &ya)?;
///
/// let mut acc = Accelerator::new();
/// let y = spline.eval(1.234, &mut acc)?;
/// let dy = spline.eval_deriv(1.234, &mut acc)?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct Spline1d {
    /// Interpolation type.
    pub typ: Interp1dType,
    /// The x data points, strictly increasing.
    pub xa: Vec<f64>,
    /// The y data points.
    pub ya: Vec<f64>,
    coeffs: Coeffs,
}

impl Spline1d {
    /// Constructs a [`Spline1d`], precomputing the interval coefficients.
    pub fn build(typ: Interp1dType, xa: &[f64], ya: &[f64]) -> Result<Self> {
        check_grid(xa, ya)?;
        if xa.len() < typ.min_size() {
            return Err(InterpolationError::NotEnoughPoints {
                typ: typ.name(),
                min_size: typ.min_size(),
                len: xa.len(),
            });
        }
        if matches!(typ, Interp1dType::CubicPeriodic | Interp1dType::AkimaPeriodic) {
            check_periodic(ya)?;
        }

        let coeffs = match typ {
            Interp1dType::Linear => Coeffs::Linear,
            Interp1dType::Cubic => Coeffs::Cubic(cubic::natural(xa, ya)),
            Interp1dType::CubicPeriodic => Coeffs::Cubic(cubic::periodic(xa, ya)),
            Interp1dType::Akima => Coeffs::Cubic(akima::compute(xa, ya, false)),
            Interp1dType::AkimaPeriodic => Coeffs::Cubic(akima::compute(xa, ya, true)),
            Interp1dType::Steffen => Coeffs::Cubic(steffen::compute(xa, ya)),
        };

        Ok(Self {
            typ,
            xa: xa.to_vec(),
            ya: ya.to_vec(),
            coeffs,
        })
    }

    /// Returns the interpolated value at `x`.
    pub fn eval(&self, x: f64, acc: &mut Accelerator) -> Result<f64, DomainError> {
        check_domain(&self.xa, x)?;
        let i = acc.find(&self.xa, x);
        let dt = x - self.xa[i];
        Ok(match &self.coeffs {
            Coeffs::Linear => self.ya[i] + dt * self.slope(i),
            Coeffs::Cubic(p) => {
                self.ya[i] + dt * (p.b[i] + dt * (p.c[i] + dt * p.d[i]))
            }
        })
    }

    /// Returns the interpolated derivative at `x`.
    pub fn eval_deriv(&self, x: f64, acc: &mut Accelerator) -> Result<f64, DomainError> {
        check_domain(&self.xa, x)?;
        let i = acc.find(&self.xa, x);
        let dt = x - self.xa[i];
        Ok(match &self.coeffs {
            Coeffs::Linear => self.slope(i),
            Coeffs::Cubic(p) => p.b[i] + dt * (2.0 * p.c[i] + 3.0 * dt * p.d[i]),
        })
    }

    fn slope(&self, i: usize) -> f64 {
        (self.ya[i + 1] - self.ya[i]) / (self.xa[i + 1] - self.xa[i])
    }
}

fn check_periodic(ya: &[f64]) -> Result<()> {
    let (first, last) = (ya[0], ya[ya.len() - 1]);
    if (first - last).abs() > 1e-12 * first.abs().max(1.0) {
        return Err(InterpolationError::NotPeriodic);
    }
    Ok(())
}

impl std::fmt::Debug for Spline1d {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Spline1d")
            .field("typ", &self.typ.name())
            .field("range", &(self.xa[0], self.xa[self.xa.len() - 1]))
            .field("len", &self.xa.len())
            .finish()
    }
}
