use crate::{Flux, Length, MagneticMoment, Radians, Time};

/// A particle's initial conditions. Immutable once created.
#[derive(Clone, Debug)]
pub struct InitialConditions {
    /// The initial time.
    pub time0: Time,
    /// The initial `θ` angle.
    pub theta0: Radians,
    /// The initial poloidal magnetic flux `ψp`.
    pub psip0: Flux,
    /// The initial parallel gyroradius `ρ`.
    pub rho0: Length,
    /// The initial `ζ` angle.
    pub zeta0: Radians,
    /// The magnetic moment `μ`.
    pub mu: MagneticMoment,
}

impl InitialConditions {
    pub fn new(
        time0: Time,
        theta0: Radians,
        psip0: Flux,
        rho0: Length,
        zeta0: Radians,
        mu: MagneticMoment,
    ) -> Self {
        Self {
            time0,
            theta0,
            psip0,
            rho0,
            zeta0,
            mu,
        }
    }
}
