//! Large-aspect-ratio stub equilibrium generator.
//!
//! Writes a complete equilibrium NetCDF file from the analytical LAR
//! formulas, with a parabolic q-profile (linear in ψp), analytic currents
//! g ≡ B0·R0, I ≡ 0 and gaussian perturbation amplitude profiles. The
//! Jacobian is tabulated as the normalized field strength as a placeholder
//! and should not be used as ground truth.
//!
//! This is the fixture generator used by tests across the workspace.

use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use config::netcdf_fields::*;

use crate::NcError;

/// Parameters of the LAR stub equilibrium.
#[derive(Debug, Clone)]
pub struct LarEquilibrium {
    /// Safety factor on the magnetic axis.
    pub q0: f64,
    /// Safety factor at the wall.
    pub q_wall: f64,
    /// Minor radius `a` **in \[m\]**.
    pub minor_radius: f64,
    /// Major radius `R0` **in \[m\]**.
    pub major_radius: f64,
    /// Field strength on the axis **in \[T\]**.
    pub baxis: f64,
    /// Number of ψp grid points.
    pub n_psip: usize,
    /// Number of θ grid points over [0, 2π].
    pub n_theta: usize,
    /// The (m, n) modes tabulated in the perturbation arrays.
    pub modes: Vec<(i64, i64)>,
    /// Peak of the normalized gaussian amplitude profiles.
    pub alpha_peak: f64,
    /// The convention version attribute to write.
    pub convention: String,
}

impl Default for LarEquilibrium {
    fn default() -> Self {
        Self {
            q0: 1.1,
            q_wall: 1.9,
            minor_radius: 0.5,
            major_radius: 1.75,
            baxis: 1.5,
            n_psip: 101,
            n_theta: 65,
            modes: vec![(1, 8), (1, 9), (3, 2)],
            alpha_peak: 1e-4,
            convention: config::CONVENTION_VERSION.into(),
        }
    }
}

impl LarEquilibrium {
    /// ψp at the wall: `(a/R0)²/2` in Normalized Units.
    pub fn psip_wall(&self) -> f64 {
        let eps = self.minor_radius / self.major_radius;
        eps * eps / 2.0
    }

    /// q(ψp): parabolic in r, hence linear in ψp.
    pub fn q(&self, psip: f64) -> f64 {
        self.q0 + (self.q_wall - self.q0) * psip / self.psip_wall()
    }

    /// ψ(ψp) = ∫ q dψp.
    pub fn psi(&self, psip: f64) -> f64 {
        self.q0 * psip + (self.q_wall - self.q0) * psip * psip / (2.0 * self.psip_wall())
    }

    /// Normalized minor radius r̂(ψp) = √(2ψp).
    pub fn r_norm(&self, psip: f64) -> f64 {
        (2.0 * psip).sqrt()
    }

    /// Writes the stub file at `path`, truncating any existing file.
    pub fn write(&self, path: &Path) -> Result<(), NcError> {
        let mut f = netcdf::create(path)?;
        f.add_attribute(CONVENTION, self.convention.as_str())?;

        let psipw = self.psip_wall();
        let psip: Vec<f64> = (0..self.n_psip)
            .map(|i| psipw * i as f64 / (self.n_psip - 1) as f64)
            .collect();
        let theta: Vec<f64> = (0..self.n_theta)
            .map(|j| std::f64::consts::TAU * j as f64 / (self.n_theta - 1) as f64)
            .collect();

        f.add_dimension(PSIP_NORM, self.n_psip)?;
        f.add_dimension(THETA, self.n_theta)?;
        f.add_dimension(PSI_NORM, self.n_psip)?;
        f.add_dimension(R_NORM, self.n_psip)?;

        f.add_variable::<f64>(BAXIS, &[])?.put_values(&[self.baxis], ..)?;
        f.add_variable::<f64>(RAXIS, &[])?
            .put_values(&[self.major_radius], ..)?;
        f.add_variable::<f64>(ZAXIS, &[])?.put_values(&[0.0], ..)?;
        f.add_variable::<f64>(RGEO, &[])?
            .put_values(&[self.major_radius], ..)?;

        f.add_variable::<f64>(THETA, &[THETA])?.put_values(&theta, ..)?;
        f.add_variable::<f64>(PSIP, &[PSIP_NORM])?.put_values(&psip, ..)?;

        let q: Vec<f64> = psip.iter().map(|&p| self.q(p)).collect();
        let psi: Vec<f64> = psip.iter().map(|&p| self.psi(p)).collect();
        let r: Vec<f64> = psip
            .iter()
            .map(|&p| self.major_radius * self.r_norm(p))
            .collect();
        let g0 = self.baxis * self.major_radius;
        let g: Vec<f64> = vec![g0; self.n_psip];
        let i_cur: Vec<f64> = vec![0.0; self.n_psip];

        f.add_variable::<f64>(Q, &[PSIP_NORM])?.put_values(&q, ..)?;
        f.add_variable::<f64>(PSI, &[PSI_NORM])?.put_values(&psi, ..)?;
        f.add_variable::<f64>(R, &[R_NORM])?.put_values(&r, ..)?;
        f.add_variable::<f64>(G, &[PSIP_NORM])?.put_values(&g, ..)?;
        f.add_variable::<f64>(I, &[PSIP_NORM])?.put_values(&i_cur, ..)?;

        // 2D variables, row-major over (psip_norm, theta).
        let nij = self.n_psip * self.n_theta;
        let mut b = Vec::with_capacity(nij);
        let mut rlab = Vec::with_capacity(nij);
        let mut zlab = Vec::with_capacity(nij);
        let mut jacobian = Vec::with_capacity(nij);
        for &p in &psip {
            let rn = self.r_norm(p);
            for &th in &theta {
                let b_norm = 1.0 - rn * th.cos();
                b.push(self.baxis * b_norm);
                rlab.push(self.major_radius * (1.0 + rn * th.cos()));
                zlab.push(self.major_radius * rn * th.sin());
                // FIXME: placeholder, not the true boozer Jacobian
                jacobian.push(b_norm);
            }
        }
        let dims2d = [PSIP_NORM, THETA];
        f.add_variable::<f64>(B, &dims2d)?.put_values(&b, ..)?;
        f.add_variable::<f64>(RLAB, &dims2d)?.put_values(&rlab, ..)?;
        f.add_variable::<f64>(ZLAB, &dims2d)?.put_values(&zlab, ..)?;
        f.add_variable::<f64>(JACOBIAN, &dims2d)?
            .put_values(&jacobian, ..)?;

        // Perturbation arrays over every (m, n) combination; modes not in the
        // list get a zero amplitude.
        let mut ms: Vec<i64> = self.modes.iter().map(|&(m, _)| m).collect();
        let mut ns: Vec<i64> = self.modes.iter().map(|&(_, n)| n).collect();
        ms.sort_unstable();
        ms.dedup();
        ns.sort_unstable();
        ns.dedup();

        f.add_dimension(M, ms.len())?;
        f.add_dimension(N, ns.len())?;
        f.add_variable::<i64>(M, &[M])?;
        f.add_variable::<i64>(N, &[N])?;
        if !ms.is_empty() {
            f.variable_mut(M).expect("just added").put_values(&ms, ..)?;
            f.variable_mut(N).expect("just added").put_values(&ns, ..)?;
        }

        let mean = psipw / 2.0;
        let sigma = psipw / 4.0;
        let mut alphas = Vec::with_capacity(ms.len() * ns.len() * self.n_psip);
        let mut phases = Vec::with_capacity(ms.len() * ns.len() * self.n_psip);
        for &m in &ms {
            for &n in &ns {
                let tabulated = self.modes.contains(&(m, n));
                for &p in &psip {
                    let gauss = (-(p - mean).powi(2) / (2.0 * sigma * sigma)).exp();
                    let amp = if tabulated { self.alpha_peak * gauss } else { 0.0 };
                    alphas.push(self.major_radius * amp);
                    phases.push(0.3 + 0.2 * p / psipw);
                }
            }
        }
        let dims3d = [M, N, PSIP_NORM];
        f.add_variable::<f64>(ALPHAS, &dims3d)?;
        f.add_variable::<f64>(PHASES, &dims3d)?;
        if !alphas.is_empty() {
            f.variable_mut(ALPHAS)
                .expect("just added")
                .put_values(&alphas, ..)?;
            f.variable_mut(PHASES)
                .expect("just added")
                .put_values(&phases, ..)?;
        }

        Ok(())
    }
}

/// Path to a process-wide default LAR stub file, written on first use.
pub fn test_file() -> PathBuf {
    static TEST_FILE: OnceLock<PathBuf> = OnceLock::new();
    TEST_FILE
        .get_or_init(|| {
            let path = std::env::temp_dir().join(format!(
                "lar_equilibrium_{}.nc",
                std::process::id()
            ));
            LarEquilibrium::default()
                .write(&path)
                .expect("could not write the LAR stub equilibrium");
            path
        })
        .clone()
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_lar_profile_values() {
        let lar = LarEquilibrium::default();
        assert!((lar.psip_wall() - 0.040816).abs() < 1e-5);
        assert_eq!(lar.q(0.0), 1.1);
        assert!((lar.q(lar.psip_wall()) - 1.9).abs() < 1e-12);
        assert_eq!(lar.psi(0.0), 0.0);
        assert!((lar.r_norm(lar.psip_wall()) - 2.0 / 7.0).abs() < 1e-12);
    }

    #[test]
    fn test_write_and_reopen() {
        let path = test_file();
        let f = crate::extract::open(&path).unwrap();
        assert_eq!(
            crate::extract::extract_scalar::<f64>(&f, BAXIS).unwrap(),
            1.5
        );
    }
}
