use interpolation::Accelerator;

use crate::{Harmonic, HarmonicCache};
use crate::{Flux, Radians, Result};

/// An ordered sum of perturbation harmonics.
///
/// The empty perturbation is the axisymmetric system. Harmonic order is
/// observable through indexing but has no effect on the physics.
pub struct Perturbation {
    pub harmonics: Vec<Harmonic>,
}

// Creation and data extraction
impl Perturbation {
    pub fn from_harmonics(harmonics: &[Harmonic]) -> Self {
        Self {
            harmonics: harmonics.into(),
        }
    }

    /// The harmonic at `index`, in construction order.
    pub fn get(&self, index: usize) -> Option<&Harmonic> {
        self.harmonics.get(index)
    }

    pub fn len(&self) -> usize {
        self.harmonics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.harmonics.is_empty()
    }

    /// Allocates one [`HarmonicCache`] per harmonic, in matching order.
    pub fn make_caches(&self) -> Vec<HarmonicCache> {
        vec![HarmonicCache::new(); self.harmonics.len()]
    }
}

// Evaluation. Each method sums the corresponding harmonic term; `caches`
// must hold one entry per harmonic, in matching order.
macro_rules! perturbation_sum_impl {
    ($(#[$doc:meta])* $name:ident, $harmonic_method:ident) => {
        $(#[$doc])*
        pub fn $name(
            &self,
            psip: Flux,
            theta: Radians,
            zeta: Radians,
            caches: &mut [HarmonicCache],
            acc: &mut Accelerator,
        ) -> Result<f64> {
            self.harmonics
                .iter()
                .zip(caches.iter_mut())
                .try_fold(0.0, |sum, (harmonic, cache)| {
                    harmonic
                        .$harmonic_method(psip, theta, zeta, cache, acc)
                        .map(|v| sum + v)
                })
        }
    };
}

impl Perturbation {
    perturbation_sum_impl!(
        /// Calculates the perturbation `Σ α{m,n}(ψp)·cos(mθ - nζ - φ{m,n}(ψp))`.
        p, h
    );
    perturbation_sum_impl!(
        /// Calculates the perturbation derivative `𝜕p/𝜕ψp`.
        dp_dpsip, dh_dpsip
    );
    perturbation_sum_impl!(
        /// Calculates the perturbation derivative `𝜕p/𝜕θ`.
        dp_dtheta, dh_dtheta
    );
    perturbation_sum_impl!(
        /// Calculates the perturbation derivative `𝜕p/𝜕ζ`.
        dp_dzeta, dh_dzeta
    );
    perturbation_sum_impl!(
        /// Calculates the perturbation derivative `𝜕p/𝜕t`.
        dp_dt, dh_dt
    );
}

impl std::fmt::Debug for Perturbation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.harmonics.iter()).finish()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn create_harmonic() -> Harmonic {
        Harmonic::from_dataset(&crate::lar::test_file(), "steffen", 1, 8, "interpolation")
            .unwrap()
    }

    #[test]
    fn test_summation_linearity() {
        let single = Perturbation::from_harmonics(&[create_harmonic()]);
        let triple = Perturbation::from_harmonics(&[
            create_harmonic(),
            create_harmonic(),
            create_harmonic(),
        ]);

        let mut acc = Accelerator::new();
        let mut caches1 = single.make_caches();
        let mut caches3 = triple.make_caches();
        let psip = 0.5 * single.harmonics[0].psip_wall;
        let (theta, zeta) = (1.0, 1.0);

        macro_rules! check {
            ($method:ident) => {
                let one = single
                    .$method(psip, theta, zeta, &mut caches1, &mut acc)
                    .unwrap();
                let three = triple
                    .$method(psip, theta, zeta, &mut caches3, &mut acc)
                    .unwrap();
                assert_eq!(3.0 * one, three);
            };
        }
        check!(p);
        check!(dp_dpsip);
        check!(dp_dtheta);
        check!(dp_dzeta);
        check!(dp_dt);
    }

    #[test]
    fn test_empty_perturbation() {
        let per = Perturbation::from_harmonics(&[]);
        let mut acc = Accelerator::new();
        let mut caches = per.make_caches();

        assert!(per.is_empty());
        assert_eq!(per.p(0.01, 1.0, 1.0, &mut caches, &mut acc).unwrap(), 0.0);
        assert_eq!(
            per.dp_dtheta(0.01, 1.0, 1.0, &mut caches, &mut acc).unwrap(),
            0.0
        );
    }

    #[test]
    fn test_indexing() {
        let per = Perturbation::from_harmonics(&[create_harmonic()]);
        assert_eq!(per.len(), 1);
        assert_eq!(per.get(0).unwrap().m, 1);
        assert!(per.get(1).is_none());
        let _ = format!("{per:?}");
    }
}
