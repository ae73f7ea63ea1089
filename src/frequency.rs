//! Perturbative QNM frequency model
//!
//! omega(eps) = omega0 + (alpha1 eps + alpha2 eps^2) + i (beta1 eps + beta2 eps^2)

use num_complex::Complex64;

use crate::interp::interpolate;
use crate::template::{ModeKey, QnmEntry, TemplateStore};
use crate::RingdownError;

impl QnmEntry {
    /// Reference frequency `omega0` (no hair).
    pub fn reference_frequency(&self) -> Complex64 {
        Complex64::new(self.omega0_real, self.omega0_imag)
    }

    /// Quadratic frequency shift for hair fraction `eps`.
    pub fn frequency_shift(&self, eps: f64) -> Complex64 {
        let eps2 = eps * eps;
        Complex64::new(
            self.alpha1 * eps + self.alpha2 * eps2,
            self.beta1 * eps + self.beta2 * eps2,
        )
    }

    /// Corrected complex frequency for hair fraction `eps`.
    pub fn corrected_frequency(&self, eps: f64) -> Complex64 {
        self.reference_frequency() + self.frequency_shift(eps)
    }
}

/// Admissible range of the hair fraction.
///
/// The quadratic model is only meaningful for small `eps`; `Unbounded`
/// accepts any value, `MaxAbs` rejects `|eps|` above the given bound.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum EpsBound {
    #[default]
    Unbounded,
    MaxAbs(f64),
}

impl EpsBound {
    pub fn from_max_abs(max_abs: Option<f64>) -> Self {
        max_abs.map_or(Self::Unbounded, Self::MaxAbs)
    }

    pub fn check(&self, eps: f64) -> Result<(), RingdownError> {
        match *self {
            Self::Unbounded => Ok(()),
            Self::MaxAbs(max_abs) if eps.is_finite() && eps.abs() <= max_abs => Ok(()),
            Self::MaxAbs(max_abs) => Err(RingdownError::EpsOutOfBounds { eps, max_abs }),
        }
    }
}

/// Complex frequency of `mode` at `spin` with hair fraction `eps`.
pub fn frequency(
    store: &TemplateStore,
    mode: ModeKey,
    spin: f64,
    eps: f64,
) -> Result<Complex64, RingdownError> {
    let entry = interpolate(store, mode, spin)?;
    Ok(entry.corrected_frequency(eps))
}

/// Like [`frequency`], rejecting `eps` outside `bound` before any lookup.
pub fn frequency_with_bound(
    store: &TemplateStore,
    mode: ModeKey,
    spin: f64,
    eps: f64,
    bound: EpsBound,
) -> Result<Complex64, RingdownError> {
    bound.check(eps)?;
    frequency(store, mode, spin, eps)
}

/// Complex frequency of mode `(l, n)` at spin `spin` and hair fraction `eps`.
pub fn get_frequency(
    store: &TemplateStore,
    spin: f64,
    l: u32,
    n: u32,
    eps: f64,
) -> Result<Complex64, RingdownError> {
    frequency(store, ModeKey::new(l, n), spin, eps)
}
