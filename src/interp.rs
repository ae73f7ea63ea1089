//! Spin interpolation over the template table
//!
//! Lookups are exact at tabulated spins and linear in between. Queries outside
//! the tabulated spin range of a mode fail; there is no clamping and no
//! extrapolation.

use crate::template::{ModeKey, QnmEntry, TemplateStore};
use crate::RingdownError;

/// Absolute spin distance under which a tabulated entry is returned verbatim.
pub const SPIN_MATCH_TOLERANCE: f64 = 1e-6;

impl QnmEntry {
    /// Linear blend of every field between `self` (lower) and `upper`,
    /// evaluated at `spin`.
    pub fn lerp(&self, upper: &QnmEntry, spin: f64) -> QnmEntry {
        let frac = (spin - self.spin) / (upper.spin - self.spin);
        let mix = |lo: f64, hi: f64| lo + frac * (hi - lo);

        QnmEntry {
            spin,
            omega0_real: mix(self.omega0_real, upper.omega0_real),
            omega0_imag: mix(self.omega0_imag, upper.omega0_imag),
            alpha1: mix(self.alpha1, upper.alpha1),
            alpha2: mix(self.alpha2, upper.alpha2),
            beta1: mix(self.beta1, upper.beta1),
            beta2: mix(self.beta2, upper.beta2),
        }
    }
}

/// Reference entry for `mode` at `spin`.
///
/// # Errors
/// * `UnknownMode` if the mode is not tabulated
/// * `OutOfRange` if `spin` lies outside the mode's `[min, max]` spin range
pub fn interpolate(
    store: &TemplateStore,
    mode: ModeKey,
    spin: f64,
) -> Result<QnmEntry, RingdownError> {
    let entries = store.entries_for(mode)?;
    let (min, max) = store.spin_range(mode)?;

    let out_of_range = RingdownError::OutOfRange {
        mode,
        spin,
        min,
        max,
    };

    if !spin.is_finite() {
        return Err(out_of_range);
    }

    if let Some(entry) = entries
        .iter()
        .find(|entry| (entry.spin - spin).abs() < SPIN_MATCH_TOLERANCE)
    {
        return Ok(*entry);
    }

    if spin < min || spin > max {
        return Err(out_of_range);
    }

    // Exact hits are handled above, so spin lies strictly inside (min, max)
    // and the upper index is in 1..len.
    let upper_idx = entries.partition_point(|entry| entry.spin < spin);
    let lower = &entries[upper_idx - 1];
    let upper = &entries[upper_idx];

    Ok(lower.lerp(upper, spin))
}
