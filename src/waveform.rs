//! Ringdown waveform synthesis
//!
//! Superposes unit-amplitude, zero-phase damped cosinusoids
//! `exp(omega_I t) cos(omega_R t)`, one per requested mode, on a uniform
//! time grid starting at `t = 0`.

use num_complex::Complex64;
use serde::{Deserialize, Serialize};

use crate::frequency::frequency;
use crate::template::{ModeKey, TemplateStore};
use crate::RingdownError;

/// Amplitude shared by every mode.
pub const MODE_AMPLITUDE: f64 = 1.0;

/// A mode together with the complex frequency it was synthesized with.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ModeFrequency {
    pub mode: ModeKey,
    pub omega: Complex64,
}

impl ModeFrequency {
    /// Strain contributed by this mode at time `t`.
    pub fn contribution(&self, t: f64) -> f64 {
        MODE_AMPLITUDE * (self.omega.im * t).exp() * (self.omega.re * t).cos()
    }
}

/// Sampled ringdown strain.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Waveform {
    pub time: Vec<f64>,
    pub strain: Vec<f64>,
    /// Frequencies of the superposed modes, in request order
    pub components: Vec<ModeFrequency>,
}

impl Waveform {
    pub fn len(&self) -> usize {
        self.time.len()
    }

    pub fn is_empty(&self) -> bool {
        self.time.is_empty()
    }

    /// Largest absolute strain sample (0 for an empty waveform).
    pub fn peak_abs_strain(&self) -> f64 {
        self.strain.iter().fold(0.0, |acc, h| acc.max(h.abs()))
    }

    pub fn into_parts(self) -> (Vec<f64>, Vec<f64>) {
        (self.time, self.strain)
    }
}

/// Parameters of one waveform request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WaveformRequest {
    pub spin: f64,
    pub eps: f64,
    pub modes: Vec<ModeKey>,
    pub duration: f64,
    pub dt: f64,
}

impl Default for WaveformRequest {
    fn default() -> Self {
        Self {
            spin: 0.0,
            eps: 0.0,
            modes: vec![ModeKey::FUNDAMENTAL],
            duration: 0.1,
            dt: 1e-5,
        }
    }
}

/// Largest sample count a `Vec<f64>` can address.
const MAX_GRID_LEN: usize = isize::MAX as usize / std::mem::size_of::<f64>();

/// Uniform grid `t_i = i * dt` covering `[0, duration)`.
///
/// Grids longer than a `Vec<f64>` can hold, or that cannot be allocated,
/// are rejected with `InvalidTimeGrid`.
pub fn time_grid(duration: f64, dt: f64) -> Result<Vec<f64>, RingdownError> {
    let invalid = RingdownError::InvalidTimeGrid { duration, dt };
    if !(duration.is_finite() && dt.is_finite() && duration > 0.0 && dt > 0.0) {
        return Err(invalid);
    }

    let ratio = (duration / dt).ceil();
    if !ratio.is_finite() || ratio > MAX_GRID_LEN as f64 {
        return Err(invalid);
    }

    let mut len = ratio as usize;
    // ceil can land one step past the end when duration/dt rounds up
    while len > 0 && (len - 1) as f64 * dt >= duration {
        len -= 1;
    }

    let mut grid = Vec::new();
    grid.try_reserve_exact(len).map_err(|_| invalid)?;
    grid.extend((0..len).map(|i| i as f64 * dt));
    Ok(grid)
}

/// Sum the damped cosinusoids of `modes` at (`spin`, `eps`).
///
/// Every mode frequency is resolved before any sample is computed, so a
/// failing mode yields an error and no partial waveform.
pub fn synthesize(
    store: &TemplateStore,
    spin: f64,
    eps: f64,
    modes: &[ModeKey],
    duration: f64,
    dt: f64,
) -> Result<Waveform, RingdownError> {
    if modes.is_empty() {
        return Err(RingdownError::EmptyModeList);
    }

    let time = time_grid(duration, dt)?;

    let components = modes
        .iter()
        .map(|&mode| {
            frequency(store, mode, spin, eps).map(|omega| ModeFrequency { mode, omega })
        })
        .collect::<Result<Vec<_>, _>>()?;

    let mut strain = vec![0.0; time.len()];
    for component in &components {
        for (h, &t) in strain.iter_mut().zip(&time) {
            *h += component.contribution(t);
        }
    }

    log::debug!(
        "synthesized {} samples from {} modes at spin {spin}, eps {eps}",
        time.len(),
        components.len()
    );

    Ok(Waveform {
        time,
        strain,
        components,
    })
}

/// Synthesize the waveform described by `request`.
pub fn generate_waveform(
    store: &TemplateStore,
    request: &WaveformRequest,
) -> Result<Waveform, RingdownError> {
    synthesize(
        store,
        request.spin,
        request.eps,
        &request.modes,
        request.duration,
        request.dt,
    )
}
