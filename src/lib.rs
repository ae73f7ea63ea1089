//! Ringdown - QNM frequency lookup and ringdown waveform synthesis
//!
//! Looks up quasinormal-mode reference frequencies from a tabulated set of
//! (mode, spin) entries, applies a quadratic correction in the hair fraction
//! `eps`, and sums exponentially decaying cosinusoids into a strain series.

pub mod frequency;
pub mod interp;
pub mod table;
pub mod template;
pub mod waveform;

use thiserror::Error;

// Re-export main types
pub use frequency::{frequency, frequency_with_bound, get_frequency, EpsBound};
pub use interp::{interpolate, SPIN_MATCH_TOLERANCE};
pub use num_complex::Complex64;
pub use table::{load_template_csv, read_template_rows};
pub use template::{ModeKey, ParseModeError, QnmEntry, TemplateRow, TemplateStore};
pub use waveform::{
    generate_waveform, synthesize, time_grid, ModeFrequency, Waveform, WaveformRequest,
};

#[derive(Debug, Error)]
pub enum RingdownError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("malformed row {row}: field `{field}` {reason}")]
    MalformedRow {
        row: usize,
        field: &'static str,
        reason: String,
    },
    #[error("mode {0} not found in QNM table")]
    UnknownMode(ModeKey),
    #[error("spin {spin} out of range [{min}, {max}] for mode {mode}")]
    OutOfRange {
        mode: ModeKey,
        spin: f64,
        min: f64,
        max: f64,
    },
    #[error("duplicate spin {spin} for mode {mode}")]
    DuplicateSpin { mode: ModeKey, spin: f64 },
    #[error("at least one mode is required")]
    EmptyModeList,
    #[error("invalid time grid: duration {duration}, dt {dt} (both must be finite and > 0)")]
    InvalidTimeGrid { duration: f64, dt: f64 },
    #[error("eps {eps} exceeds perturbative bound {max_abs}")]
    EpsOutOfBounds { eps: f64, max_abs: f64 },
}

impl RingdownError {
    /// Returns the tabulated spin bounds carried by an `OutOfRange` error.
    pub fn spin_bounds(&self) -> Option<(f64, f64)> {
        match self {
            Self::OutOfRange { min, max, .. } => Some((*min, *max)),
            _ => None,
        }
    }
}
