pub mod config;
pub mod output;
pub mod sweep;

use ringdown::{load_template_csv, RingdownError};
use thiserror::Error;

pub use config::SweepConfig;
pub use output::create_timestamped_output_dir;
pub use sweep::{run_sweep_into_dir, FrequencyRecord, PointStatus, SweepResult};

#[derive(Debug, Error)]
pub enum SweepError {
    #[error(transparent)]
    Ringdown(#[from] RingdownError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("{context} length mismatch: expected {expected}, got {got}")]
    LengthMismatch {
        context: &'static str,
        expected: usize,
        got: usize,
    },
}

/// Load the configured table and run the sweep into a fresh timestamped
/// directory under `output_root`.
pub fn run_sweep(
    config: &SweepConfig,
    output_root: &std::path::Path,
) -> Result<SweepResult, SweepError> {
    config.validate()?;
    let store = load_template_csv(&config.resolved_table_path())?;
    let output_dir = create_timestamped_output_dir(output_root)?;
    run_sweep_into_dir(&store, config, &output_dir)
}
