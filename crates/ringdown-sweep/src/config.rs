use std::fs;
use std::path::{Path, PathBuf};

use ringdown::{EpsBound, ModeKey};
use serde::{Deserialize, Serialize};
use serde_with::{serde_as, DefaultOnNull};

use crate::output::repo_root_dir;
use crate::SweepError;

pub const DEFAULT_TABLE_PATH: &str = "data/qnm_freq_shifts.csv";

#[serde_as]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SweepConfig {
    #[serde_as(as = "DefaultOnNull")]
    pub table_path: PathBuf,
    #[serde_as(as = "DefaultOnNull")]
    pub spin_min: f64,
    #[serde_as(as = "DefaultOnNull")]
    pub spin_max: f64,
    #[serde_as(as = "DefaultOnNull")]
    pub num_spin: usize,
    #[serde_as(as = "DefaultOnNull")]
    pub eps_min: f64,
    #[serde_as(as = "DefaultOnNull")]
    pub eps_max: f64,
    #[serde_as(as = "DefaultOnNull")]
    pub num_eps: usize,
    pub modes: Vec<ModeKey>,
    #[serde_as(as = "DefaultOnNull")]
    pub duration: f64,
    #[serde_as(as = "DefaultOnNull")]
    pub dt: f64,
    #[serde(default)]
    pub max_abs_eps: Option<f64>,
    #[serde_as(as = "DefaultOnNull")]
    pub write_waveforms: bool,
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            table_path: PathBuf::from(DEFAULT_TABLE_PATH),
            spin_min: 0.0,
            spin_max: 0.9,
            num_spin: 10,
            eps_min: 0.0,
            eps_max: 0.1,
            num_eps: 5,
            modes: vec![ModeKey::FUNDAMENTAL],
            duration: 0.1,
            dt: 1e-5,
            max_abs_eps: None,
            write_waveforms: false,
        }
    }
}

impl SweepConfig {
    pub fn from_json_file(path: &Path) -> Result<Self, SweepError> {
        let raw = fs::read_to_string(path)?;
        let config: SweepConfig = serde_json::from_str(&raw)?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), SweepError> {
        if self.num_spin == 0 || self.num_eps == 0 {
            return Err(SweepError::InvalidConfig(
                "num_spin and num_eps must be greater than zero".to_string(),
            ));
        }

        let bounds = [self.spin_min, self.spin_max, self.eps_min, self.eps_max];
        if bounds.iter().any(|value| !value.is_finite()) {
            return Err(SweepError::InvalidConfig(
                "spin and eps bounds must be finite".to_string(),
            ));
        }

        if self.spin_max < self.spin_min {
            return Err(SweepError::InvalidConfig(
                "spin_max must be greater than or equal to spin_min".to_string(),
            ));
        }

        if self.eps_max < self.eps_min {
            return Err(SweepError::InvalidConfig(
                "eps_max must be greater than or equal to eps_min".to_string(),
            ));
        }

        if !(self.duration.is_finite() && self.duration > 0.0) {
            return Err(SweepError::InvalidConfig(
                "duration must be finite and greater than zero".to_string(),
            ));
        }

        if !(self.dt.is_finite() && self.dt > 0.0) {
            return Err(SweepError::InvalidConfig(
                "dt must be finite and greater than zero".to_string(),
            ));
        }

        if self.modes.is_empty() {
            return Err(SweepError::InvalidConfig(
                "at least one mode must be listed".to_string(),
            ));
        }

        if let Some(max_abs) = self.max_abs_eps {
            if !(max_abs.is_finite() && max_abs >= 0.0) {
                return Err(SweepError::InvalidConfig(
                    "max_abs_eps must be finite and non-negative".to_string(),
                ));
            }
        }

        Ok(())
    }

    pub fn spin_grid(&self) -> Vec<f64> {
        linear_grid(self.spin_min, self.spin_max, self.num_spin)
    }

    pub fn eps_grid(&self) -> Vec<f64> {
        linear_grid(self.eps_min, self.eps_max, self.num_eps)
    }

    pub fn eps_bound(&self) -> EpsBound {
        EpsBound::from_max_abs(self.max_abs_eps)
    }

    /// Table path as given if it exists (or is absolute), otherwise resolved
    /// against the repository root.
    pub fn resolved_table_path(&self) -> PathBuf {
        if self.table_path.is_absolute() || self.table_path.exists() {
            return self.table_path.clone();
        }

        let fallback = repo_root_dir().join(&self.table_path);
        if fallback.exists() {
            fallback
        } else {
            self.table_path.clone()
        }
    }
}

fn linear_grid(min: f64, max: f64, count: usize) -> Vec<f64> {
    if count == 1 {
        return vec![min];
    }

    let span = max - min;
    let denom = (count - 1) as f64;

    (0..count)
        .map(|idx| min + span * idx as f64 / denom)
        .collect()
}
