use std::fs;
use std::path::{Path, PathBuf};

use log::{info, warn};
use ringdown::{frequency_with_bound, synthesize, ModeKey, RingdownError, TemplateStore};
use serde::{Deserialize, Serialize};

use crate::config::SweepConfig;
use crate::output::{
    write_frequency_csv, write_manifest_json, write_waveform_csv, Manifest, OUTPUT_SCHEMA_VERSION,
};
use crate::SweepError;

/// Outcome of one (spin, eps, mode) lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PointStatus {
    Ok,
    OutOfRange,
    UnknownMode,
    EpsOutOfBounds,
}

impl PointStatus {
    /// Lookup failures a sweep records and steps over. Anything else aborts.
    fn from_error(error: &RingdownError) -> Option<Self> {
        match error {
            RingdownError::OutOfRange { .. } => Some(Self::OutOfRange),
            RingdownError::UnknownMode(_) => Some(Self::UnknownMode),
            RingdownError::EpsOutOfBounds { .. } => Some(Self::EpsOutOfBounds),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ok => "ok",
            Self::OutOfRange => "out_of_range",
            Self::UnknownMode => "unknown_mode",
            Self::EpsOutOfBounds => "eps_out_of_bounds",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrequencyRecord {
    pub spin: f64,
    pub eps: f64,
    pub mode: ModeKey,
    pub omega_real: Option<f64>,
    pub omega_imag: Option<f64>,
    pub status: PointStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SweepResult {
    pub output_dir: PathBuf,
    pub spin_grid: Vec<f64>,
    pub eps_grid: Vec<f64>,
    pub records: Vec<FrequencyRecord>,
    pub waveform_files: Vec<PathBuf>,
    pub resolved_points: usize,
    pub skipped_points: usize,
}

pub fn run_sweep_into_dir(
    store: &TemplateStore,
    config: &SweepConfig,
    output_dir: &Path,
) -> Result<SweepResult, SweepError> {
    config.validate()?;
    fs::create_dir_all(output_dir)?;

    let spin_grid = config.spin_grid();
    let eps_grid = config.eps_grid();
    let bound = config.eps_bound();

    let waveform_dir = output_dir.join("waveforms");
    if config.write_waveforms {
        fs::create_dir_all(&waveform_dir)?;
    }

    info!(
        "sweeping {} spins x {} eps values over {} modes",
        spin_grid.len(),
        eps_grid.len(),
        config.modes.len()
    );

    let mut records = Vec::with_capacity(spin_grid.len() * eps_grid.len() * config.modes.len());
    let mut waveform_files = Vec::new();
    let mut resolved_points = 0_usize;
    let mut skipped_points = 0_usize;

    for (spin_idx, &spin) in spin_grid.iter().enumerate() {
        for (eps_idx, &eps) in eps_grid.iter().enumerate() {
            let mut point_ok = true;

            for &mode in &config.modes {
                match frequency_with_bound(store, mode, spin, eps, bound) {
                    Ok(omega) => records.push(FrequencyRecord {
                        spin,
                        eps,
                        mode,
                        omega_real: Some(omega.re),
                        omega_imag: Some(omega.im),
                        status: PointStatus::Ok,
                    }),
                    Err(error) => {
                        let status = PointStatus::from_error(&error).ok_or(error)?;
                        point_ok = false;
                        records.push(FrequencyRecord {
                            spin,
                            eps,
                            mode,
                            omega_real: None,
                            omega_imag: None,
                            status,
                        });
                    }
                }
            }

            if !point_ok {
                warn!("skipping spin {spin:.4}, eps {eps:.4}: not every mode resolved");
                skipped_points += 1;
                continue;
            }

            if config.write_waveforms {
                let waveform =
                    synthesize(store, spin, eps, &config.modes, config.duration, config.dt)?;
                let filename = format!("spin_{spin_idx:03}_eps_{eps_idx:03}.csv");
                let path = waveform_dir.join(filename);
                write_waveform_csv(&path, &waveform)?;
                waveform_files.push(path);
            }

            resolved_points += 1;
        }
    }

    write_frequency_csv(&output_dir.join("frequencies.csv"), &records)?;

    let manifest = Manifest {
        schema_version: OUTPUT_SCHEMA_VERSION.to_string(),
        crate_version: env!("CARGO_PKG_VERSION").to_string(),
        created_utc: chrono::Utc::now().to_rfc3339(),
        table_path: config.resolved_table_path(),
        config: config.clone(),
        grid_points: spin_grid.len() * eps_grid.len(),
        resolved_points,
        skipped_points,
        waveform_files: waveform_files.clone(),
    };
    write_manifest_json(output_dir, &manifest)?;

    info!(
        "sweep finished: {resolved_points} points resolved, {skipped_points} skipped ({})",
        output_dir.display()
    );

    Ok(SweepResult {
        output_dir: output_dir.to_path_buf(),
        spin_grid,
        eps_grid,
        records,
        waveform_files,
        resolved_points,
        skipped_points,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use ringdown::QnmEntry;

    fn store() -> TemplateStore {
        let overtone = ModeKey::new(2, 1);
        TemplateStore::from_entries([
            (ModeKey::FUNDAMENTAL, QnmEntry::new(0.0, 0.50, -0.10, 0.02, -0.01)),
            (ModeKey::FUNDAMENTAL, QnmEntry::new(1.0, 0.60, -0.08, 0.03, -0.015)),
            (overtone, QnmEntry::new(0.0, 0.35, -0.27, 0.02, -0.03)),
            (overtone, QnmEntry::new(0.5, 0.44, -0.26, 0.02, -0.03)),
        ])
        .unwrap()
    }

    fn small_config() -> SweepConfig {
        SweepConfig {
            spin_min: 0.0,
            spin_max: 1.0,
            num_spin: 3,
            eps_min: 0.0,
            eps_max: 0.2,
            num_eps: 2,
            duration: 1.0,
            dt: 0.1,
            ..SweepConfig::default()
        }
    }

    #[test]
    fn sweep_writes_frequencies_and_waveforms() {
        let dir = tempfile::tempdir().unwrap();
        let config = SweepConfig {
            write_waveforms: true,
            ..small_config()
        };

        let result = run_sweep_into_dir(&store(), &config, dir.path()).unwrap();

        assert_eq!(result.records.len(), 6);
        assert_eq!(result.resolved_points, 6);
        assert_eq!(result.skipped_points, 0);
        assert_eq!(result.waveform_files.len(), 6);
        assert!(dir.path().join("frequencies.csv").exists());
        assert!(dir.path().join("manifest.json").exists());
        assert!(dir.path().join("waveforms/spin_001_eps_000.csv").exists());

        let mid = result
            .records
            .iter()
            .find(|record| record.spin == 0.5 && record.eps == 0.0)
            .unwrap();
        assert!((mid.omega_real.unwrap() - 0.55).abs() < 1e-12);
    }

    #[test]
    fn out_of_range_points_are_recorded_and_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let config = SweepConfig {
            modes: vec![ModeKey::FUNDAMENTAL, ModeKey::new(2, 1)],
            write_waveforms: true,
            ..small_config()
        };

        let result = run_sweep_into_dir(&store(), &config, dir.path()).unwrap();

        // spin 1.0 is beyond the overtone's table
        assert_eq!(result.skipped_points, 2);
        assert_eq!(result.resolved_points, 4);
        assert_eq!(result.waveform_files.len(), 4);
        let failed: Vec<&FrequencyRecord> = result
            .records
            .iter()
            .filter(|record| record.status != PointStatus::Ok)
            .collect();
        assert_eq!(failed.len(), 2);
        assert!(failed
            .iter()
            .all(|record| record.status == PointStatus::OutOfRange && record.omega_real.is_none()));
    }

    #[test]
    fn eps_bound_marks_points() {
        let dir = tempfile::tempdir().unwrap();
        let config = SweepConfig {
            max_abs_eps: Some(0.1),
            ..small_config()
        };

        let result = run_sweep_into_dir(&store(), &config, dir.path()).unwrap();
        assert_eq!(result.skipped_points, 3);
        assert!(result
            .records
            .iter()
            .filter(|record| record.eps > 0.1)
            .all(|record| record.status == PointStatus::EpsOutOfBounds));
        assert!(result.waveform_files.is_empty());
    }

    #[test]
    fn unknown_mode_is_recorded() {
        let dir = tempfile::tempdir().unwrap();
        let config = SweepConfig {
            modes: vec![ModeKey::new(4, 0)],
            ..small_config()
        };

        let result = run_sweep_into_dir(&store(), &config, dir.path()).unwrap();
        assert_eq!(result.resolved_points, 0);
        assert!(result
            .records
            .iter()
            .all(|record| record.status.as_str() == "unknown_mode"));
    }
}
