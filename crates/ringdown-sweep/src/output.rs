use std::fs;
use std::path::{Path, PathBuf};

use chrono::Utc;
use csv::Writer;
use ringdown::Waveform;
use serde::Serialize;

use crate::config::SweepConfig;
use crate::sweep::FrequencyRecord;
use crate::SweepError;

pub const OUTPUT_SCHEMA_VERSION: &str = "1.0.0";

#[derive(Debug, Clone, Serialize)]
pub struct Manifest {
    pub schema_version: String,
    pub crate_version: String,
    pub created_utc: String,
    pub table_path: PathBuf,
    pub config: SweepConfig,
    pub grid_points: usize,
    pub resolved_points: usize,
    pub skipped_points: usize,
    pub waveform_files: Vec<PathBuf>,
}

pub fn repo_root_dir() -> PathBuf {
    let manifest_dir = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    manifest_dir
        .parent()
        .and_then(|path| path.parent())
        .map(Path::to_path_buf)
        .unwrap_or(manifest_dir)
}

pub fn create_timestamped_output_dir(output_root: &Path) -> Result<PathBuf, SweepError> {
    fs::create_dir_all(output_root)?;

    let timestamp = Utc::now().format("%Y-%m-%dT%H-%M-%SZ").to_string();
    let mut output_dir = output_root.join(&timestamp);
    let mut counter = 1_u32;

    while output_dir.exists() {
        output_dir = output_root.join(format!("{timestamp}-{counter:02}"));
        counter += 1;
    }

    fs::create_dir_all(&output_dir)?;
    Ok(output_dir)
}

fn ensure_len(context: &'static str, expected: usize, actual: usize) -> Result<(), SweepError> {
    if expected == actual {
        return Ok(());
    }

    Err(SweepError::LengthMismatch {
        context,
        expected,
        got: actual,
    })
}

fn fmt_f64(value: f64) -> String {
    format!("{value:.10}")
}

fn fmt_option_f64(value: Option<f64>) -> String {
    value.map(fmt_f64).unwrap_or_default()
}

pub fn write_waveform_csv(path: &Path, waveform: &Waveform) -> Result<(), SweepError> {
    ensure_len("waveform strain", waveform.time.len(), waveform.strain.len())?;

    let mut writer = Writer::from_path(path)?;
    writer.write_record(["t", "strain"])?;

    for (t, h) in waveform.time.iter().zip(&waveform.strain) {
        // strain keeps full precision, it decays over many orders of magnitude
        writer.write_record([fmt_f64(*t), format!("{h:e}")])?;
    }

    writer.flush()?;
    Ok(())
}

pub fn write_frequency_csv(path: &Path, records: &[FrequencyRecord]) -> Result<(), SweepError> {
    let mut writer = Writer::from_path(path)?;
    writer.write_record([
        "spin",
        "eps",
        "l",
        "n",
        "omega_real",
        "omega_imag",
        "status",
    ])?;

    for record in records {
        writer.write_record([
            fmt_f64(record.spin),
            fmt_f64(record.eps),
            record.mode.l.to_string(),
            record.mode.n.to_string(),
            fmt_option_f64(record.omega_real),
            fmt_option_f64(record.omega_imag),
            record.status.as_str().to_string(),
        ])?;
    }

    writer.flush()?;
    Ok(())
}

pub fn write_manifest_json(output_dir: &Path, manifest: &Manifest) -> Result<PathBuf, SweepError> {
    let path = output_dir.join("manifest.json");
    let payload = serde_json::to_string_pretty(manifest)?;
    fs::write(&path, payload)?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ringdown::{Complex64, ModeFrequency, ModeKey};

    #[test]
    fn timestamped_dirs_do_not_collide() {
        let root = tempfile::tempdir().unwrap();
        let first = create_timestamped_output_dir(root.path()).unwrap();
        let second = create_timestamped_output_dir(root.path()).unwrap();

        assert!(first.is_dir());
        assert!(second.is_dir());
        assert_ne!(first, second);
    }

    #[test]
    fn waveform_csv_has_one_row_per_sample() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("waveform.csv");
        let waveform = Waveform {
            time: vec![0.0, 0.5, 1.0],
            strain: vec![1.0, 0.5, -0.25],
            components: vec![ModeFrequency {
                mode: ModeKey::FUNDAMENTAL,
                omega: Complex64::new(0.5, -0.1),
            }],
        };

        write_waveform_csv(&path, &waveform).unwrap();
        let text = fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[0], "t,strain");
        assert!(lines[1].starts_with("0.0000000000,1e0"));
    }

    #[test]
    fn mismatched_waveform_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let waveform = Waveform {
            time: vec![0.0, 0.5],
            strain: vec![1.0],
            components: Vec::new(),
        };

        let err = write_waveform_csv(&dir.path().join("bad.csv"), &waveform).unwrap_err();
        assert!(matches!(
            err,
            SweepError::LengthMismatch {
                expected: 2,
                got: 1,
                ..
            }
        ));
    }
}
