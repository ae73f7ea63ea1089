use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};
use ringdown::{
    frequency_with_bound, generate_waveform, load_template_csv, EpsBound, ModeKey, TemplateStore,
    WaveformRequest,
};
use ringdown_sweep::config::DEFAULT_TABLE_PATH;
use ringdown_sweep::output::write_waveform_csv;
use ringdown_sweep::{create_timestamped_output_dir, run_sweep, SweepConfig};

#[derive(Debug, Parser)]
#[command(author, version, about = "QNM frequency lookup and ringdown waveform synthesis")]
struct Cli {
    /// QNM template table (CSV); defaults to the bundled table
    #[arg(long, global = true)]
    table: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print the complex frequency of one mode
    Frequency {
        /// Dimensionless spin
        #[arg(long)]
        spin: f64,

        #[arg(long, default_value_t = 2)]
        l: u32,

        #[arg(long, default_value_t = 0)]
        n: u32,

        /// Hair fraction
        #[arg(long, default_value_t = 0.0, allow_hyphen_values = true)]
        eps: f64,

        /// Reject |eps| above this bound
        #[arg(long)]
        max_abs_eps: Option<f64>,
    },

    /// Synthesize one ringdown waveform and write it as CSV
    Waveform {
        #[arg(long)]
        spin: f64,

        #[arg(long, default_value_t = 0.0, allow_hyphen_values = true)]
        eps: f64,

        /// Mode as `l,n`; repeat to superpose several modes (default 2,0)
        #[arg(long = "mode")]
        modes: Vec<ModeKey>,

        #[arg(long, default_value_t = 0.1)]
        duration: f64,

        #[arg(long, default_value_t = 1e-5)]
        dt: f64,

        /// Output base directory
        #[arg(long, default_value = "output-ringdown")]
        output: PathBuf,
    },

    /// Sweep a (spin, eps) grid and write frequencies and waveforms
    Sweep {
        /// JSON sweep configuration (defaults to ringdown_sweep.json in the working directory)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Output base directory
        #[arg(long, default_value = "output-ringdown")]
        output: PathBuf,

        /// Write one waveform CSV per grid point
        #[arg(long, default_value_t = false)]
        write_waveforms: bool,
    },
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    match cli.command {
        Command::Frequency {
            spin,
            l,
            n,
            eps,
            max_abs_eps,
        } => {
            let store = load_store(cli.table.as_deref())?;
            let mode = ModeKey::new(l, n);
            let omega =
                frequency_with_bound(&store, mode, spin, eps, EpsBound::from_max_abs(max_abs_eps))?;
            println!(
                "QNM frequency for a={spin}, mode {mode}, eps={eps}: omega = {:.6} {:+.6} i",
                omega.re, omega.im
            );
        }
        Command::Waveform {
            spin,
            eps,
            modes,
            duration,
            dt,
            output,
        } => {
            let store = load_store(cli.table.as_deref())?;
            let request = WaveformRequest {
                spin,
                eps,
                modes: if modes.is_empty() {
                    vec![ModeKey::FUNDAMENTAL]
                } else {
                    modes
                },
                duration,
                dt,
            };
            let waveform = generate_waveform(&store, &request)?;

            let run_dir = create_timestamped_output_dir(&output)?;
            let path = run_dir.join("waveform.csv");
            write_waveform_csv(&path, &waveform)?;

            println!("Samples: {} | Peak |h|: {:.4}", waveform.len(), waveform.peak_abs_strain());
            for component in &waveform.components {
                println!(
                    "Mode {}: omega = {:.6} {:+.6} i",
                    component.mode, component.omega.re, component.omega.im
                );
            }
            println!("CSV: {}", path.display());
        }
        Command::Sweep {
            config,
            output,
            write_waveforms,
        } => {
            let mut cfg = load_config(config.as_deref())?;
            if let Some(table) = cli.table {
                cfg.table_path = table;
            }
            if write_waveforms {
                cfg.write_waveforms = true;
            }

            let result = run_sweep(&cfg, &output)?;

            println!(
                "Sweep complete. Points resolved: {} | skipped: {}",
                result.resolved_points, result.skipped_points
            );
            println!("Run directory: {}", result.output_dir.display());
            println!("Waveforms written: {}", result.waveform_files.len());
        }
    }

    Ok(())
}

fn load_store(table: Option<&Path>) -> anyhow::Result<TemplateStore> {
    let path = match table {
        Some(path) => path.to_path_buf(),
        None => SweepConfig::default().resolved_table_path(),
    };

    load_template_csv(&path)
        .with_context(|| format!("failed to load QNM table: {}", path.display()))
}

fn load_config(path: Option<&Path>) -> anyhow::Result<SweepConfig> {
    if let Some(path) = path {
        return SweepConfig::from_json_file(path)
            .with_context(|| format!("failed to read sweep config: {}", path.display()));
    }

    let cwd_config = PathBuf::from("ringdown_sweep.json");
    if cwd_config.exists() {
        return SweepConfig::from_json_file(&cwd_config)
            .with_context(|| format!("failed to read sweep config: {}", cwd_config.display()));
    }

    log::info!("no sweep config given, using defaults with table {DEFAULT_TABLE_PATH}");
    Ok(SweepConfig::default())
}
