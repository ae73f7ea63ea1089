//! Fundamental-Mode Ringdown Example
//!
//! Loads the bundled QNM table, queries the (2, 0) frequency of a hairy
//! remnant and writes its ringdown to `out/ringdown_fundamental.csv`.

use ringdown::{generate_waveform, get_frequency, load_template_csv, ModeKey, WaveformRequest};
use std::error::Error;
use std::fs::{self, File};
use std::io::Write;
use std::path::PathBuf;

fn main() -> Result<(), Box<dyn Error>> {
    println!("Running fundamental-mode ringdown example...\n");

    let table = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("data")
        .join("qnm_freq_shifts.csv");
    let store = load_template_csv(&table)?;

    println!("Modes in table:");
    for mode in store.modes() {
        let (min, max) = store.spin_range(mode)?;
        println!("  {mode}: spin in [{min}, {max}]");
    }
    println!();

    let spin = 0.7;
    let eps = 0.01;
    let omega = get_frequency(&store, spin, 2, 0, eps)?;
    println!(
        "QNM frequency for a={spin}, l=2, n=0, eps={eps}: omega = {:.4} + {:.4} i",
        omega.re, omega.im
    );

    let kerr = get_frequency(&store, spin, 2, 0, 0.0)?;
    println!(
        "Shift from hair: d_omega = {:.2e} + {:.2e} i\n",
        omega.re - kerr.re,
        omega.im - kerr.im
    );

    let request = WaveformRequest {
        spin,
        eps,
        modes: vec![ModeKey::FUNDAMENTAL, ModeKey::new(3, 0)],
        duration: 60.0,
        dt: 0.05,
    };
    let waveform = generate_waveform(&store, &request)?;

    fs::create_dir_all("out")?;
    let mut file = File::create("out/ringdown_fundamental.csv")?;
    writeln!(file, "t,strain")?;
    for (t, h) in waveform.time.iter().zip(&waveform.strain) {
        writeln!(file, "{t},{h}")?;
    }

    println!("Waveform:");
    println!("  Samples: {}", waveform.len());
    println!("  Peak |h|: {:.4}", waveform.peak_abs_strain());
    for component in &waveform.components {
        println!(
            "  Mode {}: omega = {:.4} + {:.4} i",
            component.mode, component.omega.re, component.omega.im
        );
    }
    println!("\nResults saved to out/ringdown_fundamental.csv");

    Ok(())
}
