//! Sweep the borrowing interest factor and report how the no-trade plateau
//! responds
//!
//! Each Rboro value is an independent model solved in parallel.

use std::path::PathBuf;
use std::time::Instant;

use anyhow::{anyhow, bail, Context};
use clap::Parser;
use serde::Serialize;

use kinked_r::diagnostics::target_m;
use kinked_r::params::loader::load_params;
use kinked_r::{sweep_rboro, InterestSchedule, ModelParams};

#[derive(Parser)]
#[command(version, about = "Solve the kinked-R model over a range of borrowing factors", long_about = None)]
struct Args {
    /// Parameter JSON file (built-in defaults if omitted)
    #[arg(short, long)]
    params: Option<PathBuf>,

    /// Smallest Rboro (defaults to Rsave)
    #[arg(long)]
    from: Option<f64>,

    /// Largest Rboro
    #[arg(long, default_value_t = 1.30)]
    to: f64,

    /// Number of Rboro values
    #[arg(short, long, default_value_t = 15)]
    steps: usize,

    /// Output CSV path
    #[arg(short, long, default_value = "rboro_sweep.csv")]
    output: PathBuf,
}

#[derive(Serialize)]
struct SweepRow {
    rboro: f64,
    m_nrm_min: f64,
    m_boro: f64,
    m_save: f64,
    plateau: f64,
    mpc_max: f64,
    target_m: f64,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let base = match &args.params {
        Some(path) => load_params(path).map_err(|e| anyhow!("failed to load {}: {e}", path.display()))?,
        None => ModelParams::default_kinked(),
    };
    let rsave = base.rates().rsave();
    let from = args.from.unwrap_or(rsave);
    if args.steps < 2 || args.to <= from {
        bail!("need at least two steps over an increasing range (got {} steps from {from} to {})", args.steps, args.to);
    }
    let rboro_values: Vec<f64> = (0..args.steps)
        .map(|i| from + (args.to - from) * i as f64 / (args.steps - 1) as f64)
        .collect();

    println!("Solving {} models (Rsave = {:.4})...", rboro_values.len(), rsave);
    let start = Instant::now();
    let points = sweep_rboro(&base, &rboro_values);
    println!("Completed in {:?}\n", start.elapsed());

    println!("{:>8} {:>10} {:>10} {:>10} {:>10} {:>10}", "Rboro", "mNrmMin", "m_boro", "m_save", "Plateau", "Target m");
    println!("{}", "-".repeat(63));

    let mut wtr = csv::Writer::from_path(&args.output)
        .with_context(|| format!("unable to create {}", args.output.display()))?;
    let mut failures = 0;
    for point in &points {
        let soln = match &point.solution {
            Ok(s) => s,
            Err(e) => {
                println!("{:>8.4} failed: {e}", point.rboro);
                failures += 1;
                continue;
            }
        };
        let (m_boro, m_save) = soln.consumption().kinks().unwrap_or((f64::NAN, f64::NAN));
        let params = base.with_rates(InterestSchedule::new(point.rboro, rsave)?);
        let target = target_m(&params, soln).unwrap_or(f64::NAN);
        println!(
            "{:>8.4} {:>10.5} {:>10.5} {:>10.5} {:>10.5} {:>10.5}",
            point.rboro,
            soln.m_nrm_min(),
            m_boro,
            m_save,
            soln.consumption().plateau_width(),
            target
        );
        wtr.serialize(SweepRow {
            rboro: point.rboro,
            m_nrm_min: soln.m_nrm_min(),
            m_boro,
            m_save,
            plateau: soln.consumption().plateau_width(),
            mpc_max: soln.mpc_max(),
            target_m: target,
        })?;
    }
    wtr.flush()?;

    println!("\nResults written to: {}", args.output.display());
    if failures > 0 {
        println!("{failures} of {} models failed", points.len());
    }
    Ok(())
}
