//! Kinked-R CLI
//!
//! Solves one consumption-saving model and reports its first-period solution

use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;
use std::time::Instant;

use anyhow::{anyhow, Context};
use clap::Parser;
use serde::Serialize;

use kinked_r::diagnostics::{balanced_growth_m, target_m, ModelFactors};
use kinked_r::params::loader::{load_raw_params, DEFAULT_PARAMS_PATH};
use kinked_r::{Model, RawParams, Regime};

#[derive(Parser)]
#[command(version, about = "Solve a consumption-saving model with a kinked interest rate", long_about = None)]
struct Args {
    /// Parameter JSON file (built-in defaults if omitted)
    #[arg(short, long)]
    params: Option<PathBuf>,

    /// Solve this many periods instead of the configured horizon
    #[arg(long)]
    periods: Option<usize>,

    /// Use the single interest factor solver (requires Rboro == Rsave)
    #[arg(long)]
    ind_shock: bool,

    /// Write consumption gridpoints of every period as CSV
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Write the full solutions as JSON
    #[arg(long)]
    json: Option<PathBuf>,
}

/// One gridpoint of one period's consumption function
#[derive(Serialize)]
struct PieceRow {
    period: usize,
    m: f64,
    c: f64,
    mpc: f64,
    regime: Regime,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    println!("Kinked-R v{}", env!("CARGO_PKG_VERSION"));
    println!("=============\n");

    let mut raw = match &args.params {
        Some(path) => load_raw_params(path)
            .map_err(|e| anyhow!("failed to load {}: {e}", path.display()))?,
        None => {
            println!("No parameter file given, using defaults (see {DEFAULT_PARAMS_PATH})");
            RawParams::default()
        }
    };
    if args.periods.is_some() {
        raw.periods = args.periods;
    }
    let params = raw.into_params()?;

    let rates = params.rates();
    println!("Rboro: {:.4}  Rsave: {:.4}", rates.rboro(), rates.rsave());
    println!("CRRA: {:.2}  DiscFac: {:.4}", params.prefs().crra(), params.prefs().disc_fac());
    println!("Horizon: {:?}", params.horizon());
    println!();

    let mut model = if args.ind_shock {
        Model::ind_shock(params.clone())?
    } else {
        Model::new(params.clone())
    };

    let start = Instant::now();
    model.solve()?;
    println!("{} model solved in {:?} ({} steps)", model.solver_name(), start.elapsed(), model.iterations());

    let soln = model.first().context("model produced no solutions")?;
    let cf = soln.consumption();
    println!("\nFirst-period solution:");
    println!("  mNrmMin: {:.6}", soln.m_nrm_min());
    println!("  hNrm:    {:.6}", soln.h_nrm());
    println!("  MPCmin:  {:.6}", soln.mpc_min());
    println!("  MPCmax:  {:.6}", soln.mpc_max());
    match cf.kinks() {
        Some((m_boro, m_save)) => {
            println!("  Kinks:   m_boro {:.6}, m_save {:.6} (plateau {:.6})", m_boro, m_save, m_save - m_boro)
        }
        None => println!("  Kinks:   none"),
    }
    match target_m(&params, soln) {
        Some(m) => println!("  Target m:          {:.6}", m),
        None => println!("  Target m:          not found"),
    }
    match balanced_growth_m(&params, soln) {
        Some(m) => println!("  Balanced growth m: {:.6}", m),
        None => println!("  Balanced growth m: not found"),
    }

    println!("\nConditions:");
    for cond in ModelFactors::compute(&params).conditions() {
        let status = if cond.holds() { "holds" } else { "FAILS" };
        println!("  {:<7} {:>10.6}  {}", cond.name, cond.factor, status);
    }

    if let Some(path) = &args.output {
        let mut wtr = csv::Writer::from_path(path)
            .with_context(|| format!("unable to create {}", path.display()))?;
        for (period, s) in model.solutions().iter().enumerate() {
            for piece in s.consumption().pieces() {
                wtr.serialize(PieceRow {
                    period,
                    m: piece.m,
                    c: piece.c,
                    mpc: piece.slope,
                    regime: piece.regime,
                })?;
            }
        }
        wtr.flush()?;
        println!("\nConsumption gridpoints written to: {}", path.display());
    }

    if let Some(path) = &args.json {
        let file = File::create(path).with_context(|| format!("unable to create {}", path.display()))?;
        serde_json::to_writer_pretty(BufWriter::new(file), model.solutions())?;
        println!("Solutions written to: {}", path.display());
    }

    Ok(())
}
