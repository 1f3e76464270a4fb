mod session;

use std::fs::File;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Parser;
use motex_core::TrialPhase;
use motex_experiment::{
    plan, BlockEvent, BlockRunner, ExperimentConfig, NullPresenter, ScriptedObserver,
};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing_subscriber::EnvFilter;

use session::JsonlSink;

/// Headless motion-perception block runner: plans a balanced trial list,
/// runs it against a scripted observer and writes the session log as JSON
/// lines.
#[derive(Parser)]
#[command(name = "motex", version)]
struct Cli {
    /// Experiment parameters as JSON; defaults are used when omitted.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Seed for planning and per-trial dot seeds.
    #[arg(long, default_value_t = 7)]
    seed: u64,

    /// Session log path (JSON lines).
    #[arg(long, default_value = "session.jsonl")]
    out: PathBuf,

    /// Number of blocks to run back to back.
    #[arg(long, default_value_t = 1)]
    blocks: u32,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => {
            let file = File::open(path)
                .with_context(|| format!("cannot open config {}", path.display()))?;
            serde_json::from_reader(file)
                .with_context(|| format!("cannot parse config {}", path.display()))?
        }
        None => ExperimentConfig::default(),
    };
    config.validate().context("invalid experiment configuration")?;

    println!("motex headless block runner");
    println!(
        "  {} Hz, {} dots/subfield, aperture {:.1} deg",
        config.sim_hz, config.dots_per_subfield, config.aperture_radius_deg
    );

    let mut rng = ChaCha8Rng::seed_from_u64(cli.seed);
    let mut sink = JsonlSink::create(&cli.out, &config)?;

    for block in 0..cli.blocks {
        let trials = plan(&config, &mut rng)?;
        println!("block {block}: {} trials planned", trials.len());
        run_block(&config, trials, &mut sink, cli.seed)?;
    }

    println!("\nsession complete");
    println!(
        "  confirmed {}, canceled {}, timed out {}",
        sink.confirmed, sink.canceled, sink.timed_out
    );
    if let Some(rt) = sink.mean_confirmed_rt_frames() {
        println!("  mean confirmed RT: {rt:.1} frames");
    }
    println!("  log written to {}", cli.out.display());

    Ok(())
}

fn run_block(
    config: &ExperimentConfig,
    trials: Vec<motex_core::TrialDescriptor>,
    sink: &mut JsonlSink,
    seed: u64,
) -> Result<()> {
    let observer = ScriptedObserver::new(8, 15, seed);
    let mut runner = BlockRunner::new(config.clone(), trials, sink, observer, NullPresenter)?;
    let dt = runner.config().sim_rate()?.dt();

    // generous tick budget: a hung block is a bug, not a wait
    let budget = 100_000_000u64;
    let mut spent = 0u64;
    while !runner.is_finished() {
        if runner.phase() == TrialPhase::WaitingForStart {
            runner.handle_event(BlockEvent::StartRequested);
        }
        runner.update(dt);
        spent += 1;
        if spent > budget {
            runner.abort();
            bail!("block exceeded its tick budget");
        }
    }

    Ok(())
}
