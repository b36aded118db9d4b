//! Run the engine on a scenario document and print the network
//! characteristics of every flow.
//!
//! ```text
//! cargo run --example scenario -- netchar/examples/scenario.json --stats
//! ```

use anyhow::{bail, Context as _, Result};
use clap::Parser;
use netchar::{Model, NetChar, NetCharConfig, NetCharEvent, Scenario};
use std::{path::PathBuf, sync::mpsc::Receiver, time::Duration};

#[derive(Debug, Parser)]
#[command(name = "scenario", about = "per-flow network characteristics of a scenario")]
struct Args {
    /// scenario document (JSON)
    scenario: PathBuf,
    /// edited snapshot of the scenario, applied once the first pass is done
    #[arg(long)]
    update: Option<PathBuf>,
    /// print the segments and their load once done
    #[arg(long, default_value_t = false)]
    stats: bool,
    /// how long to wait for the engine to complete a pass (milliseconds)
    #[arg(long, default_value_t = 5_000)]
    timeout_ms: u64,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(true)
        .init();

    let args = Args::parse();
    let timeout = Duration::from_millis(args.timeout_ms);

    let model = Model::new();
    let mut engine = NetChar::new(&model, NetCharConfig::default())?;
    let events = engine.subscribe();
    engine.start()?;

    model.activate(Scenario::from_json_file(&args.scenario)?)?;
    print_pass(&events, timeout).context("Initial pass")?;

    if let Some(update) = &args.update {
        model.update(Scenario::from_json_file(update)?)?;
        print_pass(&events, timeout).context("Update pass")?;
    }

    engine.stop()?;

    if args.stats
        && let Some(algorithm) = engine.algorithm()
    {
        for segment in algorithm.stats().segments {
            let capacity = match segment.capacity {
                Some(capacity) => capacity.to_string(),
                None => "unconstrained".to_owned(),
            };
            println!(
                "{key:<32} {flows:>3} flows  {allocated} / {capacity}",
                key = segment.key,
                flows = segment.flows,
                allocated = segment.allocated,
            );
        }
    }

    Ok(())
}

/// print the updates of one pass, up to its completion
fn print_pass(events: &Receiver<NetCharEvent>, timeout: Duration) -> Result<()> {
    loop {
        match events.recv_timeout(timeout) {
            Ok(NetCharEvent::Updated(updates)) => {
                for update in updates {
                    println!("{} -> {}: {}", update.src, update.dst, update.net_char);
                }
            }
            Ok(NetCharEvent::Completed) => return Ok(()),
            Err(error) => bail!("No completion from the engine: {error}"),
        }
    }
}
