//! Headless runner: loads a factory directory, runs it, and prints the report.
//!
//! Run with: `cargo run --package partline-data --example headless_runner -- [DIR] [--json]`
//!
//! Without a directory the bundled `scenarios/bolts` factory is used. Set
//! `RUST_LOG=debug` to see per-day progress.

use std::path::PathBuf;

use partline_data::load_factory;
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .init();

    let mut json = false;
    let mut dir = None;
    for arg in std::env::args().skip(1) {
        match arg.as_str() {
            "--json" => json = true,
            _ => dir = Some(PathBuf::from(arg)),
        }
    }
    let dir = dir.unwrap_or_else(|| {
        PathBuf::from(concat!(env!("CARGO_MANIFEST_DIR"), "/scenarios/bolts"))
    });

    let setup = load_factory(&dir)?;
    for problem in &setup.problems {
        eprintln!("warning: {problem}");
    }

    let sim = setup.manifest.simulation.clone();
    let mut scheduler = setup.into_scheduler()?;
    let summary = scheduler.run(sim.days, sim.minutes)?;
    let report = scheduler.report();

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print!("{report}");
        println!();
        println!(
            "{} days x {} minutes: {} accepted, {} discarded, {} of {} orders fulfilled",
            sim.days,
            sim.minutes,
            summary.accepted(),
            summary.discarded(),
            report.fulfilled_orders(),
            report.orders.len()
        );
        println!("State hash: {:#018x}", scheduler.state_hash());
    }

    Ok(())
}
