mod io;

use anyhow::{Context, Result};
use clap::Parser as ClapParser;
use log::{info, warn};
use u_cnc_schedule::Planner;
use u_cnc_schedule::ga::CancellationToken;

use crate::io::cli::Cli;

fn main() -> Result<()> {
    let args = Cli::parse();
    io::init_logger(args.log_level)?;

    let input = io::read_input(&args.input_file)?;
    let mut scenario = input.scenario;
    if let Some(seed) = args.seed {
        scenario.seed = Some(seed);
    }
    if let Some(generations) = args.generations {
        scenario.generations = generations;
    }
    if scenario.seed.is_none() {
        warn!("[MAIN] No seed provided, the run is not reproducible (use --seed)");
    }

    info!(
        "[MAIN] loaded {} orders and {} machines from {}",
        input.orders.len(),
        input.machines.len(),
        args.input_file.display()
    );

    let planner = Planner::new(&input.orders, input.machines, scenario)
        .context("planning input rejected")?;
    let result = planner.run(&CancellationToken::new());

    match args.output_file {
        Some(path) => io::write_json(&result, &path)?,
        None => {
            let json = serde_json::to_string_pretty(&result).context("could not serialize plan")?;
            println!("{json}");
        }
    }

    info!(
        "[MAIN] {} blocks, makespan {} ms, fitness {:.3}",
        result.blocks.len(),
        result.kpi.makespan_ms,
        result.fitness
    );
    Ok(())
}
