use std::fs;
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;
use std::sync::LazyLock;
use std::time::Instant;

use anyhow::{Context, Result};
use log::{LevelFilter, info};
use serde::{Deserialize, Serialize};
use u_cnc_schedule::models::{Machine, Order, Scenario};

pub mod cli;

pub static EPOCH: LazyLock<Instant> = LazyLock::new(Instant::now);

/// One planning request: master data plus run configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanningInput {
    pub orders: Vec<Order>,
    pub machines: Vec<Machine>,
    #[serde(default)]
    pub scenario: Scenario,
}

pub fn read_input(path: &Path) -> Result<PlanningInput> {
    let file = File::open(path)
        .with_context(|| format!("could not open input file: {}", path.display()))?;
    let reader = BufReader::new(file);
    serde_json::from_reader(reader)
        .with_context(|| format!("could not parse input file: {}", path.display()))
}

pub fn write_json<T: Serialize>(value: &T, path: &Path) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("could not create output file: {}", path.display()))?;
    let writer = BufWriter::new(file);
    serde_json::to_writer_pretty(writer, value)
        .with_context(|| format!("could not write output file: {}", path.display()))?;

    let written = fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf());
    info!("plan written to {}", written.display());
    Ok(())
}

pub fn init_logger(level_filter: LevelFilter) -> Result<()> {
    LazyLock::force(&EPOCH);
    fern::Dispatch::new()
        .format(|out, message, record| {
            let handle = std::thread::current();
            let thread_name = handle.name().unwrap_or("-");

            let duration = EPOCH.elapsed();
            let sec = duration.as_secs() % 60;
            let min = (duration.as_secs() / 60) % 60;
            let hours = (duration.as_secs() / 60) / 60;

            let prefix = format!(
                "[{}] [{:0>2}:{:0>2}:{:0>2}] <{}>",
                record.level(),
                hours,
                min,
                sec,
                thread_name,
            );

            out.finish(format_args!("{prefix:<27}{message}"))
        })
        .level(level_filter)
        .chain(std::io::stderr())
        .apply()
        .context("could not initialize logger")?;
    Ok(())
}
