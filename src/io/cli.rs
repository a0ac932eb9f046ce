use std::path::PathBuf;

use clap::Parser;
use log::LevelFilter;

#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// JSON document with `orders`, `machines` and `scenario`
    #[arg(short, long, value_name = "FILE")]
    pub input_file: PathBuf,
    /// Where the plan is written; stdout when omitted
    #[arg(short, long, value_name = "FILE")]
    pub output_file: Option<PathBuf>,
    /// Overrides the scenario seed
    #[arg(short, long)]
    pub seed: Option<u64>,
    /// Overrides the scenario generation budget
    #[arg(short, long)]
    pub generations: Option<usize>,
    #[arg(
        short,
        long,
        value_name = "[off, error, warn, info, debug, trace]",
        default_value = "info"
    )]
    pub log_level: LevelFilter,
}
