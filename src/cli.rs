//! CLI argument parsing for Pcgstat

use std::path::PathBuf;

use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "pcgstat")]
#[command(version)]
#[command(about = "Statistical comparison of PCG and non-PCG game projects", long_about = None)]
pub struct Cli {
    /// Input CSV of project records
    #[arg(value_name = "CSV", default_value = "game_data.csv")]
    pub input: PathBuf,

    /// Include the generated-only metrics (performance, innovation)
    #[arg(short = 'g', long = "include-generated")]
    pub include_generated: bool,

    /// Directory the charts are written under
    #[arg(short = 'o', long = "out-dir", value_name = "DIR", default_value = "results")]
    pub out_dir: PathBuf,

    /// Analysis configuration file (TOML); defaults are used when omitted
    #[arg(long = "config", value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Override the significance level (alpha) from the configuration
    #[arg(long = "alpha", value_name = "ALPHA")]
    pub alpha: Option<f64>,

    /// Skip chart rendering, print the statistical report only
    #[arg(long = "no-plots")]
    pub no_plots: bool,

    /// Enable debug diagnostics on stderr
    #[arg(long = "debug")]
    pub debug: bool,
}
