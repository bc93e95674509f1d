use crate::config::DEFAULT_CONFIG_PATH;
use clap::Parser;

#[derive(Debug, Clone, Parser)]
#[command(name = "persons-etl")]
#[command(about = "Extract, anonymize and analyze Faker API persons")]
pub struct CliArgs {
    /// Path to TOML configuration file
    #[arg(short, long, default_value = DEFAULT_CONFIG_PATH)]
    pub config: String,

    /// Override the configured start date (YYYY-MM-DD)
    #[arg(long)]
    pub start_date: Option<String>,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long)]
    pub json_logs: bool,
}
