use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "Fleet Intake",
    about = "Run the trucking insurance intake service or assemble submission packages",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Assemble a submission package from a saved intake JSON file
    Package(PackageArgs),
    /// Walk a sample fleet through every stage and write its package
    Demo(DemoArgs),
}

#[derive(Args, Debug, Default)]
pub struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub port: Option<u16>,
}

#[derive(Args, Debug)]
pub struct PackageArgs {
    /// Intake record as saved by the service (camelCase JSON)
    #[arg(long)]
    pub input: PathBuf,
    /// Directory holding upload files named by their file reference
    #[arg(long)]
    pub uploads_dir: PathBuf,
    /// Directory the package is written to
    #[arg(long, default_value = ".")]
    pub out: PathBuf,
    /// Date stamped on the documents (defaults to today)
    #[arg(long, value_parser = parse_date)]
    pub today: Option<NaiveDate>,
}

#[derive(Args, Debug)]
pub struct DemoArgs {
    /// Directory the package is written to
    #[arg(long, default_value = ".")]
    pub out: PathBuf,
    /// Number of vehicles in the sample fleet
    #[arg(long, default_value_t = 5)]
    pub vehicles: usize,
    /// Date stamped on the documents (defaults to today)
    #[arg(long, value_parser = parse_date)]
    pub today: Option<NaiveDate>,
}

pub fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
}
