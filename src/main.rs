mod cli;
mod demo;
mod server;

use chrono::Local;
use clap::Parser;
use fleet_intake::config::AppConfig;
use fleet_intake::error::AppError;
use fleet_intake::telemetry;
use fleet_intake::workflows::intake::gate::verify_submission;
use fleet_intake::workflows::intake::{
    AssemblyError, DirectoryUploadStore, DocumentCompiler, IntakeData, NavigationError,
    PackageAssembler, TarGzArchive, ValidationContext,
};
use std::sync::Arc;
use tracing::info;

use crate::cli::{Cli, Command, PackageArgs, ServeArgs};

#[tokio::main]
async fn main() {
    if let Err(err) = run_cli().await {
        eprintln!("application error: {err}");
        std::process::exit(1);
    }
}

async fn run_cli() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Package(args) => run_package(args).await,
        Command::Demo(args) => demo::run(args).await,
    }
}

/// Re-checks every stage of a saved intake, then assembles its package.
async fn run_package(args: PackageArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    telemetry::init(&config.telemetry)?;

    let today = args.today.unwrap_or_else(|| Local::now().date_naive());
    let raw = std::fs::read_to_string(&args.input)?;
    let mut data: IntakeData = serde_json::from_str(&raw)?;
    data.normalize();

    if let Err(error) = verify_submission(&data, &ValidationContext::new(today)) {
        if let NavigationError::Invalid { errors, .. } = &error {
            for field in errors {
                eprintln!("  {}: {}", field.path, field.message);
            }
        }
        return Err(error.into());
    }

    let uploads = Arc::new(DirectoryUploadStore::new(&args.uploads_dir));
    let assembler = Arc::new(PackageAssembler::new(
        DocumentCompiler::default(),
        TarGzArchive::default(),
        uploads,
    ));
    let package = assembler
        .assemble_in_background(data, today)?
        .await
        .map_err(|error| AssemblyError::Worker(error.to_string()))??;

    std::fs::create_dir_all(&args.out)?;
    let path = args.out.join(&package.file_name);
    std::fs::write(&path, &package.bytes)?;
    info!(path = %path.display(), documents = package.document_count, "submission package written");

    println!("Package written to {}", path.display());
    for entry in &package.entries {
        println!("  - {entry}");
    }
    Ok(())
}
