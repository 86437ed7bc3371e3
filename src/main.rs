// Entrypoint for the dog image backup CLI.
// - Collects the target breed and token (flags, environment or prompts).
// - Initializes logging once, builds both HTTP clients and runs the backup.
// - Any unexpected error is printed in plain words; no panic output.

use anyhow::Result;
use clap::Parser;
use dog_backup::catalog::DogCeoClient;
use dog_backup::config::{normalize_base_url, Config};
use dog_backup::orchestrator::{BackupOrchestrator, RunOutcome};
use dog_backup::storage::DiskClient;
use dog_backup::{logging, ui};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser, Debug)]
#[command(name = "dog-backup", version, about = "Back up dog breed images to Yandex.Disk")]
struct Cli {
    /// Breed to back up; prompted for when neither this nor --all is given
    #[arg(long, conflicts_with = "all")]
    breed: Option<String>,

    /// Back up every breed in the catalog
    #[arg(long)]
    all: bool,

    /// Yandex.Disk OAuth token (falls back to DOG_BACKUP_TOKEN, then a prompt)
    #[arg(long)]
    token: Option<String>,

    /// Where to write the JSON results
    #[arg(long)]
    manifest: Option<PathBuf>,

    /// Where to append log lines
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Root folder on the disk
    #[arg(long)]
    root: Option<String>,

    /// Base URL of the disk API
    #[arg(long)]
    disk_url: Option<String>,

    /// Base URL of the dog catalog API
    #[arg(long)]
    catalog_url: Option<String>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    ui::print_banner();

    match run_app(cli) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            ui::print_failure(&e);
            ExitCode::FAILURE
        }
    }
}

/// Returns whether the backup completed.
fn run_app(cli: Cli) -> Result<bool> {
    let config = apply_overrides(Config::from_env(), &cli);

    let target = if cli.all {
        None
    } else {
        match &cli.breed {
            Some(raw) => Some(ui::normalize_breed(raw)?),
            None => Some(ui::prompt_breed()?),
        }
    };
    let token = match cli.token.as_deref().or(config.token.as_deref()) {
        Some(raw) => ui::normalize_token(raw)?,
        None => ui::prompt_token()?,
    };

    match &target {
        Some(breed) => println!("\nStarting backup for breed: {}", breed),
        None => println!("\nStarting backup for all breeds"),
    }
    println!("Uploading images...\n");

    logging::init(&config.log_path)?;

    let storage = DiskClient::new(&config.disk_url, &token)?;
    let catalog = DogCeoClient::new(&config.catalog_url)?;
    let orchestrator = BackupOrchestrator::new(storage, catalog, config.layout.clone(), config.manifest_path.clone());

    let mut progress = ui::ProgressReporter::new();
    match orchestrator.run(target.as_deref(), &mut progress)? {
        RunOutcome::Completed(report) => {
            let folder = match &target {
                Some(breed) => config.layout.breed_path(breed),
                None => config.layout.images_path(),
            };
            ui::print_completed(&report, &folder, &config.log_path.display().to_string());
            Ok(true)
        }
        RunOutcome::Aborted(reason) => {
            ui::print_aborted(&reason);
            Ok(false)
        }
    }
}

fn apply_overrides(mut config: Config, cli: &Cli) -> Config {
    if let Some(path) = &cli.manifest {
        config.manifest_path = path.clone();
    }
    if let Some(path) = &cli.log_file {
        config.log_path = path.clone();
    }
    if let Some(root) = &cli.root {
        config.layout = config.layout.with_root(root);
    }
    if let Some(url) = &cli.disk_url {
        config.disk_url = normalize_base_url(url);
    }
    if let Some(url) = &cli.catalog_url {
        config.catalog_url = normalize_base_url(url);
    }
    config
}
