use anyhow::{Context, Result};
use clap::Parser;
use std::path::Path;

use ravcat::cli::{Cli, Commands};
use ravcat::config::{self, AppConfig};
use ravcat::directory::{Directory, Entity};
use ravcat::loader::{DirectoryLoader, LoadOutcome};
use ravcat::logger::{self, VerbosityLevel};
use ravcat::lookup;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    logger::init(VerbosityLevel::from_verbose_count(cli.verbose));

    if let Commands::Init = cli.command {
        let path = AppConfig::create_default_config().context("Failed to create configuration file")?;
        println!("Created default configuration file at: {}", path.display());
        return Ok(());
    }

    let app_config = load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Company { name } => {
            let loader = DirectoryLoader::companies(&app_config.companies)?;
            let outcome = loader.load().await?;
            show_lookup(&Commands::joined(&name), &outcome, "Company")
        }
        Commands::Vendor { name } => {
            let loader = DirectoryLoader::vendors(&app_config.vendors)?;
            let outcome = loader.load().await?;
            show_lookup(&Commands::joined(&name), &outcome, "Vendor")
        }
        Commands::List { vendors } => {
            let loader = if vendors {
                DirectoryLoader::vendors(&app_config.vendors)?
            } else {
                DirectoryLoader::companies(&app_config.companies)?
            };
            let outcome = loader.load().await?;
            show_list(outcome.directory());
            Ok(())
        }
        Commands::Init => Ok(()),
    }
}

/// An explicit `--config` must exist; the default location is optional.
fn load_config(path: Option<&Path>) -> Result<AppConfig> {
    match path {
        Some(path) => AppConfig::load_from_path(path)
            .with_context(|| format!("Failed to load configuration from {}", path.display())),
        None if Path::new(config::CONFIG_PATH).exists() => {
            AppConfig::load().with_context(|| format!("Failed to load {}", config::CONFIG_PATH))
        }
        None => {
            tracing::debug!("No configuration file, using built-in defaults");
            Ok(AppConfig::default())
        }
    }
}

fn show_lookup(term: &str, outcome: &LoadOutcome, label: &str) -> Result<()> {
    let directory = outcome.directory();
    match lookup::find(term, directory) {
        Some(entity) => {
            print_entity(entity);
            if outcome.is_fallback() {
                println!();
                println!("(offline data, remote directory unavailable)");
            }
            Ok(())
        }
        None => {
            eprintln!("{} \"{}\" not found among {} entries.", label, term, directory.len());
            eprintln!("Use `ravcat list` to see every available name.");
            std::process::exit(1);
        }
    }
}

fn print_entity(entity: &Entity) {
    println!("{} [{}]", entity.name, entity.classification);
    if let Some(message) = &entity.message {
        println!("  {}", message);
    }
    for contact in &entity.contacts {
        println!("  {:<5} {}", contact.kind, contact.value);
        if let Some(description) = &contact.description {
            println!("        {}", description);
        }
    }
}

fn show_list(directory: &Directory) {
    let counts = lookup::count_by_classification(directory);
    println!(
        "{} entries (email: {}, form: {}, multiple: {}) from {}, updated {}",
        counts.total(),
        counts.email,
        counts.form,
        counts.multiple,
        directory.source_url,
        directory.last_updated
    );
    for (index, name) in lookup::sorted_names(directory).iter().enumerate() {
        if let Some(entity) = directory.get(name) {
            println!("{:>4}. {} [{}]", index + 1, name, entity.classification);
        }
    }
}
