mod dscl;
mod dsconfigad;

use anyhow::Context;
use chrono::Utc;
use clap::Parser;
use dscl::{DsclDirectory, DsclLocalAccount};
use laps_core::engine::{RotationEngine, RotationOutcome};
use laps_core::paths;
use laps_core::settings::Settings;
use std::path::Path;

/// No flags: the process contract is "run once, exit 0 or 1", and all policy
/// flows through the settings store.
#[derive(Parser)]
#[command(
    name = "laps",
    about = "Rotate the local administrator password against the directory",
    version
)]
struct Cli {}

fn main() {
    Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_target(false)
        .init();

    if let Err(e) = run(Path::new("/")) {
        // Print the full error chain (anyhow's alternate Display)
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}

fn run(root: &Path) -> anyhow::Result<()> {
    let binding = dsconfigad::discover().context("resolving directory binding")?;
    tracing::info!(
        domain = %binding.domain,
        trust_account = %binding.trust_account,
        "directory resolved"
    );

    let settings = Settings::load(&paths::settings_path(root));
    let mut directory = DsclDirectory::new(&binding);
    let mut local = DsclLocalAccount::new(root);

    let outcome = RotationEngine::new(&mut directory, &mut local, settings, Utc::now())
        .run()
        .context("password rotation")?;

    match outcome {
        RotationOutcome::NotDue { expires } => {
            tracing::info!(expires = %expires, "no action taken");
        }
        RotationOutcome::Rotated { expires } => {
            tracing::info!(expires = %expires, "password rotated");
        }
    }
    Ok(())
}
