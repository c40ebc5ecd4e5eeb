use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::error::{DoctorError, Result};
use crate::stamp::{Drift, check_sources, manifest_version, stamp_sources, sync_versions};

#[derive(Debug, Parser)]
#[command(
    name = "doctor_frankendom",
    about = "Source header stamping and version maintenance for FrankenDOM",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Args)]
pub struct SourceArgs {
    /// Directory holding the source files to process.
    #[arg(long, default_value = "src")]
    pub src: PathBuf,

    /// Manifest to read the package version from.
    #[arg(long, default_value = "Cargo.toml")]
    pub manifest: PathBuf,

    /// File extension to process.
    #[arg(long, default_value = "rs")]
    pub ext: String,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Prepend the license/version header to unstamped source files.
    Stamp(SourceArgs),

    /// Rewrite stamped headers to the manifest version.
    #[command(name = "sync-version")]
    SyncVersion(SourceArgs),

    /// Report files with a missing or stale header (exit 2 on drift).
    Check(SourceArgs),
}

pub fn run_from_env() -> Result<()> {
    let cli = Cli::parse();
    run(cli)
}

pub fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Stamp(args) => {
            let version = manifest_version(&args.manifest)?;
            let outcome = stamp_sources(&args.src, &args.ext, &version)?;
            for path in &outcome.stamped {
                println!("stamped {}", path.display());
            }
            for path in &outcome.skipped {
                println!("skipped {} (already stamped)", path.display());
            }
            Ok(())
        }
        Commands::SyncVersion(args) => {
            let version = manifest_version(&args.manifest)?;
            let outcome = sync_versions(&args.src, &args.ext, &version)?;
            for path in &outcome.updated {
                println!("updated {} to v{version}", path.display());
            }
            for path in &outcome.unstamped {
                println!("skipped {} (no header)", path.display());
            }
            Ok(())
        }
        Commands::Check(args) => {
            let version = manifest_version(&args.manifest)?;
            let drift = check_sources(&args.src, &args.ext, &version)?;
            for item in &drift {
                match item {
                    Drift::Missing(path) => println!("missing header: {}", path.display()),
                    Drift::Stale { path, found } => {
                        println!("stale header: {} (v{found}, want v{version})", path.display());
                    }
                }
            }
            if drift.is_empty() {
                Ok(())
            } else {
                Err(DoctorError::Drift { files: drift.len() })
            }
        }
    }
}
