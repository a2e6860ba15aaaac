// CLI tool for sealing API keys stored in plaintext by older revisions.
// Run with: cargo run --bin reseal-credentials -- --help

use anyhow::{Context, Result};
use modelgate_control_plane::services::reseal_legacy_credentials;
use modelgate_storage::{EncryptionService, MasterKey, StorageBackend};
use std::env;

#[derive(Debug)]
struct Args {
    dry_run: bool,
}

impl Args {
    fn parse() -> Result<Self> {
        let mut dry_run = false;

        for arg in env::args().skip(1) {
            match arg.as_str() {
                "--dry-run" | "-n" => dry_run = true,
                "--help" | "-h" => {
                    print_help();
                    std::process::exit(0);
                }
                arg => {
                    eprintln!("Unknown argument: {}", arg);
                    print_help();
                    std::process::exit(1);
                }
            }
        }

        Ok(Self { dry_run })
    }
}

fn print_help() {
    eprintln!(
        r#"
reseal-credentials - Seal plaintext API keys left by older revisions

USAGE:
    reseal-credentials [OPTIONS]

OPTIONS:
    -n, --dry-run           Show what would be changed without making changes
    -h, --help              Show this help message

ENVIRONMENT:
    DATABASE_URL            PostgreSQL connection string (required)
    ENCRYPTION_KEY          Base64 master key, 32 bytes (required)

Rows whose credential is a malformed envelope, or an envelope sealed under a
different key, are reported and left untouched.
"#
    );
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "reseal_credentials=info,modelgate_control_plane=info".into()),
        )
        .init();

    let args = Args::parse()?;

    if let Ok(path) = dotenvy::dotenv() {
        tracing::info!("Loaded .env from {:?}", path);
    }

    let master_key = MasterKey::from_env()
        .context("Failed to load master key. Ensure ENCRYPTION_KEY is set.")?;
    let encryption = EncryptionService::new(&master_key);
    drop(master_key);

    let database_url = env::var("DATABASE_URL").context("DATABASE_URL not set")?;
    let db = StorageBackend::postgres(&database_url)
        .await
        .context("Failed to connect to database")?;
    tracing::info!("Connected to database");

    let report = reseal_legacy_credentials(&db, &encryption, args.dry_run)
        .await
        .context("Failed to reseal credentials")?;

    if args.dry_run {
        tracing::info!(
            "DRY RUN: Would seal {} of {} records",
            report.resealed,
            report.scanned
        );
    } else {
        tracing::info!("Sealed {} of {} records", report.resealed, report.scanned);
    }

    if !report.unreadable.is_empty() {
        tracing::warn!(
            ids = ?report.unreadable,
            "{} record(s) hold credentials that cannot be opened with the current key",
            report.unreadable.len()
        );
    }

    Ok(())
}
