//! `rollcall`: drive a fingerprint scanner from the command line.
//!
//! ```text
//! rollcall devices
//! rollcall scan --path /dev/hidraw3
//! rollcall verify <SCANNED> <STORED>
//! rollcall --backend hid serve --database data/rollcall.db
//! ```
//!
//! Results go to stdout as JSON, logs go to stderr.

mod cli;
mod serve;

use anyhow::{Context, Result};
use clap::Parser;
use cli::{BackendKind, Cli, Commands};
use rollcall_biometric::matcher;
use rollcall_hardware::mock::MockHidBackend;
use rollcall_hardware::{AnyHidBackend, FingerprintScanner, ScannerConfig};
use rollcall_service::{FingerprintService, ServiceConfig};
use rollcall_storage::{Database, DatabaseConfig, SqliteStudentRepository};
use serde::Serialize;
use std::time::Duration;
use tokio::io::BufReader;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Err(e) = init_tracing(cli.log_level.as_deref()) {
        eprintln!("Error: {:#}", e);
        std::process::exit(2);
    }

    if let Err(e) = run(cli).await {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn init_tracing(level: Option<&str>) -> Result<()> {
    let filter = match level {
        Some(level) => EnvFilter::try_new(level).context("invalid --log-level")?,
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
    };

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_level(true)
        .with_env_filter(filter.add_directive("sqlx=warn".parse()?))
        .init();
    Ok(())
}

async fn run(cli: Cli) -> Result<()> {
    let scanner = FingerprintScanner::with_config(
        build_backend(&cli)?,
        ScannerConfig::default().with_scan_timeout(Duration::from_millis(cli.scan_timeout_ms)),
    );

    match cli.command {
        Commands::Devices => print_json(&scanner.list_devices()),
        Commands::Scan { path } => {
            let connected = scanner.connect(path.as_deref())?;
            info!("Place a finger on the scanner at {}", connected);
            let captured = scanner.scan().await;
            scanner.disconnect();
            print_json(&captured?)
        }
        Commands::Verify { scanned, stored } => print_json(&matcher::verify(&scanned, &stored)),
        Commands::Serve {
            database,
            min_enroll_quality,
        } => {
            let db = Database::open(DatabaseConfig::new(&database))
                .await
                .with_context(|| format!("opening database {}", database))?;
            let service = FingerprintService::new(
                scanner,
                SqliteStudentRepository::new(db.pool().clone()),
                ServiceConfig::default().min_enroll_quality(min_enroll_quality),
            );

            info!("Serving requests on stdin (database {})", database);
            let served = tokio::select! {
                result = serve::serve_lines(&service, BufReader::new(tokio::io::stdin()), tokio::io::stdout()) => result,
                _ = tokio::signal::ctrl_c() => {
                    info!("Interrupted");
                    Ok(0)
                }
            };

            service.shutdown();
            db.close().await;
            served.map(|_| ())
        }
    }
}

fn build_backend(cli: &Cli) -> Result<AnyHidBackend> {
    match cli.backend {
        BackendKind::Mock => {
            let (backend, handle) = MockHidBackend::with_scanner();
            if let Some(path) = &cli.mock_capture {
                let capture = std::fs::read(path)
                    .with_context(|| format!("reading mock capture {}", path.display()))?;
                info!("Mock scanner primed with {} bytes", capture.len());
                handle.send_chunk(capture);
            }
            Ok(AnyHidBackend::Mock(backend))
        }
        #[cfg(feature = "hardware-hid")]
        BackendKind::Hid => Ok(AnyHidBackend::Hidapi(
            rollcall_hardware::host::HidapiBackend::new()?,
        )),
        #[cfg(not(feature = "hardware-hid"))]
        BackendKind::Hid => {
            anyhow::bail!("the hid backend needs a build with `--features hardware-hid`")
        }
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
