//! Command-line arguments.

use clap::{Parser, Subcommand, ValueEnum};
use rollcall_core::constants::DEFAULT_SCAN_TIMEOUT_MS;
use rollcall_storage::DEFAULT_DATABASE_PATH;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "rollcall")]
#[command(version = rollcall_core::VERSION)]
#[command(about = "Fingerprint scanner enrollment and verification")]
pub struct Cli {
    /// Scanner backend
    #[arg(long, value_enum, default_value_t = BackendKind::Mock, env = "ROLLCALL_BACKEND", global = true)]
    pub backend: BackendKind,

    /// Scan timeout in milliseconds
    #[arg(long, default_value_t = DEFAULT_SCAN_TIMEOUT_MS, env = "ROLLCALL_SCAN_TIMEOUT_MS", global = true)]
    pub scan_timeout_ms: u64,

    /// Log filter, e.g. `debug` or `rollcall_hardware=trace` (defaults to RUST_LOG, then `info`)
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Raw capture file replayed by the mock scanner on its first scan
    #[arg(long, global = true)]
    pub mock_capture: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum BackendKind {
    /// Simulated scanner bus
    Mock,
    /// USB HID scanners through hidapi
    Hid,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List attached fingerprint scanners
    Devices,

    /// Capture one fingerprint and print its template
    Scan {
        /// Device path (first scanner found if omitted)
        #[arg(short, long)]
        path: Option<String>,
    },

    /// Compare two base64 templates
    Verify {
        /// Freshly captured template
        scanned: String,
        /// Enrolled template
        stored: String,
    },

    /// Answer JSON requests on stdin, one per line
    Serve {
        /// SQLite database file
        #[arg(short, long, default_value = DEFAULT_DATABASE_PATH, env = "ROLLCALL_DATABASE")]
        database: String,

        /// Lowest capture quality accepted for enrollment
        #[arg(long, default_value_t = 0, value_parser = clap::value_parser!(u8).range(0..=100))]
        min_enroll_quality: u8,
    },
}
