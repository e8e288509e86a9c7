//! # Allot Console Library
//!
//! Everything behind the `allot` binary: configuration, scenario files,
//! commands and output. `main.rs` only parses arguments and wires these
//! together.
//!
//! ## Module Organization
//! ```text
//! allot_console/
//! ├── lib.rs          ◄─── You are here (logging setup)
//! ├── state/
//! │   ├── mod.rs      ◄─── State type exports
//! │   ├── config.rs   ◄─── allot.toml + ALLOT_* environment
//! │   └── board.rs    ◄─── AllocationBoard + session id
//! ├── commands/
//! │   ├── mod.rs      ◄─── Command exports
//! │   ├── allocation.rs ◄─ Auto run, reset
//! │   ├── manual.rs   ◄─── Candidates and draft edits
//! │   └── report.rs   ◄─── Summary and order listing
//! ├── scenario.rs     ◄─── Scenario file format and loading
//! ├── generate.rs     ◄─── Seeded scenario generator
//! ├── output.rs       ◄─── Text / JSON rendering
//! └── error.rs        ◄─── API error type for commands
//! ```
//!
//! ## Invocation Sequence
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       One `allot` Invocation                            │
//! │                                                                         │
//! │  1. Load Configuration ───────────────────────────────────────────────► │
//! │     • defaults → allot.toml → ALLOT_* env                               │
//! │                                                                         │
//! │  2. Initialize Logging ───────────────────────────────────────────────► │
//! │     • tracing-subscriber on stderr, RUST_LOG overrides the config       │
//! │                                                                         │
//! │  3. Load Scenario ────────────────────────────────────────────────────► │
//! │     • JSON → sentinel mapping → cents → validation → AllocationBoard    │
//! │                                                                         │
//! │  4. Run Command ──────────────────────────────────────────────────────► │
//! │     • run / candidates / edit / summary / reset / orders                │
//! │                                                                         │
//! │  5. Print Result ─────────────────────────────────────────────────────► │
//! │     • text or JSON on stdout; ApiError sets the exit code               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod commands;
pub mod error;
pub mod generate;
pub mod output;
pub mod scenario;
pub mod state;

use tracing_subscriber::EnvFilter;

use state::{LogFormat, LoggingConfig};

/// Initializes the tracing subscriber for structured logging.
///
/// ## Log Levels
/// - `RUST_LOG=debug` - Show debug messages
/// - `RUST_LOG=allot_core=trace` - Trace the engine only
/// - Default: `logging.filter` from the configuration
///
/// Logs are written to stderr. Safe to call more than once; later calls
/// are no-ops.
pub fn init_tracing(config: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.filter));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    let _ = match config.format {
        LogFormat::Pretty => builder.try_init(),
        LogFormat::Json => builder.json().with_target(false).try_init(),
    };
}
