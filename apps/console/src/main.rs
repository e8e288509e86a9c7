//! # Allot Console Entry Point
//!
//! ```text
//! allot --scenario demo.json run
//! allot --scenario demo.json candidates --sub-order ORDER-0001-001 --supplier SP-002
//! allot --scenario demo.json edit --sub-order ORDER-0001-001 --set 0=5 --add WH-001/SP-002=10 --commit
//! allot --scenario demo.json orders --type emergency --shortage-only --limit 20
//! allot --scenario demo.json --json summary
//! allot --scenario demo.json reset
//! allot generate --orders 5000 --seed 99999 --out demo.json
//! ```
//!
//! Every scenario command starts from the file's ledger and runs automatic
//! allocation first, so manual edits apply on top of the auto result.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::info;

use allot_console::commands::allocation::{reset_allocation, run_allocation};
use allot_console::commands::manual::{edit_order, list_candidates, EditRequest, LineAdd, LineEdit};
use allot_console::commands::report::{board_summary, list_orders};
use allot_console::error::ApiError;
use allot_console::generate::{generate_scenario, GeneratorConfig};
use allot_console::output::render;
use allot_console::scenario::Scenario;
use allot_console::state::{BoardState, ConfigState, OutputFormat};
use allot_console::init_tracing;

#[derive(Parser, Debug)]
#[command(name = "allot")]
#[command(about = "Allocate scarce stock and customer credit across competing orders")]
#[command(version)]
struct Cli {
    /// Scenario JSON file (orders, inventory, credits, priceRules)
    #[arg(long, global = true)]
    scenario: Option<PathBuf>,

    /// Config file (default: allot.toml in the platform config directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Print JSON instead of text
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run automatic allocation and print every line and warning
    Run,

    /// List the sources an order may be manually allocated from
    Candidates {
        #[arg(long)]
        sub_order: String,

        /// Narrow to one warehouse
        #[arg(long)]
        warehouse: Option<String>,

        /// Narrow to one supplier
        #[arg(long)]
        supplier: Option<String>,
    },

    /// Edit one order's allocation, validate, and optionally commit
    Edit {
        #[arg(long)]
        sub_order: String,

        /// Set line quantity, IDX=QTY (0 removes the line)
        #[arg(long = "set", value_name = "IDX=QTY")]
        sets: Vec<LineEdit>,

        /// Add a line from a source, WH/SP=QTY
        #[arg(long = "add", value_name = "WH/SP=QTY")]
        adds: Vec<LineAdd>,

        /// Apply the edit if it validates
        #[arg(long)]
        commit: bool,
    },

    /// Board totals after automatic allocation
    Summary,

    /// Board totals with every allocation undone (the baseline ledger)
    Reset,

    /// Per-order progress after automatic allocation
    Orders {
        /// Match order, sub-order, customer, item or remark
        #[arg(long, default_value = "")]
        search: String,

        /// Urgency class (emergency, claim, overdue, daily)
        #[arg(long = "type")]
        order_type: Option<String>,

        /// Only orders with unallocated units
        #[arg(long)]
        shortage_only: bool,

        #[arg(long)]
        limit: Option<usize>,
    },

    /// Write a seeded demo scenario
    Generate {
        #[arg(long, default_value = "5000")]
        orders: usize,

        #[arg(long, default_value = "99999")]
        seed: u64,

        /// Output file (stdout when omitted)
        #[arg(long)]
        out: Option<PathBuf>,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match ConfigState::load(cli.config.clone()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}", e);
            return ExitCode::from(e.code.exit_code() as u8);
        }
    };
    init_tracing(&config.logging);

    let format = if cli.json {
        OutputFormat::Json
    } else {
        config.output
    };

    match run(cli, &config, format) {
        Ok(text) => {
            println!("{}", text.trim_end());
            ExitCode::SUCCESS
        }
        Err(e) => {
            report_error(&e, format);
            ExitCode::from(e.code.exit_code() as u8)
        }
    }
}

fn report_error(error: &ApiError, format: OutputFormat) {
    #[derive(Serialize)]
    struct ErrorBody<'a> {
        error: &'a ApiError,
    }

    match format {
        OutputFormat::Json => match serde_json::to_string_pretty(&ErrorBody { error }) {
            Ok(json) => println!("{}", json),
            Err(_) => eprintln!("{}", error),
        },
        OutputFormat::Text => eprintln!("error: {}", error.message),
    }
}

fn load_board(cli: &Cli, config: &ConfigState) -> Result<BoardState, ApiError> {
    let path = cli
        .scenario
        .as_deref()
        .ok_or_else(|| ApiError::validation("--scenario is required for this command"))?;
    let scenario = Scenario::load(path, &config.sentinels)?;
    Ok(BoardState::new(scenario.into_board()))
}

fn run(cli: Cli, config: &ConfigState, format: OutputFormat) -> Result<String, ApiError> {
    if let Command::Generate { orders, seed, out } = &cli.command {
        let generator = GeneratorConfig {
            order_count: *orders,
            seed: *seed,
            ..GeneratorConfig::default()
        };
        let file = generate_scenario(&generator, &config.sentinels);
        let json = serde_json::to_string_pretty(&file).map_err(ApiError::serialization)?;
        return match out {
            Some(path) => {
                std::fs::write(path, json)?;
                info!(?path, "Scenario written");
                Ok(format!("Wrote {} orders to {}", file.orders.len(), path.display()))
            }
            None => Ok(json),
        };
    }

    let mut state = load_board(&cli, config)?;
    let auto = run_allocation(&mut state);

    match cli.command {
        Command::Run => render(&auto, format),
        Command::Candidates {
            sub_order,
            warehouse,
            supplier,
        } => {
            let response = list_candidates(
                &state,
                &config.sentinels,
                &sub_order,
                warehouse.as_deref(),
                supplier.as_deref(),
            )?;
            render(&response, format)
        }
        Command::Edit {
            sub_order,
            sets,
            adds,
            commit,
        } => {
            let request = EditRequest {
                sub_order_id: sub_order,
                sets,
                adds,
                commit,
            };
            render(&edit_order(&mut state, &request)?, format)
        }
        Command::Summary => render(&board_summary(&state), format),
        Command::Reset => render(&reset_allocation(&mut state), format),
        Command::Orders {
            search,
            order_type,
            shortage_only,
            limit,
        } => {
            let rows = list_orders(&state, &search, order_type.as_deref(), shortage_only, limit)?;
            render(&rows, format)
        }
        Command::Generate { .. } => Err(ApiError::internal("generate handled above")),
    }
}
