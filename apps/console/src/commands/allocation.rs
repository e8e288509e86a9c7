//! # Allocation Commands
//!
//! Automatic allocation over the whole board.
//!
//! ```text
//! ┌──────────────┐   run_allocation    ┌──────────────────────────────┐
//! │   baseline   │ ──────────────────► │ committed lines + live ledger│
//! │   ledger     │ ◄────────────────── │                              │
//! └──────────────┘   reset_allocation  └──────────────────────────────┘
//! ```

use serde::Serialize;
use tracing::{debug, info};

use allot_core::{AllocationResult, BoardSummary};

use crate::state::BoardState;

/// Result of an auto run plus the board totals after it.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunResponse {
    pub session_id: String,
    pub summary: BoardSummary,
    pub result: AllocationResult,
}

/// Runs automatic allocation from the baseline ledger.
pub fn run_allocation(state: &mut BoardState) -> RunResponse {
    let span = state.span("run");
    let _enter = span.enter();

    debug!("run_allocation command");
    let result = state.board_mut().run_auto();
    let summary = state.board().summary();

    info!(
        lines = result.allocations.len(),
        allocated = summary.total_allocated,
        shortage = summary.shortage,
        warnings = result.warnings.len(),
        "Auto allocation finished"
    );

    RunResponse {
        session_id: state.session_id().to_string(),
        summary,
        result,
    }
}

/// Restores the baseline and drops every committed line.
pub fn reset_allocation(state: &mut BoardState) -> BoardSummary {
    let span = state.span("reset");
    let _enter = span.enter();

    debug!("reset_allocation command");
    state.board_mut().reset_to_baseline();
    state.board().summary()
}
