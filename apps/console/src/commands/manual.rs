//! # Manual Override Commands
//!
//! Operator edits to one order's committed allocation.
//!
//! ## Edit Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Manual Edit Lifecycle                                │
//! │                                                                         │
//! │  ┌──────────┐     ┌──────────┐     ┌──────────┐     ┌──────────┐       │
//! │  │ Committed│────►│  Draft   │────►│ Validate │────►│ Committed│       │
//! │  │  lines   │     │  open    │     │          │     │  (new)   │       │
//! │  └──────────┘     └──────────┘     └──────────┘     └──────────┘       │
//! │                        │                 │                              │
//! │                   --set IDX=QTY     violations?                         │
//! │                   --add WH/SP=QTY        │                              │
//! │                                          ▼                              │
//! │                              printed, or EDIT_REJECTED on --commit     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::str::FromStr;

use serde::Serialize;
use tracing::{debug, info};

use allot_core::{AllocationLine, BoardSummary, CandidateSource, EditViolation, SourceFilter};

use crate::error::ApiError;
use crate::state::{BoardState, SentinelConfig};

// =============================================================================
// Edit Arguments
// =============================================================================

/// `IDX=QTY`: set draft line `IDX` to `QTY` units (0 removes the line).
#[derive(Debug, Clone, PartialEq)]
pub struct LineEdit {
    pub index: usize,
    pub qty: f64,
}

impl FromStr for LineEdit {
    type Err = ApiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (index, qty) = s
            .split_once('=')
            .ok_or_else(|| ApiError::validation(format!("Expected IDX=QTY, got '{}'", s)))?;

        let index = index
            .trim()
            .parse()
            .map_err(|_| ApiError::validation(format!("Invalid line index '{}'", index.trim())))?;
        let qty = parse_qty(qty)?;

        Ok(LineEdit { index, qty })
    }
}

/// `WH/SP=QTY`: add a draft line drawing `QTY` units from one source.
#[derive(Debug, Clone, PartialEq)]
pub struct LineAdd {
    pub warehouse_id: String,
    pub supplier_id: String,
    pub qty: f64,
}

impl FromStr for LineAdd {
    type Err = ApiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let malformed = || ApiError::validation(format!("Expected WH/SP=QTY, got '{}'", s));

        let (source, qty) = s.split_once('=').ok_or_else(malformed)?;
        let (warehouse_id, supplier_id) = source.split_once('/').ok_or_else(malformed)?;
        let (warehouse_id, supplier_id) = (warehouse_id.trim(), supplier_id.trim());
        if warehouse_id.is_empty() || supplier_id.is_empty() {
            return Err(malformed());
        }

        Ok(LineAdd {
            warehouse_id: warehouse_id.to_string(),
            supplier_id: supplier_id.to_string(),
            qty: parse_qty(qty)?,
        })
    }
}

fn parse_qty(raw: &str) -> Result<f64, ApiError> {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|q| q.is_finite())
        .ok_or_else(|| ApiError::validation(format!("Invalid quantity '{}'", raw.trim())))
}

/// One edit session against one order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EditRequest {
    pub sub_order_id: String,
    /// Quantity changes, by index into the committed lines.
    pub sets: Vec<LineEdit>,
    /// New lines, appended after the sets are applied.
    pub adds: Vec<LineAdd>,
    pub commit: bool,
}

// =============================================================================
// Responses
// =============================================================================

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CandidatesResponse {
    pub sub_order_id: String,
    pub candidates: Vec<CandidateSource>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EditResponse {
    pub sub_order_id: String,
    /// Committed lines before the edit.
    pub before: Vec<AllocationLine>,
    /// The draft after every set and add.
    pub draft: Vec<AllocationLine>,
    pub violations: Vec<EditViolation>,
    pub committed: bool,
    pub summary: BoardSummary,
}

// =============================================================================
// Commands
// =============================================================================

fn source_filter(raw: Option<&str>, sentinel: &str) -> SourceFilter {
    raw.map(|id| SourceFilter::from_sentinel(id, sentinel))
        .unwrap_or(SourceFilter::Any)
}

/// Lists the sources an operator may pick for one order.
///
/// ## Arguments
/// * `warehouse` / `supplier` - optional narrowing; the configured "any"
///   sentinel ids mean no narrowing
pub fn list_candidates(
    state: &BoardState,
    sentinels: &SentinelConfig,
    sub_order_id: &str,
    warehouse: Option<&str>,
    supplier: Option<&str>,
) -> Result<CandidatesResponse, ApiError> {
    let span = state.span("candidates");
    let _enter = span.enter();
    debug!(sub_order_id, ?warehouse, ?supplier, "list_candidates command");

    let candidates = state.board().list_manual_candidates(
        sub_order_id,
        &source_filter(warehouse, &sentinels.any_warehouse),
        &source_filter(supplier, &sentinels.any_supplier),
    )?;

    Ok(CandidatesResponse {
        sub_order_id: sub_order_id.to_string(),
        candidates,
    })
}

/// Opens a draft for one order, applies the requested edits, validates,
/// and commits when asked.
///
/// Sets are applied highest index first, so every index refers to the
/// committed lines as they were before the edit even when a set removes a
/// line.
///
/// ## Errors
/// - `NOT_FOUND` for an unknown sub-order, line index or price rule
/// - `EDIT_REJECTED` when `commit` is set and the draft has violations;
///   the board is left as it was
pub fn edit_order(state: &mut BoardState, request: &EditRequest) -> Result<EditResponse, ApiError> {
    let span = state.span("edit");
    let _enter = span.enter();
    let sub_order_id = request.sub_order_id.as_str();
    debug!(
        sub_order_id,
        sets = request.sets.len(),
        adds = request.adds.len(),
        commit = request.commit,
        "edit_order command"
    );

    let board = state.board_mut();
    let before = board.begin_edit(sub_order_id)?.to_vec();

    let mut sets: Vec<&LineEdit> = request.sets.iter().collect();
    sets.sort_by(|a, b| b.index.cmp(&a.index));
    for set in sets {
        board.update_edited_line_qty(sub_order_id, set.index, set.qty)?;
    }

    for add in &request.adds {
        let added =
            board.add_edited_line(sub_order_id, &add.warehouse_id, &add.supplier_id, add.qty)?;
        if !added {
            debug!(
                warehouse_id = %add.warehouse_id,
                supplier_id = %add.supplier_id,
                "Zero-quantity line ignored"
            );
        }
    }

    let violations = board.validate_edits(sub_order_id)?;
    let draft = board.edited_lines(sub_order_id).unwrap_or_default().to_vec();

    let mut committed = false;
    if request.commit {
        if !violations.is_empty() {
            board.discard_edit(sub_order_id);
            return Err(ApiError::edit_rejected(sub_order_id, &violations));
        }
        committed = board.commit_edits(sub_order_id)?;
        info!(sub_order_id, committed, "Manual edit processed");
    }

    Ok(EditResponse {
        sub_order_id: sub_order_id.to_string(),
        before,
        draft,
        violations,
        committed,
        summary: board.summary(),
    })
}
