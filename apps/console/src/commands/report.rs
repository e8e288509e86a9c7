//! # Report Commands
//!
//! Read-only views over the board: totals and per-order progress.

use tracing::debug;

use allot_core::validation::validate_search_query;
use allot_core::{BoardSummary, OrderProgress, OrderQuery, OrderType};

use crate::error::ApiError;
use crate::state::BoardState;

/// Board-wide totals.
pub fn board_summary(state: &BoardState) -> BoardSummary {
    debug!("board_summary command");
    state.board().summary()
}

/// Orders matching a search, in allocation sequence.
///
/// ## Arguments
/// * `text` - case-insensitive match on order, sub-order, customer, item or
///   remark (empty matches all)
/// * `order_type` - urgency class name, e.g. `emergency`
/// * `shortage_only` - keep only orders with unallocated units
/// * `limit` - cap on rows returned
pub fn list_orders(
    state: &BoardState,
    text: &str,
    order_type: Option<&str>,
    shortage_only: bool,
    limit: Option<usize>,
) -> Result<Vec<OrderProgress>, ApiError> {
    let span = state.span("orders");
    let _enter = span.enter();
    debug!(text, ?order_type, shortage_only, ?limit, "list_orders command");

    let query = OrderQuery {
        text: validate_search_query(text)?,
        order_type: order_type.map(str::parse::<OrderType>).transpose()?,
    };

    let rows = state
        .board()
        .order_progress(&query)
        .into_iter()
        .filter(|row| !shortage_only || row.shortage > 0)
        .take(limit.unwrap_or(usize::MAX))
        .collect();

    Ok(rows)
}
