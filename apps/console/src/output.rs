//! # Output Rendering
//!
//! Turns command responses into what lands on stdout: pretty JSON for
//! `--json`, or short aligned tables for people.
//!
//! Logs go to stderr (see [`crate::init_tracing`]) so stdout stays
//! parseable.

use std::fmt::Write;

use serde::Serialize;

use allot_core::{AllocationLine, BoardSummary, OrderProgress};

use crate::commands::allocation::RunResponse;
use crate::commands::manual::{CandidatesResponse, EditResponse};
use crate::error::ApiError;
use crate::state::OutputFormat;

/// Plain-text rendering of a response.
pub trait TextReport {
    fn to_text(&self) -> String;
}

/// Renders a response in the requested format.
pub fn render<T>(value: &T, format: OutputFormat) -> Result<String, ApiError>
where
    T: Serialize + TextReport,
{
    match format {
        OutputFormat::Json => {
            serde_json::to_string_pretty(value).map_err(ApiError::serialization)
        }
        OutputFormat::Text => Ok(value.to_text()),
    }
}

// =============================================================================
// Shared Pieces
// =============================================================================

fn lines_table(out: &mut String, lines: &[AllocationLine]) {
    if lines.is_empty() {
        out.push_str("  (no lines)\n");
        return;
    }
    for (idx, line) in lines.iter().enumerate() {
        let _ = writeln!(
            out,
            "  [{}] {:<16} {:<8} {:<8} {:>6} x {:>10} = {:>12}",
            idx,
            line.sub_order_id,
            line.warehouse_id,
            line.supplier_id,
            line.qty,
            line.unit_price().to_string(),
            line.amount().to_string(),
        );
    }
}

impl TextReport for BoardSummary {
    fn to_text(&self) -> String {
        format!(
            "Orders: {}  Lines: {}\n\
             Requested: {}  Allocated: {}  Shortage: {}\n\
             Stock remaining: {}  Credit remaining: {}\n",
            self.order_count,
            self.line_count,
            self.total_request,
            self.total_allocated,
            self.shortage,
            self.stock_remaining,
            self.credit_remaining,
        )
    }
}

// =============================================================================
// Command Responses
// =============================================================================

impl TextReport for RunResponse {
    fn to_text(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "Session {}", self.session_id);
        out.push_str("Allocations:\n");
        lines_table(&mut out, &self.result.allocations);

        if !self.result.warnings.is_empty() {
            let _ = writeln!(out, "Warnings ({}):", self.result.warnings.len());
            for message in self.result.warning_messages() {
                let _ = writeln!(out, "  - {}", message);
            }
        }

        out.push_str(&self.summary.to_text());
        out
    }
}

impl TextReport for CandidatesResponse {
    fn to_text(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "Candidates for {}:", self.sub_order_id);
        if self.candidates.is_empty() {
            out.push_str("  (none)\n");
        }
        for c in &self.candidates {
            let _ = writeln!(
                out,
                "  {:<8} {:<8} {:>8}",
                c.warehouse_id, c.supplier_id, c.remaining_qty
            );
        }
        out
    }
}

impl TextReport for EditResponse {
    fn to_text(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "SubOrder {}", self.sub_order_id);
        out.push_str("Before:\n");
        lines_table(&mut out, &self.before);
        out.push_str("Draft:\n");
        lines_table(&mut out, &self.draft);

        if self.violations.is_empty() {
            out.push_str("Validation: OK\n");
        } else {
            out.push_str("Validation:\n");
            for v in &self.violations {
                let _ = writeln!(out, "  - {}", v);
            }
        }

        if self.committed {
            out.push_str("Committed.\n");
            out.push_str(&self.summary.to_text());
        } else {
            out.push_str("Not committed (pass --commit to apply).\n");
        }
        out
    }
}

impl TextReport for Vec<OrderProgress> {
    fn to_text(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(
            out,
            "{:<18} {:<10} {:<10} {:<10} {:>8} {:>8} {:>8} {:>12}",
            "SUB ORDER", "TYPE", "CUSTOMER", "ITEM", "REQUEST", "ALLOC", "SHORT", "AMOUNT"
        );
        for row in self {
            let _ = writeln!(
                out,
                "{:<18} {:<10} {:<10} {:<10} {:>8} {:>8} {:>8} {:>12}",
                row.sub_order_id,
                row.order_type.to_string(),
                row.customer_id,
                row.item_id,
                row.requested,
                row.allocated,
                row.shortage,
                row.amount.to_string(),
            );
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use allot_core::Money;

    fn summary() -> BoardSummary {
        BoardSummary {
            order_count: 2,
            line_count: 1,
            total_request: 150,
            total_allocated: 100,
            stock_remaining: 250,
            credit_remaining: Money::from_cents(120_000),
            shortage: 50,
        }
    }

    #[test]
    fn test_summary_text() {
        let text = summary().to_text();
        assert!(text.contains("Requested: 150  Allocated: 100  Shortage: 50"));
        assert!(text.contains("Credit remaining: $1200.00"));
    }

    #[test]
    fn test_json_rendering_uses_camel_case() {
        let json = render(&summary(), OutputFormat::Json).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["totalAllocated"], 100);
        assert_eq!(value["creditRemaining"], 120_000);
    }

    #[test]
    fn test_empty_candidates_text() {
        let response = CandidatesResponse {
            sub_order_id: "S-1".into(),
            candidates: vec![],
        };
        assert_eq!(response.to_text(), "Candidates for S-1:\n  (none)\n");
    }
}
