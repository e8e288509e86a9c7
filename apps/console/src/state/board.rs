//! # Board State
//!
//! The allocation board for one console session, stamped with a session id
//! so every log line of a run can be correlated.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  BoardState                                                             │
//! │  ┌───────────────┐   ┌──────────────────────────────────────────────┐  │
//! │  │ session_id    │   │ AllocationBoard                              │  │
//! │  │ (uuid v4)     │   │  orders • price rules • baseline • live      │  │
//! │  └───────────────┘   │  committed lines • open drafts               │  │
//! │                      └──────────────────────────────────────────────┘  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! A console invocation is single-threaded, so the board is owned outright
//! and commands borrow it mutably.

use tracing::Span;
use uuid::Uuid;

use allot_core::AllocationBoard;

#[derive(Debug)]
pub struct BoardState {
    session_id: Uuid,
    board: AllocationBoard,
}

impl BoardState {
    pub fn new(board: AllocationBoard) -> Self {
        BoardState {
            session_id: Uuid::new_v4(),
            board,
        }
    }

    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    pub fn board(&self) -> &AllocationBoard {
        &self.board
    }

    pub fn board_mut(&mut self) -> &mut AllocationBoard {
        &mut self.board
    }

    /// Span carrying the session id; commands enter it for their duration.
    pub fn span(&self, command: &'static str) -> Span {
        tracing::info_span!("session", id = %self.session_id, command)
    }
}
