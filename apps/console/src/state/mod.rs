//! # State Module
//!
//! Session state for the console.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    State Architecture                                   │
//! │                                                                         │
//! │  main()                                                                 │
//! │    ├── ConfigState::load(--config)     read-only after startup          │
//! │    └── BoardState::new(scenario)       mutated by commands              │
//! │                    │                                                    │
//! │          ┌─────────┴──────────┐                                         │
//! │          ▼                    ▼                                         │
//! │  ┌──────────────────┐  ┌──────────────────────────┐                    │
//! │  │   ConfigState    │  │       BoardState         │                    │
//! │  │  sentinels       │  │  session id              │                    │
//! │  │  logging         │  │  AllocationBoard         │                    │
//! │  │  output format   │  │                          │                    │
//! │  └──────────────────┘  └──────────────────────────┘                    │
//! │                                                                         │
//! │  Commands take only the state they need: `&ConfigState`,               │
//! │  `&mut BoardState`, or both.                                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

mod board;
mod config;

pub use board::BoardState;
pub use config::{ConfigState, LogFormat, LoggingConfig, OutputFormat, SentinelConfig};
