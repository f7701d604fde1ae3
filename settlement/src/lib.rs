//! Mahjong Settlement Engine
//!
//! Computes zero-sum money transfers for one round of a four-seat
//! house-rules Mahjong game.
//!
//! # Architecture
//!
//! A round flows through two pure stages:
//!
//! 1. **Validation**: reject malformed input and convert fan values to
//!    fixed-point half-fan units
//! 2. **Settlement**: run three layers over a per-seat ledger
//!    - win settlement (non-winners pay the winner)
//!    - bonus fan settlement (non-winners settle among themselves)
//!    - pole record (audit only)
//!
//! Every transfer debits one seat and credits another by the same amount,
//! so the final amounts always sum to zero.
//!
//! # Example
//!
//! ```
//! use mahjong_settlement::{Position, SettlementEngine, SettlementRequest};
//! use rust_decimal::Decimal;
//!
//! let request = SettlementRequest::new(Position::Local, Decimal::from(2))
//!     .with_position(Position::Upstream, 0, Decimal::from(1))
//!     .with_position(Position::Local, 1, Decimal::ZERO)
//!     .with_position(Position::Downstream, 2, Decimal::new(5, 1))
//!     .with_position(Position::Across, 1, Decimal::ZERO);
//!
//! let result = SettlementEngine::default()
//!     .validate_and_settle(&request)
//!     .unwrap();
//!
//! assert_eq!(result.final_amounts[Position::Local], Decimal::from(190));
//! assert!(result.is_balanced());
//! ```

#![forbid(unsafe_code)]
#![warn(
    missing_docs,
    rust_2018_idioms,
    missing_debug_implementations,
    clippy::all
)]

pub mod types;
pub mod validator;
pub mod poles;
pub mod engine;
pub mod formula;
pub mod history;
pub mod error;
pub mod config;

// Re-exports
pub use error::{Error, Result, ValidationError};
pub use types::*;
pub use config::{Config, HistoryConfig};
pub use validator::validate;
pub use poles::{PoleEdges, PoleMatrix};
pub use engine::{settle, SettlementEngine};
pub use history::{HistoryStats, SettlementRecord};
