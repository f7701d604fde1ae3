//! Settlement history records and statistics
//!
//! Storage is up to the caller; this module only defines the record shape,
//! its JSON encoding, retention pruning, and per-seat statistics.

use crate::types::{Position, SettlementRequest, SettlementResult};
use crate::Result;
use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One settled round as it would be stored
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SettlementRecord {
    /// Record ID
    pub id: Uuid,

    /// When the round was settled
    pub recorded_at: DateTime<Utc>,

    /// Owning user, if signed in
    #[serde(default)]
    pub user_id: Option<String>,

    /// Input as entered
    pub request: SettlementRequest,

    /// Computed settlement
    pub result: SettlementResult,
}

impl SettlementRecord {
    /// Create new record stamped now
    pub fn new(request: SettlementRequest, result: SettlementResult) -> Self {
        Self::at(request, result, Utc::now())
    }

    /// Create new record with an explicit timestamp
    pub fn at(
        request: SettlementRequest,
        result: SettlementResult,
        recorded_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::now_v7(),
            recorded_at,
            user_id: None,
            request,
            result,
        }
    }

    /// Attach an owning user
    pub fn with_user(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }

    /// Encode as JSON
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Decode from JSON
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Net amount for one seat in this round
    pub fn amount_for(&self, position: Position) -> Decimal {
        self.result.final_amounts[position]
    }
}

/// Drop records older than `retention` relative to `now`; returns how many were dropped
///
/// A retention reaching past the earliest representable time keeps everything.
pub fn prune_expired(
    records: &mut Vec<SettlementRecord>,
    now: DateTime<Utc>,
    retention: Duration,
) -> usize {
    let Some(cutoff) = now.checked_sub_signed(retention) else {
        return 0;
    };
    let before = records.len();
    records.retain(|r| r.recorded_at >= cutoff);

    let pruned = before - records.len();
    if pruned > 0 {
        tracing::debug!(pruned, %cutoff, "Pruned expired settlement records");
    }
    pruned
}

/// Win/loss statistics for one seat across many rounds
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryStats {
    /// Rounds counted
    pub total_games: usize,

    /// Rounds with a positive net amount
    pub win_count: usize,

    /// Rounds with a negative net amount
    pub lose_count: usize,

    /// Sum of positive net amounts
    pub total_win_amount: Decimal,

    /// Sum of negative net amounts, as a positive number
    pub total_lose_amount: Decimal,

    /// `total_win_amount - total_lose_amount`
    pub net_amount: Decimal,
}

impl HistoryStats {
    /// Compute statistics for `position` over `records`
    pub fn from_records<'a>(
        records: impl IntoIterator<Item = &'a SettlementRecord>,
        position: Position,
    ) -> Self {
        let mut stats = HistoryStats::default();

        for record in records {
            stats.total_games += 1;

            let amount = record.amount_for(position);
            if amount > Decimal::ZERO {
                stats.win_count += 1;
                stats.total_win_amount += amount;
            } else if amount < Decimal::ZERO {
                stats.lose_count += 1;
                stats.total_lose_amount += amount.abs();
            }
        }

        stats.net_amount = stats.total_win_amount - stats.total_lose_amount;
        stats
    }

    /// Rounds with a zero net amount
    pub fn draw_count(&self) -> usize {
        self.total_games - self.win_count - self.lose_count
    }
}
