//! Human-readable settlement breakdown
//!
//! # Example Output
//!
//! ```text
//! 上家 → 雀神: (2-1)×2×10×1 = 20元
//! 下家 → 上家: (1-0.5)×1×10×3 = 15元
//! 对家 顶杠 上家 ×2
//! ```

use crate::types::{Layer, Position, SettlementResult, TransferRecord};
use rust_decimal::Decimal;

/// Render one breakdown record
pub fn render_transfer(record: &TransferRecord, stake_per_fan: Decimal) -> String {
    match record.layer {
        Layer::WinSettlement | Layer::BonusFanSettlement => format!(
            "{} → {}: ({}-{})×{}×{}×{} = {}元",
            record.from_position.label(),
            record.to_position.label(),
            record.gross_fan,
            record.offset_fan,
            record.to_multiplier,
            stake_per_fan.normalize(),
            record.from_multiplier,
            record.amount.normalize(),
        ),
        Layer::PoleRecord => format!(
            "{} 顶杠 {} ×{}",
            record.from_position.label(),
            record.to_position.label(),
            record.pole_count.unwrap_or(1),
        ),
    }
}

/// Render a signed final amount
pub fn render_final_amount(amount: Decimal) -> String {
    let amount = amount.normalize();
    if amount > Decimal::ZERO {
        format!("+{}元", amount)
    } else if amount < Decimal::ZERO {
        format!("{}元", amount)
    } else {
        "0元".to_string()
    }
}

impl SettlementResult {
    /// One line per breakdown record, in application order
    pub fn render_breakdown(&self) -> Vec<String> {
        self.breakdown
            .iter()
            .map(|r| render_transfer(r, self.stake_per_fan))
            .collect()
    }

    /// One `label: amount` line per seat, in settlement order
    pub fn render_final_amounts(&self) -> Vec<String> {
        Position::ALL
            .iter()
            .map(|p| format!("{}: {}", p.label(), render_final_amount(self.final_amounts[*p])))
            .collect()
    }
}
