//! Settlement engine
//!
//! Runs the three settlement layers over a validated request.
//!
//! # Layers
//!
//! 1. **Win settlement**: every non-winner pays the winner
//!    `(win fan - bonus fan) × winner mult × stake × payer mult`.
//! 2. **Bonus fan settlement**: each pair of non-winners with different bonus
//!    fans settles `(high - low) × high mult × stake × low mult`.
//! 3. **Pole record**: one zero-amount entry per pole edge.
//!
//! A pole from `a` to `b` adds one fan to whatever `a` is charged against `b`
//! in layer 1, and to `b`'s bonus fan when `a` and `b` settle in layer 2 (or
//! in layer 1 when `a` is the winner).
//!
//! # Example
//!
//! ```text
//! Winner self, 2 fan, 1 multiplier tile (mult 2), stake 10
//!
//! Layer 1:
//!   upstream   (2-1)×2×10×1   = 20
//!   downstream (2-0.5)×2×10×3 = 90
//!   across     (2-0)×2×10×2   = 80
//!
//! Layer 2:
//!   downstream → upstream (1-0.5)×1×10×3 = 15
//!   across → upstream     (1-0)×1×10×2   = 20
//!   across → downstream   (0.5-0)×3×10×2 = 30
//!
//! Final: self +190, upstream +15, downstream -75, across -130
//! ```

use crate::{
    config::Config,
    error::ValidationError,
    poles::PoleMatrix,
    types::*,
    validator, Result,
};
use rust_decimal::Decimal;

/// Running per-seat balances plus the records that produced them
struct Ledger {
    balances: PositionMap<Decimal>,
    breakdown: Vec<TransferRecord>,
}

impl Ledger {
    fn new() -> Self {
        Self {
            balances: PositionMap::default(),
            breakdown: Vec::new(),
        }
    }

    /// Move `record.amount` from the payer to the receiver and keep the record
    fn post(&mut self, record: TransferRecord) {
        self.balances[record.from_position] -= record.amount;
        self.balances[record.to_position] += record.amount;
        self.breakdown.push(record);
    }
}

/// Settlement engine
#[derive(Debug, Clone)]
pub struct SettlementEngine {
    /// Money per whole fan
    stake_per_fan: Decimal,
}

impl Default for SettlementEngine {
    fn default() -> Self {
        Self {
            stake_per_fan: Config::default().stake_per_fan,
        }
    }
}

impl SettlementEngine {
    /// Create new settlement engine
    pub fn new(config: &Config) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            stake_per_fan: config.stake_per_fan.normalize(),
        })
    }

    /// Money per whole fan
    pub fn stake_per_fan(&self) -> Decimal {
        self.stake_per_fan
    }

    /// Validate a raw request and settle it
    pub fn validate_and_settle(
        &self,
        request: &SettlementRequest,
    ) -> std::result::Result<SettlementResult, ValidationError> {
        match validator::validate(request) {
            Ok(validated) => Ok(self.settle(&validated)),
            Err(err) => {
                tracing::warn!(error = %err, "Rejected settlement request");
                Err(err)
            }
        }
    }

    /// Settle a validated request
    pub fn settle(&self, request: &ValidatedRequest) -> SettlementResult {
        let poles = PoleMatrix::from_edges(request.pole_edges());
        let mut ledger = Ledger::new();

        self.settle_win(request, &poles, &mut ledger);
        self.settle_bonus_fans(request, &poles, &mut ledger);
        self.record_poles(request, &mut ledger);

        let result = SettlementResult {
            winner: request.winner(),
            stake_per_fan: self.stake_per_fan,
            final_amounts: ledger.balances,
            breakdown: ledger.breakdown,
        };

        tracing::info!(
            winner = %result.winner,
            transfers = result.breakdown.len(),
            winner_amount = %result.final_amounts[result.winner],
            "Settlement complete"
        );

        result
    }

    /// Layer 1: every non-winner pays the winner
    fn settle_win(&self, request: &ValidatedRequest, poles: &PoleMatrix, ledger: &mut Ledger) {
        let winner = request.winner();
        let winner_mult = request.multiplier(winner);

        for payer in Position::others(winner) {
            let payer_mult = request.multiplier(payer);
            let gross_fan = request.win_fan() + poles.effect(payer, winner);
            let offset_fan = request.bonus_fan(payer) + poles.effect(winner, payer);
            let effective = gross_fan - offset_fan;
            let amount = self.amount(effective, winner_mult, payer_mult);

            tracing::debug!(
                from = %payer,
                to = %winner,
                fan = %effective,
                %amount,
                "Win settlement"
            );

            ledger.post(TransferRecord {
                from_position: payer,
                to_position: winner,
                layer: Layer::WinSettlement,
                gross_fan,
                offset_fan,
                effective_fan_diff: effective,
                from_multiplier: payer_mult,
                to_multiplier: winner_mult,
                amount,
                pole_count: None,
            });
        }
    }

    /// Layer 2: non-winner pairs settle their bonus fan difference
    fn settle_bonus_fans(
        &self,
        request: &ValidatedRequest,
        poles: &PoleMatrix,
        ledger: &mut Ledger,
    ) {
        let payers: Vec<Position> = Position::others(request.winner()).collect();

        for (i, &a) in payers.iter().enumerate() {
            for &b in &payers[i + 1..] {
                let adj_a = request.bonus_fan(a) + poles.effect(b, a);
                let adj_b = request.bonus_fan(b) + poles.effect(a, b);

                // Equal bonus fans (including 0 == 0) cancel out
                if adj_a == adj_b {
                    continue;
                }

                let ((hi, adj_hi), (lo, adj_lo)) = if adj_a > adj_b {
                    ((a, adj_a), (b, adj_b))
                } else {
                    ((b, adj_b), (a, adj_a))
                };

                let hi_mult = request.multiplier(hi);
                let lo_mult = request.multiplier(lo);
                let diff = adj_hi - adj_lo;
                let amount = self.amount(diff, hi_mult, lo_mult);

                tracing::debug!(from = %lo, to = %hi, fan = %diff, %amount, "Bonus fan settlement");

                ledger.post(TransferRecord {
                    from_position: lo,
                    to_position: hi,
                    layer: Layer::BonusFanSettlement,
                    gross_fan: adj_hi,
                    offset_fan: adj_lo,
                    effective_fan_diff: diff,
                    from_multiplier: lo_mult,
                    to_multiplier: hi_mult,
                    amount,
                    pole_count: None,
                });
            }
        }
    }

    /// Layer 3: audit entries for pole edges; money already moved above
    fn record_poles(&self, request: &ValidatedRequest, ledger: &mut Ledger) {
        for edge in request.pole_edges() {
            ledger.post(TransferRecord {
                from_position: edge.from,
                to_position: edge.to,
                layer: Layer::PoleRecord,
                gross_fan: Fan::ZERO,
                offset_fan: Fan::ZERO,
                effective_fan_diff: Fan::ZERO,
                from_multiplier: request.multiplier(edge.from),
                to_multiplier: request.multiplier(edge.to),
                amount: Decimal::ZERO,
                pole_count: Some(edge.count),
            });
        }
    }

    fn amount(&self, fan: Fan, receiver_mult: u32, payer_mult: u32) -> Decimal {
        fan.to_decimal() * Decimal::from(receiver_mult) * self.stake_per_fan * Decimal::from(payer_mult)
    }
}

/// Settle a validated request at the default stake
pub fn settle(request: &ValidatedRequest) -> SettlementResult {
    SettlementEngine::default().settle(request)
}
