//! Request validation
//!
//! Checks run in a fixed order and stop at the first failure:
//!
//! 1. a winner is designated
//! 2. the win fan is a non-negative multiple of 0.5
//! 3. every multiplier tile count is a non-negative integer
//! 4. every non-winner bonus fan is a non-negative multiple of 0.5
//! 5. the winner claims no bonus fan

use crate::error::ValidationError;
use crate::types::*;
use rust_decimal::Decimal;

/// Validate a request and convert it to engine units
pub fn validate(request: &SettlementRequest) -> Result<ValidatedRequest, ValidationError> {
    let winner = request.winner.ok_or(ValidationError::NoWinnerSelected)?;

    let win_fan = request
        .win_fan
        .and_then(non_negative_fan)
        .ok_or(ValidationError::MissingOrInvalidWinFan)?;

    let mut multiplier_tiles = PositionMap::<u16>::default();
    for position in Position::ALL {
        let count = request.positions[position].multiplier_tile_count;
        multiplier_tiles[position] = u16::try_from(count)
            .map_err(|_| ValidationError::InvalidMultiplierCount(position))?;
    }

    let mut bonus_fans = PositionMap::<Fan>::default();
    for position in Position::others(winner) {
        bonus_fans[position] = non_negative_fan(request.positions[position].bonus_fan)
            .ok_or(ValidationError::InvalidBonusFan(position))?;
    }

    if !request.positions[winner].bonus_fan.is_zero() {
        return Err(ValidationError::WinnerHasBonusFan);
    }

    Ok(ValidatedRequest {
        winner,
        win_fan,
        multiplier_tiles,
        bonus_fans,
        pole_edges: request.pole_edges.clone(),
    })
}

fn non_negative_fan(value: Decimal) -> Option<Fan> {
    Fan::from_decimal(value).filter(|fan| !fan.is_negative())
}
