//! Integration tests for the settlement engine
//!
//! Covers the full round lifecycle:
//! - JSON request → validation → settlement → JSON result
//! - Pole recording as done at the table
//! - History records and statistics

use mahjong_settlement::{
    history::prune_expired, Config, Fan, HistoryStats, Layer, PoleEdges, Position,
    SettlementEngine, SettlementRecord, SettlementRequest, ValidationError,
};
use rust_decimal::Decimal;
use std::io::Write;

fn dec(s: &str) -> Decimal {
    s.parse().unwrap()
}

const WORKED_EXAMPLE: &str = r#"{
    "winner": "self",
    "win_fan": 2,
    "positions": {
        "upstream":   { "multiplier_tile_count": 0, "bonus_fan": 1 },
        "self":       { "multiplier_tile_count": 1, "bonus_fan": 0 },
        "downstream": { "multiplier_tile_count": 2, "bonus_fan": 0.5 },
        "across":     { "multiplier_tile_count": 1, "bonus_fan": 0 }
    },
    "pole_edges": []
}"#;

#[test]
fn test_worked_example_from_json() {
    let request: SettlementRequest = serde_json::from_str(WORKED_EXAMPLE).unwrap();
    let result = SettlementEngine::default()
        .validate_and_settle(&request)
        .unwrap();

    assert_eq!(result.final_amounts[Position::Local], dec("190"));
    assert_eq!(result.final_amounts[Position::Upstream], dec("15"));
    assert_eq!(result.final_amounts[Position::Downstream], dec("-75"));
    assert_eq!(result.final_amounts[Position::Across], dec("-130"));

    let win: Vec<Decimal> = result
        .records(Layer::WinSettlement)
        .map(|r| r.amount)
        .collect();
    assert_eq!(win, vec![dec("20"), dec("90"), dec("80")]);

    let bonus: Vec<(Position, Position, Decimal)> = result
        .records(Layer::BonusFanSettlement)
        .map(|r| (r.from_position, r.to_position, r.amount))
        .collect();
    assert_eq!(
        bonus,
        vec![
            (Position::Downstream, Position::Upstream, dec("15")),
            (Position::Across, Position::Upstream, dec("20")),
            (Position::Across, Position::Downstream, dec("30")),
        ]
    );

    // Result serializes with seat names and layer tags
    let json = serde_json::to_value(&result).unwrap();
    assert_eq!(json["winner"], "self");
    assert_eq!(json["breakdown"][0]["layer"], "win_settlement");
    assert_eq!(json["breakdown"][3]["layer"], "bonus_fan_settlement");
    assert!(json["breakdown"][0].get("pole_count").is_none());
}

#[test]
fn test_validation_boundary() {
    let engine = SettlementEngine::default();
    let base: SettlementRequest = serde_json::from_str(WORKED_EXAMPLE).unwrap();

    let mut request = base.clone();
    request.win_fan = Some(dec("0.25"));
    assert_eq!(
        engine.validate_and_settle(&request),
        Err(ValidationError::MissingOrInvalidWinFan)
    );

    let mut request = base.clone();
    request.win_fan = Some(dec("-0.5"));
    assert_eq!(
        engine.validate_and_settle(&request),
        Err(ValidationError::MissingOrInvalidWinFan)
    );

    let mut request = base.clone();
    request.positions[Position::Local].bonus_fan = dec("0.5");
    assert_eq!(
        engine.validate_and_settle(&request),
        Err(ValidationError::WinnerHasBonusFan)
    );

    let mut request = base;
    request.positions[Position::Downstream].multiplier_tile_count = -1;
    assert_eq!(
        engine.validate_and_settle(&request),
        Err(ValidationError::InvalidMultiplierCount(Position::Downstream))
    );
}

#[test]
fn test_missing_winner_from_json() {
    let request: SettlementRequest = serde_json::from_str(r#"{ "win_fan": 1 }"#).unwrap();
    assert_eq!(
        SettlementEngine::default().validate_and_settle(&request),
        Err(ValidationError::NoWinnerSelected)
    );
}

#[test]
fn test_poles_recorded_at_table() {
    // Across poles upstream three times; the edge list keeps one entry
    let mut edges = PoleEdges::new();
    edges.record(Position::Across, Position::Upstream);
    edges.record(Position::Across, Position::Upstream);
    edges.record(Position::Across, Position::Upstream);
    assert_eq!(edges.len(), 1);
    assert_eq!(edges.as_slice()[0].count, 3);

    let mut request = SettlementRequest::new(Position::Local, dec("2"))
        .with_position(Position::Upstream, 0, dec("1"));
    request.pole_edges = edges.into_vec();

    let result = SettlementEngine::default()
        .validate_and_settle(&request)
        .unwrap();

    // Upstream vs across: upstream's adjusted bonus is 1 + 1 = 2 against 0.
    // Poled three times, charged as if poled once.
    let pair = result
        .records(Layer::BonusFanSettlement)
        .find(|r| r.from_position == Position::Across)
        .unwrap();
    assert_eq!(pair.to_position, Position::Upstream);
    assert_eq!(pair.effective_fan_diff, Fan::from_half_units(4));
    assert_eq!(pair.amount, dec("20"));

    let pole = result.records(Layer::PoleRecord).next().unwrap();
    assert_eq!(pole.pole_count, Some(3));
    assert_eq!(pole.amount, Decimal::ZERO);
    assert!(result.is_balanced());
}

#[test]
fn test_history_lifecycle() {
    let engine = SettlementEngine::default();
    let config = Config::default();
    let now = chrono::Utc::now();

    let mut records = Vec::new();
    for (days_ago, winner, fan) in [
        (1, Position::Local, "2"),
        (2, Position::Across, "1"),
        (40, Position::Local, "5"),
    ] {
        let request = SettlementRequest::new(winner, dec(fan));
        let result = engine.validate_and_settle(&request).unwrap();
        let record = SettlementRecord::at(request, result, now - chrono::Duration::days(days_ago))
            .with_user("player-1");

        // Stored as JSON by the caller
        let stored = record.to_json().unwrap();
        records.push(SettlementRecord::from_json(&stored).unwrap());
    }

    let pruned = prune_expired(&mut records, now, config.history.retention().unwrap());
    assert_eq!(pruned, 1);

    let stats = HistoryStats::from_records(&records, Position::Local);
    assert_eq!(stats.total_games, 2);
    assert_eq!(stats.win_count, 1);
    assert_eq!(stats.lose_count, 1);
    assert_eq!(stats.net_amount, dec("50"));
}

#[test]
fn test_engine_from_config_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("settlement.toml");
    let mut file = std::fs::File::create(&path).unwrap();
    writeln!(file, "stake_per_fan = 20").unwrap();

    let config = Config::from_file(&path).unwrap();
    let engine = SettlementEngine::new(&config).unwrap();

    let request: SettlementRequest = serde_json::from_str(WORKED_EXAMPLE).unwrap();
    let result = engine.validate_and_settle(&request).unwrap();
    assert_eq!(result.final_amounts[Position::Local], dec("380"));
    assert!(result.is_balanced());
}
