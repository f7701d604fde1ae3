//! Core types for the settlement engine

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::ops::{Add, Index, IndexMut, Sub};

/// One of the four seats at the table
///
/// Declaration order is the iteration order used by every settlement layer,
/// and it decides which seat of a pair is visited first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum Position {
    /// Seat before the local player
    Upstream = 0,
    /// The player whose device records the round
    #[serde(rename = "self")]
    Local = 1,
    /// Seat after the local player
    Downstream = 2,
    /// Seat opposite the local player
    Across = 3,
}

impl Position {
    /// All seats in settlement order
    pub const ALL: [Position; 4] = [
        Position::Upstream,
        Position::Local,
        Position::Downstream,
        Position::Across,
    ];

    /// Seats other than `excluded`, in settlement order
    pub fn others(excluded: Position) -> impl Iterator<Item = Position> {
        Self::ALL.into_iter().filter(move |p| *p != excluded)
    }

    /// Slot index in settlement order
    pub fn index(self) -> usize {
        self as usize
    }

    /// Table label shown to players
    pub fn label(self) -> &'static str {
        match self {
            Position::Upstream => "上家",
            Position::Local => "雀神",
            Position::Downstream => "下家",
            Position::Across => "对家",
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Position::Upstream => "upstream",
            Position::Local => "self",
            Position::Downstream => "downstream",
            Position::Across => "across",
        };
        f.write_str(name)
    }
}

/// Fan count stored as whole half-fan units
///
/// Every fan value in a round is a multiple of 0.5, so the engine never
/// touches a fractional number until an amount is produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Fan(i64);

impl Fan {
    /// Zero fan
    pub const ZERO: Fan = Fan(0);

    /// One whole fan (the adjustment a pole applies)
    pub const ONE: Fan = Fan(2);

    /// Build from half-fan units
    pub const fn from_half_units(half_units: i64) -> Self {
        Fan(half_units)
    }

    /// Half-fan units
    pub const fn half_units(self) -> i64 {
        self.0
    }

    /// Convert a decimal fan value
    ///
    /// Returns `None` unless the value is an exact multiple of 0.5 whose
    /// half-unit count fits in an `i32`.
    pub fn from_decimal(value: Decimal) -> Option<Self> {
        let halves = value.checked_mul(Decimal::from(2))?;
        if !halves.fract().is_zero() {
            return None;
        }
        halves.to_i32().map(|h| Fan(i64::from(h)))
    }

    /// Decimal value of this fan count
    pub fn to_decimal(self) -> Decimal {
        (Decimal::from(self.0) / Decimal::from(2)).normalize()
    }

    /// Check if below zero
    pub fn is_negative(self) -> bool {
        self.0 < 0
    }
}

impl Add for Fan {
    type Output = Fan;

    fn add(self, rhs: Fan) -> Fan {
        Fan(self.0 + rhs.0)
    }
}

impl Sub for Fan {
    type Output = Fan;

    fn sub(self, rhs: Fan) -> Fan {
        Fan(self.0 - rhs.0)
    }
}

impl fmt::Display for Fan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_decimal())
    }
}

impl Serialize for Fan {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        Serialize::serialize(&self.to_decimal(), serializer)
    }
}

impl<'de> Deserialize<'de> for Fan {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = <Decimal as Deserialize>::deserialize(deserializer)?;
        Fan::from_decimal(value).ok_or_else(|| {
            serde::de::Error::custom(format!("fan value {} is not a multiple of 0.5", value))
        })
    }
}

/// One value per seat
///
/// Every seat always has a slot, so lookups by [`Position`] cannot miss.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PositionMap<T> {
    /// Upstream seat
    pub upstream: T,
    /// Local player's seat
    #[serde(rename = "self")]
    pub local: T,
    /// Downstream seat
    pub downstream: T,
    /// Across seat
    pub across: T,
}

impl<T> PositionMap<T> {
    /// Build a map by evaluating `f` for each seat in settlement order
    pub fn from_fn(mut f: impl FnMut(Position) -> T) -> Self {
        Self {
            upstream: f(Position::Upstream),
            local: f(Position::Local),
            downstream: f(Position::Downstream),
            across: f(Position::Across),
        }
    }

    /// Iterate seats and values in settlement order
    pub fn iter(&self) -> impl Iterator<Item = (Position, &T)> {
        Position::ALL.into_iter().map(move |p| (p, &self[p]))
    }

    /// Transform each value
    pub fn map<U>(&self, mut f: impl FnMut(Position, &T) -> U) -> PositionMap<U> {
        PositionMap::from_fn(|p| f(p, &self[p]))
    }
}

impl<T> Index<Position> for PositionMap<T> {
    type Output = T;

    fn index(&self, position: Position) -> &T {
        match position {
            Position::Upstream => &self.upstream,
            Position::Local => &self.local,
            Position::Downstream => &self.downstream,
            Position::Across => &self.across,
        }
    }
}

impl<T> IndexMut<Position> for PositionMap<T> {
    fn index_mut(&mut self, position: Position) -> &mut T {
        match position {
            Position::Upstream => &mut self.upstream,
            Position::Local => &mut self.local,
            Position::Downstream => &mut self.downstream,
            Position::Across => &mut self.across,
        }
    }
}

/// Raw per-seat input as collected from the table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PositionInput {
    /// Multiplier tiles held (effective multiplier is count + 1)
    #[serde(default)]
    pub multiplier_tile_count: i64,

    /// Bonus fan claimed by a non-winner
    #[serde(default)]
    pub bonus_fan: Decimal,
}

impl PositionInput {
    /// Create new seat input
    pub fn new(multiplier_tile_count: i64, bonus_fan: Decimal) -> Self {
        Self {
            multiplier_tile_count,
            bonus_fan,
        }
    }
}

/// Directed pole relation: `from` poled `to`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PoleEdge {
    /// Seat that poled
    pub from: Position,

    /// Seat that was poled
    pub to: Position,

    /// Times the pole was recorded (shown in the audit layer only)
    pub count: u32,
}

impl PoleEdge {
    /// Create new pole edge
    pub fn new(from: Position, to: Position, count: u32) -> Self {
        Self { from, to, count }
    }
}

/// Unvalidated settlement input
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SettlementRequest {
    /// Seat that won the hand
    pub winner: Option<Position>,

    /// Fan value of the winning hand
    pub win_fan: Option<Decimal>,

    /// Per-seat input
    #[serde(default)]
    pub positions: PositionMap<PositionInput>,

    /// Pole relations recorded during the hand
    #[serde(default)]
    pub pole_edges: Vec<PoleEdge>,
}

impl SettlementRequest {
    /// Create a request with a winner and win fan; seats start empty
    pub fn new(winner: Position, win_fan: Decimal) -> Self {
        Self {
            winner: Some(winner),
            win_fan: Some(win_fan),
            ..Default::default()
        }
    }

    /// Set one seat's multiplier tile count and bonus fan
    pub fn with_position(
        mut self,
        position: Position,
        multiplier_tile_count: i64,
        bonus_fan: Decimal,
    ) -> Self {
        self.positions[position] = PositionInput::new(multiplier_tile_count, bonus_fan);
        self
    }

    /// Append a pole edge
    pub fn with_pole_edge(mut self, from: Position, to: Position, count: u32) -> Self {
        self.pole_edges.push(PoleEdge::new(from, to, count));
        self
    }
}

/// Request that passed validation, in engine units
///
/// Only [`crate::validator::validate`] builds one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedRequest {
    pub(crate) winner: Position,
    pub(crate) win_fan: Fan,
    pub(crate) multiplier_tiles: PositionMap<u16>,
    pub(crate) bonus_fans: PositionMap<Fan>,
    pub(crate) pole_edges: Vec<PoleEdge>,
}

impl ValidatedRequest {
    /// Winning seat
    pub fn winner(&self) -> Position {
        self.winner
    }

    /// Win fan
    pub fn win_fan(&self) -> Fan {
        self.win_fan
    }

    /// Effective multiplier of a seat (tile count + 1)
    pub fn multiplier(&self, position: Position) -> u32 {
        u32::from(self.multiplier_tiles[position]) + 1
    }

    /// Bonus fan of a seat; always zero for the winner
    pub fn bonus_fan(&self, position: Position) -> Fan {
        self.bonus_fans[position]
    }

    /// Pole edges in request order
    pub fn pole_edges(&self) -> &[PoleEdge] {
        &self.pole_edges
    }
}

/// Settlement pass that produced a transfer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Layer {
    /// Non-winners pay the winner
    WinSettlement,
    /// Non-winners settle bonus fan differences among themselves
    BonusFanSettlement,
    /// Audit entry for a pole relation; carries no money
    PoleRecord,
}

/// One line of the settlement breakdown
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferRecord {
    /// Paying seat
    pub from_position: Position,

    /// Receiving seat
    pub to_position: Position,

    /// Layer that produced this record
    pub layer: Layer,

    /// Fan charged before offsets (adjusted win fan, or the higher bonus fan)
    pub gross_fan: Fan,

    /// Fan subtracted from `gross_fan`
    pub offset_fan: Fan,

    /// `gross_fan - offset_fan`; negative when money flows back
    pub effective_fan_diff: Fan,

    /// Multiplier of the paying seat
    pub from_multiplier: u32,

    /// Multiplier of the receiving seat
    pub to_multiplier: u32,

    /// Amount moved from `from_position` to `to_position`
    pub amount: Decimal,

    /// Recorded pole count (pole records only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pole_count: Option<u32>,
}

/// Settlement output
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettlementResult {
    /// Winning seat
    pub winner: Position,

    /// Money per whole fan used for every amount
    pub stake_per_fan: Decimal,

    /// Net amount per seat (positive = receives)
    pub final_amounts: PositionMap<Decimal>,

    /// Every transfer in the order it was applied
    pub breakdown: Vec<TransferRecord>,
}

impl SettlementResult {
    /// Sum of all final amounts; zero for every result the engine produces
    pub fn net_total(&self) -> Decimal {
        self.final_amounts.iter().map(|(_, amount)| *amount).sum()
    }

    /// Check the zero-sum invariant
    pub fn is_balanced(&self) -> bool {
        self.net_total().is_zero()
    }

    /// Records produced by one layer
    pub fn records(&self, layer: Layer) -> impl Iterator<Item = &TransferRecord> {
        self.breakdown.iter().filter(move |r| r.layer == layer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fan_from_decimal() {
        assert_eq!(Fan::from_decimal(Decimal::new(15, 1)), Some(Fan::from_half_units(3)));
        assert_eq!(Fan::from_decimal(Decimal::from(2)), Some(Fan::from_half_units(4)));
        assert_eq!(Fan::from_decimal(Decimal::new(-5, 1)), Some(Fan::from_half_units(-1)));

        // 0.25 is not a half-fan multiple
        assert_eq!(Fan::from_decimal(Decimal::new(25, 2)), None);

        // Beyond the representable range
        assert_eq!(Fan::from_decimal(Decimal::from(i64::MAX)), None);
    }

    #[test]
    fn test_fan_to_decimal() {
        assert_eq!(Fan::from_half_units(3).to_decimal(), Decimal::new(15, 1));
        assert_eq!(Fan::from_half_units(4).to_string(), "2");
        assert_eq!(Fan::from_half_units(-1).to_string(), "-0.5");
        assert_eq!((Fan::ONE + Fan::from_half_units(1)).to_string(), "1.5");

        // Extreme half-unit counts convert without overflow
        assert_eq!(
            Fan::from_half_units(i64::MAX).to_decimal(),
            Decimal::from(i64::MAX) / Decimal::from(2)
        );
        assert_eq!(Fan::from_half_units(i64::MIN + 1).to_string(), "-4611686018427387903.5");
    }

    #[test]
    fn test_fan_serde() {
        let fan: Fan = serde_json::from_str("\"1.5\"").unwrap();
        assert_eq!(fan, Fan::from_half_units(3));

        let fan: Fan = serde_json::from_str("2").unwrap();
        assert_eq!(fan, Fan::from_half_units(4));

        assert!(serde_json::from_str::<Fan>("0.25").is_err());

        let json = serde_json::to_string(&Fan::from_half_units(-3)).unwrap();
        assert_eq!(json, "\"-1.5\"");
        assert_eq!(serde_json::from_str::<Fan>(&json).unwrap(), Fan::from_half_units(-3));
    }

    #[test]
    fn test_position_order() {
        assert_eq!(
            Position::others(Position::Local).collect::<Vec<_>>(),
            vec![Position::Upstream, Position::Downstream, Position::Across]
        );
        for (i, position) in Position::ALL.iter().enumerate() {
            assert_eq!(position.index(), i);
        }
    }

    #[test]
    fn test_position_map_serde() {
        let map = PositionMap::from_fn(|p| p.index() as u32);
        let json = serde_json::to_value(map).unwrap();
        assert_eq!(json["self"], 1);
        assert_eq!(json["across"], 3);

        let back: PositionMap<u32> = serde_json::from_value(json).unwrap();
        assert_eq!(back, map);
    }

    #[test]
    fn test_request_deserialize() {
        let json = r#"{
            "winner": "self",
            "win_fan": "2",
            "positions": {
                "upstream": { "multiplier_tile_count": 0, "bonus_fan": "1" },
                "self": { "multiplier_tile_count": 1 },
                "downstream": { "multiplier_tile_count": 2, "bonus_fan": "0.5" },
                "across": { "multiplier_tile_count": 1 }
            },
            "pole_edges": [ { "from": "across", "to": "upstream", "count": 2 } ]
        }"#;

        let request: SettlementRequest = serde_json::from_str(json).unwrap();
        assert_eq!(request.winner, Some(Position::Local));
        assert_eq!(request.positions[Position::Downstream].bonus_fan, Decimal::new(5, 1));
        assert_eq!(request.positions[Position::Local].bonus_fan, Decimal::ZERO);
        assert_eq!(
            request.pole_edges,
            vec![PoleEdge::new(Position::Across, Position::Upstream, 2)]
        );
    }
}
