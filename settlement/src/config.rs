//! Configuration for the settlement engine

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Settlement configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Service name
    pub service_name: String,

    /// Service version
    pub service_version: String,

    /// Money per whole fan
    pub stake_per_fan: Decimal,

    /// History configuration
    pub history: HistoryConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            service_name: "mahjong-settlement".to_string(),
            service_version: env!("CARGO_PKG_VERSION").to_string(),
            stake_per_fan: Decimal::from(10),
            history: HistoryConfig::default(),
        }
    }
}

/// Settlement history configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HistoryConfig {
    /// Records older than this many days are pruned
    pub retention_days: i64,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            retention_days: 30, // one month
        }
    }
}

impl HistoryConfig {
    /// Retention window as a duration; `None` if out of range
    pub fn retention(&self) -> Option<chrono::Duration> {
        chrono::Duration::try_days(self.retention_days)
    }
}

impl Config {
    /// Largest stake that keeps every amount inside decimal range
    pub const MAX_STAKE_PER_FAN: i64 = 1_000_000;

    /// Decimal places allowed in the stake; keeps every amount exact
    pub const MAX_STAKE_SCALE: u32 = 2;

    /// Longest history retention (one hundred years)
    pub const MAX_RETENTION_DAYS: i64 = 36_500;

    /// Load from file
    pub fn from_file(path: impl AsRef<std::path::Path>) -> crate::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)
            .map_err(|e| crate::Error::Config(format!("Failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Load from environment variables
    pub fn from_env() -> crate::Result<Self> {
        let mut config = Config::default();

        if let Ok(stake) = std::env::var("MAHJONG_STAKE_PER_FAN") {
            config.stake_per_fan = stake.trim().parse().map_err(|e| {
                crate::Error::Config(format!("Invalid MAHJONG_STAKE_PER_FAN {:?}: {}", stake, e))
            })?;
        }

        if let Ok(days) = std::env::var("MAHJONG_HISTORY_RETENTION_DAYS") {
            config.history.retention_days = days.trim().parse().map_err(|e| {
                crate::Error::Config(format!(
                    "Invalid MAHJONG_HISTORY_RETENTION_DAYS {:?}: {}",
                    days, e
                ))
            })?;
        }

        config.validate()?;
        Ok(config)
    }

    /// Check value ranges
    pub fn validate(&self) -> crate::Result<()> {
        if self.stake_per_fan <= Decimal::ZERO
            || self.stake_per_fan > Decimal::from(Self::MAX_STAKE_PER_FAN)
        {
            return Err(crate::Error::Config(format!(
                "stake_per_fan must be in (0, {}], got {}",
                Self::MAX_STAKE_PER_FAN,
                self.stake_per_fan
            )));
        }

        if self.stake_per_fan.normalize().scale() > Self::MAX_STAKE_SCALE {
            return Err(crate::Error::Config(format!(
                "stake_per_fan allows at most {} decimal places, got {}",
                Self::MAX_STAKE_SCALE,
                self.stake_per_fan
            )));
        }

        if self.history.retention_days <= 0
            || self.history.retention_days > Self::MAX_RETENTION_DAYS
        {
            return Err(crate::Error::Config(format!(
                "history.retention_days must be in [1, {}], got {}",
                Self::MAX_RETENTION_DAYS,
                self.history.retention_days
            )));
        }

        Ok(())
    }
}
