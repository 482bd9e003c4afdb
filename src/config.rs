//! Table settings: defaults, then an optional TOML file named by
//! `HOLDEM_CONFIG`, then `HOLDEM_*` environment overrides.

use crate::game::Money;
use serde::{Deserialize, Serialize};
use std::fs;

pub const CONFIG_PATH_VAR: &str = "HOLDEM_CONFIG";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TableConfig {
    pub small_blind: Money,
    /// Balance of a wallet the first time its user is seen.
    pub default_balance: Money,
    pub top_up_amount: Money,
    /// Raise amounts offered in a turn prompt.
    pub raise_steps: Vec<Money>,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            small_blind: 5,
            default_balance: 1000,
            top_up_amount: 1000,
            raise_steps: vec![10, 25, 50, 100, 250, 500, 1000],
        }
    }
}

#[derive(thiserror::Error, Debug)]
#[non_exhaustive]
pub enum ConfigError {
    #[error("cannot read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("cannot parse config file: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

impl TableConfig {
    pub fn big_blind(&self) -> Money {
        self.small_blind.saturating_mul(2)
    }

    /// Parse a TOML document; missing keys keep their defaults.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let cfg: TableConfig = toml::from_str(s)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Resolve from the process environment.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(|key| std::env::var(key).ok())
    }

    /// Resolve using `lookup` in place of the process environment.
    pub fn load_from<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut cfg = match lookup(CONFIG_PATH_VAR).filter(|p| !p.is_empty()) {
            Some(path) => toml::from_str(&fs::read_to_string(path)?)?,
            None => TableConfig::default(),
        };

        if let Some(v) = env_money(&lookup, "HOLDEM_SMALL_BLIND")? {
            cfg.small_blind = v;
        }
        if let Some(v) = env_money(&lookup, "HOLDEM_DEFAULT_BALANCE")? {
            cfg.default_balance = v;
        }
        if let Some(v) = env_money(&lookup, "HOLDEM_TOP_UP_AMOUNT")? {
            cfg.top_up_amount = v;
        }

        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.small_blind == 0 {
            return Err(ConfigError::Invalid("small_blind must be >0".into()));
        }
        if self.raise_steps.is_empty() {
            return Err(ConfigError::Invalid("at least one raise step is required".into()));
        }
        if self.raise_steps.contains(&0) {
            return Err(ConfigError::Invalid("raise steps must be >0".into()));
        }
        Ok(())
    }
}

fn env_money<F>(lookup: &F, key: &str) -> Result<Option<Money>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(key).filter(|v| !v.is_empty()) {
        Some(v) => v
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::Invalid(format!("{key} is not an amount: {v:?}"))),
        None => Ok(None),
    }
}
