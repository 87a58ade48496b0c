//! Quoter configuration.
//!
//! Covers the gas model reported with concentrated-liquidity quotes and the
//! default fees applied to constant-function pairs that carry no custom fee.
//! Values can be deserialized with `serde` or loaded from the environment.

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::env;
use std::str::FromStr;

/// Upper bound for any fee expressed in basis points.
pub const MAX_FEE_BPS: u32 = 10_000;

pub const ENV_V3_BASE_GAS: &str = "QUOTER_V3_BASE_GAS";
pub const ENV_V3_GAS_PER_TICK: &str = "QUOTER_V3_GAS_PER_TICK";
pub const ENV_VOLATILE_FEE_BPS: &str = "QUOTER_VOLATILE_FEE_BPS";
pub const ENV_STABLE_FEE_BPS: &str = "QUOTER_STABLE_FEE_BPS";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QuoterConfig {
    /// Fixed gas charged for every concentrated-liquidity hop.
    pub v3_base_gas: u64,
    /// Additional gas per initialized tick crossed.
    pub v3_gas_per_initialized_tick: u64,
    /// Fee for volatile pairs without a custom fee, in bps.
    pub volatile_fee_bps: u32,
    /// Fee for stable pairs without a custom fee, in bps.
    pub stable_fee_bps: u32,
}

impl Default for QuoterConfig {
    fn default() -> Self {
        Self {
            v3_base_gas: 155_000,
            v3_gas_per_initialized_tick: 21_492,
            volatile_fee_bps: 30,
            stable_fee_bps: 5,
        }
    }
}

impl QuoterConfig {
    /// Loads the configuration from the process environment.
    ///
    /// # Environment Variables
    ///
    /// All optional, defaults from [`QuoterConfig::default`]:
    /// - `QUOTER_V3_BASE_GAS`
    /// - `QUOTER_V3_GAS_PER_TICK`
    /// - `QUOTER_VOLATILE_FEE_BPS`
    /// - `QUOTER_STABLE_FEE_BPS`
    ///
    /// # Errors
    ///
    /// Returns an error if a variable is not an integer or a fee exceeds
    /// [`MAX_FEE_BPS`].
    pub fn from_env() -> Result<Self, ConfigError> {
        tracing::info!("Loading quoter configuration from environment");
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Same as [`QuoterConfig::from_env`], reading values through `lookup`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let config = Self {
            v3_base_gas: parse_or(&lookup, ENV_V3_BASE_GAS, defaults.v3_base_gas)?,
            v3_gas_per_initialized_tick: parse_or(
                &lookup,
                ENV_V3_GAS_PER_TICK,
                defaults.v3_gas_per_initialized_tick,
            )?,
            volatile_fee_bps: parse_or(&lookup, ENV_VOLATILE_FEE_BPS, defaults.volatile_fee_bps)?,
            stable_fee_bps: parse_or(&lookup, ENV_STABLE_FEE_BPS, defaults.stable_fee_bps)?,
        };

        config.validate()?;

        tracing::debug!(
            v3_base_gas = config.v3_base_gas,
            v3_gas_per_initialized_tick = config.v3_gas_per_initialized_tick,
            volatile_fee_bps = config.volatile_fee_bps,
            stable_fee_bps = config.stable_fee_bps,
            "Quoter configuration loaded"
        );

        Ok(config)
    }

    /// Checks that both default fees are valid basis point values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, value) in [
            (ENV_VOLATILE_FEE_BPS, self.volatile_fee_bps),
            (ENV_STABLE_FEE_BPS, self.stable_fee_bps),
        ] {
            if value > MAX_FEE_BPS {
                tracing::error!(var = name, value, max = MAX_FEE_BPS, "Fee exceeds the bps ceiling");
                return Err(ConfigError::FeeOutOfRange {
                    name,
                    value,
                    max: MAX_FEE_BPS,
                });
            }
        }
        Ok(())
    }

    /// Gas estimate for a concentrated-liquidity hop.
    #[inline]
    pub fn v3_gas(&self, ticks_crossed: u32) -> u64 {
        self.v3_base_gas
            .saturating_add(self.v3_gas_per_initialized_tick.saturating_mul(ticks_crossed as u64))
    }
}

fn parse_or<F, T>(lookup: &F, name: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(name) {
        Some(raw) => raw.trim().parse().map_err(|_| {
            tracing::error!(var = name, value = %raw, "Invalid integer in environment");
            ConfigError::InvalidValue { name, value: raw }
        }),
        None => Ok(default),
    }
}
