//! Read interfaces the quoter consumes, with in-memory registries.
//!
//! One [`PoolSource`] serves each concentrated-liquidity deployment and a
//! [`PairSource`] serves constant-function pairs. Lookups are by token pair
//! in either order.

use crate::config::{MAX_FEE_BPS, QuoterConfig};
use crate::error::{ConfigError, Error, MathError};
use crate::hash::{FastMap, map_with_capacity};
use crate::pool::ticks::TickSource;
use crate::pool::v2_pair::{CurveVariant, ReserveSnapshot};
use crate::pool::v3_pool::{PoolSnapshot, V3Pool, sort_tokens};
use alloy_primitives::{Address, U256};

/// Registry of one concentrated-liquidity deployment.
pub trait PoolSource: TickSource {
    fn pool_snapshot(
        &self,
        token_a: Address,
        token_b: Address,
        tick_spacing: i32,
    ) -> Option<PoolSnapshot>;
}

impl<T: PoolSource + ?Sized> PoolSource for &T {
    fn pool_snapshot(
        &self,
        token_a: Address,
        token_b: Address,
        tick_spacing: i32,
    ) -> Option<PoolSnapshot> {
        (**self).pool_snapshot(token_a, token_b, tick_spacing)
    }
}

/// Registry of constant-function pairs.
pub trait PairSource {
    fn reserves(
        &self,
        token_a: Address,
        token_b: Address,
        variant: CurveVariant,
    ) -> Option<ReserveSnapshot>;
}

impl<T: PairSource + ?Sized> PairSource for &T {
    fn reserves(
        &self,
        token_a: Address,
        token_b: Address,
        variant: CurveVariant,
    ) -> Option<ReserveSnapshot> {
        (**self).reserves(token_a, token_b, variant)
    }
}

/// Concentrated-liquidity pools keyed by address and by
/// `(token0, token1, tick_spacing)`.
#[derive(Debug, Clone, Default)]
pub struct InMemoryPools {
    pools: FastMap<Address, V3Pool>,
    by_key: FastMap<(Address, Address, i32), Address>,
}

impl InMemoryPools {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            pools: map_with_capacity(capacity),
            by_key: map_with_capacity(capacity),
        }
    }

    /// Registers `pool`, returning the pool previously stored under the same
    /// tokens and tick spacing.
    pub fn insert(&mut self, pool: V3Pool) -> Option<V3Pool> {
        let key = (pool.token0, pool.token1, pool.tick_spacing);
        let replaced = self
            .by_key
            .insert(key, pool.pool_address)
            .and_then(|previous| self.pools.remove(&previous));

        tracing::debug!(
            pool = %pool.pool_address,
            token0 = %pool.token0,
            token1 = %pool.token1,
            tick_spacing = pool.tick_spacing,
            "registered pool"
        );
        self.pools.insert(pool.pool_address, pool);
        replaced
    }

    pub fn get(&self, pool: &Address) -> Option<&V3Pool> {
        self.pools.get(pool)
    }

    pub fn len(&self) -> usize {
        self.pools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pools.is_empty()
    }
}

impl TickSource for InMemoryPools {
    fn next_initialized_tick(&self, pool: Address, tick: i32, lte: bool) -> Option<i32> {
        self.pools.get(&pool)?.ticks.next_initialized(tick, lte)
    }

    fn liquidity_net(&self, pool: Address, tick: i32) -> i128 {
        self.pools
            .get(&pool)
            .map_or(0, |pool| pool.ticks.liquidity_net(tick))
    }
}

impl PoolSource for InMemoryPools {
    fn pool_snapshot(
        &self,
        token_a: Address,
        token_b: Address,
        tick_spacing: i32,
    ) -> Option<PoolSnapshot> {
        let (token0, token1) = sort_tokens(token_a, token_b);
        let address = self.by_key.get(&(token0, token1, tick_spacing))?;
        self.pools.get(address).map(V3Pool::snapshot)
    }
}

/// One side of a pair being registered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PairReserve {
    pub token: Address,
    pub reserve: U256,
    pub decimals: u8,
}

impl PairReserve {
    pub fn new(token: Address, reserve: U256, decimals: u8) -> Self {
        Self {
            token,
            reserve,
            decimals,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct PairEntry {
    reserve0: U256,
    reserve1: U256,
    decimals0: U256,
    decimals1: U256,
    custom_fee_bps: Option<u32>,
}

/// Constant-function pairs keyed by `(token0, token1, variant)`.
///
/// Pairs without a custom fee are charged the default fee of their variant.
#[derive(Debug, Clone)]
pub struct InMemoryPairs {
    pairs: FastMap<(Address, Address, CurveVariant), PairEntry>,
    volatile_fee_bps: u32,
    stable_fee_bps: u32,
}

impl Default for InMemoryPairs {
    fn default() -> Self {
        let config = QuoterConfig::default();
        Self {
            pairs: FastMap::default(),
            volatile_fee_bps: config.volatile_fee_bps,
            stable_fee_bps: config.stable_fee_bps,
        }
    }
}

impl InMemoryPairs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Empty registry using the default fees of `config`, once it validates.
    pub fn with_config(config: &QuoterConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            pairs: FastMap::default(),
            volatile_fee_bps: config.volatile_fee_bps,
            stable_fee_bps: config.stable_fee_bps,
        })
    }

    /// Registers or replaces a pair. Reserves follow their token.
    pub fn insert_pair(
        &mut self,
        variant: CurveVariant,
        a: PairReserve,
        b: PairReserve,
    ) -> Result<(), Error> {
        let (side0, side1) = if sort_tokens(a.token, b.token).0 == a.token {
            (a, b)
        } else {
            (b, a)
        };

        let entry = PairEntry {
            reserve0: side0.reserve,
            reserve1: side1.reserve,
            decimals0: token_scale(side0.decimals)?,
            decimals1: token_scale(side1.decimals)?,
            custom_fee_bps: None,
        };
        tracing::debug!(
            token0 = %side0.token,
            token1 = %side1.token,
            ?variant,
            reserve0 = %entry.reserve0,
            reserve1 = %entry.reserve1,
            "registered pair"
        );
        self.pairs.insert((side0.token, side1.token, variant), entry);
        Ok(())
    }

    /// Overrides the fee of a registered pair. Returns whether the pair exists.
    pub fn set_custom_fee(
        &mut self,
        token_a: Address,
        token_b: Address,
        variant: CurveVariant,
        fee_bps: u32,
    ) -> Result<bool, ConfigError> {
        if fee_bps > MAX_FEE_BPS {
            return Err(ConfigError::FeeOutOfRange {
                name: "custom_fee_bps",
                value: fee_bps,
                max: MAX_FEE_BPS,
            });
        }
        let (token0, token1) = sort_tokens(token_a, token_b);
        match self.pairs.get_mut(&(token0, token1, variant)) {
            Some(entry) => {
                entry.custom_fee_bps = Some(fee_bps);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    fn default_fee_bps(&self, variant: CurveVariant) -> u32 {
        match variant {
            CurveVariant::Volatile => self.volatile_fee_bps,
            CurveVariant::Stable => self.stable_fee_bps,
        }
    }
}

impl PairSource for InMemoryPairs {
    fn reserves(
        &self,
        token_a: Address,
        token_b: Address,
        variant: CurveVariant,
    ) -> Option<ReserveSnapshot> {
        let (token0, token1) = sort_tokens(token_a, token_b);
        let entry = self.pairs.get(&(token0, token1, variant))?;

        Some(ReserveSnapshot {
            token0,
            token1,
            reserve0: entry.reserve0,
            reserve1: entry.reserve1,
            decimals0: entry.decimals0,
            decimals1: entry.decimals1,
            fee_bps: entry
                .custom_fee_bps
                .unwrap_or_else(|| self.default_fee_bps(variant)),
            variant,
        })
    }
}

/// `10^decimals`.
fn token_scale(decimals: u8) -> Result<U256, MathError> {
    U256::from(10u8)
        .checked_pow(U256::from(decimals))
        .ok_or(MathError::Overflow)
}
