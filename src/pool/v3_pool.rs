use crate::error::{Error, SwapError};
use crate::math::tick_math::{MAX_TICK, MIN_TICK, get_tick_at_sqrt_ratio};
use crate::pool::ticks::{TickInfo, TickMap, TickSource};
use alloy_primitives::{Address, U160, U256};

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Slot0 {
    pub sqrt_price_x96: U256,
    pub tick: i32,
}

/// State of a concentrated-liquidity pool read once per hop.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct PoolSnapshot {
    /// Pool identity, used to query its ticks.
    pub pool: Address,
    pub token0: Address,
    pub token1: Address,
    pub sqrt_price_x96: U256,
    pub tick: i32,
    /// Liquidity active at the current price.
    pub liquidity: u128,
    /// Swap fee in hundredths of a bip (3000 = 0.3%).
    pub fee_pips: u32,
    pub tick_spacing: i32,
}

/// Converts an `Address` into its `U160` numeric representation.
#[inline(always)]
pub fn address_to_u160(address: Address) -> U160 {
    address.into()
}

/// Returns the pair ordered by numeric address, as `(token0, token1)`.
pub fn sort_tokens(token_a: Address, token_b: Address) -> (Address, Address) {
    if address_to_u160(token_a) < address_to_u160(token_b) {
        (token_a, token_b)
    } else {
        (token_b, token_a)
    }
}

/// In-memory concentrated-liquidity pool.
///
/// Built by initializing a price and then adding positions; the swap
/// simulation only ever reads it through [`V3Pool::snapshot`] and its
/// [`TickSource`] implementation.
#[derive(Clone, Debug)]
pub struct V3Pool {
    pub pool_address: Address,
    pub token0: Address,
    pub token1: Address,
    pub fee_pips: u32,
    pub tick_spacing: i32,
    pub slot0: Slot0,
    pub liquidity: u128,
    pub ticks: TickMap,
}

impl V3Pool {
    /// Creates an uninitialized pool. Tokens are sorted into
    /// `(token0, token1)` order.
    pub fn new(
        pool_address: Address,
        token_a: Address,
        token_b: Address,
        fee_pips: u32,
        tick_spacing: i32,
    ) -> Self {
        let (token0, token1) = sort_tokens(token_a, token_b);

        Self {
            pool_address,
            token0,
            token1,
            fee_pips,
            tick_spacing,
            slot0: Slot0::default(),
            liquidity: 0,
            ticks: TickMap::new(),
        }
    }

    pub fn is_initialized(&self) -> bool {
        !self.slot0.sqrt_price_x96.is_zero()
    }

    /// Sets the starting price. Can only be done once.
    pub fn initialize(&mut self, sqrt_price_x96: U256) -> Result<(), Error> {
        if self.is_initialized() {
            return Err(SwapError::PoolAlreadyInitialized.into());
        }
        let tick = get_tick_at_sqrt_ratio(sqrt_price_x96)?;
        self.slot0 = Slot0 {
            sqrt_price_x96,
            tick,
        };
        tracing::trace!(pool = %self.pool_address, %sqrt_price_x96, tick, "pool initialized");
        Ok(())
    }

    /// Adds `liquidity` over `[tick_lower, tick_upper)`.
    ///
    /// Both ticks must be multiples of the tick spacing within
    /// `[MIN_TICK, MAX_TICK]`, with `tick_lower < tick_upper`.
    pub fn add_position(
        &mut self,
        tick_lower: i32,
        tick_upper: i32,
        liquidity: u128,
    ) -> Result<(), Error> {
        if !self.is_initialized() {
            return Err(SwapError::PoolNotInitialized.into());
        }
        let spacing = self.tick_spacing;
        if spacing <= 0
            || tick_lower >= tick_upper
            || tick_lower < MIN_TICK
            || tick_upper > MAX_TICK
            || tick_lower % spacing != 0
            || tick_upper % spacing != 0
        {
            return Err(SwapError::InvalidTickRange {
                lower: tick_lower,
                upper: tick_upper,
            }
            .into());
        }

        let active = if (tick_lower..tick_upper).contains(&self.slot0.tick) {
            self.liquidity
                .checked_add(liquidity)
                .ok_or(crate::error::MathError::Overflow)?
        } else {
            self.liquidity
        };
        self.ticks.update_range(tick_lower, tick_upper, liquidity)?;
        self.liquidity = active;
        Ok(())
    }

    pub fn tick(&self, tick: i32) -> Option<&TickInfo> {
        self.ticks.get(tick)
    }

    /// Returns the net liquidity delta at a given tick, if it exists.
    pub fn get_liquidity_net(&self, tick: i32) -> Option<i128> {
        self.ticks.get(tick).map(|info| info.liquidity_net)
    }

    pub fn snapshot(&self) -> PoolSnapshot {
        PoolSnapshot {
            pool: self.pool_address,
            token0: self.token0,
            token1: self.token1,
            sqrt_price_x96: self.slot0.sqrt_price_x96,
            tick: self.slot0.tick,
            liquidity: self.liquidity,
            fee_pips: self.fee_pips,
            tick_spacing: self.tick_spacing,
        }
    }
}

impl TickSource for V3Pool {
    fn next_initialized_tick(&self, pool: Address, tick: i32, lte: bool) -> Option<i32> {
        if pool != self.pool_address {
            return None;
        }
        self.ticks.next_initialized(tick, lte)
    }

    fn liquidity_net(&self, pool: Address, tick: i32) -> i128 {
        if pool != self.pool_address {
            return 0;
        }
        self.ticks.liquidity_net(tick)
    }
}
