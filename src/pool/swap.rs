use crate::config::QuoterConfig;
use crate::error::{Error, MathError, SwapError};
use crate::math::liquidity_math::add_delta;
use crate::math::math_helpers::unlikely;
use crate::math::swap_math::compute_swap_step;
use crate::math::tick_math::{
    MAX_SQRT_RATIO, MAX_TICK, MIN_SQRT_RATIO, MIN_TICK, get_sqrt_ratio_at_tick,
    get_tick_at_sqrt_ratio,
};
use crate::pool::ticks::{TickSource, next_initialized_tick_within_one_word};
use crate::pool::v3_pool::PoolSnapshot;
use alloy_primitives::{I256, Sign, U256};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct SwapParams {
    /// Swap direction: `true` for token0 → token1, `false` for token1 → token0.
    pub zero_for_one: bool,
    /// Signed amount being swapped. Positive means “exact in”, negative means “exact out”.
    pub amount_specified: I256,
    /// Sqrt‑price limit in Q96 that bounds how far the price is allowed to move.
    ///
    /// `None` lets the price run to the global bound, in which case an amount
    /// that cannot be filled is an error rather than a partial fill.
    pub sqrt_price_limit_x96: Option<U256>,
}

impl SwapParams {
    /// Exact input of `amount_in`, without a price limit.
    pub fn exact_input(zero_for_one: bool, amount_in: U256) -> Result<Self, MathError> {
        Ok(Self {
            zero_for_one,
            amount_specified: to_signed(amount_in)?,
            sqrt_price_limit_x96: None,
        })
    }

    /// Exact output of `amount_out`, without a price limit.
    pub fn exact_output(zero_for_one: bool, amount_out: U256) -> Result<Self, MathError> {
        Ok(Self {
            zero_for_one,
            amount_specified: -to_signed(amount_out)?,
            sqrt_price_limit_x96: None,
        })
    }

    pub fn with_limit(mut self, sqrt_price_limit_x96: Option<U256>) -> Self {
        self.sqrt_price_limit_x96 = sqrt_price_limit_x96;
        self
    }
}

/// Result of a simulated swap. Pool state is never written back.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct SwapOutcome {
    /// Total paid into the pool, fees included.
    pub amount_in: U256,
    /// Total paid out of the pool.
    pub amount_out: U256,
    /// Part of the specified amount that could not be swapped.
    pub amount_specified_remaining: I256,
    pub sqrt_price_x96_after: U256,
    pub tick_after: i32,
    pub liquidity_after: u128,
    /// Initialized ticks crossed, including one sitting exactly at the start
    /// price but not one the swap comes to rest on.
    pub ticks_crossed: u32,
    pub fees_paid: U256,
}

impl SwapOutcome {
    pub fn gas_estimate(&self, config: &QuoterConfig) -> u64 {
        config.v3_gas(self.ticks_crossed)
    }
}

// the top level state of the swap
struct SwapState {
    // the amount remaining to be swapped in/out of the input/output asset
    amount_specified_remaining: I256,
    // the amount already swapped out/in of the output/input asset
    amount_calculated: I256,
    // current sqrt(price)
    sqrt_price_x96: U256,
    // the tick associated with the current price
    tick: i32,
    // the current liquidity in range
    liquidity: u128,
    // initialized ticks crossed so far
    ticks_crossed: u32,
    // accumulated swap fees
    swap_fee: U256,
}

#[derive(Default)]
struct StepComputations {
    // the price at the beginning of the step
    sqrt_price_start_x96: U256,
    // the next tick to swap to from the current tick in the swap direction
    tick_next: i32,
    // whether tick_next is initialized or not
    initialized: bool,
    // sqrt(price) for the next tick (1/0)
    sqrt_price_next_x96: U256,
}

#[inline]
fn to_signed(value: U256) -> Result<I256, MathError> {
    I256::checked_from_sign_and_abs(Sign::Positive, value).ok_or(MathError::Overflow)
}

/// Runs a swap against `pool` without touching its state, reading ticks
/// through `source`.
///
/// Each iteration swaps up to the next initialized tick (or bitmap word
/// boundary), crossing it when the step reaches its price. Stops when the
/// amount is used up or the price limit is hit.
pub fn simulate_swap<S: TickSource + ?Sized>(
    source: &S,
    pool: &PoolSnapshot,
    params: SwapParams,
) -> Result<SwapOutcome, Error> {
    let amount_specified = params.amount_specified;
    if unlikely(amount_specified.is_zero()) {
        return Err(Error::SwapError(SwapError::AmountSpecifiedIsZero));
    }
    if unlikely(pool.sqrt_price_x96.is_zero()) {
        return Err(Error::SwapError(SwapError::PoolNotInitialized));
    }

    let zero_for_one = params.zero_for_one;
    let sqrt_price_limit_x96 = params.sqrt_price_limit_x96.unwrap_or(if zero_for_one {
        MIN_SQRT_RATIO + U256::ONE
    } else {
        MAX_SQRT_RATIO - U256::ONE
    });
    if zero_for_one {
        if unlikely(
            (sqrt_price_limit_x96 >= pool.sqrt_price_x96)
                || (sqrt_price_limit_x96 <= MIN_SQRT_RATIO),
        ) {
            return Err(Error::SwapError(SwapError::SqrtPriceOutOfBounds));
        }
    } else if unlikely(
        (sqrt_price_limit_x96 <= pool.sqrt_price_x96)
            || (sqrt_price_limit_x96 >= MAX_SQRT_RATIO),
    ) {
        return Err(Error::SwapError(SwapError::SqrtPriceOutOfBounds));
    }

    let exact_input = amount_specified.is_positive();

    let mut state = SwapState {
        amount_specified_remaining: amount_specified,
        amount_calculated: I256::ZERO,
        sqrt_price_x96: pool.sqrt_price_x96,
        tick: pool.tick,
        liquidity: pool.liquidity,
        ticks_crossed: 0,
        swap_fee: U256::ZERO,
    };

    while !state.amount_specified_remaining.is_zero()
        && state.sqrt_price_x96 != sqrt_price_limit_x96
    {
        let mut step = StepComputations {
            sqrt_price_start_x96: state.sqrt_price_x96,
            ..StepComputations::default()
        };

        (step.tick_next, step.initialized) = next_initialized_tick_within_one_word(
            source,
            pool.pool,
            state.tick,
            pool.tick_spacing,
            zero_for_one,
        )?;

        step.tick_next = step.tick_next.clamp(MIN_TICK, MAX_TICK);

        step.sqrt_price_next_x96 = get_sqrt_ratio_at_tick(step.tick_next)?;

        let target = if zero_for_one {
            step.sqrt_price_next_x96.max(sqrt_price_limit_x96)
        } else {
            step.sqrt_price_next_x96.min(sqrt_price_limit_x96)
        };

        let swap_step = compute_swap_step(
            state.sqrt_price_x96,
            target,
            state.liquidity,
            state.amount_specified_remaining,
            pool.fee_pips,
        )?;
        state.sqrt_price_x96 = swap_step.sqrt_price_next_x96;

        let paid_in = to_signed(swap_step.amount_in + swap_step.fee_amount)?;
        let paid_out = to_signed(swap_step.amount_out)?;
        state.swap_fee += swap_step.fee_amount;

        if exact_input {
            state.amount_specified_remaining = state
                .amount_specified_remaining
                .checked_sub(paid_in)
                .ok_or(MathError::Underflow)?;
            state.amount_calculated = state
                .amount_calculated
                .checked_sub(paid_out)
                .ok_or(MathError::Underflow)?;
        } else {
            state.amount_specified_remaining = state
                .amount_specified_remaining
                .checked_add(paid_out)
                .ok_or(MathError::Overflow)?;
            state.amount_calculated = state
                .amount_calculated
                .checked_add(paid_in)
                .ok_or(MathError::Overflow)?;
        }

        tracing::trace!(
            tick_next = step.tick_next,
            initialized = step.initialized,
            sqrt_price_x96 = %state.sqrt_price_x96,
            amount_in = %swap_step.amount_in,
            amount_out = %swap_step.amount_out,
            fee = %swap_step.fee_amount,
            "swap step"
        );

        if state.sqrt_price_x96 == step.sqrt_price_next_x96 {
            if step.initialized {
                let mut liquidity_net = source.liquidity_net(pool.pool, step.tick_next);
                if zero_for_one {
                    liquidity_net = liquidity_net.checked_neg().ok_or(MathError::Overflow)?;
                }
                state.liquidity = add_delta(state.liquidity, liquidity_net)?;
                // a tick the swap comes to rest on is not counted
                if !state.amount_specified_remaining.is_zero() {
                    state.ticks_crossed += 1;
                }
            }
            state.tick = if zero_for_one {
                step.tick_next - 1
            } else {
                step.tick_next
            };
        } else if state.sqrt_price_x96 != step.sqrt_price_start_x96 {
            state.tick = get_tick_at_sqrt_ratio(state.sqrt_price_x96)?;
        }
    }

    if params.sqrt_price_limit_x96.is_none() && !state.amount_specified_remaining.is_zero() {
        tracing::debug!(
            pool = %pool.pool,
            remaining = %state.amount_specified_remaining,
            "price bound reached before the amount was filled"
        );
        return Err(Error::InsufficientLiquidity);
    }

    let amount_swapped = amount_specified
        .checked_sub(state.amount_specified_remaining)
        .ok_or(MathError::Overflow)?;

    let (amount_in, amount_out) = if exact_input {
        (
            amount_swapped.unsigned_abs(),
            state.amount_calculated.unsigned_abs(),
        )
    } else {
        (
            state.amount_calculated.unsigned_abs(),
            amount_swapped.unsigned_abs(),
        )
    };

    Ok(SwapOutcome {
        amount_in,
        amount_out,
        amount_specified_remaining: state.amount_specified_remaining,
        sqrt_price_x96_after: state.sqrt_price_x96,
        tick_after: state.tick,
        liquidity_after: state.liquidity,
        ticks_crossed: state.ticks_crossed,
        fees_paid: state.swap_fee,
    })
}
