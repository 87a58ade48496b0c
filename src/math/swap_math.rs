use crate::error::Error;
use crate::math::math_helpers::{mul_div, mul_div_rounding_up};
use crate::math::sqrt_price_math::{
    get_amount_0_delta, get_amount_1_delta, get_next_sqrt_price_from_input,
    get_next_sqrt_price_from_output,
};
use crate::U256_E6;
use alloy_primitives::{I256, U256};

/// Outcome of swapping within a single price range.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct SwapStep {
    /// Price reached, never past the target.
    pub sqrt_price_next_x96: U256,
    /// Input consumed, excluding the fee.
    pub amount_in: U256,
    /// Output produced.
    pub amount_out: U256,
    /// Input taken as fee.
    pub fee_amount: U256,
}

/// Swaps as much of `amount_remaining` as fits between the current price and
/// `sqrt_ratio_target_x96` at constant `liquidity`.
///
/// The direction is inferred from the two prices (`current >= target` means
/// token0 in). A non-negative `amount_remaining` is an exact input, gross of
/// fee; a negative one is an exact output. For exact input,
/// `amount_in + fee_amount` never exceeds `amount_remaining`.
pub fn compute_swap_step(
    sqrt_ratio_current_x96: U256,
    sqrt_ratio_target_x96: U256,
    liquidity: u128,
    amount_remaining: I256,
    fee_pips: u32,
) -> Result<SwapStep, Error> {
    let zero_for_one = sqrt_ratio_current_x96 >= sqrt_ratio_target_x96;
    let exact_in = !amount_remaining.is_negative();
    let remaining_abs = amount_remaining.unsigned_abs();
    let fee = U256::from(fee_pips);

    let mut amount_in = U256::ZERO;
    let mut amount_out = U256::ZERO;

    let sqrt_price_next_x96 = if exact_in {
        let amount_remaining_less_fee = mul_div(remaining_abs, U256_E6 - fee, U256_E6)?;
        amount_in = if zero_for_one {
            get_amount_0_delta(sqrt_ratio_target_x96, sqrt_ratio_current_x96, liquidity, true)?
        } else {
            get_amount_1_delta(sqrt_ratio_current_x96, sqrt_ratio_target_x96, liquidity, true)?
        };
        if amount_remaining_less_fee >= amount_in {
            sqrt_ratio_target_x96
        } else {
            get_next_sqrt_price_from_input(
                sqrt_ratio_current_x96,
                liquidity,
                amount_remaining_less_fee,
                zero_for_one,
            )?
        }
    } else {
        amount_out = if zero_for_one {
            get_amount_1_delta(sqrt_ratio_target_x96, sqrt_ratio_current_x96, liquidity, false)?
        } else {
            get_amount_0_delta(sqrt_ratio_current_x96, sqrt_ratio_target_x96, liquidity, false)?
        };
        if remaining_abs >= amount_out {
            sqrt_ratio_target_x96
        } else {
            get_next_sqrt_price_from_output(
                sqrt_ratio_current_x96,
                liquidity,
                remaining_abs,
                zero_for_one,
            )?
        }
    };

    let max = sqrt_ratio_target_x96 == sqrt_price_next_x96;

    if zero_for_one {
        if !(max && exact_in) {
            amount_in =
                get_amount_0_delta(sqrt_price_next_x96, sqrt_ratio_current_x96, liquidity, true)?;
        }
        if !(max && !exact_in) {
            amount_out =
                get_amount_1_delta(sqrt_price_next_x96, sqrt_ratio_current_x96, liquidity, false)?;
        }
    } else {
        if !(max && exact_in) {
            amount_in =
                get_amount_1_delta(sqrt_ratio_current_x96, sqrt_price_next_x96, liquidity, true)?;
        }
        if !(max && !exact_in) {
            amount_out =
                get_amount_0_delta(sqrt_ratio_current_x96, sqrt_price_next_x96, liquidity, false)?;
        }
    }

    // cap the output amount to not exceed the remaining output amount
    if !exact_in && amount_out > remaining_abs {
        amount_out = remaining_abs;
    }

    let fee_amount = if exact_in && sqrt_price_next_x96 != sqrt_ratio_target_x96 {
        // the target was not reached, so the remainder goes to the fee
        remaining_abs - amount_in
    } else {
        mul_div_rounding_up(amount_in, fee, U256_E6 - fee)?
    };

    Ok(SwapStep {
        sqrt_price_next_x96,
        amount_in,
        amount_out,
        fee_amount,
    })
}
