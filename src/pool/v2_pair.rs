//! Constant-function pair model.
//!
//! Volatile pairs follow `x·y = k`. Stable pairs follow `x³y + y³x = k` on
//! reserves normalised to 18 decimals, solved with a bounded Newton iteration.
//! All divisions floor, matching the pair contract.

use crate::U256_E4;
use crate::U256_E18;
use crate::config::MAX_FEE_BPS;
use crate::error::{ConfigError, Error, MathError, SwapError};
use crate::math::math_helpers::div_rounding_up;
use alloy_primitives::{Address, U256};

/// Newton iterations allowed before the stable solver gives up.
pub const MAX_NEWTON_ITERATIONS: usize = 255;

/// Extra single-unit adjustments allowed when inverting a quote.
const MAX_ROUNDING_STEPS: usize = 64;

const U256_3: U256 = U256::from_limbs([3, 0, 0, 0]);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CurveVariant {
    Volatile,
    Stable,
}

/// Pair state read once per hop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReserveSnapshot {
    pub token0: Address,
    pub token1: Address,
    pub reserve0: U256,
    pub reserve1: U256,
    /// Scale factor of token0, `10^decimals`.
    pub decimals0: U256,
    /// Scale factor of token1, `10^decimals`.
    pub decimals1: U256,
    pub fee_bps: u32,
    pub variant: CurveVariant,
}

impl ReserveSnapshot {
    /// `(reserve_in, reserve_out)` for a swap selling `token_in`.
    pub fn oriented(&self, token_in: Address) -> (U256, U256) {
        if token_in == self.token0 {
            (self.reserve0, self.reserve1)
        } else {
            (self.reserve1, self.reserve0)
        }
    }

    /// Output for selling `amount_in` of `token_in`, fee included.
    pub fn get_amount_out(&self, token_in: Address, amount_in: U256) -> Result<U256, Error> {
        let (reserve_in, reserve_out) = self.oriented(token_in);
        if reserve_in.is_zero() || reserve_out.is_zero() {
            return Err(Error::InsufficientLiquidity);
        }
        self.check_fee()?;
        let fee = checked_mul(amount_in, U256::from(self.fee_bps))? / U256_E4;
        let amount_out = self.amount_out_after_fee(token_in, amount_in - fee)?;
        if amount_out >= reserve_out {
            return Err(Error::InsufficientLiquidity);
        }
        Ok(amount_out)
    }

    /// Smallest input of `token_in` whose [`get_amount_out`] is at least
    /// `amount_out`.
    ///
    /// [`get_amount_out`]: ReserveSnapshot::get_amount_out
    pub fn get_amount_in(&self, token_in: Address, amount_out: U256) -> Result<U256, Error> {
        let (reserve_in, reserve_out) = self.oriented(token_in);
        if reserve_in.is_zero() || amount_out >= reserve_out {
            return Err(Error::InsufficientLiquidity);
        }
        self.check_fee()?;
        if amount_out.is_zero() {
            return Ok(U256::ZERO);
        }
        if self.fee_bps == MAX_FEE_BPS {
            return Err(Error::InsufficientLiquidity);
        }

        let mut net = match self.variant {
            CurveVariant::Volatile => {
                // ceil(out * r_in / (r_out - out))
                let numerator = amount_out
                    .checked_mul(reserve_in)
                    .ok_or(MathError::Overflow)?;
                div_rounding_up(numerator, reserve_out - amount_out)
            }
            CurveVariant::Stable => self.stable_amount_in_estimate(token_in, amount_out)?,
        };

        // rounding in the curve is not symmetric, settle on the exact minimum
        let delivers = |input: U256| -> Result<bool, Error> {
            Ok(self.amount_out_after_fee(token_in, input)? >= amount_out)
        };
        net = settle_minimum(net, delivers)?;

        let fee_bps = U256::from(self.fee_bps);
        let mut gross = div_rounding_up(checked_mul(net, U256_E4)?, U256_E4 - fee_bps);
        while !gross.is_zero() {
            let lower = gross - U256::ONE;
            if lower - lower * fee_bps / U256_E4 >= net {
                gross = lower;
            } else {
                break;
            }
        }

        let gross = settle_minimum(gross, |input| {
            Ok(self.get_amount_out(token_in, input)? >= amount_out)
        })?;

        tracing::trace!(
            %token_in,
            %amount_out,
            amount_in = %gross,
            variant = ?self.variant,
            "inverted pair quote"
        );
        Ok(gross)
    }

    fn amount_out_after_fee(&self, token_in: Address, amount_in: U256) -> Result<U256, Error> {
        let (reserve_in, reserve_out) = self.oriented(token_in);
        match self.variant {
            CurveVariant::Volatile => {
                let numerator = amount_in
                    .checked_mul(reserve_out)
                    .ok_or(MathError::Overflow)?;
                let denominator = reserve_in
                    .checked_add(amount_in)
                    .ok_or(MathError::Overflow)?;
                Ok(numerator / denominator)
            }
            CurveVariant::Stable => {
                let xy = self.k(self.reserve0, self.reserve1)?;
                let (decimals_in, decimals_out) = self.oriented_decimals(token_in);
                let reserve_a = normalize(reserve_in, decimals_in)?;
                let reserve_b = normalize(reserve_out, decimals_out)?;
                let amount_in = normalize(amount_in, decimals_in)?;
                let x0 = amount_in
                    .checked_add(reserve_a)
                    .ok_or(MathError::Overflow)?;
                let y = reserve_b
                    .checked_sub(self.get_y(x0, xy, reserve_b)?)
                    .ok_or(Error::InsufficientLiquidity)?;
                Ok(checked_mul(y, decimals_out)? / U256_E18)
            }
        }
    }

    /// Net input estimate for a stable pair, solving the curve for the input
    /// reserve after `amount_out` leaves.
    fn stable_amount_in_estimate(&self, token_in: Address, amount_out: U256) -> Result<U256, Error> {
        let (reserve_in, reserve_out) = self.oriented(token_in);
        let (decimals_in, decimals_out) = self.oriented_decimals(token_in);
        let xy = self.k(self.reserve0, self.reserve1)?;

        let reserve_a = normalize(reserve_in, decimals_in)?;
        let reserve_b = normalize(reserve_out, decimals_out)?;
        let out = div_rounding_up(checked_mul(amount_out, U256_E18)?, decimals_out);
        let reserve_b_after = reserve_b
            .checked_sub(out)
            .ok_or(Error::InsufficientLiquidity)?;

        // `x0` is the output side here, already normalised, so the upper
        // neighbour is checked with `f` rather than `k`
        let reserve_a_after =
            solve_y(reserve_b_after, xy, reserve_a, |y| f(reserve_b_after, y))?;
        let net = reserve_a_after.saturating_sub(reserve_a);
        Ok(div_rounding_up(checked_mul(net, decimals_in)?, U256_E18))
    }

    fn check_fee(&self) -> Result<(), ConfigError> {
        if self.fee_bps > MAX_FEE_BPS {
            return Err(ConfigError::FeeOutOfRange {
                name: "fee_bps",
                value: self.fee_bps,
                max: MAX_FEE_BPS,
            });
        }
        Ok(())
    }

    fn oriented_decimals(&self, token_in: Address) -> (U256, U256) {
        if token_in == self.token0 {
            (self.decimals0, self.decimals1)
        } else {
            (self.decimals1, self.decimals0)
        }
    }

    /// Stable invariant of raw reserves, in pair order.
    fn k(&self, x: U256, y: U256) -> Result<U256, Error> {
        let x = normalize(x, self.decimals0)?;
        let y = normalize(y, self.decimals1)?;
        f(x, y)
    }

    /// Solves `f(x0, y) = xy` for `y`, starting from `y`. Used with the
    /// input-side reserve as `x0`, the way the pair contract calls it.
    fn get_y(&self, x0: U256, xy: U256, y: U256) -> Result<U256, Error> {
        // the pair contract re-normalises the upper neighbour through `k`
        solve_y(x0, xy, y, |y| self.k(x0, y))
    }
}

/// Newton iteration for `f(x0, y) = xy`. `above` evaluates the invariant at
/// `y + 1` when the step rounds to zero below the target.
fn solve_y<K>(x0: U256, xy: U256, mut y: U256, above: K) -> Result<U256, Error>
where
    K: Fn(U256) -> Result<U256, Error>,
{
    for _ in 0..MAX_NEWTON_ITERATIONS {
        let k = f(x0, y)?;
        if k < xy {
            let mut dy = checked_mul(xy - k, U256_E18)? / non_zero(d(x0, y)?)?;
            if dy.is_zero() {
                let next = y.checked_add(U256::ONE).ok_or(MathError::Overflow)?;
                if above(next)? > xy {
                    return Ok(next);
                }
                dy = U256::ONE;
            }
            y = y.checked_add(dy).ok_or(MathError::Overflow)?;
        } else {
            let mut dy = checked_mul(k - xy, U256_E18)? / non_zero(d(x0, y)?)?;
            if dy.is_zero() {
                if k == xy || f(x0, y.checked_sub(U256::ONE).ok_or(MathError::Underflow)?)? < xy {
                    return Ok(y);
                }
                dy = U256::ONE;
            }
            y = y.checked_sub(dy).ok_or(MathError::Underflow)?;
        }
    }
    tracing::debug!(%x0, %xy, "stable curve did not converge");
    Err(SwapError::StableCurveDidNotConverge.into())
}

/// Walks `candidate` up until `delivers` holds, then down while it still
/// holds, within [`MAX_ROUNDING_STEPS`] in each direction.
fn settle_minimum<F>(mut candidate: U256, delivers: F) -> Result<U256, Error>
where
    F: Fn(U256) -> Result<bool, Error>,
{
    let mut satisfied = false;
    for _ in 0..MAX_ROUNDING_STEPS {
        if delivers(candidate)? {
            satisfied = true;
            break;
        }
        candidate = candidate.checked_add(U256::ONE).ok_or(MathError::Overflow)?;
    }
    if !satisfied {
        return Err(SwapError::StableCurveDidNotConverge.into());
    }
    for _ in 0..MAX_ROUNDING_STEPS {
        if candidate.is_zero() || !delivers(candidate - U256::ONE)? {
            break;
        }
        candidate -= U256::ONE;
    }
    Ok(candidate)
}

#[inline]
fn checked_mul(a: U256, b: U256) -> Result<U256, MathError> {
    a.checked_mul(b).ok_or(MathError::Overflow)
}

#[inline]
fn non_zero(value: U256) -> Result<U256, MathError> {
    if value.is_zero() {
        Err(MathError::DivisionByZero)
    } else {
        Ok(value)
    }
}

#[inline]
fn normalize(amount: U256, decimals: U256) -> Result<U256, MathError> {
    Ok(checked_mul(amount, U256_E18)? / non_zero(decimals)?)
}

/// `x0·y·(x0² + y²)` in 18 decimal fixed point.
fn f(x0: U256, y: U256) -> Result<U256, Error> {
    let a = checked_mul(x0, y)? / U256_E18;
    let b = (checked_mul(x0, x0)? / U256_E18)
        .checked_add(checked_mul(y, y)? / U256_E18)
        .ok_or(MathError::Overflow)?;
    Ok(checked_mul(a, b)? / U256_E18)
}

/// `∂f/∂y = 3·x0·y² + x0³` in 18 decimal fixed point.
fn d(x0: U256, y: U256) -> Result<U256, Error> {
    let y2 = checked_mul(y, y)? / U256_E18;
    let first = checked_mul(checked_mul(U256_3, x0)?, y2)? / U256_E18;
    let x2 = checked_mul(x0, x0)? / U256_E18;
    let second = checked_mul(x2, x0)? / U256_E18;
    Ok(first.checked_add(second).ok_or(MathError::Overflow)?)
}
