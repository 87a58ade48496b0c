use crate::error::{Error, MathError, SwapError};
use crate::math::tick_math::{MAX_TICK, MIN_TICK, floor_to_spacing};
use alloy_primitives::Address;
use std::collections::BTreeMap;
use std::ops::Bound::{Excluded, Included, Unbounded};

/// Width, in compressed ticks, of one on-chain bitmap word.
pub const TICKS_PER_WORD: i32 = 256;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickInfo {
    pub liquidity_gross: u128,
    pub liquidity_net: i128,
}

/// Read access to initialized ticks, keyed by pool.
pub trait TickSource {
    /// Nearest initialized tick `<= tick` when `lte`, otherwise `> tick`.
    fn next_initialized_tick(&self, pool: Address, tick: i32, lte: bool) -> Option<i32>;

    /// Net liquidity change when crossing `tick` left to right. Zero for
    /// ticks that are not initialized.
    fn liquidity_net(&self, pool: Address, tick: i32) -> i128;
}

impl<T: TickSource + ?Sized> TickSource for &T {
    fn next_initialized_tick(&self, pool: Address, tick: i32, lte: bool) -> Option<i32> {
        (**self).next_initialized_tick(pool, tick, lte)
    }

    fn liquidity_net(&self, pool: Address, tick: i32) -> i128 {
        (**self).liquidity_net(pool, tick)
    }
}

/// Sparse ordered tick storage of a single pool.
///
/// A tick stays initialized while its gross liquidity is non-zero, even if
/// the net liquidity cancels out.
#[derive(Debug, Clone, Default)]
pub struct TickMap {
    ticks: BTreeMap<i32, TickInfo>,
}

impl TickMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, tick: i32) -> Option<&TickInfo> {
        self.ticks.get(&tick)
    }

    pub fn len(&self) -> usize {
        self.ticks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ticks.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (i32, &TickInfo)> {
        self.ticks.iter().map(|(tick, info)| (*tick, info))
    }

    /// Adds `liquidity` to `tick` as the lower (`upper == false`) or upper
    /// boundary of a position. Returns whether the tick became initialized.
    pub fn update(&mut self, tick: i32, liquidity: u128, upper: bool) -> Result<bool, Error> {
        let (info, flipped) = self.updated(tick, liquidity, upper)?;
        self.store(tick, info);
        Ok(flipped)
    }

    /// Adds a position over `[tick_lower, tick_upper)`. Either both boundary
    /// ticks are written or, on error, neither is.
    pub fn update_range(
        &mut self,
        tick_lower: i32,
        tick_upper: i32,
        liquidity: u128,
    ) -> Result<(), Error> {
        if tick_lower >= tick_upper {
            return Err(SwapError::InvalidTickRange {
                lower: tick_lower,
                upper: tick_upper,
            }
            .into());
        }
        let (lower, _) = self.updated(tick_lower, liquidity, false)?;
        let (upper, _) = self.updated(tick_upper, liquidity, true)?;
        self.store(tick_lower, lower);
        self.store(tick_upper, upper);
        Ok(())
    }

    fn updated(
        &self,
        tick: i32,
        liquidity: u128,
        upper: bool,
    ) -> Result<(TickInfo, bool), Error> {
        if !(MIN_TICK..=MAX_TICK).contains(&tick) {
            return Err(SwapError::InvalidTickRange {
                lower: tick,
                upper: tick,
            }
            .into());
        }
        let delta = i128::try_from(liquidity).map_err(|_| MathError::Overflow)?;

        let mut info = self.ticks.get(&tick).copied().unwrap_or_default();
        let flipped = info.liquidity_gross == 0 && liquidity != 0;
        info.liquidity_gross = info
            .liquidity_gross
            .checked_add(liquidity)
            .ok_or(MathError::Overflow)?;
        info.liquidity_net = if upper {
            info.liquidity_net.checked_sub(delta).ok_or(MathError::Underflow)?
        } else {
            info.liquidity_net.checked_add(delta).ok_or(MathError::Overflow)?
        };
        Ok((info, flipped))
    }

    fn store(&mut self, tick: i32, info: TickInfo) {
        if info.liquidity_gross == 0 {
            self.ticks.remove(&tick);
        } else {
            self.ticks.insert(tick, info);
        }
    }

    /// Nearest stored tick `<= tick` when `lte`, otherwise `> tick`.
    pub fn next_initialized(&self, tick: i32, lte: bool) -> Option<i32> {
        if lte {
            self.ticks
                .range((Unbounded, Included(tick)))
                .next_back()
                .map(|(tick, _)| *tick)
        } else {
            self.ticks
                .range((Excluded(tick), Unbounded))
                .next()
                .map(|(tick, _)| *tick)
        }
    }

    pub fn liquidity_net(&self, tick: i32) -> i128 {
        self.ticks.get(&tick).map_or(0, |info| info.liquidity_net)
    }
}

/// Splits a compressed tick into its bitmap word and bit position.
#[inline]
pub fn position(compressed: i32) -> (i32, u8) {
    (
        compressed.div_euclid(TICKS_PER_WORD),
        compressed.rem_euclid(TICKS_PER_WORD) as u8,
    )
}

/// Finds the next initialized tick in the swap direction, never looking past
/// the bitmap word that holds the current compressed tick.
///
/// Returns the word boundary with `false` when the word has no initialized
/// tick in range. Stepping word by word keeps per-step rounding identical to
/// an on-chain swap, which reads one bitmap word per step.
pub fn next_initialized_tick_within_one_word<S: TickSource + ?Sized>(
    source: &S,
    pool: Address,
    tick: i32,
    tick_spacing: i32,
    lte: bool,
) -> Result<(i32, bool), MathError> {
    if tick_spacing <= 0 {
        return Err(MathError::DivisionByZero);
    }
    let compressed = tick.div_euclid(tick_spacing);
    let start = floor_to_spacing(tick, tick_spacing);

    if lte {
        let (_, bit_pos) = position(compressed);
        let word_start = (compressed - bit_pos as i32) * tick_spacing;
        match source.next_initialized_tick(pool, start, true) {
            Some(next) if next >= word_start => Ok((next, true)),
            _ => Ok((word_start, false)),
        }
    } else {
        let (_, bit_pos) = position(compressed + 1);
        let word_end = (compressed + 1 + (TICKS_PER_WORD - 1 - bit_pos as i32)) * tick_spacing;
        match source.next_initialized_tick(pool, start, false) {
            Some(next) if next <= word_end => Ok((next, true)),
            _ => Ok((word_end, false)),
        }
    }
}
