use crate::path::Protocol;
use alloy_primitives::Address;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MathError {
    #[error("Math error - overflow")]
    Overflow,
    #[error("Math error - underflow")]
    Underflow,
    #[error("Math error - division by zero")]
    DivisionByZero,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StateError {
    #[error("State error - sqrtPrice out of bounds")]
    SqrtPriceOutOfBounds,
    #[error("State error - sqrtPrice is 0")]
    SqrtPriceIsZero,
    #[error("State error - sqrtRatio is 0")]
    SqrtRatioIsZero,

    #[error("State error - tick out of bounds")]
    TickOutOfBounds,

    #[error("State error - liquidity is 0")]
    LiquidityIsZero,

    #[error("State error - requested amount exceeds pool reserves")]
    InsufficientReserves,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SwapError {
    #[error("Swap error - amount specified is 0")]
    AmountSpecifiedIsZero,
    #[error("Swap error - sqrtPrice limit out of bounds")]
    SqrtPriceOutOfBounds,
    #[error("Swap error - pool is not initialized")]
    PoolNotInitialized,
    #[error("Swap error - pool is already initialized")]
    PoolAlreadyInitialized,
    #[error("Swap error - invalid tick range [{lower}, {upper}]")]
    InvalidTickRange { lower: i32, upper: i32 },
    #[error("Swap error - stable curve did not converge")]
    StableCurveDidNotConverge,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PathError {
    #[error("Path error - invalid length {len}")]
    InvalidLength { len: usize },
    #[error("Path error - unknown pool parameter {param:#08x}")]
    UnknownPoolParam { param: u32 },
    #[error("Path error - {tokens} tokens do not match {params} pool parameters")]
    MismatchedLengths { tokens: usize, params: usize },
    #[error("Path error - tick spacing {tick_spacing} does not fit the pool parameter")]
    InvalidTickSpacing { tick_spacing: i32 },
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("Malformed path: {0}")]
    MalformedPath(#[from] PathError),

    #[error("No {protocol:?} pool for {token_in} -> {token_out}")]
    PoolNotFound {
        token_in: Address,
        token_out: Address,
        protocol: Protocol,
    },

    #[error("Insufficient liquidity to fill the requested amount")]
    InsufficientLiquidity,

    #[error(transparent)]
    MathError(#[from] MathError),

    #[error(transparent)]
    StateError(#[from] StateError),

    #[error(transparent)]
    SwapError(#[from] SwapError),

    #[error(transparent)]
    ConfigError(#[from] ConfigError),
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Config error - {name} is not a valid integer: {value}")]
    InvalidValue { name: &'static str, value: String },
    #[error("Config error - {name} must not exceed {max} bps, got {value}")]
    FeeOutOfRange { name: &'static str, value: u32, max: u32 },
}
