//! Read-only quoting for mixed swap routes in pure Rust.
//!
//! A route is a packed byte path of tokens and 3-byte pool parameters. Each hop
//! is either a concentrated-liquidity (tick based) pool, served by one of two
//! independent deployments (legacy and canonical), or a constant-function pair
//! using the volatile (`x·y = k`) or stable (`x³y + y³x = k`) curve.
//!
//! This crate exposes:
//! - Low‑level fixed-point math (`math::*`) for ticks, prices and swap steps.
//! - The two swap models (`pool::swap`, `pool::v2_pair`) and the tick provider.
//! - The path codec (`path`) and the `Quoter` that walks a route.
//! - In‑memory pool and pair registries (`source`) implementing the read
//!   interfaces the quoter consumes.
//!
//! # Examples
//!
//! ```no_run
//! use mixed_route_quoter::{
//!     path::{self, Protocol},
//!     pool::v3_pool::V3Pool,
//!     source::{InMemoryPairs, InMemoryPools},
//!     Address, Quoter, Q96, U256,
//! };
//!
//! let token_a = Address::repeat_byte(0x01);
//! let token_b = Address::repeat_byte(0x02);
//!
//! let mut legacy = InMemoryPools::default();
//! let mut pool = V3Pool::new(Address::repeat_byte(0xaa), token_a, token_b, 3000, 60);
//! pool.initialize(Q96).unwrap();
//! pool.add_position(-887220, 887220, 1_000_000).unwrap();
//! legacy.insert(pool);
//!
//! let canonical = InMemoryPools::default();
//! let pairs = InMemoryPairs::default();
//! let quoter = Quoter::new(&legacy, &canonical, &pairs);
//!
//! let route = path::encode(&[token_a, token_b], &[Protocol::V3Legacy { tick_spacing: 60 }]).unwrap();
//! let quote = quoter.quote_exact_input(&route, U256::from(10_000u64)).unwrap();
//! println!("amount out: {}", quote.amount);
//! ```

pub use alloy_primitives::{Address, Bytes, I256, U256};

pub mod config;
pub mod error;
mod hash;
pub mod math;
pub mod path;
pub mod pool;
pub mod quoter;
pub mod source;

pub use config::QuoterConfig;
pub use error::Error;
pub use hash::FastMap;
pub use quoter::{QuoteResult, QuoteSingleResult, Quoter};

const U256_127: U256 = U256::from_limbs([127, 0, 0, 0]);
const U256_128: U256 = U256::from_limbs([128, 0, 0, 0]);

const U160_MAX: U256 = U256::from_limbs([u64::MAX, u64::MAX, u32::MAX as u64, 0]);
const U256_E4: U256 = U256::from_limbs([10000, 0, 0, 0]);
const U256_E6: U256 = U256::from_limbs([1000000, 0, 0, 0]);
const U256_E18: U256 = U256::from_limbs([1000000000000000000, 0, 0, 0]);

pub const RESOLUTION: u8 = 96;
pub const Q96: U256 = U256::from_limbs([0, 4294967296, 0, 0]);
