pub mod swap;
pub mod ticks;
pub mod v2_pair;
pub mod v3_pool;
