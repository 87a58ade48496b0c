//! Hash map backing the in-memory registries.
//!
//! The hasher is picked by cargo feature: `rustc-hash` (default) or `ahash`.
//! Enabling `std-hash`, or more than one of them, falls back to the std map.

#[cfg(all(
    feature = "rustc-hash",
    not(any(feature = "ahash", feature = "std-hash"))
))]
pub type FastMap<K, V> = rustc_hash::FxHashMap<K, V>;

#[cfg(all(
    feature = "ahash",
    not(any(feature = "rustc-hash", feature = "std-hash"))
))]
pub type FastMap<K, V> = ahash::AHashMap<K, V>;

#[cfg(not(any(
    all(
        feature = "rustc-hash",
        not(any(feature = "ahash", feature = "std-hash"))
    ),
    all(
        feature = "ahash",
        not(any(feature = "rustc-hash", feature = "std-hash"))
    ),
)))]
pub type FastMap<K, V> = std::collections::HashMap<K, V>;

/// Empty map with room for at least `capacity` entries.
pub(crate) fn map_with_capacity<K, V>(capacity: usize) -> FastMap<K, V>
where
    K: Eq + std::hash::Hash,
{
    let mut map = FastMap::default();
    map.reserve(capacity);
    map
}
