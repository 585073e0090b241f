//! Deterministic hashing. The hashing data structures in the standard library are randomly
//! seeded, so iteration order over a `std::collections::HashMap` can change from run to run.
//! Everything in this crate that might influence the order of random draws uses the maps
//! re-exported here instead.
//!
//! `HashMap<K, V, S>` has no `new` method for a non-default hasher. Use `HashMap::default()`.
//!
//! [`hash_stream_key`] produces stable 64-bit hashes used to derive random number generator
//! seeds in [`crate::random::RandomStreams`]. These must not change between releases, or seeded
//! runs stop being reproducible.

use xxhash_rust::xxh3::Xxh3;

pub use rustc_hash::{FxHashMap as HashMap, FxHashSet as HashSet};

/// Hashes a stream name together with a sequence of integer coordinates (day, disease, venue,
/// ...). Coordinates are written little-endian so the result is platform independent.
pub fn hash_stream_key(name: &str, coordinates: &[u64]) -> u64 {
    let mut hasher = Xxh3::new();
    hasher.update(name.as_bytes());
    for coordinate in coordinates {
        hasher.update(&coordinate.to_le_bytes());
    }
    hasher.digest()
}
