//! Random number streams and the sampling primitives shared by the natural history and
//! transmission code.
//!
//! Nothing in this crate keeps an ambient generator. Every stochastic function takes
//! `rng: &mut R` explicitly, and the simulation driver hands out generators from
//! [`RandomStreams`], which derives a fresh, independently seeded generator for each
//! `(stream name, day, disease, venue)` coordinate. A venue's draws therefore do not depend on
//! how many draws other venues made before it, which keeps seeded runs reproducible no matter
//! in which order (or on which thread) venues are processed.
mod macros;
mod sampling_algorithms;
mod streams;

pub use macros::define_rng;
pub use sampling_algorithms::{
    bernoulli, draw_from_cdf, randomized_round, sample_multiple_from_known_length,
    sample_single_from_known_length, uniform_unit_open_below,
};
pub use streams::RandomStreams;

#[cfg(test)]
pub(crate) use sampling_algorithms::test_rngs;

use crate::rand::{Rng, SeedableRng};

pub trait RngId: Copy + Clone {
    type RngType: SeedableRng + Rng;
    fn get_name() -> &'static str;
}
