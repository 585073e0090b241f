use log::trace;

use crate::calendar::Day;
use crate::disease::DiseaseId;
use crate::hashing::hash_stream_key;
use crate::rand::SeedableRng;
use crate::random::RngId;
use crate::venue::VenueId;

/// Hands out independently seeded generators. The seed of a stream is
/// `base_seed + xxh3(name, coordinates...)`, so the assignment of streams to entities is stable
/// across runs, releases and platforms.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct RandomStreams {
    base_seed: u64,
}

impl RandomStreams {
    #[must_use]
    pub fn new(base_seed: u64) -> Self {
        RandomStreams { base_seed }
    }

    #[must_use]
    pub fn base_seed(&self) -> u64 {
        self.base_seed
    }

    /// A generator for the stream `R` at arbitrary integer coordinates.
    pub fn get_rng<R: RngId>(&self, _rng_id: R, coordinates: &[u64]) -> R::RngType {
        let seed_offset = hash_stream_key(R::get_name(), coordinates);
        trace!(
            "creating RNG {} at {:?} (seed={})",
            R::get_name(),
            coordinates,
            self.base_seed
        );
        R::RngType::seed_from_u64(self.base_seed.wrapping_add(seed_offset))
    }

    /// A generator for day-level decisions (such as the order diseases are processed in).
    pub fn daily_rng<R: RngId>(&self, rng_id: R, day: Day) -> R::RngType {
        self.get_rng(rng_id, &[day_coordinate(day)])
    }

    /// A generator private to one venue on one day, for draws that concern no single disease.
    pub fn place_rng<R: RngId>(&self, rng_id: R, day: Day, venue: VenueId) -> R::RngType {
        self.get_rng(rng_id, &[day_coordinate(day), venue.0 as u64])
    }

    /// A generator private to one venue for one disease on one day.
    pub fn venue_rng<R: RngId>(
        &self,
        rng_id: R,
        day: Day,
        disease: DiseaseId,
        venue: VenueId,
    ) -> R::RngType {
        self.get_rng(
            rng_id,
            &[day_coordinate(day), disease.0 as u64, venue.0 as u64],
        )
    }
}

fn day_coordinate(day: Day) -> u64 {
    u64::from(day.cast_unsigned())
}
