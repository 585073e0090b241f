use log::trace;
use rand::Rng;

use crate::calendar::Day;
use crate::config::VectorLayerConfig;
use crate::disease::DiseaseId;
use crate::random::{bernoulli, randomized_round};

/// Below this many individuals, vector events are drawn one vector at a time instead of by
/// rounding an expectation.
pub const SMALL_VECTOR_POPULATION: usize = 18;

/// Counts `count` independent events of probability `p`.
pub fn count_events<R: Rng + ?Sized>(rng: &mut R, count: usize, p: f64) -> usize {
    if count < SMALL_VECTOR_POPULATION {
        (0..count).filter(|_| bernoulli(rng, p)).count()
    } else {
        randomized_round(rng, count as f64 * p).min(count)
    }
}

/// The vectors living at one venue. Every vector is susceptible, or exposed to or infectious
/// with exactly one of the co-circulating vector-borne diseases.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VectorPopulation {
    diseases: Vec<DiseaseId>,
    susceptible: usize,
    exposed: Vec<usize>,
    infectious: Vec<usize>,
    updated_on: Option<Day>,
    infected_on: Option<Day>,
}

impl VectorPopulation {
    /// A fully susceptible population able to carry `diseases`.
    #[must_use]
    pub fn new(susceptible: usize, diseases: Vec<DiseaseId>) -> Self {
        let n = diseases.len();
        VectorPopulation {
            diseases,
            susceptible,
            exposed: vec![0; n],
            infectious: vec![0; n],
            updated_on: None,
            infected_on: None,
        }
    }

    /// The vector-borne diseases, in the order their counts are kept.
    #[must_use]
    pub fn diseases(&self) -> &[DiseaseId] {
        &self.diseases
    }

    fn index(&self, disease: DiseaseId) -> Option<usize> {
        self.diseases.iter().position(|&d| d == disease)
    }

    #[must_use]
    pub fn carries(&self, disease: DiseaseId) -> bool {
        self.index(disease).is_some()
    }

    #[must_use]
    pub fn total(&self) -> usize {
        self.susceptible + self.exposed.iter().sum::<usize>() + self.infectious.iter().sum::<usize>()
    }

    #[must_use]
    pub fn susceptible(&self) -> usize {
        self.susceptible
    }

    #[must_use]
    pub fn exposed(&self, disease: DiseaseId) -> usize {
        self.index(disease).map_or(0, |i| self.exposed[i])
    }

    #[must_use]
    pub fn infectious(&self, disease: DiseaseId) -> usize {
        self.index(disease).map_or(0, |i| self.infectious[i])
    }

    /// Moves up to `count` susceptible vectors into the exposed class of `disease`. Returns how
    /// many moved.
    pub fn expose(&mut self, disease: DiseaseId, count: usize) -> usize {
        let Some(i) = self.index(disease) else {
            return 0;
        };
        let moved = count.min(self.susceptible);
        self.susceptible -= moved;
        self.exposed[i] += moved;
        moved
    }

    /// Moves up to `count` susceptible vectors straight into the infectious class of `disease`.
    pub fn seed_infectious(&mut self, disease: DiseaseId, count: usize) -> usize {
        let Some(i) = self.index(disease) else {
            return 0;
        };
        let moved = count.min(self.susceptible);
        self.susceptible -= moved;
        self.infectious[i] += moved;
        moved
    }

    #[must_use]
    pub fn infected_today(&self, day: Day) -> bool {
        self.infected_on == Some(day)
    }

    pub fn mark_infected(&mut self, day: Day) {
        self.infected_on = Some(day);
    }

    /// Births, deaths and incubation for `day`. Runs at most once per day; new vectors are born
    /// susceptible.
    pub fn update<R: Rng + ?Sized>(&mut self, day: Day, params: &VectorLayerConfig, rng: &mut R) {
        if self.updated_on == Some(day) {
            return;
        }
        self.updated_on = Some(day);
        let total = self.total();
        if total == 0 {
            return;
        }

        self.susceptible += count_events(rng, total, params.birth_rate);
        self.susceptible -= count_events(rng, self.susceptible, params.death_rate);

        for i in 0..self.diseases.len() {
            self.exposed[i] -= count_events(rng, self.exposed[i], params.death_rate);
            let incubated = count_events(rng, self.exposed[i], params.incubation_rate);
            self.exposed[i] -= incubated;
            self.infectious[i] -= count_events(rng, self.infectious[i], params.death_rate);
            self.infectious[i] += incubated;
        }
        trace!(
            "day {day}: vectors S={} E={:?} I={:?}",
            self.susceptible,
            self.exposed,
            self.infectious
        );
    }
}
