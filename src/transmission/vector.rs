use log::trace;
use rand::seq::SliceRandom;
use rand::Rng;

use crate::calendar::Day;
use crate::config::VectorLayerConfig;
use crate::disease::{Disease, DiseaseId};
use crate::host::{HostId, HostPopulation};
use crate::numeric::{checked_probability, ProbabilityPolicy};
use crate::random::randomized_round;
use crate::transmission::{expose, TransmissionContext};
use crate::venue::{count_events, Venue};

/// Host to vector to host transmission. Vectors are counted, not modelled individually: each
/// venue carries a [`VectorPopulation`](crate::venue::VectorPopulation) that is infected by the
/// infectious hosts present and in turn bites the susceptible ones.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct VectorTransmission {
    params: VectorLayerConfig,
}

impl VectorTransmission {
    #[must_use]
    pub fn new(params: VectorLayerConfig) -> Self {
        VectorTransmission { params }
    }

    #[must_use]
    pub fn params(&self) -> &VectorLayerConfig {
        &self.params
    }

    /// Runs both stages at `venue` for `disease`. Vectors are infected at most once per venue
    /// per day, whichever vector-borne disease gets there first.
    pub fn spread_infection<P, R>(
        &self,
        ctx: &mut TransmissionContext<'_, P>,
        disease: &Disease,
        venue: &mut Venue,
        rng: &mut R,
    ) where
        P: HostPopulation + ?Sized,
        R: Rng + ?Sized,
    {
        let (day, id) = (ctx.day, disease.id());
        if disease.transmissibility() == 0.0 || !venue.is_open(day) {
            venue.clear_infectious(id);
            return;
        }
        let Some(vectors) = venue.vectors() else {
            return;
        };
        let infected_today = vectors.infected_today(day);

        let mut visitors = 0;
        let mut susceptible_visitors = Vec::new();
        for &host in venue.members() {
            if ctx.hosts.is_present(host, venue.id(), day) {
                visitors += 1;
                if ctx.hosts.is_susceptible(host, id) {
                    susceptible_visitors.push(host);
                }
            }
        }

        if !infected_today {
            self.infect_vectors(venue, visitors, day, disease.probability_policy(), rng);
        }
        self.infect_hosts(ctx, disease, venue, visitors, susceptible_visitors, rng);
    }

    /// Host to vector stage. Each susceptible vector is infected with probability
    /// `1 - (1 - infection_efficiency)^(bite_rate * infectious hosts / hosts)`, and the new
    /// infections are split across the diseases by their share of the infectious hosts.
    /// Returns the number of vectors infected.
    pub fn infect_vectors<R: Rng + ?Sized>(
        &self,
        venue: &mut Venue,
        total_hosts: usize,
        day: Day,
        policy: ProbabilityPolicy,
        rng: &mut R,
    ) -> usize {
        if total_hosts == 0 {
            return 0;
        }
        let Some(vectors) = venue.vectors() else {
            return 0;
        };
        let susceptible = vectors.susceptible();
        if susceptible == 0 {
            return 0;
        }
        let infectious_hosts: Vec<(DiseaseId, usize)> = vectors
            .diseases()
            .iter()
            .map(|&disease| (disease, venue.infectious(disease).len()))
            .collect();
        let total_infectious: usize = infectious_hosts.iter().map(|(_, n)| n).sum();
        if total_infectious == 0 {
            return 0;
        }

        let bites = self.params.bite_rate * total_infectious as f64 / total_hosts as f64;
        let prob_infection = checked_probability(
            1.0 - (1.0 - self.params.infection_efficiency).powf(bites),
            policy,
            "vector infection",
        );
        let new_infections = count_events(rng, susceptible, prob_infection);
        let shares = partition(rng, new_infections, &infectious_hosts);

        let Some(vectors) = venue.vectors_mut() else {
            return 0;
        };
        let mut infected = 0;
        for (disease, count) in shares {
            infected += vectors.expose(disease, count);
        }
        vectors.mark_infected(day);
        trace!(
            "day {day}: {infected} vectors infected at {:?} by {total_infectious} hosts",
            venue.id()
        );
        infected
    }

    /// Vector to host stage for `disease`. Each susceptible visitor receives an infectious bite
    /// with probability `1 - (1 - transmission_efficiency)^(bite_rate * infectious vectors /
    /// hosts)`; the expected number, randomly rounded, are drawn without replacement in random
    /// order. Anyone infected becomes unsusceptible to the other vector-borne diseases here.
    pub fn infect_hosts<P, R>(
        &self,
        ctx: &mut TransmissionContext<'_, P>,
        disease: &Disease,
        venue: &mut Venue,
        total_hosts: usize,
        mut susceptible_visitors: Vec<HostId>,
        rng: &mut R,
    ) -> usize
    where
        P: HostPopulation + ?Sized,
        R: Rng + ?Sized,
    {
        let id = disease.id();
        if total_hosts == 0 || susceptible_visitors.is_empty() {
            return 0;
        }
        let Some(vectors) = venue.vectors() else {
            return 0;
        };
        let infectious_vectors = vectors.infectious(id);
        let efficiency = self.params.transmission_efficiency;
        if infectious_vectors == 0 || efficiency == 0.0 {
            return 0;
        }
        let siblings: Vec<DiseaseId> = vectors
            .diseases()
            .iter()
            .copied()
            .filter(|&other| other != id)
            .collect();

        let bites = self.params.bite_rate * infectious_vectors as f64 / total_hosts as f64;
        let prob_infection = checked_probability(
            1.0 - (1.0 - efficiency).powf(bites),
            disease.probability_policy(),
            disease.name(),
        );
        let exposed = randomized_round(rng, susceptible_visitors.len() as f64 * prob_infection);
        susceptible_visitors.shuffle(rng);

        let mut infected = 0;
        for &host in susceptible_visitors.iter().take(exposed) {
            if !ctx.hosts.is_susceptible(host, id) {
                continue;
            }
            expose(ctx, disease, venue, host, None, rng);
            for &other in &siblings {
                ctx.hosts.become_unsusceptible(host, other);
            }
            infected += 1;
        }
        infected
    }
}

/// Splits `total` new infections across diseases by their share of `weights`: each disease gets
/// the floor of its share, and the remainder is handed out one at a time with probability
/// proportional to the weights.
fn partition<R: Rng + ?Sized>(
    rng: &mut R,
    total: usize,
    weights: &[(DiseaseId, usize)],
) -> Vec<(DiseaseId, usize)> {
    let sum: usize = weights.iter().map(|(_, w)| w).sum();
    if sum == 0 {
        return Vec::new();
    }
    let mut shares: Vec<(DiseaseId, usize)> = weights
        .iter()
        .map(|&(disease, weight)| (disease, total * weight / sum))
        .collect();
    let assigned: usize = shares.iter().map(|(_, n)| n).sum();
    for _ in assigned..total {
        let mut ticket = rng.random_range(0..sum);
        for (i, &(_, weight)) in weights.iter().enumerate() {
            if ticket < weight {
                shares[i].1 += 1;
                break;
            }
            ticket -= weight;
        }
    }
    shares
}
