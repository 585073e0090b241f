use std::collections::BTreeMap;

use log::debug;
use rand::seq::SliceRandom;
use rand::Rng;

use crate::disease::Disease;
use crate::host::{HostId, HostPopulation};
use crate::numeric::checked_probability;
use crate::random::{
    randomized_round, sample_multiple_from_known_length, sample_single_from_known_length,
};
use crate::transmission::{attempt_transmission, TransmissionContext};
use crate::venue::{Venue, VenueKind};

/// Options of the density-dependent neighborhood model.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct DensityParams {
    /// An infector who has infected this many people is done for the day.
    pub max_infectees: Option<usize>,
}

/// Person-to-person transmission through contacts at shared venues. Households mix
/// exhaustively, neighborhoods can use the density model, and every other venue samples
/// contacts.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct ContactTransmission {
    density: Option<DensityParams>,
}

impl ContactTransmission {
    #[must_use]
    pub fn new(density: Option<DensityParams>) -> Self {
        ContactTransmission { density }
    }

    #[must_use]
    pub fn density(&self) -> Option<DensityParams> {
        self.density
    }

    /// Spreads `disease` among the hosts at `venue` today. Nothing happens if the disease is
    /// not transmissible, the venue is closed or nobody is enrolled; the venue's infectious list
    /// is cleared in that case.
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
        if disease.transmissibility() == 0.0 || !venue.is_open(ctx.day) || venue.is_empty() {
            venue.clear_infectious(disease.id());
            return;
        }
        if venue.infectious(disease.id()).is_empty() {
            return;
        }
        match (venue.kind(), self.density) {
            (VenueKind::Household, _) => pairwise_transmission(ctx, disease, venue, rng),
            (VenueKind::Neighborhood, Some(density)) => {
                density_transmission(ctx, disease, venue, density, rng);
            }
            _ => default_transmission(ctx, disease, venue, rng),
        }
    }
}

/// Every infectious member tries to infect every other member who is present and susceptible,
/// with probability `pair probability * infectivity * contact rate`.
pub fn pairwise_transmission<P, R>(
    ctx: &mut TransmissionContext<'_, P>,
    disease: &Disease,
    venue: &mut Venue,
    rng: &mut R,
) where
    P: HostPopulation + ?Sized,
    R: Rng + ?Sized,
{
    let (day, id) = (ctx.day, disease.id());
    let contact_rate = venue.contact_rate(day, disease, ctx.calendar);
    let infectious = venue.infectious(id).to_vec();
    let members = venue.members().to_vec();

    for infector in infectious {
        let infectivity = ctx.hosts.infectivity(infector, id, day);
        if infectivity <= 0.0 {
            continue;
        }
        for &infectee in &members {
            if infectee == infector
                || !ctx.hosts.is_present(infectee, venue.id(), day)
                || !ctx.hosts.is_susceptible(infectee, id)
            {
                continue;
            }
            let prob = venue.transmission_probability(disease, &*ctx.hosts, infector, infectee)
                * infectivity
                * contact_rate;
            attempt_transmission(ctx, disease, venue, prob, infector, infectee, rng);
        }
    }
}

/// Density-dependent force of infection. Each member is exposed with probability
/// `1 - (1 - contact rate)^infectious`; a random subset of that expected size is exposed and each
/// exposed member is paired with a random infector. Infectors that reach `max_infectees` drop out for the day.
pub fn density_transmission<P, R>(
    ctx: &mut TransmissionContext<'_, P>,
    disease: &Disease,
    venue: &mut Venue,
    params: DensityParams,
    rng: &mut R,
) where
    P: HostPopulation + ?Sized,
    R: Rng + ?Sized,
{
    let (day, id) = (ctx.day, disease.id());
    let contact_prob = checked_probability(
        venue.contact_rate(day, disease, ctx.calendar),
        disease.probability_policy(),
        disease.name(),
    );
    let mut infectors = venue.infectious(id).to_vec();
    let mut infectee_counts = vec![0usize; infectors.len()];
    let roster = venue.members();

    let exponent = i32::try_from(infectors.len()).unwrap_or(i32::MAX);
    let prob_infection = 1.0 - (1.0 - contact_prob).powi(exponent);
    let exposed = randomized_round(rng, roster.len() as f64 * prob_infection);
    let exposed = sample_multiple_from_known_length(rng, roster.iter().copied(), exposed);

    let mut saturated = 0;
    for infectee in exposed {
        if !ctx.hosts.is_present(infectee, venue.id(), day)
            || !ctx.hosts.is_susceptible(infectee, id)
        {
            continue;
        }
        let Some(pos) = sample_single_from_known_length(rng, 0..infectors.len()) else {
            break;
        };
        let infector = infectors[pos];
        let prob = ctx.hosts.infectivity(infector, id, day);
        if !attempt_transmission(ctx, disease, venue, prob, infector, infectee, rng) {
            continue;
        }
        infectee_counts[pos] += 1;
        if params
            .max_infectees
            .is_some_and(|max| infectee_counts[pos] >= max)
        {
            infectors.swap_remove(pos);
            infectee_counts.swap_remove(pos);
            saturated += 1;
        }
    }
    if saturated > 0 {
        debug!(
            "day {day}: {saturated} infectors reached the infectee cap at {:?}",
            venue.id()
        );
    }
}

/// Contact sampling for schools, workplaces and other large venues.
///
/// Each infector, in random order, makes `contact_count` draws with replacement over
/// `max(original size - 1, roster size)` slots. Slots beyond the roster are contacts with
/// nobody enrolled. Drawing oneself is retried while anyone else is enrolled. Every draw that
/// lands on a present member becomes one transmission attempt while they stay susceptible.
pub fn default_transmission<P, R>(
    ctx: &mut TransmissionContext<'_, P>,
    disease: &Disease,
    venue: &mut Venue,
    rng: &mut R,
) where
    P: HostPopulation + ?Sized,
    R: Rng + ?Sized,
{
    let (day, id) = (ctx.day, disease.id());
    let roster = venue.members().to_vec();
    let targets = venue.original_size().saturating_sub(1).max(roster.len());
    let contact_rate = venue.contact_rate(day, disease, ctx.calendar);
    let mut infectious = venue.infectious(id).to_vec();
    infectious.shuffle(rng);

    for infector in infectious {
        let contacts = venue.contact_count(&*ctx.hosts, infector, id, day, contact_rate, rng);
        let mut draws: BTreeMap<usize, usize> = BTreeMap::new();
        let mut made = 0;
        while made < contacts {
            let pos = rng.random_range(0..targets);
            if pos < roster.len() && roster[pos] == infector {
                if roster.len() > 1 {
                    continue;
                }
                break;
            }
            made += 1;
            if pos < roster.len() {
                *draws.entry(pos).or_default() += 1;
            }
        }

        for (pos, times) in draws {
            let infectee = roster[pos];
            if !ctx.hosts.is_present(infectee, venue.id(), day) {
                continue;
            }
            let prob = venue.transmission_probability(disease, &*ctx.hosts, infector, infectee);
            for _ in 0..times {
                if !ctx.hosts.is_susceptible(infectee, id) {
                    break;
                }
                attempt_transmission(ctx, disease, venue, prob, infector, infectee, rng);
            }
        }
    }
}

#[cfg(test)]
mod test {
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;
    use crate::calendar::{Calendar, Day};
    use crate::config::{PairProbabilityConfig, VenueContactConfig};
    use crate::disease::test::{build, disease_config};
    use crate::disease::DiseaseId;
    use crate::epidemic::Epidemic;
    use crate::random::test_rngs::ZeroRng;
    use crate::transmission::test::TestHosts;
    use crate::venue::VenueId;

    const DAY: Day = 10;

    fn venue(kind: VenueKind, n: usize, infectious: &[usize]) -> Venue {
        let mut venue = Venue::with_members(VenueId(0), kind, (0..n).map(HostId).collect());
        for &host in infectious {
            venue.add_infectious(DiseaseId(0), HostId(host), DAY);
        }
        venue
    }

    fn hosts(n: usize, infectious: &[usize]) -> TestHosts {
        let mut hosts = TestHosts::new(n);
        for &host in infectious {
            hosts.infectivity[host] = 1.0;
        }
        hosts
    }

    fn contacts(kind: VenueKind, contacts_per_day: f64) -> VenueContactConfig {
        VenueContactConfig {
            kind,
            contacts_per_day,
            pair_probability: PairProbabilityConfig::default(),
            weekend_contact_rate: None,
        }
    }

    fn spread(
        model: ContactTransmission,
        disease: &Disease,
        venue: &mut Venue,
        hosts: &mut TestHosts,
        rng: &mut impl Rng,
    ) -> Epidemic {
        // Day 10 from a Monday start is a Thursday.
        let calendar = Calendar::new(1, 1).unwrap();
        let mut epidemic = Epidemic::new(disease.id());
        let mut ctx = TransmissionContext {
            day: DAY,
            calendar: &calendar,
            hosts,
            epidemic: &mut epidemic,
        };
        model.spread_infection(&mut ctx, disease, venue, rng);
        epidemic
    }

    #[test]
    fn household_with_certain_contact_infects_everyone() {
        let disease = build(&disease_config("flu", 1.0));
        let mut venue = venue(VenueKind::Household, 3, &[0]);
        let mut hosts = hosts(3, &[0]);
        let epidemic = spread(
            ContactTransmission::default(),
            &disease,
            &mut venue,
            &mut hosts,
            &mut ZeroRng,
        );
        assert_eq!(hosts.infected(), vec![HostId(1), HostId(2)]);
        assert_eq!(epidemic.exposed(DAY), 2);
        assert_eq!(venue.counters(disease.id()).new_infections(DAY), 2);
        assert!(hosts.infections.iter().all(|i| i.infector() == Some(HostId(0))));
    }

    #[test]
    fn household_skips_absent_members() {
        let disease = build(&disease_config("flu", 1.0));
        let mut venue = venue(VenueKind::Household, 3, &[0]);
        let mut hosts = hosts(3, &[0]);
        hosts.absent.insert(2);
        spread(
            ContactTransmission::default(),
            &disease,
            &mut venue,
            &mut hosts,
            &mut ZeroRng,
        );
        assert_eq!(hosts.infected(), vec![HostId(1)]);
    }

    #[test]
    fn household_probability_is_pair_times_infectivity_times_rate() {
        let mut config = disease_config("flu", 0.5);
        config.venue_contacts = vec![contacts(VenueKind::Household, 1.0)];
        let disease = build(&config);
        let mut rng = StdRng::seed_from_u64(42);
        let trials = 10_000;
        let mut infected = 0;
        for _ in 0..trials {
            let mut venue = venue(VenueKind::Household, 2, &[0]);
            let mut hosts = hosts(2, &[0]);
            hosts.infectivity[0] = 0.6;
            spread(
                ContactTransmission::default(),
                &disease,
                &mut venue,
                &mut hosts,
                &mut rng,
            );
            infected += hosts.infections.len();
        }
        let rate = infected as f64 / f64::from(trials);
        assert!((rate - 0.3).abs() < 0.02, "rate {rate}");
    }

    #[test]
    fn zero_transmissibility_is_a_no_op() {
        let disease = build(&disease_config("flu", 0.0));
        for kind in [VenueKind::Household, VenueKind::School, VenueKind::Neighborhood] {
            let mut venue = venue(kind, 5, &[0, 1]);
            let mut hosts = hosts(5, &[0, 1]);
            let epidemic = spread(
                ContactTransmission::new(Some(DensityParams::default())),
                &disease,
                &mut venue,
                &mut hosts,
                &mut ZeroRng,
            );
            assert!(hosts.infections.is_empty());
            assert_eq!(epidemic.total_exposed(), 0);
            assert_eq!(venue.counters(disease.id()).total_infections(), 0);
            assert!(venue.infectious(disease.id()).is_empty());
        }
    }

    #[test]
    fn closed_venue_is_a_no_op() {
        let disease = build(&disease_config("flu", 1.0));
        let mut venue = venue(VenueKind::School, 5, &[0]);
        venue.close(DAY, DAY + 1);
        let mut hosts = hosts(5, &[0]);
        spread(
            ContactTransmission::default(),
            &disease,
            &mut venue,
            &mut hosts,
            &mut ZeroRng,
        );
        assert!(hosts.infections.is_empty());
    }

    #[test]
    fn default_model_never_infects_the_infector() {
        let mut config = disease_config("flu", 1.0);
        config.venue_contacts = vec![contacts(VenueKind::School, 60.0)];
        let disease = build(&config);
        let mut venue = venue(VenueKind::School, 4, &[0]);
        let mut hosts = hosts(4, &[0]);
        let mut rng = StdRng::seed_from_u64(5);
        spread(
            ContactTransmission::default(),
            &disease,
            &mut venue,
            &mut hosts,
            &mut rng,
        );
        let infected = hosts.infected();
        assert!(!infected.contains(&HostId(0)));
        // Sixty certain contacts over three other members reach all of them.
        let mut sorted = infected.clone();
        sorted.sort();
        assert_eq!(sorted, vec![HostId(1), HostId(2), HostId(3)]);
    }

    #[test]
    fn default_model_gives_up_when_alone() {
        let disease = build(&disease_config("flu", 1.0));
        let mut venue = venue(VenueKind::Workplace, 1, &[0]);
        let mut hosts = hosts(1, &[0]);
        spread(
            ContactTransmission::default(),
            &disease,
            &mut venue,
            &mut hosts,
            &mut ZeroRng,
        );
        assert!(hosts.infections.is_empty());
    }

    #[test]
    fn default_model_targets_include_departed_slots() {
        // Ten slots from the original roster, but only two members remain: most contacts land
        // on nobody.
        let mut config = disease_config("flu", 1.0);
        config.venue_contacts = vec![contacts(VenueKind::Workplace, 1.0)];
        let disease = build(&config);
        let mut rng = StdRng::seed_from_u64(11);
        let trials = 5_000;
        let mut infected = 0;
        for _ in 0..trials {
            let mut venue = venue(VenueKind::Workplace, 11, &[]);
            for host in 2..11 {
                venue.unenroll(HostId(host));
            }
            venue.add_infectious(disease.id(), HostId(0), DAY);
            let mut hosts = hosts(11, &[0]);
            spread(
                ContactTransmission::default(),
                &disease,
                &mut venue,
                &mut hosts,
                &mut rng,
            );
            infected += hosts.infections.len();
        }
        // targets = max(11 - 1, 2) = 10. The infector's own slot is redrawn, leaving nine
        // slots of which the other member occupies one.
        let rate = infected as f64 / f64::from(trials);
        assert!((rate - 1.0 / 9.0).abs() < 0.015, "rate {rate}");
    }

    #[test]
    fn density_model_respects_infectee_cap() {
        let mut config = disease_config("flu", 1.0);
        config.venue_contacts = vec![contacts(VenueKind::Neighborhood, 1.0)];
        let disease = build(&config);
        let mut venue = venue(VenueKind::Neighborhood, 10, &[0]);
        let mut hosts = hosts(10, &[0]);
        let mut rng = StdRng::seed_from_u64(3);
        let model = ContactTransmission::new(Some(DensityParams {
            max_infectees: Some(2),
        }));
        spread(model, &disease, &mut venue, &mut hosts, &mut rng);
        assert_eq!(hosts.infections.len(), 2);
    }

    #[test]
    fn density_model_without_cap_exposes_everyone_at_certain_contact() {
        let mut config = disease_config("flu", 1.0);
        config.venue_contacts = vec![contacts(VenueKind::Neighborhood, 1.0)];
        let disease = build(&config);
        let mut venue = venue(VenueKind::Neighborhood, 10, &[0]);
        let mut hosts = hosts(10, &[0]);
        let mut rng = StdRng::seed_from_u64(3);
        let model = ContactTransmission::new(Some(DensityParams::default()));
        spread(model, &disease, &mut venue, &mut hosts, &mut rng);
        // p = 1, so all ten members are drawn; the infector is not susceptible.
        assert_eq!(hosts.infections.len(), 9);
    }

    #[test]
    fn neighborhoods_use_default_model_without_density_option() {
        let mut config = disease_config("flu", 1.0);
        config.venue_contacts = vec![contacts(VenueKind::Neighborhood, 0.0)];
        let disease = build(&config);
        let mut venue = venue(VenueKind::Neighborhood, 10, &[0]);
        let mut hosts = hosts(10, &[0]);
        spread(
            ContactTransmission::default(),
            &disease,
            &mut venue,
            &mut hosts,
            &mut ZeroRng,
        );
        assert!(hosts.infections.is_empty());
    }
}
