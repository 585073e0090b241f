//! Venues (mixing groups): the places where hosts meet and where transmission happens.
//!
//! A [`Venue`] owns its roster and, per disease, the list of members who are infectious today,
//! day-scoped infection counters and the first and last days anyone was infectious there. It also
//! answers the contact-model questions the transmission strategies ask: how many contacts per day
//! a disease gets here, the contact rate on a given day, how many contacts one infector makes,
//! and the probability that a particular pair transmits.

mod contact;
mod vectors;

pub use contact::{ContactParams, PairProbability};
pub use vectors::{count_events, VectorPopulation, SMALL_VECTOR_POPULATION};

use rand::Rng;
use serde::Deserialize;

use crate::calendar::{Calendar, Day};
use crate::counters::InfectionCounters;
use crate::disease::{Disease, DiseaseId};
use crate::host::{HostId, HostPopulation};
use crate::random::randomized_round;

#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct VenueId(pub usize);

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VenueKind {
    Household,
    School,
    Workplace,
    Neighborhood,
    Community,
    VectorHabitat,
}

static NO_COUNTS: InfectionCounters = InfectionCounters::new();

#[derive(Clone, Debug, Default)]
struct DiseaseState {
    infectious: Vec<HostId>,
    counters: InfectionCounters,
    first_infectious_day: Option<Day>,
    last_infectious_day: Option<Day>,
}

fn state_mut(states: &mut Vec<DiseaseState>, disease: DiseaseId) -> &mut DiseaseState {
    if states.len() <= disease.0 {
        states.resize_with(disease.0 + 1, DiseaseState::default);
    }
    &mut states[disease.0]
}

#[derive(Clone, Debug)]
pub struct Venue {
    id: VenueId,
    kind: VenueKind,
    members: Vec<HostId>,
    original_size: usize,
    /// Closed on `[close, reopen)`.
    closure: Option<(Day, Day)>,
    diseases: Vec<DiseaseState>,
    vectors: Option<VectorPopulation>,
}

impl Venue {
    #[must_use]
    pub fn new(id: VenueId, kind: VenueKind) -> Self {
        Venue {
            id,
            kind,
            members: Vec::new(),
            original_size: 0,
            closure: None,
            diseases: Vec::new(),
            vectors: None,
        }
    }

    #[must_use]
    pub fn with_members(id: VenueId, kind: VenueKind, members: Vec<HostId>) -> Self {
        let mut venue = Venue::new(id, kind);
        venue.original_size = members.len();
        venue.members = members;
        venue
    }

    #[must_use]
    pub fn id(&self) -> VenueId {
        self.id
    }

    #[must_use]
    pub fn kind(&self) -> VenueKind {
        self.kind
    }

    #[must_use]
    pub fn is_household(&self) -> bool {
        self.kind == VenueKind::Household
    }

    #[must_use]
    pub fn members(&self) -> &[HostId] {
        &self.members
    }

    #[must_use]
    pub fn size(&self) -> usize {
        self.members.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// The largest the roster has been. Enrollment grows it; leaving does not shrink it.
    #[must_use]
    pub fn original_size(&self) -> usize {
        self.original_size
    }

    pub fn enroll(&mut self, host: HostId) {
        self.members.push(host);
        self.original_size = self.original_size.max(self.members.len());
    }

    /// Removes `host` from the roster. Returns false if they were not enrolled.
    pub fn unenroll(&mut self, host: HostId) -> bool {
        match self.members.iter().position(|&member| member == host) {
            Some(index) => {
                self.members.swap_remove(index);
                true
            }
            None => false,
        }
    }

    /// Closes the venue from `close` up to, but not including, `reopen`.
    pub fn close(&mut self, close: Day, reopen: Day) {
        self.closure = Some((close, reopen));
    }

    #[must_use]
    pub fn is_open(&self, day: Day) -> bool {
        self.closure
            .is_none_or(|(close, reopen)| day < close || day >= reopen)
    }

    /// Members infectious with `disease` today, as of the last rebuild.
    #[must_use]
    pub fn infectious(&self, disease: DiseaseId) -> &[HostId] {
        self.diseases
            .get(disease.0)
            .map(|state| state.infectious.as_slice())
            .unwrap_or_default()
    }

    pub fn clear_infectious(&mut self, disease: DiseaseId) {
        if let Some(state) = self.diseases.get_mut(disease.0) {
            state.infectious.clear();
        }
    }

    /// Adds an infectious member and records `day` as a day with infectious presence.
    pub fn add_infectious(&mut self, disease: DiseaseId, host: HostId, day: Day) {
        debug_assert!(self.members.contains(&host), "{host:?} is not enrolled");
        let state = state_mut(&mut self.diseases, disease);
        state.infectious.push(host);
        state.first_infectious_day.get_or_insert(day);
        state.last_infectious_day = Some(day);
    }

    /// Clears and refills the infectious list of `disease` from the members present on `day`,
    /// and counts the members who are infected and symptomatic.
    pub fn rebuild_infectious<P: HostPopulation + ?Sized>(
        &mut self,
        disease: &Disease,
        hosts: &P,
        day: Day,
    ) {
        let id = disease.id();
        let infectivity_threshold = disease.natural_history().infectivity_threshold();
        let symptomaticity_threshold = disease.natural_history().symptomaticity_threshold();
        let state = state_mut(&mut self.diseases, id);
        state.infectious.clear();
        for &host in &self.members {
            if !hosts.is_present(host, self.id, day) || !hosts.is_infected(host, id) {
                continue;
            }
            state.counters.record_current_infection(day);
            if hosts.symptoms(host, id, day) > symptomaticity_threshold {
                state.counters.record_current_symptomatic(day);
                if hosts.symptoms(host, id, day - 1) <= symptomaticity_threshold {
                    state.counters.record_new_symptomatic(day);
                }
            }
            if hosts.infectivity(host, id, day) > infectivity_threshold {
                state.infectious.push(host);
            }
        }
        if !state.infectious.is_empty() {
            state.first_infectious_day.get_or_insert(day);
            state.last_infectious_day = Some(day);
        }
    }

    #[must_use]
    pub fn counters(&self, disease: DiseaseId) -> &InfectionCounters {
        self.diseases
            .get(disease.0)
            .map_or(&NO_COUNTS, |state| &state.counters)
    }

    pub fn counters_mut(&mut self, disease: DiseaseId) -> &mut InfectionCounters {
        &mut state_mut(&mut self.diseases, disease).counters
    }

    #[must_use]
    pub fn first_infectious_day(&self, disease: DiseaseId) -> Option<Day> {
        self.diseases
            .get(disease.0)
            .and_then(|state| state.first_infectious_day)
    }

    #[must_use]
    pub fn last_infectious_day(&self, disease: DiseaseId) -> Option<Day> {
        self.diseases
            .get(disease.0)
            .and_then(|state| state.last_infectious_day)
    }

    /// Calibrated contacts per day for `disease` in this kind of venue, zero if the disease
    /// has no contacts here.
    #[must_use]
    pub fn contacts_per_day(&self, disease: &Disease) -> f64 {
        disease
            .contact_params(self.kind)
            .map_or(0.0, ContactParams::contacts_per_day)
    }

    /// `contacts_per_day * transmissibility`, times the contact seasonality and, for
    /// neighborhoods on weekends, the weekend multiplier.
    #[must_use]
    pub fn contact_rate(&self, day: Day, disease: &Disease, calendar: &Calendar) -> f64 {
        let Some(params) = disease.contact_params(self.kind) else {
            return 0.0;
        };
        let mut rate = params.contacts_per_day() * disease.transmissibility();
        rate *= disease.contact_seasonality(calendar.day_of_year(day));
        if self.kind == VenueKind::Neighborhood && calendar.is_weekend(day) {
            if let Some(weekend) = params.weekend_contact_rate() {
                rate *= weekend;
            }
        }
        rate
    }

    /// Number of contacts `infector` makes today: `rate * infectivity`, randomly rounded.
    pub fn contact_count<P, R>(
        &self,
        hosts: &P,
        infector: HostId,
        disease: DiseaseId,
        day: Day,
        rate: f64,
        rng: &mut R,
    ) -> usize
    where
        P: HostPopulation + ?Sized,
        R: Rng + ?Sized,
    {
        randomized_round(rng, rate * hosts.infectivity(infector, disease, day))
    }

    /// Per-contact transmission probability between `infector` and `infectee`, from the
    /// disease's pair model for this kind of venue.
    #[must_use]
    pub fn transmission_probability<P: HostPopulation + ?Sized>(
        &self,
        disease: &Disease,
        hosts: &P,
        infector: HostId,
        infectee: HostId,
    ) -> f64 {
        disease.contact_params(self.kind).map_or(0.0, |params| {
            params
                .pair_probability()
                .probability(hosts.real_age(infector), hosts.real_age(infectee))
        })
    }

    #[must_use]
    pub fn vectors(&self) -> Option<&VectorPopulation> {
        self.vectors.as_ref()
    }

    pub fn vectors_mut(&mut self) -> Option<&mut VectorPopulation> {
        self.vectors.as_mut()
    }

    pub fn set_vectors(&mut self, vectors: VectorPopulation) {
        self.vectors = Some(vectors);
    }
}
