//! An in-memory [`HostPopulation`]: people with an age, a household, behavior and per-disease
//! health, enough to drive the transmission core end to end.

use log::debug;
use rand::Rng;

use crate::calendar::Day;
use crate::disease::{Disease, DiseaseId};
use crate::hashing::HashSet;
use crate::host::{HostId, HostPopulation};
use crate::hygiene::HygieneBehavior;
use crate::infection::Infection;
use crate::venue::VenueId;

#[derive(Clone, Debug, PartialEq)]
pub struct Person {
    pub age: f64,
    pub household: Option<VenueId>,
    pub household_income: Option<f64>,
    pub hygiene: HygieneBehavior,
    /// Product of chronic-condition and pregnancy multipliers on case fatality.
    pub case_fatality_multiplier: f64,
}

impl Person {
    #[must_use]
    pub fn new(age: f64) -> Self {
        Person {
            age,
            household: None,
            household_income: None,
            hygiene: HygieneBehavior::default(),
            case_fatality_multiplier: 1.0,
        }
    }
}

#[derive(Clone, Debug)]
struct Health {
    susceptible: bool,
    /// Strain exclusion, lifted at the end of the day.
    excluded: bool,
    susceptibility: f64,
    infection: Option<Infection>,
    immune_until: Option<Day>,
}

impl Default for Health {
    fn default() -> Self {
        Health {
            susceptible: true,
            excluded: false,
            susceptibility: 1.0,
            infection: None,
            immune_until: None,
        }
    }
}

/// What happened during one call to [`Population::update_health`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct HealthUpdate {
    pub fatalities: Vec<(HostId, DiseaseId)>,
    pub recoveries: usize,
    pub immunity_lost: usize,
}

#[derive(Clone, Debug)]
pub struct Population {
    disease_count: usize,
    people: Vec<Person>,
    health: Vec<Vec<Health>>,
    dead: Vec<bool>,
    absences: HashSet<(HostId, VenueId)>,
}

impl Population {
    #[must_use]
    pub fn new(disease_count: usize) -> Self {
        Population {
            disease_count,
            people: Vec::new(),
            health: Vec::new(),
            dead: Vec::new(),
            absences: HashSet::default(),
        }
    }

    pub fn add_person(&mut self, person: Person) -> HostId {
        let id = HostId(self.people.len());
        self.people.push(person);
        self.health.push(vec![Health::default(); self.disease_count]);
        self.dead.push(false);
        id
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.people.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.people.is_empty()
    }

    #[must_use]
    pub fn disease_count(&self) -> usize {
        self.disease_count
    }

    #[must_use]
    pub fn person(&self, host: HostId) -> &Person {
        &self.people[host.0]
    }

    #[must_use]
    pub fn is_alive(&self, host: HostId) -> bool {
        !self.dead[host.0]
    }

    /// Marks `host` as absent from (or back at) `venue`.
    pub fn set_absent(&mut self, host: HostId, venue: VenueId, absent: bool) {
        if absent {
            self.absences.insert((host, venue));
        } else {
            self.absences.remove(&(host, venue));
        }
    }

    pub fn set_susceptibility(&mut self, host: HostId, disease: DiseaseId, susceptibility: f64) {
        self.health[host.0][disease.0].susceptibility = susceptibility;
    }

    #[must_use]
    pub fn infection(&self, host: HostId, disease: DiseaseId) -> Option<&Infection> {
        self.health[host.0][disease.0].infection.as_ref()
    }

    /// Hosts currently infected with `disease`.
    pub fn infected(&self, disease: DiseaseId) -> impl Iterator<Item = HostId> + '_ {
        self.health
            .iter()
            .enumerate()
            .filter(move |(_, health)| health[disease.0].infection.is_some())
            .map(|(i, _)| HostId(i))
    }

    /// End-of-day health update. Polls every active infection for case fatality, clears
    /// recovered infections (restoring susceptibility when the infection left no immunity),
    /// ends expired immunity and lifts the day's strain exclusions.
    pub fn update_health<R: Rng + ?Sized>(
        &mut self,
        day: Day,
        diseases: &[Disease],
        rng: &mut R,
    ) -> HealthUpdate {
        let mut update = HealthUpdate::default();
        for (i, person) in self.people.iter().enumerate() {
            if self.dead[i] {
                continue;
            }
            let host = HostId(i);
            for disease in diseases {
                let health = &mut self.health[i][disease.id().0];
                health.excluded = false;
                if let Some(infection) = health.infection.as_mut() {
                    infection.update(
                        disease.natural_history(),
                        day,
                        person.age,
                        person.case_fatality_multiplier,
                        rng,
                    );
                    if infection.is_fatal() {
                        self.dead[i] = true;
                        update.fatalities.push((host, disease.id()));
                        break;
                    }
                    if infection.is_recovered(day) {
                        if infection.produces_immunity() {
                            health.immune_until = infection.immunity_end();
                        } else {
                            health.susceptible = true;
                        }
                        health.infection = None;
                        update.recoveries += 1;
                    }
                }
                if health.infection.is_none() && !health.susceptible {
                    if let Some(end) = health.immune_until {
                        if day >= end {
                            health.susceptible = true;
                            health.immune_until = None;
                            update.immunity_lost += 1;
                        }
                    }
                }
            }
        }
        debug!(
            "day {day}: {} case fatalities, {} recoveries, {} lost immunity",
            update.fatalities.len(),
            update.recoveries,
            update.immunity_lost
        );
        update
    }
}

impl HostPopulation for Population {
    fn real_age(&self, host: HostId) -> f64 {
        self.people[host.0].age
    }

    fn is_susceptible(&self, host: HostId, disease: DiseaseId) -> bool {
        let health = &self.health[host.0][disease.0];
        !self.dead[host.0] && health.susceptible && !health.excluded
    }

    fn is_infected(&self, host: HostId, disease: DiseaseId) -> bool {
        self.health[host.0][disease.0].infection.is_some()
    }

    fn infectivity(&self, host: HostId, disease: DiseaseId, day: Day) -> f64 {
        if self.dead[host.0] {
            return 0.0;
        }
        self.infection(host, disease)
            .map_or(0.0, |infection| infection.get_infectivity(day))
    }

    fn symptoms(&self, host: HostId, disease: DiseaseId, day: Day) -> f64 {
        self.infection(host, disease)
            .map_or(0.0, |infection| infection.get_symptoms(day))
    }

    fn is_present(&self, host: HostId, venue: VenueId, _day: Day) -> bool {
        !self.dead[host.0] && !self.absences.contains(&(host, venue))
    }

    fn susceptibility(&self, host: HostId, disease: DiseaseId) -> f64 {
        self.health[host.0][disease.0].susceptibility
    }

    fn hygiene_behavior(&self, host: HostId) -> HygieneBehavior {
        self.people[host.0].hygiene
    }

    fn household_income(&self, host: HostId) -> Option<f64> {
        self.people[host.0].household_income
    }

    fn case_fatality_multiplier(&self, host: HostId, _disease: DiseaseId) -> f64 {
        self.people[host.0].case_fatality_multiplier
    }

    fn infect(&mut self, infection: Infection) {
        let host = infection.host();
        let health = &mut self.health[host.0][infection.disease().0];
        debug_assert!(
            health.infection.is_none(),
            "{host:?} is already infected with {:?}",
            infection.disease()
        );
        health.susceptible = false;
        health.immune_until = None;
        health.infection = Some(infection);
    }

    fn become_unsusceptible(&mut self, host: HostId, disease: DiseaseId) {
        self.health[host.0][disease.0].excluded = true;
    }
}
