//! The daily driver. A [`Simulation`] owns every disease, venue and host and advances them one
//! day at a time:
//!
//! 1. vector births, deaths and incubation at every venue that keeps vectors,
//! 2. rebuild each venue's infectious list for every disease,
//! 3. spread every disease at every venue, with diseases taken in a random order,
//! 4. update the health of every host (case fatality, recovery, immunity).
//!
//! Every random draw comes from a stream keyed by day (and venue and disease where relevant), so
//! two simulations with the same seed and inputs produce identical epidemics.

use log::{debug, info};
use rand::seq::SliceRandom;

use crate::calendar::{Calendar, Day};
use crate::config::{SimulationConfig, VectorLayerConfig};
use crate::define_rng;
use crate::disease::{Disease, DiseaseId};
use crate::epidemic::Epidemic;
use crate::error::EpiError;
use crate::host::{HostId, HostPopulation};
use crate::infection::Infection;
use crate::population::Population;
use crate::random::RandomStreams;
use crate::transmission::TransmissionContext;
use crate::venue::{VectorPopulation, Venue, VenueId, VenueKind};

define_rng!(DiseaseOrderRng);
define_rng!(TransmissionRng);
define_rng!(VectorDynamicsRng);
define_rng!(HealthRng);
define_rng!(SeedInfectionRng);

pub struct Simulation {
    calendar: Calendar,
    streams: RandomStreams,
    vector_layer: Option<VectorLayerConfig>,
    diseases: Vec<Disease>,
    epidemics: Vec<Epidemic>,
    venues: Vec<Venue>,
    population: Population,
    last_day: Option<Day>,
}

impl Simulation {
    /// Builds every disease from `config` and takes ownership of the hosts and venues.
    ///
    /// Venue ids must equal their index in `venues`, every member and household must exist, and
    /// `population` must track exactly the configured diseases. When any disease is vector-borne,
    /// every venue except neighborhoods receives `round(original size * vectors_per_host)`
    /// susceptible vectors.
    pub fn from_config(
        config: &SimulationConfig,
        population: Population,
        mut venues: Vec<Venue>,
    ) -> Result<Self, EpiError> {
        config.validate()?;
        let diseases = config
            .diseases
            .iter()
            .enumerate()
            .map(|(i, disease)| {
                Disease::from_config(
                    DiseaseId(i),
                    disease,
                    config.vector_layer.as_ref(),
                    config.probability_policy,
                )
            })
            .collect::<Result<Vec<_>, _>>()?;

        if population.disease_count() != diseases.len() {
            return Err(EpiError::config(format!(
                "population tracks {} diseases but {} are configured",
                population.disease_count(),
                diseases.len()
            )));
        }
        for (i, venue) in venues.iter().enumerate() {
            if venue.id() != VenueId(i) {
                return Err(EpiError::config(format!(
                    "venue at index {i} has id {:?}",
                    venue.id()
                )));
            }
            if let Some(member) = venue.members().iter().find(|m| m.0 >= population.len()) {
                return Err(EpiError::config(format!(
                    "{:?} lists unknown member {member:?}",
                    venue.id()
                )));
            }
        }
        for i in 0..population.len() {
            if let Some(household) = population.person(HostId(i)).household {
                if household.0 >= venues.len() {
                    return Err(EpiError::config(format!(
                        "host {i} lives in unknown venue {household:?}"
                    )));
                }
            }
        }

        let vector_diseases: Vec<DiseaseId> = diseases
            .iter()
            .filter(|disease| disease.is_vector_borne())
            .map(Disease::id)
            .collect();
        let vector_layer = if vector_diseases.is_empty() {
            None
        } else {
            config.vector_layer
        };
        if let Some(layer) = &vector_layer {
            for venue in venues
                .iter_mut()
                .filter(|venue| venue.kind() != VenueKind::Neighborhood)
            {
                let count = (venue.original_size() as f64 * layer.vectors_per_host).round();
                venue.set_vectors(VectorPopulation::new(
                    count as usize,
                    vector_diseases.clone(),
                ));
            }
        }

        info!(
            "simulation with {} diseases, {} venues and {} hosts (seed {})",
            diseases.len(),
            venues.len(),
            population.len(),
            config.seed
        );
        Ok(Simulation {
            calendar: config.calendar,
            streams: RandomStreams::new(config.seed),
            vector_layer,
            epidemics: diseases.iter().map(|d| Epidemic::new(d.id())).collect(),
            diseases,
            venues,
            population,
            last_day: None,
        })
    }

    #[must_use]
    pub fn calendar(&self) -> &Calendar {
        &self.calendar
    }

    #[must_use]
    pub fn diseases(&self) -> &[Disease] {
        &self.diseases
    }

    #[must_use]
    pub fn disease(&self, id: DiseaseId) -> &Disease {
        &self.diseases[id.0]
    }

    #[must_use]
    pub fn disease_by_name(&self, name: &str) -> Option<&Disease> {
        self.diseases.iter().find(|disease| disease.name() == name)
    }

    #[must_use]
    pub fn epidemic(&self, id: DiseaseId) -> &Epidemic {
        &self.epidemics[id.0]
    }

    #[must_use]
    pub fn venues(&self) -> &[Venue] {
        &self.venues
    }

    #[must_use]
    pub fn venue(&self, id: VenueId) -> &Venue {
        &self.venues[id.0]
    }

    /// For closures, enrollment changes and vector seeding between days.
    pub fn venue_mut(&mut self, id: VenueId) -> &mut Venue {
        &mut self.venues[id.0]
    }

    #[must_use]
    pub fn population(&self) -> &Population {
        &self.population
    }

    pub fn population_mut(&mut self) -> &mut Population {
        &mut self.population
    }

    /// The last day [`Simulation::step`] completed.
    #[must_use]
    pub fn current_day(&self) -> Option<Day> {
        self.last_day
    }

    /// Infects `host` with `disease` from outside the population, exposed on `day`.
    pub fn seed_infection(
        &mut self,
        host: HostId,
        disease: DiseaseId,
        day: Day,
    ) -> Result<(), EpiError> {
        if host.0 >= self.population.len() || disease.0 >= self.diseases.len() {
            return Err(format!("cannot seed {disease:?} in unknown {host:?}").into());
        }
        if !self.population.is_susceptible(host, disease) {
            return Err(format!("{host:?} is not susceptible to {disease:?}").into());
        }
        let mut rng = self.streams.get_rng(
            SeedInfectionRng,
            &[u64::from(day.cast_unsigned()), disease.0 as u64, host.0 as u64],
        );
        let mut infection = Infection::new(disease, host, None, None, day);
        infection.setup(
            self.diseases[disease.0].natural_history(),
            self.population.real_age(host),
            &mut rng,
        );
        self.population.infect(infection);
        self.epidemics[disease.0].become_exposed(host, day);
        debug!("day {day}: seeded {disease:?} in {host:?}");
        Ok(())
    }

    /// Adds infectious vectors of `disease` at `venue`, converting susceptible ones. Returns how
    /// many were converted; zero when the venue keeps no vectors.
    pub fn seed_vectors(&mut self, venue: VenueId, disease: DiseaseId, count: usize) -> usize {
        self.venues[venue.0]
            .vectors_mut()
            .map_or(0, |vectors| vectors.seed_infectious(disease, count))
    }

    /// Simulates `day`. Days must be stepped in increasing order.
    pub fn step(&mut self, day: Day) -> Result<(), EpiError> {
        if let Some(last) = self.last_day {
            if day <= last {
                return Err(format!("day {day} was requested after day {last}").into());
            }
        }

        if let Some(layer) = &self.vector_layer {
            for venue in &mut self.venues {
                let id = venue.id();
                if let Some(vectors) = venue.vectors_mut() {
                    let mut rng = self.streams.place_rng(VectorDynamicsRng, day, id);
                    vectors.update(day, layer, &mut rng);
                }
            }
        }

        for disease in &self.diseases {
            for venue in &mut self.venues {
                venue.rebuild_infectious(disease, &self.population, day);
            }
        }

        let mut order: Vec<usize> = (0..self.diseases.len()).collect();
        order.shuffle(&mut self.streams.daily_rng(DiseaseOrderRng, day));
        for d in order {
            let disease = &self.diseases[d];
            let mut ctx = TransmissionContext {
                day,
                calendar: &self.calendar,
                hosts: &mut self.population,
                epidemic: &mut self.epidemics[d],
            };
            for venue in &mut self.venues {
                let mut rng = self
                    .streams
                    .venue_rng(TransmissionRng, day, disease.id(), venue.id());
                disease
                    .transmission()
                    .spread_infection(&mut ctx, disease, venue, &mut rng);
            }
        }

        let mut rng = self.streams.daily_rng(HealthRng, day);
        let update = self
            .population
            .update_health(day, &self.diseases, &mut rng);
        for &(host, disease) in &update.fatalities {
            self.epidemics[disease.0].record_case_fatality(day);
            if let Some(household) = self.population.person(host).household {
                self.venues[household.0]
                    .counters_mut(disease)
                    .record_case_fatality(day);
            }
        }

        for (disease, epidemic) in self.diseases.iter().zip(&self.epidemics) {
            debug!(
                "day {day}: {} exposed {} (total {}), case fatalities {}",
                disease.name(),
                epidemic.exposed(day),
                epidemic.total_exposed(),
                epidemic.case_fatalities(day)
            );
        }
        self.last_day = Some(day);
        Ok(())
    }

    /// Steps `days` consecutive days following the last completed one (or from day 0).
    pub fn run(&mut self, days: Day) -> Result<(), EpiError> {
        let start = self.last_day.map_or(0, |day| day + 1);
        info!("running days {start} to {}", start + days - 1);
        for day in start..start + days {
            self.step(day)?;
        }
        for (disease, epidemic) in self.diseases.iter().zip(&self.epidemics) {
            info!(
                "{}: {} exposed, {} case fatalities",
                disease.name(),
                epidemic.total_exposed(),
                epidemic.total_case_fatalities()
            );
        }
        Ok(())
    }
}
