//! The boundary between the transmission core and whatever keeps track of people.
//!
//! The core only ever talks to hosts through [`HostPopulation`]. It reads ages, susceptibility,
//! infectivity and behavior, and it calls [`HostPopulation::infect`] to hand over a freshly
//! scheduled [`Infection`]. Everything else about a person's life belongs to the implementor.

use crate::calendar::Day;
use crate::disease::{Disease, DiseaseId};
use crate::hygiene::HygieneBehavior;
use crate::infection::Infection;
use crate::venue::VenueId;

#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct HostId(pub usize);

pub trait HostPopulation {
    fn real_age(&self, host: HostId) -> f64;

    /// Age in whole years.
    fn age(&self, host: HostId) -> u32 {
        self.real_age(host).max(0.0).floor() as u32
    }

    fn is_susceptible(&self, host: HostId, disease: DiseaseId) -> bool;

    /// Whether `host` carries an unresolved infection of `disease`.
    fn is_infected(&self, host: HostId, disease: DiseaseId) -> bool;

    /// Infectivity of `host` for `disease` on `day`, zero when not infected.
    fn infectivity(&self, host: HostId, disease: DiseaseId, day: Day) -> f64;

    /// Symptom level of `host` for `disease` on `day`, zero when not infected.
    fn symptoms(&self, _host: HostId, _disease: DiseaseId, _day: Day) -> f64 {
        0.0
    }

    /// Whether `host` is at `venue` on `day`. Everyone enrolled is present unless the
    /// implementor tracks absences.
    fn is_present(&self, _host: HostId, _venue: VenueId, _day: Day) -> bool {
        true
    }

    /// Biological susceptibility of `host` to `disease`, before behavior modifiers.
    fn susceptibility(&self, _host: HostId, _disease: DiseaseId) -> f64 {
        1.0
    }

    fn hygiene_behavior(&self, _host: HostId) -> HygieneBehavior {
        HygieneBehavior::default()
    }

    /// Multiplier on the probability that `host` transmits `disease`.
    fn hygiene_transmission_modifier(&self, host: HostId, disease: &Disease) -> f64 {
        disease
            .hygiene()
            .transmission_modifier(self.hygiene_behavior(host))
    }

    /// Multiplier on the probability that `host` acquires `disease`.
    fn hygiene_susceptibility_modifier(&self, host: HostId, disease: &Disease) -> f64 {
        disease
            .hygiene()
            .susceptibility_modifier(self.hygiene_behavior(host))
    }

    fn household_income(&self, _host: HostId) -> Option<f64> {
        None
    }

    /// Income-based susceptibility multiplier, 1.0 unless both the disease and the host's
    /// household provide the inputs.
    fn household_income_susceptibility_modifier(&self, host: HostId, disease: &Disease) -> f64 {
        match (disease.income_modifier(), self.household_income(host)) {
            (Some(modifier), Some(income)) => modifier.modifier(income),
            _ => 1.0,
        }
    }

    /// Product of chronic-condition and pregnancy multipliers on case fatality.
    fn case_fatality_multiplier(&self, _host: HostId, _disease: DiseaseId) -> f64 {
        1.0
    }

    /// Registers a scheduled infection on its host. The host stops being susceptible to the
    /// infection's disease.
    fn infect(&mut self, infection: Infection);

    /// Removes susceptibility to `disease` without an infection (strain exclusion).
    fn become_unsusceptible(&mut self, host: HostId, disease: DiseaseId);
}
