//! Per-disease parameters assembled from configuration. A [`Disease`] is built once and only read
//! afterwards; every day of the simulation borrows it immutably.

use log::info;

use crate::config::{DiseaseConfig, VectorLayerConfig};
use crate::error::EpiError;
use crate::hashing::HashMap;
use crate::hygiene::{Hygiene, IncomeModifier};
use crate::natural_history::NaturalHistory;
use crate::numeric::ProbabilityPolicy;
use crate::seasonality::SeasonalityTable;
use crate::transmission::TransmissionModel;
use crate::venue::{ContactParams, VenueKind};

/// Index of a disease in the simulation, in configuration order.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DiseaseId(pub usize);

#[derive(Debug)]
pub struct Disease {
    id: DiseaseId,
    name: String,
    transmissibility: f64,
    natural_history: NaturalHistory,
    transmission: TransmissionModel,
    contacts: HashMap<VenueKind, ContactParams>,
    transmission_seasonality: Option<SeasonalityTable>,
    contact_seasonality: Option<SeasonalityTable>,
    hygiene: Hygiene,
    income_modifier: Option<IncomeModifier>,
    probability_policy: ProbabilityPolicy,
}

impl Disease {
    pub fn from_config(
        id: DiseaseId,
        config: &DiseaseConfig,
        vector_layer: Option<&VectorLayerConfig>,
        probability_policy: ProbabilityPolicy,
    ) -> Result<Self, EpiError> {
        let name = config.name.as_str();
        if !config.transmissibility.is_finite() || config.transmissibility < 0.0 {
            return Err(EpiError::config(format!(
                "{name}: transmissibility must be a non-negative number, got {}",
                config.transmissibility
            )));
        }

        let mut contacts = HashMap::default();
        for venue_contacts in &config.venue_contacts {
            let params = ContactParams::from_config(venue_contacts, name)?;
            if contacts.insert(venue_contacts.kind, params).is_some() {
                return Err(EpiError::config(format!(
                    "{name}: contacts for {:?} venues are defined twice",
                    venue_contacts.kind
                )));
            }
        }

        let disease = Disease {
            id,
            name: config.name.clone(),
            transmissibility: config.transmissibility,
            natural_history: NaturalHistory::from_config(
                &config.natural_history,
                config.transmissibility,
                name,
            )?,
            transmission: TransmissionModel::from_config(&config.transmission, vector_layer, name)?,
            contacts,
            transmission_seasonality: config
                .transmission_seasonality
                .as_ref()
                .map(|s| SeasonalityTable::from_config(s, name))
                .transpose()?,
            contact_seasonality: config
                .contact_seasonality
                .as_ref()
                .map(|s| SeasonalityTable::from_config(s, name))
                .transpose()?,
            hygiene: Hygiene::from_config(&config.hygiene, name)?,
            income_modifier: config
                .income_susceptibility
                .as_ref()
                .map(|c| IncomeModifier::from_config(c, name))
                .transpose()?,
            probability_policy,
        };
        info!(
            "disease {} ({:?}): transmissibility {}, {} transmission, contacts for {} venue kinds",
            disease.name,
            disease.id,
            disease.transmissibility,
            disease.transmission.kind(),
            disease.contacts.len()
        );
        Ok(disease)
    }

    #[must_use]
    pub fn id(&self) -> DiseaseId {
        self.id
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn transmissibility(&self) -> f64 {
        self.transmissibility
    }

    #[must_use]
    pub fn natural_history(&self) -> &NaturalHistory {
        &self.natural_history
    }

    #[must_use]
    pub fn transmission(&self) -> &TransmissionModel {
        &self.transmission
    }

    #[must_use]
    pub fn is_vector_borne(&self) -> bool {
        matches!(self.transmission, TransmissionModel::Vector(_))
    }

    /// Contact parameters for venues of `kind`, if the disease spreads there at all.
    #[must_use]
    pub fn contact_params(&self, kind: VenueKind) -> Option<&ContactParams> {
        self.contacts.get(&kind)
    }

    /// Multiplier applied to every transmission attempt on `day_of_year`.
    #[must_use]
    pub fn transmission_seasonality(&self, day_of_year: u16) -> f64 {
        self.transmission_seasonality
            .as_ref()
            .map_or(1.0, |table| table.multiplier(day_of_year))
    }

    /// Multiplier applied to venue contact rates on `day_of_year`.
    #[must_use]
    pub fn contact_seasonality(&self, day_of_year: u16) -> f64 {
        self.contact_seasonality
            .as_ref()
            .map_or(1.0, |table| table.multiplier(day_of_year))
    }

    #[must_use]
    pub fn hygiene(&self) -> &Hygiene {
        &self.hygiene
    }

    #[must_use]
    pub fn income_modifier(&self) -> Option<&IncomeModifier> {
        self.income_modifier.as_ref()
    }

    #[must_use]
    pub fn probability_policy(&self) -> ProbabilityPolicy {
        self.probability_policy
    }
}

#[cfg(test)]
pub(crate) mod test {
    use super::*;
    use crate::config::{
        HygieneConfig, PairProbabilityConfig, SeasonalityConfig, TransmissionConfig,
        VenueContactConfig,
    };
    use crate::natural_history::test::point_mass_config;

    /// A disease with point-mass natural history and one contact per day in every venue kind.
    pub(crate) fn disease_config(name: &str, transmissibility: f64) -> DiseaseConfig {
        let venue_contacts = [
            VenueKind::Household,
            VenueKind::School,
            VenueKind::Workplace,
            VenueKind::Neighborhood,
            VenueKind::Community,
            VenueKind::VectorHabitat,
        ]
        .into_iter()
        .map(|kind| VenueContactConfig {
            kind,
            contacts_per_day: 1.0,
            pair_probability: PairProbabilityConfig::default(),
            weekend_contact_rate: None,
        })
        .collect();
        DiseaseConfig {
            name: name.to_string(),
            transmissibility,
            natural_history: point_mass_config(),
            transmission: TransmissionConfig::default(),
            venue_contacts,
            transmission_seasonality: None,
            contact_seasonality: None,
            hygiene: HygieneConfig::default(),
            income_susceptibility: None,
        }
    }

    pub(crate) fn build(config: &DiseaseConfig) -> Disease {
        Disease::from_config(DiseaseId(0), config, None, ProbabilityPolicy::Strict).unwrap()
    }

    #[test]
    fn builds_from_config() {
        let disease = build(&disease_config("flu", 0.5));
        assert_eq!(disease.id(), DiseaseId(0));
        assert_eq!(disease.name(), "flu");
        assert_eq!(disease.transmissibility(), 0.5);
        assert!(!disease.is_vector_borne());
        assert!(disease.contact_params(VenueKind::School).is_some());
        assert!(disease.income_modifier().is_none());
        assert_eq!(disease.transmission_seasonality(100), 1.0);
        assert_eq!(disease.contact_seasonality(100), 1.0);
    }

    #[test]
    fn negative_transmissibility_is_rejected() {
        let config = disease_config("flu", -0.1);
        let result = Disease::from_config(DiseaseId(0), &config, None, ProbabilityPolicy::Warn);
        assert!(result.is_err());
    }

    #[test]
    fn duplicate_venue_contacts_are_rejected() {
        let mut config = disease_config("flu", 1.0);
        let first = config.venue_contacts[0].clone();
        config.venue_contacts.push(first);
        let result = Disease::from_config(DiseaseId(0), &config, None, ProbabilityPolicy::Warn);
        assert!(result.is_err());
    }

    #[test]
    fn missing_venue_kind_has_no_contacts() {
        let mut config = disease_config("flu", 1.0);
        config
            .venue_contacts
            .retain(|contacts| contacts.kind != VenueKind::School);
        let disease = build(&config);
        assert!(disease.contact_params(VenueKind::School).is_none());
    }

    #[test]
    fn seasonality_tables_are_consulted() {
        let mut config = disease_config("flu", 1.0);
        config.transmission_seasonality = Some(SeasonalityConfig {
            reduction: 0.5,
            peak_day: 10,
        });
        let disease = build(&config);
        assert_eq!(disease.transmission_seasonality(10), 1.0);
        assert!(disease.transmission_seasonality(190) < 0.6);
        assert_eq!(disease.contact_seasonality(190), 1.0);
    }

    #[test]
    fn vector_transmission_needs_vector_layer() {
        let mut config = disease_config("dengue", 1.0);
        config.transmission = TransmissionConfig::Vector;
        let result = Disease::from_config(DiseaseId(0), &config, None, ProbabilityPolicy::Warn);
        assert!(result.is_err());
    }
}
