//! The configuration surface. Everything is read once from JSON with serde, validated, and then
//! turned into runtime objects by [`crate::disease::Disease::from_config`]. Any problem found
//! here is an [`EpiError::ConfigError`] raised before the first simulated day; nothing in this
//! module is consulted while a simulation runs.
//!
//! Distribution selectors are serde-tagged enums, so an unrecognized `"type"` string fails at
//! load time like any other malformed input.

use std::fs;
use std::path::Path;

use log::info;
use serde::Deserialize;

use crate::age_map::AgeMap;
use crate::calendar::Calendar;
use crate::error::EpiError;
use crate::hashing::HashSet;
use crate::numeric::ProbabilityPolicy;
use crate::venue::VenueKind;

/// Top-level configuration of a run.
#[derive(Clone, Debug, Deserialize)]
pub struct SimulationConfig {
    #[serde(default)]
    pub seed: u64,
    #[serde(flatten)]
    pub calendar: Calendar,
    #[serde(default)]
    pub probability_policy: ProbabilityPolicy,
    #[serde(default)]
    pub vector_layer: Option<VectorLayerConfig>,
    pub diseases: Vec<DiseaseConfig>,
}

impl SimulationConfig {
    pub fn from_json_str(json: &str) -> Result<Self, EpiError> {
        let config: SimulationConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks cross-field constraints that serde cannot express. Per-disease numeric checks
    /// happen when the runtime objects are built.
    pub fn validate(&self) -> Result<(), EpiError> {
        self.calendar.validate()?;
        if self.diseases.is_empty() {
            return Err(EpiError::config("at least one disease is required"));
        }
        let mut names = HashSet::default();
        for disease in &self.diseases {
            if !names.insert(disease.name.as_str()) {
                return Err(EpiError::config(format!(
                    "disease {} is defined twice",
                    disease.name
                )));
            }
            let is_vector = matches!(disease.transmission, TransmissionConfig::Vector);
            if is_vector && self.vector_layer.is_none() {
                return Err(EpiError::config(format!(
                    "disease {} uses vector transmission but no vector_layer is configured",
                    disease.name
                )));
            }
        }
        if let Some(vector_layer) = &self.vector_layer {
            vector_layer.validate()?;
        }
        Ok(())
    }
}

/// Reads and validates a configuration file.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<SimulationConfig, EpiError> {
    let path = path.as_ref();
    let json = fs::read_to_string(path)?;
    let config = SimulationConfig::from_json_str(&json)?;
    info!(
        "loaded configuration from {} ({} diseases)",
        path.display(),
        config.diseases.len()
    );
    Ok(config)
}

#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DiseaseConfig {
    pub name: String,
    pub transmissibility: f64,
    pub natural_history: NaturalHistoryConfig,
    #[serde(default)]
    pub transmission: TransmissionConfig,
    #[serde(default)]
    pub venue_contacts: Vec<VenueContactConfig>,
    /// Cosine seasonality applied to each transmission attempt.
    #[serde(default)]
    pub transmission_seasonality: Option<SeasonalityConfig>,
    /// Cosine seasonality applied to venue contact rates.
    #[serde(default)]
    pub contact_seasonality: Option<SeasonalityConfig>,
    #[serde(default)]
    pub hygiene: HygieneConfig,
    #[serde(default)]
    pub income_susceptibility: Option<IncomeSusceptibilityConfig>,
}

/// The natural history model family. Only the SEIR(S) model is available.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NaturalHistoryKind {
    #[default]
    Basic,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NaturalHistoryConfig {
    #[serde(default)]
    pub model: NaturalHistoryKind,
    pub probability_of_symptoms: f64,
    /// Overrides `probability_of_symptoms` when present.
    #[serde(default)]
    pub age_specific_probability_of_symptoms: Option<AgeMap>,
    #[serde(default = "one")]
    pub asymptomatic_infectivity: f64,
    pub symptoms: SymptomsConfig,
    /// May only be omitted for diseases with zero transmissibility.
    #[serde(default)]
    pub infectious: Option<InfectiousConfig>,
    #[serde(default)]
    pub full_symptoms_start: f64,
    #[serde(default = "one")]
    pub full_symptoms_end: f64,
    #[serde(default)]
    pub full_infectivity_start: f64,
    #[serde(default = "one")]
    pub full_infectivity_end: f64,
    /// Rate of the exponential immunity duration. Zero means permanent immunity.
    #[serde(default)]
    pub immunity_loss_rate: f64,
    /// Absent means every infection produces immunity.
    #[serde(default)]
    pub age_specific_probability_of_infection_immunity: Option<AgeMap>,
    #[serde(default)]
    pub infectivity_threshold: f64,
    #[serde(default)]
    pub symptomaticity_threshold: f64,
    #[serde(default)]
    pub case_fatality: Option<CaseFatalityConfig>,
}

fn one() -> f64 {
    1.0
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SymptomsConfig {
    #[serde(rename = "lognormal")]
    LogNormal {
        incubation_period_median: f64,
        incubation_period_dispersion: f64,
        #[serde(default)]
        incubation_period_upper_bound: Option<f64>,
        symptoms_duration_median: f64,
        symptoms_duration_dispersion: f64,
        #[serde(default)]
        symptoms_duration_upper_bound: Option<f64>,
    },
    Cdf {
        days_incubating: DayCdfConfig,
        days_symptomatic: DayCdfConfig,
    },
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InfectiousConfig {
    /// Both ends of the infectious window are offsets from symptom onset.
    OffsetFromStartOfSymptoms { start_offset: f64, end_offset: f64 },
    /// Start is offset from symptom onset, end is offset from the end of symptoms.
    OffsetFromSymptoms { start_offset: f64, end_offset: f64 },
    #[serde(rename = "lognormal")]
    LogNormal {
        latent_period_median: f64,
        latent_period_dispersion: f64,
        #[serde(default)]
        latent_period_upper_bound: Option<f64>,
        infectious_duration_median: f64,
        infectious_duration_dispersion: f64,
        #[serde(default)]
        infectious_duration_upper_bound: Option<f64>,
    },
    Cdf {
        days_latent: DayCdfConfig,
        days_infectious: DayCdfConfig,
    },
}

/// A cumulative distribution over whole days. The plain list form starts at day 0; the
/// object form shifts the first entry to `first_day`, which may be negative (a negative latent
/// period means the host never becomes infectious).
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum DayCdfConfig {
    Days(Vec<f64>),
    Offset { first_day: i32, cumulative: Vec<f64> },
}

#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CaseFatalityConfig {
    /// Symptom level below which no death can occur.
    #[serde(default)]
    pub min_symptoms: f64,
    pub age_specific_probability: AgeMap,
    /// Indexed by days since symptom onset.
    pub probability_by_day: Vec<f64>,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(tag = "model", rename_all = "snake_case")]
pub enum TransmissionConfig {
    Contact {
        /// Opts neighborhoods into the density-dependent model.
        #[serde(default)]
        density: Option<DensityConfig>,
    },
    Vector,
}

impl Default for TransmissionConfig {
    fn default() -> Self {
        TransmissionConfig::Contact { density: None }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DensityConfig {
    /// Maximum number of people one infector may infect per venue per day.
    #[serde(default)]
    pub max_infectees: Option<usize>,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct VenueContactConfig {
    pub kind: VenueKind,
    pub contacts_per_day: f64,
    #[serde(default)]
    pub pair_probability: PairProbabilityConfig,
    /// Multiplier on the contact rate on Saturdays and Sundays. Neighborhoods only.
    #[serde(default)]
    pub weekend_contact_rate: Option<f64>,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PairProbabilityConfig {
    Uniform {
        #[serde(default = "one")]
        probability: f64,
    },
    /// `table[infector_group][infectee_group]`, group 0 is children (younger than
    /// `adult_age`), group 1 adults.
    AgeGroups { adult_age: f64, table: [[f64; 2]; 2] },
    /// `exp(-bias * |age difference|)`.
    SameAgeBias { bias: f64 },
}

impl Default for PairProbabilityConfig {
    fn default() -> Self {
        PairProbabilityConfig::Uniform { probability: 1.0 }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SeasonalityConfig {
    /// Fractional reduction at the trough, in [0, 1].
    pub reduction: f64,
    /// Day of year with the full multiplier.
    pub peak_day: u16,
}

/// Efficacies of hygiene behaviors for one disease. A host's modifier is `1 - efficacy` for the
/// behavior they practice.
#[derive(Copy, Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HygieneConfig {
    #[serde(default)]
    pub face_mask_transmission_efficacy: f64,
    #[serde(default)]
    pub hand_washing_transmission_efficacy: f64,
    #[serde(default)]
    pub face_mask_and_hand_washing_transmission_efficacy: f64,
    #[serde(default)]
    pub hand_washing_susceptibility_efficacy: f64,
}

/// Linear susceptibility modifier by household income: 1.0 at `min_income`, falling to
/// `floor_modifier` at `high_income` and above.
#[derive(Copy, Clone, Debug, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct IncomeSusceptibilityConfig {
    pub min_income: f64,
    pub high_income: f64,
    pub floor_modifier: f64,
}

/// Biological constants of the vector layer. Rates are per day.
#[derive(Copy, Clone, Debug, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct VectorLayerConfig {
    #[serde(default = "default_vector_death_rate")]
    pub death_rate: f64,
    #[serde(default = "default_vector_birth_rate")]
    pub birth_rate: f64,
    #[serde(default = "default_bite_rate")]
    pub bite_rate: f64,
    #[serde(default = "default_incubation_rate")]
    pub incubation_rate: f64,
    /// Probability a susceptible vector is infected by one bite on an infectious host.
    pub infection_efficiency: f64,
    /// Probability a susceptible host is infected by one bite of an infectious vector.
    pub transmission_efficiency: f64,
    /// Initial vectors per host in every venue that carries vectors.
    pub vectors_per_host: f64,
}

fn default_vector_death_rate() -> f64 {
    1.0 / 18.0
}

fn default_vector_birth_rate() -> f64 {
    1.0 / 18.0
}

fn default_bite_rate() -> f64 {
    0.76
}

fn default_incubation_rate() -> f64 {
    1.0 / 11.0
}

impl VectorLayerConfig {
    pub fn validate(&self) -> Result<(), EpiError> {
        let probabilities = [
            ("death_rate", self.death_rate),
            ("birth_rate", self.birth_rate),
            ("incubation_rate", self.incubation_rate),
            ("infection_efficiency", self.infection_efficiency),
            ("transmission_efficiency", self.transmission_efficiency),
        ];
        for (name, value) in probabilities {
            if !(0.0..=1.0).contains(&value) {
                return Err(EpiError::config(format!(
                    "vector_layer.{name} must be in [0, 1], got {value}"
                )));
            }
        }
        if !(self.bite_rate >= 0.0 && self.vectors_per_host >= 0.0) {
            return Err(EpiError::config(
                "vector_layer.bite_rate and vectors_per_host must be non-negative",
            ));
        }
        Ok(())
    }
}
