use crate::config::{PairProbabilityConfig, VenueContactConfig};
use crate::error::EpiError;
use crate::venue::VenueKind;

/// Probability that a contact between two people of the given ages transmits, relative to the
/// venue's contact rate.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum PairProbability {
    Uniform(f64),
    /// `table[infector_group][infectee_group]` with group 0 for ages below `adult_age`.
    AgeGroups { adult_age: f64, table: [[f64; 2]; 2] },
    /// `exp(-bias * |age difference|)`.
    SameAgeBias(f64),
}

impl PairProbability {
    #[must_use]
    pub fn probability(&self, infector_age: f64, infectee_age: f64) -> f64 {
        match *self {
            PairProbability::Uniform(p) => p,
            PairProbability::AgeGroups { adult_age, table } => {
                let group = |age: f64| usize::from(age >= adult_age);
                table[group(infector_age)][group(infectee_age)]
            }
            PairProbability::SameAgeBias(bias) => (-bias * (infector_age - infectee_age).abs()).exp(),
        }
    }
}

/// Contact parameters of one disease in one kind of venue.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ContactParams {
    contacts_per_day: f64,
    pair_probability: PairProbability,
    weekend_contact_rate: Option<f64>,
}

impl ContactParams {
    /// Validates the configured values. An age-group table is normalized so its largest entry
    /// is 1.0, with `contacts_per_day` scaled up by the same factor; a household's same-age
    /// bias is halved.
    pub fn from_config(config: &VenueContactConfig, name: &str) -> Result<Self, EpiError> {
        let kind = config.kind;
        let err = |what: &str| EpiError::config(format!("{name}: {kind:?} contacts: {what}"));

        let mut contacts_per_day = config.contacts_per_day;
        if !contacts_per_day.is_finite() || contacts_per_day < 0.0 {
            return Err(err("contacts_per_day must be a non-negative number"));
        }
        if let Some(rate) = config.weekend_contact_rate {
            if kind != VenueKind::Neighborhood {
                return Err(err("weekend_contact_rate only applies to neighborhoods"));
            }
            if !rate.is_finite() || rate < 0.0 {
                return Err(err("weekend_contact_rate must be non-negative"));
            }
        }

        let pair_probability = match config.pair_probability {
            PairProbabilityConfig::Uniform { probability } => {
                if !(0.0..=1.0).contains(&probability) {
                    return Err(err("pair probability must be in [0, 1]"));
                }
                PairProbability::Uniform(probability)
            }
            PairProbabilityConfig::AgeGroups {
                adult_age,
                mut table,
            } => {
                let entries = table.iter().flatten();
                if entries.clone().any(|p| !p.is_finite() || *p < 0.0) {
                    return Err(err("age group probabilities must be non-negative"));
                }
                if !adult_age.is_finite() || adult_age < 0.0 {
                    return Err(err("adult_age must be non-negative"));
                }
                let max = entries.copied().fold(0.0, f64::max);
                if max > 0.0 {
                    for p in table.iter_mut().flatten() {
                        *p /= max;
                    }
                    contacts_per_day *= max;
                }
                PairProbability::AgeGroups { adult_age, table }
            }
            PairProbabilityConfig::SameAgeBias { bias } => {
                if !bias.is_finite() || bias < 0.0 {
                    return Err(err("same age bias must be non-negative"));
                }
                let bias = if kind == VenueKind::Household {
                    0.5 * bias
                } else {
                    bias
                };
                PairProbability::SameAgeBias(bias)
            }
        };

        Ok(ContactParams {
            contacts_per_day,
            pair_probability,
            weekend_contact_rate: config.weekend_contact_rate,
        })
    }

    #[must_use]
    pub fn contacts_per_day(&self) -> f64 {
        self.contacts_per_day
    }

    #[must_use]
    pub fn pair_probability(&self) -> PairProbability {
        self.pair_probability
    }

    #[must_use]
    pub fn weekend_contact_rate(&self) -> Option<f64> {
        self.weekend_contact_rate
    }
}
