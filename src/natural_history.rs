//! The per-disease natural history model: draws the schedule of a new infection and answers
//! case-fatality queries.
//!
//! Symptoms are scheduled either from log-normal incubation and duration distributions or from
//! empirical day-count CDFs. The infectious window is scheduled in one of four ways: as offsets
//! from symptom onset, as offsets from the symptom window, from log-normal latent period and
//! duration, or from empirical CDFs. The model is built once from configuration and is
//! read-only afterwards.

use log::info;
use rand::Rng;
use rand_distr::{Distribution, Exp, LogNormal};

use crate::age_map::AgeMap;
use crate::config::{
    CaseFatalityConfig, DayCdfConfig, InfectiousConfig, NaturalHistoryConfig, SymptomsConfig,
};
use crate::error::EpiError;
use crate::random::{bernoulli, draw_from_cdf};

/// Tolerance on the final entry of a CDF table.
const CDF_TOLERANCE: f64 = 1e-6;

/// A cumulative distribution over whole days, starting at `first_day`.
#[derive(Clone, Debug, PartialEq)]
pub struct DayCdf {
    first_day: i32,
    cumulative: Vec<f64>,
}

impl DayCdf {
    /// Validates a table: non-empty, every entry in [0, 1], non-decreasing, ending at 1. The
    /// last entry is then pinned to exactly 1.0 so that every draw lands inside the table.
    pub fn from_config(config: &DayCdfConfig, name: &str) -> Result<Self, EpiError> {
        let (first_day, cumulative) = match config {
            DayCdfConfig::Days(cumulative) => (0, cumulative.clone()),
            DayCdfConfig::Offset {
                first_day,
                cumulative,
            } => (*first_day, cumulative.clone()),
        };
        let Some(&last) = cumulative.last() else {
            return Err(EpiError::config(format!("{name}: CDF table is empty")));
        };
        if cumulative.iter().any(|p| !(0.0..=1.0).contains(p)) {
            return Err(EpiError::config(format!(
                "{name}: CDF entries must be in [0, 1]"
            )));
        }
        if cumulative.windows(2).any(|pair| pair[1] < pair[0]) {
            return Err(EpiError::config(format!("{name}: CDF must be non-decreasing")));
        }
        if (last - 1.0).abs() > CDF_TOLERANCE {
            return Err(EpiError::config(format!(
                "{name}: CDF must end at 1.0, ends at {last}"
            )));
        }
        let mut cumulative = cumulative;
        if let Some(last) = cumulative.last_mut() {
            *last = 1.0;
        }
        Ok(DayCdf {
            first_day,
            cumulative,
        })
    }

    /// A point mass on `day`.
    #[must_use]
    pub fn point_mass(day: i32) -> Self {
        DayCdf {
            first_day: day,
            cumulative: vec![1.0],
        }
    }

    /// Probability assigned to exactly `day`.
    #[must_use]
    pub fn mass_at(&self, day: i32) -> f64 {
        let Ok(index) = usize::try_from(day - self.first_day) else {
            return 0.0;
        };
        match index {
            0 => self.cumulative.first().copied().unwrap_or(0.0),
            i if i < self.cumulative.len() => self.cumulative[i] - self.cumulative[i - 1],
            _ => 0.0,
        }
    }

    #[must_use]
    pub fn first_day(&self) -> i32 {
        self.first_day
    }

    pub fn draw<R: Rng + ?Sized>(&self, rng: &mut R) -> i32 {
        let index = draw_from_cdf(rng, &self.cumulative).expect("validated CDF ends at 1.0");
        self.first_day + index as i32
    }
}

/// A log-normal distribution parameterized by median and dispersion, with an optional upper
/// bound. A draw above the bound is replaced by one uniform draw on `[0, bound]`.
#[derive(Copy, Clone, Debug)]
pub struct BoundedLogNormal {
    distribution: LogNormal<f64>,
    upper_bound: Option<f64>,
}

impl BoundedLogNormal {
    /// `sigma_scale` multiplies `ln(dispersion)`; incubation and latent periods use 0.5.
    pub fn new(
        median: f64,
        dispersion: f64,
        sigma_scale: f64,
        upper_bound: Option<f64>,
        name: &str,
    ) -> Result<Self, EpiError> {
        if !(median > 0.0 && dispersion >= 1.0) {
            return Err(EpiError::config(format!(
                "{name}: log-normal median must be positive and dispersion at least 1 (got {median}, {dispersion})"
            )));
        }
        let distribution = LogNormal::new(median.ln(), sigma_scale * dispersion.ln())
            .map_err(|e| EpiError::config(format!("{name}: {e}")))?;
        Ok(BoundedLogNormal {
            distribution,
            upper_bound: upper_bound.filter(|bound| *bound > 0.0),
        })
    }

    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        let value = self.distribution.sample(rng);
        match self.upper_bound {
            Some(bound) if value > bound => rng.random_range(0.0..=bound),
            _ => value,
        }
    }
}

/// The rise-plateau-decay curve mapping the elapsed fraction `x` of a window to an intensity.
/// Full intensity holds on `[full_start, full_end]`; below it the curve rises as
/// `exp(x / full_start - 1)`, above it decays as `exp(-3.5 (x - full_end) / (1 - full_end))`.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Ramp {
    full_start: f64,
    full_end: f64,
}

impl Ramp {
    pub const FULL: Ramp = Ramp {
        full_start: 0.0,
        full_end: 1.0,
    };

    pub fn new(full_start: f64, full_end: f64, name: &str) -> Result<Self, EpiError> {
        let in_unit = |v: f64| (0.0..=1.0).contains(&v);
        if !(in_unit(full_start) && in_unit(full_end) && full_start <= full_end) {
            return Err(EpiError::config(format!(
                "{name}: full intensity window [{full_start}, {full_end}] must satisfy 0 <= start <= end <= 1"
            )));
        }
        Ok(Ramp {
            full_start,
            full_end,
        })
    }

    #[must_use]
    pub fn full_start(&self) -> f64 {
        self.full_start
    }

    #[must_use]
    pub fn full_end(&self) -> f64 {
        self.full_end
    }

    #[must_use]
    pub fn value(&self, x: f64) -> f64 {
        if x < self.full_start {
            (x / self.full_start - 1.0).exp()
        } else if x <= self.full_end {
            1.0
        } else {
            (-3.5 * (x - self.full_end) / (1.0 - self.full_end)).exp()
        }
    }
}

#[derive(Clone, Debug)]
pub enum SymptomsDistribution {
    LogNormal {
        incubation: BoundedLogNormal,
        duration: BoundedLogNormal,
    },
    Cdf {
        incubation: DayCdf,
        duration: DayCdf,
    },
}

#[derive(Clone, Debug)]
pub enum InfectiousDistribution {
    OffsetFromStartOfSymptoms { start_offset: f64, end_offset: f64 },
    OffsetFromSymptoms { start_offset: f64, end_offset: f64 },
    LogNormal {
        latent: BoundedLogNormal,
        duration: BoundedLogNormal,
    },
    Cdf { latent: DayCdf, duration: DayCdf },
    /// Diseases with zero transmissibility need no infectious schedule.
    Never,
}

/// Raw symptom timing draws.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum SymptomsDraw {
    /// Real-valued incubation period and duration, rounded when dates are assigned.
    Continuous { incubation: f64, duration: f64 },
    /// Whole days. A non-positive duration means symptoms never end.
    Days { incubation: i32, duration: i32 },
}

/// Raw infectiousness timing draws.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum InfectiousDraw {
    OffsetFromStartOfSymptoms { start_offset: f64, end_offset: f64 },
    OffsetFromSymptoms { start_offset: f64, end_offset: f64 },
    Continuous { latent: f64, duration: f64 },
    /// Whole days. A negative latent period means never infectious; a non-positive duration
    /// means infectious forever.
    Days { latent: i32, duration: i32 },
    Never,
}

/// Everything [`crate::infection::Infection::setup`] needs to assign dates.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ScheduleDraw {
    pub will_develop_symptoms: bool,
    pub produces_immunity: bool,
    /// Days of immunity after exposure, `None` for permanent immunity.
    pub immunity_duration: Option<i32>,
    pub symptoms: SymptomsDraw,
    pub infectiousness: InfectiousDraw,
}

/// Case-fatality tables: probability by age times probability by day since symptom onset.
#[derive(Clone, Debug)]
pub struct CaseFatality {
    min_symptoms: f64,
    age_probability: AgeMap,
    probability_by_day: Vec<f64>,
}

impl CaseFatality {
    fn from_config(config: &CaseFatalityConfig) -> Result<Self, EpiError> {
        config
            .age_specific_probability
            .validate_probabilities("case_fatality.age_specific_probability")?;
        if config.age_specific_probability.is_empty() || config.probability_by_day.is_empty() {
            return Err(EpiError::config(
                "case_fatality requires non-empty age_specific_probability and probability_by_day",
            ));
        }
        if config
            .probability_by_day
            .iter()
            .any(|p| !(0.0..=1.0).contains(p))
        {
            return Err(EpiError::config(
                "case_fatality.probability_by_day entries must be in [0, 1]",
            ));
        }
        Ok(CaseFatality {
            min_symptoms: config.min_symptoms,
            age_probability: config.age_specific_probability.clone(),
            probability_by_day: config.probability_by_day.clone(),
        })
    }

    /// Probability of death today. Days beyond the table carry no risk.
    #[must_use]
    pub fn probability(&self, real_age: f64, multiplier: f64, days_symptomatic: i32) -> f64 {
        let day_probability = usize::try_from(days_symptomatic)
            .ok()
            .and_then(|day| self.probability_by_day.get(day))
            .copied()
            .unwrap_or(0.0);
        self.age_probability.find_value(real_age) * multiplier * day_probability
    }
}

#[derive(Clone, Debug)]
pub struct NaturalHistory {
    probability_of_symptoms: f64,
    age_specific_probability_of_symptoms: Option<AgeMap>,
    asymptomatic_infectivity: f64,
    symptoms: SymptomsDistribution,
    infectious: InfectiousDistribution,
    infectivity_ramp: Ramp,
    symptoms_ramp: Ramp,
    immunity_loss: Option<Exp<f64>>,
    infection_immunity: Option<AgeMap>,
    infectivity_threshold: f64,
    symptomaticity_threshold: f64,
    case_fatality: Option<CaseFatality>,
}

impl NaturalHistory {
    /// Builds the model for a disease named `name`. The infectious schedule may only be omitted
    /// when `transmissibility` is zero.
    pub fn from_config(
        config: &NaturalHistoryConfig,
        transmissibility: f64,
        name: &str,
    ) -> Result<Self, EpiError> {
        if !(0.0..=1.0).contains(&config.probability_of_symptoms) {
            return Err(EpiError::config(format!(
                "{name}: probability_of_symptoms must be in [0, 1]"
            )));
        }
        if let Some(map) = &config.age_specific_probability_of_symptoms {
            map.validate_probabilities(&format!("{name}: age_specific_probability_of_symptoms"))?;
        }
        if let Some(map) = &config.age_specific_probability_of_infection_immunity {
            map.validate_probabilities(&format!(
                "{name}: age_specific_probability_of_infection_immunity"
            ))?;
        }
        if config.asymptomatic_infectivity.is_nan() || config.asymptomatic_infectivity < 0.0 {
            return Err(EpiError::config(format!(
                "{name}: asymptomatic_infectivity must be non-negative"
            )));
        }

        let symptoms = build_symptoms(&config.symptoms, name)?;
        let infectious = match &config.infectious {
            Some(infectious) => build_infectious(infectious, name)?,
            None if transmissibility == 0.0 => InfectiousDistribution::Never,
            None => {
                return Err(EpiError::config(format!(
                    "{name}: an infectious schedule is required when transmissibility > 0"
                )))
            }
        };

        let immunity_loss = if config.immunity_loss_rate > 0.0 {
            Some(Exp::new(config.immunity_loss_rate).map_err(|e| {
                EpiError::config(format!("{name}: immunity_loss_rate: {e}"))
            })?)
        } else {
            None
        };

        let case_fatality = config
            .case_fatality
            .as_ref()
            .map(CaseFatality::from_config)
            .transpose()?;

        let natural_history = NaturalHistory {
            probability_of_symptoms: config.probability_of_symptoms,
            age_specific_probability_of_symptoms: config
                .age_specific_probability_of_symptoms
                .clone()
                .filter(|map| !map.is_empty()),
            asymptomatic_infectivity: config.asymptomatic_infectivity,
            symptoms,
            infectious,
            infectivity_ramp: Ramp::new(
                config.full_infectivity_start,
                config.full_infectivity_end,
                &format!("{name}: infectivity"),
            )?,
            symptoms_ramp: Ramp::new(
                config.full_symptoms_start,
                config.full_symptoms_end,
                &format!("{name}: symptoms"),
            )?,
            immunity_loss,
            infection_immunity: config.age_specific_probability_of_infection_immunity.clone(),
            infectivity_threshold: config.infectivity_threshold,
            symptomaticity_threshold: config.symptomaticity_threshold,
            case_fatality,
        };
        info!(
            "{name}: natural history with {} symptoms and {} infectiousness",
            natural_history.symptoms_kind(),
            natural_history.infectious_kind()
        );
        Ok(natural_history)
    }

    fn symptoms_kind(&self) -> &'static str {
        match self.symptoms {
            SymptomsDistribution::LogNormal { .. } => "lognormal",
            SymptomsDistribution::Cdf { .. } => "cdf",
        }
    }

    fn infectious_kind(&self) -> &'static str {
        match self.infectious {
            InfectiousDistribution::OffsetFromStartOfSymptoms { .. } => {
                "offset_from_start_of_symptoms"
            }
            InfectiousDistribution::OffsetFromSymptoms { .. } => "offset_from_symptoms",
            InfectiousDistribution::LogNormal { .. } => "lognormal",
            InfectiousDistribution::Cdf { .. } => "cdf",
            InfectiousDistribution::Never => "no",
        }
    }

    /// Draws the raw schedule of a new infection of a host aged `real_age`. The draw order is
    /// fixed: symptom decision, immunity, symptom timing, infectious timing.
    pub fn draw_schedule<R: Rng + ?Sized>(&self, real_age: f64, rng: &mut R) -> ScheduleDraw {
        let will_develop_symptoms = bernoulli(rng, self.probability_of_symptoms(real_age));
        let produces_immunity = self.gen_immunity_infection(real_age, rng);
        let immunity_duration = self.duration_of_immunity(rng);

        let symptoms = match &self.symptoms {
            SymptomsDistribution::LogNormal {
                incubation,
                duration,
            } => SymptomsDraw::Continuous {
                incubation: incubation.sample(rng),
                duration: duration.sample(rng),
            },
            SymptomsDistribution::Cdf {
                incubation,
                duration,
            } => SymptomsDraw::Days {
                incubation: incubation.draw(rng),
                duration: duration.draw(rng),
            },
        };

        let infectiousness = match &self.infectious {
            InfectiousDistribution::OffsetFromStartOfSymptoms {
                start_offset,
                end_offset,
            } => InfectiousDraw::OffsetFromStartOfSymptoms {
                start_offset: *start_offset,
                end_offset: *end_offset,
            },
            InfectiousDistribution::OffsetFromSymptoms {
                start_offset,
                end_offset,
            } => InfectiousDraw::OffsetFromSymptoms {
                start_offset: *start_offset,
                end_offset: *end_offset,
            },
            InfectiousDistribution::LogNormal { latent, duration } => InfectiousDraw::Continuous {
                latent: latent.sample(rng),
                duration: duration.sample(rng),
            },
            InfectiousDistribution::Cdf { latent, duration } => {
                let latent = latent.draw(rng);
                // A host that is never infectious needs no duration.
                let duration = if latent < 0 { 0 } else { duration.draw(rng) };
                InfectiousDraw::Days { latent, duration }
            }
            InfectiousDistribution::Never => InfectiousDraw::Never,
        };

        ScheduleDraw {
            will_develop_symptoms,
            produces_immunity,
            immunity_duration,
            symptoms,
            infectiousness,
        }
    }

    #[must_use]
    pub fn probability_of_symptoms(&self, real_age: f64) -> f64 {
        match &self.age_specific_probability_of_symptoms {
            Some(map) => map.find_value(real_age),
            None => self.probability_of_symptoms,
        }
    }

    /// `floor(0.5 + Exponential(rate))` days, or `None` (permanent) when no loss rate is set or
    /// the draw rounds to zero.
    pub fn duration_of_immunity<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<i32> {
        let distribution = self.immunity_loss.as_ref()?;
        let days = (0.5 + distribution.sample(rng)).floor();
        (days > 0.0).then(|| days.min(f64::from(i32::MAX)) as i32)
    }

    /// Whether recovering from this infection leaves the host immune. Without an age map every
    /// infection produces immunity.
    pub fn gen_immunity_infection<R: Rng + ?Sized>(&self, real_age: f64, rng: &mut R) -> bool {
        match &self.infection_immunity {
            None => true,
            Some(map) => rng.random::<f64>() <= map.find_value(real_age),
        }
    }

    #[must_use]
    pub fn is_case_fatality_enabled(&self) -> bool {
        self.case_fatality.is_some()
    }

    /// Draws whether a symptomatic host dies today. `multiplier` carries the host's
    /// chronic-condition and pregnancy adjustments (1.0 for none).
    pub fn is_fatal<R: Rng + ?Sized>(
        &self,
        real_age: f64,
        multiplier: f64,
        symptoms: f64,
        days_symptomatic: i32,
        rng: &mut R,
    ) -> bool {
        match &self.case_fatality {
            Some(case_fatality) if symptoms >= case_fatality.min_symptoms => bernoulli(
                rng,
                case_fatality.probability(real_age, multiplier, days_symptomatic),
            ),
            _ => false,
        }
    }

    #[must_use]
    pub fn asymptomatic_infectivity(&self) -> f64 {
        self.asymptomatic_infectivity
    }

    #[must_use]
    pub fn infectivity_ramp(&self) -> Ramp {
        self.infectivity_ramp
    }

    #[must_use]
    pub fn symptoms_ramp(&self) -> Ramp {
        self.symptoms_ramp
    }

    #[must_use]
    pub fn infectivity_threshold(&self) -> f64 {
        self.infectivity_threshold
    }

    #[must_use]
    pub fn symptomaticity_threshold(&self) -> f64 {
        self.symptomaticity_threshold
    }

    #[must_use]
    pub fn symptoms_distribution(&self) -> &SymptomsDistribution {
        &self.symptoms
    }

    #[must_use]
    pub fn infectious_distribution(&self) -> &InfectiousDistribution {
        &self.infectious
    }
}

fn build_symptoms(config: &SymptomsConfig, name: &str) -> Result<SymptomsDistribution, EpiError> {
    match config {
        SymptomsConfig::LogNormal {
            incubation_period_median,
            incubation_period_dispersion,
            incubation_period_upper_bound,
            symptoms_duration_median,
            symptoms_duration_dispersion,
            symptoms_duration_upper_bound,
        } => Ok(SymptomsDistribution::LogNormal {
            incubation: BoundedLogNormal::new(
                *incubation_period_median,
                *incubation_period_dispersion,
                0.5,
                *incubation_period_upper_bound,
                &format!("{name}: incubation period"),
            )?,
            duration: BoundedLogNormal::new(
                *symptoms_duration_median,
                *symptoms_duration_dispersion,
                1.0,
                *symptoms_duration_upper_bound,
                &format!("{name}: symptoms duration"),
            )?,
        }),
        SymptomsConfig::Cdf {
            days_incubating,
            days_symptomatic,
        } => {
            let incubation = DayCdf::from_config(days_incubating, &format!("{name}: days_incubating"))?;
            // Symptoms need at least one day to appear.
            if incubation.first_day() < 0 || incubation.mass_at(0) > 0.0 {
                return Err(EpiError::config(format!(
                    "{name}: days_incubating must put all mass on days >= 1"
                )));
            }
            Ok(SymptomsDistribution::Cdf {
                incubation,
                duration: DayCdf::from_config(days_symptomatic, &format!("{name}: days_symptomatic"))?,
            })
        }
    }
}

fn build_infectious(
    config: &InfectiousConfig,
    name: &str,
) -> Result<InfectiousDistribution, EpiError> {
    match config {
        InfectiousConfig::OffsetFromStartOfSymptoms {
            start_offset,
            end_offset,
        } => Ok(InfectiousDistribution::OffsetFromStartOfSymptoms {
            start_offset: *start_offset,
            end_offset: *end_offset,
        }),
        InfectiousConfig::OffsetFromSymptoms {
            start_offset,
            end_offset,
        } => Ok(InfectiousDistribution::OffsetFromSymptoms {
            start_offset: *start_offset,
            end_offset: *end_offset,
        }),
        InfectiousConfig::LogNormal {
            latent_period_median,
            latent_period_dispersion,
            latent_period_upper_bound,
            infectious_duration_median,
            infectious_duration_dispersion,
            infectious_duration_upper_bound,
        } => Ok(InfectiousDistribution::LogNormal {
            latent: BoundedLogNormal::new(
                *latent_period_median,
                *latent_period_dispersion,
                0.5,
                *latent_period_upper_bound,
                &format!("{name}: latent period"),
            )?,
            duration: BoundedLogNormal::new(
                *infectious_duration_median,
                *infectious_duration_dispersion,
                1.0,
                *infectious_duration_upper_bound,
                &format!("{name}: infectious duration"),
            )?,
        }),
        InfectiousConfig::Cdf {
            days_latent,
            days_infectious,
        } => {
            let latent = DayCdf::from_config(days_latent, &format!("{name}: days_latent"))?;
            // Infectiousness needs at least one day to start.
            if latent.mass_at(0) > 0.0 {
                return Err(EpiError::config(format!(
                    "{name}: days_latent must put no mass on day 0"
                )));
            }
            Ok(InfectiousDistribution::Cdf {
                latent,
                duration: DayCdf::from_config(days_infectious, &format!("{name}: days_infectious"))?,
            })
        }
    }
}

#[cfg(test)]
pub(crate) mod test {
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;
    use crate::age_map::AgeGroup;
    use crate::config::NaturalHistoryKind;

    /// Symptoms from log-normal draws, infectious from one day before onset to three after.
    pub(crate) fn lognormal_config() -> NaturalHistoryConfig {
        NaturalHistoryConfig {
            model: NaturalHistoryKind::Basic,
            probability_of_symptoms: 0.67,
            age_specific_probability_of_symptoms: None,
            asymptomatic_infectivity: 0.5,
            symptoms: SymptomsConfig::LogNormal {
                incubation_period_median: 1.9,
                incubation_period_dispersion: 1.51,
                incubation_period_upper_bound: None,
                symptoms_duration_median: 5.0,
                symptoms_duration_dispersion: 1.5,
                symptoms_duration_upper_bound: None,
            },
            infectious: Some(InfectiousConfig::OffsetFromStartOfSymptoms {
                start_offset: -1.0,
                end_offset: 3.0,
            }),
            full_symptoms_start: 0.0,
            full_symptoms_end: 1.0,
            full_infectivity_start: 0.0,
            full_infectivity_end: 1.0,
            immunity_loss_rate: 0.0,
            age_specific_probability_of_infection_immunity: None,
            infectivity_threshold: 0.0,
            symptomaticity_threshold: 0.0,
            case_fatality: None,
        }
    }

    /// Every duration is a point mass: incubation 2, symptoms 4, latent 1, infectious 5.
    pub(crate) fn point_mass_config() -> NaturalHistoryConfig {
        NaturalHistoryConfig {
            probability_of_symptoms: 1.0,
            symptoms: SymptomsConfig::Cdf {
                days_incubating: DayCdfConfig::Days(vec![0.0, 0.0, 1.0]),
                days_symptomatic: DayCdfConfig::Days(vec![0.0, 0.0, 0.0, 0.0, 1.0]),
            },
            infectious: Some(InfectiousConfig::Cdf {
                days_latent: DayCdfConfig::Days(vec![0.0, 1.0]),
                days_infectious: DayCdfConfig::Days(vec![0.0, 0.0, 0.0, 0.0, 0.0, 1.0]),
            }),
            ..lognormal_config()
        }
    }

    #[test]
    fn cdf_validation() {
        let ok = DayCdf::from_config(&DayCdfConfig::Days(vec![0.0, 0.5, 0.9999999]), "t").unwrap();
        assert_eq!(ok.cumulative.last(), Some(&1.0));

        for bad in [
            vec![],
            vec![0.5, 0.4, 1.0],
            vec![0.5, 0.9],
            vec![-0.1, 1.0],
            vec![0.5, 1.2],
        ] {
            let result = DayCdf::from_config(&DayCdfConfig::Days(bad.clone()), "t");
            assert!(matches!(result, Err(EpiError::ConfigError(_))), "{bad:?}");
        }
    }

    #[test]
    fn cdf_mass_and_offset_draws() {
        let cdf = DayCdf::from_config(
            &DayCdfConfig::Offset {
                first_day: -1,
                cumulative: vec![0.25, 0.25, 1.0],
            },
            "t",
        )
        .unwrap();
        assert_eq!(cdf.mass_at(-2), 0.0);
        assert_eq!(cdf.mass_at(-1), 0.25);
        assert_eq!(cdf.mass_at(0), 0.0);
        assert_eq!(cdf.mass_at(1), 0.75);
        assert_eq!(cdf.mass_at(2), 0.0);

        let mut rng = StdRng::seed_from_u64(42);
        let trials = 20_000;
        let never = (0..trials).filter(|_| cdf.draw(&mut rng) == -1).count();
        let fraction = never as f64 / f64::from(trials);
        assert!((fraction - 0.25).abs() < 0.02, "fraction {fraction}");
    }

    #[test]
    fn point_mass_draws_are_exact_for_any_seed() {
        let cdf = DayCdf::point_mass(4);
        for seed in 0..100 {
            let mut rng = StdRng::seed_from_u64(seed);
            assert_eq!(cdf.draw(&mut rng), 4);
        }
    }

    #[test]
    fn bounded_lognormal_respects_bound() {
        let dist = BoundedLogNormal::new(5.0, 3.0, 1.0, Some(6.0), "t").unwrap();
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..10_000 {
            let value = dist.sample(&mut rng);
            assert!((0.0..=6.0).contains(&value));
        }
    }

    #[test]
    fn lognormal_median_is_preserved() {
        let dist = BoundedLogNormal::new(5.0, 1.5, 1.0, None, "t").unwrap();
        let mut rng = StdRng::seed_from_u64(42);
        let mut samples: Vec<f64> = (0..20_001).map(|_| dist.sample(&mut rng)).collect();
        samples.sort_by(f64::total_cmp);
        let median = samples[10_000];
        assert!((median - 5.0).abs() < 0.1, "median {median}");
    }

    #[test]
    fn bad_lognormal_parameters_are_config_errors() {
        assert!(BoundedLogNormal::new(0.0, 1.5, 1.0, None, "t").is_err());
        assert!(BoundedLogNormal::new(1.0, 0.5, 1.0, None, "t").is_err());
    }

    #[test]
    fn ramp_boundaries() {
        let ramp = Ramp::new(0.25, 0.75, "t").unwrap();
        assert_eq!(ramp.value(0.25), 1.0);
        assert_eq!(ramp.value(0.75), 1.0);
        assert_eq!(ramp.value(0.5), 1.0);
        assert!((ramp.value(0.0) - (-1.0f64).exp()).abs() < 1e-12);
        assert!((ramp.value(1.0) - (-3.5f64).exp()).abs() < 1e-12);
        assert!(ramp.value(0.1) < ramp.value(0.2));
        assert!(ramp.value(0.8) > ramp.value(0.9));
        assert!(Ramp::new(0.8, 0.2, "t").is_err());
        assert!(Ramp::new(-0.1, 0.2, "t").is_err());
    }

    #[test]
    fn age_specific_symptoms_override_scalar() {
        let mut config = lognormal_config();
        config.age_specific_probability_of_symptoms = Some(
            AgeMap::new(vec![AgeGroup {
                min_age: 0.0,
                max_age: 17.0,
                value: 0.1,
            }])
            .unwrap(),
        );
        let nh = NaturalHistory::from_config(&config, 1.0, "flu").unwrap();
        assert_eq!(nh.probability_of_symptoms(10.0), 0.1);
        assert_eq!(nh.probability_of_symptoms(40.0), 0.0);

        let nh = NaturalHistory::from_config(&lognormal_config(), 1.0, "flu").unwrap();
        assert_eq!(nh.probability_of_symptoms(40.0), 0.67);
    }

    #[test]
    fn symptom_decision_frequency() {
        let nh = NaturalHistory::from_config(&lognormal_config(), 1.0, "flu").unwrap();
        let mut rng = StdRng::seed_from_u64(42);
        let trials = 20_000;
        let symptomatic = (0..trials)
            .filter(|_| nh.draw_schedule(30.0, &mut rng).will_develop_symptoms)
            .count();
        let fraction = symptomatic as f64 / f64::from(trials);
        assert!((fraction - 0.67).abs() < 0.02, "fraction {fraction}");
    }

    #[test]
    fn immunity_duration() {
        let nh = NaturalHistory::from_config(&lognormal_config(), 1.0, "flu").unwrap();
        let mut rng = StdRng::seed_from_u64(42);
        assert_eq!(nh.duration_of_immunity(&mut rng), None);

        let config = NaturalHistoryConfig {
            immunity_loss_rate: 0.01,
            ..lognormal_config()
        };
        let nh = NaturalHistory::from_config(&config, 1.0, "flu").unwrap();
        let trials = 10_000;
        let total: f64 = (0..trials)
            .map(|_| f64::from(nh.duration_of_immunity(&mut rng).unwrap_or(0)))
            .sum();
        let mean = total / f64::from(trials);
        assert!((mean - 100.0).abs() < 5.0, "mean {mean}");
    }

    #[test]
    fn infection_immunity_by_age() {
        let mut rng = StdRng::seed_from_u64(42);
        let nh = NaturalHistory::from_config(&lognormal_config(), 1.0, "flu").unwrap();
        assert!(nh.gen_immunity_infection(50.0, &mut rng));

        let config = NaturalHistoryConfig {
            age_specific_probability_of_infection_immunity: Some(
                AgeMap::new(vec![AgeGroup {
                    min_age: 0.0,
                    max_age: 4.0,
                    value: 1.0,
                }])
                .unwrap(),
            ),
            ..lognormal_config()
        };
        let nh = NaturalHistory::from_config(&config, 1.0, "flu").unwrap();
        for _ in 0..100 {
            assert!(nh.gen_immunity_infection(2.0, &mut rng));
        }
        // Older hosts fall outside the map: probability 0, but a draw of exactly 0.0 passes.
        let immune = (0..1000)
            .filter(|_| nh.gen_immunity_infection(50.0, &mut rng))
            .count();
        assert!(immune <= 1);
    }

    #[test]
    fn case_fatality_tables() {
        let config = NaturalHistoryConfig {
            case_fatality: Some(CaseFatalityConfig {
                min_symptoms: 0.5,
                age_specific_probability: AgeMap::uniform(1.0),
                probability_by_day: vec![0.0, 1.0],
            }),
            ..lognormal_config()
        };
        let nh = NaturalHistory::from_config(&config, 1.0, "flu").unwrap();
        assert!(nh.is_case_fatality_enabled());
        let mut rng = StdRng::seed_from_u64(42);
        // Below the symptom minimum nobody dies.
        assert!(!nh.is_fatal(50.0, 1.0, 0.4, 1, &mut rng));
        // Day 0 carries no risk, day 1 is certain death.
        assert!(!nh.is_fatal(50.0, 1.0, 1.0, 0, &mut rng));
        assert!(nh.is_fatal(50.0, 1.0, 1.0, 1, &mut rng));
        // Beyond the table.
        assert!(!nh.is_fatal(50.0, 1.0, 1.0, 5, &mut rng));
        // A zero multiplier removes the risk.
        assert!(!nh.is_fatal(50.0, 0.0, 1.0, 1, &mut rng));

        let plain = NaturalHistory::from_config(&lognormal_config(), 1.0, "flu").unwrap();
        assert!(!plain.is_case_fatality_enabled());
        assert!(!plain.is_fatal(50.0, 1.0, 1.0, 1, &mut rng));
    }

    #[test]
    fn infectious_schedule_required_when_transmissible() {
        let config = NaturalHistoryConfig {
            infectious: None,
            ..lognormal_config()
        };
        assert!(NaturalHistory::from_config(&config, 1.0, "flu").is_err());
        let nh = NaturalHistory::from_config(&config, 0.0, "flu").unwrap();
        let mut rng = StdRng::seed_from_u64(42);
        assert_eq!(
            nh.draw_schedule(30.0, &mut rng).infectiousness,
            InfectiousDraw::Never
        );
    }

    #[test]
    fn zero_day_latent_mass_is_rejected() {
        let config = NaturalHistoryConfig {
            infectious: Some(InfectiousConfig::Cdf {
                days_latent: DayCdfConfig::Days(vec![0.5, 1.0]),
                days_infectious: DayCdfConfig::Days(vec![0.0, 1.0]),
            }),
            ..point_mass_config()
        };
        assert!(matches!(
            NaturalHistory::from_config(&config, 1.0, "flu"),
            Err(EpiError::ConfigError(_))
        ));

        let config = NaturalHistoryConfig {
            symptoms: SymptomsConfig::Cdf {
                days_incubating: DayCdfConfig::Days(vec![1.0]),
                days_symptomatic: DayCdfConfig::Days(vec![0.0, 1.0]),
            },
            ..point_mass_config()
        };
        assert!(NaturalHistory::from_config(&config, 1.0, "flu").is_err());
    }

    #[test]
    fn point_mass_schedule_draws() {
        let nh = NaturalHistory::from_config(&point_mass_config(), 1.0, "flu").unwrap();
        for seed in 0..50 {
            let mut rng = StdRng::seed_from_u64(seed);
            let draw = nh.draw_schedule(30.0, &mut rng);
            assert!(draw.will_develop_symptoms);
            assert!(draw.produces_immunity);
            assert_eq!(draw.immunity_duration, None);
            assert_eq!(
                draw.symptoms,
                SymptomsDraw::Days {
                    incubation: 2,
                    duration: 4
                }
            );
            assert_eq!(
                draw.infectiousness,
                InfectiousDraw::Days {
                    latent: 1,
                    duration: 5
                }
            );
        }
    }
}
