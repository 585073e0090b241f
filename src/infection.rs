//! One infection of one host by one disease.
//!
//! An `Infection` is created at the moment of exposure and scheduled exactly once by
//! [`Infection::setup`], which turns a [`ScheduleDraw`] from the disease's natural history into
//! concrete dates. Phases that do not happen are `None` rather than a sentinel day, and a
//! window whose end is `None` never closes.

use rand::Rng;

use crate::calendar::Day;
use crate::disease::DiseaseId;
use crate::host::HostId;
use crate::natural_history::{InfectiousDraw, NaturalHistory, Ramp, ScheduleDraw, SymptomsDraw};
use crate::venue::VenueId;

/// A half-open window of days `[start, end)`. `end == None` means the window never closes.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Window {
    pub start: Day,
    pub end: Option<Day>,
}

impl Window {
    #[must_use]
    pub fn new(start: Day, end: Option<Day>) -> Self {
        Window { start, end }
    }

    #[must_use]
    pub fn contains(&self, day: Day) -> bool {
        self.start <= day && self.end.is_none_or(|end| day < end)
    }

    /// Intensity on `day` following `ramp`. Zero outside the window. The window is treated as
    /// starting one day before `start`, so the first day already has a positive elapsed
    /// fraction. An open-ended window is at full intensity throughout.
    #[must_use]
    pub fn intensity(&self, ramp: Ramp, day: Day) -> f64 {
        if !self.contains(day) {
            return 0.0;
        }
        let Some(end) = self.end else {
            return 1.0;
        };
        let total = f64::from(end - self.start + 1);
        let elapsed = f64::from(day - self.start + 1);
        ramp.value(elapsed / total)
    }
}

/// The parts of the natural history an infection needs to answer intensity queries without
/// holding on to the model.
#[derive(Copy, Clone, Debug, PartialEq)]
struct IntensityProfile {
    infectivity: Ramp,
    symptoms: Ramp,
    asymptomatic_infectivity: f64,
}

#[derive(Clone, Debug)]
pub struct Infection {
    disease: DiseaseId,
    host: HostId,
    infector: Option<HostId>,
    venue: Option<VenueId>,
    exposure_day: Day,
    infectious: Option<Window>,
    symptoms: Option<Window>,
    immunity_end: Option<Day>,
    will_develop_symptoms: bool,
    produces_immunity: bool,
    is_fatal: bool,
    profile: Option<IntensityProfile>,
}

impl Infection {
    /// A new, not yet scheduled infection. `infector` and `venue` are `None` for seeded
    /// infections.
    #[must_use]
    pub fn new(
        disease: DiseaseId,
        host: HostId,
        infector: Option<HostId>,
        venue: Option<VenueId>,
        exposure_day: Day,
    ) -> Self {
        Infection {
            disease,
            host,
            infector,
            venue,
            exposure_day,
            infectious: None,
            symptoms: None,
            immunity_end: None,
            will_develop_symptoms: false,
            produces_immunity: true,
            is_fatal: false,
            profile: None,
        }
    }

    /// Draws the schedule from `natural_history` and assigns every date.
    pub fn setup<R: Rng + ?Sized>(
        &mut self,
        natural_history: &NaturalHistory,
        real_age: f64,
        rng: &mut R,
    ) {
        let draw = natural_history.draw_schedule(real_age, rng);
        self.apply_schedule(natural_history, &draw);
    }

    /// Assigns dates from an already drawn schedule.
    ///
    /// # Panics
    ///
    /// If the infection was already scheduled, or if a whole-day draw violates the minimum of one
    /// day of incubation or latency (the natural history rejects such tables at load time).
    pub fn apply_schedule(&mut self, natural_history: &NaturalHistory, draw: &ScheduleDraw) {
        assert!(
            self.profile.is_none(),
            "infection of {:?} by {:?} scheduled twice",
            self.host,
            self.disease
        );
        let exposure = self.exposure_day;

        self.will_develop_symptoms = draw.will_develop_symptoms;
        self.produces_immunity = draw.produces_immunity;
        self.immunity_end = draw.immunity_duration.map(|days| exposure + days);

        let symptoms = match draw.symptoms {
            SymptomsDraw::Continuous {
                incubation,
                duration,
            } => Window::new(
                exposure + round_days(incubation),
                Some(exposure + round_days(incubation + duration)),
            ),
            SymptomsDraw::Days {
                incubation,
                duration,
            } => {
                assert!(incubation > 0, "incubation period must be at least one day");
                let start = exposure + incubation;
                Window::new(start, (duration > 0).then(|| start + duration))
            }
        };

        self.infectious = match draw.infectiousness {
            InfectiousDraw::OffsetFromStartOfSymptoms {
                start_offset,
                end_offset,
            } => Some(offset_window(
                exposure,
                symptoms.start + round_days(start_offset),
                Some(symptoms.start + round_days(end_offset)),
            )),
            InfectiousDraw::OffsetFromSymptoms {
                start_offset,
                end_offset,
            } => Some(offset_window(
                exposure,
                symptoms.start + round_days(start_offset),
                symptoms.end.map(|end| end + round_days(end_offset)),
            )),
            InfectiousDraw::Continuous { latent, duration } => Some(Window::new(
                exposure + round_days(latent),
                Some(exposure + round_days(latent + duration)),
            )),
            InfectiousDraw::Days { latent, .. } if latent < 0 => None,
            InfectiousDraw::Days { latent, duration } => {
                assert!(latent > 0, "latent period must be at least one day");
                let start = exposure + latent;
                Some(Window::new(start, (duration > 0).then(|| start + duration)))
            }
            InfectiousDraw::Never => None,
        };

        self.symptoms = self.will_develop_symptoms.then_some(symptoms);
        self.profile = Some(IntensityProfile {
            infectivity: natural_history.infectivity_ramp(),
            symptoms: natural_history.symptoms_ramp(),
            asymptomatic_infectivity: natural_history.asymptomatic_infectivity(),
        });
    }

    /// Evaluates case fatality for `day`. Does nothing unless case fatality is enabled and the
    /// host is symptomatic; once fatal, the infection stays fatal.
    pub fn update<R: Rng + ?Sized>(
        &mut self,
        natural_history: &NaturalHistory,
        day: Day,
        real_age: f64,
        case_fatality_multiplier: f64,
        rng: &mut R,
    ) {
        if !natural_history.is_case_fatality_enabled() || !self.is_symptomatic(day) {
            return;
        }
        let Some(symptoms) = self.symptoms else {
            return;
        };
        let days_symptomatic = day - symptoms.start;
        if natural_history.is_fatal(
            real_age,
            case_fatality_multiplier,
            self.get_symptoms(day),
            days_symptomatic,
            rng,
        ) {
            self.is_fatal = true;
        }
    }

    #[must_use]
    pub fn is_infectious(&self, day: Day) -> bool {
        self.infectious.is_some_and(|window| window.contains(day))
    }

    #[must_use]
    pub fn is_symptomatic(&self, day: Day) -> bool {
        self.symptoms.is_some_and(|window| window.contains(day))
    }

    /// Infectivity in `[0, 1]` on `day`, scaled by the asymptomatic multiplier for infections
    /// that never develop symptoms.
    #[must_use]
    pub fn get_infectivity(&self, day: Day) -> f64 {
        let (Some(window), Some(profile)) = (self.infectious, self.profile) else {
            return 0.0;
        };
        let value = window.intensity(profile.infectivity, day);
        if self.will_develop_symptoms {
            value
        } else {
            value * profile.asymptomatic_infectivity
        }
    }

    /// Symptom level in `[0, 1]` on `day`. Always zero for asymptomatic infections.
    #[must_use]
    pub fn get_symptoms(&self, day: Day) -> f64 {
        match (self.symptoms, self.profile) {
            (Some(window), Some(profile)) => window.intensity(profile.symptoms, day),
            _ => 0.0,
        }
    }

    /// True once the host has passed every phase of this infection that has an end.
    #[must_use]
    pub fn is_recovered(&self, day: Day) -> bool {
        let past = |window: Option<Window>| {
            window.is_none_or(|window| window.end.is_some_and(|end| day >= end))
        };
        day > self.exposure_day && past(self.infectious) && past(self.symptoms)
    }

    #[must_use]
    pub fn is_fatal(&self) -> bool {
        self.is_fatal
    }

    #[must_use]
    pub fn is_scheduled(&self) -> bool {
        self.profile.is_some()
    }

    #[must_use]
    pub fn disease(&self) -> DiseaseId {
        self.disease
    }

    #[must_use]
    pub fn host(&self) -> HostId {
        self.host
    }

    #[must_use]
    pub fn infector(&self) -> Option<HostId> {
        self.infector
    }

    #[must_use]
    pub fn venue(&self) -> Option<VenueId> {
        self.venue
    }

    #[must_use]
    pub fn exposure_day(&self) -> Day {
        self.exposure_day
    }

    #[must_use]
    pub fn infectious_window(&self) -> Option<Window> {
        self.infectious
    }

    #[must_use]
    pub fn symptoms_window(&self) -> Option<Window> {
        self.symptoms
    }

    #[must_use]
    pub fn immunity_end(&self) -> Option<Day> {
        self.immunity_end
    }

    #[must_use]
    pub fn will_develop_symptoms(&self) -> bool {
        self.will_develop_symptoms
    }

    #[must_use]
    pub fn produces_immunity(&self) -> bool {
        self.produces_immunity
    }
}

fn round_days(days: f64) -> Day {
    days.round() as Day
}

/// Offsets can place the start before exposure or the end before the start; both are pulled
/// back so that `exposure <= start <= end`.
fn offset_window(exposure: Day, start: Day, end: Option<Day>) -> Window {
    let start = start.max(exposure);
    Window::new(start, end.map(|end| end.max(start)))
}

#[cfg(test)]
mod test {
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;
    use crate::age_map::AgeMap;
    use crate::config::{CaseFatalityConfig, InfectiousConfig, NaturalHistoryConfig};
    use crate::natural_history::test::{lognormal_config, point_mass_config};

    fn natural_history(config: &NaturalHistoryConfig) -> NaturalHistory {
        NaturalHistory::from_config(config, 1.0, "test").unwrap()
    }

    fn new_infection(day: Day) -> Infection {
        Infection::new(DiseaseId(0), HostId(1), Some(HostId(2)), Some(VenueId(3)), day)
    }

    fn scheduled(
        nh: &NaturalHistory,
        symptomatic: bool,
        symptoms: SymptomsDraw,
        infectiousness: InfectiousDraw,
    ) -> Infection {
        let mut infection = new_infection(10);
        infection.apply_schedule(
            nh,
            &ScheduleDraw {
                will_develop_symptoms: symptomatic,
                produces_immunity: true,
                immunity_duration: None,
                symptoms,
                infectiousness,
            },
        );
        infection
    }

    #[test]
    fn lognormal_dates_round_from_exposure() {
        let nh = natural_history(&lognormal_config());
        let infection = scheduled(
            &nh,
            true,
            SymptomsDraw::Continuous {
                incubation: 1.6,
                duration: 4.7,
            },
            InfectiousDraw::Continuous {
                latent: 0.4,
                duration: 6.2,
            },
        );
        assert_eq!(infection.symptoms_window(), Some(Window::new(12, Some(16))));
        assert_eq!(infection.infectious_window(), Some(Window::new(10, Some(17))));
    }

    #[test]
    fn offsets_from_start_of_symptoms() {
        let nh = natural_history(&lognormal_config());
        let infection = scheduled(
            &nh,
            true,
            SymptomsDraw::Days {
                incubation: 3,
                duration: 5,
            },
            InfectiousDraw::OffsetFromStartOfSymptoms {
                start_offset: -1.0,
                end_offset: 2.4,
            },
        );
        assert_eq!(infection.symptoms_window(), Some(Window::new(13, Some(18))));
        assert_eq!(infection.infectious_window(), Some(Window::new(12, Some(15))));
    }

    #[test]
    fn offsets_from_symptoms_anchor_end_to_symptom_end() {
        let nh = natural_history(&lognormal_config());
        let infection = scheduled(
            &nh,
            true,
            SymptomsDraw::Days {
                incubation: 3,
                duration: 5,
            },
            InfectiousDraw::OffsetFromSymptoms {
                start_offset: -1.0,
                end_offset: 1.0,
            },
        );
        assert_eq!(infection.infectious_window(), Some(Window::new(12, Some(19))));
    }

    #[test]
    fn offsets_never_precede_exposure() {
        let nh = natural_history(&lognormal_config());
        let infection = scheduled(
            &nh,
            true,
            SymptomsDraw::Days {
                incubation: 1,
                duration: 2,
            },
            InfectiousDraw::OffsetFromStartOfSymptoms {
                start_offset: -5.0,
                end_offset: -4.0,
            },
        );
        assert_eq!(infection.infectious_window(), Some(Window::new(10, Some(10))));
        assert!(!infection.is_infectious(10));
    }

    #[test]
    fn cdf_negative_latent_means_never_infectious() {
        let nh = natural_history(&point_mass_config());
        let infection = scheduled(
            &nh,
            true,
            SymptomsDraw::Days {
                incubation: 2,
                duration: 3,
            },
            InfectiousDraw::Days {
                latent: -1,
                duration: 0,
            },
        );
        assert_eq!(infection.infectious_window(), None);
        assert!((0..40).all(|day| !infection.is_infectious(day)));
        assert!((0..40).all(|day| infection.get_infectivity(day) == 0.0));
    }

    #[test]
    fn cdf_non_positive_durations_never_end() {
        let nh = natural_history(&point_mass_config());
        let infection = scheduled(
            &nh,
            true,
            SymptomsDraw::Days {
                incubation: 2,
                duration: 0,
            },
            InfectiousDraw::Days {
                latent: 1,
                duration: -3,
            },
        );
        assert_eq!(infection.infectious_window(), Some(Window::new(11, None)));
        assert_eq!(infection.symptoms_window(), Some(Window::new(12, None)));
        assert!(infection.is_infectious(1000));
        assert_eq!(infection.get_infectivity(1000), 1.0);
        assert!(!infection.is_recovered(1000));
    }

    #[test]
    #[should_panic(expected = "latent period must be at least one day")]
    fn zero_day_latent_is_a_defect() {
        let nh = natural_history(&point_mass_config());
        scheduled(
            &nh,
            true,
            SymptomsDraw::Days {
                incubation: 2,
                duration: 3,
            },
            InfectiousDraw::Days {
                latent: 0,
                duration: 3,
            },
        );
    }

    #[test]
    #[should_panic(expected = "scheduled twice")]
    fn setup_runs_once() {
        let nh = natural_history(&point_mass_config());
        let mut rng = StdRng::seed_from_u64(42);
        let mut infection = new_infection(0);
        infection.setup(&nh, 30.0, &mut rng);
        infection.setup(&nh, 30.0, &mut rng);
    }

    #[test]
    fn asymptomatic_infections_have_no_symptoms() {
        let nh = natural_history(&lognormal_config());
        let draw_symptoms = SymptomsDraw::Days {
            incubation: 2,
            duration: 4,
        };
        let draw_infectious = InfectiousDraw::Days {
            latent: 1,
            duration: 6,
        };
        let symptomatic = scheduled(&nh, true, draw_symptoms, draw_infectious);
        let asymptomatic = scheduled(&nh, false, draw_symptoms, draw_infectious);

        assert_eq!(asymptomatic.symptoms_window(), None);
        for day in 0..30 {
            assert_eq!(asymptomatic.get_symptoms(day), 0.0);
            assert!(!asymptomatic.is_symptomatic(day));
            assert_eq!(
                asymptomatic.get_infectivity(day),
                symptomatic.get_infectivity(day) * nh.asymptomatic_infectivity()
            );
        }
        // Infectiousness is unaffected by the symptom decision.
        assert_eq!(
            asymptomatic.infectious_window(),
            symptomatic.infectious_window()
        );
    }

    #[test]
    fn windows_are_half_open() {
        let nh = natural_history(&point_mass_config());
        let mut rng = StdRng::seed_from_u64(42);
        let mut infection = new_infection(5);
        infection.setup(&nh, 30.0, &mut rng);

        // Latent 1 day, infectious 5 days; incubation 2 days, symptomatic 4 days.
        assert_eq!(infection.infectious_window(), Some(Window::new(6, Some(11))));
        assert_eq!(infection.symptoms_window(), Some(Window::new(7, Some(11))));
        assert!(!infection.is_infectious(5));
        assert!(infection.is_infectious(6));
        assert!(infection.is_infectious(10));
        assert!(!infection.is_infectious(11));
        assert!(!infection.is_symptomatic(6));
        assert!(infection.is_symptomatic(7));
        assert!(!infection.is_symptomatic(11));
        assert!(!infection.is_recovered(10));
        assert!(infection.is_recovered(11));
    }

    #[test]
    fn ramp_is_continuous_and_unimodal() {
        let config = NaturalHistoryConfig {
            full_infectivity_start: 0.25,
            full_infectivity_end: 0.5,
            infectious: Some(InfectiousConfig::Cdf {
                days_latent: crate::config::DayCdfConfig::Days(vec![0.0, 1.0]),
                days_infectious: crate::config::DayCdfConfig::Offset {
                    first_day: 11,
                    cumulative: vec![1.0],
                },
            }),
            ..point_mass_config()
        };
        let nh = natural_history(&config);
        let mut rng = StdRng::seed_from_u64(42);
        let mut infection = new_infection(0);
        infection.setup(&nh, 30.0, &mut rng);
        // Window [1, 12): total 12, fraction of day d is (d - 1 + 1) / 12 = d / 12.
        assert_eq!(infection.infectious_window(), Some(Window::new(1, Some(12))));
        assert_eq!(infection.get_infectivity(3), 1.0); // x = 0.25
        assert_eq!(infection.get_infectivity(6), 1.0); // x = 0.5
        assert_eq!(infection.get_infectivity(0), 0.0);
        assert_eq!(infection.get_infectivity(12), 0.0);

        let values: Vec<f64> = (1..12).map(|day| infection.get_infectivity(day)).collect();
        let peak = values.iter().position(|v| *v == 1.0).unwrap();
        assert!(values[..=peak].windows(2).all(|pair| pair[0] <= pair[1]));
        assert!(values[peak..].windows(2).all(|pair| pair[0] >= pair[1]));
        assert!(values.iter().all(|v| *v > 0.0 && *v <= 1.0));
    }

    #[test]
    fn ordering_holds_for_random_schedules() {
        let nh = natural_history(&lognormal_config());
        let mut rng = StdRng::seed_from_u64(42);
        for exposure in 0..500 {
            let mut infection = new_infection(exposure);
            infection.setup(&nh, 30.0, &mut rng);
            if let Some(window) = infection.infectious_window() {
                assert!(exposure <= window.start);
                assert!(window.end.is_none_or(|end| window.start <= end));
            }
            if let Some(window) = infection.symptoms_window() {
                assert!(exposure <= window.start);
                assert!(window.end.is_none_or(|end| window.start <= end));
            } else {
                assert!(!infection.will_develop_symptoms());
            }
        }
    }

    #[test]
    fn immunity_end_counts_from_exposure() {
        let nh = natural_history(&point_mass_config());
        let mut infection = new_infection(10);
        infection.apply_schedule(
            &nh,
            &ScheduleDraw {
                will_develop_symptoms: true,
                produces_immunity: true,
                immunity_duration: Some(30),
                symptoms: SymptomsDraw::Days {
                    incubation: 2,
                    duration: 3,
                },
                infectiousness: InfectiousDraw::Days {
                    latent: 1,
                    duration: 3,
                },
            },
        );
        assert_eq!(infection.immunity_end(), Some(40));
    }

    #[test]
    fn case_fatality_latches() {
        let config = NaturalHistoryConfig {
            case_fatality: Some(CaseFatalityConfig {
                min_symptoms: 0.0,
                age_specific_probability: AgeMap::uniform(1.0),
                probability_by_day: vec![0.0, 0.0, 1.0],
            }),
            ..point_mass_config()
        };
        let nh = natural_history(&config);
        let mut rng = StdRng::seed_from_u64(42);
        let mut infection = new_infection(0);
        infection.setup(&nh, 30.0, &mut rng);
        // Symptoms over [2, 6).
        infection.update(&nh, 1, 30.0, 1.0, &mut rng);
        assert!(!infection.is_fatal());
        infection.update(&nh, 3, 30.0, 1.0, &mut rng);
        assert!(!infection.is_fatal());
        infection.update(&nh, 4, 30.0, 1.0, &mut rng);
        assert!(infection.is_fatal());
        infection.update(&nh, 5, 30.0, 1.0, &mut rng);
        assert!(infection.is_fatal());
    }

    #[test]
    fn update_is_a_no_op_without_case_fatality() {
        let nh = natural_history(&point_mass_config());
        let mut rng = StdRng::seed_from_u64(42);
        let mut infection = new_infection(0);
        infection.setup(&nh, 30.0, &mut rng);
        for day in 0..20 {
            infection.update(&nh, day, 30.0, 1.0, &mut rng);
        }
        assert!(!infection.is_fatal());
    }

    #[test]
    fn identity_is_preserved() {
        let infection = new_infection(4);
        assert_eq!(infection.disease(), DiseaseId(0));
        assert_eq!(infection.host(), HostId(1));
        assert_eq!(infection.infector(), Some(HostId(2)));
        assert_eq!(infection.venue(), Some(VenueId(3)));
        assert_eq!(infection.exposure_day(), 4);
        assert!(!infection.is_scheduled());
    }
}
