//! Population-level bookkeeping of one disease: who was exposed and who died, today and in total.

use crate::calendar::Day;
use crate::counters::DailyCount;
use crate::disease::DiseaseId;
use crate::host::HostId;

#[derive(Clone, Debug)]
pub struct Epidemic {
    disease: DiseaseId,
    exposed: DailyCount,
    total_exposed: usize,
    case_fatalities: DailyCount,
    total_case_fatalities: usize,
    infectees_day: Option<Day>,
    infectees: Vec<HostId>,
}

impl Epidemic {
    #[must_use]
    pub fn new(disease: DiseaseId) -> Self {
        Epidemic {
            disease,
            exposed: DailyCount::default(),
            total_exposed: 0,
            case_fatalities: DailyCount::default(),
            total_case_fatalities: 0,
            infectees_day: None,
            infectees: Vec::new(),
        }
    }

    #[must_use]
    pub fn disease(&self) -> DiseaseId {
        self.disease
    }

    /// Notes a new exposure of `host` on `day`.
    pub fn become_exposed(&mut self, host: HostId, day: Day) {
        self.exposed.increment(day);
        self.total_exposed += 1;
        if self.infectees_day != Some(day) {
            self.infectees_day = Some(day);
            self.infectees.clear();
        }
        self.infectees.push(host);
    }

    pub fn record_case_fatality(&mut self, day: Day) {
        self.case_fatalities.increment(day);
        self.total_case_fatalities += 1;
    }

    #[must_use]
    pub fn exposed(&self, day: Day) -> usize {
        self.exposed.get(day)
    }

    #[must_use]
    pub fn total_exposed(&self) -> usize {
        self.total_exposed
    }

    #[must_use]
    pub fn case_fatalities(&self, day: Day) -> usize {
        self.case_fatalities.get(day)
    }

    #[must_use]
    pub fn total_case_fatalities(&self) -> usize {
        self.total_case_fatalities
    }

    /// Hosts exposed on `day`, in the order they were infected.
    #[must_use]
    pub fn infectees(&self, day: Day) -> &[HostId] {
        if self.infectees_day == Some(day) {
            &self.infectees
        } else {
            &[]
        }
    }
}
