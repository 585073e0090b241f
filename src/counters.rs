//! Day-scoped tallies that reset themselves.
//!
//! A [`DailyCount`] remembers the day it was last written. Reading it on any other day yields
//! zero and the first write on a later day starts over from zero, so nobody has to sweep every
//! venue and disease at midnight. Running totals live next to the daily counts and never reset.

use crate::calendar::Day;

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct DailyCount {
    day: Option<Day>,
    count: usize,
}

impl DailyCount {
    #[must_use]
    pub const fn new() -> Self {
        DailyCount {
            day: None,
            count: 0,
        }
    }

    pub fn add(&mut self, day: Day, n: usize) {
        if self.day != Some(day) {
            debug_assert!(
                self.day.is_none_or(|last| day > last),
                "count for day {day} written after day {:?}",
                self.day
            );
            self.day = Some(day);
            self.count = 0;
        }
        self.count += n;
    }

    pub fn increment(&mut self, day: Day) {
        self.add(day, 1);
    }

    #[must_use]
    pub fn get(&self, day: Day) -> usize {
        if self.day == Some(day) {
            self.count
        } else {
            0
        }
    }

    /// The last day this count was written, if ever.
    #[must_use]
    pub fn last_update(&self) -> Option<Day> {
        self.day
    }
}

/// Infection tallies of one disease at one venue.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct InfectionCounters {
    new_infections: DailyCount,
    current_infections: DailyCount,
    new_symptomatic: DailyCount,
    current_symptomatic: DailyCount,
    case_fatalities: DailyCount,
    total_infections: usize,
    total_symptomatic: usize,
    total_case_fatalities: usize,
}

impl InfectionCounters {
    #[must_use]
    pub const fn new() -> Self {
        InfectionCounters {
            new_infections: DailyCount::new(),
            current_infections: DailyCount::new(),
            new_symptomatic: DailyCount::new(),
            current_symptomatic: DailyCount::new(),
            case_fatalities: DailyCount::new(),
            total_infections: 0,
            total_symptomatic: 0,
            total_case_fatalities: 0,
        }
    }

    /// Someone was infected here today.
    pub fn record_new_infection(&mut self, day: Day) {
        self.new_infections.increment(day);
        self.total_infections += 1;
    }

    /// An infected member was present today.
    pub fn record_current_infection(&mut self, day: Day) {
        self.current_infections.increment(day);
    }

    /// A member's symptoms started today.
    pub fn record_new_symptomatic(&mut self, day: Day) {
        self.new_symptomatic.increment(day);
        self.total_symptomatic += 1;
    }

    pub fn record_current_symptomatic(&mut self, day: Day) {
        self.current_symptomatic.increment(day);
    }

    pub fn record_case_fatality(&mut self, day: Day) {
        self.case_fatalities.increment(day);
        self.total_case_fatalities += 1;
    }

    #[must_use]
    pub fn new_infections(&self, day: Day) -> usize {
        self.new_infections.get(day)
    }

    #[must_use]
    pub fn current_infections(&self, day: Day) -> usize {
        self.current_infections.get(day)
    }

    #[must_use]
    pub fn new_symptomatic(&self, day: Day) -> usize {
        self.new_symptomatic.get(day)
    }

    #[must_use]
    pub fn current_symptomatic(&self, day: Day) -> usize {
        self.current_symptomatic.get(day)
    }

    #[must_use]
    pub fn case_fatalities(&self, day: Day) -> usize {
        self.case_fatalities.get(day)
    }

    #[must_use]
    pub fn total_infections(&self) -> usize {
        self.total_infections
    }

    #[must_use]
    pub fn total_symptomatic(&self) -> usize {
        self.total_symptomatic
    }

    #[must_use]
    pub fn total_case_fatalities(&self) -> usize {
        self.total_case_fatalities
    }
}
