//! Simulation days and their mapping onto the calendar.

use serde::Deserialize;

use crate::error::EpiError;

/// A simulation day. Day 0 is the first simulated day.
pub type Day = i32;

/// Maps simulation days to day-of-year and day-of-week.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct Calendar {
    /// Day of year (1..=366) of simulation day 0.
    #[serde(default = "default_start_day_of_year")]
    pub start_day_of_year: u16,
    /// Day of week of simulation day 0, 0 = Sunday.
    #[serde(default)]
    pub start_day_of_week: u8,
}

fn default_start_day_of_year() -> u16 {
    1
}

impl Default for Calendar {
    fn default() -> Self {
        Calendar {
            start_day_of_year: default_start_day_of_year(),
            start_day_of_week: 0,
        }
    }
}

impl Calendar {
    pub fn new(start_day_of_year: u16, start_day_of_week: u8) -> Result<Self, EpiError> {
        let calendar = Calendar {
            start_day_of_year,
            start_day_of_week,
        };
        calendar.validate()?;
        Ok(calendar)
    }

    pub fn validate(&self) -> Result<(), EpiError> {
        if !(1..=366).contains(&self.start_day_of_year) {
            return Err(EpiError::config(format!(
                "start_day_of_year must be in 1..=366, got {}",
                self.start_day_of_year
            )));
        }
        if self.start_day_of_week > 6 {
            return Err(EpiError::config(format!(
                "start_day_of_week must be in 0..=6, got {}",
                self.start_day_of_week
            )));
        }
        Ok(())
    }

    /// Day of year in 1..=365. Leap days are not modelled.
    #[must_use]
    pub fn day_of_year(&self, day: Day) -> u16 {
        let offset = i64::from(self.start_day_of_year) - 1 + i64::from(day);
        (offset.rem_euclid(365) + 1) as u16
    }

    /// Day of week, 0 = Sunday.
    #[must_use]
    pub fn day_of_week(&self, day: Day) -> u8 {
        (i64::from(self.start_day_of_week) + i64::from(day)).rem_euclid(7) as u8
    }

    #[must_use]
    pub fn is_weekend(&self, day: Day) -> bool {
        matches!(self.day_of_week(day), 0 | 6)
    }
}
