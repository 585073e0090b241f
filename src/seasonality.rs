use std::f64::consts::PI;

use crate::config::SeasonalityConfig;
use crate::error::EpiError;

/// Cosine seasonality by day of year: `(1 - R) + R * 0.5 * (1 + cos(|peak - d| * 2 pi / 365))`,
/// clamped at zero. The multiplier is 1.0 on the peak day and `1 - R` half a year away.
#[derive(Clone, Debug, PartialEq)]
pub struct SeasonalityTable {
    /// Indexed by day of year; entry 0 is unused.
    multipliers: Vec<f64>,
}

impl SeasonalityTable {
    pub fn from_config(config: &SeasonalityConfig, name: &str) -> Result<Self, EpiError> {
        if !(0.0..=1.0).contains(&config.reduction) {
            return Err(EpiError::config(format!(
                "{name}: seasonality reduction must be in [0, 1], got {}",
                config.reduction
            )));
        }
        if !(1..=366).contains(&config.peak_day) {
            return Err(EpiError::config(format!(
                "{name}: seasonality peak_day must be in 1..=366, got {}",
                config.peak_day
            )));
        }
        let reduction = config.reduction;
        let peak = f64::from(config.peak_day);
        let multipliers = (0..=366u16)
            .map(|day| {
                let distance = (peak - f64::from(day)).abs();
                let value = (1.0 - reduction)
                    + reduction * 0.5 * (1.0 + (distance * 2.0 * PI / 365.0).cos());
                value.max(0.0)
            })
            .collect();
        Ok(SeasonalityTable { multipliers })
    }

    /// Multiplier for a day of year in 1..=366. Out-of-range days wrap onto the table.
    #[must_use]
    pub fn multiplier(&self, day_of_year: u16) -> f64 {
        let index = usize::from((day_of_year.max(1) - 1) % 366 + 1);
        self.multipliers[index]
    }
}
