//! Behavior-based modifiers on transmission and susceptibility.

use crate::config::{HygieneConfig, IncomeSusceptibilityConfig};
use crate::error::EpiError;

/// What a host does on a given day.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct HygieneBehavior {
    pub wears_face_mask: bool,
    pub washes_hands: bool,
}

/// Per-disease efficacies of hygiene behaviors.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Hygiene {
    face_mask: f64,
    hand_washing: f64,
    both: f64,
    hand_washing_susceptibility: f64,
}

impl Hygiene {
    pub fn from_config(config: &HygieneConfig, name: &str) -> Result<Self, EpiError> {
        let efficacies = [
            config.face_mask_transmission_efficacy,
            config.hand_washing_transmission_efficacy,
            config.face_mask_and_hand_washing_transmission_efficacy,
            config.hand_washing_susceptibility_efficacy,
        ];
        if efficacies.iter().any(|e| !(0.0..=1.0).contains(e)) {
            return Err(EpiError::config(format!(
                "{name}: hygiene efficacies must be in [0, 1]"
            )));
        }
        Ok(Hygiene {
            face_mask: config.face_mask_transmission_efficacy,
            hand_washing: config.hand_washing_transmission_efficacy,
            both: config.face_mask_and_hand_washing_transmission_efficacy,
            hand_washing_susceptibility: config.hand_washing_susceptibility_efficacy,
        })
    }

    #[must_use]
    pub fn transmission_modifier(&self, behavior: HygieneBehavior) -> f64 {
        let efficacy = match (behavior.wears_face_mask, behavior.washes_hands) {
            (true, true) => self.both,
            (true, false) => self.face_mask,
            (false, true) => self.hand_washing,
            (false, false) => 0.0,
        };
        1.0 - efficacy
    }

    #[must_use]
    pub fn susceptibility_modifier(&self, behavior: HygieneBehavior) -> f64 {
        if behavior.washes_hands {
            1.0 - self.hand_washing_susceptibility
        } else {
            1.0
        }
    }
}

/// Susceptibility falls linearly with household income from 1.0 at the minimum income to a
/// floor at the high-income threshold.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct IncomeModifier {
    min_income: f64,
    high_income: f64,
    floor: f64,
}

impl IncomeModifier {
    pub fn from_config(config: &IncomeSusceptibilityConfig, name: &str) -> Result<Self, EpiError> {
        let ordered = config.min_income < config.high_income;
        if !ordered {
            return Err(EpiError::config(format!(
                "{name}: income_susceptibility.min_income must be below high_income"
            )));
        }
        if !(0.0..=1.0).contains(&config.floor_modifier) {
            return Err(EpiError::config(format!(
                "{name}: income_susceptibility.floor_modifier must be in [0, 1]"
            )));
        }
        Ok(IncomeModifier {
            min_income: config.min_income,
            high_income: config.high_income,
            floor: config.floor_modifier,
        })
    }

    #[must_use]
    pub fn modifier(&self, income: f64) -> f64 {
        if income >= self.high_income {
            return self.floor;
        }
        let income = income.max(self.min_income);
        let slope = (1.0 - self.floor) / (self.min_income - self.high_income);
        slope * (income - self.min_income) + 1.0
    }
}
