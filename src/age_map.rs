use serde::Deserialize;

use crate::error::EpiError;

/// One inclusive age group `[min_age, max_age]` and its value.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct AgeGroup {
    pub min_age: f64,
    pub max_age: f64,
    pub value: f64,
}

/// A piecewise-constant function of age. Ages are matched against the integer part of the
/// host's real age, so a group `[0, 17]` covers everyone younger than 18. Ages outside every
/// group map to 0.0.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(transparent)]
pub struct AgeMap {
    groups: Vec<AgeGroup>,
}

impl AgeMap {
    pub fn new(groups: Vec<AgeGroup>) -> Result<Self, EpiError> {
        let map = AgeMap { groups };
        map.validate("age map")?;
        Ok(map)
    }

    /// A map with a single value for every age.
    #[must_use]
    pub fn uniform(value: f64) -> Self {
        AgeMap {
            groups: vec![AgeGroup {
                min_age: 0.0,
                max_age: f64::MAX,
                value,
            }],
        }
    }

    pub fn validate(&self, name: &str) -> Result<(), EpiError> {
        for group in &self.groups {
            let ordered = group.min_age.is_finite() && group.min_age <= group.max_age;
            if !ordered || group.min_age < 0.0 {
                return Err(EpiError::config(format!(
                    "{name}: invalid age group [{}, {}]",
                    group.min_age, group.max_age
                )));
            }
            if !group.value.is_finite() || group.value < 0.0 {
                return Err(EpiError::config(format!(
                    "{name}: invalid value {} for ages [{}, {}]",
                    group.value, group.min_age, group.max_age
                )));
            }
        }
        Ok(())
    }

    /// Checks that every value is a probability.
    pub fn validate_probabilities(&self, name: &str) -> Result<(), EpiError> {
        self.validate(name)?;
        if let Some(group) = self.groups.iter().find(|group| group.value > 1.0) {
            return Err(EpiError::config(format!(
                "{name}: probability {} for ages [{}, {}] exceeds 1",
                group.value, group.min_age, group.max_age
            )));
        }
        Ok(())
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    #[must_use]
    pub fn find_value(&self, real_age: f64) -> f64 {
        let age = real_age.floor();
        self.groups
            .iter()
            .find(|group| group.min_age <= age && age <= group.max_age)
            .map_or(0.0, |group| group.value)
    }
}
