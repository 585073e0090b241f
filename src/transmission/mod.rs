//! Transmission strategies.
//!
//! Each disease selects one [`TransmissionModel`] at configuration time. Once a day the
//! simulation calls [`TransmissionModel::spread_infection`] for every venue, after the venue's
//! infectious lists have been rebuilt. The strategy decides who gets exposed and hands every
//! exposure to [`expose`], which schedules the new [`Infection`], registers it with the hosts,
//! and updates the epidemic and venue counters.

mod contact;
mod vector;

pub use contact::{ContactTransmission, DensityParams};
pub use vector::VectorTransmission;

use log::trace;
use rand::Rng;

use crate::calendar::{Calendar, Day};
use crate::config::{TransmissionConfig, VectorLayerConfig};
use crate::disease::Disease;
use crate::epidemic::Epidemic;
use crate::error::EpiError;
use crate::host::{HostId, HostPopulation};
use crate::infection::Infection;
use crate::numeric::checked_probability;
use crate::venue::Venue;

/// What a strategy may touch while spreading one disease on one day.
pub struct TransmissionContext<'a, P: HostPopulation + ?Sized> {
    pub day: Day,
    pub calendar: &'a Calendar,
    pub hosts: &'a mut P,
    pub epidemic: &'a mut Epidemic,
}

#[derive(Clone, Debug, PartialEq)]
pub enum TransmissionModel {
    Contact(ContactTransmission),
    Vector(VectorTransmission),
}

impl TransmissionModel {
    pub fn from_config(
        config: &TransmissionConfig,
        vector_layer: Option<&VectorLayerConfig>,
        name: &str,
    ) -> Result<Self, EpiError> {
        match config {
            TransmissionConfig::Contact { density } => Ok(TransmissionModel::Contact(
                ContactTransmission::new(density.as_ref().map(|density| DensityParams {
                    max_infectees: density.max_infectees,
                })),
            )),
            TransmissionConfig::Vector => {
                let params = vector_layer.ok_or_else(|| {
                    EpiError::config(format!(
                        "{name}: vector transmission requires a vector_layer"
                    ))
                })?;
                params.validate()?;
                Ok(TransmissionModel::Vector(VectorTransmission::new(*params)))
            }
        }
    }

    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            TransmissionModel::Contact(_) => "contact",
            TransmissionModel::Vector(_) => "vector",
        }
    }

    pub fn spread_infection<P, R>(
        &self,
        ctx: &mut TransmissionContext<'_, P>,
        disease: &Disease,
        venue: &mut Venue,
        rng: &mut R,
    ) where
        P: HostPopulation + ?Sized,
        R: Rng + ?Sized,
    {
        match self {
            TransmissionModel::Contact(model) => model.spread_infection(ctx, disease, venue, rng),
            TransmissionModel::Vector(model) => model.spread_infection(ctx, disease, venue, rng),
        }
    }
}

/// One transmission attempt from `infector` to `infectee` at `venue`.
///
/// The base probability `prob` is scaled by the infector's hygiene and the disease's seasonality;
/// the infectee's susceptibility by their hygiene and household income. The attempt succeeds
/// when a uniform draw falls below the product. Returns whether `infectee` was infected.
pub fn attempt_transmission<P, R>(
    ctx: &mut TransmissionContext<'_, P>,
    disease: &Disease,
    venue: &mut Venue,
    prob: f64,
    infector: HostId,
    infectee: HostId,
    rng: &mut R,
) -> bool
where
    P: HostPopulation + ?Sized,
    R: Rng + ?Sized,
{
    let id = disease.id();
    let hosts = &*ctx.hosts;
    let transmission = prob
        * hosts.hygiene_transmission_modifier(infector, disease)
        * disease.transmission_seasonality(ctx.calendar.day_of_year(ctx.day));
    let susceptibility = hosts.susceptibility(infectee, id)
        * hosts.hygiene_susceptibility_modifier(infectee, disease)
        * hosts.household_income_susceptibility_modifier(infectee, disease);
    let infection_prob = checked_probability(
        transmission * susceptibility,
        disease.probability_policy(),
        disease.name(),
    );

    let r: f64 = rng.random();
    if r < infection_prob {
        expose(ctx, disease, venue, infectee, Some(infector), rng);
        true
    } else {
        false
    }
}

/// Infects `infectee` at `venue` today: schedules the infection, hands it to the hosts and
/// notifies the epidemic and the venue's counters.
pub fn expose<P, R>(
    ctx: &mut TransmissionContext<'_, P>,
    disease: &Disease,
    venue: &mut Venue,
    infectee: HostId,
    infector: Option<HostId>,
    rng: &mut R,
) where
    P: HostPopulation + ?Sized,
    R: Rng + ?Sized,
{
    let day = ctx.day;
    let mut infection = Infection::new(disease.id(), infectee, infector, Some(venue.id()), day);
    infection.setup(disease.natural_history(), ctx.hosts.real_age(infectee), rng);
    trace!(
        "day {day}: {} {infectee:?} infected by {infector:?} at {:?}",
        disease.name(),
        venue.id()
    );
    ctx.hosts.infect(infection);
    ctx.epidemic.become_exposed(infectee, day);
    venue.counters_mut(disease.id()).record_new_infection(day);
}
