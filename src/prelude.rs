pub use crate::calendar::{Calendar, Day};
pub use crate::config::{load_config, SimulationConfig};
pub use crate::define_rng;
pub use crate::disease::{Disease, DiseaseId};
pub use crate::epidemic::Epidemic;
pub use crate::error::EpiError;
pub use crate::host::{HostId, HostPopulation};
pub use crate::infection::Infection;
pub use crate::log::{debug, error, info, trace, warn};
pub use crate::population::{Person, Population};
pub use crate::random::RandomStreams;
pub use crate::simulation::Simulation;
pub use crate::transmission::{TransmissionContext, TransmissionModel};
pub use crate::venue::{Venue, VenueId, VenueKind};
