//! The transmission core of an agent-based epidemic model.
//!
//! Hosts meet in venues (households, schools, workplaces, neighborhoods and so on). Every day,
//! each venue rebuilds the list of its members who are infectious for each disease, and the
//! disease's transmission strategy decides who gets exposed there. Exposure schedules a new
//! infection from the disease's natural history, which fixes when the host becomes infectious,
//! develops symptoms, recovers or dies.
//!
//! The main pieces are:
//! * [`natural_history`]: per-disease schedule distributions, infectivity and symptom ramps,
//!   immunity and case fatality.
//! * [`infection`]: one host's infection with its dates and daily intensity queries.
//! * [`venue`]: rosters, closures, infectious lists, day-scoped counters, the contact model and
//!   vector populations.
//! * [`transmission`]: pairwise, density-dependent, default and vector-borne strategies.
//! * [`simulation`]: the day loop tying hosts, venues, diseases and random streams together.
//!
//! A run is fully determined by its configuration and seed: every random draw comes from a
//! [`random::RandomStreams`] stream keyed by day, disease and venue.
pub mod age_map;
pub mod calendar;
pub mod config;
pub mod counters;
pub mod disease;
pub mod epidemic;
pub mod error;
pub mod hashing;
pub mod host;
pub mod hygiene;
pub mod infection;
pub mod log;
pub mod natural_history;
pub mod numeric;
pub mod population;
pub mod prelude;
pub mod random;
pub mod seasonality;
pub mod simulation;
pub mod transmission;
pub mod venue;

// Re-exported for use in macros and by simulations that define their own random streams.
pub use rand;
