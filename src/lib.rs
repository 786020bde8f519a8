//! Monte-Carlo simulation of a neutron-induced U-235 fission chain.
//!
//! Neutrons, uranium-235, barium and krypton move in discrete ticks inside a
//! reflective cube. Touching pairs either exchange velocity elastically or,
//! for a neutron/uranium pair, fission: the nucleus is replaced by one barium,
//! one krypton and two or three fresh neutrons.
//!
//! ```no_run
//! use fissionsim::{Simulation, SimulationConfig};
//!
//! let mut sim = Simulation::new(SimulationConfig::default(), Some(7))?;
//! let run = sim.run()?;
//! println!("{} steps, ended by {:?}", run.snapshots.len(), run.termination);
//! # Ok::<(), fissionsim::error::Error>(())
//! ```

pub mod cache;
pub mod config;
pub mod core;
pub mod error;

#[cfg(feature = "python")]
mod python;

pub use crate::config::{CrossSection, SimulationConfig, SpeciesProperties, SpeciesTable};
pub use crate::core::{
    Metadata, Particle, ParticleId, RunOutput, Simulation, Snapshot, Species, SpeciesCounts,
    Termination,
};
