//! Simulation core: particle model, interaction detection, reaction
//! resolution and the step driver.

pub mod interaction;
pub mod particle;
pub mod reaction;
pub mod record;
pub mod sim;
pub mod vector;

pub use particle::{Cooldown, Particle, ParticleId, Species};
pub use reaction::{Fission, Reaction, Spawn};
pub use record::{Metadata, Snapshot, SpeciesCounts};
pub use sim::{RunOutput, Simulation, Termination};
pub use vector::{Vec3, DIM};
