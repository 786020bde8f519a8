use std::fmt;

use serde::{Deserialize, Serialize};

use crate::config::SpeciesTable;
use crate::core::vector::{Vec3, DIM};
use crate::error::{Error, Result};

/// The four particle species of the chain reaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Species {
    Neutron,
    #[serde(rename = "uranium_235")]
    Uranium235,
    Barium,
    Krypton,
}

impl Species {
    /// All species in their canonical (index) order.
    pub const ALL: [Species; 4] = [
        Species::Neutron,
        Species::Uranium235,
        Species::Barium,
        Species::Krypton,
    ];

    /// Dense index in `0..4`, matching [`Species::ALL`].
    #[inline]
    pub fn index(self) -> usize {
        match self {
            Species::Neutron => 0,
            Species::Uranium235 => 1,
            Species::Barium => 2,
            Species::Krypton => 3,
        }
    }

    /// Stable lowercase name used as a key in cached runs.
    pub fn name(self) -> &'static str {
        match self {
            Species::Neutron => "neutron",
            Species::Uranium235 => "uranium_235",
            Species::Barium => "barium",
            Species::Krypton => "krypton",
        }
    }
}

impl fmt::Display for Species {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Stable particle handle, issued by the simulation and never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ParticleId(pub u64);

/// Interaction gate of a particle.
///
/// `Ticking(0.0)` means ready. `Removed` marks a uranium nucleus consumed by
/// fission: it takes part in nothing further and leaves the population at the
/// end of the step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Cooldown {
    Ticking(f64),
    Removed,
}

impl Cooldown {
    pub const READY: Cooldown = Cooldown::Ticking(0.0);

    #[inline]
    pub fn is_removed(&self) -> bool {
        matches!(self, Cooldown::Removed)
    }

    #[inline]
    pub fn is_ready(&self) -> bool {
        matches!(self, Cooldown::Ticking(c) if *c == 0.0)
    }
}

/// A particle of the fission chain.
///
/// Fields:
/// - `id`: stable handle
/// - `species`: fixed at creation
/// - `r`: position vector [x, y, z]
/// - `v`: velocity vector [vx, vy, vz]
/// - `mass`, `radius`: looked up from the species table at creation
/// - `cooldown`: interaction gate (see [`Cooldown`])
#[derive(Debug, Clone)]
pub struct Particle {
    pub id: ParticleId,
    species: Species,
    /// Position (x, y, z).
    pub r: Vec3,
    /// Velocity (vx, vy, vz).
    pub v: Vec3,
    mass: f64,
    radius: f64,
    pub cooldown: Cooldown,
}

impl Particle {
    /// Create a ready particle whose mass and radius come from `table`.
    ///
    /// Errors:
    /// - `Error::InvalidParam` if the species' mass or radius is non-positive,
    ///   or any position/velocity component is NaN/inf.
    pub fn new(
        id: ParticleId,
        species: Species,
        r: Vec3,
        v: Vec3,
        table: &SpeciesTable,
    ) -> Result<Self> {
        let props = table.get(species);
        if !props.radius.is_finite() || props.radius <= 0.0 {
            return Err(Error::InvalidParam("radius must be finite and > 0".into()));
        }
        if !props.mass.is_finite() || props.mass <= 0.0 {
            return Err(Error::InvalidParam("mass must be finite and > 0".into()));
        }
        if !r.iter().all(|x| x.is_finite()) {
            return Err(Error::InvalidParam("position must be finite".into()));
        }
        if !v.iter().all(|x| x.is_finite()) {
            return Err(Error::InvalidParam("velocity must be finite".into()));
        }
        Ok(Self {
            id,
            species,
            r,
            v,
            mass: props.mass,
            radius: props.radius,
            cooldown: Cooldown::READY,
        })
    }

    #[inline]
    pub fn species(&self) -> Species {
        self.species
    }

    #[inline]
    pub fn mass(&self) -> f64 {
        self.mass
    }

    #[inline]
    pub fn radius(&self) -> f64 {
        self.radius
    }

    #[inline]
    pub fn is_removed(&self) -> bool {
        self.cooldown.is_removed()
    }

    /// Drift by `dt` and run the cooldown timer down, never below zero.
    pub fn advance(&mut self, dt: f64) {
        for (r_k, v_k) in self.r.iter_mut().zip(self.v.iter()) {
            *r_k += v_k * dt;
        }
        if let Cooldown::Ticking(c) = self.cooldown {
            if c > 0.0 {
                self.cooldown = Cooldown::Ticking((c - dt).max(0.0));
            }
        }
    }

    /// Clamp into `[-bound, bound]` on every axis, negating the velocity
    /// component of each wall that was crossed.
    pub fn reflect(&mut self, bound: f64) {
        for k in 0..DIM {
            if self.r[k] > bound {
                self.r[k] = bound;
                self.v[k] = -self.v[k];
            } else if self.r[k] < -bound {
                self.r[k] = -bound;
                self.v[k] = -self.v[k];
            }
        }
    }

    /// One-dimensional elastic exchange applied to the full velocity vectors:
    ///
    /// `v1' = (m1-m2)/(m1+m2) v1 + 2 m2/(m1+m2) v2`
    /// `v2' = 2 m1/(m1+m2) v1 + (m2-m1)/(m1+m2) v2`
    ///
    /// Both particles are then put on `cooldown`.
    pub fn resolve_elastic(&mut self, other: &mut Particle, cooldown: f64) {
        let (m1, m2) = (self.mass, other.mass);
        let total = m1 + m2;
        let (v1, v2) = (self.v, other.v);
        for k in 0..DIM {
            self.v[k] = (m1 - m2) / total * v1[k] + 2.0 * m2 / total * v2[k];
            other.v[k] = 2.0 * m1 / total * v1[k] + (m2 - m1) / total * v2[k];
        }
        self.cooldown = Cooldown::Ticking(cooldown);
        other.cooldown = Cooldown::Ticking(cooldown);
    }

    /// Momentum m * v.
    #[inline]
    pub fn momentum(&self) -> Vec3 {
        [
            self.mass * self.v[0],
            self.mass * self.v[1],
            self.mass * self.v[2],
        ]
    }
}
