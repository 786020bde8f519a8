//! Outcome of a detected collision: elastic exchange or uranium fission.

use log::debug;
use rand::Rng;

use crate::config::{CrossSection, SimulationConfig};
use crate::core::particle::{Cooldown, Particle, ParticleId, Species};
use crate::core::vector::{
    add, fission_axis, norm, random_unit_vector, scale, soft_blend, sub, Vec3,
};

/// Energy conversion constant in the cross-section fit.
pub const ENERGY_CONSTANT: f64 = 5.22e-2;

/// A particle created by a reaction; the step driver assigns its id.
#[derive(Debug, Clone, PartialEq)]
pub struct Spawn {
    pub species: Species,
    pub r: Vec3,
    pub v: Vec3,
}

/// Products of one fission event.
#[derive(Debug, Clone, PartialEq)]
pub struct Fission {
    /// New neutrons first, then one barium, then one krypton.
    pub spawned: Vec<Spawn>,
    /// The consumed uranium nucleus.
    pub removed: ParticleId,
}

impl Fission {
    /// Number of neutrons released (2 or 3).
    pub fn neutrons_released(&self) -> usize {
        self.spawned
            .iter()
            .filter(|s| s.species == Species::Neutron)
            .count()
    }
}

/// What [`resolve`] did to the pair.
#[derive(Debug, Clone, PartialEq)]
pub enum Reaction {
    /// Velocities exchanged; population unchanged.
    Elastic,
    Fission(Fission),
}

/// Empirical fission probability for a neutron hitting a nucleus at relative speed `v_rel`:
/// `(sigma_0 / sigma_thermal) * (K * v_rel^2 / e_0)^(-alpha)`, clamped to [0, 1].
///
/// Zero relative speed yields 0.
pub fn fission_probability(v_rel: f64, cs: &CrossSection) -> f64 {
    if v_rel.is_nan() || v_rel <= 0.0 {
        return 0.0;
    }
    let energy_ratio = ENERGY_CONSTANT * v_rel * v_rel / cs.e_0;
    let p = (cs.sigma_0 / cs.sigma_thermal) * energy_ratio.powf(-cs.alpha);
    if p.is_nan() {
        return 0.0;
    }
    p.clamp(0.0, 1.0)
}

/// True for a neutron/uranium-235 pair in either order.
#[inline]
pub fn is_fission_pair(a: &Particle, b: &Particle) -> bool {
    matches!(
        (a.species(), b.species()),
        (Species::Neutron, Species::Uranium235) | (Species::Uranium235, Species::Neutron)
    )
}

/// Resolve an eligible, colliding pair.
///
/// Non neutron/uranium pairs always collide elastically. A neutron/uranium
/// pair fissions with the configured override probability, or the
/// cross-section formula when no override is set; otherwise it collides
/// elastically. On fission the uranium is flagged [`Cooldown::Removed`] at
/// once, and the neutron is left untouched.
pub fn resolve<R: Rng + ?Sized>(
    a: &mut Particle,
    b: &mut Particle,
    config: &SimulationConfig,
    rng: &mut R,
) -> Reaction {
    if !is_fission_pair(a, b) {
        a.resolve_elastic(b, config.interaction_cooldown_max);
        return Reaction::Elastic;
    }

    let (uranium, neutron) = if a.species() == Species::Uranium235 {
        (a, b)
    } else {
        (b, a)
    };

    let p = match config.fission_prob_hardcoded_parameter {
        Some(p) => p,
        None => fission_probability(norm(&sub(&uranium.v, &neutron.v)), &config.cross_section),
    };
    let draw: f64 = rng.random();
    if draw >= p {
        uranium.resolve_elastic(neutron, config.interaction_cooldown_max);
        return Reaction::Elastic;
    }

    let fission = split(uranium, neutron, config, rng);
    uranium.cooldown = Cooldown::Removed;
    debug!(
        "fission of {:?} by {:?}: {} neutrons released",
        uranium.id,
        neutron.id,
        fission.neutrons_released()
    );
    Reaction::Fission(fission)
}

/// Build the fission products of `uranium` struck by `neutron`.
fn split<R: Rng + ?Sized>(
    uranium: &Particle,
    neutron: &Particle,
    config: &SimulationConfig,
    rng: &mut R,
) -> Fission {
    let n_neutrons = if rng.random_bool(0.5) { 3 } else { 2 };
    let axis = fission_axis(&uranium.v, &neutron.v, rng);
    let tick = config.simulation_tick;

    let mut spawned = Vec::with_capacity(n_neutrons + 2);
    let mut emit = |species: Species, direction: Vec3, speed: f64| {
        let v = scale(&direction, speed);
        // One tick ahead so the fragment does not re-collide with its origin.
        let r = add(&uranium.r, &scale(&v, tick));
        spawned.push(Spawn { species, r, v });
    };

    for _ in 0..n_neutrons {
        let noise = random_unit_vector(rng);
        emit(
            Species::Neutron,
            soft_blend(&axis, &noise),
            config.neutron_speed_magnitude,
        );
    }

    let reverse = scale(&axis, -1.0);
    let barium_noise = random_unit_vector(rng);
    emit(
        Species::Barium,
        soft_blend(&reverse, &barium_noise),
        config.product_speed_magnitude,
    );
    let krypton_noise = random_unit_vector(rng);
    emit(
        Species::Krypton,
        soft_blend(&axis, &krypton_noise),
        config.product_speed_magnitude,
    );

    Fission {
        spawned,
        removed: uranium.id,
    }
}
