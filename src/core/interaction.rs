//! Pairwise interaction detection.
//!
//! Both tests are pure; the step driver calls [`eligible`] before
//! [`collides`] and never hands the same particle in twice.

use crate::core::particle::{Cooldown, Particle};
use crate::core::vector::{dot, sub};

/// Whether `a` and `b` may interact right now.
///
/// False if either has been consumed. Otherwise true when `a` is ready, or
/// when the two cooldowns differ. Equal non-zero cooldowns are taken to mean
/// the pair has just interacted with each other.
#[inline]
pub fn eligible(a: &Particle, b: &Particle) -> bool {
    if a.is_removed() || b.is_removed() {
        return false;
    }
    a.cooldown == Cooldown::READY || a.cooldown != b.cooldown
}

/// Whether the (scaled) spheres of `a` and `b` touch or overlap.
///
/// `|r_a - r_b|^2 <= ((radius_a + radius_b) * radius_scale)^2`
#[inline]
pub fn collides(a: &Particle, b: &Particle, radius_scale: f64) -> bool {
    let d = sub(&a.r, &b.r);
    let reach = (a.radius() + b.radius()) * radius_scale;
    dot(&d, &d) <= reach * reach
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SpeciesTable;
    use crate::core::particle::{ParticleId, Species};
    use crate::error::Result;

    fn pair(ra: [f64; 3], rb: [f64; 3]) -> Result<(Particle, Particle)> {
        let t = SpeciesTable::default();
        Ok((
            Particle::new(ParticleId(0), Species::Neutron, ra, [0.0; 3], &t)?,
            Particle::new(ParticleId(1), Species::Uranium235, rb, [0.0; 3], &t)?,
        ))
    }

    #[test]
    fn ready_particles_are_eligible() -> Result<()> {
        let (a, b) = pair([0.0; 3], [0.0; 3])?;
        assert!(eligible(&a, &b));
        Ok(())
    }

    #[test]
    fn removed_particles_are_never_eligible() -> Result<()> {
        let (mut a, mut b) = pair([0.0; 3], [0.0; 3])?;
        b.cooldown = Cooldown::Removed;
        assert!(!eligible(&a, &b));
        assert!(!eligible(&b, &a));
        b.cooldown = Cooldown::READY;
        a.cooldown = Cooldown::Removed;
        assert!(!eligible(&a, &b));
        Ok(())
    }

    #[test]
    fn shared_cooldown_blocks_until_first_is_ready() -> Result<()> {
        let (mut a, mut b) = pair([0.0; 3], [0.0; 3])?;
        a.cooldown = Cooldown::Ticking(0.5);
        b.cooldown = Cooldown::Ticking(0.5);
        assert!(!eligible(&a, &b));

        b.cooldown = Cooldown::Ticking(0.2);
        assert!(eligible(&a, &b));

        // Only the first particle's readiness is consulted.
        a.cooldown = Cooldown::Ticking(0.5);
        b.cooldown = Cooldown::READY;
        assert!(eligible(&a, &b));
        Ok(())
    }

    #[test]
    fn collision_uses_scaled_radii() -> Result<()> {
        let t = SpeciesTable::default();
        let reach = (t.neutron.radius + t.uranium_235.radius) * 1e10;
        let (a, b) = pair([0.0; 3], [reach, 0.0, 0.0])?;
        assert!(collides(&a, &b, 1e10));
        assert!(!collides(&a, &b, 0.99e10));

        let (a, b) = pair([0.0; 3], [reach * 1.01, 0.0, 0.0])?;
        assert!(!collides(&a, &b, 1e10));
        Ok(())
    }
}
