use serde::{Deserialize, Serialize};

use crate::core::particle::{Particle, Species};
use crate::core::vector::Vec3;

/// Live particle count per species, indexed by [`Species::index`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SpeciesCounts(pub [usize; 4]);

impl SpeciesCounts {
    /// Count the live (not removed) particles of each species.
    pub fn tally<'a, I>(particles: I) -> Self
    where
        I: IntoIterator<Item = &'a Particle>,
    {
        let mut counts = [0usize; 4];
        for p in particles.into_iter().filter(|p| !p.is_removed()) {
            counts[p.species().index()] += 1;
        }
        Self(counts)
    }

    #[inline]
    pub fn get(&self, species: Species) -> usize {
        self.0[species.index()]
    }

    pub fn total(&self) -> usize {
        self.0.iter().sum()
    }
}

/// Per-species population history: index 0 is the initial population, then
/// one entry per executed step.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Metadata {
    pub neutron_counts: Vec<usize>,
    pub uranium_counts: Vec<usize>,
    pub barium_counts: Vec<usize>,
    pub krypton_counts: Vec<usize>,
}

impl Metadata {
    pub fn new(initial: SpeciesCounts) -> Self {
        let mut m = Self::default();
        m.push(initial);
        m
    }

    pub fn push(&mut self, counts: SpeciesCounts) {
        self.neutron_counts.push(counts.get(Species::Neutron));
        self.uranium_counts.push(counts.get(Species::Uranium235));
        self.barium_counts.push(counts.get(Species::Barium));
        self.krypton_counts.push(counts.get(Species::Krypton));
    }

    /// Count history of one species.
    pub fn counts(&self, species: Species) -> &[usize] {
        match species {
            Species::Neutron => self.neutron_counts.as_slice(),
            Species::Uranium235 => self.uranium_counts.as_slice(),
            Species::Barium => self.barium_counts.as_slice(),
            Species::Krypton => self.krypton_counts.as_slice(),
        }
    }

    /// Number of recorded entries (executed steps + 1).
    pub fn len(&self) -> usize {
        self.neutron_counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.neutron_counts.is_empty()
    }

    /// Counts recorded at entry `index`.
    pub fn at(&self, index: usize) -> Option<SpeciesCounts> {
        if index >= self.len() {
            return None;
        }
        Some(SpeciesCounts([
            self.neutron_counts[index],
            self.uranium_counts[index],
            self.barium_counts[index],
            self.krypton_counts[index],
        ]))
    }

    pub fn latest(&self) -> Option<SpeciesCounts> {
        self.len().checked_sub(1).and_then(|i| self.at(i))
    }
}

/// Positions of every live particle at one step, grouped by species in
/// population order.
///
/// Fission fragments spawned during the step start one tick ahead of their
/// nucleus and are not reflected until the next step, so they may lie up to
/// one tick's travel outside `[-bound, bound]`. Every other particle is inside
/// the cube.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Snapshot {
    positions: [Vec<Vec3>; 4],
}

impl Snapshot {
    pub fn capture(particles: &[Particle]) -> Self {
        let mut positions: [Vec<Vec3>; 4] = Default::default();
        for p in particles.iter().filter(|p| !p.is_removed()) {
            positions[p.species().index()].push(p.r);
        }
        Self { positions }
    }

    #[inline]
    pub fn get(&self, species: Species) -> &[Vec3] {
        &self.positions[species.index()]
    }

    pub fn counts(&self) -> SpeciesCounts {
        SpeciesCounts([
            self.positions[0].len(),
            self.positions[1].len(),
            self.positions[2].len(),
            self.positions[3].len(),
        ])
    }
}
