use std::collections::HashSet;

use log::{debug, info, trace};
use rand::{rng, rngs::StdRng, Rng, SeedableRng};

use crate::config::SimulationConfig;
use crate::core::interaction::{collides, eligible};
use crate::core::particle::{Particle, ParticleId, Species};
use crate::core::reaction::{resolve, Reaction};
use crate::core::record::{Metadata, Snapshot, SpeciesCounts};
use crate::core::vector::{random_unit_vector, scale, Vec3};
use crate::error::{Error, Result};

/// Initial particles are placed inside this fraction of the half-width.
const PLACEMENT_FRACTION: f64 = 0.9;

/// Why a run stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
    /// All configured steps were executed.
    StepBudget,
    /// Live uranium fell to or below the threshold fraction of the initial uranium.
    Depleted,
}

/// Everything a run produced.
#[derive(Debug, Clone)]
pub struct RunOutput {
    /// One snapshot per step executed by the run (the initial state is not included).
    pub snapshots: Vec<Snapshot>,
    /// Full count history, one entry longer than the number of executed steps.
    pub metadata: Metadata,
    pub termination: Termination,
}

/// Discrete-time fission chain in the cube `[-bound, bound]^3` with reflective walls.
///
/// The simulation owns the population. Each [`Simulation::step`] drifts every
/// particle, reflects it at the walls, scans every unordered pair once and
/// resolves colliding pairs. Particles created or consumed by fission are
/// added or dropped only after the scan, so pair indices stay stable while it
/// runs; a consumed uranium is flagged immediately and skipped by later pairs.
#[derive(Debug)]
pub struct Simulation {
    config: SimulationConfig,
    particles: Vec<Particle>,
    metadata: Metadata,
    rng: StdRng,
    next_id: u64,
    steps_executed: usize,
    termination: Option<Termination>,
}

impl Simulation {
    /// Create a simulation with `neutrons_start` neutrons and `uranium_start`
    /// uranium nuclei placed uniformly in the inner 90% of the box.
    ///
    /// Neutron speeds are uniform in `[neutron_init_speed, 1.5 * neutron_init_speed]`,
    /// uranium speeds in `[0, uranium_init_speed_max]`, all with isotropic directions.
    /// `seed` makes the whole run reproducible; `None` seeds from the thread RNG.
    pub fn new(config: SimulationConfig, seed: Option<u64>) -> Result<Self> {
        config.validate()?;

        let mut rng: StdRng = match seed {
            Some(s) => SeedableRng::seed_from_u64(s),
            None => SeedableRng::seed_from_u64(rng().random()),
        };

        let extent = PLACEMENT_FRACTION * config.bounding_parameter;
        let mut placements: Vec<(Species, Vec3, Vec3)> =
            Vec::with_capacity(config.neutrons_start + config.uranium_start);
        for _ in 0..config.neutrons_start {
            let speed = config.neutron_init_speed * rng.random_range(1.0..=1.5);
            let v = scale(&random_unit_vector(&mut rng), speed);
            let r = random_position(&mut rng, extent);
            placements.push((Species::Neutron, r, v));
        }
        for _ in 0..config.uranium_start {
            let speed = rng.random_range(0.0..=config.uranium_init_speed_max);
            let v = scale(&random_unit_vector(&mut rng), speed);
            let r = random_position(&mut rng, extent);
            placements.push((Species::Uranium235, r, v));
        }

        Self::assemble(config, placements, rng)
    }

    /// Create a simulation from an explicit initial population of
    /// `(species, position, velocity)` triples, e.g. for scripted scenarios.
    ///
    /// `neutrons_start`/`uranium_start` of `config` are ignored; the initial
    /// counts come from `placements`.
    pub fn from_particles<I>(
        config: SimulationConfig,
        placements: I,
        seed: Option<u64>,
    ) -> Result<Self>
    where
        I: IntoIterator<Item = (Species, Vec3, Vec3)>,
    {
        config.validate()?;
        let rng: StdRng = match seed {
            Some(s) => SeedableRng::seed_from_u64(s),
            None => SeedableRng::seed_from_u64(rng().random()),
        };
        Self::assemble(config, placements, rng)
    }

    fn assemble<I>(config: SimulationConfig, placements: I, rng: StdRng) -> Result<Self>
    where
        I: IntoIterator<Item = (Species, Vec3, Vec3)>,
    {
        let mut sim = Self {
            config,
            particles: Vec::new(),
            metadata: Metadata::default(),
            rng,
            next_id: 0,
            steps_executed: 0,
            termination: None,
        };
        for (species, r, v) in placements {
            sim.add_particle(species, r, v)?;
        }
        let initial = SpeciesCounts::tally(&sim.particles);
        sim.metadata = Metadata::new(initial);
        debug!(
            "initialized simulation: {} neutrons, {} uranium, bound {}",
            initial.get(Species::Neutron),
            initial.get(Species::Uranium235),
            sim.config.bounding_parameter
        );
        Ok(sim)
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// The live population, in insertion order.
    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn num_particles(&self) -> usize {
        self.particles.len()
    }

    /// Count history so far.
    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    /// Live per-species counts right now.
    pub fn counts(&self) -> SpeciesCounts {
        SpeciesCounts::tally(&self.particles)
    }

    pub fn steps_executed(&self) -> usize {
        self.steps_executed
    }

    /// How the run loop ended, if it has.
    pub fn termination(&self) -> Option<Termination> {
        self.termination
    }

    /// Positions of the live population grouped by species.
    pub fn snapshot(&self) -> Snapshot {
        Snapshot::capture(&self.particles)
    }

    /// Execute one step and record its counts.
    ///
    /// Errors only if a fission product would be created with a non-finite
    /// position or velocity, which a validated configuration rules out.
    pub fn step(&mut self) -> Result<SpeciesCounts> {
        let tick = self.config.simulation_tick;
        let bound = self.config.bounding_parameter;
        for p in &mut self.particles {
            p.advance(tick);
            p.reflect(bound);
        }

        let (spawned, removed) = self.scan_pairs();

        let n_fissions = removed.len();
        for (species, r, v) in spawned {
            self.add_particle(species, r, v)?;
        }
        if !removed.is_empty() {
            let removed: HashSet<ParticleId> = removed.into_iter().collect();
            self.particles.retain(|p| !removed.contains(&p.id));
        }

        let counts = SpeciesCounts::tally(&self.particles);
        self.metadata.push(counts);
        self.steps_executed += 1;
        trace!(
            "step {}: {} fissions, counts n={} u={} ba={} kr={}",
            self.steps_executed,
            n_fissions,
            counts.get(Species::Neutron),
            counts.get(Species::Uranium235),
            counts.get(Species::Barium),
            counts.get(Species::Krypton)
        );
        Ok(counts)
    }

    /// Run until the step budget is spent or live uranium drops to
    /// `threshold_factor` times the initial uranium count.
    ///
    /// Depletion is a normal outcome; the snapshots and metadata gathered up
    /// to that step are returned either way. The run must start from the
    /// initial state, so that there is one snapshot per executed step and one
    /// more metadata entry than snapshots; a finished simulation cannot be run again.
    ///
    /// Errors:
    /// - `Error::InvalidParam` if `threshold_factor` is outside [0, 1], the
    ///   run loop already finished, or [`Simulation::step`] was called first.
    pub fn simulate(&mut self, threshold_factor: f64) -> Result<RunOutput> {
        if !(0.0..=1.0).contains(&threshold_factor) {
            return Err(Error::InvalidParam(
                "threshold_factor must lie in [0, 1]".into(),
            ));
        }
        if self.termination.is_some() {
            return Err(Error::InvalidParam("simulation already finished".into()));
        }
        if self.steps_executed > 0 {
            return Err(Error::InvalidParam(format!(
                "simulate must start from the initial state, but {} steps were already executed",
                self.steps_executed
            )));
        }

        let initial_uranium = self
            .metadata
            .counts(Species::Uranium235)
            .first()
            .copied()
            .unwrap_or(0) as f64;
        let limit = threshold_factor * initial_uranium;
        let mut snapshots = Vec::with_capacity(self.config.simulation_steps);

        let mut termination = Termination::StepBudget;
        while self.steps_executed < self.config.simulation_steps {
            let counts = self.step()?;
            snapshots.push(self.snapshot());
            if counts.get(Species::Uranium235) as f64 <= limit {
                termination = Termination::Depleted;
                break;
            }
        }

        self.termination = Some(termination);
        info!(
            "run finished after {} steps ({:?}): {} particles live",
            self.steps_executed,
            termination,
            self.particles.len()
        );
        Ok(RunOutput {
            snapshots,
            metadata: self.metadata.clone(),
            termination,
        })
    }

    /// [`Simulation::simulate`] with the configured `threshold_factor_uranium`.
    pub fn run(&mut self) -> Result<RunOutput> {
        self.simulate(self.config.threshold_factor_uranium)
    }

    // ============ Internal helpers ============

    fn add_particle(&mut self, species: Species, r: Vec3, v: Vec3) -> Result<()> {
        let id = ParticleId(self.next_id);
        self.particles
            .push(Particle::new(id, species, r, v, &self.config.species)?);
        self.next_id += 1;
        Ok(())
    }

    /// Visit every unordered pair `i < j` of the population as it stood when
    /// the scan began and resolve the colliding ones. Returns the fission
    /// products to append and the consumed nuclei to drop.
    fn scan_pairs(&mut self) -> (Vec<(Species, Vec3, Vec3)>, Vec<ParticleId>) {
        let mut spawned = Vec::new();
        let mut removed = Vec::new();
        let radius_scale = self.config.radius_scale;
        let n = self.particles.len();

        for i in 0..n {
            for j in (i + 1)..n {
                let (head, tail) = self.particles.split_at_mut(j);
                let a = &mut head[i];
                let b = &mut tail[0];
                if a.is_removed() {
                    // `a` was consumed by an earlier pair of this row.
                    break;
                }
                if b.is_removed() {
                    continue;
                }
                if !eligible(a, b) || !collides(a, b, radius_scale) {
                    continue;
                }
                if let Reaction::Fission(fission) = resolve(a, b, &self.config, &mut self.rng) {
                    spawned.extend(fission.spawned.into_iter().map(|s| (s.species, s.r, s.v)));
                    removed.push(fission.removed);
                }
            }
        }
        (spawned, removed)
    }
}

fn random_position<R: Rng + ?Sized>(rng: &mut R, extent: f64) -> Vec3 {
    let mut r = [0.0_f64; 3];
    for r_k in r.iter_mut() {
        *r_k = rng.random_range(-extent..=extent);
    }
    r
}
