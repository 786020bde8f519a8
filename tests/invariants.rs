use std::collections::HashSet;

use fissionsim::core::{Cooldown, ParticleId};
use fissionsim::error::Result;
use fissionsim::{Simulation, SimulationConfig, Species, SpeciesCounts};
use proptest::prelude::*;

fn busy_config() -> SimulationConfig {
    SimulationConfig {
        simulation_steps: 40,
        neutrons_start: 15,
        uranium_start: 25,
        bounding_parameter: 4.0,
        fission_prob_hardcoded_parameter: Some(0.5),
        ..SimulationConfig::default()
    }
}

/// Step-by-step checks of cooldown range, wall containment, count bookkeeping
/// and fission cardinality.
fn check_run(seed: u64) -> Result<()> {
    let cfg = busy_config();
    let cooldown_max = cfg.interaction_cooldown_max;
    let bound = cfg.bounding_parameter;
    let mut sim = Simulation::new(cfg, Some(seed))?;

    for _ in 0..sim.config().simulation_steps {
        let before: HashSet<ParticleId> = sim.particles().iter().map(|p| p.id).collect();
        let prev = sim.counts();
        let counts = sim.step()?;

        // Recorded counts equal the live population.
        assert_eq!(counts, sim.counts());
        assert_eq!(sim.metadata().latest(), Some(counts));
        assert_eq!(counts.total(), sim.num_particles());

        for p in sim.particles() {
            match p.cooldown {
                Cooldown::Ticking(c) => assert!((0.0..=cooldown_max).contains(&c)),
                Cooldown::Removed => panic!("removed particle left in population"),
            }
            // Survivors of the step went through reflection.
            if before.contains(&p.id) {
                assert!(p.r.iter().all(|x| x.abs() <= bound), "{:?} escaped", p.r);
            }
        }

        // Every fission: -1 uranium, +1 barium, +1 krypton, +2..=3 neutrons.
        let fissions = prev.get(Species::Uranium235) - counts.get(Species::Uranium235);
        assert_eq!(counts.get(Species::Barium), prev.get(Species::Barium) + fissions);
        assert_eq!(counts.get(Species::Krypton), prev.get(Species::Krypton) + fissions);
        let released = counts.get(Species::Neutron) - prev.get(Species::Neutron);
        assert!(released >= 2 * fissions && released <= 3 * fissions);
    }
    Ok(())
}

#[test]
fn invariants_hold_every_step() -> Result<()> {
    check_run(31337)
}

#[test]
fn fixed_seed_reproduces_the_run() -> Result<()> {
    let mut a = Simulation::new(busy_config(), Some(4242))?;
    let mut b = Simulation::new(busy_config(), Some(4242))?;
    let out_a = a.run()?;
    let out_b = b.run()?;
    assert_eq!(out_a.termination, out_b.termination);
    assert_eq!(out_a.metadata, out_b.metadata);
    assert_eq!(out_a.snapshots, out_b.snapshots);
    Ok(())
}

#[test]
fn initial_metadata_matches_initial_population() -> Result<()> {
    let sim = Simulation::new(busy_config(), Some(1))?;
    assert_eq!(sim.metadata().at(0), Some(SpeciesCounts([15, 25, 0, 0])));
    Ok(())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(8))]

    #[test]
    fn invariants_hold_for_any_seed(seed in any::<u64>()) {
        prop_assert!(check_run(seed).is_ok());
    }
}
