use std::fs;
use std::path::PathBuf;

use fissionsim::cache::{read_run, run_and_cache, METADATA_FILE, RUN_CONFIG_FILE, SNAPSHOTS_FILE};
use fissionsim::error::Result;
use fissionsim::{SimulationConfig, Species};

fn scratch_dir(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!("fissionsim-{}-{}", name, std::process::id()))
}

/// A cached run reads back with one offsets entry per snapshot plus one, and
/// with the same counts the simulation reported.
#[test]
fn cached_run_reads_back() -> Result<()> {
    let root = scratch_dir("cache");
    let cfg = SimulationConfig {
        simulation_steps: 15,
        neutrons_start: 6,
        uranium_start: 8,
        bounding_parameter: 3.0,
        fission_prob_hardcoded_parameter: Some(1.0),
        ..SimulationConfig::default()
    };
    let (dir, output) = run_and_cache(cfg.clone(), Some(10), &root)?;

    assert_eq!(dir, root.join("8_6_3_1"));
    for file in [SNAPSHOTS_FILE, METADATA_FILE, RUN_CONFIG_FILE] {
        assert!(dir.join(file).is_file(), "{file} missing");
    }

    let cached = read_run(&dir)?;
    assert_eq!(cached.metadata, output.metadata);
    assert_eq!(cached.run_config.uranium_start, 8);
    assert_eq!(cached.run_config.uranium_threshold_factor, cfg.threshold_factor_uranium);
    assert_eq!(cached.archive.n_snapshots(), output.snapshots.len());

    for species in Species::ALL {
        let buffer = cached.archive.get(species);
        assert_eq!(buffer.offsets.len(), output.snapshots.len() + 1);
        for (i, snap) in output.snapshots.iter().enumerate() {
            let positions = cached.archive.positions(species, i).unwrap_or(&[]);
            assert_eq!(positions.len(), snap.get(species).len());
            assert_eq!(positions.len(), output.metadata.counts(species)[i + 1]);
        }
    }

    fs::remove_dir_all(&root)?;
    Ok(())
}
