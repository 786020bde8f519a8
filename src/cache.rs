//! On-disk layout of a finished run.
//!
//! A run directory `<root>/<uranium>_<neutrons>_<bound>_<probability>` holds:
//! - `snapshots.json`: per species, every snapshot's positions concatenated
//!   into one `f32` buffer plus an offsets array of length `n_snapshots + 1`
//! - `metadata.json`: the per-species count history
//! - `run_config.json`: the parameters the run was started with

use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use log::info;
use serde::{Deserialize, Serialize};

use crate::config::SimulationConfig;
use crate::core::{Metadata, RunOutput, Simulation, Snapshot, Species};
use crate::error::{Error, Result};

pub const SNAPSHOTS_FILE: &str = "snapshots.json";
pub const METADATA_FILE: &str = "metadata.json";
pub const RUN_CONFIG_FILE: &str = "run_config.json";

/// Concatenated positions of one species across all snapshots.
///
/// Snapshot `i` is `pos[offsets[i]..offsets[i + 1]]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpeciesBuffer {
    pub pos: Vec<[f32; 3]>,
    pub offsets: Vec<u32>,
}

impl Default for SpeciesBuffer {
    fn default() -> Self {
        Self {
            pos: Vec::new(),
            offsets: vec![0],
        }
    }
}

impl SpeciesBuffer {
    fn append(&mut self, positions: &[[f64; 3]]) -> Result<()> {
        self.pos.extend(
            positions
                .iter()
                .map(|r| [r[0] as f32, r[1] as f32, r[2] as f32]),
        );
        let end = u32::try_from(self.pos.len())
            .map_err(|_| Error::InvalidParam("snapshot buffer exceeds u32 offsets".into()))?;
        self.offsets.push(end);
        Ok(())
    }

    pub fn n_snapshots(&self) -> usize {
        self.offsets.len().saturating_sub(1)
    }

    /// Positions of snapshot `index`, if present.
    pub fn snapshot(&self, index: usize) -> Option<&[[f32; 3]]> {
        let start = *self.offsets.get(index)? as usize;
        let end = *self.offsets.get(index + 1)? as usize;
        self.pos.get(start..end)
    }
}

/// Position buffers for all four species.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SnapshotArchive {
    pub neutron: SpeciesBuffer,
    pub uranium_235: SpeciesBuffer,
    pub barium: SpeciesBuffer,
    pub krypton: SpeciesBuffer,
}

impl SnapshotArchive {
    pub fn from_snapshots(snapshots: &[Snapshot]) -> Result<Self> {
        let mut archive = Self::default();
        for snapshot in snapshots {
            for species in Species::ALL {
                archive.get_mut(species).append(snapshot.get(species))?;
            }
        }
        Ok(archive)
    }

    pub fn get(&self, species: Species) -> &SpeciesBuffer {
        match species {
            Species::Neutron => &self.neutron,
            Species::Uranium235 => &self.uranium_235,
            Species::Barium => &self.barium,
            Species::Krypton => &self.krypton,
        }
    }

    fn get_mut(&mut self, species: Species) -> &mut SpeciesBuffer {
        match species {
            Species::Neutron => &mut self.neutron,
            Species::Uranium235 => &mut self.uranium_235,
            Species::Barium => &mut self.barium,
            Species::Krypton => &mut self.krypton,
        }
    }

    pub fn n_snapshots(&self) -> usize {
        self.neutron.n_snapshots()
    }

    /// Positions of `species` in snapshot `index`.
    pub fn positions(&self, species: Species, index: usize) -> Option<&[[f32; 3]]> {
        self.get(species).snapshot(index)
    }
}

/// The parameters a cached run was started with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunConfigRecord {
    pub simulation_steps: usize,
    pub uranium_threshold_factor: f64,
    pub uranium_start: usize,
    pub neutrons_start: usize,
    pub bounding_parameter: f64,
    pub fission_prob_hardcoded_parameter: Option<f64>,
}

impl RunConfigRecord {
    pub fn new(config: &SimulationConfig, threshold_factor: f64) -> Self {
        Self {
            simulation_steps: config.simulation_steps,
            uranium_threshold_factor: threshold_factor,
            uranium_start: config.uranium_start,
            neutrons_start: config.neutrons_start,
            bounding_parameter: config.bounding_parameter,
            fission_prob_hardcoded_parameter: config.fission_prob_hardcoded_parameter,
        }
    }

    pub fn key(&self) -> RunKey {
        RunKey {
            uranium_start: self.uranium_start,
            neutrons_start: self.neutrons_start,
            bounding_parameter: self.bounding_parameter,
            fission_probability: self.fission_prob_hardcoded_parameter,
        }
    }
}

/// Identifies a cached run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RunKey {
    pub uranium_start: usize,
    pub neutrons_start: usize,
    pub bounding_parameter: f64,
    /// `None` when the cross-section formula was used.
    pub fission_probability: Option<f64>,
}

impl RunKey {
    pub fn dir_name(&self) -> String {
        let probability = match self.fission_probability {
            Some(p) => p.to_string(),
            None => "formula".to_string(),
        };
        format!(
            "{}_{}_{}_{}",
            self.uranium_start, self.neutrons_start, self.bounding_parameter, probability
        )
    }
}

/// A run as read back from disk.
#[derive(Debug, Clone, PartialEq)]
pub struct CachedRun {
    pub archive: SnapshotArchive,
    pub metadata: Metadata,
    pub run_config: RunConfigRecord,
}

/// Write a run under `root/<key>` and return that directory.
pub fn write_run(
    root: &Path,
    archive: &SnapshotArchive,
    metadata: &Metadata,
    run_config: &RunConfigRecord,
) -> Result<PathBuf> {
    let dir = root.join(run_config.key().dir_name());
    fs::create_dir_all(&dir)?;
    write_json(&dir.join(SNAPSHOTS_FILE), archive)?;
    write_json(&dir.join(METADATA_FILE), metadata)?;
    write_json(&dir.join(RUN_CONFIG_FILE), run_config)?;
    info!("cached run at {}", dir.display());
    Ok(dir)
}

/// Read a run directory written by [`write_run`].
pub fn read_run(dir: &Path) -> Result<CachedRun> {
    Ok(CachedRun {
        archive: read_json(&dir.join(SNAPSHOTS_FILE))?,
        metadata: read_json(&dir.join(METADATA_FILE))?,
        run_config: read_json(&dir.join(RUN_CONFIG_FILE))?,
    })
}

/// Build a simulation from `config`, run it with the configured threshold and
/// cache the result under `root`.
pub fn run_and_cache(
    config: SimulationConfig,
    seed: Option<u64>,
    root: &Path,
) -> Result<(PathBuf, RunOutput)> {
    let threshold = config.threshold_factor_uranium;
    let record = RunConfigRecord::new(&config, threshold);
    let mut sim = Simulation::new(config, seed)?;
    let output = sim.simulate(threshold)?;
    let archive = SnapshotArchive::from_snapshots(&output.snapshots)?;
    let dir = write_run(root, &archive, &output.metadata, &record)?;
    Ok((dir, output))
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let mut w = BufWriter::new(File::create(path)?);
    serde_json::to_writer(&mut w, value)?;
    w.flush()?;
    Ok(())
}

fn read_json<T: for<'de> Deserialize<'de>>(path: &Path) -> Result<T> {
    let r = BufReader::new(File::open(path)?);
    Ok(serde_json::from_reader(r)?)
}
