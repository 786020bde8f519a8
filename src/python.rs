use numpy::ndarray::Array2;
use numpy::IntoPyArray;
use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;
use pyo3::types::PyDict;

use crate::cache::SnapshotArchive;
use crate::config::SimulationConfig;
use crate::core::{Simulation, Species, SpeciesCounts};

fn py_err<E: ToString>(e: E) -> PyErr {
    PyValueError::new_err(e.to_string())
}

fn counts_tuple(c: SpeciesCounts) -> (usize, usize, usize, usize) {
    (c.0[0], c.0[1], c.0[2], c.0[3])
}

/// Python-facing wrapper around the Rust fission simulation.
///
/// API:
/// - __new__(config_json=None, seed=None)
/// - step() -> (neutrons, uranium, barium, krypton)
/// - counts() -> (neutrons, uranium, barium, krypton)
/// - simulate(threshold=None) -> (snapshots: dict, metadata: dict)
#[pyclass]
pub struct FissionSim {
    sim: Simulation,
}

#[pymethods]
impl FissionSim {
    /// Build a simulation from an optional JSON configuration document.
    ///
    /// Missing keys take their defaults. Errors: raises ValueError on invalid parameters.
    #[new]
    #[pyo3(signature = (config_json=None, seed=None))]
    fn new(config_json: Option<&str>, seed: Option<u64>) -> PyResult<Self> {
        let config = match config_json {
            Some(s) => SimulationConfig::from_json_str(s).map_err(py_err)?,
            None => SimulationConfig::default(),
        };
        let sim = Simulation::new(config, seed).map_err(py_err)?;
        Ok(Self { sim })
    }

    /// Execute one step and return the live counts.
    fn step(&mut self) -> PyResult<(usize, usize, usize, usize)> {
        self.sim.step().map(counts_tuple).map_err(py_err)
    }

    /// Live counts (neutron, uranium_235, barium, krypton).
    fn counts(&self) -> (usize, usize, usize, usize) {
        counts_tuple(self.sim.counts())
    }

    /// Run to completion from the initial state (releases the GIL during
    /// computation). Raises `ValueError` after `step()` or a finished run.
    ///
    /// Returns `(snapshots, metadata)`: `snapshots` maps `<species>_pos` to a
    /// float32 array of shape (M, 3) and `<species>_offsets` to a uint32 array
    /// of length n_snapshots + 1; `metadata` maps `<species>_counts` to lists.
    #[pyo3(signature = (threshold=None))]
    fn simulate(
        &mut self,
        py: Python<'_>,
        threshold: Option<f64>,
    ) -> PyResult<(Py<PyDict>, Py<PyDict>)> {
        let threshold = threshold.unwrap_or(self.sim.config().threshold_factor_uranium);
        let sim = &mut self.sim;
        let output = py.detach(|| sim.simulate(threshold)).map_err(py_err)?;
        let archive = SnapshotArchive::from_snapshots(&output.snapshots).map_err(py_err)?;

        let snapshots = PyDict::new(py);
        for species in Species::ALL {
            let buffer = archive.get(species);
            let flat: Vec<f32> = buffer.pos.iter().flat_map(|r| r.iter().copied()).collect();
            let pos = Array2::from_shape_vec((buffer.pos.len(), 3), flat).map_err(py_err)?;
            snapshots.set_item(format!("{}_pos", species.name()), pos.into_pyarray(py))?;
            snapshots.set_item(
                format!("{}_offsets", species.name()),
                buffer.offsets.clone().into_pyarray(py),
            )?;
        }

        let metadata = PyDict::new(py);
        let m = &output.metadata;
        metadata.set_item("neutron_counts", m.neutron_counts.clone())?;
        metadata.set_item("uranium_counts", m.uranium_counts.clone())?;
        metadata.set_item("barium_counts", m.barium_counts.clone())?;
        metadata.set_item("krypton_counts", m.krypton_counts.clone())?;

        Ok((snapshots.unbind(), metadata.unbind()))
    }
}

/// The fissionsim Python module entry point.
#[pymodule]
fn fissionsim(_py: Python<'_>, m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<FissionSim>()?;
    Ok(())
}
