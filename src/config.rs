//! Run configuration: one immutable value handed to [`crate::Simulation::new`].

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::core::Species;
use crate::error::{Error, Result};

/// Default step length in seconds.
const DEFAULT_TICK: f64 = 5e-7;

/// Physical constants of one particle species.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpeciesProperties {
    /// Rest mass in kg (> 0).
    pub mass: f64,
    /// Geometric radius in m (> 0); scaled by `radius_scale` for collision tests.
    pub radius: f64,
}

/// Mass and radius for each species. A particle's mass and radius are
/// looked up here once, at creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpeciesTable {
    pub neutron: SpeciesProperties,
    pub uranium_235: SpeciesProperties,
    pub barium: SpeciesProperties,
    pub krypton: SpeciesProperties,
}

impl SpeciesTable {
    #[inline]
    pub fn get(&self, species: Species) -> SpeciesProperties {
        match species {
            Species::Neutron => self.neutron,
            Species::Uranium235 => self.uranium_235,
            Species::Barium => self.barium,
            Species::Krypton => self.krypton,
        }
    }
}

impl Default for SpeciesTable {
    fn default() -> Self {
        Self {
            neutron: SpeciesProperties {
                mass: 1.675e-27,
                radius: 8e-16,
            },
            uranium_235: SpeciesProperties {
                mass: 3.91e-25,
                radius: 1.4e-10,
            },
            barium: SpeciesProperties {
                mass: 2.28e-25,
                radius: 0.8e-10,
            },
            krypton: SpeciesProperties {
                mass: 1.39e-25,
                radius: 0.88e-10,
            },
        }
    }
}

/// Constants of the empirical fission probability
/// `p = (sigma_0 / sigma_thermal) * (K * v_rel^2 / e_0)^(-alpha)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CrossSection {
    /// Fission cross-section for thermal neutrons (barn).
    pub sigma_0: f64,
    /// Maximum thermal cross-section (barn).
    pub sigma_thermal: f64,
    /// Reference energy (eV).
    pub e_0: f64,
    /// Empirical exponent.
    pub alpha: f64,
}

impl Default for CrossSection {
    fn default() -> Self {
        Self {
            sigma_0: 580.0,
            sigma_thermal: 580.0,
            e_0: 0.025,
            alpha: 0.8,
        }
    }
}

/// Every tunable of a run.
///
/// Unknown keys in a JSON document are rejected; missing keys take their
/// default. Construct, adjust, then pass to the simulation, which validates it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SimulationConfig {
    /// Step budget of the run loop (> 0).
    pub simulation_steps: usize,
    /// Initial number of free neutrons.
    pub neutrons_start: usize,
    /// Initial number of uranium-235 nuclei.
    pub uranium_start: usize,
    /// Half-width of the reflective cube (> 0).
    pub bounding_parameter: f64,
    /// Fixed fission probability in [0, 1]; `None` uses the cross-section formula.
    pub fission_prob_hardcoded_parameter: Option<f64>,
    /// The run stops once live uranium <= this fraction of the initial uranium.
    pub threshold_factor_uranium: f64,
    /// Step length in seconds (> 0).
    pub simulation_tick: f64,
    /// Cooldown assigned to both partners of an elastic collision.
    pub interaction_cooldown_max: f64,
    /// Multiplier on the summed radii for collision detection.
    pub radius_scale: f64,
    /// Speed of neutrons released by fission.
    pub neutron_speed_magnitude: f64,
    /// Lower bound of the initial neutron speed (upper bound is 1.5x).
    pub neutron_init_speed: f64,
    /// Upper bound of the initial uranium speed.
    pub uranium_init_speed_max: f64,
    /// Speed of the barium and krypton fragments.
    pub product_speed_magnitude: f64,
    pub species: SpeciesTable,
    pub cross_section: CrossSection,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            simulation_steps: 200,
            neutrons_start: 5,
            uranium_start: 100,
            bounding_parameter: 75.0,
            fission_prob_hardcoded_parameter: Some(1.0),
            threshold_factor_uranium: 0.1,
            simulation_tick: DEFAULT_TICK,
            interaction_cooldown_max: DEFAULT_TICK / 3.0,
            radius_scale: 1e10,
            neutron_speed_magnitude: 1e7,
            neutron_init_speed: 1e7,
            uranium_init_speed_max: 100.0,
            product_speed_magnitude: 1e6,
            species: SpeciesTable::default(),
            cross_section: CrossSection::default(),
        }
    }
}

impl SimulationConfig {
    /// Parse a (possibly partial) JSON document over the defaults and validate it.
    pub fn from_json_str(s: &str) -> Result<Self> {
        let cfg: Self = serde_json::from_str(s).map_err(|e| Error::Config(e.to_string()))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Read and parse a JSON configuration file.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = fs::read_to_string(path.as_ref())?;
        Self::from_json_str(&text)
    }

    /// Check every invariant the engine relies on.
    ///
    /// Errors:
    /// - `Error::InvalidParam` naming the first offending field.
    pub fn validate(&self) -> Result<()> {
        if self.simulation_steps == 0 {
            return Err(Error::InvalidParam("simulation_steps must be > 0".into()));
        }
        require_positive("bounding_parameter", self.bounding_parameter)?;
        require_positive("simulation_tick", self.simulation_tick)?;
        require_positive("radius_scale", self.radius_scale)?;
        require_non_negative("interaction_cooldown_max", self.interaction_cooldown_max)?;
        require_non_negative("neutron_speed_magnitude", self.neutron_speed_magnitude)?;
        require_non_negative("neutron_init_speed", self.neutron_init_speed)?;
        if !(1.5 * self.neutron_init_speed).is_finite() {
            return Err(Error::InvalidParam(
                "neutron_init_speed is too large: 1.5x must stay finite".into(),
            ));
        }
        require_non_negative("uranium_init_speed_max", self.uranium_init_speed_max)?;
        require_non_negative("product_speed_magnitude", self.product_speed_magnitude)?;
        require_unit_interval("threshold_factor_uranium", self.threshold_factor_uranium)?;
        if let Some(p) = self.fission_prob_hardcoded_parameter {
            require_unit_interval("fission_prob_hardcoded_parameter", p)?;
        }

        for species in Species::ALL {
            let props = self.species.get(species);
            if !props.mass.is_finite() || props.mass <= 0.0 {
                return Err(Error::InvalidParam(format!(
                    "mass of {} must be finite and > 0",
                    species.name()
                )));
            }
            if !props.radius.is_finite() || props.radius <= 0.0 {
                return Err(Error::InvalidParam(format!(
                    "radius of {} must be finite and > 0",
                    species.name()
                )));
            }
        }

        let cs = &self.cross_section;
        require_positive("cross_section.sigma_thermal", cs.sigma_thermal)?;
        require_positive("cross_section.e_0", cs.e_0)?;
        require_non_negative("cross_section.sigma_0", cs.sigma_0)?;
        if !cs.alpha.is_finite() {
            return Err(Error::InvalidParam(
                "cross_section.alpha must be finite".into(),
            ));
        }
        Ok(())
    }
}

fn require_positive(name: &str, value: f64) -> Result<()> {
    if !value.is_finite() || value <= 0.0 {
        return Err(Error::InvalidParam(format!("{name} must be finite and > 0")));
    }
    Ok(())
}

fn require_non_negative(name: &str, value: f64) -> Result<()> {
    if !value.is_finite() || value < 0.0 {
        return Err(Error::InvalidParam(format!(
            "{name} must be finite and >= 0"
        )));
    }
    Ok(())
}

fn require_unit_interval(name: &str, value: f64) -> Result<()> {
    if !(0.0..=1.0).contains(&value) {
        return Err(Error::InvalidParam(format!("{name} must lie in [0, 1]")));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() -> Result<()> {
        SimulationConfig::default().validate()
    }

    #[test]
    fn partial_json_keeps_defaults() -> Result<()> {
        let cfg = SimulationConfig::from_json_str(
            r#"{ "uranium_start": 10, "fission_prob_hardcoded_parameter": null }"#,
        )?;
        assert_eq!(cfg.uranium_start, 10);
        assert_eq!(cfg.fission_prob_hardcoded_parameter, None);
        assert_eq!(cfg.bounding_parameter, 75.0);
        assert_eq!(cfg.species, SpeciesTable::default());
        Ok(())
    }

    #[test]
    fn json_file_round_trip() -> Result<()> {
        let cfg = SimulationConfig {
            uranium_start: 12,
            bounding_parameter: 4.5,
            fission_prob_hardcoded_parameter: None,
            ..SimulationConfig::default()
        };
        let path = std::env::temp_dir()
            .join(format!("fissionsim-config-{}.json", std::process::id()));
        fs::write(&path, serde_json::to_string(&cfg)?)?;
        let loaded = SimulationConfig::from_json_file(&path);
        fs::remove_file(&path)?;
        assert_eq!(loaded?, cfg);

        let missing = std::env::temp_dir().join("fissionsim-config-missing.json");
        assert!(matches!(
            SimulationConfig::from_json_file(missing),
            Err(Error::Io(_))
        ));
        Ok(())
    }

    #[test]
    fn overflowing_initial_neutron_speed_rejected() {
        let cfg = SimulationConfig {
            neutron_init_speed: f64::MAX,
            ..SimulationConfig::default()
        };
        let msg = cfg.validate().unwrap_err().to_string();
        assert!(msg.contains("neutron_init_speed"));
    }

    #[test]
    fn negative_count_is_a_config_error() {
        let err = SimulationConfig::from_json_str(r#"{ "neutrons_start": -3 }"#).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn unknown_key_is_rejected() {
        let err = SimulationConfig::from_json_str(r#"{ "neutron_count": 3 }"#).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn non_positive_bound_rejected() {
        let cfg = SimulationConfig {
            bounding_parameter: 0.0,
            ..SimulationConfig::default()
        };
        let msg = cfg.validate().unwrap_err().to_string();
        assert!(msg.contains("bounding_parameter"));
    }

    #[test]
    fn override_probability_outside_unit_interval_rejected() {
        let cfg = SimulationConfig {
            fission_prob_hardcoded_parameter: Some(1.5),
            ..SimulationConfig::default()
        };
        let msg = cfg.validate().unwrap_err().to_string();
        assert!(msg.contains("fission_prob_hardcoded_parameter"));

        let cfg = SimulationConfig {
            fission_prob_hardcoded_parameter: Some(f64::NAN),
            ..SimulationConfig::default()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn zero_mass_rejected() {
        let mut cfg = SimulationConfig::default();
        cfg.species.barium.mass = 0.0;
        let msg = cfg.validate().unwrap_err().to_string();
        assert!(msg.contains("barium"));
    }
}
