use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::control_system::green_extension::green_extension_rule_base;
use crate::control_system::urgency::urgency_rule_base;
use crate::error::ConfigError;
use crate::fuzzy_logic::FuzzyRuleBase;
use crate::global_variables::{
    DEFAULT_DRAIN_STEPS, DEFAULT_MAX_STEPS, DEFAULT_SEED, DEFAULT_TOTAL_VEHICLES, MIN_GREEN,
    PLOTS_DIR, SAMPLES_DIR, SAMPLE_PERIOD, YELLOW_DURATION,
};
use crate::shared_data::SimTime;
use crate::simulation_engine::intersections::{parse_signal_state, Intersection, TopologyConfig};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingConfig {
    pub min_green: SimTime,
    pub yellow: SimTime,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            min_green: MIN_GREEN,
            yellow: YELLOW_DURATION,
        }
    }
}

/// One step of the environment's own signal program.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgramPhase {
    pub state: String,
    pub duration: SimTime,
}

impl ProgramPhase {
    pub fn new(state: &str, duration: SimTime) -> Self {
        Self {
            state: state.to_string(),
            duration,
        }
    }
}

/// Signal program matching `TopologyConfig::reference()`.
pub fn reference_program() -> Vec<ProgramPhase> {
    vec![
        ProgramPhase::new("GGGrrrrrGGGrrrrr", 31),
        ProgramPhase::new("yyyrrrrryyyrrrrr", 4),
        ProgramPhase::new("rrrGrrrrrrrGrrrr", 6),
        ProgramPhase::new("rrryrrrrrrryrrrr", 4),
        ProgramPhase::new("rrrrGGGrrrrrGGGr", 31),
        ProgramPhase::new("rrrryyyrrrrryyyr", 4),
        ProgramPhase::new("rrrrrrrGrrrrrrrG", 6),
        ProgramPhase::new("rrrrrrryrrrrrrry", 4),
    ]
}

/// Everything a run needs, built once at startup and passed by reference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    pub seed: u64,
    pub max_steps: u64,
    /// Extra ticks allowed after `max_steps` for the network to drain.
    pub drain_steps: u64,
    pub total_vehicles: usize,
    pub sample_period: SimTime,
    pub samples_dir: PathBuf,
    pub plots_dir: PathBuf,
    pub timing: TimingConfig,
    pub topology: TopologyConfig,
    pub program: Vec<ProgramPhase>,
    pub green_extension: FuzzyRuleBase,
    pub urgency: FuzzyRuleBase,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            seed: DEFAULT_SEED,
            max_steps: DEFAULT_MAX_STEPS,
            drain_steps: DEFAULT_DRAIN_STEPS,
            total_vehicles: DEFAULT_TOTAL_VEHICLES,
            sample_period: SAMPLE_PERIOD,
            samples_dir: PathBuf::from(SAMPLES_DIR),
            plots_dir: PathBuf::from(PLOTS_DIR),
            timing: TimingConfig::default(),
            topology: TopologyConfig::reference(),
            program: reference_program(),
            green_extension: green_extension_rule_base(),
            urgency: urgency_rule_base(),
        }
    }
}

impl SimulationConfig {
    /// Reads a JSON file; absent fields keep their defaults.
    pub fn from_json_file(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path)?;
        let config: SimulationConfig = serde_json::from_str(&text)?;
        Ok(config)
    }

    /// Validates the whole configuration and returns the intersection model.
    pub fn validate(&self) -> Result<Intersection, ConfigError> {
        if self.timing.min_green == 0 || self.timing.yellow == 0 {
            return Err(ConfigError::InvalidTiming(
                "minimum green and yellow must be at least one second".to_string(),
            ));
        }
        if self.sample_period == 0 {
            return Err(ConfigError::InvalidTiming(
                "sample period must be at least one second".to_string(),
            ));
        }

        self.green_extension.validate()?;
        self.urgency.validate()?;
        let intersection = Intersection::new(self.topology.clone())?;

        for combi in &self.topology.combi_phases {
            for phase in [combi.green_program_phase, combi.yellow_program_phase] {
                let Some(step) = self.program.get(phase) else {
                    return Err(ConfigError::InvalidTiming(format!(
                        "combi-phase with pair sum {} uses program phase {}, program has {} phases",
                        combi.pair_sum,
                        phase,
                        self.program.len()
                    )));
                };
                if step.duration == 0 {
                    return Err(ConfigError::InvalidTiming(format!(
                        "program phase {} has zero duration",
                        phase
                    )));
                }
            }
        }
        for (i, step) in self.program.iter().enumerate() {
            let valid = parse_signal_state(&step.state).is_ok();
            if !valid || step.state.chars().count() != self.topology.link_count {
                return Err(ConfigError::InvalidTiming(format!(
                    "program phase {} state '{}' does not describe {} links",
                    i, step.state, self.topology.link_count
                )));
            }
        }

        Ok(intersection)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn default_config_is_valid() {
        let config = SimulationConfig::default();
        let intersection = config.validate().unwrap();
        assert_eq!(intersection.id(), "0");
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "seed": 7, "timing": {{ "yellow": 3 }} }}"#).unwrap();

        let config = SimulationConfig::from_json_file(file.path()).unwrap();
        assert_eq!(config.seed, 7);
        assert_eq!(config.timing.yellow, 3);
        assert_eq!(config.timing.min_green, MIN_GREEN);
        assert_eq!(config.max_steps, DEFAULT_MAX_STEPS);
        assert_eq!(config.topology, TopologyConfig::reference());
    }

    #[test]
    fn round_trips_through_json() {
        let config = SimulationConfig::default();
        let text = serde_json::to_string(&config).unwrap();
        let back: SimulationConfig = serde_json::from_str(&text).unwrap();
        assert_eq!(back, config);
    }

    #[test]
    fn zero_yellow_is_rejected() {
        let mut config = SimulationConfig::default();
        config.timing.yellow = 0;
        assert!(matches!(config.validate(), Err(ConfigError::InvalidTiming(_))));
    }

    #[test]
    fn short_program_is_rejected() {
        let mut config = SimulationConfig::default();
        config.program.truncate(6);
        assert!(config.validate().is_err());
    }

    #[test]
    fn program_with_wrong_link_count_is_rejected() {
        let mut config = SimulationConfig::default();
        config.program[2].state = "GGr".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn missing_file_is_io_error() {
        let result = SimulationConfig::from_json_file(Path::new("/nonexistent/config.json"));
        assert!(matches!(result, Err(ConfigError::Io(_))));
    }
}
