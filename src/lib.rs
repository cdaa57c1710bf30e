pub mod config;
pub mod control_system;
pub mod error;
pub mod flow_analyzer;
pub mod fuzzy_logic;
pub mod global_variables;
pub mod monitoring;
pub mod shared_data;
pub mod simulation_engine;

pub use config::SimulationConfig;
pub use error::{ConfigError, ControlError};
