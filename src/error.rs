use thiserror::Error;

/// Problems found while validating configuration. All of them abort startup.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("no combi-phase configured for pair sum {sum} (phases {low} and {high})")]
    TopologyLookup { sum: usize, low: usize, high: usize },

    #[error("combi-phase with pair sum {sum} matches no pair of active phases")]
    UnservedCombiPhase { sum: usize },

    #[error("pair sum {sum} appears in more than one combi-phase")]
    DuplicateCombiPhase { sum: usize },

    #[error("phase {0} is outside the phase range 0..=8")]
    InvalidPhase(usize),

    #[error("phase {phase} pairs with phase {partner}, which owns no links")]
    UnpairedPhase { phase: usize, partner: usize },

    #[error("{owner} references link {link}, but the topology has {link_count} links")]
    LinkOutOfRange {
        owner: String,
        link: usize,
        link_count: usize,
    },

    #[error("topology defines no phases")]
    EmptyTopology,

    #[error("rule base '{name}': {reason}")]
    InvalidRuleBase { name: String, reason: String },

    #[error("invalid timing: {0}")]
    InvalidTiming(String),

    #[error("failed to read configuration: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse configuration: {0}")]
    Json(#[from] serde_json::Error),
}

/// Failures that end a control run.
#[derive(Debug, Error)]
pub enum ControlError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("environment unavailable: {0}")]
    EnvironmentUnavailable(String),

    #[error("malformed signal state '{state}': unexpected '{symbol}'")]
    MalformedSignalState { state: String, symbol: char },

    #[error("sample recording failed: {0}")]
    Sampling(String),
}

impl From<csv::Error> for ControlError {
    fn from(e: csv::Error) -> Self {
        ControlError::Sampling(e.to_string())
    }
}
