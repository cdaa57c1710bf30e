// Signal timing (simulation seconds)
pub const YELLOW_DURATION: u64 = 4;
pub const MIN_GREEN: u64 = 5;

// Metrics are closed once per cycle of this many seconds
pub const SAMPLE_PERIOD: u64 = 120;

// Fallbacks when no fuzzy rule fires
pub const EXTENSION_NO_ACTIVATION: u32 = 9;
pub const URGENCY_NO_ACTIVATION: u32 = 10;

// Run defaults
pub const DEFAULT_SEED: u64 = 10000;
pub const DEFAULT_MAX_STEPS: u64 = 5430;
pub const DEFAULT_DRAIN_STEPS: u64 = 600;
pub const DEFAULT_TOTAL_VEHICLES: usize = 2000;

// Output locations
pub const SAMPLES_DIR: &str = "samples";
pub const PLOTS_DIR: &str = "plots";

// Phase indices run 0..=8; index 0 is the null phase in the reference topology
pub const PHASE_SLOTS: usize = 9;
