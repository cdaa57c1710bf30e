use crate::error::ControlError;
use crate::shared_data::{DetectorReading, SimTime};

/// The live or simulated intersection the controller drives.
///
/// Every call may fail with `ControlError::EnvironmentUnavailable`; the
/// control loop treats that as fatal.
pub trait Environment {
    fn advance_one_tick(&mut self) -> Result<(), ControlError>;

    fn current_time(&self) -> SimTime;

    /// Vehicles still expected: queued plus not yet departed.
    fn min_remaining_demand(&self) -> usize;

    fn read_detector(&self, id: &str) -> Result<DetectorReading, ControlError>;

    /// Per-link colours as a signal string, e.g. `"GGGrrrrrGGGrrrrr"`.
    fn signal_state(&self, intersection_id: &str) -> Result<String, ControlError>;

    fn set_phase(&mut self, intersection_id: &str, phase_index: usize) -> Result<(), ControlError>;

    fn configured_phase_duration(
        &self,
        intersection_id: &str,
        phase_index: usize,
    ) -> Result<SimTime, ControlError>;
}
