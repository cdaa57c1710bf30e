pub mod green_extension;
pub mod phase_state_machine;
pub mod traffic_light_controller;
pub mod urgency;

pub use green_extension::GreenExtensionController;
pub use phase_state_machine::{ControlState, Decision, PhaseStateMachine};
pub use traffic_light_controller::{AdaptiveFuzzyController, Controller, FixedTimeController};
pub use urgency::UrgencyController;
