use std::rc::Rc;

use crate::config::SimulationConfig;
use crate::control_system::green_extension::GreenExtensionController;
use crate::control_system::phase_state_machine::{Decision, PhaseStateMachine};
use crate::control_system::urgency::UrgencyController;
use crate::error::ControlError;
use crate::shared_data::SimTime;
use crate::simulation_engine::environment::Environment;
use crate::simulation_engine::intersections::Intersection;

/// A signal control strategy the run loop can drive.
pub trait Controller {
    /// Tag used for samples and output files.
    fn label(&self) -> &str;

    fn start(&mut self, env: &mut dyn Environment) -> Result<(), ControlError>;

    /// Called once per tick, after the environment advanced.
    fn on_tick(&mut self, env: &mut dyn Environment) -> Result<(), ControlError>;
}

/// Cycles the combi-phases in configured order, each green followed by its
/// yellow, every phase running for its configured duration.
pub struct FixedTimeController {
    intersection: Rc<Intersection>,
    cycle: Vec<usize>,
    current_index: usize,
    elapsed_in_phase: SimTime,
    current_duration: SimTime,
}

impl FixedTimeController {
    pub fn new(intersection: Rc<Intersection>) -> Self {
        let cycle = intersection
            .config()
            .combi_phases
            .iter()
            .flat_map(|c| [c.green_program_phase, c.yellow_program_phase])
            .collect();
        Self {
            intersection,
            cycle,
            current_index: 0,
            elapsed_in_phase: 0,
            current_duration: 0,
        }
    }

    pub fn current_phase(&self) -> usize {
        self.cycle[self.current_index]
    }

    fn apply_current_phase(&mut self, env: &mut dyn Environment) -> Result<(), ControlError> {
        let id = self.intersection.id();
        let phase = self.current_phase();
        env.set_phase(id, phase)?;
        self.current_duration = env.configured_phase_duration(id, phase)?.max(1);
        self.elapsed_in_phase = 0;
        log::info!(
            "[{}] t={} fixed-time switch to phase {} for {}s",
            id,
            env.current_time(),
            phase,
            self.current_duration
        );
        Ok(())
    }
}

impl Controller for FixedTimeController {
    fn label(&self) -> &str {
        "fixed"
    }

    fn start(&mut self, env: &mut dyn Environment) -> Result<(), ControlError> {
        self.current_index = 0;
        self.apply_current_phase(env)
    }

    fn on_tick(&mut self, env: &mut dyn Environment) -> Result<(), ControlError> {
        self.elapsed_in_phase += 1;
        if self.elapsed_in_phase >= self.current_duration {
            self.current_index = (self.current_index + 1) % self.cycle.len();
            self.apply_current_phase(env)?;
        }
        Ok(())
    }
}

/// Fuzzy green-extension / urgency control through the phase state machine.
pub struct AdaptiveFuzzyController {
    machine: PhaseStateMachine,
    switches: u64,
    extensions: u64,
}

impl AdaptiveFuzzyController {
    pub fn new(intersection: Rc<Intersection>, config: &SimulationConfig) -> Result<Self, ControlError> {
        let extender = GreenExtensionController::with_rule_base(config.green_extension.clone())?;
        let urgency = UrgencyController::with_rule_base(config.urgency.clone())?;
        Ok(Self {
            machine: PhaseStateMachine::with_advisors(
                intersection,
                config.timing.clone(),
                extender,
                urgency,
            ),
            switches: 0,
            extensions: 0,
        })
    }

    pub fn machine(&self) -> &PhaseStateMachine {
        &self.machine
    }

    /// Number of green-to-yellow switches so far.
    pub fn switches(&self) -> u64 {
        self.switches
    }

    pub fn extensions(&self) -> u64 {
        self.extensions
    }
}

impl Controller for AdaptiveFuzzyController {
    fn label(&self) -> &str {
        "fuzzy"
    }

    fn start(&mut self, env: &mut dyn Environment) -> Result<(), ControlError> {
        self.machine.start(env)
    }

    fn on_tick(&mut self, env: &mut dyn Environment) -> Result<(), ControlError> {
        match self.machine.step(env)? {
            Decision::Extend { .. } => self.extensions += 1,
            Decision::BeginYellow { .. } => self.switches += 1,
            _ => {}
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulation_engine::intersections::TopologyConfig;
    use crate::simulation_engine::queue_intersection::QueueIntersection;

    fn reference() -> Rc<Intersection> {
        Rc::new(Intersection::new(TopologyConfig::reference()).unwrap())
    }

    #[test]
    fn fixed_time_follows_the_program_durations() {
        let config = SimulationConfig::default();
        let mut env = QueueIntersection::new(&config, Vec::new()).unwrap();
        let mut controller = FixedTimeController::new(reference());
        controller.start(&mut env).unwrap();

        let mut seen = vec![controller.current_phase()];
        for _ in 0..(31 + 4 + 6) {
            env.advance_one_tick().unwrap();
            controller.on_tick(&mut env).unwrap();
            if seen.last() != Some(&controller.current_phase()) {
                seen.push(controller.current_phase());
            }
        }
        assert_eq!(seen, vec![0, 1, 2, 3]);
    }

    #[test]
    fn adaptive_controller_counts_switches() {
        let config = SimulationConfig::default();
        let mut env = QueueIntersection::new(&config, Vec::new()).unwrap();
        let mut controller = AdaptiveFuzzyController::new(reference(), &config).unwrap();
        assert_eq!(controller.label(), "fuzzy");
        controller.start(&mut env).unwrap();
        // empty roads: each green gets a 1 s extension until max green
        for _ in 0..40 {
            env.advance_one_tick().unwrap();
            controller.on_tick(&mut env).unwrap();
        }
        assert!(controller.switches() >= 1);
        assert!(controller.extensions() >= 1);
    }
}
