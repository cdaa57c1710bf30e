use crate::control_system::phase_state_machine::UrgencyAdvisor;
use crate::error::ConfigError;
use crate::fuzzy_logic::membership::{queue_variable, score_variable, waiting_variable};
use crate::fuzzy_logic::{FuzzyRule, FuzzyRuleBase, Level};
use crate::global_variables::URGENCY_NO_ACTIVATION;

/// Reference rule base: (queue, waiting time) of a red phase -> urgency.
/// Waiting time dominates once it reaches medium.
pub fn urgency_rule_base() -> FuzzyRuleBase {
    use Level::{High, Low, Medium};

    FuzzyRuleBase {
        name: "phase-urgency".to_string(),
        inputs: vec![queue_variable("queue"), waiting_variable("waiting_time")],
        output: score_variable("urgency"),
        rules: vec![
            FuzzyRule::new(&[Low, Low], Low),
            FuzzyRule::new(&[Medium, Low], Low),
            FuzzyRule::new(&[High, Low], Medium),
            FuzzyRule::new(&[Low, Medium], Medium),
            FuzzyRule::new(&[Medium, Medium], High),
            FuzzyRule::new(&[High, Medium], High),
            FuzzyRule::new(&[Low, High], High),
            FuzzyRule::new(&[Medium, High], High),
            FuzzyRule::new(&[High, High], High),
        ],
    }
}

/// Scores how badly a red combi-phase needs to be served.
#[derive(Debug, Clone)]
pub struct UrgencyController {
    rules: FuzzyRuleBase,
}

impl UrgencyController {
    pub fn new() -> Self {
        Self {
            rules: urgency_rule_base(),
        }
    }

    pub fn with_rule_base(rules: FuzzyRuleBase) -> Result<Self, ConfigError> {
        rules.validate()?;
        if rules.inputs.len() != 2 {
            return Err(ConfigError::InvalidRuleBase {
                name: rules.name,
                reason: "urgency takes exactly two inputs".to_string(),
            });
        }
        Ok(Self { rules })
    }

    pub fn rule_base(&self) -> &FuzzyRuleBase {
        &self.rules
    }

    /// Urgency on the 0..=10 scale. A phase the rules cannot classify is
    /// treated as maximally urgent so it cannot starve.
    pub fn compute_urgency(&self, queue_length: u32, waiting_time: f64) -> u32 {
        match self.rules.infer(&[f64::from(queue_length), waiting_time]) {
            Ok(urgency) => urgency,
            Err(e) => {
                log::debug!(
                    "Urgency ({}, {:.1}): {}, using {}",
                    queue_length,
                    waiting_time,
                    e,
                    URGENCY_NO_ACTIVATION
                );
                URGENCY_NO_ACTIVATION
            }
        }
    }
}

impl Default for UrgencyController {
    fn default() -> Self {
        Self::new()
    }
}

impl UrgencyAdvisor for UrgencyController {
    fn urgency(&self, queue_length: u32, waiting_time: f64) -> u32 {
        self.compute_urgency(queue_length, waiting_time)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn idle_phase_is_not_urgent() {
        let controller = UrgencyController::new();
        assert!(controller.compute_urgency(0, 0.0) <= 2);
    }

    #[test]
    fn saturated_inputs_are_maximally_urgent() {
        let controller = UrgencyController::new();
        assert_eq!(controller.compute_urgency(30, 220.0), 10);
    }

    #[test]
    fn inside_universe_high_high_is_high_term_centroid() {
        let controller = UrgencyController::new();
        assert_eq!(controller.compute_urgency(30, 200.0), 9);
    }

    #[test]
    fn waiting_dominates_queue() {
        let controller = UrgencyController::new();
        let long_queue_short_wait = controller.compute_urgency(30, 0.0);
        let short_queue_medium_wait = controller.compute_urgency(0, 110.0);
        assert_eq!(long_queue_short_wait, 5);
        assert_eq!(short_queue_medium_wait, 5);
        assert!(controller.compute_urgency(15, 110.0) > short_queue_medium_wait);
    }

    #[test]
    fn nan_waiting_falls_back() {
        let controller = UrgencyController::new();
        assert_eq!(controller.compute_urgency(3, f64::NAN), URGENCY_NO_ACTIVATION);
    }
}
