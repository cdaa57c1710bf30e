use crate::control_system::phase_state_machine::ExtensionAdvisor;
use crate::error::ConfigError;
use crate::fuzzy_logic::membership::{queue_variable, score_variable};
use crate::fuzzy_logic::{FuzzyRule, FuzzyRuleBase, Level};
use crate::global_variables::EXTENSION_NO_ACTIVATION;

/// Reference rule base: queue lengths of the two green flows -> extension seconds.
pub fn green_extension_rule_base() -> FuzzyRuleBase {
    use Level::{High, Low, Medium};

    FuzzyRuleBase {
        name: "green-extension".to_string(),
        inputs: vec![queue_variable("flow1_queue"), queue_variable("flow2_queue")],
        output: score_variable("extension"),
        rules: vec![
            FuzzyRule::new(&[Low, Low], Low),
            FuzzyRule::new(&[Low, Medium], Medium),
            FuzzyRule::new(&[Low, High], High),
            FuzzyRule::new(&[Medium, Low], Medium),
            FuzzyRule::new(&[Medium, Medium], Medium),
            FuzzyRule::new(&[Medium, High], High),
            FuzzyRule::new(&[High, Low], High),
            FuzzyRule::new(&[High, Medium], High),
            FuzzyRule::new(&[High, High], High),
        ],
    }
}

/// Decides how many seconds to add to the running green phase.
#[derive(Debug, Clone)]
pub struct GreenExtensionController {
    rules: FuzzyRuleBase,
}

impl GreenExtensionController {
    pub fn new() -> Self {
        Self {
            rules: green_extension_rule_base(),
        }
    }

    pub fn with_rule_base(rules: FuzzyRuleBase) -> Result<Self, ConfigError> {
        rules.validate()?;
        if rules.inputs.len() != 2 {
            return Err(ConfigError::InvalidRuleBase {
                name: rules.name,
                reason: "green extension takes exactly two inputs".to_string(),
            });
        }
        Ok(Self { rules })
    }

    pub fn rule_base(&self) -> &FuzzyRuleBase {
        &self.rules
    }

    /// Extension in whole seconds. Unclassifiable queues keep the green
    /// running with `EXTENSION_NO_ACTIVATION`.
    pub fn compute_extended_time(&self, flow1_queue: u32, flow2_queue: u32) -> u32 {
        match self
            .rules
            .infer(&[f64::from(flow1_queue), f64::from(flow2_queue)])
        {
            Ok(extension) => extension,
            Err(e) => {
                log::debug!(
                    "Green extension ({}, {}): {}, using {}",
                    flow1_queue,
                    flow2_queue,
                    e,
                    EXTENSION_NO_ACTIVATION
                );
                EXTENSION_NO_ACTIVATION
            }
        }
    }
}

impl Default for GreenExtensionController {
    fn default() -> Self {
        Self::new()
    }
}

impl ExtensionAdvisor for GreenExtensionController {
    fn extension(&self, flow1_queue: u32, flow2_queue: u32) -> u32 {
        self.compute_extended_time(flow1_queue, flow2_queue)
    }
}
