use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::error::ConfigError;
use crate::fuzzy_logic::membership::{Level, LinguisticVariable};

/// Inference produced an empty output set, so the centroid is undefined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("no fuzzy rule fired for the given inputs")]
pub struct NoActivation;

/// `IF input[0] is antecedents[0] AND input[1] is antecedents[1] ... THEN output is consequent`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FuzzyRule {
    pub antecedents: Vec<Level>,
    pub consequent: Level,
}

impl FuzzyRule {
    pub fn new(antecedents: &[Level], consequent: Level) -> Self {
        Self {
            antecedents: antecedents.to_vec(),
            consequent,
        }
    }
}

/// Immutable Mamdani system: min for AND and implication, max for
/// aggregation, centroid defuzzification over the output universe.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FuzzyRuleBase {
    pub name: String,
    pub inputs: Vec<LinguisticVariable>,
    pub output: LinguisticVariable,
    pub rules: Vec<FuzzyRule>,
}

impl FuzzyRuleBase {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |reason: String| ConfigError::InvalidRuleBase {
            name: self.name.clone(),
            reason,
        };

        if self.inputs.is_empty() {
            return Err(invalid("no input variables".to_string()));
        }
        if self.rules.is_empty() {
            return Err(invalid("no rules".to_string()));
        }
        for variable in self.inputs.iter().chain(std::iter::once(&self.output)) {
            if !variable.universe.is_well_formed() {
                return Err(invalid(format!("variable '{}' has a bad universe", variable.name)));
            }
            if let Some((level, _)) = variable.terms.iter().find(|(_, t)| !t.is_well_formed()) {
                return Err(invalid(format!(
                    "term {:?} of '{}' has unordered breakpoints",
                    level, variable.name
                )));
            }
        }
        for (i, rule) in self.rules.iter().enumerate() {
            if rule.antecedents.len() != self.inputs.len() {
                return Err(invalid(format!(
                    "rule {} has {} antecedents for {} inputs",
                    i,
                    rule.antecedents.len(),
                    self.inputs.len()
                )));
            }
        }
        Ok(())
    }

    /// Firing strength of every rule for the given crisp inputs.
    pub fn rule_strengths(&self, inputs: &[f64]) -> Vec<f64> {
        self.rules
            .iter()
            .map(|rule| {
                if rule.antecedents.len() != inputs.len() {
                    return 0.0;
                }
                rule.antecedents
                    .iter()
                    .zip(self.inputs.iter())
                    .zip(inputs.iter())
                    .map(|((&level, variable), &x)| variable.activation(level, x))
                    .fold(1.0, f64::min)
            })
            .collect()
    }

    /// Aggregated output set sampled on the output universe, paired with its sample points.
    pub fn aggregate(&self, inputs: &[f64]) -> (Vec<f64>, Vec<f64>) {
        let strengths = self.rule_strengths(inputs);
        let points: Vec<f64> = self.output.universe.points().collect();
        let mut aggregated = vec![0.0; points.len()];

        for (rule, &strength) in self.rules.iter().zip(strengths.iter()) {
            if strength <= 0.0 {
                continue;
            }
            let shape = self.output.terms.term(rule.consequent);
            for (slot, &x) in aggregated.iter_mut().zip(points.iter()) {
                *slot = f64::max(*slot, f64::min(strength, shape.membership(x)));
            }
        }
        (points, aggregated)
    }

    /// Centroid of the aggregated output set, unrounded.
    pub fn infer_crisp(&self, inputs: &[f64]) -> Result<f64, NoActivation> {
        let (points, aggregated) = self.aggregate(inputs);
        defuzzify_centroid(&points, &aggregated)
    }

    /// Centroid rounded half-to-even to a whole output unit.
    pub fn infer(&self, inputs: &[f64]) -> Result<u32, NoActivation> {
        let crisp = self.infer_crisp(inputs)?;
        Ok(crisp.round_ties_even().max(0.0) as u32)
    }
}

/// `sum(x * mu(x)) / sum(mu(x))` over a sampled set.
pub fn defuzzify_centroid(points: &[f64], membership: &[f64]) -> Result<f64, NoActivation> {
    let (weighted, mass) = points
        .iter()
        .zip(membership.iter())
        .fold((0.0, 0.0), |(w, m), (&x, &mu)| (w + x * mu, m + mu));

    if mass <= 0.0 || !mass.is_finite() {
        return Err(NoActivation);
    }
    Ok(weighted / mass)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fuzzy_logic::membership::{queue_variable, score_variable};

    fn single_input_base() -> FuzzyRuleBase {
        FuzzyRuleBase {
            name: "single".to_string(),
            inputs: vec![queue_variable("queue")],
            output: score_variable("score"),
            rules: vec![
                FuzzyRule::new(&[Level::Low], Level::Low),
                FuzzyRule::new(&[Level::High], Level::High),
            ],
        }
    }

    #[test]
    fn centroid_of_rectangle_is_its_midpoint() {
        let points: Vec<f64> = (0..=10).map(f64::from).collect();
        let membership: Vec<f64> = points
            .iter()
            .map(|&x| if (2.0..=6.0).contains(&x) { 1.0 } else { 0.0 })
            .collect();
        assert_eq!(defuzzify_centroid(&points, &membership), Ok(4.0));
    }

    #[test]
    fn empty_set_is_no_activation() {
        let points = [0.0, 1.0, 2.0];
        assert_eq!(defuzzify_centroid(&points, &[0.0, 0.0, 0.0]), Err(NoActivation));
    }

    #[test]
    fn gap_between_rules_is_no_activation() {
        // only low and high are ruled, 15 sits on the medium plateau alone
        let base = single_input_base();
        assert_eq!(base.infer(&[15.0]), Err(NoActivation));
    }

    #[test]
    fn low_term_centroid() {
        let base = single_input_base();
        let crisp = base.infer_crisp(&[0.0]).unwrap();
        assert!((crisp - 4.5 / 3.5).abs() < 1e-9);
        assert_eq!(base.infer(&[0.0]), Ok(1));
    }

    #[test]
    fn out_of_universe_input_fires_nothing() {
        let base = single_input_base();
        assert_eq!(base.infer(&[31.0]), Err(NoActivation));
    }

    #[test]
    fn validate_rejects_arity_mismatch() {
        let mut base = single_input_base();
        base.rules.push(FuzzyRule::new(&[Level::Low, Level::Low], Level::Low));
        assert!(matches!(
            base.validate(),
            Err(ConfigError::InvalidRuleBase { .. })
        ));
    }

    #[test]
    fn validate_rejects_unordered_term() {
        let mut base = single_input_base();
        base.output.terms.medium.b = 9.0;
        assert!(base.validate().is_err());
    }
}
