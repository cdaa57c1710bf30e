pub mod inference;
pub mod membership;

pub use inference::{defuzzify_centroid, FuzzyRule, FuzzyRuleBase, NoActivation};
pub use membership::{Level, LinguisticVariable, TermSet, Trapezoid, Universe};
