use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::error::{ConfigError, ControlError};
use crate::global_variables::PHASE_SLOTS;

/// One directional movement at the intersection.
pub type LinkIndex = usize;
/// Phase index 0..=8.
pub type PhaseIndex = usize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LightState {
    Green,
    Yellow,
    Red,
}

impl LightState {
    /// SUMO-style signal symbol: 'G'/'g' green, 'y'/'Y' yellow, 'r'/'R' red.
    pub fn from_symbol(symbol: char) -> Option<Self> {
        match symbol {
            'G' | 'g' => Some(LightState::Green),
            'y' | 'Y' => Some(LightState::Yellow),
            'r' | 'R' => Some(LightState::Red),
            _ => None,
        }
    }

    pub fn symbol(&self) -> char {
        match self {
            LightState::Green => 'G',
            LightState::Yellow => 'y',
            LightState::Red => 'r',
        }
    }
}

/// Parses a signal state string such as `"GGGrrrrrGGGrrrrr"`.
pub fn parse_signal_state(state: &str) -> Result<Vec<LightState>, ControlError> {
    state
        .chars()
        .map(|symbol| {
            LightState::from_symbol(symbol).ok_or_else(|| ControlError::MalformedSignalState {
                state: state.to_string(),
                symbol,
            })
        })
        .collect()
}

pub fn paired_phase(phase: PhaseIndex) -> PhaseIndex {
    if phase + 4 <= 8 {
        phase + 4
    } else {
        phase - 4
    }
}

/// Two phases that receive green together, stored low index first so a
/// pair found from either member compares equal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PhasePair {
    pub low: PhaseIndex,
    pub high: PhaseIndex,
}

impl PhasePair {
    pub fn new(a: PhaseIndex, b: PhaseIndex) -> Self {
        Self {
            low: a.min(b),
            high: a.max(b),
        }
    }

    pub fn of(phase: PhaseIndex) -> Self {
        Self::new(phase, paired_phase(phase))
    }

    /// Canonical slot for fixed-size per-pair tables.
    pub fn slot(&self) -> usize {
        self.low
    }

    pub fn sum(&self) -> usize {
        self.low + self.high
    }
}

/// A detector bound to the link group it watches.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetectorBinding {
    pub id: String,
    pub link: LinkIndex,
}

/// Pair-sum lookup entry: which signal-program phases serve a combi-phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CombiPhase {
    pub pair_sum: usize,
    pub green_program_phase: usize,
    pub yellow_program_phase: usize,
}

/// Static phase/link/detector description of one intersection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopologyConfig {
    pub intersection_id: String,
    pub link_count: usize,
    /// Links of each phase, indexed by phase; `None` marks a null phase.
    pub phases: Vec<Option<Vec<LinkIndex>>>,
    pub detectors: Vec<DetectorBinding>,
    /// Activation order; the first entry is served at start.
    pub combi_phases: Vec<CombiPhase>,
}

impl TopologyConfig {
    /// Four-arm cross. Links per approach (N, E, S, W): through-right,
    /// through, through, left.
    pub fn reference() -> Self {
        let mut detectors = Vec::new();
        for (approach, base) in [("N", 0), ("E", 4), ("S", 8), ("W", 12)] {
            detectors.push(DetectorBinding {
                id: format!("{}_TR", approach),
                link: base,
            });
            detectors.push(DetectorBinding {
                id: format!("{}_T", approach),
                link: base + 1,
            });
            detectors.push(DetectorBinding {
                id: format!("{}_L", approach),
                link: base + 3,
            });
        }

        Self {
            intersection_id: "0".to_string(),
            link_count: 16,
            phases: vec![
                None,
                Some(vec![3]),
                Some(vec![0, 1, 2]),
                Some(vec![7]),
                Some(vec![4, 5, 6]),
                Some(vec![11]),
                Some(vec![8, 9, 10]),
                Some(vec![15]),
                Some(vec![12, 13, 14]),
            ],
            detectors,
            combi_phases: vec![
                CombiPhase {
                    pair_sum: 8,
                    green_program_phase: 0,
                    yellow_program_phase: 1,
                },
                CombiPhase {
                    pair_sum: 6,
                    green_program_phase: 2,
                    yellow_program_phase: 3,
                },
                CombiPhase {
                    pair_sum: 12,
                    green_program_phase: 4,
                    yellow_program_phase: 5,
                },
                CombiPhase {
                    pair_sum: 10,
                    green_program_phase: 6,
                    yellow_program_phase: 7,
                },
            ],
        }
    }
}

impl Default for TopologyConfig {
    fn default() -> Self {
        Self::reference()
    }
}

/// Green and red combi-phases read from one signal-state snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinkClassification {
    pub green_pairs: Vec<PhasePair>,
    pub red_pairs: Vec<PhasePair>,
}

/// Validated, read-only intersection model.
#[derive(Debug, Clone)]
pub struct Intersection {
    config: TopologyConfig,
    /// Active phases in index order.
    active_phases: Vec<PhaseIndex>,
    /// Pair behind the first combi-phase.
    initial_pair: PhasePair,
}

impl Intersection {
    /// Checks every reachable pair sum against the combi-phase table, and
    /// every combi-phase against the active pairs, so a missing or dangling
    /// mapping is a startup error rather than a runtime one.
    pub fn new(config: TopologyConfig) -> Result<Self, ConfigError> {
        if config.phases.len() > PHASE_SLOTS {
            return Err(ConfigError::InvalidPhase(config.phases.len() - 1));
        }

        let active_phases: Vec<PhaseIndex> = config
            .phases
            .iter()
            .enumerate()
            .filter_map(|(phase, links)| match links {
                Some(links) if !links.is_empty() => Some(phase),
                _ => None,
            })
            .collect();
        if active_phases.is_empty() || config.combi_phases.is_empty() {
            return Err(ConfigError::EmptyTopology);
        }

        for &phase in &active_phases {
            for &link in config.phases[phase].iter().flatten() {
                if link >= config.link_count {
                    return Err(ConfigError::LinkOutOfRange {
                        owner: format!("phase {}", phase),
                        link,
                        link_count: config.link_count,
                    });
                }
            }

            let partner = paired_phase(phase);
            if !active_phases.contains(&partner) {
                return Err(ConfigError::UnpairedPhase { phase, partner });
            }

            let pair = PhasePair::of(phase);
            if !config.combi_phases.iter().any(|c| c.pair_sum == pair.sum()) {
                return Err(ConfigError::TopologyLookup {
                    sum: pair.sum(),
                    low: pair.low,
                    high: pair.high,
                });
            }
        }

        let mut seen_sums = BTreeSet::new();
        for combi in &config.combi_phases {
            if !seen_sums.insert(combi.pair_sum) {
                return Err(ConfigError::DuplicateCombiPhase {
                    sum: combi.pair_sum,
                });
            }
        }
        let pair_with_sum = |sum: usize| {
            active_phases
                .iter()
                .map(|&phase| PhasePair::of(phase))
                .find(|pair| pair.sum() == sum)
        };
        for combi in &config.combi_phases {
            if pair_with_sum(combi.pair_sum).is_none() {
                return Err(ConfigError::UnservedCombiPhase {
                    sum: combi.pair_sum,
                });
            }
        }
        let initial_pair = pair_with_sum(config.combi_phases[0].pair_sum)
            .ok_or(ConfigError::UnservedCombiPhase {
                sum: config.combi_phases[0].pair_sum,
            })?;

        for detector in &config.detectors {
            if detector.link >= config.link_count {
                return Err(ConfigError::LinkOutOfRange {
                    owner: format!("detector '{}'", detector.id),
                    link: detector.link,
                    link_count: config.link_count,
                });
            }
        }

        Ok(Self {
            config,
            active_phases,
            initial_pair,
        })
    }

    pub fn id(&self) -> &str {
        &self.config.intersection_id
    }

    pub fn config(&self) -> &TopologyConfig {
        &self.config
    }

    pub fn active_phases(&self) -> &[PhaseIndex] {
        &self.active_phases
    }

    pub fn phase_links(&self, phase: PhaseIndex) -> &[LinkIndex] {
        match self.config.phases.get(phase) {
            Some(Some(links)) => links,
            _ => &[],
        }
    }

    pub fn detectors(&self) -> &[DetectorBinding] {
        &self.config.detectors
    }

    pub fn detectors_for_link(&self, link: LinkIndex) -> Vec<&str> {
        self.config
            .detectors
            .iter()
            .filter(|d| d.link == link)
            .map(|d| d.id.as_str())
            .collect()
    }

    pub fn detectors_for_phase(&self, phase: PhaseIndex) -> Vec<&str> {
        self.phase_links(phase)
            .iter()
            .flat_map(|&link| self.detectors_for_link(link))
            .collect()
    }

    pub fn combi_phase_for_pair_sum(&self, pair_sum: usize) -> Option<&CombiPhase> {
        self.config
            .combi_phases
            .iter()
            .find(|c| c.pair_sum == pair_sum)
    }

    /// Signal-program phase that serves the pair with this index sum.
    pub fn phase_for_pair_sum(&self, pair_sum: usize) -> Option<usize> {
        self.combi_phase_for_pair_sum(pair_sum)
            .map(|c| c.green_program_phase)
    }

    pub fn combi_phase_for_program_phase(&self, program_phase: usize) -> Option<&CombiPhase> {
        self.config
            .combi_phases
            .iter()
            .find(|c| c.green_program_phase == program_phase)
    }

    /// Pair served by a green program phase.
    pub fn pair_for_program_phase(&self, program_phase: usize) -> Option<PhasePair> {
        let combi = self.combi_phase_for_program_phase(program_phase)?;
        self.active_phases
            .iter()
            .map(|&phase| PhasePair::of(phase))
            .find(|pair| pair.sum() == combi.pair_sum)
    }

    pub fn initial_combi_phase(&self) -> &CombiPhase {
        // non-empty, checked in new()
        &self.config.combi_phases[0]
    }

    pub fn initial_pair(&self) -> PhasePair {
        self.initial_pair
    }

    /// Walks the phases and reports each combi-phase once as green or red
    /// according to the colour of its phase's first link. A pair seen green
    /// from either member is not reported red.
    pub fn classify_links(&self, signal_state: &[LightState]) -> LinkClassification {
        let mut green = BTreeSet::new();
        let mut red = BTreeSet::new();
        let mut result = LinkClassification::default();

        for &phase in &self.active_phases {
            let Some(&first_link) = self.phase_links(phase).first() else {
                continue;
            };
            let pair = PhasePair::of(phase);
            match signal_state.get(first_link) {
                Some(LightState::Green) => {
                    if green.insert(pair) {
                        result.green_pairs.push(pair);
                    }
                }
                Some(LightState::Red) => {
                    if red.insert(pair) {
                        result.red_pairs.push(pair);
                    }
                }
                _ => {}
            }
        }

        result.red_pairs.retain(|pair| !green.contains(pair));
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reference() -> Intersection {
        Intersection::new(TopologyConfig::reference()).unwrap()
    }

    fn state(s: &str) -> Vec<LightState> {
        parse_signal_state(s).unwrap()
    }

    #[test]
    fn pairing_wraps_at_eight() {
        assert_eq!(paired_phase(2), 6);
        assert_eq!(paired_phase(6), 2);
        assert_eq!(paired_phase(4), 8);
        assert_eq!(paired_phase(8), 4);
        assert_eq!(paired_phase(1), 5);
    }

    #[test]
    fn pair_identity_is_order_free() {
        assert_eq!(PhasePair::of(2), PhasePair::of(6));
        assert_eq!(PhasePair::new(8, 4), PhasePair { low: 4, high: 8 });
        assert_eq!(PhasePair::of(8).slot(), 4);
    }

    #[test]
    fn through_green_yields_one_green_pair_and_three_red() {
        let intersection = reference();
        let result = intersection.classify_links(&state("GGGrrrrrGGGrrrrr"));
        assert_eq!(result.green_pairs, vec![PhasePair::new(2, 6)]);
        assert_eq!(
            result.red_pairs,
            vec![PhasePair::new(1, 5), PhasePair::new(3, 7), PhasePair::new(4, 8)]
        );
    }

    #[test]
    fn yellow_links_are_neither_green_nor_red() {
        let intersection = reference();
        let result = intersection.classify_links(&state("yyyrrrrryyyrrrrr"));
        assert!(result.green_pairs.is_empty());
        assert_eq!(result.red_pairs.len(), 3);
        assert!(!result.red_pairs.contains(&PhasePair::new(2, 6)));
    }

    #[test]
    fn half_green_pair_is_not_red() {
        let intersection = reference();
        // only the north through movement shows green
        let result = intersection.classify_links(&state("GGGrrrrrrrrrrrrr"));
        assert_eq!(result.green_pairs, vec![PhasePair::new(2, 6)]);
        assert!(!result.red_pairs.contains(&PhasePair::new(2, 6)));
    }

    #[test]
    fn classification_is_idempotent() {
        let intersection = reference();
        let snapshot = state("rrrrGGGrrrrrGGGr");
        assert_eq!(
            intersection.classify_links(&snapshot),
            intersection.classify_links(&snapshot)
        );
    }

    #[test]
    fn pair_sum_lookup() {
        let intersection = reference();
        assert_eq!(intersection.phase_for_pair_sum(8), Some(0));
        assert_eq!(intersection.phase_for_pair_sum(6), Some(2));
        assert_eq!(intersection.phase_for_pair_sum(12), Some(4));
        assert_eq!(intersection.phase_for_pair_sum(10), Some(6));
        assert_eq!(intersection.phase_for_pair_sum(7), None);
        assert_eq!(intersection.pair_for_program_phase(4), Some(PhasePair::new(4, 8)));
    }

    #[test]
    fn detectors_follow_links() {
        let intersection = reference();
        assert_eq!(intersection.detectors_for_link(1), vec!["N_T"]);
        assert!(intersection.detectors_for_link(2).is_empty());
        assert_eq!(intersection.detectors_for_phase(2), vec!["N_TR", "N_T"]);
        assert_eq!(intersection.detectors_for_phase(7), vec!["W_L"]);
    }

    #[test]
    fn missing_pair_sum_is_rejected_at_construction() {
        let mut config = TopologyConfig::reference();
        config.combi_phases.retain(|c| c.pair_sum != 10);
        match Intersection::new(config) {
            Err(ConfigError::TopologyLookup { sum, low, high }) => {
                assert_eq!((sum, low, high), (10, 3, 7));
            }
            other => panic!("expected lookup failure, got {:?}", other),
        }
    }

    #[test]
    fn combi_phase_without_a_pair_is_rejected() {
        let mut config = TopologyConfig::reference();
        config.combi_phases.insert(
            0,
            CombiPhase {
                pair_sum: 7,
                green_program_phase: 0,
                yellow_program_phase: 1,
            },
        );
        assert!(matches!(
            Intersection::new(config),
            Err(ConfigError::UnservedCombiPhase { sum: 7 })
        ));
    }

    #[test]
    fn repeated_pair_sum_is_rejected() {
        let mut config = TopologyConfig::reference();
        let first = config.combi_phases[0];
        config.combi_phases.push(first);
        assert!(matches!(
            Intersection::new(config),
            Err(ConfigError::DuplicateCombiPhase { sum: 8 })
        ));
    }

    #[test]
    fn initial_pair_follows_the_first_combi_phase() {
        assert_eq!(reference().initial_pair(), PhasePair::new(2, 6));
    }

    #[test]
    fn unpaired_phase_is_rejected() {
        let mut config = TopologyConfig::reference();
        config.phases[7] = None;
        assert!(matches!(
            Intersection::new(config),
            Err(ConfigError::UnpairedPhase { phase: 3, partner: 7 })
        ));
    }

    #[test]
    fn detector_on_missing_link_is_rejected() {
        let mut config = TopologyConfig::reference();
        config.detectors.push(DetectorBinding {
            id: "ghost".to_string(),
            link: 99,
        });
        assert!(matches!(
            Intersection::new(config),
            Err(ConfigError::LinkOutOfRange { link: 99, .. })
        ));
    }

    #[test]
    fn malformed_state_is_an_error() {
        assert!(matches!(
            parse_signal_state("GGx"),
            Err(ControlError::MalformedSignalState { symbol: 'x', .. })
        ));
    }
}
