use std::rc::Rc;

use crate::config::TimingConfig;
use crate::control_system::green_extension::GreenExtensionController;
use crate::control_system::urgency::UrgencyController;
use crate::error::{ConfigError, ControlError};
use crate::flow_analyzer::collect_phase_aggregates;
use crate::shared_data::SimTime;
use crate::simulation_engine::environment::Environment;
use crate::simulation_engine::intersections::{parse_signal_state, Intersection, PhasePair};

/// Seconds to add to the running green, given the queues of its two flows.
pub trait ExtensionAdvisor {
    fn extension(&self, flow1_queue: u32, flow2_queue: u32) -> u32;
}

/// Urgency score of a red combi-phase.
pub trait UrgencyAdvisor {
    fn urgency(&self, queue_length: u32, waiting_time: f64) -> u32;
}

/// Mutable record of the controller. Only the state machine touches it.
#[derive(Debug, Clone, PartialEq)]
pub struct ControlState {
    /// Signal-program phase currently green (or turning yellow).
    pub current_phase: usize,
    pub current_pair: PhasePair,
    pub next_phase: usize,
    pub next_pair: PhasePair,
    pub is_green: bool,
    pub phase_start: SimTime,
    /// Next decision point while green.
    pub phase_deadline: SimTime,
    /// Latest time the current green may run to.
    pub max_green: SimTime,
    pub yellow_start_time: SimTime,
    pub max_urgency_seen: u32,
}

/// Outcome of one tick.
#[derive(Debug, Clone, PartialEq)]
pub enum Decision {
    /// Not at a decision point.
    Idle,
    /// Green held until `deadline`.
    Extend { extension: u32, deadline: SimTime },
    /// Green ran out but no red combi-phase is waiting; checked again next tick.
    AwaitCandidate,
    BeginYellow {
        yellow_phase: usize,
        next_phase: usize,
        winner: PhasePair,
        urgency: u32,
    },
    ActivateGreen {
        phase: usize,
        deadline: SimTime,
        max_green: SimTime,
    },
}

/// GREEN/YELLOW machine deciding hold, extend or switch once per tick.
pub struct PhaseStateMachine<G = GreenExtensionController, U = UrgencyController> {
    intersection: Rc<Intersection>,
    timing: TimingConfig,
    extender: G,
    urgency: U,
    state: ControlState,
    started: bool,
}

impl PhaseStateMachine {
    pub fn new(intersection: Rc<Intersection>, timing: TimingConfig) -> Self {
        Self::with_advisors(
            intersection,
            timing,
            GreenExtensionController::new(),
            UrgencyController::new(),
        )
    }
}

impl<G: ExtensionAdvisor, U: UrgencyAdvisor> PhaseStateMachine<G, U> {
    pub fn with_advisors(
        intersection: Rc<Intersection>,
        timing: TimingConfig,
        extender: G,
        urgency: U,
    ) -> Self {
        let initial_phase = intersection.initial_combi_phase().green_program_phase;
        let initial_pair = intersection.initial_pair();

        Self {
            intersection,
            timing,
            extender,
            urgency,
            state: ControlState {
                current_phase: initial_phase,
                current_pair: initial_pair,
                next_phase: initial_phase,
                next_pair: initial_pair,
                is_green: true,
                phase_start: 0,
                phase_deadline: 0,
                max_green: 0,
                yellow_start_time: 0,
                max_urgency_seen: 0,
            },
            started: false,
        }
    }

    pub fn state(&self) -> &ControlState {
        &self.state
    }

    pub fn intersection(&self) -> &Intersection {
        &self.intersection
    }

    /// Activates the first configured combi-phase at the current time.
    pub fn start<E: Environment + ?Sized>(&mut self, env: &mut E) -> Result<(), ControlError> {
        let t = env.current_time();
        let phase = self.state.current_phase;
        self.open_green(t, phase, self.state.current_pair, env)?;
        self.started = true;
        Ok(())
    }

    pub fn step<E: Environment + ?Sized>(&mut self, env: &mut E) -> Result<Decision, ControlError> {
        if !self.started {
            self.start(env)?;
        }
        let t = env.current_time();

        if self.state.is_green {
            if t < self.state.phase_deadline {
                return Ok(Decision::Idle);
            }
            self.decide_at_deadline(t, env)
        } else {
            if t.saturating_sub(self.state.yellow_start_time) < self.timing.yellow {
                return Ok(Decision::Idle);
            }
            let (phase, pair) = (self.state.next_phase, self.state.next_pair);
            self.open_green(t, phase, pair, env)
        }
    }

    fn decide_at_deadline<E: Environment + ?Sized>(
        &mut self,
        t: SimTime,
        env: &mut E,
    ) -> Result<Decision, ControlError> {
        let intersection = Rc::clone(&self.intersection);
        let signal = parse_signal_state(&env.signal_state(intersection.id())?)?;
        let classification = intersection.classify_links(&signal);
        let aggregates = collect_phase_aggregates(&intersection, &*env)?;

        let green_pair = classification
            .green_pairs
            .first()
            .copied()
            .unwrap_or(self.state.current_pair);
        let flow1 = aggregates.flow(green_pair.low).queue;
        let flow2 = aggregates.flow(green_pair.high).queue;
        let extension = self.extender.extension(flow1, flow2);

        if extension > 0 && t + u64::from(extension) <= self.state.max_green {
            self.state.phase_deadline = t + u64::from(extension);
            log::info!(
                "[{}] t={} phase {} extended by {}s (queues {}/{}), next check at {}",
                intersection.id(),
                t,
                self.state.current_phase,
                extension,
                flow1,
                flow2,
                self.state.phase_deadline
            );
            return Ok(Decision::Extend {
                extension,
                deadline: self.state.phase_deadline,
            });
        }

        self.state.max_urgency_seen = 0;
        let mut winner: Option<(PhasePair, u32)> = None;
        for &pair in &classification.red_pairs {
            if pair == self.state.current_pair {
                continue;
            }
            let demand = aggregates.pair(pair);
            let urgency = self.urgency.urgency(demand.queue, demand.waiting);
            log::debug!(
                "[{}] t={} pair {:?}: queue {} waiting {:.1}s urgency {}",
                intersection.id(),
                t,
                pair,
                demand.queue,
                demand.waiting,
                urgency
            );
            // first candidate always taken, later ones only if strictly more urgent
            let better = match winner {
                None => true,
                Some((_, best)) => urgency > best,
            };
            if better {
                winner = Some((pair, urgency));
                self.state.max_urgency_seen = urgency;
            }
        }

        let Some((pair, urgency)) = winner else {
            self.state.phase_deadline = t + 1;
            log::warn!(
                "[{}] t={} no red combi-phase to serve, holding phase {}",
                intersection.id(),
                t,
                self.state.current_phase
            );
            return Ok(Decision::AwaitCandidate);
        };

        let lookup_failure = || ConfigError::TopologyLookup {
            sum: pair.sum(),
            low: pair.low,
            high: pair.high,
        };
        let next_phase = intersection
            .phase_for_pair_sum(pair.sum())
            .ok_or_else(lookup_failure)?;
        let yellow_phase = intersection
            .combi_phase_for_program_phase(self.state.current_phase)
            .map(|c| c.yellow_program_phase)
            .ok_or_else(|| {
                let current = self.state.current_pair;
                ConfigError::TopologyLookup {
                    sum: current.sum(),
                    low: current.low,
                    high: current.high,
                }
            })?;

        env.set_phase(intersection.id(), yellow_phase)?;
        self.state.is_green = false;
        self.state.yellow_start_time = t;
        self.state.next_phase = next_phase;
        self.state.next_pair = pair;

        log::info!(
            "[{}] t={} phase {} -> yellow {}, next phase {} (pair {:?}, urgency {})",
            intersection.id(),
            t,
            self.state.current_phase,
            yellow_phase,
            next_phase,
            pair,
            urgency
        );
        Ok(Decision::BeginYellow {
            yellow_phase,
            next_phase,
            winner: pair,
            urgency,
        })
    }

    fn open_green<E: Environment + ?Sized>(
        &mut self,
        t: SimTime,
        phase: usize,
        pair: PhasePair,
        env: &mut E,
    ) -> Result<Decision, ControlError> {
        let id = self.intersection.id().to_string();
        env.set_phase(&id, phase)?;
        let duration = env.configured_phase_duration(&id, phase)?;

        self.state.current_phase = phase;
        self.state.current_pair = pair;
        self.state.is_green = true;
        self.state.phase_start = t;
        self.state.phase_deadline = t + self.timing.min_green;
        self.state.max_green = t + duration.max(self.timing.min_green);
        self.state.max_urgency_seen = 0;

        log::info!(
            "[{}] t={} phase {} green (pair {:?}), decide at {}, max green {}",
            id,
            t,
            phase,
            pair,
            self.state.phase_deadline,
            self.state.max_green
        );
        Ok(Decision::ActivateGreen {
            phase,
            deadline: self.state.phase_deadline,
            max_green: self.state.max_green,
        })
    }
}
