use std::collections::VecDeque;

use crate::config::{ProgramPhase, SimulationConfig};
use crate::error::{ConfigError, ControlError};
use crate::shared_data::{DetectorReading, SimTime};
use crate::simulation_engine::environment::Environment;
use crate::simulation_engine::intersections::{parse_signal_state, LightState};
use crate::simulation_engine::lanes::{Lane, DETECTOR_LENGTH_METERS};
use crate::simulation_engine::vehicles::Vehicle;

/// Queue-model intersection: one FIFO per detector lane, one vehicle per
/// green lane per second crosses the stop line, the signal program
/// advances on its own unless a phase is set explicitly. A phase change at
/// the end of a tick, automatic or explicit, first takes effect for the
/// next second, so a controller overriding an expiring phase is never
/// preceded by a second of the program's own next phase.
pub struct QueueIntersection {
    intersection_id: String,
    time: SimTime,
    program: Vec<ProgramPhase>,
    signals: Vec<Vec<LightState>>,
    phase: usize,
    remaining_in_phase: SimTime,
    lanes: Vec<Lane>,
    pending: VecDeque<Vehicle>,
    discharged: usize,
}

impl QueueIntersection {
    pub fn new(config: &SimulationConfig, mut demand: Vec<Vehicle>) -> Result<Self, ConfigError> {
        if config.program.is_empty() {
            return Err(ConfigError::InvalidTiming("signal program is empty".to_string()));
        }
        let signals = config
            .program
            .iter()
            .map(|step| {
                parse_signal_state(&step.state).map_err(|e| ConfigError::InvalidTiming(e.to_string()))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let lanes: Vec<Lane> = config
            .topology
            .detectors
            .iter()
            .map(|d| Lane::new(&d.id, d.link, DETECTOR_LENGTH_METERS))
            .collect();

        let before = demand.len();
        demand.retain(|v| lanes.iter().any(|l| l.detector_id == v.detector_id()));
        if demand.len() < before {
            log::warn!(
                "Dropped {} vehicles whose lane has no detector",
                before - demand.len()
            );
        }
        demand.sort_by_key(|v| v.depart);

        Ok(Self {
            intersection_id: config.topology.intersection_id.clone(),
            time: 0,
            remaining_in_phase: config.program[0].duration.max(1),
            program: config.program.clone(),
            signals,
            phase: 0,
            lanes,
            pending: demand.into(),
            discharged: 0,
        })
    }

    pub fn current_program_phase(&self) -> usize {
        self.phase
    }

    /// Vehicles that have crossed the stop line so far.
    pub fn discharged(&self) -> usize {
        self.discharged
    }

    fn check_id(&self, intersection_id: &str) -> Result<(), ControlError> {
        if intersection_id == self.intersection_id {
            Ok(())
        } else {
            Err(ControlError::EnvironmentUnavailable(format!(
                "unknown intersection '{}'",
                intersection_id
            )))
        }
    }

    fn program_step(&self, phase_index: usize) -> Result<&ProgramPhase, ControlError> {
        self.program.get(phase_index).ok_or_else(|| {
            ControlError::EnvironmentUnavailable(format!(
                "program has no phase {} ({} phases)",
                phase_index,
                self.program.len()
            ))
        })
    }
}

impl Environment for QueueIntersection {
    fn advance_one_tick(&mut self) -> Result<(), ControlError> {
        self.time += 1;

        // the second just elapsed ran under the phase set at its start
        let signal = &self.signals[self.phase];
        for lane in &mut self.lanes {
            if signal.get(lane.link) == Some(&LightState::Green) && lane.discharge().is_some() {
                self.discharged += 1;
            }
            lane.accrue_waiting(1.0);
        }

        self.remaining_in_phase = self.remaining_in_phase.saturating_sub(1);
        if self.remaining_in_phase == 0 {
            self.phase = (self.phase + 1) % self.program.len();
            self.remaining_in_phase = self.program[self.phase].duration.max(1);
        }

        while self.pending.front().is_some_and(|v| v.depart <= self.time) {
            let Some(vehicle) = self.pending.pop_front() else {
                break;
            };
            let detector_id = vehicle.detector_id();
            if let Some(lane) = self.lanes.iter_mut().find(|l| l.detector_id == detector_id) {
                lane.add_vehicle(&vehicle);
            }
        }
        Ok(())
    }

    fn current_time(&self) -> SimTime {
        self.time
    }

    fn min_remaining_demand(&self) -> usize {
        self.pending.len() + self.lanes.iter().map(Lane::vehicle_count).sum::<usize>()
    }

    fn read_detector(&self, id: &str) -> Result<DetectorReading, ControlError> {
        self.lanes
            .iter()
            .find(|l| l.detector_id == id)
            .map(Lane::reading)
            .ok_or_else(|| ControlError::EnvironmentUnavailable(format!("unknown detector '{}'", id)))
    }

    fn signal_state(&self, intersection_id: &str) -> Result<String, ControlError> {
        self.check_id(intersection_id)?;
        Ok(self.program[self.phase].state.clone())
    }

    fn set_phase(&mut self, intersection_id: &str, phase_index: usize) -> Result<(), ControlError> {
        self.check_id(intersection_id)?;
        let duration = self.program_step(phase_index)?.duration;
        self.phase = phase_index;
        self.remaining_in_phase = duration.max(1);
        Ok(())
    }

    fn configured_phase_duration(
        &self,
        intersection_id: &str,
        phase_index: usize,
    ) -> Result<SimTime, ControlError> {
        self.check_id(intersection_id)?;
        Ok(self.program_step(phase_index)?.duration)
    }
}
