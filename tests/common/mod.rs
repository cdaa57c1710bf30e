#![allow(dead_code)]

use std::collections::{BTreeMap, HashMap};

use adaptive_signal_control::config::{ProgramPhase, SimulationConfig};
use adaptive_signal_control::error::ControlError;
use adaptive_signal_control::shared_data::{DetectorReading, SimTime};
use adaptive_signal_control::simulation_engine::environment::Environment;
use adaptive_signal_control::simulation_engine::intersections::{
    CombiPhase, DetectorBinding, TopologyConfig,
};

/// Two combi-phases on four links: (2,6) on links 0/1, (4,8) on links 2/3.
pub fn two_pair_topology() -> TopologyConfig {
    let detector = |id: &str, link| DetectorBinding {
        id: id.to_string(),
        link,
    };
    TopologyConfig {
        intersection_id: "X".to_string(),
        link_count: 4,
        phases: vec![
            None,
            None,
            Some(vec![0]),
            None,
            Some(vec![2]),
            None,
            Some(vec![1]),
            None,
            Some(vec![3]),
        ],
        detectors: vec![
            detector("A", 0),
            detector("B", 1),
            detector("C", 2),
            detector("D", 3),
        ],
        combi_phases: vec![
            CombiPhase {
                pair_sum: 8,
                green_program_phase: 0,
                yellow_program_phase: 1,
            },
            CombiPhase {
                pair_sum: 12,
                green_program_phase: 2,
                yellow_program_phase: 3,
            },
        ],
    }
}

pub fn two_pair_program(green: SimTime) -> Vec<ProgramPhase> {
    vec![
        ProgramPhase::new("GGrr", green),
        ProgramPhase::new("yyrr", 4),
        ProgramPhase::new("rrGG", green),
        ProgramPhase::new("rryy", 4),
    ]
}

pub fn two_pair_config(green: SimTime) -> SimulationConfig {
    SimulationConfig {
        topology: two_pair_topology(),
        program: two_pair_program(green),
        ..Default::default()
    }
}

/// Environment whose detector readings are set by the test. The signal
/// only changes through `set_phase`.
pub struct ScriptedEnv {
    pub id: String,
    pub time: SimTime,
    pub phase: usize,
    pub program: Vec<ProgramPhase>,
    pub readings: HashMap<String, DetectorReading>,
    pub commands: Vec<(SimTime, usize)>,
    /// Every call fails from this time on.
    pub fail_from: Option<SimTime>,
}

impl ScriptedEnv {
    pub fn new(config: &SimulationConfig) -> Self {
        Self {
            id: config.topology.intersection_id.clone(),
            time: 0,
            phase: 0,
            program: config.program.clone(),
            readings: HashMap::new(),
            commands: Vec::new(),
            fail_from: None,
        }
    }

    /// `count` vehicles on `detector`, each having waited `waiting` seconds.
    pub fn set_queue(&mut self, detector: &str, count: u32, waiting: f64) {
        let vehicle_waiting_times: BTreeMap<String, f64> = (0..count)
            .map(|n| (format!("{}_{}", detector, n), waiting))
            .collect();
        self.readings.insert(
            detector.to_string(),
            DetectorReading {
                vehicle_count: count,
                vehicle_waiting_times,
            },
        );
    }

    fn check(&self) -> Result<(), ControlError> {
        match self.fail_from {
            Some(t) if self.time >= t => Err(ControlError::EnvironmentUnavailable(
                "scripted outage".to_string(),
            )),
            _ => Ok(()),
        }
    }

    fn program_step(&self, phase_index: usize) -> Result<&ProgramPhase, ControlError> {
        self.program.get(phase_index).ok_or_else(|| {
            ControlError::EnvironmentUnavailable(format!("no program phase {}", phase_index))
        })
    }
}

impl Environment for ScriptedEnv {
    fn advance_one_tick(&mut self) -> Result<(), ControlError> {
        self.check()?;
        self.time += 1;
        Ok(())
    }

    fn current_time(&self) -> SimTime {
        self.time
    }

    fn min_remaining_demand(&self) -> usize {
        0
    }

    fn read_detector(&self, id: &str) -> Result<DetectorReading, ControlError> {
        self.check()?;
        Ok(self.readings.get(id).cloned().unwrap_or_default())
    }

    fn signal_state(&self, _intersection_id: &str) -> Result<String, ControlError> {
        self.check()?;
        Ok(self.program_step(self.phase)?.state.clone())
    }

    fn set_phase(&mut self, _intersection_id: &str, phase_index: usize) -> Result<(), ControlError> {
        self.check()?;
        self.program_step(phase_index)?;
        self.phase = phase_index;
        self.commands.push((self.time, phase_index));
        Ok(())
    }

    fn configured_phase_duration(
        &self,
        _intersection_id: &str,
        phase_index: usize,
    ) -> Result<SimTime, ControlError> {
        Ok(self.program_step(phase_index)?.duration)
    }
}
