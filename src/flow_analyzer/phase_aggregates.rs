use crate::error::ControlError;
use crate::global_variables::PHASE_SLOTS;
use crate::shared_data::DetectorReading;
use crate::simulation_engine::environment::Environment;
use crate::simulation_engine::intersections::{Intersection, PhaseIndex, PhasePair};

/// Demand on one flow (or one combi-phase) for the current tick.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PhaseAggregate {
    /// Largest last-step vehicle count among the member detectors.
    pub queue: u32,
    /// Largest per-detector mean waiting time among the member detectors.
    pub waiting: f64,
}

impl PhaseAggregate {
    fn absorb(&mut self, reading: &DetectorReading) {
        self.queue = self.queue.max(reading.vehicle_count);
        self.waiting = self.waiting.max(reading.average_waiting());
    }

    fn merge(self, other: PhaseAggregate) -> PhaseAggregate {
        PhaseAggregate {
            queue: self.queue.max(other.queue),
            waiting: self.waiting.max(other.waiting),
        }
    }
}

/// Per-phase aggregates for one tick, indexed by phase.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FlowAggregates {
    flows: [PhaseAggregate; PHASE_SLOTS],
}

impl FlowAggregates {
    /// Builds aggregates from readings given in the topology's detector order.
    pub fn from_readings(intersection: &Intersection, readings: &[DetectorReading]) -> Self {
        let mut aggregates = Self::default();
        for &phase in intersection.active_phases() {
            let links = intersection.phase_links(phase);
            let slot = &mut aggregates.flows[phase];
            for (binding, reading) in intersection.detectors().iter().zip(readings) {
                if links.contains(&binding.link) {
                    slot.absorb(reading);
                }
            }
        }
        aggregates
    }

    pub fn flow(&self, phase: PhaseIndex) -> PhaseAggregate {
        self.flows.get(phase).copied().unwrap_or_default()
    }

    /// Combined demand of both flows of a combi-phase.
    pub fn pair(&self, pair: PhasePair) -> PhaseAggregate {
        self.flow(pair.low).merge(self.flow(pair.high))
    }
}

/// Reads every configured detector once.
pub fn read_detectors<E: Environment + ?Sized>(
    intersection: &Intersection,
    env: &E,
) -> Result<Vec<DetectorReading>, ControlError> {
    intersection
        .detectors()
        .iter()
        .map(|binding| env.read_detector(&binding.id))
        .collect()
}

pub fn collect_phase_aggregates<E: Environment + ?Sized>(
    intersection: &Intersection,
    env: &E,
) -> Result<FlowAggregates, ControlError> {
    let readings = read_detectors(intersection, env)?;
    Ok(FlowAggregates::from_readings(intersection, &readings))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulation_engine::intersections::TopologyConfig;

    fn reading(count: u32, waits: &[f64]) -> DetectorReading {
        let mut reading = DetectorReading {
            vehicle_count: count,
            ..Default::default()
        };
        for (i, &w) in waits.iter().enumerate() {
            reading.vehicle_waiting_times.insert(format!("v{}", i), w);
        }
        reading
    }

    #[test]
    fn aggregates_take_the_max_over_member_detectors() {
        let intersection = Intersection::new(TopologyConfig::reference()).unwrap();
        let mut readings = vec![DetectorReading::default(); intersection.detectors().len()];
        // N_TR, N_T feed phase 2; S_T feeds phase 6
        readings[0] = reading(3, &[10.0, 20.0]);
        readings[1] = reading(5, &[2.0]);
        readings[7] = reading(4, &[40.0]);

        let aggregates = FlowAggregates::from_readings(&intersection, &readings);
        assert_eq!(aggregates.flow(2), PhaseAggregate { queue: 5, waiting: 15.0 });
        assert_eq!(aggregates.flow(6), PhaseAggregate { queue: 4, waiting: 40.0 });
        assert_eq!(
            aggregates.pair(PhasePair::of(6)),
            PhaseAggregate { queue: 5, waiting: 40.0 }
        );
        assert_eq!(aggregates.flow(3), PhaseAggregate::default());
    }

    #[test]
    fn null_phase_is_empty() {
        let intersection = Intersection::new(TopologyConfig::reference()).unwrap();
        let readings = vec![reading(9, &[99.0]); intersection.detectors().len()];
        let aggregates = FlowAggregates::from_readings(&intersection, &readings);
        assert_eq!(aggregates.flow(0), PhaseAggregate::default());
        assert_eq!(aggregates.flow(42), PhaseAggregate::default());
    }
}
