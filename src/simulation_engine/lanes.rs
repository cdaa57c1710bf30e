use std::collections::{BTreeMap, VecDeque};

use crate::shared_data::DetectorReading;
use crate::simulation_engine::intersections::LinkIndex;
use crate::simulation_engine::vehicles::Vehicle;

/// Road space one queued vehicle takes: 5 m body plus 2.5 m gap.
pub const VEHICLE_SPACING_METERS: f64 = 7.5;
/// Detector coverage of every approach lane.
pub const DETECTOR_LENGTH_METERS: f64 = 225.0;

#[derive(Debug, Clone, PartialEq)]
pub struct QueuedVehicle {
    pub id: String,
    pub waiting: f64,
}

/// An approach lane feeding one link, watched by one detector.
///
/// Vehicles that do not fit on the detector wait upstream and are not
/// reported until space frees up.
#[derive(Debug, Clone)]
pub struct Lane {
    pub detector_id: String,
    pub link: LinkIndex,
    pub length_meters: f64,
    queue: VecDeque<QueuedVehicle>,
    upstream: VecDeque<QueuedVehicle>,
}

impl Lane {
    pub fn new(detector_id: &str, link: LinkIndex, length_meters: f64) -> Self {
        Self {
            detector_id: detector_id.to_string(),
            link,
            length_meters,
            queue: VecDeque::new(),
            upstream: VecDeque::new(),
        }
    }

    pub fn capacity(&self) -> usize {
        (self.length_meters / VEHICLE_SPACING_METERS).floor() as usize
    }

    pub fn can_add_vehicle(&self) -> bool {
        self.upstream.is_empty() && self.queue.len() < self.capacity()
    }

    pub fn add_vehicle(&mut self, vehicle: &Vehicle) {
        let queued = QueuedVehicle {
            id: vehicle.id.clone(),
            waiting: 0.0,
        };
        if self.can_add_vehicle() {
            self.queue.push_back(queued);
        } else {
            self.upstream.push_back(queued);
        }
    }

    /// Lets the head vehicle cross the stop line.
    pub fn discharge(&mut self) -> Option<QueuedVehicle> {
        let leaving = self.queue.pop_front()?;
        if let Some(next) = self.upstream.pop_front() {
            self.queue.push_back(next);
        }
        Some(leaving)
    }

    /// Every vehicle still held at the lane accrues waiting time.
    pub fn accrue_waiting(&mut self, seconds: f64) {
        for vehicle in self.queue.iter_mut().chain(self.upstream.iter_mut()) {
            vehicle.waiting += seconds;
        }
    }

    pub fn vehicle_count(&self) -> usize {
        self.queue.len() + self.upstream.len()
    }

    pub fn reading(&self) -> DetectorReading {
        DetectorReading {
            vehicle_count: self.queue.len() as u32,
            vehicle_waiting_times: self
                .queue
                .iter()
                .map(|v| (v.id.clone(), v.waiting))
                .collect::<BTreeMap<_, _>>(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulation_engine::vehicles::{Approach, Movement};

    fn vehicle(n: usize) -> Vehicle {
        Vehicle::new(n, Approach::Northbound, Movement::Through, 0)
    }

    #[test]
    fn detector_sees_at_most_capacity() {
        let mut lane = Lane::new("N_T", 1, 30.0);
        assert_eq!(lane.capacity(), 4);
        for n in 0..6 {
            lane.add_vehicle(&vehicle(n));
        }
        assert_eq!(lane.reading().vehicle_count, 4);
        assert_eq!(lane.vehicle_count(), 6);
    }

    #[test]
    fn discharge_pulls_from_upstream() {
        let mut lane = Lane::new("N_T", 1, 15.0);
        for n in 0..3 {
            lane.add_vehicle(&vehicle(n));
        }
        let first = lane.discharge().unwrap();
        assert_eq!(first.id, "Northbound.T_0");
        assert_eq!(lane.reading().vehicle_count, 2);
        assert_eq!(lane.vehicle_count(), 2);
    }

    #[test]
    fn waiting_accrues_per_vehicle() {
        let mut lane = Lane::new("N_T", 1, DETECTOR_LENGTH_METERS);
        lane.add_vehicle(&vehicle(0));
        lane.accrue_waiting(1.0);
        lane.add_vehicle(&vehicle(1));
        lane.accrue_waiting(1.0);
        let reading = lane.reading();
        assert_eq!(reading.vehicle_waiting_times["Northbound.T_0"], 2.0);
        assert_eq!(reading.vehicle_waiting_times["Northbound.T_1"], 1.0);
        assert_eq!(reading.average_waiting(), 1.5);
    }
}
