pub mod phase_aggregates;

pub use phase_aggregates::{
    collect_phase_aggregates, read_detectors, FlowAggregates, PhaseAggregate,
};
