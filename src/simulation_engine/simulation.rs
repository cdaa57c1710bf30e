// simulation.rs
use std::time::{Duration, Instant};

use thiserror::Error;

use crate::config::SimulationConfig;
use crate::control_system::traffic_light_controller::Controller;
use crate::error::ControlError;
use crate::monitoring::sample_store::SampleSink;
use crate::monitoring::sampler::CycleSampler;
use crate::shared_data::CycleSample;
use crate::simulation_engine::environment::Environment;
use crate::simulation_engine::intersections::Intersection;

/// Outcome of one control run.
#[derive(Debug, Clone)]
pub struct RunReport {
    pub label: String,
    pub ticks: u64,
    pub elapsed: Duration,
    pub samples: Vec<CycleSample>,
}

/// A run that stopped on an error; the partial report is kept.
#[derive(Debug, Error)]
#[error(
    "run '{}' aborted after {} ticks ({:.2?}, {} samples): {}",
    .report.label,
    .report.ticks,
    .report.elapsed,
    .report.samples.len(),
    .source
)]
pub struct RunAborted {
    pub report: RunReport,
    #[source]
    pub source: ControlError,
}

/// Drives `controller` against `env` until demand is served and the step
/// budget (`max_steps + drain_steps`) is spent, closing a sample every
/// `sample_period` seconds of simulation time.
pub fn run_control_loop(
    config: &SimulationConfig,
    intersection: &Intersection,
    env: &mut dyn Environment,
    controller: &mut dyn Controller,
    sink: &mut dyn SampleSink,
) -> Result<RunReport, RunAborted> {
    let started = Instant::now();
    let mut report = RunReport {
        label: controller.label().to_string(),
        ticks: 0,
        elapsed: Duration::ZERO,
        samples: Vec::new(),
    };

    log::info!(
        "Starting '{}' run on intersection {} ({} steps + {} drain)",
        report.label,
        intersection.id(),
        config.max_steps,
        config.drain_steps
    );

    let outcome = drive(config, intersection, env, controller, sink, &mut report);
    report.elapsed = started.elapsed();

    match outcome {
        Ok(()) => {
            log::info!(
                "Finished '{}' run: {} ticks, {} samples, {:.2?}",
                report.label,
                report.ticks,
                report.samples.len(),
                report.elapsed
            );
            Ok(report)
        }
        Err(source) => Err(RunAborted { report, source }),
    }
}

fn drive(
    config: &SimulationConfig,
    intersection: &Intersection,
    env: &mut dyn Environment,
    controller: &mut dyn Controller,
    sink: &mut dyn SampleSink,
    report: &mut RunReport,
) -> Result<(), ControlError> {
    let mut sampler = CycleSampler::new(&report.label);
    let step_budget = config.max_steps + config.drain_steps;

    sink.begin_run(&report.label)?;
    controller.start(env)?;
    while env.min_remaining_demand() > 0 || report.ticks < step_budget {
        env.advance_one_tick()?;
        report.ticks += 1;
        controller.on_tick(env)?;
        sampler.observe(intersection, &*env)?;

        let now = env.current_time();
        if now % config.sample_period == 0 {
            let sample = sampler.close_period(now);
            log::debug!(
                "[{}] cycle {} closed at t={}: max queue {}, avg waiting {:.1}s",
                sample.label,
                sample.cycle,
                now,
                sample.max_queue,
                sample.avg_waiting
            );
            sink.record(&sample)?;
            report.samples.push(sample);
        }
    }
    Ok(())
}
