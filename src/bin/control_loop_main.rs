use std::path::PathBuf;
use std::process::ExitCode;
use std::rc::Rc;

use clap::{Parser, ValueEnum};

use adaptive_signal_control::config::SimulationConfig;
use adaptive_signal_control::control_system::traffic_light_controller::{
    AdaptiveFuzzyController, Controller, FixedTimeController,
};
use adaptive_signal_control::monitoring::sample_store::CsvSampleStore;
use adaptive_signal_control::monitoring::visualizer::plot_samples;
use adaptive_signal_control::simulation_engine::queue_intersection::QueueIntersection;
use adaptive_signal_control::simulation_engine::route_generation::generate_demand;
use adaptive_signal_control::simulation_engine::simulation::run_control_loop;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum ControllerKind {
    /// Replay the configured signal program
    Fixed,
    /// Fuzzy green extension and urgency-based phase selection
    Fuzzy,
}

/// Runs one signal controller against the queue-model intersection and
/// records per-cycle queue and waiting samples.
#[derive(Parser, Debug)]
#[command(name = "control_loop_main")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Controller to run
    #[arg(short, long, value_enum, default_value = "fuzzy")]
    controller: ControllerKind,

    /// JSON configuration; missing fields keep their defaults
    #[arg(long)]
    config: Option<PathBuf>,

    /// Skip writing the PNG charts
    #[arg(long)]
    no_plots: bool,

    /// Override the demand seed
    #[arg(long)]
    seed: Option<u64>,

    /// Override the number of demand steps
    #[arg(long)]
    max_steps: Option<u64>,
}

fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => match SimulationConfig::from_json_file(path) {
            Ok(config) => config,
            Err(e) => {
                log::error!("Could not load {}: {}", path.display(), e);
                return ExitCode::FAILURE;
            }
        },
        None => SimulationConfig::default(),
    };
    if let Some(seed) = cli.seed {
        config.seed = seed;
    }
    if let Some(max_steps) = cli.max_steps {
        config.max_steps = max_steps;
    }

    let intersection = match config.validate() {
        Ok(intersection) => Rc::new(intersection),
        Err(e) => {
            log::error!("Invalid configuration: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let demand = generate_demand(&config);
    let mut env = match QueueIntersection::new(&config, demand) {
        Ok(env) => env,
        Err(e) => {
            log::error!("Could not build the intersection: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let mut controller: Box<dyn Controller> = match cli.controller {
        ControllerKind::Fixed => Box::new(FixedTimeController::new(Rc::clone(&intersection))),
        ControllerKind::Fuzzy => {
            match AdaptiveFuzzyController::new(Rc::clone(&intersection), &config) {
                Ok(controller) => Box::new(controller),
                Err(e) => {
                    log::error!("Could not build the fuzzy controller: {}", e);
                    return ExitCode::FAILURE;
                }
            }
        }
    };

    println!("Starting {} controller...", controller.label());
    let mut sink = CsvSampleStore::new(&config.samples_dir);
    let report = match run_control_loop(
        &config,
        &intersection,
        &mut env,
        controller.as_mut(),
        &mut sink,
    ) {
        Ok(report) => report,
        Err(aborted) => {
            log::error!("{}", aborted);
            return ExitCode::FAILURE;
        }
    };

    println!(
        "{} controller: {} ticks, {} vehicles served, {} samples in {} ({:.2?})",
        report.label,
        report.ticks,
        env.discharged(),
        report.samples.len(),
        sink.path_for(&report.label).display(),
        report.elapsed
    );
    for sample in &report.samples {
        println!(
            "  cycle {:>3} t={:>5}  max queue {:>3}  avg waiting {:>7.1}s",
            sample.cycle, sample.time, sample.max_queue, sample.avg_waiting
        );
    }

    if !cli.no_plots {
        if let Err(e) = plot_samples(&config.plots_dir, &report.label, &report.samples) {
            log::error!("Could not draw charts: {}", e);
            return ExitCode::FAILURE;
        }
    }
    ExitCode::SUCCESS
}
