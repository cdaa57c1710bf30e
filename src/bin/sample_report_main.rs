use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use adaptive_signal_control::config::SimulationConfig;
use adaptive_signal_control::monitoring::sample_store::{load_samples, samples_path};
use adaptive_signal_control::monitoring::visualizer::{plot_comparison, plot_samples};
use adaptive_signal_control::shared_data::CycleSample;

/// Draws charts from the sample CSVs written by `control_loop_main`.
#[derive(Parser, Debug)]
#[command(name = "sample_report_main")]
#[command(version, about, long_about = None)]
struct Cli {
    /// JSON configuration naming the samples and plots directories
    #[arg(long)]
    config: Option<PathBuf>,

    /// Controller labels to report on
    #[arg(short, long, default_values = ["fixed", "fuzzy"])]
    labels: Vec<String>,
}

fn summarize(samples: &[CycleSample]) -> (u32, f64) {
    let peak_queue = samples.iter().map(|s| s.max_queue).max().unwrap_or(0);
    let mean_waiting = if samples.is_empty() {
        0.0
    } else {
        samples.iter().map(|s| s.avg_waiting).sum::<f64>() / samples.len() as f64
    };
    (peak_queue, mean_waiting)
}

fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => match SimulationConfig::from_json_file(path) {
            Ok(config) => config,
            Err(e) => {
                log::error!("Could not load {}: {}", path.display(), e);
                return ExitCode::FAILURE;
            }
        },
        None => SimulationConfig::default(),
    };

    let mut runs: Vec<(String, Vec<CycleSample>)> = Vec::new();
    for label in &cli.labels {
        let path = samples_path(&config.samples_dir, label);
        if !path.exists() {
            println!("No samples for '{}' at {}", label, path.display());
            continue;
        }
        match load_samples(&config.samples_dir, label) {
            Ok(samples) => runs.push((label.clone(), samples)),
            Err(e) => {
                log::error!("Could not read {}: {}", path.display(), e);
                return ExitCode::FAILURE;
            }
        }
    }

    if runs.is_empty() {
        println!("Nothing to report.");
        return ExitCode::SUCCESS;
    }

    println!("Report Summary:");
    for (label, samples) in &runs {
        let (peak_queue, mean_waiting) = summarize(samples);
        println!(
            "{}: {} cycles, peak queue {}, mean waiting {:.1}s",
            label,
            samples.len(),
            peak_queue,
            mean_waiting
        );
        if let Err(e) = plot_samples(&config.plots_dir, label, samples) {
            log::error!("Could not draw charts for '{}': {}", label, e);
            return ExitCode::FAILURE;
        }
    }

    if runs.len() > 1 {
        let series: Vec<(&str, &[CycleSample])> = runs
            .iter()
            .map(|(label, samples)| (label.as_str(), samples.as_slice()))
            .collect();
        match plot_comparison(&config.plots_dir, &series) {
            Ok(paths) => {
                for path in paths {
                    println!("Comparison chart saved to {}", path.display());
                }
            }
            Err(e) => {
                log::error!("Could not draw the comparison: {}", e);
                return ExitCode::FAILURE;
            }
        }
    }
    ExitCode::SUCCESS
}
