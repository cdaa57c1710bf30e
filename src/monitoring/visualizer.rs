// visualizer.rs
//
// Line charts of the per-cycle samples: one chart per metric per controller,
// plus a fixed-vs-fuzzy comparison when both runs are on disk.

use plotters::prelude::*;
use std::error::Error;
use std::fs;
use std::path::{Path, PathBuf};

use crate::shared_data::CycleSample;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Metric {
    Queue,
    Waiting,
}

impl Metric {
    pub fn file_tag(&self) -> &'static str {
        match self {
            Metric::Queue => "queue",
            Metric::Waiting => "waiting",
        }
    }

    fn axis_label(&self) -> &'static str {
        match self {
            Metric::Queue => "max queue (vehicles)",
            Metric::Waiting => "avg waiting (s)",
        }
    }

    fn value(&self, sample: &CycleSample) -> f64 {
        match self {
            Metric::Queue => sample.max_queue as f64,
            Metric::Waiting => sample.avg_waiting,
        }
    }
}

pub fn plot_path(dir: &Path, label: &str, metric: Metric) -> PathBuf {
    dir.join(format!("plot-{}-{}.png", label, metric.file_tag()))
}

fn series_bounds(series: &[(&str, &[CycleSample])], metric: Metric) -> (u32, f64) {
    let max_cycle = series
        .iter()
        .flat_map(|(_, samples)| samples.iter().map(|s| s.cycle))
        .max()
        .unwrap_or(0)
        .max(1);
    let max_value = series
        .iter()
        .flat_map(|(_, samples)| samples.iter().map(|s| metric.value(s)))
        .fold(0.0, f64::max);
    let max_value = if max_value > 0.0 { max_value * 1.1 } else { 1.0 };
    (max_cycle, max_value)
}

fn draw_lines(
    path: &Path,
    caption: &str,
    series: &[(&str, &[CycleSample])],
    metric: Metric,
) -> Result<(), Box<dyn Error>> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let (max_cycle, max_value) = series_bounds(series, metric);

    let backend = BitMapBackend::new(path, (800, 600));
    let root = backend.into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root)
        .caption(caption, ("sans-serif", 20))
        .margin(40)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(0u32..max_cycle, 0.0..max_value)?;

    chart
        .configure_mesh()
        .x_desc("cycle")
        .y_desc(metric.axis_label())
        .draw()?;

    for (i, (label, samples)) in series.iter().enumerate() {
        let colour = Palette99::pick(i).to_rgba();
        chart
            .draw_series(LineSeries::new(
                samples.iter().map(|s| (s.cycle, metric.value(s))),
                colour.stroke_width(2),
            ))?
            .label(*label)
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], colour));
    }

    chart
        .configure_series_labels()
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()?;

    root.present()?;
    Ok(())
}

/// Writes the queue and waiting charts for one run; returns the files written.
pub fn plot_samples(
    dir: &Path,
    label: &str,
    samples: &[CycleSample],
) -> Result<Vec<PathBuf>, Box<dyn Error>> {
    let mut written = Vec::new();
    for metric in [Metric::Queue, Metric::Waiting] {
        let path = plot_path(dir, label, metric);
        let caption = format!("{} controller: {}", label, metric.axis_label());
        draw_lines(&path, &caption, &[(label, samples)], metric)?;
        log::info!("Saved {}", path.display());
        written.push(path);
    }
    Ok(written)
}

/// Overlays several runs per metric in `plot-comparison-<metric>.png`.
pub fn plot_comparison(
    dir: &Path,
    runs: &[(&str, &[CycleSample])],
) -> Result<Vec<PathBuf>, Box<dyn Error>> {
    let mut written = Vec::new();
    for metric in [Metric::Queue, Metric::Waiting] {
        let path = plot_path(dir, "comparison", metric);
        let caption = format!("controller comparison: {}", metric.axis_label());
        draw_lines(&path, &caption, runs, metric)?;
        log::info!("Saved {}", path.display());
        written.push(path);
    }
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn samples(label: &str) -> Vec<CycleSample> {
        (0..5)
            .map(|cycle| CycleSample {
                label: label.to_string(),
                cycle,
                time: (cycle as u64 + 1) * 120,
                max_queue: cycle * 3,
                avg_waiting: cycle as f64 * 10.0,
            })
            .collect()
    }

    #[test]
    fn plot_file_names() {
        let path = plot_path(Path::new("plots"), "fuzzy", Metric::Waiting);
        assert_eq!(path, PathBuf::from("plots/plot-fuzzy-waiting.png"));
    }

    #[test]
    fn bounds_leave_headroom() {
        let fuzzy = samples("fuzzy");
        let (cycles, top) = series_bounds(&[("fuzzy", fuzzy.as_slice())], Metric::Queue);
        assert_eq!(cycles, 4);
        assert!(top > 12.0);
    }

    #[test]
    fn bounds_of_empty_series_are_positive() {
        let empty: Vec<CycleSample> = Vec::new();
        let (cycles, top) = series_bounds(&[("fixed", empty.as_slice())], Metric::Waiting);
        assert_eq!(cycles, 1);
        assert_eq!(top, 1.0);
    }
}
