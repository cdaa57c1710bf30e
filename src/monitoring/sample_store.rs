use std::fs::{self, OpenOptions};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::error::ControlError;
use crate::shared_data::CycleSample;

/// Destination for closed sampling periods.
pub trait SampleSink {
    /// Called once before the first sample of a run; drops what an earlier
    /// run under the same label left behind.
    fn begin_run(&mut self, label: &str) -> Result<(), ControlError>;

    fn record(&mut self, sample: &CycleSample) -> Result<(), ControlError>;
}

/// Writes samples to `<dir>/samples-<label>.csv`, one file per run.
pub struct CsvSampleStore {
    dir: PathBuf,
}

impl CsvSampleStore {
    pub fn new(dir: &Path) -> Self {
        Self {
            dir: dir.to_path_buf(),
        }
    }

    pub fn path_for(&self, label: &str) -> PathBuf {
        samples_path(&self.dir, label)
    }
}

pub fn samples_path(dir: &Path, label: &str) -> PathBuf {
    dir.join(format!("samples-{}.csv", label))
}

/// Appends one record, writing the header only when the file is new.
fn log_to_csv(path: &Path, record: &CycleSample) -> Result<(), ControlError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .map_err(|e| ControlError::Sampling(format!("{}: {}", parent.display(), e)))?;
    }
    let file_exists = path.exists();
    let file = OpenOptions::new()
        .append(true)
        .create(true)
        .open(path)
        .map_err(|e| ControlError::Sampling(format!("{}: {}", path.display(), e)))?;
    let mut wtr = csv::WriterBuilder::new()
        .has_headers(!file_exists)
        .from_writer(file);
    wtr.serialize(record)?;
    wtr.flush()
        .map_err(|e| ControlError::Sampling(format!("{}: {}", path.display(), e)))?;
    Ok(())
}

impl SampleSink for CsvSampleStore {
    fn begin_run(&mut self, label: &str) -> Result<(), ControlError> {
        let path = self.path_for(label);
        match fs::remove_file(&path) {
            Ok(()) => {
                log::debug!("Replacing samples in {}", path.display());
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(ControlError::Sampling(format!("{}: {}", path.display(), e))),
        }
    }

    fn record(&mut self, sample: &CycleSample) -> Result<(), ControlError> {
        log_to_csv(&self.path_for(&sample.label), sample)
    }
}

/// Reads back every sample written for one controller label.
pub fn load_samples(dir: &Path, label: &str) -> Result<Vec<CycleSample>, ControlError> {
    let mut rdr = csv::Reader::from_path(samples_path(dir, label))?;
    let mut samples = Vec::new();
    for result in rdr.deserialize() {
        let sample: CycleSample = result?;
        samples.push(sample);
    }
    Ok(samples)
}

/// Keeps samples in memory.
#[derive(Debug, Default)]
pub struct MemorySampleSink {
    pub samples: Vec<CycleSample>,
}

impl SampleSink for MemorySampleSink {
    fn begin_run(&mut self, _label: &str) -> Result<(), ControlError> {
        self.samples.clear();
        Ok(())
    }

    fn record(&mut self, sample: &CycleSample) -> Result<(), ControlError> {
        self.samples.push(sample.clone());
        Ok(())
    }
}
