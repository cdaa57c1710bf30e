pub mod sample_store;
pub mod sampler;
pub mod visualizer;

pub use sample_store::{load_samples, CsvSampleStore, MemorySampleSink, SampleSink};
pub use sampler::CycleSampler;
