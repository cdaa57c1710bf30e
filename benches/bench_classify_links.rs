use criterion::{black_box, criterion_group, criterion_main, Criterion};
use std::time::Duration;

use adaptive_signal_control::config::reference_program;
use adaptive_signal_control::simulation_engine::intersections::{
    parse_signal_state, Intersection, TopologyConfig,
};

/// Benchmarks parsing and classifying every state of the reference program.
fn bench_classify_links(c: &mut Criterion) {
    let intersection = match Intersection::new(TopologyConfig::reference()) {
        Ok(intersection) => intersection,
        Err(e) => panic!("reference topology is invalid: {}", e),
    };
    let states: Vec<String> = reference_program().into_iter().map(|p| p.state).collect();

    let mut group = c.benchmark_group("Classify_Links");
    group
        .sample_size(100)
        .measurement_time(Duration::from_secs(5))
        .warm_up_time(Duration::from_secs(1));

    group.bench_function("parse_and_classify_program", |b| {
        b.iter(|| {
            for state in &states {
                if let Ok(signal) = parse_signal_state(black_box(state)) {
                    black_box(intersection.classify_links(&signal));
                }
            }
        });
    });
    group.finish();
}

criterion_group!(benches, bench_classify_links);
criterion_main!(benches);
