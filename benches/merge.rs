use criterion::criterion_group;
use criterion::criterion_main;
use criterion::BenchmarkId;
use criterion::Criterion;
use criterion::Throughput;
use histopipe::histogram::merge::{merge_counts, merge_metrics};
use histopipe::{ColumnId, HistogramEntry, HistogramState};
use rand::Rng;

fn generate_state(columns: usize, buckets: usize) -> (HistogramState, Vec<ColumnId>) {
    let mut state = HistogramState::default();
    let mut ids = Vec::with_capacity(columns);
    for c in 0..columns {
        let id = format!("col{}", c);
        let entries = (0..buckets)
            .map(|b| HistogramEntry::range(b as f64, (b + 1) as f64))
            .collect();
        state.insert(id.clone(), entries);
        ids.push(id);
    }
    (state, ids)
}
fn generate_counts(columns: usize, buckets: usize) -> Vec<Vec<u64>> {
    let mut rng = rand::thread_rng();
    (0..columns)
        .map(|_| (0..buckets).map(|_| rng.gen_range(0..10_000)).collect())
        .collect()
}
fn generate_metrics(columns: usize, buckets: usize) -> Vec<Vec<Option<f64>>> {
    let mut rng = rand::thread_rng();
    (0..columns)
        .map(|_| {
            (0..buckets)
                .map(|_| rng.gen_bool(0.9).then(|| rng.gen::<f64>()))
                .collect()
        })
        .collect()
}
fn bench_merge(c: &mut Criterion) {
    let mut group = c.benchmark_group("merge");
    for (columns, buckets) in [(8, 10), (64, 20), (256, 50)] {
        let (state, ids) = generate_state(columns, buckets);
        let counts = generate_counts(columns, buckets);
        let metrics = generate_metrics(columns, buckets);
        let par = format!("{}x{}", columns, buckets);
        group.throughput(Throughput::Elements((columns * buckets) as u64));
        group.bench_with_input(BenchmarkId::new("counts", &par), &counts, |b, counts| {
            let mut state = state.clone();
            b.iter(|| merge_counts(&mut state, &ids, counts, true))
        });
        group.bench_with_input(BenchmarkId::new("metrics", &par), &metrics, |b, metrics| {
            let mut state = state.clone();
            b.iter(|| merge_metrics(&mut state, &ids, metrics))
        });
    }
    group.finish();
}
criterion_group!(benches, bench_merge);
criterion_main!(benches);
