pub mod pipeline;

pub fn register_benchmarks(c: &mut criterion::Criterion) {
    pipeline::register_benchmarks(c);
}
