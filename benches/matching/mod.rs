pub mod crossing;

pub fn register_benchmarks(c: &mut criterion::Criterion) {
    crossing::register_benchmarks(c);
}
