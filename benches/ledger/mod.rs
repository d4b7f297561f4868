pub mod buying_power;
pub mod shorting;

pub fn register_benchmarks(c: &mut criterion::Criterion) {
    buying_power::register_benchmarks(c);
    shorting::register_benchmarks(c);
}
