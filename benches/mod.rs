use criterion::{criterion_group, criterion_main};

mod admission;
mod ledger;
mod matching;

use admission::register_benchmarks as register_admission_benchmarks;
use ledger::register_benchmarks as register_ledger_benchmarks;
use matching::register_benchmarks as register_matching_benchmarks;

criterion_group!(
    benches,
    register_ledger_benchmarks,
    register_admission_benchmarks,
    register_matching_benchmarks,
);

criterion_main!(benches);
