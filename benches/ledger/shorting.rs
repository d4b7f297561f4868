use criterion::Criterion;
use pricelevel::Side;
use rust_decimal::Decimal;
use std::hint::black_box;
use venue_core::ShortingModel;
use venue_core::order::{
    Account, CurrencyId, ExecutionReport, OrderFields, OrderId, OrderStatus, Security,
};

pub fn register_benchmarks(c: &mut Criterion) {
    let mut group = c.benchmark_group("Ledger - Shorting");
    let security = Security::new("TST", "XNAS");
    let ask = OrderFields::limit(
        Account::new("bench"),
        security,
        CurrencyId::new("USD"),
        Side::Sell,
        "XNAS",
        100,
        Decimal::ONE,
    );

    group.bench_function("submit_and_fill_asks", |b| {
        b.iter(|| {
            let mut model = ShortingModel::new();
            for i in 0..100 {
                let short = model.submit(OrderId(i), &ask);
                let initial = ExecutionReport::initial(OrderId(i), 0);
                let fill = ExecutionReport::updated(&initial, OrderStatus::Filled, 1)
                    .with_fill(100, Decimal::ONE);
                let _ = black_box(model.update(&fill));
                black_box(short);
            }
        })
    });

    group.finish();
}
