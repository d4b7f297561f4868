use criterion::{BenchmarkId, Criterion};
use pricelevel::Side;
use rust_decimal::Decimal;
use std::hint::black_box;
use venue_core::BuyingPowerModel;
use venue_core::order::{
    Account, CurrencyId, ExecutionReport, OrderFields, OrderId, OrderStatus, Security,
};

fn fields(security: &Security, side: Side, price: Decimal) -> OrderFields {
    OrderFields::limit(
        Account::new("bench"),
        security.clone(),
        CurrencyId::new("USD"),
        side,
        "XNAS",
        100,
        price,
    )
}

/// A model holding `count` resting orders spread over ten securities.
fn populated(count: u64) -> BuyingPowerModel {
    let mut model = BuyingPowerModel::new();
    for i in 0..count {
        let security = Security::new(&format!("S{}", i % 10), "XNAS");
        let side = if i % 2 == 0 { Side::Buy } else { Side::Sell };
        let price = Decimal::new(1000 + (i % 50) as i64, 2);
        model.submit(OrderId(i), &fields(&security, side, price), price);
    }
    model
}

pub fn register_benchmarks(c: &mut Criterion) {
    let mut group = c.benchmark_group("Ledger - Buying Power");

    for depth in [10u64, 100, 1000].iter() {
        group.bench_with_input(BenchmarkId::new("submit", depth), depth, |b, &depth| {
            let security = Security::new("S0", "XNAS");
            b.iter_batched(
                || populated(depth),
                |mut model| {
                    let price = Decimal::new(1025, 2);
                    black_box(model.submit(
                        OrderId(u64::MAX),
                        &fields(&security, Side::Buy, price),
                        price,
                    ))
                },
                criterion::BatchSize::SmallInput,
            )
        });

        group.bench_with_input(BenchmarkId::new("fill", depth), depth, |b, &depth| {
            b.iter_batched(
                || populated(depth),
                |mut model| {
                    let initial = ExecutionReport::initial(OrderId(0), 0);
                    let fill = ExecutionReport::updated(&initial, OrderStatus::PartiallyFilled, 1)
                        .with_fill(50, Decimal::new(1000, 2));
                    black_box(model.update(&fill))
                },
                criterion::BatchSize::SmallInput,
            )
        });

        group.bench_with_input(BenchmarkId::new("recompute", depth), depth, |b, &depth| {
            let model = populated(depth);
            let currency = CurrencyId::new("USD");
            b.iter(|| black_box(model.recompute(&currency)))
        });
    }

    group.finish();
}
