use criterion::Criterion;
use pricelevel::Side;
use rust_decimal::Decimal;
use std::hint::black_box;
use std::sync::Arc;
use venue_core::admission::{
    BoardLotCheck, BuyingPowerCheck, ComplianceCheck, MaxOrderQuantityRule, OpposingOrderRule,
    RiskStateCheck,
};
use venue_core::matcher::{BboQuote, CachedQuoteSource, SimulatedExecutionDriver};
use venue_core::order::{Account, CurrencyId, OrderFields, OrderId, OrderInfo, Security};
use venue_core::{AdmissionPipeline, EngineConfig, ExecutionDriver, ManualClock};

pub fn register_benchmarks(c: &mut Criterion) {
    let mut group = c.benchmark_group("Admission - Pipeline");
    let config = EngineConfig::default();
    let security = Security::new("TST", "XNAS");
    let clock = Arc::new(ManualClock::new(0, 1));
    let quotes = Arc::new(CachedQuoteSource::new());
    quotes.publish(
        &security,
        BboQuote::new(Decimal::new(100, 2), Decimal::new(101, 2), 0),
    );
    let driver = Arc::new(SimulatedExecutionDriver::new(clock.clone()));
    let pipeline = AdmissionPipeline::new(driver, clock)
        .with_check(Arc::new(BoardLotCheck::new(
            config.board_lots.clone(),
            config.default_lot_size,
            quotes.clone(),
        )))
        .with_check(Arc::new(BuyingPowerCheck::new(
            config.exchange_rate_table(),
            quotes,
            config.risk.clone(),
        )))
        .with_check(Arc::new(RiskStateCheck::new()))
        .with_check(Arc::new(
            ComplianceCheck::new()
                .with_rule(Arc::new(MaxOrderQuantityRule::new(1_000_000)))
                .with_rule(Arc::new(OpposingOrderRule::new())),
        ));
    let fields = OrderFields::limit(
        Account::new("bench"),
        security,
        CurrencyId::new("USD"),
        Side::Buy,
        "XNAS",
        100,
        Decimal::new(100, 2),
    );

    let mut next_id = 0u64;
    group.bench_function("admit_limit_bid", |b| {
        b.iter(|| {
            next_id += 1;
            let info = OrderInfo::new(
                fields.clone(),
                Account::new("bench"),
                OrderId(next_id),
                false,
                0,
            );
            black_box(pipeline.submit(&info))
        })
    });

    let mut rejected_id = u64::MAX / 2;
    let mut odd_lot = fields.clone();
    odd_lot.quantity = 150;
    group.bench_function("reject_odd_lot", |b| {
        b.iter(|| {
            rejected_id += 1;
            let info = OrderInfo::new(
                odd_lot.clone(),
                Account::new("bench"),
                OrderId(rejected_id),
                false,
                0,
            );
            black_box(pipeline.submit(&info))
        })
    });

    group.finish();
}
