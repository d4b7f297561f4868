use criterion::{BenchmarkId, Criterion};
use pricelevel::Side;
use rust_decimal::Decimal;
use std::sync::Arc;
use std::time::{Duration, Instant};
use venue_core::matcher::{
    BboQuote, CachedQuoteSource, SimulatedExecutionDriver, TaggingMatchReportBuilder,
};
use venue_core::order::{
    Account, CurrencyId, Order, OrderFields, OrderId, OrderInfo, OrderStatus, Security,
};
use venue_core::{
    ExecutionDriver, InternalMatchingEngine, ManualClock, MatcherContext, SequentialIdentitySource,
};

fn engine(security: &Security) -> InternalMatchingEngine {
    let clock = Arc::new(ManualClock::new(0, 1));
    let quotes = Arc::new(CachedQuoteSource::new());
    quotes.publish(
        security,
        BboQuote::new(Decimal::new(100, 2), Decimal::new(101, 2), 0),
    );
    InternalMatchingEngine::new(MatcherContext {
        root_account: Account::new("root"),
        report_builder: Arc::new(TaggingMatchReportBuilder::default()),
        quotes,
        clock: clock.clone(),
        identities: Arc::new(SequentialIdentitySource::new(u64::MAX / 2)),
        driver: Arc::new(SimulatedExecutionDriver::new(clock)),
        timeout: Duration::from_secs(1),
    })
}

fn submit(
    engine: &InternalMatchingEngine,
    security: &Security,
    id: u64,
    side: Side,
    quantity: u64,
) -> Arc<Order> {
    let fields = OrderFields::limit(
        Account::new("bench"),
        security.clone(),
        CurrencyId::new("USD"),
        side,
        "XNAS",
        quantity,
        Decimal::new(100, 2),
    );
    engine.submit(&OrderInfo::new(fields, Account::new("bench"), OrderId(id), false, id))
}

fn wait_for(order: &Order, status: OrderStatus) {
    while order.status() != status {
        std::thread::yield_now();
    }
}

/// Time to cross one incoming ask against `depth` resting bids of 100 each.
fn measure_sweep(depth: u64, iterations: u64) -> Duration {
    let security = Security::new("BENCH", "XNAS");
    let mut total = Duration::ZERO;
    let mut next_id = 1;
    for _ in 0..iterations {
        let engine = engine(&security);
        let mut resting = Vec::new();
        for _ in 0..depth {
            resting.push(submit(&engine, &security, next_id, Side::Buy, 100));
            next_id += 1;
        }
        for order in &resting {
            wait_for(order, OrderStatus::New);
        }
        let start = Instant::now();
        let ask = submit(&engine, &security, next_id, Side::Sell, depth * 100);
        next_id += 1;
        wait_for(&ask, OrderStatus::Filled);
        total += start.elapsed();
        engine.close();
    }
    total
}

pub fn register_benchmarks(c: &mut Criterion) {
    let mut group = c.benchmark_group("Matcher - Internal Crossing");
    group.sample_size(10);

    for depth in [1u64, 10, 50].iter() {
        group.bench_with_input(
            BenchmarkId::new("sweep_resting_bids", depth),
            depth,
            |b, &depth| b.iter_custom(|iterations| measure_sweep(depth, iterations)),
        );
    }

    group.bench_function("rest_and_route", |b| {
        let security = Security::new("BENCH", "XNAS");
        let engine = engine(&security);
        let mut next_id = 1;
        b.iter(|| {
            let order = submit(&engine, &security, next_id, Side::Buy, 100);
            next_id += 1;
            wait_for(&order, OrderStatus::New);
        })
    });

    group.finish();
}
